//! Authentication payload codec.
//!
//! Encodes the client's identity into a blob that hides inside ClientHello
//! fields an observer expects to be random: a fresh X25519 public key (the
//! client random) and 64 bytes of ciphertext+tag (split across the session
//! ID and the X25519 key share). On the return path it opens the server's
//! response to recover the session key.

use std::time::{SystemTime, UNIX_EPOCH};

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{self, AeadKey, EphemeralSecret, PublicKey, NONCE_SIZE};
use crate::error::Result;

/// Length of the identity plaintext sealed into the hello.
const IDENTITY_LEN: usize = 48;

/// Length of the sealed identity: plaintext plus the 16-byte tag.
pub const CIPHERTEXT_WITH_TAG_LEN: usize = 64;

/// Length of the server's sealed session key: 32-byte key plus tag.
pub const RESPONSE_CIPHERTEXT_LEN: usize = 48;

/// Most bytes a proxy-method name may occupy in the identity plaintext.
pub const PROXY_METHOD_LEN: usize = 12;

/// Identity material consumed (not owned) by the codec.
///
/// `mock_domain` is not encrypted: it becomes the disguise SNI, and the
/// literal value `"random"` (any case) asks the orchestrator to substitute
/// a generated hostname.
#[derive(Clone)]
pub struct AuthInfo {
    /// Client identity registered with the server.
    pub uid: [u8; 16],
    /// Stream-session identifier chosen by the multiplexing layer.
    pub session_id: u32,
    /// Name of the proxied protocol, at most [`PROXY_METHOD_LEN`] bytes.
    pub proxy_method: String,
    /// Cipher selector for the session layer above this handshake.
    pub encryption_method: u8,
    /// The server's long-term X25519 public key.
    pub server_public_key: PublicKey,
    /// Disguise hostname, or `"random"`.
    pub mock_domain: String,
}

/// The secret-carrying byte groups embedded into the ClientHello.
///
/// Produced once per handshake attempt and never reused: the ephemeral key
/// behind `rand_pub_key` is fresh every time, so repeated attempts never
/// show a repeated client random.
pub struct AuthPayload {
    /// Marshalled ephemeral public key (becomes the client random).
    pub rand_pub_key: [u8; 32],
    /// Sealed identity (split across session ID and key share).
    pub ciphertext_with_tag: [u8; CIPHERTEXT_WITH_TAG_LEN],
}

/// The symmetric session key recovered from the server's response.
///
/// Ownership passes to the multiplexing layer; the handshake keeps no copy.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; 32]);

impl SessionKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey([redacted])")
    }
}

/// Build the authentication payload for one handshake attempt.
///
/// Generates a fresh ephemeral key pair, agrees it against the server's
/// static key and seals the 48-byte identity plaintext under the derived
/// key, using the first 12 bytes of the ephemeral public key as nonce.
/// Returns the payload together with the derived key, which the caller
/// holds only long enough to open the server's response.
///
/// Fails only on entropy or agreement failure; a fresh attempt may retry.
pub fn make_auth_payload(info: &AuthInfo) -> Result<(AuthPayload, AeadKey)> {
    let ephemeral = EphemeralSecret::generate()?;
    let rand_pub_key = ephemeral.public_key().to_bytes();
    let key = ephemeral
        .diffie_hellman(&info.server_public_key)
        .derive_key();

    let mut plaintext = [0u8; IDENTITY_LEN];
    plaintext[..16].copy_from_slice(&info.uid);
    let method = info.proxy_method.as_bytes();
    let method_len = method.len().min(PROXY_METHOD_LEN);
    plaintext[16..16 + method_len].copy_from_slice(&method[..method_len]);
    plaintext[28] = info.encryption_method;
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    plaintext[29..37].copy_from_slice(&timestamp.to_be_bytes());
    plaintext[37..41].copy_from_slice(&info.session_id.to_be_bytes());
    // plaintext[41..48] stays zero padding

    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&rand_pub_key[..NONCE_SIZE]);
    let sealed = crypto::seal(&key, &nonce, &plaintext)?;
    plaintext.zeroize();

    let mut ciphertext_with_tag = [0u8; CIPHERTEXT_WITH_TAG_LEN];
    ciphertext_with_tag.copy_from_slice(&sealed);

    Ok((AuthPayload { rand_pub_key, ciphertext_with_tag }, key))
}

/// Open the server's sealed session key.
///
/// `key` is the agreement-derived key returned by [`make_auth_payload`];
/// the nonce and ciphertext come from fixed ranges of the response. A tag
/// that does not verify is a conclusive [`crate::Error::Authentication`],
/// never retried on the same connection.
pub fn extract_session_key(
    key: &AeadKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext_with_tag: &[u8; RESPONSE_CIPHERTEXT_LEN],
) -> Result<SessionKey> {
    let mut opened = crypto::open(key, nonce, ciphertext_with_tag)?;
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&opened);
    opened.zeroize();
    Ok(SessionKey::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{open, seal, StaticSecret};

    fn server_identity() -> (StaticSecret, PublicKey) {
        let secret = StaticSecret::random();
        let public = PublicKey::from(&secret);
        (secret, public)
    }

    fn sample_info(server_public_key: PublicKey) -> AuthInfo {
        AuthInfo {
            uid: [0x11; 16],
            session_id: 42,
            proxy_method: "shadowsocks".to_string(),
            encryption_method: 0,
            server_public_key,
            mock_domain: "cdn.example.com".to_string(),
        }
    }

    #[test]
    fn test_payload_lengths_are_fixed() {
        let (_, server_public) = server_identity();
        let (payload, _) = make_auth_payload(&sample_info(server_public)).unwrap();
        assert_eq!(payload.rand_pub_key.len(), 32);
        assert_eq!(payload.ciphertext_with_tag.len(), 64);
    }

    #[test]
    fn test_payloads_never_repeat() {
        let (_, server_public) = server_identity();
        let info = sample_info(server_public);
        let (a, _) = make_auth_payload(&info).unwrap();
        let (b, _) = make_auth_payload(&info).unwrap();
        assert_ne!(a.rand_pub_key, b.rand_pub_key);
        assert_ne!(a.ciphertext_with_tag, b.ciphertext_with_tag);
    }

    #[test]
    fn test_server_can_open_identity() {
        let (server_secret, server_public) = server_identity();
        let info = sample_info(server_public);
        let (payload, _) = make_auth_payload(&info).unwrap();

        // Server side: agree against the embedded ephemeral public key.
        let client_public = PublicKey::from_bytes(payload.rand_pub_key);
        let server_key = server_secret.diffie_hellman(&client_public).derive_key();

        let nonce: [u8; NONCE_SIZE] = payload.rand_pub_key[..NONCE_SIZE].try_into().unwrap();
        let identity = open(&server_key, &nonce, &payload.ciphertext_with_tag).unwrap();

        assert_eq!(identity.len(), IDENTITY_LEN);
        assert_eq!(&identity[..16], &info.uid);
        assert_eq!(&identity[16..27], b"shadowsocks");
        assert_eq!(identity[27], 0); // zero padding after an 11-byte method
        assert_eq!(identity[28], info.encryption_method);
        let session_id = u32::from_be_bytes(identity[37..41].try_into().unwrap());
        assert_eq!(session_id, 42);
        assert!(identity[41..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_session_key_round_trip() {
        let (server_secret, server_public) = server_identity();
        let (payload, client_key) = make_auth_payload(&sample_info(server_public)).unwrap();

        // Server derives the same key and seals a fresh session key.
        let client_public = PublicKey::from_bytes(payload.rand_pub_key);
        let server_key = server_secret.diffie_hellman(&client_public).derive_key();
        assert_eq!(client_key.as_bytes(), server_key.as_bytes());

        let session_key = [0x5a; 32];
        let response_nonce = [9u8; NONCE_SIZE];
        let sealed = seal(&server_key, &response_nonce, &session_key).unwrap();
        let sealed: [u8; RESPONSE_CIPHERTEXT_LEN] = sealed.try_into().unwrap();

        let recovered = extract_session_key(&client_key, &response_nonce, &sealed).unwrap();
        assert_eq!(recovered.as_bytes(), &session_key);
    }

    #[test]
    fn test_tampered_response_is_conclusive_failure() {
        let (_, server_public) = server_identity();
        let (_, client_key) = make_auth_payload(&sample_info(server_public)).unwrap();

        let garbage = [0u8; RESPONSE_CIPHERTEXT_LEN];
        let err = extract_session_key(&client_key, &[0u8; NONCE_SIZE], &garbage).unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[test]
    fn test_long_proxy_method_is_truncated() {
        let (server_secret, server_public) = server_identity();
        let mut info = sample_info(server_public);
        info.proxy_method = "a-very-long-method-name".to_string();

        let (payload, _) = make_auth_payload(&info).unwrap();
        let client_public = PublicKey::from_bytes(payload.rand_pub_key);
        let server_key = server_secret.diffie_hellman(&client_public).derive_key();
        let nonce: [u8; NONCE_SIZE] = payload.rand_pub_key[..NONCE_SIZE].try_into().unwrap();
        let identity = open(&server_key, &nonce, &payload.ciphertext_with_tag).unwrap();

        assert_eq!(&identity[16..28], &b"a-very-long-method-name"[..12]);
    }
}
