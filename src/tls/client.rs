//! The covert handshake, client side.
//!
//! One attempt runs end-to-end on one task: encode the authentication
//! payload, fabricate the disguised ClientHello, write it as a single
//! record, then read the server's disguised response and recover the
//! session key. No retries happen here: the first error surfaces to the
//! caller unchanged, and a rejected authentication is never retried on the
//! same connection.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::crypto::{random, NONCE_SIZE};
use crate::error::{Error, Result};
use crate::tls::auth::{self, AuthInfo, SessionKey, RESPONSE_CIPHERTEXT_LEN};
use crate::tls::fingerprint::Browser;
use crate::tls::hello::{self, ClientHelloFields};
use crate::tls::record::{self, ContentType, VERSION_TLS11};

/// Byte ranges of the first response record that carry the sealed session
/// key. Their concatenation is 12 bytes of nonce, 48 bytes of
/// ciphertext+tag and 4 unused bytes. The exact offsets mirror where the
/// server buries the material inside its disguise records; a bit-exact
/// contract with the server side, not a local buffering choice.
const RESPONSE_RANGE_A: std::ops::Range<usize> = 6..38;
const RESPONSE_RANGE_B: std::ops::Range<usize> = 84..116;

/// Disguise records the server sends after the response payload
/// (change-cipher-spec and an encrypted-certificate lookalike).
const TRAILING_DISGUISE_RECORDS: usize = 2;

/// Run one covert handshake over `stream`, which must already be connected.
///
/// The transport is only read from and written to; dialing, socket options
/// and teardown belong to the caller. On success the recovered
/// [`SessionKey`] is handed over for the multiplexing layer to own.
pub async fn handshake<S>(stream: &mut S, info: &AuthInfo, browser: Browser) -> Result<SessionKey>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (payload, response_key) = auth::make_auth_payload(info)?;

    // The ephemeral public key rides in the client random; the 64-byte
    // ciphertext+tag is split across session ID and X25519 key share.
    let mut session_id = [0u8; 32];
    session_id.copy_from_slice(&payload.ciphertext_with_tag[..32]);
    let mut x25519_key_share = [0u8; 32];
    x25519_key_share.copy_from_slice(&payload.ciphertext_with_tag[32..]);

    let mut fields = ClientHelloFields {
        random: payload.rand_pub_key,
        session_id,
        x25519_key_share,
        server_name: info.mock_domain.clone(),
    };
    if fields.server_name.eq_ignore_ascii_case("random") {
        fields.server_name = random::plausible_hostname();
        tracing::debug!(server_name = %fields.server_name, "using generated disguise hostname");
    }

    let client_hello = hello::build(browser, &fields)?;
    let wire = record::add_record_layer(&client_hello, ContentType::Handshake, VERSION_TLS11);
    stream.write_all(&wire).await?;
    tracing::trace!("client hello sent");

    let mut buf = [0u8; 1024];
    tracing::trace!("waiting for server hello");
    let n = record::read_record(stream, &mut buf).await?;
    if n < RESPONSE_RANGE_B.end {
        return Err(Error::Transport(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("server hello too short: {n} bytes"),
        )));
    }

    let mut sealed = [0u8; 64];
    sealed[..32].copy_from_slice(&buf[RESPONSE_RANGE_A]);
    sealed[32..].copy_from_slice(&buf[RESPONSE_RANGE_B]);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&sealed[..NONCE_SIZE]);
    let mut ciphertext = [0u8; RESPONSE_CIPHERTEXT_LEN];
    ciphertext.copy_from_slice(&sealed[NONCE_SIZE..NONCE_SIZE + RESPONSE_CIPHERTEXT_LEN]);

    let session_key = auth::extract_session_key(&response_key, &nonce, &ciphertext)?;
    tracing::trace!("session key recovered");

    // Consume the remaining disguise records before declaring success; a
    // half-drained transport must not reach the session layer.
    for _ in 0..TRAILING_DISGUISE_RECORDS {
        record::read_record(stream, &mut buf).await?;
    }

    Ok(session_key)
}
