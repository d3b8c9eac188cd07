//! X25519 key agreement primitives.
//!
//! The client authenticates by agreeing a fresh ephemeral key against the
//! server's static public key; the agreement is expanded through HKDF before
//! it touches the AEAD. Secrets zeroize on drop.

use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{
    PublicKey as DalekPublic, SharedSecret as DalekShared, StaticSecret as DalekStatic,
};
use zeroize::Zeroize;

use crate::crypto::{random, AeadKey, KEY_SIZE, PUBLIC_KEY_SIZE};
use crate::error::Result;

/// HKDF info label binding derived keys to this protocol.
const KEY_DERIVATION_LABEL: &[u8] = b"shroud session establishment";

/// A single-use X25519 secret, generated fresh for every handshake attempt.
///
/// Generation draws from the OS entropy source and surfaces a typed error on
/// failure rather than falling back to weaker randomness.
pub struct EphemeralSecret(DalekStatic);

impl EphemeralSecret {
    /// Generate a new ephemeral secret from OS entropy.
    pub fn generate() -> Result<Self> {
        let mut seed = random::secure_bytes::<KEY_SIZE>()?;
        let secret = DalekStatic::from(seed);
        seed.zeroize();
        Ok(Self(secret))
    }

    /// The public half, to be sent on the wire.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(DalekPublic::from(&self.0))
    }

    /// Perform X25519 Diffie-Hellman key agreement, consuming the secret.
    pub fn diffie_hellman(self, their_public: &PublicKey) -> SharedSecret {
        SharedSecret(self.0.diffie_hellman(&their_public.0))
    }
}

/// A long-term X25519 secret.
///
/// The transport client itself never holds one; this exists for key
/// provisioning tooling and for exercising the server side of the exchange
/// in tests.
#[derive(Clone)]
pub struct StaticSecret(DalekStatic);

impl StaticSecret {
    /// Generate a new static secret.
    pub fn random() -> Self {
        Self(DalekStatic::random_from_rng(rand::rngs::OsRng))
    }

    /// Reconstruct from raw bytes. The bytes must come from a
    /// cryptographically secure source.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(DalekStatic::from(bytes))
    }

    /// Perform X25519 Diffie-Hellman key agreement.
    pub fn diffie_hellman(&self, their_public: &PublicKey) -> SharedSecret {
        SharedSecret(self.0.diffie_hellman(&their_public.0))
    }
}

impl From<&StaticSecret> for PublicKey {
    fn from(secret: &StaticSecret) -> Self {
        PublicKey(DalekPublic::from(&secret.0))
    }
}

/// An X25519 public key. Safe to share.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(DalekPublic);

impl PublicKey {
    /// Reconstruct from raw wire bytes.
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(DalekPublic::from(bytes))
    }

    /// Raw bytes of this public key.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        self.0.as_bytes()
    }

    /// Convert to raw bytes.
    pub fn to_bytes(self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }
}

/// The result of a key agreement.
///
/// Lives only long enough to derive the AEAD key for one handshake attempt;
/// the inner secret zeroizes when dropped.
pub struct SharedSecret(DalekShared);

impl SharedSecret {
    /// Expand the raw agreement into the 32-byte AEAD key used for the
    /// authentication payload and the server's response.
    pub fn derive_key(&self) -> AeadKey {
        let hk = Hkdf::<Sha256>::new(None, self.0.as_bytes());
        let mut okm = [0u8; KEY_SIZE];
        hk.expand(KEY_DERIVATION_LABEL, &mut okm)
            .expect("32 bytes is a valid HKDF-SHA256 output length");
        let key = AeadKey::from_bytes(okm);
        okm.zeroize();
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_sides_derive_same_key() {
        let server_static = StaticSecret::random();
        let server_public = PublicKey::from(&server_static);

        let ephemeral = EphemeralSecret::generate().unwrap();
        let client_public = ephemeral.public_key();

        let client_key = ephemeral.diffie_hellman(&server_public).derive_key();
        let server_key = server_static.diffie_hellman(&client_public).derive_key();

        assert_eq!(client_key.as_bytes(), server_key.as_bytes());
    }

    #[test]
    fn test_ephemeral_keys_differ_per_attempt() {
        let a = EphemeralSecret::generate().unwrap();
        let b = EphemeralSecret::generate().unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_public_key_round_trip() {
        let secret = StaticSecret::random();
        let public = PublicKey::from(&secret);
        assert_eq!(PublicKey::from_bytes(public.to_bytes()), public);
    }

    #[test]
    fn test_derived_key_differs_from_raw_agreement() {
        let server_static = StaticSecret::random();
        let server_public = PublicKey::from(&server_static);
        let ephemeral = EphemeralSecret::generate().unwrap();

        let shared = ephemeral.diffie_hellman(&server_public);
        let raw = *shared.0.as_bytes();
        let derived = shared.derive_key();

        assert_ne!(derived.as_bytes(), &raw);
    }
}
