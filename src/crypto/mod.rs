//! Cryptographic primitives for the covert handshake.
//!
//! - X25519 key agreement (ephemeral client key against the server's static key)
//! - ChaCha20-Poly1305 for the single authenticated encrypt/decrypt pair the
//!   handshake performs
//! - HKDF-SHA256 to turn the raw agreement into the AEAD key
//! - entropy access, including the degraded time-seeded fallback used for
//!   non-security randomness only
//!
//! Secret material is zeroized on drop.

mod aead;
mod keys;
pub mod random;

pub use aead::{open, seal, AeadKey};
pub use keys::{EphemeralSecret, PublicKey, SharedSecret, StaticSecret};

/// Size of symmetric keys in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of AEAD nonces in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of AEAD authentication tags in bytes.
pub const TAG_SIZE: usize = 16;

/// Size of X25519 public keys in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;
