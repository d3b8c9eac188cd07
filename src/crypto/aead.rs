//! The single authenticated encryption operation the handshake relies on.
//!
//! ChaCha20-Poly1305: 32-byte key, 12-byte nonce, 16-byte tag appended to
//! the ciphertext. The client seals its identity material into the
//! ClientHello and opens the server's response to recover the session key;
//! nothing else is ever encrypted at this layer.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};

/// A symmetric AEAD key, zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AeadKey([u8; KEY_SIZE]);

impl AeadKey {
    /// Create a key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes. Secret material, handle with care.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Encrypt `plaintext`, returning ciphertext with the 16-byte tag appended.
pub fn seal(key: &AeadKey, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .encrypt(nonce.into(), plaintext)
        .map_err(|_| Error::crypto("aead seal failed"))
}

/// Decrypt `ciphertext_with_tag`.
///
/// A tag that does not verify means the server rejected us or the response
/// was tampered with; either way the result is the conclusive
/// [`Error::Authentication`].
pub fn open(key: &AeadKey, nonce: &[u8; NONCE_SIZE], ciphertext_with_tag: &[u8]) -> Result<Vec<u8>> {
    if ciphertext_with_tag.len() < TAG_SIZE {
        return Err(Error::Authentication);
    }
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .decrypt(nonce.into(), ciphertext_with_tag)
        .map_err(|_| Error::Authentication)
}
