//! The covert handshake: fabrication, payload codec and orchestration.
//!
//! A connection starts life looking exactly like a browser opening a TLS
//! session to an innocuous host. The ClientHello is real in every byte a
//! middlebox can check (cipher order, extension order, GREASE) except
//! that three fields an observer expects to be opaque random data carry an
//! encrypted authentication payload:
//!
//! ```text
//! client random   (32)  <- ephemeral X25519 public key
//! session ID      (32)  <- ciphertext+tag, first half
//! x25519 keyshare (32)  <- ciphertext+tag, second half
//! ```
//!
//! The server's reply looks like a ServerHello plus the usual encrypted
//! records; buried at fixed offsets is the sealed session key the client
//! recovers to finish establishment.

pub mod auth;
pub mod client;
pub mod fingerprint;
pub mod hello;
pub mod record;

pub use auth::{AuthInfo, AuthPayload, SessionKey};
pub use client::handshake;
pub use fingerprint::Browser;
pub use hello::ClientHelloFields;
