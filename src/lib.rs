//! # shroud
//!
//! Client side of a covert, censorship-resistant transport. A connection
//! opens with a handshake that is byte-for-byte a browser's TLS
//! ClientHello to an innocuous host, except that the client random, the
//! session ID and the X25519 key share secretly carry an encrypted
//! authentication payload. The server's disguised reply yields the
//! symmetric session key under which the multiplexing layer above this
//! crate runs its virtual connections.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │           Multiplexing session layer (external)          │
//! ├──────────────────────────────────────────────────────────┤
//! │  mux::BufferedPipe   per-stream blocking byte conduit    │
//! ├──────────────────────────────────────────────────────────┤
//! │  tls::handshake      covert establishment, key recovery  │
//! │  tls::hello          browser-fingerprint fabrication     │
//! │  tls::auth           payload sealing / session key open  │
//! ├──────────────────────────────────────────────────────────┤
//! │  crypto              X25519, ChaCha20-Poly1305, HKDF     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate deliberately stops at the seams: it neither dials TCP nor
//! multiplexes streams, and it performs no real TLS negotiation; the only
//! cryptography is the one authenticated encryption pair that carries the
//! session key.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod mux;
pub mod tls;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use mux::BufferedPipe;
pub use tls::{handshake, AuthInfo, Browser, SessionKey};
