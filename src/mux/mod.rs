//! Primitives for the multiplexing layer.
//!
//! The session layer that allocates stream IDs and tears virtual
//! connections down lives above this crate; what it consumes from here is
//! the per-connection byte conduit: a blocking pipe with deadlines,
//! backpressure and close semantics.

mod pipe;

pub use pipe::{BufferedPipe, DEFAULT_SOFT_LIMIT};
