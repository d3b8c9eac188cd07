//! TLS record-layer framing.
//!
//! The covert handshake speaks the outer record format only: a 5-byte
//! header (content type, legacy version, length) around opaque payloads.
//! Nothing here negotiates or encrypts; it frames what the fabricator
//! built and reads the server's disguise records back one at a time.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// TLS record content types.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentType {
    ChangeCipherSpec = 20,
    Alert = 21,
    Handshake = 22,
    ApplicationData = 23,
}

/// Legacy record version carried by the outer ClientHello record.
pub const VERSION_TLS11: u16 = 0x0302;

/// Legacy version modern stacks put everywhere else.
pub const VERSION_TLS12: u16 = 0x0303;

/// Largest record body this client will accept.
pub const MAX_RECORD_LEN: usize = 16401;

/// Record header length: type (1) + version (2) + body length (2).
pub const HEADER_LEN: usize = 5;

/// Wrap `payload` in a record header, producing the full on-wire record.
pub fn add_record_layer(payload: &[u8], content_type: ContentType, version: u16) -> Vec<u8> {
    let mut record = BytesMut::with_capacity(HEADER_LEN + payload.len());
    record.put_u8(content_type as u8);
    record.put_u16(version);
    record.put_u16(payload.len() as u16);
    record.put_slice(payload);
    record.to_vec()
}

/// Read exactly one record from `stream`, depositing its body into `buf`.
///
/// Returns the body length. The record header is consumed and discarded; a
/// body longer than `buf` (or than [`MAX_RECORD_LEN`]) is an error since
/// partial records would desynchronize the stream.
pub async fn read_record<S>(stream: &mut S, buf: &mut [u8]) -> std::io::Result<usize>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    stream.read_exact(&mut header).await?;

    let body_len = u16::from_be_bytes([header[3], header[4]]) as usize;
    if body_len > MAX_RECORD_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("record body of {body_len} bytes exceeds protocol maximum"),
        ));
    }
    if body_len > buf.len() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("record body of {body_len} bytes exceeds read buffer"),
        ));
    }

    stream.read_exact(&mut buf[..body_len]).await?;
    Ok(body_len)
}
