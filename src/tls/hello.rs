//! ClientHello fabrication.
//!
//! Builds the exact on-wire ClientHello a given browser profile would send
//! for a given server name, then overwrites the three fields that secretly
//! carry the authentication payload: the client random (ephemeral public
//! key), the session ID (first half of the ciphertext) and the X25519
//! key-share data (second half). Everything else (cipher-suite order,
//! extension set and ordering, GREASE placement) follows the profile so a
//! passive observer sees an ordinary browser connection.

use bytes::{BufMut, BytesMut};

use crate::error::{Error, Result};
use crate::tls::fingerprint::Browser;

/// Handshake message type byte for ClientHello.
pub const HANDSHAKE_CLIENT_HELLO: u8 = 0x01;

/// Named group identifier for X25519.
pub const GROUP_X25519: u16 = 0x001d;
const GROUP_SECP256R1: u16 = 0x0017;
const GROUP_SECP384R1: u16 = 0x0018;
const GROUP_SECP521R1: u16 = 0x0019;

// GREASE values (RFC 8701). Real Chrome draws these per connection; fixed
// values keep a fabrication reproducible for a given profile and server
// name, so the overwritten fields are the only bytes that ever vary.
const GREASE_1: u16 = 0x0a0a;
const GREASE_2: u16 = 0x1a1a;

/// Caller-supplied overrides for the secret-carrying fields.
///
/// The three cryptographic fields are exactly 32 bytes by construction;
/// anything else is a caller error the type system rules out.
#[derive(Clone, Debug)]
pub struct ClientHelloFields {
    /// Carries the sender's ephemeral public key.
    pub random: [u8; 32],
    /// Carries the first half of the authentication ciphertext+tag.
    pub session_id: [u8; 32],
    /// Carries the second half of the authentication ciphertext+tag.
    pub x25519_key_share: [u8; 32],
    /// The disguise hostname placed in the SNI extension.
    pub server_name: String,
}

/// One entry of the key-share extension.
struct KeyShareEntry {
    group: u16,
    data: Vec<u8>,
}

/// Typed ClientHello extensions, encoded in declaration order.
enum Extension {
    Grease { id: u16, body: &'static [u8] },
    ServerName(String),
    ExtendedMasterSecret,
    RenegotiationInfo,
    SupportedGroups(Vec<u16>),
    EcPointFormats(Vec<u8>),
    SessionTicket,
    Alpn(Vec<&'static str>),
    StatusRequest,
    SignatureAlgorithms(Vec<u16>),
    SignedCertTimestamp,
    KeyShare(Vec<KeyShareEntry>),
    PskKeyExchangeModes(Vec<u8>),
    SupportedVersions(Vec<u16>),
    CompressCertificate(Vec<u16>),
    Padding(usize),
}

impl Extension {
    fn ext_type(&self) -> u16 {
        match self {
            Extension::Grease { id, .. } => *id,
            Extension::ServerName(_) => 0x0000,
            Extension::StatusRequest => 0x0005,
            Extension::SupportedGroups(_) => 0x000a,
            Extension::EcPointFormats(_) => 0x000b,
            Extension::SignatureAlgorithms(_) => 0x000d,
            Extension::Alpn(_) => 0x0010,
            Extension::SignedCertTimestamp => 0x0012,
            Extension::Padding(_) => 0x0015,
            Extension::ExtendedMasterSecret => 0x0017,
            Extension::CompressCertificate(_) => 0x001b,
            Extension::SessionTicket => 0x0023,
            Extension::SupportedVersions(_) => 0x002b,
            Extension::PskKeyExchangeModes(_) => 0x002d,
            Extension::KeyShare(_) => 0x0033,
            Extension::RenegotiationInfo => 0xff01,
        }
    }

    fn encode(&self, out: &mut BytesMut) {
        let mut body = BytesMut::new();
        match self {
            Extension::Grease { body: b, .. } => body.put_slice(b),
            Extension::ServerName(name) => {
                body.put_u16(name.len() as u16 + 3);
                body.put_u8(0); // host_name
                body.put_u16(name.len() as u16);
                body.put_slice(name.as_bytes());
            }
            Extension::ExtendedMasterSecret | Extension::SessionTicket => {}
            Extension::SignedCertTimestamp => {}
            Extension::RenegotiationInfo => body.put_u8(0),
            Extension::SupportedGroups(groups) => {
                body.put_u16(groups.len() as u16 * 2);
                for g in groups {
                    body.put_u16(*g);
                }
            }
            Extension::EcPointFormats(formats) => {
                body.put_u8(formats.len() as u8);
                body.put_slice(formats);
            }
            Extension::Alpn(protocols) => {
                let list_len: usize = protocols.iter().map(|p| p.len() + 1).sum();
                body.put_u16(list_len as u16);
                for p in protocols {
                    body.put_u8(p.len() as u8);
                    body.put_slice(p.as_bytes());
                }
            }
            Extension::StatusRequest => {
                body.put_u8(1); // ocsp
                body.put_u16(0); // responder id list
                body.put_u16(0); // request extensions
            }
            Extension::SignatureAlgorithms(algs) => {
                body.put_u16(algs.len() as u16 * 2);
                for a in algs {
                    body.put_u16(*a);
                }
            }
            Extension::KeyShare(entries) => {
                let shares_len: usize = entries.iter().map(|e| 4 + e.data.len()).sum();
                body.put_u16(shares_len as u16);
                for e in entries {
                    body.put_u16(e.group);
                    body.put_u16(e.data.len() as u16);
                    body.put_slice(&e.data);
                }
            }
            Extension::PskKeyExchangeModes(modes) => {
                body.put_u8(modes.len() as u8);
                body.put_slice(modes);
            }
            Extension::SupportedVersions(versions) => {
                body.put_u8(versions.len() as u8 * 2);
                for v in versions {
                    body.put_u16(*v);
                }
            }
            Extension::CompressCertificate(algs) => {
                body.put_u8(algs.len() as u8 * 2);
                for a in algs {
                    body.put_u16(*a);
                }
            }
            Extension::Padding(len) => body.put_bytes(0, *len),
        }
        out.put_u16(self.ext_type());
        out.put_u16(body.len() as u16);
        out.put_slice(&body);
    }
}

/// In-memory ClientHello, serialized only after the overrides are applied.
struct ClientHello {
    legacy_version: u16,
    random: [u8; 32],
    session_id: Vec<u8>,
    cipher_suites: Vec<u16>,
    compression_methods: Vec<u8>,
    extensions: Vec<Extension>,
}

impl ClientHello {
    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(512);
        buf.put_u16(self.legacy_version);
        buf.put_slice(&self.random);
        buf.put_u8(self.session_id.len() as u8);
        buf.put_slice(&self.session_id);
        buf.put_u16(self.cipher_suites.len() as u16 * 2);
        for cs in &self.cipher_suites {
            buf.put_u16(*cs);
        }
        buf.put_u8(self.compression_methods.len() as u8);
        buf.put_slice(&self.compression_methods);

        let mut ext = BytesMut::new();
        for e in &self.extensions {
            e.encode(&mut ext);
        }
        buf.put_u16(ext.len() as u16);
        buf.put_slice(&ext);
        buf.to_vec()
    }

    /// Full handshake message: type byte, u24 length, body.
    fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let mut msg = BytesMut::with_capacity(4 + body.len());
        msg.put_u8(HANDSHAKE_CLIENT_HELLO);
        msg.put_uint(body.len() as u64, 3);
        msg.put_slice(&body);
        msg.to_vec()
    }
}

/// Fabricate the on-wire ClientHello for `browser`, with the three
/// secret-carrying fields overwritten from `fields`.
///
/// The fabricator never generates its own client random: an unrelated
/// random would not match the embedded payload and would stand out against
/// the session ID and key share it must pair with. The key-share overwrite
/// walks the extension list structurally, since extension ordering differs per
/// profile, so no fixed offset is assumed.
pub fn build(browser: Browser, fields: &ClientHelloFields) -> Result<Vec<u8>> {
    if fields.server_name.is_empty() {
        return Err(Error::fabrication("disguise server name is empty"));
    }

    let mut hello = template(browser, &fields.server_name);

    hello.random = fields.random;

    hello.session_id.resize(32, 0);
    hello.session_id.copy_from_slice(&fields.session_id);

    let mut overwritten = false;
    for ext in &mut hello.extensions {
        if let Extension::KeyShare(entries) = ext {
            for entry in entries.iter_mut() {
                if entry.group == GROUP_X25519 {
                    entry.data = fields.x25519_key_share.to_vec();
                    overwritten = true;
                }
            }
        }
    }
    if !overwritten {
        // A profile table without an X25519 share is a defect in this
        // crate, not a condition the caller can recover from.
        return Err(Error::fabrication(format!(
            "profile {browser} offers no X25519 key share"
        )));
    }

    Ok(hello.serialize())
}

fn template(browser: Browser, server_name: &str) -> ClientHello {
    match browser {
        Browser::Chrome => chrome_template(server_name),
        Browser::Firefox => firefox_template(server_name),
        Browser::Safari => safari_template(server_name),
    }
}

/// Placeholder X25519 share; always overwritten by `build`.
fn x25519_placeholder() -> KeyShareEntry {
    KeyShareEntry {
        group: GROUP_X25519,
        data: vec![0; 32],
    }
}

fn chrome_template(server_name: &str) -> ClientHello {
    let mut hello = ClientHello {
        legacy_version: 0x0303,
        random: [0; 32],
        session_id: vec![0; 32],
        cipher_suites: vec![
            GREASE_1, 0x1301, 0x1302, 0x1303, 0xc02b, 0xc02f, 0xc02c, 0xc030, 0xcca9, 0xcca8,
            0xc013, 0xc014, 0x009c, 0x009d, 0x002f, 0x0035,
        ],
        compression_methods: vec![0],
        extensions: vec![
            Extension::Grease { id: GREASE_1, body: &[] },
            Extension::ServerName(server_name.to_string()),
            Extension::ExtendedMasterSecret,
            Extension::RenegotiationInfo,
            Extension::SupportedGroups(vec![
                GREASE_1,
                GROUP_X25519,
                GROUP_SECP256R1,
                GROUP_SECP384R1,
            ]),
            Extension::EcPointFormats(vec![0]),
            Extension::SessionTicket,
            Extension::Alpn(vec!["h2", "http/1.1"]),
            Extension::StatusRequest,
            Extension::SignatureAlgorithms(vec![
                0x0403, 0x0804, 0x0401, 0x0503, 0x0805, 0x0501, 0x0806, 0x0601,
            ]),
            Extension::SignedCertTimestamp,
            Extension::KeyShare(vec![
                KeyShareEntry { group: GREASE_1, data: vec![0] },
                x25519_placeholder(),
            ]),
            Extension::PskKeyExchangeModes(vec![1]),
            Extension::SupportedVersions(vec![GREASE_1, 0x0304, 0x0303]),
            Extension::CompressCertificate(vec![0x0002]),
            Extension::Grease { id: GREASE_2, body: &[0] },
        ],
    };

    // Chrome pads the hello body out to 512 bytes, boring style.
    let unpadded = hello.serialize_body().len();
    let pad = 512usize.saturating_sub(unpadded + 4);
    hello.extensions.push(Extension::Padding(pad));
    hello
}

fn firefox_template(server_name: &str) -> ClientHello {
    ClientHello {
        legacy_version: 0x0303,
        random: [0; 32],
        session_id: vec![0; 32],
        cipher_suites: vec![
            0x1301, 0x1303, 0x1302, 0xc02b, 0xc02f, 0xcca9, 0xcca8, 0xc02c, 0xc030, 0xc00a,
            0xc009, 0xc013, 0xc014,
        ],
        compression_methods: vec![0],
        extensions: vec![
            Extension::ServerName(server_name.to_string()),
            Extension::ExtendedMasterSecret,
            Extension::SupportedVersions(vec![0x0304, 0x0303]),
            Extension::SupportedGroups(vec![
                GROUP_X25519,
                GROUP_SECP256R1,
                GROUP_SECP384R1,
                GROUP_SECP521R1,
            ]),
            Extension::EcPointFormats(vec![0]),
            Extension::SessionTicket,
            Extension::Alpn(vec!["h2", "http/1.1"]),
            Extension::StatusRequest,
            Extension::SignatureAlgorithms(vec![
                0x0403, 0x0503, 0x0603, 0x0804, 0x0805, 0x0806, 0x0401, 0x0501, 0x0601, 0x0203,
                0x0201,
            ]),
            // Firefox offers a second share for P-256 alongside X25519.
            Extension::KeyShare(vec![
                x25519_placeholder(),
                KeyShareEntry { group: GROUP_SECP256R1, data: vec![0; 65] },
            ]),
            Extension::PskKeyExchangeModes(vec![1]),
        ],
    }
}

fn safari_template(server_name: &str) -> ClientHello {
    ClientHello {
        legacy_version: 0x0303,
        random: [0; 32],
        session_id: vec![0; 32],
        cipher_suites: vec![
            0x1301, 0x1302, 0x1303, 0xc02c, 0xc02b, 0xcca9, 0xc030, 0xc02f, 0xcca8, 0xc024,
            0xc023, 0xc00a, 0xc009, 0xc028, 0xc027, 0xc014, 0xc013,
        ],
        compression_methods: vec![0],
        extensions: vec![
            Extension::ServerName(server_name.to_string()),
            Extension::ExtendedMasterSecret,
            Extension::RenegotiationInfo,
            Extension::SupportedGroups(vec![
                GROUP_X25519,
                GROUP_SECP256R1,
                GROUP_SECP384R1,
                GROUP_SECP521R1,
            ]),
            Extension::EcPointFormats(vec![0]),
            Extension::Alpn(vec!["h2", "http/1.1"]),
            Extension::StatusRequest,
            Extension::SignatureAlgorithms(vec![
                0x0403, 0x0804, 0x0401, 0x0503, 0x0805, 0x0501, 0x0806, 0x0601, 0x0201,
            ]),
            Extension::SignedCertTimestamp,
            Extension::KeyShare(vec![x25519_placeholder()]),
            Extension::PskKeyExchangeModes(vec![1]),
            Extension::SupportedVersions(vec![0x0304, 0x0303]),
        ],
    }
}
