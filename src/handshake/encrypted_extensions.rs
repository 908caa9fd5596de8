//! `EncryptedExtensions` serialization (server) and parsing (client).
//!
//! # References
//!
//! * [RFC 8446 Section 4.3.1](https://datatracker.ietf.org/doc/html/rfc8446#section-4.3.1)
//!
//! ```text
//! struct {
//!     Extension extensions<0..2^16-1>;
//! } EncryptedExtensions;
//! ```
//!
//! No extension this core negotiates belongs here: ALPN, max fragment
//! length and the rest of the encrypted-extensions grab-bag are out of
//! scope, so the server always sends (and the client always accepts) an
//! empty extension list.

use super::{HandshakeHeader, HandshakeType};
use crate::alert::AlertDescription;
use crate::reader::Reader;

/// Builds a full `EncryptedExtensions` handshake message (header + body)
/// with an empty extension list.
pub(crate) fn ser() -> Vec<u8> {
    let body = 0u16.to_be_bytes().to_vec();
    let header = HandshakeHeader::ser(HandshakeType::EncryptedExtensions, body.len() as u32);
    let mut msg = Vec::with_capacity(HandshakeHeader::LEN + body.len());
    msg.extend_from_slice(header.as_bytes());
    msg.extend_from_slice(&body);
    msg
}

/// Parses `EncryptedExtensions`. Every listed extension is skipped
/// unexamined: this core negotiates nothing beyond what `ServerHello`
/// already settled.
pub(crate) fn deser(body: &[u8]) -> Result<(), AlertDescription> {
    let mut r = Reader::new(body);
    let extensions_len = r.next_u16()? as usize;
    r.skip_n(extensions_len)?;
    Ok(())
}
