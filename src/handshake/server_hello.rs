//! `ServerHello` serialization (server) and parsing (client).
//!
//! # References
//!
//! * [RFC 8446 Section 4.1.3](https://datatracker.ietf.org/doc/html/rfc8446#section-4.1.3)
//!
//! ```text
//! struct {
//!     ProtocolVersion legacy_version = 0x0303;
//!     Random random;
//!     opaque legacy_session_id_echo<0..32>;
//!     CipherSuite cipher_suite;
//!     uint8 legacy_compression_method = 0;
//!     Extension extensions<6..2^16-1>;
//! } ServerHello;
//! ```
//!
//! A `ServerHello` whose `random` equals the special `HelloRetryRequest`
//! value (RFC 8446 §4.1.3) is rejected outright: cookie-based retry is out
//! of scope (`spec.md` §9 Open Question, resolved against support).

use super::{HandshakeHeader, HandshakeType};
use crate::alert::AlertDescription;
use crate::cipher_suites::CipherSuite;
use crate::extension::{ExtensionType, NamedGroup};
use crate::reader::Reader;

/// RFC 8446 §4.1.3: `SHA-256("HelloRetryRequest")`.
const HELLO_RETRY_REQUEST_RANDOM: [u8; 32] = [
    0xCF, 0x21, 0xAD, 0x74, 0xE5, 0x9A, 0x61, 0x11, 0xBE, 0x1D, 0x8C, 0x02, 0x1E, 0x65, 0xB8, 0x91, 0xC2, 0xA2, 0x11,
    0x16, 0x7A, 0xBB, 0x8C, 0x5E, 0x07, 0x9E, 0x09, 0xE2, 0xC8, 0xA8, 0x33, 0x9C,
];

/// Builds a full `ServerHello` handshake message (header + body) selecting
/// `suite` and echoing a `key_share` for `group`.
pub(crate) fn ser(random: &[u8; 32], suite: CipherSuite, group: NamedGroup, key_share: &[u8]) -> Vec<u8> {
    let mut extensions = Vec::new();

    extensions.extend_from_slice(&u16::from(ExtensionType::SupportedVersions).to_be_bytes());
    extensions.extend_from_slice(&2u16.to_be_bytes());
    extensions.extend_from_slice(&0x0304u16.to_be_bytes());

    {
        let mut data = Vec::new();
        data.extend_from_slice(&u16::from(group).to_be_bytes());
        data.extend_from_slice(&(key_share.len() as u16).to_be_bytes());
        data.extend_from_slice(key_share);

        extensions.extend_from_slice(&u16::from(ExtensionType::KeyShare).to_be_bytes());
        extensions.extend_from_slice(&(data.len() as u16).to_be_bytes());
        extensions.extend_from_slice(&data);
    }

    let mut body = Vec::new();
    body.extend_from_slice(&0x0303u16.to_be_bytes());
    body.extend_from_slice(random);
    body.push(0); // legacy_session_id_echo: empty
    body.extend_from_slice(&<[u8; 2]>::from(suite));
    body.push(0); // legacy_compression_method
    body.extend_from_slice(&(extensions.len() as u16).to_be_bytes());
    body.extend_from_slice(&extensions);

    let header = HandshakeHeader::ser(HandshakeType::ServerHello, body.len() as u32);
    let mut msg = Vec::with_capacity(HandshakeHeader::LEN + body.len());
    msg.extend_from_slice(header.as_bytes());
    msg.extend_from_slice(&body);
    msg
}

pub(crate) struct ParsedServerHello<'a> {
    pub(crate) cipher_suite: CipherSuite,
    pub(crate) key_share: (NamedGroup, &'a [u8]),
}

pub(crate) fn deser(body: &[u8]) -> Result<ParsedServerHello<'_>, AlertDescription> {
    let mut r = Reader::new(body);

    let _legacy_version = r.next_u16()?;
    let random: [u8; 32] = r.next_n()?;
    if random == HELLO_RETRY_REQUEST_RANDOM {
        return Err(AlertDescription::UnexpectedMessage);
    }

    let session_id_len = r.next_u8()? as usize;
    r.skip_n(session_id_len)?;

    let suite_bytes: [u8; 2] = r.next_n()?;
    let cipher_suite = CipherSuite::try_from(suite_bytes).map_err(|_| AlertDescription::IllegalParameter)?;

    let _legacy_compression_method = r.next_u8()?;

    let extensions_len = r.next_u16()? as usize;
    let extensions = r.read_slice(extensions_len)?;
    let mut ext_reader = Reader::new(extensions);

    let mut key_share = None;
    while !ext_reader.is_empty() {
        let ext_type = ext_reader.next_u16()?;
        let ext_len = ext_reader.next_u16()? as usize;
        let ext_data = ext_reader.read_slice(ext_len)?;

        if ext_type == u16::from(ExtensionType::KeyShare) {
            let mut kr = Reader::new(ext_data);
            let group_raw = kr.next_u16()?;
            let key_len = kr.next_u16()? as usize;
            let key = kr.read_slice(key_len)?;
            let group = NamedGroup::try_from(group_raw).map_err(|_| AlertDescription::IllegalParameter)?;
            key_share = Some((group, key));
        }
    }

    let key_share = key_share.ok_or(AlertDescription::MissingExtension)?;

    Ok(ParsedServerHello { cipher_suite, key_share })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_suite_and_key_share() {
        let random = [0x22u8; 32];
        let key = [0xBBu8; 65];
        let msg = ser(&random, CipherSuite::TLS_AES_256_GCM_SHA384, NamedGroup::Secp256r1, &key);

        let parsed = deser(&msg[HandshakeHeader::LEN..]).unwrap();
        assert_eq!(parsed.cipher_suite, CipherSuite::TLS_AES_256_GCM_SHA384);
        assert_eq!(parsed.key_share, (NamedGroup::Secp256r1, &key[..]));
    }

    #[test]
    fn rejects_hello_retry_request_sentinel() {
        let key = [0u8; 32];
        let msg = ser(&HELLO_RETRY_REQUEST_RANDOM, CipherSuite::TLS_AES_128_GCM_SHA256, NamedGroup::X25519, &key);
        let result = deser(&msg[HandshakeHeader::LEN..]);
        assert_eq!(result.err(), Some(AlertDescription::UnexpectedMessage));
    }
}
