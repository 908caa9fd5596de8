//! `ClientHello` serialization (client) and parsing (server).
//!
//! # References
//!
//! * [RFC 8446 Section 4.1.2](https://datatracker.ietf.org/doc/html/rfc8446#section-4.1.2)
//!
//! ```text
//! struct {
//!     ProtocolVersion legacy_version = 0x0303;
//!     Random random;
//!     opaque legacy_session_id<0..32>;
//!     CipherSuite cipher_suites<2..2^16-2>;
//!     opaque legacy_compression_methods<1..2^8-1>;
//!     Extension extensions<8..2^16-1>;
//! } ClientHello;
//! ```
//!
//! PSK identities and binders (RFC 8446 §4.2.11) are not offered: session
//! resumption and 0-RTT are out of scope (`spec.md` Non-goals).

use super::{HandshakeHeader, HandshakeType};
use crate::alert::AlertDescription;
use crate::cipher_suites::CipherSuite;
use crate::extension::{ExtensionType, NamedGroup, SignatureScheme};
use crate::reader::Reader;

fn write_u16_len_prefixed(out: &mut Vec<u8>, body: &[u8]) {
    out.extend_from_slice(&(body.len() as u16).to_be_bytes());
    out.extend_from_slice(body);
}

fn write_extension(out: &mut Vec<u8>, ty: ExtensionType, data: &[u8]) {
    out.extend_from_slice(&u16::from(ty).to_be_bytes());
    write_u16_len_prefixed(out, data);
}

/// Builds a full `ClientHello` handshake message (header + body). The
/// caller retains the returned bytes: the transcript hash cannot start
/// until the cipher suite is chosen by `ServerHello` (`spec.md` §4.6).
pub(crate) fn ser(
    random: &[u8; 32],
    cipher_suites: &[CipherSuite],
    key_shares: &[(NamedGroup, &[u8])],
    server_name: Option<&str>,
) -> Vec<u8> {
    let mut extensions = Vec::new();

    {
        let mut data = vec![2u8];
        data.extend_from_slice(&0x0304u16.to_be_bytes());
        write_extension(&mut extensions, ExtensionType::SupportedVersions, &data);
    }

    {
        let mut list = Vec::new();
        for (group, _) in key_shares {
            list.extend_from_slice(&u16::from(*group).to_be_bytes());
        }
        let mut data = Vec::new();
        write_u16_len_prefixed(&mut data, &list);
        write_extension(&mut extensions, ExtensionType::SupportedGroups, &data);
    }

    {
        let mut list = Vec::new();
        for (group, public) in key_shares {
            list.extend_from_slice(&u16::from(*group).to_be_bytes());
            write_u16_len_prefixed(&mut list, public);
        }
        let mut data = Vec::new();
        write_u16_len_prefixed(&mut data, &list);
        write_extension(&mut extensions, ExtensionType::KeyShare, &data);
    }

    {
        let mut list = Vec::new();
        for scheme in SignatureScheme::ALL {
            list.extend_from_slice(&u16::from(scheme).to_be_bytes());
        }
        let mut data = Vec::new();
        write_u16_len_prefixed(&mut data, &list);
        write_extension(&mut extensions, ExtensionType::SignatureAlgorithms, &data);
    }

    if let Some(name) = server_name {
        let mut name_list = vec![0u8];
        write_u16_len_prefixed(&mut name_list, name.as_bytes());
        let mut data = Vec::new();
        write_u16_len_prefixed(&mut data, &name_list);
        write_extension(&mut extensions, ExtensionType::ServerName, &data);
    }

    let mut suites = Vec::new();
    for suite in cipher_suites {
        suites.extend_from_slice(&<[u8; 2]>::from(*suite));
    }

    let mut body = Vec::new();
    body.extend_from_slice(&0x0303u16.to_be_bytes());
    body.extend_from_slice(random);
    body.push(0); // legacy_session_id: empty
    write_u16_len_prefixed(&mut body, &suites);
    body.extend_from_slice(&[1, 0]); // legacy_compression_methods: [null]
    write_u16_len_prefixed(&mut body, &extensions);

    let header = HandshakeHeader::ser(HandshakeType::ClientHello, body.len() as u32);
    let mut msg = Vec::with_capacity(HandshakeHeader::LEN + body.len());
    msg.extend_from_slice(header.as_bytes());
    msg.extend_from_slice(&body);
    msg
}

/// The fields a server needs out of a `ClientHello`, borrowed from the
/// message body.
pub(crate) struct ParsedClientHello<'a> {
    pub(crate) cipher_suites: Vec<CipherSuite>,
    pub(crate) key_shares: Vec<(NamedGroup, &'a [u8])>,
    pub(crate) signature_schemes: Vec<SignatureScheme>,
    pub(crate) server_name: Option<&'a str>,
}

pub(crate) fn deser(body: &[u8]) -> Result<ParsedClientHello<'_>, AlertDescription> {
    let mut r = Reader::new(body);

    let _legacy_version = r.next_u16()?;
    let _random: [u8; 32] = r.next_n()?;

    let session_id_len = r.next_u8()? as usize;
    r.skip_n(session_id_len)?;

    let suites_len = r.next_u16()? as usize;
    let suites_bytes = r.read_slice(suites_len)?;
    let cipher_suites: Vec<CipherSuite> = suites_bytes
        .chunks_exact(2)
        .filter_map(|c| CipherSuite::try_from([c[0], c[1]]).ok())
        .collect();

    let compression_len = r.next_u8()? as usize;
    r.skip_n(compression_len)?;

    let extensions_len = r.next_u16()? as usize;
    let extensions = r.read_slice(extensions_len)?;
    let mut ext_reader = Reader::new(extensions);

    let mut key_shares = Vec::new();
    let mut signature_schemes = Vec::new();
    let mut server_name = None;

    while !ext_reader.is_empty() {
        let ext_type = ext_reader.next_u16()?;
        let ext_len = ext_reader.next_u16()? as usize;
        let ext_data = ext_reader.read_slice(ext_len)?;

        match ExtensionType::try_from(ext_type) {
            Ok(ExtensionType::KeyShare) => {
                let mut kr = Reader::new(ext_data);
                let list_len = kr.next_u16()? as usize;
                let list = kr.read_slice(list_len)?;
                let mut lr = Reader::new(list);
                while !lr.is_empty() {
                    let group_raw = lr.next_u16()?;
                    let key_len = lr.next_u16()? as usize;
                    let key = lr.read_slice(key_len)?;
                    if let Ok(group) = NamedGroup::try_from(group_raw) {
                        key_shares.push((group, key));
                    }
                }
            }
            Ok(ExtensionType::SignatureAlgorithms) => {
                let mut sr = Reader::new(ext_data);
                let list_len = sr.next_u16()? as usize;
                let list = sr.read_slice(list_len)?;
                for raw in list.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])) {
                    if let Ok(scheme) = SignatureScheme::try_from(raw) {
                        signature_schemes.push(scheme);
                    }
                }
            }
            Ok(ExtensionType::ServerName) => {
                let mut sr = Reader::new(ext_data);
                let _list_len = sr.next_u16()?;
                if !sr.is_empty() {
                    let name_type = sr.next_u8()?;
                    if name_type == 0 {
                        let name_len = sr.next_u16()? as usize;
                        let name_bytes = sr.read_slice(name_len)?;
                        server_name = core::str::from_utf8(name_bytes).ok();
                    }
                }
            }
            _ => {}
        }
    }

    Ok(ParsedClientHello {
        cipher_suites,
        key_shares,
        signature_schemes,
        server_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_suites_key_share_and_server_name() {
        let random = [0x11u8; 32];
        let suites = [CipherSuite::TLS_AES_128_GCM_SHA256, CipherSuite::TLS_CHACHA20_POLY1305_SHA256];
        let key = [0xAAu8; 32];
        let key_shares = [(NamedGroup::X25519, &key[..])];
        let msg = ser(&random, &suites, &key_shares, Some("example.com"));

        let parsed = deser(&msg[HandshakeHeader::LEN..]).unwrap();
        assert_eq!(parsed.cipher_suites, suites);
        assert_eq!(parsed.key_shares, vec![(NamedGroup::X25519, &key[..])]);
        assert_eq!(parsed.server_name, Some("example.com"));
        assert!(parsed.signature_schemes.contains(&SignatureScheme::Ed25519));
    }

    #[test]
    fn omits_server_name_extension_when_none_given() {
        let random = [0u8; 32];
        let suites = [CipherSuite::TLS_AES_128_GCM_SHA256];
        let key = [0u8; 32];
        let key_shares = [(NamedGroup::X25519, &key[..])];
        let msg = ser(&random, &suites, &key_shares, None);
        let parsed = deser(&msg[HandshakeHeader::LEN..]).unwrap();
        assert_eq!(parsed.server_name, None);
    }
}
