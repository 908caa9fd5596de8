//! `CertificateVerify` serialization/parsing and the RFC 8446 §4.4.3
//! signing-payload construction.
//!
//! # References
//!
//! * [RFC 8446 Section 4.4.3](https://datatracker.ietf.org/doc/html/rfc8446#section-4.4.3)
//!
//! ```text
//! struct {
//!     SignatureScheme algorithm;
//!     opaque signature<0..2^16-1>;
//! } CertificateVerify;
//! ```

use super::{HandshakeHeader, HandshakeType};
use crate::alert::AlertDescription;
use crate::extension::SignatureScheme;
use crate::reader::Reader;

const SERVER_CONTEXT: &[u8] = b"TLS 1.3, server CertificateVerify";
const CLIENT_CONTEXT: &[u8] = b"TLS 1.3, client CertificateVerify";

/// Builds the content that is actually signed/verified: 64 spaces, a
/// direction-specific context string, a zero byte, then the transcript
/// hash snapshot taken up to (but not including) this message.
pub(crate) fn signing_payload(is_server: bool, transcript_hash: &[u8]) -> Vec<u8> {
    let context = if is_server { SERVER_CONTEXT } else { CLIENT_CONTEXT };
    let mut payload = Vec::with_capacity(64 + context.len() + 1 + transcript_hash.len());
    payload.extend(core::iter::repeat(0x20u8).take(64));
    payload.extend_from_slice(context);
    payload.push(0x00);
    payload.extend_from_slice(transcript_hash);
    payload
}

/// Builds a full `CertificateVerify` handshake message (header + body).
pub(crate) fn ser(scheme: SignatureScheme, signature: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(4 + signature.len());
    body.extend_from_slice(&u16::from(scheme).to_be_bytes());
    body.extend_from_slice(&(signature.len() as u16).to_be_bytes());
    body.extend_from_slice(signature);

    let header = HandshakeHeader::ser(HandshakeType::CertificateVerify, body.len() as u32);
    let mut msg = Vec::with_capacity(HandshakeHeader::LEN + body.len());
    msg.extend_from_slice(header.as_bytes());
    msg.extend_from_slice(&body);
    msg
}

pub(crate) fn deser(body: &[u8]) -> Result<(SignatureScheme, &[u8]), AlertDescription> {
    let mut r = Reader::new(body);
    let scheme_raw = r.next_u16()?;
    let scheme = SignatureScheme::try_from(scheme_raw).map_err(|_| AlertDescription::IllegalParameter)?;
    let sig_len = r.next_u16()? as usize;
    let signature = r.read_slice(sig_len)?;
    Ok((scheme, signature))
}
