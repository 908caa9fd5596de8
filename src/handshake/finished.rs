//! `Finished` serialization and verification.
//!
//! # References
//!
//! * [RFC 8446 Section 4.4.4](https://datatracker.ietf.org/doc/html/rfc8446#section-4.4.4)
//!
//! ```text
//! struct {
//!     opaque verify_data[Hash.length];
//! } Finished;
//! ```
//!
//! `verify_data` is `HMAC(finished_key, Transcript-Hash(...))`
//! ([`crate::key_schedule::finished_verify_data`]); its length tracks the
//! negotiated hash (32 bytes for SHA-256, 48 for SHA-384) rather than the
//! teacher's SHA-256-only `[u8; 36]`.

use super::{HandshakeHeader, HandshakeType};
use crate::alert::AlertDescription;
use subtle::ConstantTimeEq;

/// Builds a full `Finished` handshake message (header + body) from
/// already-computed `verify_data`.
pub(crate) fn ser(verify_data: &[u8]) -> Vec<u8> {
    let header = HandshakeHeader::ser(HandshakeType::Finished, verify_data.len() as u32);
    let mut msg = Vec::with_capacity(HandshakeHeader::LEN + verify_data.len());
    msg.extend_from_slice(header.as_bytes());
    msg.extend_from_slice(verify_data);
    msg
}

/// Compares a peer's `Finished` body against the locally-computed
/// `verify_data` in constant time, per RFC 8446 §4.4.4 ("a MAC ... must be
/// verified").
pub(crate) fn verify(body: &[u8], expected: &[u8]) -> Result<(), AlertDescription> {
    if body.len() != expected.len() {
        return Err(AlertDescription::DecodeError);
    }
    if body.ct_eq(expected).into() {
        Ok(())
    } else {
        Err(AlertDescription::DecryptError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_matching_data() {
        let verify_data = [0x5Au8; 32];
        let msg = ser(&verify_data);
        assert!(verify(&msg[HandshakeHeader::LEN..], &verify_data).is_ok());
    }

    #[test]
    fn verify_rejects_tampered_data() {
        let verify_data = [0x5Au8; 32];
        let mut msg = ser(&verify_data);
        *msg.last_mut().unwrap() ^= 0xFF;
        assert_eq!(
            verify(&msg[HandshakeHeader::LEN..], &verify_data),
            Err(AlertDescription::DecryptError)
        );
    }

    #[test]
    fn verify_rejects_wrong_length() {
        let verify_data = [0x5Au8; 32];
        assert_eq!(verify(&verify_data[..31], &verify_data), Err(AlertDescription::DecodeError));
    }
}
