//! The TLS record layer: framing, content-type multiplexing, and per-epoch
//! AEAD protection.
//!
//! # References
//!
//! * [RFC 8446 Section 5](https://datatracker.ietf.org/doc/html/rfc8446#section-5)
//! * `spec.md` §4.5 "Record layer"

use crate::alert::AlertDescription;
use crate::buffer::Buffer;
use crate::error::Error;
use crate::provider::aead::AeadContext;

/// The largest plaintext payload a single record may carry before the
/// sender must fragment (`spec.md` §4.5, §8 boundary behavior).
pub(crate) const MAX_FRAGMENT_LEN: usize = 1 << 14;

/// Content Type.
///
/// # References
///
/// * [RFC 8446 Section 5.1](https://datatracker.ietf.org/doc/html/rfc8446#section-5.1)
///
/// ```text
/// enum {
///     invalid(0),
///     change_cipher_spec(20),
///     alert(21),
///     handshake(22),
///     application_data(23),
///     (255)
/// } ContentType;
/// ```
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub(crate) enum ContentType {
    ChangeCipherSpec = 20,
    Alert = 21,
    Handshake = 22,
    ApplicationData = 23,
}

impl From<ContentType> for u8 {
    #[inline]
    fn from(content_type: ContentType) -> Self {
        content_type as u8
    }
}

impl TryFrom<u8> for ContentType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            x if x == (Self::ChangeCipherSpec as u8) => Ok(Self::ChangeCipherSpec),
            x if x == (Self::Alert as u8) => Ok(Self::Alert),
            x if x == (Self::Handshake as u8) => Ok(Self::Handshake),
            x if x == (Self::ApplicationData as u8) => Ok(Self::ApplicationData),
            _ => Err(value),
        }
    }
}

/// The legacy on-the-wire version field. Every record this crate emits
/// carries `V1_2`; `V1_3` only ever appears inside `supported_versions`.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TlsVersion {
    V1_2 = 0x0303,
    V1_3 = 0x0304,
}

impl From<TlsVersion> for u16 {
    #[inline]
    fn from(tls_version: TlsVersion) -> Self {
        tls_version as u16
    }
}

impl TlsVersion {
    pub(crate) const fn msb(self) -> u8 {
        ((self as u16) >> 8) as u8
    }

    pub(crate) const fn lsb(self) -> u8 {
        self as u8
    }
}

/// # References
///
/// * [RFC 8446 Appendix B.1](https://datatracker.ietf.org/doc/html/rfc8446#appendix-B.1)
///
/// ```text
/// struct {
///     ContentType type;
///     ProtocolVersion legacy_record_version;
///     uint16 length;
///     opaque fragment[TLSPlaintext.length];
/// } TLSPlaintext;
/// ```
pub(crate) struct RecordHeader {
    buf: [u8; Self::LEN],
}

impl RecordHeader {
    pub(crate) const LEN: usize = 5;

    pub(crate) fn content_type(&self) -> ContentType {
        // validated in constructor - will never panic
        ContentType::try_from(self.buf[0]).unwrap()
    }

    pub(crate) fn length(&self) -> u16 {
        u16::from_be_bytes(self.buf[3..5].try_into().unwrap())
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 5] {
        &self.buf
    }

    /// Serializes a header. The legacy version is always emitted as
    /// `0x0303`, the "open question" resolution `spec.md` §9 recommends.
    pub(crate) fn ser(content_type: ContentType, data_len: u16) -> Self {
        RecordHeader {
            buf: [
                content_type.into(),
                TlsVersion::V1_2.msb(),
                TlsVersion::V1_2.lsb(),
                (data_len >> 8) as u8,
                data_len as u8,
            ],
        }
    }

    pub(crate) fn deser(buf: [u8; 5]) -> Result<Self, AlertDescription> {
        if let Err(content_type) = ContentType::try_from(buf[0]) {
            error!("invalid ContentType value: 0x{:02X}", content_type);
            return Err(AlertDescription::IllegalParameter);
        }

        // https://www.rfc-editor.org/rfc/rfc8446#appendix-D
        // legacy_record_version MUST be ignored by all implementations.
        Ok(Self { buf })
    }
}

/// The result of feeding bytes to [`RecordLayer::open`].
pub(crate) enum ReceiveOutcome {
    /// Fewer than a full record's worth of bytes were available.
    NeedMore,
    /// A full record was consumed but carries nothing for the caller (an
    /// unencrypted `change_cipher_spec`, per `spec.md` §4.5/§8).
    Ignored { consumed: usize },
    /// A full record was consumed and decrypted/parsed.
    Record(OpenedRecord),
}

pub(crate) struct OpenedRecord {
    pub(crate) consumed: usize,
    pub(crate) content_type: ContentType,
    pub(crate) plaintext: Vec<u8>,
}

/// Owns the two AEAD contexts (send, receive) that back the current
/// epoch and performs TLS 1.3 framing and protection around them.
///
/// Before the handshake-traffic epoch is installed both contexts are
/// `None` and records are sent/parsed in the clear, matching the
/// unprotected `ClientHello`/`ServerHello` exchange.
pub(crate) struct RecordLayer {
    send: Option<AeadContext>,
    recv: Option<AeadContext>,
}

impl RecordLayer {
    pub(crate) fn new() -> Self {
        Self {
            send: None,
            recv: None,
        }
    }

    /// Installs a new send-direction epoch, replacing (and, via
    /// [`AeadContext`]'s `Drop`, zeroizing) any previous one. Sequence
    /// numbers start at zero under the new key (`spec.md` §4.5 "Epochs").
    pub(crate) fn install_send(&mut self, ctx: AeadContext) {
        self.send = Some(ctx);
    }

    /// Installs a new receive-direction epoch.
    pub(crate) fn install_recv(&mut self, ctx: AeadContext) {
        self.recv = Some(ctx);
    }

    /// Frames (and, once an epoch is installed, encrypts) `plaintext` as
    /// one or more records of content type `content_type`, appending the
    /// wire bytes to `out`. Fragments at [`MAX_FRAGMENT_LEN`].
    pub(crate) fn seal(&mut self, content_type: ContentType, plaintext: &[u8], out: &mut Buffer) -> Result<(), Error> {
        for chunk in plaintext.chunks(MAX_FRAGMENT_LEN) {
            match &mut self.send {
                None => {
                    let header = RecordHeader::ser(content_type, chunk.len() as u16);
                    out.append(header.as_bytes())?;
                    out.append(chunk)?;
                }
                Some(ctx) => {
                    let mut body = Vec::with_capacity(chunk.len() + 1);
                    body.extend_from_slice(chunk);
                    body.push(content_type.into());
                    let record_len = (body.len() + ctx.algorithm().tag_size()) as u16;
                    let header = RecordHeader::ser(ContentType::ApplicationData, record_len);
                    ctx.seal(&mut body, header.as_bytes())?;
                    out.append(header.as_bytes())?;
                    out.append(&body)?;
                }
            }
            trace!("sent record: type={:?} len={}", content_type, chunk.len());
        }
        Ok(())
    }

    /// Parses and, if an epoch is installed, decrypts a single record
    /// from the front of `input`. Returns [`ReceiveOutcome::NeedMore`]
    /// without consuming anything if `input` does not yet hold a full
    /// record (`spec.md` §8 "handshake called with a partial ServerHello").
    pub(crate) fn open(&mut self, input: &[u8]) -> Result<ReceiveOutcome, Error> {
        if input.len() < RecordHeader::LEN {
            return Ok(ReceiveOutcome::NeedMore);
        }
        let mut header_buf = [0u8; RecordHeader::LEN];
        header_buf.copy_from_slice(&input[..RecordHeader::LEN]);
        let header = RecordHeader::deser(header_buf)?;

        let total = RecordHeader::LEN + header.length() as usize;
        if input.len() < total {
            return Ok(ReceiveOutcome::NeedMore);
        }
        let body = &input[RecordHeader::LEN..total];

        // TLS 1.3 middlebox compatibility: an unencrypted change_cipher_spec
        // is valid at any point and carries no semantic content.
        if header.content_type() == ContentType::ChangeCipherSpec {
            return Ok(ReceiveOutcome::Ignored { consumed: total });
        }

        match &mut self.recv {
            None => {
                let content_type = header.content_type();
                trace!("received record: type={:?} len={}", content_type, body.len());
                Ok(ReceiveOutcome::Record(OpenedRecord {
                    consumed: total,
                    content_type,
                    plaintext: body.to_vec(),
                }))
            }
            Some(ctx) => {
                let mut buf = body.to_vec();
                ctx.open(&mut buf, header.as_bytes())?;

                // RFC 8446 §5.4: the true content type is the last non-zero
                // byte; any zero bytes before it are padding.
                let mut idx = buf.len();
                loop {
                    if idx == 0 {
                        return Err(Error::decode_error());
                    }
                    idx -= 1;
                    if buf[idx] != 0 {
                        break;
                    }
                }
                let content_type = ContentType::try_from(buf[idx]).map_err(|_| Error::decode_error())?;
                buf.truncate(idx);
                trace!("received record: type={:?} len={}", content_type, buf.len());

                Ok(ReceiveOutcome::Record(OpenedRecord {
                    consumed: total,
                    content_type,
                    plaintext: buf,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = RecordHeader::ser(ContentType::Handshake, 42);
        let parsed = RecordHeader::deser(*header.as_bytes()).unwrap();
        assert_eq!(parsed.content_type(), ContentType::Handshake);
        assert_eq!(parsed.length(), 42);
    }

    #[test]
    fn rejects_unknown_content_type() {
        let buf = [0xFFu8, 0x03, 0x03, 0x00, 0x00];
        assert_eq!(RecordHeader::deser(buf), Err(AlertDescription::IllegalParameter));
    }

    #[test]
    fn plaintext_seal_needs_no_epoch() {
        let mut layer = RecordLayer::new();
        let mut out = Buffer::new();
        layer.seal(ContentType::Handshake, b"hello", &mut out).unwrap();
        assert_eq!(out.as_slice(), &[22, 0x03, 0x03, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn open_reports_need_more_on_short_input() {
        let mut layer = RecordLayer::new();
        let outcome = layer.open(&[22, 0x03, 0x03, 0x00]).unwrap();
        assert!(matches!(outcome, ReceiveOutcome::NeedMore));
    }

    #[test]
    fn unencrypted_change_cipher_spec_is_ignored() {
        let mut layer = RecordLayer::new();
        let outcome = layer.open(&[20, 0x03, 0x03, 0x00, 0x01, 0x01]).unwrap();
        assert!(matches!(outcome, ReceiveOutcome::Ignored { consumed: 6 }));
    }
}
