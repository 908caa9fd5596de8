//! The `Certificate` message wire format, and the host certificate
//! callbacks that supply/validate the chain it carries.
//!
//! # References
//!
//! * [RFC 8446 Section 4.4.2](https://datatracker.ietf.org/doc/html/rfc8446#section-4.4.2)
//!
//! ```text
//! struct {
//!     opaque certificate_request_context<0..2^8-1>;
//!     CertificateEntry certificate_list<0..2^24-1>;
//! } Certificate;
//!
//! struct {
//!     opaque cert_data<1..2^24-1>;
//!     Extension extensions<0..2^16-1>;
//! } CertificateEntry;
//! ```
//!
//! Certificate chain building/validation and private-key signing are
//! external collaborators (`spec.md` §1): this module only encodes the
//! wire message and the shape of the callbacks, never a certificate parser
//! or a signature implementation.

use super::{HandshakeHeader, HandshakeType};
use crate::alert::AlertDescription;
use crate::error::Error;
use crate::extension::SignatureScheme;
use crate::reader::Reader;

/// Builds a full `Certificate` handshake message (header + body) for
/// `chain`, leaf-first, with an empty `certificate_request_context` (no
/// client authentication; `spec.md` Non-goals).
pub(crate) fn ser(chain: &[Vec<u8>]) -> Vec<u8> {
    let mut list = Vec::new();
    for cert in chain {
        list.extend_from_slice(&(cert.len() as u32).to_be_bytes()[1..]);
        list.extend_from_slice(cert);
        list.extend_from_slice(&0u16.to_be_bytes()); // no per-entry extensions
    }

    let mut body = Vec::new();
    body.push(0); // certificate_request_context: empty
    body.extend_from_slice(&(list.len() as u32).to_be_bytes()[1..]);
    body.extend_from_slice(&list);

    let header = HandshakeHeader::ser(HandshakeType::Certificate, body.len() as u32);
    let mut msg = Vec::with_capacity(HandshakeHeader::LEN + body.len());
    msg.extend_from_slice(header.as_bytes());
    msg.extend_from_slice(&body);
    msg
}

/// Parses a `Certificate` message into its chain, leaf-first. Per-entry
/// extensions are skipped unexamined.
pub(crate) fn deser(body: &[u8]) -> Result<Vec<Vec<u8>>, AlertDescription> {
    let mut r = Reader::new(body);

    let context_len = r.next_u8()? as usize;
    r.skip_n(context_len)?;

    let list_len = r.next_u24()? as usize;
    let list = r.read_slice(list_len)?;
    let mut lr = Reader::new(list);

    let mut chain = Vec::new();
    while !lr.is_empty() {
        let cert_len = lr.next_u24()? as usize;
        let cert = lr.read_slice(cert_len)?;
        chain.push(cert.to_vec());

        let ext_len = lr.next_u16()? as usize;
        lr.skip_n(ext_len)?;
    }

    if chain.is_empty() {
        return Err(AlertDescription::DecodeError);
    }
    Ok(chain)
}

/// A callback that is invoked exactly once: either `run`, to perform the
/// deferred cryptographic operation, or `cancel`/drop, to release whatever
/// context it captured without performing it.
///
/// Grounded on `spec.md` §9's "deferred closure with cancellation" note:
/// the engine may need to release a host callback's captured resources
/// without ever calling it, if the handshake aborts between `lookup`/
/// `verify` returning and the signature actually being needed.
pub struct DeferredSign {
    inner: Option<Box<dyn FnOnce(&[u8]) -> Result<Vec<u8>, Error> + Send>>,
}

impl DeferredSign {
    /// Wraps a closure that performs the actual signing; `f` receives the
    /// `CertificateVerify` payload to sign.
    pub fn new(f: impl FnOnce(&[u8]) -> Result<Vec<u8>, Error> + Send + 'static) -> Self {
        Self { inner: Some(Box::new(f)) }
    }

    /// Signs `payload`, consuming the handle.
    pub(crate) fn run(mut self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        (self.inner.take().expect("DeferredSign already consumed"))(payload)
    }

    /// Releases the captured context without signing anything.
    pub fn cancel(mut self) {
        self.inner.take();
    }
}

impl Drop for DeferredSign {
    fn drop(&mut self) {
        self.inner.take();
    }
}

/// The server-side certificate callback: given the client's offered
/// server name and signature algorithms, produce a chain, the scheme it
/// will sign with, and a deferred signer for the `CertificateVerify`
/// payload.
pub trait CertificateResolver: Send + Sync {
    fn lookup(
        &self,
        server_name: Option<&str>,
        signature_schemes: &[SignatureScheme],
    ) -> Result<(Vec<Vec<u8>>, SignatureScheme, DeferredSign), Error>;
}

/// A callback invoked exactly once with the signing payload and signature
/// bytes to verify, or with both empty to release captured context
/// without verifying (mirrors [`DeferredSign`]'s contract).
pub struct DeferredVerify {
    inner: Option<Box<dyn FnOnce(&[u8], &[u8]) -> Result<(), Error> + Send>>,
}

impl DeferredVerify {
    /// Wraps a closure that performs the actual verification; `f` receives
    /// the signing payload and the peer's signature bytes.
    pub fn new(f: impl FnOnce(&[u8], &[u8]) -> Result<(), Error> + Send + 'static) -> Self {
        Self { inner: Some(Box::new(f)) }
    }

    pub(crate) fn run(mut self, payload: &[u8], signature: &[u8]) -> Result<(), Error> {
        (self.inner.take().expect("DeferredVerify already consumed"))(payload, signature)
    }

    pub fn cancel(mut self) {
        self.inner.take();
    }
}

impl Drop for DeferredVerify {
    fn drop(&mut self) {
        self.inner.take();
    }
}

/// The client-side certificate callback: given the decoded chain,
/// validate it and return a deferred verifier for the `CertificateVerify`
/// signature.
pub trait CertificateVerifier: Send + Sync {
    fn verify(&self, chain: &[Vec<u8>]) -> Result<DeferredVerify, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_multi_entry_chain() {
        let chain = vec![b"leaf cert".to_vec(), b"intermediate cert".to_vec()];
        let msg = ser(&chain);
        let parsed = deser(&msg[HandshakeHeader::LEN..]).unwrap();
        assert_eq!(parsed, chain);
    }

    #[test]
    fn rejects_empty_chain() {
        let msg = ser(&[]);
        assert_eq!(deser(&msg[HandshakeHeader::LEN..]), Err(AlertDescription::DecodeError));
    }

    #[test]
    fn deferred_sign_runs_exactly_once() {
        let sign = DeferredSign::new(|payload| Ok(payload.to_vec()));
        assert_eq!(sign.run(b"payload").unwrap(), b"payload");
    }

    #[test]
    fn deferred_sign_cancel_never_invokes_closure() {
        let invoked = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = invoked.clone();
        let sign = DeferredSign::new(move |payload| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(payload.to_vec())
        });
        sign.cancel();
        assert!(!invoked.load(std::sync::atomic::Ordering::SeqCst));
    }
}
