//! AEAD capability: the provider-supplied stateless primitive
//! ([`AeadState`]), and the core-owned context that wraps it with a
//! sequence number and static IV ([`AeadContext`]).
//!
//! # References
//!
//! * `spec.md` §3 "AEAD context": "Mutable, holds {algorithm descriptor,
//!   opaque provider state, 64-bit sequence number, static IV of
//!   `iv_size` bytes}. Invariant: the per-record nonce is the static IV
//!   XORed with the big-endian sequence number right-aligned; the
//!   sequence number increments by one after every successful transform
//!   and must never wrap for a given key."
//! * `spec.md` §9 "Variable-length trailing field": chooses "a fixed-size
//!   array of the maximum supported IV length (16) with a recorded
//!   effective length" over a heap allocation, since every algorithm this
//!   core supports uses a 12-byte IV and the array never needs to grow.

use super::hash::hkdf_expand_label;
use super::{AeadAlgorithm, CryptoProvider};
use crate::cipher_suites::CipherSuite;
use crate::error::{Error, InternalError};

/// Provider-supplied, direction-agnostic AEAD primitive over a fixed key.
/// Sequence numbers and nonce construction are the core's responsibility,
/// not the provider's — see [`AeadContext`].
pub trait AeadState: Send {
    /// Seals `data` in place, appending the authentication tag.
    fn seal_in_place(&self, nonce: &[u8; 12], aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error>;

    /// Opens `data` in place (which must include the trailing tag),
    /// truncating off the tag on success.
    fn open_in_place(&self, nonce: &[u8; 12], aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error>;
}

/// The core's AEAD context: provider state plus sequence number and IV.
pub struct AeadContext {
    algorithm: AeadAlgorithm,
    inner: Box<dyn AeadState>,
    sequence: u64,
    exhausted: bool,
    iv: [u8; 16],
    iv_len: usize,
}

impl AeadContext {
    pub(crate) fn new(algorithm: AeadAlgorithm, inner: Box<dyn AeadState>, iv: &[u8]) -> Self {
        debug_assert!(iv.len() <= 16);
        let mut iv_buf = [0u8; 16];
        iv_buf[..iv.len()].copy_from_slice(iv);
        Self {
            algorithm,
            inner,
            sequence: 0,
            exhausted: false,
            iv: iv_buf,
            iv_len: iv.len(),
        }
    }

    pub fn algorithm(&self) -> AeadAlgorithm {
        self.algorithm
    }

    fn nonce(&self) -> [u8; 12] {
        debug_assert_eq!(self.iv_len, 12);
        let mut nonce = [0u8; 12];
        nonce.copy_from_slice(&self.iv[..12]);
        let seq_bytes = self.sequence.to_be_bytes();
        for (n, s) in nonce[4..].iter_mut().zip(seq_bytes.iter()) {
            *n ^= s;
        }
        nonce
    }

    /// Advances the sequence number, or marks the context exhausted if it
    /// would wrap. `spec.md` §8 invariant 1 / scenario 6: the sequence
    /// number must never wrap for a given key; a wrap attempt fails the
    /// next transform rather than reusing a nonce.
    fn advance(&mut self) -> Result<(), Error> {
        if self.exhausted {
            return Err(Error::Internal(InternalError::Library));
        }
        match self.sequence.checked_add(1) {
            Some(next) => self.sequence = next,
            None => self.exhausted = true,
        }
        Ok(())
    }

    /// Seals `plaintext` (already including the inner content-type byte
    /// for TLS 1.3 record protection) under the current sequence number,
    /// then advances it.
    pub fn seal(&mut self, plaintext_and_tag: &mut Vec<u8>, aad: &[u8]) -> Result<(), Error> {
        if self.exhausted {
            return Err(Error::Internal(InternalError::Library));
        }
        let nonce = self.nonce();
        self.inner.seal_in_place(&nonce, aad, plaintext_and_tag)?;
        self.advance()
    }

    /// Opens `ciphertext_and_tag` under the current sequence number, then
    /// advances it.
    pub fn open(&mut self, ciphertext_and_tag: &mut Vec<u8>, aad: &[u8]) -> Result<(), Error> {
        if self.exhausted {
            return Err(Error::Internal(InternalError::Library));
        }
        let nonce = self.nonce();
        self.inner.open_in_place(&nonce, aad, ciphertext_and_tag)?;
        self.advance()
    }
}

impl Drop for AeadContext {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.iv.zeroize();
    }
}

/// Derives an [`AeadContext`] via `HKDF-Expand-Label(secret, "key"/"iv",
/// "", ...)`, the `aead_new` operation from `spec.md` §6. Lives here rather
/// than behind `default-provider` since it only calls through
/// [`CryptoProvider`] and has to work with any provider implementation, not
/// just the bundled one.
pub(crate) fn aead_new(
    provider: &dyn CryptoProvider,
    suite: CipherSuite,
    secret: &[u8],
) -> Result<AeadContext, Error> {
    let alg = suite.aead();
    let hash_alg = suite.hash();
    let key = hkdf_expand_label(hash_alg, secret, b"key", &[], alg.key_size());
    let iv = hkdf_expand_label(hash_alg, secret, b"iv", &[], alg.iv_size());
    let inner = provider.aead_state(alg, &key)?;
    Ok(AeadContext::new(alg, inner, &iv))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// XORs `data` against a fixed keystream and appends a fixed 16-byte
    /// tag, just distinct enough per-nonce to catch nonce-reuse bugs.
    struct FakeAead;

    impl AeadState for FakeAead {
        fn seal_in_place(&self, nonce: &[u8; 12], _aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error> {
            for byte in data.iter_mut() {
                *byte ^= nonce[0];
            }
            data.extend_from_slice(&[0xAAu8; 16]);
            Ok(())
        }

        fn open_in_place(&self, nonce: &[u8; 12], _aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error> {
            if data.len() < 16 || data[data.len() - 16..] != [0xAAu8; 16] {
                return Err(Error::Internal(InternalError::Library));
            }
            data.truncate(data.len() - 16);
            for byte in data.iter_mut() {
                *byte ^= nonce[0];
            }
            Ok(())
        }
    }

    fn fake_context() -> AeadContext {
        AeadContext::new(AeadAlgorithm::Aes128Gcm, Box::new(FakeAead), &[0x01u8; 12])
    }

    #[test]
    fn seal_then_open_round_trips() {
        let mut sealer = fake_context();
        let mut opener = fake_context();

        let mut buf = b"hello record layer".to_vec();
        sealer.seal(&mut buf, b"aad").unwrap();
        opener.open(&mut buf, b"aad").unwrap();
        assert_eq!(buf, b"hello record layer");
    }

    #[test]
    fn nonce_changes_with_sequence_number() {
        let mut ctx = fake_context();
        let first = ctx.nonce();
        ctx.advance().unwrap();
        let second = ctx.nonce();
        assert_ne!(first, second);
    }

    #[test]
    fn exhausted_context_refuses_further_transforms() {
        let mut ctx = fake_context();
        ctx.sequence = u64::MAX;
        ctx.advance().unwrap();
        assert!(ctx.exhausted);

        let mut buf = b"won't go out".to_vec();
        assert!(matches!(ctx.seal(&mut buf, b""), Err(Error::Internal(InternalError::Library))));
    }
}
