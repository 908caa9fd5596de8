//! The reference `CryptoProvider` this crate ships, built from audited
//! RustCrypto-family crates. See the module documentation on
//! [`crate::provider`] for why shipping one doesn't reopen the "concrete
//! primitives are out of scope" boundary `spec.md` draws.
//!
//! Gated behind the `default-provider` feature (on by default); embedders
//! that want a different backend (hardware-backed AEAD, `ring`, etc.) can
//! disable it and implement [`super::CryptoProvider`] themselves.

use super::aead::AeadState;
use super::hash::new_hash;
use super::kx::{Secp256r1KeyExchange, X25519KeyExchange};
use super::{AeadAlgorithm, CryptoProvider, Hash, HashAlgorithm, KeyExchange, RandomSource};
use crate::cipher_suites::CipherSuite;
use crate::error::{Error, InternalError};
use crate::extension::NamedGroup;
use aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use chacha20poly1305::ChaCha20Poly1305;
use rand_core::{CryptoRng, RngCore};
use std::sync::Mutex;

struct Aes128GcmState(Aes128Gcm);
struct Aes256GcmState(Aes256Gcm);
struct ChaCha20Poly1305State(ChaCha20Poly1305);

fn seal_with<C: Aead>(cipher: &C, nonce: &[u8; 12], aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error> {
    let ciphertext = cipher
        .encrypt(
            nonce.into(),
            Payload {
                msg: data,
                aad,
            },
        )
        .map_err(|_| Error::Internal(InternalError::Library))?;
    *data = ciphertext;
    Ok(())
}

fn open_with<C: Aead>(cipher: &C, nonce: &[u8; 12], aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error> {
    use crate::alert::AlertDescription;
    let plaintext = cipher
        .decrypt(
            nonce.into(),
            Payload {
                msg: data,
                aad,
            },
        )
        .map_err(|_| Error::Alert {
            sent: true,
            description: AlertDescription::BadRecordMac,
        })?;
    *data = plaintext;
    Ok(())
}

impl AeadState for Aes128GcmState {
    fn seal_in_place(&self, nonce: &[u8; 12], aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error> {
        seal_with(&self.0, nonce, aad, data)
    }
    fn open_in_place(&self, nonce: &[u8; 12], aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error> {
        open_with(&self.0, nonce, aad, data)
    }
}

impl AeadState for Aes256GcmState {
    fn seal_in_place(&self, nonce: &[u8; 12], aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error> {
        seal_with(&self.0, nonce, aad, data)
    }
    fn open_in_place(&self, nonce: &[u8; 12], aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error> {
        open_with(&self.0, nonce, aad, data)
    }
}

impl AeadState for ChaCha20Poly1305State {
    fn seal_in_place(&self, nonce: &[u8; 12], aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error> {
        seal_with(&self.0, nonce, aad, data)
    }
    fn open_in_place(&self, nonce: &[u8; 12], aad: &[u8], data: &mut Vec<u8>) -> Result<(), Error> {
        open_with(&self.0, nonce, aad, data)
    }
}

/// A [`RandomSource`] backed by a caller-supplied CSPRNG. The core never
/// seeds its own RNG (`spec.md` §9): construction takes an already-seeded
/// generator.
pub struct RngSource<R>(Mutex<R>);

impl<R: CryptoRng + RngCore + Send> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(Mutex::new(rng))
    }
}

impl<R: CryptoRng + RngCore + Send> RandomSource for RngSource<R> {
    fn fill(&self, out: &mut [u8]) -> Result<(), Error> {
        self.0
            .lock()
            .map_err(|_| Error::Internal(InternalError::Library))?
            .fill_bytes(out);
        Ok(())
    }
}

/// The default, in-process crypto provider.
pub struct DefaultProvider<R> {
    cipher_suites: Vec<CipherSuite>,
    groups: Vec<NamedGroup>,
    rng: RngSource<R>,
}

impl<R: CryptoRng + RngCore + Send> DefaultProvider<R> {
    /// Builds a provider offering all three recognized cipher suites and
    /// both recognized groups, backed by `rng`.
    pub fn new(rng: R) -> Self {
        Self {
            cipher_suites: CipherSuite::ALL.to_vec(),
            groups: vec![NamedGroup::X25519, NamedGroup::Secp256r1],
            rng: RngSource::new(rng),
        }
    }
}

impl<R: CryptoRng + RngCore + Send + Sync> CryptoProvider for DefaultProvider<R> {
    fn cipher_suites(&self) -> &[CipherSuite] {
        &self.cipher_suites
    }

    fn supported_groups(&self) -> &[NamedGroup] {
        &self.groups
    }

    fn hash(&self, alg: HashAlgorithm) -> Box<dyn Hash> {
        new_hash(alg)
    }

    fn aead_state(&self, alg: AeadAlgorithm, key: &[u8]) -> Result<Box<dyn AeadState>, Error> {
        let state: Box<dyn AeadState> = match alg {
            AeadAlgorithm::Aes128Gcm => Box::new(Aes128GcmState(
                Aes128Gcm::new_from_slice(key).map_err(|_| Error::Internal(InternalError::IncompatibleKey))?,
            )),
            AeadAlgorithm::Aes256Gcm => Box::new(Aes256GcmState(
                Aes256Gcm::new_from_slice(key).map_err(|_| Error::Internal(InternalError::IncompatibleKey))?,
            )),
            AeadAlgorithm::Chacha20Poly1305 => Box::new(ChaCha20Poly1305State(
                ChaCha20Poly1305::new_from_slice(key)
                    .map_err(|_| Error::Internal(InternalError::IncompatibleKey))?,
            )),
        };
        Ok(state)
    }

    fn key_exchange(&self, group: NamedGroup) -> Result<Box<dyn KeyExchange>, Error> {
        let mut rng = self
            .rng
            .0
            .lock()
            .map_err(|_| Error::Internal(InternalError::Library))?;
        let kx: Box<dyn KeyExchange> = match group {
            NamedGroup::Secp256r1 => Box::new(Secp256r1KeyExchange::generate(&mut *rng)),
            NamedGroup::X25519 => Box::new(X25519KeyExchange::generate(&mut *rng)),
        };
        Ok(kx)
    }

    fn random(&self) -> &dyn RandomSource {
        &self.rng
    }
}
