//! Key-exchange capability.
//!
//! # References
//!
//! * `spec.md` §3 "Key-exchange context": "Per-handshake ephemeral holder
//!   of a private key; exposes one operation that, given the peer's
//!   public value, produces the shared secret and releases its
//!   resources. An asynchronous variant produces a public value
//!   immediately and computes the secret later" — exactly what a `Box<dyn
//!   KeyExchange>` constructed at `ClientHello`-build time and consumed at
//!   `ServerHello`-parse time models.

use crate::error::{Error, InternalError};
use crate::extension::NamedGroup;

/// A per-handshake ephemeral key-exchange context.
pub trait KeyExchange: Send {
    fn group(&self) -> NamedGroup;

    /// The public value to offer the peer, valid immediately after
    /// construction.
    fn public_key(&self) -> &[u8];

    /// Consumes the context, computing the shared secret from the peer's
    /// public value.
    fn exchange(self: Box<Self>, peer_public: &[u8]) -> Result<Vec<u8>, Error>;
}

pub(crate) struct Secp256r1KeyExchange {
    secret: p256::ecdh::EphemeralSecret,
    public: [u8; 65],
}

impl Secp256r1KeyExchange {
    pub(crate) fn generate<R: rand_core::CryptoRng + rand_core::RngCore>(rng: &mut R) -> Self {
        let secret = p256::ecdh::EphemeralSecret::random(rng);
        let public = p256::EncodedPoint::from(secret.public_key());
        let mut buf = [0u8; 65];
        buf.copy_from_slice(public.as_bytes());
        Self {
            secret,
            public: buf,
        }
    }
}

impl KeyExchange for Secp256r1KeyExchange {
    fn group(&self) -> NamedGroup {
        NamedGroup::Secp256r1
    }

    fn public_key(&self) -> &[u8] {
        &self.public
    }

    fn exchange(self: Box<Self>, peer_public: &[u8]) -> Result<Vec<u8>, Error> {
        let encoded = p256::EncodedPoint::from_bytes(peer_public)
            .map_err(|_| Error::Internal(InternalError::IncompatibleKey))?;
        let peer_public = p256::PublicKey::from_sec1_bytes(encoded.as_bytes())
            .map_err(|_| Error::Internal(InternalError::IncompatibleKey))?;
        let shared = self.secret.diffie_hellman(&peer_public);
        Ok(shared.raw_secret_bytes().to_vec())
    }
}

pub(crate) struct X25519KeyExchange {
    secret: x25519_dalek::EphemeralSecret,
    public: [u8; 32],
}

impl X25519KeyExchange {
    pub(crate) fn generate<R: rand_core::CryptoRng + rand_core::RngCore>(rng: &mut R) -> Self {
        let secret = x25519_dalek::EphemeralSecret::random_from_rng(rng);
        let public = x25519_dalek::PublicKey::from(&secret);
        Self {
            secret,
            public: *public.as_bytes(),
        }
    }
}

impl KeyExchange for X25519KeyExchange {
    fn group(&self) -> NamedGroup {
        NamedGroup::X25519
    }

    fn public_key(&self) -> &[u8] {
        &self.public
    }

    fn exchange(self: Box<Self>, peer_public: &[u8]) -> Result<Vec<u8>, Error> {
        let peer_public: [u8; 32] = peer_public
            .try_into()
            .map_err(|_| Error::Internal(InternalError::IncompatibleKey))?;
        let shared = self.secret.diffie_hellman(&x25519_dalek::PublicKey::from(peer_public));
        Ok(shared.as_bytes().to_vec())
    }
}
