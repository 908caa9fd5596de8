//! The abstract crypto provider interface.
//!
//! `spec.md` calls this component "a table of function pointers producing
//! AEAD contexts, hash contexts, and key-exchange contexts; plus a random
//! byte source. Immutable, shared by many sessions." In this rewrite that
//! table is a `CryptoProvider` trait object, held by a non-owning
//! reference from every [`crate::session::Session`] — the provider must
//! outlive every session it backs, and must be reentrant since independent
//! sessions may use it from different threads.
//!
//! This module only defines the interface. Concrete primitive
//! implementations (AES-GCM, ChaCha20-Poly1305, SHA-256/384, X25519,
//! P-256) live in [`crate::provider::default`] and are out of scope of the
//! core in the sense `spec.md` means: the core never implements AES,
//! GHASH, ChaCha20, Poly1305, SHA-2, or elliptic-curve arithmetic itself,
//! it only calls through this trait.

pub mod aead;
#[cfg(feature = "default-provider")]
pub mod default;
pub mod hash;
pub mod kx;

pub use aead::AeadState;
pub use hash::Hash;
pub use kx::KeyExchange;
pub(crate) use aead::aead_new;

use crate::error::Error;
use crate::extension::NamedGroup;

/// AEAD algorithms a provider may support. Bound one-to-one to a
/// [`crate::cipher_suites::CipherSuite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AeadAlgorithm {
    Aes128Gcm,
    Aes256Gcm,
    Chacha20Poly1305,
}

impl AeadAlgorithm {
    pub const fn key_size(self) -> usize {
        match self {
            Self::Aes128Gcm => 16,
            Self::Aes256Gcm => 32,
            Self::Chacha20Poly1305 => 32,
        }
    }

    pub const fn iv_size(self) -> usize {
        12
    }

    pub const fn tag_size(self) -> usize {
        16
    }
}

/// Hash algorithms a provider may support. Bound one-to-one to a
/// [`crate::cipher_suites::CipherSuite`] and used for the transcript and
/// key schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
}

impl HashAlgorithm {
    pub const fn digest_size(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
        }
    }

    pub const fn block_size(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha384 => 128,
        }
    }
}

/// A random byte source. Implementations must be cryptographically secure;
/// the core never seeds its own RNG, it only draws from this capability.
pub trait RandomSource: Send + Sync {
    fn fill(&self, out: &mut [u8]) -> Result<(), Error>;
}

/// The crypto provider capability table.
///
/// Deliberately small: AEAD, hash, key-exchange, and randomness, each an
/// explicit capability rather than global state. A session holds `&dyn
/// CryptoProvider` (or `Arc<dyn CryptoProvider>`, at the caller's
/// discretion), never an owned value.
pub trait CryptoProvider: Send + Sync {
    /// Cipher suites this provider can realize, in preference order.
    fn cipher_suites(&self) -> &[crate::cipher_suites::CipherSuite];

    /// Named groups this provider can perform key exchange over, in
    /// preference order.
    fn supported_groups(&self) -> &[NamedGroup];

    /// Starts a new transcript/Finished hash context.
    fn hash(&self, alg: HashAlgorithm) -> Box<dyn Hash>;

    /// Wraps a raw key into an opaque, direction-agnostic AEAD primitive.
    /// The caller (the core's [`crate::provider::aead::AeadContext`]) owns
    /// sequence numbers and the static IV; this only performs the
    /// underlying seal/open transform.
    fn aead_state(&self, alg: AeadAlgorithm, key: &[u8]) -> Result<Box<dyn AeadState>, Error>;

    /// Starts an ephemeral key-exchange context for `group`. The returned
    /// object's public key is available immediately; the shared secret is
    /// computed later, once the peer's public value is known, consuming
    /// the context (the "asynchronous variant" `spec.md` §3 describes).
    fn key_exchange(&self, group: NamedGroup) -> Result<Box<dyn KeyExchange>, Error>;

    /// The random byte source shared by this provider's sessions.
    fn random(&self) -> &dyn RandomSource;
}
