//! A minimalist, embeddable TLS 1.3 core.
//!
//! This crate implements the handshake state machine, HKDF-based key
//! schedule, transcript hashing, and record layer framing/encryption
//! described by [RFC 8446], against a pluggable [`provider::CryptoProvider`]
//! rather than a fixed crypto backend. It does not do I/O: a [`Session`] is
//! driven by handing it bytes that arrived from the peer and draining the
//! bytes it wants sent, through an explicit [`Buffer`] rather than a socket
//! or stream type, so it embeds equally well behind a TCP socket, a QUIC
//! datagram, or a test harness.
//!
//! # Limitations
//!
//! * Only the three RFC 8446 TLS 1.3 cipher suites are recognized
//!   (`TLS_AES_128_GCM_SHA256`, `TLS_AES_256_GCM_SHA384`,
//!   `TLS_CHACHA20_POLY1305_SHA256`); no TLS 1.2 fallback.
//! * No session resumption, 0-RTT, or post-handshake key update.
//! * No client certificates (mutual TLS).
//! * No `HelloRetryRequest` support — a server that requests a retry is
//!   treated as a protocol error.
//! * Certificate chain validation and private-key signing are external
//!   collaborators, supplied through [`CertificateResolver`]/
//!   [`CertificateVerifier`] callbacks; this crate never parses or
//!   validates a certificate itself.
//!
//! # Feature Flags
//!
//! * `logging`: Enable logging through the [`log`] facade. Enabled by
//!   default.
//! * `default-provider`: Pull in a concrete [`provider::CryptoProvider`]
//!   backed by `aes-gcm`/`chacha20poly1305` for AEAD, `sha2`/`hkdf`/`hmac`
//!   for hashing and key derivation, and `p256`/`x25519-dalek` for key
//!   exchange. Enabled by default; disable it to supply your own provider
//!   with a different (or hardware-backed) crypto stack.
#![cfg_attr(docsrs, feature(doc_cfg), feature(doc_auto_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
pub(crate) mod fmt;

mod alert;
mod buffer;
mod cipher_suites;
mod error;
mod extension;
mod handshake;
mod key_schedule;
pub mod provider;
mod reader;
mod record;
mod session;

pub use alert::{Alert, AlertDescription, AlertLevel};
pub use buffer::Buffer;
pub use cipher_suites::CipherSuite;
pub use error::{Error, InternalError};
pub use extension::{Extension, ExtensionType, NamedGroup, SignatureScheme};
pub use handshake::certificate::{CertificateResolver, CertificateVerifier, DeferredSign, DeferredVerify};
pub use session::{CertContext, Progress, Session};
