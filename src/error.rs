//! Top-level error type.
//!
//! # References
//!
//! Error classes and codes follow the handshake engine's error model:
//! alerts (self-generated or peer-received) carry a TLS
//! [`AlertDescription`]; everything else is an internal condition with no
//! corresponding alert code.

use crate::alert::AlertDescription;
use core::fmt;

/// Internal (non-alert) error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InternalError {
    /// A buffer could not grow to hold the requested data.
    NoMemory,
    /// `handshake` was called again after the handshake already completed.
    HandshakeInProgress,
    /// An invariant internal to this crate was violated; this is a bug.
    Library,
    /// A key-exchange or AEAD operation was attempted with a key or
    /// context of the wrong shape for the negotiated algorithm.
    IncompatibleKey,
}

impl InternalError {
    const fn code(self) -> u16 {
        match self {
            Self::NoMemory => 0x201,
            Self::HandshakeInProgress => 0x202,
            Self::Library => 0x203,
            Self::IncompatibleKey => 0x204,
        }
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NoMemory => "no memory",
            Self::HandshakeInProgress => "handshake in progress",
            Self::Library => "library error",
            Self::IncompatibleKey => "incompatible key",
        };
        f.write_str(msg)
    }
}

/// Top-level crate error.
///
/// Self-generated and peer-received alerts collapse into one shape with a
/// `sent` discriminant rather than two variants, since every other field
/// (the alert description, the wire encoding, the `Display` message) only
/// differs by that one bit. `HANDSHAKE_IN_PROGRESS` is not a variant here
/// — it is represented by the `Ok` side of [`crate::session::Progress`]
/// instead, since it is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An alert either generated by this session and (if the record layer
    /// permits) sent to the peer (`sent: true`), or received from the peer
    /// (`sent: false`).
    Alert { sent: bool, description: AlertDescription },
    /// An internal condition unrelated to the peer or wire format.
    Internal(InternalError),
}

impl Error {
    /// Reconstructs the 32-bit wire encoding described in the external
    /// interfaces: top bits select the class, the low byte carries the
    /// alert code (for alert classes) or the internal error code.
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Alert { sent: true, description } => 0x0000_0000 | (description as u8 as u32),
            Self::Alert { sent: false, description } => 0x0000_0100 | (description as u8 as u32),
            Self::Internal(e) => 0x0000_0000 | (e.code() as u32),
        }
    }

    pub(crate) const fn decode_error() -> Self {
        Self::Alert {
            sent: true,
            description: AlertDescription::DecodeError,
        }
    }

    pub(crate) const fn unexpected_message() -> Self {
        Self::Alert {
            sent: true,
            description: AlertDescription::UnexpectedMessage,
        }
    }
}

impl From<Error> for u32 {
    #[inline]
    fn from(err: Error) -> Self {
        err.as_u32()
    }
}

impl From<AlertDescription> for Error {
    /// Wire-codec parsing (`handshake::*::deser`, [`crate::reader::Reader`])
    /// returns a bare `AlertDescription`; the engine always turns a decode
    /// failure into a self-generated alert, never a peer one.
    #[inline]
    fn from(description: AlertDescription) -> Self {
        Self::Alert { sent: true, description }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alert { sent: true, description } => write!(f, "sent alert: {description:?}"),
            Self::Alert { sent: false, description } => write!(f, "received alert: {description:?}"),
            Self::Internal(e) => write!(f, "internal error: {e}"),
        }
    }
}

impl std::error::Error for Error {}
