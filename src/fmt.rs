//! Logging shim.
//!
//! This crate logs through the `log` facade only, gated behind the
//! `logging` feature (enabled by default). No log call anywhere in this
//! crate may be handed secret key material, plaintext application data, or
//! signing payloads — only message types, states, lengths, and error codes.

#![allow(unused_macros)]

macro_rules! error {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        ::log::error!($($arg)*);
    };
}

macro_rules! warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        ::log::warn!($($arg)*);
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        ::log::debug!($($arg)*);
    };
}

macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        ::log::trace!($($arg)*);
    };
}

pub(crate) use debug;
pub(crate) use error;
pub(crate) use trace;
pub(crate) use warn;

#[cfg(test)]
mod tests {
    // Each macro body is gated on `#[cfg(feature = "logging")]` internally,
    // so invoking them here exercises both configurations: with `logging`
    // on (the default) these reach `log`'s no-op-without-a-logger call; with
    // `--no-default-features` the macro expands to nothing and this test
    // still compiles.
    #[test]
    fn macros_compile_with_and_without_logging() {
        error!("test error {}", 1);
        warn!("test warn {}", 2);
        debug!("test debug {}", 3);
        trace!("test trace {}", 4);
    }
}
