//! Error handling for the MELPe codec core.
//!
//! Mirrors the error kinds from STANAG 4591 §7: configuration errors are
//! surfaced at session construction, short reads never lose decoder state,
//! and an internal invariant violation poisons the session rather than
//! panicking or aborting the process.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors that can occur while configuring or running a MELPe session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Unsupported rate, bit density, or mode/rate combination. Surfaced at
    /// session creation; the session is never constructed.
    #[error("invalid codec configuration: {details}")]
    Config {
        /// Human-readable description of the offending combination.
        details: String,
    },

    /// The decoder was given fewer bytes than one full frame. The partial
    /// input is retained internally; no session state is lost.
    #[error("short input: need {needed} bytes for one frame, got {actual}")]
    ShortInput {
        /// Bytes required for one full frame at the configured rate/density.
        needed: usize,
        /// Bytes actually supplied.
        actual: usize,
    },

    /// An inverse-quantized parameter fell outside its well-formed range.
    /// This should be impossible by construction; if it happens, the
    /// codebooks are corrupt and the session must be considered poisoned.
    #[error("internal invariant violation: {details}")]
    InternalInvariantViolation {
        /// Which invariant was violated and with what values.
        details: String,
    },
}

impl CodecError {
    pub(crate) fn config(details: impl Into<String>) -> Self {
        Self::Config { details: details.into() }
    }

    pub(crate) fn invariant(details: impl Into<String>) -> Self {
        Self::InternalInvariantViolation { details: details.into() }
    }
}
