//! Error types for pixproc.

use thiserror::Error;

/// Result type alias using pixproc's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pipe negotiation and programming operations.
///
/// Negotiation-time clamping never fails: out-of-range formats, crops and
/// composes are silently corrected to the nearest valid value so probing
/// clients never need error-recovery loops. Errors are reserved for true
/// precondition violations and collaborator failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Unsupported pad/target pairing, or an encoding with no catalog entry
    /// at programming time.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Attempt to mutate active state while the pipe is streaming.
    #[error("pipe is streaming, active configuration is locked")]
    Busy,

    /// The entity name does not identify a known pipe.
    #[error("cannot derive pipe identity from entity name {0:?}")]
    Unsupported(String),

    /// Opaque failure from the register bus or the color-conversion
    /// planner. Not interpreted here; callers own retry policy.
    #[error("hardware access failed: {0}")]
    Io(String),
}
