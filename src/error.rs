//! Internal error types.
//!
//! These never cross the host boundary as `Result`s — per the error-handling
//! discipline, fatal conditions are reported through the host's `panic`
//! callback instead. They exist so the code that detects a fault can build a
//! precise message without formatting ad hoc at every call site.

use thiserror::Error;

/// A condition that, per the data model's invariants, can only be reached by
/// a programming error in this crate or in a caller that bypassed the
/// checked accessors.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("register index {0} out of range (valid range is 0..=31)")]
    RegisterOutOfRange(i64),

    #[error("unrecognized instruction encoding {0:#010x}")]
    UnrecognizedInstruction(u32),

    #[error("host services allocation failed during init")]
    InitAllocationFailed,
}

impl FatalError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}
