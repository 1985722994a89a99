//! Configuration bitset (§3). Recognized flags are intentionally few; unknown
//! bits set by a host are accepted and ignored rather than rejected, per the
//! "expected, recoverable" error-handling discipline.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Config: u32 {
        /// Default setting, no special features enabled.
        const NONE = 0;
        /// Require a trace-log callback after every retired instruction.
        const TRACE_LOG = 1 << 0;
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::empty()
    }
}
