//! Event layer errors.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`EventError::UnknownLevel`] | `EVENT_UNKNOWN_LEVEL` | No |
//! | [`EventError::UnknownCaptureFlag`] | `EVENT_UNKNOWN_CAPTURE_FLAG` | No |

use brook_types::ErrorCode;
use thiserror::Error;

/// Event layer error.
///
/// Both variants come from parsing operator-supplied strings (config
/// files, env vars, CLI input) and will not change on retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// A severity name that is not one of TRACE..FATAL.
    #[error("unknown level: {0}")]
    UnknownLevel(String),

    /// A capture flag name that is not recognized.
    #[error("unknown capture flag: {0}")]
    UnknownCaptureFlag(String),
}

impl ErrorCode for EventError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownLevel(_) => "EVENT_UNKNOWN_LEVEL",
            Self::UnknownCaptureFlag(_) => "EVENT_UNKNOWN_CAPTURE_FLAG",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
