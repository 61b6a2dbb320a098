//! Unified error-code interface for brook.
//!
//! Every error enum in the workspace implements [`ErrorCode`] so that
//! hosts can branch on a stable, machine-readable code instead of
//! matching on display strings.
//!
//! # Example
//!
//! ```
//! use brook_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum SinkFault {
//!     Unreachable,
//!     Rejected,
//! }
//!
//! impl ErrorCode for SinkFault {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Unreachable => "SINK_UNREACHABLE",
//!             Self::Rejected => "SINK_REJECTED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Unreachable)
//!     }
//! }
//!
//! let err = SinkFault::Unreachable;
//! assert_eq!(err.code(), "SINK_UNREACHABLE");
//! assert!(err.is_recoverable());
//! ```

/// Machine-readable error code plus recoverability.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**
/// - **Prefixed by the owning crate**: `EVENT_`, `BUFFER_`, `SINK_`, `CONFIG_`
/// - **Stable**: a code is part of the public contract once released
///
/// # Recoverability
///
/// An error is recoverable when repeating the operation (or letting the
/// next operation run) may succeed, e.g. a sink that was briefly
/// unreachable. Invalid configuration and use-after-close are not.
pub trait ErrorCode {
    /// Returns the machine-readable error code.
    fn code(&self) -> &'static str;

    /// Returns whether a retry may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Validates that an error code follows the workspace conventions.
///
/// # Checks
///
/// 1. Code is not empty
/// 2. Code starts with `expected_prefix`
/// 3. Code is UPPER_SNAKE_CASE
///
/// # Panics
///
/// Panics with a descriptive message if any check fails.
///
/// # Example
///
/// ```
/// use brook_types::{assert_error_code, ErrorCode};
///
/// #[derive(Debug)]
/// enum MyError { Closed }
///
/// impl ErrorCode for MyError {
///     fn code(&self) -> &'static str { "MY_CLOSED" }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_code(&MyError::Closed, "MY_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");

    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );

    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Validates every variant of an error enum at once.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum TestError {
        Unreachable,
        Closed,
    }

    impl ErrorCode for TestError {
        fn code(&self) -> &'static str {
            match self {
                Self::Unreachable => "TEST_UNREACHABLE",
                Self::Closed => "TEST_CLOSED",
            }
        }

        fn is_recoverable(&self) -> bool {
            matches!(self, Self::Unreachable)
        }
    }

    #[test]
    fn error_code_trait() {
        assert_eq!(TestError::Unreachable.code(), "TEST_UNREACHABLE");
        assert!(TestError::Unreachable.is_recoverable());
        assert_eq!(TestError::Closed.code(), "TEST_CLOSED");
        assert!(!TestError::Closed.is_recoverable());
    }

    #[test]
    fn assert_error_codes_all_variants() {
        assert_error_codes(&[TestError::Unreachable, TestError::Closed], "TEST_");
    }

    #[test]
    #[should_panic(expected = "must start with prefix")]
    fn assert_error_code_wrong_prefix() {
        assert_error_code(&TestError::Closed, "SINK_");
    }

    #[test]
    fn upper_snake_case() {
        assert!(is_upper_snake_case("BUFFER_CLOSED"));
        assert!(is_upper_snake_case("SINK_IO_42"));
        assert!(!is_upper_snake_case(""));
        assert!(!is_upper_snake_case("buffer_closed"));
        assert!(!is_upper_snake_case("_BUFFER"));
        assert!(!is_upper_snake_case("BUFFER_"));
        assert!(!is_upper_snake_case("BUFFER__CLOSED"));
    }
}
