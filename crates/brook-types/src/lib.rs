//! Shared types for brook.
//!
//! This crate sits at the bottom of the workspace and is depended on by
//! every other brook crate:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  brook-cli      : `brook` binary (stdin replay)              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  brook-runtime  : config loading, builder, built-in sinks    │
//! ├──────────────────────────────────────────────────────────────┤
//! │  brook-core     : buffer, evaluators, dispatcher, sinks      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  brook-event    : Level, Event, LogRecord, CaptureFlags      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  brook-types    : ErrorCode, EventId              ◄── HERE   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::EventId;
