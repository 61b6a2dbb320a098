//! Event model for brook.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  brook-core     : buffer, evaluators, dispatcher, sinks      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  brook-event    : Level, Event, LogRecord, CaptureFlags ◄─── │
//! ├──────────────────────────────────────────────────────────────┤
//! │  brook-types    : ErrorCode, EventId                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Borrowed records, owned events
//!
//! A producer describes what happened with a [`LogRecord`], which
//! borrows from the call site (message, error, context stack,
//! properties). Before anything is buffered, the record is captured
//! into an [`Event`], which owns copies of the fields selected by
//! [`CaptureFlags`]:
//!
//! ```text
//! call site                          buffer (may hold it for a long time)
//! ─────────                          ──────
//! LogRecord<'a>  ── Event::capture ──► Event   (no borrows, 'static)
//!   &str, &dyn Error,                   String, ExceptionInfo,
//!   &[String], thread-local state       Vec<String>, thread name
//! ```
//!
//! The borrow checker rules out an event that still points into the
//! producer's stack.
//!
//! # Example
//!
//! ```
//! use brook_event::{CaptureFlags, Event, Level, LogRecord};
//!
//! let record = LogRecord::new(Level::Error, "payments", "charge failed");
//! let event = Event::capture(&record, CaptureFlags::PARTIAL);
//!
//! assert_eq!(event.level(), Level::Error);
//! assert!(event.thread_name().is_some());
//! assert!(event.location().is_none());
//! ```

mod capture;
mod error;
mod event;
mod level;
mod record;

pub use capture::CaptureFlags;
pub use error::EventError;
pub use event::{Event, ExceptionInfo, Location};
pub use level::Level;
pub use record::LogRecord;

pub use brook_types::EventId;
