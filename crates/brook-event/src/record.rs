//! Borrowed call-site view of a log occurrence.

use crate::Level;
use std::collections::BTreeMap;
use std::error::Error;
use std::panic::Location as CallerLocation;

/// Everything a producer knows at the moment it logs, borrowed from the
/// call site.
///
/// A record cannot outlive the data it borrows, so it can never be
/// buffered directly. It is turned into an owned [`Event`](crate::Event)
/// by [`Event::capture`](crate::Event::capture), which copies the fields
/// selected by [`CaptureFlags`](crate::CaptureFlags).
///
/// The source location is taken from the caller of [`LogRecord::new`]
/// via `#[track_caller]`.
///
/// # Example
///
/// ```
/// use brook_event::{CaptureFlags, Event, Level, LogRecord};
///
/// let user = String::from("alice");
/// let record = LogRecord::new(Level::Warn, "billing", "card declined")
///     .username(&user);
/// let event = Event::capture(&record, CaptureFlags::ALL);
/// drop(user);
///
/// assert_eq!(event.username(), Some("alice"));
/// ```
#[derive(Clone, Copy)]
pub struct LogRecord<'a> {
    pub(crate) level: Level,
    pub(crate) logger: &'a str,
    pub(crate) message: &'a str,
    pub(crate) error: Option<&'a (dyn Error + 'static)>,
    pub(crate) location: &'static CallerLocation<'static>,
    pub(crate) context: &'a [String],
    pub(crate) properties: Option<&'a BTreeMap<String, String>>,
    pub(crate) username: Option<&'a str>,
    pub(crate) domain: Option<&'a str>,
    pub(crate) identity: Option<&'a str>,
}

impl<'a> LogRecord<'a> {
    /// Creates a record at the caller's source location.
    #[must_use]
    #[track_caller]
    pub fn new(level: Level, logger: &'a str, message: &'a str) -> Self {
        Self {
            level,
            logger,
            message,
            error: None,
            location: CallerLocation::caller(),
            context: &[],
            properties: None,
            username: None,
            domain: None,
            identity: None,
        }
    }

    /// Attaches the error being reported.
    #[must_use]
    pub fn error(mut self, error: &'a (dyn Error + 'static)) -> Self {
        self.error = Some(error);
        self
    }

    /// Attaches the diagnostic context stack, outermost first.
    #[must_use]
    pub fn context(mut self, context: &'a [String]) -> Self {
        self.context = context;
        self
    }

    /// Attaches key/value context properties.
    #[must_use]
    pub fn properties(mut self, properties: &'a BTreeMap<String, String>) -> Self {
        self.properties = Some(properties);
        self
    }

    #[must_use]
    pub fn username(mut self, username: &'a str) -> Self {
        self.username = Some(username);
        self
    }

    #[must_use]
    pub fn domain(mut self, domain: &'a str) -> Self {
        self.domain = Some(domain);
        self
    }

    #[must_use]
    pub fn identity(mut self, identity: &'a str) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Severity of the record.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Origin logger name.
    #[must_use]
    pub fn logger(&self) -> &'a str {
        self.logger
    }
}

impl std::fmt::Debug for LogRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogRecord")
            .field("level", &self.level)
            .field("logger", &self.logger)
            .field("message", &self.message)
            .field("error", &self.error.map(ToString::to_string))
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
