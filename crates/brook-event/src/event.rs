//! Owned, immutable event snapshots.

use crate::{CaptureFlags, Level, LogRecord};
use brook_types::EventId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;

/// Source location of the call that produced an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// Error captured alongside an event.
///
/// The `source()` chain is walked when the event is captured; the
/// original error value is not retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    /// Display of the top-level error.
    pub message: String,
    /// Display of each `source()`, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ExceptionInfo {
    /// Creates exception info with no cause chain.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Snapshots an error and its full `source()` chain.
    #[must_use]
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut next = error.source();
        while let Some(cause) = next {
            causes.push(cause.to_string());
            next = cause.source();
        }
        Self {
            message: error.to_string(),
            causes,
        }
    }
}

/// Immutable snapshot of one log occurrence.
///
/// An event owns all of its data: it never borrows from the call that
/// produced it, so it can safely wait in a buffer for as long as the
/// buffer needs. Fields are read through accessors; the `with_*`
/// builders are only usable before the event is handed over, since
/// handing it over moves it.
///
/// Optional fields that were not selected by the [`CaptureFlags`] in
/// effect are `None`. [`captured`](Self::captured) records which flags
/// were applied.
///
/// # Example
///
/// ```
/// use brook_event::{Event, ExceptionInfo, Level};
///
/// let event = Event::new(Level::Error, "db", "connection lost")
///     .with_exception(ExceptionInfo::new("timed out after 30s"))
///     .with_property("shard", "7");
///
/// assert_eq!(event.level(), Level::Error);
/// assert_eq!(event.logger_name(), "db");
/// assert_eq!(event.property("shard"), Some("7"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    timestamp: DateTime<Utc>,
    level: Level,
    logger_name: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exception: Option<ExceptionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thread_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity: Option<String>,
    #[serde(default = "CaptureFlags::empty")]
    captured: CaptureFlags,
}

impl Event {
    /// Creates an event stamped with the current time and no optional
    /// fields.
    pub fn new(level: Level, logger_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Utc::now(),
            level,
            logger_name: logger_name.into(),
            message: message.into(),
            exception: None,
            thread_name: None,
            location: None,
            context: None,
            properties: None,
            username: None,
            domain: None,
            identity: None,
            captured: CaptureFlags::NONE,
        }
    }

    /// Snapshots a call-site record into an owned event.
    ///
    /// Copies level, logger name and message unconditionally, and each
    /// optional field whose flag is present in `flags`. The thread name
    /// is read from the current thread, so this must run on the thread
    /// that produced the record.
    #[must_use]
    pub fn capture(record: &LogRecord<'_>, flags: CaptureFlags) -> Self {
        let mut event = Self::new(record.level, record.logger, record.message);
        event.captured = flags;

        if flags.contains(CaptureFlags::EXCEPTION) {
            event.exception = record.error.map(ExceptionInfo::from_error);
        }
        if flags.contains(CaptureFlags::THREAD_NAME) {
            let current = std::thread::current();
            event.thread_name = Some(match current.name() {
                Some(name) => name.to_string(),
                None => format!("{:?}", current.id()),
            });
        }
        if flags.contains(CaptureFlags::LOCATION) {
            event.location = Some(Location {
                file: record.location.file().to_string(),
                line: record.location.line(),
                column: record.location.column(),
            });
        }
        if flags.contains(CaptureFlags::CONTEXT) {
            event.context = Some(record.context.to_vec());
        }
        if flags.contains(CaptureFlags::PROPERTIES) {
            event.properties = record.properties.cloned();
        }
        if flags.contains(CaptureFlags::USERNAME) {
            event.username = record.username.map(str::to_string);
        }
        if flags.contains(CaptureFlags::DOMAIN) {
            event.domain = record.domain.map(str::to_string);
        }
        if flags.contains(CaptureFlags::IDENTITY) {
            event.identity = record.identity.map(str::to_string);
        }

        event
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self.captured |= CaptureFlags::EXCEPTION;
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self.captured |= CaptureFlags::THREAD_NAME;
        self
    }

    /// Adds one key/value context property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self.captured |= CaptureFlags::PROPERTIES;
        self
    }

    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn exception(&self) -> Option<&ExceptionInfo> {
        self.exception.as_ref()
    }

    #[must_use]
    pub fn thread_name(&self) -> Option<&str> {
        self.thread_name.as_deref()
    }

    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Diagnostic context stack, outermost first.
    #[must_use]
    pub fn context(&self) -> Option<&[String]> {
        self.context.as_deref()
    }

    #[must_use]
    pub fn properties(&self) -> Option<&BTreeMap<String, String>> {
        self.properties.as_ref()
    }

    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.as_ref()?.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Flags that were applied when this event was captured.
    #[must_use]
    pub fn captured(&self) -> CaptureFlags {
        self.captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Wrapped {
        inner: std::io::Error,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("write failed")
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.inner)
        }
    }

    fn wrapped() -> Wrapped {
        Wrapped {
            inner: std::io::Error::other("disk full"),
        }
    }

    #[test]
    fn exception_info_walks_source_chain() {
        let info = ExceptionInfo::from_error(&wrapped());
        assert_eq!(info.message, "write failed");
        assert_eq!(info.causes, vec!["disk full".to_string()]);
    }

    #[test]
    fn capture_all_copies_every_field() {
        let err = wrapped();
        let ctx = vec!["req-1".to_string(), "step-2".to_string()];
        let mut props = BTreeMap::new();
        props.insert("tenant".to_string(), "acme".to_string());

        let record = LogRecord::new(Level::Error, "store", "flush failed")
            .error(&err)
            .context(&ctx)
            .properties(&props)
            .username("alice")
            .domain("billing")
            .identity("svc");

        let event = Event::capture(&record, CaptureFlags::ALL);

        assert_eq!(event.level(), Level::Error);
        assert_eq!(event.logger_name(), "store");
        assert_eq!(event.message(), "flush failed");
        assert_eq!(event.exception().map(|e| e.message.as_str()), Some("write failed"));
        assert!(event.thread_name().is_some());
        assert!(event
            .location()
            .is_some_and(|loc| loc.file.ends_with("event.rs")));
        assert_eq!(event.context(), Some(ctx.as_slice()));
        assert_eq!(event.property("tenant"), Some("acme"));
        assert_eq!(event.username(), Some("alice"));
        assert_eq!(event.domain(), Some("billing"));
        assert_eq!(event.identity(), Some("svc"));
        assert_eq!(event.captured(), CaptureFlags::ALL);
    }

    #[test]
    fn capture_none_keeps_only_required_fields() {
        let err = wrapped();
        let record = LogRecord::new(Level::Info, "store", "ok")
            .error(&err)
            .username("alice");

        let event = Event::capture(&record, CaptureFlags::NONE);

        assert_eq!(event.message(), "ok");
        assert!(event.exception().is_none());
        assert!(event.thread_name().is_none());
        assert!(event.location().is_none());
        assert!(event.context().is_none());
        assert!(event.properties().is_none());
        assert!(event.username().is_none());
    }

    #[test]
    fn capture_reads_producing_thread_name() {
        let event = std::thread::Builder::new()
            .name("producer-3".into())
            .spawn(|| {
                let record = LogRecord::new(Level::Info, "t", "m");
                Event::capture(&record, CaptureFlags::THREAD_NAME)
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(event.thread_name(), Some("producer-3"));
    }

    #[test]
    fn captured_event_outlives_record_data() {
        let event = {
            let logger = String::from("scoped");
            let message = format!("value={}", 42);
            let record = LogRecord::new(Level::Debug, &logger, &message);
            Event::capture(&record, CaptureFlags::PARTIAL)
        };
        assert_eq!(event.logger_name(), "scoped");
        assert_eq!(event.message(), "value=42");
    }

    #[test]
    fn json_omits_absent_fields() {
        let event = Event::new(Level::Warn, "net", "retrying");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["level"], "WARN");
        assert_eq!(json["logger_name"], "net");
        assert!(json.get("exception").is_none());
        assert!(json.get("thread_name").is_none());

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn builders_record_capture_flags() {
        let event = Event::new(Level::Info, "a", "b")
            .with_thread_name("main")
            .with_property("k", "v");
        assert_eq!(
            event.captured(),
            CaptureFlags::THREAD_NAME | CaptureFlags::PROPERTIES
        );
    }
}
