//! Capture flags: which call-site fields are snapshotted into an event.
//!
//! An [`Event`](crate::Event) can sit in a buffer long after the call
//! that produced it has returned, so anything that only exists at the
//! call site (the current thread's name, the diagnostic context stack,
//! the error chain) has to be copied when the event is captured.
//! Copying costs time and memory; these flags let the operator trade
//! that cost against completeness.
//!
//! Level, logger name, message and timestamp are always captured.
//!
//! # Example
//!
//! ```
//! use brook_event::CaptureFlags;
//!
//! let partial = CaptureFlags::PARTIAL;
//! assert!(partial.contains(CaptureFlags::THREAD_NAME));
//! assert!(!partial.contains(CaptureFlags::LOCATION));
//!
//! let parsed = CaptureFlags::from_names(["thread_name", "exception"]).unwrap();
//! assert_eq!(parsed, CaptureFlags::THREAD_NAME | CaptureFlags::EXCEPTION);
//! ```

use crate::EventError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Optional event fields captured at snapshot time.
    ///
    /// | Flag | Captured field |
    /// |------|----------------|
    /// | [`CONTEXT`](Self::CONTEXT) | diagnostic context stack |
    /// | [`THREAD_NAME`](Self::THREAD_NAME) | name of the producing thread |
    /// | [`LOCATION`](Self::LOCATION) | source file / line / column |
    /// | [`USERNAME`](Self::USERNAME) | acting user name |
    /// | [`DOMAIN`](Self::DOMAIN) | application domain / service name |
    /// | [`IDENTITY`](Self::IDENTITY) | authenticated identity |
    /// | [`EXCEPTION`](Self::EXCEPTION) | error message and cause chain |
    /// | [`PROPERTIES`](Self::PROPERTIES) | key/value context properties |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CaptureFlags: u16 {
        const CONTEXT     = 0x0002;
        const THREAD_NAME = 0x0008;
        const LOCATION    = 0x0010;
        const USERNAME    = 0x0020;
        const DOMAIN      = 0x0040;
        const IDENTITY    = 0x0080;
        const EXCEPTION   = 0x0100;
        const PROPERTIES  = 0x0200;
    }
}

impl CaptureFlags {
    /// Nothing optional.
    pub const NONE: Self = Self::empty();

    /// The cheap-but-useful subset: thread name, error chain, domain and
    /// properties. Skips location and identity lookups.
    pub const PARTIAL: Self = Self::THREAD_NAME
        .union(Self::EXCEPTION)
        .union(Self::DOMAIN)
        .union(Self::PROPERTIES);

    /// Every optional field.
    pub const ALL: Self = Self::PARTIAL
        .union(Self::CONTEXT)
        .union(Self::LOCATION)
        .union(Self::USERNAME)
        .union(Self::IDENTITY);

    /// Parses a single flag or preset name (case-insensitive).
    ///
    /// ```
    /// use brook_event::CaptureFlags;
    ///
    /// assert_eq!(CaptureFlags::parse("thread_name"), Some(CaptureFlags::THREAD_NAME));
    /// assert_eq!(CaptureFlags::parse("threadname"), Some(CaptureFlags::THREAD_NAME));
    /// assert_eq!(CaptureFlags::parse("ndc"), Some(CaptureFlags::CONTEXT));
    /// assert_eq!(CaptureFlags::parse("PARTIAL"), Some(CaptureFlags::PARTIAL));
    /// assert_eq!(CaptureFlags::parse("bogus"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "CONTEXT" | "NDC" => Some(Self::CONTEXT),
            "THREAD_NAME" | "THREADNAME" => Some(Self::THREAD_NAME),
            "LOCATION" | "LOCATION_INFO" => Some(Self::LOCATION),
            "USERNAME" => Some(Self::USERNAME),
            "DOMAIN" => Some(Self::DOMAIN),
            "IDENTITY" => Some(Self::IDENTITY),
            "EXCEPTION" => Some(Self::EXCEPTION),
            "PROPERTIES" => Some(Self::PROPERTIES),
            "NONE" => Some(Self::NONE),
            "PARTIAL" => Some(Self::PARTIAL),
            "ALL" => Some(Self::ALL),
            _ => None,
        }
    }

    /// Parses and unions a list of flag names.
    ///
    /// An empty list yields [`NONE`](Self::NONE).
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownCaptureFlag`] for the first name that
    /// does not parse.
    pub fn from_names<I, S>(names: I) -> Result<Self, EventError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().try_fold(Self::NONE, |acc, name| {
            let name = name.as_ref();
            Self::parse(name)
                .map(|flag| acc | flag)
                .ok_or_else(|| EventError::UnknownCaptureFlag(name.to_string()))
        })
    }

    /// Parses a comma-separated list, e.g. `"thread_name, exception"`.
    ///
    /// # Errors
    ///
    /// Same as [`from_names`](Self::from_names).
    pub fn from_csv(list: &str) -> Result<Self, EventError> {
        Self::from_names(list.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    /// Returns the names of the individual flags that are set.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Default for CaptureFlags {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert!(CaptureFlags::NONE.is_empty());
        assert!(CaptureFlags::ALL.contains(CaptureFlags::PARTIAL));
        assert_eq!(CaptureFlags::ALL, CaptureFlags::all());
        assert_eq!(CaptureFlags::default(), CaptureFlags::ALL);
    }

    #[test]
    fn partial_contents() {
        let partial = CaptureFlags::PARTIAL;
        assert!(partial.contains(CaptureFlags::THREAD_NAME));
        assert!(partial.contains(CaptureFlags::EXCEPTION));
        assert!(partial.contains(CaptureFlags::DOMAIN));
        assert!(partial.contains(CaptureFlags::PROPERTIES));
        assert!(!partial.contains(CaptureFlags::LOCATION));
        assert!(!partial.contains(CaptureFlags::IDENTITY));
        assert!(!partial.contains(CaptureFlags::USERNAME));
        assert!(!partial.contains(CaptureFlags::CONTEXT));
    }

    #[test]
    fn from_names_unions() {
        let flags = CaptureFlags::from_names(["location", "USERNAME"]).unwrap();
        assert_eq!(flags, CaptureFlags::LOCATION | CaptureFlags::USERNAME);
        assert_eq!(
            CaptureFlags::from_names(Vec::<String>::new()).unwrap(),
            CaptureFlags::NONE
        );
    }

    #[test]
    fn from_names_rejects_unknown() {
        let err = CaptureFlags::from_names(["exception", "stacktrace"]).unwrap_err();
        assert_eq!(err, EventError::UnknownCaptureFlag("stacktrace".into()));
    }

    #[test]
    fn from_csv() {
        assert_eq!(
            CaptureFlags::from_csv("thread_name, exception,").unwrap(),
            CaptureFlags::THREAD_NAME | CaptureFlags::EXCEPTION
        );
        assert_eq!(CaptureFlags::from_csv("").unwrap(), CaptureFlags::NONE);
    }

    #[test]
    fn names_round_trip() {
        let flags = CaptureFlags::CONTEXT | CaptureFlags::PROPERTIES;
        let names = flags.names();
        assert_eq!(names, vec!["CONTEXT", "PROPERTIES"]);
        assert_eq!(CaptureFlags::from_names(names).unwrap(), flags);
    }
}
