//! Input line format: `LEVEL logger message...`.

use brook_event::{EventError, Level, LogRecord};
use thiserror::Error;

/// Why a line was rejected.
#[derive(Debug, Error)]
pub enum LineError {
    #[error(transparent)]
    Level(#[from] EventError),

    #[error("missing logger name")]
    MissingLogger,
}

/// One parsed input line, borrowing from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub level: Level,
    pub logger: &'a str,
    pub message: &'a str,
}

impl<'a> ParsedLine<'a> {
    /// Parses `line`. Blank lines and `#` comments yield `Ok(None)`.
    ///
    /// The message is everything after the logger with surrounding
    /// whitespace trimmed; it may be empty.
    pub fn parse(line: &'a str) -> Result<Option<Self>, LineError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (level, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let level: Level = level.parse()?;

        let rest = rest.trim_start();
        if rest.is_empty() {
            return Err(LineError::MissingLogger);
        }
        let (logger, message) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

        Ok(Some(Self {
            level,
            logger,
            message: message.trim(),
        }))
    }

    #[track_caller]
    pub fn record(&self) -> LogRecord<'a> {
        LogRecord::new(self.level, self.logger, self.message)
    }
}
