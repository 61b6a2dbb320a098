//! Counters and discard bookkeeping.

use brook_event::{Event, Level};
use serde::Serialize;

/// What one dispatcher operation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Events handed to sinks.
    pub forwarded: usize,
    /// Events dropped without forwarding.
    pub discarded: usize,
    /// Sink invocations (0 or 1 per operation).
    pub batches: usize,
}

impl DispatchReport {
    /// True if nothing was forwarded or discarded.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.forwarded == 0 && self.discarded == 0
    }
}

/// Lifetime counters of a dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatcherStats {
    pub appended: u64,
    pub forwarded: u64,
    pub discarded: u64,
    pub batches: u64,
    /// Sink invocations that returned an error.
    pub failed_deliveries: u64,
}

impl DispatcherStats {
    pub(crate) fn record(&mut self, report: &DispatchReport) {
        self.forwarded += report.forwarded as u64;
        self.discarded += report.discarded as u64;
        self.batches += report.batches as u64;
    }
}

/// Discarded events from one logger.
///
/// Keeps the count and the first event seen at the highest level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscardSummary {
    pub logger_name: String,
    pub count: u64,
    pub max_level: Level,
    pub max_message: String,
}

impl DiscardSummary {
    pub(crate) fn new(event: &Event) -> Self {
        Self {
            logger_name: event.logger_name().to_string(),
            count: 1,
            max_level: event.level(),
            max_message: event.message().to_string(),
        }
    }

    pub(crate) fn add(&mut self, event: &Event) {
        self.count += 1;
        if event.level() > self.max_level {
            self.max_level = event.level();
            self.max_message = event.message().to_string();
        }
    }

    /// One-line human-readable summary.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "discarded {} event(s) from '{}'; most severe {}: {}",
            self.count, self.logger_name, self.max_level, self.max_message
        )
    }
}
