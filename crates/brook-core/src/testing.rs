//! Test doubles for sinks and evaluators.
//!
//! Available in this crate's tests and, for dependents, behind the
//! `test-utils` feature.

use crate::{Sink, SinkError, TriggerEvaluator};
use brook_event::{Event, Level};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Builds an event from logger `"test"`.
#[must_use]
pub fn event(level: Level, message: &str) -> Event {
    Event::new(level, "test", message)
}

/// Sink that records every batch it receives.
#[derive(Debug)]
pub struct RecordingSink {
    name: String,
    batches: Mutex<Vec<Vec<Event>>>,
    closes: AtomicUsize,
}

impl RecordingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
        }
    }

    pub fn shared(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    /// Every batch received, in order.
    #[must_use]
    pub fn batches(&self) -> Vec<Vec<Event>> {
        self.batches.lock().clone()
    }

    /// Messages of every batch received, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<Vec<String>> {
        self.batches
            .lock()
            .iter()
            .map(|b| b.iter().map(|e| e.message().to_string()).collect())
            .collect()
    }

    /// Messages of all batches, flattened.
    #[must_use]
    pub fn all_messages(&self) -> Vec<String> {
        self.messages().into_iter().flatten().collect()
    }

    #[must_use]
    pub fn send_count(&self) -> usize {
        self.batches.lock().len()
    }

    #[must_use]
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Sink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, batch: &[Event]) -> Result<(), SinkError> {
        self.batches.lock().push(batch.to_vec());
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink whose `send` always fails.
#[derive(Debug)]
pub struct FailingSink {
    name: String,
    attempts: AtomicUsize,
    fail_close: bool,
}

impl FailingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attempts: AtomicUsize::new(0),
            fail_close: false,
        }
    }

    /// A sink that fails on `close` as well.
    pub fn failing_close(name: impl Into<String>) -> Self {
        Self {
            fail_close: true,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Sink for FailingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, _batch: &[Event]) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Rejected(format!("{} is down", self.name)))
    }

    fn close(&self) -> Result<(), SinkError> {
        if self.fail_close {
            Err(SinkError::Io(std::io::Error::other("close failed")))
        } else {
            Ok(())
        }
    }
}

/// Wraps an evaluator and counts how often it is consulted.
pub struct CountingEvaluator {
    inner: Arc<dyn TriggerEvaluator>,
    calls: Arc<AtomicUsize>,
}

impl CountingEvaluator {
    pub fn new(inner: Arc<dyn TriggerEvaluator>) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle to the call counter.
    #[must_use]
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl TriggerEvaluator for CountingEvaluator {
    fn is_triggering_event(&self, event: &Event) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.is_triggering_event(event)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
