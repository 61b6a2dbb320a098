//! Buffering dispatcher.
//!
//! # State machine
//!
//! ```text
//!                 append(e)
//!                    │
//!        ┌───────────┴────────────┐
//!   capacity <= 1            capacity > 1
//!        │                        │
//!  forward e if               insert e into ring
//!  !lossy or primary(e)           │
//!  or secondary(e);        ┌──────┴───────┐
//!  else discard          no eviction    evicted x
//!                          │              │
//!                   primary(e)?     ┌─────┴─────┐
//!                   send all      !lossy       lossy
//!                                   │            │
//!                          send x + preceding    x kept iff secondary(x)
//!                          (or x + all when      then primary(e)?
//!                           primary(e))            send [x] + all
//!                                                else send [x] if kept
//! ```
//!
//! Every path holds the dispatcher's lock for its whole duration,
//! including sink calls, so batches reach each sink in the order they
//! were produced and no event is sent twice.
//!
//! # Flush
//!
//! | Mode | `flush(false)` | `flush(true)` |
//! |------|----------------|---------------|
//! | non-lossy | send all | send all |
//! | lossy | no-op | send events accepted by the secondary evaluator, discard the rest |
//!
//! `close()` runs `flush(true)` and then closes every attached sink.

use crate::buffer::BoundedEventBuffer;
use crate::config::{DispatcherConfig, DEFAULT_BUFFER_SIZE, DEFAULT_DISPATCHER_NAME};
use crate::stats::{DiscardSummary, DispatchReport, DispatcherStats};
use crate::{BufferError, DeliveryError, EvaluatorFactory, SinkRegistry, TriggerEvaluator};
use brook_event::{CaptureFlags, Event, LogRecord};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type SharedEvaluator = Arc<dyn TriggerEvaluator>;

fn fires(evaluator: Option<&SharedEvaluator>, event: &Event) -> bool {
    evaluator.is_some_and(|ev| ev.is_triggering_event(event))
}

/// Events leaving the buffer as the result of one operation.
#[derive(Default)]
struct Outcome {
    batch: Vec<Event>,
    discarded: Vec<Event>,
}

impl Outcome {
    fn send(batch: Vec<Event>) -> Self {
        Self {
            batch,
            discarded: Vec::new(),
        }
    }

    fn discard(discarded: Vec<Event>) -> Self {
        Self {
            batch: Vec::new(),
            discarded,
        }
    }
}

struct DispatchState {
    /// `None` when capacity is 1: events are handled one at a time.
    buffer: Option<BoundedEventBuffer>,
    evaluator: Option<SharedEvaluator>,
    lossy_evaluator: Option<SharedEvaluator>,
    closed: bool,
    stats: DispatcherStats,
    discards: BTreeMap<String, DiscardSummary>,
}

impl DispatchState {
    fn plan_append(&mut self, event: Event, lossy: bool) -> Outcome {
        let triggered = fires(self.evaluator.as_ref(), &event);

        let Some(buffer) = self.buffer.as_mut() else {
            let forward = !lossy || triggered || fires(self.lossy_evaluator.as_ref(), &event);
            return if forward {
                Outcome::send(vec![event])
            } else {
                Outcome::discard(vec![event])
            };
        };

        match buffer.try_insert(event) {
            None if triggered => Outcome::send(buffer.drain_all()),
            None => Outcome::default(),
            Some(evicted) if !lossy => {
                let mut batch = vec![evicted];
                if triggered {
                    batch.extend(buffer.drain_all());
                } else {
                    batch.extend(buffer.drain_preceding());
                }
                Outcome::send(batch)
            }
            Some(evicted) => {
                let mut outcome = Outcome::default();
                if fires(self.lossy_evaluator.as_ref(), &evicted) {
                    outcome.batch.push(evicted);
                } else {
                    outcome.discarded.push(evicted);
                }
                if triggered {
                    outcome.batch.extend(buffer.drain_all());
                }
                outcome
            }
        }
    }

    fn plan_flush(&mut self, force_lossy: bool, lossy: bool) -> Outcome {
        let Some(buffer) = self.buffer.as_mut() else {
            return Outcome::default();
        };
        if buffer.is_empty() {
            return Outcome::default();
        }
        if !lossy {
            return Outcome::send(buffer.drain_all());
        }
        if !force_lossy {
            return Outcome::default();
        }
        match self.lossy_evaluator.as_ref() {
            Some(ev) => {
                let (batch, discarded): (Vec<Event>, Vec<Event>) = buffer
                    .drain_all()
                    .into_iter()
                    .partition(|e| ev.is_triggering_event(e));
                Outcome { batch, discarded }
            }
            None => Outcome::discard(buffer.drain_all()),
        }
    }

    fn record_discards(&mut self, events: &[Event]) {
        for event in events {
            self.discards
                .entry(event.logger_name().to_string())
                .and_modify(|s| s.add(event))
                .or_insert_with(|| DiscardSummary::new(event));
        }
    }
}

/// Buffers events and forwards them to attached sinks in batches.
///
/// All operations take `&self`; share a dispatcher between threads
/// with `Arc<BufferDispatcher>`.
///
/// # Example
///
/// ```
/// use brook_core::{AdaptiveEvaluator, BufferDispatcher, Sink, SinkError};
/// use brook_event::{Event, Level};
/// use std::sync::Arc;
///
/// struct Stdout;
///
/// impl Sink for Stdout {
///     fn name(&self) -> &str {
///         "stdout"
///     }
///     fn send(&self, batch: &[Event]) -> Result<(), SinkError> {
///         for e in batch {
///             println!("{} {}", e.level(), e.message());
///         }
///         Ok(())
///     }
/// }
///
/// let dispatcher = BufferDispatcher::builder("app")
///     .buffer_size(8)
///     .evaluator(Arc::new(AdaptiveEvaluator))
///     .build()
///     .unwrap();
/// dispatcher.sinks().attach(Arc::new(Stdout));
///
/// dispatcher.append(Event::new(Level::Info, "app", "starting")).unwrap();
/// assert_eq!(dispatcher.len(), 1);
///
/// let report = dispatcher.append(Event::new(Level::Error, "app", "boom")).unwrap();
/// assert_eq!(report.forwarded, 2);
/// assert!(dispatcher.is_empty());
/// ```
pub struct BufferDispatcher {
    name: String,
    capacity: usize,
    lossy: bool,
    capture: CaptureFlags,
    state: Mutex<DispatchState>,
    sinks: SinkRegistry,
}

impl BufferDispatcher {
    /// Starts building a dispatcher named `name`.
    pub fn builder(name: impl Into<String>) -> DispatcherBuilder {
        DispatcherBuilder::new(name)
    }

    /// Builds a dispatcher from declarative configuration.
    ///
    /// Evaluators that cannot be instantiated are logged and treated as
    /// absent.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidConfiguration`] if `config` fails validation.
    pub fn from_config(
        config: &DispatcherConfig,
        factory: &EvaluatorFactory,
    ) -> Result<Self, BufferError> {
        config.validate()?;
        let mut builder = Self::builder(config.name.clone())
            .buffer_size(config.buffer_size)
            .lossy(config.lossy)
            .capture_flags(config.capture()?);
        if let Some(ev) = factory.resolve(config.evaluator.as_ref(), "evaluator") {
            builder = builder.evaluator(ev);
        }
        if let Some(ev) = factory.resolve(config.lossy_evaluator.as_ref(), "lossy_evaluator") {
            builder = builder.lossy_evaluator(ev);
        }
        builder.build()
    }

    /// Buffers `event`, forwarding whatever the state machine releases.
    ///
    /// # Errors
    ///
    /// - [`BufferError::Closed`] after [`close`](Self::close).
    /// - [`BufferError::Delivery`] if a sink rejected the batch. The
    ///   buffer has already been updated and the batch is not retried.
    pub fn append(&self, event: Event) -> Result<DispatchReport, BufferError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(BufferError::Closed(self.name.clone()));
        }
        state.stats.appended += 1;
        let outcome = state.plan_append(event, self.lossy);
        self.deliver(&mut state, outcome)
    }

    /// Captures `record` with this dispatcher's [`CaptureFlags`] and
    /// appends the result.
    ///
    /// Capture runs on the calling thread before the lock is taken.
    ///
    /// # Errors
    ///
    /// Same as [`append`](Self::append).
    pub fn append_record(&self, record: &LogRecord<'_>) -> Result<DispatchReport, BufferError> {
        self.append(Event::capture(record, self.capture))
    }

    /// Appends each event in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Same as [`append`](Self::append).
    pub fn append_all<I>(&self, events: I) -> Result<DispatchReport, BufferError>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut total = DispatchReport::default();
        for event in events {
            let report = self.append(event)?;
            total.forwarded += report.forwarded;
            total.discarded += report.discarded;
            total.batches += report.batches;
        }
        Ok(total)
    }

    /// Empties the buffer according to the lossy mode.
    ///
    /// With `force_lossy`, a lossy dispatcher forwards the buffered
    /// events its secondary evaluator accepts and discards the rest.
    /// Without it, a lossy dispatcher keeps its buffer.
    ///
    /// # Errors
    ///
    /// [`BufferError::Delivery`] if a sink rejected the batch.
    pub fn flush(&self, force_lossy: bool) -> Result<DispatchReport, BufferError> {
        let mut state = self.state.lock();
        let outcome = state.plan_flush(force_lossy, self.lossy);
        self.deliver(&mut state, outcome)
    }

    /// `flush(false)` that gives up if the lock is not acquired within
    /// `timeout`.
    ///
    /// Returns `Ok(false)` on timeout, `Ok(true)` once the flush ran.
    ///
    /// # Errors
    ///
    /// [`BufferError::Delivery`] if a sink rejected the batch.
    pub fn flush_timeout(&self, timeout: Duration) -> Result<bool, BufferError> {
        let Some(mut state) = self.state.try_lock_for(timeout) else {
            tracing::debug!(dispatcher = %self.name, ?timeout, "flush timed out waiting for lock");
            return Ok(false);
        };
        let outcome = state.plan_flush(false, self.lossy);
        self.deliver(&mut state, outcome)?;
        Ok(true)
    }

    /// Flushes with `force_lossy = true`, then closes every attached sink.
    ///
    /// Idempotent: a second call is a no-op. Later appends fail with
    /// [`BufferError::Closed`].
    ///
    /// # Errors
    ///
    /// [`BufferError::Delivery`] collecting send and close failures. The
    /// dispatcher is closed either way.
    pub fn close(&self) -> Result<DispatchReport, BufferError> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(DispatchReport::default());
        }
        state.closed = true;

        let outcome = state.plan_flush(true, self.lossy);
        let flushed = self.deliver(&mut state, outcome);
        let close_failures = self.sinks.close_all();
        for failure in &close_failures {
            tracing::warn!(dispatcher = %self.name, sink = %failure.sink, error = %failure.error, "sink failed to close");
        }

        let stats = state.stats;
        tracing::debug!(
            dispatcher = %self.name,
            forwarded = stats.forwarded,
            discarded = stats.discarded,
            "dispatcher closed"
        );

        match flushed {
            Ok(report) if close_failures.is_empty() => Ok(report),
            Ok(report) => Err(DeliveryError {
                failures: close_failures,
                report,
            }
            .into()),
            Err(BufferError::Delivery(mut delivery)) => {
                delivery.failures.extend(close_failures);
                Err(delivery.into())
            }
            Err(other) => Err(other),
        }
    }

    fn deliver(
        &self,
        state: &mut DispatchState,
        outcome: Outcome,
    ) -> Result<DispatchReport, BufferError> {
        let Outcome { batch, discarded } = outcome;
        let report = DispatchReport {
            forwarded: batch.len(),
            discarded: discarded.len(),
            batches: usize::from(!batch.is_empty()),
        };
        state.stats.record(&report);

        if !discarded.is_empty() {
            state.record_discards(&discarded);
            tracing::debug!(dispatcher = %self.name, count = discarded.len(), "discarded events");
        }
        if batch.is_empty() {
            return Ok(report);
        }

        tracing::trace!(dispatcher = %self.name, size = batch.len(), "forwarding batch");
        let failures = self.sinks.deliver(&batch);
        if failures.is_empty() {
            return Ok(report);
        }

        state.stats.failed_deliveries += failures.len() as u64;
        for failure in &failures {
            tracing::warn!(
                dispatcher = %self.name,
                sink = %failure.sink,
                error = %failure.error,
                size = batch.len(),
                "sink failed to accept batch"
            );
        }
        Err(DeliveryError { failures, report }.into())
    }

    /// Replaces the primary evaluator. `None` disables trigger flushes.
    pub fn set_evaluator(&self, evaluator: Option<Arc<dyn TriggerEvaluator>>) {
        self.state.lock().evaluator = evaluator;
    }

    /// Replaces the secondary evaluator.
    pub fn set_lossy_evaluator(&self, evaluator: Option<Arc<dyn TriggerEvaluator>>) {
        self.state.lock().lossy_evaluator = evaluator;
    }

    #[must_use]
    pub fn evaluator(&self) -> Option<Arc<dyn TriggerEvaluator>> {
        self.state.lock().evaluator.clone()
    }

    #[must_use]
    pub fn lossy_evaluator(&self) -> Option<Arc<dyn TriggerEvaluator>> {
        self.state.lock().lossy_evaluator.clone()
    }

    /// Sinks this dispatcher forwards to.
    #[must_use]
    pub fn sinks(&self) -> &SinkRegistry {
        &self.sinks
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn is_lossy(&self) -> bool {
        self.lossy
    }

    #[must_use]
    pub fn capture_flags(&self) -> CaptureFlags {
        self.capture
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .buffer
            .as_ref()
            .map_or(0, BoundedEventBuffer::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies of the buffered events, oldest first.
    #[must_use]
    pub fn buffered(&self) -> Vec<Event> {
        self.state
            .lock()
            .buffer
            .as_ref()
            .map(|b| b.peek_all().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn stats(&self) -> DispatcherStats {
        self.state.lock().stats
    }

    /// Per-logger summaries of discarded events, ordered by logger name.
    #[must_use]
    pub fn discard_summaries(&self) -> Vec<DiscardSummary> {
        self.state.lock().discards.values().cloned().collect()
    }
}

impl fmt::Debug for BufferDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BufferDispatcher")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("lossy", &self.lossy)
            .field("buffered", &state.buffer.as_ref().map_or(0, BoundedEventBuffer::len))
            .field("evaluator", &state.evaluator.as_ref().map(|e| e.name()))
            .field("lossy_evaluator", &state.lossy_evaluator.as_ref().map(|e| e.name()))
            .field("closed", &state.closed)
            .field("sinks", &self.sinks)
            .finish()
    }
}

/// Builder for [`BufferDispatcher`].
///
/// Capacity and lossy mode are fixed once built.
#[must_use]
pub struct DispatcherBuilder {
    name: String,
    buffer_size: usize,
    lossy: bool,
    capture: CaptureFlags,
    evaluator: Option<SharedEvaluator>,
    lossy_evaluator: Option<SharedEvaluator>,
}

impl DispatcherBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            lossy: false,
            capture: CaptureFlags::ALL,
            evaluator: None,
            lossy_evaluator: None,
        }
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn lossy(mut self, lossy: bool) -> Self {
        self.lossy = lossy;
        self
    }

    pub fn capture_flags(mut self, flags: CaptureFlags) -> Self {
        self.capture = flags;
        self
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn TriggerEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn lossy_evaluator(mut self, evaluator: Arc<dyn TriggerEvaluator>) -> Self {
        self.lossy_evaluator = Some(evaluator);
        self
    }

    /// Builds the dispatcher.
    ///
    /// A lossy dispatcher without a primary evaluator is accepted but
    /// logged: it will discard everything that overflows.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidConfiguration`] for a zero buffer size or an
    /// empty name.
    pub fn build(self) -> Result<BufferDispatcher, BufferError> {
        if self.name.trim().is_empty() {
            return Err(BufferError::invalid_configuration(
                "dispatcher name must not be empty",
            ));
        }
        let name = self.name;
        if self.buffer_size == 0 {
            return Err(BufferError::invalid_configuration(
                "buffer_size must be positive",
            ));
        }
        let buffer = if self.buffer_size > 1 {
            Some(BoundedEventBuffer::new(self.buffer_size)?)
        } else {
            None
        };

        if self.lossy && self.evaluator.is_none() {
            tracing::warn!(dispatcher = %name, "lossy dispatcher has no evaluator; overflowing events will be discarded");
        }
        tracing::debug!(
            dispatcher = %name,
            capacity = self.buffer_size,
            lossy = self.lossy,
            "dispatcher ready"
        );

        Ok(BufferDispatcher {
            name,
            capacity: self.buffer_size,
            lossy: self.lossy,
            capture: self.capture,
            state: Mutex::new(DispatchState {
                buffer,
                evaluator: self.evaluator,
                lossy_evaluator: self.lossy_evaluator,
                closed: false,
                stats: DispatcherStats::default(),
                discards: BTreeMap::new(),
            }),
            sinks: SinkRegistry::new(),
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DISPATCHER_NAME)
    }
}
