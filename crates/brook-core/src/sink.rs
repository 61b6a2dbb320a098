//! Downstream consumers of event batches.

use crate::SinkError;
use brook_event::Event;

/// A destination for forwarded events.
///
/// A sink receives batches in the order the dispatcher produced them.
/// `send` is called with the dispatcher's lock held, so a sink must not
/// call back into the dispatcher that feeds it.
///
/// # Example
///
/// ```
/// use brook_core::{Sink, SinkError};
/// use brook_event::Event;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl Sink for Counter {
///     fn name(&self) -> &str {
///         "counter"
///     }
///
///     fn send(&self, batch: &[Event]) -> Result<(), SinkError> {
///         self.0.fetch_add(batch.len(), Ordering::Relaxed);
///         Ok(())
///     }
/// }
/// ```
pub trait Sink: Send + Sync {
    /// Name used for lookup and in error reports.
    fn name(&self) -> &str;

    /// Delivers one batch, oldest event first. Never called with an
    /// empty batch.
    ///
    /// # Errors
    ///
    /// Any [`SinkError`]; the dispatcher reports it and moves on.
    fn send(&self, batch: &[Event]) -> Result<(), SinkError>;

    /// Flushes and releases resources. Called once when the owning
    /// dispatcher closes.
    ///
    /// # Errors
    ///
    /// Any [`SinkError`] raised while releasing resources.
    fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
