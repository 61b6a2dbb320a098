//! Sink registry: the set of sinks a dispatcher forwards to.
//!
//! Sinks are compared by identity ([`Arc::ptr_eq`]), not by name, so two
//! distinct sinks may share a name. Attaching the same `Arc` twice is a
//! no-op.
//!
//! # Concurrency
//!
//! The registry has its own `RwLock`, separate from the dispatcher's
//! buffer lock. Delivery clones the current list of `Arc`s under the
//! read lock and calls sinks after releasing it, so a sink may attach
//! or detach sinks on the same registry while a batch is in flight.

use crate::{Sink, SinkFailure};
use brook_event::Event;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

fn same_sink<A: Sink + ?Sized, B: Sink + ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

/// Ordered collection of attached sinks.
#[derive(Default)]
pub struct SinkRegistry {
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
}

impl SinkRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `sink`. Returns `false` if it was already attached.
    pub fn attach(&self, sink: Arc<dyn Sink>) -> bool {
        let mut sinks = self.sinks.write();
        if sinks.iter().any(|s| same_sink(s, &sink)) {
            return false;
        }
        tracing::debug!(sink = sink.name(), "sink attached");
        sinks.push(sink);
        true
    }

    /// Detaches `sink`. Returns `false` if it was not attached.
    pub fn detach<S: Sink + ?Sized>(&self, sink: &Arc<S>) -> bool {
        let mut sinks = self.sinks.write();
        let before = sinks.len();
        sinks.retain(|s| !same_sink(s, sink));
        before != sinks.len()
    }

    /// Detaches every sink named `name`. Returns the number removed.
    pub fn detach_named(&self, name: &str) -> usize {
        let mut sinks = self.sinks.write();
        let before = sinks.len();
        sinks.retain(|s| s.name() != name);
        before - sinks.len()
    }

    /// Detaches every sink and returns them in attachment order.
    ///
    /// The returned sinks are not closed.
    pub fn detach_all(&self) -> Vec<Arc<dyn Sink>> {
        std::mem::take(&mut *self.sinks.write())
    }

    #[must_use]
    pub fn is_attached<S: Sink + ?Sized>(&self, sink: &Arc<S>) -> bool {
        self.sinks.read().iter().any(|s| same_sink(s, sink))
    }

    /// Snapshot of attached sinks in attachment order.
    #[must_use]
    pub fn list_attached(&self) -> Vec<Arc<dyn Sink>> {
        self.sinks.read().clone()
    }

    /// First attached sink named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Sink>> {
        self.sinks.read().iter().find(|s| s.name() == name).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.read().is_empty()
    }

    /// Sends `batch` to every attached sink in attachment order.
    ///
    /// A failing sink does not stop delivery to the rest.
    pub(crate) fn deliver(&self, batch: &[Event]) -> Vec<SinkFailure> {
        let sinks = self.list_attached();
        sinks
            .iter()
            .filter_map(|sink| {
                sink.send(batch).err().map(|error| SinkFailure {
                    sink: sink.name().to_string(),
                    error,
                })
            })
            .collect()
    }

    /// Closes every attached sink. Sinks stay attached.
    pub(crate) fn close_all(&self) -> Vec<SinkFailure> {
        let sinks = self.list_attached();
        sinks
            .iter()
            .filter_map(|sink| {
                sink.close().err().map(|error| SinkFailure {
                    sink: sink.name().to_string(),
                    error,
                })
            })
            .collect()
    }
}

impl fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .sinks
            .read()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        f.debug_struct("SinkRegistry").field("sinks", &names).finish()
    }
}
