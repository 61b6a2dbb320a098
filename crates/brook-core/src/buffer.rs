//! Fixed-capacity FIFO ring of events.
//!
//! ```text
//!  oldest                     newest
//!    │                          │
//!    ▼                          ▼
//!  ┌────┬────┬────┬────┐
//!  │ E1 │ E2 │ E3 │ E4 │  capacity 4, full
//!  └────┴────┴────┴────┘
//!
//!  try_insert(E5) ──► returns Some(E1)
//!  ┌────┬────┬────┬────┐
//!  │ E2 │ E3 │ E4 │ E5 │
//!  └────┴────┴────┴────┘
//! ```
//!
//! Not synchronized; the dispatcher owns it behind its lock.

use crate::BufferError;
use brook_event::Event;
use std::collections::VecDeque;

/// Bounded FIFO of events that evicts the oldest on overflow.
#[derive(Debug, Clone)]
pub struct BoundedEventBuffer {
    capacity: usize,
    events: VecDeque<Event>,
}

impl BoundedEventBuffer {
    /// Creates an empty buffer.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidConfiguration`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::invalid_configuration(
                "buffer capacity must be positive",
            ));
        }
        Ok(Self {
            capacity,
            events: VecDeque::with_capacity(capacity),
        })
    }

    /// Appends `event` at the tail.
    ///
    /// Returns the evicted head when the buffer was already full.
    pub fn try_insert(&mut self, event: Event) -> Option<Event> {
        let evicted = if self.events.len() == self.capacity {
            self.events.pop_front()
        } else {
            None
        };
        self.events.push_back(event);
        evicted
    }

    /// Removes and returns every event, oldest first.
    pub fn drain_all(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    /// Removes and returns every event except the newest.
    pub fn drain_preceding(&mut self) -> Vec<Event> {
        let keep_from = self.events.len().saturating_sub(1);
        self.events.drain(..keep_from).collect()
    }

    /// Iterates over buffered events, oldest first, without removing them.
    pub fn peek_all(&self) -> impl ExactSizeIterator<Item = &Event> + '_ {
        self.events.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
