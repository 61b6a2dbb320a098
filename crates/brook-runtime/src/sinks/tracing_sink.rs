//! Sink that re-emits events through `tracing`.

use brook_core::{Sink, SinkError};
use brook_event::{Event, Level};

/// Target used for every re-emitted event.
pub const TRACING_SINK_TARGET: &str = "brook::forwarded";

/// Forwards each event to the active `tracing` subscriber.
///
/// `FATAL` is emitted at `ERROR`, the highest `tracing` level.
#[derive(Debug, Clone)]
pub struct TracingSink {
    name: String,
}

impl TracingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new("tracing")
    }
}

macro_rules! emit {
    ($macro:ident, $event:expr) => {
        tracing::$macro!(
            target: TRACING_SINK_TARGET,
            logger = $event.logger_name(),
            thread = $event.thread_name().unwrap_or("-"),
            id = %$event.id(),
            "{}",
            $event.message()
        )
    };
}

impl Sink for TracingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, batch: &[Event]) -> Result<(), SinkError> {
        for event in batch {
            match event.level() {
                Level::Trace => emit!(trace, event),
                Level::Debug => emit!(debug, event),
                Level::Info => emit!(info, event),
                Level::Warn => emit!(warn, event),
                Level::Error | Level::Fatal => emit!(error, event),
            }
        }
        Ok(())
    }
}
