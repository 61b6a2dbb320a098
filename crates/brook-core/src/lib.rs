//! Adaptive event buffering and forwarding.
//!
//! A [`BufferDispatcher`] keeps the most recent events in a bounded
//! ring and forwards them to its [`Sink`]s in batches:
//!
//! - when a significant event arrives (the primary
//!   [`TriggerEvaluator`] fires), the whole buffer is sent with it as
//!   context;
//! - when the ring overflows, a non-lossy dispatcher forwards the
//!   oldest events, while a lossy one drops them unless the secondary
//!   evaluator rescues them;
//! - on [`flush`](BufferDispatcher::flush) and
//!   [`close`](BufferDispatcher::close), according to the lossy mode.
//!
//! # Architecture
//!
//! ```text
//!  producer threads
//!        │  append(Event) / append_record(&LogRecord)
//!        ▼
//!  ┌────────────────────────────── BufferDispatcher ─────┐
//!  │  Mutex<DispatchState>                               │
//!  │   ├── BoundedEventBuffer (VecDeque ring)            │
//!  │   ├── primary evaluator    Option<Arc<dyn ..>>      │
//!  │   ├── secondary evaluator  Option<Arc<dyn ..>>      │
//!  │   └── stats, discard summaries                      │
//!  │  SinkRegistry (RwLock<Vec<Arc<dyn Sink>>>)          │
//!  └────────────────────────┬────────────────────────────┘
//!                           │ send(&[Event]) in attachment order
//!              ┌────────────┼────────────┐
//!              ▼            ▼            ▼
//!            Sink         Sink         Sink
//! ```
//!
//! # Crate Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  brook-cli      : stdin pipeline binary                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  brook-runtime  : layered config, built-in sinks             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  brook-core     : buffer, evaluators, dispatcher, sinks ◄─── │
//! ├──────────────────────────────────────────────────────────────┤
//! │  brook-event    : Level, Event, LogRecord, CaptureFlags      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use brook_core::{AdaptiveEvaluator, BufferDispatcher, Sink, SinkError};
//! use brook_event::{Event, Level};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Collect(Mutex<Vec<usize>>);
//!
//! impl Sink for Collect {
//!     fn name(&self) -> &str {
//!         "collect"
//!     }
//!     fn send(&self, batch: &[Event]) -> Result<(), SinkError> {
//!         self.0.lock().unwrap().push(batch.len());
//!         Ok(())
//!     }
//! }
//!
//! let sink = Arc::new(Collect::default());
//! let dispatcher = BufferDispatcher::builder("example")
//!     .buffer_size(3)
//!     .lossy(true)
//!     .evaluator(Arc::new(AdaptiveEvaluator))
//!     .build()
//!     .unwrap();
//! dispatcher.sinks().attach(sink.clone());
//!
//! for i in 0..5 {
//!     dispatcher.append(Event::new(Level::Debug, "db", format!("query {i}"))).unwrap();
//! }
//! dispatcher.append(Event::new(Level::Error, "db", "deadlock")).unwrap();
//!
//! // Only the last three events survived as context for the error.
//! assert_eq!(*sink.0.lock().unwrap(), vec![3]);
//! assert_eq!(dispatcher.stats().discarded, 3);
//! ```

mod buffer;
mod config;
mod dispatcher;
mod error;
mod evaluator;
mod factory;
mod registry;
mod sink;
mod stats;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use buffer::BoundedEventBuffer;
pub use config::{
    DispatcherConfig, DispatcherOverrides, DEFAULT_BUFFER_SIZE, DEFAULT_DISPATCHER_NAME,
};
pub use dispatcher::{BufferDispatcher, DispatcherBuilder};
pub use error::{BufferError, DeliveryError, SinkError, SinkFailure};
pub use evaluator::{
    AdaptiveEvaluator, ConstantEvaluator, FnEvaluator, LevelThresholdEvaluator, TriggerEvaluator,
};
pub use factory::{EvaluatorDef, EvaluatorFactory};
pub use registry::SinkRegistry;
pub use sink::Sink;
pub use stats::{DiscardSummary, DispatchReport, DispatcherStats};
