//! Runtime wiring for brook: layered configuration and built-in sinks.
//!
//! # Overview
//!
//! ```text
//!  ~/.brook/config.toml ─┐
//!  .brook/config.toml  ──┼─► ConfigLoader ─► BrookConfig ─► build_dispatcher
//!  BROOK_* env vars    ──┘                                     │
//!                                                              ▼
//!                                     Arc<BufferDispatcher> + configured sinks
//! ```
//!
//! # Example
//!
//! ```
//! use brook_core::EvaluatorFactory;
//! use brook_event::{Event, Level};
//! use brook_runtime::build_dispatcher;
//! use brook_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .skip_global_config()
//!     .skip_project_config()
//!     .skip_env_vars()
//!     .load()?;
//!
//! let dispatcher = build_dispatcher(&config, &EvaluatorFactory::default())?;
//! dispatcher.append(Event::new(Level::Info, "app", "started"))?;
//! dispatcher.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
pub mod config;
pub mod sinks;

pub use builder::{build_dispatcher, build_sink};
