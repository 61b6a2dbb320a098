//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! Configuration is loaded from multiple sources with priority-based merging:
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌──────────────────────────────────────────┐
//! │  1. Environment Variables (BROOK_*)      │  Runtime override
//! ├──────────────────────────────────────────┤
//! │  2. Project Config (.brook/config.toml)  │  Project-specific
//! ├──────────────────────────────────────────┤
//! │  3. Global Config (~/.brook/config.toml) │  User defaults
//! ├──────────────────────────────────────────┤
//! │  4. Default Values (compile-time)        │  Fallback
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `BROOK_BUFFER_SIZE` | `dispatcher.buffer_size` | usize |
//! | `BROOK_LOSSY` | `dispatcher.lossy` | bool |
//! | `BROOK_EVALUATOR` | `dispatcher.evaluator` | `kind[:LEVEL]` |
//! | `BROOK_LOSSY_EVALUATOR` | `dispatcher.lossy_evaluator` | `kind[:LEVEL]` |
//! | `BROOK_CAPTURE_FLAGS` | `dispatcher.capture_flags` | comma-separated |
//! | `BROOK_FLUSH_INTERVAL_MS` | `flush.interval_ms` | u64 |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.brook/config.toml
//!
//! [dispatcher]
//! name = "app"
//! buffer_size = 512
//! lossy = true
//! evaluator = "adaptive"
//! lossy_evaluator = { kind = "level_threshold", threshold = "ERROR" }
//! capture_flags = ["partial"]
//!
//! [[sinks]]
//! kind = "console"
//!
//! [[sinks]]
//! kind = "jsonl"
//! name = "archive"
//! path = "/var/log/app.jsonl"
//!
//! [flush]
//! interval_ms = 1000
//! ```

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::{BrookConfig, ConfigLayer, FlushConfig, FlushOverrides, SinkDef, SinkKind};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".brook")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".brook";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
