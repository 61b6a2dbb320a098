//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use super::ConfigError;
use brook_core::{DispatcherConfig, DispatcherOverrides};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers.
///
/// # Example
///
/// ```
/// use brook_runtime::config::BrookConfig;
///
/// let config = BrookConfig::default();
/// assert_eq!(config.dispatcher.buffer_size, 512);
/// assert!(config.sinks.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BrookConfig {
    /// Buffering policy.
    pub dispatcher: DispatcherConfig,

    /// Sinks attached in declaration order.
    pub sinks: Vec<SinkDef>,

    /// Periodic flush.
    pub flush: FlushConfig,
}

impl BrookConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Applies one config file layer on top of this config.
    ///
    /// Every dispatcher and flush key present in `layer` overrides the
    /// current value, including keys set back to their defaults. Named
    /// sinks replace a sink of the same name; unnamed sinks are appended.
    pub fn apply(&mut self, layer: &ConfigLayer) {
        self.dispatcher.apply(&layer.dispatcher);
        if let Some(interval_ms) = layer.flush.interval_ms {
            self.flush.interval_ms = interval_ms;
        }

        for sink in &layer.sinks {
            if let Some(name) = &sink.name {
                self.sinks.retain(|s| s.name.as_deref() != Some(name));
            }
            self.sinks.push(sink.clone());
        }
    }

    /// Checks the layered config.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Dispatcher`] for invalid dispatcher settings
    /// - [`ConfigError::InvalidSink`] for a sink missing a required path
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dispatcher.validate()?;
        for sink in &self.sinks {
            sink.validate().map_err(|message| {
                ConfigError::invalid_sink(sink.display_name(), sink.kind.as_str(), message)
            })?;
        }
        Ok(())
    }
}

/// Built-in sink kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Text lines on stdout.
    Console,
    /// Text lines on stderr.
    Stderr,
    /// Text lines appended to `path`.
    File,
    /// One JSON object per line, to `path` or stdout.
    Jsonl,
    /// Re-emitted as `tracing` events.
    Tracing,
}

impl SinkKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Stderr => "stderr",
            Self::File => "file",
            Self::Jsonl => "jsonl",
            Self::Tracing => "tracing",
        }
    }

    /// Whether `path` must be set.
    #[must_use]
    pub fn requires_path(self) -> bool {
        matches!(self, Self::File)
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink declaration.
///
/// ```toml
/// [[sinks]]
/// kind = "file"
/// name = "audit-log"
/// path = "/var/log/audit.log"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkDef {
    pub kind: SinkKind,

    /// Lookup name; defaults to the kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl SinkDef {
    #[must_use]
    pub fn new(kind: SinkKind) -> Self {
        Self {
            kind,
            name: None,
            path: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Name the sink is registered under.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.as_str())
    }

    fn validate(&self) -> Result<(), String> {
        if self.kind.requires_path() && self.path.is_none() {
            return Err("missing required 'path'".into());
        }
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name must not be empty".into());
        }
        Ok(())
    }
}

/// Periodic flush configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FlushConfig {
    /// Milliseconds between `flush(false)` calls; 0 disables the timer.
    pub interval_ms: u64,
}

impl FlushConfig {
    /// The timer period, if enabled.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_ms > 0).then(|| Duration::from_millis(self.interval_ms))
    }
}

/// One config file as written, before it is layered onto the defaults.
///
/// Unlike [`BrookConfig`], scalar keys keep track of whether they were
/// present, so a project file can undo a global setting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub dispatcher: DispatcherOverrides,
    pub sinks: Vec<SinkDef>,
    pub flush: FlushOverrides,
}

impl ConfigLayer {
    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// The `[flush]` table of a [`ConfigLayer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FlushOverrides {
    pub interval_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use brook_core::EvaluatorDef;
    use brook_types::ErrorCode;

    #[test]
    fn default_is_valid() {
        let config = BrookConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.flush.interval().is_none());
    }

    #[test]
    fn parse_full_config() {
        let config = BrookConfig::from_toml(
            r#"
[dispatcher]
name = "audit"
bufferSize = 64
lossy = true
evaluator = "adaptive"
lossy_evaluator = { kind = "level_threshold", threshold = "ERROR" }

[[sinks]]
kind = "console"

[[sinks]]
kind = "file"
name = "audit-log"
path = "/tmp/audit.log"

[flush]
interval_ms = 250
"#,
        )
        .expect("parse");

        assert_eq!(config.dispatcher.name, "audit");
        assert_eq!(config.dispatcher.buffer_size, 64);
        assert!(config.dispatcher.lossy);
        assert_eq!(config.dispatcher.evaluator, Some(EvaluatorDef::named("adaptive")));
        assert_eq!(config.sinks.len(), 2);
        assert_eq!(config.sinks[0].display_name(), "console");
        assert_eq!(config.sinks[1].display_name(), "audit-log");
        assert_eq!(config.flush.interval(), Some(Duration::from_millis(250)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_sink_kind_fails_parse() {
        let result = BrookConfig::from_toml(
            r#"
[[sinks]]
kind = "carrier-pigeon"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn file_sink_requires_path() {
        let config = BrookConfig {
            sinks: vec![SinkDef::new(SinkKind::Console), SinkDef::new(SinkKind::File)],
            ..Default::default()
        };
        let err = config.validate().err().expect("should reject");
        assert_eq!(err.code(), "CONFIG_INVALID_SINK");
        assert!(err.to_string().contains("'file' (file)"));
    }

    #[test]
    fn zero_buffer_size_rejected() {
        let mut config = BrookConfig::default();
        config.dispatcher.buffer_size = 0;
        let err = config.validate().err().expect("should reject");
        assert_eq!(err.code(), "CONFIG_DISPATCHER");
    }

    #[test]
    fn apply_named_sinks_replace() {
        let mut base = BrookConfig {
            sinks: vec![
                SinkDef::new(SinkKind::File)
                    .with_name("main")
                    .with_path("/old.log"),
                SinkDef::new(SinkKind::Console),
            ],
            ..Default::default()
        };
        let layer = ConfigLayer {
            sinks: vec![
                SinkDef::new(SinkKind::File)
                    .with_name("main")
                    .with_path("/new.log"),
                SinkDef::new(SinkKind::Tracing),
            ],
            ..Default::default()
        };

        base.apply(&layer);
        let kinds: Vec<&str> = base.sinks.iter().map(SinkDef::display_name).collect();
        assert_eq!(kinds, vec!["console", "main", "tracing"]);
        assert_eq!(base.sinks[1].path, Some(PathBuf::from("/new.log")));
    }

    #[test]
    fn apply_flush_interval() {
        let mut base = BrookConfig::default();
        base.flush.interval_ms = 100;
        base.apply(&ConfigLayer::default());
        assert_eq!(base.flush.interval_ms, 100);

        base.apply(&ConfigLayer::from_toml("[flush]\ninterval_ms = 0\n").expect("parse"));
        assert_eq!(base.flush.interval_ms, 0);
        assert!(base.flush.interval().is_none());
    }

    #[test]
    fn layer_parses_same_keys_as_config() {
        let layer = ConfigLayer::from_toml(
            r#"
[dispatcher]
bufferSize = 64
lossy = false

[[sinks]]
kind = "stderr"
"#,
        )
        .expect("parse");

        assert_eq!(layer.dispatcher.buffer_size, Some(64));
        assert_eq!(layer.dispatcher.lossy, Some(false));
        assert_eq!(layer.dispatcher.evaluator, None);
        assert_eq!(layer.flush.interval_ms, None);
        assert_eq!(layer.sinks, vec![SinkDef::new(SinkKind::Stderr)]);
    }

    #[test]
    fn toml_round_trip() {
        let mut config = BrookConfig::default();
        config.dispatcher.lossy = true;
        config.sinks.push(SinkDef::new(SinkKind::Jsonl).with_path("/tmp/x.jsonl"));
        config.flush.interval_ms = 1000;

        let text = config.to_toml().expect("serialize");
        let parsed = BrookConfig::from_toml(&text).expect("parse");
        assert_eq!(parsed, config);
    }
}
