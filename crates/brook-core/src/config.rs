//! Declarative dispatcher configuration.
//!
//! # Example
//!
//! ```toml
//! [dispatcher]
//! name = "audit"
//! buffer_size = 128
//! lossy = true
//! evaluator = "adaptive"
//! lossy_evaluator = { kind = "level_threshold", threshold = "ERROR" }
//! capture_flags = ["partial", "location"]
//! ```
//!
//! The camelCase spellings `bufferSize`, `evaluatorClass`,
//! `lossyEvaluatorClass` and `captureFlags` are accepted as aliases.

use crate::{BufferError, EvaluatorDef};
use brook_event::CaptureFlags;
use serde::{Deserialize, Serialize};

/// Buffer capacity used when none is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 512;

/// Dispatcher name used when none is configured.
pub const DEFAULT_DISPATCHER_NAME: &str = "brook";

/// Settings for one [`BufferDispatcher`](crate::BufferDispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Name used in logs and errors.
    pub name: String,

    /// Ring capacity. `1` means events are forwarded or dropped
    /// individually, without buffering.
    #[serde(alias = "bufferSize")]
    pub buffer_size: usize,

    /// Drop events on overflow instead of forwarding them.
    pub lossy: bool,

    /// Primary trigger evaluator.
    #[serde(alias = "evaluatorClass", skip_serializing_if = "Option::is_none")]
    pub evaluator: Option<EvaluatorDef>,

    /// Secondary evaluator consulted for events a lossy dispatcher is
    /// about to drop.
    #[serde(
        alias = "lossyEvaluator",
        alias = "lossyEvaluatorClass",
        skip_serializing_if = "Option::is_none"
    )]
    pub lossy_evaluator: Option<EvaluatorDef>,

    /// Names accepted by [`CaptureFlags::parse`].
    #[serde(alias = "captureFlags")]
    pub capture_flags: Vec<String>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DISPATCHER_NAME.into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            lossy: false,
            evaluator: None,
            lossy_evaluator: None,
            capture_flags: vec!["all".into()],
        }
    }
}

impl DispatcherConfig {
    /// Checks values that cannot be represented by the type alone.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidConfiguration`] for an empty name, a zero
    /// buffer size or an unknown capture flag.
    pub fn validate(&self) -> Result<(), BufferError> {
        if self.name.trim().is_empty() {
            return Err(BufferError::invalid_configuration(
                "dispatcher name must not be empty",
            ));
        }
        if self.buffer_size == 0 {
            return Err(BufferError::invalid_configuration(
                "buffer_size must be positive",
            ));
        }
        self.capture()?;
        Ok(())
    }

    /// Resolves [`capture_flags`](Self::capture_flags).
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidConfiguration`] for an unknown flag name.
    pub fn capture(&self) -> Result<CaptureFlags, BufferError> {
        CaptureFlags::from_names(&self.capture_flags)
            .map_err(|e| BufferError::invalid_configuration(e.to_string()))
    }

    /// Overlays every field `overrides` sets, leaving the rest.
    pub fn apply(&mut self, overrides: &DispatcherOverrides) {
        if let Some(ref name) = overrides.name {
            self.name.clone_from(name);
        }
        if let Some(size) = overrides.buffer_size {
            self.buffer_size = size;
        }
        if let Some(lossy) = overrides.lossy {
            self.lossy = lossy;
        }
        if overrides.evaluator.is_some() {
            self.evaluator.clone_from(&overrides.evaluator);
        }
        if overrides.lossy_evaluator.is_some() {
            self.lossy_evaluator.clone_from(&overrides.lossy_evaluator);
        }
        if let Some(ref flags) = overrides.capture_flags {
            self.capture_flags.clone_from(flags);
        }
    }
}

/// One configuration layer's `[dispatcher]` table.
///
/// Only the keys present in the layer are `Some`, so a later layer can
/// set a field back to its default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DispatcherOverrides {
    pub name: Option<String>,

    #[serde(alias = "bufferSize")]
    pub buffer_size: Option<usize>,

    pub lossy: Option<bool>,

    #[serde(alias = "evaluatorClass")]
    pub evaluator: Option<EvaluatorDef>,

    #[serde(alias = "lossyEvaluator", alias = "lossyEvaluatorClass")]
    pub lossy_evaluator: Option<EvaluatorDef>,

    #[serde(alias = "captureFlags")]
    pub capture_flags: Option<Vec<String>>,
}
