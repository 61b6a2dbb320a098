//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.brook/config.toml`)
//! 3. Project config (`.brook/config.toml`)
//! 4. Environment variables (`BROOK_*`)
//!
//! Each layer overrides the previous.

use super::{
    default_config_path, BrookConfig, ConfigError, ConfigLayer, PROJECT_CONFIG_DIR,
    PROJECT_CONFIG_FILE,
};
use brook_core::EvaluatorDef;
use brook_event::CaptureFlags;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Helper macro for parsing boolean environment variables.
macro_rules! parse_env_bool {
    ($env:expr, $field:expr, $var:literal) => {
        if let Some(val) = $env($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Helper macro for environment variables parsed through `FromStr`.
macro_rules! parse_env {
    ($env:expr, $field:expr, $var:literal, $ty:ty) => {
        if let Some(val) = $env($var) {
            $field = <$ty>::from_str(val.trim())
                .map_err(|e| ConfigError::invalid_env_var($var, e.to_string()))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use brook_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/path/to/project")
///     .skip_env_vars()
///     .load()?;
/// # Ok::<(), brook_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.brook/config.toml).
    global_config_path: Option<PathBuf>,

    /// Project root directory.
    project_root: Option<PathBuf>,

    /// Skip environment variable loading.
    skip_env: bool,

    /// Skip global config loading.
    skip_global: bool,

    /// Skip project config loading.
    skip_project: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root directory.
    ///
    /// Project config will be loaded from `<project_root>/.brook/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Skips project config loading.
    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and layers configuration from all sources.
    ///
    /// The result is not validated; see [`BrookConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any config file exists but cannot be
    /// parsed, or an environment variable holds an invalid value.
    /// Missing config files are silently ignored.
    pub fn load(&self) -> Result<BrookConfig, ConfigError> {
        let mut config = BrookConfig::default();

        // Layer 1: Global config
        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global_layer) = load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.apply(&global_layer);
            }
        }

        // Layer 2: Project config
        if !self.skip_project {
            if let Some(ref project_root) = self.project_root {
                let project_config_path = project_root
                    .join(PROJECT_CONFIG_DIR)
                    .join(PROJECT_CONFIG_FILE);

                if let Some(project_layer) = load_file(&project_config_path)? {
                    debug!(
                        path = %project_config_path.display(),
                        project = %project_root.display(),
                        "Loaded project config"
                    );
                    config.apply(&project_layer);
                }
            }
        }

        // Layer 3: Environment variables
        if !self.skip_env {
            apply_env(&mut config, |name| std::env::var(name).ok())?;
        }

        Ok(config)
    }
}

/// Loads a config file layer, returning None if it doesn't exist.
fn load_file(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let layer = ConfigLayer::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

    Ok(Some(layer))
}

/// Applies environment variable overrides read through `env`.
fn apply_env<F>(config: &mut BrookConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let dispatcher = &mut config.dispatcher;

    parse_env_bool!(env, dispatcher.lossy, "BROOK_LOSSY");
    parse_env!(env, dispatcher.buffer_size, "BROOK_BUFFER_SIZE", usize);
    parse_env!(env, config.flush.interval_ms, "BROOK_FLUSH_INTERVAL_MS", u64);

    if let Some(val) = env("BROOK_EVALUATOR") {
        dispatcher.evaluator = Some(
            EvaluatorDef::from_str(&val)
                .map_err(|e| ConfigError::invalid_env_var("BROOK_EVALUATOR", e.to_string()))?,
        );
    }
    if let Some(val) = env("BROOK_LOSSY_EVALUATOR") {
        dispatcher.lossy_evaluator = Some(
            EvaluatorDef::from_str(&val).map_err(|e| {
                ConfigError::invalid_env_var("BROOK_LOSSY_EVALUATOR", e.to_string())
            })?,
        );
    }

    // Comma-separated list, checked here so the error names the variable.
    if let Some(val) = env("BROOK_CAPTURE_FLAGS") {
        CaptureFlags::from_csv(&val)
            .map_err(|e| ConfigError::invalid_env_var("BROOK_CAPTURE_FLAGS", e.to_string()))?;
        dispatcher.capture_flags = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }

    Ok(())
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off"
/// (case-insensitive).
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
