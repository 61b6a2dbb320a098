//! Configuration errors.

use brook_core::BufferError;
use brook_types::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Failed to serialize config.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable '{name}': {message}")]
    InvalidEnvVar { name: String, message: String },

    /// Dispatcher settings rejected.
    #[error(transparent)]
    Dispatcher(#[from] BufferError),

    /// A `[[sinks]]` entry is incomplete.
    #[error("invalid sink '{name}' ({kind}): {message}")]
    InvalidSink {
        name: String,
        kind: String,
        message: String,
    },

    /// Failed to open a sink's output file.
    #[error("failed to open sink output '{path}': {source}")]
    OpenSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Creates a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse TOML error.
    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid env var error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid sink error.
    pub fn invalid_sink(
        name: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidSink {
            name: name.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Creates an open sink error.
    pub fn open_sink(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OpenSink {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "CONFIG_READ_FILE",
            Self::ParseToml { .. } => "CONFIG_PARSE_TOML",
            Self::Serialize(_) => "CONFIG_SERIALIZE",
            Self::InvalidEnvVar { .. } => "CONFIG_INVALID_ENV_VAR",
            Self::Dispatcher(_) => "CONFIG_DISPATCHER",
            Self::InvalidSink { .. } => "CONFIG_INVALID_SINK",
            Self::OpenSink { .. } => "CONFIG_OPEN_SINK",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::ReadFile { .. } | Self::OpenSink { .. })
    }
}
