//! Name-based evaluator construction.
//!
//! Configuration refers to evaluators by kind name (`"adaptive"`,
//! `"level_threshold"`, ...). [`EvaluatorFactory`] maps those names to
//! constructors; hosts register their own kinds next to the built-ins.
//!
//! | Kind | Evaluator | Parameters |
//! |------|-----------|------------|
//! | `adaptive` | [`AdaptiveEvaluator`] | - |
//! | `level_threshold` | [`LevelThresholdEvaluator`] | `threshold` (required) |
//! | `always` | [`ConstantEvaluator::ALWAYS`] | - |
//! | `never` | [`ConstantEvaluator::NEVER`] | - |

use crate::evaluator::{
    AdaptiveEvaluator, ConstantEvaluator, LevelThresholdEvaluator, TriggerEvaluator,
};
use crate::BufferError;
use brook_event::Level;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Evaluator reference as written in configuration.
///
/// Either a bare kind name or a table with parameters:
///
/// ```toml
/// evaluator = "adaptive"
/// lossy_evaluator = { kind = "level_threshold", threshold = "ERROR" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvaluatorDef {
    Named(String),
    Detailed {
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<Level>,
    },
}

impl EvaluatorDef {
    pub fn named(kind: impl Into<String>) -> Self {
        Self::Named(kind.into())
    }

    #[must_use]
    pub fn threshold(level: Level) -> Self {
        Self::Detailed {
            kind: "level_threshold".into(),
            threshold: Some(level),
        }
    }

    /// Kind name, trimmed and lower-cased.
    #[must_use]
    pub fn kind(&self) -> String {
        match self {
            Self::Named(kind) | Self::Detailed { kind, .. } => kind.trim().to_ascii_lowercase(),
        }
    }

    #[must_use]
    pub fn threshold_level(&self) -> Option<Level> {
        match self {
            Self::Named(_) => None,
            Self::Detailed { threshold, .. } => *threshold,
        }
    }
}

impl fmt::Display for EvaluatorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.threshold_level() {
            Some(level) => write!(f, "{}:{level}", self.kind()),
            None => f.write_str(&self.kind()),
        }
    }
}

/// Parses the compact `kind[:THRESHOLD]` form used by env vars and the CLI.
///
/// ```
/// use brook_core::EvaluatorDef;
/// use brook_event::Level;
///
/// let def: EvaluatorDef = "level_threshold:error".parse().unwrap();
/// assert_eq!(def, EvaluatorDef::threshold(Level::Error));
/// ```
impl FromStr for EvaluatorDef {
    type Err = BufferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BufferError::invalid_configuration("empty evaluator name"));
        }
        match s.split_once(':') {
            None => Ok(Self::named(s)),
            Some((kind, level)) => {
                let threshold = level
                    .parse::<Level>()
                    .map_err(|e| BufferError::evaluator_instantiation(kind, e.to_string()))?;
                Ok(Self::Detailed {
                    kind: kind.trim().to_string(),
                    threshold: Some(threshold),
                })
            }
        }
    }
}

type Constructor =
    Box<dyn Fn(&EvaluatorDef) -> Result<Arc<dyn TriggerEvaluator>, BufferError> + Send + Sync>;

/// Registry of evaluator constructors keyed by kind name.
pub struct EvaluatorFactory {
    constructors: HashMap<String, Constructor>,
}

impl EvaluatorFactory {
    /// Creates a factory with no kinds registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Creates a factory with the built-in kinds.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut factory = Self::empty();
        factory.register("adaptive", |_| Ok(Arc::new(AdaptiveEvaluator)));
        factory.register("always", |_| Ok(Arc::new(ConstantEvaluator::ALWAYS)));
        factory.register("never", |_| Ok(Arc::new(ConstantEvaluator::NEVER)));
        factory.register("level_threshold", |def| {
            let threshold = def.threshold_level().ok_or_else(|| {
                BufferError::evaluator_instantiation("level_threshold", "missing threshold")
            })?;
            Ok(Arc::new(LevelThresholdEvaluator::new(threshold)))
        });
        factory
    }

    /// Registers (or replaces) the constructor for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&EvaluatorDef) -> Result<Arc<dyn TriggerEvaluator>, BufferError>
            + Send
            + Sync
            + 'static,
    {
        let kind = kind.into().to_ascii_lowercase();
        self.constructors.insert(kind, Box::new(constructor));
    }

    /// Builds the evaluator described by `def`.
    ///
    /// # Errors
    ///
    /// [`BufferError::EvaluatorInstantiation`] for an unknown kind or a
    /// constructor that rejects its parameters.
    pub fn create(&self, def: &EvaluatorDef) -> Result<Arc<dyn TriggerEvaluator>, BufferError> {
        let kind = def.kind();
        let constructor = self
            .constructors
            .get(&kind)
            .ok_or_else(|| BufferError::evaluator_instantiation(&kind, "unknown evaluator kind"))?;
        constructor(def)
    }

    /// Like [`create`](Self::create), but logs a failure and treats the
    /// evaluator as absent.
    pub fn resolve(
        &self,
        def: Option<&EvaluatorDef>,
        role: &str,
    ) -> Option<Arc<dyn TriggerEvaluator>> {
        let def = def?;
        match self.create(def) {
            Ok(evaluator) => Some(evaluator),
            Err(e) => {
                tracing::warn!(role, evaluator = %def, error = %e, "evaluator unavailable, continuing without it");
                None
            }
        }
    }

    /// Registered kind names, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl Default for EvaluatorFactory {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for EvaluatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatorFactory")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::FnEvaluator;
    use brook_event::Event;
    use brook_types::ErrorCode;

    #[test]
    fn builtin_kinds() {
        let factory = EvaluatorFactory::default();
        assert_eq!(
            factory.kinds(),
            vec!["adaptive", "always", "level_threshold", "never"]
        );
    }

    #[test]
    fn create_adaptive_case_insensitive() {
        let factory = EvaluatorFactory::default();
        let ev = factory
            .create(&EvaluatorDef::named(" Adaptive "))
            .expect("adaptive should exist");
        assert_eq!(ev.name(), "adaptive");
    }

    #[test]
    fn create_threshold() {
        let factory = EvaluatorFactory::default();
        let ev = factory
            .create(&EvaluatorDef::threshold(Level::Error))
            .expect("threshold evaluator");
        assert!(ev.is_triggering_event(&Event::new(Level::Error, "x", "m")));
        assert!(!ev.is_triggering_event(&Event::new(Level::Warn, "x", "m")));
    }

    #[test]
    fn threshold_without_level_fails() {
        let factory = EvaluatorFactory::default();
        let err = factory
            .create(&EvaluatorDef::named("level_threshold"))
            .err()
            .expect("should fail");
        assert_eq!(err.code(), "BUFFER_EVALUATOR_INSTANTIATION");
        assert!(err.to_string().contains("missing threshold"));
    }

    #[test]
    fn unknown_kind_fails_create_and_resolves_to_none() {
        let factory = EvaluatorFactory::default();
        let def = EvaluatorDef::named("com.example.Missing");
        let err = factory.create(&def).err().expect("should fail");
        assert!(matches!(err, BufferError::EvaluatorInstantiation { .. }));
        assert!(factory.resolve(Some(&def), "primary").is_none());
        assert!(factory.resolve(None, "primary").is_none());
    }

    #[test]
    fn custom_kind_registration() {
        let mut factory = EvaluatorFactory::empty();
        factory.register("Audit", |_| {
            Ok(Arc::new(FnEvaluator::new("audit", |e: &Event| {
                e.logger_name() == "audit"
            })))
        });
        let ev = factory
            .resolve(Some(&EvaluatorDef::named("audit")), "primary")
            .expect("registered");
        assert!(ev.is_triggering_event(&Event::new(Level::Trace, "audit", "m")));
    }

    #[test]
    fn parse_compact_form() {
        assert_eq!(
            "adaptive".parse::<EvaluatorDef>().ok(),
            Some(EvaluatorDef::named("adaptive"))
        );
        assert_eq!(
            "level_threshold:warning".parse::<EvaluatorDef>().ok(),
            Some(EvaluatorDef::threshold(Level::Warn))
        );
        assert!("level_threshold:loud".parse::<EvaluatorDef>().is_err());
        assert!("  ".parse::<EvaluatorDef>().is_err());
    }

    #[test]
    fn display_round_trips_compact_form() {
        let def = EvaluatorDef::threshold(Level::Fatal);
        assert_eq!(def.to_string(), "level_threshold:FATAL");
        assert_eq!(def.to_string().parse::<EvaluatorDef>().ok(), Some(def));
    }

    #[test]
    fn deserialize_both_shapes() {
        #[derive(Deserialize)]
        struct Holder {
            a: EvaluatorDef,
            b: EvaluatorDef,
        }
        let holder: Holder = toml::from_str(
            r#"
            a = "adaptive"
            b = { kind = "level_threshold", threshold = "error" }
            "#,
        )
        .expect("parse");
        assert_eq!(holder.a, EvaluatorDef::named("adaptive"));
        assert_eq!(holder.b, EvaluatorDef::threshold(Level::Error));
    }
}
