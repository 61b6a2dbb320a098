//! Trigger evaluators.
//!
//! An evaluator is a pure predicate over one [`Event`]. A dispatcher
//! consults up to two of them:
//!
//! - the **primary** evaluator decides whether an appended event
//!   triggers an immediate send of the whole buffer;
//! - the **secondary** (lossy) evaluator decides whether an event that
//!   is about to be dropped by a lossy dispatcher is forwarded anyway.
//!
//! Both are held as `Arc<dyn TriggerEvaluator>` so one instance can be
//! shared between dispatchers and swapped at runtime.

use brook_event::{Event, Level};
use std::fmt;

/// Predicate deciding whether an event is significant.
///
/// Implementations must be deterministic and side-effect free; the
/// dispatcher may call them while holding its lock.
pub trait TriggerEvaluator: Send + Sync {
    /// Returns `true` if `event` is significant.
    fn is_triggering_event(&self, event: &Event) -> bool;

    /// Short name used in logs and `Debug` output.
    fn name(&self) -> &str {
        "custom"
    }
}

impl fmt::Debug for dyn TriggerEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TriggerEvaluator({})", self.name())
    }
}

/// Fires for `WARN` and above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdaptiveEvaluator;

impl TriggerEvaluator for AdaptiveEvaluator {
    fn is_triggering_event(&self, event: &Event) -> bool {
        matches!(event.level(), Level::Warn | Level::Error | Level::Fatal)
    }

    fn name(&self) -> &str {
        "adaptive"
    }
}

/// Fires when the event's level is at or above `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelThresholdEvaluator {
    threshold: Level,
}

impl LevelThresholdEvaluator {
    #[must_use]
    pub fn new(threshold: Level) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> Level {
        self.threshold
    }
}

impl TriggerEvaluator for LevelThresholdEvaluator {
    fn is_triggering_event(&self, event: &Event) -> bool {
        event.level().is_at_least(self.threshold)
    }

    fn name(&self) -> &str {
        "level_threshold"
    }
}

/// Fires for every event, or for none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantEvaluator(bool);

impl ConstantEvaluator {
    pub const ALWAYS: Self = Self(true);
    pub const NEVER: Self = Self(false);
}

impl TriggerEvaluator for ConstantEvaluator {
    fn is_triggering_event(&self, _event: &Event) -> bool {
        self.0
    }

    fn name(&self) -> &str {
        if self.0 {
            "always"
        } else {
            "never"
        }
    }
}

/// Evaluator backed by a closure.
///
/// ```
/// use brook_core::{FnEvaluator, TriggerEvaluator};
/// use brook_event::{Event, Level};
///
/// let audit = FnEvaluator::new("audit", |e: &Event| e.logger_name().starts_with("audit"));
/// assert!(audit.is_triggering_event(&Event::new(Level::Debug, "audit.login", "ok")));
/// assert!(!audit.is_triggering_event(&Event::new(Level::Fatal, "db", "down")));
/// ```
pub struct FnEvaluator<F> {
    name: String,
    predicate: F,
}

impl<F> FnEvaluator<F>
where
    F: Fn(&Event) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<F> fmt::Debug for FnEvaluator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEvaluator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> TriggerEvaluator for FnEvaluator<F>
where
    F: Fn(&Event) -> bool + Send + Sync,
{
    fn is_triggering_event(&self, event: &Event) -> bool {
        (self.predicate)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
