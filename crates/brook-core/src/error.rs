//! Error types for buffering and delivery.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`BufferError::InvalidConfiguration`] | `BUFFER_INVALID_CONFIGURATION` | No |
//! | [`BufferError::Closed`] | `BUFFER_CLOSED` | No |
//! | [`BufferError::EvaluatorInstantiation`] | `BUFFER_EVALUATOR_INSTANTIATION` | No |
//! | [`BufferError::Delivery`] | `BUFFER_DELIVERY_FAILED` | Yes |
//!
//! Delivery failures never roll back the buffer: the events in the
//! failed batch have already left the buffer and are not re-queued.

use crate::DispatchReport;
use brook_types::ErrorCode;
use thiserror::Error;

/// Errors raised by a sink's `send` or `close`.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Underlying writer or socket failed.
    #[error("sink i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The batch could not be encoded for the destination.
    #[error("failed to encode batch: {0}")]
    Encode(String),

    /// The destination refused the batch.
    #[error("sink rejected batch: {0}")]
    Rejected(String),

    /// The sink was already closed.
    #[error("sink is closed")]
    Closed,
}

impl ErrorCode for SinkError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "SINK_IO",
            Self::Encode(_) => "SINK_ENCODE",
            Self::Rejected(_) => "SINK_REJECTED",
            Self::Closed => "SINK_CLOSED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Rejected(_))
    }
}

/// One sink's failure within a delivery.
#[derive(Debug, Error)]
#[error("{sink}: {error}")]
pub struct SinkFailure {
    /// Name of the failing sink.
    pub sink: String,
    /// What went wrong.
    #[source]
    pub error: SinkError,
}

/// Aggregated sink failures for one dispatcher operation.
///
/// Every attached sink is invoked even when an earlier one fails;
/// `failures` holds one entry per failing sink in attachment order.
#[derive(Debug, Error)]
#[error("{} sink(s) failed: {}", .failures.len(), join_failures(.failures))]
pub struct DeliveryError {
    pub failures: Vec<SinkFailure>,
    /// What the operation did to the buffer before delivery failed.
    pub report: DispatchReport,
}

fn join_failures(failures: &[SinkFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Dispatcher error.
#[derive(Debug, Error)]
pub enum BufferError {
    /// Rejected at configuration time (non-positive capacity, missing
    /// required value).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Operation attempted after `close()`.
    #[error("dispatcher '{0}' is closed")]
    Closed(String),

    /// A configured evaluator could not be constructed.
    ///
    /// The dispatcher builder treats this as "evaluator absent"; it only
    /// surfaces from [`EvaluatorFactory::create`](crate::EvaluatorFactory::create).
    #[error("cannot instantiate evaluator '{kind}': {reason}")]
    EvaluatorInstantiation { kind: String, reason: String },

    /// One or more sinks failed to accept a batch.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl BufferError {
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub fn evaluator_instantiation(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EvaluatorInstantiation {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Returns the delivery details if this is a delivery failure.
    #[must_use]
    pub fn as_delivery(&self) -> Option<&DeliveryError> {
        match self {
            Self::Delivery(d) => Some(d),
            _ => None,
        }
    }
}

impl ErrorCode for BufferError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "BUFFER_INVALID_CONFIGURATION",
            Self::Closed(_) => "BUFFER_CLOSED",
            Self::EvaluatorInstantiation { .. } => "BUFFER_EVALUATOR_INSTANTIATION",
            Self::Delivery(_) => "BUFFER_DELIVERY_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Delivery(_))
    }
}
