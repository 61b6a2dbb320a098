//! Wires a [`BrookConfig`] into a ready-to-use dispatcher.

use crate::config::{BrookConfig, ConfigError, SinkDef, SinkKind};
use crate::sinks::{LineFormat, TracingSink, WriterSink};
use brook_core::{BufferDispatcher, EvaluatorFactory, Sink};
use std::sync::Arc;

/// Instantiates the sink described by `def`.
///
/// # Errors
///
/// - [`ConfigError::InvalidSink`] if a `file` sink has no path
/// - [`ConfigError::OpenSink`] if the output file cannot be opened
pub fn build_sink(def: &SinkDef) -> Result<Arc<dyn Sink>, ConfigError> {
    let name = def.display_name();
    let open = |format: LineFormat, path: &std::path::Path| {
        WriterSink::append_to(name, format, path).map_err(|e| ConfigError::open_sink(path, e))
    };

    let sink: Arc<dyn Sink> = match (def.kind, def.path.as_deref()) {
        (SinkKind::Console, _) => Arc::new(WriterSink::stdout(name, LineFormat::Text)),
        (SinkKind::Stderr, _) => Arc::new(WriterSink::stderr(name, LineFormat::Text)),
        (SinkKind::File, Some(path)) => Arc::new(open(LineFormat::Text, path)?),
        (SinkKind::File, None) => {
            return Err(ConfigError::invalid_sink(
                name,
                def.kind.as_str(),
                "missing required 'path'",
            ))
        }
        (SinkKind::Jsonl, Some(path)) => Arc::new(open(LineFormat::JsonLines, path)?),
        (SinkKind::Jsonl, None) => Arc::new(WriterSink::stdout(name, LineFormat::JsonLines)),
        (SinkKind::Tracing, _) => Arc::new(TracingSink::new(name)),
    };
    Ok(sink)
}

/// Validates `config`, builds the dispatcher and attaches every
/// configured sink in declaration order.
///
/// Evaluators the factory cannot build are logged and left unset.
///
/// # Errors
///
/// Any validation or sink construction error. Nothing is attached if
/// a later sink fails to open.
pub fn build_dispatcher(
    config: &BrookConfig,
    factory: &EvaluatorFactory,
) -> Result<Arc<BufferDispatcher>, ConfigError> {
    config.validate()?;

    let sinks = config
        .sinks
        .iter()
        .map(build_sink)
        .collect::<Result<Vec<_>, _>>()?;

    let dispatcher = BufferDispatcher::from_config(&config.dispatcher, factory)?;
    for sink in sinks {
        dispatcher.sinks().attach(sink);
    }

    tracing::info!(
        dispatcher = dispatcher.name(),
        capacity = dispatcher.capacity(),
        lossy = dispatcher.is_lossy(),
        sinks = dispatcher.sinks().len(),
        "dispatcher configured"
    );
    Ok(Arc::new(dispatcher))
}
