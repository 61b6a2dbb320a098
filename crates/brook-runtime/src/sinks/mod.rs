//! Built-in sinks.
//!
//! | Sink | Output | Config kind |
//! |------|--------|-------------|
//! | [`WriterSink`] + [`LineFormat::Text`] | stdout, stderr or an appended file | `console`, `stderr`, `file` |
//! | [`WriterSink`] + [`LineFormat::JsonLines`] | stdout or an appended file | `jsonl` |
//! | [`TracingSink`] | the process's `tracing` subscriber | `tracing` |

mod tracing_sink;
mod writer;

pub use tracing_sink::{TracingSink, TRACING_SINK_TARGET};
pub use writer::{LineFormat, WriterSink};
