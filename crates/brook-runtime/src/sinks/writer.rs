//! Line-oriented sink over any [`Write`].
//!
//! Each batch is rendered into one buffer and written with a single
//! `write_all` under the writer lock, so batches from concurrent
//! dispatchers sharing a file never interleave.

use brook_core::{Sink, SinkError};
use brook_event::Event;
use chrono::SecondsFormat;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// How events are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineFormat {
    /// `2026-01-01T00:00:00.000Z ERROR [main] payments - charge failed`,
    /// followed by one indented line per exception cause.
    #[default]
    Text,
    /// One serialized [`Event`] per line.
    JsonLines,
}

impl LineFormat {
    fn render(self, event: &Event, out: &mut Vec<u8>) -> Result<(), SinkError> {
        match self {
            Self::Text => {
                render_text(event, out)?;
                Ok(())
            }
            Self::JsonLines => {
                serde_json::to_writer(&mut *out, event)
                    .map_err(|e| SinkError::Encode(e.to_string()))?;
                out.push(b'\n');
                Ok(())
            }
        }
    }
}

fn render_text(event: &Event, out: &mut Vec<u8>) -> io::Result<()> {
    write!(
        out,
        "{} {:<5} [{}] {} - {}",
        event.timestamp().to_rfc3339_opts(SecondsFormat::Millis, true),
        event.level(),
        event.thread_name().unwrap_or("-"),
        event.logger_name(),
        event.message(),
    )?;
    if let Some(location) = event.location() {
        write!(out, " ({}:{})", location.file, location.line)?;
    }
    out.push(b'\n');
    if let Some(exception) = event.exception() {
        writeln!(out, "    error: {}", exception.message)?;
        for cause in &exception.causes {
            writeln!(out, "    caused by: {cause}")?;
        }
    }
    Ok(())
}

/// Sink writing one line per event.
pub struct WriterSink<W> {
    name: String,
    format: LineFormat,
    writer: Mutex<W>,
    closed: AtomicBool,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(name: impl Into<String>, format: LineFormat, writer: W) -> Self {
        Self {
            name: name.into(),
            format,
            writer: Mutex::new(writer),
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn format(&self) -> LineFormat {
        self.format
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout(name: impl Into<String>, format: LineFormat) -> Self {
        Self::new(name, format, io::stdout())
    }
}

impl WriterSink<io::Stderr> {
    pub fn stderr(name: impl Into<String>, format: LineFormat) -> Self {
        Self::new(name, format, io::stderr())
    }
}

impl WriterSink<BufWriter<File>> {
    /// Opens `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Any I/O error from opening the file.
    pub fn append_to(
        name: impl Into<String>,
        format: LineFormat,
        path: impl AsRef<Path>,
    ) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::new(name, format, BufWriter::new(file)))
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, batch: &[Event]) -> Result<(), SinkError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed);
        }
        let mut buf = Vec::with_capacity(batch.len() * 128);
        for event in batch {
            self.format.render(event, &mut buf)?;
        }
        let mut writer = self.writer.lock();
        writer.write_all(&buf)?;
        writer.flush()?;
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.writer.lock().flush()?;
        Ok(())
    }
}

impl<W> std::fmt::Debug for WriterSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterSink")
            .field("name", &self.name)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}
