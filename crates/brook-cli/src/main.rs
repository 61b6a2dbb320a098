//! brook CLI - replay log lines through a buffering dispatcher
//!
//! Reads `LEVEL logger message...` lines from stdin, appends each as an
//! event, flushes on a timer, and closes the dispatcher on EOF or
//! Ctrl-C.
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`BROOK_*`)
//! 3. Project config (`.brook/config.toml` in the project directory)
//! 4. Global config (`~/.brook/config.toml`, or `--config PATH`)
//! 5. Default values (lowest priority)
//!
//! With no `[[sinks]]` configured, events are written to stdout.
//! `--print-config` prints the resolved configuration instead of
//! replaying stdin.

mod line;

use anyhow::{Context, Result};
use brook_core::{BufferDispatcher, BufferError, EvaluatorDef, EvaluatorFactory};
use brook_runtime::build_dispatcher;
use brook_runtime::config::{BrookConfig, ConfigLoader, SinkDef, SinkKind};
use clap::Parser;
use line::ParsedLine;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// brook - adaptive event buffering for log streams
#[derive(Parser, Debug)]
#[command(name = "brook")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Config file used in place of ~/.brook/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long)]
    project: Option<PathBuf>,

    /// Ring buffer capacity
    #[arg(short = 'n', long, value_name = "N")]
    buffer_size: Option<usize>,

    /// Drop overflowing events instead of forwarding them
    #[arg(long, conflicts_with = "no_lossy")]
    lossy: bool,

    /// Forward every overflowing event, even if config enables lossy mode
    #[arg(long)]
    no_lossy: bool,

    /// Primary trigger evaluator, `kind[:LEVEL]`
    #[arg(long, value_name = "KIND")]
    evaluator: Option<EvaluatorDef>,

    /// Secondary evaluator for lossy eviction, `kind[:LEVEL]`
    #[arg(long, value_name = "KIND")]
    lossy_evaluator: Option<EvaluatorDef>,

    /// Milliseconds between periodic flushes (0 disables)
    #[arg(long, value_name = "MS")]
    flush_interval_ms: Option<u64>,

    /// Print the resolved configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn project_root(&self) -> PathBuf {
        self.project.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|e| {
                warn!(error = %e, "Failed to get current directory, using '.'");
                PathBuf::from(".")
            })
        })
    }

    /// Loads file/env config and applies CLI overrides as the
    /// highest-priority layer.
    fn resolve_config(&self) -> Result<BrookConfig> {
        let mut loader = ConfigLoader::new().with_project_root(self.project_root());
        if let Some(ref path) = self.config {
            loader = loader.with_global_config(path);
        }
        let mut config = loader.load().context("Config error")?;

        let dispatcher = &mut config.dispatcher;
        if let Some(size) = self.buffer_size {
            dispatcher.buffer_size = size;
        }
        if self.lossy {
            dispatcher.lossy = true;
        } else if self.no_lossy {
            dispatcher.lossy = false;
        }
        if let Some(ref ev) = self.evaluator {
            dispatcher.evaluator = Some(ev.clone());
        }
        if let Some(ref ev) = self.lossy_evaluator {
            dispatcher.lossy_evaluator = Some(ev.clone());
        }
        if let Some(ms) = self.flush_interval_ms {
            config.flush.interval_ms = ms;
        }
        if config.sinks.is_empty() {
            config.sinks.push(SinkDef::new(SinkKind::Console));
        }

        Ok(config)
    }
}

/// Counts from one replay.
#[derive(Debug, Default)]
struct Replay {
    lines: usize,
    skipped: usize,
    interrupted: bool,
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn report_delivery(result: Result<brook_core::DispatchReport, BufferError>, line: usize) {
    if let Err(e) = result {
        // Sink failures are already logged per sink by the dispatcher.
        debug!(line, error = %e, "delivery incomplete");
    }
}

/// Feeds every line of `input` to `dispatcher` until EOF or Ctrl-C.
async fn replay<R>(
    dispatcher: &BufferDispatcher,
    input: R,
    flush_every: Option<Duration>,
) -> Result<Replay>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    let mut ticker = flush_every.map(|period| {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut replay = Replay::default();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                replay.lines += 1;
                match ParsedLine::parse(&line) {
                    Ok(Some(parsed)) => {
                        report_delivery(dispatcher.append_record(&parsed.record()), replay.lines);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        replay.skipped += 1;
                        warn!(line = replay.lines, error = %e, "skipping malformed line");
                    }
                }
            }
            _ = next_tick(&mut ticker) => {
                report_delivery(dispatcher.flush(false), replay.lines);
            }
            _ = &mut ctrl_c => {
                info!("Interrupted, closing dispatcher");
                replay.interrupted = true;
                break;
            }
        }
    }
    Ok(replay)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // --debug > --verbose > RUST_LOG env > default "warn"
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    let config = args.resolve_config()?;
    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let dispatcher = build_dispatcher(&config, &EvaluatorFactory::default())
        .context("Failed to build dispatcher")?;
    info!(
        dispatcher = dispatcher.name(),
        flush_interval_ms = config.flush.interval_ms,
        "Replaying stdin"
    );

    let replay = replay(&dispatcher, tokio::io::stdin(), config.flush.interval()).await?;

    if let Err(e) = dispatcher.close() {
        warn!(error = %e, "Close did not complete cleanly");
    }
    for summary in dispatcher.discard_summaries() {
        info!("{}", summary.describe());
    }

    let stats = dispatcher.stats();
    eprintln!(
        "brook: {} line(s), {} skipped, {} appended, {} forwarded, {} discarded, {} batch(es){}",
        replay.lines,
        replay.skipped,
        stats.appended,
        stats.forwarded,
        stats.discarded,
        stats.batches,
        if replay.interrupted { " (interrupted)" } else { "" },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brook_core::testing::RecordingSink;
    use brook_core::AdaptiveEvaluator;
    use std::sync::Arc;

    fn dispatcher(size: usize, lossy: bool) -> (BufferDispatcher, Arc<RecordingSink>) {
        let d = BufferDispatcher::builder("cli")
            .buffer_size(size)
            .lossy(lossy)
            .evaluator(Arc::new(AdaptiveEvaluator))
            .build()
            .unwrap();
        let sink = RecordingSink::shared("rec");
        d.sinks().attach(sink.clone());
        (d, sink)
    }

    #[tokio::test]
    async fn replay_counts_lines_and_skips_bad_ones() {
        let (d, sink) = dispatcher(8, false);
        let input: &[u8] = b"INFO app one\n\nnope app two\nERROR app three\n";

        let replay = replay(&d, input, None).await.unwrap();
        assert_eq!(replay.lines, 4);
        assert_eq!(replay.skipped, 1);
        assert!(!replay.interrupted);
        assert_eq!(sink.messages(), vec![vec!["one".to_string(), "three".to_string()]]);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_flushes_buffer() {
        let (d, sink) = dispatcher(8, false);
        let (mut tx, rx) = tokio::io::duplex(64);

        let feeder = async move {
            use tokio::io::AsyncWriteExt;
            tx.write_all(b"INFO app buffered\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(250)).await;
            drop(tx);
        };
        let (replay, ()) = tokio::join!(replay(&d, rx, Some(Duration::from_millis(100))), feeder);

        assert_eq!(replay.unwrap().lines, 1);
        assert_eq!(sink.all_messages(), vec!["buffered"]);
        assert!(d.is_empty());
    }

    #[test]
    fn cli_overrides_config() {
        let project = tempfile::TempDir::new().unwrap();
        let args = Args::parse_from([
            "brook",
            "--project",
            project.path().to_str().unwrap(),
            "--config",
            project.path().join("absent.toml").to_str().unwrap(),
            "--buffer-size",
            "7",
            "--lossy",
            "--evaluator",
            "level_threshold:error",
            "--flush-interval-ms",
            "20",
        ]);
        let config = args.resolve_config().unwrap();
        assert_eq!(config.dispatcher.buffer_size, 7);
        assert!(config.dispatcher.lossy);
        assert_eq!(
            config.dispatcher.evaluator,
            Some(EvaluatorDef::threshold(brook_event::Level::Error))
        );
        assert_eq!(config.flush.interval_ms, 20);
        assert_eq!(config.sinks, vec![SinkDef::new(SinkKind::Console)]);
    }

    #[test]
    fn no_lossy_overrides_project_config() {
        let project = tempfile::TempDir::new().unwrap();
        let brook_dir = project.path().join(".brook");
        std::fs::create_dir_all(&brook_dir).unwrap();
        std::fs::write(brook_dir.join("config.toml"), "[dispatcher]\nlossy = true\n").unwrap();
        let root = project.path().to_str().unwrap();
        let absent = project.path().join("absent.toml");
        let absent = absent.to_str().unwrap();

        let from_file = Args::parse_from(["brook", "-C", root, "--config", absent]);
        assert!(from_file.resolve_config().unwrap().dispatcher.lossy);

        let args = Args::parse_from(["brook", "-C", root, "--config", absent, "--no-lossy"]);
        assert!(!args.resolve_config().unwrap().dispatcher.lossy);
    }

    #[test]
    fn lossy_and_no_lossy_conflict() {
        let result = Args::try_parse_from(["brook", "--lossy", "--no-lossy"]);
        assert!(result.is_err());
    }

    #[test]
    fn bad_evaluator_argument_rejected() {
        let result = Args::try_parse_from(["brook", "--evaluator", "level_threshold:loud"]);
        assert!(result.is_err());
    }
}
