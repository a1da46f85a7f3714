//! Virtual Stick - trace replay tool
//!
//! Replays a recorded pointer trace against the joystick engine and prints
//! every emitted command.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use virtual_stick::axis::{AxisFrame, AxisMapper};
use virtual_stick::config::StickConfig;
use virtual_stick::stick::{EmissionMode, PolarCommand, StickActor};
use virtual_stick::trace;

/// Virtual Stick - replay pointer traces through the joystick engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Pointer trace CSV (at_ms,phase,x,y)
    #[arg(short, long)]
    trace: PathBuf,

    /// Control width in pixels
    #[arg(long, default_value_t = 400.0)]
    width: f32,

    /// Control height in pixels
    #[arg(long, default_value_t = 400.0)]
    height: f32,

    /// Override the configured emission mode (threshold, continuous)
    #[arg(long)]
    mode: Option<EmissionMode>,

    /// Time to keep listening after the last trace row (ms)
    #[arg(long, default_value_t = 300)]
    linger_ms: u64,

    /// Print one JSON object per emission
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// One printed emission
#[derive(serde::Serialize)]
struct EmissionRecord {
    t_ms: u128,
    #[serde(flatten)]
    command: PolarCommand,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame: Option<AxisFrame>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.log_format)?;

    let mut config = match &args.config {
        Some(path) => {
            info!("Configuration file: {}", path);
            StickConfig::load(path).await?
        }
        None => StickConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.emission_mode = mode;
    }
    config.validate().context("Invalid configuration")?;

    let rows = trace::load_trace(&args.trace)?;
    if rows.is_empty() {
        warn!("Trace is empty, nothing to replay");
        return Ok(());
    }

    run(config, &args, rows).await
}

async fn run(config: StickConfig, args: &Args, rows: Vec<trace::TraceRow>) -> Result<()> {
    info!(
        "Replaying {} events: mode={:?} pad={}x{}",
        rows.len(),
        config.emission_mode,
        args.width,
        args.height
    );

    let (stick, task) = StickActor::spawn(&config)?;

    let mapper = config
        .axis
        .clone()
        .filter(|axis| axis.enabled)
        .map(|axis| Arc::new(Mutex::new(AxisMapper::new(axis))));
    let json = args.json;
    let start = Instant::now();
    let count = Arc::new(Mutex::new(0u64));

    let listener_count = Arc::clone(&count);
    let listener_mapper = mapper.clone();
    stick.on_value_changed(move |command| {
        let now = Instant::now();
        let frame = listener_mapper
            .as_ref()
            .and_then(|m| m.lock().process(&command, now));
        *listener_count.lock() += 1;
        print_emission(
            EmissionRecord {
                t_ms: now.duration_since(start).as_millis(),
                command,
                frame,
            },
            json,
        );
    })?;

    stick.resize(args.width, args.height)?;
    trace::replay(&stick, &rows).await?;

    tokio::time::sleep(Duration::from_millis(args.linger_ms)).await;
    stick.shutdown();
    task.await.context("Stick runtime task failed")?;

    info!("Replay complete: {} emissions", *count.lock());
    Ok(())
}

fn print_emission(record: EmissionRecord, json: bool) {
    if json {
        match serde_json::to_string(&record) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Failed to serialize emission: {}", e),
        }
        return;
    }

    let command = record.command;
    let direction = if command.is_centered() {
        command.direction.label().dimmed()
    } else {
        command.direction.label().green().bold()
    };

    let mut line = format!(
        "{:>6}ms  angle {:>3}  power {:>3}  {}",
        record.t_ms,
        command.angle.to_string().cyan(),
        command.power.to_string().yellow(),
        direction
    );
    if let Some(frame) = record.frame {
        line.push_str(&format!("  [{}]", frame.to_hex().magenta()));
    }
    println!("{}", line);
}

fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_flag_parses_emission_mode() {
        let args = Args::try_parse_from(["virtual-stick", "-t", "trace.csv", "--mode", "continuous"])
            .unwrap();
        assert_eq!(args.mode, Some(EmissionMode::Continuous));

        let args = Args::try_parse_from(["virtual-stick", "-t", "trace.csv"]).unwrap();
        assert_eq!(args.mode, None);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = Args::try_parse_from(["virtual-stick", "-t", "trace.csv", "--mode", "polling"])
            .unwrap_err();
        assert!(err.to_string().contains("unknown emission mode"));
    }
}
