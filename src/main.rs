//! Serial Logger
//!
//! Reads newline-delimited text from a serial device, echoes every line to
//! the console and writes it to a file until Ctrl+C.
//!
//! # Usage
//!
//! ```bash
//! # List available serial ports
//! serial-logger ports
//!
//! # Capture /dev/ttyUSB0 at 9600 baud into serial_output.txt
//! serial-logger log -p /dev/ttyUSB0 -b 9600
//!
//! # Settings from a file, with an output override
//! serial-logger log --config logger.toml -o capture.txt
//! ```

mod config;
mod error;
mod serial;
mod session;
mod sink;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use config::{LoggerConfig, Overrides};

/// Serial Logger
///
/// Capture text lines from a serial device to the console and a file
#[derive(Parser)]
#[command(name = "serial-logger")]
#[command(author = "Prasanna Gautam")]
#[command(version = "0.1.0")]
#[command(about = "Capture newline-delimited text from a serial device to the console and a file")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available serial ports
    Ports,

    /// Log serial output to the console and a file
    Log {
        /// Serial port path (e.g., /dev/ttyUSB0, COM3)
        #[arg(short, long)]
        port: Option<String>,

        /// Baud rate, must match the device
        #[arg(short, long)]
        baud: Option<u32>,

        /// Output file, truncated at start
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML file with logger settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Read timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Prefix each line with a timestamp
        #[arg(long)]
        timestamps: bool,

        /// Plain lines even if the config file enables timestamps
        #[arg(long, conflicts_with = "timestamps")]
        no_timestamps: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Ports => serial::port::print_ports().context("Failed to list serial ports"),
        Commands::Log {
            port,
            baud,
            output,
            config,
            timeout_ms,
            timestamps,
            no_timestamps,
        } => {
            let overrides = Overrides {
                port,
                baud_rate: baud,
                output,
                read_timeout_ms: timeout_ms,
                timestamps: flag_pair(timestamps, no_timestamps),
            };
            let config = LoggerConfig::load(config.as_deref(), overrides)?;
            handle_log(&config)
        }
    }
}

/// `--x` / `--no-x` as an override; neither leaves the lower layer alone
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn handle_log(config: &LoggerConfig) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(Arc::clone(&running))?;

    let summary = session::start(config, &running).map_err(|e| {
        log::error!("Logging aborted at the {} stage", e.stage());
        anyhow::Error::new(e)
    })?;

    log::info!(
        "Wrote {} lines ({} bytes) to {} in {:.1?}",
        summary.records,
        summary.bytes,
        config.output.display(),
        summary.elapsed
    );

    Ok(())
}

/// Ctrl+C only clears the flag; the read loop notices within one timeout
fn install_ctrlc_handler(running: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")
}
