//! The capture loop: device lines to console and file

use crate::config::LoggerConfig;
use crate::error::{LoggerError, Result};
use crate::serial::lines::MAX_LINE;
use crate::serial::{LineReader, PortConfig, ReadOutcome, SerialConnection};
use crate::sink::OutputSink;
use chrono::Local;
use colored::Colorize;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Counters reported when a run ends
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub records: u64,
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Owns one device and one output sink for the length of a run
pub struct SerialLogger<D: Read, C: Write> {
    port: String,
    reader: LineReader<D>,
    sink: OutputSink,
    console: C,
    timestamps: bool,
    lines_read: u64,
    max_line: usize,
}

impl<D: Read, C: Write> SerialLogger<D, C> {
    pub fn new(port: &str, device: D, sink: OutputSink, console: C, timestamps: bool) -> Self {
        Self {
            port: port.to_string(),
            reader: LineReader::new(device),
            sink,
            console,
            timestamps,
            lines_read: 0,
            max_line: MAX_LINE,
        }
    }

    /// Fail a run once this many bytes arrive without a `\n`
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.reader = self.reader.with_max_line(max_line);
        self.max_line = max_line;
        self
    }

    /// Copy lines until `running` goes false or something fails.
    ///
    /// A clean stop closes the device and flushes the sink before
    /// returning. On error both are released as the logger drops.
    pub fn run(mut self, running: &AtomicBool) -> Result<RunSummary> {
        let started = Instant::now();

        let banner = format!("Logging data from {}... Press Ctrl+C to stop.", self.port);
        writeln!(self.console, "{}", banner.cyan()).map_err(console_error)?;

        while running.load(Ordering::SeqCst) {
            let outcome = self
                .reader
                .poll_line()
                .map_err(|e| self.disconnected(e.to_string()))?;

            match outcome {
                ReadOutcome::Line(raw) => self.process_line(raw)?,
                ReadOutcome::Idle => continue,
                ReadOutcome::Closed => {
                    return Err(self.disconnected("device closed the stream".to_string()))
                }
                ReadOutcome::TooLong(dropped) => {
                    log::warn!("Dropped {} bytes with no line terminator", dropped);
                    return Err(LoggerError::LineTooLong {
                        port: self.port.clone(),
                        limit: self.max_line,
                    });
                }
            }
        }

        // Lines that arrived in the same read as the stop are still logged
        for raw in self.reader.drain_lines() {
            self.process_line(raw)?;
        }

        writeln!(self.console, "\n{}", "Logging stopped.".yellow()).map_err(console_error)?;
        self.console.flush().map_err(console_error)?;

        let summary = RunSummary {
            records: self.sink.records(),
            bytes: self.sink.bytes(),
            elapsed: started.elapsed(),
        };

        let Self { reader, sink, .. } = self;
        drop(reader.into_inner());
        sink.finish()?;

        Ok(summary)
    }

    fn process_line(&mut self, raw: Vec<u8>) -> Result<()> {
        self.lines_read += 1;

        let text = String::from_utf8(raw).map_err(|source| LoggerError::Decode {
            line_number: self.lines_read,
            source,
        })?;
        let record = format_record(text.trim(), self.timestamps);

        writeln!(self.console, "{}", record)
            .and_then(|_| self.console.flush())
            .map_err(console_error)?;
        self.sink.write_record(&record)
    }

    fn disconnected(&self, reason: String) -> LoggerError {
        LoggerError::Disconnected {
            port: self.port.clone(),
            reason,
        }
    }
}

/// Apply the optional timestamp prefix to a trimmed line
pub fn format_record(line: &str, timestamps: bool) -> String {
    if timestamps {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        format!("[{}] {}", timestamp, line)
    } else {
        line.to_string()
    }
}

fn console_error(source: io::Error) -> LoggerError {
    LoggerError::Sink {
        path: PathBuf::from("<stdout>"),
        source,
    }
}

/// Open the port, then the output file, and log to stdout until stopped.
///
/// The port is opened first so a bad port never truncates the file.
pub fn start(config: &LoggerConfig, running: &AtomicBool) -> Result<RunSummary> {
    let connection = SerialConnection::open(PortConfig::from(config))?;
    let sink = OutputSink::create(&config.output)?;

    log::info!(
        "Capturing {} at {} baud into {}",
        config.port,
        config.baud_rate,
        config.output.display()
    );

    SerialLogger::new(
        &config.port,
        connection,
        sink,
        io::stdout(),
        config.timestamps,
    )
    .run(running)
}
