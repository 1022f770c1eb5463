//! Command-line arguments
//!
//! Every queue, storage and logging option can also come from the
//! configuration file; a flag given here overrides the file.

use crate::core::validation::{parse_capacity, validate_positive_int};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "systemlog")]
#[command(about = "Telemetry system log pipeline with a synthetic query workload")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Color output control (unspecified = auto/TTY)
    #[arg(short = 'g', long = "color")]
    pub color: Option<bool>,

    /// Log level (a flexi_logger spec such as "info,systemlog::queue=debug" is accepted)
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Directory the system log files are written to
    #[arg(short = 'd', long = "storage-dir", value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Maximum number of buffered events per system log
    #[arg(long = "capacity", value_name = "EVENTS", value_parser = parse_capacity)]
    pub capacity: Option<usize>,

    /// Interval between background flushes, in milliseconds
    #[arg(long = "flush-interval-ms", value_name = "MS", value_parser = validate_positive_int)]
    pub flush_interval_ms: Option<usize>,

    /// How long a synchronous flush may wait, in seconds
    #[arg(long = "flush-timeout-secs", value_name = "SECS", value_parser = validate_positive_int)]
    pub flush_timeout_secs: Option<usize>,

    /// Number of producer threads
    #[arg(short = 'p', long = "producers", value_name = "COUNT", default_value = "4", value_parser = validate_positive_int)]
    pub producers: usize,

    /// Query events per second, per producer
    #[arg(short = 'e', long = "events-per-second", value_name = "RATE", default_value = "1000", value_parser = validate_positive_int)]
    pub events_per_second: usize,

    /// Stop after this many seconds (default: run until interrupted)
    #[arg(short = 't', long = "duration-secs", value_name = "SECS", value_parser = validate_positive_int)]
    pub duration_secs: Option<usize>,

    /// Memory limit per producer, in bytes; a query over it fails (default: unlimited)
    #[arg(short = 'm', long = "memory-limit", value_name = "BYTES", value_parser = validate_positive_int)]
    pub memory_limit: Option<usize>,

    /// Run a synchronous flush of every system log this often, in milliseconds
    #[arg(long = "flush-every-ms", value_name = "MS", default_value = "2000", value_parser = validate_positive_int)]
    pub flush_every_ms: usize,
}

impl Args {
    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs.map(|secs| Duration::from_secs(secs as u64))
    }

    pub fn flush_every(&self) -> Duration {
        Duration::from_millis(self.flush_every_ms as u64)
    }

    /// Delay between two events of one producer
    pub fn event_pause(&self) -> Duration {
        Duration::from_secs(1) / self.events_per_second.max(1) as u32
    }
}
