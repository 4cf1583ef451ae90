//! Command-line interface for logsift.
//!
//! Parses arguments with clap, loads the configuration file, and resolves
//! both into the immutable settings one extraction run needs. Precedence is
//! arguments over environment variables over the config file.

use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::extract::FilterSpec;

/// Extract logs from a search backend into bounded CSV chunks.
#[derive(Parser, Debug)]
#[command(
    name = "logsift",
    version,
    about = "Snapshot-consistent bulk log extraction into CSV chunks",
    long_about = "Pages an entire result set out of a search backend under a \
point-in-time snapshot and writes it as sequentially numbered CSV chunk files."
)]
pub struct CliArgs {
    /// Environment name from the config file
    #[arg(value_name = "ENVIRONMENT", default_value = "local")]
    pub environment: String,

    /// Index to extract from (overrides the environment's default)
    #[arg(short, long, value_name = "NAME")]
    pub index: Option<String>,

    /// Filter by log level (INFO, WARN, ERROR, ...)
    #[arg(short, long, value_name = "LEVEL")]
    pub level: Option<String>,

    /// Start of the timestamp range, YYYY-MM-DD or full ISO 8601
    #[arg(long, value_name = "DATE")]
    pub start: Option<String>,

    /// End of the timestamp range, YYYY-MM-DD or full ISO 8601
    #[arg(long, value_name = "DATE")]
    pub end: Option<String>,

    /// Comma-separated list of fields to keep per record
    #[arg(short, long, value_name = "FIELDS")]
    pub fields: Option<String>,

    /// Records per backend round trip
    #[arg(short, long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Records per output chunk
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Output base directory (overrides the environment's default)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (minimal output, no progress spinner)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Disable the progress spinner without reducing log output
    #[arg(long)]
    pub no_progress: bool,
}

/// Fully resolved settings for one extraction run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Backend base URL.
    pub url: String,

    /// Index to extract.
    pub index: String,

    /// Snapshot keep-alive window.
    pub keep_alive: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Base directory under which the run directory is created.
    pub output_base: PathBuf,

    /// Filter and paging parameters.
    pub filters: FilterSpec,
}

impl CliArgs {
    /// Resolve arguments and configuration into run settings.
    pub fn resolve(&self, config: &Config) -> Result<RunSettings> {
        let env = config.resolve(&self.environment)?;

        let start = self
            .start
            .as_deref()
            .map(|raw| validate_date_bound(raw, "start"))
            .transpose()?;
        let end = self
            .end
            .as_deref()
            .map(|raw| validate_date_bound(raw, "end"))
            .transpose()?;

        let fields = self.fields.as_deref().map(split_fields);

        let filters = FilterSpec {
            level: self.level.clone(),
            start,
            end,
            fields,
            batch_size: self.batch_size.unwrap_or(env.batch_size),
            max_records_per_chunk: self.chunk_size.unwrap_or(env.max_records_per_chunk),
        };

        let timeout = env.request_timeout();

        Ok(RunSettings {
            url: env.url,
            index: self.index.clone().unwrap_or(env.index),
            keep_alive: env.keep_alive,
            timeout,
            output_base: self.output.clone().unwrap_or(env.output_dir),
            filters,
        })
    }

    /// Whether the progress spinner should render.
    pub fn progress_enabled(&self) -> bool {
        !self.quiet && !self.no_progress
    }
}

impl RunSettings {
    /// Directory for this run: `<base>/<index>/run_<UTC timestamp>/`.
    pub fn run_dir(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        self.output_base
            .join(&self.index)
            .join(format!("run_{stamp}"))
    }
}

/// Accept a bare date or a full ISO-8601 timestamp; the backend understands
/// both forms, so the validated input is passed through unchanged.
fn validate_date_bound(raw: &str, field: &str) -> Result<String> {
    let valid = NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(raw).is_ok();

    if valid {
        Ok(raw.to_string())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
        }
        .into())
    }
}

fn split_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}
