//! logsift library
//!
//! Snapshot-consistent bulk log extraction: page an unbounded result set out
//! of a search backend under a point-in-time snapshot and persist it as
//! bounded, restart-friendly CSV chunks.
//!
//! # Modules
//!
//! - `backend`: search backend trait and its HTTP implementation
//! - `cli`: command-line interface and argument resolution
//! - `config`: configuration file handling and environment resolution
//! - `error`: error types and handling
//! - `extract`: the extraction pipeline (query, snapshot, pager, projector,
//!   sink, coordinator)
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use logsift::backend::HttpBackend;
//! use logsift::extract::{ExtractionCoordinator, FilterSpec, ProgressTracker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HttpBackend::new("http://localhost:9200", Duration::from_secs(30))?;
//!     let filters = FilterSpec::unfiltered(1000, 10_000);
//!     let coordinator =
//!         ExtractionCoordinator::new(&backend, filters, "1m", ProgressTracker::new(false));
//!
//!     let report = coordinator.run("logs-app", std::path::Path::new("out")).await?;
//!     println!("{} record(s) in {} chunk(s)", report.records, report.chunks);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;

// Re-export commonly used types
pub use backend::{HttpBackend, Record, SearchBackend, SnapshotHandle};
pub use config::Config;
pub use error::{LogsiftError, Result};
pub use extract::{ExtractionCoordinator, ExtractionReport, FilterSpec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
