//! logsift - snapshot-consistent bulk log extraction
//!
//! Pages an entire result set out of a search backend under a point-in-time
//! snapshot and writes it as sequentially numbered CSV chunk files, one run
//! directory per invocation.
//!
//! # Usage
//!
//! ```bash
//! # Extract everything from the environment's default index
//! logsift prod
//!
//! # Errors from one day, custom page size
//! logsift prod --level ERROR --start 2025-04-25 --end 2025-04-26 -b 500
//! ```

use clap::Parser;
use tracing::Level;

use logsift::backend::HttpBackend;
use logsift::cli::CliArgs;
use logsift::config::Config;
use logsift::error::Result;
use logsift::extract::{ExtractionCoordinator, ProgressTracker};

/// Application entry point
#[tokio::main]
async fn main() {
    // All fatal conditions surface here as a single diagnostic; components
    // below never terminate the process themselves.
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Main application logic: parse arguments, resolve configuration, and
/// drive one extraction run.
async fn run() -> Result<()> {
    let args = CliArgs::parse();
    initialize_logging(&args);

    let config = Config::load(args.config_file.as_deref())?;
    let settings = args.resolve(&config)?;

    let backend = HttpBackend::new(&settings.url, settings.timeout)?;
    let tracker = ProgressTracker::new(args.progress_enabled());
    let coordinator = ExtractionCoordinator::new(
        &backend,
        settings.filters.clone(),
        &settings.keep_alive,
        tracker,
    );

    let run_dir = settings.run_dir();
    let report = coordinator.run(&settings.index, &run_dir).await?;

    // A failed snapshot close was already logged by the snapshot manager
    // and does not affect the exit status; the data is on disk.
    if !args.quiet {
        println!(
            "Extracted {} record(s) into {} chunk(s) under '{}'",
            report.records,
            report.chunks,
            report.output_dir.display()
        );
    }

    Ok(())
}

/// Initialize the logging subscriber based on verbosity flags.
fn initialize_logging(args: &CliArgs) {
    let level = if args.very_verbose {
        Level::TRACE
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
