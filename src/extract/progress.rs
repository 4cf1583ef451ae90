//! Progress feedback for long-running extractions.
//!
//! The total record count is never known before the run finishes, so the
//! tracker is a spinner with a live count and throughput message rather than
//! a bounded bar. It can be disabled entirely (quiet mode, non-TTY use).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

/// Tracks extracted-record progress and renders a spinner.
pub struct ProgressTracker {
    processed: AtomicU64,
    start_time: Instant,
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a tracker; with `enabled = false` all calls are no-ops.
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {pos} records {msg}")
                    .unwrap(),
            );
            Some(pb)
        } else {
            None
        };

        Self {
            processed: AtomicU64::new(0),
            start_time: Instant::now(),
            bar,
        }
    }

    /// Update with the total number of records extracted so far.
    pub fn update(&self, count: u64) {
        self.processed.store(count, Ordering::Relaxed);

        if let Some(ref bar) = self.bar {
            bar.set_position(count);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = count as f64 / elapsed;
                bar.set_message(format!("({speed:.0} records/sec)"));
            }
        }
    }

    /// Finish and clear the spinner.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_tracker_accepts_updates() {
        let tracker = ProgressTracker::new(false);
        tracker.update(500);
        tracker.finish();
    }
}
