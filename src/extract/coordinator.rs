//! Extraction orchestration.
//!
//! The coordinator wires snapshot manager, page stream, projector, and chunk
//! sink into one run and owns all per-run state: total counters, the sink
//! buffer, the cursor inside the page stream. Its central guarantee is
//! scoped acquisition of the snapshot: once `open` succeeds, exactly one
//! close attempt happens on every exit path, whether pagination completes,
//! a backend call fails mid-run, or a chunk write fails. Output already
//! flushed before a failure stays on disk; nothing is rolled back.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::backend::SearchBackend;
use crate::error::{ExtractError, Result};

use super::FilterSpec;
use super::pager::PageStream;
use super::progress::ProgressTracker;
use super::project::project_record;
use super::sink::ChunkSink;
use super::snapshot::{DEFAULT_CLOSE_ATTEMPTS, SnapshotManager};

/// Result of one extraction run.
#[derive(Debug)]
pub struct ExtractionReport {
    /// Total records extracted.
    pub records: u64,

    /// Chunks written to disk.
    pub chunks: usize,

    /// Non-empty pages fetched from the backend.
    pub pages: u64,

    /// Wall-clock duration of the run.
    pub elapsed_ms: u64,

    /// Whether the snapshot was released within the retry bound.
    pub snapshot_released: bool,

    /// Directory the chunks were written into.
    pub output_dir: PathBuf,
}

/// Drives one extraction run end to end.
pub struct ExtractionCoordinator<'a> {
    backend: &'a dyn SearchBackend,
    filters: FilterSpec,
    keep_alive: String,
    close_attempts: usize,
    tracker: ProgressTracker,
}

impl<'a> ExtractionCoordinator<'a> {
    pub fn new(
        backend: &'a dyn SearchBackend,
        filters: FilterSpec,
        keep_alive: &str,
        tracker: ProgressTracker,
    ) -> Self {
        Self {
            backend,
            filters,
            keep_alive: keep_alive.to_string(),
            close_attempts: DEFAULT_CLOSE_ATTEMPTS,
            tracker,
        }
    }

    /// Override the snapshot close retry bound.
    pub fn with_close_attempts(mut self, attempts: usize) -> Self {
        self.close_attempts = attempts;
        self
    }

    /// Run the extraction over `index`, writing chunks into `output_dir`.
    ///
    /// A snapshot-close failure does not fail the run; it is reported via
    /// [`ExtractionReport::snapshot_released`]. Every other failure after
    /// the snapshot opened still reaches the close step before surfacing.
    pub async fn run(&self, index: &str, output_dir: &Path) -> Result<ExtractionReport> {
        if self.filters.batch_size == 0 {
            return Err(
                ExtractError::InvalidParameters("batch size must be at least 1".to_string()).into(),
            );
        }

        let start_time = Instant::now();
        info!("Starting extraction from '{}'", index);

        let manager = SnapshotManager::new(self.backend, &self.keep_alive);
        let snapshot = manager.open(index).await?;

        // From here on the snapshot is owned by this run; close runs before
        // any error from the pagination loop is allowed to surface.
        let outcome = self.drain(&snapshot, output_dir).await;
        let snapshot_released = manager
            .close_with_retry(&snapshot, self.close_attempts)
            .await;

        self.tracker.finish();
        let (records, chunks, pages) = outcome?;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Extraction completed: {} record(s) in {} chunk(s) across {} page(s), {} ms",
            records, chunks, pages, elapsed_ms
        );

        Ok(ExtractionReport {
            records,
            chunks,
            pages,
            elapsed_ms,
            snapshot_released,
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Page through the snapshot, projecting and sinking every record.
    async fn drain(
        &self,
        snapshot: &crate::backend::SnapshotHandle,
        output_dir: &Path,
    ) -> Result<(u64, usize, u64)> {
        let mut sink = ChunkSink::new(output_dir, self.filters.max_records_per_chunk).await?;
        let mut stream = PageStream::new(self.backend, &self.filters, snapshot);

        while let Some(hits) = stream.next_page().await? {
            for hit in hits {
                let record = project_record(&hit.source, self.filters.fields.as_deref());
                sink.append(record);
                if let Some(report) = sink.flush_if_full().await? {
                    debug!("Chunk {} complete ({} records)", report.index, report.records);
                }
            }
            self.tracker.update(stream.total_fetched());
        }

        sink.flush_remainder().await?;

        Ok((
            sink.records_written(),
            sink.chunks_written(),
            stream.pages_fetched(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{MockBackend, synthetic_records};
    use crate::error::{BackendError, LogsiftError};
    use tokio::fs;

    fn test_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("logsift_run_{name}_{}", std::process::id()))
    }

    fn coordinator<'a>(
        backend: &'a MockBackend,
        batch_size: usize,
        chunk_size: usize,
    ) -> ExtractionCoordinator<'a> {
        let filters = FilterSpec::unfiltered(batch_size, chunk_size);
        ExtractionCoordinator::new(backend, filters, "1m", ProgressTracker::new(false))
    }

    #[tokio::test]
    async fn test_end_to_end_chunk_boundaries() {
        // 25 records, batch 10, chunk 12: pages of 10/10/5, chunks of 12/12/1.
        let dir = test_dir("e2e");
        let backend = MockBackend::new("logs-app", synthetic_records(25));

        let report = coordinator(&backend, 10, 12)
            .run("logs-app", &dir)
            .await
            .unwrap();

        assert_eq!(report.records, 25);
        assert_eq!(report.pages, 3);
        assert_eq!(report.chunks, 3);
        assert!(report.snapshot_released);

        for (idx, expected_rows) in [(1, 12), (2, 12), (3, 1)] {
            let content = fs::read_to_string(dir.join(format!("logs_chunk_{idx}.csv")))
                .await
                .unwrap();
            assert_eq!(content.lines().count(), expected_rows + 1); // + header
        }
        assert!(!dir.join("logs_chunk_4.csv").exists());

        fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_no_records_produces_no_chunks() {
        let dir = test_dir("none");
        let backend = MockBackend::new("logs-app", vec![]);

        let report = coordinator(&backend, 10, 12)
            .run("logs-app", &dir)
            .await
            .unwrap();

        assert_eq!(report.records, 0);
        assert_eq!(report.chunks, 0);
        assert!(!dir.join("logs_chunk_1.csv").exists());

        fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_snapshot_closed_exactly_once_on_mid_run_failure() {
        let dir = test_dir("fault");
        let backend =
            MockBackend::new("logs-app", synthetic_records(25)).with_search_failure_at(2);

        let err = coordinator(&backend, 10, 12)
            .run("logs-app", &dir)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LogsiftError::Backend(BackendError::QueryFailed(_))
        ));
        // The close step still ran, exactly once.
        assert_eq!(backend.close_calls(), 1);

        fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_close_failure_does_not_fail_the_run() {
        let dir = test_dir("close");
        let backend = MockBackend::new("logs-app", synthetic_records(5)).with_failing_close();

        let report = coordinator(&backend, 10, 12)
            .with_close_attempts(4)
            .run("logs-app", &dir)
            .await
            .unwrap();

        assert_eq!(report.records, 5);
        assert!(!report.snapshot_released);
        assert_eq!(backend.close_calls(), 4);

        fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_missing_index_fails_before_any_snapshot() {
        let dir = test_dir("missing");
        let backend = MockBackend::new("logs-app", synthetic_records(5));

        let err = coordinator(&backend, 10, 12)
            .run("other-index", &dir)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LogsiftError::Backend(BackendError::IndexNotFound(_))
        ));
        assert_eq!(backend.open_calls(), 0);
        assert_eq!(backend.close_calls(), 0);
        // No output directory either; the run never got that far.
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_projection_applies_to_output() {
        let dir = test_dir("project");
        let backend = MockBackend::new("logs-app", synthetic_records(2));
        let mut filters = FilterSpec::unfiltered(10, 12);
        filters.fields = Some(vec!["msg".to_string(), "host".to_string()]);

        let coordinator =
            ExtractionCoordinator::new(&backend, filters, "1m", ProgressTracker::new(false));
        coordinator.run("logs-app", &dir).await.unwrap();

        let content = fs::read_to_string(dir.join("logs_chunk_1.csv")).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();

        // Only the requested fields appear; "host" was absent everywhere
        // and shows up as an empty column, not a dropped one.
        assert_eq!(lines[0], "host,msg");
        assert_eq!(lines[1], ",event 0");

        fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected_up_front() {
        let dir = test_dir("zerobatch");
        let backend = MockBackend::new("logs-app", vec![]);

        let err = coordinator(&backend, 0, 12)
            .run("logs-app", &dir)
            .await
            .unwrap_err();

        assert!(matches!(err, LogsiftError::Extract(_)));
        assert_eq!(backend.open_calls(), 0);
    }
}
