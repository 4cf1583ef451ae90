//! Snapshot lifecycle management.
//!
//! A run holds exactly one point-in-time snapshot, moving through
//! `Unopened -> Open -> Closed` and never back. Opening validates the target
//! index first and is not retried: a missing index or unreachable backend is
//! a configuration problem, not a transient fault. Closing is retried a
//! bounded number of times and never fails the run; by the time close runs,
//! all extracted data is already on disk, so a leaked snapshot is an
//! operational cleanup concern rather than a correctness failure.

use tracing::{debug, error, info, warn};

use crate::backend::{SearchBackend, SnapshotHandle};
use crate::error::{BackendError, Result};

/// Close attempts made before giving up on snapshot release.
pub const DEFAULT_CLOSE_ATTEMPTS: usize = 3;

/// Owns the snapshot lifecycle for one run.
pub struct SnapshotManager<'a> {
    backend: &'a dyn SearchBackend,
    keep_alive: String,
}

impl<'a> SnapshotManager<'a> {
    pub fn new(backend: &'a dyn SearchBackend, keep_alive: &str) -> Self {
        Self {
            backend,
            keep_alive: keep_alive.to_string(),
        }
    }

    /// Open a snapshot over `index`.
    ///
    /// Validates that the index exists before asking the backend for a
    /// snapshot. Fails fatally for the run on a missing index or an
    /// unreachable backend; no retry.
    pub async fn open(&self, index: &str) -> Result<SnapshotHandle> {
        if !self.backend.index_exists(index).await? {
            return Err(BackendError::IndexNotFound(index.to_string()).into());
        }

        let snapshot = self.backend.open_snapshot(index, &self.keep_alive).await?;
        debug!("Snapshot opened over '{}' (keep_alive {})", index, self.keep_alive);

        Ok(snapshot)
    }

    /// Release `snapshot`, retrying sequentially up to `max_attempts` times.
    ///
    /// Each failed attempt is logged as a warning; exhausting all attempts
    /// is logged as an error. Returns whether the snapshot was released.
    /// Never propagates an error: data durability does not depend on close.
    pub async fn close_with_retry(&self, snapshot: &SnapshotHandle, max_attempts: usize) -> bool {
        for attempt in 1..=max_attempts {
            match self.backend.close_snapshot(snapshot).await {
                Ok(()) => {
                    info!("Snapshot released (attempt {}/{})", attempt, max_attempts);
                    return true;
                }
                Err(e) => {
                    warn!(
                        "Snapshot close attempt {}/{} failed: {}",
                        attempt, max_attempts, e
                    );
                }
            }
        }

        error!(
            "Snapshot was not released after {} attempt(s); it will expire with its keep_alive",
            max_attempts
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{MockBackend, synthetic_records};
    use crate::error::LogsiftError;

    #[tokio::test]
    async fn test_open_fails_on_missing_index_without_opening() {
        let backend = MockBackend::new("logs-app", synthetic_records(3));
        let manager = SnapshotManager::new(&backend, "1m");

        let err = manager.open("no-such-index").await.unwrap_err();
        assert!(matches!(
            err,
            LogsiftError::Backend(BackendError::IndexNotFound(_))
        ));
        // The existence check fails first; no snapshot is ever requested.
        assert_eq!(backend.open_calls(), 0);
    }

    #[tokio::test]
    async fn test_open_returns_handle_for_existing_index() {
        let backend = MockBackend::new("logs-app", synthetic_records(3));
        let manager = SnapshotManager::new(&backend, "5m");

        let snapshot = manager.open("logs-app").await.unwrap();
        assert_eq!(snapshot.keep_alive, "5m");
        assert_eq!(backend.open_calls(), 1);
    }

    #[tokio::test]
    async fn test_close_succeeds_on_first_attempt() {
        let backend = MockBackend::new("logs-app", vec![]);
        let manager = SnapshotManager::new(&backend, "1m");
        let snapshot = manager.open("logs-app").await.unwrap();

        assert!(manager.close_with_retry(&snapshot, 3).await);
        assert_eq!(backend.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_close_retry_bound_is_exact() {
        let backend = MockBackend::new("logs-app", vec![]).with_failing_close();
        let manager = SnapshotManager::new(&backend, "1m");
        let snapshot = manager.open("logs-app").await.unwrap();

        // All attempts fail; the manager reports failure but does not error.
        assert!(!manager.close_with_retry(&snapshot, 3).await);
        assert_eq!(backend.close_calls(), 3);
    }
}
