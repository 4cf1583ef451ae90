//! Cursor-based pagination over the snapshot.
//!
//! `PageStream` repeatedly issues the query from `query::build_query`,
//! advancing the `search_after` cursor from the sort tuple of each page's
//! last hit. Exhaustion is detected by the first empty page. The stream
//! performs no internal retries: a backend failure mid-run propagates to
//! the orchestrator, which still releases the snapshot before surfacing it.

use tracing::debug;

use crate::backend::{Hit, SearchBackend, SnapshotHandle, SortKey};
use crate::error::Result;

use super::FilterSpec;
use super::query::build_query;

/// Streams pages of hits from the backend until exhaustion.
///
/// The cursor advances monotonically in the backend's sort order; a stream
/// never rewinds. Total work is one round trip per `batch_size` records.
pub struct PageStream<'a> {
    backend: &'a dyn SearchBackend,
    filters: &'a FilterSpec,
    snapshot: &'a SnapshotHandle,
    cursor: Option<SortKey>,
    exhausted: bool,
    total_fetched: u64,
    pages_fetched: u64,
}

impl<'a> PageStream<'a> {
    pub fn new(
        backend: &'a dyn SearchBackend,
        filters: &'a FilterSpec,
        snapshot: &'a SnapshotHandle,
    ) -> Self {
        Self {
            backend,
            filters,
            snapshot,
            cursor: None,
            exhausted: false,
            total_fetched: 0,
            pages_fetched: 0,
        }
    }

    /// Fetch the next page of hits.
    ///
    /// # Returns
    /// * `Result<Option<Vec<Hit>>>` - The next page, or `None` once the
    ///   stream is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<Hit>>> {
        if self.exhausted {
            return Ok(None);
        }

        let query = build_query(self.filters, self.snapshot, self.cursor.as_ref());
        let hits = match self.backend.search(&query).await {
            Ok(hits) => hits,
            Err(e) => {
                // A failed stream must not be re-driven with a stale cursor.
                self.exhausted = true;
                return Err(e);
            }
        };

        if hits.is_empty() {
            self.exhausted = true;
            debug!("Pagination exhausted after {} record(s)", self.total_fetched);
            return Ok(None);
        }

        // The last hit's sort tuple is the resume point for the next page.
        self.cursor = hits.last().map(|hit| hit.sort.clone());
        self.total_fetched += hits.len() as u64;
        self.pages_fetched += 1;

        debug!(
            "Fetched page {} with {} record(s) (total: {})",
            self.pages_fetched,
            hits.len(),
            self.total_fetched
        );

        Ok(Some(hits))
    }

    /// Whether the stream has seen its terminating empty page.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Records fetched so far.
    pub fn total_fetched(&self) -> u64 {
        self.total_fetched
    }

    /// Non-empty pages fetched so far.
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }
}
