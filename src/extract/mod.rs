//! Streaming extraction pipeline.
//!
//! Pulls an unbounded result set out of a search backend under a
//! point-in-time snapshot and persists it as bounded CSV chunks. The
//! pipeline is built from five components:
//!
//! 1. **`query`**: pure construction of the paged search document
//! 2. **`snapshot`**: snapshot lifecycle (open, close with bounded retry)
//! 3. **`pager`**: cursor advancement and exhaustion detection
//! 4. **`project`**: optional field-subset projection per record
//! 5. **`sink`**: bounded buffering and chunk flushing
//!
//! These are orchestrated by the [`ExtractionCoordinator`], which owns all
//! per-run state and guarantees that an opened snapshot sees exactly one
//! close attempt on every exit path, including mid-pagination failures.
//!
//! Each run is strictly sequential: one page fetch, projection pass, and
//! flush at a time. Runs over different indexes are independent and may be
//! executed in parallel; they share no state.

pub mod coordinator;
pub mod pager;
pub mod progress;
pub mod project;
pub mod query;
pub mod sink;
pub mod snapshot;

pub use coordinator::{ExtractionCoordinator, ExtractionReport};
pub use pager::PageStream;
pub use progress::ProgressTracker;
pub use sink::ChunkSink;
pub use snapshot::SnapshotManager;

/// Immutable parameters for one extraction run.
///
/// Created once from configuration and CLI input, read-only thereafter.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    /// Match filter on the `level` field, e.g. `ERROR`.
    pub level: Option<String>,

    /// Inclusive lower bound on the `timestamp` field (backend date format).
    pub start: Option<String>,

    /// Inclusive upper bound on the `timestamp` field (backend date format).
    pub end: Option<String>,

    /// Field projection; `None` keeps records unchanged.
    pub fields: Option<Vec<String>>,

    /// Records requested per backend round trip.
    pub batch_size: usize,

    /// Records per output chunk before a flush is forced.
    pub max_records_per_chunk: usize,
}

impl FilterSpec {
    /// A spec with no filters and the given paging parameters.
    pub fn unfiltered(batch_size: usize, max_records_per_chunk: usize) -> Self {
        Self {
            level: None,
            start: None,
            end: None,
            fields: None,
            batch_size,
            max_records_per_chunk,
        }
    }
}
