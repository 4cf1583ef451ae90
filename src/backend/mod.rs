//! Search backend abstraction.
//!
//! The extraction pipeline talks to the backend exclusively through the
//! [`SearchBackend`] trait: an existence check for the target index, the
//! point-in-time snapshot lifecycle, and a paged search call. The production
//! implementation lives in [`http`]; tests substitute in-memory mocks behind
//! the same trait.
//!
//! The client handle is created once at startup and passed into the
//! orchestrator explicitly. Nothing in the crate holds a process-wide
//! backend singleton.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub mod http;

#[cfg(test)]
pub mod mock;

pub use http::HttpBackend;

/// One source document as returned by the backend: a sparse field mapping.
///
/// Records have no fixed schema; consumers must tolerate fields that appear
/// in some records and not in others.
pub type Record = serde_json::Map<String, Value>;

/// Sort-key tuple identifying a record's position in the pagination order.
pub type SortKey = Vec<Value>;

/// Handle to a server-side point-in-time snapshot.
///
/// Issued by [`SearchBackend::open_snapshot`] and owned by exactly one run.
/// The snapshot manager guarantees a close attempt on every exit path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHandle {
    /// Backend-issued snapshot identifier.
    pub id: String,

    /// Keep-alive window requested for the snapshot, e.g. `"1m"`.
    pub keep_alive: String,
}

/// A single search hit: the document payload plus its sort-key tuple.
#[derive(Debug, Clone)]
pub struct Hit {
    /// Document fields.
    pub source: Record,

    /// Position of this hit in the query's sort order; feeds the next
    /// page's `search_after` cursor.
    pub sort: SortKey,
}

/// Operations the extraction pipeline requires from a search backend.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Check whether the named index exists.
    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// Open a point-in-time snapshot over the index.
    ///
    /// # Arguments
    /// * `index` - Target index name
    /// * `keep_alive` - Snapshot lifetime, e.g. `"1m"`
    async fn open_snapshot(&self, index: &str, keep_alive: &str) -> Result<SnapshotHandle>;

    /// Release a previously opened snapshot.
    ///
    /// Closing an already-closed snapshot may succeed or fail depending on
    /// the backend; callers treat close as best-effort.
    async fn close_snapshot(&self, snapshot: &SnapshotHandle) -> Result<()>;

    /// Execute one paged search and return its hits in sort order.
    ///
    /// The query document carries the snapshot reference, page size, sort
    /// specification, and optional `search_after` cursor (see
    /// `extract::query::build_query`).
    async fn search(&self, query: &Value) -> Result<Vec<Hit>>;
}
