//! In-memory [`SearchBackend`] used by the pipeline tests.
//!
//! Holds a pre-sorted record set, paginates it according to the `size` and
//! `search_after` parameters of the incoming query document, and records
//! every snapshot open/close and search call so tests can assert on the
//! resource lifecycle. Failures can be injected per search call and on
//! close.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{BackendError, Result};

use super::{Hit, Record, SearchBackend, SnapshotHandle};

pub struct MockBackend {
    index: String,
    records: Vec<Record>,
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    search_calls: usize,
    open_calls: usize,
    close_calls: usize,
    fail_search_on_call: Option<usize>,
    fail_close: bool,
}

impl MockBackend {
    /// Create a mock over `records`, which must already be in sort order.
    pub fn new(index: &str, records: Vec<Record>) -> Self {
        Self {
            index: index.to_string(),
            records,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Make the nth search call (1-based) fail with a query error.
    pub fn with_search_failure_at(self, call: usize) -> Self {
        self.state.lock().unwrap().fail_search_on_call = Some(call);
        self
    }

    /// Make every close attempt fail.
    pub fn with_failing_close(self) -> Self {
        self.state.lock().unwrap().fail_close = true;
        self
    }

    pub fn search_calls(&self) -> usize {
        self.state.lock().unwrap().search_calls
    }

    pub fn open_calls(&self) -> usize {
        self.state.lock().unwrap().open_calls
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }

    /// Sort tuple for the record at `pos`: its timestamp plus the position
    /// as the deterministic tiebreaker.
    fn sort_key(&self, pos: usize) -> Vec<Value> {
        let ts = self.records[pos]
            .get("timestamp")
            .cloned()
            .unwrap_or(Value::Null);
        vec![ts, json!(pos)]
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        Ok(index == self.index)
    }

    async fn open_snapshot(&self, index: &str, keep_alive: &str) -> Result<SnapshotHandle> {
        self.state.lock().unwrap().open_calls += 1;

        if index != self.index {
            return Err(BackendError::IndexNotFound(index.to_string()).into());
        }

        Ok(SnapshotHandle {
            id: format!("mock-pit-{index}"),
            keep_alive: keep_alive.to_string(),
        })
    }

    async fn close_snapshot(&self, _snapshot: &SnapshotHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.close_calls += 1;

        if state.fail_close {
            Err(BackendError::SnapshotCloseFailed("injected close failure".into()).into())
        } else {
            Ok(())
        }
    }

    async fn search(&self, query: &Value) -> Result<Vec<Hit>> {
        {
            let mut state = self.state.lock().unwrap();
            state.search_calls += 1;

            if state.fail_search_on_call == Some(state.search_calls) {
                return Err(
                    BackendError::QueryFailed("injected failure on search call".into()).into(),
                );
            }
        }

        let size = query
            .get("size")
            .and_then(Value::as_u64)
            .expect("mock query must carry a size") as usize;

        // Resume strictly after the cursor's tiebreaker position.
        let start = match query.get("search_after").and_then(Value::as_array) {
            Some(tuple) => {
                let pos = tuple
                    .last()
                    .and_then(Value::as_u64)
                    .expect("mock cursor must end in a position tiebreaker");
                pos as usize + 1
            }
            None => 0,
        };

        let end = (start + size).min(self.records.len());
        let hits = (start..end)
            .map(|pos| Hit {
                source: self.records[pos].clone(),
                sort: self.sort_key(pos),
            })
            .collect();

        Ok(hits)
    }
}

/// Build `n` synthetic, pre-sorted log records for tests.
pub fn synthetic_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let record = json!({
                "timestamp": format!("2025-04-25T00:00:{:02}Z", i % 60),
                "level": if i % 4 == 0 { "ERROR" } else { "INFO" },
                "msg": format!("event {i}"),
            });
            record.as_object().cloned().unwrap()
        })
        .collect()
}
