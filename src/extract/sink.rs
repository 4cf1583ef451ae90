//! Bounded chunk buffering and CSV flushing.
//!
//! Records accumulate in arrival order (ascending timestamp order under the
//! pagination contract) and are flushed as `logs_chunk_<index>.csv` files
//! once the buffer reaches the configured threshold, plus one remainder
//! flush at stream end. Chunk indexes are monotonically increasing from 1.
//! An empty buffer never produces a file.
//!
//! Each chunk derives its own header row: the union of keys across its
//! records, sorted. Records may be sparse; a record missing a key present in
//! the union gets an empty value for that column.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::backend::Record;
use crate::error::{ExtractError, Result};

/// Reported to the orchestrator after each successful flush.
#[derive(Debug, Clone)]
pub struct ChunkReport {
    /// 1-based chunk index.
    pub index: usize,

    /// Records written into this chunk.
    pub records: usize,

    /// Destination file.
    pub path: PathBuf,
}

/// Accumulates records and flushes them as bounded CSV chunks.
pub struct ChunkSink {
    output_dir: PathBuf,
    max_records_per_chunk: usize,
    buffer: Vec<Record>,
    chunk_index: usize,
    records_written: u64,
}

impl ChunkSink {
    /// Create a sink writing into `output_dir`, creating it if needed.
    pub async fn new(output_dir: &Path, max_records_per_chunk: usize) -> Result<Self> {
        if max_records_per_chunk == 0 {
            return Err(ExtractError::InvalidParameters(
                "chunk size must be at least 1".to_string(),
            )
            .into());
        }

        fs::create_dir_all(output_dir).await?;
        debug!("Chunk sink writing into '{}'", output_dir.display());

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            max_records_per_chunk,
            buffer: Vec::new(),
            chunk_index: 1,
            records_written: 0,
        })
    }

    /// Buffer one record.
    pub fn append(&mut self, record: Record) {
        self.buffer.push(record);
    }

    /// Flush the buffer if it has reached the chunk threshold.
    pub async fn flush_if_full(&mut self) -> Result<Option<ChunkReport>> {
        if self.buffer.len() >= self.max_records_per_chunk {
            Ok(Some(self.flush_buffer().await?))
        } else {
            Ok(None)
        }
    }

    /// Flush whatever remains at stream end; no-op on an empty buffer.
    pub async fn flush_remainder(&mut self) -> Result<Option<ChunkReport>> {
        if self.buffer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.flush_buffer().await?))
        }
    }

    /// Total records flushed so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Chunks flushed so far.
    pub fn chunks_written(&self) -> usize {
        self.chunk_index - 1
    }

    async fn flush_buffer(&mut self) -> Result<ChunkReport> {
        let path = self
            .output_dir
            .join(format!("logs_chunk_{}.csv", self.chunk_index));
        let count = self.buffer.len();

        self.write_chunk(&path)
            .await
            .map_err(|source| ExtractError::ChunkWriteFailed {
                path: path.clone(),
                records: count,
                source,
            })?;

        let report = ChunkReport {
            index: self.chunk_index,
            records: count,
            path: path.clone(),
        };

        info!(
            "Chunk {} flushed with {} record(s) to '{}'",
            report.index,
            report.records,
            path.display()
        );

        self.records_written += count as u64;
        self.chunk_index += 1;
        self.buffer.clear();

        Ok(report)
    }

    async fn write_chunk(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path).await?;
        let mut writer = BufWriter::with_capacity(8 * 1024 * 1024, file);

        let headers = Self::header_union(&self.buffer);
        let header_line = headers
            .iter()
            .map(|h| Self::escape_csv_value(h))
            .collect::<Vec<_>>()
            .join(",");
        writer.write_all(header_line.as_bytes()).await?;
        writer.write_all(b"\n").await?;

        for record in &self.buffer {
            let row = headers
                .iter()
                .map(|field| {
                    let rendered = Self::render_value(record.get(field));
                    Self::escape_csv_value(&rendered)
                })
                .collect::<Vec<_>>()
                .join(",");
            writer.write_all(row.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }

        writer.flush().await
    }

    /// Union of field names across the buffered records, sorted.
    fn header_union(records: &[Record]) -> Vec<String> {
        let mut fields = BTreeSet::new();
        for record in records {
            for key in record.keys() {
                fields.insert(key.clone());
            }
        }
        fields.into_iter().collect()
    }

    /// Render one field value as plain text.
    ///
    /// Missing keys and explicit nulls both become the empty column; strings
    /// are written without their JSON quotes; everything else uses its
    /// compact JSON form.
    fn render_value(value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Escape a CSV value if it contains a comma, quote, or newline.
    fn escape_csv_value(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
        {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}
