//! Per-stream batch accumulation and flush triggers

use super::types::{Batch, FlushReason};
use crate::config::TargetConfig;
use crate::flatten::FlatRow;
use std::collections::HashMap;
use tracing::debug;

/// Buffers rows per stream and reports when a batch must flush.
///
/// Triggers are evaluated after every append, in priority order: row count
/// first, then estimated byte size. External triggers (schema change, state
/// checkpoint, end of input) are driven by the engine through `take`.
pub struct BatchAccumulator {
    batches: HashMap<String, Batch>,
    max_rows: usize,
    max_bytes: u64,
}

impl BatchAccumulator {
    /// Build an accumulator with the configuration's effective limits
    pub fn from_config(config: &TargetConfig) -> Self {
        Self::new(config.effective_max_rows(), config.effective_max_bytes())
    }

    /// Build an accumulator with explicit limits
    pub fn new(max_rows: usize, max_bytes: u64) -> Self {
        Self {
            batches: HashMap::new(),
            max_rows,
            max_bytes,
        }
    }

    /// Append a row to the stream's batch and evaluate flush triggers.
    ///
    /// A single row larger than the byte limit is still accepted: it lands
    /// in the batch and trips the size trigger on the same call.
    pub fn append(&mut self, stream: &str, row: FlatRow) -> Option<FlushReason> {
        let batch = self.batches.entry(stream.to_string()).or_default();
        batch.push(row);

        debug!(
            stream,
            rows = batch.len(),
            estimated_bytes = batch.estimated_bytes(),
            "batch updated"
        );

        if batch.len() >= self.max_rows {
            Some(FlushReason::RowCount)
        } else if batch.estimated_bytes() >= self.max_bytes {
            Some(FlushReason::ByteSize)
        } else {
            None
        }
    }

    /// Drain the stream's batch for writing, resetting it to empty
    pub fn take(&mut self, stream: &str) -> Vec<FlatRow> {
        self.batches
            .get_mut(stream)
            .map(Batch::take)
            .unwrap_or_default()
    }

    /// Whether the stream currently holds buffered rows
    pub fn has_rows(&self, stream: &str) -> bool {
        self.batches.get(stream).is_some_and(|b| !b.is_empty())
    }

    /// Buffered row count for a stream
    pub fn row_count(&self, stream: &str) -> usize {
        self.batches.get(stream).map_or(0, Batch::len)
    }

    /// Whether every stream's batch is empty
    pub fn is_drained(&self) -> bool {
        self.batches.values().all(Batch::is_empty)
    }

    /// Streams that currently hold buffered rows, in name order.
    ///
    /// Name order keeps `flush_all` deterministic.
    pub fn streams_with_rows(&self) -> Vec<String> {
        let mut streams: Vec<String> = self
            .batches
            .iter()
            .filter(|(_, b)| !b.is_empty())
            .map(|(s, _)| s.clone())
            .collect();
        streams.sort();
        streams
    }
}
