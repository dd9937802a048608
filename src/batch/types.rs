//! Batch types

use crate::flatten::FlatRow;
use serde_json::Value;
use std::fmt;

/// Why a batch is being flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// Row count reached the configured limit
    RowCount,
    /// Estimated byte size reached the configured limit
    ByteSize,
    /// A new SCHEMA message replaced the stream's schema
    SchemaChange,
    /// A STATE message arrived and flush-on-state is configured
    StateCheckpoint,
    /// End of input
    EndOfInput,
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::RowCount => "row count limit",
            Self::ByteSize => "byte size limit",
            Self::SchemaChange => "schema change",
            Self::StateCheckpoint => "state checkpoint",
            Self::EndOfInput => "end of input",
        };
        f.write_str(reason)
    }
}

/// Buffered rows for one stream, with running statistics
#[derive(Debug, Default)]
pub struct Batch {
    rows: Vec<FlatRow>,
    estimated_bytes: u64,
}

impl Batch {
    /// Append a row, updating the size estimate
    pub fn push(&mut self, row: FlatRow) {
        self.estimated_bytes += row.iter().map(estimate_value_size).sum::<u64>();
        self.rows.push(row);
    }

    /// Number of buffered rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the batch holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Estimated serialized size of the buffered rows, in bytes
    pub fn estimated_bytes(&self) -> u64 {
        self.estimated_bytes
    }

    /// Drain the batch, resetting it to empty
    pub fn take(&mut self) -> Vec<FlatRow> {
        self.estimated_bytes = 0;
        std::mem::take(&mut self.rows)
    }
}

/// Approximate serialized size of one value, in bytes
fn estimate_value_size(value: &Value) -> u64 {
    match value {
        Value::Null => 4,
        Value::Bool(_) => 1,
        Value::Number(_) => 8,
        Value::String(s) => s.len() as u64,
        // Arrays and objects are serialized to text before batching; this
        // arm only covers values that bypassed coercion
        other => other.to_string().len() as u64,
    }
}
