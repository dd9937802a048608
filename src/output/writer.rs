//! Parquet file writer
//!
//! Turns one flushed batch into one Parquet file per distinct partition
//! value combination, encoded in memory and ready for upload.

use super::schema::build_record_batch;
use crate::config::{CompressionMethod, TargetConfig};
use crate::error::{Error, Result};
use crate::flatten::FlatRow;
use crate::schema::StreamPlan;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::Utc;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Directory name used for null partition values (Hive convention)
const NULL_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// A finished, encoded file awaiting upload
#[derive(Debug, Clone)]
pub struct FileRef {
    /// Path relative to the destination root
    pub path: String,
    /// Encoded Parquet bytes
    pub data: Bytes,
    /// Number of rows in the file
    pub rows: usize,
}

impl FileRef {
    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Encodes flushed batches as Parquet files.
///
/// Filenames carry the run timestamp and a per-stream counter so repeated
/// flushes never collide: `{prefix-}{stream}-{timestamp}-{i}{ext}.parquet`.
pub struct ParquetFileWriter {
    compression: CompressionMethod,
    file_prefix: String,
    streams_in_separate_folder: bool,
    partition_cols: Vec<String>,
    run_stamp: String,
    counters: HashMap<String, usize>,
}

impl ParquetFileWriter {
    /// Build a writer from the target configuration, stamping filenames
    /// with the current UTC time
    pub fn from_config(config: &TargetConfig) -> Self {
        Self::with_run_stamp(config, Utc::now().format("%Y%m%d_%H%M%S").to_string())
    }

    /// Build a writer with an explicit run timestamp
    pub fn with_run_stamp(config: &TargetConfig, run_stamp: String) -> Self {
        let file_prefix = config
            .file_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{p}-"))
            .unwrap_or_default();

        Self {
            compression: config.compression(),
            file_prefix,
            streams_in_separate_folder: config.streams_in_separate_folder,
            partition_cols: config.parsed_partition_cols(),
            run_stamp,
            counters: HashMap::new(),
        }
    }

    /// Encode one flushed batch.
    ///
    /// Without partition columns this produces exactly one file. With them,
    /// rows are grouped by partition value combination and one file is
    /// produced per group, under `col=value/...` subdirectories.
    pub fn write(&mut self, plan: &StreamPlan, rows: &[FlatRow]) -> Result<Vec<FileRef>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let partition_indices: Vec<usize> = self
            .partition_cols
            .iter()
            .map(|col| {
                plan.field_index(col).ok_or_else(|| {
                    Error::write(
                        &plan.stream,
                        format!("partition column '{col}' missing from plan"),
                    )
                })
            })
            .collect::<Result<_>>()?;
        let data_indices: Vec<usize> = (0..plan.len())
            .filter(|i| !partition_indices.contains(i))
            .collect();

        let mut files = Vec::new();
        for (partition_path, group) in group_by_partition(plan, rows, &partition_indices) {
            let batch = build_record_batch(plan, &group, &data_indices)?;
            let data = self.encode(&plan.stream, &batch)?;
            let path = self.build_path(&plan.stream, &partition_path);
            debug!(
                stream = plan.stream.as_str(),
                path = path.as_str(),
                rows = group.len(),
                bytes = data.len(),
                "encoded parquet file"
            );
            files.push(FileRef {
                path,
                data,
                rows: group.len(),
            });
        }

        Ok(files)
    }

    fn encode(&self, stream: &str, batch: &RecordBatch) -> Result<Bytes> {
        let props = WriterProperties::builder()
            .set_compression(self.compression.to_parquet())
            .build();

        let mut writer = ArrowWriter::try_new(Vec::new(), batch.schema(), Some(props))
            .map_err(|e| Error::write(stream, format!("Failed to create Parquet writer: {e}")))?;
        writer
            .write(batch)
            .map_err(|e| Error::write(stream, format!("Failed to write batch: {e}")))?;
        let buffer = writer
            .into_inner()
            .map_err(|e| Error::write(stream, format!("Failed to close Parquet writer: {e}")))?;

        Ok(Bytes::from(buffer))
    }

    fn build_path(&mut self, stream: &str, partition_path: &str) -> String {
        let counter = self.counters.entry(stream.to_string()).or_insert(0);
        let filename = format!(
            "{}{stream}-{}-{counter}{}.parquet",
            self.file_prefix,
            self.run_stamp,
            self.compression.extension()
        );
        *counter += 1;

        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if self.streams_in_separate_folder {
            parts.push(stream);
        }
        if !partition_path.is_empty() {
            parts.push(partition_path);
        }
        parts.push(&filename);
        parts.join("/")
    }
}

/// Group row references by their partition value combination.
///
/// The key doubles as the `col=value/...` subpath. BTreeMap keeps group
/// order deterministic.
fn group_by_partition<'a>(
    plan: &StreamPlan,
    rows: &'a [FlatRow],
    partition_indices: &[usize],
) -> BTreeMap<String, Vec<&'a FlatRow>> {
    let mut groups: BTreeMap<String, Vec<&FlatRow>> = BTreeMap::new();
    for row in rows {
        let key = partition_indices
            .iter()
            .map(|&i| format!("{}={}", plan.fields[i].name, partition_value(&row[i])))
            .collect::<Vec<_>>()
            .join("/");
        groups.entry(key).or_default().push(row);
    }
    groups
}

/// Render a partition value as a path segment
fn partition_value(value: &Value) -> String {
    let rendered = match value {
        Value::Null => NULL_PARTITION.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    // Path separators inside a value would silently add directory levels
    rendered.replace('/', "_")
}
