//! Target configuration
//!
//! Configuration is supplied as a JSON document (file or inline string),
//! matching the option surface of the Meltano target this replaces.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Parquet compression method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Gzip (default)
    Gzip,
    /// Snappy
    Snappy,
    /// Zstandard
    Zstd,
    /// Brotli
    Brotli,
}

impl CompressionMethod {
    /// Parse a configured method name.
    ///
    /// An unsupported method falls back to gzip with a warning; it never
    /// fails the run.
    pub fn parse_lenient(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "gzip" => Self::Gzip,
            "snappy" => Self::Snappy,
            "zstd" => Self::Zstd,
            "brotli" => Self::Brotli,
            other => {
                warn!("Unsupported compression method '{other}', falling back to gzip");
                Self::Gzip
            }
        }
    }

    /// Filename extension inserted before `.parquet`
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gzip => ".gz",
            Self::Snappy => ".snappy",
            Self::Zstd => ".zst",
            Self::Brotli => ".br",
        }
    }

    /// Convert to the parquet writer's compression setting
    pub fn to_parquet(self) -> parquet::basic::Compression {
        use parquet::basic::{BrotliLevel, Compression, GzipLevel, ZstdLevel};
        match self {
            Self::Gzip => Compression::GZIP(GzipLevel::default()),
            Self::Snappy => Compression::SNAPPY,
            Self::Zstd => Compression::ZSTD(ZstdLevel::default()),
            Self::Brotli => Compression::BROTLI(BrotliLevel::default()),
        }
    }
}

/// Complete target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Destination root: an `hdfs://` URL or a local directory
    pub hdfs_destination_path: String,

    /// Compression method: snappy, zstd, brotli or gzip
    #[serde(default = "default_compression_method")]
    pub compression_method: String,

    /// Max in-memory table size per stream, in MB, before a flush is forced
    #[serde(default = "default_max_pyarrow_table_size")]
    pub max_pyarrow_table_size: u64,

    /// Max buffered rows per stream before a flush is forced
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Extra static fields added to every row (e.g. `col1=a,col2=b`)
    #[serde(default)]
    pub extra_fields: Option<String>,

    /// Types for the extra fields (e.g. `col1=string,col2=integer`)
    #[serde(default)]
    pub extra_fields_types: Option<String>,

    /// Ordered partition columns (e.g. `country,year`)
    #[serde(default)]
    pub partition_cols: Option<String>,

    /// Write each stream's files under a subdirectory named after the stream
    #[serde(default)]
    pub streams_in_separate_folder: bool,

    /// Prefix prepended to every output filename
    #[serde(default)]
    pub file_prefix: Option<String>,

    /// Per-file row limit, folded into the row flush trigger
    #[serde(default)]
    pub rows_per_file: Option<usize>,

    /// Per-file size limit in MB, folded into the byte flush trigger
    #[serde(default)]
    pub file_size_mb: Option<u64>,

    /// Normalize flattened field names to snake_case
    #[serde(default)]
    pub force_header_snake_case: bool,

    /// Separator used when joining nested field names
    #[serde(default = "default_flatten_separator")]
    pub flatten_separator: String,

    /// Flush all streams whenever a STATE message arrives, so the
    /// checkpoint can be acknowledged immediately
    #[serde(default)]
    pub flush_on_state: bool,
}

fn default_compression_method() -> String {
    "gzip".to_string()
}

fn default_max_pyarrow_table_size() -> u64 {
    800
}

fn default_max_batch_size() -> usize {
    10_000
}

fn default_flatten_separator() -> String {
    "__".to_string()
}

impl TargetConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json(&contents)
    }

    /// Load configuration from an inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Failed to parse config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.hdfs_destination_path.is_empty() {
            return Err(Error::missing_field("hdfs_destination_path"));
        }
        if self.max_batch_size == 0 {
            return Err(Error::InvalidConfigValue {
                field: "max_batch_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_pyarrow_table_size == 0 {
            return Err(Error::InvalidConfigValue {
                field: "max_pyarrow_table_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.flatten_separator.is_empty() {
            return Err(Error::InvalidConfigValue {
                field: "flatten_separator".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        // extra_fields and extra_fields_types must be both set or both unset,
        // with identical key sets
        let values = self.parsed_extra_fields()?;
        let types = self.parsed_extra_field_types()?;
        if values.is_empty() != types.is_empty() {
            return Err(Error::config(
                "extra_fields and extra_fields_types must be both set or both unset",
            ));
        }
        let mut value_keys: Vec<&str> = values.iter().map(|(k, _)| k.as_str()).collect();
        let mut type_keys: Vec<&str> = types.iter().map(|(k, _)| k.as_str()).collect();
        value_keys.sort_unstable();
        type_keys.sort_unstable();
        if value_keys != type_keys {
            return Err(Error::config(
                "extra_fields and extra_fields_types must have the same keys",
            ));
        }

        Ok(())
    }

    /// The resolved compression method
    pub fn compression(&self) -> CompressionMethod {
        CompressionMethod::parse_lenient(&self.compression_method)
    }

    /// Extra field name/value pairs, in declaration order
    pub fn parsed_extra_fields(&self) -> Result<Vec<(String, String)>> {
        parse_kv_list(self.extra_fields.as_deref(), "extra_fields")
    }

    /// Extra field name/type pairs, in declaration order
    pub fn parsed_extra_field_types(&self) -> Result<Vec<(String, String)>> {
        parse_kv_list(self.extra_fields_types.as_deref(), "extra_fields_types")
    }

    /// Ordered partition column names
    pub fn parsed_partition_cols(&self) -> Vec<String> {
        self.partition_cols
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Row flush trigger: the stricter of the batch and per-file limits
    pub fn effective_max_rows(&self) -> usize {
        match self.rows_per_file {
            Some(rows) if rows > 0 => self.max_batch_size.min(rows),
            _ => self.max_batch_size,
        }
    }

    /// Byte flush trigger: the stricter of the batch and per-file limits
    pub fn effective_max_bytes(&self) -> u64 {
        let mb = match self.file_size_mb {
            Some(size) if size > 0 => self.max_pyarrow_table_size.min(size),
            _ => self.max_pyarrow_table_size,
        };
        mb * 1024 * 1024
    }
}

/// Parse a `k1=v1,k2=v2` option value
fn parse_kv_list(raw: Option<&str>, field: &str) -> Result<Vec<(String, String)>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .filter(|kv| !kv.trim().is_empty())
        .map(|kv| {
            kv.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| Error::InvalidConfigValue {
                    field: field.to_string(),
                    message: format!("expected key=value, got '{kv}'"),
                })
        })
        .collect()
}
