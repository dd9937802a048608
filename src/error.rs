//! Error types for the HDFS target
//!
//! This module defines the error hierarchy for the entire target.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the HDFS target
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    // ============================================================================
    // Protocol Errors
    // ============================================================================
    #[error("Protocol error on line {line}: {message}")]
    Protocol { line: usize, message: String },

    #[error("Record for stream '{stream}' arrived before any SCHEMA message")]
    UnknownStream { stream: String },

    // ============================================================================
    // Schema / Flattening Errors
    // ============================================================================
    #[error("Schema error for stream '{stream}': {message}")]
    Schema { stream: String, message: String },

    #[error("Failed to flatten record in stream '{stream}', field '{field}': {message}")]
    Flatten {
        stream: String,
        field: String,
        message: String,
    },

    // ============================================================================
    // Write / Upload Errors
    // ============================================================================
    #[error("Write error for stream '{stream}': {message}")]
    Write { stream: String, message: String },

    #[error("Upload failed for '{path}': {message}")]
    Upload { path: String, message: String },

    // ============================================================================
    // Library Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a protocol error for a given input line
    pub fn protocol(line: usize, message: impl Into<String>) -> Self {
        Self::Protocol {
            line,
            message: message.into(),
        }
    }

    /// Create an unknown stream error
    pub fn unknown_stream(stream: impl Into<String>) -> Self {
        Self::UnknownStream {
            stream: stream.into(),
        }
    }

    /// Create a schema error
    pub fn schema(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Create a flatten error
    pub fn flatten(
        stream: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Flatten {
            stream: stream.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Create an upload error
    pub fn upload(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upload {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error aborts the run.
    ///
    /// Flatten errors are data-level: the offending record is logged and
    /// skipped. Everything else terminates the process with a non-zero exit.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Flatten { .. })
    }
}

/// Result type alias for the HDFS target
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
