//! Output module
//!
//! Handles Arrow RecordBatch creation, Parquet encoding and destination
//! upload.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Converting flattened rows to Arrow RecordBatches
//! - Encoding batches as compressed, partitioned Parquet files
//! - Uploading finished files to HDFS (or a local/in-memory store)

mod schema;
mod store;
mod writer;

pub use schema::build_record_batch;
pub use store::Destination;
pub use writer::{FileRef, ParquetFileWriter};
