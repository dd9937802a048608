//! Batch accumulation module
//!
//! Buffers flattened rows per stream and decides when a batch must flush.
//!
//! # Overview
//!
//! The batch module provides:
//! - `BatchAccumulator` - per-stream row buffers with flush triggers
//! - `FlushReason` - why a batch is being flushed

mod accumulator;
mod types;

pub use accumulator::BatchAccumulator;
pub use types::{Batch, FlushReason};
