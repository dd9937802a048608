//! Target engine module
//!
//! The sequential pipeline: decode messages, flatten records, accumulate
//! batches, write and upload files, and emit gated state checkpoints.
//!
//! # Overview
//!
//! The engine module provides:
//! - `TargetEngine` - owns every pipeline stage and runs input to exhaustion
//! - `RunStats` - counters reported at the end of a run

mod types;

pub use types::RunStats;

use crate::batch::{BatchAccumulator, FlushReason};
use crate::config::TargetConfig;
use crate::error::Result;
use crate::flatten::RecordFlattener;
use crate::output::{Destination, ParquetFileWriter};
use crate::protocol::{MessageReader, RecordMessage, SchemaMessage, SingerMessage, StateMessage};
use crate::schema::SchemaRegistry;
use crate::state::StateEmitter;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{info, warn};

/// The target pipeline.
///
/// Processes messages strictly in arrival order on one thread of control.
/// Writes and uploads block the loop, which is what guarantees that a state
/// checkpoint is never acknowledged before its preceding data is durable.
pub struct TargetEngine<W> {
    config: TargetConfig,
    registry: SchemaRegistry,
    flattener: RecordFlattener,
    accumulator: BatchAccumulator,
    writer: ParquetFileWriter,
    destination: Destination,
    emitter: StateEmitter,
    state_out: W,
    stats: RunStats,
}

impl<W: Write> TargetEngine<W> {
    /// Wire up a pipeline from configuration.
    ///
    /// `state_out` receives acknowledged state checkpoints; in production
    /// this is stdout, with all logging on stderr.
    pub fn new(config: TargetConfig, destination: Destination, state_out: W) -> Result<Self> {
        let registry = SchemaRegistry::from_config(&config)?;
        let flattener = RecordFlattener::from_config(&config);
        let accumulator = BatchAccumulator::from_config(&config);
        let writer = ParquetFileWriter::from_config(&config);

        Ok(Self {
            config,
            registry,
            flattener,
            accumulator,
            writer,
            destination,
            emitter: StateEmitter::new(),
            state_out,
            stats: RunStats::default(),
        })
    }

    /// Consume the input to exhaustion, then flush every stream and emit
    /// any pending state
    pub async fn run<R: BufRead>(&mut self, input: R) -> Result<RunStats> {
        let reader = MessageReader::new(input);
        for message in reader {
            match message? {
                SingerMessage::Schema(schema) => self.on_schema(schema).await?,
                SingerMessage::Record(record) => self.on_record(record).await?,
                SingerMessage::State(state) => self.on_state(state).await?,
            }
        }
        self.finish().await?;
        Ok(self.stats.clone())
    }

    /// Final statistics
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    async fn on_schema(&mut self, message: SchemaMessage) -> Result<()> {
        // A replacement schema must not land on a batch built under the old
        // one: flush the stream first
        if self.registry.contains(&message.stream) && self.accumulator.has_rows(&message.stream) {
            self.flush_stream(&message.stream, FlushReason::SchemaChange)
                .await?;
        }
        self.registry.declare(&message)?;
        Ok(())
    }

    async fn on_record(&mut self, message: RecordMessage) -> Result<()> {
        self.stats.records_read += 1;
        let plan = Arc::clone(self.registry.current(&message.stream)?);

        match self.flattener.flatten(&plan, &message.record) {
            Ok(row) => {
                if let Some(reason) = self.accumulator.append(&message.stream, row) {
                    self.flush_stream(&message.stream, reason).await?;
                }
                Ok(())
            }
            Err(e) if !e.is_fatal() => {
                warn!("Skipping record: {e}");
                self.stats.records_skipped += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn on_state(&mut self, message: StateMessage) -> Result<()> {
        self.emitter.stage(message.value);
        if self.config.flush_on_state {
            self.flush_all(FlushReason::StateCheckpoint).await?;
        }
        self.emit_state_if_ready()
    }

    async fn finish(&mut self) -> Result<()> {
        self.flush_all(FlushReason::EndOfInput).await?;
        self.emit_state_if_ready()?;
        info!("Run complete: {}", self.stats.summary());
        Ok(())
    }

    /// Write and upload one stream's batch, then re-check state emission
    async fn flush_stream(&mut self, stream: &str, reason: FlushReason) -> Result<()> {
        let rows = self.accumulator.take(stream);
        if rows.is_empty() {
            return Ok(());
        }
        let plan = Arc::clone(self.registry.current(stream)?);

        info!("Flushing {} rows from stream '{stream}' ({reason})", rows.len());
        let files = self.writer.write(&plan, &rows)?;
        for file in &files {
            self.destination.put(file).await?;
            self.stats.files_written += 1;
            self.stats.bytes_uploaded += file.size() as u64;
        }

        self.emit_state_if_ready()
    }

    /// Flush every stream holding rows, in deterministic order
    async fn flush_all(&mut self, reason: FlushReason) -> Result<()> {
        for stream in self.accumulator.streams_with_rows() {
            self.flush_stream(&stream, reason).await?;
        }
        Ok(())
    }

    fn emit_state_if_ready(&mut self) -> Result<()> {
        self.emitter
            .emit_if_ready(self.accumulator.is_drained(), &mut self.state_out)?;
        self.stats.states_emitted = self.emitter.emitted();
        Ok(())
    }
}
