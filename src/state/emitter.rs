//! Gated state emission

use crate::error::Result;
use serde_json::Value;
use std::io::Write;
use tracing::{debug, info};

/// Stages the most recent STATE payload and emits it only once the caller
/// confirms every record received before it has been flushed and uploaded.
///
/// A downstream orchestrator resumes from the last emitted state, so a
/// checkpoint must never be acknowledged ahead of its data. At most one
/// payload is pending; newer checkpoints overwrite older unsent ones.
#[derive(Debug, Default)]
pub struct StateEmitter {
    pending: Option<Value>,
    emitted: usize,
}

impl StateEmitter {
    /// Create an emitter with no pending state
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a checkpoint payload, overwriting any unsent one
    pub fn stage(&mut self, value: Value) {
        if self.pending.is_some() {
            debug!("Overwriting pending state checkpoint with a newer one");
        }
        self.pending = Some(value);
    }

    /// Whether a checkpoint is staged and unsent
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of checkpoints written so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Write the pending checkpoint if `drained` confirms that no stream
    /// holds buffered rows. The payload is written as one JSON line and the
    /// output is flushed before the checkpoint is considered acknowledged.
    pub fn emit_if_ready<W: Write>(&mut self, drained: bool, out: &mut W) -> Result<()> {
        if !drained {
            return Ok(());
        }
        if let Some(value) = self.pending.take() {
            let line = serde_json::to_string(&value)?;
            writeln!(out, "{line}")?;
            out.flush()?;
            self.emitted += 1;
            info!("Emitted state checkpoint");
        }
        Ok(())
    }
}
