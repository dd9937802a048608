//! Engine types

/// Statistics for one target run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// RECORD messages read from input
    pub records_read: usize,
    /// Records skipped after a flatten failure
    pub records_skipped: usize,
    /// Files written and uploaded
    pub files_written: usize,
    /// Total uploaded bytes
    pub bytes_uploaded: u64,
    /// State checkpoints written to stdout
    pub states_emitted: usize,
}

impl RunStats {
    /// One-line summary for the end-of-run log
    pub fn summary(&self) -> String {
        format!(
            "{} records read ({} skipped), {} files written ({} bytes), {} states emitted",
            self.records_read,
            self.records_skipped,
            self.files_written,
            self.bytes_uploaded,
            self.states_emitted
        )
    }
}
