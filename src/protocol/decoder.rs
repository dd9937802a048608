//! Line-by-line Singer message decoding

use super::types::SingerMessage;
use crate::error::{Error, Result};
use std::io::BufRead;

/// One-pass reader over newline-delimited Singer messages.
///
/// Lines are consumed exactly once, top to bottom. Malformed JSON or an
/// unrecognized message type yields a fatal `Protocol` error carrying the
/// 1-based line number; blank lines are skipped.
pub struct MessageReader<R> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> MessageReader<R> {
    /// Create a reader over an input stream
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
        }
    }

    /// The number of the most recently read line (1-based)
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn parse(&self, line: &str) -> Result<SingerMessage> {
        serde_json::from_str(line)
            .map_err(|e| Error::protocol(self.line_number, format!("{e}")))
    }
}

impl<R: BufRead> Iterator for MessageReader<R> {
    type Item = Result<SingerMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(self.parse(trimmed));
                }
                Err(e) => return Some(Err(Error::Io(e))),
            }
        }
    }
}
