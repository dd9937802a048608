//! Singer protocol module
//!
//! Parses newline-delimited Singer messages (SCHEMA, RECORD, STATE) from
//! an input stream.
//!
//! # Overview
//!
//! The protocol module provides:
//! - `SingerMessage` - discriminated message types
//! - `MessageReader` - a one-pass reader over an input stream

mod decoder;
mod types;

pub use decoder::MessageReader;
pub use types::{RecordMessage, SchemaMessage, SingerMessage, StateMessage};
