//! Singer message types
//!
//! One message per input line, discriminated by the `type` field.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A parsed Singer protocol message
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SingerMessage {
    /// Declares or replaces the schema for a stream
    #[serde(rename = "SCHEMA")]
    Schema(SchemaMessage),

    /// A data record for a previously declared stream
    #[serde(rename = "RECORD")]
    Record(RecordMessage),

    /// A checkpoint payload, re-emitted once preceding data is durable
    #[serde(rename = "STATE")]
    State(StateMessage),
}

/// SCHEMA message body
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaMessage {
    /// Stream name
    pub stream: String,
    /// JSON schema for the stream's records
    pub schema: Value,
    /// Primary key properties
    #[serde(default)]
    pub key_properties: Vec<String>,
    /// Bookmark properties used by the tap for incremental sync
    #[serde(default)]
    pub bookmark_properties: Vec<String>,
}

/// RECORD message body
#[derive(Debug, Clone, Deserialize)]
pub struct RecordMessage {
    /// Stream name
    pub stream: String,
    /// The record payload
    pub record: Map<String, Value>,
    /// Extraction timestamp set by the tap
    #[serde(default)]
    pub time_extracted: Option<String>,
}

/// STATE message body
#[derive(Debug, Clone, Deserialize)]
pub struct StateMessage {
    /// Opaque checkpoint payload
    pub value: Value,
}
