//! Stream schema module
//!
//! Flattens declared Singer schemas into ordered flat field lists, derives
//! the matching Arrow schema, and tracks the active plan per stream.
//!
//! # Overview
//!
//! The schema module provides:
//! - `StreamPlan` - the flattened schema and Arrow schema for one stream
//! - `SchemaRegistry` - active plan per stream, replaced on new SCHEMA messages
//! - `flatten_schema` - nested JSON schema to flat field list

mod flatten;
mod registry;
mod types;

pub use flatten::{flatten_schema, MAX_FLATTEN_DEPTH};
pub use registry::SchemaRegistry;
pub use types::{FieldKind, FlatField, StreamPlan};
