//! Schema types
//!
//! Defines the flattened field model and the per-stream plan.

use crate::error::{Error, Result};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Declared type of a flattened field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `boolean`
    Boolean,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `string` (also the fallback for undeclared types)
    String,
    /// `array` - kept whole and serialized to JSON text
    Array,
    /// `object` leaf (no properties, or past the flatten depth limit) -
    /// kept whole and serialized to JSON text
    Object,
}

impl FieldKind {
    /// Resolve a Singer `type` list (e.g. `["null", "integer"]`) into a
    /// field kind and nullability.
    ///
    /// A missing or empty type is treated as string; an unsupported type is
    /// a fatal schema error.
    pub fn from_singer_types(stream: &str, field: &str, types: &[String]) -> Result<(Self, bool)> {
        let nullable = types.iter().any(|t| t.eq_ignore_ascii_case("null"));
        let declared = types.iter().find(|t| !t.eq_ignore_ascii_case("null"));

        let kind = match declared.map(|t| t.to_ascii_lowercase()).as_deref() {
            Some("boolean") => Self::Boolean,
            Some("integer") => Self::Integer,
            Some("number") => Self::Number,
            Some("string") => Self::String,
            Some("array") => Self::Array,
            Some("object") => Self::Object,
            None | Some("") => {
                warn!("Field '{field}' in stream '{stream}' has no declared type, defaulting to string");
                Self::String
            }
            Some(other) => {
                return Err(Error::schema(
                    stream,
                    format!("unsupported type '{other}' for field '{field}'"),
                ))
            }
        };

        Ok((kind, nullable))
    }

    /// The Arrow type this field is encoded as
    pub fn arrow_type(self) -> DataType {
        match self {
            Self::Boolean => DataType::Boolean,
            Self::Integer => DataType::Int64,
            Self::Number => DataType::Float64,
            Self::String | Self::Array | Self::Object => DataType::Utf8,
        }
    }
}

/// One flattened field of a stream schema
#[derive(Debug, Clone)]
pub struct FlatField {
    /// Flattened (and possibly normalized) field name
    pub name: String,
    /// Declared type
    pub kind: FieldKind,
    /// Whether `null` was among the declared types
    pub nullable: bool,
}

/// The active plan for one stream: flattened fields, Arrow schema, and the
/// static extra values injected into every row.
///
/// Replaced wholesale when a new SCHEMA message arrives for the stream.
#[derive(Debug)]
pub struct StreamPlan {
    /// Stream name
    pub stream: String,
    /// Ordered flattened fields (declared fields first, extra fields last)
    pub fields: Vec<FlatField>,
    /// Extra static values, as (field index, value) pairs
    pub extra_values: Vec<(usize, serde_json::Value)>,
    /// Primary key properties from the SCHEMA message
    pub key_properties: Vec<String>,
    /// Bookmark properties from the SCHEMA message
    pub bookmark_properties: Vec<String>,
    index: HashMap<String, usize>,
    arrow: SchemaRef,
}

impl StreamPlan {
    /// Build a plan from an ordered field list
    pub fn new(
        stream: impl Into<String>,
        fields: Vec<FlatField>,
        extra_values: Vec<(usize, serde_json::Value)>,
        key_properties: Vec<String>,
        bookmark_properties: Vec<String>,
    ) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        // All Arrow fields are nullable: rows may omit any field, and the
        // flattener fills absences with null.
        let arrow = Arc::new(Schema::new(
            fields
                .iter()
                .map(|f| Field::new(&f.name, f.kind.arrow_type(), true))
                .collect::<Vec<_>>(),
        ));

        Self {
            stream: stream.into(),
            fields,
            extra_values,
            key_properties,
            bookmark_properties,
            index,
            arrow,
        }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the plan has no columns
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of a flattened field name
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// The derived Arrow schema
    pub fn arrow_schema(&self) -> SchemaRef {
        Arc::clone(&self.arrow)
    }
}
