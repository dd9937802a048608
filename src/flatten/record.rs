//! Nested record to flat row conversion

use super::normalize::normalize_name;
use crate::config::TargetConfig;
use crate::error::{Error, Result};
use crate::schema::{FieldKind, StreamPlan, MAX_FLATTEN_DEPTH};
use serde_json::{Map, Value};

/// One flattened row, positionally aligned with the stream plan's fields
pub type FlatRow = Vec<Value>;

/// Flattens nested records into rows matching a stream plan.
///
/// Fields absent from the record stay null; record fields not in the plan
/// are ignored. A value that cannot be coerced to its declared type is a
/// `Flatten` error naming the stream and field - the caller logs and skips
/// the row.
pub struct RecordFlattener {
    separator: String,
    normalize: bool,
}

impl RecordFlattener {
    /// Build a flattener from the target configuration
    pub fn from_config(config: &TargetConfig) -> Self {
        Self {
            separator: config.flatten_separator.clone(),
            normalize: config.force_header_snake_case,
        }
    }

    /// Create a flattener with an explicit separator
    pub fn new(separator: impl Into<String>, normalize: bool) -> Self {
        Self {
            separator: separator.into(),
            normalize,
        }
    }

    /// Flatten one record into a row aligned with `plan`
    pub fn flatten(&self, plan: &StreamPlan, record: &Map<String, Value>) -> Result<FlatRow> {
        let mut row = vec![Value::Null; plan.len()];
        self.walk(plan, record, "", 0, &mut row)?;

        for (index, value) in &plan.extra_values {
            row[*index] = value.clone();
        }

        Ok(row)
    }

    fn walk(
        &self,
        plan: &StreamPlan,
        object: &Map<String, Value>,
        parent_key: &str,
        depth: usize,
        row: &mut FlatRow,
    ) -> Result<()> {
        for (key, value) in object {
            let new_key = if parent_key.is_empty() {
                key.clone()
            } else {
                format!("{parent_key}{}{key}", self.separator)
            };
            let name = if self.normalize {
                normalize_name(&new_key)
            } else {
                new_key.clone()
            };

            if let Some(index) = plan.field_index(&name) {
                let field = &plan.fields[index];
                row[index] = coerce(&plan.stream, &field.name, field.kind, value)?;
            } else if let Value::Object(nested) = value {
                if depth < MAX_FLATTEN_DEPTH {
                    self.walk(plan, nested, &new_key, depth + 1, row)?;
                }
            }
            // Scalar fields the schema never declared are dropped
        }
        Ok(())
    }
}

/// Coerce a record value into its declared field kind.
///
/// Scalars convert where a faithful conversion exists; a non-scalar where a
/// scalar is expected (and vice versa) is an error.
fn coerce(stream: &str, field: &str, kind: FieldKind, value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let mismatch = |expected: &str| {
        Err(Error::flatten(
            stream,
            field,
            format!("expected {expected}, got {}", type_name(value)),
        ))
    };

    match kind {
        FieldKind::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => mismatch("boolean"),
        },
        FieldKind::Integer => match value {
            Value::Number(n) if n.as_i64().is_some() => Ok(value.clone()),
            _ => mismatch("integer"),
        },
        FieldKind::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            _ => mismatch("number"),
        },
        FieldKind::String => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => mismatch("string"),
        },
        FieldKind::Array => match value {
            Value::Array(_) => Ok(Value::String(serde_json::to_string(value)?)),
            _ => mismatch("array"),
        },
        FieldKind::Object => match value {
            Value::Object(_) => Ok(Value::String(serde_json::to_string(value)?)),
            _ => mismatch("object"),
        },
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
