//! Schema flattening
//!
//! Converts a nested Singer JSON schema into an ordered flat field list,
//! joining nested property names with the configured separator.

use super::types::{FieldKind, FlatField};
use crate::error::{Error, Result};
use crate::flatten::normalize_name;
use serde_json::{Map, Value};

/// Max level of nesting to flatten. Objects nested deeper are kept whole
/// and serialized to JSON text.
pub const MAX_FLATTEN_DEPTH: usize = 20;

/// Flatten a Singer schema's `properties` into an ordered field list.
///
/// Nested `object` properties are walked recursively; every other property
/// becomes one flat field named by joining the path with `separator`. With
/// `normalize` set, names are lowercased and non-alphanumeric runs collapse
/// to a single underscore.
pub fn flatten_schema(
    stream: &str,
    schema: &Value,
    separator: &str,
    normalize: bool,
) -> Result<Vec<FlatField>> {
    let mut fields = Vec::new();
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        walk(stream, properties, "", separator, normalize, 0, &mut fields)?;
    }

    // Normalization can merge names that differed only in case/punctuation
    let mut seen = std::collections::HashSet::new();
    for field in &fields {
        if !seen.insert(field.name.as_str()) {
            return Err(Error::schema(
                stream,
                format!("duplicate flattened field name '{}'", field.name),
            ));
        }
    }

    Ok(fields)
}

fn walk(
    stream: &str,
    properties: &Map<String, Value>,
    parent_key: &str,
    separator: &str,
    normalize: bool,
    depth: usize,
    out: &mut Vec<FlatField>,
) -> Result<()> {
    for (key, prop) in properties {
        let new_key = if parent_key.is_empty() {
            key.clone()
        } else {
            format!("{parent_key}{separator}{key}")
        };

        let types = declared_types(prop);
        let is_object = types.iter().any(|t| t.eq_ignore_ascii_case("object"));

        if is_object && depth < MAX_FLATTEN_DEPTH {
            if let Some(nested) = prop.get("properties").and_then(Value::as_object) {
                walk(stream, nested, &new_key, separator, normalize, depth + 1, out)?;
                continue;
            }
            // object without properties: nothing to flatten, kept as text
        }

        let name = if normalize {
            normalize_name(&new_key)
        } else {
            new_key
        };
        let (kind, nullable) = FieldKind::from_singer_types(stream, &name, &types)?;
        out.push(FlatField {
            name,
            kind,
            nullable,
        });
    }
    Ok(())
}

/// Extract the `type` declaration, which may be a string or a list
fn declared_types(prop: &Value) -> Vec<String> {
    match prop.get("type") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
