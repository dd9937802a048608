//! Schema registry
//!
//! Tracks the active flattening plan per stream. Declaring a schema for a
//! stream that already has one replaces the plan; the engine flushes the
//! stream's pending batch before the replacement takes effect so no batch
//! mixes two schema versions.

use super::flatten::flatten_schema;
use super::types::{FieldKind, FlatField, StreamPlan};
use crate::config::TargetConfig;
use crate::error::{Error, Result};
use crate::flatten::normalize_name;
use crate::protocol::SchemaMessage;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Active schema plan per stream
pub struct SchemaRegistry {
    plans: HashMap<String, Arc<StreamPlan>>,
    separator: String,
    normalize: bool,
    partition_cols: Vec<String>,
    extra_fields: Vec<(String, FieldKind, Value)>,
}

impl SchemaRegistry {
    /// Build a registry from the target configuration.
    ///
    /// Extra static fields are parsed and coerced here, once, so every
    /// later `declare` can append them cheaply.
    pub fn from_config(config: &TargetConfig) -> Result<Self> {
        let values = config.parsed_extra_fields()?;
        let types: HashMap<String, String> =
            config.parsed_extra_field_types()?.into_iter().collect();

        let mut extra_fields = Vec::with_capacity(values.len());
        for (name, raw) in values {
            let declared = types
                .get(&name)
                .ok_or_else(|| Error::config(format!("no type declared for extra field '{name}'")))?;
            let (kind, _) =
                FieldKind::from_singer_types("<extra_fields>", &name, &[declared.clone()])?;
            let value = coerce_extra_value(&name, kind, &raw)?;
            let name = if config.force_header_snake_case {
                normalize_name(&name)
            } else {
                name
            };
            extra_fields.push((name, kind, value));
        }

        Ok(Self {
            plans: HashMap::new(),
            separator: config.flatten_separator.clone(),
            normalize: config.force_header_snake_case,
            partition_cols: config.parsed_partition_cols(),
            extra_fields,
        })
    }

    /// Register or replace the active schema for a stream.
    ///
    /// Returns the new plan. Callers must flush any buffered rows for the
    /// stream before declaring a replacement.
    pub fn declare(&mut self, message: &SchemaMessage) -> Result<Arc<StreamPlan>> {
        let stream = &message.stream;
        let mut fields =
            flatten_schema(stream, &message.schema, &self.separator, self.normalize)?;

        let mut extra_values = Vec::with_capacity(self.extra_fields.len());
        for (name, kind, value) in &self.extra_fields {
            if fields.iter().any(|f| &f.name == name) {
                return Err(Error::schema(
                    stream,
                    format!("extra field '{name}' collides with a schema field"),
                ));
            }
            extra_values.push((fields.len(), value.clone()));
            fields.push(FlatField {
                name: name.clone(),
                kind: *kind,
                nullable: false,
            });
        }

        for col in &self.partition_cols {
            if !fields.iter().any(|f| &f.name == col) {
                return Err(Error::schema(
                    stream,
                    format!("partition column '{col}' is not in the flattened schema"),
                ));
            }
        }

        let replaced = self.plans.contains_key(stream);
        let plan = Arc::new(StreamPlan::new(
            stream.clone(),
            fields,
            extra_values,
            message.key_properties.clone(),
            message.bookmark_properties.clone(),
        ));

        if replaced {
            info!("Replacing schema for stream '{stream}' ({} fields)", plan.len());
        } else {
            debug!("Declared schema for stream '{stream}' ({} fields)", plan.len());
        }
        self.plans.insert(stream.clone(), Arc::clone(&plan));
        Ok(plan)
    }

    /// The active plan for a stream, or `UnknownStream` if none was declared
    pub fn current(&self, stream: &str) -> Result<&Arc<StreamPlan>> {
        self.plans
            .get(stream)
            .ok_or_else(|| Error::unknown_stream(stream))
    }

    /// Whether a schema has been declared for the stream
    pub fn contains(&self, stream: &str) -> bool {
        self.plans.contains_key(stream)
    }

    /// Names of all declared streams
    pub fn streams(&self) -> impl Iterator<Item = &str> {
        self.plans.keys().map(String::as_str)
    }
}

/// Coerce a configured extra-field value (always a string in the config)
/// into its declared type
fn coerce_extra_value(name: &str, kind: FieldKind, raw: &str) -> Result<Value> {
    let parse_err = |expected: &str| {
        Error::InvalidConfigValue {
            field: "extra_fields".to_string(),
            message: format!("value '{raw}' for '{name}' is not a valid {expected}"),
        }
    };

    match kind {
        FieldKind::String => Ok(Value::String(raw.to_string())),
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| parse_err("integer")),
        FieldKind::Number => raw
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| parse_err("number")),
        FieldKind::Boolean => raw
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| parse_err("boolean")),
        FieldKind::Array | FieldKind::Object => Err(Error::InvalidConfigValue {
            field: "extra_fields_types".to_string(),
            message: format!("extra field '{name}' must be a scalar type"),
        }),
    }
}
