//! Flat rows to Arrow RecordBatch conversion

use crate::error::{Error, Result};
use crate::flatten::FlatRow;
use crate::schema::StreamPlan;
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde_json::Value;
use std::sync::Arc;

/// Build a RecordBatch from rows of a stream plan, projecting only the
/// given column indices.
///
/// Partition columns are materialized in the output path rather than the
/// file, so the writer passes the non-partition indices here.
pub fn build_record_batch(
    plan: &StreamPlan,
    rows: &[&FlatRow],
    columns: &[usize],
) -> Result<RecordBatch> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|&i| {
            let field = &plan.fields[i];
            Field::new(&field.name, field.kind.arrow_type(), true)
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());
    for (slot, &column) in columns.iter().enumerate() {
        let values: Vec<&Value> = rows.iter().map(|row| &row[column]).collect();
        arrays.push(build_array(&values, schema.field(slot).data_type()));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
    RecordBatch::try_new_with_options(schema, arrays, &options)
        .map_err(|e| Error::write(&plan.stream, format!("Failed to create RecordBatch: {e}")))
}

/// Build an Arrow array from pre-coerced row values
fn build_array(values: &[&Value], data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.as_bool()).collect();
            Arc::new(arr)
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.as_i64()).collect();
            Arc::new(arr)
        }

        DataType::Float64 => {
            #[allow(clippy::cast_precision_loss)]
            let arr: Float64Array = values
                .iter()
                .map(|v| v.as_f64().or_else(|| v.as_i64().map(|i| i as f64)))
                .collect();
            Arc::new(arr)
        }

        // Utf8 and anything unexpected: string rendering
        _ => {
            let arr: StringArray = values
                .iter()
                .map(|v| match v {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect();
            Arc::new(arr)
        }
    }
}
