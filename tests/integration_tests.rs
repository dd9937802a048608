//! Integration tests for the full target pipeline
//!
//! Tests the end-to-end flow: Singer messages → flattened batches →
//! partitioned Parquet files → destination → gated state output.

use arrow::array::{Array, Int64Array, StringArray};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Cursor;
use target_hdfs::{Destination, RunStats, TargetConfig, TargetEngine};

// ============================================================================
// Helpers
// ============================================================================

fn config(extra: &str) -> TargetConfig {
    TargetConfig::from_json(&format!(
        r#"{{"hdfs_destination_path": "/ignored"{extra}}}"#
    ))
    .unwrap()
}

async fn run_target(extra: &str, lines: &[String]) -> (RunStats, String, Destination) {
    let destination = Destination::in_memory();
    let mut state_out = Vec::new();
    let stats = {
        let mut engine =
            TargetEngine::new(config(extra), destination.clone(), &mut state_out).unwrap();
        engine
            .run(Cursor::new(lines.join("\n")))
            .await
            .unwrap()
    };
    (stats, String::from_utf8(state_out).unwrap(), destination)
}

fn schema_line(stream: &str, properties: serde_json::Value) -> String {
    json!({"type": "SCHEMA", "stream": stream, "schema": {"properties": properties}}).to_string()
}

fn record_line(stream: &str, record: serde_json::Value) -> String {
    json!({"type": "RECORD", "stream": stream, "record": record}).to_string()
}

fn state_line(value: serde_json::Value) -> String {
    json!({"type": "STATE", "value": value}).to_string()
}

async fn read_batches(
    destination: &Destination,
    path: &str,
) -> Vec<arrow::record_batch::RecordBatch> {
    let data = destination.fetch(path).await.unwrap();
    ParquetRecordBatchReaderBuilder::try_new(data)
        .unwrap()
        .build()
        .unwrap()
        .map(|b| b.unwrap())
        .collect()
}

// ============================================================================
// End-to-End Scenarios
// ============================================================================

#[tokio::test]
async fn test_spec_scenario_three_records_one_state() {
    // 3 RECORD lines with max_batch_size=2, then 1 STATE line: one file
    // after the 2nd record, the 3rd buffered until end of input, the STATE
    // withheld until the final flush completes
    let lines = vec![
        schema_line("rates", json!({"id": {"type": ["integer"]}})),
        record_line("rates", json!({"id": 1})),
        record_line("rates", json!({"id": 2})),
        record_line("rates", json!({"id": 3})),
        state_line(json!({"bookmarks": {"rates": 3}})),
    ];

    let (stats, state_out, destination) = run_target(r#", "max_batch_size": 2"#, &lines).await;

    assert_eq!(stats.records_read, 3);
    assert_eq!(stats.files_written, 2);
    assert_eq!(stats.states_emitted, 1);
    assert_eq!(state_out, "{\"bookmarks\":{\"rates\":3}}\n");

    let paths = destination.list_paths().await.unwrap();
    assert_eq!(paths.len(), 2);

    let first = read_batches(&destination, &paths[0]).await;
    assert_eq!(first.iter().map(|b| b.num_rows()).sum::<usize>(), 2);
    let second = read_batches(&destination, &paths[1]).await;
    assert_eq!(second.iter().map(|b| b.num_rows()).sum::<usize>(), 1);
}

#[tokio::test]
async fn test_nested_records_flattened_into_columns() {
    let lines = vec![
        schema_line(
            "orders",
            json!({
                "id": {"type": ["integer"]},
                "customer": {"type": ["object"], "properties": {
                    "name": {"type": ["null", "string"]},
                    "address": {"type": ["object"], "properties": {
                        "city": {"type": ["null", "string"]}
                    }}
                }},
                "items": {"type": ["null", "array"]}
            }),
        ),
        record_line(
            "orders",
            json!({
                "id": 1,
                "customer": {"name": "Alice", "address": {"city": "Berlin"}},
                "items": [{"sku": "a"}, {"sku": "b"}]
            }),
        ),
    ];

    let (stats, _, destination) = run_target("", &lines).await;
    assert_eq!(stats.files_written, 1);

    let paths = destination.list_paths().await.unwrap();
    let batches = read_batches(&destination, &paths[0]).await;
    let schema = batches[0].schema();

    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(
        names,
        vec![
            "customer__address__city",
            "customer__name",
            "id",
            "items"
        ]
    );

    let cities = batches[0]
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(cities.value(0), "Berlin");

    // Arrays are kept whole, serialized as JSON text
    let items = batches[0]
        .column(3)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(items.value(0), "[{\"sku\":\"a\"},{\"sku\":\"b\"}]");
}

#[tokio::test]
async fn test_partitioned_output_layout() {
    let lines = vec![
        schema_line(
            "rates",
            json!({
                "id": {"type": ["integer"]},
                "country": {"type": ["string"]}
            }),
        ),
        record_line("rates", json!({"id": 1, "country": "de"})),
        record_line("rates", json!({"id": 2, "country": "fr"})),
        record_line("rates", json!({"id": 3, "country": "de"})),
    ];

    let (stats, _, destination) = run_target(
        r#", "partition_cols": "country", "streams_in_separate_folder": true"#,
        &lines,
    )
    .await;

    assert_eq!(stats.files_written, 2);
    let paths = destination.list_paths().await.unwrap();
    assert!(paths[0].starts_with("rates/country=de/"));
    assert!(paths[1].starts_with("rates/country=fr/"));

    // Partition values live in the path; files hold the remaining columns
    let batches = read_batches(&destination, &paths[0]).await;
    assert!(batches[0].schema().field_with_name("country").is_err());
    let ids = batches[0]
        .column_by_name("id")
        .unwrap()
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    let collected: Vec<i64> = ids.iter().flatten().collect();
    assert_eq!(collected, vec![1, 3]);
}

#[tokio::test]
async fn test_extra_fields_in_every_row() {
    let lines = vec![
        schema_line("users", json!({"id": {"type": ["integer"]}})),
        record_line("users", json!({"id": 1})),
        record_line("users", json!({"id": 2})),
    ];

    let (_, _, destination) = run_target(
        r#", "extra_fields": "env=prod", "extra_fields_types": "env=string""#,
        &lines,
    )
    .await;

    let paths = destination.list_paths().await.unwrap();
    let batches = read_batches(&destination, &paths[0]).await;
    let envs = batches[0]
        .column_by_name("env")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(envs.value(0), "prod");
    assert_eq!(envs.value(1), "prod");
}

#[tokio::test]
async fn test_snake_case_headers() {
    let lines = vec![
        schema_line("survey", json!({"Key 1 > #1": {"type": ["null", "string"]}})),
        record_line("survey", json!({"Key 1 > #1": "answer"})),
    ];

    let (_, _, destination) = run_target(r#", "force_header_snake_case": true"#, &lines).await;

    let paths = destination.list_paths().await.unwrap();
    let batches = read_batches(&destination, &paths[0]).await;
    assert_eq!(batches[0].schema().field(0).name(), "key_1_1");
}

#[tokio::test]
async fn test_unsupported_compression_does_not_abort() {
    let lines = vec![
        schema_line("rates", json!({"id": {"type": ["integer"]}})),
        record_line("rates", json!({"id": 1})),
    ];

    let (stats, _, destination) = run_target(r#", "compression_method": "lz4""#, &lines).await;

    assert_eq!(stats.files_written, 1);
    let paths = destination.list_paths().await.unwrap();
    assert!(paths[0].ends_with(".gz.parquet"));
}

#[tokio::test]
async fn test_state_interleaved_with_records() {
    // Every STATE is staged; only the latest is emitted, and only once the
    // buffered rows around it are flushed
    let lines = vec![
        schema_line("rates", json!({"id": {"type": ["integer"]}})),
        record_line("rates", json!({"id": 1})),
        state_line(json!({"n": 1})),
        record_line("rates", json!({"id": 2})),
        state_line(json!({"n": 2})),
    ];

    let (stats, state_out, _) = run_target("", &lines).await;

    assert_eq!(stats.states_emitted, 1);
    assert_eq!(state_out, "{\"n\":2}\n");
}

#[tokio::test]
async fn test_empty_input_is_clean() {
    let (stats, state_out, destination) = run_target("", &[]).await;

    assert_eq!(stats.records_read, 0);
    assert_eq!(stats.files_written, 0);
    assert!(state_out.is_empty());
    assert!(destination.list_paths().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_local_filesystem_destination() {
    let dir = tempfile::tempdir().unwrap();
    let destination = Destination::parse(dir.path().to_str().unwrap()).unwrap();
    let mut state_out = Vec::new();

    let lines = vec![
        schema_line("rates", json!({"id": {"type": ["integer"]}})),
        record_line("rates", json!({"id": 1})),
    ];
    let mut engine = TargetEngine::new(config(""), destination, &mut state_out).unwrap();
    let stats = engine
        .run(Cursor::new(lines.join("\n")))
        .await
        .unwrap();

    assert_eq!(stats.files_written, 1);
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("rates-"));
    assert!(entries[0].ends_with(".gz.parquet"));
}
