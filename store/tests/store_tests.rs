#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use taskforge_store::AppendOptions;
use taskforge_store::ArtifactStore;
use taskforge_store::ErrorCode;
use taskforge_store::JsonWriteOptions;
use taskforge_store::StoreError;
use taskforge_store::StoreMode;
use taskforge_store::ValidationRejection;
use taskforge_store::ValidationRequest;
use taskforge_store::WriteOptions;
use taskforge_store::WritePayload;
use taskforge_store::WriteValidator;
use tempfile::TempDir;

fn make_store(dir: &TempDir) -> ArtifactStore {
    ArtifactStore::new(dir.path()).expect("create store")
}

/// Test hook that records every request and optionally rejects them all.
#[derive(Default)]
struct RecordingValidator {
    calls: Mutex<Vec<(String, String, Value)>>,
    reject: bool,
}

impl RecordingValidator {
    fn rejecting() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reject: true,
        }
    }
}

impl WriteValidator for RecordingValidator {
    fn validate(&self, request: &ValidationRequest<'_>) -> Result<(), ValidationRejection> {
        let payload = match request.payload {
            WritePayload::Text(text) => Value::String(text.to_string()),
            WritePayload::Json(value) => value.clone(),
        };
        self.calls
            .lock()
            .expect("lock validator calls")
            .push((request.schema.to_string(), request.path.to_string(), payload));
        if self.reject {
            Err(ValidationRejection::new(vec![
                "#: Missing required property \"id\"".to_string(),
            ]))
        } else {
            Ok(())
        }
    }
}

#[test]
fn write_then_read_round_trips_text() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir);

    store
        .write_text("notes/a.txt", "hello", &WriteOptions::default())
        .expect("write");
    let content = store.read_text("notes/a.txt").expect("read");
    assert_eq!(content, "hello");

    // The temp sibling used for atomicity must not survive the rename.
    let listed = store.list("notes").expect("list");
    assert_eq!(listed, vec!["notes/a.txt".to_string()]);
}

#[test]
fn write_json_round_trips_deep_equal() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir);
    let document = json!({
        "task_id": "TASK_001",
        "nested": { "n": 1, "list": [1, 2, 3] },
    });

    store
        .write_json("ai/tasks/TASK_001/task.json", &document, &JsonWriteOptions::default())
        .expect("write json");
    let back: Value = store.read_json("ai/tasks/TASK_001/task.json").expect("read json");
    assert_eq!(back, document);

    let raw = store.read_text("ai/tasks/TASK_001/task.json").expect("read raw");
    assert!(raw.ends_with('\n'), "persisted JSON should end with a newline");
    assert!(raw.contains("  \"task_id\""), "expected two-space indentation: {raw}");
}

#[test]
fn validator_sees_json_payloads_as_values() {
    let dir = TempDir::new().expect("tempdir");
    let validator = Arc::new(RecordingValidator::default());
    let store = make_store(&dir).with_validator(validator.clone());

    store
        .write_json(
            "doc.json",
            &json!({ "id": "X" }),
            &JsonWriteOptions {
                schema: Some("schemas/doc.json".to_string()),
                pretty: true,
            },
        )
        .expect("validated write");

    let calls = validator.calls.lock().expect("lock validator calls");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "schemas/doc.json");
    assert_eq!(calls[0].1, "doc.json");
    assert_eq!(calls[0].2, json!({ "id": "X" }));
}

#[test]
fn rejected_write_leaves_no_file_behind() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir).with_validator(Arc::new(RecordingValidator::rejecting()));

    let err = store
        .write_json(
            "doc.json",
            &json!({}),
            &JsonWriteOptions {
                schema: Some("schemas/doc.json".to_string()),
                pretty: true,
            },
        )
        .expect_err("write should be rejected");

    assert_eq!(err.code(), Some(ErrorCode::ValidationFailed));
    assert!(
        err.to_string().contains("Missing required property"),
        "unexpected message: {err}"
    );
    let resolved = store.resolve("doc.json").expect("resolve");
    assert!(!resolved.exists(), "rejected write must not create the file");
}

#[test]
fn read_only_mode_blocks_mutations_without_touching_disk() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir).with_mode(StoreMode::ReadOnly);
    assert_eq!(store.mode(), StoreMode::ReadOnly);

    let err = store
        .write_text("a.txt", "x", &WriteOptions::default())
        .expect_err("write must be gated");
    assert_eq!(err.code(), Some(ErrorCode::ReadOnly));
    let err = store
        .append_text("a.txt", "x", &AppendOptions::default())
        .expect_err("append must be gated");
    assert_eq!(err.code(), Some(ErrorCode::ReadOnly));
    let err = store
        .write_json("a.json", &json!({}), &JsonWriteOptions::default())
        .expect_err("json write must be gated");
    assert_eq!(err.code(), Some(ErrorCode::ReadOnly));

    let entries = std::fs::read_dir(dir.path()).expect("read_dir").count();
    assert_eq!(entries, 0, "read-only rejections must not touch the tree");

    // The gate is consulted per call, so flipping the mode back re-enables
    // writes on the same store value.
    store.set_mode(StoreMode::ReadWrite);
    store
        .write_text("a.txt", "x", &WriteOptions::default())
        .expect("write after promotion");
}

#[test]
fn escaping_paths_are_out_of_bounds() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir);

    for path in ["../evil.txt", "a/../../evil.txt", "/etc/passwd"] {
        let err = store.resolve(path).expect_err("path must be rejected");
        assert_eq!(err.code(), Some(ErrorCode::OutOfBounds), "path {path}");
    }

    // Dotted segments that stay inside the root are fine.
    let resolved = store.resolve("a/./b/../c.txt").expect("in-bounds path");
    assert!(resolved.starts_with(dir.path()));
    assert!(resolved.ends_with("a/c.txt"));
}

#[test]
fn out_of_bounds_wins_over_read_only() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir).with_mode(StoreMode::ReadOnly);

    let err = store
        .write_text("../evil.txt", "x", &WriteOptions::default())
        .expect_err("escaping write must be rejected");
    assert_eq!(err.code(), Some(ErrorCode::OutOfBounds));

    let context = err.context().expect("context");
    assert_eq!(context.relative_path, "../evil.txt");
    assert_eq!(context.mode, StoreMode::ReadOnly);
}

#[test]
fn ndjson_appends_one_line_per_entry_in_order() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir);

    for n in 1..=3 {
        store
            .append_ndjson("events.ndjson", &json!({ "n": n }), None)
            .expect("append");
    }

    let content = store.read_text("events.ndjson").expect("read");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    for (index, line) in lines.iter().enumerate() {
        let value: Value = serde_json::from_str(line).expect("line parses");
        assert_eq!(value, json!({ "n": index + 1 }));
    }
}

#[test]
fn append_text_honors_separator_and_creates_parents() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir);
    let options = AppendOptions {
        schema: None,
        separator: Some("\n".to_string()),
    };

    store.append_text("logs/run.log", "one", &options).expect("append");
    store.append_text("logs/run.log", "two", &options).expect("append");

    assert_eq!(store.read_text("logs/run.log").expect("read"), "one\ntwo\n");
}

#[test]
fn list_is_recursive_files_only_and_sorted() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir);
    store.write_text("a/b/c.txt", "1", &WriteOptions::default()).expect("write");
    store.write_text("a/d.txt", "2", &WriteOptions::default()).expect("write");
    store.write_text("top.txt", "3", &WriteOptions::default()).expect("write");

    let listed = store.list("").expect("list root");
    assert_eq!(
        listed,
        vec![
            "a/b/c.txt".to_string(),
            "a/d.txt".to_string(),
            "top.txt".to_string(),
        ]
    );
}

#[test]
fn missing_file_is_io_error_with_context() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir);

    let err = store.read_text("nope.txt").expect_err("missing file");
    assert_eq!(err.code(), Some(ErrorCode::IoError));
    let context = err.context().expect("context");
    assert_eq!(context.relative_path, "nope.txt");
    assert!(context.absolute_path.starts_with(dir.path()));
    assert_eq!(context.mode, StoreMode::ReadWrite);
}

#[test]
fn parse_errors_pass_through_without_a_code() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir);
    store
        .write_text("bad.json", "{not json", &WriteOptions::default())
        .expect("write");

    let err = store.read_json::<Value>("bad.json").expect_err("parse failure");
    assert!(matches!(err, StoreError::Parse(_)), "unexpected error: {err:?}");
    assert_eq!(err.code(), None);
}

#[test]
fn op_log_records_operations_as_ndjson() {
    let dir = TempDir::new().expect("tempdir");
    let log_path = dir.path().join("logs").join("ops.ndjson");
    let store = make_store(&dir).with_op_log(log_path.clone());

    store.write_text("a.txt", "x", &WriteOptions::default()).expect("write");
    store.read_text("a.txt").expect("read");

    let content = std::fs::read_to_string(&log_path).expect("read op log");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: Value = serde_json::from_str(lines[0]).expect("record parses");
    assert_eq!(first["message"], json!("write_text"));
    assert_eq!(first["level"], json!("info"));
    assert_eq!(first["details"]["mode"], json!("read_write"));
    assert!(first["ts"].as_str().is_some_and(|ts| !ts.is_empty()));

    let second: Value = serde_json::from_str(lines[1]).expect("record parses");
    assert_eq!(second["message"], json!("read_text"));
}

#[test]
fn op_log_failure_never_fails_the_operation() {
    let dir = TempDir::new().expect("tempdir");
    // Point the log's parent at a regular file so the sink cannot be created.
    std::fs::write(dir.path().join("blocker"), b"x").expect("write blocker");
    let log_path = dir.path().join("blocker").join("ops.ndjson");
    let store = make_store(&dir).with_op_log(log_path);

    store
        .write_text("a.txt", "x", &WriteOptions::default())
        .expect("write must succeed despite the broken op log");
}

#[test]
fn overwrite_replaces_whole_content() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir);
    store
        .write_text("doc.txt", "first version, quite long", &WriteOptions::default())
        .expect("write");
    store
        .write_text("doc.txt", "second", &WriteOptions::default())
        .expect("overwrite");
    assert_eq!(store.read_text("doc.txt").expect("read"), "second");
}

#[test]
fn schema_without_validator_warns_and_proceeds() {
    let dir = TempDir::new().expect("tempdir");
    let store = make_store(&dir);
    store
        .write_text(
            "doc.txt",
            "content",
            &WriteOptions {
                schema: Some("schemas/doc.json".to_string()),
            },
        )
        .expect("write proceeds without a hook installed");
    assert_eq!(store.read_text("doc.txt").expect("read"), "content");
}
