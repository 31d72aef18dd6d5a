//! End-to-end tests for the `taskforge` binary.
//!
//! Every test works in its own temporary workspace passed via `--root`, so
//! nothing touches the checkout the tests run from.

use std::path::Path;

use anyhow::Result;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn taskforge() -> Result<assert_cmd::Command> {
    Ok(assert_cmd::Command::cargo_bin("taskforge")?)
}

fn init_workspace(root: &Path) -> Result<()> {
    taskforge()?
        .args(["init", "--root"])
        .arg(root)
        .assert()
        .success();
    Ok(())
}

#[test]
fn init_seeds_a_workspace_that_validates() -> Result<()> {
    let root = TempDir::new()?;

    taskforge()?
        .args(["init", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("created schemas/task.json"))
        .stdout(predicate::str::contains("Seeded 11 file(s)"));

    taskforge()?
        .args(["validate", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("All schema checks passed"));
    Ok(())
}

#[test]
fn init_never_overwrites_existing_files() -> Result<()> {
    let root = TempDir::new()?;
    init_workspace(root.path())?;

    let schema_path = root.path().join("schemas").join("task.json");
    let before = std::fs::read_to_string(&schema_path)?;

    taskforge()?
        .args(["init", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("exists  schemas/task.json"))
        .stdout(predicate::str::contains("Seeded 0 file(s)"));

    assert_eq!(std::fs::read_to_string(&schema_path)?, before);
    Ok(())
}

#[test]
fn generate_dry_run_prints_the_prompt_and_persists_nothing() -> Result<()> {
    let root = TempDir::new()?;
    init_workspace(root.path())?;
    let seeded_prompt =
        std::fs::read_to_string(root.path().join("ai/templates/prompt_template.json"))?;

    let output = taskforge()?
        .args(["generate", "--root"])
        .arg(root.path())
        .args([
            "--blueprint",
            "task_creation",
            "--set",
            "task_id=TASK_100",
            "--set",
            "task_title=Demo",
            "--set",
            "acceptance=It works",
            "--dry-run",
        ])
        .output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let prompt: Value = serde_json::from_slice(&output.stdout)?;
    let body = prompt["body"].as_str().unwrap_or_default();
    assert!(body.contains("Task TASK_100: Demo"), "unexpected body: {body}");
    assert!(
        body.contains("Context: No additional context provided."),
        "default placeholder missing: {body}"
    );

    // The persisted prompt is untouched by a dry run.
    assert_eq!(
        std::fs::read_to_string(root.path().join("ai/templates/prompt_template.json"))?,
        seeded_prompt
    );
    Ok(())
}

#[test]
fn generate_without_a_required_placeholder_fails_by_name() -> Result<()> {
    let root = TempDir::new()?;
    init_workspace(root.path())?;

    let output = taskforge()?
        .args(["generate", "--root"])
        .arg(root.path())
        .args(["--blueprint", "task_creation", "--set", "task_id=TASK_100"])
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Missing required placeholder \"task_title\""),
        "unexpected stderr: {stderr}"
    );
    Ok(())
}

#[test]
fn generate_persists_the_prompt_and_logs_to_the_active_task() -> Result<()> {
    let root = TempDir::new()?;
    init_workspace(root.path())?;

    taskforge()?
        .args(["task", "new", "--root"])
        .arg(root.path())
        .args(["TASK_009", "--activate"])
        .assert()
        .success();

    let output = taskforge()?
        .args(["generate", "--root"])
        .arg(root.path())
        .args([
            "--blueprint",
            "task_creation",
            "--set",
            "task_id=TASK_009",
            "--set",
            "task_title=Wire the store",
            "--set",
            "acceptance=Round trips survive",
        ])
        .output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(
            "Generated prompt from blueprint task_creation -> ai/templates/prompt_template.json"
        ),
        "unexpected stdout: {stdout}"
    );

    let prompt: Value = serde_json::from_str(&std::fs::read_to_string(
        root.path().join("ai/templates/prompt_template.json"),
    )?)?;
    assert_eq!(prompt["id"], Value::String("TASK_009_prompt".to_string()));

    let log =
        std::fs::read_to_string(root.path().join("ai/tasks/TASK_009/progress.ndjson"))?;
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1, "unexpected log: {log}");
    let event: Value = serde_json::from_str(lines[0])?;
    assert_eq!(event["event"], Value::String("step_completed".to_string()));
    assert_eq!(event["task_id"], Value::String("TASK_009".to_string()));

    // Everything the run produced still passes the sweep.
    taskforge()?
        .args(["validate", "--root"])
        .arg(root.path())
        .assert()
        .success();
    Ok(())
}

#[test]
fn validate_reports_violations_and_exits_nonzero() -> Result<()> {
    let root = TempDir::new()?;
    init_workspace(root.path())?;

    let bad_dir = root.path().join("ai/tasks/TASK_BAD");
    std::fs::create_dir_all(&bad_dir)?;
    std::fs::write(
        bad_dir.join("task.json"),
        r#"{"task_id": "TASK_BAD", "status": "nonsense"}"#,
    )?;

    let output = taskforge()?
        .args(["validate", "--root"])
        .arg(root.path())
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("[FAIL] ai/tasks/TASK_BAD/task.json"),
        "unexpected stdout: {stdout}"
    );
    assert!(
        stdout.contains("Missing required property \"title\""),
        "unexpected stdout: {stdout}"
    );
    assert!(
        stdout.contains("Schema validation failed with"),
        "unexpected stdout: {stdout}"
    );
    Ok(())
}

#[test]
fn task_new_defaults_to_the_next_sequential_id() -> Result<()> {
    let root = TempDir::new()?;
    init_workspace(root.path())?;

    taskforge()?
        .args(["task", "new", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created TASK_001"));

    taskforge()?
        .args(["task", "new", "--root"])
        .arg(root.path())
        .args(["TASK_FEATURE", "--title", "Feature work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created TASK_FEATURE"));

    taskforge()?
        .args(["task", "new", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created TASK_002"));

    let output = taskforge()?
        .args(["task", "list", "--root"])
        .arg(root.path())
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[ ] TASK_001"), "unexpected stdout: {stdout}");
    assert!(
        stdout.contains("TASK_FEATURE  Feature work (todo)"),
        "unexpected stdout: {stdout}"
    );
    Ok(())
}

#[test]
fn task_check_toggles_a_checklist_line() -> Result<()> {
    let root = TempDir::new()?;
    init_workspace(root.path())?;

    taskforge()?
        .args(["task", "new", "--root"])
        .arg(root.path())
        .arg("TASK_001")
        .assert()
        .success();

    // Line 5 is the first checkbox in the seeded checklist template.
    taskforge()?
        .args(["task", "check", "--root"])
        .arg(root.path())
        .args(["TASK_001", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked line 5"));

    let checklist =
        std::fs::read_to_string(root.path().join("ai/tasks/TASK_001/checklist.md"))?;
    assert!(
        checklist.contains("- [x] Understand the task"),
        "unexpected checklist: {checklist}"
    );

    taskforge()?
        .args(["task", "check", "--root"])
        .arg(root.path())
        .args(["TASK_001", "5", "--undo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unchecked line 5"));

    let checklist =
        std::fs::read_to_string(root.path().join("ai/tasks/TASK_001/checklist.md"))?;
    assert!(
        checklist.contains("- [ ] Understand the task"),
        "unexpected checklist: {checklist}"
    );
    Ok(())
}

#[test]
fn task_show_renders_json_detail() -> Result<()> {
    let root = TempDir::new()?;
    init_workspace(root.path())?;

    taskforge()?
        .args(["task", "new", "--root"])
        .arg(root.path())
        .args(["TASK_001", "--title", "Show me"])
        .assert()
        .success();

    let output = taskforge()?
        .args(["task", "show", "--root"])
        .arg(root.path())
        .args(["TASK_001", "--json"])
        .output()?;
    assert!(output.status.success());
    let detail: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(detail["task"]["title"], Value::String("Show me".to_string()));
    assert!(detail["checklist"].as_str().is_some());
    assert_eq!(detail["progress"], serde_json::json!([]));
    Ok(())
}

#[test]
fn blueprints_lists_the_seeded_catalog() -> Result<()> {
    let root = TempDir::new()?;
    init_workspace(root.path())?;

    taskforge()?
        .args(["blueprints", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "task_creation  Implementation brief for one task",
        ));
    Ok(())
}

#[test]
fn diff_prints_a_snapshot_even_outside_a_repository() -> Result<()> {
    let root = TempDir::new()?;

    let output = taskforge()?
        .args(["diff", "--root"])
        .arg(root.path())
        .output()?;
    assert!(output.status.success());
    let snapshot: Value = serde_json::from_slice(&output.stdout)?;
    let summary = snapshot["summary"].as_str().unwrap_or_default();
    assert!(!summary.is_empty(), "summary must always be present");
    Ok(())
}
