use std::collections::BTreeSet;

use once_cell::sync::OnceCell;
use regex_lite::Regex;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use taskforge_store::ArtifactStore;
use taskforge_store::JsonWriteOptions;
use taskforge_store::OpContext;
use taskforge_store::StoreError;
use taskforge_store::WriteOptions;

use crate::checklist::checklist_complete;
use crate::progress::parse_ndjson;

pub const TASKS_DIR: &str = "ai/tasks";
pub const TEMPLATES_DIR: &str = "ai/tasks/templates";
const ORDER_PATH: &str = "ai/tasks/order.json";
const TASK_SCHEMA: &str = "schemas/task.json";

fn task_id_pattern() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"^TASK_[A-Za-z0-9_-]+$").expect("valid task id regex"))
}

fn task_number_pattern() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"^TASK_(\d+)$").expect("valid task number regex"))
}

/// `ai/tasks/<id>`, the base of every per-task artifact path.
pub fn task_dir(task_id: &str) -> String {
    format!("{TASKS_DIR}/{task_id}")
}

/// One row of the task listing.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub task_id: String,
    pub title: Option<String>,
    pub status: Option<String>,
    pub checklist_complete: bool,
}

/// Full view of one task: document, raw checklist text, parsed progress log.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    pub task: Value,
    pub checklist: Option<String>,
    pub progress: Vec<Value>,
}

/// Every task document in presentation order: ids listed in `order.json`
/// first (stale entries dropped), then discovered-but-unlisted ids in
/// sorted order. Read-only; the ordering file is never rewritten here.
pub fn list_tasks(store: &ArtifactStore) -> Result<Vec<TaskSummary>, StoreError> {
    let discovered = discover_task_ids(store)?;
    let order = effective_order(&load_order(store), &discovered);
    let mut summaries = Vec::with_capacity(order.len());
    for task_id in &order {
        summaries.push(load_summary(store, task_id)?);
    }
    Ok(summaries)
}

/// Rewrite `order.json` to match the discovered task set: stale ids drop,
/// new ids append. Returns the persisted order.
pub fn sync_task_order(store: &ArtifactStore) -> Result<Vec<String>, StoreError> {
    let discovered = discover_task_ids(store)?;
    let ordered = effective_order(&load_order(store), &discovered);
    store.write_json(ORDER_PATH, &ordered, &JsonWriteOptions::default())?;
    Ok(ordered)
}

/// Replace the presentation order. `ids` must be a permutation of the
/// discovered task set; duplicates, unknown ids, and omissions are
/// validation failures and nothing is written.
pub fn reorder_tasks(store: &ArtifactStore, ids: &[String]) -> Result<(), StoreError> {
    let discovered = discover_task_ids(store)?;
    let mut violations = Vec::new();
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            violations.push(format!("duplicate task id \"{id}\""));
        }
        if !discovered.iter().any(|known| known == id) {
            violations.push(format!("unknown task id \"{id}\""));
        }
    }
    for id in &discovered {
        if !ids.iter().any(|given| given == id) {
            violations.push(format!("missing task id \"{id}\""));
        }
    }
    if !violations.is_empty() {
        return Err(validation_error(store, ORDER_PATH, violations));
    }
    store.write_json(ORDER_PATH, &ids, &JsonWriteOptions::default())
}

/// Everything known about one task. The document must exist; the checklist
/// and progress log are optional and default to empty.
pub fn get_task_detail(store: &ArtifactStore, task_id: &str) -> Result<TaskDetail, StoreError> {
    let dir = task_dir(task_id);
    let task: Value = store.read_json(&format!("{dir}/task.json"))?;
    let checklist = store.read_text(&format!("{dir}/checklist.md")).ok();
    let progress = store
        .read_text(&format!("{dir}/progress.ndjson"))
        .map(|content| parse_ndjson(&content))
        .unwrap_or_default();
    Ok(TaskDetail {
        task,
        checklist,
        progress,
    })
}

/// Scaffold `ai/tasks/<id>/` from the template directory, substituting
/// `{{TASK_ID}}` in every file. `task.json` merges `overrides` on top of the
/// template and is validated against the task schema; the new id is appended
/// to the presentation order.
pub fn create_task_from_template(
    store: &ArtifactStore,
    task_id: &str,
    overrides: Option<&Map<String, Value>>,
) -> Result<(), StoreError> {
    if !task_id_pattern().is_match(task_id) {
        return Err(validation_error(
            store,
            &task_dir(task_id),
            vec![format!(
                "task id \"{task_id}\" does not match ^TASK_[A-Za-z0-9_-]+$"
            )],
        ));
    }
    let dir = task_dir(task_id);
    if store.resolve(&format!("{dir}/task.json"))?.exists() {
        return Err(validation_error(
            store,
            &dir,
            vec![format!("task \"{task_id}\" already exists")],
        ));
    }

    let template_prefix = format!("{TEMPLATES_DIR}/");
    for path in store.list(TEMPLATES_DIR)? {
        let Some(name) = path.strip_prefix(&template_prefix) else {
            continue;
        };
        let content = store.read_text(&path)?.replace("{{TASK_ID}}", task_id);
        let destination = format!("{dir}/{name}");
        if name == "task.json" {
            let mut document: Value = serde_json::from_str(&content)?;
            if let (Value::Object(map), Some(overrides)) = (&mut document, overrides) {
                for (key, value) in overrides {
                    map.insert(key.clone(), value.clone());
                }
            }
            store.write_json(
                &destination,
                &document,
                &JsonWriteOptions {
                    schema: Some(TASK_SCHEMA.to_string()),
                    pretty: true,
                },
            )?;
        } else {
            store.write_text(&destination, &content, &WriteOptions::default())?;
        }
    }

    append_to_order(store, task_id)?;
    tracing::info!(task_id, "created task from template");
    Ok(())
}

/// Next sequential id: the highest numeric `TASK_<n>` suffix plus one,
/// zero-padded to three digits. Non-numeric ids are ignored.
pub fn next_task_id(store: &ArtifactStore) -> Result<String, StoreError> {
    let mut highest = 0u32;
    for id in discover_task_ids(store)? {
        if let Some(caps) = task_number_pattern().captures(&id)
            && let Some(number) = caps.get(1)
            && let Ok(number) = number.as_str().parse::<u32>()
        {
            highest = highest.max(number);
        }
    }
    Ok(format!("TASK_{:03}", highest + 1))
}

// ─── Internals ───────────────────────────────────────────────────────────

/// Task ids found on disk, sorted. A task exists iff its `task.json` does;
/// the template directory never matches the id pattern.
fn discover_task_ids(store: &ArtifactStore) -> Result<Vec<String>, StoreError> {
    if !store.resolve(TASKS_DIR)?.exists() {
        return Ok(Vec::new());
    }
    let mut ids = BTreeSet::new();
    for path in store.list(TASKS_DIR)? {
        let Some(rest) = path.strip_prefix(TASKS_DIR) else {
            continue;
        };
        let Some(rest) = rest.strip_prefix('/') else {
            continue;
        };
        if let Some((id, tail)) = rest.split_once('/')
            && tail == "task.json"
            && task_id_pattern().is_match(id)
        {
            ids.insert(id.to_string());
        }
    }
    Ok(ids.into_iter().collect())
}

/// The persisted order, or empty when the file is missing or unreadable.
fn load_order(store: &ArtifactStore) -> Vec<String> {
    store.read_json::<Vec<String>>(ORDER_PATH).unwrap_or_default()
}

fn effective_order(listed: &[String], discovered: &[String]) -> Vec<String> {
    let mut ordered = Vec::with_capacity(discovered.len());
    for id in listed {
        if discovered.iter().any(|known| known == id) && !ordered.contains(id) {
            ordered.push(id.clone());
        }
    }
    for id in discovered {
        if !ordered.contains(id) {
            ordered.push(id.clone());
        }
    }
    ordered
}

fn load_summary(store: &ArtifactStore, task_id: &str) -> Result<TaskSummary, StoreError> {
    let dir = task_dir(task_id);
    let task: Value = store.read_json(&format!("{dir}/task.json"))?;
    let checklist = store.read_text(&format!("{dir}/checklist.md")).ok();
    Ok(TaskSummary {
        task_id: task_id.to_string(),
        title: string_field(&task, "title"),
        status: string_field(&task, "status"),
        checklist_complete: checklist.as_deref().is_some_and(checklist_complete),
    })
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn append_to_order(store: &ArtifactStore, task_id: &str) -> Result<(), StoreError> {
    let mut order = load_order(store);
    if !order.iter().any(|id| id == task_id) {
        order.push(task_id.to_string());
        store.write_json(ORDER_PATH, &order, &JsonWriteOptions::default())?;
    }
    Ok(())
}

pub(crate) fn validation_error(
    store: &ArtifactStore,
    path: &str,
    violations: Vec<String>,
) -> StoreError {
    StoreError::ValidationFailed {
        context: op_context(store, path),
        violations,
    }
}

pub(crate) fn synthetic_io_error(
    store: &ArtifactStore,
    path: &str,
    message: String,
) -> StoreError {
    StoreError::Io {
        action: "update",
        context: op_context(store, path),
        source: std::io::Error::other(message),
    }
}

fn op_context(store: &ArtifactStore, path: &str) -> OpContext {
    let absolute = store
        .resolve(path)
        .unwrap_or_else(|_| store.root().join(path));
    OpContext {
        relative_path: path.to_string(),
        absolute_path: absolute,
        mode: store.mode(),
    }
}
