use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use taskforge_git_snapshot::DiffSnapshot;
use taskforge_store::ArtifactStore;
use taskforge_store::StoreError;

use crate::layout::task_dir;

const PROGRESS_EVENT_SCHEMA: &str = "schemas/progress_event.json";

/// One entry in a task's append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// RFC3339 timestamp with millisecond precision.
    pub ts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub event: String,
    pub status: String,
    pub agent: String,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffSnapshot>,
}

impl ProgressEvent {
    /// A timestamped event with the optional fields left empty.
    pub fn now(event: &str, status: &str, agent: &str, details: &str) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            task_id: None,
            event: event.to_string(),
            status: status.to_string(),
            agent: agent.to_string(),
            details: details.to_string(),
            diff: None,
        }
    }
}

/// Append one event to `ai/tasks/<id>/progress.ndjson`. The event value is
/// schema-gated before the line lands.
pub fn append_progress_entry(
    store: &ArtifactStore,
    task_id: &str,
    event: &ProgressEvent,
) -> Result<(), StoreError> {
    let path = format!("{}/progress.ndjson", task_dir(task_id));
    store.append_ndjson(&path, event, Some(PROGRESS_EVENT_SCHEMA))
}

/// Parse NDJSON content leniently: blank lines are skipped and unparseable
/// lines surface as `{"raw": <line>}`, so one corrupt entry cannot hide the
/// rest of the log.
pub fn parse_ndjson(content: &str) -> Vec<Value> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).unwrap_or_else(|_| json!({ "raw": line })))
        .collect()
}
