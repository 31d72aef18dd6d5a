use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use taskforge_store::ArtifactStore;
use taskforge_store::JsonWriteOptions;
use taskforge_store::StoreError;

use crate::layout::task_dir;

pub const CURRENT_INDEX_PATH: &str = "ai/tasks/current_index.json";
const CURRENT_INDEX_SCHEMA: &str = "schemas/current_index.json";

/// The active-task pointer document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// The active task id, or `None` when the pointer is missing, unreadable,
/// or empty. Lookup failures are deliberately not errors: callers use this
/// as a default, never as a source of truth.
pub fn resolve_active_task_id(store: &ArtifactStore) -> Option<String> {
    let index: CurrentIndex = store.read_json(CURRENT_INDEX_PATH).ok()?;
    index.active_task_id.filter(|id| !id.is_empty())
}

/// Point the tree at `task_id`, stamping the update time. The pointer is
/// schema-gated like any other artifact write.
pub fn set_active_task(store: &ArtifactStore, task_id: &str) -> Result<(), StoreError> {
    let index = CurrentIndex {
        active_task_id: Some(task_id.to_string()),
        task_path: Some(format!("{}/task.json", task_dir(task_id))),
        status: Some("in_progress".to_string()),
        last_updated: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    };
    store.write_json(
        CURRENT_INDEX_PATH,
        &index,
        &JsonWriteOptions {
            schema: Some(CURRENT_INDEX_SCHEMA.to_string()),
            pretty: true,
        },
    )
}
