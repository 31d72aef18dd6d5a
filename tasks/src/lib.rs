//! Task-directory conventions layered on the artifact store.
//!
//! A task lives at `ai/tasks/<TASK_ID>/` with three artifacts: `task.json`
//! (the schema-validated document), `checklist.md`, and `progress.ndjson`
//! (an append-only event log). `ai/tasks/order.json` fixes presentation
//! order and `ai/tasks/current_index.json` points at the active task.

mod active;
mod checklist;
mod layout;
mod progress;

pub use active::CURRENT_INDEX_PATH;
pub use active::CurrentIndex;
pub use active::resolve_active_task_id;
pub use active::set_active_task;
pub use checklist::checklist_complete;
pub use checklist::set_checklist_item;
pub use layout::TASKS_DIR;
pub use layout::TEMPLATES_DIR;
pub use layout::TaskDetail;
pub use layout::TaskSummary;
pub use layout::create_task_from_template;
pub use layout::get_task_detail;
pub use layout::list_tasks;
pub use layout::next_task_id;
pub use layout::reorder_tasks;
pub use layout::sync_task_order;
pub use layout::task_dir;
pub use progress::ProgressEvent;
pub use progress::append_progress_entry;
pub use progress::parse_ndjson;
