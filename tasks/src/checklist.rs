use taskforge_store::ArtifactStore;
use taskforge_store::StoreError;
use taskforge_store::WriteOptions;

use crate::layout::synthetic_io_error;
use crate::layout::task_dir;

/// Whether every checklist line is checked. Checklist lines are the ones
/// whose trimmed form starts with `- [`; a document without any is not
/// complete, it just has no checklist.
pub fn checklist_complete(text: &str) -> bool {
    let mut saw_item = false;
    for line in text.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("- [") {
            saw_item = true;
            if !rest.starts_with(['x', 'X']) {
                return false;
            }
        }
    }
    saw_item
}

/// Set one checklist line's checkbox in `ai/tasks/<id>/checklist.md`.
///
/// `line` is the zero-based index into the raw file. Pointing it at a
/// non-checkbox line or past the end of the file is an error; indentation
/// and the label text are preserved either way.
pub fn set_checklist_item(
    store: &ArtifactStore,
    task_id: &str,
    line: usize,
    checked: bool,
) -> Result<(), StoreError> {
    let path = format!("{}/checklist.md", task_dir(task_id));
    let content = store.read_text(&path)?;
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    let Some(target) = lines.get_mut(line) else {
        return Err(synthetic_io_error(
            store,
            &path,
            format!("checklist line {line} is out of range"),
        ));
    };
    let trimmed = target.trim_start();
    if !trimmed.starts_with("- [") {
        return Err(synthetic_io_error(
            store,
            &path,
            format!("line {line} is not a checklist item"),
        ));
    }

    let indent_len = target.len() - trimmed.len();
    // "- [x]" and "- [ ]" are both five bytes, so the label starts there.
    let label = trimmed.get(5..).unwrap_or("").to_string();
    let indent = target[..indent_len].to_string();
    let marker = if checked { "- [x]" } else { "- [ ]" };
    *target = format!("{indent}{marker}{label}");

    let mut updated = lines.join("\n");
    if content.ends_with('\n') {
        updated.push('\n');
    }
    store.write_text(&path, &updated, &WriteOptions::default())
}
