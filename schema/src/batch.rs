use std::path::Path;

use once_cell::sync::OnceCell;
use regex_lite::Regex;
use serde_json::Value;
use taskforge_store::ArtifactStore;
use taskforge_store::StoreError;
use taskforge_store::StoreMode;

use crate::catalog::SchemaCatalog;

/// Directory names skipped during discovery, wherever they appear.
const IGNORED_DIRS: &[&str] = &[".git", "target", "node_modules", ".venv"];

/// Marker expected on the first non-blank line of summary-bearing Markdown.
pub const MACHINE_SUMMARY_MARKER: &str = "<!-- Machine Summary Block -->";

const TASK_SCHEMA: &str = "schemas/task.json";
const CURRENT_INDEX_SCHEMA: &str = "schemas/current_index.json";
const PROGRESS_EVENT_SCHEMA: &str = "schemas/progress_event.json";
const PROMPT_TEMPLATE_SCHEMA: &str = "schemas/prompt_template.json";
const PROMPT_BLUEPRINT_SCHEMA: &str = "schemas/prompt_blueprint.json";
const MACHINE_SUMMARY_SCHEMA: &str = "schemas/machine_summary.json";

const CURRENT_INDEX_PATH: &str = "ai/tasks/current_index.json";
const PROMPT_TEMPLATE_PATH: &str = "ai/templates/prompt_template.json";
const BLUEPRINT_DIR: &str = "ai/templates/prompt_blueprints";

/// Matches real task documents; the scaffolding copies under
/// `ai/tasks/templates/` still hold `{{TASK_ID}}` sites and are exempt.
fn task_json_pattern() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"^ai/tasks/TASK_[A-Za-z0-9_-]+/task\.json$").expect("valid task path regex")
    })
}

/// Verdict for one checked file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: String,
    pub violations: Vec<String>,
}

/// Outcome of a whole-tree sweep.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub reports: Vec<FileReport>,
}

impl BatchOutcome {
    /// Files checked, passing or not.
    pub fn checked(&self) -> usize {
        self.reports.len()
    }

    /// Files with at least one violation.
    pub fn failures(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| !report.violations.is_empty())
            .count()
    }

    /// Total violations across all files.
    pub fn violation_count(&self) -> usize {
        self.reports.iter().map(|report| report.violations.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.violation_count() == 0
    }
}

/// Sweep the tree at `root` and validate every artifact with a known role:
/// task documents, progress logs, the active-task pointer, the persisted
/// prompt, blueprint documents, and the machine-summary blocks of Markdown
/// under `docs/` and `ai/`. Reading goes through a read-only store; the
/// sweep never writes.
pub fn validate_tree(root: impl AsRef<Path>) -> Result<BatchOutcome, StoreError> {
    let root = root.as_ref();
    let store = ArtifactStore::new(root)?.with_mode(StoreMode::ReadOnly);
    let catalog = SchemaCatalog::new(root)?;
    let mut outcome = BatchOutcome::default();

    for path in list_if_present(&store, "ai/tasks")? {
        if task_json_pattern().is_match(&path) {
            outcome
                .reports
                .push(check_json(&store, &catalog, &path, TASK_SCHEMA));
        } else if path.ends_with("/progress.ndjson") {
            outcome
                .reports
                .push(check_ndjson(&store, &catalog, &path, PROGRESS_EVENT_SCHEMA));
        }
    }

    if exists(&store, CURRENT_INDEX_PATH) {
        outcome.reports.push(check_json(
            &store,
            &catalog,
            CURRENT_INDEX_PATH,
            CURRENT_INDEX_SCHEMA,
        ));
    }

    if exists(&store, PROMPT_TEMPLATE_PATH) {
        outcome.reports.push(check_json(
            &store,
            &catalog,
            PROMPT_TEMPLATE_PATH,
            PROMPT_TEMPLATE_SCHEMA,
        ));
    }

    for path in list_if_present(&store, BLUEPRINT_DIR)? {
        if path.ends_with(".json") {
            outcome
                .reports
                .push(check_json(&store, &catalog, &path, PROMPT_BLUEPRINT_SCHEMA));
        }
    }

    for dir in ["docs", "ai"] {
        for path in list_if_present(&store, dir)? {
            if path.ends_with(".md") {
                outcome
                    .reports
                    .push(check_machine_summary(&store, &catalog, &path));
            }
        }
    }

    tracing::debug!(
        checked = outcome.checked(),
        failures = outcome.failures(),
        "schema sweep finished"
    );
    Ok(outcome)
}

fn exists(store: &ArtifactStore, relative: &str) -> bool {
    store
        .resolve(relative)
        .is_ok_and(|absolute| absolute.exists())
}

fn list_if_present(store: &ArtifactStore, dir: &str) -> Result<Vec<String>, StoreError> {
    if !exists(store, dir) {
        return Ok(Vec::new());
    }
    let files = store.list(dir)?;
    Ok(files
        .into_iter()
        .filter(|path| !path.split('/').any(|segment| IGNORED_DIRS.contains(&segment)))
        .collect())
}

fn check_json(
    store: &ArtifactStore,
    catalog: &SchemaCatalog,
    path: &str,
    schema_ref: &str,
) -> FileReport {
    let violations = match store.read_json::<Value>(path) {
        Ok(value) => match catalog.check(schema_ref, &value) {
            Ok(violations) => violations,
            Err(err) => vec![format!("schema {schema_ref} could not be loaded: {err}")],
        },
        Err(err) => vec![format!("unreadable JSON document: {err}")],
    };
    FileReport {
        path: path.to_string(),
        violations,
    }
}

/// Progress logs are validated line by line; blank lines are skipped and
/// line numbers are 1-based in every message.
fn check_ndjson(
    store: &ArtifactStore,
    catalog: &SchemaCatalog,
    path: &str,
    schema_ref: &str,
) -> FileReport {
    let mut violations = Vec::new();
    match store.read_text(path) {
        Ok(content) => {
            for (index, line) in content.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let number = index + 1;
                match serde_json::from_str::<Value>(line) {
                    Ok(value) => match catalog.check(schema_ref, &value) {
                        Ok(errs) => violations
                            .extend(errs.into_iter().map(|err| format!("Line {number} {err}"))),
                        Err(err) => violations
                            .push(format!("schema {schema_ref} could not be loaded: {err}")),
                    },
                    Err(err) => violations.push(format!("Line {number}: {err}")),
                }
            }
        }
        Err(err) => violations.push(format!("unreadable event log: {err}")),
    }
    FileReport {
        path: path.to_string(),
        violations,
    }
}

fn check_machine_summary(
    store: &ArtifactStore,
    catalog: &SchemaCatalog,
    path: &str,
) -> FileReport {
    let violations = match store.read_text(path) {
        Ok(content) => machine_summary_violations(catalog, &content),
        Err(err) => vec![format!("unreadable document: {err}")],
    };
    FileReport {
        path: path.to_string(),
        violations,
    }
}

/// A machine summary is the marker comment on the first non-blank line,
/// followed (blank lines aside) by one JSON line that satisfies the
/// machine-summary schema. Markdown without it is not machine-checkable and
/// fails the sweep.
fn machine_summary_violations(catalog: &SchemaCatalog, content: &str) -> Vec<String> {
    let mut lines = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());
    match lines.next() {
        Some(first) if first == MACHINE_SUMMARY_MARKER => {}
        _ => {
            return vec![
                "Missing Machine Summary Block marker on the first non-blank line".to_string(),
            ];
        }
    }
    let Some(json_line) = lines.next() else {
        return vec!["Machine Summary JSON missing after the marker".to_string()];
    };
    match serde_json::from_str::<Value>(json_line) {
        Ok(value) => match catalog.check(MACHINE_SUMMARY_SCHEMA, &value) {
            Ok(violations) => violations,
            Err(err) => vec![format!(
                "schema {MACHINE_SUMMARY_SCHEMA} could not be loaded: {err}"
            )],
        },
        Err(err) => vec![format!("Invalid JSON in Machine Summary Block: {err}")],
    }
}
