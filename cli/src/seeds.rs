//! Stock documents written by `taskforge init`: the schema catalog, the task
//! template directory, and a starter blueprint. Every other command assumes
//! these exist.

use serde_json::Value;
use serde_json::json;

/// A JSON document seeded into a fresh workspace.
pub(crate) struct JsonSeed {
    pub path: &'static str,
    pub document: Value,
}

/// A text file seeded into a fresh workspace.
pub(crate) struct TextSeed {
    pub path: &'static str,
    pub content: &'static str,
}

pub(crate) fn json_seeds() -> Vec<JsonSeed> {
    vec![
        JsonSeed {
            path: "schemas/task.json",
            document: task_schema(),
        },
        JsonSeed {
            path: "schemas/current_index.json",
            document: current_index_schema(),
        },
        JsonSeed {
            path: "schemas/progress_event.json",
            document: progress_event_schema(),
        },
        JsonSeed {
            path: "schemas/prompt_template.json",
            document: prompt_template_schema(),
        },
        JsonSeed {
            path: "schemas/prompt_blueprint.json",
            document: prompt_blueprint_schema(),
        },
        JsonSeed {
            path: "schemas/machine_summary.json",
            document: machine_summary_schema(),
        },
        JsonSeed {
            path: "ai/templates/prompt_blueprints/task_creation.json",
            document: task_creation_blueprint(),
        },
        JsonSeed {
            path: "ai/templates/prompt_template.json",
            document: seed_prompt(),
        },
        JsonSeed {
            path: "ai/tasks/templates/task.json",
            document: task_template(),
        },
    ]
}

pub(crate) fn text_seeds() -> Vec<TextSeed> {
    vec![
        TextSeed {
            path: "ai/tasks/templates/checklist.md",
            content: CHECKLIST_TEMPLATE,
        },
        TextSeed {
            path: "ai/tasks/templates/progress.ndjson",
            content: "",
        },
    ]
}

// ─── Schema documents ──────────────────────────────────────────────────────

fn task_schema() -> Value {
    json!({
        "type": "object",
        "required": ["task_id", "title", "status"],
        "properties": {
            "task_id": { "type": "string", "pattern": "^TASK_[A-Za-z0-9_-]+$" },
            "title": { "type": "string", "minLength": 1 },
            "status": {
                "type": "string",
                "enum": ["todo", "in_progress", "blocked", "done"],
            },
            "description": { "type": "string" },
            "acceptance": { "type": "array", "items": { "type": "string" } },
        },
    })
}

fn current_index_schema() -> Value {
    json!({
        "type": "object",
        "required": ["active_task_id"],
        "properties": {
            "active_task_id": { "type": "string", "pattern": "^TASK_[A-Za-z0-9_-]+$" },
            "task_path": { "type": "string" },
            "status": { "type": "string" },
            "last_updated": { "type": "string" },
        },
    })
}

fn progress_event_schema() -> Value {
    json!({
        "type": "object",
        "required": ["ts", "event", "status", "agent", "details"],
        "additionalProperties": false,
        "properties": {
            "ts": { "type": "string", "minLength": 1 },
            "task_id": { "type": "string", "pattern": "^TASK_[A-Za-z0-9_-]+$" },
            "event": { "type": "string", "minLength": 1 },
            "status": { "type": "string", "enum": ["success", "failure", "info"] },
            "agent": { "type": "string", "minLength": 1 },
            "details": { "type": "string" },
            "diff": {
                "type": "object",
                "required": ["summary"],
                "properties": {
                    "summary": { "type": "string" },
                    "files": { "type": "array", "items": { "type": "string" } },
                    "patch": { "type": "string" },
                    "commit": { "type": "string" },
                },
            },
        },
    })
}

fn prompt_template_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "description", "body", "summary"],
        "additionalProperties": false,
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "description": { "type": "string" },
            "body": { "type": "string", "minLength": 1 },
            "tags": { "type": "array", "items": { "type": "string", "minLength": 1 } },
            "summary": {
                "type": "object",
                "required": ["file", "purpose"],
                "properties": {
                    "file": { "type": "string", "minLength": 1 },
                    "purpose": { "type": "string", "minLength": 1 },
                },
            },
        },
    })
}

fn prompt_blueprint_schema() -> Value {
    json!({
        "type": "object",
        "required": ["blueprint_id", "description", "placeholders", "template"],
        "properties": {
            "blueprint_id": { "type": "string", "minLength": 1 },
            "description": { "type": "string" },
            "placeholders": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "description"],
                    "additionalProperties": false,
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "description": { "type": "string" },
                        "example": { "type": "string" },
                        "required": { "type": "boolean" },
                        "default": { "type": "string" },
                    },
                },
            },
            "template": {
                "type": "object",
                "required": ["id", "description", "body", "summary"],
                "properties": {
                    "id": { "type": "string", "minLength": 1 },
                    "description": { "type": "string" },
                    "body": { "type": "string", "minLength": 1 },
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "summary": {
                        "type": "object",
                        "required": ["file", "purpose"],
                    },
                },
            },
        },
    })
}

fn machine_summary_schema() -> Value {
    json!({
        "type": "object",
        "required": ["file", "purpose"],
        "properties": {
            "file": { "type": "string", "minLength": 1 },
            "purpose": { "type": "string", "minLength": 1 },
        },
    })
}

// ─── Workspace starters ────────────────────────────────────────────────────

fn task_creation_blueprint() -> Value {
    json!({
        "blueprint_id": "task_creation",
        "description": "Implementation brief for one task",
        "placeholders": [
            {
                "name": "task_id",
                "description": "Task the prompt is for",
                "example": "TASK_001",
            },
            {
                "name": "task_title",
                "description": "Short human-readable title",
            },
            {
                "name": "acceptance",
                "description": "Acceptance criteria in one line",
            },
            {
                "name": "context",
                "description": "Extra constraints or background",
                "required": false,
                "default": "No additional context provided.",
            },
        ],
        "template": {
            "id": "{{task_id}}_prompt",
            "description": "Implementation brief for {{task_title}}",
            "body": "Task {{task_id}}: {{task_title}}\nAcceptance: {{acceptance}}\nContext: {{context}}",
            "tags": ["task", "{{task_id}}"],
            "summary": {
                "file": "ai/templates/prompt_template.json",
                "purpose": "Generated implementation prompt for {{task_id}}",
            },
        },
    })
}

fn seed_prompt() -> Value {
    json!({
        "id": "seed_prompt",
        "description": "Placeholder prompt shipped by `taskforge init`",
        "body": "Run `taskforge generate --blueprint task_creation` to replace this prompt.",
        "summary": {
            "file": "ai/templates/prompt_template.json",
            "purpose": "Seed prompt artifact",
        },
    })
}

fn task_template() -> Value {
    json!({
        "task_id": "{{TASK_ID}}",
        "title": "{{TASK_ID}}: untitled",
        "status": "todo",
        "description": "",
        "acceptance": [],
    })
}

const CHECKLIST_TEMPLATE: &str = r#"<!-- Machine Summary Block -->
{"file": "ai/tasks/{{TASK_ID}}/checklist.md", "purpose": "Execution checklist for {{TASK_ID}}"}

# {{TASK_ID}} checklist

- [ ] Understand the task and its acceptance criteria
- [ ] Implement the change
- [ ] Add or update tests
- [ ] Record progress in progress.ndjson
"#;
