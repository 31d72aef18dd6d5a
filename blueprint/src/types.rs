use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// Directory holding one JSON document per blueprint.
pub const BLUEPRINT_DIR: &str = "ai/templates/prompt_blueprints";
/// Default landing path for generated prompts.
pub const DEFAULT_OUTPUT_PATH: &str = "ai/templates/prompt_template.json";

/// A declarative prompt recipe: the placeholder contract plus the template
/// whose string fields get rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub blueprint_id: String,
    pub description: String,
    pub placeholders: Vec<Placeholder>,
    pub template: PromptTemplate,
}

/// A named substitution site and its resolution rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Absent means required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Placeholder {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }
}

/// The template shape. A rendered instance of this same shape is the
/// generated prompt artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub description: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub summary: SummaryRef,
}

/// Where the rendered artifact claims to live and why it exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRef {
    pub file: String,
    pub purpose: String,
}

/// Listing row for the blueprint directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueprintSummary {
    pub blueprint_id: String,
    pub description: String,
}

/// Everything [`generate`](crate::generate) needs for one run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub blueprint_id: String,
    pub variables: BTreeMap<String, String>,
    /// Defaults to [`DEFAULT_OUTPUT_PATH`] when unset.
    pub output_path: Option<String>,
    /// Write the rendered prompt through the store. On by default.
    pub persist: bool,
    /// Append a generation event to the target task's log. On by default.
    pub log_event: bool,
    /// Explicit event target; when unset the active-task pointer decides.
    pub task_id: Option<String>,
}

impl GenerationRequest {
    pub fn new(blueprint_id: impl Into<String>) -> Self {
        Self {
            blueprint_id: blueprint_id.into(),
            variables: BTreeMap::new(),
            output_path: None,
            persist: true,
            log_event: true,
            task_id: None,
        }
    }
}

/// What one generation run produced.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub blueprint: Blueprint,
    pub prompt: PromptTemplate,
    /// Where the prompt landed, when it was persisted.
    pub output_path: Option<String>,
}
