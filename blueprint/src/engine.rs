use std::collections::BTreeMap;

use taskforge_git_snapshot::CaptureOptions;
use taskforge_git_snapshot::capture_diff_snapshot;
use taskforge_store::ArtifactStore;
use taskforge_store::JsonWriteOptions;
use taskforge_tasks::ProgressEvent;
use taskforge_tasks::append_progress_entry;
use taskforge_tasks::resolve_active_task_id;

use crate::error::BlueprintError;
use crate::render::render_template;
use crate::render::resolve_variables;
use crate::types::BLUEPRINT_DIR;
use crate::types::Blueprint;
use crate::types::BlueprintSummary;
use crate::types::DEFAULT_OUTPUT_PATH;
use crate::types::GenerationRequest;
use crate::types::GenerationResult;
use crate::types::PromptTemplate;
use crate::types::SummaryRef;

const PROMPT_TEMPLATE_SCHEMA: &str = "schemas/prompt_template.json";

/// Agent name stamped on generation events.
const ENGINE_AGENT: &str = "blueprint_engine";

/// Read `ai/templates/prompt_blueprints/<id>.json` through the store.
/// A missing blueprint is an I/O error, a malformed one a parse error; both
/// propagate unchanged.
pub fn load_blueprint(
    store: &ArtifactStore,
    blueprint_id: &str,
) -> Result<Blueprint, BlueprintError> {
    let blueprint = store.read_json(&format!("{BLUEPRINT_DIR}/{blueprint_id}.json"))?;
    Ok(blueprint)
}

/// Id and description of every blueprint document, sorted by id.
pub fn list_blueprints(store: &ArtifactStore) -> Result<Vec<BlueprintSummary>, BlueprintError> {
    let mut summaries = Vec::new();
    if !store.resolve(BLUEPRINT_DIR)?.exists() {
        return Ok(summaries);
    }
    for path in store.list(BLUEPRINT_DIR)? {
        if !path.ends_with(".json") {
            continue;
        }
        let blueprint: Blueprint = store.read_json(&path)?;
        summaries.push(BlueprintSummary {
            blueprint_id: blueprint.blueprint_id,
            description: blueprint.description,
        });
    }
    summaries.sort_by(|a, b| a.blueprint_id.cmp(&b.blueprint_id));
    Ok(summaries)
}

/// Render every string field of the blueprint's template with the resolved
/// variables. Tags that render to nothing are dropped; an empty tag list
/// collapses to `None` so the artifact omits the field.
pub fn build_prompt(
    blueprint: &Blueprint,
    variables: &BTreeMap<String, String>,
) -> PromptTemplate {
    let template = &blueprint.template;
    let tags: Vec<String> = template
        .tags
        .iter()
        .flatten()
        .map(|tag| render_template(tag, variables))
        .filter(|tag| !tag.is_empty())
        .collect();
    PromptTemplate {
        id: render_template(&template.id, variables),
        description: render_template(&template.description, variables),
        body: render_template(&template.body, variables),
        tags: if tags.is_empty() { None } else { Some(tags) },
        summary: SummaryRef {
            file: render_template(&template.summary.file, variables),
            purpose: render_template(&template.summary.purpose, variables),
        },
    }
}

/// Orchestrate one generation run: load the blueprint, resolve variables,
/// render the prompt, then (by request) persist it through the store and
/// append a generation event to the target task's progress log.
///
/// The event target is the explicit `task_id` when given, otherwise the
/// active-task pointer; with neither, event logging is skipped silently.
/// The event embeds a best-effort snapshot of the store root's git state.
pub fn generate(
    store: &ArtifactStore,
    request: &GenerationRequest,
) -> Result<GenerationResult, BlueprintError> {
    let blueprint = load_blueprint(store, &request.blueprint_id)?;
    let variables = resolve_variables(&blueprint.placeholders, &request.variables)?;
    let prompt = build_prompt(&blueprint, &variables);

    let output_path = request
        .output_path
        .clone()
        .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

    let mut persisted_path = None;
    if request.persist {
        store.write_json(
            &output_path,
            &prompt,
            &JsonWriteOptions {
                schema: Some(PROMPT_TEMPLATE_SCHEMA.to_string()),
                pretty: true,
            },
        )?;
        persisted_path = Some(output_path.clone());
    }

    if request.log_event {
        let target = request
            .task_id
            .clone()
            .or_else(|| resolve_active_task_id(store));
        match target {
            Some(task_id) => {
                let mut event = ProgressEvent::now(
                    "step_completed",
                    "success",
                    ENGINE_AGENT,
                    &format!(
                        "Blueprint {} generated prompt -> {output_path}",
                        blueprint.blueprint_id
                    ),
                );
                event.task_id = Some(task_id.clone());
                event.diff = Some(capture_diff_snapshot(
                    store.root(),
                    &CaptureOptions::default(),
                ));
                append_progress_entry(store, &task_id, &event)?;
            }
            None => {
                tracing::debug!(
                    blueprint_id = %blueprint.blueprint_id,
                    "no target task; skipping generation event"
                );
            }
        }
    }

    Ok(GenerationResult {
        blueprint,
        prompt,
        output_path: persisted_path,
    })
}
