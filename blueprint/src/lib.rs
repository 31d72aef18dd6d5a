//! Blueprint loading, placeholder resolution, template rendering, and the
//! generation pipeline that persists prompts and logs task events.

mod engine;
mod error;
mod render;
mod types;

pub use engine::build_prompt;
pub use engine::generate;
pub use engine::list_blueprints;
pub use engine::load_blueprint;
pub use error::BlueprintError;
pub use render::render_template;
pub use render::resolve_variables;
pub use types::BLUEPRINT_DIR;
pub use types::Blueprint;
pub use types::BlueprintSummary;
pub use types::DEFAULT_OUTPUT_PATH;
pub use types::GenerationRequest;
pub use types::GenerationResult;
pub use types::Placeholder;
pub use types::PromptTemplate;
pub use types::SummaryRef;
