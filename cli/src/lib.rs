//! `taskforge` — sandboxed task artifact workflows from the command line.
//!
//! ## Commands
//!
//! - `taskforge init` - seed a workspace with the stock schemas and templates
//! - `taskforge generate --blueprint <ID>` - render a prompt from a blueprint
//! - `taskforge blueprints` - list the available blueprints
//! - `taskforge task <new|list|show|check|activate>` - task directory operations
//! - `taskforge validate` - sweep every workspace artifact against its schema
//! - `taskforge diff` - print the current git diff snapshot as JSON

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use taskforge_schema::SchemaCatalog;
use taskforge_store::ArtifactStore;

mod diff_cmd;
mod generate_cmd;
mod init_cmd;
mod seeds;
mod task_cmd;
mod validate_cmd;

pub use diff_cmd::DiffArgs;
pub use generate_cmd::BlueprintsArgs;
pub use generate_cmd::GenerateArgs;
pub use init_cmd::InitArgs;
pub use task_cmd::TaskCli;
pub use validate_cmd::ValidateArgs;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "taskforge", version, about = "Sandboxed task artifact store, schema sweeps, and prompt blueprints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Seed a workspace with the stock schemas, templates, and blueprints.
    Init(InitArgs),
    /// Render a prompt from a blueprint and persist it.
    Generate(GenerateArgs),
    /// List the blueprints available in the workspace.
    Blueprints(BlueprintsArgs),
    /// Create, list, and update tasks under `ai/tasks`.
    Task(TaskCli),
    /// Validate every known workspace artifact against its schema.
    Validate(ValidateArgs),
    /// Capture the git working-tree state as a JSON snapshot.
    Diff(DiffArgs),
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Init(args) => init_cmd::run(&args),
            Command::Generate(args) => generate_cmd::run_generate(&args),
            Command::Blueprints(args) => generate_cmd::run_blueprints(&args),
            Command::Task(cli) => cli.run(),
            Command::Validate(args) => validate_cmd::run(&args),
            Command::Diff(args) => diff_cmd::run(&args),
        }
    }
}

/// Open the workspace store with schema validation hooked up and the
/// operation log mirrored under `logs/`.
pub(crate) fn open_store(root: &Path) -> anyhow::Result<ArtifactStore> {
    let catalog = SchemaCatalog::new(root)?;
    let store = ArtifactStore::new(root)?
        .with_validator(Arc::new(catalog))
        .with_op_log(root.join("logs").join("artifact_store.ndjson"));
    Ok(store)
}
