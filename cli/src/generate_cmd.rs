//! `taskforge generate` and `taskforge blueprints`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::bail;
use clap::Parser;
use serde_json::Value;
use taskforge_blueprint::BLUEPRINT_DIR;
use taskforge_blueprint::GenerationRequest;
use taskforge_blueprint::generate;
use taskforge_blueprint::list_blueprints;

use crate::open_store;

/// Render a prompt from a blueprint.
#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Workspace root.
    #[arg(long = "root", default_value = ".")]
    pub root: PathBuf,

    /// Blueprint to render (its `blueprint_id`).
    #[arg(long = "blueprint", short = 'b')]
    pub blueprint: String,

    /// JSON object file supplying placeholder values.
    #[arg(long = "vars", value_name = "FILE")]
    pub vars: Option<PathBuf>,

    /// One placeholder value, repeatable. Overrides `--vars` on conflict.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Land the prompt at this path instead of the default.
    #[arg(long = "out", short = 'o', value_name = "PATH")]
    pub out: Option<String>,

    /// Log the generation event to this task instead of the active one.
    #[arg(long = "task", short = 't', value_name = "TASK_ID")]
    pub task: Option<String>,

    /// Render and print the prompt without persisting or logging.
    #[arg(long = "dry-run", short = 'd')]
    pub dry_run: bool,
}

pub(crate) fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let store = open_store(&args.root)?;

    let mut variables = BTreeMap::new();
    if let Some(path) = &args.vars {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read variables file {}", path.display()))?;
        let parsed: Value = serde_json::from_str(&raw)
            .with_context(|| format!("variables file {} is not valid JSON", path.display()))?;
        let Value::Object(map) = parsed else {
            bail!("variables file {} must hold a JSON object", path.display());
        };
        for (key, value) in map {
            let text = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            variables.insert(key, text);
        }
    }
    for pair in &args.set {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("--set expects KEY=VALUE, got {pair:?}");
        };
        variables.insert(key.to_string(), value.to_string());
    }

    let mut request = GenerationRequest::new(&args.blueprint);
    request.variables = variables;
    request.output_path = args.out.clone();
    request.task_id = args.task.clone();
    if args.dry_run {
        request.persist = false;
        request.log_event = false;
    }

    let result = generate(&store, &request)?;
    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&result.prompt)?);
    } else if let Some(path) = &result.output_path {
        println!("Generated prompt from blueprint {} -> {path}", args.blueprint);
    }
    Ok(())
}

/// List the blueprints available in the workspace.
#[derive(Debug, Parser)]
pub struct BlueprintsArgs {
    /// Workspace root.
    #[arg(long = "root", default_value = ".")]
    pub root: PathBuf,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

pub(crate) fn run_blueprints(args: &BlueprintsArgs) -> anyhow::Result<()> {
    let store = open_store(&args.root)?;
    let summaries = list_blueprints(&store)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if summaries.is_empty() {
        println!("No blueprints found under {BLUEPRINT_DIR}");
    } else {
        for summary in &summaries {
            println!("{}  {}", summary.blueprint_id, summary.description);
        }
    }
    Ok(())
}
