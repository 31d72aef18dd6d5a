//! `taskforge task` — operations on the `ai/tasks` directory.

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use serde_json::Map;
use serde_json::Value;
use taskforge_tasks::TASKS_DIR;
use taskforge_tasks::create_task_from_template;
use taskforge_tasks::get_task_detail;
use taskforge_tasks::list_tasks;
use taskforge_tasks::next_task_id;
use taskforge_tasks::set_active_task;
use taskforge_tasks::set_checklist_item;

use crate::open_store;

/// Task subcommand group.
#[derive(Debug, Parser)]
pub struct TaskCli {
    #[command(subcommand)]
    pub command: TaskSubcommand,
}

impl TaskCli {
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.command {
            TaskSubcommand::New(args) => cmd_new(args),
            TaskSubcommand::List(args) => cmd_list(args),
            TaskSubcommand::Show(args) => cmd_show(args),
            TaskSubcommand::Check(args) => cmd_check(args),
            TaskSubcommand::Activate(args) => cmd_activate(args),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum TaskSubcommand {
    /// Scaffold a new task from the template directory.
    New(NewArgs),
    /// List tasks in presentation order.
    List(ListArgs),
    /// Show one task's document, checklist, and progress log.
    Show(ShowArgs),
    /// Check or uncheck one checklist line.
    Check(CheckArgs),
    /// Point the active-task index at a task.
    Activate(ActivateArgs),
}

#[derive(Debug, Parser)]
pub struct NewArgs {
    /// Workspace root.
    #[arg(long = "root", default_value = ".")]
    pub root: PathBuf,

    /// Task id (e.g. TASK_042). Defaults to the next sequential id.
    pub task_id: Option<String>,

    /// Title to set on the new task document.
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Also make the new task the active one.
    #[arg(long = "activate")]
    pub activate: bool,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Workspace root.
    #[arg(long = "root", default_value = ".")]
    pub root: PathBuf,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Workspace root.
    #[arg(long = "root", default_value = ".")]
    pub root: PathBuf,

    /// Task id.
    pub task_id: String,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Workspace root.
    #[arg(long = "root", default_value = ".")]
    pub root: PathBuf,

    /// Task id.
    pub task_id: String,

    /// Zero-based line index into checklist.md.
    pub line: usize,

    /// Uncheck the line instead of checking it.
    #[arg(long = "undo")]
    pub undo: bool,
}

#[derive(Debug, Parser)]
pub struct ActivateArgs {
    /// Workspace root.
    #[arg(long = "root", default_value = ".")]
    pub root: PathBuf,

    /// Task id.
    pub task_id: String,
}

// ─── Command implementations ───────────────────────────────────────────────

fn cmd_new(args: &NewArgs) -> anyhow::Result<()> {
    let store = open_store(&args.root)?;
    let task_id = match &args.task_id {
        Some(id) => id.clone(),
        None => next_task_id(&store)?,
    };
    let overrides = args.title.as_ref().map(|title| {
        let mut map = Map::new();
        map.insert("title".to_string(), Value::String(title.clone()));
        map
    });
    create_task_from_template(&store, &task_id, overrides.as_ref())?;
    println!("Created {task_id}");
    if args.activate {
        set_active_task(&store, &task_id)?;
        println!("Active task: {task_id}");
    }
    Ok(())
}

fn cmd_list(args: &ListArgs) -> anyhow::Result<()> {
    let store = open_store(&args.root)?;
    let summaries = list_tasks(&store)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    if summaries.is_empty() {
        println!("No tasks found under {TASKS_DIR}");
        return Ok(());
    }
    for summary in &summaries {
        let check = if summary.checklist_complete { "x" } else { " " };
        println!(
            "[{check}] {}  {} ({})",
            summary.task_id,
            summary.title.as_deref().unwrap_or("(untitled)"),
            summary.status.as_deref().unwrap_or("unknown"),
        );
    }
    Ok(())
}

fn cmd_show(args: &ShowArgs) -> anyhow::Result<()> {
    let store = open_store(&args.root)?;
    let detail = get_task_detail(&store, &args.task_id)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&detail.task)?);
    if let Some(checklist) = &detail.checklist {
        println!();
        println!("{}", checklist.trim_end());
    }
    if !detail.progress.is_empty() {
        println!();
        println!("Progress ({} events):", detail.progress.len());
        for event in &detail.progress {
            println!("  {}", serde_json::to_string(event)?);
        }
    }
    Ok(())
}

fn cmd_check(args: &CheckArgs) -> anyhow::Result<()> {
    let store = open_store(&args.root)?;
    set_checklist_item(&store, &args.task_id, args.line, !args.undo)?;
    let verb = if args.undo { "Unchecked" } else { "Checked" };
    println!("{verb} line {} of {}'s checklist", args.line, args.task_id);
    Ok(())
}

fn cmd_activate(args: &ActivateArgs) -> anyhow::Result<()> {
    let store = open_store(&args.root)?;
    set_active_task(&store, &args.task_id)?;
    println!("Active task: {}", args.task_id);
    Ok(())
}
