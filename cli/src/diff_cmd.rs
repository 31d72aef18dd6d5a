//! `taskforge diff` — the git working-tree snapshot as JSON.

use std::path::PathBuf;

use clap::Parser;
use taskforge_git_snapshot::CaptureOptions;
use taskforge_git_snapshot::DEFAULT_PATCH_LIMIT;
use taskforge_git_snapshot::capture_diff_snapshot;

/// Capture the git working-tree state as a JSON snapshot.
#[derive(Debug, Parser)]
pub struct DiffArgs {
    /// Workspace root.
    #[arg(long = "root", default_value = ".")]
    pub root: PathBuf,

    /// Truncate the patch to this many bytes.
    #[arg(long = "patch-limit", default_value_t = DEFAULT_PATCH_LIMIT)]
    pub patch_limit: usize,
}

pub(crate) fn run(args: &DiffArgs) -> anyhow::Result<()> {
    let options = CaptureOptions {
        patch_limit: args.patch_limit,
        ..CaptureOptions::default()
    };
    let snapshot = capture_diff_snapshot(&args.root, &options);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
