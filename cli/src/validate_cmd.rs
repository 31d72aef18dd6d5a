//! `taskforge validate` — the workspace-wide schema sweep.

use std::path::PathBuf;

use clap::Parser;
use taskforge_schema::validate_tree;

/// Validate every known workspace artifact against its schema.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Workspace root.
    #[arg(long = "root", default_value = ".")]
    pub root: PathBuf,
}

pub(crate) fn run(args: &ValidateArgs) -> anyhow::Result<()> {
    let outcome = validate_tree(&args.root)?;

    for report in &outcome.reports {
        if report.violations.is_empty() {
            continue;
        }
        println!("[FAIL] {}", report.path);
        for violation in &report.violations {
            println!("  {violation}");
        }
    }

    if !outcome.is_clean() {
        println!(
            "Schema validation failed with {} error(s) across {} file(s)",
            outcome.violation_count(),
            outcome.failures()
        );
        std::process::exit(1);
    }

    println!("All schema checks passed ({} files)", outcome.checked());
    Ok(())
}
