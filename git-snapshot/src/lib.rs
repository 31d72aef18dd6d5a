//! Working-tree snapshots embedded in generation events.
//!
//! Best effort by contract: every failure path (no git binary, not a
//! repository, no commits yet) degrades to a textual summary so the
//! operation that asked for the snapshot never aborts because of it.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use serde::Serialize;

/// Patch bytes kept in a snapshot before truncation.
pub const DEFAULT_PATCH_LIMIT: usize = 4000;
/// Changed-file names kept in a snapshot.
pub const DEFAULT_FILE_LIMIT: usize = 20;

/// Working-tree state carried verbatim inside event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSnapshot {
    /// Always present, even when capture degraded.
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

impl DiffSnapshot {
    fn unavailable(reason: &str) -> Self {
        Self {
            summary: format!("diff unavailable: {reason}"),
            files: None,
            patch: None,
            commit: None,
        }
    }
}

/// Capture limits; the defaults keep event lines reviewable.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub patch_limit: usize,
    pub file_limit: usize,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            patch_limit: DEFAULT_PATCH_LIMIT,
            file_limit: DEFAULT_FILE_LIMIT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum GitError {
    #[error("failed to launch git: {0}")]
    Launch(#[from] std::io::Error),
    #[error("git {args} failed: {stderr}")]
    Command { args: String, stderr: String },
}

/// Snapshot the working tree at `worktree`.
pub fn capture_diff_snapshot(worktree: &Path, options: &CaptureOptions) -> DiffSnapshot {
    let porcelain = match run_git(worktree, &["status", "--porcelain"]) {
        Ok(output) => output,
        Err(err) => {
            tracing::debug!("diff snapshot degraded: {err}");
            return DiffSnapshot::unavailable(&err.to_string());
        }
    };
    if porcelain.trim().is_empty() {
        clean_snapshot(worktree)
    } else {
        dirty_snapshot(worktree, &porcelain, options)
    }
}

fn clean_snapshot(worktree: &Path) -> DiffSnapshot {
    let head = run_git(worktree, &["log", "-1", "--oneline"])
        .ok()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty());
    let commit = run_git(worktree, &["rev-parse", "HEAD"])
        .ok()
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty());
    let summary = match head {
        Some(head) => format!("clean working tree @ {head}"),
        None => "clean working tree (no commits yet)".to_string(),
    };
    DiffSnapshot {
        summary,
        files: None,
        patch: None,
        commit,
    }
}

fn dirty_snapshot(worktree: &Path, porcelain: &str, options: &CaptureOptions) -> DiffSnapshot {
    let files = parse_porcelain(porcelain, options.file_limit);

    // `HEAD` variants fail in a repository with no commits; the plain forms
    // cover staged-only states there.
    let summary = run_git(worktree, &["diff", "--stat", "HEAD"])
        .or_else(|_| run_git(worktree, &["diff", "--stat"]))
        .ok()
        .map(|stat| stat.trim().to_string())
        .filter(|stat| !stat.is_empty())
        .unwrap_or_else(|| format!("{} file(s) changed", files.len()));

    let patch = run_git(worktree, &["diff", "HEAD"])
        .or_else(|_| run_git(worktree, &["diff"]))
        .ok()
        .map(|patch| truncate_patch(&patch, options.patch_limit))
        .filter(|patch| !patch.is_empty());

    DiffSnapshot {
        summary,
        files: Some(files),
        patch,
        commit: None,
    }
}

/// Changed paths from `status --porcelain`: strip the two status columns,
/// collapse rename arrows to the new name, dedupe, cap at `limit`.
fn parse_porcelain(porcelain: &str, limit: usize) -> Vec<String> {
    let mut files = Vec::new();
    for line in porcelain.lines() {
        if line.len() <= 3 {
            continue;
        }
        let path = line[3..].trim();
        let path = path.rsplit(" -> ").next().unwrap_or(path).trim();
        let path = path.trim_matches('"');
        if path.is_empty() {
            continue;
        }
        let path = path.to_string();
        if !files.contains(&path) {
            files.push(path);
        }
        if files.len() == limit {
            break;
        }
    }
    files
}

/// Truncate to at most `limit` bytes on a char boundary, marking the cut
/// with a trailing `...`.
fn truncate_patch(patch: &str, limit: usize) -> String {
    let trimmed = patch.trim_end();
    if trimmed.len() <= limit {
        return trimmed.to_string();
    }
    let mut cut = limit.saturating_sub(3);
    while cut > 0 && !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &trimmed[..cut])
}

fn run_git(worktree: &Path, args: &[&str]) -> Result<String, GitError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(worktree)
        .output()?;
    if !output.status.success() {
        return Err(GitError::Command {
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
