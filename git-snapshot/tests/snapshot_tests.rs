#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;
use std::process::Command;

use taskforge_git_snapshot::CaptureOptions;
use taskforge_git_snapshot::capture_diff_snapshot;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=tester",
            "-c",
            "user.email=tester@example.com",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .expect("run git");
    assert!(status.success(), "git {args:?} failed");
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("write file");
}

#[test]
fn outside_a_repository_capture_degrades() {
    let dir = TempDir::new().expect("tempdir");
    let snapshot = capture_diff_snapshot(dir.path(), &CaptureOptions::default());
    assert!(
        snapshot.summary.starts_with("diff unavailable:"),
        "unexpected summary: {}",
        snapshot.summary
    );
    assert_eq!(snapshot.files, None);
    assert_eq!(snapshot.patch, None);
    assert_eq!(snapshot.commit, None);
}

#[test]
fn clean_tree_reports_head_commit() {
    let dir = TempDir::new().expect("tempdir");
    git(dir.path(), &["init", "-q"]);
    write(dir.path(), "notes.txt", "original\n");
    git(dir.path(), &["add", "."]);
    git(dir.path(), &["commit", "-q", "-m", "init", "--no-gpg-sign"]);

    let snapshot = capture_diff_snapshot(dir.path(), &CaptureOptions::default());
    assert!(
        snapshot.summary.starts_with("clean working tree @ "),
        "unexpected summary: {}",
        snapshot.summary
    );
    assert!(snapshot.summary.contains("init"));
    assert_eq!(snapshot.files, None);
    assert_eq!(snapshot.patch, None);
    let commit = snapshot.commit.expect("commit hash");
    assert_eq!(commit.len(), 40, "unexpected hash: {commit}");
}

#[test]
fn dirty_tree_lists_files_and_patch() {
    let dir = TempDir::new().expect("tempdir");
    git(dir.path(), &["init", "-q"]);
    write(dir.path(), "notes.txt", "original\n");
    git(dir.path(), &["add", "."]);
    git(dir.path(), &["commit", "-q", "-m", "init", "--no-gpg-sign"]);
    write(dir.path(), "notes.txt", "changed\n");

    let snapshot = capture_diff_snapshot(dir.path(), &CaptureOptions::default());
    assert_eq!(snapshot.files, Some(vec!["notes.txt".to_string()]));
    assert!(
        snapshot.summary.contains("notes.txt"),
        "unexpected summary: {}",
        snapshot.summary
    );
    let patch = snapshot.patch.expect("patch");
    assert!(patch.contains("+changed"), "unexpected patch: {patch}");
    assert_eq!(snapshot.commit, None);
}

#[test]
fn untracked_only_repository_without_commits_still_summarizes() {
    let dir = TempDir::new().expect("tempdir");
    git(dir.path(), &["init", "-q"]);
    write(dir.path(), "new.txt", "hello\n");

    let snapshot = capture_diff_snapshot(dir.path(), &CaptureOptions::default());
    assert_eq!(snapshot.files, Some(vec!["new.txt".to_string()]));
    // Untracked files never appear in `git diff`, so the summary falls back
    // to a count and there is no patch.
    assert_eq!(snapshot.summary, "1 file(s) changed");
    assert_eq!(snapshot.patch, None);
}

#[test]
fn patch_honors_the_configured_limit() {
    let dir = TempDir::new().expect("tempdir");
    git(dir.path(), &["init", "-q"]);
    write(dir.path(), "big.txt", "start\n");
    git(dir.path(), &["add", "."]);
    git(dir.path(), &["commit", "-q", "-m", "init", "--no-gpg-sign"]);
    let body: String = (0..200).map(|n| format!("line {n}\n")).collect();
    write(dir.path(), "big.txt", &body);

    let options = CaptureOptions {
        patch_limit: 80,
        ..CaptureOptions::default()
    };
    let snapshot = capture_diff_snapshot(dir.path(), &options);
    let patch = snapshot.patch.expect("patch");
    assert!(patch.len() <= 80, "patch too long: {}", patch.len());
    assert!(patch.ends_with("..."), "missing truncation marker: {patch}");
}

#[test]
fn snapshot_serializes_without_empty_fields() {
    let dir = TempDir::new().expect("tempdir");
    let snapshot = capture_diff_snapshot(dir.path(), &CaptureOptions::default());
    let line = serde_json::to_string(&snapshot).expect("serialize");
    assert!(line.contains("\"summary\""));
    assert!(!line.contains("\"files\""), "None fields must be skipped: {line}");
    assert!(!line.contains("\"patch\""));
    assert!(!line.contains("\"commit\""));
}
