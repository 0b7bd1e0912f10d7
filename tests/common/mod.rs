#![allow(dead_code)]

//! Fixture helpers for tests that drive the binary against real git
//! repositories.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

/// Whether a `git` executable can be found; tests needing a repository skip
/// themselves when it cannot.
pub fn is_git_available() -> bool {
  Command::new("git").arg("--version").status().is_ok()
}

/// Runs a git command inside `dir`, surfacing stderr on failure.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
  run_git_with_env(dir, args, &[])
}

/// Runs a git command inside `dir` with extra environment variables set.
pub fn run_git_with_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<()> {
  let mut command = Command::new("git");
  command.args(args).current_dir(dir);
  for (key, value) in env {
    command.env(key, value);
  }
  let output = command.output().with_context(|| format!("failed to execute git {args:?}"))?;

  if !output.status.success() {
    anyhow::bail!("git {:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));
  }
  Ok(())
}

/// Creates an empty repository in `dir`, pinned to a `main` branch with a
/// fixed identity and signing disabled, so commits behave the same on every
/// machine.
pub fn init_git_repo(dir: &Path) -> Result<()> {
  run_git(dir, &["init"])?;
  run_git(dir, &["config", "init.defaultBranch", "main"])?;
  run_git(dir, &["branch", "-M", "main"])?;
  run_git(dir, &["config", "user.name", "Test User"])?;
  run_git(dir, &["config", "user.email", "test@example.com"])?;
  run_git(dir, &["config", "commit.gpgsign", "false"])?;
  Ok(())
}

/// Commits whatever is staged.
pub fn git_commit(dir: &Path, message: &str) -> Result<()> {
  run_git(dir, &["commit", "-m", message])
}

/// Stages one file and commits it.
pub fn git_add_and_commit(dir: &Path, file: &str, message: &str) -> Result<()> {
  run_git(dir, &["add", file])?;
  git_commit(dir, message)
}

/// Stages everything and commits with fixed author and committer dates, so
/// the copyright years derived from history are deterministic.
///
/// `date` is an ISO 8601 date string, e.g. `2016-03-04T12:00:00+00:00`.
pub fn git_commit_all_at(dir: &Path, message: &str, date: &str) -> Result<()> {
  run_git(dir, &["add", "-A"])?;
  run_git_with_env(
    dir,
    &["commit", "-m", message],
    &[("GIT_AUTHOR_DATE", date), ("GIT_COMMITTER_DATE", date)],
  )
}

/// Writes a file under the repository, creating parent directories as needed.
pub fn write_file(dir: &Path, relative: &str, contents: &str) -> Result<()> {
  let path = dir.join(relative);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, contents)?;
  Ok(())
}

/// Reads a file under the repository.
pub fn read_file(dir: &Path, relative: &str) -> Result<String> {
  std::fs::read_to_string(dir.join(relative)).context("failed to read repository file")
}

/// Writes a minimal configuration selecting `**/*.rs` files.
pub fn write_default_config(dir: &Path) -> Result<()> {
  write_file(
    dir,
    "headsync.json",
    r#"{
  "headerFile": "license-header.txt",
  "style": "SlashSlash",
  "includes": ["**/*.rs"],
  "excludes": ["target/**/*"],
  "data": {
    "Owner": "ACME"
  }
}
"#,
  )
}
