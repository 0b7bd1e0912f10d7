//! # VCS Module
//!
//! Version-control access through the `git` executable.
//!
//! Two layers live here: the low-level [`Vcs`] trait wrapping raw git
//! subcommands, and the higher-level [`VersioningClient`] that turns git
//! output into [`FileChange`] values carrying creation and last-edition
//! years. Both are traits so resolver and tracker behavior can be tested
//! against scripted implementations.

use std::collections::BTreeSet;
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Local};
use tracing::debug;

use crate::environment::Clock;

/// A file selected for processing, together with what version control knows
/// about its lifetime.
///
/// Years are zero until [`VersioningClient::add_metadata`] fills them in. A
/// `last_edition_year` of zero afterwards means the file has at most one
/// commit, so no meaningful edition year exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileChange {
  pub path: String,
  pub creation_year: i32,
  pub last_edition_year: i32,
}

impl FileChange {
  pub fn new(path: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      creation_year: 0,
      last_edition_year: 0,
    }
  }
}

/// Raw version-control operations.
pub trait Vcs {
  /// Absolute path of the repository's top-level directory.
  fn root(&self) -> Result<String>;

  /// Hash of the latest commit touching `path`; empty when the path has no
  /// committed history.
  fn latest_revision(&self, path: &str) -> Result<String>;

  /// `git status` with the given arguments.
  fn status(&self, args: &[&str]) -> Result<String>;

  /// `git diff` with the given arguments.
  fn diff(&self, args: &[&str]) -> Result<String>;

  /// `git log` with the given arguments.
  fn log(&self, args: &[&str]) -> Result<String>;

  /// Contents of `path` as committed at `revision`.
  fn show_content_at_revision(&self, path: &str, revision: &str) -> Result<String>;
}

/// [`Vcs`] implementation shelling out to the `git` executable.
#[derive(Debug, Default)]
pub struct Git;

impl Git {
  fn run(&self, args: &[&str]) -> Result<String> {
    debug!("running: git {}", args.join(" "));
    let output = Command::new("git")
      .args(args)
      .output()
      .with_context(|| format!("failed to execute: git {}", args.join(" ")))?;

    if !output.status.success() {
      bail!(
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr).trim()
      );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }
}

impl Vcs for Git {
  fn root(&self) -> Result<String> {
    Ok(self.run(&["rev-parse", "--show-toplevel"])?.trim().to_string())
  }

  fn latest_revision(&self, path: &str) -> Result<String> {
    Ok(self.run(&["log", "-1", "--format=%H", "--", path])?.trim().to_string())
  }

  fn status(&self, args: &[&str]) -> Result<String> {
    let mut full = vec!["status"];
    full.extend_from_slice(args);
    self.run(&full)
  }

  fn diff(&self, args: &[&str]) -> Result<String> {
    let mut full = vec!["diff"];
    full.extend_from_slice(args);
    self.run(&full)
  }

  fn log(&self, args: &[&str]) -> Result<String> {
    let mut full = vec!["log"];
    full.extend_from_slice(args);
    self.run(&full)
  }

  fn show_content_at_revision(&self, path: &str, revision: &str) -> Result<String> {
    // validate the revision first for a clearer error than cat-file's
    self.run(&["rev-parse", revision])?;
    self.run(&["cat-file", "-p", &format!("{revision}:{path}")])
  }
}

/// Change discovery and per-file year metadata on top of a [`Vcs`].
pub trait VersioningClient {
  /// Files changed since `revision`, committed or not, deletions excluded,
  /// sorted by path.
  fn get_changes(&self, revision: &str) -> Result<Vec<FileChange>>;

  /// Fills creation and last-edition years for every change from its commit
  /// timestamps.
  fn add_metadata(&self, changes: Vec<FileChange>, clock: &dyn Clock) -> Result<Vec<FileChange>>;

  /// The underlying raw client.
  fn vcs(&self) -> &dyn Vcs;
}

pub struct Client {
  vcs: Box<dyn Vcs>,
}

impl Client {
  pub fn new(vcs: Box<dyn Vcs>) -> Self {
    Self { vcs }
  }

  /// Committed changes between `revision` and HEAD, from
  /// `git diff --name-status`.
  fn committed_changes(&self, revision: &str) -> Result<Vec<FileChange>> {
    let output = self.vcs.diff(&["--name-status", &format!("{revision}..HEAD")])?;

    let mut changes = Vec::new();
    for line in output.lines() {
      let columns: Vec<&str> = line.split('\t').collect();
      let Some(status) = columns.first() else {
        continue;
      };
      if status.starts_with('D') {
        continue;
      }
      // renames carry old and new path; the new one is last
      let Some(path) = columns.last() else {
        continue;
      };
      if path.is_empty() {
        continue;
      }
      changes.push(FileChange::new(*path));
    }
    Ok(changes)
  }

  /// Uncommitted changes, staged or not, from `git status --porcelain`.
  fn uncommitted_changes(&self) -> Result<Vec<FileChange>> {
    let output = self.vcs.status(&["--porcelain"])?;

    let mut changes = Vec::new();
    for line in output.lines() {
      if line.len() < 4 {
        continue;
      }
      let (status, path) = line.split_at(3);
      if status.contains('D') {
        continue;
      }
      // renames are reported as "old -> new"
      let path = path.rsplit(" -> ").next().unwrap_or(path);
      changes.push(FileChange::new(path.trim()));
    }
    Ok(changes)
  }

  /// Commit timestamps of `path`, oldest first, including rename/copy
  /// boundaries.
  fn commit_timestamps(&self, path: &str) -> Result<Vec<i64>> {
    let output = self.vcs.log(&["--diff-filter=rc", "--format=%at", "--", path])?;

    let mut timestamps = Vec::new();
    for line in output.lines() {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      let timestamp: i64 = line
        .parse()
        .with_context(|| format!("unexpected commit timestamp '{line}' for {path}"))?;
      timestamps.push(timestamp);
    }
    timestamps.reverse();
    Ok(timestamps)
  }
}

fn timestamp_year(timestamp: i64) -> Result<i32> {
  let datetime: DateTime<Local> = DateTime::from_timestamp(timestamp, 0)
    .with_context(|| format!("commit timestamp out of range: {timestamp}"))?
    .into();
  Ok(datetime.year())
}

impl VersioningClient for Client {
  fn get_changes(&self, revision: &str) -> Result<Vec<FileChange>> {
    let mut seen = BTreeSet::new();
    let mut changes = Vec::new();

    let committed = self.committed_changes(revision).context("cannot get committed changes")?;
    let uncommitted = self.uncommitted_changes().context("cannot get uncommitted changes")?;
    for change in committed.into_iter().chain(uncommitted) {
      if seen.insert(change.path.clone()) {
        changes.push(change);
      }
    }

    changes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(changes)
  }

  fn add_metadata(&self, changes: Vec<FileChange>, clock: &dyn Clock) -> Result<Vec<FileChange>> {
    let mut result = Vec::with_capacity(changes.len());

    for mut change in changes {
      let timestamps = self
        .commit_timestamps(&change.path)
        .with_context(|| format!("cannot get commit history of {}", change.path))?;

      match timestamps.as_slice() {
        [] => {
          // new file, not committed yet
          let year = clock.now().year();
          change.creation_year = year;
          change.last_edition_year = 0;
        }
        [only] => {
          change.creation_year = timestamp_year(*only)?;
          change.last_edition_year = 0;
        }
        [oldest, .., newest] => {
          change.creation_year = timestamp_year(*oldest)?;
          change.last_edition_year = timestamp_year(*newest)?;
        }
      }
      result.push(change);
    }

    Ok(result)
  }

  fn vcs(&self) -> &dyn Vcs {
    self.vcs.as_ref()
  }
}
