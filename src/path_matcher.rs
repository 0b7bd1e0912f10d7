//! # Path Matcher Module
//!
//! Selects the files a run operates on, either by walking the working
//! directory (full scan) or by filtering a list of changed paths
//! (incremental scan). Selection is glob-based: a path is kept when it
//! matches at least one include pattern and no exclude pattern.

use std::path::PathBuf;

use anyhow::{Context, Result};
use glob::Pattern;
use tracing::debug;
use walkdir::WalkDir;

use crate::vcs::FileChange;

/// File selection over include/exclude glob patterns.
pub trait PathMatcher {
  /// Walks the working directory and returns every matching file, sorted by
  /// path.
  fn scan_all_files(&self, includes: &[String], excludes: &[String]) -> Result<Vec<FileChange>>;

  /// Filters already-discovered changes by the same patterns.
  fn match_files(&self, changes: Vec<FileChange>, includes: &[String], excludes: &[String])
  -> Result<Vec<FileChange>>;
}

#[derive(Debug)]
pub struct GlobPathMatcher {
  root: PathBuf,
}

impl Default for GlobPathMatcher {
  fn default() -> Self {
    Self::rooted(".")
  }
}

impl GlobPathMatcher {
  /// A matcher scanning from `root`; selected paths are reported relative to
  /// it.
  pub fn rooted(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

impl PathMatcher for GlobPathMatcher {
  fn scan_all_files(&self, includes: &[String], excludes: &[String]) -> Result<Vec<FileChange>> {
    let includes = compile_patterns(includes)?;
    let excludes = compile_patterns(excludes)?;

    let mut changes = Vec::new();
    for entry in WalkDir::new(&self.root) {
      let entry = entry.context("cannot scan working directory")?;
      if !entry.file_type().is_file() {
        continue;
      }
      let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
      let path = relative.to_string_lossy();
      if is_selected(&path, &includes, &excludes) {
        changes.push(FileChange::new(path.into_owned()));
      }
    }

    changes.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("full scan selected {} file(s)", changes.len());
    Ok(changes)
  }

  fn match_files(
    &self,
    changes: Vec<FileChange>,
    includes: &[String],
    excludes: &[String],
  ) -> Result<Vec<FileChange>> {
    let includes = compile_patterns(includes)?;
    let excludes = compile_patterns(excludes)?;

    Ok(
      changes
        .into_iter()
        .filter(|change| is_selected(&change.path, &includes, &excludes))
        .collect(),
    )
  }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
  patterns
    .iter()
    .map(|p| Pattern::new(p).with_context(|| format!("invalid glob pattern: {p}")))
    .collect()
}

fn is_selected(path: &str, includes: &[Pattern], excludes: &[Pattern]) -> bool {
  includes.iter().any(|p| p.matches(path)) && !excludes.iter().any(|p| p.matches(path))
}
