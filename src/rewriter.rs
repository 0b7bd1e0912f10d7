//! # Rewriter Module
//!
//! Applies a [`ChangeSet`] to the working tree: for every selected file, the
//! previously written header (if any) is located and stripped, the copyright
//! years are computed from VCS metadata and the stripped header's own text,
//! and the freshly rendered header is prepended.
//!
//! Files are processed sequentially and failures are fatal for the whole run;
//! files rewritten before the failing one stay rewritten.

use std::path::Path;

use anyhow::{Context, Result};
use similar::{ChangeTag, TextDiff};
use tracing::debug;

use crate::resolver::ChangeSet;
use crate::vcs::FileChange;
use crate::verbose_log;
use crate::years::{compute_copyright_years, resolve_years};

#[derive(Debug, Default)]
pub struct HeaderRewriter;

impl HeaderRewriter {
  /// Rewrites every file in the change set in place.
  pub fn run(&self, change_set: &ChangeSet) -> Result<()> {
    for change in &change_set.files {
      verbose_log!("Updating header of {}", change.path);
      let contents = read_file(&change.path)?;
      let updated = updated_contents(change_set, change, &contents)?;
      if updated != contents {
        std::fs::write(&change.path, updated).with_context(|| format!("failed to write file: {}", change.path))?;
      }
    }
    Ok(())
  }

  /// Computes what [`run`](Self::run) would change without writing anything.
  ///
  /// Returns one diff section per file whose contents would change; an empty
  /// string means every header is already up to date.
  pub fn dry_run(&self, change_set: &ChangeSet) -> Result<String> {
    let mut report = String::new();

    for change in &change_set.files {
      let contents = read_file(&change.path)?;
      let updated = updated_contents(change_set, change, &contents)?;
      if updated == contents {
        debug!("{} is up to date", change.path);
        continue;
      }
      report.push_str(&format!("file:{}\n---\n", change.path));
      let diff = TextDiff::from_lines(&contents, &updated);
      for diff_change in diff.iter_all_changes() {
        let sign = match diff_change.tag() {
          ChangeTag::Delete => "-",
          ChangeTag::Insert => "+",
          ChangeTag::Equal => " ",
        };
        report.push_str(&format!("{sign}{diff_change}"));
      }
      report.push_str("---\n");
    }

    Ok(report)
  }
}

fn read_file(path: &str) -> Result<String> {
  std::fs::read_to_string(Path::new(path)).with_context(|| format!("failed to read file: {path}"))
}

/// The file's contents with the header synchronized: the matched previous
/// header is stripped, years are resolved, and the new header is prepended.
fn updated_contents(change_set: &ChangeSet, change: &FileChange, contents: &str) -> Result<String> {
  let (existing_header, remainder) = match change_set.header_regex.find(contents) {
    Some(matched) => {
      let mut stripped = String::with_capacity(contents.len());
      stripped.push_str(&contents[..matched.start()]);
      stripped.push_str(&contents[matched.end()..]);
      (matched.as_str().to_string(), stripped)
    }
    None => (String::new(), contents.to_string()),
  };
  let remainder = remainder.trim_start_matches('\n');

  let years = compute_copyright_years(change, &existing_header);
  let final_header = resolve_years(&change_set.header_contents, &years).context("cannot render copyright years")?;

  Ok(format!("{final_header}\n\n{remainder}"))
}
