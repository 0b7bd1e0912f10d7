//! # Resolver Module
//!
//! Turns a configuration into the [`ChangeSet`] the rewriter consumes: the
//! rendered header, the detection regex, and the files to process.
//!
//! The file list is built incrementally when possible. If the template
//! structure and parameter set are unchanged since the tracked execution,
//! only files changed since that revision are considered; otherwise the whole
//! tree is scanned against the include/exclude patterns.

use anyhow::{Context, Result};
use regex::Regex;

use crate::comment_style::{find_style, supported_style_names};
use crate::config::{ConfigError, Configuration};
use crate::environment::Environment;
use crate::header::{VersionedHeaderTemplate, parse_template};
use crate::info_log;
use crate::path_matcher::PathMatcher;
use crate::tracker::ExecutionTracker;
use crate::vcs::FileChange;

/// Everything one run needs to rewrite headers.
#[derive(Debug)]
pub struct ChangeSet {
  /// The rendered header, year placeholders still pending.
  pub header_contents: String,

  /// Regex recognizing headers written by the previous template.
  pub header_regex: Regex,

  /// The files to process, ordered by path.
  pub files: Vec<FileChange>,
}

/// Resolves a configuration against VCS history and the filesystem.
pub struct ChangeSetResolver<'a> {
  environment: &'a Environment,
  path_matcher: &'a dyn PathMatcher,
}

impl<'a> ChangeSetResolver<'a> {
  pub fn new(environment: &'a Environment, path_matcher: &'a dyn PathMatcher) -> Self {
    Self {
      environment,
      path_matcher,
    }
  }

  /// Builds the [`ChangeSet`] for this run.
  pub fn resolve(&self, config: &Configuration) -> Result<ChangeSet> {
    let tracker = ExecutionTracker {
      versioning: self.environment.versioning.vcs(),
      file_system: self.environment.file_system.as_ref(),
      clock: self.environment.clock.as_ref(),
    };
    let versioned = tracker.retrieve_versioned_template(config)?;

    let style = find_style(&config.comment_style).ok_or_else(|| ConfigError::UnknownStyle {
      name: config.comment_style.clone(),
      supported: supported_style_names(),
    })?;
    let parsed = parse_template(&versioned, style)?;

    let files = self.affected_files(config, &versioned)?;
    let files = self
      .environment
      .versioning
      .add_metadata(files, self.environment.clock.as_ref())
      .context("cannot attach version history metadata")?;

    Ok(ChangeSet {
      header_contents: parsed.rendered_content,
      header_regex: parsed.detection_regex,
      files,
    })
  }

  fn affected_files(&self, config: &Configuration, versioned: &VersionedHeaderTemplate) -> Result<Vec<FileChange>> {
    if versioned.requires_full_scan() {
      if versioned.revision.is_empty() {
        info_log!("Unable to get last execution revision, triggering a full scan");
      } else {
        info_log!(
          "Configuration and/or license header template changed since last execution ({}), triggering a full scan",
          versioned.revision
        );
      }
      return self.path_matcher.scan_all_files(&config.includes, &config.excludes);
    }

    info_log!("Scanning changes since revision {}", versioned.revision);
    let changes = self.environment.versioning.get_changes(&versioned.revision)?;
    self.path_matcher.match_files(changes, &config.includes, &config.excludes)
  }
}
