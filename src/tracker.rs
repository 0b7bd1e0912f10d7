//! # Tracker Module
//!
//! Records each successful run in a small file at the repository root and,
//! on the next run, reconstructs the header template that run used.
//!
//! The tracker record is committed alongside the sources, so its latest
//! revision *is* the revision of the previous execution. Its body carries the
//! configuration and header template of that execution, base64-encoded. Two
//! older record formats are still understood: an intermediate one naming the
//! configuration path (`configuration:<path>`), and the oldest one whose body
//! names nothing useful, in which case the current configuration path is
//! fetched back at the recorded revision.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use crate::config::Configuration;
use crate::environment::Clock;
use crate::fs::{DEFAULT_TRACKER_MODE, FileSystem};
use crate::header::{HeaderTemplate, VersionedHeaderTemplate, template_lines};
use crate::vcs::Vcs;

/// Name of the tracker record, resolved against the VCS root.
pub const TRACKER_FILE_NAME: &str = ".headache-run";

const ENCODED_CONFIGURATION_PREFIX: &str = "encoded_configuration:";
const ENCODED_HEADER_PREFIX: &str = "encoded_header:";
const LEGACY_CONFIGURATION_PREFIX: &str = "configuration:";

/// Reads and writes the per-repository execution record.
pub struct ExecutionTracker<'a> {
  pub versioning: &'a dyn Vcs,
  pub file_system: &'a dyn FileSystem,
  pub clock: &'a dyn Clock,
}

/// Outcome of one record-format parser: either it recognized and parsed the
/// body, or the body belongs to another format and the next parser should
/// run. Genuine failures inside a recognized format abort the chain.
enum ParseAttempt {
  Parsed(HeaderTemplate),
  WrongFormat,
}

impl ExecutionTracker<'_> {
  /// Reconstructs the current and previous header templates.
  ///
  /// Absent tracker record, or a record with no committed history, yields the
  /// trivial result where previous equals current and no revision is set.
  pub fn retrieve_versioned_template(&self, config: &Configuration) -> Result<VersionedHeaderTemplate> {
    let current_contents = self.file_system.read_to_string(Path::new(&config.header_file))?;
    let current = HeaderTemplate::from_contents(&current_contents, config.template_data.clone());

    let tracker_path = self.tracker_file_path()?;
    let Some(stat) = self.file_system.stat(&tracker_path)? else {
      debug!("no tracker record at {}", tracker_path.display());
      return Ok(VersionedHeaderTemplate::untracked(current));
    };
    if !stat.is_file {
      bail!("'{}' should be a regular file", tracker_path.display());
    }

    let revision = self
      .versioning
      .latest_revision(&tracker_path.to_string_lossy())
      .context("could not detect previous execution's revision")?;
    if revision.is_empty() {
      return Ok(VersionedHeaderTemplate::untracked(current));
    }

    let body = self.file_system.read_to_string(&tracker_path)?;
    let previous = self.parse_record_body(&body, &revision, config)?;

    Ok(VersionedHeaderTemplate {
      current,
      previous,
      revision,
    })
  }

  /// Overwrites the tracker record after a successful run.
  ///
  /// Permission bits of an existing record are preserved; a fresh record is
  /// private to the owner.
  pub fn track_execution(&self, config_path: &Path) -> Result<()> {
    let tracker_path = self.tracker_file_path()?;
    let mode = match self.file_system.stat(&tracker_path)? {
      Some(stat) if !stat.is_file => bail!("'{}' should be a regular file", tracker_path.display()),
      Some(stat) => stat.mode,
      None => DEFAULT_TRACKER_MODE,
    };

    let config_contents = self.file_system.read_to_string(config_path)?;
    let config: Configuration =
      serde_json::from_str(&config_contents).context("cannot unmarshal configuration")?;
    let header_contents = self.file_system.read_to_string(Path::new(&config.header_file))?;

    let contents = format!(
      "# Generated by headache | {} -- commit me!\n{ENCODED_CONFIGURATION_PREFIX}{}\n{ENCODED_HEADER_PREFIX}{}\n",
      self.clock.now().timestamp(),
      BASE64.encode(&config_contents),
      BASE64.encode(&header_contents),
    );

    debug!("writing tracker record to {}", tracker_path.display());
    self.file_system.write(&tracker_path, &contents, mode)
  }

  fn tracker_file_path(&self) -> Result<PathBuf> {
    let root = self.versioning.root()?;
    Ok(Path::new(&root).join(TRACKER_FILE_NAME))
  }

  /// Tries each known record format in order, newest first.
  fn parse_record_body(&self, body: &str, revision: &str, config: &Configuration) -> Result<HeaderTemplate> {
    if let ParseAttempt::Parsed(template) = self.parse_encoded_record(body)? {
      return Ok(template);
    }
    if let ParseAttempt::Parsed(template) = self.parse_legacy_record(body, revision)? {
      return Ok(template);
    }
    self.parse_oldest_record(revision, config)
  }

  /// Current format: `encoded_configuration:` / `encoded_header:` lines.
  fn parse_encoded_record(&self, body: &str) -> Result<ParseAttempt> {
    let Some(encoded_config) = line_value(body, ENCODED_CONFIGURATION_PREFIX) else {
      return Ok(ParseAttempt::WrongFormat);
    };

    let config_bytes = BASE64
      .decode(encoded_config)
      .map_err(|e| anyhow::anyhow!("could not decode encoded configuration: {e}"))?;
    let config: Configuration = serde_json::from_slice(&config_bytes)
      .map_err(|e| anyhow::anyhow!("could not unmarshal decoded configuration: {e}"))?;

    let Some(encoded_header) = line_value(body, ENCODED_HEADER_PREFIX) else {
      bail!("cannot retrieve encoded header template");
    };
    let header_bytes = BASE64
      .decode(encoded_header)
      .map_err(|e| anyhow::anyhow!("could not decode encoded header template: {e}"))?;
    let header_contents = String::from_utf8_lossy(&header_bytes);

    Ok(ParseAttempt::Parsed(HeaderTemplate::from_contents(
      &header_contents,
      config.template_data,
    )))
  }

  /// Intermediate format: `configuration:<path>`, fetched back at the
  /// recorded revision along with the header file it declares.
  fn parse_legacy_record(&self, body: &str, revision: &str) -> Result<ParseAttempt> {
    let Some(config_path) = line_value(body, LEGACY_CONFIGURATION_PREFIX) else {
      return Ok(ParseAttempt::WrongFormat);
    };

    let config_contents = self.versioning.show_content_at_revision(config_path, revision)?;
    let config: Configuration = serde_json::from_str(&config_contents)?;
    let header_contents = self.versioning.show_content_at_revision(&config.header_file, revision)?;

    Ok(ParseAttempt::Parsed(HeaderTemplate {
      lines: template_lines(&header_contents),
      data: config.template_data,
    }))
  }

  /// Oldest format: the body names nothing useful, so the current
  /// configuration's own path is fetched back at the recorded revision.
  fn parse_oldest_record(&self, revision: &str, config: &Configuration) -> Result<HeaderTemplate> {
    let Some(config_path) = config.path.as_deref() else {
      bail!("cannot resolve previous execution: configuration has no known path");
    };

    let previous_contents = self
      .versioning
      .show_content_at_revision(&config_path.to_string_lossy(), revision)?;
    let previous_config: Configuration = serde_json::from_str(&previous_contents)?;

    Ok(HeaderTemplate {
      lines: template_lines(&previous_contents),
      data: previous_config.template_data,
    })
  }
}

/// First line of `body` starting with `prefix`, with the prefix stripped.
fn line_value<'b>(body: &'b str, prefix: &str) -> Option<&'b str> {
  body.lines().find_map(|line| line.strip_prefix(prefix))
}
