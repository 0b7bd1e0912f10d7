//! # Header Module
//!
//! Header template types and the first-pass renderer.
//!
//! A [`VersionedHeaderTemplate`] pairs the template as configured *now* with
//! the template used at the *previous* tracked execution. The current side
//! drives rendering; the previous side drives detection, since what exists on
//! disk was written by the previous configuration. Comparing the two sides
//! also decides whether an incremental scan is sound (see
//! [`VersionedHeaderTemplate::requires_full_scan`]).

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::comment_style::{CommentStyle, apply_comments};
use crate::detector::compute_detection_regex;
use crate::template;
use crate::years::YearSpan;

/// Parameter names injected by the renderer itself; user configuration must
/// not supply them.
pub const RESERVED_PARAMETERS: [&str; 4] = ["Year", "YearRange", "StartYear", "EndYear"];

/// One point-in-time view of the header source text and its substitution
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTemplate {
  pub lines: Vec<String>,
  pub data: BTreeMap<String, String>,
}

impl HeaderTemplate {
  /// Builds a template from the raw contents of a header file.
  pub fn from_contents(contents: &str, data: BTreeMap<String, String>) -> Self {
    Self {
      lines: template_lines(contents),
      data,
    }
  }
}

/// Splits header file contents into template lines, dropping the trailing
/// newline so the last line does not become an empty template line.
pub fn template_lines(contents: &str) -> Vec<String> {
  contents.trim_end_matches('\n').split('\n').map(String::from).collect()
}

/// The current and previous header templates, plus the revision the previous
/// one was recorded at.
///
/// `revision` is empty when no prior execution is known; in that case
/// `current` and `previous` are identical, since there is no history to
/// diverge from.
#[derive(Debug, Clone)]
pub struct VersionedHeaderTemplate {
  pub current: HeaderTemplate,
  pub previous: HeaderTemplate,
  pub revision: String,
}

impl VersionedHeaderTemplate {
  /// Builds the trivial versioned template for a repository with no tracked
  /// execution: previous == current, empty revision.
  pub fn untracked(current: HeaderTemplate) -> Self {
    Self {
      previous: current.clone(),
      current,
      revision: String::new(),
    }
  }

  /// Whether an incremental scan would be unsound, forcing a full scan.
  ///
  /// True when there is no known previous execution, when the template lines
  /// changed, or when the *set* of data keys changed. Data values are
  /// irrelevant: detection treats every substituted value as a wildcard, so
  /// only the key set shapes the detection regex.
  pub fn requires_full_scan(&self) -> bool {
    self.revision.is_empty()
      || self.current.lines != self.previous.lines
      || !self.current.data.keys().eq(self.previous.data.keys())
  }
}

/// The two derived artifacts of a run: the header text to write (years still
/// unresolved) and the regex that recognizes previously written headers.
///
/// Recomputed every run, never persisted.
#[derive(Debug)]
pub struct ParsedTemplate {
  /// The commented header with owner/project data substituted; the reserved
  /// year placeholders remain for the per-file second pass.
  pub rendered_content: String,

  /// Detection regex built from the *previous* template.
  pub detection_regex: Regex,
}

impl ParsedTemplate {
  /// Resolves the year placeholders for one file, completing the second
  /// rendering pass.
  pub fn resolve_years(&self, years: &YearSpan) -> Result<String> {
    crate::years::resolve_years(&self.rendered_content, years).context("cannot render copyright years")
  }
}

/// Renders the header in the chosen style and synthesizes the detection
/// regex.
///
/// # Errors
///
/// Fails when the user configuration supplies a reserved parameter, or when
/// either template fails to render — both indicate a malformed configuration.
pub fn parse_template(versioned: &VersionedHeaderTemplate, style: &CommentStyle) -> Result<ParsedTemplate> {
  reject_reserved_parameters(&versioned.current.data)?;

  let current_data = inject_reserved_year_parameters(&versioned.current.data);
  let commented = apply_comments(&versioned.current.lines, style);
  let rendered_content =
    template::render(&commented.join("\n"), &current_data).context("cannot render header template")?;

  let previous_data = inject_reserved_year_parameters(&versioned.previous.data);
  let pattern = compute_detection_regex(&versioned.previous.lines, &previous_data)
    .context("cannot compute header detection regex")?;
  let detection_regex = Regex::new(&pattern).context("cannot compile header detection regex")?;

  Ok(ParsedTemplate {
    rendered_content,
    detection_regex,
  })
}

/// Fails when user-supplied data contains a reserved parameter name.
fn reject_reserved_parameters(data: &BTreeMap<String, String>) -> Result<()> {
  for reserved in RESERVED_PARAMETERS {
    if data.contains_key(reserved) {
      bail!("configuration error: template parameter '{reserved}' is reserved and cannot be set");
    }
  }
  Ok(())
}

/// Injects the reserved year parameters as self-referential placeholders.
///
/// The rendered header keeps `{{.YearRange}}`, `{{.StartYear}}` and
/// `{{.EndYear}}` intact for the per-file second pass. `Year` maps onto
/// `YearRange` so that older templates written against it keep working.
fn inject_reserved_year_parameters(data: &BTreeMap<String, String>) -> BTreeMap<String, String> {
  let mut result = data.clone();
  result.insert("Year".to_string(), "{{.YearRange}}".to_string());
  result.insert("YearRange".to_string(), "{{.YearRange}}".to_string());
  result.insert("StartYear".to_string(), "{{.StartYear}}".to_string());
  result.insert("EndYear".to_string(), "{{.EndYear}}".to_string());
  result
}
