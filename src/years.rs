//! # Years Module
//!
//! Computes the copyright year span for one file and performs the second
//! templating pass that resolves the reserved year placeholders.
//!
//! Rendering a header is a two-pass affair: the first pass (see
//! [`crate::header`]) fixes owner/project data and leaves the year
//! placeholders in place, because years are only known per file, from its
//! version-control history. This module owns the second pass.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::template::{self, TemplateError};
use crate::vcs::FileChange;

/// A year or year range pattern, e.g. `2014` or `2014-2022`.
static YEAR_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(\d{4})(?:\s*-\s*(\d{4}))?").expect("year pattern is valid"));

/// The start and end year of a file's copyright claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSpan {
  pub start: i32,
  pub end: i32,
}

impl YearSpan {
  /// Renders the span the way the `YearRange` placeholder expects: a single
  /// year when start and end coincide, `start-end` otherwise.
  pub fn range_string(&self) -> String {
    if self.start == self.end {
      self.start.to_string()
    } else {
      format!("{}-{}", self.start, self.end)
    }
  }
}

/// Computes the copyright years for a file.
///
/// `existing_header` is the text of the header region matched in the file as
/// it currently exists on disk (empty when no header was found). When it
/// carries a year earlier than the VCS-reported creation year, that year
/// wins: a manually back-dated header must survive a rewrite, and a start
/// year never moves forward.
///
/// The end year is the last edition year when it is known and differs from
/// the start year, and collapses onto the start year otherwise.
pub fn compute_copyright_years(change: &FileChange, existing_header: &str) -> YearSpan {
  let mut start = change.creation_year;

  if let Some(captures) = YEAR_PATTERN.captures(existing_header)
    && let Some(existing) = captures.get(1).and_then(|m| m.as_str().parse::<i32>().ok())
    && existing < start
  {
    start = existing;
  }

  let end = match change.last_edition_year {
    year if year != 0 && year != start => year,
    _ => start,
  };

  YearSpan { start, end }
}

/// Second templating pass: resolves `YearRange`, `StartYear` and `EndYear` in
/// an already-rendered header.
pub fn resolve_years(rendered_header: &str, years: &YearSpan) -> Result<String, TemplateError> {
  let mut data = BTreeMap::new();
  data.insert("YearRange".to_string(), years.range_string());
  data.insert("StartYear".to_string(), years.start.to_string());
  data.insert("EndYear".to_string(), years.end.to_string());
  template::render(rendered_header, &data)
}
