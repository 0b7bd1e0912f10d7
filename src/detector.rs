//! # Detector Module
//!
//! Synthesizes the single regular expression that recognizes a previously
//! written header, whatever comment style, whitespace, punctuation, or
//! substituted data values were used to produce it.
//!
//! The synthesized pattern is case-insensitive and multi-line. Roughly, it is
//! built as:
//!
//! ```text
//! (?im)
//! <optional opening comment line, any style>
//! for each non-empty template line:
//!     <any number of commented empty lines>
//!     <optional continuation symbol> <fuzzy literal line> <optional punctuation> <optional newline>
//! <any number of commented empty lines>
//! <optional closing comment line, any style>
//! ```
//!
//! Template parameters present in the data map are replaced with a greedy
//! wildcard, so a header containing a different year or owner than today's
//! configuration still matches.

use std::collections::BTreeMap;

use crate::comment_style::{CommentStyle, Symbol, catalog};
use crate::template::{self, TemplateError};

/// Horizontal whitespace, i.e. any whitespace except `\n`.
const BLANK: &str = r"[\t\v\f\r ]*";

/// Sentinel substituted for template parameters before escaping; becomes a
/// greedy wildcard in the final pattern.
const WILDCARD_MARK: char = '\u{0}';

/// Builds the header-detection regex for the given template lines.
///
/// `lines` are the raw (pre-substitution) template lines; `data` lists the
/// template parameters that may have been substituted, whose values are
/// irrelevant for detection.
///
/// # Errors
///
/// Fails when a template line contains a malformed placeholder or references
/// a parameter absent from `data`, which indicates a broken configuration.
pub fn compute_detection_regex(lines: &[String], data: &BTreeMap<String, String>) -> Result<String, TemplateError> {
  let styles = catalog();
  let wildcards = wildcard_values(data);

  let mut pattern = String::from("(?im)");
  pattern.push_str(&opening_line(styles));
  for line in lines {
    if line.is_empty() {
      continue;
    }
    pattern.push_str(&commented_empty_lines(styles));
    pattern.push_str(&matching_line(line, styles, &wildcards)?);
  }
  pattern.push_str(&commented_empty_lines(styles));
  pattern.push_str(&closing_line(styles));

  Ok(pattern)
}

/// Maps every known template parameter to the wildcard sentinel.
fn wildcard_values(data: &BTreeMap<String, String>) -> BTreeMap<String, String> {
  data
    .keys()
    .map(|key| (key.clone(), WILDCARD_MARK.to_string()))
    .collect()
}

/// An optional line opening a comment block, in any style, e.g. `/*`.
fn opening_line(styles: &[CommentStyle]) -> String {
  let symbols = combine_symbols(styles, |style| &style.opening);
  format!("(?:{BLANK}{symbols}{BLANK}\n)?")
}

/// One required header line: optional continuation symbol, fuzzy whitespace,
/// the line's literal text, and optional trailing punctuation.
fn matching_line(line: &str, styles: &[CommentStyle], wildcards: &BTreeMap<String, String>) -> Result<String, TemplateError> {
  let symbols = combine_symbols(styles, |style| &style.continuation);
  let rendered = template::render(line, wildcards)?;
  let literal = normalize_line(&rendered);
  Ok(format!("{BLANK}{symbols}?{BLANK}{literal}[,.;:?!\\t\\v\\f\\r ]*\n?"))
}

/// An optional line closing a comment block, in any style, e.g. ` */`.
fn closing_line(styles: &[CommentStyle]) -> String {
  let symbols = combine_symbols(styles, |style| &style.closing);
  format!("(?:{BLANK}{symbols}{BLANK})?")
}

/// Any number of blank lines, each optionally carrying a continuation symbol.
///
/// This makes separator lines between header paragraphs insensitive to both
/// comment style and count.
fn commented_empty_lines(styles: &[CommentStyle]) -> String {
  let symbols = combine_symbols(styles, |style| &style.continuation);
  format!("(?:{symbols}?\n)*")
}

/// Alternation of one symbol across all styles, skipping styles that do not
/// define it. A symbol whose trailing space is optional gets that space
/// relaxed, since comment reformatters may drop it.
fn combine_symbols<F>(styles: &[CommentStyle], symbol_of: F) -> String
where
  F: Fn(&CommentStyle) -> &Symbol,
{
  let mut alternatives = Vec::new();
  for style in styles {
    let symbol = symbol_of(style);
    if !symbol.is_present() {
      continue;
    }
    let mut escaped = regex::escape(symbol.value);
    if symbol.optional && symbol.value.ends_with(' ') {
      escaped.push('?');
    }
    alternatives.push(escaped);
  }
  format!("(?:{})", alternatives.join("|"))
}

/// Turns one rendered template line into a fuzzy literal pattern.
///
/// - `,` `;` `:` `?` `!` each relax to any optional single character;
/// - a `.` relaxes the same way when it ends the line or is followed by a
///   space — interior dots that look numeric or structural stay literal.
///   This is a heuristic, not a tokenizer: without lookbehind there is no
///   cheap way to distinguish an ellipsis from a version number, and the
///   "followed by a space or last on the line" approximation is kept on
///   purpose so that the set of recognized real-world headers stays stable;
/// - runs of one horizontal whitespace character match one-or-more of it;
/// - the wildcard sentinel becomes a greedy `.*`;
/// - everything else is matched literally.
fn normalize_line(line: &str) -> String {
  let chars: Vec<char> = line.chars().collect();
  let mut pattern = String::with_capacity(line.len() * 2);

  let mut i = 0;
  while i < chars.len() {
    let c = chars[i];
    match c {
      ',' | ';' | ':' | '?' | '!' => pattern.push_str(".?"),
      '.' if i == chars.len() - 1 || chars[i + 1] == ' ' => pattern.push_str(".?"),
      ' ' | '\t' | '\u{b}' | '\u{c}' | '\r' => {
        while i + 1 < chars.len() && chars[i + 1] == c {
          i += 1;
        }
        pattern.push_str(match c {
          ' ' => " +",
          '\t' => "\\t+",
          '\u{b}' => "\\v+",
          '\u{c}' => "\\f+",
          _ => "\\r+",
        });
      }
      WILDCARD_MARK => pattern.push_str(".*"),
      _ => {
        let mut buffer = [0u8; 4];
        pattern.push_str(&regex::escape(c.encode_utf8(&mut buffer)));
      }
    }
    i += 1;
  }

  pattern
}

#[cfg(test)]
mod tests {
  use regex::Regex;

  use super::*;

  fn detection_regex(lines: &[&str], keys: &[&str]) -> Regex {
    let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    let data: BTreeMap<String, String> = keys.iter().map(|k| (k.to_string(), String::new())).collect();
    let pattern = compute_detection_regex(&lines, &data).unwrap();
    Regex::new(&pattern).unwrap()
  }

  #[test]
  fn detects_slash_slash_header() {
    let regex = detection_regex(&["Copyright {{.Year}} {{.Owner}}"], &["Year", "Owner"]);

    let contents = "// Copyright 2014 ACME\n\nfn main() {}\n";
    let matched = regex.find(contents).expect("header should be detected");

    assert_eq!(matched.as_str(), "// Copyright 2014 ACME\n\n");
  }

  #[test]
  fn detection_is_style_insensitive() {
    // the regex never depends on the style the header was written in
    let regex = detection_regex(&["Copyright {{.Year}} {{.Owner}}"], &["Year", "Owner"]);

    let block = "/*\n * Copyright 2014 ACME\n */\npackage main\n";
    let hash = "# Copyright 2014 ACME\nimport os\n";
    let xml = "<!--\nCopyright 2014 ACME\n-->\n<project/>\n";

    assert!(regex.is_match(block));
    assert!(regex.is_match(hash));
    assert!(regex.is_match(xml));
  }

  #[test]
  fn detection_tolerates_extra_whitespace_and_blank_lines() {
    let regex = detection_regex(&["Copyright {{.Year}} {{.Owner}}", "All rights reserved"], &["Year", "Owner"]);

    let contents = "/*\n *   Copyright   2014 ACME\t\n *\n *\n * All rights reserved\n */\n";

    assert!(regex.is_match(contents));
  }

  #[test]
  fn detection_tolerates_trailing_punctuation() {
    let regex = detection_regex(&["All rights reserved"], &[]);

    assert!(regex.is_match("// All rights reserved.\n"));
    assert!(regex.is_match("// All rights reserved!\n"));
    assert!(regex.is_match("// All rights reserved\n"));
  }

  #[test]
  fn template_punctuation_is_optional_in_files() {
    let regex = detection_regex(&["Licensed under the Apache License, Version 2.0"], &[]);

    assert!(regex.is_match("// Licensed under the Apache License Version 2.0\n"));
  }

  #[test]
  fn interior_numeric_dots_stay_literal() {
    let regex = detection_regex(&["Version 2.0 applies"], &[]);

    assert!(regex.is_match("// Version 2.0 applies\n"));
    assert!(!regex.is_match("// Version 2X0 applies\n"));
  }

  #[test]
  fn substituted_values_are_wildcards() {
    let regex = detection_regex(&["Copyright {{.Year}} {{.Owner}}"], &["Year", "Owner"]);

    assert!(regex.is_match("// Copyright 2002-2020 Someone Else\n"));
    assert!(regex.is_match("// copyright 1999 acme\n"));
  }

  #[test]
  fn blank_template_lines_are_skipped() {
    let regex = detection_regex(&["First", "", "Second"], &[]);

    assert!(regex.is_match("// First\n// Second\n"));
    assert!(regex.is_match("// First\n//\n//\n// Second\n"));
  }

  #[test]
  fn continuation_symbol_trailing_space_is_optional() {
    let regex = detection_regex(&["Copyright ACME"], &[]);

    // a reflowed block comment may drop the space after the star
    assert!(regex.is_match("/*\n *Copyright ACME\n */\n"));
  }

  #[test]
  fn unknown_parameter_is_an_error() {
    let lines = vec!["Copyright {{.Unknown}}".to_string()];
    let result = compute_detection_regex(&lines, &BTreeMap::new());

    assert!(matches!(result, Err(TemplateError::UndefinedParameter { .. })));
  }

  #[test]
  fn malformed_placeholder_is_an_error() {
    let lines = vec!["Copyright {{.Year".to_string()];
    let data: BTreeMap<String, String> = [("Year".to_string(), String::new())].into();

    let result = compute_detection_regex(&lines, &data);

    assert!(matches!(result, Err(TemplateError::Unterminated)));
  }
}
