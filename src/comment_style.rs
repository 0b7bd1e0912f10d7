//! # Comment Style Module
//!
//! The closed catalog of comment syntaxes that headers can be written in.
//!
//! Each style is described by three symbols: an opening line, a per-line
//! continuation prefix, and a closing line. Line-comment styles such as
//! `SlashSlash` only carry a continuation symbol. The catalog is a constant
//! table, ordered by style name, and is consumed both by the header renderer
//! (which applies one chosen style) and by the detection-regex synthesizer
//! (which must recognize headers written in *any* style).

/// One comment symbol: its literal text plus whether its trailing space may be
/// dropped by code formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
  /// The literal symbol text; empty when the style has no such symbol.
  pub value: &'static str,

  /// Whether the symbol's trailing space is optional when matching.
  ///
  /// Mid-block lines are sometimes reflowed without the space after the
  /// comment marker (e.g. `*` instead of `* `), so detection must not require
  /// it.
  pub optional: bool,
}

impl Symbol {
  const fn none() -> Self {
    Self {
      value: "",
      optional: false,
    }
  }

  const fn required(value: &'static str) -> Self {
    Self { value, optional: false }
  }

  const fn relaxed(value: &'static str) -> Self {
    Self { value, optional: true }
  }

  /// Returns `true` when the style defines this symbol.
  pub const fn is_present(&self) -> bool {
    !self.value.is_empty()
  }
}

/// A supported comment style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentStyle {
  /// The style name used in configuration files (matched case-insensitively).
  pub name: &'static str,

  /// Symbol opening a comment block, e.g. `/*`.
  pub opening: Symbol,

  /// Symbol prefixed to every commented line, e.g. `// ` or ` * `.
  pub continuation: Symbol,

  /// Symbol closing a comment block, e.g. ` */`.
  pub closing: Symbol,
}

/// The supported styles, ordered by name.
///
/// The ordering is part of the contract: the detection regex enumerates the
/// catalog, and a stable order keeps the synthesized pattern deterministic.
const CATALOG: &[CommentStyle] = &[
  CommentStyle {
    name: "DashDash",
    opening: Symbol::none(),
    continuation: Symbol::relaxed("-- "),
    closing: Symbol::none(),
  },
  CommentStyle {
    name: "Hash",
    opening: Symbol::none(),
    continuation: Symbol::relaxed("# "),
    closing: Symbol::none(),
  },
  CommentStyle {
    name: "Rem",
    opening: Symbol::none(),
    continuation: Symbol::relaxed("REM "),
    closing: Symbol::none(),
  },
  CommentStyle {
    name: "SemiColon",
    opening: Symbol::none(),
    continuation: Symbol::relaxed("; "),
    closing: Symbol::none(),
  },
  CommentStyle {
    name: "SingleQuote",
    opening: Symbol::none(),
    continuation: Symbol::relaxed("' "),
    closing: Symbol::none(),
  },
  CommentStyle {
    name: "SlashSlash",
    opening: Symbol::none(),
    continuation: Symbol::relaxed("// "),
    closing: Symbol::none(),
  },
  CommentStyle {
    name: "SlashStar",
    opening: Symbol::required("/*"),
    continuation: Symbol::relaxed(" * "),
    closing: Symbol::required(" */"),
  },
  CommentStyle {
    name: "SlashStarStar",
    opening: Symbol::required("/**"),
    continuation: Symbol::relaxed(" * "),
    closing: Symbol::required(" */"),
  },
  CommentStyle {
    name: "Xml",
    opening: Symbol::required("<!--"),
    continuation: Symbol::none(),
    closing: Symbol::required("-->"),
  },
];

/// Returns the full style catalog, ordered by name.
pub const fn catalog() -> &'static [CommentStyle] {
  CATALOG
}

/// Looks a style up by name, case-insensitively.
pub fn find_style(name: &str) -> Option<&'static CommentStyle> {
  CATALOG.iter().find(|style| style.name.eq_ignore_ascii_case(name))
}

/// Returns the supported style names, for configuration error messages.
pub fn supported_style_names() -> Vec<&'static str> {
  CATALOG.iter().map(|style| style.name).collect()
}

/// Applies a comment style to raw header lines.
///
/// The opening and closing symbols become their own lines when present; every
/// template line is prefixed with the continuation symbol. An empty template
/// line gets the continuation symbol with trailing whitespace removed, so
/// rendered headers never carry trailing spaces.
pub fn apply_comments(lines: &[String], style: &CommentStyle) -> Vec<String> {
  let mut result = Vec::with_capacity(lines.len() + 2);

  if style.opening.is_present() {
    result.push(style.opening.value.to_string());
  }
  for line in lines {
    result.push(prepend_line(style, line));
  }
  if style.closing.is_present() {
    result.push(style.closing.value.to_string());
  }

  result
}

fn prepend_line(style: &CommentStyle, line: &str) -> String {
  let comment = style.continuation.value;
  if line.is_empty() {
    return comment.trim_end().to_string();
  }
  format!("{comment}{line}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn catalog_is_ordered_by_name() {
    let names = supported_style_names();
    let mut sorted = names.clone();
    sorted.sort_unstable();

    assert_eq!(names, sorted);
  }

  #[test]
  fn lookup_is_case_insensitive() {
    assert_eq!(find_style("slashstar").map(|s| s.name), Some("SlashStar"));
    assert_eq!(find_style("SLASHSLASH").map(|s| s.name), Some("SlashSlash"));
    assert!(find_style("Fortran").is_none());
  }

  #[test]
  fn applies_line_comment_style() {
    let style = find_style("SlashSlash").unwrap();
    let lines = vec!["Copyright 2022 ACME".to_string(), String::new(), "All rights reserved".to_string()];

    let commented = apply_comments(&lines, style);

    assert_eq!(commented, vec!["// Copyright 2022 ACME", "//", "// All rights reserved"]);
  }

  #[test]
  fn applies_block_comment_style() {
    let style = find_style("SlashStar").unwrap();
    let lines = vec!["Copyright 2022 ACME".to_string()];

    let commented = apply_comments(&lines, style);

    assert_eq!(commented, vec!["/*", " * Copyright 2022 ACME", " */"]);
  }

  #[test]
  fn empty_line_has_no_trailing_space() {
    let style = find_style("Hash").unwrap();

    let commented = apply_comments(&[String::new()], style);

    assert_eq!(commented, vec!["#"]);
  }
}
