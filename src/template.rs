//! # Template Module
//!
//! A minimal placeholder-substitution engine for header templates.
//!
//! Header templates use `{{.Name}}` placeholders, matching the syntax of the
//! configuration files this tool consumes. Substitution is a plain map lookup:
//! parameter names are case-sensitive, and referencing a parameter that is not
//! in the data map is an error rather than an empty expansion, so a typo in a
//! header template is caught before any file is touched.

use std::collections::BTreeMap;

/// Error type for template parsing and rendering.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
  /// A `{{` marker was never closed by `}}`.
  #[error("unterminated '{{{{' placeholder in header template")]
  Unterminated,

  /// A placeholder did not have the `{{.Name}}` shape.
  #[error("malformed placeholder '{{{{{placeholder}}}}}' in header template")]
  Malformed { placeholder: String },

  /// A placeholder referenced a parameter absent from the data map.
  #[error("unknown template parameter '{name}'")]
  UndefinedParameter { name: String },
}

/// Renders `text` by replacing each `{{.Name}}` placeholder with the value
/// mapped under `Name`.
///
/// # Errors
///
/// Returns an error if a placeholder is unterminated, malformed, or names a
/// parameter missing from `data`.
pub fn render(text: &str, data: &BTreeMap<String, String>) -> Result<String, TemplateError> {
  let mut output = String::with_capacity(text.len());
  let mut rest = text;

  while let Some(start) = rest.find("{{") {
    output.push_str(&rest[..start]);
    let after = &rest[start + 2..];
    let Some(end) = after.find("}}") else {
      return Err(TemplateError::Unterminated);
    };

    let inner = after[..end].trim();
    let name = parse_parameter_name(inner)?;
    let value = data
      .get(name)
      .ok_or_else(|| TemplateError::UndefinedParameter { name: name.to_string() })?;
    output.push_str(value);

    rest = &after[end + 2..];
  }

  output.push_str(rest);
  Ok(output)
}

/// Extracts the parameter name from the inside of a placeholder, e.g. `.Owner`
/// becomes `Owner`.
fn parse_parameter_name(inner: &str) -> Result<&str, TemplateError> {
  let name = inner.strip_prefix('.').ok_or_else(|| TemplateError::Malformed {
    placeholder: inner.to_string(),
  })?;

  if name.is_empty() || name.chars().any(|c| c.is_whitespace()) {
    return Err(TemplateError::Malformed {
      placeholder: inner.to_string(),
    });
  }

  Ok(name)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn data(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn substitutes_parameters() {
    let rendered = render("Copyright {{.Year}} {{.Owner}}", &data(&[("Year", "2022"), ("Owner", "ACME")]));

    assert_eq!(rendered.unwrap(), "Copyright 2022 ACME");
  }

  #[test]
  fn tolerates_inner_whitespace() {
    let rendered = render("Hello {{ .Owner }}", &data(&[("Owner", "ACME")]));

    assert_eq!(rendered.unwrap(), "Hello ACME");
  }

  #[test]
  fn parameter_names_are_case_sensitive() {
    let result = render("{{.owner}}", &data(&[("Owner", "ACME")]));

    assert!(matches!(result, Err(TemplateError::UndefinedParameter { name }) if name == "owner"));
  }

  #[test]
  fn rejects_unterminated_placeholder() {
    let result = render("Copyright {{.Year", &data(&[("Year", "2022")]));

    assert!(matches!(result, Err(TemplateError::Unterminated)));
  }

  #[test]
  fn rejects_placeholder_without_leading_dot() {
    let result = render("{{Year}}", &data(&[("Year", "2022")]));

    assert!(matches!(result, Err(TemplateError::Malformed { .. })));
  }

  #[test]
  fn leaves_plain_text_untouched() {
    let rendered = render("no placeholders here", &BTreeMap::new());

    assert_eq!(rendered.unwrap(), "no placeholders here");
  }
}
