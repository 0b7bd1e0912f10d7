//! End-to-end detection coverage over a realistic Apache-2.0 header: whatever
//! style, whitespace, punctuation or substituted data a header was written
//! with, the synthesized regex must recognize it, and re-rendering must be
//! stable.

use std::collections::BTreeMap;

use headsync::comment_style::find_style;
use headsync::header::{HeaderTemplate, VersionedHeaderTemplate, parse_template};
use headsync::years::YearSpan;

const APACHE_TEMPLATE: &str = r#"Copyright {{.YearRange}} {{.Owner}}

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License."#;

fn versioned_apache_template() -> VersionedHeaderTemplate {
  let mut data = BTreeMap::new();
  data.insert("Owner".to_string(), "ACME".to_string());
  VersionedHeaderTemplate::untracked(HeaderTemplate::from_contents(APACHE_TEMPLATE, data))
}

#[test]
fn rendered_block_header_is_recognized_by_its_own_regex() {
  let versioned = versioned_apache_template();
  let parsed = parse_template(&versioned, find_style("SlashStar").unwrap()).unwrap();

  let header = parsed.resolve_years(&YearSpan { start: 2016, end: 2022 }).unwrap();
  let file = format!("{header}\n\npub fn main() {{}}\n");

  let matched = parsed.detection_regex.find(&file).expect("header should be detected");
  assert_eq!(matched.start(), 0);
  assert!(matched.as_str().contains("Copyright 2016-2022 ACME"));
  assert!(matched.as_str().trim_end().ends_with("*/"));
}

#[test]
fn header_written_in_a_different_style_is_recognized() {
  let versioned = versioned_apache_template();
  let parsed = parse_template(&versioned, find_style("SlashStar").unwrap()).unwrap();

  let hash_style = parse_template(&versioned, find_style("Hash").unwrap())
    .unwrap()
    .resolve_years(&YearSpan { start: 2019, end: 2019 })
    .unwrap();
  let file = format!("{hash_style}\n\nimport os\n");

  assert!(parsed.detection_regex.is_match(&file));
}

#[test]
fn header_with_different_data_is_recognized() {
  let versioned = versioned_apache_template();
  let parsed = parse_template(&versioned, find_style("SlashSlash").unwrap()).unwrap();

  // same template, different owner and years than today's configuration
  let mut other_data = BTreeMap::new();
  other_data.insert("Owner".to_string(), "Someone Else, Inc.".to_string());
  let other = VersionedHeaderTemplate::untracked(HeaderTemplate::from_contents(APACHE_TEMPLATE, other_data));
  let other_header = parse_template(&other, find_style("SlashSlash").unwrap())
    .unwrap()
    .resolve_years(&YearSpan { start: 2002, end: 2020 })
    .unwrap();

  assert!(parsed.detection_regex.is_match(&other_header));
}

#[test]
fn reformatted_header_is_recognized() {
  let versioned = versioned_apache_template();
  let parsed = parse_template(&versioned, find_style("SlashSlash").unwrap()).unwrap();

  // extra indentation, dropped punctuation, doubled blank comment lines
  let reformatted = "/*\n *  Copyright 2016 ACME\n *\n *\n \
                     * Licensed under the Apache License Version 2.0 (the \"License\")\n \
                     * you may not use this file except in compliance with the License\n \
                     * You may obtain a copy of the License at\n *\n \
                     *   http://www.apache.org/licenses/LICENSE-2.0\n *\n \
                     * Unless required by applicable law or agreed to in writing, software\n \
                     * distributed under the License is distributed on an \"AS IS\" BASIS,\n \
                     * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.\n \
                     * See the License for the specific language governing permissions and\n \
                     * limitations under the License.\n */\n";

  assert!(parsed.detection_regex.is_match(reformatted));
}

#[test]
fn unrelated_comments_are_not_mistaken_for_headers() {
  let versioned = versioned_apache_template();
  let parsed = parse_template(&versioned, find_style("SlashSlash").unwrap()).unwrap();

  let file = "// This module implements the frobnicator.\n//\n// It has nothing to do with licensing.\nfn f() {}\n";

  assert!(!parsed.detection_regex.is_match(file));
}

#[test]
fn rendering_detecting_and_rerendering_is_stable() {
  let versioned = versioned_apache_template();
  let parsed = parse_template(&versioned, find_style("SlashStar").unwrap()).unwrap();
  let years = YearSpan { start: 2016, end: 2022 };

  let header = parsed.resolve_years(&years).unwrap();
  let file = format!("{header}\n\nstruct S;\n");

  let matched = parsed.detection_regex.find(&file).unwrap();
  let stripped = file[matched.end()..].trim_start_matches('\n');
  let rewritten = format!("{}\n\n{stripped}", parsed.resolve_years(&years).unwrap());

  assert_eq!(rewritten, file);
}
