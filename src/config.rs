//! # Configuration Module
//!
//! Loads and validates the JSON configuration driving a run.
//!
//! The configuration names the header template file, the comment style to
//! render it with, the include/exclude glob patterns selecting files, and the
//! data map substituted into the template. Validation happens at load time:
//! an unknown style name or a reserved template parameter is reported before
//! any file is touched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::comment_style::{find_style, supported_style_names};
use crate::header::RESERVED_PARAMETERS;

/// The default configuration file name.
pub const DEFAULT_CONFIG_FILENAME: &str = "headsync.json";

/// User configuration for one run.
#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
  /// Path to the header template file.
  #[serde(rename = "headerFile")]
  pub header_file: String,

  /// Name of the comment style to render the header with.
  #[serde(rename = "style", default = "default_style")]
  pub comment_style: String,

  /// Glob patterns selecting the files to process.
  #[serde(default)]
  pub includes: Vec<String>,

  /// Glob patterns excluding files from processing; excludes win over
  /// includes.
  #[serde(default)]
  pub excludes: Vec<String>,

  /// Template parameters substituted into the header.
  #[serde(rename = "data", default)]
  pub template_data: BTreeMap<String, String>,

  /// Where this configuration was loaded from; absent for configurations
  /// deserialized out of version-control history.
  #[serde(skip)]
  pub path: Option<PathBuf>,
}

fn default_style() -> String {
  "SlashStar".to_string()
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The configuration file could not be read.
  #[error("failed to read configuration file '{path}': {source}")]
  Read { path: PathBuf, source: std::io::Error },

  /// The configuration file contains invalid JSON.
  #[error("failed to parse configuration file '{path}': {source}")]
  Parse {
    path: PathBuf,
    source: serde_json::Error,
  },

  /// The configured comment style does not exist.
  #[error("unknown comment style '{name}', must be one of: {}", supported.join(", "))]
  UnknownStyle { name: String, supported: Vec<&'static str> },

  /// A reserved template parameter was supplied by the user.
  #[error("template parameter '{name}' is reserved and cannot be set")]
  ReservedParameter { name: String },
}

impl Configuration {
  /// Loads and validates a configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error when the file cannot be read or parsed, names an
  /// unknown comment style, or supplies a reserved template parameter.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    debug!("loading configuration from {}", path.display());

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;

    let mut config: Configuration = serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      source: e,
    })?;
    config.path = Some(path.to_path_buf());

    config.validate()?;
    Ok(config)
  }

  /// Validates the style name and template parameters.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if find_style(&self.comment_style).is_none() {
      return Err(ConfigError::UnknownStyle {
        name: self.comment_style.clone(),
        supported: supported_style_names(),
      });
    }

    for reserved in RESERVED_PARAMETERS {
      if self.template_data.contains_key(reserved) {
        return Err(ConfigError::ReservedParameter {
          name: reserved.to_string(),
        });
      }
    }

    Ok(())
  }
}
