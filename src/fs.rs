//! # Filesystem Module
//!
//! The small filesystem port consumed by the execution tracker.
//!
//! The tracker needs three operations: read a file, overwrite a file with a
//! given permission mode, and stat a path to decide whether it exists and is
//! a regular file. Keeping these behind a trait lets tracker behavior be
//! tested without touching the real filesystem.

use std::path::Path;

use anyhow::{Context, Result};

/// Default mode for freshly created tracker records: private to the owner.
pub const DEFAULT_TRACKER_MODE: u32 = 0o600;

/// Minimal stat result: existence is signalled by `Option` at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
  /// Whether the path is a regular file (as opposed to a directory, symlink
  /// target, etc.).
  pub is_file: bool,

  /// Unix permission bits.
  pub mode: u32,
}

/// Filesystem operations needed by the execution tracker.
pub trait FileSystem {
  /// Reads a file to a string.
  fn read_to_string(&self, path: &Path) -> Result<String>;

  /// Creates or truncates `path` with `contents`, applying `mode`.
  fn write(&self, path: &Path, contents: &str, mode: u32) -> Result<()>;

  /// Stats a path; `Ok(None)` when it does not exist.
  fn stat(&self, path: &Path) -> Result<Option<FileStat>>;
}

/// The real filesystem.
#[derive(Debug, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
  fn read_to_string(&self, path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
  }

  fn write(&self, path: &Path, contents: &str, mode: u32) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))?;
    apply_mode(path, mode)
  }

  fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
    match std::fs::metadata(path) {
      Ok(metadata) => Ok(Some(FileStat {
        is_file: metadata.is_file(),
        mode: mode_bits(&metadata),
      })),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e).with_context(|| format!("failed to stat: {}", path.display())),
    }
  }
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;

  std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
    .with_context(|| format!("failed to set permissions on: {}", path.display()))
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> Result<()> {
  Ok(())
}

#[cfg(unix)]
fn mode_bits(metadata: &std::fs::Metadata) -> u32 {
  use std::os::unix::fs::PermissionsExt;

  metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn mode_bits(_metadata: &std::fs::Metadata) -> u32 {
  DEFAULT_TRACKER_MODE
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stat_reports_missing_paths_as_none() {
    let fs = OsFileSystem;

    let stat = fs.stat(Path::new("definitely/not/a/real/path")).unwrap();

    assert!(stat.is_none());
  }

  #[test]
  fn write_applies_the_requested_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("record");
    let fs = OsFileSystem;

    fs.write(&path, "contents", 0o640).unwrap();

    let stat = fs.stat(&path).unwrap().unwrap();
    assert!(stat.is_file);
    #[cfg(unix)]
    assert_eq!(stat.mode, 0o640);
    assert_eq!(fs.read_to_string(&path).unwrap(), "contents");
  }

  #[test]
  fn stat_reports_directories_as_non_files() {
    let dir = tempfile::tempdir().unwrap();
    let fs = OsFileSystem;

    let stat = fs.stat(dir.path()).unwrap().unwrap();

    assert!(!stat.is_file);
  }
}
