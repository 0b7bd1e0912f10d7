//! # Environment Module
//!
//! Bundles the system dependencies of a run behind one struct so that the
//! resolver, tracker and rewriter can be driven by fakes in tests.

use chrono::{DateTime, Local};

use crate::fs::{FileSystem, OsFileSystem};
use crate::vcs::{Client, Git, VersioningClient};

/// Source of the current time.
pub trait Clock {
  fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Local> {
    Local::now()
  }
}

/// The system dependencies of one run.
pub struct Environment {
  pub versioning: Box<dyn VersioningClient>,
  pub file_system: Box<dyn FileSystem>,
  pub clock: Box<dyn Clock>,
}

impl Environment {
  /// The real environment: git subprocesses, the OS filesystem, and the
  /// system clock.
  pub fn system() -> Self {
    Self {
      versioning: Box::new(Client::new(Box::new(Git))),
      file_system: Box::new(OsFileSystem),
      clock: Box::new(SystemClock),
    }
  }
}
