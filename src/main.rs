//! # headsync
//!
//! A tool that keeps license header comments in a source tree synchronized
//! with a canonical template.

use anyhow::Result;

use headsync::cli::{Cli, run};

fn main() -> Result<()> {
  run(Cli::parse_args())
}
