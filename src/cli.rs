//! # CLI Module
//!
//! Command-line interface: argument parsing with clap and the top-level run
//! orchestration tying resolver, rewriter and tracker together.

use std::path::PathBuf;
use std::process;
use std::sync::LazyLock;

use anyhow::Result;
use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use tracing::warn;

use crate::config::{Configuration, DEFAULT_CONFIG_FILENAME};
use crate::environment::Environment;
use crate::info_log;
use crate::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use crate::path_matcher::GlobPathMatcher;
use crate::resolver::ChangeSetResolver;
use crate::rewriter::HeaderRewriter;
use crate::tracker::ExecutionTracker;

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Version string enriched with the commit embedded at build time, when the
/// build ran inside a git checkout.
fn long_version() -> &'static str {
  static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    let mut version = env!("CARGO_PKG_VERSION").to_string();
    if let (Some(hash), Some(date)) = (option_env!("GIT_HASH"), option_env!("GIT_DATE"))
      && !hash.is_empty()
    {
      version.push_str(&format!(" ({hash} {date})"));
    }
    version
  });
  LONG_VERSION.as_str()
}

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  long_version = long_version(),
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Synchronize headers of files changed since the last run
  headsync

  # Use an alternate configuration file
  headsync --configuration ci/headsync.json

  # Verify headers without modifying any file (CI mode)
  headsync --check
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  /// Path to the configuration file
  #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILENAME)]
  pub configuration: PathBuf,

  /// Report files whose headers are out of date without modifying them;
  /// exits with a non-zero status when any are found
  #[arg(long)]
  pub check: bool,

  /// Enable verbose output (repeat for more detail)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress informational output
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

/// Runs the tool with the given arguments.
pub fn run(args: Cli) -> Result<()> {
  init_tracing(args.quiet, args.verbose);
  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  let config = Configuration::load(&args.configuration)?;
  let environment = Environment::system();
  let path_matcher = GlobPathMatcher::default();

  let resolver = ChangeSetResolver::new(&environment, &path_matcher);
  let change_set = resolver.resolve(&config)?;

  if change_set.files.is_empty() {
    info_log!("No files to process");
    return Ok(());
  }

  let rewriter = HeaderRewriter;
  if args.check {
    let report = rewriter.dry_run(&change_set)?;
    if !report.is_empty() {
      eprintln!("Headers are not up-to-date!");
      eprint!("{report}");
      process::exit(1);
    }
    info_log!("Check successful!");
    return Ok(());
  }

  rewriter.run(&change_set)?;

  // the run itself succeeded; a tracking failure only degrades the next run
  // to a full scan
  let tracker = ExecutionTracker {
    versioning: environment.versioning.vcs(),
    file_system: environment.file_system.as_ref(),
    clock: environment.clock.as_ref(),
  };
  if let Err(e) = tracker.track_execution(&args.configuration) {
    warn!("could not track execution: {e:#}");
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn cli_arguments_are_well_formed() {
    Cli::command().debug_assert();
  }

  #[test]
  fn long_version_starts_with_the_package_version() {
    let rendered = Cli::command().render_long_version();

    assert!(rendered.to_string().contains(env!("CARGO_PKG_VERSION")));
  }

  #[test]
  fn configuration_defaults_to_the_conventional_file_name() {
    let cli = Cli::parse_from(["headsync"]);

    assert_eq!(cli.configuration, PathBuf::from(DEFAULT_CONFIG_FILENAME));
    assert!(!cli.check);
    assert!(!cli.quiet);
    assert_eq!(cli.verbose, 0);
  }

  #[test]
  fn check_and_verbosity_flags_parse() {
    let cli = Cli::parse_from(["headsync", "--check", "-vv", "--colors", "never"]);

    assert!(cli.check);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.colors, ColorMode::Never);
  }
}
