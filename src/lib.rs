//! # headsync
//!
//! A tool that keeps license header comments in a source tree synchronized
//! with a canonical template.
//!
//! `headsync` rewrites source files in place. A previously written header is
//! recognized by a synthesized regular expression that is insensitive to the
//! comment style, whitespace, punctuation and substituted data it was written
//! with, so switching styles or owners never duplicates headers. Copyright
//! years come from git history, and a manually back-dated start year is
//! preserved.
//!
//! Each successful run is recorded in a tracker file at the repository root;
//! as long as the template and its parameter set are unchanged, the next run
//! only visits files changed since that recorded revision.
//!
//! ## Modules
//!
//! * [`cli`] - Argument parsing and run orchestration
//! * [`comment_style`] - The catalog of supported comment syntaxes
//! * [`config`] - JSON configuration loading and validation
//! * [`detector`] - Header-detection regex synthesis
//! * [`environment`] - System dependencies behind test seams
//! * [`fs`] - Filesystem port used by the tracker
//! * [`header`] - Header templates and first-pass rendering
//! * [`logging`] - User-facing output macros and tracing setup
//! * [`path_matcher`] - Glob-based file selection
//! * [`resolver`] - Change-set resolution (full vs incremental scan)
//! * [`rewriter`] - In-place header rewriting and dry-run diffs
//! * [`template`] - The `{{.Name}}` substitution engine
//! * [`tracker`] - Execution tracking across runs
//! * [`vcs`] - Git subprocess access and change discovery
//! * [`years`] - Copyright year computation and second-pass rendering

pub mod cli;
pub mod comment_style;
pub mod config;
pub mod detector;
pub mod environment;
pub mod fs;
pub mod header;
pub mod logging;
pub mod path_matcher;
pub mod resolver;
pub mod rewriter;
pub mod template;
pub mod tracker;
pub mod vcs;
pub mod years;
