//! # jsv-cli — Validation Runner
//!
//! The `jsv` binary validates YAML and JSON files against a JSON Schema in
//! a CI step and reports through workflow commands.
//!
//! ## Modules
//!
//! - [`config`] — inputs from flags or `INPUT_*` variables, resolved once
//! - [`glob`] — lazy, deterministic expansion of the `files` patterns
//! - [`run`] — schema resolution, the per-file loop, the `valid` output,
//!   and the top-level error boundary
//! - [`report`] — the workflow command [`jsv_core::Reporter`]
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the run itself.
//! - Validation semantics live in `jsv-schema`; remote resolution in
//!   `jsv-remote`. This crate sequences them.

pub mod config;
pub mod glob;
pub mod report;
pub mod run;

pub use config::{Cli, ConfigError, RunConfig, SchemaSource};
pub use glob::{FileMatcher, PatternError};
pub use report::WorkflowReporter;
pub use run::{execute, finish, run, validate_files, RunError, RunOutcome};
