//! # Workflow Command Reporter
//!
//! Renders diagnostics as CI workflow commands on stdout:
//!
//! ```text
//! ::debug::✓ configs/a.yml is valid
//! ::warning::Error while trying to restore cache: ...
//! ::error title=JSON Schema Validation Error,file=configs/b.yml::Error while validating file: ...
//! ```
//!
//! Outputs are appended as `name=value` lines to the file named by
//! `GITHUB_OUTPUT`, or printed when it is unset. Every emission is mirrored
//! into `tracing`.

use std::io::Write;
use std::path::{Path, PathBuf};

use jsv_core::{Annotation, Reporter};

/// Environment variable naming the outputs file.
pub const GITHUB_OUTPUT_VAR: &str = "GITHUB_OUTPUT";

/// Escape a command message.
pub fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Escape a command property value.
pub fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

fn annotation_properties(annotation: &Annotation) -> String {
    let mut props = Vec::new();
    if let Some(title) = &annotation.title {
        props.push(format!("title={}", escape_property(title)));
    }
    if let Some(file) = &annotation.file {
        props.push(format!("file={}", escape_property(file)));
    }
    props.join(",")
}

pub struct WorkflowReporter<W: Write> {
    out: W,
    output_file: Option<PathBuf>,
    failed: bool,
}

impl WorkflowReporter<std::io::Stdout> {
    /// Reporter on stdout, writing outputs to `GITHUB_OUTPUT` when set.
    pub fn from_env() -> Self {
        let output_file = std::env::var_os(GITHUB_OUTPUT_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::new(std::io::stdout(), output_file)
    }
}

impl<W: Write> WorkflowReporter<W> {
    pub fn new(out: W, output_file: Option<PathBuf>) -> Self {
        Self {
            out,
            output_file,
            failed: false,
        }
    }

    /// Whether `set_failed` was called.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn command(&mut self, command: &str, properties: &str, message: &str) {
        let line = if properties.is_empty() {
            format!("::{command}::{}", escape_data(message))
        } else {
            format!("::{command} {properties}::{}", escape_data(message))
        };
        if let Err(e) = writeln!(self.out, "{line}") {
            tracing::warn!("failed to write workflow command: {e}");
        }
    }

    fn append_output(path: &Path, name: &str, value: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{name}={value}")
    }
}

impl<W: Write> Reporter for WorkflowReporter<W> {
    fn debug(&mut self, message: &str) {
        tracing::debug!("{message}");
        self.command("debug", "", message);
    }

    fn warning(&mut self, message: &str) {
        tracing::warn!("{message}");
        self.command("warning", "", message);
    }

    fn error(&mut self, message: &str, annotation: &Annotation) {
        tracing::error!(
            title = annotation.title.as_deref(),
            file = annotation.file.as_deref(),
            "{message}"
        );
        let props = annotation_properties(annotation);
        self.command("error", &props, message);
    }

    fn set_output(&mut self, name: &str, value: &str) {
        tracing::info!(name, value, "output set");
        match self.output_file.clone() {
            Some(path) => {
                if let Err(e) = Self::append_output(&path, name, value) {
                    tracing::warn!(path = %path.display(), "failed to write output: {e}");
                }
            }
            None => {
                if let Err(e) = writeln!(self.out, "{name}={value}") {
                    tracing::warn!("failed to write output: {e}");
                }
            }
        }
    }

    fn set_failed(&mut self, message: &str) {
        tracing::error!("{message}");
        self.failed = true;
        self.command("error", "", message);
    }
}
