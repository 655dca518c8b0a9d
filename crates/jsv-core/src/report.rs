//! # Diagnostic Reporter Contract
//!
//! The sink every run writes its diagnostics to: debug traces, non-fatal
//! warnings, annotated error records, published outputs, and the terminal
//! failure signal. The binary renders these as CI workflow commands; tests
//! and embedders use [`MemoryReporter`].

use serde::{Deserialize, Serialize};

/// Optional context attached to an error record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Short title shown above the message.
    pub title: Option<String>,
    /// File the record refers to.
    pub file: Option<String>,
}

impl Annotation {
    /// An annotation with both a title and a file.
    pub fn new(title: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            file: Some(file.into()),
        }
    }

    /// True when neither a title nor a file is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.file.is_none()
    }
}

/// Structured diagnostic sink.
pub trait Reporter {
    /// Trace-level line, hidden unless debugging.
    fn debug(&mut self, message: &str);

    /// Non-fatal warning.
    fn warning(&mut self, message: &str);

    /// Error record with an optional title/file annotation. Not fatal by itself.
    fn error(&mut self, message: &str, annotation: &Annotation);

    /// Publish a named output value.
    fn set_output(&mut self, name: &str, value: &str);

    /// Report the fatal failure of the run. The run's exit status becomes 1.
    fn set_failed(&mut self, message: &str);
}

/// One recorded emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Emission {
    Debug { message: String },
    Warning { message: String },
    Error { message: String, annotation: Annotation },
    Output { name: String, value: String },
    Failed { message: String },
}

/// A [`Reporter`] that keeps every emission in memory, in order.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    emissions: Vec<Emission>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All emissions in the order they were made.
    pub fn emissions(&self) -> &[Emission] {
        &self.emissions
    }

    pub fn debugs(&self) -> Vec<&str> {
        self.emissions
            .iter()
            .filter_map(|e| match e {
                Emission::Debug { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.emissions
            .iter()
            .filter_map(|e| match e {
                Emission::Warning { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Error records with their annotations.
    pub fn errors(&self) -> Vec<(&str, &Annotation)> {
        self.emissions
            .iter()
            .filter_map(|e| match e {
                Emission::Error {
                    message,
                    annotation,
                } => Some((message.as_str(), annotation)),
                _ => None,
            })
            .collect()
    }

    /// Published outputs as `(name, value)` pairs.
    pub fn outputs(&self) -> Vec<(&str, &str)> {
        self.emissions
            .iter()
            .filter_map(|e| match e {
                Emission::Output { name, value } => Some((name.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Every failure message reported, in order.
    pub fn failures(&self) -> Vec<&str> {
        self.emissions
            .iter()
            .filter_map(|e| match e {
                Emission::Failed { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The most recent failure message, if any.
    pub fn last_failure(&self) -> Option<&str> {
        self.failures().last().copied()
    }
}

impl Reporter for MemoryReporter {
    fn debug(&mut self, message: &str) {
        self.emissions.push(Emission::Debug {
            message: message.to_string(),
        });
    }

    fn warning(&mut self, message: &str) {
        self.emissions.push(Emission::Warning {
            message: message.to_string(),
        });
    }

    fn error(&mut self, message: &str, annotation: &Annotation) {
        self.emissions.push(Emission::Error {
            message: message.to_string(),
            annotation: annotation.clone(),
        });
    }

    fn set_output(&mut self, name: &str, value: &str) {
        self.emissions.push(Emission::Output {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn set_failed(&mut self, message: &str) {
        self.emissions.push(Emission::Failed {
            message: message.to_string(),
        });
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn debug(&mut self, message: &str) {
        (**self).debug(message)
    }

    fn warning(&mut self, message: &str) {
        (**self).warning(message)
    }

    fn error(&mut self, message: &str, annotation: &Annotation) {
        (**self).error(message, annotation)
    }

    fn set_output(&mut self, name: &str, value: &str) {
        (**self).set_output(name, value)
    }

    fn set_failed(&mut self, message: &str) {
        (**self).set_failed(message)
    }
}
