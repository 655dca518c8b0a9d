//! # Validation Error Records
//!
//! One record per failed keyword, in the order the validator emitted them.
//! Records are reported verbatim as pretty JSON with 4-space indentation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use jsonschema::error::ValidationErrorKind;

/// A single keyword failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// JSON Pointer into the instance document (`""` for the root).
    pub instance_path: String,
    /// `#`-prefixed JSON Pointer into the schema.
    pub schema_path: String,
    /// Name of the failing keyword.
    pub keyword: String,
    /// Keyword-specific parameters.
    pub params: Value,
    /// Human-readable message.
    pub message: String,
}

impl ValidationError {
    /// Build a record from a `jsonschema` error. `schema` is the root schema
    /// the error's schema path is relative to.
    pub(crate) fn from_jsonschema(err: &jsonschema::ValidationError<'_>, schema: &Value) -> Self {
        let schema_pointer = err.schema_path.to_string();
        let keyword = last_segment(&schema_pointer).unwrap_or_default();
        let params = match &err.kind {
            ValidationErrorKind::Required { property } => json!({ "missingProperty": property }),
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                json!({ "additionalProperty": unexpected })
            }
            _ => {
                let mut params = serde_json::Map::new();
                if let Some(value) = schema.pointer(&schema_pointer) {
                    if !keyword.is_empty() {
                        params.insert(keyword.clone(), value.clone());
                    }
                }
                Value::Object(params)
            }
        };

        Self {
            instance_path: err.instance_path.to_string(),
            schema_path: format!("#{schema_pointer}"),
            keyword,
            params,
            message: err.to_string(),
        }
    }

    /// The schema path as a plain JSON Pointer (without the leading `#`).
    pub fn schema_pointer(&self) -> &str {
        self.schema_path.strip_prefix('#').unwrap_or(&self.schema_path)
    }

    /// Serialize as JSON with 4-space indentation.
    pub fn to_pretty_json(&self) -> String {
        to_pretty_json(self)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Serialize any value as JSON with 4-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    if value.serialize(&mut ser).is_err() {
        return String::new();
    }
    String::from_utf8(out).unwrap_or_default()
}

/// Split a JSON Pointer into unescaped segments.
pub(crate) fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Escape one segment for inclusion in a JSON Pointer.
pub(crate) fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn last_segment(pointer: &str) -> Option<String> {
    pointer_segments(pointer).pop()
}
