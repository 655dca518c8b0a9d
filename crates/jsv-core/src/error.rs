//! # Error Types
//!
//! Failures raised by collaborators are reported by their message. A
//! collaborator may also fail with a payload that is not an error at all
//! (a bare number, an object); such payloads are carried as [`OpaqueError`]
//! and reported as their JSON serialization.

use serde_json::Value;

/// A failure payload that is not a structured error. Displays as compact JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueError(pub Value);

impl OpaqueError {
    pub fn new(payload: impl Into<Value>) -> Self {
        Self(payload.into())
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }
}

impl std::fmt::Display for OpaqueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Value's Display is its compact JSON serialization.
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for OpaqueError {}

/// Render any error the way diagnostics report it: the error's own message.
///
/// Source chains are not appended; callers that want the chain log the
/// `Debug` form separately.
pub fn failure_message(err: &(dyn std::error::Error + 'static)) -> String {
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn opaque_number_renders_as_json() {
        assert_eq!(OpaqueError::new(42).to_string(), "42");
    }

    #[test]
    fn opaque_string_renders_quoted() {
        assert_eq!(OpaqueError::new("boom").to_string(), "\"boom\"");
    }

    #[test]
    fn opaque_object_renders_compact() {
        let err = OpaqueError(json!({"code": 7}));
        assert_eq!(err.to_string(), r#"{"code":7}"#);
        assert_eq!(err.payload()["code"], 7);
    }

    #[test]
    fn failure_message_uses_display() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "File read error");
        assert_eq!(failure_message(&io), "File read error");
        assert_eq!(failure_message(&OpaqueError::new(42)), "42");
    }
}
