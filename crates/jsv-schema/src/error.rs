//! Errors raised while decoding documents and compiling schemas.

use thiserror::Error;

/// Errors returned by schema decoding, compilation, and dispatch.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document has no usable `$schema` string.
    #[error("JSON schema missing $schema key")]
    MissingSchemaKey,

    /// The schema could not be compiled into a validator.
    #[error("failed to compile schema: {reason}")]
    Compile {
        /// Compiler diagnostic.
        reason: String,
    },

    /// A YAML or JSON document could not be decoded.
    #[error("{reason}")]
    Decode {
        /// Parser diagnostic.
        reason: String,
    },
}

impl SchemaError {
    pub(crate) fn compile(err: impl std::fmt::Display) -> Self {
        Self::Compile {
            reason: err.to_string(),
        }
    }
}
