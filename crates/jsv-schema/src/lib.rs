//! # jsv-schema — Draft Dispatch & Validation
//!
//! Wraps the `jsonschema` crate with the pieces a validation run needs:
//!
//! - [`document`] decodes YAML/JSON text into `serde_json::Value`.
//! - [`draft`] maps a declared `$schema` URI to a validation engine through
//!   a lookup table.
//! - [`factory`] compiles one immutable validator per schema document.
//! - [`dispatch`] fixes the run mode (schema documents or data instances)
//!   behind a single `validate` operation.
//! - [`record`] is the serializable error record reported per failure.
//! - [`messages`] applies author `errorMessage` annotations.
//!
//! Keyword evaluation itself is delegated entirely to `jsonschema`.
//!
//! ## Crate Policy
//!
//! - No internal dependencies; `jsv-cli` wires it to the reporter.
//! - Error order is the validator's emission order; nothing here re-sorts.

pub mod dispatch;
pub mod document;
pub mod draft;
pub mod error;
pub mod factory;
pub mod messages;
pub mod record;

pub use dispatch::Dispatcher;
pub use document::{parse_document, yaml_to_json_value};
pub use draft::{declared_schema, Engine, SchemaDraft, DEFAULT_ENGINE};
pub use error::SchemaError;
pub use factory::{build_meta_validator, build_validator, CompiledSchema, ValidationOptions};
pub use messages::{ErrorMessages, ERROR_MESSAGE_KEYWORD};
pub use record::{to_pretty_json, ValidationError};
