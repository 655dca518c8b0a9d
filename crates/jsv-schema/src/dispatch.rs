//! # Validation Dispatcher
//!
//! The run validates either data instances against one compiled schema, or
//! schema documents against their own meta-schemas. The mode is fixed when
//! the dispatcher is built; both modes expose the same `validate`.

use serde_json::Value;

use crate::draft::require_declared_schema;
use crate::error::SchemaError;
use crate::factory::{build_meta_validator, build_validator, CompiledSchema, ValidationOptions};
use crate::record::ValidationError;

#[derive(Debug)]
pub enum Dispatcher {
    /// Every document is a schema, checked against its declared draft.
    SchemaDocuments { options: ValidationOptions },
    /// Every document is an instance of one schema, compiled once.
    Instances { schema: CompiledSchema },
}

impl Dispatcher {
    pub fn for_schema_documents(options: ValidationOptions) -> Self {
        Self::SchemaDocuments { options }
    }

    /// Compile `schema` once for the whole run.
    ///
    /// Fails with [`SchemaError::MissingSchemaKey`] when the schema has no
    /// `$schema` string.
    pub fn for_instances(schema: &Value, options: ValidationOptions) -> Result<Self, SchemaError> {
        Ok(Self::Instances {
            schema: build_validator(schema, &options)?,
        })
    }

    pub fn is_schema_mode(&self) -> bool {
        matches!(self, Self::SchemaDocuments { .. })
    }

    /// Validate one document.
    ///
    /// In schema mode a document without `$schema` is an error rather than a
    /// list of keyword failures.
    pub fn validate(&self, document: &Value) -> Result<Vec<ValidationError>, SchemaError> {
        match self {
            Self::SchemaDocuments { options } => {
                require_declared_schema(document)?;
                let meta = build_meta_validator(document, options)?;
                Ok(meta.validate(document))
            }
            Self::Instances { schema } => Ok(schema.validate(document)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{DRAFT_2019_09_URI, DRAFT_07_URI};
    use serde_json::json;

    #[test]
    fn schema_mode_requires_schema_key() {
        let dispatcher = Dispatcher::for_schema_documents(ValidationOptions::default());
        assert!(dispatcher.is_schema_mode());
        let err = dispatcher.validate(&json!({"type": "object"})).unwrap_err();
        assert_eq!(err.to_string(), "JSON schema missing $schema key");
    }

    #[test]
    fn schema_mode_checks_each_document_against_its_own_draft() {
        let dispatcher = Dispatcher::for_schema_documents(ValidationOptions::default());
        let draft7 = json!({"$schema": DRAFT_07_URI, "type": "string"});
        let draft2019 = json!({"$schema": DRAFT_2019_09_URI, "type": "string"});
        assert!(dispatcher.validate(&draft7).unwrap().is_empty());
        assert!(dispatcher.validate(&draft2019).unwrap().is_empty());

        let bad = json!({"$schema": DRAFT_07_URI, "required": "name"});
        assert!(!dispatcher.validate(&bad).unwrap().is_empty());
    }

    #[test]
    fn instance_mode_requires_schema_key_up_front() {
        let err = Dispatcher::for_instances(&json!({"type": "object"}), ValidationOptions::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingSchemaKey));
    }

    #[test]
    fn instance_mode_reuses_one_validator() {
        let schema = json!({"$schema": DRAFT_07_URI, "type": "object"});
        let dispatcher = Dispatcher::for_instances(&schema, ValidationOptions::default()).unwrap();
        assert!(!dispatcher.is_schema_mode());
        assert!(dispatcher.validate(&json!({})).unwrap().is_empty());
        assert_eq!(dispatcher.validate(&json!("invalid content")).unwrap().len(), 1);
        assert!(dispatcher.validate(&json!({"a": 1})).unwrap().is_empty());
    }

    #[test]
    fn custom_errors_surface_every_meta_schema_violation() {
        let doc = json!({"$schema": DRAFT_07_URI, "type": 12, "required": "name"});
        let forced = Dispatcher::for_schema_documents(ValidationOptions {
            all_errors: false,
            custom_errors: true,
        });
        let first_only = Dispatcher::for_schema_documents(ValidationOptions::default());
        assert_eq!(forced.validate(&doc).unwrap().len(), 2);
        assert_eq!(first_only.validate(&doc).unwrap().len(), 1);
    }
}
