//! # Validator Factory
//!
//! Builds one validator per schema document, bound to the engine the
//! document's `$schema` selects. Format assertion is on for every engine.
//! Validators are never shared between schema documents.
//!
//! An engine evaluates a schema under the draft the schema declares when it
//! accepts that draft (the default engine accepts draft-06 and draft-07),
//! and under its own draft otherwise. An unrecognised `$schema` is not shown
//! to the validator, so the engine's own vocabularies apply.

use std::borrow::Cow;

use serde_json::{json, Value};

use crate::draft::{declared_schema, require_declared_schema, Engine, SchemaDraft};
use crate::error::SchemaError;
use crate::messages::ErrorMessages;
use crate::record::ValidationError;

/// Run-wide validation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Collect every keyword failure instead of stopping at the first.
    pub all_errors: bool,
    /// Apply `errorMessage` annotations. Forces `all_errors`.
    pub custom_errors: bool,
}

impl ValidationOptions {
    pub fn effective_all_errors(&self) -> bool {
        self.all_errors || self.custom_errors
    }
}

/// A compiled, immutable validator plus what it needs to report errors.
pub struct CompiledSchema {
    validator: jsonschema::Validator,
    schema: Value,
    engine: Engine,
    draft: SchemaDraft,
    messages: Option<ErrorMessages>,
    all_errors: bool,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("engine", &self.engine)
            .field("draft", &self.draft)
            .field("custom_messages", &self.messages.as_ref().map(ErrorMessages::len))
            .field("all_errors", &self.all_errors)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Draft the schema is evaluated under.
    pub fn draft(&self) -> SchemaDraft {
        self.draft
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validate `instance`, returning errors in validator order.
    pub fn validate(&self, instance: &Value) -> Vec<ValidationError> {
        let limit = if self.all_errors { usize::MAX } else { 1 };
        let errors: Vec<ValidationError> = self
            .validator
            .iter_errors(instance)
            .take(limit)
            .map(|e| ValidationError::from_jsonschema(&e, &self.schema))
            .collect();

        match &self.messages {
            Some(messages) => messages.apply(errors, instance),
            None => errors,
        }
    }
}

/// Compile `schema` for validating data instances.
///
/// The schema must declare `$schema`; its value selects the engine.
pub fn build_validator(
    schema: &Value,
    options: &ValidationOptions,
) -> Result<CompiledSchema, SchemaError> {
    let declared = require_declared_schema(schema)?;
    let engine = Engine::select(Some(declared));
    let draft = engine.meta_schema_for(Some(declared));
    compile(schema.clone(), engine, draft, options)
}

/// Compile a validator that checks a schema document against the
/// meta-schema of its declared draft.
pub fn build_meta_validator(
    document: &Value,
    options: &ValidationOptions,
) -> Result<CompiledSchema, SchemaError> {
    let declared = declared_schema(document);
    let engine = Engine::select(declared);
    let meta = engine.meta_schema_for(declared);
    tracing::trace!(engine = %engine.draft, meta = %meta, "meta-schema selected");
    let options = ValidationOptions {
        all_errors: options.effective_all_errors(),
        custom_errors: false,
    };
    compile(meta_reference(meta), engine, meta, &options)
}

fn meta_reference(draft: SchemaDraft) -> Value {
    json!({ "$ref": draft.uri() })
}

/// The schema as the validator sees it.
fn engine_view(schema: &Value) -> Cow<'_, Value> {
    match declared_schema(schema) {
        Some(uri) if SchemaDraft::from_uri(uri).is_none() => {
            let mut view = schema.clone();
            if let Some(map) = view.as_object_mut() {
                map.remove("$schema");
            }
            Cow::Owned(view)
        }
        _ => Cow::Borrowed(schema),
    }
}

fn compile(
    schema: Value,
    engine: Engine,
    draft: SchemaDraft,
    options: &ValidationOptions,
) -> Result<CompiledSchema, SchemaError> {
    let mut opts = jsonschema::options();
    opts.with_draft(draft.to_jsonschema());
    opts.should_validate_formats(true);
    let validator = opts
        .build(&engine_view(&schema))
        .map_err(SchemaError::compile)?;

    let messages = options
        .custom_errors
        .then(|| ErrorMessages::index(&schema))
        .filter(|m| !m.is_empty());

    tracing::debug!(
        engine = %engine.draft,
        draft = %draft,
        all_errors = options.effective_all_errors(),
        custom_messages = messages.as_ref().map_or(0, ErrorMessages::len),
        "validator compiled"
    );

    Ok(CompiledSchema {
        validator,
        schema,
        engine,
        draft,
        messages,
        all_errors: options.effective_all_errors(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{
        DEFAULT_ENGINE, DRAFT_04_ENGINE, DRAFT_04_URI, DRAFT_06_URI, DRAFT_07_URI,
        DRAFT_2019_09_URI,
    };

    fn config_schema() -> Value {
        json!({
            "$schema": DRAFT_07_URI,
            "type": "object",
            "required": ["name", "chain_id"],
            "properties": {
                "name": {"type": "string"},
                "chain_id": {"type": "integer"}
            }
        })
    }

    #[test]
    fn missing_schema_key_is_rejected() {
        let err = build_validator(&json!({"type": "object"}), &ValidationOptions::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingSchemaKey));
    }

    #[test]
    fn valid_instance_has_no_errors() {
        let compiled = build_validator(&config_schema(), &ValidationOptions::default()).unwrap();
        assert_eq!(compiled.engine(), DEFAULT_ENGINE);
        assert_eq!(compiled.draft(), SchemaDraft::Draft7);
        assert!(compiled
            .validate(&json!({"name": "mainnet", "chain_id": 1}))
            .is_empty());
    }

    #[test]
    fn first_error_only_by_default() {
        let compiled = build_validator(&config_schema(), &ValidationOptions::default()).unwrap();
        assert_eq!(compiled.validate(&json!({})).len(), 1);
    }

    #[test]
    fn all_errors_collects_every_failure() {
        let options = ValidationOptions {
            all_errors: true,
            custom_errors: false,
        };
        let compiled = build_validator(&config_schema(), &options).unwrap();
        let errors = compiled.validate(&json!({"name": 5, "chain_id": "one"}));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].keyword, "type");
    }

    #[test]
    fn custom_errors_force_all_errors() {
        let options = ValidationOptions {
            all_errors: false,
            custom_errors: true,
        };
        assert!(options.effective_all_errors());
        let compiled = build_validator(&config_schema(), &options).unwrap();
        assert_eq!(compiled.validate(&json!({"name": 5, "chain_id": "one"})).len(), 2);
    }

    #[test]
    fn formats_are_asserted() {
        let schema = json!({
            "$schema": DRAFT_07_URI,
            "properties": {"contact": {"type": "string", "format": "email"}}
        });
        let compiled = build_validator(&schema, &ValidationOptions::default()).unwrap();
        assert!(compiled.validate(&json!({"contact": "ops@example.com"})).is_empty());
        assert_eq!(compiled.validate(&json!({"contact": "not an email"})).len(), 1);
    }

    #[test]
    fn meta_validator_accepts_well_formed_schema() {
        let compiled = build_meta_validator(&config_schema(), &ValidationOptions::default())
            .unwrap();
        assert!(compiled.validate(&config_schema()).is_empty());
    }

    #[test]
    fn meta_validator_rejects_malformed_schema() {
        let broken = json!({"$schema": DRAFT_07_URI, "type": 12});
        let compiled = build_meta_validator(&broken, &ValidationOptions::default()).unwrap();
        assert!(!compiled.validate(&broken).is_empty());
    }

    #[test]
    fn meta_validator_uses_draft_04_engine() {
        let doc = json!({"$schema": DRAFT_04_URI, "id": "urn:x", "type": "object"});
        let compiled = build_meta_validator(&doc, &ValidationOptions::default()).unwrap();
        assert_eq!(compiled.engine(), DRAFT_04_ENGINE);
        assert!(compiled.validate(&doc).is_empty());
    }

    #[test]
    fn default_engine_evaluates_declared_draft() {
        for (uri, draft) in [
            (DRAFT_06_URI, SchemaDraft::Draft6),
            (DRAFT_07_URI, SchemaDraft::Draft7),
            (DRAFT_2019_09_URI, SchemaDraft::Draft201909),
            ("https://example.com/custom-meta", SchemaDraft::Draft201909),
        ] {
            let schema = json!({"$schema": uri, "type": "object", "required": ["name"]});
            let compiled = build_validator(&schema, &ValidationOptions::default()).unwrap();
            assert_eq!(compiled.engine(), DEFAULT_ENGINE, "{uri}");
            assert_eq!(compiled.draft(), draft, "{uri}");
            assert_eq!(compiled.validate(&json!("invalid content")).len(), 1, "{uri}");
            assert!(compiled.validate(&json!({"name": "x"})).is_empty(), "{uri}");
        }
    }

    #[test]
    fn unknown_schema_uri_keeps_original_schema_for_records() {
        let schema = json!({"$schema": "https://example.com/custom-meta", "maximum": 3});
        let compiled = build_validator(&schema, &ValidationOptions::default()).unwrap();
        assert_eq!(compiled.schema(), &schema);
        let errors = compiled.validate(&json!(4));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].params, json!({"maximum": 3}));
    }

    #[test]
    fn meta_validator_keeps_forced_all_errors() {
        let broken = json!({"$schema": DRAFT_07_URI, "type": 12, "required": "name"});
        let options = ValidationOptions {
            all_errors: false,
            custom_errors: true,
        };
        let compiled = build_meta_validator(&broken, &options).unwrap();
        assert_eq!(compiled.draft(), SchemaDraft::Draft7);
        assert_eq!(compiled.validate(&broken).len(), 2);
    }
}
