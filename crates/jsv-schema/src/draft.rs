//! # Draft Selection
//!
//! Maps a schema's declared `$schema` URI to the validation engine that
//! evaluates it. The mapping is a lookup table keyed by canonical URI;
//! any URI not in the table selects the default engine.
//!
//! | `$schema`                                      | Engine        |
//! |------------------------------------------------|---------------|
//! | `http://json-schema.org/draft-04/schema#`      | draft-04      |
//! | `https://json-schema.org/draft/2020-12/schema` | draft-2020-12 |
//! | anything else                                  | draft-2019-09 |
//!
//! The default engine also accepts the draft-06 and draft-07 meta-schemas,
//! so documents declaring those drafts validate under it.

use serde_json::Value;

use crate::error::SchemaError;

pub const DRAFT_04_URI: &str = "http://json-schema.org/draft-04/schema#";
pub const DRAFT_06_URI: &str = "http://json-schema.org/draft-06/schema#";
pub const DRAFT_07_URI: &str = "http://json-schema.org/draft-07/schema#";
pub const DRAFT_2019_09_URI: &str = "https://json-schema.org/draft/2019-09/schema";
pub const DRAFT_2020_12_URI: &str = "https://json-schema.org/draft/2020-12/schema";

/// A JSON Schema specification revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaDraft {
    Draft4,
    Draft6,
    Draft7,
    Draft201909,
    Draft202012,
}

impl SchemaDraft {
    pub const ALL: [SchemaDraft; 5] = [
        Self::Draft4,
        Self::Draft6,
        Self::Draft7,
        Self::Draft201909,
        Self::Draft202012,
    ];

    /// Canonical meta-schema URI of this draft.
    pub fn uri(self) -> &'static str {
        match self {
            Self::Draft4 => DRAFT_04_URI,
            Self::Draft6 => DRAFT_06_URI,
            Self::Draft7 => DRAFT_07_URI,
            Self::Draft201909 => DRAFT_2019_09_URI,
            Self::Draft202012 => DRAFT_2020_12_URI,
        }
    }

    /// Exact match against the canonical URIs.
    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.uri() == uri)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Draft4 => "draft-04",
            Self::Draft6 => "draft-06",
            Self::Draft7 => "draft-07",
            Self::Draft201909 => "draft-2019-09",
            Self::Draft202012 => "draft-2020-12",
        }
    }

    pub(crate) fn to_jsonschema(self) -> jsonschema::Draft {
        match self {
            Self::Draft4 => jsonschema::Draft::Draft4,
            Self::Draft6 => jsonschema::Draft::Draft6,
            Self::Draft7 => jsonschema::Draft::Draft7,
            Self::Draft201909 => jsonschema::Draft::Draft201909,
            Self::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

impl std::fmt::Display for SchemaDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A validation engine: the draft whose semantics it applies, plus any
/// further meta-schemas registered on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    pub draft: SchemaDraft,
    pub extra_meta_schemas: &'static [SchemaDraft],
}

pub const DRAFT_04_ENGINE: Engine = Engine {
    draft: SchemaDraft::Draft4,
    extra_meta_schemas: &[],
};

pub const DRAFT_2020_12_ENGINE: Engine = Engine {
    draft: SchemaDraft::Draft202012,
    extra_meta_schemas: &[],
};

pub const DEFAULT_ENGINE: Engine = Engine {
    draft: SchemaDraft::Draft201909,
    extra_meta_schemas: &[SchemaDraft::Draft6, SchemaDraft::Draft7],
};

/// Engines selected by exact `$schema` value. Order is evaluation order.
const ENGINE_TABLE: &[(&str, Engine)] = &[
    (DRAFT_04_URI, DRAFT_04_ENGINE),
    (DRAFT_2020_12_URI, DRAFT_2020_12_ENGINE),
];

impl Engine {
    /// Select the engine for a declared `$schema` value.
    pub fn select(declared: Option<&str>) -> Engine {
        declared
            .and_then(|uri| {
                ENGINE_TABLE
                    .iter()
                    .find(|(key, _)| *key == uri)
                    .map(|(_, engine)| *engine)
            })
            .unwrap_or(DEFAULT_ENGINE)
    }

    /// Every meta-schema this engine can validate documents against.
    pub fn meta_schemas(&self) -> impl Iterator<Item = SchemaDraft> + '_ {
        std::iter::once(self.draft).chain(self.extra_meta_schemas.iter().copied())
    }

    pub fn accepts_meta_schema(&self, draft: SchemaDraft) -> bool {
        self.meta_schemas().any(|d| d == draft)
    }

    /// The meta-schema a document declaring `declared` is checked against:
    /// the declared draft when this engine accepts it, else the engine's own.
    pub fn meta_schema_for(&self, declared: Option<&str>) -> SchemaDraft {
        declared
            .and_then(SchemaDraft::from_uri)
            .filter(|d| self.accepts_meta_schema(*d))
            .unwrap_or(self.draft)
    }
}

/// The document's `$schema` value, if it is a string.
pub fn declared_schema(document: &Value) -> Option<&str> {
    document.get("$schema").and_then(Value::as_str)
}

/// Like [`declared_schema`], but absence is an error.
pub fn require_declared_schema(document: &Value) -> Result<&str, SchemaError> {
    declared_schema(document).ok_or(SchemaError::MissingSchemaKey)
}
