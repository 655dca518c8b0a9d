//! # Schema Source Digest
//!
//! Deterministic SHA-256 digest of a schema source identifier (in practice,
//! the remote schema URL). The digest names both the cache entry and the
//! materialized local file, so the two always agree for a given URL.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Prefix shared by cache keys and materialized schema file names.
pub const SCHEMA_KEY_PREFIX: &str = "schema-";

/// File extension of a materialized remote schema.
pub const SCHEMA_FILE_EXTENSION: &str = "json";

/// A SHA-256 digest of a schema source identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaDigest {
    bytes: [u8; 32],
}

impl SchemaDigest {
    /// Hash the identifier's UTF-8 bytes.
    pub fn of(identifier: &str) -> Self {
        let hash = Sha256::digest(identifier.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self { bytes }
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Cache key for this digest: `schema-<hex>`.
    pub fn cache_key(&self) -> String {
        format!("{SCHEMA_KEY_PREFIX}{}", self.to_hex())
    }

    /// Local file name for this digest: `schema-<hex>.json`.
    pub fn file_name(&self) -> String {
        format!("{}.{SCHEMA_FILE_EXTENSION}", self.cache_key())
    }
}

impl std::fmt::Display for SchemaDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hex SHA-256 digest of a schema source identifier.
pub fn schema_digest_hex(identifier: &str) -> String {
    SchemaDigest::of(identifier).to_hex()
}
