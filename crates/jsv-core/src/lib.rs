//! # jsv-core — Foundational Types
//!
//! Leaf crate of the jsv workspace. Defines what every other crate shares:
//!
//! - [`SchemaDigest`] — SHA-256 of a schema source identifier, from which the
//!   remote-schema cache key (`schema-<hex>`) and materialized file name
//!   (`schema-<hex>.json`) are derived.
//! - [`Reporter`] — the diagnostic sink contract (debug, warning, annotated
//!   error, output, terminal failure).
//! - [`OpaqueError`] — carrier for non-error failure payloads, reported as
//!   their JSON serialization.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsv-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod report;

pub use digest::{schema_digest_hex, SchemaDigest, SCHEMA_KEY_PREFIX};
pub use error::{failure_message, OpaqueError};
pub use report::{Annotation, Emission, MemoryReporter, Reporter};
