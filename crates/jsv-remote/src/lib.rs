//! # jsv-remote — Remote Schema Resolution
//!
//! Materializes a schema URL as a local file, going through a cache store
//! first when caching is enabled. The two collaborators sit behind traits:
//!
//! - [`SchemaFetcher`] performs the HTTP GET ([`HttpFetcher`] over `reqwest`).
//! - [`CacheStore`] restores and saves files by key ([`DirCacheStore`] over
//!   a local directory).
//!
//! [`RemoteSchemaResolver`] sequences them. Local schema paths never reach
//! either collaborator.
//!
//! Cache failures are reported as warnings through a
//! [`jsv_core::Reporter`]; only a non-200 response or a failed local write
//! aborts resolution.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod resolver;

pub use cache::{validate_key, CacheError, CacheStore, DirCacheStore};
pub use config::RemoteConfig;
pub use error::RemoteError;
pub use fetch::{FetchResponse, HttpFetcher, SchemaFetcher};
pub use resolver::{is_remote, materialized_path, RemoteSchemaResolver};
