//! # Remote Schema Resolver
//!
//! Turns a schema source into a local file path. Local paths pass through
//! untouched: no hashing, no cache, no network. URLs are materialized at
//! `<temp dir>/schema-<sha256 hex>.json`:
//!
//! 1. With caching on, try to restore the file under key `schema-<hex>`.
//!    A failed restore is a warning and counts as a miss.
//! 2. On a miss, GET the URL. Anything but 200 is fatal.
//! 3. Write the body to the target path.
//! 4. With caching on, save the file under the same key. A failed save is a
//!    warning.

use std::path::{Path, PathBuf};

use jsv_core::{Reporter, SchemaDigest};

use crate::cache::CacheStore;
use crate::error::RemoteError;
use crate::fetch::SchemaFetcher;

/// Whether `source` names a remote schema.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Where a URL's schema is materialized under `temp_dir`.
pub fn materialized_path(temp_dir: &Path, url: &str) -> PathBuf {
    temp_dir.join(SchemaDigest::of(url).file_name())
}

#[derive(Debug)]
pub struct RemoteSchemaResolver<F, C> {
    fetcher: F,
    cache: C,
    temp_dir: PathBuf,
    cache_enabled: bool,
}

impl<F: SchemaFetcher, C: CacheStore> RemoteSchemaResolver<F, C> {
    pub fn new(fetcher: F, cache: C, temp_dir: impl Into<PathBuf>, cache_enabled: bool) -> Self {
        Self {
            fetcher,
            cache,
            temp_dir: temp_dir.into(),
            cache_enabled,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Resolve `source` to the path the schema should be read from.
    pub async fn resolve<R: Reporter>(
        &self,
        source: &str,
        reporter: &mut R,
    ) -> Result<PathBuf, RemoteError> {
        if !is_remote(source) {
            return Ok(PathBuf::from(source));
        }

        let path = materialized_path(&self.temp_dir, source);
        let key = SchemaDigest::of(source).cache_key();
        let paths = [path.clone()];

        if self.cache_enabled && self.restore(&paths, &key, reporter).await {
            tracing::info!(url = source, path = %path.display(), "schema restored from cache");
            return Ok(path);
        }

        let resp = self.fetcher.get(source).await?;
        if !resp.is_ok() {
            return Err(RemoteError::FetchFailed {
                status: resp.status,
                status_text: resp.status_text,
            });
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| RemoteError::Write {
                    path: path.clone(),
                    source,
                })?;
        }
        tokio::fs::write(&path, resp.body.as_bytes())
            .await
            .map_err(|source| RemoteError::Write {
                path: path.clone(),
                source,
            })?;
        tracing::info!(url = source, path = %path.display(), "schema downloaded");

        if self.cache_enabled {
            if let Err(e) = self.cache.save(&paths, &key).await {
                reporter.warning(&format!("Error while trying to save cache: {e}"));
            }
        }

        Ok(path)
    }

    async fn restore<R: Reporter>(&self, paths: &[PathBuf], key: &str, reporter: &mut R) -> bool {
        match self.cache.restore(paths, key).await {
            Ok(hit) => hit.is_some(),
            Err(e) => {
                reporter.warning(&format!("Error while trying to restore cache: {e}"));
                false
            }
        }
    }
}
