//! # Schema Cache Store
//!
//! A key-value store of files. `restore` materializes previously saved
//! files back at their paths; `save` stores them under a key. Both may fail
//! independently; callers treat failures as warnings.
//!
//! [`DirCacheStore`] keeps entries in a local directory:
//!
//! ```text
//! <root>/<key>/<file name>
//! ```

use std::path::{Path, PathBuf};

use jsv_core::OpaqueError;

/// Longest accepted cache key.
pub const MAX_KEY_LEN: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Key Validation Error: {0} cannot contain path separators or commas")]
    InvalidKey(String),

    #[error("Key Validation Error: {0} cannot be larger than 512 characters")]
    KeyTooLong(String),

    #[error("cannot cache {}: path has no file name", .0.display())]
    InvalidPath(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The cache service reported a failure.
    #[error("{0}")]
    Service(String),

    /// A non-standard failure payload, shown as its JSON serialization.
    #[error(transparent)]
    Opaque(#[from] OpaqueError),
}

fn io_err(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> CacheError {
    let context = context.into();
    move |source| CacheError::Io { context, source }
}

#[allow(async_fn_in_trait)]
pub trait CacheStore {
    /// Restore `paths` saved under `key`. `Ok(Some(key))` on a hit,
    /// `Ok(None)` on a miss.
    async fn restore(&self, paths: &[PathBuf], key: &str) -> Result<Option<String>, CacheError>;

    /// Save `paths` under `key`.
    async fn save(&self, paths: &[PathBuf], key: &str) -> Result<(), CacheError>;
}

/// Reject keys that cannot name a single cache entry.
pub fn validate_key(key: &str) -> Result<(), CacheError> {
    if key.len() > MAX_KEY_LEN {
        return Err(CacheError::KeyTooLong(key.to_string()));
    }
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', ',']);
    if bad {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Cache entries stored as directories under a root.
#[derive(Debug, Clone)]
pub struct DirCacheStore {
    root: PathBuf,
}

impl DirCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_dir(&self, key: &str) -> Result<PathBuf, CacheError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

fn file_name(path: &Path) -> Result<&std::ffi::OsStr, CacheError> {
    path.file_name()
        .ok_or_else(|| CacheError::InvalidPath(path.to_path_buf()))
}

impl CacheStore for DirCacheStore {
    async fn restore(&self, paths: &[PathBuf], key: &str) -> Result<Option<String>, CacheError> {
        let entry = self.entry_dir(key)?;

        let mut pairs = Vec::with_capacity(paths.len());
        for path in paths {
            let cached = entry.join(file_name(path)?);
            let present = tokio::fs::try_exists(&cached)
                .await
                .map_err(io_err(format!("cannot inspect {}", cached.display())))?;
            if !present {
                tracing::debug!(key, "cache miss");
                return Ok(None);
            }
            pairs.push((cached, path));
        }

        for (cached, path) in pairs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(io_err(format!("cannot create {}", parent.display())))?;
            }
            tokio::fs::copy(&cached, path)
                .await
                .map_err(io_err(format!("cannot restore {}", path.display())))?;
        }

        tracing::debug!(key, "cache hit");
        Ok(Some(key.to_string()))
    }

    async fn save(&self, paths: &[PathBuf], key: &str) -> Result<(), CacheError> {
        let entry = self.entry_dir(key)?;
        tokio::fs::create_dir_all(&entry)
            .await
            .map_err(io_err(format!("cannot create {}", entry.display())))?;

        for path in paths {
            let cached = entry.join(file_name(path)?);
            tokio::fs::copy(path, &cached)
                .await
                .map_err(io_err(format!("cannot save {}", path.display())))?;
        }

        tracing::debug!(key, files = paths.len(), "cache saved");
        Ok(())
    }
}
