//! Remote schema resolution configuration.
//!
//! Defaults come from the CI environment. The CLI overrides individual
//! fields from its flags.

use std::path::PathBuf;

/// Runner-provided temporary directory.
pub const RUNNER_TEMP_VAR: &str = "RUNNER_TEMP";
/// Temporary directory used when `RUNNER_TEMP` is unset.
pub const FALLBACK_TEMP_DIR: &str = "/tmp/";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CACHE_DIR_NAME: &str = "jsv-schema-cache";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Directory the fetched schema is materialized into.
    pub temp_dir: PathBuf,
    /// Root of the local cache store.
    pub cache_dir: PathBuf,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Whether cache restore/save runs at all.
    pub cache_enabled: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            cache_dir: default_cache_dir(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_enabled: false,
        }
    }
}

/// `RUNNER_TEMP` when set and non-empty, else `/tmp/`.
pub fn default_temp_dir() -> PathBuf {
    std::env::var(RUNNER_TEMP_VAR)
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_TEMP_DIR))
}

/// `<system temp>/jsv-schema-cache`.
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join(CACHE_DIR_NAME)
}
