//! Cache-or-fetch behaviour of `RemoteSchemaResolver`, checked with
//! counting fakes for the fetcher and the cache store.

use std::path::PathBuf;
use std::sync::Mutex;

use jsv_core::{MemoryReporter, OpaqueError};
use jsv_remote::{
    materialized_path, CacheError, CacheStore, FetchResponse, RemoteError, RemoteSchemaResolver,
    SchemaFetcher,
};

const URL: &str = "https://foo.bar/schema.json";
const KEY: &str = "schema-a561585069d44a89a79e1d4e9b9e534fa5f45a5c63ffa35992fa700c4954844c";
const SCHEMA: &str = r#"{"$schema": "http://json-schema.org/draft-07/schema#", "type": "object"}"#;

struct FakeFetcher {
    response: FetchResponse,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    fn ok() -> Self {
        Self::with(200, "OK", SCHEMA)
    }

    fn with(status: u16, status_text: &str, body: &str) -> Self {
        Self {
            response: FetchResponse {
                status,
                status_text: status_text.into(),
                body: body.into(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SchemaFetcher for FakeFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, RemoteError> {
        self.calls.lock().unwrap().push(url.to_string());
        Ok(self.response.clone())
    }
}

#[derive(Clone, Copy)]
enum Restore {
    Miss,
    Hit,
    Fail,
}

struct FakeCache {
    restore: Restore,
    fail_save: bool,
    restores: Mutex<Vec<(Vec<PathBuf>, String)>>,
    saves: Mutex<Vec<(Vec<PathBuf>, String)>>,
}

impl FakeCache {
    fn new(restore: Restore) -> Self {
        Self {
            restore,
            fail_save: false,
            restores: Mutex::new(Vec::new()),
            saves: Mutex::new(Vec::new()),
        }
    }

    fn failing_save() -> Self {
        Self {
            fail_save: true,
            ..Self::new(Restore::Miss)
        }
    }

    fn restores(&self) -> Vec<(Vec<PathBuf>, String)> {
        self.restores.lock().unwrap().clone()
    }

    fn saves(&self) -> Vec<(Vec<PathBuf>, String)> {
        self.saves.lock().unwrap().clone()
    }
}

impl CacheStore for FakeCache {
    async fn restore(&self, paths: &[PathBuf], key: &str) -> Result<Option<String>, CacheError> {
        self.restores
            .lock()
            .unwrap()
            .push((paths.to_vec(), key.to_string()));
        match self.restore {
            Restore::Miss => Ok(None),
            Restore::Hit => Ok(Some(key.to_string())),
            Restore::Fail => Err(CacheError::Service("cache service unavailable".into())),
        }
    }

    async fn save(&self, paths: &[PathBuf], key: &str) -> Result<(), CacheError> {
        self.saves.lock().unwrap().push((paths.to_vec(), key.to_string()));
        if self.fail_save {
            return Err(OpaqueError::new(42).into());
        }
        Ok(())
    }
}

fn resolver(
    fetcher: FakeFetcher,
    cache: FakeCache,
    temp: &tempfile::TempDir,
    cache_enabled: bool,
) -> RemoteSchemaResolver<FakeFetcher, FakeCache> {
    RemoteSchemaResolver::new(fetcher, cache, temp.path(), cache_enabled)
}

#[tokio::test]
async fn local_schema_skips_network_and_cache() {
    let temp = tempfile::tempdir().unwrap();
    let r = resolver(FakeFetcher::ok(), FakeCache::new(Restore::Hit), &temp, true);
    let mut reporter = MemoryReporter::new();

    let path = r.resolve("schemas/config.schema.json", &mut reporter).await.unwrap();

    assert_eq!(path, PathBuf::from("schemas/config.schema.json"));
    assert!(r.fetcher().calls().is_empty());
    assert!(r.cache().restores().is_empty());
    assert!(r.cache().saves().is_empty());
    assert!(reporter.emissions().is_empty());
}

#[tokio::test]
async fn cold_cache_fetches_once_and_saves_under_same_key() {
    let temp = tempfile::tempdir().unwrap();
    let r = resolver(FakeFetcher::ok(), FakeCache::new(Restore::Miss), &temp, true);
    let mut reporter = MemoryReporter::new();

    let path = r.resolve(URL, &mut reporter).await.unwrap();

    let expected = materialized_path(temp.path(), URL);
    assert_eq!(path, expected);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SCHEMA);
    assert_eq!(r.fetcher().calls(), vec![URL.to_string()]);

    let restores = r.cache().restores();
    let saves = r.cache().saves();
    assert_eq!(restores, vec![(vec![expected.clone()], KEY.to_string())]);
    assert_eq!(saves, restores);
    assert!(reporter.warnings().is_empty());
}

#[tokio::test]
async fn warm_cache_skips_fetch_and_save() {
    let temp = tempfile::tempdir().unwrap();
    let r = resolver(FakeFetcher::ok(), FakeCache::new(Restore::Hit), &temp, true);
    let mut reporter = MemoryReporter::new();

    let path = r.resolve(URL, &mut reporter).await.unwrap();

    assert_eq!(path, materialized_path(temp.path(), URL));
    assert!(r.fetcher().calls().is_empty());
    assert_eq!(r.cache().restores().len(), 1);
    assert!(r.cache().saves().is_empty());
}

#[tokio::test]
async fn disabled_cache_always_fetches() {
    let temp = tempfile::tempdir().unwrap();
    let r = resolver(FakeFetcher::ok(), FakeCache::new(Restore::Hit), &temp, false);
    let mut reporter = MemoryReporter::new();

    r.resolve(URL, &mut reporter).await.unwrap();
    r.resolve(URL, &mut reporter).await.unwrap();

    assert_eq!(r.fetcher().calls().len(), 2);
    assert!(r.cache().restores().is_empty());
    assert!(r.cache().saves().is_empty());
}

#[tokio::test]
async fn non_200_is_fatal_with_status() {
    let temp = tempfile::tempdir().unwrap();
    let r = resolver(
        FakeFetcher::with(404, "Not Found", "missing"),
        FakeCache::new(Restore::Miss),
        &temp,
        true,
    );
    let mut reporter = MemoryReporter::new();

    let err = r.resolve(URL, &mut reporter).await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to fetch remote schema: 404 - Not Found");
    assert!(!materialized_path(temp.path(), URL).exists());
    assert!(r.cache().saves().is_empty());
}

#[tokio::test]
async fn restore_failure_warns_and_fetches() {
    let temp = tempfile::tempdir().unwrap();
    let r = resolver(FakeFetcher::ok(), FakeCache::new(Restore::Fail), &temp, true);
    let mut reporter = MemoryReporter::new();

    let path = r.resolve(URL, &mut reporter).await.unwrap();

    assert!(path.exists());
    assert_eq!(
        reporter.warnings(),
        vec!["Error while trying to restore cache: cache service unavailable"]
    );
    assert_eq!(r.fetcher().calls().len(), 1);
    assert_eq!(r.cache().saves().len(), 1);
}

#[tokio::test]
async fn save_failure_warns_with_json_payload() {
    let temp = tempfile::tempdir().unwrap();
    let r = resolver(FakeFetcher::ok(), FakeCache::failing_save(), &temp, true);
    let mut reporter = MemoryReporter::new();

    let path = r.resolve(URL, &mut reporter).await.unwrap();

    assert!(path.exists());
    assert_eq!(reporter.warnings(), vec!["Error while trying to save cache: 42"]);
    assert!(reporter.failures().is_empty());
}
