//! # Validation Run
//!
//! One run: resolve the schema, build the dispatcher, validate every
//! matching file, then publish the `valid` output. All fatal conditions
//! surface as a [`RunError`] and are reported once, at [`finish`].

use std::path::{Path, PathBuf};

use jsv_core::{failure_message, Annotation, Reporter};
use jsv_remote::{
    CacheStore, DirCacheStore, HttpFetcher, RemoteError, RemoteSchemaResolver, SchemaFetcher,
};
use jsv_schema::{parse_document, Dispatcher, SchemaError, ValidationError};

use crate::config::{Cli, ConfigError, RunConfig, SchemaSource};
use crate::glob::{FileMatcher, PatternError};

/// Title of every per-error record.
pub const VALIDATION_ERROR_TITLE: &str = "JSON Schema Validation Error";
/// Name of the published output.
pub const VALID_OUTPUT: &str = "valid";

/// Fatal run failures. `Display` is the user-facing failure message.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("No files to validate")]
    NoFiles,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
}

/// Aggregate result of the file loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Every validated file passed.
    pub valid: bool,
    /// At least one file was validated.
    pub files_validated: bool,
}

impl Default for RunOutcome {
    fn default() -> Self {
        Self {
            valid: true,
            files_validated: false,
        }
    }
}

impl RunOutcome {
    /// Exit status for a completed run.
    pub fn exit_code(&self, fail_on_invalid: bool) -> u8 {
        u8::from(!self.valid && fail_on_invalid)
    }
}

async fn read_document(path: &Path) -> Result<serde_json::Value, RunError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RunError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_document(&text).map_err(|source| RunError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the dispatcher for the configured schema source.
pub async fn build_dispatcher<F, C, R>(
    config: &RunConfig,
    resolver: &RemoteSchemaResolver<F, C>,
    base_dir: &Path,
    reporter: &mut R,
) -> Result<Dispatcher, RunError>
where
    F: SchemaFetcher,
    C: CacheStore,
    R: Reporter,
{
    let source = match &config.source {
        SchemaSource::Documents => {
            tracing::info!("validating schema documents");
            return Ok(Dispatcher::for_schema_documents(config.options));
        }
        SchemaSource::Remote(s) | SchemaSource::Local(s) => s,
    };

    let schema_path = base_dir.join(resolver.resolve(source, reporter).await?);
    tracing::info!(schema = %schema_path.display(), "loading schema");
    let schema = read_document(&schema_path).await?;
    Ok(Dispatcher::for_instances(&schema, config.options)?)
}

fn report_invalid<R: Reporter>(reporter: &mut R, path: &str, errors: &[ValidationError]) {
    reporter.debug(&format!("✗ {path} is not valid"));
    let annotation = Annotation::new(VALIDATION_ERROR_TITLE, path);
    for error in errors {
        reporter.error(
            &format!("Error while validating file: {path}\n{}", error.to_pretty_json()),
            &annotation,
        );
    }
}

/// Validate every file yielded by `files` and publish the `valid` output.
pub async fn validate_files<I, R>(
    dispatcher: &Dispatcher,
    files: I,
    reporter: &mut R,
) -> Result<RunOutcome, RunError>
where
    I: IntoIterator<Item = PathBuf>,
    R: Reporter,
{
    let mut outcome = RunOutcome::default();

    for file in files {
        outcome.files_validated = true;
        let display = file.display().to_string();
        let document = read_document(&file).await?;

        let errors = match dispatcher.validate(&document) {
            Ok(errors) => errors,
            Err(e) => {
                reporter.debug(&format!("✗ {display} is not valid"));
                reporter.error(
                    &format!("Error while validating file: {display}\n{e}"),
                    &Annotation::new(VALIDATION_ERROR_TITLE, display.as_str()),
                );
                return Err(e.into());
            }
        };

        if errors.is_empty() {
            reporter.debug(&format!("✓ {display} is valid"));
        } else {
            outcome.valid = false;
            report_invalid(reporter, &display, &errors);
        }
    }

    if !outcome.files_validated {
        return Err(RunError::NoFiles);
    }

    tracing::info!(valid = outcome.valid, "validation finished");
    reporter.set_output(VALID_OUTPUT, if outcome.valid { "true" } else { "false" });
    Ok(outcome)
}

/// Full run with the given collaborators.
pub async fn run<F, C, R>(
    config: &RunConfig,
    resolver: &RemoteSchemaResolver<F, C>,
    base_dir: &Path,
    reporter: &mut R,
) -> Result<RunOutcome, RunError>
where
    F: SchemaFetcher,
    C: CacheStore,
    R: Reporter,
{
    let dispatcher = build_dispatcher(config, resolver, base_dir, reporter).await?;
    let matcher = FileMatcher::new(&config.patterns, base_dir)?;
    validate_files(&dispatcher, matcher.files(), reporter).await
}

/// The single top-level boundary: report a fatal error once, or turn the
/// outcome into an exit status.
pub fn finish<R: Reporter>(
    result: Result<RunOutcome, RunError>,
    fail_on_invalid: bool,
    reporter: &mut R,
) -> u8 {
    match result {
        Ok(outcome) => outcome.exit_code(fail_on_invalid),
        Err(e) => {
            let err = anyhow::Error::new(e);
            reporter.debug(&format!("{err:?}"));
            reporter.set_failed(&failure_message(&*err));
            1
        }
    }
}

/// Resolve configuration from `cli`, run with the HTTP fetcher and the
/// directory cache, and return the exit status.
pub async fn execute<R: Reporter>(cli: &Cli, base_dir: &Path, reporter: &mut R) -> u8 {
    let config = match RunConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => return finish(Err(e.into()), false, reporter),
    };
    tracing::debug!(?config, "configuration resolved");

    let fetcher = match HttpFetcher::new(config.remote.timeout_secs) {
        Ok(fetcher) => fetcher,
        Err(e) => return finish(Err(e.into()), config.fail_on_invalid, reporter),
    };
    let resolver = RemoteSchemaResolver::new(
        fetcher,
        DirCacheStore::new(&config.remote.cache_dir),
        &config.remote.temp_dir,
        config.remote.cache_enabled,
    );

    let result = run(&config, &resolver, base_dir, reporter).await;
    finish(result, config.fail_on_invalid, reporter)
}
