//! # Run Configuration
//!
//! Every input can be given as a flag or through the CI input environment
//! (`INPUT_<NAME>`). Inputs are resolved once at start into a [`RunConfig`].
//!
//! | Input                 | Flag                    | Environment                  |
//! |-----------------------|-------------------------|------------------------------|
//! | `schema`              | `--schema`              | `INPUT_SCHEMA`               |
//! | `files`               | `--files`               | `INPUT_FILES`                |
//! | `cache-remote-schema` | `--cache-remote-schema` | `INPUT_CACHE-REMOTE-SCHEMA`  |
//! | `fail-on-invalid`     | `--fail-on-invalid`     | `INPUT_FAIL-ON-INVALID`      |
//! | `all-errors`          | `--all-errors`          | `INPUT_ALL-ERRORS`           |
//! | `custom-errors`       | `--custom-errors`       | `INPUT_CUSTOM-ERRORS`        |

use std::path::PathBuf;

use clap::Parser;
use jsv_remote::{is_remote, RemoteConfig};
use jsv_schema::ValidationOptions;

/// Schema input value that switches the run to schema-document mode.
pub const SCHEMA_DOCUMENTS_SENTINEL: &str = "json-schema";

const TRUE_VALUES: &[&str] = &["true", "True", "TRUE"];
const FALSE_VALUES: &[&str] = &["false", "False", "FALSE"];

/// Validate YAML and JSON files against a JSON Schema.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "jsv", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Schema path, schema URL, or `json-schema` to validate schema documents.
    #[arg(long, env = "INPUT_SCHEMA")]
    pub schema: Option<String>,

    /// File patterns, one per line. Repeatable.
    #[arg(long, env = "INPUT_FILES")]
    pub files: Vec<String>,

    /// Cache schemas fetched from a URL.
    #[arg(long, env = "INPUT_CACHE-REMOTE-SCHEMA", num_args = 0..=1, default_missing_value = "true")]
    pub cache_remote_schema: Option<String>,

    /// Exit with status 1 when any file is invalid.
    #[arg(long, env = "INPUT_FAIL-ON-INVALID", num_args = 0..=1, default_missing_value = "true")]
    pub fail_on_invalid: Option<String>,

    /// Report every keyword failure instead of only the first.
    #[arg(long, env = "INPUT_ALL-ERRORS", num_args = 0..=1, default_missing_value = "true")]
    pub all_errors: Option<String>,

    /// Apply `errorMessage` annotations from the schema. Implies all errors.
    #[arg(long, env = "INPUT_CUSTOM-ERRORS", num_args = 0..=1, default_missing_value = "true")]
    pub custom_errors: Option<String>,

    /// Directory remote schemas are downloaded into.
    #[arg(long, env = "RUNNER_TEMP")]
    pub temp_dir: Option<PathBuf>,

    /// Root directory of the local schema cache.
    #[arg(long, env = "JSV_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// HTTP timeout in seconds for fetching remote schemas.
    #[arg(long, env = "JSV_HTTP_TIMEOUT", default_value_t = jsv_remote::config::DEFAULT_TIMEOUT_SECS)]
    pub http_timeout: u64,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error("Input does not meet YAML 1.2 \"Core Schema\" specification: {0}")]
    InvalidBoolean(&'static str),
}

/// Where the schema comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Files are schema documents, checked against their meta-schemas.
    Documents,
    /// Schema fetched from an `http://` or `https://` URL.
    Remote(String),
    /// Schema read from a local path.
    Local(String),
}

impl SchemaSource {
    pub fn parse(input: &str) -> Self {
        if input == SCHEMA_DOCUMENTS_SENTINEL {
            Self::Documents
        } else if is_remote(input) {
            Self::Remote(input.to_string())
        } else {
            Self::Local(input.to_string())
        }
    }
}

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source: SchemaSource,
    pub patterns: Vec<String>,
    pub fail_on_invalid: bool,
    pub options: ValidationOptions,
    pub remote: RemoteConfig,
}

impl RunConfig {
    /// Resolve inputs. `schema` is checked before `files`.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let schema = cli
            .schema
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingInput("schema"))?;

        let patterns = multiline_input(&cli.files);
        if patterns.is_empty() {
            return Err(ConfigError::MissingInput("files"));
        }

        let cache_enabled = boolean_input("cache-remote-schema", cli.cache_remote_schema.as_deref())?;
        let fail_on_invalid = boolean_input("fail-on-invalid", cli.fail_on_invalid.as_deref())?;
        let options = ValidationOptions {
            all_errors: boolean_input("all-errors", cli.all_errors.as_deref())?,
            custom_errors: boolean_input("custom-errors", cli.custom_errors.as_deref())?,
        };

        let defaults = RemoteConfig::default();
        let remote = RemoteConfig {
            temp_dir: cli
                .temp_dir
                .clone()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(defaults.temp_dir),
            cache_dir: cli.cache_dir.clone().unwrap_or(defaults.cache_dir),
            timeout_secs: cli.http_timeout,
            cache_enabled,
        };

        Ok(Self {
            source: SchemaSource::parse(schema),
            patterns,
            fail_on_invalid,
            options,
            remote,
        })
    }
}

/// Split every value on newlines, trim lines, and drop empty ones.
pub fn multiline_input(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.lines())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a boolean input. Absent or blank means `false`.
pub fn boolean_input(name: &'static str, value: Option<&str>) -> Result<bool, ConfigError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() || FALSE_VALUES.contains(&value) {
        Ok(false)
    } else if TRUE_VALUES.contains(&value) {
        Ok(true)
    } else {
        Err(ConfigError::InvalidBoolean(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(schema: Option<&str>, files: &[&str]) -> Cli {
        Cli {
            schema: schema.map(String::from),
            files: files.iter().map(|s| s.to_string()).collect(),
            http_timeout: 30,
            ..Cli::default()
        }
    }

    #[test]
    fn schema_is_required_first() {
        let err = RunConfig::from_cli(&cli(None, &[])).unwrap_err();
        assert_eq!(err.to_string(), "Input required and not supplied: schema");
        let err = RunConfig::from_cli(&cli(Some("  "), &["*.yml"])).unwrap_err();
        assert_eq!(err.to_string(), "Input required and not supplied: schema");
    }

    #[test]
    fn files_are_required() {
        let err = RunConfig::from_cli(&cli(Some("schema.json"), &[])).unwrap_err();
        assert_eq!(err.to_string(), "Input required and not supplied: files");
        let err = RunConfig::from_cli(&cli(Some("schema.json"), &["\n  \n"])).unwrap_err();
        assert_eq!(err.to_string(), "Input required and not supplied: files");
    }

    #[test]
    fn files_input_is_multiline() {
        assert_eq!(
            multiline_input(&["a/*.yml\n  b/**/*.json  \n\n".into(), "c.yml".into()]),
            vec!["a/*.yml", "b/**/*.json", "c.yml"]
        );
    }

    #[test]
    fn booleans_follow_yaml_core_schema() {
        for v in ["true", "True", "TRUE"] {
            assert!(boolean_input("x", Some(v)).unwrap());
        }
        for v in ["false", "False", "FALSE", "", " "] {
            assert!(!boolean_input("x", Some(v)).unwrap());
        }
        assert!(!boolean_input("x", None).unwrap());
        let err = boolean_input("fail-on-invalid", Some("yes")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Input does not meet YAML 1.2 \"Core Schema\" specification: fail-on-invalid"
        );
    }

    #[test]
    fn schema_source_classification() {
        assert_eq!(SchemaSource::parse("json-schema"), SchemaSource::Documents);
        assert_eq!(
            SchemaSource::parse("https://foo.bar/schema.json"),
            SchemaSource::Remote("https://foo.bar/schema.json".into())
        );
        assert_eq!(
            SchemaSource::parse("schemas/config.schema.json"),
            SchemaSource::Local("schemas/config.schema.json".into())
        );
    }

    #[test]
    fn full_config_resolves() {
        let mut c = cli(Some(" https://foo.bar/schema.json "), &["config/*.yml"]);
        c.cache_remote_schema = Some("true".into());
        c.custom_errors = Some("TRUE".into());
        c.temp_dir = Some(PathBuf::from("/runner/tmp"));
        c.cache_dir = Some(PathBuf::from("/var/cache/jsv"));
        let cfg = RunConfig::from_cli(&c).unwrap();
        assert_eq!(cfg.source, SchemaSource::Remote("https://foo.bar/schema.json".into()));
        assert!(cfg.remote.cache_enabled);
        assert!(!cfg.fail_on_invalid);
        assert!(cfg.options.custom_errors);
        assert!(cfg.options.effective_all_errors());
        assert_eq!(cfg.remote.temp_dir, PathBuf::from("/runner/tmp"));
        assert_eq!(cfg.remote.cache_dir, PathBuf::from("/var/cache/jsv"));
    }

    #[test]
    fn flags_parse_with_and_without_values() {
        let c = Cli::try_parse_from([
            "jsv",
            "--schema",
            "s.json",
            "--files",
            "a.yml",
            "--files",
            "b.yml",
            "--fail-on-invalid",
            "--all-errors",
            "false",
            "-vv",
        ])
        .unwrap();
        assert_eq!(c.verbose, 2);
        assert_eq!(c.files, vec!["a.yml", "b.yml"]);
        assert_eq!(c.fail_on_invalid.as_deref(), Some("true"));
        assert_eq!(c.all_errors.as_deref(), Some("false"));
    }
}
