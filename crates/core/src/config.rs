use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::catalog::{DEFAULT_ITEMS_PER_SUBCATEGORY, DEFAULT_QUICK_SEARCH_LIMIT};
use crate::store::requests::StorePolicy;

pub const DEFAULT_ACTOR: &str = "Current User";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub workflow: WorkflowConfig,
    pub catalog: CatalogConfig,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorkflowConfig {
    pub draft_only_edits: bool,
    pub default_actor: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogConfig {
    pub items_per_subcategory: u32,
    pub quick_search_limit: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeedConfig {
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub draft_only_edits: Option<bool>,
    pub default_actor: Option<String>,
    pub items_per_subcategory: Option<u32>,
    pub quick_search_limit: Option<usize>,
    pub seed_enabled: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workflow: WorkflowConfig {
                draft_only_edits: true,
                default_actor: DEFAULT_ACTOR.to_string(),
            },
            catalog: CatalogConfig {
                items_per_subcategory: DEFAULT_ITEMS_PER_SUBCATEGORY,
                quick_search_limit: DEFAULT_QUICK_SEARCH_LIMIT,
            },
            seed: SeedConfig { enabled: true },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("reqflow.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn store_policy(&self) -> StorePolicy {
        StorePolicy { draft_only_edits: self.workflow.draft_only_edits }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(workflow) = patch.workflow {
            if let Some(draft_only_edits) = workflow.draft_only_edits {
                self.workflow.draft_only_edits = draft_only_edits;
            }
            if let Some(default_actor) = workflow.default_actor {
                self.workflow.default_actor = default_actor;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(items_per_subcategory) = catalog.items_per_subcategory {
                self.catalog.items_per_subcategory = items_per_subcategory;
            }
            if let Some(quick_search_limit) = catalog.quick_search_limit {
                self.catalog.quick_search_limit = quick_search_limit;
            }
        }

        if let Some(seed) = patch.seed {
            if let Some(enabled) = seed.enabled {
                self.seed.enabled = enabled;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("REQFLOW_WORKFLOW_DRAFT_ONLY_EDITS") {
            self.workflow.draft_only_edits =
                parse_bool("REQFLOW_WORKFLOW_DRAFT_ONLY_EDITS", &value)?;
        }
        if let Some(value) = read_env("REQFLOW_WORKFLOW_DEFAULT_ACTOR") {
            self.workflow.default_actor = value;
        }

        if let Some(value) = read_env("REQFLOW_CATALOG_ITEMS_PER_SUBCATEGORY") {
            self.catalog.items_per_subcategory =
                parse_u32("REQFLOW_CATALOG_ITEMS_PER_SUBCATEGORY", &value)?;
        }
        if let Some(value) = read_env("REQFLOW_CATALOG_QUICK_SEARCH_LIMIT") {
            self.catalog.quick_search_limit =
                parse_usize("REQFLOW_CATALOG_QUICK_SEARCH_LIMIT", &value)?;
        }

        if let Some(value) = read_env("REQFLOW_SEED_ENABLED") {
            self.seed.enabled = parse_bool("REQFLOW_SEED_ENABLED", &value)?;
        }

        let log_level = read_env("REQFLOW_LOGGING_LEVEL").or_else(|| read_env("REQFLOW_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("REQFLOW_LOGGING_FORMAT").or_else(|| read_env("REQFLOW_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(draft_only_edits) = overrides.draft_only_edits {
            self.workflow.draft_only_edits = draft_only_edits;
        }
        if let Some(default_actor) = overrides.default_actor {
            self.workflow.default_actor = default_actor;
        }
        if let Some(items_per_subcategory) = overrides.items_per_subcategory {
            self.catalog.items_per_subcategory = items_per_subcategory;
        }
        if let Some(quick_search_limit) = overrides.quick_search_limit {
            self.catalog.quick_search_limit = quick_search_limit;
        }
        if let Some(seed_enabled) = overrides.seed_enabled {
            self.seed.enabled = seed_enabled;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_workflow(&self.workflow)?;
        validate_catalog(&self.catalog)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("reqflow.toml"), PathBuf::from("config/reqflow.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_workflow(workflow: &WorkflowConfig) -> Result<(), ConfigError> {
    if workflow.default_actor.trim().is_empty() {
        return Err(ConfigError::Validation(
            "workflow.default_actor must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.items_per_subcategory == 0 || catalog.items_per_subcategory > 999 {
        return Err(ConfigError::Validation(
            "catalog.items_per_subcategory must be in range 1..=999".to_string(),
        ));
    }

    if catalog.quick_search_limit == 0 {
        return Err(ConfigError::Validation(
            "catalog.quick_search_limit must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

/// Value of an env override; blank values count as unset.
pub fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    workflow: Option<WorkflowPatch>,
    catalog: Option<CatalogPatch>,
    seed: Option<SeedPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkflowPatch {
    draft_only_edits: Option<bool>,
    default_actor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    items_per_subcategory: Option<u32>,
    quick_search_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct SeedPatch {
    enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
