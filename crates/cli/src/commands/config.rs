use std::fs;
use std::path::{Path, PathBuf};

use reqflow_core::config::{read_env, AppConfig};
use serde::Serialize;
use toml::Value;

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

/// Effective configuration with the layer each value came from (env > file > default).
pub fn run(config: &AppConfig, config_path: Option<&Path>) -> super::CommandResult {
    let config_file_path = detect_config_path(config_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: [(&'static str, &[&str], String); 7] = [
        (
            "workflow.draft_only_edits",
            &["REQFLOW_WORKFLOW_DRAFT_ONLY_EDITS"],
            config.workflow.draft_only_edits.to_string(),
        ),
        (
            "workflow.default_actor",
            &["REQFLOW_WORKFLOW_DEFAULT_ACTOR"],
            config.workflow.default_actor.clone(),
        ),
        (
            "catalog.items_per_subcategory",
            &["REQFLOW_CATALOG_ITEMS_PER_SUBCATEGORY"],
            config.catalog.items_per_subcategory.to_string(),
        ),
        (
            "catalog.quick_search_limit",
            &["REQFLOW_CATALOG_QUICK_SEARCH_LIMIT"],
            config.catalog.quick_search_limit.to_string(),
        ),
        ("seed.enabled", &["REQFLOW_SEED_ENABLED"], config.seed.enabled.to_string()),
        (
            "logging.level",
            &["REQFLOW_LOGGING_LEVEL", "REQFLOW_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        (
            "logging.format",
            &["REQFLOW_LOGGING_FORMAT", "REQFLOW_LOG_FORMAT"],
            format!("{:?}", config.logging.format).to_lowercase(),
        ),
    ];

    let entries = fields
        .into_iter()
        .map(|(key, env_keys, value)| ConfigEntry {
            key,
            value,
            source: field_source(
                key,
                env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        })
        .collect::<Vec<_>>();

    super::CommandResult::success_with(
        "config",
        "effective config (source precedence: env > file > default)",
        entries,
    )
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("reqflow.toml"), PathBuf::from("config/reqflow.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| read_env(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
