pub mod catalog;
pub mod config;
pub mod demo;
pub mod requests;
pub mod transitions;

use std::path::PathBuf;

use anyhow::Context;
use reqflow_core::config::{AppConfig, LoadOptions};
use reqflow_core::{ApplicationError, DomainError};
use serde::Serialize;
use serde_json::Value;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_VALIDATION: u8 = 3;
pub const EXIT_NOT_FOUND: u8 = 4;
pub const EXIT_CONFLICT: u8 = 5;
pub const EXIT_INTERNAL: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    /// Success with a structured `data` body next to the summary message.
    pub fn success_with(command: &str, message: impl Into<String>, data: impl Serialize) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), EXIT_INTERNAL)
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Maps a store error onto the interface error classes and their exit codes.
    pub fn domain_failure(command: &str, error: DomainError, correlation_id: &str) -> Self {
        let interface = ApplicationError::from(error).into_interface(correlation_id);
        let exit_code = match interface.error_class() {
            "validation" => EXIT_VALIDATION,
            "not_found" => EXIT_NOT_FOUND,
            "invalid_transition" => EXIT_CONFLICT,
            _ => EXIT_INTERNAL,
        };
        Self::failure(command, interface.error_class(), interface.to_string(), exit_code)
    }
}

/// Loads the layered config; an explicit path must exist.
pub fn load_config(config_path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let require_file = config_path.is_some();
    let options = LoadOptions { config_path, require_file, ..LoadOptions::default() };
    AppConfig::load(options).context("loading reqflow configuration")
}

pub fn config_failure(command: &str, error: &anyhow::Error) -> CommandResult {
    CommandResult::failure(command, "config_validation", format!("{error:#}"), EXIT_CONFIG)
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use reqflow_core::{DomainError, RequestId};
    use serde_json::Value;

    use super::{CommandResult, EXIT_NOT_FOUND};

    #[test]
    fn success_carries_data_and_failure_omits_it() {
        let result = CommandResult::success_with("transitions", "1 transition(s)", ["Draft"]);
        let payload: Value = serde_json::from_str(&result.output).expect("json");

        assert_eq!(result.exit_code, 0);
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"][0], "Draft");
        assert!(payload["error_class"].is_null());

        let failure = CommandResult::failure("transitions", "validation", "bad status", 3);
        let payload: Value = serde_json::from_str(&failure.output).expect("json");
        assert!(payload.get("data").is_none());
    }

    #[test]
    fn domain_failure_carries_class_and_exit_code() {
        let result = CommandResult::domain_failure(
            "show",
            DomainError::NotFound { id: RequestId("nope".to_string()) },
            "session-1",
        );
        let payload: Value = serde_json::from_str(&result.output).expect("json");

        assert_eq!(result.exit_code, EXIT_NOT_FOUND);
        assert_eq!(payload["error_class"], "not_found");
        assert_eq!(payload["message"], "not found: request `nope` not found");
    }
}
