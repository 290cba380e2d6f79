use reqflow_core::config::AppConfig;
use reqflow_core::{
    DomainError, PurchaseRequest, RequestId, RequestStatus, Session, WorkflowTransition,
};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_VALIDATION};

#[derive(Debug, Serialize)]
struct RequestSummary<'a> {
    id: &'a RequestId,
    title: &'a str,
    requester: &'a str,
    department: &'a str,
    status: RequestStatus,
    created_at: String,
    item_count: usize,
    total_quantity: u64,
    last_activity: Option<String>,
}

impl<'a> From<&'a PurchaseRequest> for RequestSummary<'a> {
    fn from(request: &'a PurchaseRequest) -> Self {
        Self {
            id: &request.id,
            title: &request.title,
            requester: &request.requester,
            department: &request.department,
            status: request.status,
            created_at: request.created_at.to_rfc3339(),
            item_count: request.items.len(),
            total_quantity: request.total_quantity(),
            last_activity: request.latest_entry().map(|entry| entry.action.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestDetail<'a> {
    request: &'a PurchaseRequest,
    total_quantity: u64,
    editable: bool,
    available_actions: &'static [WorkflowTransition],
}

/// Lists requests, optionally narrowed by status and a title/requester/department search.
pub fn list(config: &AppConfig, status: Option<&str>, search: Option<&str>) -> CommandResult {
    let status = match status.map(str::parse::<RequestStatus>).transpose() {
        Ok(status) => status,
        Err(error) => {
            return CommandResult::failure(
                "requests",
                "validation",
                error.to_string(),
                EXIT_VALIDATION,
            )
        }
    };

    let session = Session::from_config(config.clone());
    let matches = session
        .requests
        .search(search.unwrap_or_default())
        .into_iter()
        .filter(|request| status.map_or(true, |status| request.status == status))
        .map(RequestSummary::from)
        .collect::<Vec<_>>();

    let message = match status {
        Some(status) => format!("{} request(s) with status {status}", matches.len()),
        None => format!("{} request(s)", matches.len()),
    };
    CommandResult::success_with("requests", message, matches)
}

pub fn show(config: &AppConfig, id: &str) -> CommandResult {
    let session = Session::from_config(config.clone());
    let id = RequestId(id.trim().to_string());

    let Some(request) = session.requests.get(&id) else {
        return CommandResult::domain_failure(
            "show",
            DomainError::NotFound { id },
            session.requests.session_id(),
        );
    };

    let detail = RequestDetail {
        request,
        total_quantity: request.total_quantity(),
        editable: request.is_editable(),
        available_actions: session.requests.available_transitions(&request.id).unwrap_or(&[]),
    };
    CommandResult::success_with("show", format!("{} ({})", request.title, request.status), detail)
}

#[cfg(test)]
mod tests {
    use reqflow_core::config::AppConfig;
    use reqflow_core::seed::deterministic_id;
    use serde_json::Value;

    use super::{list, show};

    fn payload(output: &str) -> Value {
        serde_json::from_str(output).expect("command output is json")
    }

    #[test]
    fn list_returns_every_seeded_request() {
        let result = list(&AppConfig::default(), None, None);
        let payload = payload(&result.output);

        assert_eq!(result.exit_code, 0);
        assert_eq!(payload["data"].as_array().map(Vec::len), Some(4));
        assert_eq!(payload["data"][0]["title"], "Office Supplies Q1 2024");
        assert_eq!(payload["data"][0]["last_activity"], "Status Changed");
    }

    #[test]
    fn list_combines_status_and_search() {
        let result = list(&AppConfig::default(), Some("pending"), Some("lab"));
        let payload = payload(&result.output);

        assert_eq!(payload["data"].as_array().map(Vec::len), Some(1));
        assert_eq!(payload["data"][0]["status"], "Pending Approval");
        assert_eq!(payload["message"], "1 request(s) with status Pending Approval");
    }

    #[test]
    fn unknown_status_is_a_validation_failure() {
        let result = list(&AppConfig::default(), Some("archived"), None);
        let payload = payload(&result.output);

        assert_eq!(result.exit_code, 3);
        assert_eq!(payload["error_class"], "validation");
    }

    #[test]
    fn show_includes_available_actions() {
        let id = deterministic_id("Lab Equipment Upgrade-1");
        let result = show(&AppConfig::default(), &id);
        let payload = payload(&result.output);

        assert_eq!(result.exit_code, 0);
        assert_eq!(payload["data"]["request"]["id"], id.as_str());
        assert_eq!(payload["data"]["editable"], false);
        let actions = payload["data"]["available_actions"].as_array().expect("actions");
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0]["action"], "Approve");
    }
}
