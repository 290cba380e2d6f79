use reqflow_core::config::AppConfig;
use reqflow_core::{
    AuditEvent, DomainError, InMemoryAuditSink, MaterialId, NewAttachment, NewRequest,
    PurchaseRequest, RequestId, RequestItem, RequestPatch, RequestStatus, Session, Unit,
};
use serde::Serialize;

use crate::commands::CommandResult;

const DEMO_MATERIAL: &str = "Lab-Chemicals-3";

#[derive(Debug, Serialize)]
struct DemoReport {
    request: PurchaseRequest,
    steps: Vec<String>,
    rejected_attempt: String,
    audit_events: Vec<AuditEvent>,
}

/// Walks one request through its whole lifecycle against a seeded session and
/// reports the final request, the audit trail and the refused terminal move.
pub fn run(config: &AppConfig) -> CommandResult {
    let sink = InMemoryAuditSink::default();
    let mut session = Session::start(config.clone(), sink.clone());
    let correlation_id = session.requests.session_id().to_string();

    match walk_lifecycle(&mut session) {
        Ok((id, steps, rejected_attempt)) => {
            let Some(request) = session.requests.get(&id).cloned() else {
                return CommandResult::domain_failure(
                    "demo",
                    DomainError::NotFound { id },
                    &correlation_id,
                );
            };
            let message = format!(
                "{} reached {} after {} history entries",
                request.title,
                request.status,
                request.history.len()
            );
            let report =
                DemoReport { request, steps, rejected_attempt, audit_events: sink.events() };
            CommandResult::success_with("demo", message, report)
        }
        Err(error) => CommandResult::domain_failure("demo", error, &correlation_id),
    }
}

fn walk_lifecycle(
    session: &mut Session<InMemoryAuditSink>,
) -> Result<(RequestId, Vec<String>, String), DomainError> {
    let requester = session.default_actor().to_string();
    let approver = "Procurement Manager";
    let mut steps = Vec::new();

    let id = session.requests.create(NewRequest {
        title: "Quarterly lab restock".to_string(),
        requester: requester.clone(),
        department: "Research".to_string(),
        items: vec![RequestItem::new("Nitrile gloves", 20, Unit::Package)],
    })?;
    steps.push(format!("created request {id}"));

    let item = session.add_material(&id, &MaterialId(DEMO_MATERIAL.to_string()), 4, &requester)?;
    steps.push(format!("added catalog material {}", item.name));

    session.requests.add_comment(&id, "Needed before the March experiments.", &requester)?;
    session.requests.add_attachment(
        &id,
        NewAttachment::named("Supplier Quote.pdf"),
        &requester,
    )?;
    steps.push("attached supplier quote".to_string());

    advance(session, &id, RequestStatus::PendingApproval, &requester, None, &mut steps)?;
    advance(
        session,
        &id,
        RequestStatus::Rejected,
        approver,
        Some("Quantity too high for this quarter"),
        &mut steps,
    )?;
    advance(session, &id, RequestStatus::Draft, &requester, None, &mut steps)?;

    session.requests.update(
        &id,
        RequestPatch {
            title: Some("Quarterly lab restock (revised)".to_string()),
            ..RequestPatch::default()
        },
        &requester,
    )?;
    steps.push("revised title".to_string());

    advance(session, &id, RequestStatus::PendingApproval, &requester, None, &mut steps)?;
    advance(session, &id, RequestStatus::Approved, approver, None, &mut steps)?;

    let rejected_attempt =
        match session.requests.change_status(&id, RequestStatus::Draft, approver, None) {
            Ok(outcome) => format!("unexpectedly moved to {}", outcome.to),
            Err(error) => error.to_string(),
        };

    Ok((id, steps, rejected_attempt))
}

fn advance(
    session: &mut Session<InMemoryAuditSink>,
    id: &RequestId,
    to: RequestStatus,
    actor: &str,
    comment: Option<&str>,
    steps: &mut Vec<String>,
) -> Result<(), DomainError> {
    let outcome = session.requests.change_status(id, to, actor, comment)?;
    steps.push(format!("{}: {} -> {}", outcome.action, outcome.from, outcome.to));
    Ok(())
}

#[cfg(test)]
mod tests {
    use reqflow_core::config::AppConfig;
    use serde_json::Value;

    use super::run;

    #[test]
    fn demo_ends_approved_and_refuses_reopening() {
        let result = run(&AppConfig::default());
        let payload: Value = serde_json::from_str(&result.output).expect("json");

        assert_eq!(result.exit_code, 0, "{}", result.output);
        assert_eq!(payload["data"]["request"]["status"], "Approved");
        assert_eq!(payload["data"]["request"]["title"], "Quarterly lab restock (revised)");
        assert_eq!(
            payload["data"]["rejected_attempt"],
            "Invalid transition from Approved to Draft"
        );

        // created, material, comment, attachment, 5 status changes, title update
        let history = payload["data"]["request"]["history"].as_array().expect("history");
        assert_eq!(history.len(), 10);
        assert_eq!(payload["data"]["request"]["notes"].as_array().map(Vec::len), Some(1));
        assert_eq!(
            payload["data"]["request"]["attachments"][0]["file_url"],
            "#supplier-quote.pdf"
        );
    }

    #[test]
    fn demo_audit_trail_records_the_refused_move() {
        let payload: Value =
            serde_json::from_str(&run(&AppConfig::default()).output).expect("json");
        let events = payload["data"]["audit_events"].as_array().expect("events");

        let rejected = events
            .iter()
            .filter(|event| event["event_type"] == "workflow.transition_rejected")
            .count();
        assert_eq!(rejected, 1);
        assert!(events.iter().all(|event| event["correlation_id"] == events[0]["correlation_id"]));
    }
}
