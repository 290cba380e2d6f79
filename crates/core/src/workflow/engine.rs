use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::request::{
    HistoryAction, HistoryLog, PurchaseRequest, RequestId, RequestStatus,
};
use crate::workflow::transitions::{valid_transitions, WorkflowAction, WorkflowTransition};

pub trait WorkflowDefinition {
    fn initial_status(&self) -> RequestStatus;
    fn transitions_from(&self, status: RequestStatus) -> &'static [WorkflowTransition];
}

#[derive(Clone, Debug, Default)]
pub struct PurchaseApprovalFlow;

impl WorkflowDefinition for PurchaseApprovalFlow {
    fn initial_status(&self) -> RequestStatus {
        RequestStatus::Draft
    }

    fn transitions_from(&self, status: RequestStatus) -> &'static [WorkflowTransition] {
        valid_transitions(status)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: RequestStatus, to: RequestStatus },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub request_id: RequestId,
    pub from: RequestStatus,
    pub to: RequestStatus,
    pub action: WorkflowAction,
    pub entry_id: String,
}

#[derive(Clone, Debug)]
pub struct WorkflowEngine<F = PurchaseApprovalFlow> {
    flow: F,
}

impl<F> WorkflowEngine<F>
where
    F: WorkflowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_status(&self) -> RequestStatus {
        self.flow.initial_status()
    }

    pub fn available_actions(&self, status: RequestStatus) -> &'static [WorkflowTransition] {
        self.flow.transitions_from(status)
    }

    pub fn resolve(
        &self,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<WorkflowTransition, WorkflowError> {
        self.flow
            .transitions_from(from)
            .iter()
            .find(|transition| transition.to == to)
            .copied()
            .ok_or(WorkflowError::InvalidTransition { from, to })
    }

    /// Moves `request` to `to` and appends one `Status Changed` entry.
    ///
    /// On error the request is not touched.
    pub fn apply(
        &self,
        request: &mut PurchaseRequest,
        to: RequestStatus,
        actor: &str,
        comment: Option<&str>,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let from = request.status;
        let transition = self.resolve(from, to)?;

        let comment = comment
            .map(str::trim)
            .filter(|comment| !comment.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Status changed from {from} to {to}"));
        let entry = HistoryLog::new(actor, HistoryAction::StatusChanged, Some(comment));
        let entry_id = entry.id.clone();

        request.status = to;
        request.record(entry);

        Ok(TransitionOutcome {
            request_id: request.id.clone(),
            from,
            to,
            action: transition.action,
            entry_id,
        })
    }

    pub fn apply_with_audit<S>(
        &self,
        request: &mut PurchaseRequest,
        to: RequestStatus,
        actor: &str,
        comment: Option<&str>,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, WorkflowError>
    where
        S: AuditSink + ?Sized,
    {
        let from = request.status;
        let result = self.apply(request, to, actor, comment);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "workflow.transition_applied",
                        AuditCategory::Workflow,
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", outcome.from.label())
                    .with_metadata("to", outcome.to.label())
                    .with_metadata("action", outcome.action.label()),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "workflow.transition_rejected",
                        AuditCategory::Workflow,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("from", from.label())
                    .with_metadata("to", to.label())
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

impl Default for WorkflowEngine<PurchaseApprovalFlow> {
    fn default() -> Self {
        Self::new(PurchaseApprovalFlow)
    }
}
