use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::request::RequestStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowAction {
    #[serde(rename = "Submit for Approval")]
    Submit,
    Approve,
    Reject,
    Withdraw,
    Revise,
}

impl WorkflowAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submit => "Submit for Approval",
            Self::Approve => "Approve",
            Self::Reject => "Reject",
            Self::Withdraw => "Withdraw",
            Self::Revise => "Revise",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTransition {
    pub from: RequestStatus,
    pub to: RequestStatus,
    pub action: WorkflowAction,
}

const fn transition(
    from: RequestStatus,
    to: RequestStatus,
    action: WorkflowAction,
) -> WorkflowTransition {
    WorkflowTransition { from, to, action }
}

static FROM_DRAFT: [WorkflowTransition; 1] =
    [transition(RequestStatus::Draft, RequestStatus::PendingApproval, WorkflowAction::Submit)];

static FROM_PENDING_APPROVAL: [WorkflowTransition; 3] = [
    transition(RequestStatus::PendingApproval, RequestStatus::Approved, WorkflowAction::Approve),
    transition(RequestStatus::PendingApproval, RequestStatus::Rejected, WorkflowAction::Reject),
    transition(RequestStatus::PendingApproval, RequestStatus::Draft, WorkflowAction::Withdraw),
];

static FROM_REJECTED: [WorkflowTransition; 1] =
    [transition(RequestStatus::Rejected, RequestStatus::Draft, WorkflowAction::Revise)];

/// Transitions leaving `status`, in table order. `Approved` has none.
pub fn valid_transitions(status: RequestStatus) -> &'static [WorkflowTransition] {
    match status {
        RequestStatus::Draft => &FROM_DRAFT,
        RequestStatus::PendingApproval => &FROM_PENDING_APPROVAL,
        RequestStatus::Approved => &[],
        RequestStatus::Rejected => &FROM_REJECTED,
    }
}

pub fn find_transition(from: RequestStatus, to: RequestStatus) -> Option<WorkflowTransition> {
    valid_transitions(from).iter().find(|transition| transition.to == to).copied()
}

/// The whole table in declaration order.
pub fn all_transitions() -> impl Iterator<Item = &'static WorkflowTransition> {
    FROM_DRAFT.iter().chain(FROM_PENDING_APPROVAL.iter()).chain(FROM_REJECTED.iter())
}

#[cfg(test)]
mod tests {
    use super::{all_transitions, find_transition, valid_transitions, WorkflowAction};
    use crate::domain::request::RequestStatus;

    #[test]
    fn rejected_has_single_revise_transition_to_draft() {
        let transitions = valid_transitions(RequestStatus::Rejected);

        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].to, RequestStatus::Draft);
        assert_eq!(transitions[0].action.label(), "Revise");
    }

    #[test]
    fn pending_approval_transitions_keep_declared_order() {
        let actions = valid_transitions(RequestStatus::PendingApproval)
            .iter()
            .map(|transition| transition.action)
            .collect::<Vec<_>>();

        assert_eq!(
            actions,
            vec![WorkflowAction::Approve, WorkflowAction::Reject, WorkflowAction::Withdraw]
        );
    }

    #[test]
    fn approved_is_terminal() {
        assert!(valid_transitions(RequestStatus::Approved).is_empty());
    }

    #[test]
    fn per_status_lookup_agrees_with_full_table() {
        for status in RequestStatus::ALL {
            let filtered = all_transitions()
                .filter(|transition| transition.from == status)
                .copied()
                .collect::<Vec<_>>();

            assert_eq!(valid_transitions(status), filtered.as_slice(), "mismatch for {status}");
        }
        assert_eq!(all_transitions().count(), 5);
    }

    #[test]
    fn find_transition_only_returns_table_rows() {
        assert_eq!(
            find_transition(RequestStatus::Draft, RequestStatus::PendingApproval)
                .map(|transition| transition.action),
            Some(WorkflowAction::Submit)
        );
        assert_eq!(find_transition(RequestStatus::Draft, RequestStatus::Approved), None);
        assert_eq!(find_transition(RequestStatus::Draft, RequestStatus::Draft), None);
    }

    #[test]
    fn action_labels_serialize_as_displayed() {
        let submit = serde_json::to_string(&WorkflowAction::Submit).expect("serialize");
        assert_eq!(submit, "\"Submit for Approval\"");
    }
}
