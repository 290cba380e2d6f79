use reqflow_core::workflow::all_transitions;
use reqflow_core::{valid_transitions, RequestStatus, WorkflowTransition};

use crate::commands::{CommandResult, EXIT_VALIDATION};

/// Shows the moves out of one status, or the whole table when no status is given.
pub fn run(status: Option<&str>) -> CommandResult {
    let Some(status) = status else {
        let table = all_transitions().copied().collect::<Vec<WorkflowTransition>>();
        return CommandResult::success_with(
            "transitions",
            format!("{} transition(s) in the approval workflow", table.len()),
            table,
        );
    };

    let status = match status.parse::<RequestStatus>() {
        Ok(status) => status,
        Err(error) => {
            return CommandResult::failure(
                "transitions",
                "validation",
                error.to_string(),
                EXIT_VALIDATION,
            )
        }
    };

    let transitions = valid_transitions(status);
    let message = if transitions.is_empty() {
        format!("{status} is terminal")
    } else {
        format!("{} transition(s) from {status}", transitions.len())
    };
    CommandResult::success_with("transitions", message, transitions)
}
