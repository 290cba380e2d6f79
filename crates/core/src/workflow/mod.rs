pub mod engine;
pub mod transitions;

pub use engine::{
    PurchaseApprovalFlow, TransitionOutcome, WorkflowDefinition, WorkflowEngine, WorkflowError,
};
pub use transitions::{
    all_transitions, find_transition, valid_transitions, WorkflowAction, WorkflowTransition,
};
