pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod seed;
pub mod session;
pub mod store;
pub mod workflow;

pub use audit::{AuditEvent, AuditSink, InMemoryAuditSink, NoopAuditSink};
pub use domain::material::{Material, MaterialId};
pub use domain::request::{
    Attachment, HistoryAction, HistoryLog, ItemId, NewAttachment, NewRequest, PurchaseRequest,
    RequestId, RequestItem, RequestPatch, RequestStatus, Unit,
};
pub use errors::{ApplicationError, DomainError, InterfaceError, ValidationError};
pub use session::Session;
pub use store::{CatalogStore, MaterialFilter, MaterialFilterPatch, RequestStore, StorePolicy};
pub use workflow::{
    valid_transitions, TransitionOutcome, WorkflowAction, WorkflowEngine, WorkflowError,
    WorkflowTransition,
};
