use thiserror::Error;

use crate::domain::material::MaterialId;
use crate::domain::request::{RequestId, RequestStatus};
use crate::workflow::WorkflowError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("a request needs at least one item with a name")]
    NoItems,
    #[error("item `{item}` must have a positive quantity")]
    InvalidQuantity { item: String },
    #[error("comment text must not be empty")]
    EmptyComment,
    #[error("attachment file name must not be empty")]
    EmptyFileName,
    #[error("unknown {kind} `{value}`")]
    UnknownValue { kind: &'static str, value: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("request `{id}` not found")]
    NotFound { id: RequestId },
    #[error("material `{}` not found in catalog", .id.0)]
    MaterialNotFound { id: MaterialId },
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("request `{id}` is {status} and can no longer be edited")]
    NotEditable { id: RequestId, status: RequestStatus },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "Some of the submitted values are missing or invalid.",
            Self::NotFound { .. } => "The requested record could not be found.",
            Self::Conflict { .. } => {
                "That action is not available for the request in its current status."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "invalid_transition",
            Self::Internal { .. } => "internal",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(error @ DomainError::Validation(_)) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::Domain(
                error @ (DomainError::NotFound { .. } | DomainError::MaterialNotFound { .. }),
            ) => Self::NotFound { message: error.to_string(), correlation_id },
            ApplicationError::Domain(
                error @ (DomainError::Workflow(_) | DomainError::NotEditable { .. }),
            ) => Self::Conflict { message: error.to_string(), correlation_id },
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}
