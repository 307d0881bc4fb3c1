use thiserror::Error;

use crate::id::{IntentId, ScopeId};
use crate::intent::IntentStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("label cannot be empty")]
    EmptyLabel,
    #[error("status must be ACTIVE, INACTIVE, or SUGGESTED: got \"{0}\"")]
    InvalidStatus(String),
    #[error("status must be ACTIVE or SUGGESTED when creating: got {0}")]
    StatusNotCreatable(IntentStatus),
    #[error("invalid intent id: {0}")]
    InvalidIntentId(String),
    #[error("scope id cannot be empty")]
    EmptyScopeId,
    #[error("at least one scope id is required for a scoped intent")]
    NoScopesGiven,
    #[error("intent with label \"{0}\" already exists")]
    LabelTaken(String),
    #[error("intent {0} not found")]
    IntentNotFound(IntentId),
    #[error("scope with id \"{0}\" does not exist")]
    ScopeNotFound(ScopeId),
    #[error("intent {intent} is already excluded from scope {scope}")]
    AlreadyExcluded { intent: IntentId, scope: ScopeId },
    #[error("only default intents can be excluded from a scope")]
    ExcludeNonDefault(IntentId),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("scope directory error: {0}")]
    Directory(String),
}

/// Coarse classification consumed by the API layer sitting above this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    BusinessRule,
    Internal,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::EmptyLabel
            | DomainError::InvalidStatus(_)
            | DomainError::StatusNotCreatable(_)
            | DomainError::InvalidIntentId(_)
            | DomainError::EmptyScopeId
            | DomainError::NoScopesGiven => ErrorKind::Validation,
            DomainError::IntentNotFound(_) | DomainError::ScopeNotFound(_) => ErrorKind::NotFound,
            DomainError::LabelTaken(_) | DomainError::AlreadyExcluded { .. } => ErrorKind::Conflict,
            DomainError::ExcludeNonDefault(_) => ErrorKind::BusinessRule,
            DomainError::Storage(_) | DomainError::Directory(_) => ErrorKind::Internal,
        }
    }

    /// Status code contract for the (out-of-tree) HTTP layer. Business-rule
    /// violations surface as 400; anything internal is 500.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::BusinessRule => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }
}
