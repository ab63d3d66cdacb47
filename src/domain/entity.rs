//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainError {
    NotFound(String),
    InvalidInput(String),
    /// A conflicting write reached the same rows first
    ConcurrentModification(String),
    /// The operation did not finish within its time bound and was rolled back
    PersistenceTimeout(String),
    Internal(String),
}

impl DomainError {
    /// True when repeating the whole user-level action may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::ConcurrentModification(_) | DomainError::PersistenceTimeout(_)
        )
    }

    /// Message suitable for showing to the end user
    pub fn user_message(&self) -> String {
        match self {
            DomainError::ConcurrentModification(_) => {
                "This board was changed elsewhere, please refresh and try again".to_string()
            }
            DomainError::PersistenceTimeout(_) => {
                "The server took too long to respond, please refresh and try again".to_string()
            }
            DomainError::NotFound(msg) => format!("Not found: {}", msg),
            DomainError::InvalidInput(msg) => format!("Invalid input: {}", msg),
            DomainError::Internal(_) => "Something went wrong, please try again later".to_string(),
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::ConcurrentModification(msg) => write!(f, "Concurrent modification: {}", msg),
            DomainError::PersistenceTimeout(msg) => write!(f, "Persistence timeout: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(DomainError::ConcurrentModification("x".into()).is_retryable());
        assert!(DomainError::PersistenceTimeout("x".into()).is_retryable());
        assert!(!DomainError::NotFound("x".into()).is_retryable());
        assert!(!DomainError::InvalidInput("x".into()).is_retryable());
        assert!(!DomainError::Internal("x".into()).is_retryable());
    }

    #[test]
    fn test_user_message_asks_for_refresh() {
        let msg = DomainError::ConcurrentModification("section 3".into()).user_message();
        assert!(msg.contains("refresh and try again"));
        let msg = DomainError::PersistenceTimeout("tx".into()).user_message();
        assert!(msg.contains("refresh and try again"));
    }

    #[test]
    fn test_internal_details_stay_hidden() {
        let msg = DomainError::Internal("disk I/O error".into()).user_message();
        assert!(!msg.contains("disk"));
    }
}
