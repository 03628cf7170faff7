use thiserror::Error;

use crate::workflow::{Event, State};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Event `{event}` is not allowed from state `{state}`")]
    InvalidTransition { state: State, event: Event },

    #[error("Document version conflict: expected {expected}, found {found}")]
    ConcurrencyConflict { expected: u64, found: u64 },

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl WorkflowError {
    /// HTTP-style status class for the request layer that wraps these operations.
    pub fn status_code(&self) -> u16 {
        match self {
            WorkflowError::Validation(_) | WorkflowError::InvalidTransition { .. } => 400,
            WorkflowError::NotFound(_) => 404,
            WorkflowError::ConcurrencyConflict { .. } => 409,
            WorkflowError::Storage(_) => 500,
        }
    }

    /// Only a version conflict is worth retrying; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::ConcurrencyConflict { .. })
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt document: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Failed to replace document: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T, E = WorkflowError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(WorkflowError::Validation("x".into()).status_code(), 400);
        assert_eq!(WorkflowError::NotFound("RNT-9".into()).status_code(), 404);
        assert_eq!(
            WorkflowError::InvalidTransition {
                state: State::Draft,
                event: Event::Sign,
            }
            .status_code(),
            400
        );
        assert_eq!(
            WorkflowError::ConcurrencyConflict {
                expected: 1,
                found: 2
            }
            .status_code(),
            409
        );
        let io = std::io::Error::other("disk gone");
        assert_eq!(WorkflowError::from(StoreError::from(io)).status_code(), 500);
    }

    #[test]
    fn invalid_transition_names_state_and_event() {
        let err = WorkflowError::InvalidTransition {
            state: State::Active,
            event: Event::GenerateContract,
        };
        assert_eq!(
            err.to_string(),
            "Event `generate_contract` is not allowed from state `active`"
        );
        assert!(!err.is_retryable());
    }
}
