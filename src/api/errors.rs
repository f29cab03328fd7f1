use thiserror::Error;

use crate::models::Role;
use crate::workflows::state_machine::TransitionError;

/// Everything that can go wrong between the caller and the backend or its
/// collaborators. Nothing here is fatal: the worst outcome is a stale view.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server rejected request (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("role {role} may not {action}")]
    NotPermitted { role: Role, action: String },

    #[error("not logged in")]
    NotLoggedIn,

    #[error("file upload failed: {0}")]
    Storage(String),

    #[error("session store error: {0}")]
    Session(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_permitted(role: Role, action: impl Into<String>) -> Self {
        ApiError::NotPermitted {
            role,
            action: action.into(),
        }
    }

    /// True for a 404 from the backend.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Server { status: 404, .. })
    }

    /// Failures raised locally before any request left the process.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            ApiError::Validation(_)
                | ApiError::NotPermitted { .. }
                | ApiError::NotLoggedIn
                | ApiError::Transition(_)
        )
    }
}
