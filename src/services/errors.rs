use thiserror::Error;

use crate::repositories::results::StoreError;
use crate::services::question_bank::UpstreamError;

#[derive(Debug, Error)]
pub(crate) enum ResultServiceError {
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
    #[error("question bank unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamError),
    #[error("quiz result {0} not found")]
    NotFound(i64),
    #[error("failed to persist quiz result: {0}")]
    PersistenceFailure(#[from] StoreError),
}

impl ResultServiceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidSubmission(message.into())
    }
}
