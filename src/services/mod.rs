pub(crate) mod announcements;
pub(crate) mod auto_grading;
pub(crate) mod grading;
pub(crate) mod notifications;
pub(crate) mod score_aggregation;
pub(crate) mod submission_intake;
pub(crate) mod submission_locks;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub(crate) enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

pub(crate) type ServiceResult<T> = Result<T, ServiceError>;
