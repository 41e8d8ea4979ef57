pub mod repository;
pub mod identity;
pub mod notify;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
    #[error("Identity verification failed: {0}")]
    IdentityError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Whether a boxed store error is a missing-record error.
pub fn is_not_found(err: &(dyn std::error::Error + Send + Sync + 'static)) -> bool {
    matches!(err.downcast_ref::<CoreError>(), Some(CoreError::NotFound(_)))
}
