use thiserror::Error;

/// Error taxonomy shared by every service in the engine.
///
/// Validation failures are raised before any write; storage failures during
/// a write surface as `Service` (or `DuplicateResource` for unique-key
/// violations) after the enclosing transaction has rolled back.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or missing required input (blank id, missing numbers)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Value present but outside its allowed domain
    #[error("out of range: {0}")]
    RangeValidation(String),

    /// A referenced entity does not exist
    #[error("not found: {0}")]
    ResourceNotFound(String),

    /// Uniqueness violation reported by the storage layer
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),

    /// Purchase attempted inside the weekend blackout window
    #[error("purchase not allowed: {0}")]
    PurchaseNotAllowed(String),

    /// Unexpected lower-level failure, wrapped with context
    #[error("service error: {0}")]
    Service(anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<anyhow::Error> for DomainError {
    fn from(err: anyhow::Error) -> Self {
        DomainError::Service(err)
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return DomainError::DuplicateResource(db_err.message().to_string());
            }
        }
        DomainError::Service(anyhow::Error::new(err))
    }
}
