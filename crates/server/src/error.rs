use driftlist_db::DbError;
use thiserror::Error;

/// Error types for the mutation and query surface
///
/// All variants are structured, caller-displayable results; none of them
/// terminate the process. Each carries a stable kebab-case wire code via
/// [`ServiceError::code`] for clients that key error handling off it.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The caller has no authenticated identity
    #[error("Not authorized")]
    NotAuthorized,

    /// The targeted task is missing or belongs to another owner.
    ///
    /// Deliberately uniform for both cases so a caller cannot probe
    /// whether a foreign id exists.
    #[error("Task not found")]
    NotFound,

    /// Task text was empty after trimming
    #[error("Todo text required")]
    Empty,

    /// Task text exceeded 200 characters after trimming
    #[error("Keep it under 200 chars")]
    TooLong,

    /// A reorder payload referenced an id outside the caller's owned set
    #[error("Reorder payload contains unknown task ids")]
    InvalidOrder,

    /// The caller exceeded the sliding-window mutation quota
    #[error("Too many requests, slow down")]
    RateLimited,

    /// An underlying store failure
    #[error(transparent)]
    Db(#[from] DbError),
}

impl ServiceError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotAuthorized => "not-authorized",
            ServiceError::NotFound => "not-found",
            ServiceError::Empty => "empty",
            ServiceError::TooLong => "too-long",
            ServiceError::InvalidOrder => "invalid-order",
            ServiceError::RateLimited => "rate-limited",
            ServiceError::Db(_) => "internal",
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
