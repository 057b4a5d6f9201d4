use sea_orm::error::DbErr;
use serde::Serialize;
use strum::Display;

/// Coarse classification of a [`ServiceError`], used by callers to decide
/// whether to show the message to an operator or treat it as an outage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Caller supplied bad input (non-positive quantity, over-packing, ...)
    Validation,
    /// Nothing to work on; not a failure of the system
    EmptyInput,
    /// Operation not allowed in the current lifecycle state
    IllegalState,
    NotFound,
    Conflict,
    /// Database or other infrastructure failure
    Systemic,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Nothing to process: {0}")]
    NothingToProcess(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

pub trait IntoDbErr {
    fn into_db_err(self) -> DbErr;
}

impl IntoDbErr for DbErr {
    fn into_db_err(self) -> DbErr {
        self
    }
}

impl IntoDbErr for String {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self)
    }
}

impl IntoDbErr for &str {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self.to_string())
    }
}

impl ServiceError {
    /// Generic constructor that normalizes any supported database error input.
    pub fn db_error<E: IntoDbErr>(error: E) -> Self {
        ServiceError::DatabaseError(error.into_db_err())
    }

    /// Single source of truth for error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationError(_) => ErrorKind::Validation,
            Self::NothingToProcess(_) => ErrorKind::EmptyInput,
            Self::InvalidOperation(_) | Self::InvalidStatus(_) => ErrorKind::IllegalState,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                ErrorKind::Systemic
            }
        }
    }

    pub fn is_systemic(&self) -> bool {
        self.kind() == ErrorKind::Systemic
    }

    /// Message suitable for an end user.
    ///
    /// Business-rule failures return their text verbatim; infrastructure
    /// errors return a generic message so internals do not leak.
    pub fn user_message(&self) -> String {
        match self {
            Self::ValidationError(msg)
            | Self::InvalidOperation(msg)
            | Self::InvalidStatus(msg)
            | Self::NothingToProcess(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) | Self::Other(_) => "Internal error".to_string(),
        }
    }
}
