use thiserror::Error;

/// Error type for pool ledger and record-keeping operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Error type returned by `Storage` implementations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("conflicting record: {0}")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Error type for malformed reporting periods.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeriodError {
    #[error("reporting period must be in YYYY-MM format, got '{0}'")]
    Format(String),

    #[error("month out of range: {0}")]
    MonthOutOfRange(u32),
}

/// Error type for decoding and validating request bodies at the boundary.
#[derive(Error, Debug, Clone, PartialEq, uniffi::Error)]
#[uniffi(flat_error)]
pub enum BoundaryError {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("{field}: {message}")]
    Field { field: String, message: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl BoundaryError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        BoundaryError::Field {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for BoundaryError {
    fn from(err: serde_json::Error) -> Self {
        BoundaryError::Json(err.to_string())
    }
}
