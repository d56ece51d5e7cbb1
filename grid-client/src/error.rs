use crate::domain::Table;

/// Coarse grouping of failures for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadInput,
    NotFound,
    Conflict,
    Storage,
}

#[derive(thiserror::Error, Debug)]
pub enum GridError {
    #[error("unknown table '{0}'")]
    InvalidTable(String),
    #[error("table '{table}' has no column '{column}'")]
    InvalidColumn { table: Table, column: String },
    #[error("no record with id {id} in '{table}'")]
    NotFound { table: Table, id: i64 },
    #[error("schema mismatch for '{table}': {detail}")]
    SchemaMismatch { table: Table, detail: String },
    #[error("invalid coordinate: {field}={value} (allowed range {min}..={max})")]
    InvalidCoordinate {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("response to message {id} must not be blank")]
    BlankResponse { id: i64 },
    #[error("message {id} already has a response")]
    AlreadyResponded { id: i64 },
    #[error("storage unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

impl GridError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidTable(_)
            | Self::InvalidColumn { .. }
            | Self::SchemaMismatch { .. }
            | Self::InvalidCoordinate { .. }
            | Self::BlankResponse { .. } => ErrorClass::BadInput,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::AlreadyResponded { .. } => ErrorClass::Conflict,
            Self::StoreUnavailable(_) => ErrorClass::Storage,
        }
    }

    /// Message safe to show an operator. Storage failures are not echoed
    /// verbatim; the driver error goes to the logs instead.
    pub fn user_message(&self) -> String {
        match self {
            Self::StoreUnavailable(_) => {
                "storage failure: the record store could not complete the request".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T, E = GridError> = std::result::Result<T, E>;
