use chrono::{DateTime, Utc};
use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RfcError(#[from] almanac_rfc::error::RfcError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid range: end {end} is before start {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid limit: {0} (must be positive)")]
    InvalidLimit(usize),

    #[error("Unbounded query: series {0} never ends, give a limit or a range end")]
    UnboundedQuery(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
