use thiserror::Error;

/// Application-level errors (command line layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] almanac_service::error::ServiceError),

    #[error(transparent)]
    RfcError(#[from] almanac_rfc::error::RfcError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid calendar file: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<almanac_rfc::rfc::ical::parse::ParseError> for AppError {
    fn from(err: almanac_rfc::rfc::ical::parse::ParseError) -> Self {
        Self::RfcError(err.into())
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
