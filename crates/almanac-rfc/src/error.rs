use thiserror::Error;

use crate::rfc::ical::expand::ConversionError;
use crate::rfc::ical::parse::ParseError;

/// Errors raised while reading or placing calendar values
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Recurrence rule error: {0}")]
    RuleParse(#[from] ParseError),

    #[error("Timezone error: {0}")]
    Conversion(#[from] ConversionError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
