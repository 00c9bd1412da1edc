pub mod error;
pub mod rfc;

pub use error::{RfcError, RfcResult};
