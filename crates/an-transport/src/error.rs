//! Error types for transport operations.

use an_core::AnError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: &'static str },
}

pub type TransportResult<T> = Result<T, TransportError>;

impl From<TransportError> for AnError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::InvalidParameter { what } => AnError::InvalidParameter { what },
        }
    }
}
