//! Error types for control evaluation.

use an_core::AnError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ControlError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Math domain error: {what}")]
    MathDomain { what: &'static str },
}

pub type ControlResult<T> = Result<T, ControlError>;

impl From<ControlError> for AnError {
    fn from(e: ControlError) -> Self {
        match e {
            ControlError::InvalidArg { what } => AnError::InvalidParameter { what },
            ControlError::MathDomain { what } => AnError::Invariant { what },
        }
    }
}
