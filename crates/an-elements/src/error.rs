//! Error types for element construction and evaluation.

use an_core::AnError;
use thiserror::Error;

/// Errors raised by flow element constructors and calculations.
#[derive(Error, Debug, Clone)]
pub enum ElementError {
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: &'static str },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },
}

pub type ElementResult<T> = Result<T, ElementError>;

impl From<ElementError> for AnError {
    fn from(e: ElementError) -> Self {
        match e {
            ElementError::InvalidParameter { what } => AnError::InvalidParameter { what },
            ElementError::NonPhysical { what } => AnError::Invariant { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ElementError::InvalidParameter {
            what: "C must be positive",
        };
        assert!(err.to_string().contains("C must be positive"));
    }

    #[test]
    fn error_conversion() {
        let err = ElementError::InvalidParameter { what: "test" };
        let core: AnError = err.into();
        assert!(matches!(core, AnError::InvalidParameter { .. }));
    }
}
