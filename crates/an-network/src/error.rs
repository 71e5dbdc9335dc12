//! Network-specific error types.

use an_core::AnError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Node id {id} not found")]
    UnknownNode { id: i32 },

    #[error("Duplicate node id {id}")]
    DuplicateNode { id: i32 },

    #[error("Link {id} references an out-of-range node index")]
    InvalidEndpoint { id: i32 },
}

pub type NetworkResult<T> = Result<T, NetworkError>;

impl From<NetworkError> for AnError {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::UnknownNode { .. } => AnError::InvalidParameter {
                what: "unknown node id",
            },
            NetworkError::DuplicateNode { .. } => AnError::InvalidParameter {
                what: "duplicate node id",
            },
            NetworkError::InvalidEndpoint { .. } => AnError::Invariant {
                what: "link endpoint out of range",
            },
        }
    }
}
