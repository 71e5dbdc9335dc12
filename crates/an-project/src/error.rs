//! Error types for project loading and writing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown reference: {what}")]
    UnknownReference { what: String },

    #[error("Invalid model: {0}")]
    Network(#[from] an_network::NetworkError),

    #[error("Invalid element: {0}")]
    Element(#[from] an_elements::ElementError),

    #[error("Invalid schedule: {0}")]
    Transport(#[from] an_transport::TransportError),
}

pub type ProjectResult<T> = Result<T, ProjectError>;
