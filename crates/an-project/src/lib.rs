//! Project input/output for the engine.
//!
//! The input file is a single JSON object: ambient conditions, reusable
//! flow element templates, nodes, links, and optionally species, sources,
//! schedules, occupants and a transient block. Output files carry the
//! solver block plus per-node and per-link results, and a time series for
//! transient runs.

pub mod error;
pub mod reader;
pub mod schema;
pub mod writer;

pub use error::{ProjectError, ProjectResult};
pub use reader::{load_model, model_from_str, ModelInput};
pub use schema::ProjectInput;
pub use writer::{
    steady_output, transient_output, write_steady, write_transient, SteadyOutput, TransientOutput,
};
