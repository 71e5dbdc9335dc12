//! Contaminant transport for the airflow network.
//!
//! The contaminant solver owns the concentration matrix C[zone][species]
//! and advances it with implicit Euler using the mass flows the airflow
//! solver already determined: per-species solves when no chemical
//! kinetics are registered, a coupled block solve when they are. The
//! adaptive integrator offers BDF error-controlled stepping for stiff
//! problems.

pub mod contaminant;
pub mod error;
pub mod integrator;
pub mod reaction;
pub mod schedule;
pub mod source;
pub mod species;

pub use contaminant::{ContaminantResult, ContaminantSolver};
pub use error::{TransportError, TransportResult};
pub use integrator::{AdaptiveIntegrator, IntegratorConfig};
pub use reaction::ReactionNetwork;
pub use schedule::Schedule;
pub use source::{Source, SourceKind};
pub use species::Species;
