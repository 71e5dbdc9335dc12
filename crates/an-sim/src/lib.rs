//! Transient simulation driver.
//!
//! Sequences every time step: control read-compute-write, quasi-steady
//! airflow solve, contaminant transport, non-trace density feedback,
//! occupant exposure and snapshot recording. Single-threaded and
//! sequential; the only cancellation point is the progress callback's
//! cooperative cancel flag, inspected once per step.

pub mod occupant;
pub mod transient;

pub use occupant::{ExposureRecord, Occupant};
pub use transient::{TimeStepRecord, TransientConfig, TransientResult, TransientSimulation};
