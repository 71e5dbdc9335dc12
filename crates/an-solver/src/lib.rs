//! Steady-state airflow network solver.
//!
//! Finds the pressures of all non-Ambient nodes such that the net mass
//! flow into each node is zero. Newton iteration on the node-pressure
//! vector with either sub-relaxation (SUR) or a step-clipping trust
//! region as globalization.

pub mod solver;

pub use solver::{AirflowSolution, Solver, SolverMethod};
