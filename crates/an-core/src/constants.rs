//! Physical and solver constants shared across the engine.
//!
//! All values are SI. None of the engine depends on mutable process-wide
//! state; the network's ambient conditions are regular fields.

/// Standard gravity (m/s²).
pub const GRAVITY: f64 = 9.806_65;

/// Specific gas constant for dry air (J/(kg·K)).
pub const R_AIR: f64 = 287.055;

/// Standard atmospheric pressure (Pa). Node pressures are gauge.
pub const P_ATM: f64 = 101_325.0;

/// Reference temperature, 20 °C (K).
pub const T_REF: f64 = 293.15;

/// Reference air density used for element linearization (kg/m³).
pub const RHO_REF: f64 = 1.2;

/// Dynamic viscosity of air near room temperature (Pa·s).
pub const MU_AIR: f64 = 1.81e-5;

/// Molar mass of dry air (kg/mol).
pub const M_AIR: f64 = 0.029;

/// Max airflow residual for convergence (kg/s).
pub const CONVERGENCE_TOL: f64 = 1.0e-5;

/// Max Newton iterations for the airflow solve.
pub const MAX_ITERATIONS: usize = 100;

/// Pressure threshold below which elements linearize (Pa).
pub const DP_MIN: f64 = 1.0e-3;

/// Sub-relaxation factor for the SUR update.
pub const RELAX_FACTOR_SUR: f64 = 0.75;

/// Initial trust-region radius (Pa).
pub const TR_INITIAL_RADIUS: f64 = 1000.0;

/// Minimum trust-region radius (Pa).
pub const TR_MIN_RADIUS: f64 = 0.01;

/// Maximum trust-region radius (Pa).
pub const TR_MAX_RADIUS: f64 = 1.0e6;
