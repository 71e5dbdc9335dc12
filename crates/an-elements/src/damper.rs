//! Variable damper: a power-law restriction with a controllable fraction.
//!
//! C_eff = C_max·f with f clamped to [0, 1]. A fully closed damper passes
//! no flow and reports a near-zero derivative so the Jacobian stays
//! factorizable.

use std::any::Any;

use an_core::constants::{DP_MIN, RHO_REF};

use crate::common::split_dp;
use crate::element::{FlowElement, FlowResult};
use crate::error::{ElementError, ElementResult};

/// Effective coefficient below which the damper counts as closed.
const C_EFF_CLOSED: f64 = 1e-15;

#[derive(Debug, Clone)]
pub struct Damper {
    /// Flow coefficient at the fully open position (m³/(s·Paⁿ)).
    c_max: f64,
    /// Flow exponent.
    n: f64,
    /// Open fraction in [0, 1].
    fraction: f64,
    /// C_max·fraction, kept current with the fraction.
    c_eff: f64,
    linear_slope: f64,
}

impl Damper {
    pub fn new(c_max: f64, n: f64, fraction: f64) -> ElementResult<Self> {
        if c_max <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "damper Cmax must be positive",
            });
        }
        if !(0.5..=1.0).contains(&n) {
            return Err(ElementError::InvalidParameter {
                what: "damper exponent n must be in [0.5, 1.0]",
            });
        }
        let mut damper = Self {
            c_max,
            n,
            fraction: fraction.clamp(0.0, 1.0),
            c_eff: 0.0,
            linear_slope: 0.0,
        };
        damper.update_effective();
        Ok(damper)
    }

    /// Set the open fraction (clamped to [0, 1]) and refresh C_eff.
    pub fn set_fraction(&mut self, fraction: f64) {
        self.fraction = fraction.clamp(0.0, 1.0);
        self.update_effective();
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn c_max(&self) -> f64 {
        self.c_max
    }

    pub fn flow_exponent(&self) -> f64 {
        self.n
    }

    fn update_effective(&mut self) {
        self.c_eff = self.c_max * self.fraction;
        if self.c_eff > C_EFF_CLOSED {
            let flow_at_min = RHO_REF * self.c_eff * DP_MIN.powf(self.n);
            self.linear_slope = flow_at_min / DP_MIN;
        } else {
            self.linear_slope = C_EFF_CLOSED;
        }
    }
}

impl FlowElement for Damper {
    fn calculate(&self, delta_p: f64, density: f64) -> FlowResult {
        if self.c_eff < C_EFF_CLOSED {
            return FlowResult {
                mass_flow: 0.0,
                derivative: C_EFF_CLOSED,
            };
        }

        let (abs_dp, sign) = split_dp(delta_p);

        if abs_dp < DP_MIN {
            FlowResult {
                mass_flow: self.linear_slope * delta_p,
                derivative: self.linear_slope,
            }
        } else {
            FlowResult {
                mass_flow: density * self.c_eff * abs_dp.powf(self.n) * sign,
                derivative: self.n * density * self.c_eff * abs_dp.powf(self.n - 1.0),
            }
        }
    }

    fn type_name(&self) -> &'static str {
        "Damper"
    }

    fn boxed_clone(&self) -> Box<dyn FlowElement> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
