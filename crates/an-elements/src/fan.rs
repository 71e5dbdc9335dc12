//! Fan model with a linear performance curve.
//!
//! Q = Q_max·(1 − ΔP/ΔP_shutoff), clamped to Q ≥ 0. The fan always pushes
//! in the positive link direction; beyond shutoff it contributes a tiny
//! derivative so the Jacobian keeps full rank.

use std::any::Any;

use crate::element::{FlowElement, FlowResult};
use crate::error::{ElementError, ElementResult};

#[derive(Debug, Clone)]
pub struct Fan {
    /// Volumetric flow at ΔP = 0 (m³/s).
    max_flow: f64,
    /// Pressure at which flow drops to zero (Pa).
    shutoff_pressure: f64,
}

impl Fan {
    pub fn new(max_flow: f64, shutoff_pressure: f64) -> ElementResult<Self> {
        if max_flow <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "fan maxFlow must be positive",
            });
        }
        if shutoff_pressure <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "fan shutoffPressure must be positive",
            });
        }
        Ok(Self {
            max_flow,
            shutoff_pressure,
        })
    }

    pub fn max_flow(&self) -> f64 {
        self.max_flow
    }

    pub fn shutoff_pressure(&self) -> f64 {
        self.shutoff_pressure
    }
}

impl FlowElement for Fan {
    fn calculate(&self, delta_p: f64, density: f64) -> FlowResult {
        // ΔP > 0 is resistance against the fan, ΔP < 0 assists it.
        let q = (self.max_flow * (1.0 - delta_p / self.shutoff_pressure)).max(0.0);

        let derivative = if q > 0.0 {
            -density * self.max_flow / self.shutoff_pressure
        } else {
            // Saturated at shutoff: tiny slope for numerical stability.
            -density * 1e-10
        };

        FlowResult {
            mass_flow: density * q,
            derivative,
        }
    }

    fn type_name(&self) -> &'static str {
        "Fan"
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
