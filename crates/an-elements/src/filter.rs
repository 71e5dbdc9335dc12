//! Filter: power-law airflow with species capture.
//!
//! Airflow behaves exactly like a power-law orifice; the capture
//! efficiency η only matters to the contaminant path, which scales the
//! flux delivered downwind by (1 − η).

use std::any::Any;

use an_core::constants::{DP_MIN, RHO_REF};

use crate::common::split_dp;
use crate::element::{FlowElement, FlowResult};
use crate::error::{ElementError, ElementResult};

#[derive(Debug, Clone)]
pub struct Filter {
    c: f64,
    n: f64,
    /// Capture efficiency in [0, 1]; 0.9 means 90 % of the advected
    /// species mass is retained by the bed.
    efficiency: f64,
    linear_slope: f64,
}

impl Filter {
    pub fn new(c: f64, n: f64, efficiency: f64) -> ElementResult<Self> {
        if c <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "filter C must be positive",
            });
        }
        if !(0.5..=1.0).contains(&n) {
            return Err(ElementError::InvalidParameter {
                what: "filter n must be in [0.5, 1.0]",
            });
        }

        let flow_at_min = RHO_REF * c * DP_MIN.powf(n);
        Ok(Self {
            c,
            n,
            efficiency: efficiency.clamp(0.0, 1.0),
            linear_slope: flow_at_min / DP_MIN,
        })
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }
}

impl FlowElement for Filter {
    fn calculate(&self, delta_p: f64, density: f64) -> FlowResult {
        let (abs_dp, sign) = split_dp(delta_p);

        if abs_dp < DP_MIN {
            FlowResult {
                mass_flow: self.linear_slope * delta_p,
                derivative: self.linear_slope,
            }
        } else {
            FlowResult {
                mass_flow: density * self.c * abs_dp.powf(self.n) * sign,
                derivative: self.n * density * self.c * abs_dp.powf(self.n - 1.0),
            }
        }
    }

    fn species_penetration(&self) -> f64 {
        1.0 - self.efficiency
    }

    fn type_name(&self) -> &'static str {
        "Filter"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power_law::PowerLawOrifice;

    #[test]
    fn airflow_matches_power_law() {
        let filter = Filter::new(0.005, 0.6, 0.9).unwrap();
        let orifice = PowerLawOrifice::new(0.005, 0.6).unwrap();
        let a = filter.calculate(25.0, 1.2);
        let b = orifice.calculate(25.0, 1.2);
        assert!((a.mass_flow - b.mass_flow).abs() < 1e-12);
    }

    #[test]
    fn penetration_complements_efficiency() {
        let filter = Filter::new(0.005, 0.6, 0.9).unwrap();
        assert!((filter.species_penetration() - 0.1).abs() < 1e-12);

        let passthrough = Filter::new(0.005, 0.6, 0.0).unwrap();
        assert_eq!(passthrough.species_penetration(), 1.0);
    }

    #[test]
    fn efficiency_clamped() {
        let filter = Filter::new(0.005, 0.6, 1.5).unwrap();
        assert_eq!(filter.efficiency(), 1.0);
        let filter = Filter::new(0.005, 0.6, -0.5).unwrap();
        assert_eq!(filter.efficiency(), 0.0);
    }

    #[test]
    fn antisymmetry() {
        let filter = Filter::new(0.005, 0.6, 0.5).unwrap();
        let pos = filter.calculate(30.0, 1.2);
        let neg = filter.calculate(-30.0, 1.2);
        assert!((pos.mass_flow + neg.mass_flow).abs() < 1e-6);
    }

    #[test]
    fn invalid_parameters() {
        assert!(Filter::new(0.0, 0.6, 0.9).is_err());
        assert!(Filter::new(0.005, 1.2, 0.9).is_err());
    }
}
