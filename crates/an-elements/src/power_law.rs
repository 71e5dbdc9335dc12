//! Power-law orifice model.
//!
//! Flow: ṁ = ρ · C · |ΔP|^n · sign(ΔP)
//! Derivative: d = ρ · n · C · |ΔP|^(n−1)
//! Linearized when |ΔP| < DP_MIN to avoid the derivative singularity.

use std::any::Any;

use an_core::constants::{DP_MIN, RHO_REF};

use crate::common::split_dp;
use crate::element::{FlowElement, FlowResult};
use crate::error::{ElementError, ElementResult};

/// Power-law orifice: the workhorse crack/leak model.
#[derive(Debug, Clone)]
pub struct PowerLawOrifice {
    /// Flow coefficient (m³/(s·Paⁿ)).
    c: f64,
    /// Flow exponent (0.5 = turbulent, 1.0 = laminar, typical 0.6–0.65).
    n: f64,
    /// Chord slope at the DP_MIN boundary, so flow is continuous there.
    linear_slope: f64,
}

impl PowerLawOrifice {
    pub fn new(c: f64, n: f64) -> ElementResult<Self> {
        if c <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "flow coefficient C must be positive",
            });
        }
        if !(0.5..=1.0).contains(&n) {
            return Err(ElementError::InvalidParameter {
                what: "flow exponent n must be in [0.5, 1.0]",
            });
        }
        // Chord slope: flow(DP_MIN)/DP_MIN = C·DP_MIN^(n−1); density is
        // applied at calculate() time.
        let linear_slope = c * DP_MIN.powf(n - 1.0);
        Ok(Self { c, n, linear_slope })
    }

    /// Convert an effective leakage area (m²) measured at a reference
    /// pressure difference into a power-law coefficient.
    pub fn from_leakage_area(ela: f64, n: f64, dp_ref: f64) -> ElementResult<Self> {
        if ela <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "leakage area must be positive",
            });
        }
        if dp_ref <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "reference pressure must be positive",
            });
        }
        // Q(dp_ref) = ELA·√(2·dp_ref/ρ_ref) = C·dp_ref^n
        let q_ref = ela * (2.0 * dp_ref / RHO_REF).sqrt();
        Self::new(q_ref / dp_ref.powf(n), n)
    }

    /// Build a sharp-edged orifice (n = 0.5) from area and discharge
    /// coefficient.
    pub fn from_orifice_area(area: f64, cd: f64) -> ElementResult<Self> {
        if area <= 0.0 || cd <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "orifice area and Cd must be positive",
            });
        }
        Self::new(cd * area * (2.0 / RHO_REF).sqrt(), 0.5)
    }

    pub fn flow_coefficient(&self) -> f64 {
        self.c
    }

    pub fn flow_exponent(&self) -> f64 {
        self.n
    }
}

impl FlowElement for PowerLawOrifice {
    fn calculate(&self, delta_p: f64, density: f64) -> FlowResult {
        let (abs_dp, sign) = split_dp(delta_p);

        if abs_dp < DP_MIN {
            FlowResult {
                mass_flow: density * self.linear_slope * delta_p,
                derivative: density * self.linear_slope,
            }
        } else {
            FlowResult {
                mass_flow: density * self.c * abs_dp.powf(self.n) * sign,
                derivative: density * self.n * self.c * abs_dp.powf(self.n - 1.0),
            }
        }
    }

    fn type_name(&self) -> &'static str {
        "PowerLawOrifice"
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

    #[test]
    fn orifice_equation_value() {
        let plo = PowerLawOrifice::new(0.001, 0.65).unwrap();
        let r = plo.calculate(10.0, 1.2);
        let expected = 1.2 * 0.001 * 10.0_f64.powf(0.65);
        assert!((r.mass_flow - expected).abs() < 1e-12);
    }

    #[test]
    fn antisymmetry() {
        let plo = PowerLawOrifice::new(0.001, 0.65).unwrap();
        let pos = plo.calculate(25.0, 1.2);
        let neg = plo.calculate(-25.0, 1.2);
        assert!((pos.mass_flow + neg.mass_flow).abs() < 1e-6);
        assert!((pos.derivative - neg.derivative).abs() < 1e-12);
    }

    #[test]
    fn derivative_matches_central_difference() {
        let plo = PowerLawOrifice::new(0.002, 0.6).unwrap();
        let dp = 40.0;
        let eps = 1e-4;
        let d_num = (plo.calculate(dp + eps, 1.2).mass_flow
            - plo.calculate(dp - eps, 1.2).mass_flow)
            / (2.0 * eps);
        let d = plo.calculate(dp, 1.2).derivative;
        assert!((d_num - d).abs() / d.abs() < 1e-4);
    }

    #[test]
    fn linearization_continuity() {
        let plo = PowerLawOrifice::new(0.001, 0.65).unwrap();
        for sign in [1.0, -1.0] {
            let below = plo.calculate(sign * 0.999 * DP_MIN, 1.2).mass_flow;
            let above = plo.calculate(sign * 1.001 * DP_MIN, 1.2).mass_flow;
            assert!((below - above).abs() < 1e-6);
        }
    }

    #[test]
    fn invalid_parameters() {
        assert!(PowerLawOrifice::new(0.0, 0.65).is_err());
        assert!(PowerLawOrifice::new(-0.001, 0.65).is_err());
        assert!(PowerLawOrifice::new(0.001, 0.4).is_err());
        assert!(PowerLawOrifice::new(0.001, 1.1).is_err());
    }

    #[test]
    fn from_leakage_area_reproduces_reference_flow() {
        let plo = PowerLawOrifice::from_leakage_area(0.01, 0.65, 4.0).unwrap();
        assert!(plo.flow_coefficient() > 0.0);
        assert_eq!(plo.flow_exponent(), 0.65);

        let expected_q = 0.01 * (2.0 * 4.0 / 1.2_f64).sqrt();
        let q = plo.calculate(4.0, 1.2).mass_flow / 1.2;
        assert!((q - expected_q).abs() < expected_q * 0.01);
    }

    #[test]
    fn from_orifice_area_reproduces_orifice_equation() {
        let plo = PowerLawOrifice::from_orifice_area(0.05, 0.6).unwrap();
        assert_eq!(plo.flow_exponent(), 0.5);

        let dp = 10.0;
        let expected_q = 0.6 * 0.05 * (2.0 * dp / 1.2_f64).sqrt();
        let q = plo.calculate(dp, 1.2).mass_flow / 1.2;
        assert!((q - expected_q).abs() < expected_q * 0.01);
    }

    #[test]
    fn clone_preserves_behavior() {
        let plo = PowerLawOrifice::new(0.001, 0.65).unwrap();
        let cloned = plo.boxed_clone();
        let a = plo.calculate(12.0, 1.2);
        let b = cloned.calculate(12.0, 1.2);
        assert_eq!(a.mass_flow, b.mass_flow);
    }
}
