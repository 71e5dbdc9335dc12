//! Duct model with Darcy friction and minor losses.
//!
//! ΔP = (f·L/D + ΣK) · ρ·V²/2 on a cylindrical duct; the Darcy friction
//! factor f comes from Colebrook–White (laminar branch 64/Re below
//! Re = 2300). Given ΔP the element iterates friction factor and velocity
//! to a fixed point, then differentiates the converged relation. The
//! friction factor itself varies with Re, so the derivative is taken
//! numerically rather than from the fixed-f chord ṁ/(2·ΔP).

use std::any::Any;
use std::f64::consts::PI;

use an_core::constants::{DP_MIN, MU_AIR, RHO_REF};

use crate::common::split_dp;
use crate::element::{FlowElement, FlowResult};
use crate::error::{ElementError, ElementResult};

#[derive(Debug, Clone)]
pub struct Duct {
    /// Duct length (m).
    length: f64,
    /// Inner diameter (m).
    diameter: f64,
    /// Absolute surface roughness (m).
    roughness: f64,
    /// Sum of minor-loss K factors (fittings, bends, inlets).
    sum_k: f64,
    /// Chord slope at the DP_MIN boundary (reference density).
    linear_slope: f64,
}

impl Duct {
    pub fn new(length: f64, diameter: f64, roughness: f64, sum_k: f64) -> ElementResult<Self> {
        if length <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "duct length must be positive",
            });
        }
        if diameter <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "duct diameter must be positive",
            });
        }
        if roughness < 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "duct roughness must be non-negative",
            });
        }
        if sum_k < 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "duct minor-loss sum must be non-negative",
            });
        }

        let mut duct = Self {
            length,
            diameter,
            roughness,
            sum_k,
            linear_slope: 0.0,
        };
        duct.linear_slope = duct.mass_flow_for_dp(DP_MIN, RHO_REF) / DP_MIN;
        Ok(duct)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn roughness(&self) -> f64 {
        self.roughness
    }

    pub fn sum_k(&self) -> f64 {
        self.sum_k
    }

    /// Darcy friction factor at the given Reynolds number.
    fn friction_factor(&self, reynolds: f64) -> f64 {
        if reynolds < 2300.0 {
            // Laminar
            64.0 / reynolds.max(1.0)
        } else {
            let e_d = self.roughness / self.diameter;

            // Swamee-Jain seed for the Colebrook-White fixed point
            let a = e_d / 3.7;
            let b = 5.74 / reynolds.powf(0.9);
            let mut f: f64 = 0.25 / (a + b).log10().powi(2);

            // 1/√f = −2·log10(ε/(3.7·D) + 2.51/(Re·√f))
            for _ in 0..30 {
                let rhs = -2.0 * (a + 2.51 / (reynolds * f.sqrt())).log10();
                let f_new = 1.0 / (rhs * rhs);
                if (f_new - f).abs() < 1e-12 {
                    f = f_new;
                    break;
                }
                f = f_new;
            }
            f.max(1e-4)
        }
    }

    /// Solve the implicit friction/velocity coupling for |ΔP| and return
    /// the unsigned mass flow.
    fn mass_flow_for_dp(&self, abs_dp: f64, density: f64) -> f64 {
        let area = PI * self.diameter * self.diameter / 4.0;
        let loss = |f: f64| f * self.length / self.diameter + self.sum_k;

        let mut f = 0.02;
        for _ in 0..60 {
            let velocity = (2.0 * abs_dp / (density * loss(f))).sqrt();
            let reynolds = density * velocity * self.diameter / MU_AIR;
            let f_new = self.friction_factor(reynolds);
            if (f_new - f).abs() < 1e-11 {
                f = f_new;
                break;
            }
            // Damped update keeps the laminar/turbulent handoff stable
            f = 0.5 * (f + f_new);
        }

        let velocity = (2.0 * abs_dp / (density * loss(f))).sqrt();
        density * area * velocity
    }
}

impl FlowElement for Duct {
    fn calculate(&self, delta_p: f64, density: f64) -> FlowResult {
        let (abs_dp, sign) = split_dp(delta_p);

        if abs_dp < DP_MIN {
            return FlowResult {
                mass_flow: self.linear_slope * delta_p,
                derivative: self.linear_slope,
            };
        }

        let mass_flow = self.mass_flow_for_dp(abs_dp, density);
        let eps = 0.01 * abs_dp;
        let derivative = (self.mass_flow_for_dp(abs_dp + eps, density)
            - self.mass_flow_for_dp(abs_dp - eps, density))
            / (2.0 * eps);
        FlowResult {
            mass_flow: mass_flow * sign,
            derivative,
        }
    }

    fn type_name(&self) -> &'static str {
        "Duct"
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
