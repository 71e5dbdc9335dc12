//! Large-opening (two-way flow) model for doors and windows.
//!
//! Simplified mode treats the opening as one orifice:
//!   Q = Cd·A·√(2·|ΔP|/ρ), ṁ = ρ·Q·sign(ΔP).
//!
//! With geometry (height, width) and differing densities on the two sides,
//! the bidirectional mode locates the neutral plane inside the opening and
//! integrates the hydrostatic pressure difference over the layers above
//! and below it, yielding simultaneous counterflowing streams. The denser
//! side discharges through the lower layer.

use std::any::Any;

use an_core::constants::{DP_MIN, GRAVITY, RHO_REF};

use crate::common::split_dp;
use crate::element::{FlowElement, FlowResult};
use crate::error::{ElementError, ElementResult};

/// Density contrast below which the bidirectional mode is meaningless.
const MIN_DENSITY_CONTRAST: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct OpeningGeometry {
    height: f64,
    width: f64,
}

#[derive(Debug, Clone)]
pub struct TwoWayFlow {
    /// Discharge coefficient (typically 0.6–0.78).
    cd: f64,
    /// Opening area (m²).
    area: f64,
    /// Present only for openings that support the bidirectional mode.
    geometry: Option<OpeningGeometry>,
    /// Linearization slope near ΔP = 0 (reference density).
    linear_slope: f64,
}

impl TwoWayFlow {
    /// Simplified single-stream opening.
    pub fn new(cd: f64, area: f64) -> ElementResult<Self> {
        if cd <= 0.0 || area <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "TwoWayFlow Cd and area must be positive",
            });
        }
        // Chord slope at DP_MIN for continuity across the linear regime
        let q_at_min = cd * area * (2.0 * DP_MIN / RHO_REF).sqrt();
        Ok(Self {
            cd,
            area,
            geometry: None,
            linear_slope: RHO_REF * q_at_min / DP_MIN,
        })
    }

    /// Opening with known height and width, enabling the neutral-plane
    /// bidirectional mode.
    pub fn with_geometry(cd: f64, area: f64, height: f64, width: f64) -> ElementResult<Self> {
        if height <= 0.0 || width <= 0.0 {
            return Err(ElementError::InvalidParameter {
                what: "TwoWayFlow height and width must be positive",
            });
        }
        let mut opening = Self::new(cd, area)?;
        opening.geometry = Some(OpeningGeometry { height, width });
        Ok(opening)
    }

    pub fn discharge_coefficient(&self) -> f64 {
        self.cd
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Counterflowing fluxes (ṁ_ij, ṁ_ji) through the opening, or `None`
    /// when bidirectional mode does not apply: no geometry, negligible
    /// density contrast, or neutral plane outside the opening.
    pub fn two_way_fluxes(
        &self,
        delta_p: f64,
        rho_from: f64,
        rho_to: f64,
    ) -> Option<(f64, f64)> {
        let geom = self.geometry?;
        let drho = rho_from - rho_to;
        if drho.abs() < MIN_DENSITY_CONTRAST {
            return None;
        }

        let half_h = geom.height / 2.0;
        let z_np = delta_p / (drho * GRAVITY);
        if !(-half_h..=half_h).contains(&z_np) {
            return None;
        }

        Some(self.layer_fluxes(delta_p, rho_from, rho_to, geom))
    }

    /// Fluxes with the neutral plane clamped into the opening; smooth in
    /// ΔP, so usable for numerical differentiation.
    fn layer_fluxes(
        &self,
        delta_p: f64,
        rho_from: f64,
        rho_to: f64,
        geom: OpeningGeometry,
    ) -> (f64, f64) {
        let drho = rho_from - rho_to;
        let slope = drho.abs() * GRAVITY;
        let half_h = geom.height / 2.0;

        // Neutral plane height relative to the link centerline. The local
        // pressure difference grows linearly away from it with |Δρ|·g.
        let z_np = (delta_p / (drho * GRAVITY)).clamp(-half_h, half_h);
        let l_lower = z_np + half_h;
        let l_upper = half_h - z_np;

        // Denser side discharges through the lower layer.
        let (l_fwd, l_rev) = if drho > 0.0 {
            (l_lower, l_upper)
        } else {
            (l_upper, l_lower)
        };

        let m_fwd = self.layer_mass_flow(slope, l_fwd, rho_from, geom.width);
        let m_rev = self.layer_mass_flow(slope, l_rev, rho_to, geom.width);
        (m_fwd, m_rev)
    }

    /// Mass flow through one layer: ∫₀ᴸ ρ·Cd·w·√(2·s·u/ρ) du
    ///   = ρ·Cd·w·√(2·s/ρ)·(2/3)·L^(3/2).
    fn layer_mass_flow(&self, slope: f64, layer: f64, rho_donor: f64, width: f64) -> f64 {
        if layer <= 0.0 {
            return 0.0;
        }
        rho_donor * self.cd * width * (2.0 * slope / rho_donor).sqrt() * (2.0 / 3.0)
            * layer.powf(1.5)
    }
}

impl FlowElement for TwoWayFlow {
    fn calculate(&self, delta_p: f64, density: f64) -> FlowResult {
        let (abs_dp, sign) = split_dp(delta_p);

        if abs_dp < DP_MIN {
            FlowResult {
                mass_flow: self.linear_slope * delta_p,
                derivative: self.linear_slope,
            }
        } else {
            let q = self.cd * self.area * (2.0 * abs_dp / density).sqrt();
            FlowResult {
                mass_flow: density * q * sign,
                // d(ṁ)/d(ΔP) = ½·Cd·A·√(2·ρ/|ΔP|)
                derivative: 0.5 * self.cd * self.area * (2.0 * density / abs_dp).sqrt(),
            }
        }
    }

    fn calculate_bidirectional(
        &self,
        delta_p: f64,
        rho_from: f64,
        rho_to: f64,
    ) -> Option<FlowResult> {
        let geom = self.geometry?;
        let (m_fwd, m_rev) = self.two_way_fluxes(delta_p, rho_from, rho_to)?;

        // Derivative by perturbing the neutral plane through ΔP.
        let eps = (0.01 * delta_p.abs()).max(DP_MIN);
        let net = |dp: f64| {
            let (f, r) = self.layer_fluxes(dp, rho_from, rho_to, geom);
            f - r
        };
        let derivative = (net(delta_p + eps) - net(delta_p - eps)) / (2.0 * eps);

        Some(FlowResult {
            mass_flow: m_fwd - m_rev,
            derivative: derivative.max(1e-10),
        })
    }

    fn type_name(&self) -> &'static str {
        "TwoWayFlow"
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
