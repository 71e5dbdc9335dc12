//! Core trait for flow element models.

use std::any::Any;
use std::fmt::Debug;

/// Result of a flow calculation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowResult {
    /// Mass flow rate (kg/s), positive = from node_i to node_j.
    pub mass_flow: f64,
    /// d(ṁ)/d(ΔP) at this operating point, for Jacobian assembly.
    pub derivative: f64,
}

/// Trait for flow elements connecting two zones of the network.
///
/// Elements are deterministic functions of the pressure drop and the air
/// density handed to them by the solver; all state lives in their
/// parameters. ΔP > 0 means flow from node_i to node_j.
pub trait FlowElement: Debug + Send + Sync {
    /// Compute mass flow rate and derivative for a pressure drop ΔP (Pa)
    /// at the given density (kg/m³).
    fn calculate(&self, delta_p: f64, density: f64) -> FlowResult;

    /// Human-readable type name for diagnostics and actuator dispatch.
    fn type_name(&self) -> &'static str;

    /// Clone for polymorphic copy. Links own their element by value and
    /// deep-copy it whenever the link is copied.
    fn boxed_clone(&self) -> Box<dyn FlowElement>;

    /// Downcast support for actuators that mutate element parameters.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Fraction of advected species mass passed to the downwind zone.
    /// Filters override this with (1 − η); everything else passes all.
    fn species_penetration(&self) -> f64 {
        1.0
    }

    /// Buoyancy-aware evaluation for large openings, given the densities
    /// on both sides of the link. Elements without a bidirectional mode
    /// return `None` and the solver falls back to [`calculate`].
    ///
    /// [`calculate`]: FlowElement::calculate
    fn calculate_bidirectional(
        &self,
        _delta_p: f64,
        _rho_from: f64,
        _rho_to: f64,
    ) -> Option<FlowResult> {
        None
    }
}

impl Clone for Box<dyn FlowElement> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}
