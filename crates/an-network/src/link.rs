//! Flow path between two zones.

use an_elements::{FlowElement, FlowResult};

/// A flow path: two node indices, a centerline elevation and an owned
/// flow element. The last computed mass flow and derivative are cached on
/// the link for the Jacobian assembly and the contaminant solver.
///
/// Cloning a link deep-copies its element.
#[derive(Debug, Clone)]
pub struct Link {
    id: i32,
    from: usize,
    to: usize,
    /// Z_k: centerline elevation of the path (m).
    elevation: f64,

    element: Box<dyn FlowElement>,

    mass_flow: f64,
    derivative: f64,
}

impl Link {
    pub fn new(
        id: i32,
        from: usize,
        to: usize,
        elevation: f64,
        element: Box<dyn FlowElement>,
    ) -> Self {
        Self {
            id,
            from,
            to,
            elevation,
            element,
            mass_flow: 0.0,
            derivative: 0.0,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn from_node(&self) -> usize {
        self.from
    }

    pub fn to_node(&self) -> usize {
        self.to
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn element(&self) -> &dyn FlowElement {
        self.element.as_ref()
    }

    /// Scoped mutable access to the element, used by actuators.
    pub fn element_mut(&mut self) -> &mut dyn FlowElement {
        self.element.as_mut()
    }

    /// Replace the owned element (actuator clone-and-swap path).
    pub fn set_element(&mut self, element: Box<dyn FlowElement>) {
        self.element = element;
    }

    pub fn mass_flow(&self) -> f64 {
        self.mass_flow
    }

    pub fn derivative(&self) -> f64 {
        self.derivative
    }

    /// Cache the latest element evaluation.
    pub fn store_flow(&mut self, result: FlowResult) {
        self.mass_flow = result.mass_flow;
        self.derivative = result.derivative;
    }
}
