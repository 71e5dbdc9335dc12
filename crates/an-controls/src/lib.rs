//! Control entities for the transient driver.
//!
//! Sensors read zone and link state, incremental PI controllers turn the
//! error signal into an output, actuators write the output back into link
//! flow elements, and logic nodes form an optional algebraic computation
//! graph between them.

pub mod actuator;
pub mod controller;
pub mod error;
pub mod logic;
pub mod sensor;

pub use actuator::{Actuator, ActuatorKind};
pub use controller::Controller;
pub use error::{ControlError, ControlResult};
pub use logic::{
    AbsNode, AndNode, AverageNode, DivideNode, ExpNode, IntegratorNode, LnNode, LogicNode,
    MaxNode, MinNode, MovingAverageNode, MultiplyNode, NotNode, OrNode, SumNode, XorNode,
};
pub use sensor::{Sensor, SensorKind};
