//! Flow element models for the airflow network.
//!
//! Every element maps a signed pressure drop across its link to a signed
//! mass flow (positive = from the link's `from` node to its `to` node) and
//! the derivative d(ṁ)/d(ΔP) the Newton solver assembles into the Jacobian.
//! All laws linearize below `DP_MIN` to avoid the |ΔP|^(n−1) singularity.

pub mod common;
pub mod damper;
pub mod duct;
pub mod element;
pub mod error;
pub mod fan;
pub mod filter;
pub mod power_law;
pub mod two_way;

pub use damper::Damper;
pub use duct::Duct;
pub use element::{FlowElement, FlowResult};
pub use error::{ElementError, ElementResult};
pub use fan::Fan;
pub use filter::Filter;
pub use power_law::PowerLawOrifice;
pub use two_way::TwoWayFlow;
