//! Network model: zones (nodes), flow paths (links) and ambient
//! conditions.
//!
//! The network owns all nodes and links; each link exclusively owns its
//! flow element. Human-visible node ids resolve to vector indices through
//! the network's id map, and everything downstream works in indices.

pub mod error;
pub mod link;
pub mod network;
pub mod node;

pub use error::{NetworkError, NetworkResult};
pub use link::Link;
pub use network::Network;
pub use node::{Node, NodeKind};
