//! The airflow network: ordered node and link vectors plus the id map.

use std::collections::HashMap;

use an_core::constants::T_REF;

use crate::error::{NetworkError, NetworkResult};
use crate::link::Link;
use crate::node::Node;

/// Network of zones and flow paths with network-wide ambient conditions.
///
/// Nodes and links are stored in insertion order; the id→index map is the
/// sole mechanism for resolving human-visible ids, all internal
/// references are vector indices.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: Vec<Node>,
    links: Vec<Link>,
    id_to_index: HashMap<i32, usize>,

    ambient_temperature: f64,
    ambient_pressure: f64,
    wind_speed: f64,
    wind_direction: f64,
}

impl Network {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            id_to_index: HashMap::new(),
            ambient_temperature: T_REF,
            ambient_pressure: 0.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
        }
    }

    // ── Nodes ───────────────────────────────────────────────────────

    pub fn add_node(&mut self, node: Node) -> NetworkResult<usize> {
        let id = node.id();
        if self.id_to_index.contains_key(&id) {
            return Err(NetworkError::DuplicateNode { id });
        }
        let index = self.nodes.len();
        self.id_to_index.insert(id, index);
        self.nodes.push(node);
        Ok(index)
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve a human-visible node id to its vector index.
    pub fn index_of(&self, id: i32) -> NetworkResult<usize> {
        self.id_to_index
            .get(&id)
            .copied()
            .ok_or(NetworkError::UnknownNode { id })
    }

    // ── Links ───────────────────────────────────────────────────────

    pub fn add_link(&mut self, link: Link) -> NetworkResult<usize> {
        if link.from_node() >= self.nodes.len() || link.to_node() >= self.nodes.len() {
            return Err(NetworkError::InvalidEndpoint { id: link.id() });
        }
        let index = self.links.len();
        self.links.push(link);
        Ok(index)
    }

    pub fn link(&self, index: usize) -> &Link {
        &self.links[index]
    }

    pub fn link_mut(&mut self, index: usize) -> &mut Link {
        &mut self.links[index]
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut [Link] {
        &mut self.links
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    // ── Solver support ──────────────────────────────────────────────

    /// Number of nodes with unknown pressure (everything except Ambient).
    pub fn unknown_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| !n.is_known_pressure())
            .count()
    }

    /// Refresh every node's density from its current pressure and
    /// temperature.
    pub fn update_all_densities(&mut self) {
        for node in &mut self.nodes {
            node.update_density();
        }
    }

    /// Add wind pressure onto every Ambient node carrying wind data.
    /// Intended to be called once after load.
    pub fn apply_wind_pressure(&mut self) {
        if self.wind_speed == 0.0 {
            return;
        }
        let (speed, direction) = (self.wind_speed, self.wind_direction);
        for node in &mut self.nodes {
            if node.is_known_pressure() && node.has_wind_data() {
                let pw = node.wind_pressure(speed, direction);
                node.set_pressure(node.pressure() + pw);
                node.update_density();
            }
        }
    }

    // ── Ambient conditions ──────────────────────────────────────────

    pub fn ambient_temperature(&self) -> f64 {
        self.ambient_temperature
    }

    pub fn set_ambient_temperature(&mut self, t: f64) {
        self.ambient_temperature = t;
    }

    pub fn ambient_pressure(&self) -> f64 {
        self.ambient_pressure
    }

    pub fn set_ambient_pressure(&mut self, p: f64) {
        self.ambient_pressure = p;
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    pub fn set_wind_speed(&mut self, v: f64) {
        self.wind_speed = v;
    }

    pub fn wind_direction(&self) -> f64 {
        self.wind_direction
    }

    pub fn set_wind_direction(&mut self, deg: f64) {
        self.wind_direction = deg;
    }
}
