//! Newton iteration over the pressure-flow network.

use nalgebra::{DMatrix, DVector};

use an_core::constants::{
    CONVERGENCE_TOL, GRAVITY, MAX_ITERATIONS, RELAX_FACTOR_SUR, TR_INITIAL_RADIUS, TR_MAX_RADIUS,
    TR_MIN_RADIUS,
};
use an_network::{Link, Network};

/// Globalization strategy for the Newton update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverMethod {
    /// Simple under-relaxation, α ≈ 0.75.
    SubRelaxation,
    /// Step-clipping trust region (default, more robust).
    #[default]
    TrustRegion,
}

/// Outcome of a steady airflow solve.
///
/// On convergence failure the fields still reflect the last iterate;
/// Ambient pressures are reported unchanged.
#[derive(Debug, Clone, Default)]
pub struct AirflowSolution {
    pub converged: bool,
    pub iterations: usize,
    /// Infinity norm of the nodal mass residual (kg/s).
    pub max_residual: f64,
    /// Final pressure for every node (Pa, gauge), in node order.
    pub pressures: Vec<f64>,
    /// Final mass flow for every link (kg/s), in link order.
    pub mass_flows: Vec<f64>,
}

/// Steady-state airflow solver.
#[derive(Debug, Clone)]
pub struct Solver {
    method: SolverMethod,
    max_iterations: usize,
    convergence_tol: f64,
    relax_factor: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SolverMethod::default())
    }
}

impl Solver {
    pub fn new(method: SolverMethod) -> Self {
        Self {
            method,
            max_iterations: MAX_ITERATIONS,
            convergence_tol: CONVERGENCE_TOL,
            relax_factor: RELAX_FACTOR_SUR,
        }
    }

    pub fn set_method(&mut self, method: SolverMethod) {
        self.method = method;
    }

    pub fn set_max_iterations(&mut self, n: usize) {
        self.max_iterations = n;
    }

    pub fn set_convergence_tol(&mut self, tol: f64) {
        self.convergence_tol = tol;
    }

    pub fn set_relax_factor(&mut self, alpha: f64) {
        self.relax_factor = alpha;
    }

    /// Solve the steady-state airflow network.
    pub fn solve(&self, network: &mut Network) -> AirflowSolution {
        let mut result = AirflowSolution::default();

        // Node index -> equation index; Ambient nodes have no equation.
        let mut unknown_map: Vec<Option<usize>> = vec![None; network.node_count()];
        let mut eq_count = 0;
        for (i, node) in network.nodes().iter().enumerate() {
            if !node.is_known_pressure() {
                unknown_map[i] = Some(eq_count);
                eq_count += 1;
            }
        }

        if eq_count == 0 {
            result.converged = true;
            self.collect(network, &mut result);
            return result;
        }

        network.update_all_densities();
        let mut trust_radius = TR_INITIAL_RADIUS;

        for iter in 0..self.max_iterations {
            // Densities move with pressure through the ideal gas law.
            network.update_all_densities();
            compute_flows(network);

            let (jacobian, residual) = assemble_system(network, &unknown_map, eq_count);

            result.max_residual = residual.amax();
            result.iterations = iter + 1;

            if result.max_residual < self.convergence_tol {
                result.converged = true;
                break;
            }

            // Solve J·x = −R
            let rhs = -&residual;
            let step = match jacobian.lu().solve(&rhs) {
                Some(step) => step,
                None => {
                    tracing::warn!(
                        iteration = iter,
                        "Jacobian factorization failed; keeping last iterate"
                    );
                    break;
                }
            };

            match self.method {
                SolverMethod::SubRelaxation => {
                    self.apply_update_sur(network, &step, &unknown_map);
                }
                SolverMethod::TrustRegion => {
                    apply_update_tr(network, &step, &unknown_map, &mut trust_radius);
                }
            }
        }

        self.collect(network, &mut result);
        result
    }

    fn apply_update_sur(
        &self,
        network: &mut Network,
        step: &DVector<f64>,
        unknown_map: &[Option<usize>],
    ) {
        for (i, eq) in unknown_map.iter().enumerate() {
            if let Some(eq) = eq {
                let node = network.node_mut(i);
                node.set_pressure(node.pressure() + self.relax_factor * step[*eq]);
            }
        }
    }

    fn collect(&self, network: &Network, result: &mut AirflowSolution) {
        result.pressures = network.nodes().iter().map(|n| n.pressure()).collect();
        result.mass_flows = network.links().iter().map(|l| l.mass_flow()).collect();
    }
}

/// Effective pressure drop across a link, correcting each endpoint to the
/// link centerline elevation:
/// ΔP = (P_i − ρ_i·g·(Z_k − Z_i)) − (P_j − ρ_j·g·(Z_k − Z_j)).
fn compute_delta_p(network: &Network, link: &Link) -> f64 {
    let node_i = network.node(link.from_node());
    let node_j = network.node(link.to_node());
    let zk = link.elevation();

    let p_eff_i = node_i.pressure() - node_i.density() * GRAVITY * (zk - node_i.elevation());
    let p_eff_j = node_j.pressure() - node_j.density() * GRAVITY * (zk - node_j.elevation());

    // Positive ΔP drives flow from node_i to node_j
    p_eff_i - p_eff_j
}

/// Evaluate every link's element and cache ṁ and dṁ/dΔP on the link.
fn compute_flows(network: &mut Network) {
    for idx in 0..network.link_count() {
        let (delta_p, rho_i, rho_j) = {
            let link = network.link(idx);
            let delta_p = compute_delta_p(network, link);
            let rho_i = network.node(link.from_node()).density();
            let rho_j = network.node(link.to_node()).density();
            (delta_p, rho_i, rho_j)
        };

        let result = {
            let element = network.link(idx).element();
            // Large openings with geometry use both densities; everything
            // else sees the average.
            element
                .calculate_bidirectional(delta_p, rho_i, rho_j)
                .unwrap_or_else(|| element.calculate(delta_p, 0.5 * (rho_i + rho_j)))
        };

        network.link_mut(idx).store_flow(result);
    }
}

/// Assemble the Jacobian and residual over the unknown equations.
///
/// Residual convention: net inflow = 0, so a link subtracts its flow from
/// the upstream equation and adds it to the downstream one. Each link
/// contributes −d to both diagonals and +d to both off-diagonals, with
/// rows/columns of Ambient endpoints skipped.
fn assemble_system(
    network: &Network,
    unknown_map: &[Option<usize>],
    eq_count: usize,
) -> (DMatrix<f64>, DVector<f64>) {
    let mut jacobian = DMatrix::zeros(eq_count, eq_count);
    let mut residual = DVector::zeros(eq_count);

    for link in network.links() {
        let mass_flow = link.mass_flow();
        let deriv = link.derivative();
        let eq_i = unknown_map[link.from_node()];
        let eq_j = unknown_map[link.to_node()];

        if let Some(ei) = eq_i {
            residual[ei] -= mass_flow;
            jacobian[(ei, ei)] -= deriv;
            if let Some(ej) = eq_j {
                jacobian[(ei, ej)] += deriv;
            }
        }
        if let Some(ej) = eq_j {
            residual[ej] += mass_flow;
            jacobian[(ej, ej)] -= deriv;
            if let Some(ei) = eq_i {
                jacobian[(ej, ei)] += deriv;
            }
        }
    }

    (jacobian, residual)
}

/// Trust-region update: clip the Newton step to the radius, then shrink
/// the radius if clipping occurred and grow it otherwise.
fn apply_update_tr(
    network: &mut Network,
    step: &DVector<f64>,
    unknown_map: &[Option<usize>],
    trust_radius: &mut f64,
) {
    let step_norm = step.norm();
    let scale = if step_norm > *trust_radius {
        *trust_radius / step_norm
    } else {
        1.0
    };

    for (i, eq) in unknown_map.iter().enumerate() {
        if let Some(eq) = eq {
            let node = network.node_mut(i);
            node.set_pressure(node.pressure() + scale * step[*eq]);
        }
    }

    if scale < 1.0 {
        *trust_radius = (*trust_radius * 0.5).max(TR_MIN_RADIUS);
    } else {
        *trust_radius = (*trust_radius * 2.0).min(TR_MAX_RADIUS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use an_elements::PowerLawOrifice;
    use an_network::{Node, NodeKind};

    fn two_node_network(dp_boundary: f64) -> Network {
        let mut net = Network::new();
        let mut outside = Node::new(0, "Out", NodeKind::Ambient);
        outside.set_pressure(dp_boundary);
        net.add_node(outside).unwrap();
        net.add_node(Node::new(1, "Room", NodeKind::Normal)).unwrap();
        net.add_node(Node::new(2, "Out2", NodeKind::Ambient)).unwrap();

        let crack = || Box::new(PowerLawOrifice::new(0.001, 0.65).unwrap());
        net.add_link(Link::new(0, 0, 1, 0.0, crack())).unwrap();
        net.add_link(Link::new(1, 1, 2, 0.0, crack())).unwrap();
        net
    }

    #[test]
    fn series_cracks_split_pressure() {
        let mut net = two_node_network(10.0);
        let result = Solver::default().solve(&mut net);

        assert!(result.converged);
        assert!(result.max_residual < CONVERGENCE_TOL);
        // Identical cracks in series: the room sits midway
        assert!((result.pressures[1] - 5.0).abs() < 0.01);
        // Continuity: same flow through both links
        assert!((result.mass_flows[0] - result.mass_flows[1]).abs() < CONVERGENCE_TOL);
    }

    #[test]
    fn sur_and_tr_agree() {
        let mut net_a = two_node_network(10.0);
        let mut net_b = two_node_network(10.0);

        let tr = Solver::new(SolverMethod::TrustRegion).solve(&mut net_a);
        let sur = Solver::new(SolverMethod::SubRelaxation).solve(&mut net_b);

        assert!(tr.converged);
        assert!(sur.converged);
        assert!((tr.pressures[1] - sur.pressures[1]).abs() < 1e-3);
    }

    #[test]
    fn all_ambient_network_converges_trivially() {
        let mut net = Network::new();
        net.add_node(Node::new(0, "A", NodeKind::Ambient)).unwrap();
        net.add_node(Node::new(1, "B", NodeKind::Ambient)).unwrap();

        let result = Solver::default().solve(&mut net);
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn zero_boundary_pressure_gives_zero_flow() {
        let mut net = two_node_network(0.0);
        let result = Solver::default().solve(&mut net);
        assert!(result.converged);
        assert!(result.mass_flows[0].abs() < 1e-8);
    }
}
