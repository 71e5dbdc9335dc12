//! Implicit-Euler contaminant transport solver.
//!
//! Assembles (V/Δt + outflow + removal + decay)·C^{n+1} = V/Δt·C^n +
//! inflow + generation over the non-Ambient zones, using the link mass
//! flows the airflow solver already determined. Upwind donor-cell
//! advection; volumetric flows always use the upwind zone's density.
//! Without chemical kinetics each species solves independently; with a
//! reaction network registered the species couple into one block system
//! ordered (zone_eq, species).

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};

use an_network::Network;

use crate::reaction::ReactionNetwork;
use crate::schedule::Schedule;
use crate::source::{Source, SourceKind};
use crate::species::Species;

/// Zone volumes are floored at this value in the assembly so near-zero
/// volumes (phantom zones) cannot ill-condition the system.
const MIN_ZONE_VOLUME: f64 = 1.0;

/// Concentration snapshot produced by one transport step.
#[derive(Debug, Clone)]
pub struct ContaminantResult {
    pub time: f64,
    /// kg/m³, indexed [zone][species].
    pub concentrations: Vec<Vec<f64>>,
}

/// Owns the concentration matrix and advances it in time.
#[derive(Debug, Clone, Default)]
pub struct ContaminantSolver {
    species: Vec<Species>,
    sources: Vec<Source>,
    schedules: HashMap<i32, Schedule>,
    reactions: ReactionNetwork,

    /// C[zone][species] in kg/m³.
    conc: Vec<Vec<f64>>,
    num_zones: usize,
    num_species: usize,
}

impl ContaminantSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_species(&mut self, species: Vec<Species>) {
        self.species = species;
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn set_sources(&mut self, sources: Vec<Source>) {
        self.sources = sources;
    }

    pub fn set_schedules(&mut self, schedules: HashMap<i32, Schedule>) {
        self.schedules = schedules;
    }

    pub fn set_reactions(&mut self, reactions: ReactionNetwork) {
        self.reactions = reactions;
    }

    /// Size the concentration matrix for the network; Ambient zones start
    /// at each species' outdoor concentration, everything else at zero.
    pub fn initialize(&mut self, network: &Network) {
        self.num_zones = network.node_count();
        self.num_species = self.species.len();
        self.conc = vec![vec![0.0; self.num_species]; self.num_zones];

        for (i, node) in network.nodes().iter().enumerate() {
            if node.is_known_pressure() {
                for (k, sp) in self.species.iter().enumerate() {
                    self.conc[i][k] = sp.outdoor_conc;
                }
            }
        }
    }

    /// Override a starting concentration (ignored for out-of-range
    /// indices).
    pub fn set_initial_concentration(&mut self, zone: usize, species: usize, conc: f64) {
        if zone < self.num_zones && species < self.num_species {
            self.conc[zone][species] = conc;
        }
    }

    pub fn concentrations(&self) -> &Vec<Vec<f64>> {
        &self.conc
    }

    /// Advance all species from t to t + dt and resnap Ambient zones to
    /// their outdoor values.
    pub fn step(&mut self, network: &Network, t: f64, dt: f64) -> ContaminantResult {
        if self.num_species == 0 {
            return ContaminantResult {
                time: t + dt,
                concentrations: self.conc.clone(),
            };
        }

        if self.reactions.is_empty() {
            for k in 0..self.num_species {
                self.solve_species(network, k, t, dt);
            }
        } else {
            self.solve_coupled(network, t, dt);
        }

        for (i, node) in network.nodes().iter().enumerate() {
            if node.is_known_pressure() {
                for (k, sp) in self.species.iter().enumerate() {
                    self.conc[i][k] = sp.outdoor_conc;
                }
            }
        }

        ContaminantResult {
            time: t + dt,
            concentrations: self.conc.clone(),
        }
    }

    fn schedule_value(&self, schedule_id: i32, t: f64) -> f64 {
        if schedule_id < 0 {
            return 1.0;
        }
        self.schedules
            .get(&schedule_id)
            .map_or(1.0, |sch| sch.value_at(t))
    }

    /// Equation map over non-Ambient zones.
    fn unknown_map(&self, network: &Network) -> (Vec<Option<usize>>, usize) {
        let mut map = vec![None; self.num_zones];
        let mut count = 0;
        for (i, node) in network.nodes().iter().enumerate() {
            if !node.is_known_pressure() {
                map[i] = Some(count);
                count += 1;
            }
        }
        (map, count)
    }

    /// RHS generation contribution of one source at t + dt.
    fn source_generation(&self, src: &Source, zone_idx: usize, spec_idx: usize,
                         network: &Network, t_next: f64) -> f64 {
        let sched = self.schedule_value(src.schedule_id, t_next);
        match src.kind {
            SourceKind::Constant => src.generation_rate * sched,
            SourceKind::ExponentialDecay => {
                let elapsed = t_next - src.start_time;
                if elapsed >= 0.0 && src.decay_time_constant > 0.0 {
                    src.multiplier
                        * src.generation_rate
                        * (-elapsed / src.decay_time_constant).exp()
                        * sched
                } else {
                    0.0
                }
            }
            SourceKind::PressureDriven => {
                let p = network.node(zone_idx).pressure().abs();
                src.pressure_coeff * p * sched
            }
            SourceKind::CutoffConcentration => {
                // Gate on the start-of-step concentration
                if self.conc[zone_idx][spec_idx] < src.cutoff_conc {
                    src.generation_rate * sched
                } else {
                    0.0
                }
            }
        }
    }

    /// Single-species implicit Euler solve.
    fn solve_species(&mut self, network: &Network, spec_idx: usize, t: f64, dt: f64) {
        let (unknown_map, num_unknown) = self.unknown_map(network);
        if num_unknown == 0 {
            return;
        }

        let mut a: DMatrix<f64> = DMatrix::zeros(num_unknown, num_unknown);
        let mut b: DVector<f64> = DVector::zeros(num_unknown);

        // Time derivative and decay
        let lambda = self.species[spec_idx].decay_rate;
        for (i, node) in network.nodes().iter().enumerate() {
            let Some(eq) = unknown_map[i] else { continue };
            let vol = node.volume().max(MIN_ZONE_VOLUME);

            a[(eq, eq)] += vol / dt;
            b[eq] += vol / dt * self.conc[i][spec_idx];

            if lambda > 0.0 {
                a[(eq, eq)] += lambda * vol;
            }
        }

        // Upwind donor-cell advection along every link
        for link in network.links() {
            let mass_flow = link.mass_flow();
            if mass_flow == 0.0 {
                continue;
            }
            let (up, down) = if mass_flow > 0.0 {
                (link.from_node(), link.to_node())
            } else {
                (link.to_node(), link.from_node())
            };
            let flow_rate = mass_flow.abs() / network.node(up).density();
            let penetration = link.element().species_penetration();

            if let Some(eq_up) = unknown_map[up] {
                a[(eq_up, eq_up)] += flow_rate;
            }
            if let Some(eq_down) = unknown_map[down] {
                match unknown_map[up] {
                    Some(eq_up) => a[(eq_down, eq_up)] -= flow_rate * penetration,
                    // Ambient donor enters the RHS at its outdoor value
                    None => b[eq_down] += flow_rate * penetration * self.conc[up][spec_idx],
                }
            }
        }

        // Sources and removal sinks
        let t_next = t + dt;
        for src in &self.sources {
            if src.species_id != self.species[spec_idx].id {
                continue;
            }
            let Ok(zone_idx) = network.index_of(src.zone_id) else {
                continue;
            };
            let Some(eq) = unknown_map[zone_idx] else {
                continue;
            };

            b[eq] += self.source_generation(src, zone_idx, spec_idx, network, t_next);

            if src.removal_rate > 0.0 {
                let vol = network.node(zone_idx).volume().max(MIN_ZONE_VOLUME);
                a[(eq, eq)] += src.removal_rate * vol;
            }
        }

        match a.col_piv_qr().solve(&b) {
            Some(c_new) => {
                for (i, eq) in unknown_map.iter().enumerate() {
                    if let Some(eq) = eq {
                        self.conc[i][spec_idx] = c_new[*eq].max(0.0);
                    }
                }
            }
            None => {
                tracing::warn!(species = spec_idx, "contaminant solve failed; keeping state");
            }
        }
    }

    /// Coupled block solve with chemical kinetics, dimension
    /// num_unknown·num_species, ordered (zone_eq, species).
    fn solve_coupled(&mut self, network: &Network, t: f64, dt: f64) {
        let (unknown_map, num_unknown) = self.unknown_map(network);
        if num_unknown == 0 {
            return;
        }

        let ns = self.num_species;
        let dim = num_unknown * ns;
        let mut a: DMatrix<f64> = DMatrix::zeros(dim, dim);
        let mut b: DVector<f64> = DVector::zeros(dim);

        let idx = |zone_eq: usize, spec: usize| zone_eq * ns + spec;
        let kinetics = self.reactions.build_matrix(ns);

        // Time derivative, decay and kinetic couplings per zone
        for (i, node) in network.nodes().iter().enumerate() {
            let Some(eq) = unknown_map[i] else { continue };
            let vol = node.volume().max(MIN_ZONE_VOLUME);

            for k in 0..ns {
                let row = idx(eq, k);
                a[(row, row)] += vol / dt;
                b[row] += vol / dt * self.conc[i][k];

                let lambda = self.species[k].decay_rate;
                if lambda > 0.0 {
                    a[(row, row)] += lambda * vol;
                }

                // dC_k/dt = Σ_j K[k][j]·C_j, treated implicitly:
                // consumption on the diagonal, production as negative
                // off-diagonal block entries.
                for (j, &rate) in kinetics[k].iter().enumerate() {
                    if rate.abs() < 1e-30 {
                        continue;
                    }
                    if k == j {
                        if rate < 0.0 {
                            a[(row, row)] += rate.abs() * vol;
                        }
                    } else {
                        a[(row, idx(eq, j))] -= rate * vol;
                    }
                }
            }
        }

        // Advection: identical airflow rows replicated across species
        for link in network.links() {
            let mass_flow = link.mass_flow();
            if mass_flow == 0.0 {
                continue;
            }
            let (up, down) = if mass_flow > 0.0 {
                (link.from_node(), link.to_node())
            } else {
                (link.to_node(), link.from_node())
            };
            let flow_rate = mass_flow.abs() / network.node(up).density();
            let penetration = link.element().species_penetration();

            for k in 0..ns {
                if let Some(eq_up) = unknown_map[up] {
                    a[(idx(eq_up, k), idx(eq_up, k))] += flow_rate;
                }
                if let Some(eq_down) = unknown_map[down] {
                    match unknown_map[up] {
                        Some(eq_up) => {
                            a[(idx(eq_down, k), idx(eq_up, k))] -= flow_rate * penetration;
                        }
                        None => {
                            b[idx(eq_down, k)] += flow_rate * penetration * self.conc[up][k];
                        }
                    }
                }
            }
        }

        // Sources and removal sinks
        let t_next = t + dt;
        for src in &self.sources {
            let Some(spec_idx) = self.species.iter().position(|sp| sp.id == src.species_id)
            else {
                continue;
            };
            let Ok(zone_idx) = network.index_of(src.zone_id) else {
                continue;
            };
            let Some(eq) = unknown_map[zone_idx] else {
                continue;
            };
            let row = idx(eq, spec_idx);

            b[row] += self.source_generation(src, zone_idx, spec_idx, network, t_next);

            if src.removal_rate > 0.0 {
                let vol = network.node(zone_idx).volume().max(MIN_ZONE_VOLUME);
                a[(row, row)] += src.removal_rate * vol;
            }
        }

        match a.col_piv_qr().solve(&b) {
            Some(c_new) => {
                for (i, eq) in unknown_map.iter().enumerate() {
                    if let Some(eq) = eq {
                        for k in 0..ns {
                            self.conc[i][k] = c_new[idx(*eq, k)].max(0.0);
                        }
                    }
                }
            }
            None => {
                tracing::warn!("coupled contaminant solve failed; keeping state");
            }
        }
    }
}
