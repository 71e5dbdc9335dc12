//! The transient driver.

use std::collections::HashMap;

use an_core::constants::{M_AIR, R_AIR, RHO_REF};
use an_controls::{Actuator, ActuatorKind, Controller, Sensor, SensorKind};
use an_elements::Damper;
use an_network::Network;
use an_solver::{AirflowSolution, Solver, SolverMethod};
use an_transport::{ContaminantResult, ContaminantSolver, ReactionNetwork, Schedule, Source, Species};

use crate::occupant::Occupant;

/// Timing and method configuration for a transient run.
#[derive(Debug, Clone, Copy)]
pub struct TransientConfig {
    pub start_time: f64,
    pub end_time: f64,
    pub time_step: f64,
    pub output_interval: f64,
    pub airflow_method: SolverMethod,
}

impl Default for TransientConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            end_time: 3600.0,
            time_step: 60.0,
            output_interval: 60.0,
            airflow_method: SolverMethod::TrustRegion,
        }
    }
}

/// One recorded snapshot.
#[derive(Debug, Clone)]
pub struct TimeStepRecord {
    pub time: f64,
    pub airflow: AirflowSolution,
    pub contaminant: Option<ContaminantResult>,
}

/// Outcome of a transient run. `completed` is false when the progress
/// callback cancelled the run; the history holds everything recorded up
/// to that point.
#[derive(Debug, Clone, Default)]
pub struct TransientResult {
    pub completed: bool,
    pub history: Vec<TimeStepRecord>,
}

type ProgressCallback = Box<dyn FnMut(f64, f64) -> bool>;

/// Transient driver: borrows the network per run and owns the control
/// entities, species list, schedules and occupants.
#[derive(Default)]
pub struct TransientSimulation {
    config: TransientConfig,
    species: Vec<Species>,
    sources: Vec<Source>,
    schedules: HashMap<i32, Schedule>,
    reactions: ReactionNetwork,

    sensors: Vec<Sensor>,
    controllers: Vec<Controller>,
    actuators: Vec<Actuator>,
    occupants: Vec<Occupant>,

    progress: Option<ProgressCallback>,
}

impl TransientSimulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_config(&mut self, config: TransientConfig) {
        self.config = config;
    }

    pub fn set_species(&mut self, species: Vec<Species>) {
        self.species = species;
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

    pub fn set_sensors(&mut self, sensors: Vec<Sensor>) {
        self.sensors = sensors;
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn set_controllers(&mut self, controllers: Vec<Controller>) {
        self.controllers = controllers;
    }

    pub fn set_actuators(&mut self, actuators: Vec<Actuator>) {
        self.actuators = actuators;
    }

    pub fn set_occupants(&mut self, occupants: Vec<Occupant>) {
        self.occupants = occupants;
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    pub fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }

    /// Cooperative cancellation: invoked once per step with (t, t_end);
    /// returning false stops the run.
    pub fn set_progress_callback(&mut self, cb: impl FnMut(f64, f64) -> bool + 'static) {
        self.progress = Some(Box::new(cb));
    }

    /// Run the transient simulation on the network.
    pub fn run(&mut self, network: &mut Network) -> TransientResult {
        let mut result = TransientResult::default();

        let airflow_solver = Solver::new(self.config.airflow_method);
        let mut contaminant_solver = ContaminantSolver::new();
        let has_contaminants = !self.species.is_empty();

        if has_contaminants {
            contaminant_solver.set_species(self.species.clone());
            contaminant_solver.set_sources(self.sources.clone());
            contaminant_solver.set_schedules(self.schedules.clone());
            contaminant_solver.set_reactions(self.reactions.clone());
            contaminant_solver.initialize(network);
        }

        let mut t = self.config.start_time;
        let dt = self.config.time_step;
        let mut next_output = self.config.start_time;

        // Initial airflow solve and record at t_start
        let mut airflow = airflow_solver.solve(network);
        let initial_concentrations = has_contaminants.then(|| ContaminantResult {
            time: t,
            concentrations: contaminant_solver.concentrations().clone(),
        });
        result.history.push(TimeStepRecord {
            time: t,
            airflow: airflow.clone(),
            contaminant: initial_concentrations,
        });
        next_output += self.config.output_interval;

        while t < self.config.end_time - 1e-10 {
            // Shorten the final step to land exactly on end_time
            let current_dt = dt.min(self.config.end_time - t);

            // 1. Control loop: read sensors, advance controllers, write
            //    actuators into the link elements.
            if !self.controllers.is_empty() {
                self.update_sensors(network, &contaminant_solver);
                self.update_controllers();
                self.apply_actuators(network);
            }

            // 2. Quasi-steady airflow at this instant
            airflow = airflow_solver.solve(network);
            if !airflow.converged {
                tracing::debug!(time = t, "airflow did not converge; continuing");
            }

            // 3. Contaminant transport on the just-solved flows, then
            //    density feedback if any species carries enough mass to
            //    matter.
            let mut contaminant = None;
            if has_contaminants {
                let step = contaminant_solver.step(network, t, current_dt);
                if self.has_non_trace_species() {
                    self.update_densities_from_concentrations(network, &contaminant_solver);
                    let resolved = airflow_solver.solve(network);
                    if resolved.converged {
                        airflow = resolved;
                    }
                }
                contaminant = Some(step);
            }

            t += current_dt;

            // 4. Occupant exposure at the new time
            if !self.occupants.is_empty() && has_contaminants {
                self.update_occupant_exposure(&contaminant_solver, t, current_dt);
            }

            // 5. Snapshot at output intervals (and always at the end)
            if t >= next_output - 1e-10 || t >= self.config.end_time - 1e-10 {
                result.history.push(TimeStepRecord {
                    time: t,
                    airflow: airflow.clone(),
                    contaminant: contaminant.clone(),
                });
                next_output += self.config.output_interval;
            }

            // 6. Cooperative cancel
            if let Some(cb) = self.progress.as_mut() {
                if !cb(t, self.config.end_time) {
                    return result;
                }
            }
        }

        result.completed = true;
        result
    }

    fn update_sensors(&mut self, network: &Network, contaminants: &ContaminantSolver) {
        let conc = contaminants.concentrations();
        for sensor in &mut self.sensors {
            match sensor.kind {
                SensorKind::Concentration => {
                    if let Some(row) = conc.get(sensor.target_id) {
                        if let Some(&value) = row.get(sensor.species_idx) {
                            sensor.last_reading = value;
                        }
                    }
                }
                SensorKind::Pressure => {
                    if sensor.target_id < network.node_count() {
                        sensor.last_reading = network.node(sensor.target_id).pressure();
                    }
                }
                SensorKind::Temperature => {
                    if sensor.target_id < network.node_count() {
                        sensor.last_reading = network.node(sensor.target_id).temperature();
                    }
                }
                SensorKind::MassFlow => {
                    if sensor.target_id < network.link_count() {
                        sensor.last_reading = network.link(sensor.target_id).mass_flow();
                    }
                }
            }
        }
    }

    fn update_controllers(&mut self) {
        for ctrl in &mut self.controllers {
            if let Some(sensor) = self.sensors.iter().find(|s| s.id == ctrl.sensor_id) {
                ctrl.update(sensor.last_reading);
            }
        }
    }

    fn apply_actuators(&mut self, network: &mut Network) {
        for act in &mut self.actuators {
            let command = self
                .controllers
                .iter()
                .find(|c| c.actuator_id == act.id)
                .map_or(0.0, |c| c.output());
            act.current_value = command;

            if act.link_idx >= network.link_count() {
                continue;
            }

            match act.kind {
                ActuatorKind::DamperFraction => {
                    // Clone, mutate, swap: the link exclusively owns its
                    // element.
                    let link = network.link_mut(act.link_idx);
                    let mut element = link.element().boxed_clone();
                    if let Some(damper) = element.as_any_mut().downcast_mut::<Damper>() {
                        damper.set_fraction(command);
                        link.set_element(element);
                    }
                }
                // FanSpeed and FilterBypass are reserved
                ActuatorKind::FanSpeed | ActuatorKind::FilterBypass => {}
            }
        }
    }

    fn has_non_trace_species(&self) -> bool {
        self.species.iter().any(|sp| !sp.is_trace)
    }

    /// Mixture-aware density update:
    /// R_mix = R_air·(1 + Σ_k w_k·(M_air/M_k − 1)) with w_k = C_k/ρ over
    /// the non-trace species, then ρ = P_abs/(R_mix·T).
    fn update_densities_from_concentrations(
        &self,
        network: &mut Network,
        contaminants: &ContaminantSolver,
    ) {
        let conc = contaminants.concentrations();

        for i in 0..network.node_count() {
            if network.node(i).is_known_pressure() {
                continue;
            }
            let Some(row) = conc.get(i) else { continue };

            let mut rho_base = network.node(i).density();
            if rho_base <= 0.0 {
                rho_base = RHO_REF;
            }

            let mut correction = 0.0;
            for (k, sp) in self.species.iter().enumerate() {
                if sp.is_trace || sp.molar_mass <= 0.0 {
                    continue;
                }
                let Some(&c_k) = row.get(k) else { continue };
                let w_k = c_k / rho_base;
                correction += w_k * (M_AIR / sp.molar_mass - 1.0);
            }

            let r_mix = R_AIR * (1.0 + correction);
            let node = network.node_mut(i);
            node.set_gas_constant(r_mix);
            node.update_density();
        }
    }

    fn update_occupant_exposure(
        &mut self,
        contaminants: &ContaminantSolver,
        t: f64,
        dt: f64,
    ) {
        let conc = contaminants.concentrations();
        let num_species = self.species.len();

        for occ in &mut self.occupants {
            if occ.exposure.len() != num_species {
                occ.init_exposure(num_species);
            }

            // Schedule value rounds to a zone index; out-of-range values
            // leave the occupant where it is.
            if occ.schedule_id >= 0 {
                if let Some(sch) = self.schedules.get(&occ.schedule_id) {
                    let zone = sch.value_at(t).round();
                    if zone >= 0.0 && (zone as usize) < conc.len() {
                        occ.current_zone = zone as usize;
                    }
                }
            }

            if let Some(row) = conc.get(occ.current_zone) {
                occ.update_exposure(row, t, dt);
            }
        }
    }
}
