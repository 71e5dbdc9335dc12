//! CO₂ transport scenarios through the transient driver.

use std::collections::HashMap;

use an_elements::{FlowElement, PowerLawOrifice};
use an_network::{Link, Network, Node, NodeKind};
use an_sim::{Occupant, TransientConfig, TransientSimulation};
use an_transport::{Schedule, Source, Species};

fn crack() -> Box<dyn FlowElement> {
    Box::new(PowerLawOrifice::new(0.001, 0.65).unwrap())
}

/// Cold ambient plus one warm office with cracks at two heights, so the
/// stack effect flushes the room.
fn office_network() -> Network {
    let mut net = Network::new();
    net.set_ambient_temperature(273.15);

    let mut ambient = Node::new(0, "Ambient", NodeKind::Ambient);
    ambient.set_temperature(273.15);
    net.add_node(ambient).unwrap();

    let mut office = Node::new(1, "Office", NodeKind::Normal);
    office.set_temperature(293.15);
    office.set_volume(60.0);
    net.add_node(office).unwrap();

    net.add_link(Link::new(0, 0, 1, 1.0, crack())).unwrap();
    net.add_link(Link::new(1, 1, 0, 2.0, crack())).unwrap();
    net
}

/// Source schedule: off, ramp on at 300–360 s, on until 1800 s, ramp off.
fn source_schedule() -> HashMap<i32, Schedule> {
    let mut sch = Schedule::new(0, "co2_source");
    sch.add_point(0.0, 0.0).unwrap();
    sch.add_point(300.0, 0.0).unwrap();
    sch.add_point(360.0, 1.0).unwrap();
    sch.add_point(1800.0, 1.0).unwrap();
    sch.add_point(1860.0, 0.0).unwrap();
    HashMap::from([(0, sch)])
}

fn record_at(result: &an_sim::TransientResult, time: f64) -> &an_sim::TimeStepRecord {
    result
        .history
        .iter()
        .find(|r| (r.time - time).abs() < 1e-3)
        .unwrap_or_else(|| panic!("no record at t = {time}"))
}

#[test]
fn scheduled_co2_source_rises_then_decays() {
    let mut net = office_network();
    let mut sim = TransientSimulation::new();
    sim.set_config(TransientConfig {
        start_time: 0.0,
        end_time: 3600.0,
        time_step: 30.0,
        output_interval: 60.0,
        ..Default::default()
    });
    sim.set_species(vec![Species::new(0, "CO2").with_molar_mass(0.044)]);
    sim.set_sources(vec![Source::constant(1, 0, 5.0e-6).with_schedule(0)]);
    sim.set_schedules(source_schedule());

    let result = sim.run(&mut net);
    assert!(result.completed);
    assert_eq!(result.history.len(), 61);

    let office = |t: f64| {
        record_at(&result, t).contaminant.as_ref().unwrap().concentrations[1][0]
    };

    // Nothing before the source switches on
    assert_eq!(office(0.0), 0.0);
    assert!(office(300.0) < 1e-9);

    // Rising while the source is on, decaying once it stops
    let c_mid = office(1000.0);
    let c_peak = office(1800.0);
    let c_end = office(3600.0);
    assert!(c_mid > 0.0);
    assert!(c_peak > c_mid, "concentration must grow while source is on");
    assert!(c_end < c_peak, "concentration must decay after shutoff");
    assert!(c_end > 0.0, "one hour is not enough to flush the room");

    // Airflow stays converged and mass-conservative at every record
    for record in &result.history {
        assert!(record.airflow.converged);
        let flows = &record.airflow.mass_flows;
        let net_room = flows[0] - flows[1];
        assert!(net_room.abs() < 1e-6, "room mass imbalance {net_room}");
    }
}

#[test]
fn ambient_concentration_pinned_to_outdoor_background() {
    let mut net = office_network();
    let mut sim = TransientSimulation::new();
    sim.set_config(TransientConfig {
        end_time: 600.0,
        time_step: 30.0,
        output_interval: 60.0,
        ..Default::default()
    });
    sim.set_species(vec![Species::new(0, "CO2").with_outdoor_conc(7.0e-4)]);
    sim.set_sources(vec![Source::constant(1, 0, 1.0e-5)]);

    let result = sim.run(&mut net);
    assert!(result.completed);

    for record in &result.history {
        let conc = &record.contaminant.as_ref().unwrap().concentrations;
        assert_eq!(conc[0][0], 7.0e-4, "ambient must stay at outdoor value");
        assert!(conc[1][0] >= 0.0);
    }
}

#[test]
fn species_decay_empties_sealed_room() {
    let mut net = Network::new();
    let mut room = Node::new(1, "Sealed", NodeKind::Normal);
    room.set_volume(50.0);
    net.add_node(room).unwrap();

    let mut sim = TransientSimulation::new();
    sim.set_config(TransientConfig {
        end_time: 3600.0,
        time_step: 60.0,
        output_interval: 600.0,
        ..Default::default()
    });
    sim.set_species(vec![Species::new(0, "radon").with_decay_rate(2.0e-3)]);
    // Short exponential release at t = 0 seeds the room
    sim.set_sources(vec![Source::exponential_decay(1, 0, 1.0e-5, 120.0, 0.0, 1.0)]);

    let result = sim.run(&mut net);
    assert!(result.completed);

    let early = record_at(&result, 600.0).contaminant.as_ref().unwrap().concentrations[0][0];
    let late = record_at(&result, 3600.0).contaminant.as_ref().unwrap().concentrations[0][0];
    assert!(early > 0.0);
    assert!(late < early, "decay must reduce the concentration");
}

#[test]
fn occupant_dose_in_sealed_room_matches_sum() {
    let mut net = Network::new();
    let mut room = Node::new(1, "Room", NodeKind::Normal);
    room.set_volume(50.0);
    net.add_node(room).unwrap();

    let breathing = 1.2e-4;
    let g = 1.0e-6;
    let dt = 30.0;
    let steps: usize = 120;

    let mut sim = TransientSimulation::new();
    sim.set_config(TransientConfig {
        end_time: dt * steps as f64,
        time_step: dt,
        output_interval: 600.0,
        ..Default::default()
    });
    sim.set_species(vec![Species::new(0, "tracer")]);
    sim.set_sources(vec![Source::constant(1, 0, g)]);
    sim.set_occupants(vec![Occupant::new(0, "Worker", 0, breathing)]);

    let result = sim.run(&mut net);
    assert!(result.completed);

    // Sealed room with a constant source: C_k = k·G·dt/V, so the dose is
    // ḃ·(G·dt²/V)·Σk = ḃ·G·dt²/V·N(N+1)/2.
    let vol = 50.0;
    let expected_dose =
        breathing * g * dt * dt / vol * (steps * (steps + 1)) as f64 / 2.0;

    let occ = &sim.occupants()[0];
    let rec = &occ.exposure[0];
    assert!(
        (rec.cumulative_dose - expected_dose).abs() < 1e-8,
        "{} vs {expected_dose}",
        rec.cumulative_dose
    );

    // Concentration grows monotonically, so the peak is the final value
    let c_final = steps as f64 * g * dt / vol;
    assert!((rec.peak_concentration - c_final).abs() < 1e-12);
    assert!((rec.time_at_peak - dt * steps as f64).abs() < 1e-9);
    assert!((rec.total_exposure_time - dt * steps as f64).abs() < 1e-9);
}

#[test]
fn occupant_follows_zone_schedule() {
    let mut net = Network::new();
    let mut room_a = Node::new(1, "A", NodeKind::Normal);
    room_a.set_volume(40.0);
    let mut room_b = Node::new(2, "B", NodeKind::Normal);
    room_b.set_volume(40.0);
    net.add_node(room_a).unwrap();
    net.add_node(room_b).unwrap();

    let mut move_schedule = Schedule::new(5, "occupancy");
    move_schedule.add_point(0.0, 0.0).unwrap();
    move_schedule.add_point(1799.0, 0.0).unwrap();
    move_schedule.add_point(1800.0, 1.0).unwrap();

    let mut sim = TransientSimulation::new();
    sim.set_config(TransientConfig {
        end_time: 3600.0,
        time_step: 60.0,
        output_interval: 600.0,
        ..Default::default()
    });
    sim.set_species(vec![Species::new(0, "tracer")]);
    sim.set_sources(vec![Source::constant(2, 0, 1.0e-6)]);
    sim.set_schedules(HashMap::from([(5, move_schedule)]));
    sim.set_occupants(vec![Occupant::new(0, "Walker", 0, 1.2e-4).with_schedule(5)]);

    let result = sim.run(&mut net);
    assert!(result.completed);

    let occ = &sim.occupants()[0];
    assert_eq!(occ.current_zone, 1, "schedule must move the occupant");
    // Only zone B (index 1) has a source, so all dose accrued there
    assert!(occ.exposure[0].cumulative_dose > 0.0);
}

#[test]
fn out_of_range_zone_schedule_leaves_occupant_in_place() {
    let mut net = Network::new();
    let mut room = Node::new(1, "Room", NodeKind::Normal);
    room.set_volume(40.0);
    net.add_node(room).unwrap();

    let mut bad_schedule = Schedule::new(9, "bogus");
    bad_schedule.add_point(0.0, 99.0).unwrap();

    let mut sim = TransientSimulation::new();
    sim.set_config(TransientConfig {
        end_time: 300.0,
        time_step: 60.0,
        output_interval: 60.0,
        ..Default::default()
    });
    sim.set_species(vec![Species::new(0, "tracer")]);
    sim.set_schedules(HashMap::from([(9, bad_schedule)]));
    sim.set_occupants(vec![Occupant::new(0, "Stuck", 0, 1.2e-4).with_schedule(9)]);

    let result = sim.run(&mut net);
    assert!(result.completed);
    assert_eq!(sim.occupants()[0].current_zone, 0);
}
