//! Multi-zone scenario exercising every element type with two species.

use an_core::constants::{P_ATM, R_AIR};
use an_elements::{Damper, Duct, Fan, Filter, PowerLawOrifice, TwoWayFlow};
use an_network::{Link, Network, Node, NodeKind};
use an_sim::{TransientConfig, TransientSimulation};
use an_transport::{Source, Species};

/// Ambient + two offices + corridor, connected through a supply fan,
/// ducts, doors, a damper, a crack and a filtered intake.
fn multizone_network() -> Network {
    let mut net = Network::new();

    let mut ambient = Node::new(0, "Ambient", NodeKind::Ambient);
    ambient.set_temperature(283.15);
    net.add_node(ambient).unwrap();

    for (id, name, vol) in [(1, "OfficeA", 45.0), (2, "OfficeB", 55.0), (3, "Corridor", 30.0)] {
        let mut room = Node::new(id, name, NodeKind::Normal);
        room.set_temperature(293.15);
        room.set_volume(vol);
        net.add_node(room).unwrap();
    }

    net.add_link(Link::new(0, 0, 1, 2.5, Box::new(Fan::new(0.08, 150.0).unwrap())))
        .unwrap();
    net.add_link(Link::new(
        1,
        1,
        2,
        2.5,
        Box::new(Duct::new(4.0, 0.2, 0.0001, 1.0).unwrap()),
    ))
    .unwrap();
    net.add_link(Link::new(
        2,
        3,
        0,
        3.0,
        Box::new(Duct::new(5.0, 0.15, 0.0001, 2.0).unwrap()),
    ))
    .unwrap();
    net.add_link(Link::new(
        3,
        1,
        3,
        1.0,
        Box::new(TwoWayFlow::new(0.78, 1.6).unwrap()),
    ))
    .unwrap();
    net.add_link(Link::new(
        4,
        2,
        3,
        1.0,
        Box::new(TwoWayFlow::new(0.78, 1.6).unwrap()),
    ))
    .unwrap();
    net.add_link(Link::new(
        5,
        3,
        0,
        1.5,
        Box::new(Damper::new(0.01, 0.6, 0.5).unwrap()),
    ))
    .unwrap();
    net.add_link(Link::new(
        6,
        2,
        0,
        1.5,
        Box::new(PowerLawOrifice::new(0.0008, 0.65).unwrap()),
    ))
    .unwrap();
    net.add_link(Link::new(
        7,
        0,
        1,
        1.5,
        Box::new(Filter::new(0.002, 0.65, 0.9).unwrap()),
    ))
    .unwrap();

    net
}

fn species_set() -> Vec<Species> {
    vec![
        Species::new(0, "CO2").with_molar_mass(0.044),
        Species::new(1, "PM2.5")
            .with_molar_mass(0.1)
            .with_decay_rate(1.0e-4)
            .with_outdoor_conc(2.0e-5),
    ]
}

#[test]
fn multizone_two_species_run() {
    let mut net = multizone_network();
    let mut sim = TransientSimulation::new();
    sim.set_config(TransientConfig {
        start_time: 0.0,
        end_time: 7200.0,
        time_step: 30.0,
        output_interval: 120.0,
        ..Default::default()
    });
    sim.set_species(species_set());
    sim.set_sources(vec![
        Source::constant(1, 0, 6.0e-6),
        Source::constant(2, 0, 8.0e-6),
    ]);

    let result = sim.run(&mut net);
    assert!(result.completed);
    assert_eq!(result.history.len(), 61);

    for record in &result.history {
        assert!(record.airflow.converged, "step at t={} diverged", record.time);

        // Mass conservation at every interior node, every step
        let mut acc = vec![0.0; net.node_count()];
        for (i, link) in net.links().iter().enumerate() {
            acc[link.from_node()] -= record.airflow.mass_flows[i];
            acc[link.to_node()] += record.airflow.mass_flows[i];
        }
        for (i, net_flow) in acc.iter().enumerate() {
            if !net.node(i).is_known_pressure() {
                assert!(
                    net_flow.abs() < 1e-6,
                    "imbalance {net_flow} at node {i}, t={}",
                    record.time
                );
            }
        }

        // Ambient concentrations pinned to outdoor backgrounds
        let conc = &record.contaminant.as_ref().unwrap().concentrations;
        assert_eq!(conc[0][0], 0.0);
        assert_eq!(conc[0][1], 2.0e-5);
    }

    let last = result.history.last().unwrap();
    let conc = &last.contaminant.as_ref().unwrap().concentrations;

    // CO2 builds up everywhere indoors
    for zone in 1..4 {
        assert!(conc[zone][0] > 1.0e-5, "zone {zone} CO2 = {}", conc[zone][0]);
    }
    // Office B holds the stronger source and no supply dilution
    assert!(conc[2][0] > conc[3][0]);

    // PM2.5 enters only from outdoors and is filtered on the intake path
    // and decays, so indoor levels sit below the outdoor background.
    for zone in 1..4 {
        assert!(conc[zone][1] < 2.0e-5);
        assert!(conc[zone][1] >= 0.0);
    }
}

#[test]
fn non_trace_species_feeds_back_into_density() {
    let mut net = Network::new();
    net.add_node(Node::new(0, "Ambient", NodeKind::Ambient)).unwrap();
    let mut room = Node::new(1, "Room", NodeKind::Normal);
    room.set_volume(20.0);
    net.add_node(room).unwrap();

    net.add_link(Link::new(
        0,
        0,
        1,
        0.5,
        Box::new(PowerLawOrifice::new(0.0005, 0.65).unwrap()),
    ))
    .unwrap();
    net.add_link(Link::new(
        1,
        1,
        0,
        1.5,
        Box::new(PowerLawOrifice::new(0.0005, 0.65).unwrap()),
    ))
    .unwrap();

    let mut sim = TransientSimulation::new();
    sim.set_config(TransientConfig {
        end_time: 1800.0,
        time_step: 30.0,
        output_interval: 300.0,
        ..Default::default()
    });
    // Heavy, non-trace gas released hard into a small room
    sim.set_species(vec![Species::new(0, "SF6").with_molar_mass(0.146).non_trace()]);
    sim.set_sources(vec![Source::constant(1, 0, 5.0e-5)]);

    let result = sim.run(&mut net);
    assert!(result.completed);

    // A heavier-than-air mixture lowers R_mix and raises the density
    // above the pure-air value at the same pressure and temperature.
    let room = net.node(1);
    let pure_air = (P_ATM + room.pressure()) / (R_AIR * room.temperature());
    assert!(
        room.density() > pure_air,
        "density {} should exceed pure air {}",
        room.density(),
        pure_air
    );
}
