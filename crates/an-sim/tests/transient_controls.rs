//! Control loop wired through the driver: sensor → PI controller →
//! damper actuator.

use an_controls::{Actuator, ActuatorKind, Controller, Sensor, SensorKind};
use an_elements::{Damper, Fan};
use an_network::{Link, Network, Node, NodeKind};
use an_sim::{TransientConfig, TransientSimulation};

/// Fan pressurizes the room; a damper on the exhaust bleeds it off. The
/// controller drives the damper fraction to hold the room pressure.
fn controlled_network(initial_fraction: f64) -> Network {
    let mut net = Network::new();
    net.add_node(Node::new(0, "Ambient", NodeKind::Ambient)).unwrap();
    let mut room = Node::new(1, "Room", NodeKind::Normal);
    room.set_volume(60.0);
    net.add_node(room).unwrap();

    net.add_link(Link::new(
        0,
        0,
        1,
        0.0,
        Box::new(Fan::new(0.05, 100.0).unwrap()),
    ))
    .unwrap();
    net.add_link(Link::new(
        1,
        1,
        0,
        0.0,
        Box::new(Damper::new(0.05, 0.65, initial_fraction).unwrap()),
    ))
    .unwrap();
    net
}

fn damper_fraction(net: &Network, link_idx: usize) -> f64 {
    net.link(link_idx)
        .element()
        .as_any()
        .downcast_ref::<Damper>()
        .expect("link should still hold a damper")
        .fraction()
}

#[test]
fn pressure_controller_opens_damper_toward_setpoint() {
    let mut net = controlled_network(0.1);

    let setpoint = 5.0;
    let mut sim = TransientSimulation::new();
    sim.set_config(TransientConfig {
        end_time: 2000.0,
        time_step: 10.0,
        output_interval: 200.0,
        ..Default::default()
    });
    sim.set_sensors(vec![Sensor::new(0, "room_p", SensorKind::Pressure, 1)]);
    // Pressure above setpoint must open the damper, so the gains act in
    // reverse.
    sim.set_controllers(vec![Controller::new(0, "pi", 0, 7, setpoint, -0.01, -0.002)]);
    sim.set_actuators(vec![Actuator::new(7, "exhaust", ActuatorKind::DamperFraction, 1)]);

    let result = sim.run(&mut net);
    assert!(result.completed);

    // Without control the damper at 0.1 holds the room above 20 Pa; the
    // controller must have opened it and pulled the pressure down.
    let final_pressure = result.history.last().unwrap().airflow.pressures[1];
    let fraction = damper_fraction(&net, 1);
    assert!(fraction > 0.1, "damper should have opened, got {fraction}");
    assert!(
        (final_pressure - setpoint).abs() < 4.0,
        "pressure {final_pressure} should approach setpoint {setpoint}"
    );

    // Actuator command, controller output and element state agree
    let ctrl_out = sim.controllers()[0].output();
    let act_val = sim.actuators()[0].current_value;
    assert_eq!(ctrl_out, act_val);
    assert!((fraction - act_val).abs() < 1e-12);
}

#[test]
fn actuator_without_matching_controller_closes_damper() {
    let mut net = controlled_network(0.8);

    let mut sim = TransientSimulation::new();
    sim.set_config(TransientConfig {
        end_time: 100.0,
        time_step: 10.0,
        output_interval: 50.0,
        ..Default::default()
    });
    // Controller feeds actuator id 7; this actuator has id 8 and so
    // receives the default zero command.
    sim.set_sensors(vec![Sensor::new(0, "room_p", SensorKind::Pressure, 1)]);
    sim.set_controllers(vec![Controller::new(0, "pi", 0, 7, 5.0, -0.01, -0.002)]);
    sim.set_actuators(vec![Actuator::new(8, "orphan", ActuatorKind::DamperFraction, 1)]);

    let result = sim.run(&mut net);
    assert!(result.completed);
    assert_eq!(damper_fraction(&net, 1), 0.0);
}

#[test]
fn mass_flow_sensor_reads_link_flow() {
    let mut net = controlled_network(1.0);

    let mut sim = TransientSimulation::new();
    sim.set_config(TransientConfig {
        end_time: 60.0,
        time_step: 30.0,
        output_interval: 30.0,
        ..Default::default()
    });
    sim.set_sensors(vec![Sensor::new(0, "fan_flow", SensorKind::MassFlow, 0)]);
    // A controller must exist for the sensor refresh to run; it drives an
    // actuator on a non-damper link, which is a no-op.
    sim.set_controllers(vec![Controller::new(0, "pi", 0, 1, 0.0, 0.0, 0.0)]);
    sim.set_actuators(vec![Actuator::new(1, "noop", ActuatorKind::FanSpeed, 0)]);

    let result = sim.run(&mut net);
    assert!(result.completed);

    // The fan moves air, so the sensor must have seen a positive flow.
    let last_flow = result.history.last().unwrap().airflow.mass_flows[0];
    assert!(last_flow > 0.0);
    assert!(sim.sensors()[0].last_reading > 0.0);
}
