//! Build a runnable model from the parsed input schema.

use std::collections::HashMap;
use std::path::Path;

use an_elements::{Damper, Duct, Fan, Filter, FlowElement, PowerLawOrifice, TwoWayFlow};
use an_network::{Link, Network, Node, NodeKind};
use an_sim::{Occupant, TransientConfig};
use an_solver::SolverMethod;
use an_transport::{Schedule, Source, Species};

use crate::error::{ProjectError, ProjectResult};
use crate::schema::{
    AirflowMethodSpec, ElementRef, ElementSpec, NodeKindSpec, ProjectInput, SourceSpec,
};

/// Everything the CLI needs to run: the network plus the transient model
/// data around it.
pub struct ModelInput {
    pub network: Network,
    pub species: Vec<Species>,
    pub sources: Vec<Source>,
    pub schedules: HashMap<i32, Schedule>,
    pub occupants: Vec<Occupant>,
    pub transient: TransientConfig,
    /// True when the input carries an explicit transient block.
    pub has_transient: bool,
}

impl ModelInput {
    /// Transient mode engages when the input has species or an explicit
    /// transient block.
    pub fn wants_transient(&self) -> bool {
        self.has_transient || !self.species.is_empty()
    }
}

/// Load and build a model from a JSON file.
pub fn load_model(path: &Path) -> ProjectResult<ModelInput> {
    let text = std::fs::read_to_string(path)?;
    model_from_str(&text)
}

/// Build a model from JSON text.
pub fn model_from_str(text: &str) -> ProjectResult<ModelInput> {
    let input: ProjectInput = serde_json::from_str(text)?;
    build_model(&input)
}

fn build_model(input: &ProjectInput) -> ProjectResult<ModelInput> {
    let mut network = Network::new();

    if let Some(amb) = &input.ambient {
        if let Some(t) = amb.temperature {
            network.set_ambient_temperature(t);
        }
        if let Some(p) = amb.pressure {
            network.set_ambient_pressure(p);
        }
        if let Some(v) = amb.wind_speed {
            network.set_wind_speed(v);
        }
        if let Some(d) = amb.wind_direction {
            network.set_wind_direction(d);
        }
    }

    for spec in &input.nodes {
        let name = spec
            .name
            .clone()
            .unwrap_or_else(|| format!("Node_{}", spec.id));
        let kind = match spec.kind {
            NodeKindSpec::Normal => NodeKind::Normal,
            NodeKindSpec::Phantom => NodeKind::Phantom,
            NodeKindSpec::Ambient => NodeKind::Ambient,
            NodeKindSpec::Cfd => NodeKind::Cfd,
        };

        let mut node = Node::new(spec.id, name, kind);
        match spec.temperature {
            Some(t) => node.set_temperature(t),
            // Ambient nodes default to the outdoor temperature
            None if kind == NodeKind::Ambient => {
                node.set_temperature(network.ambient_temperature());
            }
            None => {}
        }
        if let Some(z) = spec.elevation {
            node.set_elevation(z);
        }
        if let Some(v) = spec.volume {
            node.set_volume(v);
        }
        if let Some(p) = spec.pressure {
            node.set_pressure(p);
        }
        node.update_density();
        network.add_node(node)?;
    }

    for spec in &input.links {
        let from = network.index_of(spec.from)?;
        let to = network.index_of(spec.to)?;
        let element = resolve_element(input, &spec.element)?;
        network.add_link(Link::new(spec.id, from, to, spec.elevation, element))?;
    }

    // Wind pressure folds into the ambient boundary once, at load time
    network.apply_wind_pressure();

    let species: Vec<Species> = input
        .species
        .iter()
        .map(|spec| {
            let mut sp = Species::new(
                spec.id,
                spec.name
                    .clone()
                    .unwrap_or_else(|| format!("Species_{}", spec.id)),
            );
            if let Some(m) = spec.molar_mass {
                sp.molar_mass = m;
            }
            if let Some(d) = spec.decay_rate {
                sp.decay_rate = d;
            }
            if let Some(c) = spec.outdoor_concentration {
                sp.outdoor_conc = c;
            }
            if let Some(trace) = spec.trace {
                sp.is_trace = trace;
            }
            sp
        })
        .collect();

    let sources = input
        .sources
        .iter()
        .map(build_source)
        .collect::<ProjectResult<Vec<_>>>()?;

    let mut schedules = HashMap::new();
    for spec in &input.schedules {
        let mut sch = Schedule::new(
            spec.id,
            spec.name
                .clone()
                .unwrap_or_else(|| format!("Schedule_{}", spec.id)),
        );
        for point in &spec.points {
            sch.add_point(point.time, point.value)?;
        }
        schedules.insert(spec.id, sch);
    }

    let mut occupants = Vec::new();
    for spec in &input.occupants {
        let zone = network.index_of(spec.zone)?;
        let mut occ = Occupant::new(
            spec.id,
            spec.name
                .clone()
                .unwrap_or_else(|| format!("Occupant_{}", spec.id)),
            zone,
            spec.breathing_rate
                .unwrap_or(an_sim::occupant::DEFAULT_BREATHING_RATE),
        );
        if let Some(sid) = spec.schedule_id {
            occ.schedule_id = sid;
        }
        occupants.push(occ);
    }

    let mut transient = TransientConfig::default();
    let has_transient = input.transient.is_some();
    if let Some(spec) = &input.transient {
        transient.start_time = spec.start_time;
        if let Some(v) = spec.end_time {
            transient.end_time = v;
        }
        if let Some(v) = spec.time_step {
            transient.time_step = v;
        }
        if let Some(v) = spec.output_interval {
            transient.output_interval = v;
        }
        transient.airflow_method = match spec.airflow_method {
            Some(AirflowMethodSpec::SubRelaxation) => SolverMethod::SubRelaxation,
            _ => SolverMethod::TrustRegion,
        };
    }

    Ok(ModelInput {
        network,
        species,
        sources,
        schedules,
        occupants,
        transient,
        has_transient,
    })
}

fn resolve_element(
    input: &ProjectInput,
    element: &ElementRef,
) -> ProjectResult<Box<dyn FlowElement>> {
    match element {
        ElementRef::Named(name) => match input.flow_elements.get(name) {
            Some(spec) => build_element(spec),
            None => Err(ProjectError::UnknownReference {
                what: format!("flow element template '{name}'"),
            }),
        },
        ElementRef::Inline(spec) => build_element(spec),
    }
}

fn build_element(spec: &ElementSpec) -> ProjectResult<Box<dyn FlowElement>> {
    let element: Box<dyn FlowElement> = match spec {
        ElementSpec::PowerLawOrifice {
            c,
            n,
            leakage_area,
            reference_pressure,
        } => match (c, leakage_area) {
            (Some(c), _) => Box::new(PowerLawOrifice::new(*c, *n)?),
            (None, Some(ela)) => {
                Box::new(PowerLawOrifice::from_leakage_area(*ela, *n, *reference_pressure)?)
            }
            (None, None) => {
                return Err(ProjectError::UnknownReference {
                    what: "PowerLawOrifice needs either C or leakageArea".into(),
                })
            }
        },
        ElementSpec::Fan {
            max_flow,
            shutoff_pressure,
        } => Box::new(Fan::new(*max_flow, *shutoff_pressure)?),
        ElementSpec::TwoWayFlow {
            cd,
            area,
            height,
            width,
        } => match (height, width) {
            (Some(h), Some(w)) => Box::new(TwoWayFlow::with_geometry(*cd, *area, *h, *w)?),
            _ => Box::new(TwoWayFlow::new(*cd, *area)?),
        },
        ElementSpec::Duct {
            length,
            diameter,
            roughness,
            sum_k,
        } => Box::new(Duct::new(*length, *diameter, *roughness, *sum_k)?),
        ElementSpec::Damper { c_max, n, fraction } => {
            Box::new(Damper::new(*c_max, *n, *fraction)?)
        }
        ElementSpec::Filter { c, n, efficiency } => Box::new(Filter::new(*c, *n, *efficiency)?),
    };
    Ok(element)
}

fn build_source(spec: &SourceSpec) -> ProjectResult<Source> {
    let kind = spec.kind.as_deref().unwrap_or("constant");
    let mut source = match kind {
        "constant" => Source::constant(spec.zone_id, spec.species_id, spec.generation_rate),
        "exponentialDecay" => Source::exponential_decay(
            spec.zone_id,
            spec.species_id,
            spec.generation_rate,
            spec.decay_time_constant.unwrap_or(3600.0),
            spec.start_time.unwrap_or(0.0),
            spec.multiplier.unwrap_or(1.0),
        ),
        "pressureDriven" => Source::pressure_driven(
            spec.zone_id,
            spec.species_id,
            spec.pressure_coeff.unwrap_or(0.0),
        ),
        "cutoffConcentration" => Source::cutoff(
            spec.zone_id,
            spec.species_id,
            spec.generation_rate,
            spec.cutoff_concentration.unwrap_or(0.0),
        ),
        other => {
            return Err(ProjectError::UnknownReference {
                what: format!("source type '{other}'"),
            })
        }
    };
    source.removal_rate = spec.removal_rate;
    if let Some(sid) = spec.schedule_id {
        source.schedule_id = sid;
    }
    Ok(source)
}
