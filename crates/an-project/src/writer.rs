//! Result writers for steady and transient runs.

use std::path::Path;

use serde::Serialize;

use an_network::Network;
use an_sim::TransientResult;
use an_solver::AirflowSolution;
use an_transport::Species;

use crate::error::ProjectResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverBlock {
    pub converged: bool,
    pub iterations: usize,
    pub max_residual: f64,
}

#[derive(Debug, Serialize)]
pub struct NodeOutput {
    pub id: i32,
    pub name: String,
    pub pressure: f64,
    pub density: f64,
    pub temperature: f64,
    pub elevation: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOutput {
    pub id: i32,
    /// Node ids, not indices.
    pub from: i32,
    pub to: i32,
    pub mass_flow: f64,
    #[serde(rename = "volumeFlow_m3s")]
    pub volume_flow_m3s: f64,
}

/// Steady-state output document.
#[derive(Debug, Serialize)]
pub struct SteadyOutput {
    pub solver: SolverBlock,
    pub nodes: Vec<NodeOutput>,
    pub links: Vec<LinkOutput>,
}

/// Assemble the steady output document.
pub fn steady_output(network: &Network, result: &AirflowSolution) -> SteadyOutput {
    let nodes = network
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| NodeOutput {
            id: node.id(),
            name: node.name().to_string(),
            pressure: result.pressures[i],
            density: node.density(),
            temperature: node.temperature(),
            elevation: node.elevation(),
        })
        .collect();

    let links = network
        .links()
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let upstream_density = network.node(link.from_node()).density();
            LinkOutput {
                id: link.id(),
                from: network.node(link.from_node()).id(),
                to: network.node(link.to_node()).id(),
                mass_flow: result.mass_flows[i],
                volume_flow_m3s: if upstream_density > 0.0 {
                    result.mass_flows[i] / upstream_density
                } else {
                    0.0
                },
            }
        })
        .collect();

    SteadyOutput {
        solver: SolverBlock {
            converged: result.converged,
            iterations: result.iterations,
            max_residual: result.max_residual,
        },
        nodes,
        links,
    }
}

/// Write the steady output document to a file.
pub fn write_steady(
    path: &Path,
    network: &Network,
    result: &AirflowSolution,
) -> ProjectResult<()> {
    let output = steady_output(network, result);
    std::fs::write(path, serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesInfo {
    pub id: i32,
    pub name: String,
    pub molar_mass: f64,
}

#[derive(Debug, Serialize)]
pub struct NodeInfo {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirflowStep {
    pub converged: bool,
    pub iterations: usize,
    pub pressures: Vec<f64>,
    pub mass_flows: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct TimeStepOutput {
    pub time: f64,
    pub airflow: AirflowStep,
    /// kg/m³, indexed [node][species]; omitted for dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concentrations: Option<Vec<Vec<f64>>>,
}

/// Transient output document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransientOutput {
    pub completed: bool,
    pub total_steps: usize,
    pub species: Vec<SpeciesInfo>,
    pub nodes: Vec<NodeInfo>,
    pub time_series: Vec<TimeStepOutput>,
}

/// Assemble the transient output document.
pub fn transient_output(
    network: &Network,
    result: &TransientResult,
    species: &[Species],
) -> TransientOutput {
    let species_info = species
        .iter()
        .map(|sp| SpeciesInfo {
            id: sp.id,
            name: sp.name.clone(),
            molar_mass: sp.molar_mass,
        })
        .collect();

    let nodes = network
        .nodes()
        .iter()
        .map(|node| NodeInfo {
            id: node.id(),
            name: node.name().to_string(),
            kind: if node.is_known_pressure() {
                "ambient"
            } else {
                "normal"
            },
        })
        .collect();

    let time_series = result
        .history
        .iter()
        .map(|record| TimeStepOutput {
            time: record.time,
            airflow: AirflowStep {
                converged: record.airflow.converged,
                iterations: record.airflow.iterations,
                pressures: record.airflow.pressures.clone(),
                mass_flows: record.airflow.mass_flows.clone(),
            },
            concentrations: record
                .contaminant
                .as_ref()
                .map(|c| c.concentrations.clone()),
        })
        .collect();

    TransientOutput {
        completed: result.completed,
        total_steps: result.history.len(),
        species: species_info,
        nodes,
        time_series,
    }
}

/// Write the transient output document to a file.
pub fn write_transient(
    path: &Path,
    network: &Network,
    result: &TransientResult,
    species: &[Species],
) -> ProjectResult<()> {
    let output = transient_output(network, result, species);
    std::fs::write(path, serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
