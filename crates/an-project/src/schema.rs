//! serde schema for the project input file.

use std::collections::HashMap;

use serde::Deserialize;

/// Top-level input object.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectInput {
    #[serde(default)]
    pub ambient: Option<AmbientSpec>,
    /// Named element templates that links reference by name.
    #[serde(default)]
    pub flow_elements: HashMap<String, ElementSpec>,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub species: Vec<SpeciesSpec>,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    #[serde(default)]
    pub schedules: Vec<ScheduleSpec>,
    #[serde(default)]
    pub occupants: Vec<OccupantSpec>,
    #[serde(default)]
    pub transient: Option<TransientSpec>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AmbientSpec {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKindSpec {
    #[default]
    Normal,
    Phantom,
    Ambient,
    Cfd,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NodeSpec {
    pub id: i32,
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: NodeKindSpec,
    pub temperature: Option<f64>,
    pub elevation: Option<f64>,
    pub volume: Option<f64>,
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LinkSpec {
    pub id: i32,
    /// Node ids, resolved to indices at build time.
    pub from: i32,
    pub to: i32,
    #[serde(default)]
    pub elevation: f64,
    pub element: ElementRef,
}

/// Either the name of a template or an inline definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ElementRef {
    Named(String),
    Inline(ElementSpec),
}

fn default_roughness() -> f64 {
    0.0001
}

fn default_fraction() -> f64 {
    1.0
}

fn default_efficiency() -> f64 {
    0.9
}

fn default_leakage_ref_pressure() -> f64 {
    4.0
}

/// Flow element shapes, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ElementSpec {
    /// Either `C` directly or a `leakageArea` measured at
    /// `referencePressure`.
    #[serde(rename_all = "camelCase")]
    PowerLawOrifice {
        #[serde(rename = "C")]
        c: Option<f64>,
        n: f64,
        leakage_area: Option<f64>,
        #[serde(default = "default_leakage_ref_pressure")]
        reference_pressure: f64,
    },
    #[serde(rename_all = "camelCase")]
    Fan {
        max_flow: f64,
        shutoff_pressure: f64,
    },
    #[serde(rename_all = "camelCase")]
    TwoWayFlow {
        #[serde(rename = "Cd")]
        cd: f64,
        area: f64,
        height: Option<f64>,
        width: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Duct {
        length: f64,
        diameter: f64,
        #[serde(default = "default_roughness")]
        roughness: f64,
        #[serde(rename = "sumK", default)]
        sum_k: f64,
    },
    #[serde(rename_all = "camelCase")]
    Damper {
        #[serde(rename = "Cmax")]
        c_max: f64,
        n: f64,
        #[serde(default = "default_fraction")]
        fraction: f64,
    },
    #[serde(rename_all = "camelCase")]
    Filter {
        #[serde(rename = "C")]
        c: f64,
        n: f64,
        #[serde(default = "default_efficiency")]
        efficiency: f64,
    },
}

impl ElementSpec {
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementSpec::PowerLawOrifice { .. } => "PowerLawOrifice",
            ElementSpec::Fan { .. } => "Fan",
            ElementSpec::TwoWayFlow { .. } => "TwoWayFlow",
            ElementSpec::Duct { .. } => "Duct",
            ElementSpec::Damper { .. } => "Damper",
            ElementSpec::Filter { .. } => "Filter",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpeciesSpec {
    pub id: i32,
    pub name: Option<String>,
    pub molar_mass: Option<f64>,
    pub decay_rate: Option<f64>,
    pub outdoor_concentration: Option<f64>,
    pub trace: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourceSpec {
    pub zone_id: i32,
    pub species_id: i32,
    /// constant | exponentialDecay | pressureDriven | cutoffConcentration
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub generation_rate: f64,
    #[serde(default)]
    pub removal_rate: f64,
    pub schedule_id: Option<i32>,
    pub decay_time_constant: Option<f64>,
    pub start_time: Option<f64>,
    pub multiplier: Option<f64>,
    pub pressure_coeff: Option<f64>,
    pub cutoff_concentration: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScheduleSpec {
    pub id: i32,
    pub name: Option<String>,
    #[serde(default)]
    pub points: Vec<SchedulePointSpec>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulePointSpec {
    pub time: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OccupantSpec {
    pub id: i32,
    pub name: Option<String>,
    /// Node id of the starting zone.
    pub zone: i32,
    pub breathing_rate: Option<f64>,
    pub schedule_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransientSpec {
    #[serde(default)]
    pub start_time: f64,
    pub end_time: Option<f64>,
    pub time_step: Option<f64>,
    pub output_interval: Option<f64>,
    pub airflow_method: Option<AirflowMethodSpec>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AirflowMethodSpec {
    TrustRegion,
    SubRelaxation,
}
