//! Sensors reading network and contaminant state.

/// What a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Species concentration in a zone (target = node index,
    /// species_idx selects the species).
    Concentration,
    /// Zone gauge pressure (target = node index).
    Pressure,
    /// Zone temperature (target = node index).
    Temperature,
    /// Link mass flow (target = link index).
    MassFlow,
}

/// One sensor. The driver refreshes `last_reading` at the start of every
/// control step, before controllers run.
#[derive(Debug, Clone)]
pub struct Sensor {
    pub id: i32,
    pub name: String,
    pub kind: SensorKind,
    pub target_id: usize,
    pub species_idx: usize,
    pub last_reading: f64,
}

impl Sensor {
    pub fn new(id: i32, name: impl Into<String>, kind: SensorKind, target_id: usize) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            target_id,
            species_idx: 0,
            last_reading: 0.0,
        }
    }

    pub fn with_species(mut self, species_idx: usize) -> Self {
        self.species_idx = species_idx;
        self
    }
}
