//! Occupant dose and peak-concentration tracking.

/// Breathing rate of a seated adult (m³/s), ≈ 7.2 L/min.
pub const DEFAULT_BREATHING_RATE: f64 = 1.2e-4;

/// Per-species exposure bookkeeping for one occupant.
#[derive(Debug, Clone, Copy)]
pub struct ExposureRecord {
    pub species_idx: usize,
    /// Total inhaled mass (kg).
    pub cumulative_dose: f64,
    /// Maximum concentration encountered (kg/m³).
    pub peak_concentration: f64,
    /// When the peak first occurred (s).
    pub time_at_peak: f64,
    /// Total time spent in nonzero concentration (s).
    pub total_exposure_time: f64,
}

/// A person moving between zones with a breathing rate.
#[derive(Debug, Clone)]
pub struct Occupant {
    pub id: i32,
    pub name: String,
    /// Zone (node index) the occupant is currently in.
    pub current_zone: usize,
    /// Inhalation rate (m³/s).
    pub breathing_rate: f64,
    /// Zone schedule id; the schedule value rounds to a zone index.
    /// −1 keeps the occupant in `current_zone`.
    pub schedule_id: i32,

    pub exposure: Vec<ExposureRecord>,
}

impl Occupant {
    pub fn new(id: i32, name: impl Into<String>, zone: usize, breathing_rate: f64) -> Self {
        Self {
            id,
            name: name.into(),
            current_zone: zone,
            breathing_rate,
            schedule_id: -1,
            exposure: Vec::new(),
        }
    }

    pub fn with_schedule(mut self, schedule_id: i32) -> Self {
        self.schedule_id = schedule_id;
        self
    }

    /// (Re)create one exposure record per species.
    pub fn init_exposure(&mut self, num_species: usize) {
        self.exposure = (0..num_species)
            .map(|i| ExposureRecord {
                species_idx: i,
                cumulative_dose: 0.0,
                peak_concentration: 0.0,
                time_at_peak: 0.0,
                total_exposure_time: 0.0,
            })
            .collect();
    }

    /// Accumulate exposure over one step ending at time t, given the
    /// concentrations in the occupant's zone.
    pub fn update_exposure(&mut self, zone_concentrations: &[f64], t: f64, dt: f64) {
        for rec in &mut self.exposure {
            let Some(&conc) = zone_concentrations.get(rec.species_idx) else {
                continue;
            };

            rec.cumulative_dose += self.breathing_rate * conc * dt;

            if conc > rec.peak_concentration {
                rec.peak_concentration = conc;
                rec.time_at_peak = t;
            }

            if conc > 1e-15 {
                rec.total_exposure_time += dt;
            }
        }
    }
}
