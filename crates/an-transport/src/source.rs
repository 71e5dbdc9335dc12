//! Species source and sink models.

/// How a source's generation rate behaves over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// G·schedule(t), with optional first-order removal R·C.
    Constant,
    /// m·G₀·exp(−(t−t₀)/τ) once activated (spill, spray).
    ExponentialDecay,
    /// G = pressure_coeff·|P_zone| (crack outgassing, soil gas entry).
    PressureDriven,
    /// G while the zone concentration is below a threshold, 0 above it.
    CutoffConcentration,
}

/// A source/sink of one species in one zone.
#[derive(Debug, Clone)]
pub struct Source {
    pub zone_id: i32,
    pub species_id: i32,
    pub kind: SourceKind,
    /// Base generation rate G₀ (kg/s).
    pub generation_rate: f64,
    /// First-order removal rate coefficient (1/s), acts as a sink.
    pub removal_rate: f64,
    /// Modulating schedule id, −1 = always on.
    pub schedule_id: i32,

    // ExponentialDecay
    pub decay_time_constant: f64,
    pub start_time: f64,
    pub multiplier: f64,

    // PressureDriven
    pub pressure_coeff: f64,

    // CutoffConcentration
    pub cutoff_conc: f64,
}

impl Source {
    /// Constant-rate source.
    pub fn constant(zone_id: i32, species_id: i32, generation_rate: f64) -> Self {
        Self {
            zone_id,
            species_id,
            kind: SourceKind::Constant,
            generation_rate,
            removal_rate: 0.0,
            schedule_id: -1,
            decay_time_constant: 3600.0,
            start_time: 0.0,
            multiplier: 1.0,
            pressure_coeff: 0.0,
            cutoff_conc: 0.0,
        }
    }

    /// Exponentially decaying release starting at `start_time`.
    pub fn exponential_decay(
        zone_id: i32,
        species_id: i32,
        g0: f64,
        tau: f64,
        start_time: f64,
        multiplier: f64,
    ) -> Self {
        let mut s = Self::constant(zone_id, species_id, g0);
        s.kind = SourceKind::ExponentialDecay;
        s.decay_time_constant = tau;
        s.start_time = start_time;
        s.multiplier = multiplier;
        s
    }

    /// Source proportional to the magnitude of the zone gauge pressure.
    pub fn pressure_driven(zone_id: i32, species_id: i32, pressure_coeff: f64) -> Self {
        let mut s = Self::constant(zone_id, species_id, 0.0);
        s.kind = SourceKind::PressureDriven;
        s.pressure_coeff = pressure_coeff;
        s
    }

    /// Source that shuts off once the zone concentration reaches the
    /// threshold.
    pub fn cutoff(zone_id: i32, species_id: i32, generation_rate: f64, cutoff_conc: f64) -> Self {
        let mut s = Self::constant(zone_id, species_id, generation_rate);
        s.kind = SourceKind::CutoffConcentration;
        s.cutoff_conc = cutoff_conc;
        s
    }

    pub fn with_removal(mut self, rate: f64) -> Self {
        self.removal_rate = rate;
        self
    }

    pub fn with_schedule(mut self, schedule_id: i32) -> Self {
        self.schedule_id = schedule_id;
        self
    }
}
