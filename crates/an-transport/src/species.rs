//! Chemical species table.

use an_core::constants::M_AIR;

/// One transported species.
///
/// Trace species ride along with the airflow without feeding back into
/// the mixture density; non-trace species trigger the density feedback
/// re-solve in the transient driver.
#[derive(Debug, Clone)]
pub struct Species {
    pub id: i32,
    pub name: String,
    /// Molar mass (kg/mol); CO₂ = 0.044.
    pub molar_mass: f64,
    /// First-order decay constant (1/s), 0 = no decay.
    pub decay_rate: f64,
    /// Outdoor background concentration (kg/m³).
    pub outdoor_conc: f64,
    pub is_trace: bool,
}

impl Species {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            molar_mass: M_AIR,
            decay_rate: 0.0,
            outdoor_conc: 0.0,
            is_trace: true,
        }
    }

    pub fn with_molar_mass(mut self, m: f64) -> Self {
        self.molar_mass = m;
        self
    }

    pub fn with_decay_rate(mut self, lambda: f64) -> Self {
        self.decay_rate = lambda;
        self
    }

    pub fn with_outdoor_conc(mut self, c: f64) -> Self {
        self.outdoor_conc = c;
        self
    }

    pub fn non_trace(mut self) -> Self {
        self.is_trace = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_air() {
        let sp = Species::new(0, "CO2");
        assert_eq!(sp.molar_mass, 0.029);
        assert_eq!(sp.decay_rate, 0.0);
        assert!(sp.is_trace);
    }

    #[test]
    fn builder_chain() {
        let sp = Species::new(1, "CO2")
            .with_molar_mass(0.044)
            .with_decay_rate(1e-4)
            .with_outdoor_conc(7e-4)
            .non_trace();
        assert_eq!(sp.molar_mass, 0.044);
        assert_eq!(sp.decay_rate, 1e-4);
        assert_eq!(sp.outdoor_conc, 7e-4);
        assert!(!sp.is_trace);
    }
}
