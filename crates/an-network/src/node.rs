//! Zone node: a control volume with pressure, temperature, elevation and
//! ideal-gas density.

use an_core::constants::{P_ATM, R_AIR, T_REF};

/// Zone classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Standard room node.
    Normal,
    /// Connection node without volume.
    Phantom,
    /// Outdoor environment; pressure is a prescribed boundary condition.
    Ambient,
    /// Zone coupled to an external field solver.
    Cfd,
}

/// A zone in the airflow network.
///
/// Pressure is gauge (relative to atmospheric); density follows the ideal
/// gas law ρ = P_abs/(R_air·T) and is refreshed by the solver each
/// iteration.
#[derive(Debug, Clone)]
pub struct Node {
    id: i32,
    name: String,
    kind: NodeKind,

    pressure: f64,
    temperature: f64,
    elevation: f64,
    volume: f64,
    density: f64,
    /// Specific gas constant of the zone mixture; pure air until the
    /// density feedback installs an R_mix.
    gas_constant: f64,

    // Wind pressure data, only meaningful on Ambient nodes.
    wall_azimuth: f64,
    terrain_factor: f64,
    wind_pressure_coeff: f64,
    cp_profile: Vec<(f64, f64)>,
}

impl Node {
    pub fn new(id: i32, name: impl Into<String>, kind: NodeKind) -> Self {
        let mut node = Self {
            id,
            name: name.into(),
            kind,
            pressure: 0.0,
            temperature: T_REF,
            elevation: 0.0,
            volume: 0.0,
            density: 0.0,
            gas_constant: R_AIR,
            wall_azimuth: 0.0,
            terrain_factor: 1.0,
            wind_pressure_coeff: 0.0,
            cp_profile: Vec::new(),
        };
        node.update_density();
        node
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Ambient nodes have prescribed pressure that the solver never
    /// updates.
    pub fn is_known_pressure(&self) -> bool {
        self.kind == NodeKind::Ambient
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn set_pressure(&mut self, p: f64) {
        self.pressure = p;
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_temperature(&mut self, t: f64) {
        self.temperature = t;
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn set_elevation(&mut self, z: f64) {
        self.elevation = z;
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn set_volume(&mut self, v: f64) {
        self.volume = v;
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Refresh density from the node's own gauge pressure.
    pub fn update_density(&mut self) {
        self.update_density_at(P_ATM + self.pressure);
    }

    /// Refresh density from an explicit absolute pressure, using the
    /// zone's current (possibly mixture-corrected) gas constant.
    pub fn update_density_at(&mut self, absolute_pressure: f64) {
        if self.temperature > 0.0 {
            self.density = absolute_pressure / (self.gas_constant * self.temperature);
        }
    }

    pub fn gas_constant(&self) -> f64 {
        self.gas_constant
    }

    /// Install a mixture gas constant R_mix; later density refreshes use
    /// it in place of pure air.
    pub fn set_gas_constant(&mut self, r_mix: f64) {
        if r_mix > 0.0 {
            self.gas_constant = r_mix;
        }
    }

    // ── Wind pressure ───────────────────────────────────────────────

    pub fn set_wall_azimuth(&mut self, deg: f64) {
        self.wall_azimuth = deg;
    }

    pub fn set_terrain_factor(&mut self, kt: f64) {
        self.terrain_factor = kt;
    }

    pub fn set_wind_pressure_coeff(&mut self, cp: f64) {
        self.wind_pressure_coeff = cp;
    }

    /// Piecewise-linear Cp(θ) profile; θ in degrees relative to the wall
    /// azimuth, points sorted by angle.
    pub fn set_wind_pressure_profile(&mut self, profile: Vec<(f64, f64)>) {
        self.cp_profile = profile;
    }

    pub fn has_wind_data(&self) -> bool {
        self.wind_pressure_coeff != 0.0 || !self.cp_profile.is_empty()
    }

    /// Interpolate the pressure coefficient for a wind direction (degrees
    /// from north). Falls back to the fixed coefficient when no profile
    /// is set.
    pub fn cp_at_wind_direction(&self, wind_direction: f64) -> f64 {
        if self.cp_profile.is_empty() {
            return self.wind_pressure_coeff;
        }

        let theta = (wind_direction - self.wall_azimuth).rem_euclid(360.0);

        let first = self.cp_profile[0];
        let last = self.cp_profile[self.cp_profile.len() - 1];
        if theta <= first.0 {
            return first.1;
        }
        if theta >= last.0 {
            return last.1;
        }

        for pair in self.cp_profile.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if theta >= a.0 && theta <= b.0 {
                let t = (theta - a.0) / (b.0 - a.0);
                return a.1 + t * (b.1 - a.1);
            }
        }
        last.1
    }

    /// Wind pressure p_w = ½·ρ·K_t·Cp·v² at the given wind speed and
    /// direction.
    pub fn wind_pressure(&self, wind_speed: f64, wind_direction: f64) -> f64 {
        let cp = self.cp_at_wind_direction(wind_direction);
        0.5 * self.density * self.terrain_factor * cp * wind_speed * wind_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_follows_ideal_gas() {
        let mut node = Node::new(1, "Room", NodeKind::Normal);
        node.set_temperature(293.15);
        node.update_density();
        let expected = P_ATM / (R_AIR * 293.15);
        assert!((node.density() - expected).abs() < 1e-12);
    }

    #[test]
    fn pressure_raises_density() {
        let mut node = Node::new(1, "Room", NodeKind::Normal);
        node.set_pressure(500.0);
        node.update_density();
        let expected = (P_ATM + 500.0) / (R_AIR * T_REF);
        assert!((node.density() - expected).abs() < 1e-12);
    }

    #[test]
    fn ambient_is_known_pressure() {
        assert!(Node::new(0, "Out", NodeKind::Ambient).is_known_pressure());
        assert!(!Node::new(1, "Room", NodeKind::Normal).is_known_pressure());
        assert!(!Node::new(2, "Conn", NodeKind::Phantom).is_known_pressure());
    }

    #[test]
    fn cp_profile_interpolation() {
        let mut node = Node::new(1, "Wall", NodeKind::Ambient);
        node.set_temperature(293.15);
        node.update_density();
        node.set_wall_azimuth(0.0);
        node.set_terrain_factor(1.0);
        node.set_wind_pressure_profile(vec![
            (0.0, 0.6),
            (90.0, -0.3),
            (180.0, -0.5),
            (270.0, -0.3),
            (360.0, 0.6),
        ]);

        assert!((node.cp_at_wind_direction(0.0) - 0.6).abs() < 0.01);
        assert!((node.cp_at_wind_direction(90.0) + 0.3).abs() < 0.01);
        assert!((node.cp_at_wind_direction(180.0) + 0.5).abs() < 0.01);
        // 45° interpolates between windward and side values
        assert!((node.cp_at_wind_direction(45.0) - 0.15).abs() < 0.05);
    }

    #[test]
    fn terrain_factor_applied_to_wind_pressure() {
        let mut node = Node::new(1, "Wall", NodeKind::Ambient);
        node.set_temperature(293.15);
        node.update_density();
        node.set_wind_pressure_coeff(0.6);
        node.set_terrain_factor(0.8);

        let pw = node.wind_pressure(5.0, 0.0);
        let expected = 0.5 * node.density() * 0.8 * 0.6 * 25.0;
        assert!((pw - expected).abs() < 0.01);
    }
}
