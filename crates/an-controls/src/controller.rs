//! Incremental PI controller.
//!
//! Update form:
//!   u_t = u_{t−1} + Kp·(e_t − e_{t−1}) + Ki·(e_t + e_{t−1})
//! with e_t = setpoint − reading, the deadband zeroing small errors, and
//! the output hard-clamped to [output_min, output_max]. Ki is configured
//! to absorb the timestep factor, so the update never multiplies by dt.

/// Incremental PI controller wiring a sensor to an actuator.
#[derive(Debug, Clone)]
pub struct Controller {
    pub id: i32,
    pub name: String,
    pub sensor_id: i32,
    pub actuator_id: i32,
    pub setpoint: f64,
    pub kp: f64,
    pub ki: f64,
    /// No action while |error| < deadband.
    pub deadband: f64,
    pub output_min: f64,
    pub output_max: f64,

    output: f64,
    prev_error: f64,
}

impl Controller {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        sensor_id: i32,
        actuator_id: i32,
        setpoint: f64,
        kp: f64,
        ki: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            sensor_id,
            actuator_id,
            setpoint,
            kp,
            ki,
            deadband: 0.0,
            output_min: 0.0,
            output_max: 1.0,
            output: 0.0,
            prev_error: 0.0,
        }
    }

    pub fn with_deadband(mut self, deadband: f64) -> Self {
        self.deadband = deadband;
        self
    }

    pub fn with_output_limits(mut self, min: f64, max: f64) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    /// Advance the controller with the latest sensor reading.
    pub fn update(&mut self, reading: f64) -> f64 {
        let mut error = self.setpoint - reading;

        if error.abs() < self.deadband {
            error = 0.0;
        }

        let increment = self.kp * (error - self.prev_error) + self.ki * (error + self.prev_error);
        self.output = (self.output + increment).clamp(self.output_min, self.output_max);
        self.prev_error = error;
        self.output
    }

    /// Zero both the output and the stored error.
    pub fn reset(&mut self) {
        self.output = 0.0;
        self.prev_error = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_pi_sequence() {
        let mut ctrl = Controller::new(0, "pi", 0, 0, 1.0, 0.5, 0.1);

        // e = 0.2: Δu = 0.5·0.2 + 0.1·0.2 = 0.12
        assert!((ctrl.update(0.8) - 0.12).abs() < 1e-10);
        // e = 0.1: Δu = 0.5·(−0.1) + 0.1·0.3 = −0.02
        assert!((ctrl.update(0.9) - 0.10).abs() < 1e-10);
        // e = 0.05: Δu = 0.5·(−0.05) + 0.1·0.15 = −0.01
        assert!((ctrl.update(0.95) - 0.09).abs() < 1e-10);
    }

    #[test]
    fn deadband_suppresses_small_errors() {
        let mut ctrl = Controller::new(0, "pi", 0, 0, 1.0, 0.5, 0.1).with_deadband(0.3);
        // |e| = 0.2 < deadband: treated as zero error, no output change
        assert_eq!(ctrl.update(0.8), 0.0);
        assert_eq!(ctrl.update(0.8), 0.0);
    }

    #[test]
    fn output_clamps_to_limits() {
        let mut ctrl = Controller::new(0, "pi", 0, 0, 10.0, 5.0, 0.0);
        assert_eq!(ctrl.update(0.0), 1.0);

        let mut ctrl = Controller::new(0, "pi", 0, 0, -10.0, 5.0, 0.0);
        assert_eq!(ctrl.update(0.0), 0.0);
    }

    #[test]
    fn custom_limits_respected() {
        let mut ctrl =
            Controller::new(0, "pi", 0, 0, 10.0, 5.0, 0.0).with_output_limits(0.2, 0.8);
        assert_eq!(ctrl.update(0.0), 0.8);
    }

    #[test]
    fn reset_restores_zero_state() {
        let mut ctrl = Controller::new(0, "pi", 0, 0, 1.0, 0.5, 0.1);
        ctrl.update(0.8);
        ctrl.reset();
        assert_eq!(ctrl.output(), 0.0);
        // Same first step as a fresh controller
        assert!((ctrl.update(0.8) - 0.12).abs() < 1e-10);
    }
}
