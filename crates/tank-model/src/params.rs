//! Model parameters.

use serde::{Deserialize, Serialize};

/// Parameters of the three-tank model.
///
/// Thresholds are in millimetres, coefficients per hour. A parameter set is
/// an immutable value handed to every simulation call, so simulations with
/// different sets can run side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankParams {
    /// Lower side outlet height of the first tank.
    pub l1: f64,
    /// Upper side outlet height of the first tank.
    pub l2: f64,
    /// Side outlet height of the second tank.
    pub l3: f64,
    /// Side outlet height of the third tank.
    pub l4: f64,

    /// Side outflow coefficients (first tank lower, first tank upper, second,
    /// third).
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
    pub a4: f64,

    /// Infiltration coefficients into the tank below.
    pub b1: f64,
    pub b2: f64,
    pub b3: f64,
}

impl Default for TankParams {
    fn default() -> Self {
        Self {
            l1: 15.0,
            l2: 60.0,
            l3: 15.0,
            l4: 15.0,
            a1: 0.1,
            a2: 0.15,
            a3: 0.05,
            a4: 0.01,
            b1: 0.12,
            b2: 0.05,
            b3: 0.01,
        }
    }
}

impl TankParams {
    /// Validate the parameters for a simulation step of `step_hours`.
    pub fn validate(&self, step_hours: f64) -> Result<(), String> {
        let fields = [
            ("l1", self.l1),
            ("l2", self.l2),
            ("l3", self.l3),
            ("l4", self.l4),
            ("a1", self.a1),
            ("a2", self.a2),
            ("a3", self.a3),
            ("a4", self.a4),
            ("b1", self.b1),
            ("b2", self.b2),
            ("b3", self.b3),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, value));
            }
        }

        if self.l2 < self.l1 {
            return Err(format!("l2 ({}) must not be below l1 ({})", self.l2, self.l1));
        }

        if step_hours.is_nan() || step_hours <= 0.0 {
            return Err(format!("step must be positive, got {} hours", step_hours));
        }

        for (name, b) in [("b1", self.b1), ("b2", self.b2), ("b3", self.b3)] {
            if b * step_hours > 1.0 {
                return Err(format!(
                    "{} * step ({} * {}) exceeds 1; the tank would drain below empty",
                    name, b, step_hours
                ));
            }
        }

        Ok(())
    }
}
