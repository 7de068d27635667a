//! Three-tank soil water index model.
//!
//! The soil is modelled as three stacked tanks. Rain fills the first tank;
//! each tank drains through side outlets once its storage passes an outlet
//! height and infiltrates a fraction of its storage into the tank below. The
//! soil water index is the total storage of the three tanks.
//!
//! # Example
//!
//! ```
//! use tank_model::{simulate, TankParams, TankState};
//!
//! let initial = TankState::from_raw(853, 120, 205);
//! let timeline = simulate(&TankParams::default(), initial, &[(3, 50.0), (6, 26.0)], 3.0);
//!
//! assert_eq!(timeline.len(), 3);
//! assert!((timeline[1].1.saturation() - 131.757).abs() < 1e-6);
//! ```

pub mod params;

pub use params::TankParams;

use serde::{Deserialize, Serialize};

/// Storages of the three tanks, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TankState {
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl TankState {
    pub fn new(s1: f64, s2: f64, s3: f64) -> Self {
        Self { s1, s2, s3 }
    }

    /// Initial state from raw soil-water-index feed values (tenths of a
    /// millimetre). The third tank holds whatever the first two do not.
    pub fn from_raw(total: i32, first_tank: i32, second_tank: i32) -> Self {
        let s1 = f64::from(first_tank) / 10.0;
        let s2 = f64::from(second_tank) / 10.0;
        let s3 = f64::from(total) / 10.0 - s1 - s2;
        Self { s1, s2, s3 }
    }

    /// Soil water index: the total storage.
    pub fn saturation(&self) -> f64 {
        self.s1 + self.s2 + self.s3
    }

    /// Side outflows `(q1, q2, q3)` per hour at the current storages.
    pub fn outflows(&self, params: &TankParams) -> (f64, f64, f64) {
        let p = params;
        let mut q1 = 0.0;
        if self.s1 > p.l1 {
            q1 += p.a1 * (self.s1 - p.l1);
        }
        if self.s1 > p.l2 {
            q1 += p.a2 * (self.s1 - p.l2);
        }
        let q2 = if self.s2 > p.l3 {
            p.a3 * (self.s2 - p.l3)
        } else {
            0.0
        };
        let q3 = if self.s3 > p.l4 {
            p.a4 * (self.s3 - p.l4)
        } else {
            0.0
        };
        (q1, q2, q3)
    }

    /// Advance the state by `hours` with `rain` millimetres falling into the
    /// first tank. Storages never go below zero.
    pub fn step(&self, params: &TankParams, hours: f64, rain: f64) -> Self {
        let p = params;
        let (q1, q2, q3) = self.outflows(p);

        let s1 = (1.0 - p.b1 * hours) * self.s1 - q1 * hours + rain;
        let s2 = (1.0 - p.b2 * hours) * self.s2 - q2 * hours + p.b1 * self.s1 * hours;
        let s3 = (1.0 - p.b3 * hours) * self.s3 - q3 * hours + p.b2 * self.s2 * hours;

        Self {
            s1: s1.max(0.0),
            s2: s2.max(0.0),
            s3: s3.max(0.0),
        }
    }
}

/// Run the model over a rainfall series.
///
/// `rainfall` holds `(forecast_hour, millimetres)` in forecast order, one
/// entry per step of `step_hours`. The returned timeline starts with the
/// initial state at hour 0 followed by the state after each step.
pub fn simulate(
    params: &TankParams,
    initial: TankState,
    rainfall: &[(u32, f64)],
    step_hours: f64,
) -> Vec<(u32, TankState)> {
    let mut timeline = Vec::with_capacity(rainfall.len() + 1);
    timeline.push((0, initial));

    let mut state = initial;
    for &(hour, rain) in rainfall {
        state = state.step(params, step_hours, rain);
        timeline.push((hour, state));
    }
    timeline
}
