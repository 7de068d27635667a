//! Result types of a processing run.

use crate::risk::RiskLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swi_common::HazardThresholds;

/// A value at one forecast hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub hour: u32,
    pub value: f64,
}

/// A hazard level at one forecast hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskPoint {
    pub hour: u32,
    pub level: RiskLevel,
}

/// Timelines of one mesh. All three timelines cover hours 0, step, ...,
/// horizon; rainfall at hour 0 is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshResult {
    pub code: String,
    pub native_x: u32,
    pub native_y: u32,
    pub lat: f64,
    pub lon: f64,
    #[serde(flatten)]
    pub thresholds: HazardThresholds,
    pub saturation: Vec<TimePoint>,
    pub rainfall: Vec<TimePoint>,
    pub risk: Vec<RiskPoint>,
}

impl MeshResult {
    /// Highest hazard level over the whole timeline.
    pub fn peak_risk(&self) -> RiskLevel {
        self.risk
            .iter()
            .map(|point| point.level)
            .max()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaResult {
    pub name: String,
    /// Highest mesh hazard level per hour.
    pub risk_timeline: Vec<RiskPoint>,
    /// Highest mesh rainfall per hour.
    pub rainfall_timeline: Vec<TimePoint>,
    pub meshes: Vec<MeshResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionResult {
    pub code: String,
    pub name: String,
    pub areas: Vec<AreaResult>,
}

/// Output of one complete run, mirroring the catalog's structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Reference time of the soil-water-index feed.
    pub initial_time: DateTime<Utc>,
    /// Reference time of the guidance feed.
    pub guidance_initial_time: DateTime<Utc>,
    pub regions: Vec<RegionResult>,
}

impl RunResult {
    pub fn mesh_count(&self) -> usize {
        self.meshes().count()
    }

    /// Every mesh result in catalog order.
    pub fn meshes(&self) -> impl Iterator<Item = &MeshResult> {
        self.regions
            .iter()
            .flat_map(|region| &region.areas)
            .flat_map(|area| &area.meshes)
    }

    pub fn find_mesh(&self, code: &str) -> Option<&MeshResult> {
        self.meshes().find(|mesh| mesh.code == code)
    }
}
