//! Region/area/mesh catalog handed to the aggregator.
//!
//! The catalog is loaded and validated elsewhere; these types only carry it
//! as plain data.

use crate::mesh::native_to_lat_lon;
use serde::{Deserialize, Serialize};

/// Hazard boundaries of a mesh, in soil-water-index units (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardThresholds {
    pub advisory_bound: f64,
    pub warning_bound: f64,
    pub landslide_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSpec {
    pub code: String,
    pub native_x: u32,
    pub native_y: u32,
    #[serde(flatten)]
    pub thresholds: HazardThresholds,
}

impl MeshSpec {
    /// Centre latitude/longitude derived from the native coordinates.
    pub fn lat_lon(&self) -> (f64, f64) {
        native_to_lat_lon(self.native_x, self.native_y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSpec {
    pub name: String,
    pub meshes: Vec<MeshSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub code: String,
    pub name: String,
    pub areas: Vec<AreaSpec>,
}

impl RegionSpec {
    /// Key used to address one of this region's areas, e.g. in rainfall
    /// adjustments.
    pub fn area_key(&self, area: &AreaSpec) -> String {
        format!("{}_{}", self.name, area.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub regions: Vec<RegionSpec>,
}

impl Catalog {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Total number of meshes across every region and area.
    pub fn mesh_count(&self) -> usize {
        self.regions
            .iter()
            .flat_map(|region| &region.areas)
            .map(|area| area.meshes.len())
            .sum()
    }

    /// Every mesh in catalog order, with its region and area positions.
    pub fn meshes(&self) -> impl Iterator<Item = (usize, usize, &MeshSpec)> + '_ {
        self.regions.iter().enumerate().flat_map(|(r, region)| {
            region.areas.iter().enumerate().flat_map(move |(a, area)| {
                area.meshes.iter().map(move |mesh| (r, a, mesh))
            })
        })
    }
}
