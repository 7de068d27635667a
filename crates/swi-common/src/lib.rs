//! Common types shared across the soil-water-index hazard workspace.

pub mod catalog;
pub mod error;
pub mod grid;
pub mod mesh;

pub use catalog::{AreaSpec, Catalog, HazardThresholds, MeshSpec, RegionSpec};
pub use error::{GridError, GridResult};
pub use grid::{grid_index, DenseGrid, GridInfo};
pub use mesh::{native_to_lat_lon, MeshCode};
