//! Common test fixtures.
//!
//! The grids are small windows of the real 1 km soil-water-index and 5 km
//! guidance grids, positioned so that the meshes of [`catalog`] land on known
//! cells.

use crate::generators::FeedGrid;
use std::io::Write;
use swi_common::{AreaSpec, Catalog, HazardThresholds, MeshSpec, RegionSpec};
use tempfile::NamedTempFile;

/// 10x10 window of the 1 km soil-water-index grid.
pub fn saturation_grid() -> FeedGrid {
    FeedGrid::new(10, 10, 34_933_333, 135_812_500, 8_333, 12_500)
}

/// 6x6 window of the 5 km guidance grid.
pub fn guidance_grid() -> FeedGrid {
    FeedGrid::new(6, 6, 35_000_000, 135_750_000, 50_000, 62_500)
}

/// Mesh 52352679 (x 2869, y 4187) and where it lands in each window.
pub mod otsu {
    pub const CODE: &str = "52352679";
    pub const NATIVE_X: u32 = 2869;
    pub const NATIVE_Y: u32 = 4187;
    pub const SATURATION_INDEX: usize = 44;
    pub const GUIDANCE_INDEX: usize = 13;
}

/// Mesh 52352770 (x 2870, y 4187), the eastern neighbour.
pub mod otsu_east {
    pub const CODE: &str = "52352770";
    pub const NATIVE_X: u32 = 2870;
    pub const NATIVE_Y: u32 = 4187;
    pub const SATURATION_INDEX: usize = 45;
    pub const GUIDANCE_INDEX: usize = 14;
}

/// Mesh 52352669 (x 2869, y 4186), the southern neighbour.
pub mod otsu_south {
    pub const CODE: &str = "52352669";
    pub const NATIVE_X: u32 = 2869;
    pub const NATIVE_Y: u32 = 4186;
    pub const SATURATION_INDEX: usize = 54;
    pub const GUIDANCE_INDEX: usize = 13;
}

pub fn mesh(code: &str, native_x: u32, native_y: u32, bounds: (f64, f64, f64)) -> MeshSpec {
    MeshSpec {
        code: code.to_string(),
        native_x,
        native_y,
        thresholds: HazardThresholds {
            advisory_bound: bounds.0,
            warning_bound: bounds.1,
            landslide_bound: bounds.2,
        },
    }
}

/// One region with two areas: "Otsu" holding the first two meshes and
/// "Kusatsu" holding the southern one.
pub fn catalog() -> Catalog {
    Catalog {
        regions: vec![RegionSpec {
            code: "25".to_string(),
            name: "Shiga".to_string(),
            areas: vec![
                AreaSpec {
                    name: "Otsu".to_string(),
                    meshes: vec![
                        mesh(otsu::CODE, otsu::NATIVE_X, otsu::NATIVE_Y, (100.0, 130.0, 140.0)),
                        mesh(
                            otsu_east::CODE,
                            otsu_east::NATIVE_X,
                            otsu_east::NATIVE_Y,
                            (100.0, 150.0, 200.0),
                        ),
                    ],
                },
                AreaSpec {
                    name: "Kusatsu".to_string(),
                    meshes: vec![mesh(
                        otsu_south::CODE,
                        otsu_south::NATIVE_X,
                        otsu_south::NATIVE_Y,
                        (90.0, 120.0, 9999.0),
                    )],
                },
            ],
        }],
    }
}

/// Write `contents` to a temporary file that lives as long as the handle.
pub fn temp_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}
