//! Third-order (1 km) mesh codes and their native grid coordinates.
//!
//! The native grid counts 30" latitude bands northwards from the equator and
//! 45" longitude columns eastwards from 100°E.

use crate::error::{GridError, GridResult};
use serde::{Deserialize, Serialize};

/// Native grid coordinates of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshCode {
    pub x: u32,
    pub y: u32,
}

impl MeshCode {
    /// Parse an 8-digit mesh code such as `52352679`.
    ///
    /// Digits 1-2 and 3-4 are the first-order latitude/longitude blocks
    /// (80 cells each), digits 5-6 the second-order blocks (10 cells each) and
    /// digits 7-8 the cell itself.
    pub fn parse(code: &str) -> GridResult<Self> {
        let code = code.trim();
        let digits: Vec<u32> = code
            .chars()
            .map(|c| c.to_digit(10))
            .collect::<Option<_>>()
            .ok_or_else(|| GridError::InvalidMeshCode(code.to_string()))?;

        if digits.len() != 8 {
            return Err(GridError::InvalidMeshCode(code.to_string()));
        }

        let y = (digits[0] * 10 + digits[1]) * 80 + digits[4] * 10 + digits[6];
        let x = (digits[2] * 10 + digits[3]) * 80 + digits[5] * 10 + digits[7];
        Ok(Self { x, y })
    }

    /// Centre of the mesh cell.
    pub fn lat_lon(&self) -> (f64, f64) {
        native_to_lat_lon(self.x, self.y)
    }
}

/// Centre latitude/longitude of the native cell `(x, y)`.
pub fn native_to_lat_lon(x: u32, y: u32) -> (f64, f64) {
    let lat = (f64::from(y) + 0.5) * 30.0 / 3600.0;
    let lon = (f64::from(x) + 0.5) * 45.0 / 3600.0 + 100.0;
    (lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mesh_code() {
        let mesh = MeshCode::parse("52352679").unwrap();
        assert_eq!(mesh, MeshCode { x: 2869, y: 4187 });
    }

    #[test]
    fn test_parse_rejects_bad_codes() {
        assert!(MeshCode::parse("5235267").is_err());
        assert!(MeshCode::parse("523526790").is_err());
        assert!(MeshCode::parse("5235267a").is_err());
        assert!(MeshCode::parse("").is_err());
    }

    #[test]
    fn test_native_to_lat_lon() {
        let (lat, lon) = native_to_lat_lon(2869, 4187);
        assert!((lat - 34.895833333333336).abs() < 1e-12);
        assert!((lon - 135.86875).abs() < 1e-12);
    }

    #[test]
    fn test_mesh_centre_matches_native() {
        let mesh = MeshCode::parse("52352679").unwrap();
        assert_eq!(mesh.lat_lon(), native_to_lat_lon(2869, 4187));
    }
}
