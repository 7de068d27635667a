//! Error types for grid geometry and mesh lookups.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while mapping locations onto decoded grids.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("location ({lat}, {lon}) maps to row {row}, column {col} outside a {x_num}x{y_num} grid")]
    IndexOutOfRange {
        lat: f64,
        lon: f64,
        row: i64,
        col: i64,
        x_num: u32,
        y_num: u32,
    },

    #[error("shape mismatch: expected {expected}, found {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid mesh code: {0}")]
    InvalidMeshCode(String),
}

impl GridError {
    /// Shape mismatch between a declared and an actual length.
    pub fn shape(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }
}
