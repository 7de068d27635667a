//! Grid geometry of decoded feeds and the location-to-index mapping.

use crate::error::{GridError, GridResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scale of the fixed-point coordinate fields (micro-degrees).
pub const MICRO_DEGREES: f64 = 1_000_000.0;

/// Header metadata of one decoded feed.
///
/// Coordinates are fixed-point micro-degrees exactly as stored in the feed.
/// `s_lat` is the northern edge: row 0 is the northernmost latitude band and
/// row indices grow southwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridInfo {
    pub initial_time: DateTime<Utc>,
    pub grid_num: u32,
    pub x_num: u32,
    pub y_num: u32,
    pub s_lat: i32,
    pub s_lon: i32,
    pub e_lat: i32,
    pub e_lon: i32,
    pub d_lat: i32,
    pub d_lon: i32,
}

impl GridInfo {
    /// `grid_num == x_num * y_num`.
    pub fn is_consistent(&self) -> bool {
        u64::from(self.x_num) * u64::from(self.y_num) == u64::from(self.grid_num)
    }

    /// Number of cells as an array length.
    pub fn len(&self) -> usize {
        self.grid_num as usize
    }

    pub fn is_empty(&self) -> bool {
        self.grid_num == 0
    }

    /// Linear index of the cell containing `(lat, lon)`.
    pub fn index_of(&self, lat: f64, lon: f64) -> GridResult<usize> {
        grid_index(lat, lon, self)
    }
}

/// Map a latitude/longitude onto the zero-based linear index of a row-major
/// grid described by `info`.
///
/// Row and column are truncated with `floor`, never rounded. Any location
/// outside the grid, including one whose column would spill into the next
/// row, is an error.
pub fn grid_index(lat: f64, lon: f64, info: &GridInfo) -> GridResult<usize> {
    let row = ((f64::from(info.s_lat) / MICRO_DEGREES - lat) / (f64::from(info.d_lat) / MICRO_DEGREES))
        .floor();
    let col = ((lon - f64::from(info.s_lon) / MICRO_DEGREES) / (f64::from(info.d_lon) / MICRO_DEGREES))
        .floor();

    let out_of_range = |row: i64, col: i64| GridError::IndexOutOfRange {
        lat,
        lon,
        row,
        col,
        x_num: info.x_num,
        y_num: info.y_num,
    };

    if !row.is_finite() || !col.is_finite() {
        return Err(out_of_range(i64::MIN, i64::MIN));
    }

    let (row, col) = (row as i64, col as i64);
    if row < 0 || col < 0 || row >= i64::from(info.y_num) || col >= i64::from(info.x_num) {
        return Err(out_of_range(row, col));
    }

    let index = row * i64::from(info.x_num) + col;
    if index >= i64::from(info.grid_num) {
        return Err(out_of_range(row, col));
    }

    Ok(index as usize)
}

/// Flat row-major array of decoded values, one per grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseGrid {
    values: Vec<i32>,
}

impl DenseGrid {
    /// Wrap decoded values, checking them against the declared cell count.
    pub fn new(values: Vec<i32>, grid_num: usize) -> GridResult<Self> {
        if values.len() != grid_num {
            return Err(GridError::shape(grid_num, values.len()));
        }
        Ok(Self { values })
    }

    pub fn get(&self, index: usize) -> Option<i32> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
