//! Test support for the swi-hazard workspace.
//!
//! - [`generators`]: the run-length level encoder and one writer per GRIB2
//!   section, enough to assemble any feed the decoders accept
//! - [`feeds`]: builders for whole soil-water-index and guidance feeds
//! - [`fixtures`]: grid windows, meshes with known cells, a small catalog
//!
//! ```ignore
//! use test_utils::{fixtures, SaturationFeedBuilder};
//!
//! let bytes = SaturationFeedBuilder::new(fixtures::saturation_grid())
//!     .with_constant(853, 120, 205)
//!     .build();
//! ```

pub mod feeds;
pub mod fixtures;
pub mod generators;

pub use feeds::*;
pub use generators::*;

/// Assert that two numbers differ by at most `tolerance`.
///
/// Both sides are compared as `f64`, so storages, ratios and raw grid
/// values can be mixed.
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (actual, expected, tolerance) = ($actual as f64, $expected as f64, $tolerance as f64);
        assert!(
            (actual - expected).abs() <= tolerance,
            "{} = {} is not within {} of {}",
            stringify!($actual),
            actual,
            tolerance,
            expected
        );
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_within_tolerance() {
        assert_approx_eq!(131.7571, 131.757, 0.001);
        assert_approx_eq!(853, 853.0, 0.0);
        assert_approx_eq!(-0.0, 0.0, 0.0);
    }

    #[test]
    #[should_panic(expected = "is not within")]
    fn test_outside_tolerance() {
        assert_approx_eq!(141.5, 141.32558, 0.1);
    }
}
