//! Rainfall guidance feed and forecast cycle selection.
//!
//! The feed concatenates several overlapping forecast cycles. Each dataset's
//! forecast hour is the product definition's start (+18) plus its span (+49);
//! a drop in forecast hour from one dataset to the next starts a new cycle.
//! Only one cycle at one span is kept.

use crate::error::{Grib2Error, Grib2Result};
use crate::sections::{parse_header, SectionReader};
use crate::unpacking::{decode_dataset, skip_dataset};
use serde::{Deserialize, Serialize};
use swi_common::{DenseGrid, GridError, GridInfo};
use tracing::{debug, info};

/// Which datasets of the guidance feed make up the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastLayout {
    /// Span of the retained datasets, in hours.
    pub step_hours: u32,
    /// 1-based index of the retained cycle.
    pub cycle: u32,
    /// Number of steps a complete forecast has.
    pub steps: usize,
}

impl Default for ForecastLayout {
    fn default() -> Self {
        Self {
            step_hours: 3,
            cycle: 2,
            steps: 26,
        }
    }
}

impl ForecastLayout {
    /// Forecast hours of a complete series: `step, 2*step, ..., steps*step`.
    pub fn hours(&self) -> impl Iterator<Item = u32> + '_ {
        (1..=self.step_count()).map(move |i| i.saturating_mul(self.step_hours))
    }

    /// Last forecast hour.
    pub fn horizon(&self) -> u32 {
        self.step_count().saturating_mul(self.step_hours)
    }

    fn step_count(&self) -> u32 {
        u32::try_from(self.steps).unwrap_or(u32::MAX)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.step_hours == 0 {
            return Err("forecast step_hours must be > 0".to_string());
        }
        if self.cycle == 0 {
            return Err("forecast cycle is 1-based and must be > 0".to_string());
        }
        if self.steps == 0 {
            return Err("forecast steps must be > 0".to_string());
        }
        let horizon = u32::try_from(self.steps)
            .ok()
            .and_then(|steps| steps.checked_mul(self.step_hours));
        if horizon.is_none() {
            return Err(format!(
                "{} forecast steps of {} hours overflow the forecast hour",
                self.steps, self.step_hours
            ));
        }
        Ok(())
    }
}

/// Rainfall grids of one forecast cycle, in strictly increasing forecast
/// hour at a fixed step.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSeries {
    steps: Vec<(u32, DenseGrid)>,
}

impl ForecastSeries {
    /// Check `steps` against the layout: exactly `layout.steps` entries at
    /// hours `step, 2*step, ...`.
    pub fn new(steps: Vec<(u32, DenseGrid)>, layout: &ForecastLayout) -> Result<Self, GridError> {
        if steps.len() != layout.steps {
            return Err(GridError::shape(layout.steps, steps.len()));
        }
        for ((hour, _), expected) in steps.iter().zip(layout.hours()) {
            if *hour != expected {
                return Err(GridError::shape(expected as usize, *hour as usize));
            }
        }
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn hours(&self) -> impl Iterator<Item = u32> + '_ {
        self.steps.iter().map(|(hour, _)| *hour)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u32, DenseGrid)> {
        self.steps.iter()
    }

    /// Rainfall at `index` for every step, in forecast order.
    pub fn values_at(&self, index: usize) -> Option<Vec<(u32, i32)>> {
        self.steps
            .iter()
            .map(|(hour, grid)| grid.get(index).map(|value| (*hour, value)))
            .collect()
    }
}

/// Decoded guidance feed.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidanceFeed {
    pub info: GridInfo,
    pub series: ForecastSeries,
}

/// Decode a rainfall guidance feed, keeping the cycle selected by `layout`.
pub fn decode_guidance(data: &[u8], layout: &ForecastLayout) -> Grib2Result<GuidanceFeed> {
    let (info, mut position, total_size) = parse_header(data)?;
    let reader = SectionReader::new(data);
    let grid_num = info.len();

    let mut cycle = 1u32;
    let mut prev_ft = 0u32;
    let mut retained = Vec::new();
    let mut discarded = 0usize;

    while position + 4 < total_size {
        let product = reader.expect_section(position, 4)?;
        product.require_length(53)?;
        let span = product.u32(49)?;
        let ft = product.u32(18)?.saturating_add(span);
        position = product.end();

        if prev_ft > ft {
            cycle += 1;
        }
        prev_ft = ft;

        if span == layout.step_hours && cycle == layout.cycle {
            let (values, next) = decode_dataset(&reader, position, grid_num)?;
            retained.push((ft, DenseGrid::new(values, grid_num)?));
            position = next;
            debug!(ft, cycle, "Retained guidance dataset");
        } else {
            position = skip_dataset(&reader, position)?;
            discarded += 1;
        }
    }

    if retained.len() < layout.steps {
        return Err(Grib2Error::IncompleteForecast {
            expected: layout.steps,
            found: retained.len(),
        });
    }

    let series = ForecastSeries::new(retained, layout)?;
    info!(
        steps = series.len(),
        discarded,
        cycles = cycle,
        "Decoded guidance feed"
    );

    Ok(GuidanceFeed { info, series })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(value: i32) -> DenseGrid {
        DenseGrid::new(vec![value; 2], 2).unwrap()
    }

    #[test]
    fn test_default_layout_hours() {
        let layout = ForecastLayout::default();
        let hours: Vec<u32> = layout.hours().collect();
        assert_eq!(hours.len(), 26);
        assert_eq!(hours.first(), Some(&3));
        assert_eq!(hours.last(), Some(&78));
        assert_eq!(layout.horizon(), 78);
    }

    #[test]
    fn test_series_requires_exact_hours() {
        let layout = ForecastLayout {
            step_hours: 3,
            cycle: 2,
            steps: 2,
        };
        assert!(ForecastSeries::new(vec![(3, grid(1)), (6, grid(2))], &layout).is_ok());
        assert!(ForecastSeries::new(vec![(3, grid(1)), (9, grid(2))], &layout).is_err());
        assert!(ForecastSeries::new(vec![(3, grid(1))], &layout).is_err());
        assert!(
            ForecastSeries::new(vec![(3, grid(1)), (6, grid(2)), (9, grid(3))], &layout).is_err()
        );
    }

    #[test]
    fn test_values_at() {
        let layout = ForecastLayout {
            step_hours: 3,
            cycle: 2,
            steps: 2,
        };
        let series = ForecastSeries::new(vec![(3, grid(1)), (6, grid(2))], &layout).unwrap();
        assert_eq!(series.values_at(1), Some(vec![(3, 1), (6, 2)]));
        assert_eq!(series.values_at(2), None);
    }

    #[test]
    fn test_layout_validation() {
        assert!(ForecastLayout::default().validate().is_ok());
        let layout = ForecastLayout {
            cycle: 0,
            ..Default::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_layout_overflowing_horizon_is_rejected() {
        let too_long = ForecastLayout {
            steps: usize::MAX,
            ..Default::default()
        };
        assert!(too_long.validate().is_err());
        assert_eq!(too_long.horizon(), u32::MAX);

        let too_wide = ForecastLayout {
            step_hours: u32::MAX,
            steps: 2,
            ..Default::default()
        };
        assert!(too_wide.validate().is_err());

        let widest = ForecastLayout {
            step_hours: u32::MAX,
            steps: 1,
            ..Default::default()
        };
        assert!(widest.validate().is_ok());
        assert_eq!(widest.horizon(), u32::MAX);
    }
}
