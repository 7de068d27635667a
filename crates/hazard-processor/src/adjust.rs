//! Rainfall adjustment.
//!
//! A forecaster may replace an area's forecast rainfall at some hours. The
//! replacement applies to the area's wettest mesh; every mesh of the area is
//! scaled by the same ratio so the spatial pattern is kept.

use crate::error::{ProcessorError, Result};
use crate::types::RegionResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use swi_common::Catalog;
use tracing::debug;

/// Adjusted rainfall per area, keyed `"{region_name}_{area_name}"`, then by
/// forecast hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RainfallAdjustments {
    pub areas: HashMap<String, BTreeMap<u32, f64>>,
}

impl RainfallAdjustments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ProcessorError::catalog(format!("invalid rainfall adjustments: {}", e)))
    }

    /// Set the adjusted rainfall of an area at one hour.
    pub fn set(&mut self, area_key: impl Into<String>, hour: u32, rainfall: f64) -> &mut Self {
        self.areas
            .entry(area_key.into())
            .or_default()
            .insert(hour, rainfall);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.areas.values().all(BTreeMap::is_empty)
    }
}

/// Rainfall multipliers per mesh code, one per forecast step.
///
/// `baseline` is an unadjusted run over `catalog`; `forecast_hours` are the
/// hours of its forecast steps, without hour 0. For each adjusted area and
/// hour the ratio is the adjusted value over the area's highest baseline
/// rainfall (1.0 when that is zero). A mesh in several adjusted areas takes
/// the highest ratio; steps nobody adjusts stay at 1.0. Hour 0 is the
/// observed state, so adjustments there are ignored.
pub fn mesh_ratios(
    catalog: &Catalog,
    baseline: &[RegionResult],
    adjustments: &RainfallAdjustments,
    forecast_hours: &[u32],
) -> Result<HashMap<String, Vec<f64>>> {
    let mut known_keys = Vec::new();
    let mut ratios: HashMap<String, Vec<Option<f64>>> = HashMap::new();

    for (region, region_result) in catalog.regions.iter().zip(baseline) {
        for (area, area_result) in region.areas.iter().zip(&region_result.areas) {
            let key = region.area_key(area);
            let Some(hours) = adjustments.areas.get(&key) else {
                known_keys.push(key);
                continue;
            };
            known_keys.push(key.clone());

            let mut area_ratios = vec![None; forecast_hours.len()];
            for (&hour, &adjusted) in hours {
                if hour == 0 {
                    debug!(area = %key, "Ignoring rainfall adjustment at hour 0");
                    continue;
                }
                if !adjusted.is_finite() || adjusted < 0.0 {
                    return Err(ProcessorError::catalog(format!(
                        "adjusted rainfall for {} at hour {} must be non-negative, got {}",
                        key, hour, adjusted
                    )));
                }
                let step = forecast_hours
                    .iter()
                    .position(|&h| h == hour)
                    .ok_or_else(|| {
                        ProcessorError::catalog(format!(
                            "adjustment for {} at hour {} is outside the forecast",
                            key, hour
                        ))
                    })?;

                let original = area_result
                    .rainfall_timeline
                    .iter()
                    .find(|point| point.hour == hour)
                    .map_or(0.0, |point| point.value);
                area_ratios[step] = Some(if original > 0.0 {
                    adjusted / original
                } else {
                    1.0
                });
            }

            for mesh in &area.meshes {
                let entry = ratios
                    .entry(mesh.code.clone())
                    .or_insert_with(|| vec![None; forecast_hours.len()]);
                for (current, candidate) in entry.iter_mut().zip(&area_ratios) {
                    if let Some(candidate) = *candidate {
                        *current = Some(current.map_or(candidate, |c: f64| c.max(candidate)));
                    }
                }
            }
        }
    }

    if let Some(unknown) = adjustments
        .areas
        .keys()
        .find(|key| !known_keys.contains(key))
    {
        return Err(ProcessorError::catalog(format!("unknown area {}", unknown)));
    }

    Ok(ratios
        .into_iter()
        .map(|(code, steps)| (code, steps.into_iter().map(|r| r.unwrap_or(1.0)).collect()))
        .collect())
}
