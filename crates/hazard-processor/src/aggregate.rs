//! Per-mesh simulation and regrouping into the catalog's structure.

use crate::config::ProcessorConfig;
use crate::error::{ProcessorError, Result};
use crate::risk::RiskLevel;
use crate::types::{AreaResult, MeshResult, RegionResult, RiskPoint, TimePoint};
use grib2_parser::{GuidanceFeed, SaturationFeed};
use swi_common::{Catalog, DenseGrid, GridError, MeshSpec};
use tank_model::{simulate, TankState};

/// Both decoded feeds. Read-only once decoded and shared by every mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFeeds {
    pub saturation: SaturationFeed,
    pub guidance: GuidanceFeed,
}

/// Hours of every output timeline: 0 followed by the forecast hours.
pub fn timeline_hours(feeds: &DecodedFeeds) -> Vec<u32> {
    std::iter::once(0).chain(feeds.guidance.series.hours()).collect()
}

fn value_at(grid: &DenseGrid, index: usize) -> Result<i32> {
    grid.get(index)
        .ok_or_else(|| GridError::shape(index + 1, grid.len()).into())
}

/// Simulate one mesh.
///
/// `rain_scale` multiplies the forecast rainfall step by step; `None` keeps
/// the rainfall as decoded.
pub fn compute_mesh(
    mesh: &MeshSpec,
    feeds: &DecodedFeeds,
    config: &ProcessorConfig,
    rain_scale: Option<&[f64]>,
) -> Result<MeshResult> {
    let (lat, lon) = mesh.lat_lon();

    let swi = &feeds.saturation;
    let swi_index = swi.info.index_of(lat, lon)?;
    let initial = TankState::from_raw(
        value_at(&swi.total, swi_index)?,
        value_at(&swi.first_tank, swi_index)?,
        value_at(&swi.second_tank, swi_index)?,
    );

    let guidance_index = feeds.guidance.info.index_of(lat, lon)?;
    let raw_rain = feeds
        .guidance
        .series
        .values_at(guidance_index)
        .ok_or_else(|| GridError::shape(guidance_index + 1, feeds.guidance.info.len()))?;

    if let Some(scale) = rain_scale {
        if scale.len() != raw_rain.len() {
            return Err(GridError::shape(raw_rain.len(), scale.len()).into());
        }
    }
    let rain: Vec<(u32, f64)> = raw_rain
        .iter()
        .enumerate()
        .map(|(i, &(hour, value))| {
            let factor = rain_scale.map_or(1.0, |scale| scale[i]);
            (hour, f64::from(value) * factor)
        })
        .collect();

    let timeline = simulate(&config.tank, initial, &rain, config.step_hours());

    let saturation: Vec<TimePoint> = timeline
        .iter()
        .map(|(hour, state)| TimePoint {
            hour: *hour,
            value: state.saturation(),
        })
        .collect();
    let risk = saturation
        .iter()
        .map(|point| RiskPoint {
            hour: point.hour,
            level: RiskLevel::classify(point.value, &mesh.thresholds),
        })
        .collect();
    let rainfall = std::iter::once(TimePoint {
        hour: 0,
        value: 0.0,
    })
    .chain(rain.iter().map(|&(hour, value)| TimePoint { hour, value }))
    .collect();

    Ok(MeshResult {
        code: mesh.code.clone(),
        native_x: mesh.native_x,
        native_y: mesh.native_y,
        lat,
        lon,
        thresholds: mesh.thresholds,
        saturation,
        rainfall,
        risk,
    })
}

/// Area timelines: the highest level and rainfall among `meshes` per hour.
pub fn area_timelines(meshes: &[MeshResult], hours: &[u32]) -> (Vec<RiskPoint>, Vec<TimePoint>) {
    let risk = hours
        .iter()
        .enumerate()
        .map(|(i, &hour)| RiskPoint {
            hour,
            level: meshes
                .iter()
                .filter_map(|mesh| mesh.risk.get(i).map(|point| point.level))
                .max()
                .unwrap_or_default(),
        })
        .collect();

    let rainfall = hours
        .iter()
        .enumerate()
        .map(|(i, &hour)| TimePoint {
            hour,
            value: meshes
                .iter()
                .filter_map(|mesh| mesh.rainfall.get(i).map(|point| point.value))
                .fold(0.0, f64::max),
        })
        .collect();

    (risk, rainfall)
}

/// Regroup per-mesh results, given in catalog order, into regions and areas.
pub fn assemble(
    catalog: &Catalog,
    meshes: Vec<MeshResult>,
    hours: &[u32],
) -> Result<Vec<RegionResult>> {
    let expected = catalog.mesh_count();
    if meshes.len() != expected {
        return Err(ProcessorError::catalog(format!(
            "{} mesh results for {} catalog meshes",
            meshes.len(),
            expected
        )));
    }

    let mut results = meshes.into_iter();
    let regions = catalog
        .regions
        .iter()
        .map(|region| RegionResult {
            code: region.code.clone(),
            name: region.name.clone(),
            areas: region
                .areas
                .iter()
                .map(|area| {
                    let meshes: Vec<MeshResult> = results.by_ref().take(area.meshes.len()).collect();
                    let (risk_timeline, rainfall_timeline) = area_timelines(&meshes, hours);
                    AreaResult {
                        name: area.name.clone(),
                        risk_timeline,
                        rainfall_timeline,
                        meshes,
                    }
                })
                .collect(),
        })
        .collect();

    Ok(regions)
}
