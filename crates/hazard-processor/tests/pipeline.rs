//! End-to-end runs over synthetic feeds.

use hazard_processor::{
    CancellationToken, DecodedFeeds, HazardProcessor, ProcessorConfig, ProcessorError,
    RainfallAdjustments, RiskLevel,
};
use swi_common::{AreaSpec, GridError};
use test_utils::fixtures::{self, otsu, otsu_east, otsu_south};
use test_utils::{assert_approx_eq, GuidanceFeedBuilder, SaturationFeedBuilder};

fn swi_feed() -> Vec<u8> {
    let grid = fixtures::saturation_grid();
    SaturationFeedBuilder::new(grid)
        .with_total(grid.with_point(0, otsu::SATURATION_INDEX, 853))
        .with_first_tank(grid.with_point(0, otsu::SATURATION_INDEX, 120))
        .with_second_tank(grid.with_point(0, otsu::SATURATION_INDEX, 205))
        .build()
}

/// 50, 26 and 19 mm over the first three steps of the retained cycle at the
/// cell shared by `otsu` and `otsu_south`; dry everywhere else.
fn guidance_feed() -> Vec<u8> {
    let grid = fixtures::guidance_grid();
    GuidanceFeedBuilder::new(grid)
        .with_reference_time(2023, 6, 2, 0)
        .with_standard_cycles(|cycle, ft| {
            let rain = match (cycle, ft) {
                (2, 3) => 50,
                (2, 6) => 26,
                (2, 9) => 19,
                (2, _) => 0,
                _ => 80,
            };
            grid.with_point(0, otsu::GUIDANCE_INDEX, rain)
        })
        .build()
}

fn processor(worker_threads: usize) -> HazardProcessor {
    HazardProcessor::new(ProcessorConfig {
        worker_threads,
        ..Default::default()
    })
    .unwrap()
}

fn decoded(processor: &HazardProcessor) -> DecodedFeeds {
    processor.decode_feeds(&swi_feed(), &guidance_feed()).unwrap()
}

#[test]
fn test_reference_mesh_timeline() {
    let processor = processor(2);
    let feeds = decoded(&processor);
    let result = processor
        .run(&feeds, &fixtures::catalog(), &CancellationToken::new())
        .unwrap();

    let mesh = result.find_mesh(otsu::CODE).unwrap();
    assert_eq!(mesh.saturation.len(), 27);
    assert_eq!(mesh.saturation[0].hour, 0);
    assert_eq!(mesh.saturation[26].hour, 78);
    assert_approx_eq!(mesh.saturation[0].value, 85.3, 1e-9);
    assert_approx_eq!(mesh.saturation[1].value, 131.757, 0.1);
    assert_approx_eq!(mesh.saturation[2].value, 141.32558, 0.1);
    assert_approx_eq!(mesh.saturation[3].value, 143.6300652, 0.1);

    let rain: Vec<f64> = mesh.rainfall.iter().take(5).map(|p| p.value).collect();
    assert_eq!(rain, vec![0.0, 50.0, 26.0, 19.0, 0.0]);

    let levels: Vec<RiskLevel> = mesh.risk.iter().take(4).map(|p| p.level).collect();
    assert_eq!(
        levels,
        vec![
            RiskLevel::None,
            RiskLevel::Warning,
            RiskLevel::Landslide,
            RiskLevel::Landslide
        ]
    );
    assert_eq!(mesh.peak_risk(), RiskLevel::Landslide);
}

#[test]
fn test_result_follows_catalog_structure() {
    let processor = processor(0);
    let feeds = decoded(&processor);
    let catalog = fixtures::catalog();
    let result = processor
        .run(&feeds, &catalog, &CancellationToken::new())
        .unwrap();

    assert_eq!(result.initial_time, feeds.saturation.info.initial_time);
    assert_eq!(result.guidance_initial_time, feeds.guidance.info.initial_time);
    assert_eq!(result.mesh_count(), 3);
    assert_eq!(result.regions[0].code, "25");

    let codes: Vec<&str> = result.meshes().map(|m| m.code.as_str()).collect();
    assert_eq!(codes, vec![otsu::CODE, otsu_east::CODE, otsu_south::CODE]);

    let otsu_area = &result.regions[0].areas[0];
    assert_eq!(otsu_area.name, "Otsu");
    assert_eq!(otsu_area.risk_timeline.len(), 27);
    assert_eq!(otsu_area.rainfall_timeline[1].value, 50.0);
    // The eastern mesh stays dry, so the area follows the reference mesh
    assert_eq!(otsu_area.risk_timeline[2].level, RiskLevel::Landslide);

    let east = result.find_mesh(otsu_east::CODE).unwrap();
    assert!(east.rainfall.iter().all(|p| p.value == 0.0));
    assert!(east.saturation.iter().all(|p| p.value == 0.0));

    let south = result.find_mesh(otsu_south::CODE).unwrap();
    assert_eq!(south.rainfall[1].value, 50.0);
    assert!(south.saturation[1].value > 0.0);
}

#[test]
fn test_mesh_outside_feed_aborts_run() {
    let processor = processor(2);
    let feeds = decoded(&processor);
    let mut catalog = fixtures::catalog();
    catalog.regions[0].areas.push(AreaSpec {
        name: "Elsewhere".to_string(),
        meshes: vec![fixtures::mesh("00000000", 0, 0, (1.0, 2.0, 3.0))],
    });

    let err = processor
        .run(&feeds, &catalog, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ProcessorError::Grid(GridError::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_cancelled_run_returns_no_data() {
    let processor = processor(2);
    let feeds = decoded(&processor);
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert!(matches!(
        processor.run(&feeds, &fixtures::catalog(), &cancel),
        Err(ProcessorError::Cancelled)
    ));
}

#[test]
fn test_truncated_feed_fails_decode() {
    let processor = processor(1);
    let swi = swi_feed();
    let err = processor
        .decode_feeds(&swi[..swi.len() / 2], &guidance_feed())
        .unwrap_err();
    assert!(matches!(err, ProcessorError::Decode(_)));
}

#[test]
fn test_parallel_runs_are_deterministic() {
    let catalog = fixtures::catalog();
    let serial = processor(1);
    let parallel = processor(4);

    let a = serial
        .run(&decoded(&serial), &catalog, &CancellationToken::new())
        .unwrap();
    let b = parallel
        .run(&decoded(&parallel), &catalog, &CancellationToken::new())
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_adjusted_rainfall_scales_area_meshes() {
    let processor = processor(2);
    let feeds = decoded(&processor);
    let catalog = fixtures::catalog();
    let cancel = CancellationToken::new();

    let baseline = processor.run(&feeds, &catalog, &cancel).unwrap();

    let mut adjustments = RainfallAdjustments::new();
    adjustments.set("Shiga_Otsu", 3, 25.0);
    let adjusted = processor
        .run_adjusted(&feeds, &catalog, &adjustments, &cancel)
        .unwrap();

    let mesh = adjusted.find_mesh(otsu::CODE).unwrap();
    assert_eq!(mesh.rainfall[1].value, 25.0);
    assert_eq!(mesh.rainfall[2].value, 26.0);
    let before = baseline.find_mesh(otsu::CODE).unwrap();
    assert!(mesh.saturation[1].value < before.saturation[1].value);
    assert_eq!(adjusted.regions[0].areas[0].rainfall_timeline[1].value, 25.0);

    // Kusatsu shares the guidance cell but was not adjusted
    let south = adjusted.find_mesh(otsu_south::CODE).unwrap();
    assert_eq!(south.rainfall[1].value, 50.0);
    assert_eq!(south, baseline.find_mesh(otsu_south::CODE).unwrap());
}

#[test]
fn test_adjustment_at_hour_zero_is_ignored() {
    let processor = processor(2);
    let feeds = decoded(&processor);
    let catalog = fixtures::catalog();
    let cancel = CancellationToken::new();

    let adjustments =
        RainfallAdjustments::from_json(r#"{"Shiga_Otsu": {"0": 10.0, "3": 25.0}}"#).unwrap();
    let adjusted = processor
        .run_adjusted(&feeds, &catalog, &adjustments, &cancel)
        .unwrap();

    let mesh = adjusted.find_mesh(otsu::CODE).unwrap();
    assert_eq!(mesh.rainfall[0].value, 0.0);
    assert_eq!(mesh.rainfall[1].value, 25.0);

    let mut only_hour_zero = RainfallAdjustments::new();
    only_hour_zero.set("Shiga_Otsu", 0, 10.0);
    let unchanged = processor
        .run_adjusted(&feeds, &catalog, &only_hour_zero, &cancel)
        .unwrap();
    assert_eq!(unchanged, processor.run(&feeds, &catalog, &cancel).unwrap());
}

#[test]
fn test_empty_adjustments_match_baseline() {
    let processor = processor(2);
    let feeds = decoded(&processor);
    let catalog = fixtures::catalog();
    let cancel = CancellationToken::new();

    let baseline = processor.run(&feeds, &catalog, &cancel).unwrap();
    let adjusted = processor
        .run_adjusted(&feeds, &catalog, &RainfallAdjustments::new(), &cancel)
        .unwrap();
    assert_eq!(baseline, adjusted);
}

#[test]
fn test_invalid_adjustments_are_rejected() {
    let processor = processor(2);
    let feeds = decoded(&processor);
    let catalog = fixtures::catalog();
    let cancel = CancellationToken::new();

    let mut unknown = RainfallAdjustments::new();
    unknown.set("Shiga_Hikone", 3, 10.0);
    let mut off_step = RainfallAdjustments::new();
    off_step.set("Shiga_Otsu", 4, 10.0);
    let mut negative = RainfallAdjustments::new();
    negative.set("Shiga_Kusatsu", 3, -1.0);

    for adjustments in [unknown, off_step, negative] {
        assert!(matches!(
            processor.run_adjusted(&feeds, &catalog, &adjustments, &cancel),
            Err(ProcessorError::Catalog(_))
        ));
    }
}
