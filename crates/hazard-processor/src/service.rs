//! Run orchestration: concurrent feed decoding and parallel per-mesh work.

use crate::adjust::{mesh_ratios, RainfallAdjustments};
use crate::aggregate::{assemble, compute_mesh, timeline_hours, DecodedFeeds};
use crate::config::ProcessorConfig;
use crate::error::{ProcessorError, Result};
use crate::types::{MeshResult, RunResult};
use grib2_parser::{decode_guidance, decode_saturation, Grib2Result};
use metrics::{counter, histogram};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use swi_common::Catalog;
use tracing::{debug, info, warn};

/// Cooperative cancellation of a run. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(ProcessorError::Cancelled);
        }
        Ok(())
    }
}

/// Decodes feeds and runs the per-mesh simulation on a dedicated pool.
pub struct HazardProcessor {
    config: ProcessorConfig,
    pool: rayon::ThreadPool,
}

impl HazardProcessor {
    /// Validate `config` and start the worker pool.
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate().map_err(ProcessorError::Config)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("swi-worker-{}", i))
            .build()
            .map_err(|e| ProcessorError::ThreadPool(e.to_string()))?;

        info!(
            threads = pool.current_num_threads(),
            steps = config.forecast.steps,
            step_hours = config.forecast.step_hours,
            "Hazard processor ready"
        );

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Decode both feeds concurrently.
    pub fn decode_feeds(&self, swi: &[u8], guidance: &[u8]) -> Result<DecodedFeeds> {
        let layout = self.config.forecast;
        let (saturation, guidance) = self.pool.join(
            || timed("saturation", || decode_saturation(swi)),
            || timed("guidance", || decode_guidance(guidance, &layout)),
        );
        let feeds = DecodedFeeds {
            saturation: saturation?,
            guidance: guidance?,
        };

        info!(
            initial_time = %feeds.saturation.info.initial_time,
            guidance_initial_time = %feeds.guidance.info.initial_time,
            swi_grid = feeds.saturation.info.grid_num,
            guidance_grid = feeds.guidance.info.grid_num,
            "Decoded feeds"
        );
        Ok(feeds)
    }

    /// Simulate every catalog mesh and group the results.
    ///
    /// Either every mesh succeeds or the run fails as a whole; a cancelled
    /// run returns [`ProcessorError::Cancelled`] and no data.
    pub fn run(
        &self,
        feeds: &DecodedFeeds,
        catalog: &Catalog,
        cancel: &CancellationToken,
    ) -> Result<RunResult> {
        self.run_scaled(feeds, catalog, None, cancel)
    }

    /// Like [`run`](Self::run), with area rainfall replaced by `adjustments`.
    pub fn run_adjusted(
        &self,
        feeds: &DecodedFeeds,
        catalog: &Catalog,
        adjustments: &RainfallAdjustments,
        cancel: &CancellationToken,
    ) -> Result<RunResult> {
        let baseline = self.run_scaled(feeds, catalog, None, cancel)?;
        if adjustments.is_empty() {
            return Ok(baseline);
        }

        let forecast_hours: Vec<u32> = feeds.guidance.series.hours().collect();
        let ratios = mesh_ratios(catalog, &baseline.regions, adjustments, &forecast_hours)?;
        debug!(meshes = ratios.len(), "Rerunning with adjusted rainfall");

        self.run_scaled(feeds, catalog, Some(&ratios), cancel)
    }

    fn run_scaled(
        &self,
        feeds: &DecodedFeeds,
        catalog: &Catalog,
        ratios: Option<&HashMap<String, Vec<f64>>>,
        cancel: &CancellationToken,
    ) -> Result<RunResult> {
        let start = Instant::now();
        let meshes: Vec<_> = catalog.meshes().map(|(_, _, mesh)| mesh).collect();

        let outcome = cancel.check().and_then(|_| {
            self.pool.install(|| {
                meshes
                    .par_iter()
                    .map(|mesh| {
                        cancel.check()?;
                        let scale = ratios.and_then(|r| r.get(&mesh.code)).map(Vec::as_slice);
                        compute_mesh(mesh, feeds, &self.config, scale)
                    })
                    .collect::<Result<Vec<MeshResult>>>()
            })
        });

        // A cancel that lands after the last mesh still discards the run
        let results = match outcome.and_then(|results| cancel.check().map(|_| results)) {
            Ok(results) => results,
            Err(e) => {
                counter!("swi_runs_total", "outcome" => "failed").increment(1);
                warn!(error = %e, meshes = meshes.len(), "Run aborted");
                return Err(e);
            }
        };

        let hours = timeline_hours(feeds);
        let regions = assemble(catalog, results, &hours)?;
        let elapsed = start.elapsed();

        counter!("swi_runs_total", "outcome" => "ok").increment(1);
        counter!("swi_meshes_processed_total").increment(meshes.len() as u64);
        histogram!("swi_run_duration_seconds").record(elapsed.as_secs_f64());

        info!(
            meshes = meshes.len(),
            regions = regions.len(),
            adjusted = ratios.is_some(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Run complete"
        );

        Ok(RunResult {
            initial_time: feeds.saturation.info.initial_time,
            guidance_initial_time: feeds.guidance.info.initial_time,
            regions,
        })
    }
}

fn timed<T>(feed: &'static str, decode: impl FnOnce() -> Grib2Result<T>) -> Grib2Result<T> {
    let start = Instant::now();
    let result = decode();
    let elapsed = start.elapsed().as_secs_f64();
    histogram!("swi_feed_decode_seconds", "feed" => feed).record(elapsed);
    match &result {
        Ok(_) => debug!(feed, elapsed_s = elapsed, "Feed decoded"),
        Err(e) => warn!(feed, error = %e, "Feed decode failed"),
    }
    result
}
