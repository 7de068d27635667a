//! One run: read inputs, process on a blocking task, write the result.

use anyhow::{Context, Result};
use bytes::Bytes;
use hazard_processor::{
    CancellationToken, HazardProcessor, ProcessorConfig, RainfallAdjustments, RunResult,
};
use std::path::{Path, PathBuf};
use swi_common::Catalog;
use tracing::info;

/// Input files of one run.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub swi: PathBuf,
    pub guidance: PathBuf,
    pub catalog: PathBuf,
    pub adjustments: Option<PathBuf>,
}

async fn read_bytes(path: &Path) -> Result<Bytes> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    info!(path = %path.display(), size = data.len(), "Read input");
    Ok(Bytes::from(data))
}

async fn read_text(path: &Path) -> Result<String> {
    let data = read_bytes(path).await?;
    String::from_utf8(data.to_vec()).with_context(|| format!("{} is not UTF-8", path.display()))
}

/// Read every input and run the processor over them.
pub async fn execute(
    inputs: &RunInputs,
    config: ProcessorConfig,
    cancel: CancellationToken,
) -> Result<RunResult> {
    let (swi, guidance, catalog) = tokio::try_join!(
        read_bytes(&inputs.swi),
        read_bytes(&inputs.guidance),
        read_text(&inputs.catalog),
    )?;
    let catalog = Catalog::from_json(&catalog)
        .with_context(|| format!("parsing catalog {}", inputs.catalog.display()))?;
    let adjustments = match &inputs.adjustments {
        Some(path) => {
            let json = read_text(path).await?;
            RainfallAdjustments::from_json(&json)
                .with_context(|| format!("parsing adjustments {}", path.display()))?
        }
        None => RainfallAdjustments::new(),
    };

    info!(
        regions = catalog.regions.len(),
        meshes = catalog.mesh_count(),
        adjusted_areas = adjustments.areas.len(),
        "Loaded catalog"
    );

    let result = tokio::task::spawn_blocking(move || -> Result<RunResult> {
        let processor = HazardProcessor::new(config)?;
        let feeds = processor.decode_feeds(&swi, &guidance)?;
        let result = processor.run_adjusted(&feeds, &catalog, &adjustments, &cancel)?;
        Ok(result)
    })
    .await
    .context("processing task panicked")??;

    Ok(result)
}

/// Write `result` as pretty JSON to `output`, or to stdout.
pub async fn write_result(result: &RunResult, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_vec_pretty(result).context("serializing result")?;
    match output {
        Some(path) => {
            tokio::fs::write(path, &json)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), size = json.len(), "Wrote result");
        }
        None => {
            use tokio::io::AsyncWriteExt;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&json).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
