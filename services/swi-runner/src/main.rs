//! Soil water index hazard runner.
//!
//! Reads a soil-water-index feed, a rainfall guidance feed and a mesh
//! catalog, simulates every mesh and writes the result as JSON.

mod config;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use hazard_processor::CancellationToken;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use config::load_processor_config;
use pipeline::{execute, write_result, RunInputs};

#[derive(Parser, Debug)]
#[command(name = "swi-runner")]
#[command(about = "Soil water index hazard simulation over JMA feeds")]
struct Args {
    /// Soil water index feed
    #[arg(long, env = "SWI_FEED")]
    swi: PathBuf,

    /// Rainfall guidance feed
    #[arg(long, env = "SWI_GUIDANCE_FEED")]
    guidance: PathBuf,

    /// Mesh catalog (JSON)
    #[arg(long, env = "SWI_CATALOG")]
    catalog: PathBuf,

    /// Processor configuration (YAML)
    #[arg(short, long, env = "SWI_CONFIG")]
    config: Option<PathBuf>,

    /// Adjusted area rainfall (JSON)
    #[arg(long, env = "SWI_ADJUSTMENTS")]
    adjustments: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long, env = "SWI_OUTPUT")]
    output: Option<PathBuf>,

    /// Log level, used when RUST_LOG is unset
    #[arg(long, env = "SWI_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr so stdout stays clean for the JSON result
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!("Starting soil water index run");

    let config = load_processor_config(args.config.as_deref())?;
    info!(
        worker_threads = config.worker_threads,
        steps = config.forecast.steps,
        "Loaded configuration"
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            on_signal.cancel();
        }
    });

    let inputs = RunInputs {
        swi: args.swi,
        guidance: args.guidance,
        catalog: args.catalog,
        adjustments: args.adjustments,
    };

    let result = match execute(&inputs, config, cancel).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Run failed");
            return Err(e);
        }
    };

    write_result(&result, args.output.as_deref()).await?;
    info!(meshes = result.mesh_count(), "Run finished");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let args = Args::try_parse_from([
            "swi-runner",
            "--swi",
            "swi.bin",
            "--guidance",
            "guidance.bin",
            "--catalog",
            "catalog.json",
            "-o",
            "out.json",
        ])
        .unwrap();
        assert_eq!(args.swi, PathBuf::from("swi.bin"));
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
        assert!(args.adjustments.is_none());
    }
}
