//! Configuration for the hazard processor.

use crate::error::{ProcessorError, Result};
use grib2_parser::ForecastLayout;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tank_model::TankParams;

/// Configuration for a [`HazardProcessor`](crate::HazardProcessor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Worker threads for per-mesh simulation; 0 uses one per core.
    pub worker_threads: usize,

    /// Forecast cycle retained from the guidance feed. Its step is also the
    /// simulation step.
    pub forecast: ForecastLayout,

    /// Tank model parameters.
    pub tank: TankParams,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            forecast: ForecastLayout::default(),
            tank: TankParams::default(),
        }
    }
}

impl ProcessorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("SWI_WORKER_THREADS") {
            if let Ok(threads) = val.parse() {
                self.worker_threads = threads;
            }
        }

        if let Ok(val) = std::env::var("SWI_STEP_HOURS") {
            if let Ok(hours) = val.parse() {
                self.forecast.step_hours = hours;
            }
        }

        if let Ok(val) = std::env::var("SWI_FORECAST_STEPS") {
            if let Ok(steps) = val.parse() {
                self.forecast.steps = steps;
            }
        }

        if let Ok(val) = std::env::var("SWI_FORECAST_CYCLE") {
            if let Ok(cycle) = val.parse() {
                self.forecast.cycle = cycle;
            }
        }

        self
    }

    /// Load configuration from a YAML file. Missing fields take their
    /// defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProcessorError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ProcessorError::config(format!("invalid YAML configuration: {}", e)))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.forecast.validate()?;
        self.tank.validate(self.step_hours())?;
        Ok(())
    }

    /// Simulation step in hours.
    pub fn step_hours(&self) -> f64 {
        f64::from(self.forecast.step_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProcessorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.step_hours(), 3.0);
        assert_eq!(config.forecast.steps, 26);
    }

    #[test]
    fn test_yaml_partial_override() {
        let config = ProcessorConfig::from_yaml_str(
            "worker_threads: 4\ntank:\n  l1: 20.0\nforecast:\n  steps: 8\n",
        )
        .unwrap();
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.tank.l1, 20.0);
        assert_eq!(config.tank.l2, 60.0);
        assert_eq!(config.forecast.steps, 8);
        assert_eq!(config.forecast.step_hours, 3);
    }

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "worker_threads: 2").unwrap();
        let config = ProcessorConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.worker_threads, 2);
    }

    #[test]
    fn test_missing_yaml_file() {
        assert!(matches!(
            ProcessorConfig::from_yaml_file("/nonexistent/swi.yaml"),
            Err(ProcessorError::Config(_))
        ));
    }

    #[test]
    fn test_oversized_forecast_rejected() {
        let mut config = ProcessorConfig::default();
        config.forecast.steps = usize::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_tank_params_rejected() {
        let mut config = ProcessorConfig::default();
        config.tank.b1 = 0.5;
        assert!(config.validate().is_err());
    }
}
