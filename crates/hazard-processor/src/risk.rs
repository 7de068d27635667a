//! Hazard classification of soil water index values.

use serde::{Deserialize, Serialize};
use swi_common::HazardThresholds;

/// Hazard level of a mesh at one forecast hour, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    None,
    Advisory,
    Warning,
    Landslide,
}

impl RiskLevel {
    /// Classify `saturation` against a mesh's boundaries. A value on a
    /// boundary belongs to the level above it.
    pub fn classify(saturation: f64, thresholds: &HazardThresholds) -> Self {
        if saturation >= thresholds.landslide_bound {
            Self::Landslide
        } else if saturation >= thresholds.warning_bound {
            Self::Warning
        } else if saturation >= thresholds.advisory_bound {
            Self::Advisory
        } else {
            Self::None
        }
    }

    /// Numeric level, 0 (none) to 3 (landslide).
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}
