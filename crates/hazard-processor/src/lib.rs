//! Soil water index hazard processing.
//!
//! Combines the decoded soil-water-index and rainfall guidance feeds into
//! per-mesh saturation timelines and hazard levels, then regroups them by
//! the catalog's regions and areas.
//!
//! # Architecture
//!
//! ```text
//! SWI feed bytes        guidance feed bytes
//!      │                        │
//!      └──────────┬─────────────┘
//!                 ▼
//! HazardProcessor::decode_feeds (rayon::join)
//!                 │
//!                 ▼
//! HazardProcessor::run(feeds, catalog, cancel)
//!                 │
//!                 ├─► par_iter over catalog meshes
//!                 │         │
//!                 │         ├─► grid index in both feeds
//!                 │         ├─► tank model over the forecast steps
//!                 │         └─► risk level per hour
//!                 │
//!                 └─► assemble regions/areas in catalog order
//!                           │
//!                           ▼
//!                       RunResult
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hazard_processor::{CancellationToken, HazardProcessor, ProcessorConfig};
//!
//! let processor = HazardProcessor::new(ProcessorConfig::from_env())?;
//! let feeds = processor.decode_feeds(&swi_bytes, &guidance_bytes)?;
//! let result = processor.run(&feeds, &catalog, &CancellationToken::new())?;
//!
//! for mesh in result.meshes() {
//!     println!("{} peaks at {:?}", mesh.code, mesh.peak_risk());
//! }
//! ```

pub mod adjust;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod risk;
pub mod service;
pub mod types;

pub use adjust::{mesh_ratios, RainfallAdjustments};
pub use aggregate::{area_timelines, assemble, compute_mesh, timeline_hours, DecodedFeeds};
pub use config::ProcessorConfig;
pub use error::{ProcessorError, Result};
pub use risk::RiskLevel;
pub use service::{CancellationToken, HazardProcessor};
pub use types::{AreaResult, MeshResult, RegionResult, RiskPoint, RunResult, TimePoint};
