//! Decoder for the JMA soil-water-index and rainfall guidance GRIB2 feeds.
//!
//! Both feeds are single GRIB2 messages whose data sections use the JMA
//! run-length level coding (data representation template 5.200). Only the
//! product subtypes carried by those two feeds are understood:
//!
//! - the soil-water-index feed holds the total index plus the first and
//!   second tank storages, decoded by [`decode_saturation`];
//! - the guidance feed packs several overlapping forecast cycles of 3-hourly
//!   rainfall back-to-back, from which [`decode_guidance`] keeps a single
//!   canonical cycle.
//!
//! Decoding is strictly sequential within a buffer: every section offset
//! depends on the length of the previous section.

pub mod error;
pub mod guidance;
pub mod sections;
pub mod swi;
pub mod unpacking;

pub use error::{Grib2Error, Grib2Result};
pub use guidance::{decode_guidance, ForecastLayout, ForecastSeries, GuidanceFeed};
pub use sections::{parse_header, Section, SectionReader};
pub use swi::{decode_saturation, SaturationFeed, SaturationKind};
pub use unpacking::{decode_runlength, RunLengthParams};
