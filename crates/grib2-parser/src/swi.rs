//! Soil-water-index feed: total index plus the first and second tank storages.

use crate::error::{Grib2Error, Grib2Result};
use crate::sections::{parse_header, SectionReader};
use crate::unpacking::{decode_dataset, skip_dataset};
use swi_common::{DenseGrid, GridInfo};
use tracing::{debug, warn};

/// Dataset kinds carried by the soil-water-index feed, identified by the
/// product definition's data type (+22) and subtype (+24).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaturationKind {
    Total,
    FirstTank,
    SecondTank,
}

impl SaturationKind {
    pub fn from_product(data_type: u8, subtype: u32) -> Option<Self> {
        match (data_type, subtype) {
            (200, _) => Some(Self::Total),
            (201, 1) => Some(Self::FirstTank),
            (201, 2) => Some(Self::SecondTank),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Total => "total soil water index",
            Self::FirstTank => "first tank",
            Self::SecondTank => "second tank",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Decoded soil-water-index feed. Values are raw: tenths of a millimetre.
#[derive(Debug, Clone, PartialEq)]
pub struct SaturationFeed {
    pub info: GridInfo,
    pub total: DenseGrid,
    pub first_tank: DenseGrid,
    pub second_tank: DenseGrid,
    /// Datasets skipped because their kind was already decoded.
    pub discarded: usize,
}

/// Decode a soil-water-index feed.
///
/// The first dataset of each kind wins; a repeated kind is walked over and
/// discarded. Decoding stops once all three kinds are present or at the first
/// product the feed is not expected to carry. Product sections after the
/// third kind are only walked to report repeats; a malformed tail ends that
/// walk without failing the decode.
pub fn decode_saturation(data: &[u8]) -> Grib2Result<SaturationFeed> {
    let (info, mut position, total_size) = parse_header(data)?;
    let reader = SectionReader::new(data);
    let grid_num = info.len();
    let mut slots: [Option<DenseGrid>; 3] = [None, None, None];
    let mut discarded = 0;

    while position + 4 < total_size {
        let product = reader.expect_section(position, 4)?;
        product.require_length(28)?;
        let data_type = product.u8(22)?;
        let subtype = product.u32(24)?;
        position = product.end();

        let Some(kind) = SaturationKind::from_product(data_type, subtype) else {
            warn!(data_type, subtype, offset = product.offset, "Unknown product, stopping scan");
            break;
        };

        if slots[kind.slot()].is_some() {
            warn!(kind = kind.name(), offset = product.offset, "Discarding repeated dataset");
            position = skip_dataset(&reader, position)?;
            discarded += 1;
            continue;
        }

        let (values, next) = decode_dataset(&reader, position, grid_num)?;
        slots[kind.slot()] = Some(DenseGrid::new(values, grid_num)?);
        position = next;
        debug!(kind = kind.name(), "Decoded saturation dataset");

        if slots.iter().all(Option::is_some) {
            discarded += trailing_repeats(&reader, position, total_size);
            break;
        }
    }

    let [total, first_tank, second_tank] = slots;
    Ok(SaturationFeed {
        info,
        total: total.ok_or(Grib2Error::MissingDataset(SaturationKind::Total.name()))?,
        first_tank: first_tank.ok_or(Grib2Error::MissingDataset(SaturationKind::FirstTank.name()))?,
        second_tank: second_tank
            .ok_or(Grib2Error::MissingDataset(SaturationKind::SecondTank.name()))?,
        discarded,
    })
}

/// Count the datasets after `position`, all of them repeats of a decoded kind.
fn trailing_repeats(reader: &SectionReader<'_>, mut position: usize, total_size: usize) -> usize {
    let mut repeats = 0;
    while position + 4 < total_size {
        let walked = reader.expect_section(position, 4).and_then(|product| {
            product.require_length(28)?;
            let kind = SaturationKind::from_product(product.u8(22)?, product.u32(24)?);
            let next = match kind {
                Some(_) => Some(skip_dataset(reader, product.end())?),
                None => None,
            };
            Ok((product.offset, kind, next))
        });

        match walked {
            Ok((offset, Some(kind), Some(next))) => {
                warn!(kind = kind.name(), offset, "Discarding repeated dataset");
                repeats += 1;
                position = next;
            }
            Ok(_) => break,
            Err(e) => {
                debug!(error = %e, offset = position, "Stopped walking trailing sections");
                break;
            }
        }
    }
    repeats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_kinds() {
        assert_eq!(SaturationKind::from_product(200, 0), Some(SaturationKind::Total));
        assert_eq!(SaturationKind::from_product(201, 1), Some(SaturationKind::FirstTank));
        assert_eq!(SaturationKind::from_product(201, 2), Some(SaturationKind::SecondTank));
        assert_eq!(SaturationKind::from_product(201, 3), None);
        assert_eq!(SaturationKind::from_product(1, 0), None);
    }
}
