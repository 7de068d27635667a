//! Run-length level coding (data representation template 5.200).
//!
//! The payload is a stream of `bit_num`-bit codes. A code no greater than
//! `level_max` is a literal and emits `level[code]`. Larger codes are digits
//! of a repeat count in base `2^bit_num - 1 - level_max`, least significant
//! digit first; the run repeats the preceding literal that many extra times.

use crate::error::{Grib2Error, Grib2Result};
use crate::sections::{Section, SectionReader};
use tracing::debug;

/// Data representation template number of run-length level coding.
pub const RUNLENGTH_TEMPLATE: u16 = 200;

/// Decoding parameters read from a section 5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLengthParams {
    pub bit_num: u8,
    pub level_max: u16,
    pub level_num: u16,
    /// `level_num + 1` entries; entry 0 and entries past `level_max` are 0.
    pub levels: Vec<i32>,
}

impl RunLengthParams {
    /// Read the parameters and the level table from a data representation
    /// section.
    pub fn from_section(section: &Section<'_>) -> Grib2Result<Self> {
        section.require_length(17)?;

        let template = section.u16(9)?;
        if template != RUNLENGTH_TEMPLATE {
            return Err(Grib2Error::UnsupportedTemplate(template));
        }

        let bit_num = section.u8(11)?;
        let level_max = section.u16(12)?;
        let level_num = section.u16(14)?;

        if !(1..=32).contains(&bit_num) {
            return Err(Grib2Error::header(5, format!("unsupported code width {}", bit_num)));
        }
        if level_max > level_num {
            return Err(Grib2Error::header(
                5,
                format!("level_max {} exceeds level_num {}", level_max, level_num),
            ));
        }
        section.require_length(17 + 2 * usize::from(level_max))?;

        let mut levels = vec![0i32; usize::from(level_num) + 1];
        for (i, level) in levels
            .iter_mut()
            .enumerate()
            .take(usize::from(level_max) + 1)
            .skip(1)
        {
            *level = sign_corrected(section.u16(15 + 2 * i)?);
        }

        Ok(Self {
            bit_num,
            level_max,
            level_num,
            levels,
        })
    }

    /// Base of the run-length digits. Below 2 the table leaves no usable
    /// digit codes and every valid payload is literals only.
    pub fn digit_base(&self) -> u64 {
        (1u64 << self.bit_num)
            .saturating_sub(1)
            .saturating_sub(u64::from(self.level_max))
    }
}

/// Level table entries are 16-bit; the upper half of the range is negative.
fn sign_corrected(raw: u16) -> i32 {
    let value = i32::from(raw);
    if value >= 0x8000 {
        value - 0x1_0000
    } else {
        value
    }
}

/// MSB-first reader of fixed-width codes.
struct CodeReader<'a> {
    data: &'a [u8],
    width: usize,
    bit: usize,
}

impl<'a> CodeReader<'a> {
    fn new(data: &'a [u8], width: u8) -> Self {
        Self {
            data,
            width: usize::from(width),
            bit: 0,
        }
    }

    fn remaining_bits(&self) -> usize {
        self.data.len() * 8 - self.bit
    }

    fn next_code(&mut self) -> Option<u32> {
        if self.remaining_bits() < self.width {
            return None;
        }

        let mut code = 0u32;
        for _ in 0..self.width {
            let byte = self.data[self.bit / 8];
            let bit = (byte >> (7 - self.bit % 8)) & 1;
            code = (code << 1) | u32::from(bit);
            self.bit += 1;
        }
        Some(code)
    }
}

/// Pending repetition of the last literal.
struct Run {
    count: u64,
    place: u64,
}

impl Run {
    fn new() -> Self {
        Self { count: 0, place: 1 }
    }

    fn push_digit(&mut self, digit: u64, base: u64) -> Grib2Result<()> {
        let overflow = || Grib2Error::payload("run length overflows");
        self.count = digit
            .checked_mul(self.place)
            .and_then(|v| v.checked_add(self.count))
            .ok_or_else(overflow)?;
        self.place = self.place.checked_mul(base).ok_or_else(overflow)?;
        Ok(())
    }

    fn flush(&mut self, values: &mut Vec<i32>, grid_num: usize) -> Grib2Result<()> {
        if self.count == 0 {
            *self = Self::new();
            return Ok(());
        }
        let Some(&last) = values.last() else {
            return Err(Grib2Error::payload("run length before any level code"));
        };
        let target = usize::try_from(self.count)
            .ok()
            .and_then(|count| count.checked_add(values.len()))
            .filter(|&target| target <= grid_num)
            .ok_or_else(|| {
                Grib2Error::payload(format!(
                    "run of {} after {} values exceeds {} grid points",
                    self.count,
                    values.len(),
                    grid_num
                ))
            })?;
        values.resize(target, last);
        *self = Self::new();
        Ok(())
    }
}

/// Expand a run-length coded payload into exactly `grid_num` values.
pub fn decode_runlength(
    payload: &[u8],
    params: &RunLengthParams,
    grid_num: usize,
) -> Grib2Result<Vec<i32>> {
    let level_max = u32::from(params.level_max);
    let base = params.digit_base();
    let mut codes = CodeReader::new(payload, params.bit_num);
    let mut values = Vec::with_capacity(grid_num);
    let mut run = Run::new();

    loop {
        // Anything shorter than a byte after the last value is padding
        if values.len() as u64 + run.count == grid_num as u64 && codes.remaining_bits() < 8 {
            break;
        }
        let Some(code) = codes.next_code() else {
            break;
        };

        if code <= level_max {
            run.flush(&mut values, grid_num)?;
            if values.len() == grid_num {
                return Err(Grib2Error::payload(format!(
                    "level code after all {} grid points were filled",
                    grid_num
                )));
            }
            values.push(params.levels[code as usize]);
        } else {
            if values.is_empty() {
                return Err(Grib2Error::payload("run length before any level code"));
            }
            if base < 2 {
                return Err(Grib2Error::payload(format!(
                    "code {} is above level {} but {} bit codes leave no run-length digits",
                    code, level_max, params.bit_num
                )));
            }
            run.push_digit(u64::from(code - level_max - 1), base)?;
        }
    }
    run.flush(&mut values, grid_num)?;

    if values.len() != grid_num {
        return Err(Grib2Error::payload(format!(
            "payload expands to {} values, expected {}",
            values.len(),
            grid_num
        )));
    }
    if codes.remaining_bits() >= 8 {
        return Err(Grib2Error::payload(format!(
            "{} unread bits after the last grid point",
            codes.remaining_bits()
        )));
    }

    Ok(values)
}

/// Decode the data representation (5), optional bitmap (6) and data (7)
/// sections starting at `offset`. Returns the values and the offset after
/// section 7.
pub fn decode_dataset(
    reader: &SectionReader<'_>,
    offset: usize,
    grid_num: usize,
) -> Grib2Result<(Vec<i32>, usize)> {
    let repr = reader.expect_section(offset, 5)?;
    let params = RunLengthParams::from_section(&repr)?;

    let data = data_section_after(reader, repr.end())?;
    let values = decode_runlength(data.tail(5)?, &params, grid_num)?;

    debug!(
        offset,
        bit_num = params.bit_num,
        level_max = params.level_max,
        level_num = params.level_num,
        "Decoded run-length dataset"
    );

    Ok((values, data.end()))
}

/// Walk past a dataset without expanding its payload.
pub fn skip_dataset(reader: &SectionReader<'_>, offset: usize) -> Grib2Result<usize> {
    let repr = reader.expect_section(offset, 5)?;
    Ok(data_section_after(reader, repr.end())?.end())
}

fn data_section_after<'a>(reader: &SectionReader<'a>, offset: usize) -> Grib2Result<Section<'a>> {
    let section = reader.section_at(offset)?;
    if section.number == 6 {
        return reader.expect_section(section.end(), 7);
    }
    reader.expect_section(offset, 7)
}
