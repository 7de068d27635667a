//! Section walking and the grid header.
//!
//! A message is an indicator (section 0, 16 bytes) followed by
//! length-prefixed sections. Every section starts with its length (4 bytes)
//! and its number (1 byte). Field offsets below are 0-based and relative to
//! the start of the section they belong to.

use crate::error::{Grib2Error, Grib2Result};
use chrono::{NaiveDate, TimeZone, Utc};
use swi_common::GridInfo;
use tracing::debug;

/// Offset of the first section after the indicator.
pub const FIRST_SECTION_OFFSET: usize = 16;

/// Decode a GRIB2 sign-magnitude integer: the most significant bit is the
/// sign, the remaining 31 bits are the magnitude.
pub fn decode_grib2_signed(bytes: &[u8; 4]) -> i32 {
    let raw = u32::from_be_bytes(*bytes);
    let magnitude = (raw & 0x7FFF_FFFF) as i32;
    if raw & 0x8000_0000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Bounds-checked big-endian access to a feed buffer.
#[derive(Debug, Clone, Copy)]
pub struct SectionReader<'a> {
    data: &'a [u8],
}

impl<'a> SectionReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `len` bytes starting at absolute `offset`.
    pub fn bytes(&self, offset: usize, len: usize) -> Grib2Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(Grib2Error::TruncatedBuffer {
                offset,
                len,
                size: self.data.len(),
            })
    }

    fn array<const N: usize>(&self, offset: usize) -> Grib2Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(offset, N)?);
        Ok(out)
    }

    pub fn read_u8(&self, offset: usize) -> Grib2Result<u8> {
        Ok(self.bytes(offset, 1)?[0])
    }

    pub fn read_u16(&self, offset: usize) -> Grib2Result<u16> {
        self.array(offset).map(u16::from_be_bytes)
    }

    pub fn read_u32(&self, offset: usize) -> Grib2Result<u32> {
        self.array(offset).map(u32::from_be_bytes)
    }

    pub fn read_u64(&self, offset: usize) -> Grib2Result<u64> {
        self.array(offset).map(u64::from_be_bytes)
    }

    pub fn read_signed(&self, offset: usize) -> Grib2Result<i32> {
        self.array(offset).map(|bytes| decode_grib2_signed(&bytes))
    }

    /// The section starting at absolute `offset`.
    ///
    /// Fails with `TruncatedBuffer` if the section's declared length runs
    /// past the end of the buffer.
    pub fn section_at(&self, offset: usize) -> Grib2Result<Section<'a>> {
        let length = self.read_u32(offset)? as usize;
        let number = self.read_u8(offset + 4)?;

        if length < 5 {
            return Err(Grib2Error::header(
                number,
                format!("declared length {} at offset {}", length, offset),
            ));
        }
        self.bytes(offset, length)?;

        Ok(Section {
            reader: *self,
            offset,
            length,
            number,
        })
    }

    /// Like [`section_at`](Self::section_at), but the section must carry
    /// `number`.
    pub fn expect_section(&self, offset: usize, number: u8) -> Grib2Result<Section<'a>> {
        let section = self.section_at(offset)?;
        if section.number != number {
            return Err(Grib2Error::UnexpectedSection {
                expected: number,
                found: section.number,
                offset,
            });
        }
        Ok(section)
    }
}

/// One length-prefixed section of a message.
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    reader: SectionReader<'a>,
    pub offset: usize,
    pub length: usize,
    pub number: u8,
}

impl<'a> Section<'a> {
    /// Absolute offset of the section that follows this one.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Fail with `HeaderDecode` unless the section is at least `min` bytes.
    pub fn require_length(&self, min: usize) -> Grib2Result<()> {
        if self.length < min {
            return Err(Grib2Error::header(
                self.number,
                format!("length {} is shorter than the {} bytes required", self.length, min),
            ));
        }
        Ok(())
    }

    pub fn u8(&self, rel: usize) -> Grib2Result<u8> {
        self.reader.read_u8(self.offset + rel)
    }

    pub fn u16(&self, rel: usize) -> Grib2Result<u16> {
        self.reader.read_u16(self.offset + rel)
    }

    pub fn u32(&self, rel: usize) -> Grib2Result<u32> {
        self.reader.read_u32(self.offset + rel)
    }

    pub fn signed(&self, rel: usize) -> Grib2Result<i32> {
        self.reader.read_signed(self.offset + rel)
    }

    /// Bytes from `rel` to the end of the section.
    pub fn tail(&self, rel: usize) -> Grib2Result<&'a [u8]> {
        self.reader
            .bytes(self.offset + rel, self.length.saturating_sub(rel))
    }
}

/// Parse the indicator, identification and grid definition sections.
///
/// Returns the grid header, the offset of the first product definition
/// section and the total message size declared by the indicator.
pub fn parse_header(data: &[u8]) -> Grib2Result<(GridInfo, usize, usize)> {
    let reader = SectionReader::new(data);

    // Section 0: "GRIB", reserved, discipline, edition, 8-byte total length
    if reader.bytes(0, 4)? != b"GRIB" {
        return Err(Grib2Error::header(0, "missing GRIB magic"));
    }
    let edition = reader.read_u8(7)?;
    if edition != 2 {
        return Err(Grib2Error::header(0, format!("expected edition 2, got {}", edition)));
    }
    let total_size = usize::try_from(reader.read_u64(8)?)
        .map_err(|_| Grib2Error::header(0, "total length does not fit in memory"))?;
    if total_size < FIRST_SECTION_OFFSET {
        return Err(Grib2Error::header(
            0,
            format!("total length {} is shorter than the indicator", total_size),
        ));
    }

    // Section 1: reference time
    let ident = reader.expect_section(FIRST_SECTION_OFFSET, 1)?;
    ident.require_length(19)?;
    let year = ident.u16(12)?;
    let (month, day) = (ident.u8(14)?, ident.u8(15)?);
    let (hour, minute, second) = (ident.u8(16)?, ident.u8(17)?, ident.u8(18)?);
    let initial_time = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .and_then(|date| date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second)))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| {
            Grib2Error::header(
                1,
                format!(
                    "invalid reference time {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, minute, second
                ),
            )
        })?;

    // Section 2 (local use) is optional
    let mut position = ident.end();
    let next = reader.section_at(position)?;
    if next.number == 2 {
        position = next.end();
    }

    // Section 3: grid definition
    let grid = reader.expect_section(position, 3)?;
    grid.require_length(71)?;
    let info = GridInfo {
        initial_time,
        grid_num: grid.u32(6)?,
        x_num: grid.u32(30)?,
        y_num: grid.u32(34)?,
        s_lat: grid.signed(46)?,
        s_lon: grid.signed(50)?,
        e_lat: grid.signed(55)?,
        e_lon: grid.signed(59)?,
        d_lon: grid.signed(63)?,
        d_lat: grid.signed(67)?,
    };

    if !info.is_consistent() {
        return Err(Grib2Error::header(
            3,
            format!(
                "{} x {} points does not match declared count {}",
                info.x_num, info.y_num, info.grid_num
            ),
        ));
    }

    debug!(
        initial_time = %info.initial_time,
        grid_num = info.grid_num,
        x_num = info.x_num,
        y_num = info.y_num,
        "Parsed grid header"
    );

    Ok((info, grid.end(), total_size))
}
