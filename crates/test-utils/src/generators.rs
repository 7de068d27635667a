//! Encoders and section writers for synthetic feeds.
//!
//! The output follows the byte layout the decoder reads: every section is a
//! 4-byte length and a 1-byte number followed by its fields, and run-length
//! payloads use the JMA level coding.

/// A grid definition as written into section 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedGrid {
    pub x_num: u32,
    pub y_num: u32,
    /// Northern edge, micro-degrees.
    pub s_lat: i32,
    /// Western edge, micro-degrees.
    pub s_lon: i32,
    pub d_lat: i32,
    pub d_lon: i32,
}

impl FeedGrid {
    pub fn new(x_num: u32, y_num: u32, s_lat: i32, s_lon: i32, d_lat: i32, d_lon: i32) -> Self {
        Self {
            x_num,
            y_num,
            s_lat,
            s_lon,
            d_lat,
            d_lon,
        }
    }

    pub fn grid_num(&self) -> u32 {
        self.x_num * self.y_num
    }

    pub fn e_lat(&self) -> i32 {
        self.s_lat - (self.y_num as i32 - 1) * self.d_lat
    }

    pub fn e_lon(&self) -> i32 {
        self.s_lon + (self.x_num as i32 - 1) * self.d_lon
    }

    /// A grid of `grid_num` copies of `value`.
    pub fn constant(&self, value: i32) -> Vec<i32> {
        vec![value; self.grid_num() as usize]
    }

    /// A constant grid with `value` overridden at `index`.
    pub fn with_point(&self, base: i32, index: usize, value: i32) -> Vec<i32> {
        let mut values = self.constant(base);
        values[index] = value;
        values
    }
}

/// A level table plus the run-length coded payload of one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRunLength {
    pub bit_num: u8,
    /// Table entries 1..=level_max, in order of first appearance.
    pub levels: Vec<i32>,
    /// Declared table size; `None` declares exactly `level_max` entries.
    pub level_num: Option<u16>,
    pub payload: Vec<u8>,
}

impl EncodedRunLength {
    pub fn level_max(&self) -> u16 {
        self.levels.len() as u16
    }

    pub fn level_num(&self) -> u16 {
        self.level_num.unwrap_or_else(|| self.level_max())
    }

    /// Declare a table of `level_num` entries, whether or not they are filled.
    pub fn with_level_num(mut self, level_num: u16) -> Self {
        self.level_num = Some(level_num);
        self
    }
}

/// Run-length encode `values` with `bit_num`-bit codes.
///
/// Each run is written as the 1-based level index of its value, followed by
/// its extra repetitions as base `2^bit_num - 1 - level_max` digits, least
/// significant first.
///
/// # Panics
///
/// Panics if the distinct values do not fit the codes, if a repeat has to be
/// written but fewer than two digit codes are left, or if a value does not
/// fit a 16-bit level entry.
pub fn encode_runlength(values: &[i32], bit_num: u8) -> EncodedRunLength {
    let mut levels: Vec<i32> = Vec::new();
    for &value in values {
        assert!(
            (-32768..=32767).contains(&value),
            "value {} does not fit a level entry",
            value
        );
        if !levels.contains(&value) {
            levels.push(value);
        }
    }

    let max_code = (1u64 << bit_num) - 1;
    let level_max = levels.len() as u64;
    assert!(
        level_max <= max_code,
        "{} levels do not fit {}-bit codes",
        level_max,
        bit_num
    );
    let base = max_code - level_max;

    let mut codes = Vec::new();
    let mut i = 0;
    while i < values.len() {
        let value = values[i];
        let mut run = 1;
        while i + run < values.len() && values[i + run] == value {
            run += 1;
        }

        let index = levels.iter().position(|&l| l == value).unwrap_or(0) as u64 + 1;
        codes.push(index);
        let mut extra = (run - 1) as u64;
        assert!(
            extra == 0 || base >= 2,
            "{} levels leave no run-length digits in {}-bit codes",
            level_max,
            bit_num
        );
        while extra > 0 {
            codes.push(level_max + 1 + extra % base);
            extra /= base;
        }
        i += run;
    }

    EncodedRunLength {
        bit_num,
        levels,
        level_num: None,
        payload: pack_codes(&codes, bit_num),
    }
}

/// Pack codes MSB-first, zero-padding the final byte.
pub fn pack_codes(codes: &[u64], bit_num: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(codes.len() * bit_num as usize / 8 + 1);
    let mut acc = 0u8;
    let mut filled = 0;
    for &code in codes {
        for shift in (0..bit_num).rev() {
            acc = (acc << 1) | ((code >> shift) & 1) as u8;
            filled += 1;
            if filled == 8 {
                out.push(acc);
                acc = 0;
                filled = 0;
            }
        }
    }
    if filled > 0 {
        out.push(acc << (8 - filled));
    }
    out
}

/// Sign-magnitude encoding of a coordinate field.
pub fn grib2_signed(value: i32) -> [u8; 4] {
    let magnitude = value.unsigned_abs() & 0x7FFF_FFFF;
    let raw = if value < 0 {
        magnitude | 0x8000_0000
    } else {
        magnitude
    };
    raw.to_be_bytes()
}

fn section(number: u8, length: usize) -> Vec<u8> {
    let mut section = vec![0u8; length];
    section[0..4].copy_from_slice(&(length as u32).to_be_bytes());
    section[4] = number;
    section
}

/// Section 1 carrying the reference time.
pub fn identification_section(year: u16, month: u8, day: u8, hour: u8, minute: u8) -> Vec<u8> {
    let mut s = section(1, 21);
    s[5..7].copy_from_slice(&34u16.to_be_bytes()); // Tokyo
    s[12..14].copy_from_slice(&year.to_be_bytes());
    s[14] = month;
    s[15] = day;
    s[16] = hour;
    s[17] = minute;
    s[18] = 0;
    s
}

/// Section 2, local use.
pub fn local_use_section() -> Vec<u8> {
    let mut s = section(2, 8);
    s[5..8].copy_from_slice(b"JMA");
    s
}

/// Section 3, latitude/longitude grid (template 3.0 layout).
pub fn grid_section(grid: &FeedGrid) -> Vec<u8> {
    let mut s = section(3, 72);
    s[6..10].copy_from_slice(&grid.grid_num().to_be_bytes());
    s[14] = 4; // Shape of the Earth: GRS80
    s[30..34].copy_from_slice(&grid.x_num.to_be_bytes());
    s[34..38].copy_from_slice(&grid.y_num.to_be_bytes());
    s[42..46].copy_from_slice(&0xFFFF_FFFFu32.to_be_bytes());
    s[46..50].copy_from_slice(&grib2_signed(grid.s_lat));
    s[50..54].copy_from_slice(&grib2_signed(grid.s_lon));
    s[54] = 48;
    s[55..59].copy_from_slice(&grib2_signed(grid.e_lat()));
    s[59..63].copy_from_slice(&grib2_signed(grid.e_lon()));
    s[63..67].copy_from_slice(&grib2_signed(grid.d_lon));
    s[67..71].copy_from_slice(&grib2_signed(grid.d_lat));
    s
}

/// Section 4 of a soil-water-index dataset.
pub fn saturation_product_section(data_type: u8, subtype: u32) -> Vec<u8> {
    let mut s = section(4, 34);
    s[7..9].copy_from_slice(&50000u16.to_be_bytes());
    s[22] = data_type;
    s[24..28].copy_from_slice(&subtype.to_be_bytes());
    s
}

/// Section 4 of a guidance dataset: forecast start at +18, span at +49.
pub fn guidance_product_section(start: u32, span: u32) -> Vec<u8> {
    let mut s = section(4, 58);
    s[7..9].copy_from_slice(&8u16.to_be_bytes());
    s[9] = 1; // Moisture
    s[10] = 8; // Total precipitation
    s[17] = 1; // Hours
    s[18..22].copy_from_slice(&start.to_be_bytes());
    s[49..53].copy_from_slice(&span.to_be_bytes());
    s
}

/// Section 5, template 5.200, carrying the level table.
pub fn representation_section(encoded: &EncodedRunLength, grid_num: u32) -> Vec<u8> {
    let level_max = encoded.level_max();
    let mut s = section(5, 17 + 2 * level_max as usize);
    s[5..9].copy_from_slice(&grid_num.to_be_bytes());
    s[9..11].copy_from_slice(&200u16.to_be_bytes());
    s[11] = encoded.bit_num;
    s[12..14].copy_from_slice(&level_max.to_be_bytes());
    s[14..16].copy_from_slice(&encoded.level_num().to_be_bytes());
    for (i, &level) in encoded.levels.iter().enumerate() {
        let at = 15 + 2 * (i + 1);
        s[at..at + 2].copy_from_slice(&(level as i16 as u16).to_be_bytes());
    }
    s
}

/// Section 6 with no bitmap.
pub fn bitmap_section() -> Vec<u8> {
    let mut s = section(6, 6);
    s[5] = 255;
    s
}

/// Section 7 wrapping a payload.
pub fn data_section(payload: &[u8]) -> Vec<u8> {
    let mut s = section(7, 5);
    s.extend_from_slice(payload);
    let length = s.len() as u32;
    s[0..4].copy_from_slice(&length.to_be_bytes());
    s
}

/// Wrap sections into a message: indicator, sections, "7777".
pub fn assemble_message(sections: &[Vec<u8>]) -> Vec<u8> {
    let body: usize = sections.iter().map(Vec::len).sum();
    let total = 16 + body + 4;

    let mut message = Vec::with_capacity(total);
    message.extend_from_slice(b"GRIB");
    message.extend_from_slice(&[0, 0]);
    message.push(0); // Discipline: meteorological
    message.push(2); // Edition 2
    message.extend_from_slice(&(total as u64).to_be_bytes());
    for section in sections {
        message.extend_from_slice(section);
    }
    message.extend_from_slice(b"7777");
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_runs() {
        let encoded = encode_runlength(&[5, 5, 5, 7, 5], 8);
        assert_eq!(encoded.levels, vec![5, 7]);
        // base 253: run of 3 is level 1 + digit 2 (code 2 + 1 + 2)
        assert_eq!(encoded.payload, vec![1, 5, 2, 1]);
    }

    #[test]
    fn test_literal_only_encoding_fills_every_code() {
        let values: Vec<i32> = (0..30).map(|i| i % 15 + 1).collect();
        let encoded = encode_runlength(&values, 4);
        assert_eq!(encoded.level_max(), 15);
        assert_eq!(encoded.payload.len(), 15);
    }

    #[test]
    fn test_declared_table_size() {
        let encoded = encode_runlength(&[3, 4], 8).with_level_num(6);
        assert_eq!(encoded.level_num(), 6);

        let s = representation_section(&encoded, 2);
        assert_eq!(s.len(), 17 + 2 * 2);
        assert_eq!(&s[12..14], &2u16.to_be_bytes());
        assert_eq!(&s[14..16], &6u16.to_be_bytes());
    }

    #[test]
    fn test_pack_codes_pads_last_byte() {
        assert_eq!(pack_codes(&[1, 2, 3], 4), vec![0x12, 0x30]);
        assert_eq!(pack_codes(&[0xABC], 12), vec![0xAB, 0xC0]);
    }

    #[test]
    fn test_grib2_signed() {
        assert_eq!(grib2_signed(1), [0, 0, 0, 1]);
        assert_eq!(grib2_signed(-1), [0x80, 0, 0, 1]);
    }

    #[test]
    fn test_message_length() {
        let message = assemble_message(&[identification_section(2023, 6, 2, 0, 0)]);
        assert_eq!(message.len(), 16 + 21 + 4);
        assert_eq!(&message[8..16], &(41u64).to_be_bytes());
        assert_eq!(&message[message.len() - 4..], b"7777");
    }
}
