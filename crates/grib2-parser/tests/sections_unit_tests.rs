//! Unit tests for section walking and grid header parsing.
//!
//! These tests don't require test data files; messages are synthesized with
//! the test-utils section writers.

use chrono::{TimeZone, Utc};
use grib2_parser::sections::decode_grib2_signed;
use grib2_parser::{parse_header, Grib2Error};
use test_utils::fixtures;
use test_utils::generators::{
    assemble_message, grid_section, identification_section, local_use_section, FeedGrid,
};

// ============================================================================
// decode_grib2_signed tests
// ============================================================================

#[test]
fn test_decode_grib2_signed_positive() {
    assert_eq!(decode_grib2_signed(&[0x00, 0x00, 0x00, 0x01]), 1);
    assert_eq!(decode_grib2_signed(&47_995_833_u32.to_be_bytes()), 47_995_833);
}

#[test]
fn test_decode_grib2_signed_negative() {
    // Sign-magnitude: MSB=1 means negative, not two's complement
    assert_eq!(decode_grib2_signed(&[0x80, 0x00, 0x00, 0x01]), -1);
    let with_sign = 8_333_u32 | 0x8000_0000;
    assert_eq!(decode_grib2_signed(&with_sign.to_be_bytes()), -8_333);
}

#[test]
fn test_decode_grib2_signed_negative_zero() {
    assert_eq!(decode_grib2_signed(&[0x80, 0x00, 0x00, 0x00]), 0);
}

// ============================================================================
// parse_header tests
// ============================================================================

fn header_message(grid: &FeedGrid) -> Vec<u8> {
    assemble_message(&[identification_section(2023, 6, 2, 3, 30), grid_section(grid)])
}

#[test]
fn test_parse_header_fields() {
    let grid = fixtures::saturation_grid();
    let data = header_message(&grid);

    let (info, next, total) = parse_header(&data).unwrap();

    assert_eq!(info.initial_time, Utc.with_ymd_and_hms(2023, 6, 2, 3, 30, 0).unwrap());
    assert_eq!(info.grid_num, 100);
    assert_eq!(info.x_num, 10);
    assert_eq!(info.y_num, 10);
    assert_eq!(info.s_lat, 34_933_333);
    assert_eq!(info.s_lon, 135_812_500);
    assert_eq!(info.e_lat, 34_933_333 - 9 * 8_333);
    assert_eq!(info.e_lon, 135_812_500 + 9 * 12_500);
    assert_eq!(info.d_lat, 8_333);
    assert_eq!(info.d_lon, 12_500);

    // Next section follows section 3; the total covers the trailing "7777"
    assert_eq!(next, 16 + 21 + 72);
    assert_eq!(total, data.len());
}

#[test]
fn test_parse_header_skips_local_use_section() {
    let grid = fixtures::guidance_grid();
    let data = assemble_message(&[
        identification_section(2023, 6, 2, 0, 0),
        local_use_section(),
        grid_section(&grid),
    ]);

    let (info, next, _) = parse_header(&data).unwrap();
    assert_eq!(info.grid_num, 36);
    assert_eq!(next, 16 + 21 + 8 + 72);
}

#[test]
fn test_parse_header_negative_coordinates() {
    let grid = FeedGrid::new(2, 2, -10_000_000, -20_000_000, 1_000_000, 1_000_000);
    let (info, _, _) = parse_header(&header_message(&grid)).unwrap();
    assert_eq!(info.s_lat, -10_000_000);
    assert_eq!(info.s_lon, -20_000_000);
}

#[test]
fn test_parse_header_rejects_inconsistent_grid_count() {
    let grid = fixtures::saturation_grid();
    let mut data = header_message(&grid);
    // grid_num lives at +6 of section 3
    let at = 16 + 21 + 6;
    data[at..at + 4].copy_from_slice(&99u32.to_be_bytes());

    assert!(matches!(
        parse_header(&data),
        Err(Grib2Error::HeaderDecode { section: 3, .. })
    ));
}

#[test]
fn test_parse_header_rejects_invalid_date() {
    let grid = fixtures::saturation_grid();
    let data = assemble_message(&[identification_section(2023, 13, 2, 0, 0), grid_section(&grid)]);
    assert!(matches!(
        parse_header(&data),
        Err(Grib2Error::HeaderDecode { section: 1, .. })
    ));
}

#[test]
fn test_parse_header_rejects_missing_magic() {
    let grid = fixtures::saturation_grid();
    let mut data = header_message(&grid);
    data[0..4].copy_from_slice(b"BUFR");
    assert!(matches!(
        parse_header(&data),
        Err(Grib2Error::HeaderDecode { section: 0, .. })
    ));
}

#[test]
fn test_parse_header_truncated_in_grid_section() {
    let grid = fixtures::saturation_grid();
    let data = header_message(&grid);
    let truncated = &data[..16 + 21 + 40];
    assert!(matches!(
        parse_header(truncated),
        Err(Grib2Error::TruncatedBuffer { .. })
    ));
}

#[test]
fn test_parse_header_wrong_section_order() {
    let grid = fixtures::saturation_grid();
    let data = assemble_message(&[grid_section(&grid), identification_section(2023, 6, 2, 0, 0)]);
    assert!(matches!(
        parse_header(&data),
        Err(Grib2Error::UnexpectedSection {
            expected: 1,
            found: 3,
            ..
        })
    ));
}
