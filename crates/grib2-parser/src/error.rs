//! Error types for feed decoding.

use swi_common::GridError;
use thiserror::Error;

pub type Grib2Result<T> = Result<T, Grib2Error>;

/// Errors raised while decoding a feed buffer. All of them are fatal for the
/// feed being decoded.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Grib2Error {
    #[error("read of {len} bytes at offset {offset} exceeds buffer of {size} bytes")]
    TruncatedBuffer {
        offset: usize,
        len: usize,
        size: usize,
    },

    #[error("invalid section {section}: {reason}")]
    HeaderDecode { section: u8, reason: String },

    #[error("expected section {expected} at offset {offset}, found section {found}")]
    UnexpectedSection {
        expected: u8,
        found: u8,
        offset: usize,
    },

    #[error("unsupported data representation template 5.{0}")]
    UnsupportedTemplate(u16),

    #[error("payload length mismatch: {0}")]
    PayloadLength(String),

    #[error("forecast feed retained {found} of {expected} required steps")]
    IncompleteForecast { expected: usize, found: usize },

    #[error("saturation feed has no {0} dataset")]
    MissingDataset(&'static str),

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl Grib2Error {
    pub fn header(section: u8, reason: impl Into<String>) -> Self {
        Self::HeaderDecode {
            section,
            reason: reason.into(),
        }
    }

    pub fn payload(reason: impl Into<String>) -> Self {
        Self::PayloadLength(reason.into())
    }
}
