//! Binary sample blobs
//!
//! Each blob holds one weekday of per-minute readings:
//!
//! - byte 0: series tag (`T` temperature, `U` humidity)
//! - byte 1: weekday id (0..=6)
//! - bytes 2..10: unused header
//! - bytes 10..1450: one sample per minute
//!
//! Humidity samples pack the heater state into the high bit; that is split
//! out here into [`HumiditySample`].

extern crate alloc;

use alloc::vec::Vec;

use super::{ProtocolError, ProtocolResult, Weekday};

/// Exact length of a sample blob in bytes
pub const SAMPLE_FRAME_LEN: usize = 1450;

/// Header bytes preceding the samples
pub const SAMPLE_HEADER_LEN: usize = 10;

/// Samples per blob, one per minute of the day
pub const MINUTES_PER_DAY: usize = SAMPLE_FRAME_LEN - SAMPLE_HEADER_LEN;

const WEEKDAY_OFFSET: usize = 1;
const HUMIDITY_PERCENT_MASK: u8 = 0x7f;
const HEATER_ON_BIT: u8 = 0x80;

/// Which series a blob carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// Decitemp readings
    Temperature,
    /// Relative humidity plus heater state
    Humidity,
}

impl SeriesKind {
    /// Wire tag of this series
    pub const fn tag(self) -> u8 {
        match self {
            Self::Temperature => b'T',
            Self::Humidity => b'U',
        }
    }

    const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'T' => Some(Self::Temperature),
            b'U' => Some(Self::Humidity),
            _ => None,
        }
    }
}

/// One minute of humidity history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HumiditySample {
    /// Relative humidity, 0..=100 %
    pub percent: u8,
    /// Whether the heater was running during this minute
    pub heater_on: bool,
}

impl HumiditySample {
    /// Split a raw wire byte
    pub const fn from_raw(raw: u8) -> Self {
        Self {
            percent: raw & HUMIDITY_PERCENT_MASK,
            heater_on: raw & HEATER_ON_BIT != 0,
        }
    }
}

/// Decoded samples of one blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleSeries {
    /// Decitemp per minute
    Temperature(Vec<u8>),
    /// Humidity and heater state per minute
    Humidity(Vec<HumiditySample>),
}

/// A validated sample blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFrame {
    pub weekday: Weekday,
    pub series: SampleSeries,
}

impl SampleFrame {
    /// Validate and decode a binary blob
    ///
    /// Accepted only when the tag is `T` or `U`, the length is exactly
    /// [`SAMPLE_FRAME_LEN`], and the weekday id is below 7.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        let tag = *bytes.first().ok_or(ProtocolError::Empty)?;
        let kind = SeriesKind::from_tag(tag).ok_or(ProtocolError::UnknownTag { tag })?;

        if bytes.len() != SAMPLE_FRAME_LEN {
            return Err(ProtocolError::Length {
                expected: SAMPLE_FRAME_LEN,
                actual: bytes.len(),
            });
        }
        let weekday = Weekday::try_from(bytes[WEEKDAY_OFFSET])?;

        let samples = &bytes[SAMPLE_HEADER_LEN..];
        let series = match kind {
            SeriesKind::Temperature => SampleSeries::Temperature(samples.to_vec()),
            SeriesKind::Humidity => SampleSeries::Humidity(
                samples
                    .iter()
                    .map(|&raw| HumiditySample::from_raw(raw))
                    .collect(),
            ),
        };

        Ok(Self { weekday, series })
    }

    /// Series carried by this frame
    pub fn kind(&self) -> SeriesKind {
        match self.series {
            SampleSeries::Temperature(_) => SeriesKind::Temperature,
            SampleSeries::Humidity(_) => SeriesKind::Humidity,
        }
    }
}
