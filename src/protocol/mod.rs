//! Device wire protocol
//!
//! The thermostat pushes two kinds of messages over a single socket:
//!
//! - Text frames: a one-byte tag, one separator byte, then the payload
//!   (`T`, `U`, `D`, `B`, `P`, `A`, `S`).
//! - Binary blobs of exactly [`SAMPLE_FRAME_LEN`] bytes carrying one day of
//!   per-minute temperature or humidity samples.
//!
//! Everything is decoded once here into typed values. Downstream code never
//! looks at raw bytes or bit masks again.

extern crate alloc;

use alloc::boxed::Box;
use core::fmt;
use core::str::FromStr;
use thiserror_no_std::Error;

mod sample;
mod settings;

pub use sample::{
    HumiditySample, MINUTES_PER_DAY, SAMPLE_FRAME_LEN, SAMPLE_HEADER_LEN, SampleFrame,
    SampleSeries, SeriesKind,
};
pub use settings::{
    BANK_COUNT, BANK_NAME_LEN, BankName, Correction, DayMonth, OutboundFrame, SETTINGS_FIELD_COUNT,
    SETTINGS_FRAME_LEN, SLOTS_PER_BANK, ScheduleMode, SettingsBlock, SettingsFrame,
};

/// Offset of the payload inside a text frame (tag + separator)
const TEXT_PAYLOAD_OFFSET: usize = 2;

// Field offsets within the `D` payload
const CLOCK_YEAR_OFFSET: usize = 0;
const CLOCK_MONTH_OFFSET: usize = 5;
const CLOCK_DAY_OFFSET: usize = 8;
const CLOCK_HOUR_OFFSET: usize = 11;
const CLOCK_MINUTE_OFFSET: usize = 14;
const CLOCK_SECOND_OFFSET: usize = 17;
const CLOCK_WEEKDAY_OFFSET: usize = 20;

/// Errors raised while decoding device frames
///
/// None of these reach the operator: the panel logs and drops the frame,
/// and the device retransmits on its own schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Zero-length message
    #[error("Empty frame")]
    Empty,

    /// Leading tag is not one the device sends
    #[error("Unknown frame tag 0x{tag:02x}")]
    UnknownTag {
        /// The offending tag byte
        tag: u8,
    },

    /// Frame length does not match the fixed layout
    #[error("Wrong frame length (expected {expected}, got {actual})")]
    Length {
        /// Required length in bytes
        expected: usize,
        /// Received length in bytes
        actual: usize,
    },

    /// Header bytes of a settings frame are not ASCII
    #[error("Non-ASCII settings header")]
    Header,

    /// A field separator is missing
    #[error("Missing field separator at byte {offset}")]
    Separator {
        /// Byte offset of the expected separator
        offset: usize,
    },

    /// A numeric field contains something other than decimal digits
    #[error("Non-decimal field at byte {offset}")]
    Digits {
        /// Byte offset of the field
        offset: usize,
    },

    /// A numeric field exceeds the 0..=255 storage range
    #[error("Field {index} out of range ({value})")]
    FieldRange {
        /// Settings field index
        index: usize,
        /// Decoded value
        value: u16,
    },

    /// A bank name contains a non-printable byte
    #[error("Non-printable name for bank {bank}")]
    NonPrintableName {
        /// Bank whose name was rejected
        bank: usize,
    },

    /// Weekday id outside 0..=6
    #[error("Weekday id {id} out of range")]
    WeekdayRange {
        /// The offending id
        id: u8,
    },

    /// Bank id outside 0..=3
    #[error("Bank id {id} out of range")]
    BankRange {
        /// The offending id
        id: u8,
    },

    /// Live reading payload is not a number
    #[error("Malformed numeric payload")]
    Number,

    /// Date/time payload does not have the expected fields
    #[error("Malformed clock payload")]
    Clock,
}

/// Result type for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// One message as delivered by the socket
#[derive(Debug, Clone, Copy)]
pub enum Message<'a> {
    /// Text frame
    Text(&'a str),
    /// Binary blob
    Binary(&'a [u8]),
}

/// Device-side day identifier, Sunday = 0 through Saturday = 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Weekday(u8);

impl Weekday {
    /// Number of days in a week
    pub const COUNT: usize = 7;

    pub const SUNDAY: Self = Self(0);
    pub const MONDAY: Self = Self(1);
    pub const TUESDAY: Self = Self(2);
    pub const WEDNESDAY: Self = Self(3);
    pub const THURSDAY: Self = Self(4);
    pub const FRIDAY: Self = Self(5);
    pub const SATURDAY: Self = Self(6);

    /// Create a weekday from its device id
    pub const fn new(id: u8) -> Option<Self> {
        if (id as usize) < Self::COUNT {
            Some(Self(id))
        } else {
            None
        }
    }

    /// Device id (0..=6)
    pub const fn id(self) -> u8 {
        self.0
    }

    /// Array index (0..7)
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Short label for display
    pub const fn label(self) -> &'static str {
        match self.0 {
            0 => "SUN",
            1 => "MON",
            2 => "TUE",
            3 => "WED",
            4 => "THU",
            5 => "FRI",
            _ => "SAT",
        }
    }

    /// Iterate over all seven days starting from Sunday
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }
}

impl TryFrom<u8> for Weekday {
    type Error = ProtocolError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id).ok_or(ProtocolError::WeekdayRange { id })
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wall-clock time reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceClock {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub weekday: Weekday,
}

impl DeviceClock {
    /// Minutes elapsed since midnight
    pub const fn minute_of_day(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Parse the `D` payload: `YYYY MM DD  hh mm ss w`
    ///
    /// Fields sit at fixed offsets; separators between them may be any
    /// character.
    fn parse(payload: &str) -> ProtocolResult<Self> {
        let year = clock_field(payload, CLOCK_YEAR_OFFSET)?;
        let month = clock_field(payload, CLOCK_MONTH_OFFSET)?;
        let day = clock_field(payload, CLOCK_DAY_OFFSET)?;
        let hour = clock_field(payload, CLOCK_HOUR_OFFSET)?;
        let minute = clock_field(payload, CLOCK_MINUTE_OFFSET)?;
        let second = clock_field(payload, CLOCK_SECOND_OFFSET)?;
        let weekday = clock_field(payload, CLOCK_WEEKDAY_OFFSET)?;

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(ProtocolError::Clock);
        }
        if hour >= 24 || minute >= 60 || second >= 60 {
            return Err(ProtocolError::Clock);
        }
        let weekday = u8::try_from(weekday)
            .map_err(|_| ProtocolError::Clock)
            .and_then(Weekday::try_from)?;

        Ok(Self {
            year,
            month: month as u8,
            day: day as u8,
            hour: hour as u8,
            minute: minute as u8,
            second: second as u8,
            weekday,
        })
    }
}

/// Decimal run starting at `offset`, after any leading spaces
fn clock_field(payload: &str, offset: usize) -> ProtocolResult<u16> {
    let field = payload
        .get(offset..)
        .ok_or(ProtocolError::Clock)?
        .trim_start_matches(' ');
    let digits = field
        .find(|c: char| !c.is_ascii_digit())
        .map_or(field, |end| &field[..end]);
    digits.parse::<u16>().map_err(|_| ProtocolError::Clock)
}

impl fmt::Display for DeviceClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}/{:02}/{} {:02}:{:02}:{:02} {}",
            self.day, self.month, self.year, self.hour, self.minute, self.second, self.weekday
        )
    }
}

/// A fully decoded inbound frame
#[derive(Debug, Clone)]
pub enum InboundFrame {
    /// `T`: live temperature in degrees Celsius
    Temperature(f32),
    /// `U`: live relative humidity in percent
    Humidity(f32),
    /// `D`: device date and time
    Clock(DeviceClock),
    /// `B`: bank the device is currently running
    ActiveBank(u8),
    /// `P`: full settings dump
    Settings(Box<SettingsFrame>),
    /// `A`: heater switched on
    HeaterOn,
    /// `S`: heater switched off
    HeaterOff,
    /// Binary blob with one day of samples
    Samples(Box<SampleFrame>),
}

/// Decode a message from the socket
pub fn decode(message: Message<'_>) -> ProtocolResult<InboundFrame> {
    match message {
        Message::Text(frame) => decode_text(frame),
        Message::Binary(bytes) => {
            SampleFrame::decode(bytes).map(|frame| InboundFrame::Samples(Box::new(frame)))
        }
    }
}

/// Decode a text frame
pub fn decode_text(frame: &str) -> ProtocolResult<InboundFrame> {
    let tag = *frame.as_bytes().first().ok_or(ProtocolError::Empty)?;
    let payload = frame.get(TEXT_PAYLOAD_OFFSET..).unwrap_or("");

    match tag {
        b'T' => parse_number(payload).map(InboundFrame::Temperature),
        b'U' => parse_number(payload).map(InboundFrame::Humidity),
        b'D' => DeviceClock::parse(payload).map(InboundFrame::Clock),
        b'B' => {
            let id = payload
                .trim()
                .parse::<u8>()
                .map_err(|_| ProtocolError::Number)?;
            if usize::from(id) >= BANK_COUNT {
                return Err(ProtocolError::BankRange { id });
            }
            Ok(InboundFrame::ActiveBank(id))
        }
        b'P' => SettingsFrame::decode(frame.as_bytes())
            .map(|settings| InboundFrame::Settings(Box::new(settings))),
        b'A' => Ok(InboundFrame::HeaterOn),
        b'S' => Ok(InboundFrame::HeaterOff),
        _ => Err(ProtocolError::UnknownTag { tag }),
    }
}

fn parse_number(payload: &str) -> ProtocolResult<f32> {
    let value = f32::from_str(payload.trim()).map_err(|_| ProtocolError::Number)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProtocolError::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_readings() {
        match decode_text("T 21.5") {
            Ok(InboundFrame::Temperature(value)) => assert_eq!(value, 21.5),
            other => panic!("unexpected decode result: {:?}", other),
        }
        match decode_text("U 48") {
            Ok(InboundFrame::Humidity(value)) => assert_eq!(value, 48.0),
            other => panic!("unexpected decode result: {:?}", other),
        }
        assert_eq!(
            decode_text("T abc").err(),
            Some(ProtocolError::Number),
            "Non-numeric reading must be rejected"
        );
    }

    #[test]
    fn test_clock_frame() {
        let frame = decode_text("D 2024 03 17  14 05 09 0");
        let Ok(InboundFrame::Clock(clock)) = frame else {
            panic!("clock frame failed to decode: {:?}", frame);
        };
        assert_eq!(clock.year, 2024);
        assert_eq!(clock.month, 3);
        assert_eq!(clock.day, 17);
        assert_eq!(clock.hour, 14);
        assert_eq!(clock.minute, 5);
        assert_eq!(clock.second, 9);
        assert_eq!(clock.weekday, Weekday::SUNDAY);
        assert_eq!(clock.minute_of_day(), 14 * 60 + 5);
    }

    #[test]
    fn test_clock_frame_any_separator() {
        let frame = decode_text("D 2024/03/17 14:05:09 0");
        let Ok(InboundFrame::Clock(clock)) = frame else {
            panic!("punctuated clock frame failed to decode: {:?}", frame);
        };
        assert_eq!((clock.year, clock.month, clock.day), (2024, 3, 17));
        assert_eq!((clock.hour, clock.minute, clock.second), (14, 5, 9));
        assert_eq!(clock.weekday, Weekday::SUNDAY);

        let frame = decode_text("D 2024-03-18 07-45-30 1");
        assert!(
            matches!(frame, Ok(InboundFrame::Clock(c)) if c.minute_of_day() == 7 * 60 + 45),
            "dash separators must decode: {:?}",
            frame
        );
    }

    #[test]
    fn test_clock_frame_rejects_bad_weekday() {
        assert_eq!(
            decode_text("D 2024 03 17  14 05 09 7").err(),
            Some(ProtocolError::WeekdayRange { id: 7 })
        );
        assert_eq!(
            decode_text("D 2024 03 17").err(),
            Some(ProtocolError::Clock)
        );
    }

    #[test]
    fn test_active_bank_frame() {
        assert!(matches!(
            decode_text("B 2"),
            Ok(InboundFrame::ActiveBank(2))
        ));
        assert_eq!(
            decode_text("B 4").err(),
            Some(ProtocolError::BankRange { id: 4 })
        );
    }

    #[test]
    fn test_heater_frames() {
        assert!(matches!(decode_text("A"), Ok(InboundFrame::HeaterOn)));
        assert!(matches!(decode_text("S"), Ok(InboundFrame::HeaterOff)));
    }

    #[test]
    fn test_unknown_and_empty_frames() {
        assert_eq!(
            decode_text("X 1").err(),
            Some(ProtocolError::UnknownTag { tag: b'X' })
        );
        assert_eq!(decode_text("").err(), Some(ProtocolError::Empty));
        assert_eq!(
            decode(Message::Binary(&[])).err(),
            Some(ProtocolError::Empty)
        );
    }

    #[test]
    fn test_weekday_labels() {
        assert_eq!(Weekday::all().count(), Weekday::COUNT);
        assert_eq!(Weekday::SATURDAY.label(), "SAT");
        assert!(Weekday::new(7).is_none());
        assert_eq!(Weekday::try_from(3u8).map(Weekday::index), Ok(3));
    }
}
