//! Settings dump codec
//!
//! The `P` frame carries the whole configuration of the thermostat in a
//! fixed-width ASCII layout:
//!
//! ```text
//! byte 0        'P'
//! bytes 1..3    two-byte header, carried verbatim
//! bytes 3..923  230 groups of ",ddd" (field j digits at 4+4j)
//! byte 923      ','
//! bytes 924..   4 x 10-character bank names
//! ```
//!
//! The outbound commit frame uses exactly the same layout, so decoding and
//! encoding are inverses byte for byte.

extern crate alloc;

use alloc::string::String;
use core::fmt;
use core::ops::Index;

use super::{ProtocolError, ProtocolResult, Weekday};

/// Number of integer fields in a settings block
pub const SETTINGS_FIELD_COUNT: usize = 230;

/// Number of schedule banks
pub const BANK_COUNT: usize = 4;

/// Setpoint slots per bank (48 half-hours plus the trailing broadcast pair)
pub const SLOTS_PER_BANK: usize = 50;

/// Fixed length of a bank name in characters
pub const BANK_NAME_LEN: usize = 10;

/// Total length of a settings frame in bytes
pub const SETTINGS_FRAME_LEN: usize = 964;

const SETTINGS_TAG: u8 = b'P';
const FIELD_SEPARATOR: u8 = b',';
const HEADER_OFFSET: usize = 1;
const HEADER_LEN: usize = 2;
const FIELDS_OFFSET: usize = 3;
const FIELD_GROUP_LEN: usize = 4;
const TRAILER_OFFSET: usize = FIELDS_OFFSET + SETTINGS_FIELD_COUNT * FIELD_GROUP_LEN;
const NAMES_OFFSET: usize = TRAILER_OFFSET + 1;

/// Header sent when no settings frame has been received yet
const DEFAULT_HEADER: [u8; HEADER_LEN] = *b"0,";

// Scalar configuration field indices
const FIELD_POWER: usize = 200;
const FIELD_MANUAL: usize = 201;
const FIELD_MANUAL_SETPOINT: usize = 202;
const FIELD_CORRECTION: usize = 203;
const FIELD_HYSTERESIS: usize = 214;
const FIELD_EXCEPTION_ENABLED: usize = 215;
const FIELD_EXCEPTION_START: usize = 216;
const FIELD_EXCEPTION_END: usize = 218;
const FIELD_EXCEPTION_BANK: usize = 220;
const FIELD_SCHEDULE_MODE: usize = 221;
const FIELD_FIXED_BANK: usize = 222;
const FIELD_WEEKDAY_BANKS: usize = 223;

/// Temperature correction in signed-magnitude form
///
/// Raw 0..=127 is +0.0..+12.7 °C, raw 128..=255 is -12.8..-0.1 °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Correction(u8);

impl Correction {
    /// Wrap a raw field value
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw field value
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Signed correction in tenths of a degree
    pub const fn tenths(self) -> i16 {
        if self.0 < 128 {
            self.0 as i16
        } else {
            self.0 as i16 - 256
        }
    }

    /// One tenth warmer; -0.1 wraps to 0.0, +12.7 stays put
    pub const fn step_up(self) -> Self {
        match self.0 {
            255 => Self(0),
            127 => self,
            raw => Self(raw + 1),
        }
    }

    /// One tenth colder; 0.0 wraps to -0.1, -12.8 stays put
    pub const fn step_down(self) -> Self {
        match self.0 {
            0 => Self(255),
            128 => self,
            raw => Self(raw - 1),
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tenths = self.tenths();
        let sign = if tenths < 0 { '-' } else { '+' };
        let magnitude = tenths.unsigned_abs();
        write!(f, "{}{}.{}", sign, magnitude / 10, magnitude % 10)
    }
}

/// Which bank drives the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    /// One bank for every day
    Fixed,
    /// One bank per weekday
    Weekly,
}

/// Calendar day without a year, as used by the exception window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayMonth {
    pub day: u8,
    pub month: u8,
}

impl DayMonth {
    pub const fn new(day: u8, month: u8) -> Self {
        Self { day, month }
    }

    /// Day 1..=31 and month 1..=12
    pub const fn is_valid(&self) -> bool {
        self.day >= 1 && self.day <= 31 && self.month >= 1 && self.month <= 12
    }
}

/// The 230 configuration fields of the thermostat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsBlock([u8; SETTINGS_FIELD_COUNT]);

impl Default for SettingsBlock {
    fn default() -> Self {
        Self([0; SETTINGS_FIELD_COUNT])
    }
}

impl Index<usize> for SettingsBlock {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.0[index]
    }
}

impl SettingsBlock {
    /// Build a block from raw field values
    pub const fn from_fields(fields: [u8; SETTINGS_FIELD_COUNT]) -> Self {
        Self(fields)
    }

    /// All fields in wire order
    pub fn fields(&self) -> &[u8; SETTINGS_FIELD_COUNT] {
        &self.0
    }

    /// Raw field access, `None` past the end
    pub fn field(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied()
    }

    /// The 50 slots of a bank
    ///
    /// # Panics
    ///
    /// Panics if `bank >= BANK_COUNT`.
    pub fn bank(&self, bank: usize) -> [u8; SLOTS_PER_BANK] {
        let start = bank * SLOTS_PER_BANK;
        core::array::from_fn(|slot| self.0[start + slot])
    }

    /// Overwrite the 50 slots of a bank
    ///
    /// # Panics
    ///
    /// Panics if `bank >= BANK_COUNT`.
    pub fn set_bank(&mut self, bank: usize, slots: &[u8; SLOTS_PER_BANK]) {
        let start = bank * SLOTS_PER_BANK;
        self.0[start..start + SLOTS_PER_BANK].copy_from_slice(slots);
    }

    pub fn power_on(&self) -> bool {
        self.0[FIELD_POWER] != 0
    }

    pub fn set_power_on(&mut self, on: bool) {
        self.0[FIELD_POWER] = on as u8;
    }

    pub fn is_manual(&self) -> bool {
        self.0[FIELD_MANUAL] != 0
    }

    pub fn set_manual(&mut self, manual: bool) {
        self.0[FIELD_MANUAL] = manual as u8;
    }

    /// Manual setpoint in decitemp
    pub fn manual_setpoint(&self) -> u8 {
        self.0[FIELD_MANUAL_SETPOINT]
    }

    pub fn set_manual_setpoint(&mut self, value: u8) {
        self.0[FIELD_MANUAL_SETPOINT] = value;
    }

    pub fn correction(&self) -> Correction {
        Correction::from_raw(self.0[FIELD_CORRECTION])
    }

    pub fn set_correction(&mut self, correction: Correction) {
        self.0[FIELD_CORRECTION] = correction.raw();
    }

    /// Hysteresis in decitemp
    pub fn hysteresis(&self) -> u8 {
        self.0[FIELD_HYSTERESIS]
    }

    pub fn set_hysteresis(&mut self, value: u8) {
        self.0[FIELD_HYSTERESIS] = value;
    }

    pub fn exception_enabled(&self) -> bool {
        self.0[FIELD_EXCEPTION_ENABLED] != 0
    }

    pub fn set_exception_enabled(&mut self, enabled: bool) {
        self.0[FIELD_EXCEPTION_ENABLED] = enabled as u8;
    }

    pub fn exception_start(&self) -> DayMonth {
        DayMonth::new(
            self.0[FIELD_EXCEPTION_START],
            self.0[FIELD_EXCEPTION_START + 1],
        )
    }

    pub fn set_exception_start(&mut self, date: DayMonth) {
        self.0[FIELD_EXCEPTION_START] = date.day;
        self.0[FIELD_EXCEPTION_START + 1] = date.month;
    }

    pub fn exception_end(&self) -> DayMonth {
        DayMonth::new(self.0[FIELD_EXCEPTION_END], self.0[FIELD_EXCEPTION_END + 1])
    }

    pub fn set_exception_end(&mut self, date: DayMonth) {
        self.0[FIELD_EXCEPTION_END] = date.day;
        self.0[FIELD_EXCEPTION_END + 1] = date.month;
    }

    pub fn exception_bank(&self) -> u8 {
        self.0[FIELD_EXCEPTION_BANK]
    }

    pub fn set_exception_bank(&mut self, bank: u8) {
        self.0[FIELD_EXCEPTION_BANK] = bank;
    }

    pub fn schedule_mode(&self) -> ScheduleMode {
        if self.0[FIELD_SCHEDULE_MODE] == 0 {
            ScheduleMode::Fixed
        } else {
            ScheduleMode::Weekly
        }
    }

    pub fn set_schedule_mode(&mut self, mode: ScheduleMode) {
        self.0[FIELD_SCHEDULE_MODE] = match mode {
            ScheduleMode::Fixed => 0,
            ScheduleMode::Weekly => 1,
        };
    }

    pub fn fixed_bank(&self) -> u8 {
        self.0[FIELD_FIXED_BANK]
    }

    pub fn set_fixed_bank(&mut self, bank: u8) {
        self.0[FIELD_FIXED_BANK] = bank;
    }

    pub fn weekday_bank(&self, weekday: Weekday) -> u8 {
        self.0[FIELD_WEEKDAY_BANKS + weekday.index()]
    }

    pub fn set_weekday_bank(&mut self, weekday: Weekday, bank: u8) {
        self.0[FIELD_WEEKDAY_BANKS + weekday.index()] = bank;
    }
}

/// A 10-character printable-ASCII bank label, space padded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankName([u8; BANK_NAME_LEN]);

impl BankName {
    /// Pad or truncate `name` to the fixed width
    ///
    /// Returns `None` if any character is outside printable ASCII.
    pub fn new(name: &str) -> Option<Self> {
        let mut bytes = [b' '; BANK_NAME_LEN];
        for (slot, byte) in bytes.iter_mut().zip(name.bytes()) {
            *slot = byte;
        }
        if name.bytes().all(is_printable) {
            Some(Self(bytes))
        } else {
            None
        }
    }

    /// Accept a wire slice verbatim
    pub fn from_bytes(bytes: &[u8; BANK_NAME_LEN]) -> Option<Self> {
        if bytes.iter().copied().all(is_printable) {
            Some(Self(*bytes))
        } else {
            None
        }
    }

    /// Default label for a bank that has not been named by the device
    pub fn numbered(bank: usize) -> Self {
        let mut bytes = *b"PROGRAM   ";
        bytes[8] = b'1' + (bank % 10) as u8;
        Self(bytes)
    }

    /// Full padded label
    pub fn as_str(&self) -> &str {
        // Printable ASCII is always valid UTF-8
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Label without trailing padding
    pub fn trimmed(&self) -> &str {
        self.as_str().trim_end()
    }
}

impl fmt::Display for BankName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.trimmed())
    }
}

fn is_printable(byte: u8) -> bool {
    (0x20..=0x7e).contains(&byte)
}

/// Encoded frame ready to be written to the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame(String);

impl OutboundFrame {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Settings block plus bank names, as carried by a `P` frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFrame {
    header: [u8; HEADER_LEN],
    pub block: SettingsBlock,
    pub names: [BankName; BANK_COUNT],
}

impl Default for SettingsFrame {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER,
            block: SettingsBlock::default(),
            names: core::array::from_fn(BankName::numbered),
        }
    }
}

impl SettingsFrame {
    /// Build a frame with the default header
    pub fn new(block: SettingsBlock, names: [BankName; BANK_COUNT]) -> Self {
        Self {
            header: DEFAULT_HEADER,
            block,
            names,
        }
    }

    /// Decode a full `P` frame
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        if bytes.len() != SETTINGS_FRAME_LEN {
            return Err(ProtocolError::Length {
                expected: SETTINGS_FRAME_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0] != SETTINGS_TAG {
            return Err(ProtocolError::UnknownTag { tag: bytes[0] });
        }

        let header: [u8; HEADER_LEN] = [bytes[HEADER_OFFSET], bytes[HEADER_OFFSET + 1]];
        if !header.is_ascii() {
            return Err(ProtocolError::Header);
        }

        let mut fields = [0u8; SETTINGS_FIELD_COUNT];
        for (index, field) in fields.iter_mut().enumerate() {
            let offset = FIELDS_OFFSET + index * FIELD_GROUP_LEN;
            expect_separator(bytes, offset)?;
            *field = decode_field(&bytes[offset + 1..offset + FIELD_GROUP_LEN], offset + 1, index)?;
        }
        expect_separator(bytes, TRAILER_OFFSET)?;

        let mut names = [BankName::numbered(0); BANK_COUNT];
        for (bank, name) in names.iter_mut().enumerate() {
            let start = NAMES_OFFSET + bank * BANK_NAME_LEN;
            let raw: &[u8; BANK_NAME_LEN] = bytes[start..start + BANK_NAME_LEN]
                .try_into()
                .map_err(|_| ProtocolError::NonPrintableName { bank })?;
            *name = BankName::from_bytes(raw).ok_or(ProtocolError::NonPrintableName { bank })?;
        }

        Ok(Self {
            header,
            block: SettingsBlock(fields),
            names,
        })
    }

    /// Encode into the wire layout
    pub fn encode(&self) -> OutboundFrame {
        let mut out = String::with_capacity(SETTINGS_FRAME_LEN);
        out.push(char::from(SETTINGS_TAG));
        for &byte in &self.header {
            out.push(char::from(byte));
        }
        for &value in self.block.fields() {
            out.push(char::from(FIELD_SEPARATOR));
            out.push(char::from(b'0' + value / 100));
            out.push(char::from(b'0' + value / 10 % 10));
            out.push(char::from(b'0' + value % 10));
        }
        out.push(char::from(FIELD_SEPARATOR));
        for name in &self.names {
            out.push_str(name.as_str());
        }
        OutboundFrame(out)
    }
}

fn expect_separator(bytes: &[u8], offset: usize) -> ProtocolResult<()> {
    if bytes[offset] == FIELD_SEPARATOR {
        Ok(())
    } else {
        Err(ProtocolError::Separator { offset })
    }
}

fn decode_field(digits: &[u8], offset: usize, index: usize) -> ProtocolResult<u8> {
    let mut value: u16 = 0;
    for &digit in digits {
        if !digit.is_ascii_digit() {
            return Err(ProtocolError::Digits { offset });
        }
        value = value * 10 + u16::from(digit - b'0');
    }
    u8::try_from(value).map_err(|_| ProtocolError::FieldRange { index, value })
}
