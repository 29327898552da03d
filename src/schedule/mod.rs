//! Schedule banks and the edit discipline around them
//!
//! [`ScheduleStore`] owns the thermostat configuration as last received from
//! (or sent to) the device. The bank shown on the curve editor is copied into
//! an [`EditBuffer`]; edits are staged there and only reach the settings
//! block on commit.

use thiserror_no_std::Error;

mod edit;
mod store;

pub use edit::EditBuffer;
pub use store::ScheduleStore;

/// Slot whose pair overrides the whole bank
pub const BROADCAST_SLOT: usize = 48;

/// Minutes covered by one slot
pub const MINUTES_PER_SLOT: u16 = 30;

/// Temperature bounds in decitemp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempRange {
    pub min: i32,
    pub max: i32,
}

impl TempRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Width of the range in decitemp
    pub const fn span(&self) -> i32 {
        self.max - self.min
    }

    pub const fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp into the range; `min` wins if the range is inverted
    pub fn clamp(&self, value: i32) -> i32 {
        value.min(self.max).max(self.min)
    }
}

/// Edit granularity of the setpoint curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// Slots move in pairs, one step per hour
    #[default]
    Hour,
    /// Every half-hour slot is independent
    HalfHour,
}

/// Errors raised by schedule operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Slot index past the end of the bank
    #[error("Slot {slot} out of range")]
    SlotOutOfRange {
        /// The offending slot
        slot: usize,
    },

    /// Bank selector field set to a bank that does not exist
    #[error("Bank {bank} out of range")]
    BankOutOfRange {
        /// The offending bank id
        bank: u8,
    },

    /// Bank name contains characters the device cannot store
    #[error("Bank names must be printable ASCII")]
    InvalidBankName,

    /// Exception date is not a real day/month
    #[error("Invalid date {day}/{month}")]
    InvalidDate {
        /// Day of month
        day: u8,
        /// Month of year
        month: u8,
    },
}

/// Result type for schedule operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;
