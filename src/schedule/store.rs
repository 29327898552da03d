//! Owner of the thermostat configuration

use log::{debug, info};

use super::{
    EditBuffer, Granularity, MINUTES_PER_SLOT, ScheduleError, ScheduleResult, TempRange,
};
use crate::protocol::{
    BANK_COUNT, BankName, Correction, DayMonth, OutboundFrame, ProtocolResult, SLOTS_PER_BANK,
    ScheduleMode, SettingsBlock, SettingsFrame, Weekday,
};

/// Settings, bank names and the edit buffer of the displayed bank
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    frame: SettingsFrame,
    /// Last frame received from or sent to the device
    snapshot: SettingsFrame,
    edit: EditBuffer,
    granularity: Granularity,
    loaded: bool,
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleStore {
    pub fn new() -> Self {
        let frame = SettingsFrame::default();
        let edit = EditBuffer::new(0, frame.block.bank(0));
        Self {
            snapshot: frame.clone(),
            frame,
            edit,
            granularity: Granularity::default(),
            loaded: false,
        }
    }

    /// Decode a raw `P` frame and replace the configuration
    ///
    /// A malformed frame is rejected and the prior state kept.
    pub fn load(&mut self, raw: &[u8]) -> ProtocolResult<()> {
        let frame = SettingsFrame::decode(raw)?;
        self.apply(frame);
        Ok(())
    }

    /// Replace the configuration with an already-decoded frame
    ///
    /// The edit buffer is left alone; callers reselect a bank once any
    /// pending edits are resolved.
    pub fn apply(&mut self, frame: SettingsFrame) {
        info!(" Settings loaded from device");
        self.snapshot = frame.clone();
        self.frame = frame;
        self.loaded = true;
    }

    /// Whether a settings frame has been received yet
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn settings(&self) -> &SettingsBlock {
        &self.frame.block
    }

    pub fn names(&self) -> &[BankName; BANK_COUNT] {
        &self.frame.names
    }

    pub fn edit_buffer(&self) -> &EditBuffer {
        &self.edit
    }

    /// Bank currently shown in the edit buffer
    pub fn selected_bank(&self) -> u8 {
        self.edit.bank()
    }

    pub fn is_dirty(&self) -> bool {
        self.edit.is_dirty()
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
    }

    /// Copy a bank into the edit buffer
    ///
    /// # Panics
    ///
    /// Panics if `bank` is not a valid bank id. The UI only ever offers
    /// the four existing banks.
    pub fn select_bank(&mut self, bank: u8) {
        assert!(
            usize::from(bank) < BANK_COUNT,
            "bank id {} out of range",
            bank
        );
        debug!(" Selecting bank {}", bank);
        self.edit = EditBuffer::new(bank, self.frame.block.bank(usize::from(bank)));
    }

    /// Stage a setpoint for `slot`, clamped to the view range
    ///
    /// Returns the value actually stored. An invalid slot declines the
    /// edit and leaves the buffer untouched.
    pub fn stage_edit(&mut self, slot: usize, raw: i32, view: TempRange) -> ScheduleResult<u8> {
        let value = view.clamp(raw).clamp(0, i32::from(u8::MAX)) as u8;
        self.edit.stage(slot, value, self.granularity)?;
        Ok(value)
    }

    /// Write the edit buffer into its bank and encode the settings for
    /// transmission
    pub fn commit(&mut self) -> OutboundFrame {
        let bank = self.edit.bank();
        self.commit_to(bank)
    }

    /// Write the edit buffer into `bank`, show that bank, and encode the
    /// settings for transmission
    ///
    /// # Panics
    ///
    /// Panics if `bank` is not a valid bank id.
    pub fn commit_to(&mut self, bank: u8) -> OutboundFrame {
        assert!(
            usize::from(bank) < BANK_COUNT,
            "bank id {} out of range",
            bank
        );
        info!(" Committing edits to bank {}", bank);
        let slots = *self.edit.current();
        self.frame.block.set_bank(usize::from(bank), &slots);
        if bank == self.edit.bank() {
            self.edit.settle();
        } else {
            self.select_bank(bank);
        }
        self.transmit()
    }

    /// Discard staged edits
    pub fn rollback(&mut self) {
        debug!(" Rolling back edits to bank {}", self.edit.bank());
        self.edit.rollback();
    }

    /// Encode the current settings and remember them as the device state
    pub fn transmit(&mut self) -> OutboundFrame {
        self.snapshot = self.frame.clone();
        self.frame.encode()
    }

    /// Revert the configuration to the last frame exchanged with the device
    pub fn restore_snapshot(&mut self) {
        debug!(" Restoring settings snapshot");
        self.frame = self.snapshot.clone();
    }

    /// Step the temperature correction by `delta` tenths
    pub fn adjust_correction(&mut self, delta: i16) {
        let mut correction = self.frame.block.correction();
        for _ in 0..delta.unsigned_abs() {
            correction = if delta > 0 {
                correction.step_up()
            } else {
                correction.step_down()
            };
        }
        self.frame.block.set_correction(correction);
    }

    pub fn correction(&self) -> Correction {
        self.frame.block.correction()
    }

    /// Step the hysteresis by `delta` tenths, saturating at 0 and 255
    pub fn adjust_hysteresis(&mut self, delta: i16) {
        let value = saturating_offset(self.frame.block.hysteresis(), delta);
        self.frame.block.set_hysteresis(value);
    }

    /// Step the manual setpoint by `delta` decitemp, saturating
    pub fn adjust_manual_setpoint(&mut self, delta: i16) {
        let value = saturating_offset(self.frame.block.manual_setpoint(), delta);
        self.frame.block.set_manual_setpoint(value);
    }

    /// Flip the thermostat on/off flag, returning the new state
    pub fn toggle_power(&mut self) -> bool {
        let on = !self.frame.block.power_on();
        self.frame.block.set_power_on(on);
        on
    }

    pub fn set_manual(&mut self, manual: bool) {
        self.frame.block.set_manual(manual);
    }

    pub fn set_schedule_mode(&mut self, mode: ScheduleMode) {
        self.frame.block.set_schedule_mode(mode);
    }

    pub fn set_fixed_bank(&mut self, bank: u8) -> ScheduleResult<()> {
        check_bank(bank)?;
        self.frame.block.set_fixed_bank(bank);
        Ok(())
    }

    pub fn set_weekday_bank(&mut self, weekday: Weekday, bank: u8) -> ScheduleResult<()> {
        check_bank(bank)?;
        self.frame.block.set_weekday_bank(weekday, bank);
        Ok(())
    }

    pub fn set_exception_bank(&mut self, bank: u8) -> ScheduleResult<()> {
        check_bank(bank)?;
        self.frame.block.set_exception_bank(bank);
        Ok(())
    }

    /// Flip the exception-enabled flag, returning the new state
    pub fn toggle_exception(&mut self) -> bool {
        let enabled = !self.frame.block.exception_enabled();
        self.frame.block.set_exception_enabled(enabled);
        enabled
    }

    /// Set the first day of the exception window
    ///
    /// The end date follows the start so a single-day exception needs one
    /// edit.
    pub fn set_exception_start(&mut self, date: DayMonth) -> ScheduleResult<()> {
        check_date(date)?;
        self.frame.block.set_exception_start(date);
        self.frame.block.set_exception_end(date);
        Ok(())
    }

    pub fn set_exception_end(&mut self, date: DayMonth) -> ScheduleResult<()> {
        check_date(date)?;
        self.frame.block.set_exception_end(date);
        Ok(())
    }

    /// Rename a bank; the name is padded or truncated to 10 characters
    pub fn rename_bank(&mut self, bank: u8, name: &str) -> ScheduleResult<()> {
        check_bank(bank)?;
        let name = BankName::new(name).ok_or(ScheduleError::InvalidBankName)?;
        self.frame.names[usize::from(bank)] = name;
        Ok(())
    }

    /// Setpoint in force at `minute` of the day
    ///
    /// The manual setpoint when manual mode is on, otherwise the displayed
    /// bank's slot for that half-hour.
    pub fn active_setpoint(&self, minute: u16) -> u8 {
        if self.frame.block.is_manual() {
            return self.frame.block.manual_setpoint();
        }
        let slot = usize::from(minute / MINUTES_PER_SLOT).min(SLOTS_PER_BANK - 1);
        self.edit.current()[slot]
    }
}

fn saturating_offset(value: u8, delta: i16) -> u8 {
    (i16::from(value) + delta).clamp(0, i16::from(u8::MAX)) as u8
}

fn check_bank(bank: u8) -> ScheduleResult<()> {
    if usize::from(bank) < BANK_COUNT {
        Ok(())
    } else {
        Err(ScheduleError::BankOutOfRange { bank })
    }
}

fn check_date(date: DayMonth) -> ScheduleResult<()> {
    if date.is_valid() {
        Ok(())
    } else {
        Err(ScheduleError::InvalidDate {
            day: date.day,
            month: date.month,
        })
    }
}
