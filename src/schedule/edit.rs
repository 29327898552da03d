//! Working copy of the displayed bank

use super::{BROADCAST_SLOT, Granularity, ScheduleError, ScheduleResult};
use crate::protocol::SLOTS_PER_BANK;

/// The 50 slots of one bank being edited, plus the snapshot taken when the
/// bank was selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    bank: u8,
    current: [u8; SLOTS_PER_BANK],
    backup: [u8; SLOTS_PER_BANK],
    dirty: bool,
}

impl EditBuffer {
    /// Start editing `slots` of `bank`
    pub fn new(bank: u8, slots: [u8; SLOTS_PER_BANK]) -> Self {
        Self {
            bank,
            current: slots,
            backup: slots,
            dirty: false,
        }
    }

    /// Bank this buffer was taken from
    pub fn bank(&self) -> u8 {
        self.bank
    }

    /// Slots including staged edits
    pub fn current(&self) -> &[u8; SLOTS_PER_BANK] {
        &self.current
    }

    /// Slots as they were at selection time
    pub fn backup(&self) -> &[u8; SLOTS_PER_BANK] {
        &self.backup
    }

    pub fn slot(&self, slot: usize) -> Option<u8> {
        self.current.get(slot).copied()
    }

    /// Whether there are uncommitted edits
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write an already-clamped value and apply the cursor layout rules
    pub(super) fn stage(
        &mut self,
        slot: usize,
        value: u8,
        granularity: Granularity,
    ) -> ScheduleResult<()> {
        if slot >= SLOTS_PER_BANK {
            return Err(ScheduleError::SlotOutOfRange { slot });
        }

        self.current[slot] = value;
        if slot & !1 == BROADCAST_SLOT {
            self.current = [value; SLOTS_PER_BANK];
        }
        if granularity == Granularity::Hour {
            self.current[slot ^ 1] = value;
        }
        self.dirty = true;
        Ok(())
    }

    /// Accept the current slots as the new baseline
    pub(super) fn settle(&mut self) {
        self.backup = self.current;
        self.dirty = false;
    }

    /// Discard staged edits
    pub fn rollback(&mut self) {
        self.current = self.backup;
        self.dirty = false;
    }
}
