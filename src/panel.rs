//! Control panel composition root
//!
//! `ThermostatPanel` owns every piece of panel state and is driven by the
//! host one event at a time:
//!
//! - inbound socket messages go through [`ThermostatPanel::handle_message`]
//! - pointer events go through [`ThermostatPanel::handle_pointer`]
//! - button actions map onto the remaining methods
//!
//! Frames for the device are queued and handed to the host with
//! [`ThermostatPanel::take_outbound`]. Nothing is ever sent while a drag
//! is in progress.

extern crate alloc;

use alloc::collections::VecDeque;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::{debug, info};
use thiserror_no_std::Error;

use crate::config::PanelConfig;
use crate::history::HistoryBuffer;
use crate::protocol::{DeviceClock, InboundFrame, Message, OutboundFrame, Weekday, decode};
use crate::schedule::{ScheduleError, ScheduleStore};
use crate::ui::editor::axis::{Label, format_on_time};
use crate::ui::{CurveEditor, DisplayOptions, PointerEvent, PointerResult, RenderContext};

/// Errors raised by panel operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PanelError {
    /// The displayed bank has staged edits; commit or roll back first
    #[error("Uncommitted changes on the displayed bank")]
    UncommittedChanges,

    /// A schedule operation was rejected
    #[error("Schedule error: {0}")]
    Schedule(ScheduleError),
}

impl From<ScheduleError> for PanelError {
    fn from(err: ScheduleError) -> Self {
        Self::Schedule(err)
    }
}

/// Result type for panel operations
pub type PanelResult<T> = Result<T, PanelError>;

/// Live readings pushed by the device
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LiveStatus {
    /// Degrees Celsius
    pub temperature: Option<f32>,
    /// Percent relative humidity
    pub humidity: Option<f32>,
    pub heater_on: bool,
    /// Bank the device is currently running
    pub active_bank: Option<u8>,
    pub clock: Option<DeviceClock>,
}

/// The thermostat control panel
pub struct ThermostatPanel {
    config: PanelConfig,
    store: ScheduleStore,
    history: HistoryBuffer,
    editor: CurveEditor,
    status: LiveStatus,
    displayed_day: Weekday,
    /// Set once the operator picks a day; stops following the device clock
    day_pinned: bool,
    outbound: VecDeque<OutboundFrame>,
    needs_redraw: bool,
}

impl ThermostatPanel {
    /// Create a panel drawing onto a surface of `size`
    pub fn new(size: Size, config: PanelConfig) -> Self {
        let editor = CurveEditor::new(size, &config);
        Self {
            config,
            store: ScheduleStore::new(),
            history: HistoryBuffer::new(),
            editor,
            status: LiveStatus::default(),
            displayed_day: Weekday::SUNDAY,
            day_pinned: false,
            outbound: VecDeque::new(),
            needs_redraw: true,
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    /// Settings-form access to the store
    ///
    /// Changes made here reach the device on [`save_settings`](Self::save_settings)
    /// and are dropped by [`cancel_settings`](Self::cancel_settings).
    pub fn store_mut(&mut self) -> &mut ScheduleStore {
        &mut self.store
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn editor(&self) -> &CurveEditor {
        &self.editor
    }

    pub fn status(&self) -> &LiveStatus {
        &self.status
    }

    /// Weekday whose history is shown
    pub fn displayed_day(&self) -> Weekday {
        self.displayed_day
    }

    pub fn is_day_pinned(&self) -> bool {
        self.day_pinned
    }

    /// Whether state changed since the last call
    pub fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.needs_redraw)
    }

    /// Decode and apply one inbound message
    ///
    /// Malformed frames are logged and dropped; prior state is kept.
    /// Returns whether the message was applied.
    pub fn handle_message(&mut self, message: Message<'_>) -> bool {
        match decode(message) {
            Ok(frame) => {
                self.apply_frame(frame);
                self.needs_redraw = true;
                true
            }
            Err(err) => {
                debug!(" Dropping malformed frame: {}", err);
                false
            }
        }
    }

    fn apply_frame(&mut self, frame: InboundFrame) {
        match frame {
            InboundFrame::Temperature(value) => self.status.temperature = Some(value),
            InboundFrame::Humidity(value) => self.status.humidity = Some(value),
            InboundFrame::HeaterOn => self.status.heater_on = true,
            InboundFrame::HeaterOff => self.status.heater_on = false,
            InboundFrame::ActiveBank(bank) => {
                debug!(" Device running bank {}", bank);
                self.status.active_bank = Some(bank);
            }
            InboundFrame::Clock(clock) => {
                self.status.clock = Some(clock);
                if !self.day_pinned {
                    self.displayed_day = clock.weekday;
                }
            }
            InboundFrame::Settings(settings) => {
                self.store.apply(*settings);
                if self.store.is_dirty() {
                    info!(" Settings received; keeping uncommitted edits");
                } else {
                    let bank = self
                        .status
                        .active_bank
                        .unwrap_or_else(|| self.store.selected_bank());
                    self.store.select_bank(bank);
                }
            }
            InboundFrame::Samples(samples) => self.history.ingest(*samples),
        }
    }

    /// Forward a pointer event to the curve editor
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerResult {
        let result = self.editor.handle_pointer(
            event,
            &mut self.store,
            &self.history,
            self.displayed_day,
        );
        if result != PointerResult::NotHandled {
            self.needs_redraw = true;
        }
        result
    }

    /// Show the history of `day` and stop following the device clock
    pub fn select_day(&mut self, day: Weekday) {
        self.displayed_day = day;
        self.day_pinned = true;
        self.needs_redraw = true;
    }

    /// Follow the device clock's weekday again
    pub fn follow_device_day(&mut self) {
        self.day_pinned = false;
        if let Some(clock) = self.status.clock {
            self.displayed_day = clock.weekday;
        }
        self.needs_redraw = true;
    }

    /// Show another bank in the editor
    ///
    /// # Panics
    ///
    /// Panics if `bank` is not a valid bank id.
    pub fn display_bank(&mut self, bank: u8) -> PanelResult<()> {
        if self.store.is_dirty() {
            return Err(PanelError::UncommittedChanges);
        }
        self.store.select_bank(bank);
        self.needs_redraw = true;
        Ok(())
    }

    pub fn display_options(&self) -> DisplayOptions {
        self.editor.options()
    }

    pub fn set_display_options(&mut self, options: DisplayOptions) {
        self.editor.set_options(options);
        self.store.set_granularity(options.granularity());
        self.needs_redraw = true;
    }

    /// Write staged edits back to their bank and queue the frame
    ///
    /// Returns whether a frame was queued.
    pub fn commit(&mut self) -> bool {
        if !self.store.is_dirty() {
            return false;
        }
        let frame = self.store.commit();
        self.enqueue(frame);
        true
    }

    /// Write staged edits into `bank` and queue the frame
    ///
    /// # Panics
    ///
    /// Panics if `bank` is not a valid bank id.
    pub fn commit_to(&mut self, bank: u8) -> bool {
        if !self.store.is_dirty() {
            return false;
        }
        let frame = self.store.commit_to(bank);
        self.enqueue(frame);
        true
    }

    /// Discard staged edits
    pub fn rollback(&mut self) {
        self.store.rollback();
        self.needs_redraw = true;
    }

    /// Flip the power flag and send it; returns the new state
    pub fn toggle_power(&mut self) -> bool {
        let on = self.store.toggle_power();
        self.send_settings();
        on
    }

    /// Switch manual mode and send it
    pub fn set_manual(&mut self, manual: bool) {
        self.store.set_manual(manual);
        self.send_settings();
    }

    /// Step the manual setpoint by one configured step and send it
    pub fn adjust_manual_setpoint(&mut self, up: bool) {
        let step = i16::from(self.config.manual_step);
        self.store
            .adjust_manual_setpoint(if up { step } else { -step });
        self.send_settings();
    }

    /// Send the settings edited through [`store_mut`](Self::store_mut)
    pub fn save_settings(&mut self) {
        self.send_settings();
    }

    /// Drop settings edits since the last frame exchanged with the device
    pub fn cancel_settings(&mut self) {
        self.store.restore_snapshot();
        self.needs_redraw = true;
    }

    /// Rename a bank; the name travels with the next frame sent
    pub fn rename_bank(&mut self, bank: u8, name: &str) -> PanelResult<()> {
        self.store.rename_bank(bank, name)?;
        self.needs_redraw = true;
        Ok(())
    }

    /// Setpoint in force now, once the device clock is known
    pub fn active_setpoint(&self) -> Option<u8> {
        let clock = self.status.clock?;
        Some(self.store.active_setpoint(clock.minute_of_day()))
    }

    /// Heater on-time of the displayed day, e.g. `ON TODAY 3:05`
    pub fn on_time_label(&self) -> Label {
        format_on_time(self.history.on_minutes(self.displayed_day))
    }

    /// Next frame for the device, oldest first
    pub fn take_outbound(&mut self) -> Option<OutboundFrame> {
        self.outbound.pop_front()
    }

    /// All queued frames, oldest first
    pub fn drain_outbound(&mut self) -> impl Iterator<Item = OutboundFrame> + '_ {
        self.outbound.drain(..)
    }

    /// Draw the chart
    pub fn draw<D>(&self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let ctx = RenderContext {
            store: &self.store,
            history: &self.history,
            day: self.displayed_day,
            live_temperature: self.status.temperature,
            now_minute: self.status.clock.map(|clock| clock.minute_of_day()),
        };
        self.editor.draw(&ctx, display)
    }

    fn send_settings(&mut self) {
        let frame = self.store.transmit();
        self.enqueue(frame);
    }

    fn enqueue(&mut self, frame: OutboundFrame) {
        debug!(" Queued {} byte settings frame", frame.as_bytes().len());
        self.outbound.push_back(frame);
        self.needs_redraw = true;
    }
}
