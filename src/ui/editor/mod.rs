//! Setpoint curve editor
//!
//! The editor draws the 50-slot setpoint curve of the displayed bank over
//! the recorded history of the displayed weekday, and turns pointer input
//! into schedule edits:
//!
//! - press inside the slot hit region and drag vertically to change a slot
//! - release to finish the edit (commit or roll back through the store)
//! - hover over the plot for a tooltip with the recorded values
//! - turn the wheel to rescale the temperature axis
//!
//! # Examples
//!
//! ```ignore
//! let mut editor = CurveEditor::new(Size::new(800, 480), &PanelConfig::default());
//! editor.handle_pointer(PointerEvent::Down(point), &mut store, &history, day);
//! editor.draw(&RenderContext { store: &store, history: &history, day, .. }, &mut fb)?;
//! ```

use embedded_graphics::prelude::*;
use log::debug;

pub mod axis;
pub mod constants;
mod grid;
mod render;
pub mod viewport;

pub use grid::LineStyle;
pub use render::RenderContext;
pub use viewport::{ChartGeometry, WheelBand};

use self::viewport::round_half_up;
use crate::config::{PanelConfig, ViewLimits};
use crate::history::HistoryBuffer;
use crate::protocol::Weekday;
use crate::schedule::{Granularity, ScheduleStore, TempRange};
use crate::ui::core::{Action, PointerEvent, PointerResult};

/// Display flags of the curve editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Discrete markers instead of the step line
    pub markers: bool,
    /// Edit and label every half-hour slot (step line only)
    pub half_hour: bool,
    /// Recorded temperature trace
    pub show_temperature: bool,
    /// Recorded humidity trace
    pub show_humidity: bool,
    /// "Now" line with live annotations
    pub show_now: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            markers: false,
            half_hour: false,
            show_temperature: true,
            show_humidity: false,
            show_now: false,
        }
    }
}

impl DisplayOptions {
    /// Edit granularity implied by the flags; markers always edit by the hour
    pub fn granularity(&self) -> Granularity {
        if self.half_hour && !self.markers {
            Granularity::HalfHour
        } else {
            Granularity::Hour
        }
    }
}

/// Gesture state of the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// A slot is being dragged
    Dragging {
        slot: usize,
        /// Pointer y when the drag started
        origin_y: i32,
        /// Slot value when the drag started (decitemp)
        origin_value: u8,
    },
}

/// Read-only values under the hovering pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tooltip {
    /// Minute of day under the pointer
    pub minute: u16,
    /// Recorded temperature (decitemp), if any
    pub temperature: Option<u8>,
    /// Setpoint in force at that minute (decitemp)
    pub setpoint: u8,
    /// Recorded humidity (percent), if any
    pub humidity: Option<u8>,
    /// Pointer x, for the cursor line
    pub x: i32,
}

/// Pointer-driven editor of the displayed bank's setpoint curve
#[derive(Debug, Clone)]
pub struct CurveEditor {
    geometry: ChartGeometry,
    limits: ViewLimits,
    options: DisplayOptions,
    gesture: GestureState,
    tooltip: Option<Tooltip>,
}

impl CurveEditor {
    pub fn new(size: Size, config: &PanelConfig) -> Self {
        let view = TempRange::new(
            i32::from(config.view.initial_min),
            i32::from(config.view.initial_max),
        );
        Self {
            geometry: ChartGeometry::new(size, config.layout, view),
            limits: config.view,
            options: DisplayOptions::default(),
            gesture: GestureState::Idle,
            tooltip: None,
        }
    }

    pub fn geometry(&self) -> &ChartGeometry {
        &self.geometry
    }

    /// Visible temperature range, also the clamp range of edits
    pub fn view(&self) -> TempRange {
        self.geometry.view()
    }

    pub fn options(&self) -> DisplayOptions {
        self.options
    }

    /// Replace the display flags
    ///
    /// The owner must apply [`DisplayOptions::granularity`] to the store.
    pub fn set_options(&mut self, options: DisplayOptions) {
        self.options = options;
        if options.markers {
            self.tooltip = None;
        }
    }

    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// Slot being dragged, if any
    pub fn selected_slot(&self) -> Option<usize> {
        match self.gesture {
            GestureState::Dragging { slot, .. } => Some(slot),
            GestureState::Idle => None,
        }
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Feed one pointer event through the gesture state machine
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        store: &mut ScheduleStore,
        history: &HistoryBuffer,
        day: Weekday,
    ) -> PointerResult {
        match event {
            PointerEvent::Down(point) => self.press(point, store),
            PointerEvent::Move { point, pressed } => match self.gesture {
                GestureState::Dragging {
                    slot,
                    origin_y,
                    origin_value,
                } => self.drag(slot, origin_y, origin_value, point, store),
                GestureState::Idle if pressed => {
                    if self.tooltip.take().is_some() {
                        PointerResult::Handled
                    } else {
                        PointerResult::NotHandled
                    }
                }
                GestureState::Idle => self.hover(point, store, history, day),
            },
            PointerEvent::Up(_) => match self.gesture {
                GestureState::Dragging { slot, .. } => {
                    debug!("Finished editing slot {}", slot);
                    self.gesture = GestureState::Idle;
                    PointerResult::Action(Action::EditFinished)
                }
                GestureState::Idle => PointerResult::NotHandled,
            },
            PointerEvent::Wheel { point, delta_y } => self.wheel(point, delta_y),
        }
    }

    fn press(&mut self, point: Point, store: &ScheduleStore) -> PointerResult {
        if matches!(self.gesture, GestureState::Dragging { .. }) {
            return PointerResult::NotHandled;
        }

        let Some(slot) = self.geometry.slot_at(point) else {
            return PointerResult::NotHandled;
        };
        let Some(origin_value) = store.edit_buffer().slot(slot) else {
            return PointerResult::NotHandled;
        };

        debug!("Dragging slot {} from {}", slot, origin_value);
        self.gesture = GestureState::Dragging {
            slot,
            origin_y: point.y,
            origin_value,
        };
        self.tooltip = None;
        PointerResult::Handled
    }

    fn drag(
        &mut self,
        slot: usize,
        origin_y: i32,
        origin_value: u8,
        point: Point,
        store: &mut ScheduleStore,
    ) -> PointerResult {
        let delta = self.geometry.pixels_to_decitemp((point.y - origin_y) as f32);
        let value = round_half_up(f32::from(origin_value) - delta);

        if let Err(err) = store.stage_edit(slot, value, self.view()) {
            debug!("Edit declined: {}", err);
        }
        PointerResult::Handled
    }

    fn hover(
        &mut self,
        point: Point,
        store: &ScheduleStore,
        history: &HistoryBuffer,
        day: Weekday,
    ) -> PointerResult {
        let minute = if self.options.markers {
            None
        } else {
            self.geometry.minute_at(point)
        };

        match minute {
            Some(minute) => {
                self.tooltip = Some(Tooltip {
                    minute,
                    temperature: history.temperature_at(day, minute).filter(|&t| t != 0),
                    setpoint: store.active_setpoint(minute),
                    humidity: history
                        .humidity_at(day, minute)
                        .map(|sample| sample.percent)
                        .filter(|&h| h != 0),
                    x: point.x,
                });
                PointerResult::Handled
            }
            None if self.tooltip.take().is_some() => PointerResult::Handled,
            None => PointerResult::NotHandled,
        }
    }

    fn wheel(&mut self, point: Point, delta_y: i32) -> PointerResult {
        if delta_y == 0 {
            return PointerResult::NotHandled;
        }

        let band = self.geometry.wheel_band(point);
        match rescale(self.view(), band, delta_y < 0, &self.limits) {
            Some(view) => {
                debug!("View rescaled to {}..{}", view.min, view.max);
                self.geometry.set_view(view);
                PointerResult::Action(Action::ViewRescaled)
            }
            None => PointerResult::NotHandled,
        }
    }
}

/// Apply one wheel notch to the view
///
/// Compressing lifts the upper bound (top band), drops the lower bound
/// (bottom band) or pans down; expanding does the inverse. Returns `None`
/// when the result would break the span, floor or ceiling limits.
pub fn rescale(
    view: TempRange,
    band: WheelBand,
    compress: bool,
    limits: &ViewLimits,
) -> Option<TempRange> {
    let step = i32::from(limits.wheel_step);
    let (min_delta, max_delta) = match (band, compress) {
        (WheelBand::Top, true) => (0, step),
        (WheelBand::Bottom, true) => (-step, 0),
        (WheelBand::Middle, true) => (-step, -step),
        (WheelBand::Top, false) => (0, -step),
        (WheelBand::Bottom, false) => (step, 0),
        (WheelBand::Middle, false) => (step, step),
    };

    let next = TempRange::new(view.min + min_delta, view.max + max_delta);
    if next.span() < i32::from(limits.min_span)
        || next.min < i32::from(limits.floor)
        || next.max > i32::from(limits.ceiling)
    {
        return None;
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        BankName, SAMPLE_FRAME_LEN, SAMPLE_HEADER_LEN, SETTINGS_FIELD_COUNT, SettingsBlock,
        SettingsFrame,
    };

    const DAY: Weekday = Weekday::WEDNESDAY;

    fn store() -> ScheduleStore {
        let mut store = ScheduleStore::new();
        store.apply(SettingsFrame::new(
            SettingsBlock::from_fields([150; SETTINGS_FIELD_COUNT]),
            core::array::from_fn(BankName::numbered),
        ));
        store.set_manual(false);
        store.select_bank(0);
        store
    }

    fn editor() -> CurveEditor {
        CurveEditor::new(Size::new(800, 480), &PanelConfig::default())
    }

    /// Screen point at the middle of `slot`, at temperature `value`
    fn slot_point(editor: &CurveEditor, slot: usize, value: i32) -> Point {
        let g = editor.geometry();
        g.point(
            g.slot_to_x(slot) + g.slot_width() / 2.0,
            g.decitemp_to_y(value),
        )
    }

    #[test]
    fn test_drag_stages_and_finishes() {
        let mut editor = editor();
        let mut store = store();
        let history = HistoryBuffer::new();

        let start = slot_point(&editor, 10, 150);
        assert_eq!(
            editor.handle_pointer(PointerEvent::Down(start), &mut store, &history, DAY),
            PointerResult::Handled
        );
        assert_eq!(editor.selected_slot(), Some(10));

        let target = slot_point(&editor, 10, 180);
        editor.handle_pointer(
            PointerEvent::Move {
                point: target,
                pressed: true,
            },
            &mut store,
            &history,
            DAY,
        );
        let value = store.edit_buffer().slot(10).expect("slot exists");
        assert!((179..=181).contains(&value), "dragged to {value}");
        assert_eq!(store.edit_buffer().slot(11), Some(value), "hour pairs move together");
        assert!(store.is_dirty());

        assert_eq!(
            editor.handle_pointer(PointerEvent::Up(target), &mut store, &history, DAY),
            PointerResult::Action(Action::EditFinished)
        );
        assert_eq!(editor.gesture(), GestureState::Idle);
        assert!(store.is_dirty(), "release leaves the edit staged");
    }

    #[test]
    fn test_drag_clamps_to_view() {
        let mut editor = editor();
        let mut store = store();
        let history = HistoryBuffer::new();

        let start = slot_point(&editor, 4, 150);
        editor.handle_pointer(PointerEvent::Down(start), &mut store, &history, DAY);
        editor.handle_pointer(
            PointerEvent::Move {
                point: Point::new(start.x, -2000),
                pressed: true,
            },
            &mut store,
            &history,
            DAY,
        );
        assert_eq!(store.edit_buffer().slot(4), Some(220));
        assert_eq!(store.edit_buffer().slot(5), Some(220));
    }

    #[test]
    fn test_press_outside_region_is_ignored() {
        let mut editor = editor();
        let mut store = store();
        let history = HistoryBuffer::new();

        let result = editor.handle_pointer(
            PointerEvent::Down(Point::new(2, 200)),
            &mut store,
            &history,
            DAY,
        );
        assert_eq!(result, PointerResult::NotHandled);
        assert_eq!(editor.gesture(), GestureState::Idle);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_release_while_idle_is_noop() {
        let mut editor = editor();
        let mut store = store();
        let history = HistoryBuffer::new();

        let result = editor.handle_pointer(
            PointerEvent::Up(Point::new(300, 200)),
            &mut store,
            &history,
            DAY,
        );
        assert_eq!(result, PointerResult::NotHandled);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_tooltip_contents() {
        let mut editor = editor();
        let mut store = store();
        let mut history = HistoryBuffer::new();

        let mut blob = [0u8; SAMPLE_FRAME_LEN];
        blob[0] = b'T';
        blob[1] = DAY.id();
        blob[SAMPLE_HEADER_LEN..].fill(195);
        history.ingest_bytes(&blob).expect("valid blob");

        let mut blob = [0u8; SAMPLE_FRAME_LEN];
        blob[0] = b'U';
        blob[1] = DAY.id();
        blob[SAMPLE_HEADER_LEN..].fill(0x80 | 55);
        history.ingest_bytes(&blob).expect("valid blob");

        let point = slot_point(&editor, 20, 170);
        let result = editor.handle_pointer(
            PointerEvent::Move {
                point,
                pressed: false,
            },
            &mut store,
            &history,
            DAY,
        );
        assert_eq!(result, PointerResult::Handled);

        let tooltip = *editor.tooltip().expect("tooltip shown");
        assert!((600..630).contains(&tooltip.minute), "minute {}", tooltip.minute);
        assert_eq!(tooltip.temperature, Some(195));
        assert_eq!(tooltip.humidity, Some(55));
        assert_eq!(tooltip.setpoint, 150);
        assert_eq!(tooltip.x, point.x);

        // Leaving the plot clears it
        let result = editor.handle_pointer(
            PointerEvent::Move {
                point: Point::new(point.x, 470),
                pressed: false,
            },
            &mut store,
            &history,
            DAY,
        );
        assert_eq!(result, PointerResult::Handled);
        assert!(editor.tooltip().is_none());
    }

    #[test]
    fn test_pressed_move_while_idle_clears_tooltip() {
        let mut editor = editor();
        let mut store = store();
        let history = HistoryBuffer::new();

        let point = slot_point(&editor, 20, 170);
        editor.handle_pointer(
            PointerEvent::Move {
                point,
                pressed: false,
            },
            &mut store,
            &history,
            DAY,
        );
        assert!(editor.tooltip().is_some(), "hover must show the tooltip");

        let moved = Point::new(point.x + 5, point.y);
        let result = editor.handle_pointer(
            PointerEvent::Move {
                point: moved,
                pressed: true,
            },
            &mut store,
            &history,
            DAY,
        );
        assert_eq!(result, PointerResult::Handled, "clearing the tooltip needs a redraw");
        assert!(editor.tooltip().is_none(), "stale tooltip must be cleared");
        assert_eq!(editor.gesture(), GestureState::Idle);
        assert!(!store.is_dirty());

        let result = editor.handle_pointer(
            PointerEvent::Move {
                point: moved,
                pressed: true,
            },
            &mut store,
            &history,
            DAY,
        );
        assert_eq!(result, PointerResult::NotHandled);
    }

    #[test]
    fn test_tooltip_hidden_in_marker_mode() {
        let mut editor = editor();
        let mut store = store();
        let history = HistoryBuffer::new();
        editor.set_options(DisplayOptions {
            markers: true,
            ..DisplayOptions::default()
        });

        let point = slot_point(&editor, 20, 170);
        let result = editor.handle_pointer(
            PointerEvent::Move {
                point,
                pressed: false,
            },
            &mut store,
            &history,
            DAY,
        );
        assert_eq!(result, PointerResult::NotHandled);
        assert!(editor.tooltip().is_none());
    }

    #[test]
    fn test_wheel_compress_top_band() {
        let mut editor = editor();
        let mut store = store();
        let history = HistoryBuffer::new();

        let result = editor.handle_pointer(
            PointerEvent::Wheel {
                point: Point::new(400, 10),
                delta_y: -1,
            },
            &mut store,
            &history,
            DAY,
        );
        assert_eq!(result, PointerResult::Action(Action::ViewRescaled));
        assert_eq!(editor.view(), TempRange::new(120, 230));
    }

    #[test]
    fn test_rescale_rules() {
        let limits = ViewLimits::default();
        let view = TempRange::new(120, 220);

        assert_eq!(
            rescale(view, WheelBand::Bottom, true, &limits),
            Some(TempRange::new(110, 220))
        );
        assert_eq!(
            rescale(view, WheelBand::Middle, true, &limits),
            Some(TempRange::new(110, 210))
        );
        assert_eq!(
            rescale(view, WheelBand::Top, false, &limits),
            Some(TempRange::new(120, 210))
        );
        assert_eq!(
            rescale(view, WheelBand::Bottom, false, &limits),
            Some(TempRange::new(130, 220))
        );
        assert_eq!(
            rescale(view, WheelBand::Middle, false, &limits),
            Some(TempRange::new(130, 230))
        );
    }

    #[test]
    fn test_rescale_guards() {
        let limits = ViewLimits::default();

        let at_ceiling = TempRange::new(120, 250);
        assert_eq!(rescale(at_ceiling, WheelBand::Top, true, &limits), None);
        assert_eq!(rescale(at_ceiling, WheelBand::Middle, false, &limits), None);

        let at_floor = TempRange::new(0, 100);
        assert_eq!(rescale(at_floor, WheelBand::Bottom, true, &limits), None);

        let narrow = TempRange::new(120, 160);
        assert_eq!(
            rescale(narrow, WheelBand::Top, false, &limits),
            None,
            "span may not drop under the minimum"
        );
        assert_eq!(rescale(narrow, WheelBand::Bottom, false, &limits), None);
    }

    #[test]
    fn test_marker_mode_forces_hour_granularity() {
        let options = DisplayOptions {
            half_hour: true,
            ..DisplayOptions::default()
        };
        assert_eq!(options.granularity(), Granularity::HalfHour);

        let options = DisplayOptions {
            markers: true,
            half_hour: true,
            ..DisplayOptions::default()
        };
        assert_eq!(options.granularity(), Granularity::Hour);
    }
}
