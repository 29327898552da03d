//! Core pointer types shared by the UI components

use embedded_graphics::prelude::*;

/// Pointer events delivered by the host, in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Button pressed
    Down(Point),
    /// Pointer moved; `pressed` reports whether a button is held
    Move { point: Point, pressed: bool },
    /// Button released
    Up(Point),
    /// Wheel turned; positive `delta_y` scrolls down
    Wheel { point: Point, delta_y: i32 },
}

impl PointerEvent {
    /// Position of the event
    pub fn point(&self) -> Point {
        match *self {
            Self::Down(point) | Self::Up(point) => point,
            Self::Move { point, .. } | Self::Wheel { point, .. } => point,
        }
    }
}

/// Result from handling a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerResult {
    /// Event was handled, redraw needed
    Handled,
    /// Event fell outside any active region
    NotHandled,
    /// Event finished a user action
    Action(Action),
}

/// Actions the editor reports to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A drag ended; commit and rollback are now meaningful
    EditFinished,
    /// The visible temperature range changed
    ViewRescaled,
}
