// src/ui/mod.rs
//! Crono UI - the interactive chart of the control panel
//!
//! This module provides:
//! - Pointer events and results shared with the host
//! - The setpoint curve editor (gestures, tooltip, wheel rescale, rendering)
//! - Palette and fonts

pub mod core;
pub mod editor;
pub mod styling;

// Re-export commonly used items
pub use core::{Action, PointerEvent, PointerResult};
pub use editor::{
    ChartGeometry, CurveEditor, DisplayOptions, GestureState, RenderContext, Tooltip, WheelBand,
};
