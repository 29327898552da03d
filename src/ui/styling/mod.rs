//! Styling for the chart: palette and fonts

mod colors;

pub use colors::*;

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::iso_8859_1::{FONT_6X10, FONT_7X13_BOLD, FONT_9X15_BOLD};

/// Axis and curve labels
pub const FONT_LABEL: &MonoFont<'static> = &FONT_6X10;

/// Tooltip and drag readout
pub const FONT_READOUT: &MonoFont<'static> = &FONT_7X13_BOLD;

/// "Now" annotations and the readout value
pub const FONT_EMPHASIS: &MonoFont<'static> = &FONT_9X15_BOLD;
