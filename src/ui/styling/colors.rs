//! Chart palette
//!
//! All colors are RGB565. To convert from 8-bit RGB: R>>3, G>>2, B>>3

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

// ============================================================================
// Surfaces
// ============================================================================

/// Canvas behind the marker view
pub const COLOR_CANVAS: Rgb565 = Rgb565::new(214 >> 3, 218 >> 2, 220 >> 3);

/// Plot background in step-line view
pub const COLOR_PLOT_BACKGROUND: Rgb565 = Rgb565::new(128 >> 3, 128 >> 2, 128 >> 3);

/// Minor grid lines (degrees, hours)
pub const COLOR_GRID_MINOR: Rgb565 = Rgb565::new(80 >> 3, 80 >> 2, 80 >> 3);

/// Major grid lines (every fifth degree)
pub const COLOR_GRID_MAJOR: Rgb565 = Rgb565::BLACK;

// ============================================================================
// Text
// ============================================================================

/// Regular axis labels
pub const COLOR_LABEL: Rgb565 = Rgb565::BLACK;

/// Emphasized axis labels
pub const COLOR_LABEL_EMPHASIS: Rgb565 = Rgb565::new(165 >> 3, 42 >> 2, 42 >> 3);

// ============================================================================
// Setpoint curve
// ============================================================================

/// Step line of the setpoint schedule
pub const COLOR_SETPOINT: Rgb565 = Rgb565::RED;

/// Regular slot marker
pub const COLOR_MARKER: Rgb565 = Rgb565::new(0, 160 >> 2, 0);

/// Marker of the slot that overrides the whole bank
pub const COLOR_MARKER_BROADCAST: Rgb565 = Rgb565::new(30 >> 3, 90 >> 2, 220 >> 3);

/// Marker being dragged
pub const COLOR_MARKER_SELECTED: Rgb565 = Rgb565::new(255 >> 3, 140 >> 2, 0);

/// Level line of the dragged slot
pub const COLOR_LEVEL: Rgb565 = Rgb565::new(0, 128 >> 2, 0);

/// Level line when the dragged value sits on a whole degree
pub const COLOR_LEVEL_WHOLE_DEGREE: Rgb565 = Rgb565::RED;

// ============================================================================
// History
// ============================================================================

/// Measured temperature trace
pub const COLOR_TEMPERATURE: Rgb565 = Rgb565::GREEN;

/// Measured humidity trace
pub const COLOR_HUMIDITY: Rgb565 = Rgb565::BLUE;

/// On/off bar background
pub const COLOR_ON_TRACK: Rgb565 = Rgb565::BLACK;

/// On/off bar segments where the heater ran
pub const COLOR_ON_BAR: Rgb565 = Rgb565::RED;

/// Faint shading over the plot where the heater ran
pub const COLOR_ON_SHADE: Rgb565 = Rgb565::new(150 >> 3, 112 >> 2, 112 >> 3);

// ============================================================================
// Overlays
// ============================================================================

/// Current time-of-day line
pub const COLOR_NOW: Rgb565 = Rgb565::WHITE;

/// Manual setpoint level and label
pub const COLOR_MANUAL: Rgb565 = Rgb565::new(0, 128 >> 2, 0);

/// Drag readout box
pub const COLOR_READOUT: Rgb565 = Rgb565::YELLOW;

/// Tooltip box
pub const COLOR_TOOLTIP: Rgb565 = Rgb565::new(180 >> 3, 180 >> 2, 180 >> 3);

/// Tooltip cursor line
pub const COLOR_TOOLTIP_CURSOR: Rgb565 = Rgb565::YELLOW;
