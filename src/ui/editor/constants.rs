//! Constants for the curve editor
//!
//! Geometry ratios are relative to the canvas or to the chart's hour step
//! so the chart scales with the surface it is drawn on.

/// Hit region of the slot cursors extends this many hours past midnight
/// (covers the trailing broadcast pair)
pub const SLOT_HIT_EXTENT_HOURS: f32 = 24.66;

/// Hours in the plotted day
pub const HOURS_PER_DAY: f32 = 24.0;

/// Fraction of the canvas height covered by the step-line plot background
pub const PLOT_BACKGROUND_HEIGHT_RATIO: f32 = 0.88;

/// Every Nth degree label is emphasized
pub const LABEL_EMPHASIS_PERIOD: i32 = 4;

/// Every Nth degree gridline is drawn heavier
pub const GRID_MAJOR_PERIOD: i32 = 5;

/// Horizontal position of the degree labels, fraction of the left offset
pub const AXIS_LABEL_X_RATIO: f32 = 0.2;

/// Marker width, fraction of canvas width
pub const MARKER_WIDTH_RATIO: f32 = 0.018;

/// Marker height, fraction of canvas height
pub const MARKER_HEIGHT_RATIO: f32 = 1.0 / 11.0;

/// Baseline of the marker value labels, fraction of canvas height
pub const MARKER_LABEL_Y_RATIO: f32 = 0.07;

/// Baseline of the even-slot step labels, fraction of canvas height
pub const STEP_LABEL_Y_RATIO: f32 = 0.15;

/// Baseline of the odd-slot step labels (half-hour view)
pub const STEP_LABEL_ODD_Y_RATIO: f32 = 0.13;

/// Step line width, fraction of the hour step
pub const STEP_LINE_WIDTH_RATIO: f32 = 1.0 / 20.0;

/// Trace line width, fraction of the vertical range
pub const TRACE_WIDTH_RATIO: f32 = 1.0 / 200.0;

/// Level line thickness, fraction of canvas height
pub const LEVEL_LINE_RATIO: f32 = 1.0 / 200.0;

/// Minor gridline thickness, fraction of the vertical range
pub const GRID_MINOR_RATIO: f32 = 1.0 / 400.0;

/// Hour gridline width, fraction of canvas width
pub const HOUR_GRID_WIDTH_RATIO: f32 = 1.0 / 400.0;

/// Top of the on/off bar below the plot, fraction of the bottom offset
pub const ON_BAR_OFFSET_RATIO: f32 = 0.8;

/// On/off bar height, fraction of canvas height
pub const ON_BAR_HEIGHT_RATIO: f32 = 1.0 / 100.0;

/// Dash pattern of the "now" line in pixels
pub const NOW_DASH_LENGTH_PX: u32 = 2;
pub const NOW_GAP_LENGTH_PX: u32 = 2;

/// Rows of the "now" annotations, fraction of canvas height
pub const NOW_LABEL_LOW_Y_RATIO: f32 = 0.87;
pub const NOW_LABEL_HIGH_Y_RATIO: f32 = 0.83;

/// Horizontal gap between the "now" line and its labels, fraction of the hour step
pub const NOW_LABEL_GAP_RATIO: f32 = 0.2;

/// Drag readout box size, fraction of canvas width/height
pub const READOUT_WIDTH_RATIO: f32 = 0.1;
pub const READOUT_HEIGHT_RATIO: f32 = 0.1;

/// Drag readout anchor, in slots right of the dragged slot
pub const READOUT_SLOT_OFFSET: f32 = 0.7;

/// Tooltip box position and size, in hour steps
pub const TOOLTIP_X_HOURS: f32 = 10.0;
pub const TOOLTIP_WIDTH_HOURS: f32 = 6.0;

/// Inner padding of the tooltip and readout boxes in pixels
pub const BOX_PADDING_PX: i32 = 4;

/// Maximum length of formatted chart labels (characters)
pub const MAX_LABEL_LENGTH: usize = 24;
