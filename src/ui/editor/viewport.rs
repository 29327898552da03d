//! Chart geometry and coordinate transformation
//!
//! Maps between chart space (minute of day, slot index, decitemp) and
//! screen space. The time axis starts at `left` and advances one
//! `hour_step` per hour; the temperature axis runs from `baseline`
//! (lower bound of the view) up `vertical_range` pixels (upper bound).

use embedded_graphics::prelude::*;

use super::constants::{HOURS_PER_DAY, SLOT_HIT_EXTENT_HOURS};
use crate::config::ChartLayout;
use crate::protocol::{MINUTES_PER_DAY, SLOTS_PER_BANK};
use crate::schedule::TempRange;

/// Horizontal band of the canvas a wheel event falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelBand {
    Top,
    Middle,
    Bottom,
}

/// Pixel geometry of the chart for one canvas size and temperature view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartGeometry {
    size: Size,
    layout: ChartLayout,
    view: TempRange,
}

impl ChartGeometry {
    pub fn new(size: Size, layout: ChartLayout, view: TempRange) -> Self {
        Self { size, layout, view }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.width as f32
    }

    pub fn height(&self) -> f32 {
        self.size.height as f32
    }

    /// Visible temperature range
    pub fn view(&self) -> TempRange {
        self.view
    }

    pub fn set_view(&mut self, view: TempRange) {
        self.view = view;
    }

    /// X of midnight
    pub fn left(&self) -> f32 {
        self.layout.left * self.width()
    }

    /// Width of one hour in pixels
    pub fn hour_step(&self) -> f32 {
        self.layout.hour_step * self.width()
    }

    /// Width of one half-hour slot in pixels
    pub fn slot_width(&self) -> f32 {
        self.hour_step() / 2.0
    }

    /// Distance from the bottom edge to the baseline in pixels
    pub fn bottom_offset(&self) -> f32 {
        self.layout.bottom * self.height()
    }

    /// Y of the lower bound of the view
    pub fn baseline(&self) -> f32 {
        self.height() - self.bottom_offset()
    }

    /// Height from the lower to the upper bound in pixels
    pub fn vertical_range(&self) -> f32 {
        self.layout.vertical_range * self.height()
    }

    /// Y of the upper bound of the view
    pub fn top(&self) -> f32 {
        self.baseline() - self.vertical_range()
    }

    /// X of the end of the day
    pub fn day_end(&self) -> f32 {
        self.left() + HOURS_PER_DAY * self.hour_step()
    }

    pub fn decitemp_to_y(&self, value: i32) -> f32 {
        let span = self.view.span().max(1) as f32;
        self.baseline() - (value - self.view.min) as f32 / span * self.vertical_range()
    }

    /// Humidity shares the plot height, 0 % at the baseline and 100 % at the top
    pub fn percent_to_y(&self, percent: u8) -> f32 {
        self.baseline() - f32::from(percent) / 100.0 * self.vertical_range()
    }

    pub fn minute_to_x(&self, minute: u16) -> f32 {
        self.left() + f32::from(minute) / 60.0 * self.hour_step()
    }

    /// X of the left edge of a slot
    pub fn slot_to_x(&self, slot: usize) -> f32 {
        self.left() + slot as f32 * self.slot_width()
    }

    /// Convert a vertical pixel distance into decitemp at the current view
    pub fn pixels_to_decitemp(&self, delta_px: f32) -> f32 {
        delta_px / self.vertical_range() * self.view.span() as f32
    }

    /// Slot under the pointer, if it lies in the slot hit region
    pub fn slot_at(&self, point: Point) -> Option<usize> {
        let x = point.x as f32;
        let y = point.y as f32;
        let right = self.left() + SLOT_HIT_EXTENT_HOURS * self.hour_step();
        if x < self.left() || x >= right || y < self.top() || y > self.baseline() {
            return None;
        }

        let slot = ((x - self.left()) / self.slot_width()) as usize;
        Some(slot.min(SLOTS_PER_BANK - 1))
    }

    /// Minute of day under the pointer, if it lies strictly inside the plot
    pub fn minute_at(&self, point: Point) -> Option<u16> {
        let x = point.x as f32;
        let y = point.y as f32;
        if x < self.left() || x >= self.day_end() || y <= self.top() || y >= self.baseline() {
            return None;
        }

        let fraction = (x - self.left()) / (self.day_end() - self.left());
        let minute = (fraction * MINUTES_PER_DAY as f32) as u16;
        Some(minute.min(MINUTES_PER_DAY as u16 - 1))
    }

    /// Band of the canvas used to pick the wheel rule
    pub fn wheel_band(&self, point: Point) -> WheelBand {
        let band = self.layout.wheel_band * self.height();
        let y = point.y as f32;
        if y < band {
            WheelBand::Top
        } else if y > self.height() - band {
            WheelBand::Bottom
        } else {
            WheelBand::Middle
        }
    }

    /// Screen point from chart coordinates in pixels
    pub fn point(&self, x: f32, y: f32) -> Point {
        Point::new(round_half_up(x), round_half_up(y))
    }
}

/// Largest integer not greater than `x`
pub fn floor_f32(x: f32) -> i32 {
    let truncated = x as i32;
    if truncated as f32 > x {
        truncated - 1
    } else {
        truncated
    }
}

/// Round to nearest, halves towards positive infinity
pub fn round_half_up(x: f32) -> i32 {
    floor_f32(x + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> ChartGeometry {
        ChartGeometry::new(
            Size::new(800, 480),
            ChartLayout::default(),
            TempRange::new(120, 220),
        )
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(-2.5), -2, "halves round up");
        assert_eq!(round_half_up(-2.51), -3);
        assert_eq!(floor_f32(-0.1), -1);
        assert_eq!(floor_f32(3.0), 3);
    }

    #[test]
    fn test_axis_mapping() {
        let g = geometry();
        assert!((g.decitemp_to_y(120) - g.baseline()).abs() < 0.01);
        assert!((g.decitemp_to_y(220) - g.top()).abs() < 0.01);
        assert!((g.percent_to_y(100) - g.top()).abs() < 0.01);
        assert!((g.minute_to_x(0) - g.left()).abs() < 0.01);
        assert!((g.minute_to_x(1440) - g.day_end()).abs() < 0.01);
        assert!((g.pixels_to_decitemp(g.vertical_range()) - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_slot_hit_region() {
        let g = geometry();
        let y = g.point(0.0, (g.top() + g.baseline()) / 2.0).y;

        assert_eq!(g.slot_at(Point::new(g.left() as i32 + 1, y)), Some(0));
        let x = g.point(g.slot_to_x(7) + 1.0, 0.0).x;
        assert_eq!(g.slot_at(Point::new(x, y)), Some(7));

        // Past midnight the trailing pair stays reachable
        let x = g.point(g.slot_to_x(49) + 1.0, 0.0).x;
        assert_eq!(g.slot_at(Point::new(x, y)), Some(49));

        assert_eq!(g.slot_at(Point::new(0, y)), None, "left of midnight");
        assert_eq!(g.slot_at(Point::new(799, y)), None, "past the hit extent");
        assert_eq!(g.slot_at(Point::new(x, 5)), None, "above the view");
        assert_eq!(g.slot_at(Point::new(x, 470)), None, "below the baseline");
    }

    #[test]
    fn test_minute_at() {
        let g = geometry();
        let y = g.point(0.0, (g.top() + g.baseline()) / 2.0).y;

        let x = g.point(g.minute_to_x(600) + 0.5, 0.0).x;
        let minute = g.minute_at(Point::new(x, y)).expect("inside plot");
        assert!((599..=601).contains(&minute), "minute {minute}");

        let baseline = g.point(0.0, g.baseline()).y;
        assert_eq!(g.minute_at(Point::new(x, baseline + 1)), None);
        assert_eq!(g.minute_at(Point::new(g.day_end() as i32 + 1, y)), None);
    }

    #[test]
    fn test_wheel_band() {
        let g = geometry();
        assert_eq!(g.wheel_band(Point::new(400, 10)), WheelBand::Top);
        assert_eq!(g.wheel_band(Point::new(400, 240)), WheelBand::Middle);
        assert_eq!(g.wheel_band(Point::new(400, 470)), WheelBand::Bottom);
    }
}
