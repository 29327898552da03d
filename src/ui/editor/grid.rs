//! Grid lines and line primitives for the chart background
//!
//! Degree gridlines follow the temperature view; hour gridlines follow
//! the even slots. Lines may be solid or dashed.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};

use super::constants::{GRID_MAJOR_PERIOD, GRID_MINOR_RATIO, HOUR_GRID_WIDTH_RATIO};
use super::viewport::{ChartGeometry, round_half_up};
use crate::protocol::SLOTS_PER_BANK;
use crate::ui::styling::{COLOR_GRID_MAJOR, COLOR_GRID_MINOR};

/// Line style for grid rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineStyle {
    /// Solid continuous line
    Solid,
    /// Dashed line with specified dash and gap lengths
    Dashed {
        /// Length of each dash in pixels
        dash_length: u32,
        /// Length of gap between dashes in pixels
        gap_length: u32,
    },
}

/// Whole degrees visible in the view, as (first, last)
///
/// The first label sits at or above the lower bound, the last at or below
/// the upper bound.
pub(super) fn degree_span(geometry: &ChartGeometry) -> (i32, i32) {
    let view = geometry.view();
    let first = (view.min + 9).div_euclid(10);
    let last = view.max.div_euclid(10);
    (first, last)
}

/// Horizontal gridline for every whole degree, heavier every fifth degree
pub(super) fn draw_degree_grid<D: DrawTarget<Color = Rgb565>>(
    geometry: &ChartGeometry,
    display: &mut D,
) -> Result<(), D::Error> {
    let (first, last) = degree_span(geometry);
    let minor_width = stroke_width(geometry.vertical_range() * GRID_MINOR_RATIO);

    for degree in first..=last {
        let y = geometry.decitemp_to_y(degree * 10);
        let (color, width) = if degree % GRID_MAJOR_PERIOD == 0 {
            (COLOR_GRID_MAJOR, minor_width * 2)
        } else {
            (COLOR_GRID_MINOR, minor_width)
        };

        draw_line(
            geometry.point(geometry.left(), y),
            geometry.point(geometry.day_end(), y),
            color,
            width,
            LineStyle::Solid,
            display,
        )?;
    }

    Ok(())
}

/// Vertical gridline at every hour, across the plot
pub(super) fn draw_hour_grid<D: DrawTarget<Color = Rgb565>>(
    geometry: &ChartGeometry,
    display: &mut D,
) -> Result<(), D::Error> {
    let width = stroke_width(geometry.width() * HOUR_GRID_WIDTH_RATIO);

    for slot in (0..SLOTS_PER_BANK).step_by(2) {
        let x = geometry.slot_to_x(slot);
        draw_line(
            geometry.point(x, geometry.top()),
            geometry.point(x, geometry.baseline()),
            COLOR_GRID_MINOR,
            width,
            LineStyle::Solid,
            display,
        )?;
    }

    Ok(())
}

/// Fill the rectangle spanning two chart-space corners
pub(super) fn fill_area<D: DrawTarget<Color = Rgb565>>(
    geometry: &ChartGeometry,
    (x0, y0): (f32, f32),
    (x1, y1): (f32, f32),
    color: Rgb565,
    display: &mut D,
) -> Result<(), D::Error> {
    let top_left = geometry.point(x0.min(x1), y0.min(y1));
    let bottom_right = geometry.point(x0.max(x1), y0.max(y1));
    let size = Size::new(
        (bottom_right.x - top_left.x).max(1) as u32,
        (bottom_right.y - top_left.y).max(1) as u32,
    );

    Rectangle::new(top_left, size)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(display)
}

/// Pixel stroke width, at least one pixel
pub(super) fn stroke_width(width: f32) -> u32 {
    round_half_up(width).max(1) as u32
}

/// Draw a single line with specified style
pub(super) fn draw_line<D: DrawTarget<Color = Rgb565>>(
    start: Point,
    end: Point,
    color: Rgb565,
    width: u32,
    style: LineStyle,
    display: &mut D,
) -> Result<(), D::Error> {
    match style {
        LineStyle::Solid => {
            Line::new(start, end)
                .into_styled(PrimitiveStyle::with_stroke(color, width))
                .draw(display)?;
        }
        LineStyle::Dashed {
            dash_length,
            gap_length,
        } => {
            draw_dashed_line(start, end, color, width, dash_length, gap_length, display)?;
        }
    }

    Ok(())
}

/// Simple square root approximation using Newton-Raphson method
fn sqrt_approx(x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }

    let mut guess = x / 2.0;

    // Starting from x/2, lines a few hundred pixels long need ~12 rounds
    for _ in 0..16 {
        guess = (guess + x / guess) / 2.0;
    }

    guess
}

/// Draw a dashed line by rendering individual dash segments
fn draw_dashed_line<D: DrawTarget<Color = Rgb565>>(
    start: Point,
    end: Point,
    color: Rgb565,
    width: u32,
    dash_length: u32,
    gap_length: u32,
    display: &mut D,
) -> Result<(), D::Error> {
    let dx = (end.x - start.x) as f32;
    let dy = (end.y - start.y) as f32;
    let total_length = sqrt_approx(dx * dx + dy * dy);

    if total_length < 0.1 {
        return Ok(());
    }

    let pattern_length = (dash_length + gap_length).max(1) as f32;
    let mut distance = 0.0;

    let line_style = PrimitiveStyle::with_stroke(color, width);

    while distance < total_length {
        let t_start = distance / total_length;
        let t_end = ((distance + dash_length as f32).min(total_length)) / total_length;

        let dash_start = Point::new(
            start.x + (dx * t_start) as i32,
            start.y + (dy * t_start) as i32,
        );

        let dash_end = Point::new(start.x + (dx * t_end) as i32, start.y + (dy * t_end) as i32);

        Line::new(dash_start, dash_end)
            .into_styled(line_style)
            .draw(display)?;

        distance += pattern_length;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartLayout;
    use crate::schedule::TempRange;

    #[test]
    fn test_degree_span() {
        let layout = ChartLayout::default();
        let g = ChartGeometry::new(Size::new(800, 480), layout, TempRange::new(120, 220));
        assert_eq!(degree_span(&g), (12, 22));

        let g = ChartGeometry::new(Size::new(800, 480), layout, TempRange::new(115, 205));
        assert_eq!(degree_span(&g), (12, 20), "partial degrees are not labelled");
    }

    #[test]
    fn test_sqrt_approx() {
        assert!((sqrt_approx(9.0) - 3.0).abs() < 0.01);
        assert!((sqrt_approx(160_000.0) - 400.0).abs() < 0.5);
        assert_eq!(sqrt_approx(0.0), 0.0);
    }

    #[test]
    fn test_stroke_width_minimum() {
        assert_eq!(stroke_width(0.2), 1);
        assert_eq!(stroke_width(2.6), 3);
    }
}
