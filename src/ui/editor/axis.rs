//! Temperature axis labels and label formatting
//!
//! Labels are formatted into fixed-capacity heapless strings so rendering
//! never allocates.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use heapless::String;

use super::constants::{AXIS_LABEL_X_RATIO, LABEL_EMPHASIS_PERIOD, MAX_LABEL_LENGTH};
use super::grid::degree_span;
use super::viewport::ChartGeometry;
use crate::history::OnDuration;
use crate::ui::styling::{COLOR_LABEL, COLOR_LABEL_EMPHASIS, FONT_LABEL};

/// Fixed-capacity label text
pub type Label = String<MAX_LABEL_LENGTH>;

/// One label per whole degree left of midnight
pub(super) fn draw_degree_labels<D: DrawTarget<Color = Rgb565>>(
    geometry: &ChartGeometry,
    display: &mut D,
) -> Result<(), D::Error> {
    let (first, last) = degree_span(geometry);
    let x = geometry.left() * AXIS_LABEL_X_RATIO;
    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Left)
        .baseline(Baseline::Middle)
        .build();

    for degree in first..=last {
        let color = if is_emphasized(degree, first) {
            COLOR_LABEL_EMPHASIS
        } else {
            COLOR_LABEL
        };

        let mut label = Label::new();
        let _ = core::fmt::write(&mut label, format_args!("{}", degree));

        Text::with_text_style(
            label.as_str(),
            geometry.point(x, geometry.decitemp_to_y(degree * 10)),
            MonoTextStyle::new(FONT_LABEL, color),
            text_style,
        )
        .draw(display)?;
    }

    Ok(())
}

/// Every fourth label counting from the lowest one
pub(super) fn is_emphasized(degree: i32, first: i32) -> bool {
    (degree - first).rem_euclid(LABEL_EMPHASIS_PERIOD) == LABEL_EMPHASIS_PERIOD - 1
}

/// Decitemp as degrees with one decimal, e.g. `21.5`
pub fn format_decitemp(value: i32) -> Label {
    let mut s = Label::new();
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();
    let _ = core::fmt::write(
        &mut s,
        format_args!("{}{}.{}", sign, magnitude / 10, magnitude % 10),
    );
    s
}

/// Minute of day as `hh:mm`
pub fn format_clock(minute: u16) -> Label {
    let mut s = Label::new();
    let _ = core::fmt::write(&mut s, format_args!("{:02}:{:02}", minute / 60, minute % 60));
    s
}

/// Daily heater on-time, e.g. `ON TODAY 3:05`
pub fn format_on_time(duration: OnDuration) -> Label {
    let mut s = Label::new();
    let _ = core::fmt::write(&mut s, format_args!("ON TODAY {}", duration));
    s
}

/// Measured value in degrees with one decimal, e.g. `19.8`
pub fn format_celsius(value: f32) -> Label {
    let mut s = Label::new();
    let _ = core::fmt::write(&mut s, format_args!("{:.1}", value));
    s
}
