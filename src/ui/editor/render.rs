//! Frame rendering for the curve editor
//!
//! A frame is a pure function of the editor, the schedule store and the
//! history buffer. Layers are painted back to front: background and grid,
//! heater shading, the setpoint curve, recorded traces, the on/off bar,
//! level lines, the "now" marker, the on-time total, the tooltip and
//! finally the drag readout.

extern crate alloc;

use alloc::vec::Vec;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Polyline, PrimitiveStyle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use super::axis::{
    Label, draw_degree_labels, format_celsius, format_clock, format_decitemp, format_on_time,
};
use super::constants::*;
use super::grid::{
    LineStyle, draw_degree_grid, draw_hour_grid, draw_line, fill_area, stroke_width,
};
use super::viewport::ChartGeometry;
use super::{CurveEditor, Tooltip};
use crate::history::HistoryBuffer;
use crate::protocol::{SLOTS_PER_BANK, Weekday};
use crate::schedule::{BROADCAST_SLOT, Granularity, ScheduleStore};
use crate::ui::styling::*;

/// Everything a frame reads besides the editor itself
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub store: &'a ScheduleStore,
    pub history: &'a HistoryBuffer,
    /// Weekday whose history is shown
    pub day: Weekday,
    /// Live measured temperature in degrees, for the "now" marker
    pub live_temperature: Option<f32>,
    /// Current minute of day on the device clock
    pub now_minute: Option<u16>,
}

impl CurveEditor {
    /// Draw one complete frame
    pub fn draw<D>(&self, ctx: &RenderContext<'_>, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let g = &self.geometry;
        let slots = ctx.store.edit_buffer().current();

        self.draw_background(display)?;
        draw_on_shading(g, ctx, display)?;

        if !self.options.markers {
            draw_degree_grid(g, display)?;
        }
        draw_degree_labels(g, display)?;

        if self.options.markers {
            self.draw_markers(slots, display)?;
        } else {
            draw_hour_grid(g, display)?;
            draw_step_line(g, slots, display)?;
        }
        self.draw_value_labels(slots, display)?;

        let trace_width = stroke_width(g.vertical_range() * TRACE_WIDTH_RATIO);
        if self.options.show_temperature {
            let points = ctx.history.temperature_trace(ctx.day).map(|point| {
                g.point(
                    g.minute_to_x(point.minute),
                    g.decitemp_to_y(i32::from(point.value)),
                )
            });
            draw_trace(points, COLOR_TEMPERATURE, trace_width, display)?;
        }
        if self.options.show_humidity {
            let points = ctx.history.humidity_trace(ctx.day).map(|point| {
                g.point(g.minute_to_x(point.minute), g.percent_to_y(point.value))
            });
            draw_trace(points, COLOR_HUMIDITY, trace_width, display)?;
        }

        draw_on_bar(g, ctx, display)?;

        let settings = ctx.store.settings();
        if settings.is_manual() {
            // Sits slightly above the value, like the selected-slot line
            let y = g.decitemp_to_y(i32::from(settings.manual_setpoint()))
                - 0.03 * g.bottom_offset();
            draw_level_line(g, y, COLOR_MANUAL, display)?;
        }

        if let Some(slot) = self.selected_slot() {
            let value = slots[slot];
            let color = if value % 10 == 0 {
                COLOR_LEVEL_WHOLE_DEGREE
            } else {
                COLOR_LEVEL
            };
            let y = g.decitemp_to_y(i32::from(value)) - 0.02 * g.bottom_offset();
            draw_level_line(g, y, color, display)?;
        }

        if self.options.show_now
            && let Some(minute) = ctx.now_minute
        {
            draw_now_marker(g, ctx, minute, display)?;
        }

        draw_on_time(g, ctx, display)?;

        if !self.options.markers
            && let Some(tooltip) = &self.tooltip
        {
            draw_tooltip(g, tooltip, display)?;
        }

        if let Some(slot) = self.selected_slot() {
            self.draw_readout(slot, slots[slot], display)?;
        }

        Ok(())
    }

    fn draw_background<D: DrawTarget<Color = Rgb565>>(
        &self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        let g = &self.geometry;
        fill_area(g, (0.0, 0.0), (g.width(), g.height()), COLOR_CANVAS, display)?;
        if !self.options.markers {
            fill_area(
                g,
                (0.0, 0.0),
                (g.width(), g.height() * PLOT_BACKGROUND_HEIGHT_RATIO),
                COLOR_PLOT_BACKGROUND,
                display,
            )?;
        }
        Ok(())
    }

    /// One marker per hour; the broadcast pair and the dragged pair stand out
    fn draw_markers<D: DrawTarget<Color = Rgb565>>(
        &self,
        slots: &[u8; SLOTS_PER_BANK],
        display: &mut D,
    ) -> Result<(), D::Error> {
        let g = &self.geometry;
        let width = g.width() * MARKER_WIDTH_RATIO;
        let height = g.height() * MARKER_HEIGHT_RATIO;
        let selected_pair = self.selected_slot().map(|slot| slot & !1);

        for slot in (0..SLOTS_PER_BANK).step_by(2) {
            let color = if selected_pair == Some(slot) {
                COLOR_MARKER_SELECTED
            } else if slot == BROADCAST_SLOT {
                COLOR_MARKER_BROADCAST
            } else {
                COLOR_MARKER
            };

            let x = g.slot_to_x(slot);
            let y = g.decitemp_to_y(i32::from(slots[slot]));
            fill_area(
                g,
                (x, y - height / 2.0),
                (x + width, y + height / 2.0),
                color,
                display,
            )?;
        }
        Ok(())
    }

    /// Slot values above the plot; odd slots only when edited by the half-hour
    fn draw_value_labels<D: DrawTarget<Color = Rgb565>>(
        &self,
        slots: &[u8; SLOTS_PER_BANK],
        display: &mut D,
    ) -> Result<(), D::Error> {
        let g = &self.geometry;
        let style = MonoTextStyle::new(FONT_LABEL, COLOR_LABEL);
        let half_hour = self.options.granularity() == Granularity::HalfHour;

        for (slot, &value) in slots.iter().enumerate() {
            let even = slot % 2 == 0;
            let position = if self.options.markers {
                even.then(|| (g.left() * 0.8, MARKER_LABEL_Y_RATIO))
            } else if even {
                Some((g.left() * 1.2, STEP_LABEL_Y_RATIO))
            } else if half_hour {
                Some((g.left() * 1.2, STEP_LABEL_ODD_Y_RATIO))
            } else {
                None
            };

            if let Some((offset, row)) = position {
                let x = offset + g.slot_width() * slot as f32;
                Text::new(
                    format_decitemp(i32::from(value)).as_str(),
                    g.point(x, g.height() * row),
                    style,
                )
                .draw(display)?;
            }
        }
        Ok(())
    }

    /// Yellow box next to the dragged slot with its time and value
    fn draw_readout<D: DrawTarget<Color = Rgb565>>(
        &self,
        slot: usize,
        value: u8,
        display: &mut D,
    ) -> Result<(), D::Error> {
        let g = &self.geometry;
        let left = g.left() + g.slot_width() * (slot as f32 + READOUT_SLOT_OFFSET);
        let bottom = g.decitemp_to_y(i32::from(value)) - 0.2 * g.bottom_offset();
        fill_area(
            g,
            (left, bottom - g.height() * READOUT_HEIGHT_RATIO),
            (left + g.width() * READOUT_WIDTH_RATIO, bottom),
            COLOR_READOUT,
            display,
        )?;

        let half = slot % 2 == 1 && self.options.granularity() == Granularity::HalfHour;
        let minute = (slot / 2) as u16 * 60 + if half { 30 } else { 0 };
        let mut time = Label::new();
        let _ = core::fmt::write(&mut time, format_args!("ORE: {}", format_clock(minute)));

        let text_x = left + g.hour_step() * 0.2;
        Text::new(
            time.as_str(),
            g.point(text_x, bottom - g.height() * 0.08),
            MonoTextStyle::new(FONT_READOUT, COLOR_LABEL),
        )
        .draw(display)?;

        let color = if value % 10 == 0 {
            COLOR_LEVEL_WHOLE_DEGREE
        } else {
            COLOR_LABEL
        };
        Text::new(
            format_decitemp(i32::from(value)).as_str(),
            g.point(text_x, bottom - g.height() * 0.02),
            MonoTextStyle::new(FONT_EMPHASIS, color),
        )
        .draw(display)?;
        Ok(())
    }
}

/// Continuous staircase through all slots
fn draw_step_line<D: DrawTarget<Color = Rgb565>>(
    g: &ChartGeometry,
    slots: &[u8; SLOTS_PER_BANK],
    display: &mut D,
) -> Result<(), D::Error> {
    let points: heapless::Vec<Point, { 2 * SLOTS_PER_BANK }> = slots
        .iter()
        .enumerate()
        .flat_map(|(slot, &value)| {
            let y = g.decitemp_to_y(i32::from(value));
            [
                g.point(g.slot_to_x(slot), y),
                g.point(g.slot_to_x(slot + 1), y),
            ]
        })
        .collect();

    let width = stroke_width(g.hour_step() * STEP_LINE_WIDTH_RATIO);
    Polyline::new(&points)
        .into_styled(PrimitiveStyle::with_stroke(COLOR_SETPOINT, width))
        .draw(display)
}

fn draw_trace<D, I>(points: I, color: Rgb565, width: u32, display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    I: Iterator<Item = Point>,
{
    let points: Vec<Point> = points.collect();
    if points.len() < 2 {
        return Ok(());
    }
    Polyline::new(&points)
        .into_styled(PrimitiveStyle::with_stroke(color, width))
        .draw(display)
}

/// Faint full-height bands over the minutes the heater ran
fn draw_on_shading<D: DrawTarget<Color = Rgb565>>(
    g: &ChartGeometry,
    ctx: &RenderContext<'_>,
    display: &mut D,
) -> Result<(), D::Error> {
    for interval in ctx.history.on_intervals(ctx.day) {
        fill_area(
            g,
            (g.minute_to_x(interval.start_minute), g.top()),
            (g.minute_to_x(interval.end_minute), g.baseline()),
            COLOR_ON_SHADE,
            display,
        )?;
    }
    Ok(())
}

/// Black track under the plot with red segments where the heater ran
fn draw_on_bar<D: DrawTarget<Color = Rgb565>>(
    g: &ChartGeometry,
    ctx: &RenderContext<'_>,
    display: &mut D,
) -> Result<(), D::Error> {
    if ctx.history.humidity_series(ctx.day).is_none() {
        return Ok(());
    }

    let top = on_bar_top(g);
    let bottom = top + g.height() * ON_BAR_HEIGHT_RATIO;
    fill_area(
        g,
        (g.left(), top),
        (g.day_end(), bottom),
        COLOR_ON_TRACK,
        display,
    )?;

    for interval in ctx.history.on_intervals(ctx.day) {
        fill_area(
            g,
            (g.minute_to_x(interval.start_minute), top),
            (g.minute_to_x(interval.end_minute), bottom),
            COLOR_ON_BAR,
            display,
        )?;
    }
    Ok(())
}

fn on_bar_top(g: &ChartGeometry) -> f32 {
    g.height() - g.bottom_offset() * ON_BAR_OFFSET_RATIO
}

/// Full-width horizontal line
fn draw_level_line<D: DrawTarget<Color = Rgb565>>(
    g: &ChartGeometry,
    y: f32,
    color: Rgb565,
    display: &mut D,
) -> Result<(), D::Error> {
    fill_area(
        g,
        (0.0, y),
        (g.width(), y + g.height() * LEVEL_LINE_RATIO),
        color,
        display,
    )
}

/// Dashed line at the current time, labelled with setpoint and live temperature
fn draw_now_marker<D: DrawTarget<Color = Rgb565>>(
    g: &ChartGeometry,
    ctx: &RenderContext<'_>,
    minute: u16,
    display: &mut D,
) -> Result<(), D::Error> {
    let x = g.minute_to_x(minute);
    draw_line(
        g.point(x, on_bar_top(g)),
        g.point(x, g.top()),
        COLOR_NOW,
        stroke_width(g.vertical_range() * TRACE_WIDTH_RATIO),
        LineStyle::Dashed {
            dash_length: NOW_DASH_LENGTH_PX,
            gap_length: NOW_GAP_LENGTH_PX,
        },
        display,
    )?;

    let setpoint = ctx.store.active_setpoint(minute);
    let setpoint_color = if ctx.store.settings().is_manual() {
        COLOR_MANUAL
    } else {
        COLOR_SETPOINT
    };

    let high = g.height() * NOW_LABEL_HIGH_Y_RATIO;
    let low = g.height() * NOW_LABEL_LOW_Y_RATIO;
    let temperature_above = ctx
        .live_temperature
        .is_some_and(|t| t * 10.0 > f32::from(setpoint));
    let (setpoint_row, temperature_row) = if temperature_above {
        (low, high)
    } else {
        (high, low)
    };

    let text_x = x + g.hour_step() * NOW_LABEL_GAP_RATIO;
    let mut label = Label::new();
    let _ = core::fmt::write(
        &mut label,
        format_args!("S:{} °C", format_decitemp(i32::from(setpoint))),
    );
    Text::new(
        label.as_str(),
        g.point(text_x, setpoint_row),
        MonoTextStyle::new(FONT_EMPHASIS, setpoint_color),
    )
    .draw(display)?;

    if let Some(temperature) = ctx.live_temperature {
        let mut label = Label::new();
        let _ = core::fmt::write(
            &mut label,
            format_args!("T:{} °C", format_celsius(temperature)),
        );
        Text::new(
            label.as_str(),
            g.point(text_x, temperature_row),
            MonoTextStyle::new(FONT_EMPHASIS, COLOR_TEMPERATURE),
        )
        .draw(display)?;
    }
    Ok(())
}

/// Heater on-time for the displayed day, under the end of the bar
fn draw_on_time<D: DrawTarget<Color = Rgb565>>(
    g: &ChartGeometry,
    ctx: &RenderContext<'_>,
    display: &mut D,
) -> Result<(), D::Error> {
    if ctx.history.humidity_series(ctx.day).is_none() {
        return Ok(());
    }

    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Right)
        .baseline(Baseline::Bottom)
        .build();
    Text::with_text_style(
        format_on_time(ctx.history.on_minutes(ctx.day)).as_str(),
        g.point(g.day_end(), g.height() - 2.0),
        MonoTextStyle::new(FONT_READOUT, COLOR_LABEL),
        text_style,
    )
    .draw(display)?;
    Ok(())
}

/// Cursor line and a box with the recorded values under it
fn draw_tooltip<D: DrawTarget<Color = Rgb565>>(
    g: &ChartGeometry,
    tooltip: &Tooltip,
    display: &mut D,
) -> Result<(), D::Error> {
    let x = tooltip.x as f32;
    draw_line(
        g.point(x, g.top()),
        g.point(x, g.baseline()),
        COLOR_TOOLTIP_CURSOR,
        1,
        LineStyle::Solid,
        display,
    )?;

    let font: &MonoFont<'static> = FONT_READOUT;
    let line_height = font.character_size.height as i32 + 2;
    let mut lines: [Label; 4] = Default::default();

    let _ = core::fmt::write(
        &mut lines[0],
        format_args!("Ore {}", format_clock(tooltip.minute)),
    );
    let _ = match tooltip.temperature {
        Some(t) => core::fmt::write(
            &mut lines[1],
            format_args!("T: {} °C", format_decitemp(i32::from(t))),
        ),
        None => core::fmt::write(&mut lines[1], format_args!("T: --")),
    };
    let _ = core::fmt::write(
        &mut lines[2],
        format_args!("S: {} °C", format_decitemp(i32::from(tooltip.setpoint))),
    );
    let _ = match tooltip.humidity {
        Some(h) => core::fmt::write(&mut lines[3], format_args!("RH: {} %", h)),
        None => core::fmt::write(&mut lines[3], format_args!("RH: --")),
    };

    let left = g.left() + TOOLTIP_X_HOURS * g.hour_step();
    let top = g.top();
    let height = (line_height * lines.len() as i32 + 2 * BOX_PADDING_PX) as f32;
    fill_area(
        g,
        (left, top),
        (left + TOOLTIP_WIDTH_HOURS * g.hour_step(), top + height),
        COLOR_TOOLTIP,
        display,
    )?;

    let origin = g.point(left, top) + Point::new(BOX_PADDING_PX, BOX_PADDING_PX);
    let style = MonoTextStyle::new(font, COLOR_LABEL);
    let text_style = TextStyleBuilder::new().baseline(Baseline::Top).build();
    for (row, line) in lines.iter().enumerate() {
        Text::with_text_style(
            line.as_str(),
            origin + Point::new(0, row as i32 * line_height),
            style,
            text_style,
        )
        .draw(display)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelConfig;
    use crate::framebuffer::FrameBuffer;
    use crate::protocol::{
        BankName, SAMPLE_FRAME_LEN, SAMPLE_HEADER_LEN, SETTINGS_FIELD_COUNT, SettingsBlock,
        SettingsFrame,
    };
    use crate::ui::core::PointerEvent;
    use crate::ui::editor::DisplayOptions;

    const SIZE: Size = Size::new(800, 480);
    const DAY: Weekday = Weekday::MONDAY;

    fn store() -> ScheduleStore {
        let mut fields = [0u8; SETTINGS_FIELD_COUNT];
        fields[..SLOTS_PER_BANK].fill(150);
        let mut store = ScheduleStore::new();
        store.apply(SettingsFrame::new(
            SettingsBlock::from_fields(fields),
            core::array::from_fn(BankName::numbered),
        ));
        store.select_bank(0);
        store
    }

    /// Heater on from 06:00 to 08:00, humidity 50 % otherwise
    fn history() -> HistoryBuffer {
        let mut history = HistoryBuffer::new();
        let mut blob = [0u8; SAMPLE_FRAME_LEN];
        blob[0] = b'U';
        blob[1] = DAY.id();
        for (minute, sample) in blob[SAMPLE_HEADER_LEN..].iter_mut().enumerate() {
            let on = (360..480).contains(&minute);
            *sample = 50 | if on { 0x80 } else { 0 };
        }
        history.ingest_bytes(&blob).expect("valid blob");
        history
    }

    fn render(editor: &CurveEditor, store: &ScheduleStore, history: &HistoryBuffer) -> FrameBuffer {
        let mut fb = FrameBuffer::new(SIZE);
        let ctx = RenderContext {
            store,
            history,
            day: DAY,
            live_temperature: Some(19.5),
            now_minute: Some(600),
        };
        editor.draw(&ctx, &mut fb).expect("infallible");
        fb
    }

    #[test]
    fn test_step_line_frame() {
        let editor = CurveEditor::new(SIZE, &PanelConfig::default());
        let store = store();
        let history = HistoryBuffer::new();
        let fb = render(&editor, &store, &history);
        let g = editor.geometry();

        let probe = g.point(g.slot_to_x(3) + g.slot_width() / 2.0, g.decitemp_to_y(150));
        assert_eq!(fb.pixel(probe.x, probe.y), Some(COLOR_SETPOINT), "step line");
        assert_eq!(
            fb.pixel(g.width() as i32 - 1, 1),
            Some(COLOR_PLOT_BACKGROUND),
            "plot background in step mode"
        );
        assert_eq!(
            fb.pixel(g.width() as i32 - 1, g.height() as i32 - 1),
            Some(COLOR_CANVAS)
        );
    }

    #[test]
    fn test_marker_frame() {
        let mut editor = CurveEditor::new(SIZE, &PanelConfig::default());
        editor.set_options(DisplayOptions {
            markers: true,
            ..DisplayOptions::default()
        });
        let store = store();
        let history = HistoryBuffer::new();
        let fb = render(&editor, &store, &history);
        let g = editor.geometry();

        let y = g.point(0.0, g.decitemp_to_y(150)).y;
        let regular = g.point(g.slot_to_x(10) + 2.0, 0.0).x;
        let broadcast = g.point(g.slot_to_x(BROADCAST_SLOT) + 2.0, 0.0).x;
        assert_eq!(fb.pixel(regular, y), Some(COLOR_MARKER));
        assert_eq!(fb.pixel(broadcast, y), Some(COLOR_MARKER_BROADCAST));
        assert_eq!(fb.pixel(g.width() as i32 - 1, 1), Some(COLOR_CANVAS));
    }

    #[test]
    fn test_on_bar_and_shading() {
        let editor = CurveEditor::new(SIZE, &PanelConfig::default());
        let store = store();
        let history = history();
        let fb = render(&editor, &store, &history);
        let g = editor.geometry();

        let bar_y = g.point(0.0, on_bar_top(g) + 1.0).y;
        let on_x = g.point(g.minute_to_x(420), 0.0).x;
        let off_x = g.point(g.minute_to_x(900), 0.0).x;
        assert_eq!(fb.pixel(on_x, bar_y), Some(COLOR_ON_BAR));
        assert_eq!(fb.pixel(off_x, bar_y), Some(COLOR_ON_TRACK));

        // Above the labels and below the step line
        let shade_y = g.point(0.0, g.decitemp_to_y(135)).y;
        let shade_x = g.point(g.minute_to_x(400) + 1.0, 0.0).x;
        assert_eq!(fb.pixel(shade_x, shade_y), Some(COLOR_ON_SHADE));
    }

    #[test]
    fn test_readout_while_dragging() {
        let mut editor = CurveEditor::new(SIZE, &PanelConfig::default());
        let mut store = store();
        let history = HistoryBuffer::new();

        let g = *editor.geometry();
        let press = g.point(g.slot_to_x(20) + 3.0, g.decitemp_to_y(150));
        editor.handle_pointer(PointerEvent::Down(press), &mut store, &history, DAY);
        assert_eq!(editor.selected_slot(), Some(20));

        let fb = render(&editor, &store, &history);
        let left = g.slot_to_x(20) + g.slot_width() * READOUT_SLOT_OFFSET;
        let corner = g.point(left + 1.0, g.decitemp_to_y(150) - 0.2 * g.bottom_offset() - 2.0);
        assert_eq!(fb.pixel(corner.x, corner.y), Some(COLOR_READOUT));

        let level = g.point(1.0, g.decitemp_to_y(150) - 0.02 * g.bottom_offset() + 1.0);
        assert_eq!(
            fb.pixel(level.x, level.y),
            Some(COLOR_LEVEL_WHOLE_DEGREE),
            "15.0 sits on a whole degree"
        );
    }
}
