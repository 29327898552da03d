//! Per-weekday sample history
//!
//! The device streams one blob per weekday and series, in no particular
//! order, and resends them whenever it likes. Each blob replaces the stored
//! series for its weekday; everything else is left alone.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use log::debug;

use crate::protocol::{
    HumiditySample, MINUTES_PER_DAY, ProtocolResult, SampleFrame, SampleSeries, SeriesKind,
    Weekday,
};

/// Closed-open run of minutes `[start_minute, end_minute)` with the heater on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnInterval {
    pub start_minute: u16,
    pub end_minute: u16,
}

impl OnInterval {
    /// Length in minutes
    pub const fn minutes(&self) -> u16 {
        self.end_minute - self.start_minute
    }
}

/// One point of a display trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracePoint {
    /// Minute of day (0..1440)
    pub minute: u16,
    /// Decitemp for temperature, percent for humidity
    pub value: u8,
}

/// Duration in minutes, displayed as `H:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OnDuration(pub u32);

impl fmt::Display for OnDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.0 / 60, self.0 % 60)
    }
}

#[derive(Debug, Clone, Default)]
struct DayHistory {
    temperature: Option<Vec<u8>>,
    humidity: Option<Vec<HumiditySample>>,
}

/// Temperature and humidity history for the seven weekdays
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    days: [DayHistory; Weekday::COUNT],
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the series carried by `frame`
    pub fn ingest(&mut self, frame: SampleFrame) {
        let day = &mut self.days[frame.weekday.index()];
        match frame.series {
            SampleSeries::Temperature(samples) => {
                debug!(" Temperature history updated for {}", frame.weekday);
                day.temperature = Some(samples);
            }
            SampleSeries::Humidity(samples) => {
                debug!(" Humidity history updated for {}", frame.weekday);
                day.humidity = Some(samples);
            }
        }
    }

    /// Validate a raw blob and ingest it
    ///
    /// A malformed blob leaves the buffer untouched.
    pub fn ingest_bytes(&mut self, bytes: &[u8]) -> ProtocolResult<SeriesKind> {
        let frame = SampleFrame::decode(bytes)?;
        let kind = frame.kind();
        self.ingest(frame);
        Ok(kind)
    }

    /// Whether any series has been received for `weekday`
    pub fn has_data(&self, weekday: Weekday) -> bool {
        let day = &self.days[weekday.index()];
        day.temperature.is_some() || day.humidity.is_some()
    }

    /// Full temperature series, if received
    pub fn temperature_series(&self, weekday: Weekday) -> Option<&[u8]> {
        self.days[weekday.index()].temperature.as_deref()
    }

    /// Full humidity series, if received
    pub fn humidity_series(&self, weekday: Weekday) -> Option<&[HumiditySample]> {
        self.days[weekday.index()].humidity.as_deref()
    }

    /// Raw temperature sample (decitemp) at `minute`
    pub fn temperature_at(&self, weekday: Weekday, minute: u16) -> Option<u8> {
        self.temperature_series(weekday)?
            .get(usize::from(minute))
            .copied()
    }

    /// Humidity sample at `minute`
    pub fn humidity_at(&self, weekday: Weekday, minute: u16) -> Option<HumiditySample> {
        self.humidity_series(weekday)?
            .get(usize::from(minute))
            .copied()
    }

    /// Coalesce minutes with the heater on into intervals
    ///
    /// Only the recorded part of the day counts: the same zero-percent
    /// bounds as [`humidity_trace`](Self::humidity_trace) apply.
    pub fn on_intervals(&self, weekday: Weekday) -> Vec<OnInterval> {
        let mut intervals = Vec::new();
        let Some(samples) = self.humidity_series(weekday) else {
            return intervals;
        };

        let mut start: Option<u16> = None;
        let mut end_of_data = 0;
        let recorded = samples
            .iter()
            .enumerate()
            .take(MINUTES_PER_DAY)
            .skip_while(|(_, sample)| sample.percent == 0)
            .take_while(|(_, sample)| sample.percent != 0);
        for (minute, sample) in recorded {
            let minute = minute as u16;
            end_of_data = minute + 1;
            match (sample.heater_on, start) {
                (true, None) => start = Some(minute),
                (false, Some(start_minute)) => {
                    intervals.push(OnInterval {
                        start_minute,
                        end_minute: minute,
                    });
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(start_minute) = start {
            intervals.push(OnInterval {
                start_minute,
                end_minute: end_of_data,
            });
        }

        intervals
    }

    /// Total minutes with the heater on
    pub fn on_minutes(&self, weekday: Weekday) -> OnDuration {
        OnDuration(
            self.on_intervals(weekday)
                .iter()
                .map(|interval| u32::from(interval.minutes()))
                .sum(),
        )
    }

    /// Temperature display trace
    ///
    /// Leading zeros are minutes not yet received; the first zero after
    /// data has started marks the end of the recorded day.
    pub fn temperature_trace(&self, weekday: Weekday) -> impl Iterator<Item = TracePoint> + '_ {
        trace(
            self.temperature_series(weekday)
                .unwrap_or_default()
                .iter()
                .copied(),
        )
    }

    /// Humidity display trace (percent), with the same zero handling
    pub fn humidity_trace(&self, weekday: Weekday) -> impl Iterator<Item = TracePoint> + '_ {
        trace(
            self.humidity_series(weekday)
                .unwrap_or_default()
                .iter()
                .map(|sample| sample.percent),
        )
    }
}

fn trace(values: impl Iterator<Item = u8>) -> impl Iterator<Item = TracePoint> {
    values
        .enumerate()
        .skip_while(|&(_, value)| value == 0)
        .take_while(|&(_, value)| value != 0)
        .map(|(minute, value)| TracePoint {
            minute: minute as u16,
            value,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{SAMPLE_FRAME_LEN, SAMPLE_HEADER_LEN};
    use alloc::vec;

    fn blob(tag: u8, weekday: u8, samples: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; SAMPLE_FRAME_LEN];
        bytes[0] = tag;
        bytes[1] = weekday;
        bytes[SAMPLE_HEADER_LEN..SAMPLE_HEADER_LEN + samples.len()].copy_from_slice(samples);
        bytes
    }

    #[test]
    fn test_ingest_replaces_only_matching_series() {
        let mut history = HistoryBuffer::new();
        history.ingest_bytes(&blob(b'T', 3, &[150; 10])).unwrap();
        history.ingest_bytes(&blob(b'U', 3, &[40; 10])).unwrap();
        history.ingest_bytes(&blob(b'T', 3, &[180; 10])).unwrap();

        assert_eq!(history.temperature_at(Weekday::WEDNESDAY, 0), Some(180));
        assert_eq!(
            history.humidity_at(Weekday::WEDNESDAY, 0).map(|s| s.percent),
            Some(40)
        );
        assert!(!history.has_data(Weekday::TUESDAY));
        assert_eq!(history.temperature_at(Weekday::TUESDAY, 0), None);
    }

    #[test]
    fn test_short_blob_leaves_history_unchanged() {
        let mut history = HistoryBuffer::new();
        history.ingest_bytes(&blob(b'T', 3, &[150; 10])).unwrap();

        let mut short = blob(b'T', 3, &[220; 10]);
        short.truncate(SAMPLE_FRAME_LEN - 1);
        assert!(history.ingest_bytes(&short).is_err());

        assert_eq!(
            history.temperature_at(Weekday::WEDNESDAY, 0),
            Some(150),
            "Rejected blob must not touch stored series"
        );
    }

    #[test]
    fn test_bad_tag_and_weekday_leave_history_unchanged() {
        let mut history = HistoryBuffer::new();
        assert!(history.ingest_bytes(&blob(b'Q', 2, &[1; 4])).is_err());
        assert!(history.ingest_bytes(&blob(b'T', 7, &[1; 4])).is_err());
        assert!(Weekday::all().all(|day| !history.has_data(day)));
    }

    #[test]
    fn test_on_intervals_coalesce() {
        let mut samples = [40u8; 12];
        for minute in [2, 3, 4, 8, 11] {
            samples[minute] |= 0x80;
        }
        let mut history = HistoryBuffer::new();
        history.ingest_bytes(&blob(b'U', 1, &samples)).unwrap();

        let intervals = history.on_intervals(Weekday::MONDAY);
        assert_eq!(
            intervals,
            vec![
                OnInterval {
                    start_minute: 2,
                    end_minute: 5
                },
                OnInterval {
                    start_minute: 8,
                    end_minute: 9
                },
                OnInterval {
                    start_minute: 11,
                    end_minute: 12
                },
            ]
        );
        assert_eq!(history.on_minutes(Weekday::MONDAY), OnDuration(5));
    }

    #[test]
    fn test_on_time_stops_at_end_of_data() {
        let mut samples = vec![0x80u8; 180];
        samples[..60].fill(0x80 | 35);
        samples[60..120].fill(45);
        let mut history = HistoryBuffer::new();
        history.ingest_bytes(&blob(b'U', 2, &samples)).unwrap();

        assert_eq!(history.humidity_trace(Weekday::TUESDAY).count(), 120);
        assert_eq!(
            history.on_intervals(Weekday::TUESDAY),
            vec![OnInterval {
                start_minute: 0,
                end_minute: 60
            }],
            "Heater bits after the end of data must not count"
        );
        assert_eq!(history.on_minutes(Weekday::TUESDAY), OnDuration(60));
    }

    #[test]
    fn test_on_time_skips_unreceived_minutes() {
        let mut samples = vec![0x80u8; 90];
        samples[30..].fill(0x80 | 50);
        let mut history = HistoryBuffer::new();
        history.ingest_bytes(&blob(b'U', 2, &samples)).unwrap();

        assert_eq!(
            history.on_minutes(Weekday::TUESDAY),
            OnDuration(60),
            "Minutes before the first reading must not count"
        );
    }

    #[test]
    fn test_interval_running_to_midnight() {
        let mut samples = vec![0x80 | 30u8; MINUTES_PER_DAY];
        samples[0] = 30;
        let mut history = HistoryBuffer::new();
        history.ingest_bytes(&blob(b'U', 0, &samples)).unwrap();

        let intervals = history.on_intervals(Weekday::SUNDAY);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].end_minute as usize, MINUTES_PER_DAY);
        assert_eq!(
            alloc::format!("{}", history.on_minutes(Weekday::SUNDAY)),
            "23:59"
        );
    }

    #[test]
    fn test_trace_skips_leading_zeros_and_truncates() {
        let samples = [0, 0, 150, 151, 152, 0, 160, 161];
        let mut history = HistoryBuffer::new();
        history.ingest_bytes(&blob(b'T', 4, &samples)).unwrap();

        let trace: Vec<TracePoint> = history.temperature_trace(Weekday::THURSDAY).collect();
        assert_eq!(
            trace.iter().map(|p| (p.minute, p.value)).collect::<Vec<_>>(),
            vec![(2, 150), (3, 151), (4, 152)],
            "Trace must start at the first sample and stop at the next zero"
        );
    }

    #[test]
    fn test_humidity_trace_ignores_heater_bit() {
        let samples = [0, 0x80, 0x80 | 45, 46];
        let mut history = HistoryBuffer::new();
        history.ingest_bytes(&blob(b'U', 5, &samples)).unwrap();

        let trace: Vec<TracePoint> = history.humidity_trace(Weekday::FRIDAY).collect();
        assert_eq!(trace.first().map(|p| (p.minute, p.value)), Some((2, 45)));
        assert_eq!(trace.len(), 2);
    }

    #[test]
    fn test_empty_day_has_no_trace() {
        let history = HistoryBuffer::new();
        assert_eq!(history.temperature_trace(Weekday::SUNDAY).count(), 0);
        assert!(history.on_intervals(Weekday::SUNDAY).is_empty());
        assert_eq!(history.on_minutes(Weekday::SUNDAY), OnDuration(0));
    }
}
