use chrono::{Datelike, NaiveDate};

use super::activity::Activity;

/// Maps calendar dates to horizontal pixels over a fixed span.
///
/// The span starts on January 1 of the year holding the earliest activity
/// start date and ends on December 31 of the horizon year. Positions outside
/// the span clamp to its edges.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineMapper {
    /// First day of the timeline.
    pub start: NaiveDate,
    /// Last day of the timeline.
    pub end: NaiveDate,
    /// Left edge of the plotted area, in pixels.
    pub left: f32,
    /// Width of the plotted area, in pixels.
    pub width: f32,
}

impl TimelineMapper {
    pub fn new(start: NaiveDate, end: NaiveDate, left: f32, width: f32) -> Self {
        let end = if end > start { end } else { start + chrono::Duration::days(1) };
        Self {
            start,
            end,
            left,
            width: width.max(1.0),
        }
    }

    /// Build the span from the activities' start dates; `today` is used when
    /// no activity has a start date.
    pub fn for_activities(
        activities: &[Activity],
        horizon_year: i32,
        today: NaiveDate,
        left: f32,
        width: f32,
    ) -> Self {
        let earliest = activities
            .iter()
            .filter_map(|a| a.start_date)
            .min()
            .unwrap_or(today);
        let start = NaiveDate::from_ymd_opt(earliest.year(), 1, 1).unwrap_or(earliest);
        let end_year = horizon_year.max(earliest.year());
        let end = NaiveDate::from_ymd_opt(end_year, 12, 31).unwrap_or(start);
        Self::new(start, end, left, width)
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Convert a date to an x-pixel position, clamped to the plotted area.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        let ratio = (date - self.start).num_days() as f64 / self.span_days() as f64;
        self.left + self.width * ratio.clamp(0.0, 1.0) as f32
    }

    /// Convert an x-pixel position back to the nearest whole day.
    pub fn x_to_date(&self, x: f32) -> NaiveDate {
        let ratio = (f64::from(x - self.left) / f64::from(self.width)).clamp(0.0, 1.0);
        let days = (ratio * self.span_days() as f64).round() as i64;
        self.start + chrono::Duration::days(days)
    }

    /// Whole days represented by a horizontal pixel delta.
    pub fn days_for_delta(&self, delta_x: f32) -> i64 {
        (f64::from(delta_x) / f64::from(self.width) * self.span_days() as f64).round() as i64
    }

    /// Shift `date` by the whole days a pixel delta represents.
    pub fn shift_date(&self, date: NaiveDate, delta_x: f32) -> NaiveDate {
        date + chrono::Duration::days(self.days_for_delta(delta_x))
    }

    /// January 1 of each year inside the span, with its x position.
    pub fn year_marks(&self) -> Vec<(i32, f32)> {
        (self.start.year()..=self.end.year())
            .filter_map(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .filter(|d| *d >= self.start && *d <= self.end)
            .map(|d| (d.year(), self.date_to_x(d)))
            .collect()
    }
}
