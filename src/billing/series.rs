//! The time series shape consumed by the revenue chart, and the calendar
//! helpers used to build it.

use serde::Serialize;
use time::{Date, Duration, Month, OffsetDateTime};

use crate::timezone::LocalTimezone;

/// A calendar month of a specific year, the unit the daily view is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    /// The calendar year.
    pub year: i32,
    /// The month of `year`.
    pub month: Month,
}

impl Period {
    /// Create a new period.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The period containing the local date of `timestamp` (epoch milliseconds).
    ///
    /// Returns `None` if `timestamp` is outside the range of representable dates.
    pub fn containing(timestamp: i64, timezone: LocalTimezone) -> Option<Self> {
        let date = local_date_of(timestamp, timezone)?;

        Some(Self::new(date.year(), date.month()))
    }

    /// Whether `date` falls within this period.
    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Every day of the period in order, e.g. 29 dates for February in a leap year.
    pub fn days(&self) -> Vec<Date> {
        let Ok(first) = Date::from_calendar_date(self.year, self.month, 1) else {
            return Vec::new();
        };

        let mut days = Vec::with_capacity(31);
        let mut day = first;

        loop {
            days.push(day);

            match day.next_day() {
                Some(next) if next.month() == self.month => day = next,
                _ => break,
            }
        }

        days
    }
}

/// A single plotted value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// The first instant of the bucket in epoch milliseconds.
    pub timestamp: i64,
    /// The revenue summed into the bucket.
    pub value: f64,
}

/// A labelled sequence of points, one per bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// The legend label, e.g. "Total Revenue" or "Revenue (March)".
    pub label: String,
    /// The points in chronological order.
    pub points: Vec<SeriesPoint>,
}

impl Series {
    /// The sum of every point's value.
    pub fn total(&self) -> f64 {
        self.points.iter().map(|point| point.value).sum()
    }
}

/// The label of the series that shows each month of the year.
pub const MONTHLY_SERIES_LABEL: &str = "Total Revenue";

/// The label of the series that shows each day of `period`.
pub fn daily_series_label(period: Period) -> String {
    format!("Revenue ({})", period.month)
}

/// The epoch milliseconds of local midnight at the start of `date`.
pub fn start_of_day_timestamp(date: Date, timezone: LocalTimezone) -> i64 {
    let midnight = date.midnight();
    // The offset at midnight UTC can differ from the one at local midnight
    // when a daylight saving change falls between the two.
    let guess = timezone.offset_at(midnight.assume_utc());
    let offset = timezone.offset_at(midnight.assume_offset(guess));
    let instant = midnight.assume_offset(offset);

    (instant.unix_timestamp_nanos() / 1_000_000) as i64
}

/// The local calendar date of `timestamp` (epoch milliseconds).
pub fn local_date_of(timestamp: i64, timezone: LocalTimezone) -> Option<Date> {
    let instant =
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp) * 1_000_000).ok()?;

    Some(timezone.to_local(instant).date())
}

/// The length of the window between two epoch millisecond timestamps.
pub fn window_length(min_timestamp: i64, max_timestamp: i64) -> Duration {
    Duration::milliseconds(max_timestamp.saturating_sub(min_timestamp))
}
