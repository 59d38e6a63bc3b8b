//! The revenue chart's drill-down between a monthly and a daily view.
//!
//! [RevenueDrilldown] owns the aggregation state of one open billing view.
//! It starts in the monthly view of the reporting year and moves between
//! views in response to three kinds of input:
//!
//! - **Zoom window changes** reported by the chart. Zooming in to a window
//!   shorter than [DrilldownConfig::zoom_in_threshold] while in the monthly
//!   view drills down to the month under the middle of the window. Zooming
//!   out to a window longer than [DrilldownConfig::zoom_out_threshold] while
//!   in the daily view returns to the monthly view. The zoom-out threshold is
//!   shorter than the zoom-in threshold so that a gesture ending near either
//!   boundary does not flip back and forth between views.
//! - **Reset requests**, which return to the monthly view.
//! - **Focus requests**, which always jump to the daily view of the month
//!   containing a date and ask the chart to centre on that date.
//!
//! Every transition recomputes the series from the full transaction snapshot.

use std::sync::Arc;

use serde::Serialize;
use time::Duration;

use crate::{
    Error,
    billing::{
        aggregation::{daily_series, monthly_series},
        record::TransactionRecord,
        series::{Period, Series, window_length},
    },
    timezone::LocalTimezone,
};

/// The default window length below which the monthly view drills down.
pub const DEFAULT_ZOOM_IN_DAYS: i64 = 45;
/// The default window length above which the daily view returns to monthly.
pub const DEFAULT_ZOOM_OUT_DAYS: i64 = 28;
/// The longest zoom threshold accepted, roughly ten years.
pub const MAX_ZOOM_DAYS: i64 = 3660;

/// How far either side of a focused date the chart window extends.
const FOCUS_MARGIN: Duration = Duration::days(2);

/// The thresholds that decide when a zoom gesture changes the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrilldownConfig {
    /// In the monthly view, a window strictly shorter than this drills down.
    pub zoom_in_threshold: Duration,
    /// In the daily view, a window strictly longer than this returns to monthly.
    pub zoom_out_threshold: Duration,
}

impl DrilldownConfig {
    /// Create a config from thresholds given in whole days.
    ///
    /// # Errors
    /// Returns [Error::InvalidZoomThresholds] unless
    /// `0 < zoom_out_days < zoom_in_days <= MAX_ZOOM_DAYS`. The zoom-out
    /// threshold must be the shorter one, otherwise a window between the two
    /// would switch views on every zoom event.
    pub fn from_days(zoom_in_days: i64, zoom_out_days: i64) -> Result<Self, Error> {
        if zoom_out_days <= 0 || zoom_out_days >= zoom_in_days || zoom_in_days > MAX_ZOOM_DAYS {
            return Err(Error::InvalidZoomThresholds {
                zoom_in_days,
                zoom_out_days,
                max_days: MAX_ZOOM_DAYS,
            });
        }

        Ok(Self {
            zoom_in_threshold: Duration::days(zoom_in_days),
            zoom_out_threshold: Duration::days(zoom_out_days),
        })
    }
}

impl Default for DrilldownConfig {
    fn default() -> Self {
        Self {
            zoom_in_threshold: Duration::days(DEFAULT_ZOOM_IN_DAYS),
            zoom_out_threshold: Duration::days(DEFAULT_ZOOM_OUT_DAYS),
        }
    }
}

/// Which view of the revenue chart is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrilldownState {
    /// One bucket per month of the reporting year.
    Monthly,
    /// One bucket per day of the selected month.
    Daily(Period),
}

/// The aggregation granularity of a [DrilldownState], without its period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// Revenue per month.
    Monthly,
    /// Revenue per day.
    Daily,
}

/// An instruction for the chart's visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceCommand {
    /// Drop any explicit zoom window and fit the whole series.
    AutoFit,
    /// Narrow the visible window to the given range of epoch milliseconds.
    ZoomTo {
        /// The start of the window.
        min_timestamp: i64,
        /// The end of the window.
        max_timestamp: i64,
    },
}

/// An input to the drill-down, as reported by the chart or the billing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartEvent {
    /// The chart's visible window changed, bounds in epoch milliseconds.
    ZoomWindowChanged {
        /// The start of the visible window.
        min_timestamp: i64,
        /// The end of the visible window.
        max_timestamp: i64,
    },
    /// The user asked the chart to reset its zoom.
    ResetZoom,
    /// The page asked to show the day containing `timestamp`.
    FocusRequested {
        /// The date to focus on, in epoch milliseconds.
        timestamp: i64,
    },
}

/// The drill-down state of one revenue chart.
#[derive(Debug, Clone)]
pub struct RevenueDrilldown {
    config: DrilldownConfig,
    timezone: LocalTimezone,
    year: i32,
    state: DrilldownState,
    transactions: Vec<TransactionRecord>,
    series: Arc<Series>,
}

impl RevenueDrilldown {
    /// Create a drill-down in the monthly view of `year` with no transactions.
    ///
    /// `timezone` decides which calendar day a timestamp falls on.
    pub fn new(config: DrilldownConfig, timezone: LocalTimezone, year: i32) -> Self {
        let transactions = Vec::new();
        let series = Arc::new(monthly_series(&transactions, year, timezone));

        Self {
            config,
            timezone,
            year,
            state: DrilldownState::Monthly,
            transactions,
            series,
        }
    }

    /// The active view.
    pub fn state(&self) -> DrilldownState {
        self.state
    }

    /// The aggregation granularity of the active view.
    pub fn mode(&self) -> AggregationMode {
        match self.state {
            DrilldownState::Monthly => AggregationMode::Monthly,
            DrilldownState::Daily(_) => AggregationMode::Daily,
        }
    }

    /// The month shown by the daily view, `None` in the monthly view.
    pub fn selected_period(&self) -> Option<Period> {
        match self.state {
            DrilldownState::Monthly => None,
            DrilldownState::Daily(period) => Some(period),
        }
    }

    /// The series for the active view.
    pub fn series(&self) -> Arc<Series> {
        Arc::clone(&self.series)
    }

    /// The year shown by the monthly view.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The number of records in the current snapshot.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Dispatch `event` to the matching operation.
    pub fn handle(&mut self, event: ChartEvent) -> Option<SurfaceCommand> {
        match event {
            ChartEvent::ZoomWindowChanged {
                min_timestamp,
                max_timestamp,
            } => self.on_zoom_window_changed(min_timestamp, max_timestamp),
            ChartEvent::ResetZoom => self.reset_to_monthly(),
            ChartEvent::FocusRequested { timestamp } => self.focus_on_date(timestamp),
        }
    }

    /// Replace the transaction snapshot and recompute the active view.
    ///
    /// The view itself does not change: a daily view stays on its month.
    pub fn load_transactions(&mut self, transactions: Vec<TransactionRecord>) {
        self.transactions = transactions;
        self.recompute();

        tracing::debug!(
            "loaded {} transactions into the {:?} view",
            self.transactions.len(),
            self.state
        );
    }

    /// React to the chart's visible window changing.
    ///
    /// The window bounds may be given in either order.
    pub fn on_zoom_window_changed(
        &mut self,
        min_timestamp: i64,
        max_timestamp: i64,
    ) -> Option<SurfaceCommand> {
        let (min_timestamp, max_timestamp) = if min_timestamp <= max_timestamp {
            (min_timestamp, max_timestamp)
        } else {
            (max_timestamp, min_timestamp)
        };
        let window = window_length(min_timestamp, max_timestamp);

        match self.state {
            DrilldownState::Daily(_) if window > self.config.zoom_out_threshold => {
                self.reset_to_monthly()
            }
            DrilldownState::Daily(_) => None,
            DrilldownState::Monthly if window < self.config.zoom_in_threshold => {
                let midpoint = min_timestamp + (max_timestamp - min_timestamp) / 2;

                match Period::containing(midpoint, self.timezone) {
                    Some(period) => {
                        tracing::debug!("zoomed in to {window}, drilling down to {period:?}");
                        self.show_daily(period);
                    }
                    None => tracing::warn!("ignoring zoom window with midpoint {midpoint}"),
                }

                None
            }
            DrilldownState::Monthly => None,
        }
    }

    /// Return to the monthly view.
    ///
    /// Does nothing in the monthly view. Otherwise asks the chart to drop its
    /// zoom window so the whole year is visible again.
    pub fn reset_to_monthly(&mut self) -> Option<SurfaceCommand> {
        if self.state == DrilldownState::Monthly {
            return None;
        }

        tracing::debug!("returning to the monthly view from {:?}", self.state);
        self.state = DrilldownState::Monthly;
        self.recompute();

        Some(SurfaceCommand::AutoFit)
    }

    /// Jump to the daily view of the month containing `timestamp`.
    ///
    /// Always recomputes, whatever the active view, and asks the chart to
    /// centre a four day window on `timestamp`. Timestamps outside the range
    /// of representable dates are ignored.
    pub fn focus_on_date(&mut self, timestamp: i64) -> Option<SurfaceCommand> {
        let Some(period) = Period::containing(timestamp, self.timezone) else {
            tracing::warn!("ignoring focus request for out of range timestamp {timestamp}");
            return None;
        };

        tracing::debug!("focusing on {timestamp} in {period:?}");
        self.show_daily(period);

        let margin = FOCUS_MARGIN.whole_milliseconds() as i64;

        Some(SurfaceCommand::ZoomTo {
            min_timestamp: timestamp.saturating_sub(margin),
            max_timestamp: timestamp.saturating_add(margin),
        })
    }

    fn show_daily(&mut self, period: Period) {
        self.state = DrilldownState::Daily(period);
        self.recompute();
    }

    fn recompute(&mut self) {
        let series = match self.state {
            DrilldownState::Monthly => {
                monthly_series(&self.transactions, self.year, self.timezone)
            }
            DrilldownState::Daily(period) => {
                daily_series(&self.transactions, period, self.timezone)
            }
        };

        self.series = Arc::new(series);
    }
}
