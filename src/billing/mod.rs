//! The billing overview and its revenue drill-down chart.
//!
//! The revenue chart shows paid invoice income for the current year, one
//! point per month. Zooming in on the chart drills down to the days of one
//! month and zooming back out returns to the months of the year. See
//! [drilldown] for the rules.

mod activity;
mod aggregation;
mod chart;
mod drilldown;
mod handlers;
mod history;
mod record;
mod series;
mod summary;
mod views;

pub use drilldown::{
    AggregationMode, ChartEvent, DEFAULT_ZOOM_IN_DAYS, DEFAULT_ZOOM_OUT_DAYS, DrilldownConfig,
    DrilldownState, MAX_ZOOM_DAYS, RevenueDrilldown, SurfaceCommand,
};
pub use handlers::{
    close_endpoint, focus_endpoint, get_billing_page, refresh_endpoint, reset_endpoint,
    zoom_endpoint,
};
pub use history::get_history_page;
pub use record::{TransactionRecord, TransactionStatus};
pub use series::{Period, Series, SeriesPoint};
pub use views::{DrilldownViews, ViewId};
