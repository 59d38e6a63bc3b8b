//! Clinic Billing is a web app for tracking a clinic's invoices and expenses.
//!
//! This library provides a REST API that directly serves HTML pages. The
//! billing page shows a revenue chart that drills down from the months of the
//! current year to the days of a single month as the chart is zoomed in, and
//! back out again as it is zoomed out. The drill-down rules live in
//! [RevenueDrilldown] and can be used without the web server.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod billing;
mod database_id;
mod db;
mod endpoints;
mod error;
mod expense;
mod html;
mod internal_server_error;
mod invoice;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use billing::{
    AggregationMode, ChartEvent, DEFAULT_ZOOM_IN_DAYS, DEFAULT_ZOOM_OUT_DAYS, DrilldownConfig,
    DrilldownState, DrilldownViews, MAX_ZOOM_DAYS, Period, RevenueDrilldown, Series, SeriesPoint,
    SurfaceCommand, TransactionRecord, TransactionStatus, ViewId,
};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::LocalTimezone;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
