//! Billing HTTP handlers.
//!
//! The billing page opens a view in the [DrilldownViews] registry and the
//! JSON endpoints below drive that view's [RevenueDrilldown]. Every endpoint
//! answers with the [ChartUpdate] the browser should apply.
//!
//! The database lock and the view registry lock are never held at the same
//! time.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    billing::{
        activity::{Activity, RECENT_ACTIVITY_LIMIT, get_activity, recent_activity_view},
        chart::{ChartUpdate, revenue_chart, revenue_chart_script, revenue_chart_view},
        drilldown::{ChartEvent, DrilldownConfig, RevenueDrilldown},
        summary::{BillingSummary, get_billing_summary, summary_cards_view},
        views::{DrilldownViews, ViewId},
    },
    endpoints,
    html::{BUTTON_SECONDARY_STYLE, HeadElement, PAGE_CONTAINER_STYLE, base},
    invoice::get_transaction_records,
    navigation::NavBar,
    timezone::LocalTimezone,
};

/// The state needed to render the billing page.
#[derive(Debug, Clone)]
pub struct BillingState {
    /// The database connection for reading invoices and expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The zoom thresholds for new views.
    pub drilldown_config: DrilldownConfig,
    /// The open billing views.
    pub drilldown_views: Arc<Mutex<DrilldownViews>>,
}

impl FromRef<AppState> for BillingState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            drilldown_config: state.drilldown_config,
            drilldown_views: state.drilldown_views.clone(),
        }
    }
}

/// The state needed by the JSON endpoints of an open billing view.
#[derive(Debug, Clone)]
pub struct BillingViewState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub drilldown_views: Arc<Mutex<DrilldownViews>>,
}

impl FromRef<AppState> for BillingViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            drilldown_views: state.drilldown_views.clone(),
        }
    }
}

/// The chart's visible window, in epoch milliseconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ZoomWindow {
    pub min_timestamp: i64,
    pub max_timestamp: i64,
}

/// A request to show the day containing `timestamp` (epoch milliseconds).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FocusRequest {
    pub timestamp: i64,
}

/// Display the billing overview: summary cards, the revenue chart and recent activity.
pub async fn get_billing_page(State(state): State<BillingState>) -> Result<Response, Error> {
    let timezone = LocalTimezone::from_name(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let (records, summary, activity) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let records = get_transaction_records(&connection)
            .inspect_err(|error| tracing::error!("could not get invoice records: {error}"))?;
        let summary = get_billing_summary(&connection)
            .inspect_err(|error| tracing::error!("could not get billing summary: {error}"))?;
        let activity = get_activity(&connection, Some(RECENT_ACTIVITY_LIMIT))?;

        (records, summary, activity)
    };

    let year = timezone.to_local(OffsetDateTime::now_utc()).year();
    let mut drilldown = RevenueDrilldown::new(state.drilldown_config, timezone, year);
    drilldown.load_transactions(records);

    let update = ChartUpdate::new(&drilldown, None);
    let chart = revenue_chart(&drilldown.series());

    let view_id = {
        let mut views = state
            .drilldown_views
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire view registry lock: {error}"))
            .map_err(|_| Error::ViewRegistryLockError)?;

        views.open(drilldown)
    };

    tracing::debug!("opened billing view {view_id} for {year}");

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        revenue_chart_script(view_id, &chart, &update)?,
    ];

    Ok(billing_view(&summary, &update, &activity, timezone, &scripts).into_response())
}

fn billing_view(
    summary: &BillingSummary,
    update: &ChartUpdate,
    activity: &[Activity],
    timezone: LocalTimezone,
    scripts: &[HeadElement],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BILLING_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class={(PAGE_CONTAINER_STYLE) " max-w-screen-xl"}
        {
            header class="w-full flex justify-between flex-wrap items-end gap-4 mb-6"
            {
                div
                {
                    h1 class="text-2xl font-bold" { "Billing & Finance" }
                    p class="text-gray-600 dark:text-gray-400"
                    {
                        "Overview of clinic income and expenses."
                    }
                }

                div class="flex gap-2"
                {
                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Add Expense"
                    }
                    a href=(endpoints::NEW_INVOICE_VIEW) class=(BUTTON_SECONDARY_STYLE)
                    {
                        "New Invoice"
                    }
                }
            }

            (summary_cards_view(summary))

            div class="w-full grid grid-cols-1 xl:grid-cols-3 gap-6"
            {
                div class="xl:col-span-2" { (revenue_chart_view(update)) }
                div { (recent_activity_view(activity, timezone)) }
            }
        }
    );

    base("Billing", scripts, &content)
}

/// Report the chart's visible window to a billing view.
pub async fn zoom_endpoint(
    State(state): State<BillingViewState>,
    Path(view_id): Path<ViewId>,
    Json(window): Json<ZoomWindow>,
) -> Response {
    chart_update_response(apply_event(
        &state.drilldown_views,
        view_id,
        ChartEvent::ZoomWindowChanged {
            min_timestamp: window.min_timestamp,
            max_timestamp: window.max_timestamp,
        },
    ))
}

/// Return a billing view to the annual chart.
pub async fn reset_endpoint(
    State(state): State<BillingViewState>,
    Path(view_id): Path<ViewId>,
) -> Response {
    chart_update_response(apply_event(
        &state.drilldown_views,
        view_id,
        ChartEvent::ResetZoom,
    ))
}

/// Show the day containing the requested timestamp in a billing view.
pub async fn focus_endpoint(
    State(state): State<BillingViewState>,
    Path(view_id): Path<ViewId>,
    Json(request): Json<FocusRequest>,
) -> Response {
    chart_update_response(apply_event(
        &state.drilldown_views,
        view_id,
        ChartEvent::FocusRequested {
            timestamp: request.timestamp,
        },
    ))
}

/// Reload a billing view's invoices from the database, keeping its current view.
pub async fn refresh_endpoint(
    State(state): State<BillingViewState>,
    Path(view_id): Path<ViewId>,
) -> Response {
    chart_update_response(refresh_view(&state, view_id))
}

/// Discard a billing view.
pub async fn close_endpoint(
    State(state): State<BillingViewState>,
    Path(view_id): Path<ViewId>,
) -> Response {
    let mut views = match state.drilldown_views.lock() {
        Ok(views) => views,
        Err(error) => {
            tracing::error!("could not acquire view registry lock: {error}");
            return Error::ViewRegistryLockError.into_json_response();
        }
    };

    match views.close(view_id) {
        Some(_) => {
            tracing::debug!("closed billing view {view_id}");
            StatusCode::NO_CONTENT.into_response()
        }
        None => Error::ViewNotFound(view_id).into_json_response(),
    }
}

fn apply_event(
    views: &Mutex<DrilldownViews>,
    view_id: ViewId,
    event: ChartEvent,
) -> Result<ChartUpdate, Error> {
    let mut views = views
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire view registry lock: {error}"))
        .map_err(|_| Error::ViewRegistryLockError)?;
    let drilldown = views.get_mut(view_id)?;
    let command = drilldown.handle(event);

    Ok(ChartUpdate::new(drilldown, command))
}

fn refresh_view(state: &BillingViewState, view_id: ViewId) -> Result<ChartUpdate, Error> {
    let records = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transaction_records(&connection)
            .inspect_err(|error| tracing::error!("could not get invoice records: {error}"))?
    };

    let mut views = state
        .drilldown_views
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire view registry lock: {error}"))
        .map_err(|_| Error::ViewRegistryLockError)?;
    let drilldown = views.get_mut(view_id)?;
    drilldown.load_transactions(records);

    Ok(ChartUpdate::new(drilldown, None))
}

fn chart_update_response(result: Result<ChartUpdate, Error>) -> Response {
    match result {
        Ok(update) => Json(update).into_response(),
        Err(error) => error.into_json_response(),
    }
}
