//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    billing::{DrilldownConfig, DrilldownViews},
    db::initialize,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The zoom thresholds used by the revenue chart of each new billing view.
    pub drilldown_config: DrilldownConfig,

    /// The drill-down state of each open billing page.
    pub drilldown_views: Arc<Mutex<DrilldownViews>>,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for invoices and expenses.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    /// At most `max_open_views` billing views are kept, the oldest is closed to make room.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        drilldown_config: DrilldownConfig,
        max_open_views: usize,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            drilldown_config,
            drilldown_views: Arc::new(Mutex::new(DrilldownViews::new(max_open_views))),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}
