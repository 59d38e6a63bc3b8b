//! Defines the app level error type and conversions to rendered HTML pages, alerts and JSON.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use time::Date;

use crate::{
    alert::Alert, billing::ViewId, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A date in the future was used to create an invoice or expense.
    ///
    /// Invoices and expenses record events that have already happened,
    /// therefore future dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// An invoice or expense amount was zero, negative or not a number.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    InvalidAmount(f64),

    /// A required text field was blank.
    #[error("the {0} cannot be empty")]
    EmptyField(&'static str),

    /// An invoice was created with a status other than paid or pending.
    #[error("invoices must be either paid or pending")]
    InvalidInvoiceStatus,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The billing view was never opened, has been closed or was evicted.
    #[error("the billing view {0} is not open")]
    ViewNotFound(ViewId),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The drill-down zoom thresholds are out of range or leave no gap between
    /// drilling down and returning to the monthly view.
    #[error(
        "invalid zoom thresholds: need 0 < zoom out ({zoom_out_days} days) < zoom in \
        ({zoom_in_days} days) <= {max_days} days"
    )]
    InvalidZoomThresholds {
        /// The requested zoom-in threshold in days.
        zoom_in_days: i64,
        /// The requested zoom-out threshold in days.
        zoom_out_days: i64,
        /// The largest threshold accepted.
        max_days: i64,
    },

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Could not acquire the lock on the open billing views
    #[error("could not acquire the billing view lock")]
    ViewRegistryLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::ViewNotFound(_) => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError | Error::ViewRegistryLockError => {
                InternalServerError::default().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::FutureDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid date".to_owned(),
                    details: format!(
                        "{date} is a date in the future, which is not allowed. \
                        Change the date to today or earlier."
                    ),
                },
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!("{amount} is not a valid amount. Enter an amount above zero."),
                },
            ),
            Error::EmptyField(field) => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: format!("The {field} cannot be empty"),
                },
            ),
            Error::InvalidInvoiceStatus => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Choose whether the invoice is paid or pending".to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }

    /// Convert the error into an HTTP response with a JSON body of the form `{"error": "..."}`.
    pub fn into_json_response(self) -> Response {
        let status_code = match &self {
            Error::ViewNotFound(_) | Error::NotFound => StatusCode::NOT_FOUND,
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match status_code {
            StatusCode::NOT_FOUND => self.to_string(),
            _ => "An unexpected error occurred, check the server logs for more details.".to_owned(),
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use time::macros::date;

    use crate::{Error, billing::ViewId};

    #[test]
    fn no_rows_is_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        for error in [
            Error::FutureDate(date!(2099 - 01 - 01)),
            Error::InvalidAmount(-1.0),
            Error::EmptyField("title"),
            Error::InvalidInvoiceStatus,
        ] {
            assert_eq!(
                error.into_alert_response().status(),
                StatusCode::BAD_REQUEST
            );
        }
    }

    #[test]
    fn missing_view_is_json_not_found() {
        let response = Error::ViewNotFound(ViewId::new(3)).into_json_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn lock_errors_are_json_server_errors() {
        let response = Error::ViewRegistryLockError.into_json_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
