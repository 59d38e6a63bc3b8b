//! Defines the endpoint for creating a new invoice.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    billing::TransactionStatus,
    endpoints,
    invoice::core::{NewInvoice, create_invoice},
    timezone::get_local_offset,
};

/// The state needed to create an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceState {
    /// The database connection for managing invoices.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateInvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct InvoiceForm {
    /// Who the invoice is for.
    pub patient_name: String,
    /// The service being billed.
    pub service_name: String,
    /// The amount in dollars.
    pub amount: f64,
    /// Either "paid" or "pending".
    pub status: TransactionStatus,
    /// When the invoice was issued.
    pub date: Date,
}

/// A route handler for creating a new invoice, redirects to the billing page on success.
pub async fn create_invoice_endpoint(
    State(state): State<CreateInvoiceState>,
    Form(form): Form<InvoiceForm>,
) -> Response {
    let Some(local_timezone) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    if form.date > OffsetDateTime::now_utc().to_offset(local_timezone).date() {
        tracing::error!("Tried to create an invoice with the future date {}", form.date);
        return Error::FutureDate(form.date).into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let invoice = NewInvoice {
        patient_name: form.patient_name,
        service_name: form.service_name,
        amount: form.amount,
        status: form.status,
        created_at: form.date,
    };

    match create_invoice(invoice, &connection) {
        Ok(invoice) => {
            tracing::info!("created invoice {} for {}", invoice.id, invoice.amount);

            (
                HxRedirect(endpoints::BILLING_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create invoice: {error}");
            error.into_alert_response()
        }
    }
}
