//! Defines the endpoint for recording an expense.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    expense::core::{ExpenseCategory, NewExpense, create_expense},
    timezone::get_local_offset,
};

/// The state needed to record an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for recording an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    pub title: String,
    pub amount: f64,
    /// Defaults to [ExpenseCategory::Other] when missing or unrecognised.
    #[serde(default)]
    pub category: ExpenseCategory,
    pub date: Date,
}

/// A route handler for recording an expense, redirects to the billing page on success.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let Some(local_timezone) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    if form.date > OffsetDateTime::now_utc().to_offset(local_timezone).date() {
        tracing::error!("Tried to record an expense with the future date {}", form.date);
        return Error::FutureDate(form.date).into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let expense = NewExpense {
        title: form.title,
        category: form.category,
        amount: form.amount,
        created_at: form.date,
    };

    match create_expense(expense, &connection) {
        Ok(expense) => {
            tracing::info!(
                "recorded expense {} ({}) for {}",
                expense.id,
                expense.category,
                expense.amount
            );

            (
                HxRedirect(endpoints::BILLING_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not record expense: {error}");
            error.into_alert_response()
        }
    }
}
