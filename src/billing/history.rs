//! Displays every invoice and expense in one table.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    billing::activity::{Activity, get_activity, signed_amount_view, type_badge},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base,
    },
    navigation::NavBar,
};

/// The state needed for the transaction history page.
#[derive(Debug, Clone)]
pub struct HistoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the full transaction history, newest first.
pub async fn get_history_page(State(state): State<HistoryState>) -> Result<Response, Error> {
    let activity = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_activity(&connection, None)?
    };

    Ok(history_view(&activity).into_response())
}

fn history_view(activity: &[Activity]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let table_row = |entry: &Activity| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (type_badge(entry.kind)) }
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (entry.label)
                }
                td class=(TABLE_CELL_STYLE) { (entry.sub_label) }
                td class=(TABLE_CELL_STYLE)
                {
                    time datetime=(entry.date) { (entry.date) }
                }
                td class="px-6 py-4 text-right" { (signed_amount_view(entry)) }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transaction History" }

                    a href=(endpoints::BILLING_VIEW) class=(LINK_STYLE) { "Back to Billing" }
                }

                div class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description / Patient" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category / Service" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                            }
                        }

                        tbody
                        {
                            @for entry in activity {
                                (table_row(entry))
                            }

                            @if activity.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions yet."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Transaction History", &[], &content)
}
