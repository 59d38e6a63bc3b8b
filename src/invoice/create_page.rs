//! Defines the route handler for the page for creating a new invoice.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    timezone::get_local_offset,
};

/// The state needed for the new invoice page.
#[derive(Debug, Clone)]
pub struct CreateInvoicePageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateInvoicePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for creating an invoice.
pub async fn get_create_invoice_page(
    State(state): State<CreateInvoicePageState>,
) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone)
    })?;

    let max_date = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    Ok(create_invoice_view(max_date).into_response())
}

fn create_invoice_view(max_date: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_INVOICE_VIEW).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::INVOICES_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Invoice" }

                div
                {
                    label for="patient_name" class=(FORM_LABEL_STYLE) { "Patient" }

                    input
                        name="patient_name"
                        id="patient_name"
                        type="text"
                        placeholder="Full name"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="service_name" class=(FORM_LABEL_STYLE) { "Service" }

                    input
                        name="service_name"
                        id="service_name"
                        type="text"
                        placeholder="e.g. Consultation"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    div class="input-wrapper w-full"
                    {
                        input
                            name="amount"
                            id="amount"
                            type="number"
                            step="0.01"
                            min="0.01"
                            placeholder="0.00"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Status" }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        @for (value, title, checked) in [("paid", "Paid", true), ("pending", "Pending", false)] {
                            div class="flex items-center gap-3"
                            {
                                input
                                    type="radio"
                                    name="status"
                                    id=(format!("status-{value}"))
                                    value=(value)
                                    checked[checked]
                                    required
                                    class=(FORM_RADIO_INPUT_STYLE);

                                label for=(format!("status-{value}")) class=(FORM_RADIO_LABEL_STYLE)
                                {
                                    (title)
                                }
                            }
                        }
                    }
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        max=(max_date)
                        value=(max_date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Create Invoice"
                }
            }
        }
    };

    base("New Invoice", &[dollar_input_styles()], &content)
}
