//! Alert system for displaying error messages to users.
//!
//! Alerts are swapped into the `#alert-container` element of the base page
//! when an htmx form post fails.

use maud::{Markup, html};

const ERROR_ALERT_STYLE: &str = "flex items-start gap-3 p-4 mb-4 text-sm rounded-lg shadow-lg \
    text-red-800 bg-red-50 border border-red-300 \
    dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

/// An alert message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// An error with a headline and an explanation of how to fix it.
    Error { message: String, details: String },
    /// An error that only needs a headline.
    ErrorSimple { message: String },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (message, details) = match self {
            Alert::Error { message, details } => (message, Some(details)),
            Alert::ErrorSimple { message } => (message, None),
        };

        html! {
            div
                role="alert"
                class=(ERROR_ALERT_STYLE)
                onclick="this.remove()"
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @if let Some(details) = details {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="font-bold leading-none"
                {
                    "×"
                }
            }
        }
    }
}
