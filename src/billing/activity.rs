//! Invoices and expenses merged into a single, newest first feed.

use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    billing::{TransactionStatus, series::start_of_day_timestamp},
    endpoints,
    expense::{Expense, get_all_expenses},
    html::{LINK_STYLE, MUTED_TEXT_STYLE, format_currency},
    invoice::{Invoice, get_all_invoices},
    timezone::LocalTimezone,
};

/// How many entries the billing page lists under "Recent Activity".
pub const RECENT_ACTIVITY_LIMIT: usize = 6;

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// A patient invoice and whether it has been paid.
    Income(TransactionStatus),
    /// Expenses are always settled when recorded.
    Expense,
}

/// One row of the activity feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub kind: ActivityKind,
    /// The patient for invoices, the title for expenses.
    pub label: String,
    /// The service for invoices, the category for expenses.
    pub sub_label: String,
    pub amount: f64,
    pub date: Date,
}

impl Activity {
    /// The amount with a sign showing which way the money moved.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            ActivityKind::Income(_) => self.amount,
            ActivityKind::Expense => -self.amount,
        }
    }

    fn status(&self) -> TransactionStatus {
        match self.kind {
            ActivityKind::Income(status) => status,
            ActivityKind::Expense => TransactionStatus::Paid,
        }
    }
}

impl From<Invoice> for Activity {
    fn from(invoice: Invoice) -> Self {
        Self {
            kind: ActivityKind::Income(invoice.status),
            label: invoice.patient_name,
            sub_label: invoice.service_name,
            amount: invoice.amount,
            date: invoice.created_at,
        }
    }
}

impl From<Expense> for Activity {
    fn from(expense: Expense) -> Self {
        Self {
            kind: ActivityKind::Expense,
            label: expense.title,
            sub_label: expense.category.to_string(),
            amount: expense.amount,
            date: expense.created_at,
        }
    }
}

/// Merge invoices and expenses, newest first, keeping at most `limit` entries.
///
/// Entries on the same date keep their input order with invoices ahead of expenses.
pub fn merge_activity(
    invoices: Vec<Invoice>,
    expenses: Vec<Expense>,
    limit: Option<usize>,
) -> Vec<Activity> {
    let mut activity: Vec<Activity> = invoices
        .into_iter()
        .map(Activity::from)
        .chain(expenses.into_iter().map(Activity::from))
        .collect();

    activity.sort_by(|a, b| b.date.cmp(&a.date));

    if let Some(limit) = limit {
        activity.truncate(limit);
    }

    activity
}

/// Load every invoice and expense as one feed, newest first.
pub fn get_activity(connection: &Connection, limit: Option<usize>) -> Result<Vec<Activity>, Error> {
    let invoices = get_all_invoices(connection)
        .inspect_err(|error| tracing::error!("could not get invoices: {error}"))?;
    let expenses = get_all_expenses(connection)
        .inspect_err(|error| tracing::error!("could not get expenses: {error}"))?;

    Ok(merge_activity(invoices, expenses, limit))
}

pub(crate) fn type_badge(kind: ActivityKind) -> Markup {
    let (text, style) = match kind {
        ActivityKind::Income(_) => (
            "Income",
            "bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-300",
        ),
        ActivityKind::Expense => (
            "Expense",
            "bg-red-100 text-red-800 dark:bg-red-900 dark:text-red-300",
        ),
    };

    html! {
        span class={"inline-flex items-center px-2.5 py-0.5 text-xs font-semibold rounded-full " (style)}
        {
            (text)
        }
    }
}

pub(crate) fn signed_amount_view(activity: &Activity) -> Markup {
    let (sign, style) = if activity.signed_amount() < 0.0 {
        ("-", "text-red-600 dark:text-red-400")
    } else {
        ("+", "text-green-600 dark:text-green-400")
    };

    html! {
        span class={"font-semibold whitespace-nowrap " (style)}
        {
            (sign) (format_currency(activity.amount))
        }
    }
}

/// Render the recent activity list.
///
/// Each row carries the local start of its day so that clicking it can focus
/// the revenue chart on that date.
pub(super) fn recent_activity_view(activity: &[Activity], timezone: LocalTimezone) -> Markup {
    html! {
        section id="recent-activity" class="w-full mb-8"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                div
                {
                    h3 class="text-xl font-semibold" { "Recent Activity" }
                    p class=(MUTED_TEXT_STYLE)
                    {
                        "Includes both patient payments and clinic expenses."
                    }
                }

                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View Full History" }
            }

            @if activity.is_empty() {
                p class="text-gray-600 dark:text-gray-400" { "No transactions yet." }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700 rounded-lg shadow bg-white dark:bg-gray-800"
                {
                    @for entry in activity {
                        li
                            data-focus-timestamp=(start_of_day_timestamp(entry.date, timezone))
                            title="Show this day on the revenue chart"
                            class="flex justify-between items-center gap-4 px-4 py-3 cursor-pointer
                                hover:bg-gray-50 dark:hover:bg-gray-700"
                        {
                            div class="min-w-0"
                            {
                                p class="font-medium truncate" { (entry.label) }
                                p class="text-sm text-gray-600 dark:text-gray-400 truncate"
                                {
                                    (entry.sub_label) " · " (entry.date)
                                }
                            }

                            div class="flex flex-col items-end gap-1"
                            {
                                (signed_amount_view(entry))
                                @if entry.status() == TransactionStatus::Pending {
                                    span class="text-xs text-amber-600 dark:text-amber-400" { "Pending" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
