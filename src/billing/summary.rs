//! Headline figures for the billing page.

use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    Error,
    billing::TransactionStatus,
    html::{CARD_STYLE, MUTED_TEXT_STYLE, format_currency},
};

const CARD_VALUE_STYLE: &str = "text-2xl font-bold";

/// Totals across every invoice and expense.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BillingSummary {
    /// The sum of paid invoices.
    pub total_income: f64,
    pub total_expenses: f64,
    /// The sum of invoices that are still waiting on payment.
    pub pending_amount: f64,
}

impl BillingSummary {
    pub fn net_profit(&self) -> f64 {
        self.total_income - self.total_expenses
    }
}

/// Sum the invoice and expense tables.
pub fn get_billing_summary(connection: &Connection) -> Result<BillingSummary, Error> {
    let (total_income, pending_amount) = connection.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN status = ?1 THEN amount END), 0.0),
            COALESCE(SUM(CASE WHEN status = ?2 THEN amount END), 0.0)
        FROM invoice",
        (
            TransactionStatus::Paid.as_str(),
            TransactionStatus::Pending.as_str(),
        ),
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let total_expenses = connection.query_row(
        "SELECT COALESCE(SUM(amount), 0.0) FROM expense",
        [],
        |row| row.get(0),
    )?;

    Ok(BillingSummary {
        total_income,
        total_expenses,
        pending_amount,
    })
}

pub(super) fn summary_cards_view(summary: &BillingSummary) -> Markup {
    let net_profit = summary.net_profit();
    let net_profit_style = if net_profit >= 0.0 {
        "text-green-600 dark:text-green-400"
    } else {
        "text-red-600 dark:text-red-400"
    };

    html! {
        section id="summary" class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 mb-8"
        {
            (summary_card("Total Income", summary.total_income, ""))
            (summary_card("Total Expenses", summary.total_expenses, ""))
            (summary_card("Net Profit", net_profit, net_profit_style))
            (summary_card("Pending Invoices", summary.pending_amount, "text-amber-600 dark:text-amber-400"))
        }
    }
}

fn summary_card(title: &str, amount: f64, value_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) aria-label=(format!("{title}: {}", format_currency(amount)))
        {
            span class=(MUTED_TEXT_STYLE) { (title) }
            span class={(CARD_VALUE_STYLE) " " (value_style)} { (format_currency(amount)) }
        }
    }
}
