//! The transaction snapshot consumed by the revenue chart.
//!
//! Records arrive exactly as the store (or a JSON client) hands them over, so
//! every field is allowed to be missing or malformed. Deciding whether a
//! record counts towards revenue happens in [TransactionRecord::paid_revenue].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::timezone::LocalTimezone;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// SQLite's `datetime('now')` format.
const SQLITE_DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Whether an invoice has been paid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// The money has been received and counts as revenue.
    Paid,
    /// The invoice has been issued but not paid yet.
    Pending,
    /// Any status the store reports that this app does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    /// The status as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Paid => "paid",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Unknown => "unknown",
        }
    }

    /// Parse a stored status, mapping anything unexpected to [TransactionStatus::Unknown].
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "paid" => TransactionStatus::Paid,
            "pending" => TransactionStatus::Pending,
            _ => TransactionStatus::Unknown,
        }
    }
}

/// One financial record in the snapshot handed to the revenue chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The amount of the invoice. `None` if the source value was missing or not a number.
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub amount: Option<f64>,
    /// When the record was created, as an RFC 3339 timestamp or a `YYYY-MM-DD` date.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Only [TransactionStatus::Paid] records count as revenue.
    #[serde(default)]
    pub status: TransactionStatus,
}

impl TransactionRecord {
    /// Create a well-formed record.
    pub fn new(amount: f64, created_at: &str, status: TransactionStatus) -> Self {
        Self {
            amount: Some(amount),
            created_at: Some(created_at.to_owned()),
            status,
        }
    }

    /// The local calendar date and amount this record contributes to revenue.
    ///
    /// Returns `None` for records that must not contribute: anything that is
    /// not paid, and malformed records (missing, negative or non-finite
    /// amount, missing or unparseable timestamp).
    pub fn paid_revenue(&self, timezone: LocalTimezone) -> Option<(Date, f64)> {
        if self.status != TransactionStatus::Paid {
            return None;
        }

        let amount = self.amount.filter(|amount| amount.is_finite() && *amount >= 0.0)?;
        let date = parse_local_date(self.created_at.as_deref()?, timezone)?;

        Some((date, amount))
    }
}

/// Parse a timestamp into a calendar date in the clinic's local timezone.
///
/// Timestamps with an offset are converted using the offset `timezone` has at
/// that instant, timestamps without one are assumed to already be local.
pub fn parse_local_date(text: &str, timezone: LocalTimezone) -> Option<Date> {
    let text = text.trim();

    if let Ok(timestamp) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(timezone.to_local(timestamp).date());
    }

    if let Ok(timestamp) = PrimitiveDateTime::parse(text, SQLITE_DATETIME_FORMAT) {
        return Some(timestamp.date());
    }

    Date::parse(text, DATE_FORMAT).ok()
}

fn deserialize_lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(value.and_then(|value| match value {
        Value::Number(number) => number.as_f64(),
        // Decimal columns are often serialized as strings.
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }))
}
