use std::fmt::Display;

use rusqlite::{Connection, params};
use serde::Deserialize;
use time::Date;

use crate::{Error, database_id::DatabaseId};

pub type ExpenseId = DatabaseId;

/// What an expense was spent on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ExpenseCategory {
    Rent,
    Salaries,
    Equipment,
    Utilities,
    Maintenance,
    Marketing,
    #[default]
    #[serde(other)]
    Other,
}

impl ExpenseCategory {
    /// Every category, in the order shown to users.
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::Rent,
        ExpenseCategory::Salaries,
        ExpenseCategory::Equipment,
        ExpenseCategory::Utilities,
        ExpenseCategory::Maintenance,
        ExpenseCategory::Marketing,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "Rent",
            ExpenseCategory::Salaries => "Salaries",
            ExpenseCategory::Equipment => "Equipment",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Maintenance => "Maintenance",
            ExpenseCategory::Marketing => "Marketing",
            ExpenseCategory::Other => "Other",
        }
    }

    /// Parse a stored category, falling back to [ExpenseCategory::Other].
    pub fn parse(text: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == text.trim())
            .unwrap_or_default()
    }
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Money the clinic spent.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    /// A short description, e.g. "March rent".
    pub title: String,
    pub category: ExpenseCategory,
    /// The amount spent in dollars.
    pub amount: f64,
    pub created_at: Date,
}

/// The data needed to create an [Expense].
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub title: String,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub created_at: Date,
}

pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'Other',
            amount REAL NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_expense(row: &rusqlite::Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let title = row.get(1)?;
    let category: String = row.get(2)?;
    let amount = row.get(3)?;
    let created_at = row.get(4)?;

    Ok(Expense {
        id,
        title,
        category: ExpenseCategory::parse(&category),
        amount,
        created_at,
    })
}

/// Create a new expense in the database.
///
/// # Errors
/// Returns [Error::EmptyField] for a blank title, [Error::InvalidAmount] if
/// `amount` is not a positive number, or an SQL error.
pub fn create_expense(expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let title = expense.title.trim();

    if title.is_empty() {
        return Err(Error::EmptyField("title"));
    }

    if !expense.amount.is_finite() || expense.amount <= 0.0 {
        return Err(Error::InvalidAmount(expense.amount));
    }

    connection.execute(
        "INSERT INTO expense (title, category, amount, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            title,
            expense.category.as_str(),
            expense.amount,
            expense.created_at
        ],
    )?;

    Ok(Expense {
        id: connection.last_insert_rowid(),
        title: title.to_owned(),
        category: expense.category,
        amount: expense.amount,
        created_at: expense.created_at,
    })
}

/// Retrieve every expense, newest first. Unreadable rows are logged and skipped.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, title, category, amount, created_at
        FROM expense ORDER BY created_at DESC, id DESC",
    )?;

    let expenses = statement
        .query_map([], map_row_to_expense)?
        .filter_map(|maybe_expense| {
            maybe_expense
                .inspect_err(|error| tracing::warn!("skipping malformed expense row: {error}"))
                .ok()
        })
        .collect();

    Ok(expenses)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        expense::core::{
            ExpenseCategory, NewExpense, create_expense, create_expense_table, get_all_expenses,
        },
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_expense_table(&connection).unwrap();
        connection
    }

    #[test]
    fn can_create_expense() {
        let connection = get_test_connection();

        let created = create_expense(
            NewExpense {
                title: "March rent".to_owned(),
                category: ExpenseCategory::Rent,
                amount: 1500.0,
                created_at: date!(2024 - 03 - 01),
            },
            &connection,
        )
        .unwrap();

        assert_eq!(get_all_expenses(&connection), Ok(vec![created]));
    }

    #[test]
    fn rejects_blank_title_and_bad_amounts() {
        let connection = get_test_connection();
        let expense = |title: &str, amount: f64| NewExpense {
            title: title.to_owned(),
            category: ExpenseCategory::Other,
            amount,
            created_at: date!(2024 - 03 - 01),
        };

        assert_eq!(
            create_expense(expense(" ", 10.0), &connection),
            Err(Error::EmptyField("title"))
        );
        assert_eq!(
            create_expense(expense("Gloves", -1.0), &connection),
            Err(Error::InvalidAmount(-1.0))
        );
        assert!(matches!(
            create_expense(expense("Gloves", f64::INFINITY), &connection),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn unknown_category_reads_as_other() {
        let connection = get_test_connection();
        connection
            .execute(
                "INSERT INTO expense (title, category, amount, created_at)
                VALUES ('Coffee', 'Snacks', 4.5, '2024-03-02')",
                (),
            )
            .unwrap();

        let expenses = get_all_expenses(&connection).unwrap();

        assert_eq!(expenses[0].category, ExpenseCategory::Other);
    }

    #[test]
    fn listing_skips_malformed_rows() {
        let connection = get_test_connection();
        connection
            .execute_batch(
                "INSERT INTO expense (title, category, amount, created_at)
                VALUES ('Rent', 'Rent', 'a lot', '2024-03-01');
                INSERT INTO expense (title, category, amount, created_at)
                VALUES ('Gloves', 'Supplies', 12.0, 'last week');
                INSERT INTO expense (title, category, amount, created_at)
                VALUES ('Power', 'Utilities', 80.0, '2024-03-02');",
            )
            .unwrap();

        let titles: Vec<_> = get_all_expenses(&connection)
            .unwrap()
            .into_iter()
            .map(|expense| expense.title)
            .collect();

        assert_eq!(titles, vec!["Power"]);
    }
}
