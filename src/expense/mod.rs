//! Money the clinic spends, shown alongside invoices on the billing page.

mod core;
mod create_endpoint;
mod create_page;

pub use core::{Expense, ExpenseCategory, create_expense_table, get_all_expenses};
pub use create_endpoint::create_expense_endpoint;
pub use create_page::get_create_expense_page;

#[cfg(test)]
pub(crate) use core::{NewExpense, create_expense};
