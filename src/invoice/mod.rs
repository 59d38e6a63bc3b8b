//! Invoices issued to patients, the source of the clinic's revenue.

mod core;
mod create_endpoint;
mod create_page;

pub use core::{Invoice, create_invoice_table, get_all_invoices, get_transaction_records};
pub use create_endpoint::create_invoice_endpoint;
pub use create_page::get_create_invoice_page;

#[cfg(test)]
pub(crate) use core::{NewInvoice, create_invoice};
