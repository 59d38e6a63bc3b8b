use rusqlite::{Connection, params};
use time::Date;

use crate::{
    Error,
    billing::{TransactionRecord, TransactionStatus},
    database_id::DatabaseId,
};

pub type InvoiceId = DatabaseId;

/// A bill issued to a patient for a service.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    /// The id for the invoice.
    pub id: InvoiceId,
    /// Who the invoice was issued to.
    pub patient_name: String,
    /// What the invoice is for, e.g. "Consultation".
    pub service_name: String,
    /// The amount billed in dollars.
    pub amount: f64,
    /// Whether the invoice has been paid.
    pub status: TransactionStatus,
    /// When the invoice was issued.
    pub created_at: Date,
}

/// The data needed to create an [Invoice].
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub patient_name: String,
    pub service_name: String,
    pub amount: f64,
    pub status: TransactionStatus,
    pub created_at: Date,
}

pub fn create_invoice_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS invoice (
            id INTEGER PRIMARY KEY,
            patient_name TEXT NOT NULL,
            service_name TEXT NOT NULL,
            amount REAL NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_invoice_created_at ON invoice(created_at)",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_invoice(row: &rusqlite::Row) -> Result<Invoice, rusqlite::Error> {
    let id = row.get(0)?;
    let patient_name = row.get(1)?;
    let service_name = row.get(2)?;
    let amount = row.get(3)?;
    let status: String = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(Invoice {
        id,
        patient_name,
        service_name,
        amount,
        status: TransactionStatus::parse(&status),
        created_at,
    })
}

/// Create a new invoice in the database.
///
/// # Errors
/// Returns an [Error] if:
/// - the patient or service name is empty,
/// - `amount` is not a positive number,
/// - the status is neither paid nor pending,
/// - or there is an SQL error.
pub fn create_invoice(invoice: NewInvoice, connection: &Connection) -> Result<Invoice, Error> {
    let patient_name = invoice.patient_name.trim();
    let service_name = invoice.service_name.trim();

    if patient_name.is_empty() {
        return Err(Error::EmptyField("patient name"));
    }

    if service_name.is_empty() {
        return Err(Error::EmptyField("service name"));
    }

    if !invoice.amount.is_finite() || invoice.amount <= 0.0 {
        return Err(Error::InvalidAmount(invoice.amount));
    }

    if invoice.status == TransactionStatus::Unknown {
        return Err(Error::InvalidInvoiceStatus);
    }

    connection.execute(
        "INSERT INTO invoice (patient_name, service_name, amount, status, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            patient_name,
            service_name,
            invoice.amount,
            invoice.status.as_str(),
            invoice.created_at
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Invoice {
        id,
        patient_name: patient_name.to_owned(),
        service_name: service_name.to_owned(),
        amount: invoice.amount,
        status: invoice.status,
        created_at: invoice.created_at,
    })
}

/// Retrieve every invoice, newest first.
///
/// Rows that cannot be read as an [Invoice], e.g. a text amount or an
/// unparseable date, are logged and left out.
pub fn get_all_invoices(connection: &Connection) -> Result<Vec<Invoice>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, patient_name, service_name, amount, status, created_at
        FROM invoice ORDER BY created_at DESC, id DESC",
    )?;

    let invoices = statement
        .query_map([], map_row_to_invoice)?
        .filter_map(|maybe_invoice| {
            maybe_invoice
                .inspect_err(|error| tracing::warn!("skipping malformed invoice row: {error}"))
                .ok()
        })
        .collect();

    Ok(invoices)
}

/// Retrieve the revenue snapshot for the billing chart.
///
/// Columns are read loosely: a value of the wrong type becomes a missing
/// field on the record instead of failing the whole query.
pub fn get_transaction_records(connection: &Connection) -> Result<Vec<TransactionRecord>, Error> {
    connection
        .prepare("SELECT amount, created_at, status FROM invoice")?
        .query_map([], |row| {
            let status: Option<String> = row.get(2).ok();

            Ok(TransactionRecord {
                amount: row.get(0).ok(),
                created_at: row.get(1).ok(),
                status: status
                    .as_deref()
                    .map(TransactionStatus::parse)
                    .unwrap_or_default(),
            })
        })?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        billing::{TransactionRecord, TransactionStatus},
        invoice::core::{
            Invoice, NewInvoice, create_invoice, create_invoice_table, get_all_invoices,
            get_transaction_records,
        },
    };

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        create_invoice_table(&connection).expect("Could not create invoice table");
        connection
    }

    fn new_invoice(amount: f64, status: TransactionStatus, created_at: time::Date) -> NewInvoice {
        NewInvoice {
            patient_name: "Jane Doe".to_owned(),
            service_name: "Consultation".to_owned(),
            amount,
            status,
            created_at,
        }
    }

    #[test]
    fn create_table_is_idempotent() {
        let connection = get_test_connection();

        assert_eq!(Ok(()), create_invoice_table(&connection));
    }

    #[test]
    fn can_create_invoice() {
        let connection = get_test_connection();

        let created = create_invoice(
            new_invoice(120.0, TransactionStatus::Paid, date!(2024 - 03 - 05)),
            &connection,
        )
        .unwrap();
        let got = get_all_invoices(&connection).unwrap();

        assert_eq!(created, got[0]);
        assert_eq!(
            got,
            vec![Invoice {
                id: 1,
                patient_name: "Jane Doe".to_owned(),
                service_name: "Consultation".to_owned(),
                amount: 120.0,
                status: TransactionStatus::Paid,
                created_at: date!(2024 - 03 - 05),
            }]
        );
    }

    #[test]
    fn trims_names() {
        let connection = get_test_connection();
        let mut invoice = new_invoice(10.0, TransactionStatus::Pending, date!(2024 - 03 - 05));
        invoice.patient_name = "  Jane Doe ".to_owned();

        let created = create_invoice(invoice, &connection).unwrap();

        assert_eq!(created.patient_name, "Jane Doe");
    }

    #[test]
    fn create_rejects_invalid_invoices() {
        let connection = get_test_connection();
        let today = date!(2024 - 03 - 05);

        let mut empty_service = new_invoice(10.0, TransactionStatus::Paid, today);
        empty_service.service_name = "  ".to_owned();
        let mut empty_patient = new_invoice(10.0, TransactionStatus::Paid, today);
        empty_patient.patient_name = String::new();

        assert_eq!(
            create_invoice(empty_service, &connection),
            Err(Error::EmptyField("service name"))
        );
        assert_eq!(
            create_invoice(empty_patient, &connection),
            Err(Error::EmptyField("patient name"))
        );
        assert_eq!(
            create_invoice(new_invoice(0.0, TransactionStatus::Paid, today), &connection),
            Err(Error::InvalidAmount(0.0))
        );
        assert_eq!(
            create_invoice(new_invoice(5.0, TransactionStatus::Unknown, today), &connection),
            Err(Error::InvalidInvoiceStatus)
        );
        assert_eq!(get_all_invoices(&connection), Ok(Vec::new()));
    }

    #[test]
    fn lists_newest_first() {
        let connection = get_test_connection();
        for created_at in [
            date!(2024 - 03 - 05),
            date!(2024 - 07 - 01),
            date!(2024 - 01 - 10),
        ] {
            create_invoice(
                new_invoice(10.0, TransactionStatus::Paid, created_at),
                &connection,
            )
            .unwrap();
        }

        let got: Vec<_> = get_all_invoices(&connection)
            .unwrap()
            .into_iter()
            .map(|invoice| invoice.created_at)
            .collect();

        assert_eq!(
            got,
            vec![
                date!(2024 - 07 - 01),
                date!(2024 - 03 - 05),
                date!(2024 - 01 - 10)
            ]
        );
    }

    #[test]
    fn transaction_records_tolerate_bad_rows() {
        let connection = get_test_connection();
        create_invoice(
            new_invoice(100.0, TransactionStatus::Paid, date!(2024 - 03 - 05)),
            &connection,
        )
        .unwrap();
        connection
            .execute(
                "INSERT INTO invoice (patient_name, service_name, amount, status, created_at)
                VALUES ('A', 'B', 'lots', 'refunded', 'yesterday')",
                (),
            )
            .unwrap();

        let records = get_transaction_records(&connection).unwrap();

        assert_eq!(
            records,
            vec![
                TransactionRecord::new(100.0, "2024-03-05", TransactionStatus::Paid),
                TransactionRecord {
                    amount: None,
                    created_at: Some("yesterday".to_owned()),
                    status: TransactionStatus::Unknown,
                },
            ]
        );
    }

    #[test]
    fn listing_skips_malformed_rows() {
        let connection = get_test_connection();
        let want = create_invoice(
            new_invoice(100.0, TransactionStatus::Paid, date!(2024 - 03 - 05)),
            &connection,
        )
        .unwrap();
        connection
            .execute(
                "INSERT INTO invoice (patient_name, service_name, amount, status, created_at)
                VALUES ('A', 'B', 'lots', 'paid', 'yesterday')",
                (),
            )
            .unwrap();

        assert_eq!(get_all_invoices(&connection), Ok(vec![want]));
    }
}
