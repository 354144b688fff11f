//! Defines the core data models and database operations for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, category::CategoryName, database_id::DatabaseId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction spends or earns money.
///
/// The kind is stored as lowercase text ("expense" or "income") so the
/// persisted rows match what report queries filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money spent.
    Expense,
    /// Money earned.
    Income,
}

impl TransactionKind {
    /// The lowercase text stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }

    /// The capitalized label shown in the UI for this kind.
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Expense => "Expense",
            TransactionKind::Income => "Income",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// Whether the transaction spends or earns money.
    pub kind: TransactionKind,
    /// The label the transaction is grouped under in reports.
    pub category: CategoryName,
    /// The amount of money spent or earned, always positive.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// Free-form text describing the transaction, may be empty.
    pub note: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        kind: TransactionKind,
        category: CategoryName,
        amount: f64,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            category,
            amount,
            date,
            note: String::new(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The only optional field is the note, which defaults to an empty string.
/// Pass the finished builder to [create_transaction] to persist it and get
/// back the stored [Transaction] with its assigned ID.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::{category::CategoryName, transaction::{Transaction, TransactionKind}};
///
/// let builder = Transaction::build(
///         TransactionKind::Expense,
///         CategoryName::new("Food")?,
///         20.00,
///         date!(2025 - 03 - 05),
///     )
///     .note("weekly groceries");
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the transaction spends or earns money.
    pub kind: TransactionKind,

    /// The category label for the transaction.
    ///
    /// The UI offers a fixed vocabulary per kind, but any non-empty label is
    /// accepted here.
    pub category: CategoryName,

    /// The monetary amount of the transaction.
    ///
    /// Always positive; the direction of the money flow is carried by `kind`.
    pub amount: f64,

    /// The date when the transaction occurred.
    pub date: Date,

    /// A human-readable note describing the transaction, may be empty.
    pub note: String,
}

impl TransactionBuilder {
    /// Set the note for the transaction.
    pub fn note(mut self, note: &str) -> Self {
        self.note = note.to_owned();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// The row is durably persisted before this function returns, and the
/// assigned ID is unique across all stored transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero or negative,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if builder.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(builder.amount));
    }

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (kind, category, amount, date, note)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, kind, category, amount, date, note",
        )?
        .query_row(
            (
                builder.kind,
                builder.category.as_ref(),
                builder.amount,
                builder.date,
                &builder.note,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                note TEXT NOT NULL DEFAULT ''
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Composite index used by the monthly report query.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_kind_date ON \"transaction\"(kind, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let kind = row.get(1)?;
    let category: String = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;
    let note = row.get(5)?;

    Ok(Transaction {
        id,
        kind,
        // The store only ever persists validated category names.
        category: CategoryName::new_unchecked(&category),
        amount,
        date,
        note,
    })
}

// ============================================================================
// TESTS
// ============================================================================
