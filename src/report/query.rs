//! Database queries for retrieving monthly report data.

use rusqlite::{Connection, named_params};

use crate::{
    Error,
    period::Period,
    transaction::{Transaction, TransactionKind, map_transaction_row},
};

/// Gets all transactions of `kind` dated within `period`.
///
/// The filter compares the calendar fields of the stored date (a two-digit
/// month and the year), not a date range, so it matches exactly the rows
/// whose date falls in the given month. Row order is storage-determined and
/// callers must not rely on it.
///
/// # Returns
/// All matching transactions. A period with no activity yields an empty
/// vector, which is the expected outcome and not an error.
///
/// # Errors
/// Returns [Error::SqlError] if the query preparation or execution fails.
pub fn transactions_for_period(
    kind: TransactionKind,
    period: Period,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, kind, category, amount, date, note
             FROM \"transaction\"
             WHERE kind = :kind
               AND strftime('%m', date) = :month
               AND strftime('%Y', date) = :year",
        )?
        .query_map(
            named_params! {
                ":kind": kind,
                ":month": format!("{:02}", u8::from(period.month)),
                ":year": period.year.to_string(),
            },
            map_transaction_row,
        )?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| error.into())
}
