/*! This module implements schema initialization for the application's database. */

use rusqlite::Connection;

use crate::{Error, transaction::create_transaction_table};

/// Create the application's tables if they do not already exist.
///
/// Safe to call on every start-up: existing rows are never dropped or
/// truncated. A database that cannot be opened or written to surfaces as an
/// error, which is fatal at start-up.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    create_transaction_table(connection)?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::CategoryName,
        db::initialize,
        transaction::{Transaction, TransactionKind, count_transactions, create_transaction},
    };

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        create_transaction(
            Transaction::build(
                TransactionKind::Expense,
                CategoryName::new("Food").unwrap(),
                12.5,
                date!(2025 - 03 - 05),
            ),
            &conn,
        )
        .unwrap();

        // A second call must neither fail nor drop the existing row.
        initialize(&conn).unwrap();

        assert_eq!(count_transactions(&conn).unwrap(), 1);
    }
}
