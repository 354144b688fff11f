//! Transaction management for the finance tracker.
//!
//! This module contains everything related to recording transactions:
//! - The `Transaction` model, its kind enum, and `TransactionBuilder`
//! - Database functions for storing transactions
//! - View handlers for the add-transaction page

mod core;
mod create_transaction_endpoint;
mod new_transaction_page;

pub use core::{
    Transaction, TransactionBuilder, TransactionKind, create_transaction,
    create_transaction_table, map_transaction_row,
};
pub use create_transaction_endpoint::create_transaction_endpoint;
pub use new_transaction_page::get_new_transaction_page;

#[cfg(test)]
pub use core::count_transactions;
