//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    alert::AlertView,
    category::CategoryName,
    html::format_currency,
    transaction::{Transaction, TransactionKind, core::create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a transaction.
///
/// The kind arrives as the lowercase enum value, so the UI labels
/// ("Expense"/"Income") are lower-cased before they reach the store.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the transaction is an expense or income.
    pub kind: TransactionKind,
    /// The category label for the transaction.
    pub category: String,
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Optional text describing the transaction.
    #[serde(default)]
    pub note: String,
}

/// A route handler for creating a new transaction.
///
/// Responds with a success alert naming the kind, amount and category, which
/// the form swaps in below the submit button.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let category = match CategoryName::new(&form.category) {
        Ok(category) => category,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLock.into_alert_response();
        }
    };

    let builder =
        Transaction::build(form.kind, category, form.amount, form.date).note(&form.note);

    match create_transaction(builder, &connection) {
        Ok(transaction) => (
            StatusCode::CREATED,
            AlertView::success(
                "Transaction added",
                &format!(
                    "{} of {} in {} added successfully.",
                    transaction.kind.label(),
                    format_currency(transaction.amount),
                    transaction.category
                ),
            )
            .into_html(),
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}
