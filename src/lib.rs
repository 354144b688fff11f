//! Centavo is a web app for tracking personal income and expenses.
//!
//! Transactions are recorded through a simple form and stored in a single
//! SQLite table. Monthly reports and charts are served directly as HTML
//! pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod category;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod navigation;
mod not_found;
mod period;
mod report;
mod routing;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use routing::build_router;

use crate::{
    alert::AlertView,
    html::error_view,
    internal_server_error::render_internal_server_error,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used as a transaction category.
    #[error("category cannot be empty")]
    EmptyCategoryName,

    /// A zero or negative amount was used to create a transaction.
    ///
    /// Transactions record money that was actually spent or earned, so the
    /// amount must be positive; the sign is carried by the transaction kind.
    #[error("{0} is not a positive amount")]
    NonPositiveAmount(f64),

    /// Text that is neither "expense" nor "income" was read as a transaction
    /// kind.
    #[error("\"{0}\" is not a transaction kind")]
    UnknownKind(String),

    /// A report was requested for a month outside of 1 through 12.
    ///
    /// The query layer itself does not validate its arguments; this error is
    /// produced at the page boundary when the query string is resolved.
    #[error("{0} is not a calendar month")]
    InvalidMonth(u8),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidMonth(month) => (
                StatusCode::BAD_REQUEST,
                error_view(
                    "Invalid Period",
                    "400",
                    "That month does not exist.",
                    &format!("{month} is not a calendar month. Pick a month between 1 and 12."),
                ),
            )
                .into_response(),
            Error::InvalidTimezone(timezone) => {
                tracing::error!("invalid timezone {timezone}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_view(
                        "Invalid Timezone Settings",
                        "500",
                        "Invalid timezone settings.",
                        &format!(
                            "Could not get local timezone \"{timezone}\". Check your server \
                            settings and ensure the timezone has been set to a valid, canonical \
                            timezone string."
                        ),
                    ),
                )
                    .into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error()
            }
        }
    }
}

impl Error {
    /// Map the error to an alert partial for htmx form responses.
    pub(crate) fn into_alert_response(self) -> Response {
        match self {
            Error::EmptyCategoryName => (
                StatusCode::BAD_REQUEST,
                AlertView::error("Invalid category", "The category cannot be empty.").into_html(),
            )
                .into_response(),
            Error::NonPositiveAmount(amount) => (
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Invalid amount",
                    &format!("{amount} is not a positive amount. Enter at least $0.01."),
                )
                .into_html(),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    AlertView::error(
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    )
                    .into_html(),
                )
                    .into_response()
            }
        }
    }
}
