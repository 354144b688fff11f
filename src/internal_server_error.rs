//! The page displayed when an internal server error occurs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_internal_server_error_page() -> Response {
    render_internal_server_error()
}

pub fn render_internal_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_view(
            "Error",
            "500",
            "Sorry, something went wrong.",
            "Try again later or check the server logs.",
        ),
    )
        .into_response()
}
