//! The page shown for unknown routes and missing resources.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A 404 response rendered as a full HTML page.
pub struct NotFoundError;

impl IntoResponse for NotFoundError {
    fn into_response(self) -> Response {
        let page = error_view(
            "Not Found",
            "404",
            "Page not found.",
            "Check the address, or head back to the billing page.",
        );

        (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
    }
}

/// Route handler for requests that do not match any route.
pub async fn get_404_not_found() -> Response {
    NotFoundError.into_response()
}
