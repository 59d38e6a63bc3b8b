//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    billing::{
        close_endpoint, focus_endpoint, get_billing_page, get_history_page, refresh_endpoint,
        reset_endpoint, zoom_endpoint,
    },
    endpoints,
    expense::{create_expense_endpoint, get_create_expense_page},
    internal_server_error::get_internal_server_error_page,
    invoice::{create_invoice_endpoint, get_create_invoice_page},
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::BILLING_VIEW, get(get_billing_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_history_page))
        .route(endpoints::NEW_INVOICE_VIEW, get(get_create_invoice_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_create_expense_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let form_routes = Router::new()
        .route(endpoints::INVOICES_API, post(create_invoice_endpoint))
        .route(endpoints::EXPENSES_API, post(create_expense_endpoint));

    let billing_view_routes = Router::new()
        .route(endpoints::BILLING_VIEW_ZOOM, post(zoom_endpoint))
        .route(endpoints::BILLING_VIEW_RESET, post(reset_endpoint))
        .route(endpoints::BILLING_VIEW_FOCUS, post(focus_endpoint))
        .route(endpoints::BILLING_VIEW_REFRESH, post(refresh_endpoint))
        .route(endpoints::BILLING_VIEW_CLOSE, post(close_endpoint));

    page_routes
        .merge(form_routes)
        .merge(billing_view_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the billing page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::BILLING_VIEW)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{AppState, billing::DrilldownConfig, endpoints, routing::build_router};

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "Etc/UTC",
            DrilldownConfig::default(),
            4,
        )
        .unwrap();

        TestServer::new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn root_redirects_to_billing() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.header("location").to_str().unwrap(),
            endpoints::BILLING_VIEW
        );
    }

    #[tokio::test]
    async fn pages_render() {
        let server = get_test_server();

        for page in [
            endpoints::BILLING_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_INVOICE_VIEW,
            endpoints::NEW_EXPENSE_VIEW,
        ] {
            server.get(page).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/patients/42")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn unknown_view_is_not_found() {
        let server = get_test_server();

        server
            .post(&endpoints::format_endpoint(endpoints::BILLING_VIEW_RESET, 999))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn billing_page_view_accepts_zoom_events() {
        let server = get_test_server();
        server.get(endpoints::BILLING_VIEW).await.assert_status_ok();

        let response = server
            .post(&endpoints::format_endpoint(endpoints::BILLING_VIEW_ZOOM, 1))
            .json(&json!({ "min_timestamp": 0, "max_timestamp": 1 }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["mode"], "daily");
    }

    #[tokio::test]
    async fn invalid_invoice_form_is_rejected() {
        let server = get_test_server();

        let response = server
            .post(endpoints::INVOICES_API)
            .form(&[
                ("patient_name", "Jane Doe"),
                ("service_name", "Consultation"),
                ("amount", "0"),
                ("status", "paid"),
                ("date", "2024-03-05"),
            ])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
