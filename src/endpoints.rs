//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/billing/views/{view_id}', use
//! [format_endpoint].

/// The root route which redirects to the billing page.
pub const ROOT: &str = "/";
/// The billing overview with the revenue chart.
pub const BILLING_VIEW: &str = "/billing";
/// The page listing every invoice and expense.
pub const TRANSACTIONS_VIEW: &str = "/billing/transactions";
/// The page for creating a new invoice.
pub const NEW_INVOICE_VIEW: &str = "/invoices/new";
/// The page for recording an expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create an invoice.
pub const INVOICES_API: &str = "/api/invoices";
/// The route to record an expense.
pub const EXPENSES_API: &str = "/api/expenses";
/// The base route of an open billing view, the routes below are relative to it.
pub const BILLING_VIEW_API: &str = "/api/billing/views/{view_id}";
/// The route the chart reports its visible window to.
pub const BILLING_VIEW_ZOOM: &str = "/api/billing/views/{view_id}/zoom";
/// The route to return a billing view to the annual chart.
pub const BILLING_VIEW_RESET: &str = "/api/billing/views/{view_id}/reset";
/// The route to show a single day on the chart.
pub const BILLING_VIEW_FOCUS: &str = "/api/billing/views/{view_id}/focus";
/// The route to reload a billing view's invoices from the database.
pub const BILLING_VIEW_REFRESH: &str = "/api/billing/views/{view_id}/refresh";
/// The route to discard a billing view.
pub const BILLING_VIEW_CLOSE: &str = "/api/billing/views/{view_id}/close";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/invoices/{invoice_id}', '{invoice_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::BILLING_VIEW);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_INVOICE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_EXPENSE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::INVOICES_API);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES_API);
        assert_endpoint_is_valid_uri(endpoints::BILLING_VIEW_API);
        assert_endpoint_is_valid_uri(endpoints::BILLING_VIEW_ZOOM);
        assert_endpoint_is_valid_uri(endpoints::BILLING_VIEW_RESET);
        assert_endpoint_is_valid_uri(endpoints::BILLING_VIEW_FOCUS);
        assert_endpoint_is_valid_uri(endpoints::BILLING_VIEW_REFRESH);
        assert_endpoint_is_valid_uri(endpoints::BILLING_VIEW_CLOSE);
    }

    #[test]
    fn view_routes_extend_the_view_base_route() {
        for route in [
            endpoints::BILLING_VIEW_ZOOM,
            endpoints::BILLING_VIEW_RESET,
            endpoints::BILLING_VIEW_FOCUS,
            endpoints::BILLING_VIEW_REFRESH,
            endpoints::BILLING_VIEW_CLOSE,
        ] {
            assert!(route.starts_with(endpoints::BILLING_VIEW_API));
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::BILLING_VIEW_FOCUS, 7);

        assert_eq!(formatted_path, "/api/billing/views/7/focus");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
