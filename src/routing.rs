//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_forgot_password_page, get_reset_password_page,
        get_sign_in_page, get_sign_out, get_sign_up_page, post_forgot_password,
        post_reset_password, post_sign_in, post_sign_up,
    },
    cashbox::{
        create_cashbox_endpoint, create_transfer_endpoint, delete_cashbox_endpoint,
        get_edit_cashbox_page, get_new_cashbox_page, get_transfer_page,
        transfer_coefficient_endpoint, update_cashbox_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_edit_category_page,
        get_new_category_page, mcc_codes_endpoint, update_category_endpoint,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    manage::get_manage_page,
    monobank::{
        connect_monobank_endpoint, get_monobank_page, monitor_card_endpoint,
        unmonitor_card_endpoint,
    },
    not_found::get_404_not_found,
    stats::get_dashboard_page,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, export_transactions_endpoint,
        get_edit_transaction_page, get_new_transaction_page, get_transactions_page,
        transaction_coefficient_endpoint, update_transaction_endpoint,
    },
    user::change_currency_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::SIGN_IN_VIEW, get(get_sign_in_page))
        .route(endpoints::SIGN_IN_API, post(post_sign_in))
        .route(endpoints::SIGN_UP_VIEW, get(get_sign_up_page))
        .route(endpoints::SIGN_UP_API, post(post_sign_up))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(endpoints::FORGOT_PASSWORD_API, post(post_forgot_password))
        .route(endpoints::RESET_PASSWORD_VIEW, get(get_reset_password_page))
        .route(endpoints::RESET_PASSWORD_API, post(post_reset_password))
        .route(endpoints::SIGN_OUT, get(get_sign_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::MANAGE_VIEW, get(get_manage_page))
        .route(endpoints::NEW_CASHBOX_VIEW, get(get_new_cashbox_page))
        .route(endpoints::EDIT_CASHBOX_VIEW, get(get_edit_cashbox_page))
        .route(endpoints::TRANSFER_VIEW, get(get_transfer_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::TRANSACTIONS_EXPORT,
            get(export_transactions_endpoint),
        )
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::MONOBANK_VIEW, get(get_monobank_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // htmx requests need the HX-Redirect header for auth redirects to work.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::CASHBOXES_API, post(create_cashbox_endpoint))
            .route(
                endpoints::CASHBOX_API,
                put(update_cashbox_endpoint).delete(delete_cashbox_endpoint),
            )
            .route(endpoints::TRANSFERS_API, post(create_transfer_endpoint))
            .route(
                endpoints::TRANSFER_COEFFICIENT_API,
                post(transfer_coefficient_endpoint),
            )
            .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
            .route(endpoints::CATEGORY_MCC_API, post(mcc_codes_endpoint))
            .route(
                endpoints::CATEGORY_API,
                put(update_category_endpoint).delete(delete_category_endpoint),
            )
            .route(endpoints::TRANSACTIONS_API, post(create_transaction_endpoint))
            .route(
                endpoints::TRANSACTION_COEFFICIENT_API,
                post(transaction_coefficient_endpoint),
            )
            .route(
                endpoints::TRANSACTION_API,
                put(update_transaction_endpoint)
                    .delete(delete_transaction_endpoint),
            )
            .route(endpoints::USER_CURRENCY_API, post(change_currency_endpoint))
            .route(
                endpoints::MONOBANK_CONNECT_API,
                post(connect_monobank_endpoint),
            )
            .route(endpoints::MONOBANK_MONITOR_API, post(monitor_card_endpoint))
            .route(
                endpoints::MONOBANK_UNMONITOR_API,
                post(unmonitor_card_endpoint),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        http::{
            StatusCode,
            header::{LOCATION, SET_COOKIE},
        },
        response::IntoResponse,
    };
    use axum_extra::extract::cookie::Cookie;
    use axum_test::{TestResponse, TestServer};
    use uuid::Uuid;

    use crate::{
        auth::COOKIE_SESSION,
        endpoints::{self, format_endpoint},
        test_utils::{session_cookie, spawn_backend, test_state, test_user},
    };

    use super::{build_router, get_index_page};

    fn get_test_server() -> TestServer {
        let state = test_state("http://127.0.0.1:9");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn pages_without_session_redirect_to_sign_in() {
        let server = get_test_server();

        let response = server.get(endpoints::TRANSACTIONS_VIEW).await;

        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.header(LOCATION);
        assert!(
            location
                .to_str()
                .unwrap()
                .starts_with(endpoints::SIGN_IN_VIEW),
            "unexpected redirect {location:?}"
        );
    }

    #[tokio::test]
    async fn htmx_routes_without_session_use_hx_redirect() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USER_CURRENCY_API)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", "http://localhost/manage")
            .await;

        response.assert_status_ok();
        let redirect = response.header("hx-redirect");
        assert!(
            redirect
                .to_str()
                .unwrap()
                .starts_with(endpoints::SIGN_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn sign_in_page_is_public() {
        let server = get_test_server();

        server.get(endpoints::SIGN_IN_VIEW).await.assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server.get("/definitely/not/a/page").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    /// A server whose backend answers every call with 401, plus a valid
    /// session cookie for it.
    async fn get_server_with_rejected_token() -> (TestServer, Cookie<'static>) {
        let backend =
            spawn_backend(Router::new().fallback(|| async { StatusCode::UNAUTHORIZED })).await;
        let state = test_state(&backend.url);
        let cookie = session_cookie(&state, &test_user());
        let server = TestServer::try_new(build_router(state)).expect("Could not create test server.");

        (server, cookie)
    }

    #[track_caller]
    fn assert_session_cleared_once(response: &TestResponse) {
        let session_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter(|value| value.to_str().unwrap().starts_with(COOKIE_SESSION))
            .count();
        assert_eq!(session_cookies, 1);
        assert_eq!(
            response.cookie(COOKIE_SESSION).max_age(),
            Some(time::Duration::ZERO)
        );
    }

    #[tokio::test]
    async fn rejected_token_on_page_signs_out_and_redirects() {
        let (server, cookie) = get_server_with_rejected_token().await;

        let response = server
            .get(endpoints::TRANSACTIONS_VIEW)
            .add_cookie(cookie)
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        let expected_query =
            serde_urlencoded::to_string([("redirect_url", endpoints::TRANSACTIONS_VIEW)]).unwrap();
        assert_eq!(
            response.header(LOCATION),
            format!("{}?{}", endpoints::SIGN_IN_VIEW, expected_query)
        );
        assert_session_cleared_once(&response);
    }

    #[tokio::test]
    async fn rejected_token_on_htmx_route_signs_out_and_redirects() {
        let (server, cookie) = get_server_with_rejected_token().await;
        let current_url = "/transactions?page=2";

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION_API, Uuid::nil()))
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let expected_query = serde_urlencoded::to_string([("redirect_url", current_url)]).unwrap();
        assert_eq!(
            response.header("hx-redirect"),
            format!("{}?{}", endpoints::SIGN_IN_VIEW, expected_query)
        );
        assert_session_cleared_once(&response);
    }
}
