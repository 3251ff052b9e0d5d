//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, MatchedPath, Request},
    middleware,
    routing::{get, post, put},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    AppState, Error,
    auth::{
        auth_guard, change_password, forgot_password, log_in, reset_password, sign_up,
        update_profile_endpoint, verify,
    },
    dashboard::get_dashboard_summary,
    endpoints,
    transaction::{
        TransactionKind, create_transaction_endpoint, delete_transaction_endpoint,
        edit_transaction_endpoint, list_transactions_endpoint,
    },
};

/// The largest request body accepted, big enough for an encoded profile picture.
pub const REQUEST_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_api_status))
        .route(endpoints::SIGN_UP, post(sign_up))
        .route(endpoints::LOG_IN, post(log_in))
        .route(endpoints::FORGOT_PASSWORD, post(forgot_password))
        .route(endpoints::RESET_PASSWORD, post(reset_password));

    let protected_routes = Router::new()
        .route(endpoints::VERIFY, get(verify))
        .route(endpoints::UPDATE_PROFILE, put(update_profile_endpoint))
        .route(endpoints::CHANGE_PASSWORD, put(change_password))
        .route(endpoints::DASHBOARD_SUMMARY, get(get_dashboard_summary))
        .merge(transaction_routes(
            TransactionKind::Income,
            endpoints::INCOMES,
            endpoints::INCOME,
        ))
        .merge(transaction_routes(
            TransactionKind::Expense,
            endpoints::EXPENSES,
            endpoints::EXPENSE,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    add_tracing_layer(protected_routes.merge(unprotected_routes))
        .fallback(get_404_not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .layer(CorsLayer::permissive())
}

/// The create, list, edit and delete routes for one kind of transaction.
///
/// The collection route is served both with and without a trailing slash.
fn transaction_routes(
    kind: TransactionKind,
    collection_path: &str,
    item_path: &str,
) -> Router<AppState> {
    Router::new()
        .route(
            collection_path,
            post(create_transaction_endpoint).get(list_transactions_endpoint),
        )
        .route(
            &format!("{collection_path}/"),
            post(create_transaction_endpoint).get(list_transactions_endpoint),
        )
        .route(
            item_path,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route_layer(Extension(kind))
}

/// Open a span for each request that records the route it matched.
///
/// Added as a route layer so that [MatchedPath] is already set when the span
/// is created.
fn add_tracing_layer(router: Router<AppState>) -> Router<AppState> {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are already logged when they are turned into responses.
        .on_failure(());

    router.route_layer(tracing_layer)
}

/// Report that the server is up.
async fn get_api_status() -> Json<Value> {
    Json(json!({ "message": "Finance Tracker API is running" }))
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        auth::MAX_PROFILE_PICTURE_LENGTH,
        endpoints,
        routing::REQUEST_BODY_LIMIT,
        test_utils::{LogCapture, get_logged_test_server, get_test_server, sign_up_user},
    };

    #[tokio::test]
    async fn root_reports_api_is_running() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_ok();
        response.assert_json(&json!({"message": "Finance Tracker API is running"}));
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/nothing-here").await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({"error": "The requested resource could not be found"}));
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let server = get_test_server();

        for path in [
            endpoints::VERIFY,
            endpoints::INCOMES,
            endpoints::EXPENSES,
            endpoints::DASHBOARD_SUMMARY,
        ] {
            server
                .get(path)
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }
        server
            .put(endpoints::CHANGE_PASSWORD)
            .json(&json!({}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .delete("/api/income/1")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_routes_reject_garbage_token() {
        let server = get_test_server();

        let response = server
            .get(endpoints::DASHBOARD_SUMMARY)
            .authorization_bearer("definitely.not.valid")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"error": "Invalid or expired token"}));
    }

    #[tokio::test]
    async fn sign_up_log_in_and_verify() {
        let server = get_test_server();
        sign_up_user(&server, "foo@bar.baz").await;

        let log_in_response = server
            .post(endpoints::LOG_IN)
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "averysafeandsecurepassword",
            }))
            .await;
        log_in_response.assert_status_ok();
        let token = log_in_response.json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_owned();

        let verify_response = server
            .get(endpoints::VERIFY)
            .authorization_bearer(&token)
            .await;

        verify_response.assert_status_ok();
        assert_eq!(verify_response.json::<Value>()["user"]["email"], "foo@bar.baz");
    }

    #[tokio::test]
    async fn income_and_expense_are_separate() {
        let server = get_test_server();
        let token = sign_up_user(&server, "foo@bar.baz").await;

        let income_id = server
            .post(endpoints::INCOMES)
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Salary",
                "amount": 100,
                "category": "Work",
                "date": "2025-03-14",
            }))
            .await
            .json::<Value>()["income_id"]
            .as_i64()
            .unwrap();

        server
            .delete(&format!("{}/{income_id}", endpoints::EXPENSES))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .await
            .assert_json(&json!({"expenses": []}));
    }

    #[tokio::test]
    async fn cors_preflight_is_allowed() {
        let server = get_test_server();

        let response = server
            .method(axum::http::Method::OPTIONS, endpoints::INCOMES)
            .add_header("Origin", "http://localhost:3000")
            .add_header("Access-Control-Request-Method", "POST")
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }

    #[tokio::test]
    async fn tokens_and_passwords_are_not_logged() {
        let (logs, _guard) = LogCapture::start();
        let server = get_logged_test_server();
        let token = sign_up_user(&server, "foo@bar.baz").await;

        server
            .get(endpoints::VERIFY)
            .authorization_bearer(&token)
            .await
            .assert_status_ok();

        let logs = logs.text();
        assert!(logs.contains("foo@bar.baz"), "request bodies should be logged");
        assert!(!logs.contains(&token), "bearer token was written to the logs");
        assert!(!logs.contains("averysafeandsecurepassword"));
    }

    #[tokio::test]
    async fn request_span_records_matched_route() {
        let (logs, _guard) = LogCapture::start();
        let server = get_logged_test_server();
        let token = sign_up_user(&server, "foo@bar.baz").await;

        server
            .delete("/api/income/1")
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        assert!(
            logs.text()
                .contains(&format!("matched_path=\"{}\"", endpoints::INCOME))
        );
    }

    #[tokio::test]
    async fn large_profile_picture_is_accepted() {
        let server = get_logged_test_server();
        let token = sign_up_user(&server, "foo@bar.baz").await;
        let picture = "a".repeat(6_000_000);

        let response = server
            .put(endpoints::UPDATE_PROFILE)
            .authorization_bearer(&token)
            .json(&json!({ "profile_picture": picture }))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>()["user"]["profile_picture"]
                .as_str()
                .map(str::len),
            Some(6_000_000)
        );
    }

    #[tokio::test]
    async fn oversized_profile_picture_is_bad_request() {
        let server = get_logged_test_server();
        let picture = "a".repeat(MAX_PROFILE_PICTURE_LENGTH + 1);

        let response = server
            .post(endpoints::SIGN_UP)
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "averysafeandsecurepassword",
                "name": "Test User",
                "profile_picture": picture,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Profile picture is too large"}));
    }

    #[tokio::test]
    async fn body_over_limit_is_rejected() {
        let server = get_logged_test_server();
        let name = "a".repeat(REQUEST_BODY_LIMIT);

        let response = server
            .post(endpoints::SIGN_UP)
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "averysafeandsecurepassword",
                "name": name,
            }))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        response.assert_json(&json!({"error": "The request body is too large"}));
    }

    #[tokio::test]
    async fn body_over_limit_is_rejected_without_logging_middleware() {
        let server = get_test_server();
        let name = "a".repeat(REQUEST_BODY_LIMIT);

        let response = server
            .post(endpoints::SIGN_UP)
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "averysafeandsecurepassword",
                "name": name,
            }))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }
}
