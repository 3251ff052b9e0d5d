use axum::{http::StatusCode, middleware};
use axum_test::TestServer;
use serde_json::{Value, json};

use crate::{app_state::test_state::get_test_app_state, build_router, endpoints, logging_middleware};

/// A server running the full application against an in-memory database.
pub(crate) fn get_test_server() -> TestServer {
    TestServer::try_new(build_router(get_test_app_state())).expect("Could not create test server.")
}

/// Like [get_test_server] but with request and response logging, as the
/// server binary runs it.
pub(crate) fn get_logged_test_server() -> TestServer {
    let app = build_router(get_test_app_state()).layer(middleware::from_fn(logging_middleware));

    TestServer::try_new(app).expect("Could not create test server.")
}

/// Register a user with `email` and return their bearer token.
pub(crate) async fn sign_up_user(server: &TestServer, email: &str) -> String {
    let response = server
        .post(endpoints::SIGN_UP)
        .json(&json!({
            "email": email,
            "password": "averysafeandsecurepassword",
            "name": "Test User",
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    response.json::<Value>()["token"]
        .as_str()
        .expect("sign up response should contain a token")
        .to_owned()
}
