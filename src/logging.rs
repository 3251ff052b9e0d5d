//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, Method, Uri, header::AUTHORIZATION, response},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{Error, routing::REQUEST_BODY_LIMIT};

/// Bodies longer than this many characters are truncated in `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// JSON fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 4] = ["password", "new_password", "current_password", "token"];

const REDACTED_VALUE: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords and tokens in JSON bodies and the authorization header are
/// redacted.
///
/// Request bodies longer than the router's body limit are rejected with
/// [Error::BodyTooLarge] before they reach the router.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, REQUEST_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) => {
            // Exceeding the limit is the only read failure a client can cause.
            tracing::warn!("Could not read request body: {error}");
            return Error::BodyTooLarge.into_response();
        }
    };

    log_request(
        &parts.method,
        &parts.uri,
        &redact_headers(&parts.headers),
        &loggable_text(&body_bytes),
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return Error::MalformedBody(error.to_string()).into_response();
        }
    };
    log_response(&parts, &loggable_text(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

/// A copy of `headers` with the authorization header masked.
fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    if let Some(value) = headers.get_mut(AUTHORIZATION) {
        *value = HeaderValue::from_static(REDACTED_VALUE);
    }

    headers
}

/// The body as text with any secrets removed.
///
/// Invalid UTF-8 is replaced for logging only, the body passed on is untouched.
fn loggable_text(body_bytes: &Bytes) -> String {
    redact_secrets(&String::from_utf8_lossy(body_bytes))
}

/// Replace the value of every password or token field in a JSON object with
/// asterisks.
///
/// Text that is not a JSON object is returned as is.
fn redact_secrets(body_text: &str) -> String {
    let mut json = match serde_json::from_str::<Value>(body_text) {
        Ok(Value::Object(json)) => json,
        _ => return body_text.to_owned(),
    };

    let mut was_redacted = false;

    for field in REDACTED_FIELDS {
        if let Some(value) = json.get_mut(field) {
            *value = Value::String(REDACTED_VALUE.to_owned());
            was_redacted = true;
        }
    }

    if was_redacted {
        Value::Object(json).to_string()
    } else {
        body_text.to_owned()
    }
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if it is
/// short enough to log in full.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(method: &Method, uri: &Uri, headers: &HeaderMap, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!(
                "Received request: {method} {uri}\nheaders: {headers:#?}\nbody: {truncated}..."
            );
            tracing::debug!("Full request body: {body:?}");
        }
        None => {
            tracing::info!("Received request: {method} {uri}\nheaders: {headers:#?}\nbody: {body:?}")
        }
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}
