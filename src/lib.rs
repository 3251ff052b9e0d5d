//! A personal finance tracker.
//!
//! Users register, log in and record their incomes and expenses. A dashboard
//! endpoint aggregates totals, recent activity and per-category breakdowns.
//!
//! This library provides a JSON REST API authenticated with bearer tokens.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod dashboard;
mod db;
mod endpoints;
mod json_body;
mod logging;
mod routing;
#[cfg(test)]
mod test_utils;
mod transaction;

pub use app_state::{AppState, TokenConfig};
pub use auth::{PasswordHash, User, UserID};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{Transaction, TransactionKind};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for ctrl+c: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not listen for the terminate signal: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}

/// The errors that may occur in the application.
///
/// Every variant maps to exactly one HTTP status code, see the
/// [IntoResponse] implementation. The client receives the error message in a
/// JSON object of the form `{"error": "..."}`.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more fields required by the endpoint were not in the request.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The email used to register is already taken by another user.
    #[error("Email already registered")]
    DuplicateEmail,

    /// Amounts must be finite and not less than zero.
    #[error("Amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),

    /// The date could not be parsed as either `YYYY-MM-DD` or an RFC 3339 date-time.
    #[error("Invalid date \"{0}\", expected a date such as 2024-01-31")]
    InvalidDate(String),

    /// The profile picture was larger than [auth::MAX_PROFILE_PICTURE_LENGTH].
    #[error("Profile picture is too large")]
    ProfilePictureTooLarge,

    /// The email and password combination did not match a registered user.
    ///
    /// Used for both unknown emails and wrong passwords so that clients cannot
    /// tell which one was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The current password given when changing passwords was wrong.
    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// The request did not have a bearer token in the authorization header.
    #[error("Missing authorization token")]
    MissingToken,

    /// The bearer token was malformed, expired or signed with the wrong key.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The user referred to by a valid token no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// The income or expense does not exist or belongs to another user.
    ///
    /// The two cases are reported the same way so that users cannot probe for
    /// other users' records.
    #[error("{} not found", .0.label())]
    TransactionNotFound(TransactionKind),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("The requested resource could not be found")]
    NotFound,

    /// The request body was longer than the router's request body limit.
    #[error("The request body is too large")]
    BodyTooLarge,

    /// The request body was not valid JSON for the endpoint.
    #[error("Could not parse the request body: {0}")]
    MalformedBody(String),

    /// An unexpected error occurred with the underlying hashing library.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The bearer token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                Some(ref desc),
            ) if desc.ends_with("user.email") => Error::DuplicateEmail,
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that best describes the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFields(_)
            | Error::DuplicateEmail
            | Error::InvalidAmount(_)
            | Error::InvalidDate(_)
            | Error::ProfilePictureTooLarge => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials
            | Error::IncorrectPassword
            | Error::MissingToken
            | Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::UserNotFound | Error::TransactionNotFound(_) | Error::NotFound => {
                StatusCode::NOT_FOUND
            }
            Error::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::MalformedBody(_)
            | Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
