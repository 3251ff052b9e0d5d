//! Handles log-in requests.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{AuthResponse, encode_token, user::get_user_by_email},
    json_body::{JsonBody, RequiredFields},
};

/// The credentials sent by a client to log in.
#[derive(Debug, Deserialize)]
pub struct LogInRequest {
    email: Option<String>,
    password: Option<String>,
}

/// Handler for log-in requests.
///
/// On success, responds with a bearer token and the user.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email or password is missing.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password.
///
/// An unknown email and a wrong password produce the same
/// [Error::InvalidCredentials]. For an unknown email the password is still
/// checked against a dummy hash so that both cases take the same time.
pub async fn log_in(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LogInRequest>,
) -> Result<Json<AuthResponse>, Error> {
    let email = request
        .email
        .map(|email| email.trim().to_owned())
        .filter(|email| !email.is_empty());
    let (email, password) = (("email", email), ("password", request.password)).required()?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => Some(user),
            Err(Error::NotFound) => None,
            Err(error) => return Err(error),
        }
    };

    let user = match user {
        Some(user) => user,
        None => {
            let _ = state.dummy_password_hash.verify(&password);
            return Err(Error::InvalidCredentials);
        }
    };

    let is_password_correct = user.password_hash.verify(&password).map_err(|error| {
        tracing::error!("Error verifying password for user {}: {error}", user.id);
        Error::HashingError(error.to_string())
    })?;

    if !is_password_correct {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(
        user.id,
        state.token_config.token_duration,
        &state.token_keys.encoding_key,
    )?;

    Ok(Json(AuthResponse {
        message: "Login successful",
        token,
        user,
    }))
}
