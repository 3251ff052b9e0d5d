//! Password recovery.
//!
//! There is no email delivery or reset code: `forgot_password` only
//! acknowledges the request and `reset_password` overwrites the password of
//! the account with the given email. Both respond identically whether or not
//! the email is registered.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error, PasswordHash,
    auth::{profile::non_blank, user::set_password_by_email},
    json_body::{JsonBody, RequiredFields, require},
};

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, password reset instructions have been sent";
const RESET_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, its password has been reset";

/// A request to start password recovery.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    email: Option<String>,
}

/// Acknowledge a password recovery request.
///
/// # Errors
///
/// Returns [Error::MissingFields] if no email was given.
pub async fn forgot_password(
    JsonBody(request): JsonBody<ForgotPasswordRequest>,
) -> Result<Json<Value>, Error> {
    let email = non_blank(request.email);
    require(&[("email", email.is_some())])?;

    Ok(Json(json!({ "message": FORGOT_PASSWORD_MESSAGE })))
}

/// A request to replace the password of the account registered with `email`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    email: Option<String>,
    new_password: Option<String>,
}

/// Replace the password of the account registered with the given email.
///
/// The new password is hashed even if the email is unknown.
///
/// # Errors
///
/// This function will return an error if:
/// - the email or new password is missing,
/// - or hashing or the database failed.
pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ResetPasswordRequest>,
) -> Result<Json<Value>, Error> {
    let email = non_blank(request.email);
    let new_password = request.new_password.filter(|password| !password.is_empty());

    let (email, new_password) = (("email", email), ("new_password", new_password)).required()?;

    let password_hash =
        PasswordHash::from_raw_password(&new_password, state.token_config.password_cost)?;

    let rows_affected = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        set_password_by_email(&email, &password_hash, &connection)?
    };

    if rows_affected > 0 {
        tracing::info!("Password reset for an existing account");
    } else {
        tracing::debug!("Password reset requested for an unknown email");
    }

    Ok(Json(json!({ "message": RESET_PASSWORD_MESSAGE })))
}
