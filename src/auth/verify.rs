//! Checking a bearer token and returning the user it belongs to.

use axum::{Extension, Json, extract::State};
use serde::Serialize;

use crate::{
    AppState, Error,
    auth::{User, UserID, user::get_user_by_id},
};

/// The user a valid token belongs to.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    user: User,
}

/// Return the user the bearer token was issued to.
///
/// # Errors
///
/// Returns [Error::UserNotFound] if the user was removed after the token was issued.
pub async fn verify(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<VerifyResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    match get_user_by_id(user_id, &connection) {
        Ok(user) => Ok(Json(VerifyResponse { user })),
        Err(Error::NotFound) => Err(Error::UserNotFound),
        Err(error) => Err(error),
    }
}
