//! Endpoints for a logged-in user to edit their profile and change their password.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    AppState, Error, PasswordHash,
    auth::{
        User, UserID,
        user::{ProfileUpdate, get_user_by_id, set_password_by_id, update_profile},
    },
    json_body::{JsonBody, RequiredFields, require},
};

/// The longest accepted profile picture, in characters of its encoded form.
///
/// Roughly a 5 MB image once base64 encoded.
pub const MAX_PROFILE_PICTURE_LENGTH: usize = 7_000_000;

/// Trim `value` and discard it if nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Check that an encoded profile picture is not too large.
///
/// # Errors
///
/// Returns [Error::ProfilePictureTooLarge] if `profile_picture` is longer
/// than [MAX_PROFILE_PICTURE_LENGTH].
pub(crate) fn check_profile_picture(profile_picture: Option<&str>) -> Result<(), Error> {
    match profile_picture {
        Some(picture) if picture.len() > MAX_PROFILE_PICTURE_LENGTH => {
            Err(Error::ProfilePictureTooLarge)
        }
        _ => Ok(()),
    }
}

/// The profile fields a client may send. Absent fields are left unchanged,
/// an empty phone number or profile picture clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    name: Option<String>,
    phone_number: Option<String>,
    profile_picture: Option<String>,
}

/// The response to a successful profile update.
#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    message: &'static str,
    user: User,
}

/// Update the name, phone number or profile picture of the logged-in user.
///
/// # Errors
///
/// This function will return an error if:
/// - the name is present but blank,
/// - the profile picture is too large,
/// - the user no longer exists,
/// - or the database could not be accessed.
pub async fn update_profile_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, Error> {
    let name = match request.name {
        Some(name) => {
            let name = non_blank(Some(name));
            require(&[("name", name.is_some())])?;
            name
        }
        None => None,
    };

    let profile_picture = request.profile_picture.map(|picture| non_blank(Some(picture)));
    check_profile_picture(profile_picture.as_ref().and_then(Option::as_deref))?;

    let update = ProfileUpdate {
        name,
        phone_number: request.phone_number.map(|phone| non_blank(Some(phone))),
        profile_picture,
    };

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = update_profile(user_id, update, &connection).map_err(|error| match error {
        Error::NotFound => Error::UserNotFound,
        error => error,
    })?;

    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully",
        user,
    }))
}

/// The data needed to change the logged-in user's password.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    current_password: Option<String>,
    new_password: Option<String>,
}

/// Replace the logged-in user's password after checking the current one.
///
/// # Errors
///
/// This function will return an error if:
/// - either password is missing,
/// - the current password is wrong ([Error::IncorrectPassword]),
/// - the user no longer exists,
/// - or hashing or the database failed.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(request): JsonBody<ChangePasswordRequest>,
) -> Result<Json<Value>, Error> {
    let current_password = request.current_password.filter(|password| !password.is_empty());
    let new_password = request.new_password.filter(|password| !password.is_empty());

    let (current_password, new_password) = (
        ("current_password", current_password),
        ("new_password", new_password),
    )
        .required()?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_id(user_id, &connection).map_err(|error| match error {
            Error::NotFound => Error::UserNotFound,
            error => error,
        })?
    };

    let is_password_correct = user
        .password_hash
        .verify(&current_password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_correct {
        return Err(Error::IncorrectPassword);
    }

    let password_hash =
        PasswordHash::from_raw_password(&new_password, state.token_config.password_cost)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    set_password_by_id(user_id, &password_hash, &connection)?;

    tracing::info!("User {user_id} changed their password");

    Ok(Json(json!({ "message": "Password changed successfully" })))
}
