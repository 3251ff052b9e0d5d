//! Registration of new users.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash,
    auth::{
        User, encode_token,
        profile::{check_profile_picture, non_blank},
        user::{NewUser, create_user},
    },
    json_body::{JsonBody, RequiredFields},
};

/// The data sent by a client to register.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
    profile_picture: Option<String>,
    phone_number: Option<String>,
}

/// The response to a successful sign-up or log-in.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// A human readable description of what happened.
    pub message: &'static str,
    /// The bearer token for authenticating subsequent requests.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}

/// Register a new user and log them in.
///
/// Responds with 201 Created, a bearer token and the new user.
///
/// # Errors
///
/// This function will return an error if:
/// - the email, password or name is missing,
/// - the email is already registered,
/// - the profile picture is too large,
/// - or the password could not be hashed or the user could not be saved.
pub async fn sign_up(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    let email = non_blank(request.email);
    let name = non_blank(request.name);
    let password = request.password.filter(|password| !password.is_empty());

    let (email, password, name) =
        (("email", email), ("password", password), ("name", name)).required()?;

    let profile_picture = non_blank(request.profile_picture);
    check_profile_picture(profile_picture.as_deref())?;

    let password_hash = PasswordHash::from_raw_password(&password, state.token_config.password_cost)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(
            NewUser {
                email,
                password_hash,
                name,
                profile_picture,
                phone_number: non_blank(request.phone_number),
            },
            &connection,
        )?
    };

    tracing::info!("Registered user {}", user.id);

    let token = encode_token(
        user.id,
        state.token_config.token_duration,
        &state.token_keys.encoding_key,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully",
            token,
            user,
        }),
    ))
}
