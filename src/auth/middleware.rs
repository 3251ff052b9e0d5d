//! Authentication middleware that validates bearer tokens.

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::DecodingKey;

use crate::{AppState, Error, auth::token::decode_token};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key used to verify the signature of bearer tokens.
    pub decoding_key: DecodingKey,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            decoding_key: state.token_keys.decoding_key.clone(),
        }
    }
}

/// Middleware function that checks for a valid bearer token.
///
/// The user ID is placed into the request and the request executed normally
/// if the token is valid, otherwise a 401 JSON error is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let bearer = match parts.headers.typed_get::<Authorization<Bearer>>() {
        Some(Authorization(bearer)) => bearer,
        None => return Error::MissingToken.into_response(),
    };

    let user_id = match decode_token(bearer.token(), &state.decoding_key) {
        Ok(claims) => claims.sub,
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(user_id);
    next.run(Request::from_parts(parts, body)).await
}
