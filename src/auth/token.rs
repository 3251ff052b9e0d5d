//! Bearer tokens: JSON Web Tokens signed with HS256 that identify a user.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

/// The contents of a JSON Web Token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: UserID,
    /// The time the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// The expiry time of the token, in seconds since the Unix epoch.
    pub exp: i64,
}

/// Create a signed token for `user_id` that expires after `duration`.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the claims could not be signed.
pub fn encode_token(
    user_id: UserID,
    duration: Duration,
    encoding_key: &EncodingKey,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id,
        iat: now.unix_timestamp(),
        exp: (now + duration).unix_timestamp(),
    };

    encode(&Header::default(), &claims, encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Check the signature and expiry of `token` and return its claims.
///
/// # Errors
///
/// Returns [Error::InvalidToken] if the token is malformed, expired or was
/// signed with a different key.
pub fn decode_token(token: &str, decoding_key: &DecodingKey) -> Result<Claims, Error> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("Rejected bearer token: {error}");
            Error::InvalidToken
        })
}
