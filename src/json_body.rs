//! A JSON body extractor whose rejections use the crate's error envelope.
//!
//! Request structs deserialize every client-supplied field as an `Option` so
//! that missing fields can be reported together via [require].

use axum::{
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Deserializer, de};

use crate::Error;

/// Like [axum::Json] but rejects with [Error::MalformedBody], or
/// [Error::BodyTooLarge] when the body exceeds the router's limit.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::BodyTooLarge
        } else {
            Error::MalformedBody(rejection.body_text())
        }
    }
}

/// Report every `(name, is_present)` pair that is missing.
///
/// # Errors
///
/// Returns [Error::MissingFields] naming each absent field.
pub fn require(fields: &[(&'static str, bool)]) -> Result<(), Error> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, is_present)| !is_present)
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingFields(missing))
    }
}

/// Named optional fields that must all be present.
///
/// Implemented for tuples of `(name, Option<T>)` pairs so handlers can unwrap
/// every required field in one step and still report all missing fields.
pub trait RequiredFields {
    /// The tuple of unwrapped values.
    type Values;

    /// Unwrap every field.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingFields] naming each absent field.
    fn required(self) -> Result<Self::Values, Error>;
}

macro_rules! impl_required_fields {
    ($($field:ident: $type:ident),+) => {
        impl<$($type),+> RequiredFields for ($((&'static str, Option<$type>),)+) {
            type Values = ($($type,)+);

            fn required(self) -> Result<Self::Values, Error> {
                let ($($field,)+) = self;
                let names = [$($field.0),+];

                match ($($field.1,)+) {
                    ($(Some($field),)+) => Ok(($($field,)+)),
                    ($($field,)+) => {
                        let is_present = [$($field.is_some()),+];
                        Err(Error::MissingFields(
                            names
                                .into_iter()
                                .zip(is_present)
                                .filter(|(_, is_present)| !is_present)
                                .map(|(name, _)| name)
                                .collect(),
                        ))
                    }
                }
            }
        }
    };
}

impl_required_fields!(a: A, b: B);
impl_required_fields!(a: A, b: B, c: C);
impl_required_fields!(a: A, b: B, c: C, d: D);

/// Deserialize a number that may be sent either as a JSON number or as a
/// numeric string, e.g. `50`, `50.5` or `"50.5"`.
pub fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(number)) => Ok(Some(number)),
        Some(NumberOrString::String(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("\"{text}\" is not a number"))),
    }
}
