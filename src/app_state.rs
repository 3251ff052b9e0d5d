//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;
use time::Duration;

use crate::{Error, PasswordHash, db::initialize};

/// The default lifetime of a bearer token.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(24);

/// Settings for issuing and hashing credentials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenConfig {
    /// How long a bearer token is valid for after it is issued.
    pub token_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            token_duration: DEFAULT_TOKEN_DURATION,
            password_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// The keys used to sign and verify bearer tokens.
#[derive(Clone)]
pub struct TokenKeys {
    /// The key used to sign new tokens.
    pub encoding_key: EncodingKey,
    /// The key used to verify the signature of incoming tokens.
    pub decoding_key: DecodingKey,
}

impl TokenKeys {
    /// Derive the signing and verification keys from a shared secret.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The keys for signing and verifying bearer tokens.
    pub token_keys: TokenKeys,

    /// Token lifetime and password hashing settings.
    pub token_config: TokenConfig,

    /// A hash that log-in attempts for unknown emails are checked against so
    /// that they take as long as attempts with a wrong password.
    pub dummy_password_hash: PasswordHash,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the dummy
    /// password cannot be hashed.
    pub fn new(
        db_connection: Connection,
        token_secret: &str,
        token_config: TokenConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let dummy_password_hash =
            PasswordHash::from_raw_password("not a real password", token_config.password_cost)?;

        Ok(Self {
            token_keys: TokenKeys::from_secret(token_secret),
            token_config,
            dummy_password_hash,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_state {
    use rusqlite::Connection;
    use time::Duration;

    use crate::{AppState, TokenConfig};

    pub const TEST_SECRET: &str = "averysecrettestsecret";

    /// Bcrypt's minimum cost, keeps the tests fast.
    pub const TEST_PASSWORD_COST: u32 = 4;

    pub fn get_test_app_state() -> AppState {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");

        AppState::new(
            connection,
            TEST_SECRET,
            TokenConfig {
                token_duration: Duration::hours(1),
                password_cost: TEST_PASSWORD_COST,
            },
        )
        .expect("Could not create app state.")
    }
}
