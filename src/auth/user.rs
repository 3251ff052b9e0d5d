//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, named_params,
    types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for UserID {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for UserID {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(UserID)
    }
}

/// A registered user of the application.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email the user logs in with, unique across all users.
    pub email: String,
    /// The user's password hash.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// The name displayed for the user.
    pub name: String,
    /// An encoded image, typically a base64 data URL.
    pub profile_picture: Option<String>,
    /// The user's phone number, free-form.
    pub phone_number: Option<String>,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data needed to register a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The email the user logs in with.
    pub email: String,
    /// The salted hash of the user's password.
    pub password_hash: PasswordHash,
    /// The name displayed for the user.
    pub name: String,
    /// An encoded image, typically a base64 data URL.
    pub profile_picture: Option<String>,
    /// The user's phone number.
    pub phone_number: Option<String>,
}

/// The profile fields a user may change, `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    /// A new display name.
    pub name: Option<String>,
    /// A new phone number, `Some(None)` clears it.
    pub phone_number: Option<Option<String>>,
    /// A new profile picture, `Some(None)` clears it.
    pub profile_picture: Option<Option<String>>,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL,
                password TEXT NOT NULL,
                name TEXT NOT NULL,
                profile_picture TEXT,
                phone_number TEXT,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_user_email ON user(email)",
        (),
    )?;

    Ok(())
}

const USER_COLUMNS: &str = "id, email, password, name, profile_picture, phone_number, created_at";

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        name: row.get(3)?,
        profile_picture: row.get(4)?,
        phone_number: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if another user has registered with the same email,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO user (email, password, name, profile_picture, phone_number, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {USER_COLUMNS}"
        ))?
        .query_row(
            (
                new_user.email,
                new_user.password_hash.as_ref(),
                new_user.name,
                new_user.profile_picture,
                new_user.phone_number,
                OffsetDateTime::now_utc(),
            ),
            map_user_row,
        )
        .map_err(Error::from)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]),
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = :id"))?
        .query_row(named_params! {":id": user_id}, map_user_row)
        .map_err(Error::from)
}

/// Get the user that registered with `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - no user registered with `email` ([Error::NotFound]),
/// - there was an error trying to access the store.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE email = :email"))?
        .query_row(named_params! {":email": email}, map_user_row)
        .map_err(Error::from)
}

type RowsAffected = usize;

/// Replace the password hash of the user registered with `email`.
///
/// Returns zero rows affected if there is no such user.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn set_password_by_email(
    email: &str,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE user SET password = :password WHERE email = :email",
            named_params! {":password": password_hash.as_ref(), ":email": email},
        )
        .map_err(Error::from)
}

/// Replace the password hash of the user with `user_id`.
///
/// Returns zero rows affected if there is no such user.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn set_password_by_id(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE user SET password = :password WHERE id = :id",
            named_params! {":password": password_hash.as_ref(), ":id": user_id},
        )
        .map_err(Error::from)
}

/// Apply the provided profile fields and return the updated user.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]),
/// - there was an error trying to access the store.
pub fn update_profile(
    user_id: UserID,
    update: ProfileUpdate,
    connection: &Connection,
) -> Result<User, Error> {
    let user = get_user_by_id(user_id, connection)?;

    let name = update.name.unwrap_or(user.name);
    let phone_number = update.phone_number.unwrap_or(user.phone_number);
    let profile_picture = update.profile_picture.unwrap_or(user.profile_picture);

    connection
        .prepare(&format!(
            "UPDATE user
             SET name = :name, phone_number = :phone_number, profile_picture = :profile_picture
             WHERE id = :id
             RETURNING {USER_COLUMNS}"
        ))?
        .query_row(
            named_params! {
                ":name": name,
                ":phone_number": phone_number,
                ":profile_picture": profile_picture,
                ":id": user_id,
            },
            map_user_row,
        )
        .map_err(Error::from)
}
