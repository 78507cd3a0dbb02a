//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

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

/// A user of the application.
///
/// The caller should ensure that `id` is unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name the user logs in with.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// The user's password hash.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
}

/// The fields needed to register a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The name the user logs in with, must not be empty.
    pub username: String,
    /// The user's email address.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

impl NewUser {
    /// Validate the username and email address for a new user.
    ///
    /// Leading and trailing whitespace is removed from the username.
    ///
    /// # Errors
    ///
    /// Returns an:
    /// - [Error::EmptyUsername] if `username` is empty or only whitespace,
    /// - [Error::InvalidEmail] if `email` is not a valid email address.
    pub fn new(username: &str, email: &str, password_hash: PasswordHash) -> Result<Self, Error> {
        let username = username.trim();

        if username.is_empty() {
            return Err(Error::EmptyUsername);
        }

        let email = email
            .trim()
            .parse::<EmailAddress>()
            .map_err(|_| Error::InvalidEmail(email.to_owned()))?;

        Ok(Self {
            username: username.to_owned(),
            email,
            password_hash,
        })
    }
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
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateUsername] if the username is already taken,
/// - [Error::DuplicateEmail] if the email address is already in use,
/// - [Error::SqlError] if another SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (username, email, password) VALUES (?1, ?2, ?3)",
        (
            &new_user.username,
            new_user.email.as_str(),
            new_user.password_hash.as_ref(),
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username: new_user.username,
        email: new_user.email.to_string(),
        password_hash: new_user.password_hash,
    })
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let username = row.get(1)?;
    let email = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(raw_id),
        username,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, username, email, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with the username `username`.
///
/// # Errors
///
/// This function will return an error if:
/// - `username` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_username(username: &str, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, username, email, password FROM user WHERE username = :username")?
        .query_row(&[(":username", &username)], map_user_row)
        .map_err(|error| error.into())
}

/// Replace the password hash of the user `user_id`.
///
/// # Errors
///
/// Returns a [Error::NotFound] if `user_id` does not belong to a registered
/// user, or a [Error::SqlError] if an SQL related error occurred.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected != 1 {
        return Err(Error::NotFound);
    }

    Ok(())
}
