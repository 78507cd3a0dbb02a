//! Fintrack is a personal finance tracker.
//!
//! Users record income and expense transactions and query aggregated views of
//! their own ledger: the overall balance, totals per category, month over
//! month spending trends and a calendar of transactions grouped by day.
//!
//! This library provides a JSON REST API served with axum and backed by SQLite.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod analytics;
mod app_state;
mod auth;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod profile;
mod routing;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, get_user_by_username, update_password,
};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_offset;

use crate::transaction::{Category, TransactionKind};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a valid session.
    ///
    /// Raised by the auth middleware before any store access happens.
    #[error("authentication required")]
    AuthenticationRequired,

    /// The user provided an invalid combination of username and password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The password and the confirmation password differ.
    #[error("passwords do not match")]
    PasswordsDoNotMatch,

    /// An empty string was used as a username.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// The email address could not be parsed.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The username is already taken by another user.
    #[error("the username already exists")]
    DuplicateUsername,

    /// The email address is already used by another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A transaction amount of zero or less was given.
    ///
    /// The sign of a transaction is carried by its kind, so amounts are
    /// always positive.
    #[error("the amount must be greater than zero")]
    NonPositiveAmount,

    /// The amount has too many digits or more than two decimal places.
    #[error("invalid amount {0}: at most 8 integer digits and 2 decimal places are allowed")]
    InvalidAmount(String),

    /// The category is not one of the categories for the transaction kind,
    /// e.g. "salary" used for an expense.
    #[error("the category \"{category}\" cannot be used for {kind} transactions")]
    CategoryKindMismatch {
        /// The requested category.
        category: Category,
        /// The requested transaction kind.
        kind: TransactionKind,
    },

    /// The start of a date range is not before its end.
    #[error("the start of the date range must be before its end")]
    InvalidDateRange,

    /// Only one of a year and month pair was given, or a date range was
    /// mixed with a year and month.
    #[error("specify either a start and end date, or a year and month")]
    IncompletePeriod,

    /// A month number outside 1-12, or a year outside the supported range.
    #[error("invalid month {month} of year {year}")]
    InvalidMonth {
        /// The requested year.
        year: i32,
        /// The requested month number.
        month: u8,
    },

    /// The request body or query string could not be decoded.
    ///
    /// Unknown transaction kinds or categories end up here.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The auth cookie could not be created.
    #[error("could not create the auth cookie: {0}")]
    CookieError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl Error {
    /// The HTTP status code used when this error is sent to a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::AuthenticationRequired | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::TooWeak(_)
            | Error::PasswordsDoNotMatch
            | Error::EmptyUsername
            | Error::InvalidEmail(_)
            | Error::NonPositiveAmount
            | Error::InvalidAmount(_)
            | Error::CategoryKindMismatch { .. }
            | Error::InvalidDateRange
            | Error::IncompletePeriod
            | Error::InvalidMonth { .. }
            | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateUsername | Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError
            | Error::CookieError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "an unexpected error occurred, check the server logs for more details".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
