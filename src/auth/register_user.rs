//! The route handler for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{NewUser, PasswordHash, ValidatedPassword, create_user, set_auth_cookie},
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The cost used for hashing new passwords.
    pub hash_cost: u32,
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            hash_cost: PasswordHash::DEFAULT_COST,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data sent by the client to register a new account.
#[derive(Clone, Deserialize)]
pub struct RegisterForm {
    /// The name the user will log in with.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// The new password.
    pub password: String,
    /// The new password typed a second time.
    pub confirm_password: String,
}

/// Handler for registering a new user via the POST method.
///
/// On success the new user is logged in and returned as JSON with the status
/// code 201.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    payload: Result<Json<RegisterForm>, JsonRejection>,
) -> Response {
    match register(state, jar, payload) {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

fn register(
    state: RegistrationState,
    jar: PrivateCookieJar,
    payload: Result<Json<RegisterForm>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(form) = payload?;

    let password = ValidatedPassword::new_confirmed(
        &form.password,
        &form.confirm_password,
        &[&form.username, &form.email],
    )?;
    let password_hash = PasswordHash::new(password, state.hash_cost)?;
    let new_user = NewUser::new(&form.username, &form.email, password_hash)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        create_user(new_user, &connection)?
    };

    tracing::info!("Registered user {} ({})", user.username, user.id);

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((StatusCode::CREATED, jar, Json(user)).into_response())
}
