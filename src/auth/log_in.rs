//! The route handler for log-in requests.
//! The cookie module handles the lower level cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{User, get_user_by_username, set_auth_cookie},
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
pub const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the client to log in.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password in the database, which has been verified.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// The name of the user logging in.
    pub username: String,

    /// Password entered during log-in.
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    #[serde(default)]
    pub remember_me: bool,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the user is
/// returned as JSON.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The username or password is not correct.
/// - An internal error occurred when verifying the password.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    payload: Result<Json<LogInData>, JsonRejection>,
) -> Response {
    match log_in(state, jar, payload) {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

fn log_in(
    state: LoginState,
    jar: PrivateCookieJar,
    payload: Result<Json<LogInData>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(log_in_data) = payload?;

    let user: User = {
        let connection = lock_connection(&state.db_connection)?;

        match get_user_by_username(log_in_data.username.trim(), &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    let is_password_valid = user
        .password_hash
        .verify(&log_in_data.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    let cookie_duration = if log_in_data.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let jar = set_auth_cookie(jar, user.id, cookie_duration)?;

    tracing::info!("User {} logged in", user.id);

    Ok((jar, Json(user)).into_response())
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{
            DEFAULT_COOKIE_DURATION, NewUser, PasswordHash, ValidatedPassword, cookie::COOKIE_TOKEN,
            create_user,
        },
        db::initialize,
    };

    use super::{LogInData, LoginState, REMEMBER_ME_COOKIE_DURATION, post_log_in};

    const PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_state() -> LoginState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let password_hash =
            PasswordHash::new(ValidatedPassword::new_unchecked(PASSWORD), 4).unwrap();
        create_user(
            NewUser::new("alice", "alice@example.com", password_hash).unwrap(),
            &connection,
        )
        .unwrap();

        LoginState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn log_in_data(username: &str, password: &str, remember_me: bool) -> LogInData {
        LogInData {
            username: username.to_owned(),
            password: password.to_owned(),
            remember_me,
        }
    }

    async fn get_cookie_expiry(state: LoginState, remember_me: bool) -> OffsetDateTime {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let response = post_log_in(
            State(state),
            jar,
            Ok(Json(log_in_data("alice", PASSWORD, remember_me))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .map(|value| {
                axum_extra::extract::cookie::Cookie::parse(value.to_str().unwrap().to_owned())
                    .unwrap()
            })
            .find(|cookie| cookie.name() == COOKIE_TOKEN)
            .expect("auth cookie should be set");

        set_cookie.expires_datetime().unwrap()
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {:?}, want {:?}",
            left,
            right
        );
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let expiry = get_cookie_expiry(get_test_state(), false).await;

        assert_date_time_close(expiry, OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION);
    }

    #[tokio::test]
    async fn remember_me_extends_auth_cookie_duration() {
        let expiry = get_cookie_expiry(get_test_state(), true).await;

        assert_date_time_close(
            expiry,
            OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION,
        );
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = post_log_in(
            State(state),
            jar,
            Ok(Json(log_in_data("alice", "wrongpassword", false))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get("set-cookie").is_none());
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_username() {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = post_log_in(
            State(state),
            jar,
            Ok(Json(log_in_data("bob", PASSWORD, false))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
