//! Functions for storing the session token in an encrypted, private cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{Token, UserID},
};

/// The name of the cookie holding the serialized [Token].
pub(crate) const COOKIE_TOKEN: &str = "token";

/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// Sessions closer than this to expiring are extended on each request.
pub(crate) const COOKIE_EXTENSION: Duration = Duration::minutes(5);

fn build_token_cookie(token: &Token) -> Result<Cookie<'static>, Error> {
    let token_string =
        serde_json::to_string(token).map_err(|error| Error::CookieError(error.to_string()))?;

    Ok(Cookie::build((COOKIE_TOKEN, token_string))
        .path("/")
        .expires(token.expires_at)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build())
}

/// Add an auth cookie to the cookie jar, indicating that `user_id` is logged in.
///
/// The session lasts for `duration` from the current time.
///
/// # Errors
///
/// Returns an [Error::CookieError] if the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = Token {
        user_id,
        expires_at: OffsetDateTime::now_utc() + duration,
    };

    Ok(jar.add(build_token_cookie(&token)?))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the
/// cookie on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read the session token from the auth cookie.
///
/// # Errors
///
/// Returns [Error::AuthenticationRequired] if the cookie is missing, cannot be
/// decrypted or parsed, or the session has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::AuthenticationRequired)?;

    let token: Token = serde_json::from_str(cookie.value_trimmed()).map_err(|error| {
        tracing::debug!("Could not parse auth token: {error}");
        Error::AuthenticationRequired
    })?;

    if token.is_expired(OffsetDateTime::now_utc()) {
        return Err(Error::AuthenticationRequired);
    }

    Ok(token)
}

/// Set the session expiry to the later of UTC now plus `duration` and the
/// current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns an [Error::AuthenticationRequired] if the jar holds no valid token,
/// or an [Error::CookieError] if the new expiry overflows or the token cannot
/// be serialized.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::CookieError("session expiry overflowed".to_owned()))?;

    if new_expiry <= token.expires_at {
        return Ok(jar);
    }

    let token = Token {
        expires_at: new_expiry,
        ..token
    };

    Ok(jar.add(build_token_cookie(&token)?))
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            Token, UserID,
            cookie::{
                COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, build_token_cookie,
                extend_auth_cookie_duration_if_needed, get_token_from_cookies,
                invalidate_auth_cookie, set_auth_cookie,
            },
        },
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_cookie() {
        let user_id = UserID::new(1);

        let jar = set_auth_cookie(get_jar(), user_id, DEFAULT_COOKIE_DURATION).unwrap();
        let token = get_token_from_cookies(&jar).unwrap();

        assert_eq!(token.user_id, user_id);
        assert_date_time_close!(
            token.expires_at,
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION
        );
    }

    #[test]
    fn cookie_is_secure() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), DEFAULT_COOKIE_DURATION).unwrap();
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn get_token_fails_on_empty_jar() {
        assert_eq!(
            get_token_from_cookies(&get_jar()),
            Err(Error::AuthenticationRequired)
        );
    }

    #[test]
    fn get_token_fails_on_expired_token() {
        let token = Token {
            user_id: UserID::new(1),
            expires_at: OffsetDateTime::now_utc() - Duration::seconds(1),
        };
        let jar = get_jar().add(build_token_cookie(&token).unwrap());

        assert_eq!(
            get_token_from_cookies(&jar),
            Err(Error::AuthenticationRequired)
        );
    }

    #[test]
    fn invalidated_cookie_is_rejected() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), DEFAULT_COOKIE_DURATION).unwrap();

        let jar = invalidate_auth_cookie(jar);

        assert_eq!(
            jar.get(COOKIE_TOKEN).unwrap().expires_datetime(),
            Some(OffsetDateTime::UNIX_EPOCH)
        );
        assert_eq!(
            get_token_from_cookies(&jar),
            Err(Error::AuthenticationRequired)
        );
    }

    #[test]
    fn extends_cookie_close_to_expiry() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), Duration::seconds(5)).unwrap();

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::minutes(10)).unwrap();
        let token = get_token_from_cookies(&jar).unwrap();

        assert_date_time_close!(
            token.expires_at,
            OffsetDateTime::now_utc() + Duration::minutes(10)
        );
    }

    #[test]
    fn does_not_shorten_long_session() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), Duration::days(7)).unwrap();

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::minutes(5)).unwrap();
        let token = get_token_from_cookies(&jar).unwrap();

        assert_date_time_close!(token.expires_at, OffsetDateTime::now_utc() + Duration::days(7));
    }
}
