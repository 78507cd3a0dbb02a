//! Log-out route handler that invalidates authentication cookies.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::auth::invalidate_auth_cookie;

/// Invalidate the auth cookie.
pub async fn post_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Json(json!({ "logged_out": true }))).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::http::{StatusCode, header::SET_COOKIE};
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::OffsetDateTime;

    use crate::auth::{
        DEFAULT_COOKIE_DURATION, UserID, cookie::COOKIE_TOKEN, log_out::post_log_out,
        set_auth_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let key = Key::from(&Sha512::digest("42"));
        PrivateCookieJar::new(key)
    }

    #[tokio::test]
    async fn log_out_invalidates_auth_cookie() {
        let cookie_jar =
            set_auth_cookie(get_jar(), UserID::new(123), DEFAULT_COOKIE_DURATION).unwrap();

        let response = post_log_out(cookie_jar).await;

        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| Cookie::parse(value.to_str().unwrap().to_owned()).unwrap())
            .find(|cookie| cookie.name() == COOKIE_TOKEN)
            .expect("auth cookie should be reset");

        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
