//! Middleware for logging requests and responses.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{header::CONTENT_TYPE, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// The maximum number of bytes of a body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Password fields in JSON request bodies are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = match read_body(body).await {
        Ok(text) => text,
        Err(error) => return error.into_response(),
    };

    if is_json(&parts) {
        log_request(&parts, &redact_passwords(&body_text));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = match read_body(body).await {
        Ok(text) => text,
        Err(error) => return error.into_response(),
    };
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

fn is_json(parts: &request::Parts) -> bool {
    parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

/// Replace the values of password fields in a JSON object with asterisks.
///
/// Bodies that are not JSON objects are returned unchanged.
fn redact_passwords(body_text: &str) -> String {
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(body_text) else {
        return body_text.to_owned();
    };

    for field in REDACTED_FIELDS {
        if let Some(value) = object.get_mut(field) {
            *value = Value::String("********".to_owned());
        }
    }

    Value::Object(object).to_string()
}

async fn read_body(body: Body) -> Result<String, Error> {
    let body_bytes = to_bytes(body, usize::MAX).await.map_err(|error| {
        tracing::error!("Could not read body: {error}");
        Error::InvalidRequest(error.to_string())
    })?;

    Ok(String::from_utf8_lossy(&body_bytes).to_string())
}

fn truncate(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(parts: &request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nbody: {}...",
            parts.method,
            parts.uri,
            truncate(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        );
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {}\nbody: {}...",
            parts.status,
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {}\nbody: {body:?}", parts.status);
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{Json, Router, middleware, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_passwords, truncate};

    #[test]
    fn redacts_password_fields() {
        let body = json!({
            "username": "alice",
            "password": "hunter2",
            "confirm_password": "hunter2",
        })
        .to_string();

        let redacted: Value = serde_json::from_str(&redact_passwords(&body)).unwrap();

        assert_eq!(
            redacted,
            json!({
                "username": "alice",
                "password": "********",
                "confirm_password": "********",
            })
        );
    }

    #[test]
    fn leaves_non_object_bodies_unchanged() {
        assert_eq!(redact_passwords("password=hunter2"), "password=hunter2");
        assert_eq!(redact_passwords("[1, 2]"), "[1, 2]");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let body = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let truncated = truncate(&body);

        assert!(truncated.len() <= LOG_BODY_LENGTH_LIMIT);
        assert!(body.starts_with(truncated));
    }

    #[tokio::test]
    async fn passes_bodies_through() {
        let app = Router::new()
            .route("/echo", post(|Json(body): Json<Value>| async { Json(body) }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let body = json!({ "password": "hunter2", "note": "a".repeat(100) });

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        response.assert_json(&body);
    }
}
