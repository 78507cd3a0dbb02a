//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState, Error,
    analytics::{get_analytics, get_balance, get_calendar, get_summary},
    auth::{auth_guard, post_log_in, post_log_out, register_user},
    endpoints,
    profile::get_profile,
    transaction::{
        create_transaction_endpoint, get_transaction_endpoint, list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_routes = Router::new()
        .route(endpoints::PROFILE, get(get_profile))
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION, get(get_transaction_endpoint))
        .route(endpoints::BALANCE, get(get_balance))
        .route(endpoints::SUMMARY, get(get_summary))
        .route(endpoints::ANALYTICS, get(get_analytics))
        .route(endpoints::CALENDAR, get(get_calendar))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (
        StatusCode::IM_A_TEAPOT,
        Json(json!({ "message": "I'm a teapot" })),
    )
        .into_response()
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
