//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/users/:user_id', use [format_endpoint].

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to access users.
pub const USERS: &str = "/api/users";
/// The route for the logged in user's account details.
pub const PROFILE: &str = "/api/profile";
/// The route to access transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the balance over all transactions.
pub const BALANCE: &str = "/api/transactions/balance";
/// The route for the totals per category.
pub const SUMMARY: &str = "/api/transactions/summary";
/// The route for comparing this month's spending with last month's.
pub const ANALYTICS: &str = "/api/transactions/analytics";
/// The route for a month of transactions grouped by day.
pub const CALENDAR: &str = "/api/transactions/calendar";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
