//! User accounts, password handling and cookie based sessions.
//!
//! Every protected route sits behind [auth_guard], which resolves the session
//! cookie to a [UserID] before the handler runs.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{REMEMBER_ME_COOKIE_DURATION, post_log_in};
pub use log_out::post_log_out;
pub use middleware::{AuthState, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::register_user;
pub use token::Token;
pub use user::{
    NewUser, User, UserID, create_user, create_user_table, get_user_by_id, get_user_by_username,
    update_password,
};
