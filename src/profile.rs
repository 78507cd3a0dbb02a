//! The logged in user's account details and ledger totals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::{
    AppState, Error,
    analytics::calculate_balance,
    app_state::lock_connection,
    auth::{UserID, get_user_by_id},
    transaction::{TransactionQuery, count_transactions, list_transactions},
};

/// The state needed for the profile endpoint.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The database connection for reading the user and their transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A user's account details with a summary of their ledger.
#[derive(Debug, Serialize)]
pub struct Profile {
    id: UserID,
    username: String,
    email: String,
    total_transactions: u32,
    total_income: f64,
    total_expense: f64,
    balance: f64,
}

/// Get the logged in user's profile.
pub async fn get_profile(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Profile>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let user = get_user_by_id(user_id, &connection)?;
    let total_transactions = count_transactions(user_id, &connection)?;
    let transactions = list_transactions(user_id, &TransactionQuery::default(), &connection)?;
    let balance = calculate_balance(&transactions);

    Ok(Json(Profile {
        id: user.id,
        username: user.username,
        email: user.email,
        total_transactions,
        total_income: balance.total_income.to_f64().unwrap_or_default(),
        total_expense: balance.total_expense.to_f64().unwrap_or_default(),
        balance: balance.balance.to_f64().unwrap_or_default(),
    }))
}
