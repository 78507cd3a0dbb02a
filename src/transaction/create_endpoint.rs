//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    app_state::{local_offset, lock_connection},
    auth::UserID,
    transaction::{
        Amount, Category, Transaction, TransactionKind, create_transaction,
        date_input::parse_date_time, view::TransactionView,
    },
};

/// The state needed to get or create a transaction.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// A category belonging to `kind`.
    pub category: Category,
    /// The value of the transaction, e.g. 12.50 or "12.50".
    pub amount: Decimal,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// When the transaction happened, defaults to now.
    #[serde(default)]
    pub date: Option<String>,
}

/// A route handler for creating a new transaction owned by the logged in user.
///
/// Responds with the new transaction and the status code 201.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<TransactionForm>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(form) = payload?;
    let local_offset = local_offset(&state.local_timezone)?;

    let amount = Amount::new(form.amount)?;
    let mut builder = Transaction::build(form.kind, form.category, amount)
        .description(form.description.as_deref().unwrap_or_default().trim());

    if let Some(raw_date) = form.date.as_deref().filter(|date| !date.trim().is_empty()) {
        builder = builder.timestamp(parse_date_time(raw_date, local_offset)?);
    }

    let transaction = {
        let connection = lock_connection(&state.db_connection)?;
        create_transaction(user_id, builder, &connection)
            .inspect_err(|error| tracing::error!("could not create transaction: {error}"))?
    };

    Ok((
        StatusCode::CREATED,
        Json(TransactionView::new(transaction, local_offset)),
    )
        .into_response())
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        body::to_bytes,
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use time::macros::datetime;

    use crate::{
        Error,
        auth::UserID,
        transaction::{
            Amount, Category, ExpenseCategory, IncomeCategory, TransactionKind, count_transactions,
            create_endpoint::{TransactionForm, TransactionState, create_transaction_endpoint},
            get_transaction,
            test_utils::{get_test_connection, insert_user},
        },
    };

    fn get_test_state() -> (TransactionState, UserID) {
        let connection = get_test_connection();
        let user_id = insert_user("alice", &connection);

        let state = TransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, user_id)
    }

    fn form(
        kind: TransactionKind,
        category: Category,
        amount: rust_decimal::Decimal,
    ) -> TransactionForm {
        TransactionForm {
            kind,
            category,
            amount,
            description: Some("  groceries ".to_owned()),
            date: Some("2024-01-10T12:30".to_owned()),
        }
    }

    async fn post(state: &TransactionState, user_id: UserID, form: TransactionForm) -> Response {
        create_transaction_endpoint(State(state.clone()), Extension(user_id), Ok(Json(form)))
            .await
            .into_response()
    }

    async fn json_body(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, user_id) = get_test_state();

        let response = post(
            &state,
            user_id,
            form(TransactionKind::Expense, ExpenseCategory::Food.into(), dec!(12.5)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["amount"], "12.50");
        assert_eq!(json["type"], "expense");
        assert_eq!(json["category"], "food");
        assert_eq!(json["description"], "groceries");
        assert_eq!(json["date"], "2024-01-10T12:30:00Z");

        let id = json["id"].as_i64().unwrap();
        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(user_id, id, &connection).unwrap();
        assert_eq!(transaction.owner, user_id);
        assert_eq!(transaction.amount, Amount::new(dec!(12.50)).unwrap());
        assert_eq!(transaction.timestamp, datetime!(2024-01-10 12:30 UTC));
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let (state, user_id) = get_test_state();

        let result = create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Ok(Json(form(
                TransactionKind::Expense,
                ExpenseCategory::Food.into(),
                dec!(-5),
            ))),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NonPositiveAmount));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(user_id, &connection), Ok(0));
    }

    #[tokio::test]
    async fn rejects_category_of_other_kind() {
        let (state, user_id) = get_test_state();

        let response = post(
            &state,
            user_id,
            form(TransactionKind::Expense, IncomeCategory::Salary.into(), dec!(5)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(user_id, &connection), Ok(0));
    }

    #[tokio::test]
    async fn defaults_date_to_now() {
        let (state, user_id) = get_test_state();
        let mut form = form(TransactionKind::Income, IncomeCategory::Gift.into(), dec!(5));
        form.date = None;
        let before = time::OffsetDateTime::now_utc() - time::Duration::seconds(1);

        let response = post(&state, user_id, form).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        let date = time::OffsetDateTime::parse(
            json["date"].as_str().unwrap(),
            &time::format_description::well_known::Rfc3339,
        )
        .unwrap();
        assert!(date >= before);
    }
}
