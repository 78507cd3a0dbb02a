//! HTTP handlers for the aggregated views of the logged in user's ledger.
//!
//! Decimal totals are converted to JSON numbers here and nowhere else.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    analytics::{
        balance::{Balance, calculate_balance},
        calendar::{CalendarDay, fold_calendar},
        summary::{CategorySummary, CategoryTotal, summarize_by_category},
        trend::{SpendingAnalysis, Trend, analyze_spending},
    },
    app_state::{local_offset, lock_connection},
    auth::UserID,
    transaction::{
        Category, Period, Transaction, TransactionKind, TransactionQuery, list_transactions,
    },
};

/// The state needed for the aggregated views.
#[derive(Debug, Clone)]
pub struct AnalyticsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AnalyticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn load_transactions(
    state: &AnalyticsState,
    user_id: UserID,
    query: &TransactionQuery,
) -> Result<Vec<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_transactions(user_id, query, &connection)
}

/// The balance sent to clients.
#[derive(Debug, Serialize)]
pub struct BalanceView {
    balance: f64,
    total_income: f64,
    total_expense: f64,
}

impl From<Balance> for BalanceView {
    fn from(balance: Balance) -> Self {
        Self {
            balance: to_f64(balance.balance),
            total_income: to_f64(balance.total_income),
            total_expense: to_f64(balance.total_expense),
        }
    }
}

/// A category total sent to clients.
#[derive(Debug, Serialize)]
pub struct CategoryTotalView {
    category: Category,
    category_display: &'static str,
    total: f64,
}

impl From<CategoryTotal> for CategoryTotalView {
    fn from(total: CategoryTotal) -> Self {
        Self {
            category: total.category,
            category_display: total.category.label(),
            total: to_f64(total.total),
        }
    }
}

/// The category summary sent to clients.
#[derive(Debug, Serialize)]
pub struct CategorySummaryView {
    income_by_category: Vec<CategoryTotalView>,
    expense_by_category: Vec<CategoryTotalView>,
}

impl From<CategorySummary> for CategorySummaryView {
    fn from(summary: CategorySummary) -> Self {
        Self {
            income_by_category: summary
                .income_by_category
                .into_iter()
                .map(CategoryTotalView::from)
                .collect(),
            expense_by_category: summary
                .expense_by_category
                .into_iter()
                .map(CategoryTotalView::from)
                .collect(),
        }
    }
}

/// The spending analysis sent to clients.
#[derive(Debug, Serialize)]
pub struct SpendingAnalysisView {
    current_month_total: f64,
    previous_month_total: f64,
    change_percent: f64,
    trend: Trend,
    top_category: Option<CategoryTotalView>,
    category_breakdown: Vec<CategoryTotalView>,
}

impl From<SpendingAnalysis> for SpendingAnalysisView {
    fn from(analysis: SpendingAnalysis) -> Self {
        Self {
            current_month_total: to_f64(analysis.current_month_total),
            previous_month_total: to_f64(analysis.previous_month_total),
            change_percent: to_f64(analysis.change_percent),
            trend: analysis.trend,
            top_category: analysis.top_category.map(CategoryTotalView::from),
            category_breakdown: analysis
                .category_breakdown
                .into_iter()
                .map(CategoryTotalView::from)
                .collect(),
        }
    }
}

/// Get the balance over all of the logged in user's transactions.
pub async fn get_balance(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<BalanceView>, Error> {
    let transactions = load_transactions(&state, user_id, &TransactionQuery::default())?;

    Ok(Json(calculate_balance(&transactions).into()))
}

/// Get the totals per category over all of the logged in user's transactions.
pub async fn get_summary(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<CategorySummaryView>, Error> {
    let transactions = load_transactions(&state, user_id, &TransactionQuery::default())?;

    Ok(Json(summarize_by_category(&transactions).into()))
}

/// Query parameters for the spending analysis.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    /// The instant to analyse from as an RFC 3339 timestamp. Defaults to the
    /// current local time.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub now: Option<OffsetDateTime>,
}

/// Compare the logged in user's spending this month with last month.
pub async fn get_analytics(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    params: Result<Query<AnalyticsParams>, QueryRejection>,
) -> Result<Json<SpendingAnalysisView>, Error> {
    let Query(params) = params?;
    let local_offset = local_offset(&state.local_timezone)?;
    let now = params
        .now
        .unwrap_or_else(|| OffsetDateTime::now_utc().to_offset(local_offset));

    let expenses = load_transactions(
        &state,
        user_id,
        &TransactionQuery {
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        },
    )?;

    Ok(Json(analyze_spending(&expenses, now).into()))
}

/// Query parameters for the calendar view.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarParams {
    /// Defaults to the current local year.
    pub year: Option<i32>,
    /// Defaults to the current local month.
    pub month: Option<u8>,
}

/// Get the logged in user's transactions in a month grouped by day.
pub async fn get_calendar(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    params: Result<Query<CalendarParams>, QueryRejection>,
) -> Result<Json<Vec<CalendarDay>>, Error> {
    let Query(params) = params?;
    let local_offset = local_offset(&state.local_timezone)?;
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    let year = params.year.unwrap_or(today.year());
    let month = params.month.unwrap_or(u8::from(today.month()));

    let transactions = load_transactions(
        &state,
        user_id,
        &TransactionQuery {
            period: Some(Period::Month {
                year,
                month,
                offset: local_offset,
            }),
            ..Default::default()
        },
    )?;

    Ok(Json(fold_calendar(&transactions, year, month, local_offset)?))
}

#[cfg(test)]
mod analytics_handler_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Json, extract::Query, extract::State};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        Error,
        analytics::handlers::{
            AnalyticsParams, AnalyticsState, CalendarParams, get_analytics, get_balance,
            get_calendar, get_summary,
        },
        auth::UserID,
        transaction::{
            Amount, Category, ExpenseCategory, IncomeCategory, Transaction, create_transaction,
            test_utils::{get_test_connection, insert_user},
        },
    };

    fn get_test_state() -> (AnalyticsState, UserID, UserID) {
        let connection = get_test_connection();
        let alice = insert_user("alice", &connection);
        let bob = insert_user("bob", &connection);

        let salary = Category::from(IncomeCategory::Salary);
        let food = Category::from(ExpenseCategory::Food);
        let shopping = Category::from(ExpenseCategory::Shopping);
        let rows = [
            (alice, salary, dec!(1000), datetime!(2024-01-05 10:00 UTC)),
            (alice, food, dec!(200), datetime!(2024-01-10 10:00 UTC)),
            (alice, food, dec!(50), datetime!(2024-02-03 10:00 UTC)),
            (bob, shopping, dec!(5000), datetime!(2024-02-04 10:00 UTC)),
        ];

        for (owner, category, amount, timestamp) in rows {
            create_transaction(
                owner,
                Transaction::build(category.kind(), category, Amount::new(amount).unwrap())
                    .timestamp(timestamp),
                &connection,
            )
            .unwrap();
        }

        let state = AnalyticsState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, alice, bob)
    }

    #[tokio::test]
    async fn balance_only_counts_own_transactions() {
        let (state, alice, _) = get_test_state();

        let Json(balance) = get_balance(State(state), Extension(alice)).await.unwrap();

        assert_eq!(
            serde_json::to_value(balance).unwrap(),
            json!({ "balance": 750.0, "total_income": 1000.0, "total_expense": 250.0 })
        );
    }

    #[tokio::test]
    async fn summary_groups_by_category() {
        let (state, alice, _) = get_test_state();

        let Json(summary) = get_summary(State(state), Extension(alice)).await.unwrap();

        assert_eq!(
            serde_json::to_value(summary).unwrap(),
            json!({
                "income_by_category": [
                    { "category": "salary", "category_display": "Salary", "total": 1000.0 },
                ],
                "expense_by_category": [
                    { "category": "food", "category_display": "Food", "total": 250.0 },
                ],
            })
        );
    }

    #[tokio::test]
    async fn analytics_compares_months() {
        let (state, alice, _) = get_test_state();

        let Json(analysis) = get_analytics(
            State(state),
            Extension(alice),
            Ok(Query(AnalyticsParams {
                now: Some(datetime!(2024-02-15 00:00 UTC)),
            })),
        )
        .await
        .unwrap();

        assert_eq!(
            serde_json::to_value(analysis).unwrap(),
            json!({
                "current_month_total": 50.0,
                "previous_month_total": 200.0,
                "change_percent": -75.0,
                "trend": "down",
                "top_category": { "category": "food", "category_display": "Food", "total": 50.0 },
                "category_breakdown": [
                    { "category": "food", "category_display": "Food", "total": 50.0 },
                ],
            })
        );
    }

    #[tokio::test]
    async fn calendar_folds_requested_month() {
        let (state, _, bob) = get_test_state();

        let Json(days) = get_calendar(
            State(state),
            Extension(bob),
            Ok(Query(CalendarParams {
                year: Some(2024),
                month: Some(2),
            })),
        )
        .await
        .unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].total_expense, 5000.0);
        assert_eq!(days[0].transactions.len(), 1);
    }

    #[tokio::test]
    async fn calendar_rejects_invalid_month() {
        let (state, alice, _) = get_test_state();

        let result = get_calendar(
            State(state),
            Extension(alice),
            Ok(Query(CalendarParams {
                year: Some(2024),
                month: Some(0),
            })),
        )
        .await;

        assert_eq!(
            result.err(),
            Some(Error::InvalidMonth {
                year: 2024,
                month: 0
            })
        );
    }
}
