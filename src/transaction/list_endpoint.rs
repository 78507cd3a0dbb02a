//! Endpoints for listing and retrieving the logged in user's transactions.

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use serde::Deserialize;
use time::UtcOffset;

use crate::{
    Error,
    app_state::{local_offset, lock_connection},
    auth::UserID,
    database_id::TransactionId,
    transaction::{
        Category, TransactionKind,
        create_endpoint::TransactionState,
        date_input::parse_date_time,
        get_transaction,
        query::{Period, TransactionQuery, list_transactions},
        view::TransactionView,
    },
};

/// The query string accepted by the transaction list endpoint.
///
/// A period is given either as `start` and `end`, or as `year` and `month`.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsParams {
    /// Only include income or only expenses.
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    /// Only include this category.
    pub category: Option<Category>,
    /// The start of the date range, inclusive.
    pub start: Option<String>,
    /// The end of the date range, exclusive.
    pub end: Option<String>,
    /// The year of the month to list.
    pub year: Option<i32>,
    /// The month to list, 1-12.
    pub month: Option<u8>,
}

impl ListTransactionsParams {
    /// Convert the query string into store filters, reading dates without an
    /// offset and months in `local_offset`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::IncompletePeriod] if only half of a period is given
    /// or both kinds of period are given, or an [Error::InvalidRequest] if a
    /// date cannot be parsed.
    pub fn into_query(self, local_offset: UtcOffset) -> Result<TransactionQuery, Error> {
        let period = match (self.start, self.end, self.year, self.month) {
            (None, None, None, None) => None,
            (Some(start), Some(end), None, None) => Some(Period::DateRange {
                start: parse_date_time(&start, local_offset)?,
                end: parse_date_time(&end, local_offset)?,
            }),
            (None, None, Some(year), Some(month)) => Some(Period::Month {
                year,
                month,
                offset: local_offset,
            }),
            _ => return Err(Error::IncompletePeriod),
        };

        Ok(TransactionQuery {
            kind: self.kind,
            category: self.category,
            period,
        })
    }
}

/// List the logged in user's transactions, most recent first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    params: Result<Query<ListTransactionsParams>, QueryRejection>,
) -> Result<Json<Vec<TransactionView>>, Error> {
    let Query(params) = params?;
    let local_offset = local_offset(&state.local_timezone)?;
    let query = params.into_query(local_offset)?;

    let transactions = {
        let connection = lock_connection(&state.db_connection)?;
        list_transactions(user_id, &query, &connection)?
    };

    Ok(Json(
        transactions
            .into_iter()
            .map(|transaction| TransactionView::new(transaction, local_offset))
            .collect(),
    ))
}

/// Get a single transaction owned by the logged in user.
///
/// Transactions owned by other users are reported as not found.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
) -> Result<Json<TransactionView>, Error> {
    let Path(transaction_id) = transaction_id?;
    let local_offset = local_offset(&state.local_timezone)?;

    let transaction = {
        let connection = lock_connection(&state.db_connection)?;
        get_transaction(user_id, transaction_id, &connection)?
    };

    Ok(Json(TransactionView::new(transaction, local_offset)))
}

#[cfg(test)]
mod list_transactions_params_tests {
    use time::{UtcOffset, macros::datetime};

    use crate::{
        Error,
        transaction::{
            ExpenseCategory, TransactionKind,
            list_endpoint::ListTransactionsParams,
            query::{Period, TransactionQuery},
        },
    };

    #[test]
    fn empty_params_have_no_filters() {
        let query = ListTransactionsParams::default()
            .into_query(UtcOffset::UTC)
            .unwrap();

        assert_eq!(query, TransactionQuery::default());
    }

    #[test]
    fn date_range_is_parsed_in_local_offset() {
        let offset = UtcOffset::from_hms(12, 0, 0).unwrap();
        let params = ListTransactionsParams {
            kind: Some(TransactionKind::Expense),
            category: Some(ExpenseCategory::Food.into()),
            start: Some("2024-01-01".to_owned()),
            end: Some("2024-02-01T00:00:00Z".to_owned()),
            ..Default::default()
        };

        let query = params.into_query(offset).unwrap();

        assert_eq!(query.kind, Some(TransactionKind::Expense));
        assert_eq!(query.category, Some(ExpenseCategory::Food.into()));
        assert_eq!(
            query.period,
            Some(Period::DateRange {
                start: datetime!(2024-01-01 00:00 +12),
                end: datetime!(2024-02-01 00:00 UTC),
            })
        );
    }

    #[test]
    fn year_and_month_become_month_period() {
        let params = ListTransactionsParams {
            year: Some(2024),
            month: Some(2),
            ..Default::default()
        };

        let query = params.into_query(UtcOffset::UTC).unwrap();

        assert_eq!(
            query.period,
            Some(Period::Month {
                year: 2024,
                month: 2,
                offset: UtcOffset::UTC
            })
        );
    }

    #[test]
    fn year_without_month_is_incomplete() {
        let params = ListTransactionsParams {
            year: Some(2024),
            ..Default::default()
        };

        assert_eq!(
            params.into_query(UtcOffset::UTC),
            Err(Error::IncompletePeriod)
        );
    }

    #[test]
    fn range_mixed_with_month_is_incomplete() {
        let params = ListTransactionsParams {
            start: Some("2024-01-01".to_owned()),
            end: Some("2024-02-01".to_owned()),
            year: Some(2024),
            month: Some(1),
            ..Default::default()
        };

        assert_eq!(
            params.into_query(UtcOffset::UTC),
            Err(Error::IncompletePeriod)
        );
    }
}
