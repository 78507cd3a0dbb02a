//! Filtered queries over a user's transactions.

use rusqlite::{Connection, ToSql, params_from_iter};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error,
    analytics::month_bounds,
    auth::UserID,
    transaction::{
        Category, Transaction, TransactionKind,
        core::{TRANSACTION_COLUMNS, map_transaction_row, to_unix_micros},
    },
};

/// The time span a transaction query is restricted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Period {
    /// Transactions from `start` (inclusive) up to `end` (exclusive).
    DateRange {
        /// The earliest timestamp to include.
        start: OffsetDateTime,
        /// The first timestamp after the range.
        end: OffsetDateTime,
    },
    /// Transactions within a calendar month.
    Month {
        /// The calendar year.
        year: i32,
        /// The month number, 1-12.
        month: u8,
        /// The offset the month boundaries are computed in.
        offset: UtcOffset,
    },
}

impl Period {
    /// Resolve the period into a start (inclusive) and end (exclusive) timestamp.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidDateRange] if a date range does not start
    /// before it ends, or an [Error::InvalidMonth] for an invalid month.
    pub fn bounds(&self) -> Result<(OffsetDateTime, OffsetDateTime), Error> {
        match *self {
            Period::DateRange { start, end } if start >= end => Err(Error::InvalidDateRange),
            Period::DateRange { start, end } => Ok((start, end)),
            Period::Month {
                year,
                month,
                offset,
            } => month_bounds(year, month, offset),
        }
    }
}

/// Filters for [list_transactions]. All filters are optional and combined
/// with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// Only include income or only expenses.
    pub kind: Option<TransactionKind>,
    /// Only include transactions with this category.
    pub category: Option<Category>,
    /// Only include transactions in this period.
    pub period: Option<Period>,
}

/// Get the transactions owned by `owner` that match `query`, most recent first.
///
/// Transactions with the same timestamp are ordered by descending ID.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidDateRange] or [Error::InvalidMonth] if the period is invalid,
/// - [Error::SqlError] if there is some other SQL error.
pub fn list_transactions(
    owner: UserID,
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut where_clause = String::from("user_id = ?");
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(owner.as_i64())];

    if let Some(kind) = query.kind {
        where_clause.push_str(" AND kind = ?");
        params.push(Box::new(kind));
    }

    if let Some(category) = query.category {
        where_clause.push_str(" AND category = ?");
        params.push(Box::new(category));
    }

    if let Some(period) = query.period {
        let (start, end) = period.bounds()?;
        where_clause.push_str(" AND timestamp >= ? AND timestamp < ?");
        params.push(Box::new(to_unix_micros(start)));
        params.push(Box::new(to_unix_micros(end)));
    }

    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE {where_clause} \
         ORDER BY timestamp DESC, id DESC"
    );

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(params.iter()), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}
