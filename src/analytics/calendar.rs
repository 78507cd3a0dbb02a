//! Groups a month of transactions by local calendar day.

use std::collections::HashMap;

use serde::Serialize;
use time::{Date, UtcOffset};

use crate::{
    Error,
    analytics::month::month_bounds,
    database_id::TransactionId,
    transaction::{Category, Transaction, TransactionKind},
};

/// A transaction as shown on a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The category code.
    pub category: Category,
    /// The amount as a floating point number.
    pub amount: f64,
    /// What the transaction was for.
    pub description: String,
}

/// The transactions on one day and their totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    /// The local date of the transactions.
    #[serde(serialize_with = "serialize_date")]
    pub date: Date,
    /// The transactions on this day, in input order.
    pub transactions: Vec<CalendarEntry>,
    /// The sum of the income amounts on this day.
    pub total_income: f64,
    /// The sum of the expense amounts on this day.
    pub total_expense: f64,
}

fn serialize_date<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&format_args!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    ))
}

/// Group the transactions in a calendar month by their local date at `offset`.
///
/// Days are returned in the order their first transaction appears in
/// `transactions`, and days without transactions are left out. Day totals are
/// accumulated as floating point numbers one transaction at a time.
///
/// # Errors
///
/// Returns [Error::InvalidMonth] if `month` is not in 1-12.
pub fn fold_calendar(
    transactions: &[Transaction],
    year: i32,
    month: u8,
    offset: UtcOffset,
) -> Result<Vec<CalendarDay>, Error> {
    let (start, end) = month_bounds(year, month, offset)?;

    let mut days: Vec<CalendarDay> = Vec::new();
    let mut day_index: HashMap<Date, usize> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.timestamp >= start && transaction.timestamp < end)
    {
        let date = transaction.timestamp.to_offset(offset).date();
        let index = *day_index.entry(date).or_insert_with(|| {
            days.push(CalendarDay {
                date,
                transactions: Vec::new(),
                total_income: 0.0,
                total_expense: 0.0,
            });
            days.len() - 1
        });

        let day = &mut days[index];
        let amount = transaction.amount.as_f64();

        day.transactions.push(CalendarEntry {
            id: transaction.id,
            kind: transaction.kind,
            category: transaction.category,
            amount,
            description: transaction.description.clone(),
        });

        match transaction.kind {
            TransactionKind::Income => day.total_income += amount,
            TransactionKind::Expense => day.total_expense += amount,
        }
    }

    Ok(days)
}
