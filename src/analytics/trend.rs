//! Month over month expense analysis.

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    analytics::{
        month::{month_start, previous_month_start},
        summary::{CategoryTotal, totals_by_category},
    },
    transaction::{Transaction, TransactionKind},
};

/// Direction of spending compared to the previous month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Spending increased.
    Up,
    /// Spending decreased.
    Down,
    /// Spending did not change, or there was no spending last month.
    Stable,
}

/// Spending this month compared with last month.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingAnalysis {
    /// Expenses since the start of the current month.
    pub current_month_total: Decimal,
    /// Expenses in the previous calendar month.
    pub previous_month_total: Decimal,
    /// Percentage change from last month, rounded to 2 decimal places.
    /// Zero when there were no expenses last month.
    pub change_percent: Decimal,
    /// The sign of the change before rounding.
    pub trend: Trend,
    /// The category with the most spending this month.
    pub top_category: Option<CategoryTotal>,
    /// This month's expenses per category, largest first.
    pub category_breakdown: Vec<CategoryTotal>,
}

/// Compare the expenses in the month of `now` with the month before it.
///
/// Month boundaries are computed in the offset of `now`. Expenses at or after
/// `now` still count towards the current month.
pub fn analyze_spending(transactions: &[Transaction], now: OffsetDateTime) -> SpendingAnalysis {
    let current_month_start = month_start(now);
    let previous_month_start = previous_month_start(now);

    let expenses = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense);

    let mut current_month_expenses = Vec::new();
    let mut previous_month_total = Decimal::ZERO;

    for transaction in expenses {
        if transaction.timestamp >= current_month_start {
            current_month_expenses.push(transaction.clone());
        } else if transaction.timestamp >= previous_month_start {
            previous_month_total += transaction.amount.as_decimal();
        }
    }

    let current_month_total: Decimal = current_month_expenses
        .iter()
        .map(|transaction| transaction.amount.as_decimal())
        .sum();

    let raw_change_percent = if previous_month_total > Decimal::ZERO {
        (current_month_total - previous_month_total) / previous_month_total * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    // Taken from the unrounded change, so a tiny decrease is still a decrease.
    let trend = if raw_change_percent > Decimal::ZERO {
        Trend::Up
    } else if raw_change_percent < Decimal::ZERO {
        Trend::Down
    } else {
        Trend::Stable
    };
    let change_percent = raw_change_percent.round_dp(2);

    let mut category_breakdown =
        totals_by_category(&current_month_expenses, TransactionKind::Expense);
    // Stable, so equal totals stay in category order.
    category_breakdown.sort_by(|a, b| b.total.cmp(&a.total));

    SpendingAnalysis {
        current_month_total,
        previous_month_total,
        change_percent,
        trend,
        top_category: category_breakdown.first().copied(),
        category_breakdown,
    }
}
