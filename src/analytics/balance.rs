//! The overall balance of a set of transactions.

use rust_decimal::Decimal;

use crate::transaction::{Transaction, TransactionKind};

/// Income and expense totals, and their difference.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Balance {
    /// `total_income - total_expense`.
    pub balance: Decimal,
    /// The sum of all income amounts.
    pub total_income: Decimal,
    /// The sum of all expense amounts.
    pub total_expense: Decimal,
}

/// Sum the income and expenses in `transactions`.
///
/// An empty slice gives a balance of zero.
pub fn calculate_balance(transactions: &[Transaction]) -> Balance {
    let (total_income, total_expense) = transactions.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(income, expense), transaction| match transaction.kind {
            TransactionKind::Income => (income + transaction.amount.as_decimal(), expense),
            TransactionKind::Expense => (income, expense + transaction.amount.as_decimal()),
        },
    );

    Balance {
        balance: transactions.iter().map(Transaction::signed_amount).sum(),
        total_income,
        total_expense,
    }
}
