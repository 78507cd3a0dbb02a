//! Totals per category for each transaction kind.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::transaction::{Category, Transaction, TransactionKind};

/// The total amount recorded under one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotal {
    /// The category.
    pub category: Category,
    /// The sum of the amounts of the transactions in `category`.
    pub total: Decimal,
}

/// Category totals split by transaction kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategorySummary {
    /// Totals for income categories.
    pub income_by_category: Vec<CategoryTotal>,
    /// Totals for expense categories.
    pub expense_by_category: Vec<CategoryTotal>,
}

/// Sum the transactions of `kind` per category.
///
/// Categories without transactions are left out and the totals are in
/// category declaration order.
pub(crate) fn totals_by_category(
    transactions: &[Transaction],
    kind: TransactionKind,
) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<Category, Decimal> = BTreeMap::new();

    for transaction in transactions.iter().filter(|t| t.kind == kind) {
        *totals.entry(transaction.category).or_default() += transaction.amount.as_decimal();
    }

    totals
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect()
}

/// Group `transactions` by kind and category and sum each group.
pub fn summarize_by_category(transactions: &[Transaction]) -> CategorySummary {
    CategorySummary {
        income_by_category: totals_by_category(transactions, TransactionKind::Income),
        expense_by_category: totals_by_category(transactions, TransactionKind::Expense),
    }
}
