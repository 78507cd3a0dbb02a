//! The JSON representation of a transaction sent to clients.

use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    database_id::TransactionId,
    transaction::{Amount, Category, Transaction, TransactionKind},
};

/// A transaction as returned by the transaction endpoints.
///
/// The amount is serialized as a string with two decimal places so that
/// clients do not lose precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// When the transaction happened, in the server's local offset.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// The category code, e.g. "other_expense".
    pub category: Category,
    /// The human readable category, e.g. "Other expense".
    pub category_display: &'static str,
    /// The amount of money spent or earned.
    pub amount: Amount,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The human readable transaction type.
    #[serde(rename = "type_display")]
    pub kind_display: &'static str,
    /// What the transaction was for.
    pub description: String,
}

impl TransactionView {
    /// Convert a transaction for display with its timestamp in `local_offset`.
    pub fn new(transaction: Transaction, local_offset: UtcOffset) -> Self {
        Self {
            id: transaction.id,
            date: transaction.timestamp.to_offset(local_offset),
            category: transaction.category,
            category_display: transaction.category.label(),
            amount: transaction.amount,
            kind: transaction.kind,
            kind_display: transaction.kind.label(),
            description: transaction.description,
        }
    }
}

#[cfg(test)]
mod view_tests {
    use rust_decimal_macros::dec;
    use serde_json::json;
    use time::{UtcOffset, macros::datetime};

    use crate::transaction::{
        ExpenseCategory, TransactionKind, test_utils::transaction, view::TransactionView,
    };

    #[test]
    fn serializes_display_fields() {
        let mut transaction = transaction(
            3,
            TransactionKind::Expense,
            ExpenseCategory::OtherExpense,
            dec!(12.5),
            datetime!(2024-01-31 12:00 UTC),
        );
        transaction.description = "stamps".to_owned();

        let view = TransactionView::new(transaction, UtcOffset::from_hms(13, 0, 0).unwrap());

        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "id": 3,
                "date": "2024-02-01T01:00:00+13:00",
                "category": "other_expense",
                "category_display": "Other expense",
                "amount": "12.50",
                "type": "expense",
                "type_display": "Expense",
                "description": "stamps",
            })
        );
    }
}
