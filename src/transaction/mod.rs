//! The ledger of income and expense transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its kind, category and amount types
//! - Database functions for storing and querying a user's transactions
//! - Route handlers for creating, listing and retrieving transactions

mod amount;
mod category;
mod core;
mod create_endpoint;
mod date_input;
mod list_endpoint;
mod query;
mod view;

#[cfg(test)]
pub(crate) mod test_utils;

pub use amount::{AMOUNT_DECIMAL_PLACES, Amount};
pub use category::{Category, ExpenseCategory, IncomeCategory, TransactionKind};
pub use core::{
    Transaction, TransactionBuilder, count_transactions, create_transaction,
    create_transaction_table, get_transaction, map_transaction_row,
};
pub use create_endpoint::{TransactionState, create_transaction_endpoint};
pub use list_endpoint::{get_transaction_endpoint, list_transactions_endpoint};
pub use query::{Period, TransactionQuery, list_transactions};
pub use view::TransactionView;
