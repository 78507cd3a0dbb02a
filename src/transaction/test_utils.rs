//! Helpers shared by the transaction and analytics tests.

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    auth::{NewUser, PasswordHash, UserID, create_user},
    db::initialize,
    transaction::{
        Amount, Category, ExpenseCategory, IncomeCategory, Transaction, TransactionKind,
    },
};

/// An in-memory database with the application schema.
pub fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&conn).expect("Could not initialize database");
    conn
}

/// Register a user called `username` and return their ID.
pub fn insert_user(username: &str, connection: &Connection) -> UserID {
    let new_user = NewUser::new(
        username,
        &format!("{username}@example.com"),
        PasswordHash::new_unchecked("hunter2"),
    )
    .expect("Could not build test user");

    create_user(new_user, connection)
        .expect("Could not create test user")
        .id
}

/// Build a transaction in memory without touching the database.
pub fn transaction(
    id: i64,
    kind: TransactionKind,
    category: impl Into<Category>,
    amount: Decimal,
    timestamp: OffsetDateTime,
) -> Transaction {
    Transaction {
        id,
        owner: UserID::new(1),
        timestamp,
        kind,
        category: category.into(),
        amount: Amount::new(amount).expect("Invalid test amount"),
        description: String::new(),
    }
}

/// Build an in-memory income transaction.
pub fn income(
    id: i64,
    category: IncomeCategory,
    amount: Decimal,
    timestamp: OffsetDateTime,
) -> Transaction {
    transaction(id, TransactionKind::Income, category, amount, timestamp)
}

/// Build an in-memory expense transaction.
pub fn expense(
    id: i64,
    category: ExpenseCategory,
    amount: Decimal,
    timestamp: OffsetDateTime,
) -> Transaction {
    transaction(id, TransactionKind::Expense, category, amount, timestamp)
}
