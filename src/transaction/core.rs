//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    transaction::{Amount, Category, TransactionKind},
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub owner: UserID,
    /// When the transaction happened.
    pub timestamp: OffsetDateTime,
    /// Whether money was earned or spent.
    pub kind: TransactionKind,
    /// The label of the transaction within its kind.
    pub category: Category,
    /// The amount of money spent or earned in this transaction.
    pub amount: Amount,
    /// A text description of what the transaction was for.
    pub description: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(kind: TransactionKind, category: Category, amount: Amount) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            category,
            amount,
            description: String::new(),
            timestamp: None,
        }
    }

    /// The amount with the sign given by the transaction kind, i.e. negative
    /// for expenses.
    pub fn signed_amount(&self) -> rust_decimal::Decimal {
        match self.kind {
            TransactionKind::Income => self.amount.as_decimal(),
            TransactionKind::Expense => -self.amount.as_decimal(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use rust_decimal_macros::dec;
/// use time::macros::datetime;
///
/// let builder = Transaction::build(
///         TransactionKind::Expense,
///         ExpenseCategory::Food.into(),
///         Amount::new(dec!(45.99)).unwrap(),
///     )
///     .description("Coffee and a bagel")
///     .timestamp(datetime!(2025-01-15 09:30 UTC));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether money was earned or spent.
    pub kind: TransactionKind,

    /// The label of the transaction. Must belong to `kind`.
    pub category: Category,

    /// The magnitude of the transaction.
    pub amount: Amount,

    /// A human-readable description of the transaction, may be empty.
    pub description: String,

    /// When the transaction happened.
    ///
    /// Defaults to the time the transaction is created. Transactions may be
    /// backdated.
    pub timestamp: Option<OffsetDateTime>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        description.clone_into(&mut self.description);
        self
    }

    /// Set when the transaction happened.
    pub fn timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Check that the category belongs to the transaction kind.
    ///
    /// # Errors
    /// Returns [Error::CategoryKindMismatch] if the category is for the other kind.
    pub fn validate(&self) -> Result<(), Error> {
        if self.category.kind() != self.kind {
            return Err(Error::CategoryKindMismatch {
                category: self.category,
                kind: self.kind,
            });
        }

        Ok(())
    }
}

// ============================================================================
// TIMESTAMP STORAGE
// ============================================================================

/// Convert a timestamp into the microseconds since the Unix epoch that are stored in the database.
pub(crate) fn to_unix_micros(timestamp: OffsetDateTime) -> i64 {
    (timestamp.unix_timestamp_nanos() / 1_000) as i64
}

/// Convert microseconds since the Unix epoch into a UTC timestamp.
pub(crate) fn from_unix_micros(micros: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(micros as i128 * 1_000)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns selected by transaction queries, in the order expected by [map_transaction_row].
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, user_id, timestamp, kind, category, amount, description";

/// Create a new transaction owned by `owner` in the database from a builder.
///
/// The timestamp defaults to the current time and is stored in UTC with
/// microsecond precision.
///
/// # Errors
/// This function will return a:
/// - [Error::CategoryKindMismatch] if the category does not belong to the kind,
/// - [Error::NotFound] if `owner` is not a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    owner: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    let timestamp = builder.timestamp.unwrap_or_else(OffsetDateTime::now_utc);

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, timestamp, kind, category, amount, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                owner.as_i64(),
                to_unix_micros(timestamp),
                builder.kind,
                builder.category,
                builder.amount,
                builder.description,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    tracing::debug!(
        "Created transaction {} for user {}",
        transaction.id,
        transaction.owner
    );

    Ok(transaction)
}

/// Retrieve a transaction owned by `owner` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `owner`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    owner: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
            WHERE id = :id AND user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &id), (":user_id", &owner.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the number of transactions owned by `owner`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(owner: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1;",
            [owner.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                category TEXT NOT NULL,
                amount TEXT NOT NULL,
                description TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Every query is scoped to one user and ordered by time.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_timestamp
            ON \"transaction\"(user_id, timestamp);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order of [TRANSACTION_COLUMNS].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let owner = UserID::new(row.get(1)?);
    let raw_timestamp: i64 = row.get(2)?;
    let timestamp = from_unix_micros(raw_timestamp).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Integer,
            Box::new(error),
        )
    })?;
    let kind = row.get(3)?;
    let category = row.get(4)?;
    let amount = row.get(5)?;
    let description = row.get(6)?;

    Ok(Transaction {
        id,
        owner,
        timestamp,
        kind,
        category,
        amount,
        description,
    })
}

// ============================================================================
// TESTS
// ============================================================================
