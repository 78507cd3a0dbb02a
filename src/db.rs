//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{auth::create_user_table, transaction::create_transaction_table};

/// Create the tables for the domain models if they do not already exist.
///
/// Foreign key enforcement is switched on for `connection`, so deleting a user
/// also deletes their transactions.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    // PRAGMA foreign_keys is a no-op inside a transaction.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
