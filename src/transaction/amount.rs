//! A positive monetary amount with two decimal places.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The number of decimal places amounts are stored with.
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// The largest number of digits an amount may have, including the decimal places.
const AMOUNT_MAX_DIGITS: usize = 10;

/// The magnitude of a transaction, e.g. 12.50.
///
/// Amounts are always greater than zero, the sign comes from the
/// transaction kind. The value is an exact decimal so sums over many
/// transactions do not drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "String")]
pub struct Amount(Decimal);

impl Amount {
    /// Create and validate an amount.
    ///
    /// # Errors
    ///
    /// Returns an:
    /// - [Error::NonPositiveAmount] if `value` is zero or negative,
    /// - [Error::InvalidAmount] if `value` has more than two decimal places
    ///   or more than eight integer digits.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount);
        }

        let normalized = value.normalize();
        if normalized.scale() > AMOUNT_DECIMAL_PLACES {
            return Err(Error::InvalidAmount(value.to_string()));
        }

        let mut rescaled = normalized;
        rescaled.rescale(AMOUNT_DECIMAL_PLACES);

        if rescaled.mantissa().unsigned_abs().to_string().len() > AMOUNT_MAX_DIGITS {
            return Err(Error::InvalidAmount(value.to_string()));
        }

        Ok(Self(rescaled))
    }

    /// Create an amount without any validation.
    ///
    /// The caller should ensure that `value` is positive and has at most two
    /// decimal places.
    pub fn new_unchecked(value: Decimal) -> Self {
        Self(value)
    }

    /// The exact decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// The value as a float, for sending to clients.
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for String {
    fn from(value: Amount) -> Self {
        value.to_string()
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Decimal::from_str(value.as_str()?)
            .map(Self)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
