//! Transaction kinds and the categories that belong to each kind.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionKind {
    /// The value used for this kind in the database and the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// A human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown transaction type \"{other}\"")),
        }
    }
}

/// Categories for money that was earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeCategory {
    /// Wages from an employer.
    Salary,
    /// Contract or gig work.
    Freelance,
    /// Dividends, interest, etc.
    Investment,
    /// Money received as a gift.
    Gift,
    /// Anything else.
    OtherIncome,
}

impl IncomeCategory {
    /// All income categories in display order.
    pub const ALL: [IncomeCategory; 5] = [
        Self::Salary,
        Self::Freelance,
        Self::Investment,
        Self::Gift,
        Self::OtherIncome,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Freelance => "freelance",
            Self::Investment => "investment",
            Self::Gift => "gift",
            Self::OtherIncome => "other_income",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Salary => "Salary",
            Self::Freelance => "Freelance",
            Self::Investment => "Investment",
            Self::Gift => "Gift",
            Self::OtherIncome => "Other income",
        }
    }
}

/// Categories for money that was spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Groceries and eating out.
    Food,
    /// Public transport, fuel, taxis.
    Transport,
    /// Movies, games, concerts.
    Entertainment,
    /// Doctor visits, medicine.
    Health,
    /// Clothes, electronics, etc.
    Shopping,
    /// Power, water, internet.
    Utilities,
    /// Anything else.
    OtherExpense,
}

impl ExpenseCategory {
    /// All expense categories in display order.
    pub const ALL: [ExpenseCategory; 7] = [
        Self::Food,
        Self::Transport,
        Self::Entertainment,
        Self::Health,
        Self::Shopping,
        Self::Utilities,
        Self::OtherExpense,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Entertainment => "entertainment",
            Self::Health => "health",
            Self::Shopping => "shopping",
            Self::Utilities => "utilities",
            Self::OtherExpense => "other_expense",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
            Self::Shopping => "Shopping",
            Self::Utilities => "Utilities",
            Self::OtherExpense => "Other expense",
        }
    }
}

/// The label of a transaction, e.g. "food" or "salary".
///
/// Income and expense categories are disjoint sets, so a category always
/// implies a [TransactionKind]. On the wire and in the database a category is
/// its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    /// A category for income.
    Income(IncomeCategory),
    /// A category for expenses.
    Expense(ExpenseCategory),
}

impl Category {
    /// The kind of transaction this category belongs to.
    pub fn kind(self) -> TransactionKind {
        match self {
            Self::Income(_) => TransactionKind::Income,
            Self::Expense(_) => TransactionKind::Expense,
        }
    }

    /// The value used for this category in the database and the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income(category) => category.as_str(),
            Self::Expense(category) => category.as_str(),
        }
    }

    /// A human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Income(category) => category.label(),
            Self::Expense(category) => category.label(),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(category) = IncomeCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
        {
            return Ok(Self::Income(category));
        }

        ExpenseCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .map(Self::Expense)
            .ok_or_else(|| format!("unknown category \"{s}\""))
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_owned()
    }
}

impl From<IncomeCategory> for Category {
    fn from(value: IncomeCategory) -> Self {
        Self::Income(value)
    }
}

impl From<ExpenseCategory> for Category {
    fn from(value: ExpenseCategory) -> Self {
        Self::Expense(value)
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}
