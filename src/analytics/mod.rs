//! Aggregated views over a user's transactions.
//!
//! The aggregation functions are pure: they take transactions that have
//! already been filtered to one owner and never touch the database. The
//! handlers load the caller's transactions and convert the results to JSON.

mod balance;
mod calendar;
mod handlers;
mod month;
mod summary;
mod trend;

pub use balance::{Balance, calculate_balance};
pub use calendar::{CalendarDay, CalendarEntry, fold_calendar};
pub use handlers::{AnalyticsState, get_analytics, get_balance, get_calendar, get_summary};
pub use month::{month_bounds, month_start, previous_month_start};
pub use summary::{CategorySummary, CategoryTotal, summarize_by_category};
pub use trend::{SpendingAnalysis, Trend, analyze_spending};
