//! Calendar month arithmetic on offset date times.

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::Error;

/// Midnight on the first day of the month of `date_time`, keeping its offset.
pub fn month_start(date_time: OffsetDateTime) -> OffsetDateTime {
    let first_day = date_time.date() - Duration::days(i64::from(date_time.day()) - 1);

    PrimitiveDateTime::new(first_day, Time::MIDNIGHT).assume_offset(date_time.offset())
}

/// Midnight on the first day of the month before the month of `date_time`.
///
/// January rolls back to December of the previous year.
pub fn previous_month_start(date_time: OffsetDateTime) -> OffsetDateTime {
    month_start(month_start(date_time) - Duration::days(1))
}

/// The start (inclusive) and end (exclusive) of a calendar month in the
/// offset `offset`.
///
/// # Errors
///
/// Returns [Error::InvalidMonth] if `month` is not in 1-12 or `year` is out of
/// the supported range.
pub fn month_bounds(
    year: i32,
    month: u8,
    offset: UtcOffset,
) -> Result<(OffsetDateTime, OffsetDateTime), Error> {
    let invalid_month = || Error::InvalidMonth { year, month };

    let calendar_month = Month::try_from(month).map_err(|_| invalid_month())?;
    let start = Date::from_calendar_date(year, calendar_month, 1).map_err(|_| invalid_month())?;

    let (end_year, end_month) = match calendar_month {
        Month::December => (year.checked_add(1).ok_or_else(invalid_month)?, Month::January),
        other => (year, other.next()),
    };
    let end = Date::from_calendar_date(end_year, end_month, 1).map_err(|_| invalid_month())?;

    Ok((
        start.midnight().assume_offset(offset),
        end.midnight().assume_offset(offset),
    ))
}
