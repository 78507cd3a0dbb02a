//! Parsing of client supplied dates and times.
//!
//! Clients may send a full RFC 3339 timestamp, or a date with an optional
//! time and no offset, which is read in the server's local offset.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::Error;

const DATE_TIME_MINUTES_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");
const DATE_TIME_SECONDS_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse `raw` as a point in time.
///
/// Accepts "2024-01-05T10:30:00+13:00", "2024-01-05T10:30:00",
/// "2024-01-05T10:30" and "2024-01-05". Values without an offset are
/// interpreted in `local_offset`, and a bare date means local midnight.
///
/// # Errors
///
/// Returns [Error::InvalidRequest] if `raw` matches none of the formats.
pub(crate) fn parse_date_time(raw: &str, local_offset: UtcOffset) -> Result<OffsetDateTime, Error> {
    let raw = raw.trim();

    if let Ok(date_time) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(date_time);
    }

    let local_date_time = PrimitiveDateTime::parse(raw, DATE_TIME_SECONDS_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(raw, DATE_TIME_MINUTES_FORMAT))
        .or_else(|_| Date::parse(raw, DATE_FORMAT).map(Date::midnight))
        .map_err(|_| Error::InvalidRequest(format!("could not parse the date \"{raw}\"")))?;

    Ok(local_date_time.assume_offset(local_offset))
}
