//! Resolves "today" in the server's configured timezone.

use time::{Date, OffsetDateTime, UtcOffset, macros::format_description};
use time_tz::{Offset, TimeZone};

use crate::Error;

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current date in `canonical_timezone`, e.g. "Europe/Kyiv".
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the timezone is not a known canonical name.
pub fn today(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

/// The range the dashboard and transactions page show by default: the first
/// of the month containing `today` up to and including `today`.
pub fn month_to_date(today: Date) -> (Date, Date) {
    (today.replace_day(1).unwrap_or(today), today)
}

/// Parse an ISO 8601 calendar date as sent by date inputs, e.g. "2025-01-31".
pub fn parse_iso_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}
