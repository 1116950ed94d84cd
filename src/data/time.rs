use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Compact calendar format used by the close-approach data, e.g. `2020-Jan-01 00:00`.
const CD_FORMAT: &str = "%Y-%b-%d %H:%M";

/// Output format for approach times, e.g. `2020-01-01 00:00`.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse a close-approach calendar date (`YYYY-Mon-DD hh:mm`) into a naive datetime.
///
/// The source strings are already UTC, so no timezone is attached.
pub fn cd_to_datetime(calendar_date: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(calendar_date.trim(), CD_FORMAT)
        .with_context(|| format!("'{calendar_date}' is not a YYYY-Mon-DD hh:mm date"))
}

/// Render a datetime as `YYYY-MM-DD hh:mm`.
pub fn datetime_to_str(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse an ISO `YYYY-MM-DD` date, as used by date criteria.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .with_context(|| format!("'{text}' is not a YYYY-MM-DD date"))
}
