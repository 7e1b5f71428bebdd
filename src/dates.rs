use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("unrecognized date format: '{0}'")]
    Unrecognized(String),
    #[error("no such calendar date: '{0}'")]
    OutOfRange(String),
}

static YEAR_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid date regex"));
static MONTH_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid date regex"));

/// Parse a raw feed date into a calendar date.
///
/// The feed escapes separators inconsistently, so literal backslashes are
/// stripped before matching. Exactly two shapes are accepted: `YYYY-MM-DD`
/// and `M/D/YYYY` (1-2 digit month and day). Anything else, including a
/// matching shape whose components are not a real date, is an error value.
pub fn normalize(raw: &str) -> Result<NaiveDate, DateParseError> {
    let cleaned: String = raw.chars().filter(|c| *c != '\\').collect();
    let cleaned = cleaned.trim();

    let (year, month, day) = if let Some(caps) = YEAR_FIRST.captures(cleaned) {
        (digits(&caps[1]), digits(&caps[2]), digits(&caps[3]))
    } else if let Some(caps) = MONTH_FIRST.captures(cleaned) {
        (digits(&caps[3]), digits(&caps[1]), digits(&caps[2]))
    } else {
        return Err(DateParseError::Unrecognized(cleaned.to_string()));
    };

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| DateParseError::OutOfRange(cleaned.to_string()))
}

fn digits(s: &str) -> u32 {
    s.parse().expect("regex guarantees 1-4 ASCII digits")
}

/// The current calendar date in the reference timezone, independent of
/// whatever zone the host process runs in.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}
