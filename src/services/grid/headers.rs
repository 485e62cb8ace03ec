//! Day header label parsing.
//!
//! Week grid headers render labels such as `"Mon, Jan 15"`, `"15 Jan"` or
//! `"Tue Jan 16 2024"`. The month comes from an abbreviation lookup, the day
//! from the first numeric token of one or two digits, and the year from a
//! four-digit token when present.

use chrono::{Datelike, NaiveDate};

use crate::error::SurfaceError;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn month_from_token(token: &str) -> Option<u32> {
    let lower = token.to_ascii_lowercase();
    let prefix = lower.get(..3)?;
    MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| *abbr == prefix)
        .map(|index| index as u32 + 1)
}

/// Parse a header label into a date. Without an explicit year, the year
/// putting the date closest to `anchor` wins, so a week straddling New
/// Year resolves correctly.
pub fn parse_header_date(label: &str, anchor: NaiveDate) -> Result<NaiveDate, SurfaceError> {
    let malformed = || SurfaceError::MalformedHeader(label.to_string());

    let mut month = None;
    let mut day = None;
    let mut year = None;

    for token in label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        if token.chars().all(|c| c.is_ascii_digit()) {
            match token.len() {
                1 | 2 if day.is_none() => day = token.parse::<u32>().ok(),
                4 if year.is_none() => year = token.parse::<i32>().ok(),
                _ => {}
            }
        } else if month.is_none() {
            month = month_from_token(token);
        }
    }

    let month = month.ok_or_else(malformed)?;
    let day = day.ok_or_else(malformed)?;

    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed);
    }

    [anchor.year() - 1, anchor.year(), anchor.year() + 1]
        .into_iter()
        .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
        .min_by_key(|candidate| (*candidate - anchor).num_days().abs())
        .ok_or_else(malformed)
}
