// Date utility functions
// ISO-8601 parsing/rendering for entry instants and wall-clock helpers

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
const RENDER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A calendar instant as the grid sees it: wall-clock time plus the UTC
/// offset it was written with, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInstant {
    pub local: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

impl EntryInstant {
    pub fn naive(local: NaiveDateTime) -> Self {
        Self {
            local,
            offset: None,
        }
    }

    /// Same offset, different wall-clock time.
    pub fn with_local(&self, local: NaiveDateTime) -> Self {
        Self {
            local,
            offset: self.offset,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.local.date()
    }

    pub fn to_iso(&self) -> String {
        format_instant(self)
    }
}

/// Parse an ISO-8601 instant. RFC 3339 strings keep their offset; naive
/// strings are taken as grid wall-clock time.
pub fn parse_instant(value: &str) -> Option<EntryInstant> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::<FixedOffset>::parse_from_rfc3339(value) {
        return Some(EntryInstant {
            local: parsed.naive_local(),
            offset: Some(*parsed.offset()),
        });
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(EntryInstant::naive)
}

pub fn format_instant(instant: &EntryInstant) -> String {
    let rendered = instant.local.format(RENDER_FORMAT).to_string();
    match instant.offset {
        Some(offset) => {
            let offset = offset.to_string();
            if offset == "+00:00" {
                format!("{}Z", rendered)
            } else {
                format!("{}{}", rendered, offset)
            }
        }
        None => rendered,
    }
}

/// Wall-clock time with seconds and sub-second precision dropped.
pub fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|v| v.with_nanosecond(0))
        .unwrap_or(value)
}

pub fn at_hour_minute(date: NaiveDate, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    NaiveTime::from_hms_opt(hour, minute, 0).map(|time| date.and_time(time))
}

pub fn minute_of_day(value: NaiveDateTime) -> u32 {
    value.hour() * 60 + value.minute()
}
