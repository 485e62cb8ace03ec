// Entry module
// Calendar entry as exchanged with the caller: ISO instants plus opaque display fields

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};
use crate::utils::date::{parse_instant, EntryInstant};

/// A scheduled calendar entry.
///
/// The engine only ever reads `start`/`end` and proposes replacements for
/// them; every other field travels through untouched in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub start: String,
    pub end: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Parsed start/end of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntrySpan {
    pub start: EntryInstant,
    pub end: EntryInstant,
}

impl EntrySpan {
    pub fn duration(&self) -> chrono::Duration {
        self.end.local - self.start.local
    }
}

impl CalendarEntry {
    /// Create an entry with no display fields.
    ///
    /// # Examples
    /// ```
    /// use rust_calendar_gestures::models::entry::CalendarEntry;
    ///
    /// let entry = CalendarEntry::new("standup", "2023-01-15T10:00", "2023-01-15T10:15");
    /// assert!(entry.span().is_ok());
    /// ```
    pub fn new(id: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: start.into(),
            end: end.into(),
            fields: Map::new(),
        }
    }

    /// Set a display field (title, color, ...)
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }

    /// Parse the entry's instants, enforcing `start < end`.
    pub fn span(&self) -> EngineResult<EntrySpan> {
        let start = parse_instant(&self.start)
            .ok_or_else(|| EngineError::InvalidInstant(self.start.clone()))?;
        let end =
            parse_instant(&self.end).ok_or_else(|| EngineError::InvalidInstant(self.end.clone()))?;

        if end.local <= start.local {
            return Err(EngineError::InvalidSpan {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }

        Ok(EntrySpan { start, end })
    }

    /// Copy of this entry with new instants; all other fields preserved.
    pub fn with_span(&self, start: &EntryInstant, end: &EntryInstant) -> Self {
        Self {
            start: start.to_iso(),
            end: end.to_iso(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_span_ok() {
        let entry = CalendarEntry::new("a", "2023-01-15T10:00", "2023-01-15T12:00");
        let span = entry.span().unwrap();
        assert_eq!(span.duration(), chrono::Duration::hours(2));
    }

    #[test]
    fn test_span_rejects_unparsable() {
        let entry = CalendarEntry::new("a", "tomorrow", "2023-01-15T12:00");
        assert_eq!(
            entry.span(),
            Err(EngineError::InvalidInstant("tomorrow".to_string()))
        );
    }

    #[test]
    fn test_span_rejects_inverted() {
        let entry = CalendarEntry::new("a", "2023-01-15T12:00", "2023-01-15T12:00");
        assert!(matches!(entry.span(), Err(EngineError::InvalidSpan { .. })));
    }

    #[test]
    fn test_with_span_preserves_fields() {
        let entry = CalendarEntry::new("a", "2023-01-15T10:00", "2023-01-15T12:00")
            .with_field("title", "Review")
            .with_field("color", "#3366ff");
        let span = entry.span().unwrap();
        let moved_start = span.start.with_local(span.start.local + chrono::Duration::hours(1));
        let moved_end = span.end.with_local(span.end.local + chrono::Duration::hours(1));

        let updated = entry.with_span(&moved_start, &moved_end);
        assert_eq!(updated.id, "a");
        assert_eq!(updated.title(), Some("Review"));
        assert_eq!(updated.fields.get("color"), entry.fields.get("color"));
        assert_eq!(updated.start, "2023-01-15T11:00:00");
        assert_eq!(updated.end, "2023-01-15T13:00:00");
    }

    #[test]
    fn test_json_roundtrip_keeps_unknown_fields() {
        let json = r#"{"id":"x","start":"2023-01-15T10:00","end":"2023-01-15T11:00","title":"Sync","attendees":2}"#;
        let entry: CalendarEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.title(), Some("Sync"));
        assert_eq!(entry.fields.get("attendees"), Some(&Value::from(2)));
    }
}
