//! Provider-neutral event types.
//!
//! `CalendarEvent` is the read-mostly copy of a remote record. Its start and
//! end are kept in wire form (`date` for all-day, `dateTime` for timed) so a
//! malformed value only affects that one event when it is parsed.
//! `EventPayload` is what the edit form hands back for insert or patch.

use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::palette;

/// Shown wherever an event has an empty title.
pub const UNTITLED: &str = "Untitled";

/// Start or end of an event as the remote service sent it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTiming {
    /// `YYYY-MM-DD`, present for all-day events
    pub date: Option<String>,
    /// RFC3339 timestamp with offset, present for timed events
    pub date_time: Option<String>,
}

impl EventTiming {
    pub fn all_day(date: impl Into<String>) -> Self {
        EventTiming {
            date: Some(date.into()),
            date_time: None,
        }
    }

    pub fn timed(date_time: impl Into<String>) -> Self {
        EventTiming {
            date: None,
            date_time: Some(date_time.into()),
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.date_time.is_none() && self.date.is_some()
    }

    /// The raw value the timing was built from, if any.
    pub fn raw(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }

    pub fn parse(&self, event_id: &str, field: &'static str) -> Result<EventTime, ParseError> {
        if let Some(raw) = &self.date_time {
            return DateTime::parse_from_rfc3339(raw)
                .map(EventTime::DateTime)
                .map_err(|_| ParseError::Invalid {
                    event_id: event_id.to_string(),
                    field,
                    value: raw.clone(),
                });
        }

        if let Some(raw) = &self.date {
            return NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(EventTime::Date)
                .map_err(|_| ParseError::Invalid {
                    event_id: event_id.to_string(),
                    field,
                    value: raw.clone(),
                });
        }

        Err(ParseError::Missing {
            event_id: event_id.to_string(),
            field,
        })
    }
}

/// A parsed start or end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

impl EventTime {
    /// Calendar date this time falls on in `tz`. All-day dates are taken as-is.
    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::DateTime(dt) => dt.with_timezone(tz).date_naive(),
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }
}

impl From<EventTime> for EventTiming {
    fn from(time: EventTime) -> Self {
        match time {
            EventTime::Date(d) => EventTiming::all_day(d.format("%Y-%m-%d").to_string()),
            EventTime::DateTime(dt) => EventTiming::timed(dt.to_rfc3339()),
        }
    }
}

/// A calendar event as fetched from the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: EventTiming,
    pub end: EventTiming,
    pub color_id: Option<String>,
    pub description: Option<String>,
    /// Minutes before start, 0 meaning no reminder override
    pub reminder_minutes: u32,
}

impl CalendarEvent {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    pub fn color_hex(&self) -> &'static str {
        palette::resolve_color(self.color_id.as_deref())
    }

    pub fn start_time(&self) -> Result<EventTime, ParseError> {
        self.start.parse(&self.id, "start")
    }

    pub fn end_time(&self) -> Result<EventTime, ParseError> {
        self.end.parse(&self.id, "end")
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }
}

/// A fully-formed event body for insert or patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPayload {
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub reminder_minutes: u32,
    pub description: String,
    pub color_id: String,
}

impl EventPayload {
    /// The event the remote service is expected to hold after accepting this payload.
    pub fn to_event(&self, id: impl Into<String>) -> CalendarEvent {
        CalendarEvent {
            id: id.into(),
            title: self.title.clone(),
            start: self.start.into(),
            end: self.end.into(),
            color_id: Some(self.color_id.clone()),
            description: if self.description.is_empty() {
                None
            } else {
                Some(self.description.clone())
            },
            reminder_minutes: self.reminder_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_start_parses_with_offset() {
        let timing = EventTiming::timed("2024-03-05T23:30:00-05:00");
        let time = timing.parse("e1", "start").unwrap();

        let seoul: Tz = "Asia/Seoul".parse().unwrap();
        assert_eq!(time.local_date(&Tz::UTC), NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert_eq!(time.local_date(&seoul), NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());

        let new_york: Tz = "America/New_York".parse().unwrap();
        assert_eq!(time.local_date(&new_york), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn all_day_start_is_taken_as_is() {
        let time = EventTiming::all_day("2024-03-05").parse("e1", "start").unwrap();
        assert!(time.is_all_day());
        assert_eq!(time.local_date(&Tz::UTC), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn date_time_wins_over_date() {
        let timing = EventTiming {
            date: Some("2024-01-01".into()),
            date_time: Some("2024-02-02T10:00:00+00:00".into()),
        };
        assert!(!timing.is_all_day());
        assert!(matches!(timing.parse("e1", "start"), Ok(EventTime::DateTime(_))));
    }

    #[test]
    fn malformed_values_report_the_event() {
        let err = EventTiming::timed("tomorrow-ish").parse("e7", "start").unwrap_err();
        assert_eq!(
            err,
            ParseError::Invalid {
                event_id: "e7".into(),
                field: "start",
                value: "tomorrow-ish".into(),
            }
        );

        let err = EventTiming::default().parse("e8", "end").unwrap_err();
        assert_eq!(
            err,
            ParseError::Missing {
                event_id: "e8".into(),
                field: "end",
            }
        );
    }

    #[test]
    fn empty_title_displays_as_untitled() {
        let event = CalendarEvent {
            title: "  ".into(),
            ..Default::default()
        };
        assert_eq!(event.display_title(), UNTITLED);
    }
}
