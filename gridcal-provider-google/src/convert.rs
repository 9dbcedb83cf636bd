//! Conversion between Google API event types and gridcal's.

use chrono::{SecondsFormat, Utc};
use google_calendar::types::{Event as GoogleEvent, EventDateTime, EventReminder, Reminders};
use gridcal_core::{CalendarEvent, EventPayload, EventTime, EventTiming};

/// Convert from Google API types to gridcal types
pub trait FromGoogle<T> {
    fn from_google(value: T) -> Self;
}

/// Convert to Google API types from gridcal types
pub trait ToGoogle<T> {
    fn to_google(&self) -> T;
}

impl FromGoogle<Option<&EventDateTime>> for EventTiming {
    fn from_google(value: Option<&EventDateTime>) -> Self {
        let Some(time) = value else {
            return EventTiming::default();
        };

        EventTiming {
            date: time.date.map(|d| d.format("%Y-%m-%d").to_string()),
            date_time: time
                .date_time
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, false)),
        }
    }
}

impl FromGoogle<GoogleEvent> for CalendarEvent {
    fn from_google(event: GoogleEvent) -> Self {
        let start = EventTiming::from_google(event.start.as_ref());
        let end = EventTiming::from_google(event.end.as_ref());

        // Only a popup override counts; "use default" means no override
        let reminder_minutes = event
            .reminders
            .as_ref()
            .filter(|r| !r.use_default)
            .and_then(|r| r.overrides.first())
            .map(|r| r.minutes.clamp(0, u32::MAX as i64) as u32)
            .unwrap_or(0);

        CalendarEvent {
            id: event.id,
            title: event.summary,
            start,
            end,
            color_id: if event.color_id.is_empty() {
                None
            } else {
                Some(event.color_id)
            },
            description: if event.description.is_empty() {
                None
            } else {
                Some(event.description)
            },
            reminder_minutes,
        }
    }
}

impl ToGoogle<EventDateTime> for EventTime {
    fn to_google(&self) -> EventDateTime {
        match self {
            EventTime::Date(d) => EventDateTime {
                date: Some(*d),
                date_time: None,
                time_zone: String::new(),
            },
            EventTime::DateTime(dt) => EventDateTime {
                date: None,
                date_time: Some(dt.with_timezone(&Utc)),
                time_zone: String::new(),
            },
        }
    }
}

impl ToGoogle<GoogleEvent> for EventPayload {
    fn to_google(&self) -> GoogleEvent {
        // Never fall back to the calendar's defaults: 0 means no reminder at all
        let overrides = if self.reminder_minutes == 0 {
            Vec::new()
        } else {
            vec![EventReminder {
                method: "popup".to_string(),
                minutes: self.reminder_minutes as i64,
            }]
        };
        let reminders = Reminders {
            overrides,
            use_default: false,
        };

        GoogleEvent {
            summary: self.title.clone(),
            description: self.description.clone(),
            color_id: self.color_id.clone(),
            start: Some(self.start.to_google()),
            end: Some(self.end.to_google()),
            reminders: Some(reminders),
            ..Default::default()
        }
    }
}
