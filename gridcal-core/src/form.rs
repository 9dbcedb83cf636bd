//! The create/edit form model.
//!
//! An `EventDraft` holds what the user has typed so far. `into_payload`
//! validates it and applies the end-time correction, producing the body the
//! remote calendar receives.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use crate::error::{FormError, ParseError};
use crate::event::{CalendarEvent, EventPayload, EventTime};
use crate::month::localize;
use crate::palette::{self, SELECTABLE_CODES};

/// Upper bound of the reminder field, one day.
pub const MAX_REMINDER_MINUTES: u32 = 1440;

/// Reminder offered for a new event.
pub const DEFAULT_REMINDER_MINUTES: u32 = 30;

/// Start and end as entered, in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftTiming {
    Timed {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// `end` is exclusive, as the remote service expects.
    AllDay { start: NaiveDate, end: NaiveDate },
}

impl DraftTiming {
    /// Move a non-positive span forward: one hour for timed, one day for all-day.
    pub fn corrected(self) -> Self {
        match self {
            DraftTiming::Timed { start, end } if end <= start => DraftTiming::Timed {
                start,
                end: start + Duration::hours(1),
            },
            DraftTiming::AllDay { start, end } if end <= start => DraftTiming::AllDay {
                start,
                end: start.succ_opt().unwrap_or(start),
            },
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub timing: DraftTiming,
    pub description: String,
    reminder_minutes: u32,
    color_id: String,
}

impl EventDraft {
    /// A new 09:00-10:00 event on `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
        let start = date.and_time(nine);

        EventDraft {
            title: String::new(),
            timing: DraftTiming::Timed {
                start,
                end: start + Duration::hours(1),
            },
            description: String::new(),
            reminder_minutes: DEFAULT_REMINDER_MINUTES,
            color_id: SELECTABLE_CODES[0].to_string(),
        }
    }

    /// Prefill from an existing event, with times shown in `tz`.
    pub fn from_event(event: &CalendarEvent, tz: &Tz) -> Result<Self, ParseError> {
        let timing = match event.start_time()? {
            EventTime::Date(start) => {
                let end = match event.end_time() {
                    Ok(EventTime::Date(end)) => end,
                    _ => start.succ_opt().unwrap_or(start),
                };
                DraftTiming::AllDay { start, end }
            }
            EventTime::DateTime(start) => {
                let start = start.with_timezone(tz).naive_local();
                let end = match event.end_time() {
                    Ok(EventTime::DateTime(end)) => end.with_timezone(tz).naive_local(),
                    _ => start + Duration::hours(1),
                };
                DraftTiming::Timed { start, end }
            }
        };

        let color_id = match event.color_id.as_deref() {
            Some(code) if palette::is_selectable(code) => code.to_string(),
            _ => SELECTABLE_CODES[0].to_string(),
        };

        Ok(EventDraft {
            title: event.title.clone(),
            timing,
            description: event.description.clone().unwrap_or_default(),
            reminder_minutes: event.reminder_minutes.min(MAX_REMINDER_MINUTES),
            color_id,
        })
    }

    pub fn reminder_minutes(&self) -> u32 {
        self.reminder_minutes
    }

    /// Set the reminder, clamped into `0..=MAX_REMINDER_MINUTES`.
    pub fn set_reminder_minutes(&mut self, minutes: i64) {
        self.reminder_minutes = minutes.clamp(0, MAX_REMINDER_MINUTES as i64) as u32;
    }

    pub fn color_id(&self) -> &str {
        &self.color_id
    }

    /// Pick a color. Codes outside the selectable subset are refused.
    pub fn set_color(&mut self, code: &str) -> bool {
        if !palette::is_selectable(code) {
            return false;
        }
        self.color_id = code.to_string();
        true
    }

    /// Validate and build the insert/patch body.
    pub fn into_payload(self, tz: &Tz) -> Result<EventPayload, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::EmptyTitle);
        }

        let (start, end) = match self.timing.corrected() {
            DraftTiming::Timed { start, end } => (
                EventTime::DateTime(localize(start, tz)),
                EventTime::DateTime(localize(end, tz)),
            ),
            DraftTiming::AllDay { start, end } => (EventTime::Date(start), EventTime::Date(end)),
        };

        Ok(EventPayload {
            title: title.to_string(),
            start,
            end,
            reminder_minutes: self.reminder_minutes,
            description: self.description.trim().to_string(),
            color_id: self.color_id,
        })
    }
}
