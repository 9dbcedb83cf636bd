//! Rows for the selected day's event list.

use chrono_tz::Tz;

use crate::event::{CalendarEvent, EventTime};

/// Shown in place of an empty description.
pub const NO_DESCRIPTION: &str = "(no description)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
    pub event_id: String,
    /// `<time-or-date> - <title>`
    pub label: String,
    pub color_hex: &'static str,
    pub description: String,
    pub expanded: bool,
}

/// The day's events in fetch order, each with its own collapsed/expanded flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayDetailList {
    rows: Vec<DayRow>,
}

impl DayDetailList {
    /// Build collapsed rows for `events`.
    pub fn from_events(events: &[CalendarEvent], tz: &Tz) -> Self {
        let rows = events
            .iter()
            .map(|event| DayRow {
                event_id: event.id.clone(),
                label: format!("{} - {}", when_label(event, tz), event.display_title()),
                color_hex: event.color_hex(),
                description: match event.description.as_deref().map(str::trim) {
                    Some(text) if !text.is_empty() => text.to_string(),
                    _ => NO_DESCRIPTION.to_string(),
                },
                expanded: false,
            })
            .collect();

        DayDetailList { rows }
    }

    pub fn rows(&self) -> &[DayRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flip one row's description panel. Returns the new state, or `None` if
    /// there is no such row.
    pub fn toggle(&mut self, row: usize) -> Option<bool> {
        let row = self.rows.get_mut(row)?;
        row.expanded = !row.expanded;
        Some(row.expanded)
    }
}

/// Local `YYYY-MM-DD HH:MM` for timed events, the raw date for all-day ones.
fn when_label(event: &CalendarEvent, tz: &Tz) -> String {
    if event.is_all_day() {
        return event.start.raw().unwrap_or_default().to_string();
    }

    match event.start_time() {
        Ok(EventTime::DateTime(dt)) => dt.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string(),
        Ok(EventTime::Date(d)) => d.format("%Y-%m-%d").to_string(),
        Err(_) => event.start.raw().unwrap_or("?").to_string(),
    }
}
