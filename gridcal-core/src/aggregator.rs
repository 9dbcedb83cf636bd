//! Event aggregation for the day list and the month grid.
//!
//! Every fetch goes to the remote service; nothing is cached between views.
//! A month index is built wholesale and handed back whole, so callers swap it
//! in place of the previous one rather than patching it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::error::RemoteError;
use crate::event::CalendarEvent;
use crate::month::{TimeWindow, YearMonth};
use crate::palette::HOLIDAY_COLOR_HEX;
use crate::remote::RemoteCalendar;

/// Title and fill color for one grid pill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEventSummary {
    pub title: String,
    pub color_hex: String,
}

/// Event summaries grouped by calendar date.
///
/// Keys exist only for dates with at least one event. Each date's entries
/// keep the order the remote list call returned them in, primary calendar
/// first and holiday overlay after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthEventIndex {
    days: BTreeMap<NaiveDate, Vec<DayEventSummary>>,
}

impl MonthEventIndex {
    pub fn get(&self, date: NaiveDate) -> &[DayEventSummary] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of dates holding events.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn push(&mut self, date: NaiveDate, summary: DayEventSummary) {
        self.days.entry(date).or_default().push(summary);
    }

    /// Append each event under the local date of its start. Events whose start
    /// can't be parsed are skipped; the number skipped is returned.
    pub fn extend_from(
        &mut self,
        events: &[CalendarEvent],
        tz: &Tz,
        color_override: Option<&str>,
    ) -> usize {
        let mut skipped = 0;

        for event in events {
            let start = match event.start_time() {
                Ok(start) => start,
                Err(e) => {
                    debug!("Skipping event in month index: {}", e);
                    skipped += 1;
                    continue;
                }
            };

            let color_hex = color_override.unwrap_or_else(|| event.color_hex());
            self.push(
                start.local_date(tz),
                DayEventSummary {
                    title: event.display_title().to_string(),
                    color_hex: color_hex.to_string(),
                },
            );
        }

        skipped
    }
}

/// Read-only holiday calendars merged into the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayOverlay {
    pub enabled: bool,
    /// Tried in order; the first one that answers is used.
    pub calendars: Vec<String>,
}

/// Fetches a day's events and a month's event index from one calendar.
pub struct EventAggregator<C> {
    client: C,
    calendar_id: String,
    holidays: HolidayOverlay,
    tz: Tz,
}

impl<C: RemoteCalendar> EventAggregator<C> {
    pub fn new(client: C, calendar_id: impl Into<String>, holidays: HolidayOverlay, tz: Tz) -> Self {
        EventAggregator {
            client,
            calendar_id: calendar_id.into(),
            holidays,
            tz,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    pub fn tz(&self) -> &Tz {
        &self.tz
    }

    /// Events intersecting `[00:00, 24:00)` of `date`, ordered by start.
    pub async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>, RemoteError> {
        let window = TimeWindow::day(date, &self.tz);
        debug!(
            "Fetching events for {} ({} .. {})",
            date,
            window.time_min(),
            window.time_max()
        );

        self.client.list_events(&self.calendar_id, &window).await
    }

    /// Build the index for a whole month, with the holiday overlay if enabled.
    pub async fn fetch_month_index(&self, month: YearMonth) -> Result<MonthEventIndex, RemoteError> {
        let window = TimeWindow::month(month, &self.tz);
        debug!(
            "Fetching events for {} ({} .. {})",
            month,
            window.time_min(),
            window.time_max()
        );

        let events = self.client.list_events(&self.calendar_id, &window).await?;

        let mut index = MonthEventIndex::default();
        let skipped = index.extend_from(&events, &self.tz, None);
        if skipped > 0 {
            warn!("{} event(s) in {} had an unreadable start and were left off the grid", skipped, month);
        }

        if self.holidays.enabled {
            self.overlay_holidays(&window, &mut index).await;
        }

        Ok(index)
    }

    /// Failures here are never surfaced; a source that errors is passed over.
    async fn overlay_holidays(&self, window: &TimeWindow, index: &mut MonthEventIndex) {
        for calendar_id in &self.holidays.calendars {
            match self.client.list_events(calendar_id, window).await {
                Ok(events) => {
                    index.extend_from(&events, &self.tz, Some(HOLIDAY_COLOR_HEX));
                    debug!("Holiday overlay from {} ({} events)", calendar_id, events.len());
                    return;
                }
                Err(e) => {
                    debug!("Holiday calendar {} unavailable: {}", calendar_id, e);
                }
            }
        }

        if !self.holidays.calendars.is_empty() {
            debug!("No holiday calendar answered; grid shows no holidays");
        }
    }
}
