//! In-memory calendar service for tests.
//!
//! Enabled for this crate's own tests and, through the `test-utils` feature,
//! for integration tests and downstream crates.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::event::{CalendarEvent, EventPayload, EventTime};
use crate::month::TimeWindow;
use crate::remote::RemoteCalendar;

/// Calendars keyed by id. Every call is recorded as `"<verb> <calendar id>"`.
#[derive(Default)]
pub struct FakeCalendar {
    events: Mutex<Vec<(String, CalendarEvent)>>,
    failing: Mutex<HashSet<String>>,
    failing_lists: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    windows: Mutex<Vec<(String, String)>>,
    next_id: Mutex<u32>,
}

impl FakeCalendar {
    pub fn add(&self, calendar_id: &str, event: CalendarEvent) {
        self.events.lock().unwrap().push((calendar_id.to_string(), event));
    }

    /// Every call against `calendar_id` answers 503 from now on.
    pub fn fail(&self, calendar_id: &str) {
        self.failing.lock().unwrap().insert(calendar_id.to_string());
    }

    /// Only listing `calendar_id` answers 503; writes still go through.
    pub fn fail_lists(&self, calendar_id: &str) {
        self.failing_lists.lock().unwrap().insert(calendar_id.to_string());
    }

    pub fn recover(&self, calendar_id: &str) {
        self.failing.lock().unwrap().remove(calendar_id);
        self.failing_lists.lock().unwrap().remove(calendar_id);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calendar ids listed so far, in order.
    pub fn listed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("list ").map(String::from))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// `(timeMin, timeMax)` of every list call.
    pub fn windows(&self) -> Vec<(String, String)> {
        self.windows.lock().unwrap().clone()
    }

    pub fn stored(&self, calendar_id: &str) -> Vec<CalendarEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(cal, _)| cal == calendar_id)
            .map(|(_, e)| e.clone())
            .collect()
    }

    fn record(&self, verb: &str, calendar_id: &str) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", verb, calendar_id));

        let unavailable = self.failing.lock().unwrap().contains(calendar_id)
            || (verb == "list" && self.failing_lists.lock().unwrap().contains(calendar_id));
        if unavailable {
            return Err(RemoteError::new(Some(503), "Service Unavailable"));
        }
        Ok(())
    }
}

fn in_window(event: &CalendarEvent, window: &TimeWindow) -> bool {
    match event.start_time() {
        Ok(EventTime::DateTime(dt)) => window.contains(&dt),
        Ok(EventTime::Date(d)) => d >= window.start.date_naive() && d < window.end.date_naive(),
        // Let the aggregator see malformed records
        Err(_) => true,
    }
}

#[async_trait]
impl RemoteCalendar for FakeCalendar {
    async fn list_events(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<CalendarEvent>, RemoteError> {
        self.windows
            .lock()
            .unwrap()
            .push((window.time_min(), window.time_max()));
        self.record("list", calendar_id)?;

        Ok(self
            .stored(calendar_id)
            .into_iter()
            .filter(|e| in_window(e, window))
            .collect())
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        body: &EventPayload,
    ) -> Result<CalendarEvent, RemoteError> {
        self.record("insert", calendar_id)?;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("evt{}", next)
        };
        let event = body.to_event(id);
        self.add(calendar_id, event.clone());
        Ok(event)
    }

    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        body: &EventPayload,
    ) -> Result<CalendarEvent, RemoteError> {
        self.record("patch", calendar_id)?;
        let mut events = self.events.lock().unwrap();
        let slot = events
            .iter_mut()
            .find(|(cal, e)| cal == calendar_id && e.id == event_id)
            .ok_or_else(|| RemoteError::new(Some(404), "Not Found"))?;
        slot.1 = body.to_event(event_id);
        Ok(slot.1.clone())
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), RemoteError> {
        self.record("delete", calendar_id)?;
        self.events
            .lock()
            .unwrap()
            .retain(|(cal, e)| !(cal == calendar_id && e.id == event_id));
        Ok(())
    }
}
