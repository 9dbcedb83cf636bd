//! The seam a calendar backend implements.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::event::{CalendarEvent, EventPayload};
use crate::month::TimeWindow;

/// List/insert/patch/delete against one or more calendar identifiers.
///
/// `list_events` returns the concrete instances (recurring series expanded)
/// intersecting the window, ordered by start time.
#[async_trait]
pub trait RemoteCalendar: Send + Sync {
    async fn list_events(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<CalendarEvent>, RemoteError>;

    async fn insert_event(
        &self,
        calendar_id: &str,
        body: &EventPayload,
    ) -> Result<CalendarEvent, RemoteError>;

    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        body: &EventPayload,
    ) -> Result<CalendarEvent, RemoteError>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), RemoteError>;
}

#[async_trait]
impl<T: RemoteCalendar + ?Sized> RemoteCalendar for Arc<T> {
    async fn list_events(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<CalendarEvent>, RemoteError> {
        (**self).list_events(calendar_id, window).await
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        body: &EventPayload,
    ) -> Result<CalendarEvent, RemoteError> {
        (**self).insert_event(calendar_id, body).await
    }

    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        body: &EventPayload,
    ) -> Result<CalendarEvent, RemoteError> {
        (**self).patch_event(calendar_id, event_id, body).await
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), RemoteError> {
        (**self).delete_event(calendar_id, event_id).await
    }
}
