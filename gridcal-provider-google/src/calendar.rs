//! `RemoteCalendar` over the Google Calendar API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use google_calendar::Client;
use google_calendar::types::{OrderBy, SendUpdates};
use gridcal_core::{
    Authenticator, CalendarEvent, EventPayload, OAuthFlow, RemoteCalendar, RemoteError,
    TimeWindow,
};
use tracing::debug;

use crate::app_config::ClientCredentials;
use crate::convert::{FromGoogle, ToGoogle};
use crate::oauth::redirect_uri;

pub struct GoogleCalendar<F> {
    auth: Authenticator<F>,
    credentials: ClientCredentials,
}

impl<F: OAuthFlow> GoogleCalendar<F> {
    pub fn new(auth: Authenticator<F>, credentials: ClientCredentials) -> Self {
        GoogleCalendar { auth, credentials }
    }

    pub fn authenticator(&self) -> &Authenticator<F> {
        &self.auth
    }

    /// An API client with a token that is valid right now.
    async fn client(&self) -> Result<Client> {
        let credential = self
            .auth
            .get_valid_credential()
            .await
            .context("Not signed in to Google Calendar")?;

        Ok(Client::new(
            self.credentials.client_id.clone(),
            self.credentials.client_secret.clone(),
            redirect_uri(),
            credential.access_token,
            credential.refresh_token,
        ))
    }

    async fn list(&self, calendar_id: &str, window: &TimeWindow) -> Result<Vec<CalendarEvent>> {
        let client = self.client().await?;
        let time_min = window.time_min();
        let time_max = window.time_max();

        let response = client
            .events()
            .list_all(
                calendar_id,
                "",                 // i_cal_uid
                0,                  // max_attendees
                OrderBy::StartTime, // order_by
                &[],                // private_extended_property
                "",                 // q (search query)
                &[],                // shared_extended_property
                false,              // show_deleted
                false,              // show_hidden_invitations
                true,               // single_events
                &time_max,
                &time_min,
                "", // time_zone
                "", // updated_min
            )
            .await
            .with_context(|| format!("Failed to fetch events from {}", calendar_id))?;

        let events: Vec<CalendarEvent> = response
            .body
            .into_iter()
            .filter(|e| e.status != "cancelled" && !e.id.is_empty())
            .map(CalendarEvent::from_google)
            .collect();

        debug!("Fetched {} events from {} ({} .. {})", events.len(), calendar_id, time_min, time_max);

        Ok(events)
    }

    async fn insert(&self, calendar_id: &str, body: &EventPayload) -> Result<CalendarEvent> {
        let client = self.client().await?;

        let mut google_event = body.to_google();
        google_event.id = String::new(); // Let Google assign the ID

        let response = client
            .events()
            .insert(
                calendar_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to create event: {}", body.title))?;

        Ok(CalendarEvent::from_google(response.body))
    }

    async fn patch(
        &self,
        calendar_id: &str,
        event_id: &str,
        body: &EventPayload,
    ) -> Result<CalendarEvent> {
        let client = self.client().await?;

        let google_event = body.to_google();

        let response = client
            .events()
            .patch(
                calendar_id,
                event_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to update event: {}", body.title))?;

        Ok(CalendarEvent::from_google(response.body))
    }

    async fn delete(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let client = self.client().await?;

        let result = client
            .events()
            .delete(calendar_id, event_id, false, SendUpdates::None)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("410") || error_str.contains("Gone") {
                    debug!("Event {} was already deleted", event_id);
                    Ok(())
                } else {
                    Err(e).with_context(|| format!("Failed to delete event: {}", event_id))
                }
            }
        }
    }
}

#[async_trait]
impl<F: OAuthFlow> RemoteCalendar for GoogleCalendar<F> {
    async fn list_events(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<CalendarEvent>, RemoteError> {
        self.list(calendar_id, window).await.map_err(to_remote_error)
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        body: &EventPayload,
    ) -> Result<CalendarEvent, RemoteError> {
        self.insert(calendar_id, body).await.map_err(to_remote_error)
    }

    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        body: &EventPayload,
    ) -> Result<CalendarEvent, RemoteError> {
        self.patch(calendar_id, event_id, body)
            .await
            .map_err(to_remote_error)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), RemoteError> {
        self.delete(calendar_id, event_id)
            .await
            .map_err(to_remote_error)
    }
}

fn to_remote_error(err: anyhow::Error) -> RemoteError {
    let message = format!("{:#}", err);
    RemoteError::new(status_from_message(&message), message)
}

/// The first standalone three-digit number in the 4xx/5xx range.
fn status_from_message(message: &str) -> Option<u16> {
    message
        .split(|c: char| !c.is_ascii_digit())
        .filter(|token| token.len() == 3)
        .filter_map(|token| token.parse::<u16>().ok())
        .find(|status| (400..600).contains(status))
}
