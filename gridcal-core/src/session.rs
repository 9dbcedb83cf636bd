//! The session controller.
//!
//! There is one state, `Viewing`. Every action fetches what the new view
//! needs first and only then commits, so a failed call leaves the previous
//! selection, day list and month index exactly as they were.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::aggregator::{EventAggregator, MonthEventIndex};
use crate::auth::CredentialStore;
use crate::day_list::DayDetailList;
use crate::error::SessionError;
use crate::event::{CalendarEvent, EventPayload};
use crate::form::EventDraft;
use crate::month::YearMonth;
use crate::remote::RemoteCalendar;

/// The selected date and the month the grid is paged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewing {
    pub selected: NaiveDate,
    pub paged: YearMonth,
}

impl Viewing {
    pub fn on(date: NaiveDate) -> Self {
        Viewing {
            selected: date,
            paged: YearMonth::of(date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectDate(NaiveDate),
    NavigateMonth(i32),
    Create(EventPayload),
    Edit { id: String, payload: EventPayload },
    Delete(String),
    Logout,
}

/// What the front-end should do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    /// The credential is gone; start the process over.
    Restart,
}

pub struct SessionController<C> {
    aggregator: EventAggregator<C>,
    credentials: CredentialStore,
    viewing: Viewing,
    day_events: Vec<CalendarEvent>,
    day_list: DayDetailList,
    month_index: MonthEventIndex,
}

impl<C: RemoteCalendar> SessionController<C> {
    /// Fetch the first view around `selected`.
    pub async fn start(
        aggregator: EventAggregator<C>,
        credentials: CredentialStore,
        selected: NaiveDate,
    ) -> Result<Self, SessionError> {
        let viewing = Viewing::on(selected);
        let day_events = aggregator.fetch_day(viewing.selected).await?;
        let month_index = aggregator.fetch_month_index(viewing.paged).await?;
        let day_list = DayDetailList::from_events(&day_events, aggregator.tz());

        Ok(SessionController {
            aggregator,
            credentials,
            viewing,
            day_events,
            day_list,
            month_index,
        })
    }

    pub fn viewing(&self) -> Viewing {
        self.viewing
    }

    pub fn day_events(&self) -> &[CalendarEvent] {
        &self.day_events
    }

    pub fn event(&self, id: &str) -> Option<&CalendarEvent> {
        self.day_events.iter().find(|e| e.id == id)
    }

    pub fn day_list(&self) -> &DayDetailList {
        &self.day_list
    }

    /// Expansion toggles only; the rows themselves come from the last fetch.
    pub fn day_list_mut(&mut self) -> &mut DayDetailList {
        &mut self.day_list
    }

    pub fn month_index(&self) -> &MonthEventIndex {
        &self.month_index
    }

    pub fn tz(&self) -> &Tz {
        self.aggregator.tz()
    }

    pub fn calendar_id(&self) -> &str {
        self.aggregator.calendar_id()
    }

    pub async fn apply(&mut self, action: Action) -> Result<Transition, SessionError> {
        match action {
            Action::SelectDate(date) => {
                self.select_date(date).await?;
            }
            Action::NavigateMonth(delta) => {
                self.navigate_month(delta).await?;
            }
            Action::Create(payload) => {
                let created = self
                    .aggregator
                    .client()
                    .insert_event(self.aggregator.calendar_id(), &payload)
                    .await?;
                info!("Created event {}", created.id);
                self.refresh_after("Event created").await?;
            }
            Action::Edit { id, payload } => {
                self.aggregator
                    .client()
                    .patch_event(self.aggregator.calendar_id(), &id, &payload)
                    .await?;
                info!("Updated event {}", id);
                self.refresh_after("Event updated").await?;
            }
            Action::Delete(id) => {
                self.aggregator
                    .client()
                    .delete_event(self.aggregator.calendar_id(), &id)
                    .await?;
                info!("Deleted event {}", id);
                self.refresh_after("Event deleted").await?;
            }
            Action::Logout => {
                self.credentials.remove()?;
                info!("Logged out");
                return Ok(Transition::Restart);
            }
        }

        Ok(Transition::Stay)
    }

    /// Validate a form draft and create or update from it.
    pub async fn submit(
        &mut self,
        event_id: Option<String>,
        draft: EventDraft,
    ) -> Result<Transition, SessionError> {
        let payload = draft.into_payload(self.aggregator.tz())?;
        let action = match event_id {
            Some(id) => Action::Edit { id, payload },
            None => Action::Create(payload),
        };
        self.apply(action).await
    }

    async fn select_date(&mut self, date: NaiveDate) -> Result<(), SessionError> {
        let day_events = self.aggregator.fetch_day(date).await?;

        // A date outside the paged month pages the grid along with it
        let target = YearMonth::of(date);
        let month_index = if target != self.viewing.paged {
            Some(self.aggregator.fetch_month_index(target).await?)
        } else {
            None
        };

        self.commit_day(date, day_events);
        if let Some(index) = month_index {
            self.viewing.paged = target;
            self.month_index = index;
        }
        Ok(())
    }

    async fn navigate_month(&mut self, delta: i32) -> Result<(), SessionError> {
        let paged = self.viewing.paged.offset(delta);
        let month_index = self.aggregator.fetch_month_index(paged).await?;

        let selected = if paged.contains(self.viewing.selected) {
            self.viewing.selected
        } else {
            paged.clamp_day(self.viewing.selected.day())
        };
        let day_events = if selected != self.viewing.selected {
            Some(self.aggregator.fetch_day(selected).await?)
        } else {
            None
        };

        debug!("Paged to {}", paged);
        self.viewing.paged = paged;
        self.month_index = month_index;
        if let Some(events) = day_events {
            self.commit_day(selected, events);
        }
        Ok(())
    }

    /// Re-fetch the selected day and the paged month after a mutation.
    async fn refresh(&mut self) -> Result<(), SessionError> {
        let day_events = self.aggregator.fetch_day(self.viewing.selected).await?;
        let month_index = self.aggregator.fetch_month_index(self.viewing.paged).await?;

        self.commit_day(self.viewing.selected, day_events);
        self.month_index = month_index;
        Ok(())
    }

    async fn refresh_after(&mut self, change: &'static str) -> Result<(), SessionError> {
        self.refresh().await.map_err(|e| match e {
            SessionError::Remote(source) => SessionError::Unrefreshed { change, source },
            other => other,
        })
    }

    fn commit_day(&mut self, date: NaiveDate, events: Vec<CalendarEvent>) {
        self.viewing.selected = date;
        self.day_list = DayDetailList::from_events(&events, self.aggregator.tz());
        self.day_events = events;
    }
}
