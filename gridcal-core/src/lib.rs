//! Core types and rules for gridcal.
//!
//! This crate holds everything that does not depend on a particular calendar
//! backend or terminal:
//! - `event` and `palette` for the event model and color codes
//! - `aggregator` for per-day and per-month fetches and the month index
//! - `grid`, `day_list` and `form` for the presentation rules
//! - `session` for the controller that ties them together
//! - `remote` and `auth` for the seams a backend implements

pub mod aggregator;
pub mod auth;
pub mod config;
pub mod day_list;
pub mod error;
pub mod event;
pub mod form;
pub mod grid;
pub mod month;
pub mod palette;
pub mod remote;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use aggregator::{DayEventSummary, EventAggregator, HolidayOverlay, MonthEventIndex};
pub use auth::{Authenticator, Credential, CredentialStore, OAuthFlow};
pub use crate::config::AppConfig;
pub use day_list::{DayDetailList, DayRow};
pub use error::{AuthError, FormError, GridcalError, GridcalResult, ParseError, RemoteError, SessionError};
pub use event::{CalendarEvent, EventPayload, EventTime, EventTiming};
pub use form::{DraftTiming, EventDraft};
pub use grid::{CellPaint, GridRenderer, Overlay, Pill};
pub use month::{MonthGrid, TimeWindow, YearMonth};
pub use remote::RemoteCalendar;
pub use session::{Action, SessionController, Transition, Viewing};
