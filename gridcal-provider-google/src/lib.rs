//! Google Calendar backend for gridcal.
//!
//! `GoogleCalendar` implements the core `RemoteCalendar` seam and
//! `GoogleOAuth` implements `OAuthFlow`. Both read the user's OAuth client
//! from `app_config`.

pub mod app_config;
mod calendar;
mod convert;
mod oauth;

pub use calendar::GoogleCalendar;
pub use oauth::{GoogleOAuth, SCOPES};
