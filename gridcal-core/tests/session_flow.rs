use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use tempfile::TempDir;

use gridcal_core::grid::MAX_PILLS;
use gridcal_core::palette::HOLIDAY_COLOR_HEX;
use gridcal_core::testing::FakeCalendar;
use gridcal_core::{
    Action, AuthError, Authenticator, CalendarEvent, Credential, CredentialStore, EventAggregator,
    EventDraft, EventTiming, GridRenderer, HolidayOverlay, OAuthFlow, SessionController,
    SessionError, Transition, YearMonth,
};

const HOLIDAYS: [&str; 3] = ["holiday-a", "holiday-b", "holiday-c"];

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn timed(id: &str, title: &str, start: &str, end: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.into(),
        title: title.into(),
        start: EventTiming::timed(start),
        end: EventTiming::timed(end),
        ..Default::default()
    }
}

fn all_day(id: &str, title: &str, day: &str, next: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.into(),
        title: title.into(),
        start: EventTiming::all_day(day),
        end: EventTiming::all_day(next),
        ..Default::default()
    }
}

fn overlay() -> HolidayOverlay {
    HolidayOverlay {
        enabled: true,
        calendars: HOLIDAYS.iter().map(|s| s.to_string()).collect(),
    }
}

struct Fixture {
    fake: Arc<FakeCalendar>,
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            fake: Arc::new(FakeCalendar::default()),
            dir: TempDir::new().unwrap(),
        }
    }

    fn store(&self) -> CredentialStore {
        CredentialStore::new(self.dir.path().join("session.toml"))
    }

    async fn start(&self, selected: NaiveDate) -> SessionController<Arc<FakeCalendar>> {
        let aggregator = EventAggregator::new(Arc::clone(&self.fake), "primary", overlay(), Tz::UTC);
        SessionController::start(aggregator, self.store(), selected)
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn startup_fetches_day_and_month() {
    let fx = Fixture::new();
    fx.fake.add("primary", timed("a", "Standup", "2024-03-05T09:00:00+00:00", "2024-03-05T09:15:00+00:00"));
    fx.fake.add("primary", timed("b", "Gym", "2024-03-07T18:00:00+00:00", "2024-03-07T19:00:00+00:00"));

    let session = fx.start(date(2024, 3, 5)).await;

    assert_eq!(session.viewing().paged, YearMonth::new(2024, 3).unwrap());
    assert_eq!(session.day_events().len(), 1);
    assert_eq!(session.day_list().rows()[0].label, "2024-03-05 09:00 - Standup");
    assert_eq!(session.month_index().len(), 2);
}

#[tokio::test]
async fn holiday_fallback_stops_at_first_success() {
    let fx = Fixture::new();
    fx.fake.fail("holiday-a");
    fx.fake.add("holiday-b", all_day("h1", "Samiljeol", "2024-03-01", "2024-03-02"));
    fx.fake.add("holiday-c", all_day("h2", "Never shown", "2024-03-03", "2024-03-04"));

    let session = fx.start(date(2024, 3, 5)).await;

    let first = session.month_index().get(date(2024, 3, 1));
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].title, "Samiljeol");
    assert_eq!(first[0].color_hex, HOLIDAY_COLOR_HEX);
    assert!(session.month_index().get(date(2024, 3, 3)).is_empty());

    let listed = fx.fake.listed();
    assert!(listed.contains(&"holiday-a".to_string()));
    assert!(listed.contains(&"holiday-b".to_string()));
    assert!(!listed.contains(&"holiday-c".to_string()));
}

#[tokio::test]
async fn unreachable_holidays_do_not_block_the_month() {
    let fx = Fixture::new();
    for id in HOLIDAYS {
        fx.fake.fail(id);
    }
    fx.fake.add("primary", timed("a", "Standup", "2024-03-05T09:00:00+00:00", "2024-03-05T09:15:00+00:00"));

    let mut session = fx.start(date(2024, 3, 5)).await;
    assert_eq!(session.month_index().len(), 1);

    session.apply(Action::NavigateMonth(1)).await.unwrap();
    assert!(session.month_index().is_empty());
}

#[tokio::test]
async fn create_refreshes_day_and_month() {
    let fx = Fixture::new();
    let mut session = fx.start(date(2024, 3, 5)).await;
    fx.fake.clear_calls();

    let mut draft = EventDraft::for_date(date(2024, 3, 5));
    draft.title = "Dentist".into();
    let transition = session.submit(None, draft).await.unwrap();

    assert_eq!(transition, Transition::Stay);
    let calls = fx.fake.calls();
    assert_eq!(calls[0], "insert primary");
    assert_eq!(calls[1], "list primary");
    assert_eq!(calls[2], "list primary");

    assert_eq!(session.day_events().len(), 1);
    assert_eq!(session.day_list().rows()[0].label, "2024-03-05 09:00 - Dentist");
    assert_eq!(session.month_index().get(date(2024, 3, 5))[0].title, "Dentist");
}

#[tokio::test]
async fn edit_and_delete_are_reflected_after_refetch() {
    let fx = Fixture::new();
    fx.fake.add("primary", timed("a", "Standup", "2024-03-05T09:00:00+00:00", "2024-03-05T09:15:00+00:00"));
    let mut session = fx.start(date(2024, 3, 5)).await;

    let existing = session.event("a").cloned().unwrap();
    let mut draft = EventDraft::from_event(&existing, session.tz()).unwrap();
    draft.title = "Daily sync".into();
    session.submit(Some("a".into()), draft).await.unwrap();

    assert_eq!(session.month_index().get(date(2024, 3, 5))[0].title, "Daily sync");
    assert_eq!(fx.fake.stored("primary")[0].title, "Daily sync");

    session.apply(Action::Delete("a".into())).await.unwrap();
    assert!(session.day_events().is_empty());
    assert!(session.month_index().is_empty());
}

#[tokio::test]
async fn failed_mutation_keeps_previous_view() {
    let fx = Fixture::new();
    fx.fake.add("primary", timed("a", "Standup", "2024-03-05T09:00:00+00:00", "2024-03-05T09:15:00+00:00"));
    let mut session = fx.start(date(2024, 3, 5)).await;
    let index_before = session.month_index().clone();

    fx.fake.fail("primary");
    let err = session.apply(Action::Delete("a".into())).await.unwrap_err();
    match err {
        SessionError::Remote(remote) => assert_eq!(remote.status, Some(503)),
        other => panic!("expected a remote error, got {:?}", other),
    }

    assert_eq!(session.month_index(), &index_before);
    assert_eq!(session.day_events().len(), 1);

    fx.fake.recover("primary");
    assert_eq!(fx.fake.stored("primary").len(), 1);
}

#[tokio::test]
async fn busy_day_paints_two_pills() {
    let fx = Fixture::new();
    let mut session = fx.start(date(2024, 3, 12)).await;

    for (i, title) in ["One", "Two", "Three", "Four", "Five"].iter().enumerate() {
        let mut draft = EventDraft::for_date(date(2024, 3, 12));
        draft.title = format!("{} with a rather long title attached", title);
        draft.timing = gridcal_core::DraftTiming::Timed {
            start: date(2024, 3, 12).and_hms_opt(8 + i as u32, 0, 0).unwrap(),
            end: date(2024, 3, 12).and_hms_opt(8 + i as u32, 30, 0).unwrap(),
        };
        session.submit(None, draft).await.unwrap();
    }

    assert_eq!(session.month_index().get(date(2024, 3, 12)).len(), 5);

    let renderer = GridRenderer::default();
    let paint = renderer.paint_cell(date(2024, 3, 12), true, true, session.month_index());
    assert_eq!(paint.pills.len(), MAX_PILLS);
    assert_eq!(paint.pills[0].label, "One with a rather long...");
}

#[derive(Default)]
struct CountingFlow {
    consents: Mutex<u32>,
}

#[async_trait]
impl OAuthFlow for CountingFlow {
    async fn consent(&self) -> Result<Credential, AuthError> {
        *self.consents.lock().unwrap() += 1;
        Ok(Credential::from_tokens("granted".into(), "refresh".into(), 3600))
    }

    async fn refresh(&self, _credential: &Credential) -> Result<Credential, AuthError> {
        Err(AuthError::RefreshFailed("not expected".into()))
    }
}

#[tokio::test]
async fn logout_removes_credential_and_next_start_consents() {
    let fx = Fixture::new();
    let first_run = Authenticator::new(fx.store(), CountingFlow::default());
    first_run.get_valid_credential().await.unwrap();
    assert!(fx.store().exists());

    let mut session = fx.start(date(2024, 3, 5)).await;
    let transition = session.apply(Action::Logout).await.unwrap();

    assert_eq!(transition, Transition::Restart);
    assert!(!fx.store().exists());

    let next_run = Authenticator::new(fx.store(), CountingFlow::default());
    let credential = next_run.get_valid_credential().await.unwrap();
    assert_eq!(credential.access_token, "granted");
    assert!(fx.store().exists());
}
