//! The interactive loop: draw, ask for the next action, apply it.

use anyhow::Result;
use chrono::Duration;
use dialoguer::Select;
use gridcal_core::grid::GridRenderer;
use gridcal_core::{
    Action, EventDraft, RemoteCalendar, SessionController, SessionError, Transition,
};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::dialogs;
use crate::render;
use crate::utils::tui::with_spinner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    /// Logged out; the process should start over.
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    PreviousDay,
    NextDay,
    PickDate,
    PreviousMonth,
    NextMonth,
    ToggleDetails,
    NewEvent,
    EditEvent,
    DeleteEvent,
    Logout,
    Quit,
}

const MENU: [MenuItem; 11] = [
    MenuItem::NextDay,
    MenuItem::PreviousDay,
    MenuItem::PickDate,
    MenuItem::NextMonth,
    MenuItem::PreviousMonth,
    MenuItem::ToggleDetails,
    MenuItem::NewEvent,
    MenuItem::EditEvent,
    MenuItem::DeleteEvent,
    MenuItem::Logout,
    MenuItem::Quit,
];

impl MenuItem {
    fn label(&self) -> &'static str {
        match self {
            MenuItem::PreviousDay => "Previous day",
            MenuItem::NextDay => "Next day",
            MenuItem::PickDate => "Go to date...",
            MenuItem::PreviousMonth => "Previous month",
            MenuItem::NextMonth => "Next month",
            MenuItem::ToggleDetails => "Show/hide event details",
            MenuItem::NewEvent => "New event",
            MenuItem::EditEvent => "Edit event",
            MenuItem::DeleteEvent => "Delete event",
            MenuItem::Logout => "Log out",
            MenuItem::Quit => "Quit",
        }
    }
}

pub async fn run<C: RemoteCalendar>(mut session: SessionController<C>) -> Result<Exit> {
    let renderer = GridRenderer::default();
    let labels: Vec<&str> = MENU.iter().map(MenuItem::label).collect();
    let mut last = 0;

    loop {
        draw(&renderer, &session);

        last = Select::new()
            .with_prompt("  What next?")
            .items(&labels)
            .default(last)
            .interact()?;
        let item = MENU[last];
        debug!("Menu: {:?}", item);

        let selected = session.viewing().selected;
        let outcome = match item {
            MenuItem::Quit => return Ok(Exit::Quit),
            MenuItem::PreviousDay => apply(&mut session, Action::SelectDate(selected - Duration::days(1))).await,
            MenuItem::NextDay => apply(&mut session, Action::SelectDate(selected + Duration::days(1))).await,
            MenuItem::PickDate => {
                let date = dialogs::pick_date(selected)?;
                apply(&mut session, Action::SelectDate(date)).await
            }
            MenuItem::PreviousMonth => apply(&mut session, Action::NavigateMonth(-1)).await,
            MenuItem::NextMonth => apply(&mut session, Action::NavigateMonth(1)).await,
            MenuItem::ToggleDetails => {
                if let Some(row) = pick_event(&session, "Show or hide which event?")? {
                    session.day_list_mut().toggle(row);
                }
                Ok(Transition::Stay)
            }
            MenuItem::NewEvent => {
                let draft = dialogs::edit_draft(EventDraft::for_date(selected))?;
                with_spinner("Creating event...", session.submit(None, draft)).await
            }
            MenuItem::EditEvent => match pick_event(&session, "Edit which event?")? {
                Some(row) => edit_event(&mut session, row).await?,
                None => Ok(Transition::Stay),
            },
            MenuItem::DeleteEvent => match pick_event(&session, "Delete which event?")? {
                Some(row) => delete_event(&mut session, row).await?,
                None => Ok(Transition::Stay),
            },
            MenuItem::Logout => {
                if dialogs::confirm("Log out and sign in again?")? {
                    apply(&mut session, Action::Logout).await
                } else {
                    Ok(Transition::Stay)
                }
            }
        };

        match outcome {
            Ok(Transition::Stay) => {}
            Ok(Transition::Restart) => return Ok(Exit::Restart),
            Err(e) => notice(&e)?,
        }
    }
}

fn draw<C: RemoteCalendar>(renderer: &GridRenderer, session: &SessionController<C>) {
    let viewing = session.viewing();

    println!();
    println!(
        "{}",
        render::render_month(renderer, viewing.paged, viewing.selected, session.month_index())
    );
    println!();
    println!("{}", render::render_day_list(viewing.selected, session.day_list()));
    println!();
}

async fn apply<C: RemoteCalendar>(
    session: &mut SessionController<C>,
    action: Action,
) -> Result<Transition, SessionError> {
    with_spinner("Loading...", session.apply(action)).await
}

/// Ask which of the selected day's events to act on.
fn pick_event<C: RemoteCalendar>(session: &SessionController<C>, prompt: &str) -> Result<Option<usize>> {
    let labels: Vec<String> = session
        .day_list()
        .rows()
        .iter()
        .map(|row| row.label.clone())
        .collect();

    if labels.is_empty() {
        println!("  {}", "No events on this day".dimmed());
        return Ok(None);
    }

    dialogs::pick_row(prompt, &labels)
}

async fn edit_event<C: RemoteCalendar>(
    session: &mut SessionController<C>,
    row: usize,
) -> Result<Result<Transition, SessionError>> {
    let Some(event) = session.day_events().get(row).cloned() else {
        return Ok(Ok(Transition::Stay));
    };

    let draft = match EventDraft::from_event(&event, session.tz()) {
        Ok(draft) => draft,
        Err(e) => {
            println!("  {}", format!("Can't edit this event: {}", e).red());
            return Ok(Ok(Transition::Stay));
        }
    };

    let draft = dialogs::edit_draft(draft)?;
    Ok(with_spinner("Saving event...", session.submit(Some(event.id.clone()), draft)).await)
}

async fn delete_event<C: RemoteCalendar>(
    session: &mut SessionController<C>,
    row: usize,
) -> Result<Result<Transition, SessionError>> {
    let Some(event) = session.day_events().get(row).cloned() else {
        return Ok(Ok(Transition::Stay));
    };

    if !dialogs::confirm(&format!("Delete \"{}\"?", event.display_title()))? {
        return Ok(Ok(Transition::Stay));
    }

    Ok(with_spinner("Deleting event...", session.apply(Action::Delete(event.id))).await)
}

/// Show a failed action and wait until the user has read it. The view is
/// whatever it was before the action.
fn notice(err: &SessionError) -> Result<()> {
    let text = notice_text(err);
    println!();
    match err {
        SessionError::Form(_) | SessionError::Unrefreshed { .. } => println!("  {}", text.yellow()),
        _ => eprintln!("  {}", text.red()),
    }
    dialogs::acknowledge()
}

fn notice_text(err: &SessionError) -> String {
    match err {
        SessionError::Form(e) => format!("{}; nothing was saved", e),
        SessionError::Unrefreshed { .. } => format!("{}. Pick the day again to reload it.", err),
        other => format!("{}; nothing was changed", other),
    }
}
