//! Prompts for the event form and confirmations.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use dialoguer::{Confirm, Input, Select};
use gridcal_core::form::{DraftTiming, EventDraft, MAX_REMINDER_MINUTES};
use gridcal_core::palette;
use owo_colors::OwoColorize;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Walk the user through every field of `draft`, prefilled with its current values.
pub fn edit_draft(mut draft: EventDraft) -> Result<EventDraft> {
    draft.title = Input::<String>::new()
        .with_prompt("  Title")
        .with_initial_text(draft.title.clone())
        .allow_empty(true)
        .interact_text()?;

    draft.timing = match draft.timing {
        DraftTiming::Timed { start, end } => {
            let start = prompt_with_retry("  Starts (YYYY-MM-DD HH:MM)", start, DATETIME_FORMAT, parse_datetime)?;
            let end = prompt_with_retry("  Ends (YYYY-MM-DD HH:MM)", end, DATETIME_FORMAT, parse_datetime)?;
            DraftTiming::Timed { start, end }
        }
        DraftTiming::AllDay { start, end } => {
            let start = prompt_with_retry("  First day (YYYY-MM-DD)", start, DATE_FORMAT, parse_date)?;
            let end = prompt_with_retry("  Day after the last (YYYY-MM-DD)", end, DATE_FORMAT, parse_date)?;
            DraftTiming::AllDay { start, end }
        }
    };

    let minutes: i64 = Input::new()
        .with_prompt(format!("  Reminder, minutes before (0-{}, 0 for none)", MAX_REMINDER_MINUTES))
        .default(draft.reminder_minutes() as i64)
        .interact_text()?;
    draft.set_reminder_minutes(minutes);

    draft.description = Input::<String>::new()
        .with_prompt("  Description (skip)")
        .with_initial_text(draft.description.clone())
        .allow_empty(true)
        .interact_text()?;

    let colors: Vec<_> = palette::selectable().collect();
    let names: Vec<&str> = colors.iter().map(|e| e.name).collect();
    let current = colors
        .iter()
        .position(|e| e.code == draft.color_id())
        .unwrap_or(0);
    let selection = Select::new()
        .with_prompt("  Color")
        .items(&names)
        .default(current)
        .interact()?;
    if let Some(entry) = colors.get(selection) {
        draft.set_color(entry.code);
    }

    Ok(draft)
}

/// Prompt with a prefilled value, asking again until `parse` accepts the input.
fn prompt_with_retry<T, F>(prompt: &str, current: T, format: &str, parse: F) -> Result<T>
where
    T: Copy + FormatWith,
    F: Fn(&str) -> Result<T>,
{
    loop {
        let input: String = Input::new()
            .with_prompt(prompt)
            .with_initial_text(current.format_with(format))
            .interact_text()?;
        match parse(&input) {
            Ok(value) => return Ok(value),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}

trait FormatWith {
    fn format_with(&self, format: &str) -> String;
}

impl FormatWith for NaiveDateTime {
    fn format_with(&self, format: &str) -> String {
        self.format(format).to_string()
    }
}

impl FormatWith for NaiveDate {
    fn format_with(&self, format: &str) -> String {
        self.format(format).to_string()
    }
}

pub fn parse_datetime(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), DATETIME_FORMAT)
        .with_context(|| format!("'{}' is not a date and time like 2024-03-05 14:30", input.trim()))
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .with_context(|| format!("'{}' is not a date like 2024-03-05", input.trim()))
}

/// Ask for a date, prefilled with `current`.
pub fn pick_date(current: NaiveDate) -> Result<NaiveDate> {
    prompt_with_retry("  Go to date (YYYY-MM-DD)", current, DATE_FORMAT, parse_date)
}

/// Ask which of `labels` to act on. `None` if the user backs out.
pub fn pick_row(prompt: &str, labels: &[String]) -> Result<Option<usize>> {
    let mut items: Vec<&str> = labels.iter().map(String::as_str).collect();
    items.push("Back");

    let selection = Select::new()
        .with_prompt(format!("  {}", prompt))
        .items(&items)
        .default(0)
        .interact()?;

    Ok((selection < labels.len()).then_some(selection))
}

/// Block until the user presses enter.
pub fn acknowledge() -> Result<()> {
    Input::<String>::new()
        .with_prompt("  Press enter to continue")
        .allow_empty(true)
        .report(false)
        .interact_text()?;
    Ok(())
}

pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(format!("  {}", prompt))
        .default(false)
        .interact()?)
}
