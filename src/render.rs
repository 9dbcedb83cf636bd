//! Terminal painting of the month grid and the day list.
//!
//! Cells are drawn from the core `CellPaint` model: each cell is
//! `CellLayout::height` lines tall and `CellLayout::width` columns wide, and
//! pill labels are clipped to the inner width.

use chrono::NaiveDate;
use gridcal_core::grid::{CellLayout, CellPaint, GridRenderer, Overlay, Pill};
use gridcal_core::palette::Rgb;
use gridcal_core::{DayDetailList, MonthEventIndex, YearMonth};
use owo_colors::OwoColorize;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Paint the grid for `month`, followed by the legend line.
pub fn render_month(
    renderer: &GridRenderer,
    month: YearMonth,
    selected: NaiveDate,
    index: &MonthEventIndex,
) -> String {
    let layout = renderer.layout();
    let cells = renderer.paint_month(month, selected, index);
    let width = layout.width as usize;

    let mut lines = Vec::new();

    lines.push(
        WEEKDAYS
            .iter()
            .map(|d| format!("{:^width$}", d, width = width))
            .collect::<Vec<_>>()
            .join(" ")
            .bold()
            .to_string(),
    );

    for week in cells.chunks(7) {
        for row in 0..layout.height {
            let line = week
                .iter()
                .map(|cell| cell_line(cell, layout, row))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(line);
        }
    }

    lines.push(legend(month, selected));
    lines.join("\n")
}

pub fn legend(month: YearMonth, selected: NaiveDate) -> String {
    format!(
        "  {}   {} {}",
        month.to_string().bold(),
        "selected".dimmed(),
        selected.format("%Y-%m-%d")
    )
}

/// One terminal line of one cell, exactly `layout.width` columns wide.
fn cell_line(cell: &CellPaint, layout: &CellLayout, row: u16) -> String {
    let width = layout.width as usize;

    if row < layout.header_height {
        let text = format!(" {:>2}{}", cell.day_number, " ".repeat(width.saturating_sub(3)));
        return match cell.overlay {
            Overlay::None => text.reversed().bold().to_string(),
            Overlay::Light => text,
            Overlay::Dark => text.dimmed().to_string(),
        };
    }

    match cell.pills.iter().find(|p| p.rect.y == row) {
        Some(pill) => {
            let left = " ".repeat(pill.rect.x as usize);
            let right = " ".repeat(width.saturating_sub(pill.rect.x as usize + pill.rect.width as usize));
            format!("{}{}{}", left, pill_span(pill), right)
        }
        None => " ".repeat(width),
    }
}

fn pill_span(pill: &Pill) -> String {
    let text = pad(&clip(&pill.label, pill.rect.width as usize), pill.rect.width as usize);
    let Rgb { r, g, b } = pill.fill;
    let fg = pill.text_color;
    text.on_truecolor(r, g, b)
        .truecolor(fg.r, fg.g, fg.b)
        .to_string()
}

/// Cut `text` to at most `width` characters.
pub fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// Numbered rows with a colored dot; expanded rows show their description.
pub fn render_day_list(date: NaiveDate, list: &DayDetailList) -> String {
    let mut lines = vec![format!("  {}", date.format("%A %Y-%m-%d").to_string().bold())];

    if list.is_empty() {
        lines.push(format!("  {}", "No events".dimmed()));
        return lines.join("\n");
    }

    for (i, row) in list.rows().iter().enumerate() {
        let dot = Rgb::from_hex_or_default(row.color_hex);
        let marker = if row.expanded { "-" } else { "+" };
        lines.push(format!(
            "  {:>2}. {} {} {}",
            i + 1,
            "●".truecolor(dot.r, dot.g, dot.b),
            row.label,
            format!("[{}]", marker).dimmed()
        ));

        if row.expanded {
            for text in row.description.lines() {
                lines.push(format!("        {}", text.dimmed()));
            }
        }
    }

    lines.join("\n")
}
