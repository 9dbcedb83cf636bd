//! Paint model for month grid cells.
//!
//! The renderer is pure: it turns a date, its selection state and the month
//! index into a `CellPaint` in abstract cell units. The front-end decides how
//! those units map onto the screen.

use chrono::{Datelike, NaiveDate};

use crate::aggregator::MonthEventIndex;
use crate::month::{MonthGrid, YearMonth};
use crate::palette::Rgb;

/// Pills drawn per cell at most.
pub const MAX_PILLS: usize = 2;

/// Characters of a title kept on a pill before the ellipsis.
pub const PILL_LABEL_CHARS: usize = 22;

pub const ELLIPSIS: &str = "...";

/// Pill label color, dark for contrast against the palette fills.
pub const LABEL_COLOR: Rgb = Rgb::new(0x20, 0x21, 0x24);

/// Dimming applied over a cell background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    /// The selected date.
    None,
    /// A day of the paged month.
    Light,
    /// A day borrowed from an adjacent month.
    Dark,
}

impl Overlay {
    /// Opacity of the dim layer, out of 255.
    pub fn alpha(&self) -> u8 {
        match self {
            Overlay::None => 0,
            Overlay::Light => 40,
            Overlay::Dark => 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pill {
    pub rect: Rect,
    pub fill: Rgb,
    pub text_color: Rgb,
    pub label: String,
}

/// Everything needed to draw one cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellPaint {
    pub date: NaiveDate,
    pub day_number: u32,
    pub overlay: Overlay,
    pub pills: Vec<Pill>,
}

/// Cell geometry in abstract units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLayout {
    pub width: u16,
    pub height: u16,
    /// Horizontal inset of pills on each side
    pub padding: u16,
    /// Rows reserved for the day number
    pub header_height: u16,
    pub pill_height: u16,
    pub pill_gap: u16,
}

impl Default for CellLayout {
    fn default() -> Self {
        CellLayout {
            width: 18,
            height: 4,
            padding: 1,
            header_height: 1,
            pill_height: 1,
            pill_gap: 0,
        }
    }
}

impl CellLayout {
    pub fn inner_width(&self) -> u16 {
        self.width.saturating_sub(self.padding * 2)
    }

    fn pill_rect(&self, slot: usize) -> Rect {
        let slot = slot as u16;
        Rect {
            x: self.padding,
            y: self.header_height + slot * (self.pill_height + self.pill_gap),
            width: self.inner_width(),
            height: self.pill_height,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GridRenderer {
    layout: CellLayout,
}

impl GridRenderer {
    pub fn new(layout: CellLayout) -> Self {
        GridRenderer { layout }
    }

    pub fn layout(&self) -> &CellLayout {
        &self.layout
    }

    pub fn paint_cell(
        &self,
        date: NaiveDate,
        is_selected: bool,
        in_paged_month: bool,
        index: &MonthEventIndex,
    ) -> CellPaint {
        let overlay = if is_selected {
            Overlay::None
        } else if in_paged_month {
            Overlay::Light
        } else {
            Overlay::Dark
        };

        let pills = if in_paged_month {
            index
                .get(date)
                .iter()
                .take(MAX_PILLS)
                .enumerate()
                .map(|(slot, summary)| Pill {
                    rect: self.layout.pill_rect(slot),
                    fill: Rgb::from_hex_or_default(&summary.color_hex),
                    text_color: LABEL_COLOR,
                    label: truncate_label(&summary.title),
                })
                .collect()
        } else {
            Vec::new()
        };

        CellPaint {
            date,
            day_number: date.day(),
            overlay,
            pills,
        }
    }

    /// Paint all 42 cells of `month`, row-major from the first Sunday.
    pub fn paint_month(
        &self,
        month: YearMonth,
        selected: NaiveDate,
        index: &MonthEventIndex,
    ) -> Vec<CellPaint> {
        MonthGrid::new(month)
            .cells()
            .iter()
            .map(|cell| self.paint_cell(cell.date, cell.date == selected, cell.in_month, index))
            .collect()
    }
}

/// Keep the first `PILL_LABEL_CHARS` characters, marking the cut with an ellipsis.
pub fn truncate_label(title: &str) -> String {
    if title.chars().count() <= PILL_LABEL_CHARS {
        return title.to_string();
    }

    let mut label: String = title.chars().take(PILL_LABEL_CHARS).collect();
    label.push_str(ELLIPSIS);
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::DayEventSummary;
    use crate::palette::{DEFAULT_COLOR_HEX, HOLIDAY_COLOR_HEX};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn summary(title: &str, color_hex: &str) -> DayEventSummary {
        DayEventSummary {
            title: title.into(),
            color_hex: color_hex.into(),
        }
    }

    fn busy_index() -> MonthEventIndex {
        let mut index = MonthEventIndex::default();
        for (i, title) in ["Standup", "Design review", "Lunch", "1:1", "Retro"].iter().enumerate() {
            let color = if i == 1 { HOLIDAY_COLOR_HEX } else { DEFAULT_COLOR_HEX };
            index.push(date(2024, 3, 12), summary(title, color));
        }
        index
    }

    #[test]
    fn at_most_two_pills_in_fetch_order() {
        let renderer = GridRenderer::default();
        let paint = renderer.paint_cell(date(2024, 3, 12), false, true, &busy_index());

        assert_eq!(paint.pills.len(), MAX_PILLS);
        assert_eq!(paint.pills[0].label, "Standup");
        assert_eq!(paint.pills[1].label, "Design review");
        assert_eq!(paint.pills[1].fill, Rgb::from_hex(HOLIDAY_COLOR_HEX).unwrap());
        assert_eq!(paint.pills[0].text_color, LABEL_COLOR);
    }

    #[test]
    fn pills_stack_and_span_inner_width() {
        let renderer = GridRenderer::default();
        let paint = renderer.paint_cell(date(2024, 3, 12), false, true, &busy_index());

        let layout = renderer.layout();
        assert_eq!(paint.pills[0].rect.y, layout.header_height);
        assert_eq!(paint.pills[1].rect.y, layout.header_height + layout.pill_height);
        assert!(paint.pills.iter().all(|p| p.rect.width == layout.inner_width()));
    }

    #[test]
    fn overlay_follows_selection_and_month() {
        let renderer = GridRenderer::default();
        let index = MonthEventIndex::default();
        let day = date(2024, 3, 12);

        assert_eq!(renderer.paint_cell(day, true, true, &index).overlay, Overlay::None);
        assert_eq!(renderer.paint_cell(day, false, true, &index).overlay, Overlay::Light);
        assert_eq!(renderer.paint_cell(day, false, false, &index).overlay, Overlay::Dark);
        assert!(Overlay::Dark.alpha() > Overlay::Light.alpha());
    }

    #[test]
    fn adjacent_month_days_get_no_pills() {
        let renderer = GridRenderer::default();
        let paint = renderer.paint_cell(date(2024, 3, 12), false, false, &busy_index());
        assert!(paint.pills.is_empty());
    }

    #[test]
    fn long_titles_are_truncated() {
        let thirty = "abcdefghijklmnopqrstuvwxyz0123";
        assert_eq!(thirty.chars().count(), 30);
        assert_eq!(truncate_label(thirty), "abcdefghijklmnopqrstuv...");

        assert_eq!(truncate_label("Team lunch"), "Team lunch");
        assert_eq!(truncate_label("exactly-twenty-two-ch."), "exactly-twenty-two-ch.");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let title = "회의".repeat(12);
        let label = truncate_label(&title);
        assert_eq!(label.chars().count(), PILL_LABEL_CHARS + ELLIPSIS.len());
    }

    #[test]
    fn painting_is_deterministic() {
        let renderer = GridRenderer::default();
        let index = busy_index();
        let month = YearMonth::new(2024, 3).unwrap();

        let first = renderer.paint_month(month, date(2024, 3, 12), &index);
        let second = renderer.paint_month(month, date(2024, 3, 12), &index);
        assert_eq!(first, second);
        assert_eq!(first.len(), 42);

        let selected: Vec<_> = first.iter().filter(|c| c.overlay == Overlay::None).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].date, date(2024, 3, 12));
    }
}
