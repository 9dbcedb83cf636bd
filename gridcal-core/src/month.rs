//! Month paging, the 6x7 month grid, and query windows.

use std::fmt;

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat,
    TimeZone,
};
use chrono_tz::Tz;

/// Number of week rows in a month page.
pub const WEEKS_PER_PAGE: usize = 6;

/// A calendar month, the unit of grid paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        // Reject months chrono can't represent
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(YearMonth { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn first_day_of_next(&self) -> NaiveDate {
        self.offset(1).first_day()
    }

    pub fn days_in_month(&self) -> u32 {
        (self.first_day_of_next() - self.first_day()).num_days() as u32
    }

    /// Move by `delta` whole months, crossing year boundaries.
    pub fn offset(&self, delta: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + delta;
        YearMonth {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The same day-of-month in this month, clamped to its length.
    pub fn clamp_day(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or(self.first_day())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One day cell of a month page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub date: NaiveDate,
    /// False for the leading/trailing days borrowed from adjacent months.
    pub in_month: bool,
}

/// Six Sunday-first weeks covering a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    month: YearMonth,
    cells: Vec<GridCell>,
}

impl MonthGrid {
    pub fn new(month: YearMonth) -> Self {
        let first = month.first_day();
        let lead = first.weekday().num_days_from_sunday() as i64;
        let start = first - Duration::days(lead);

        let cells = start
            .iter_days()
            .take(WEEKS_PER_PAGE * 7)
            .map(|date| GridCell {
                date,
                in_month: month.contains(date),
            })
            .collect();

        MonthGrid { month, cells }
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(7)
    }
}

/// A half-open `[start, end)` query window in local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// `[00:00, 24:00)` of a local day.
    pub fn day(date: NaiveDate, tz: &Tz) -> Self {
        let next = date.succ_opt().unwrap_or(date);
        TimeWindow {
            start: local_midnight(date, tz),
            end: local_midnight(next, tz),
        }
    }

    /// From the first of the month up to the first of the next month.
    pub fn month(month: YearMonth, tz: &Tz) -> Self {
        TimeWindow {
            start: local_midnight(month.first_day(), tz),
            end: local_midnight(month.first_day_of_next(), tz),
        }
    }

    /// RFC3339 lower bound with an explicit offset, e.g. `2024-03-01T00:00:00+09:00`.
    pub fn time_min(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// RFC3339 upper bound with an explicit offset.
    pub fn time_max(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    pub fn contains(&self, instant: &DateTime<FixedOffset>) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

/// Attach a zone to a wall-clock time. Ambiguous times take the earlier
/// instant; times inside a DST gap are read as UTC wall-clock.
pub fn localize(naive: NaiveDateTime, tz: &Tz) -> DateTime<FixedOffset> {
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        .fixed_offset()
}

fn local_midnight(date: NaiveDate, tz: &Tz) -> DateTime<FixedOffset> {
    localize(date.and_time(NaiveTime::MIN), tz)
}
