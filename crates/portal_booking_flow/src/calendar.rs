// --- File: crates/portal_booking_flow/src/calendar.rs ---
//! Month grid arithmetic for the booking calendar.

use chrono::{Datelike, Days, Months, NaiveDate};
use portal_common::models::AvailabilityDate;
use std::collections::HashSet;
use std::fmt;

/// Earliest launch meeting, counted in calendar days after the design meeting.
pub const LAUNCH_GAP_DAYS: u64 = 7;

/// A calendar month, always anchored on its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarMonth(NaiveDate);

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// Parses `YYYY-MM`.
    pub fn parse(month: &str) -> Option<Self> {
        NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
            .ok()
            .map(Self)
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .0
            .pred_opt()
            .unwrap_or(self.0)
    }

    pub fn next(&self) -> Self {
        Self(self.0.checked_add_months(Months::new(1)).unwrap_or(self.0))
    }

    pub fn previous(&self) -> Self {
        Self(self.0.checked_sub_months(Months::new(1)).unwrap_or(self.0))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.0.year() && date.month() == self.0.month()
    }

    /// Leading blank cells so day 1 lands under its weekday (Sunday = 0).
    pub fn leading_blanks(&self) -> usize {
        self.0.weekday().num_days_from_sunday() as usize
    }

    /// The cells of a Sunday-first 7-column grid: blanks, then every day of
    /// the month.
    pub fn grid(&self) -> Vec<Option<NaiveDate>> {
        let mut cells = vec![None; self.leading_blanks()];
        cells.extend(self.0.iter_days().take_while(|d| self.contains(*d)).map(Some));
        cells
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// First selectable launch date for a design meeting on `design`.
pub fn launch_min_date(design: NaiveDate) -> NaiveDate {
    design
        .checked_add_days(Days::new(LAUNCH_GAP_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Dates the provider reported as bookable.
pub fn available_set(dates: &[AvailabilityDate]) -> HashSet<NaiveDate> {
    dates
        .iter()
        .filter(|d| d.available)
        .filter_map(|d| parse_date(&d.date))
        .collect()
}

/// A cell can be picked when it is in the shown month, the provider offered
/// it and it is not before `min_date`.
pub fn is_selectable(
    date: NaiveDate,
    view: CalendarMonth,
    available: &HashSet<NaiveDate>,
    min_date: Option<NaiveDate>,
) -> bool {
    view.contains(date) && available.contains(&date) && min_date.map_or(true, |min| date >= min)
}
