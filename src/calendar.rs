//! # Calendar Progress
//!
//! Day-of-year arithmetic for the current local date.

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

/// Year progress facts for a single date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalendarFacts {
    pub year: i32,
    /// 1 on January 1st
    pub day_of_year: u32,
    /// 365 or 366
    pub total_days: u32,
    pub remaining_days: u32,
    /// `day_of_year / total_days`, unrounded
    pub progress: f64,
}

impl CalendarFacts {
    /// Facts for today in the server's local time zone.
    pub fn now() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    /// Facts for a fixed date.
    pub fn for_date(date: NaiveDate) -> Self {
        let year = date.year();
        let day_of_year = date.ordinal();
        // Dec 31 is day 366 exactly when the year has one.
        let total_days = match NaiveDate::from_yo_opt(year, 366) {
            Some(_) => 366,
            None => 365,
        };
        let remaining_days = total_days - day_of_year;

        Self {
            year,
            day_of_year,
            total_days,
            remaining_days,
            progress: day_of_year as f64 / total_days as f64,
        }
    }

    /// Progress as a percentage with one decimal, e.g. `"78.9"`.
    pub fn percent_label(&self) -> String {
        format!("{:.1}", self.progress * 100.0)
    }
}
