//! Civil-date helpers.
//!
//! Every date in the model is a plain `YYYY-MM-DD` calendar date with no time
//! of day or zone.

use chrono::{Datelike, NaiveDate};

use crate::error::DateError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string, naming `field` in the error.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| DateError::Invalid {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Parse a `YYYY-MM` string into the first day of that month.
pub fn parse_month(value: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), DATE_FORMAT)
        .map_err(|_| DateError::InvalidMonth(value.to_string()))
}

/// `YYYYMMDD`, used for instance ids.
pub fn compact(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Weekday number with Sunday = 0 and Saturday = 6.
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Signed number of days from `start` to `end`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let first = start_of_month(date);
    first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// December 31st of the year containing `date`.
pub fn end_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}
