//! Calendar-month helpers for the monthly projection grid

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{ModelError, Result};

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Whole calendar months from `from` to `to`; negative when `to` is earlier
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let years = i64::from(to.year()) - i64::from(from.year());
    let months = i64::from(to.month()) - i64::from(from.month());
    years * 12 + months
}

/// `count` consecutive month starts beginning at the month of `start`
pub fn month_sequence(start: NaiveDate, count: u32) -> Result<Vec<NaiveDate>> {
    let first = month_start(start);
    (0..count)
        .map(|offset| {
            first
                .checked_add_months(Months::new(offset))
                .ok_or_else(|| ModelError::DateOutOfRange(format!("{} + {} months", first, offset)))
        })
        .collect()
}

/// Parse a `YYYY-MM` (or full `YYYY-MM-DD`) month
pub fn parse_month(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d"))
        .map(month_start)
        .map_err(|_| ModelError::Parse(format!("expected a YYYY-MM month, got {:?}", text)))
}

/// `YYYY-MM` label used in tables and exports
pub fn month_label(month: NaiveDate) -> String {
    month.format("%Y-%m").to_string()
}
