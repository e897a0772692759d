//! Footer year stamp.

use chrono::{DateTime, Datelike, TimeZone};

/// The year to print in the site footer, always four digits.
#[must_use]
pub fn footer_year<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!("{:04}", now.year())
}
