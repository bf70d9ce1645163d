//! Timestamp formatting for bubbles.

use chrono::{DateTime, Local, TimeZone};

/// Source of the current time.
///
/// The widget reads the clock through this trait so that tests can pin it.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Format the current local time as `HH:MM`.
#[must_use]
pub fn format_time() -> String {
    format_time_at(&SystemClock.now())
}

/// Format an instant as `HH:MM` (24h, no seconds).
#[must_use]
pub fn format_time_at<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M").to_string()
}
