//! Weekly operating hours and the "opening soon / closing soon" matcher.
//!
//! Hours arrive from the directory as a compact string such as
//! `"Mon: 09:00 AM - 05:00 PM, Tue: 09:00 AM - 05:00 PM, Sun: Closed"`.
//! Parsing is lossy: a malformed entry is dropped on its own and the rest
//! of the week survives. A day with no entry is closed all day.
//!
//! Overnight ranges (close not after open) are kept as parsed but always
//! classify as [`StatusKind::None`].

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::proximity::error::ScheduleError;

/// Open and close wall-clock times for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl DayHours {
    /// `false` for ranges that would span midnight.
    pub fn is_same_day(&self) -> bool {
        self.close > self.open
    }
}

/// Day-of-week → opening hours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: HashMap<Weekday, DayHours>,
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the comma-separated encoding, skipping entries that fail.
    pub fn parse(encoded: &str) -> Self {
        let mut schedule = Self::new();

        for entry in encoded.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match parse_entry(entry) {
                Ok(Some((day, hours))) => schedule.insert(day, hours),
                Ok(None) => {}
                Err(err) => tracing::debug!("Skipping hours entry: {}", err),
            }
        }

        schedule
    }

    pub fn insert(&mut self, day: Weekday, hours: DayHours) {
        self.days.insert(day, hours);
    }

    pub fn hours_for(&self, day: Weekday) -> Option<&DayHours> {
        self.days.get(&day)
    }

    /// Number of days with opening hours.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Parse one `"Day: HH:MM AM - HH:MM PM"` entry.
///
/// Returns `Ok(None)` for an explicit `"Day: Closed"`.
pub fn parse_entry(entry: &str) -> Result<Option<(Weekday, DayHours)>, ScheduleError> {
    let (day, range) = entry.split_once(':').ok_or_else(|| ScheduleError::MissingDay {
        entry: entry.to_string(),
    })?;

    let day = day.trim();
    let weekday = day
        .parse::<Weekday>()
        .map_err(|_| ScheduleError::UnknownDay { day: day.to_string() })?;

    let range = range.trim();
    if range.eq_ignore_ascii_case("closed") {
        return Ok(None);
    }

    let (open, close) = range.split_once('-').ok_or_else(|| ScheduleError::MissingRange {
        entry: entry.to_string(),
    })?;

    let hours = DayHours {
        open: parse_clock_time(open)?,
        close: parse_clock_time(close)?,
    };

    Ok(Some((weekday, hours)))
}

/// Parse a 12-hour clock time.
///
/// Accepted grammar: `H:MM P` or `HH:MM P`, where the hour is 1-12 (a
/// leading zero is allowed), the minutes are exactly two digits 00-59, and
/// `P` is `AM` or `PM` in any letter case, separated by whitespace.
/// `9:05 pm` and `09:05 PM` both parse; `9:5 PM`, `13:00 PM` and `0900` do not.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime, ScheduleError> {
    let invalid = || ScheduleError::InvalidTime { value: raw.trim().to_string() };

    let (clock, period) = raw.trim().rsplit_once(char::is_whitespace).ok_or_else(invalid)?;
    let (hour, minute) = clock.trim_end().split_once(':').ok_or_else(invalid)?;

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 || !all_digits(hour) || !all_digits(minute) {
        return Err(invalid());
    }

    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(invalid());
    }

    let hour = match period.to_ascii_uppercase().as_str() {
        "AM" => hour % 12,
        "PM" => hour % 12 + 12,
        _ => return Err(invalid()),
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Display form used in notification text, e.g. `9:00 AM`.
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Classification of a point of interest at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    OpeningSoon,
    ClosingSoon,
    CurrentlyOpen,
    None,
}

impl StatusKind {
    /// Stable label used in notification payloads and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::OpeningSoon => "opening_soon",
            StatusKind::ClosingSoon => "closing_soon",
            StatusKind::CurrentlyOpen => "currently_open",
            StatusKind::None => "none",
        }
    }
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleStatus {
    pub should_notify: bool,
    pub kind: StatusKind,
    pub message: String,
}

impl ScheduleStatus {
    fn none() -> Self {
        Self {
            should_notify: false,
            kind: StatusKind::None,
            message: String::new(),
        }
    }

    fn notify(kind: StatusKind, message: String) -> Self {
        Self {
            should_notify: true,
            kind,
            message,
        }
    }
}

/// Classify `now` (local wall-clock) against today's hours in `schedule`.
///
/// First match wins: opening soon, closing soon, currently open, none.
pub fn classify(
    schedule: &WeeklySchedule,
    now: NaiveDateTime,
    opening_soon_window_min: u32,
    closing_soon_window_min: u32,
) -> ScheduleStatus {
    let Some(hours) = schedule.hours_for(now.weekday()) else {
        return ScheduleStatus::none();
    };
    if !hours.is_same_day() {
        return ScheduleStatus::none();
    }

    let today = now.date();
    let open = today.and_time(hours.open);
    let close = today.and_time(hours.close);
    let opening_soon = open - Duration::minutes(i64::from(opening_soon_window_min));
    let closing_soon = close - Duration::minutes(i64::from(closing_soon_window_min));

    let is_open = now >= open && now < close;

    if !is_open && now >= opening_soon && now < open {
        ScheduleStatus::notify(
            StatusKind::OpeningSoon,
            format!("Opens at {}", format_clock_time(hours.open)),
        )
    } else if is_open && now >= closing_soon {
        ScheduleStatus::notify(
            StatusKind::ClosingSoon,
            format!("Closes at {}", format_clock_time(hours.close)),
        )
    } else if is_open {
        ScheduleStatus::notify(
            StatusKind::CurrentlyOpen,
            format!("Open now until {}", format_clock_time(hours.close)),
        )
    } else {
        ScheduleStatus::none()
    }
}
