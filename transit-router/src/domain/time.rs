//! Schedule time handling.
//!
//! GTFS-style feeds give stop times as "HH:MM:SS" strings relative to the
//! service day. Hours may run past 23 for trips that continue after midnight
//! ("25:10:00" is ten past one on the following day). This module turns those
//! strings into date-aware instants.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use std::cmp::Ordering;
use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Largest hour accepted in a service-day time string.
///
/// Feeds use values past 24 for overnight trips; anything beyond two days
/// is treated as corrupt input.
const MAX_SERVICE_HOUR: u32 = 47;

/// A date-aware instant in a transit schedule.
///
/// # Examples
///
/// ```
/// use transit_router::domain::ScheduleTime;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2017, 2, 9).unwrap();
/// let t = ScheduleTime::parse_hhmmss("25:10:00", date).unwrap();
/// assert_eq!(t.to_string(), "01:10:00");
/// assert_eq!(t.date(), NaiveDate::from_ymd_opt(2017, 2, 10).unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleTime {
    date: NaiveDate,
    time: NaiveTime,
}

impl ScheduleTime {
    /// Create a ScheduleTime from hours, minutes and seconds on a date.
    pub fn from_hms(date: NaiveDate, hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, second).map(|time| Self { date, time })
    }

    /// Parse a service-day time in "HH:MM:SS" format.
    ///
    /// Single-digit hours ("8:30:00") are accepted, as many feeds emit them.
    /// Hours of 24 and above roll over onto the following day(s).
    pub fn parse_hhmmss(s: &str, service_date: NaiveDate) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        if h.is_empty() || h.len() > 2 {
            return Err(TimeError::new("invalid hour digits"));
        }
        let hour = parse_digits(h).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > MAX_SERVICE_HOUR {
            return Err(TimeError::new("hour out of range"));
        }

        if m.len() != 2 {
            return Err(TimeError::new("invalid minute digits"));
        }
        let minute = parse_digits(m).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        if sec.len() != 2 {
            return Err(TimeError::new("invalid second digits"));
        }
        let second = parse_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?;
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }

        let midnight = Self::from_hms(service_date, 0, 0, 0)
            .ok_or_else(|| TimeError::new("invalid time"))?;
        let offset = Duration::seconds(i64::from(hour * 3600 + minute * 60 + second));
        midnight
            .checked_add(offset)
            .ok_or_else(|| TimeError::new("date overflow"))
    }

    /// Returns the date component.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    /// Returns the second (0-59).
    pub fn second(&self) -> u32 {
        self.time.second()
    }

    /// Converts to a NaiveDateTime.
    pub fn to_datetime(&self) -> chrono::NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Add a duration, advancing the date when crossing midnight.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        let dt = self.to_datetime().checked_add_signed(duration)?;
        Some(Self {
            date: dt.date(),
            time: dt.time(),
        })
    }

    /// Returns the duration between two times.
    ///
    /// Returns a negative duration if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        self.to_datetime()
            .signed_duration_since(other.to_datetime())
    }

    /// Whole seconds elapsed since `other`, negative if `other` is later.
    pub fn seconds_since(&self, other: Self) -> i64 {
        self.signed_duration_since(other).num_seconds()
    }
}

impl Ord for ScheduleTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_datetime().cmp(&other.to_datetime())
    }
}

impl PartialOrd for ScheduleTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScheduleTime({} {:02}:{:02}:{:02})",
            self.date,
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// Parse a run of ASCII digits into a u32.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Break a number of seconds into (hours, minutes, seconds).
pub fn split_hms(total_seconds: u32) -> (u32, u32, u32) {
    let hours = total_seconds / 3600;
    let rest = total_seconds % 3600;
    (hours, rest / 60, rest % 60)
}
