//! Time keeping helpers and text formatting for the watchface labels

use core::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Minutes past the quarter hour at which minute history is complete
const BACKFILL_MINUTE: u32 = 1;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Clock reading captured on a minute tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimeSnapshot {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl From<NaiveDateTime> for TimeSnapshot {
    fn from(time: NaiveDateTime) -> Self {
        Self {
            day: time.day() as u8,
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
        }
    }
}

/// Whether minute history should be fetched at this minute.
///
/// Minute data becomes available in 15 minute batches, one minute after
/// each quarter hour is the first point at which a batch is complete.
pub fn backfill_due(minute: u32) -> bool {
    minute % 15 == BACKFILL_MINUTE
}

/// Hours and minutes, hour padded with a space: `" 9:05"`
#[derive(Debug, Clone, Copy)]
pub struct TimeText {
    hour: u32,
    minute: u32,
}

impl TimeText {
    pub fn new(time: &NaiveDateTime, clock_24h: bool) -> Self {
        let hour = if clock_24h {
            time.hour()
        } else {
            match time.hour() % 12 {
                0 => 12,
                hour => hour,
            }
        };
        Self {
            hour,
            minute: time.minute(),
        }
    }
}

impl fmt::Display for TimeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>2}:{:02}", self.hour, self.minute)
    }
}

/// Short weekday, month and day: `"Fri, Oct 16"`
#[derive(Debug, Clone, Copy)]
pub struct DateText {
    weekday: usize,
    month: usize,
    day: u32,
}

impl DateText {
    pub fn new(time: &NaiveDateTime) -> Self {
        Self {
            weekday: time.weekday().num_days_from_monday() as usize,
            month: time.month0() as usize,
            day: time.day(),
        }
    }
}

impl fmt::Display for DateText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} {:>2}",
            WEEKDAYS[self.weekday % 7],
            MONTHS[self.month % 12],
            self.day
        )
    }
}

/// Sleep duration: `"7h 30m"`
#[derive(Debug, Clone, Copy)]
pub struct SleepText {
    seconds: u32,
}

impl SleepText {
    pub fn new(seconds: u32) -> Self {
        Self { seconds }
    }
}

impl fmt::Display for SleepText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.seconds / 3_600;
        let minutes = (self.seconds % 3_600) / 60;
        write!(f, "{}h {}m", hours, minutes)
    }
}
