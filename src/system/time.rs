//! Time keeping module for PineTime

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use embassy_time::Instant;

/// Local clock time paired with the system time it was taken at
#[derive(Clone, Copy)]
pub struct TimeReference {
    /// Clock time
    time: NaiveDateTime,
    /// Related system time
    instant: Instant,
}

impl TimeReference {
    /// Create new time reference from NaiveDateTime
    pub fn from_datetime(time: NaiveDateTime) -> Self {
        Self {
            time,
            instant: Instant::now(),
        }
    }

    /// Create new time reference from a Unix timestamp and a UTC offset in seconds
    pub fn from_epoch(secs: i64, offset: i32) -> Option<Self> {
        let time = DateTime::from_timestamp(secs + offset as i64, 0)?.naive_utc();
        Some(Self::from_datetime(time))
    }

    /// Create new time reference from Current Time Service data
    pub fn from_cts_bytes(bytes: &[u8]) -> Option<Self> {
        let year = u16::from_le_bytes(bytes.get(..2)?.try_into().ok()?) as i32;
        let month = *bytes.get(2)? as u32;
        let day = *bytes.get(3)? as u32;
        let hour = *bytes.get(4)? as u32;
        let min = *bytes.get(5)? as u32;
        let sec = *bytes.get(6)? as u32;
        // Byte 7 is the day of the week
        let milli = *bytes.get(8)? as u32 * 1000 / 256; // Convert fractions_256 to milliseconds

        let time = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_milli_opt(hour, min, sec, milli)?;
        Some(Self::from_datetime(time))
    }
}

pub struct TimeManager {
    reference: TimeReference,
}

impl TimeManager {
    /// Start counting from `reference`
    pub fn new(reference: TimeReference) -> Self {
        Self { reference }
    }

    /// Get current time
    pub fn now(&self) -> NaiveDateTime {
        let elapsed = Instant::now().duration_since(self.reference.instant);
        self.reference.time + Duration::microseconds(elapsed.as_micros() as i64)
    }

    /// Update time reference
    pub fn set_time(&mut self, reference: TimeReference) {
        defmt::info!("Time set to {}", defmt::Display2Format(&reference.time));
        self.reference = reference;
    }
}
