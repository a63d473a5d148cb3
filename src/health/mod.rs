//! Health data access
//!
//! The watchface only needs three things from a health source: today's
//! step total, last night's sleep and a minute-by-minute step history for
//! the past hour.

pub mod pedometer;
pub mod recorder;

use chrono::NaiveDateTime;

use crate::error::Error;

/// Metrics a health source can sum up for today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HealthMetric {
    StepCount,
    SleepSeconds,
}

/// Notifications from a health source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HealthEvent {
    /// Several metrics changed at once, e.g. after a history sync
    SignificantUpdate,
    /// Steps were taken
    MovementUpdate,
    SleepUpdate,
}

/// Activity recorded during one minute
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MinuteRecord {
    pub steps: u32,
}

/// Source of health data for the watchface
pub trait HealthService {
    /// Total of `metric` since midnight.
    ///
    /// Returns [`Error::HealthUnavailable`] when nothing was recorded today.
    fn sum_today(&mut self, metric: HealthMetric, now: NaiveDateTime) -> Result<u32, Error>;

    /// Fill `out` with per-minute records for the hour ending at `now`,
    /// oldest first, and return how many records were written.
    ///
    /// The first record belongs to the minute after the current minute one
    /// hour ago. Sources may stop early when the most recent minutes are
    /// not available yet.
    fn minute_history(&mut self, now: NaiveDateTime, out: &mut [MinuteRecord]) -> usize;
}

/// Sum of `metric` for today, zero when the source has no data
pub fn sum_or_zero<H>(health: &mut H, metric: HealthMetric, now: NaiveDateTime) -> u32
where
    H: HealthService + ?Sized,
{
    match health.sum_today(metric, now) {
        Ok(total) => {
            debug!("Health total: {}", total);
            total
        }
        Err(_) => {
            error!("Health data unavailable");
            0
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    /// Health source with scripted values
    #[derive(Debug, Default)]
    pub struct FakeHealth {
        pub steps: Option<u32>,
        pub sleep: Option<u32>,
        pub history: Vec<MinuteRecord>,
        pub history_requests: usize,
    }

    impl FakeHealth {
        pub fn with_steps(steps: u32) -> Self {
            Self {
                steps: Some(steps),
                ..Default::default()
            }
        }
    }

    impl HealthService for FakeHealth {
        fn sum_today(&mut self, metric: HealthMetric, _now: NaiveDateTime) -> Result<u32, Error> {
            match metric {
                HealthMetric::StepCount => self.steps,
                HealthMetric::SleepSeconds => self.sleep,
            }
            .ok_or(Error::HealthUnavailable)
        }

        fn minute_history(&mut self, _now: NaiveDateTime, out: &mut [MinuteRecord]) -> usize {
            self.history_requests += 1;
            let count = self.history.len().min(out.len());
            out[..count].copy_from_slice(&self.history[..count]);
            count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeHealth;
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_unavailable_maps_to_zero() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let mut health = FakeHealth::with_steps(1234);

        assert_eq!(sum_or_zero(&mut health, HealthMetric::StepCount, now), 1234);
        assert_eq!(sum_or_zero(&mut health, HealthMetric::SleepSeconds, now), 0);
    }
}
