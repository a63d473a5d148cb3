//! Per-minute step history on top of a cumulative step counter

use chrono::{NaiveDate, NaiveDateTime};

use super::{HealthEvent, HealthMetric, HealthService, MinuteRecord};
use crate::activity::MINUTES_PER_HOUR;
use crate::error::Error;

#[derive(Debug, Clone, Copy)]
struct MinuteSlot {
    /// Minutes since the Unix epoch
    minute: i64,
    steps: u32,
}

/// Health source fed from a step counter that only ever counts up.
///
/// Call [`StepRecorder::update`] regularly (every second is plenty) with the
/// counter's current value. Finished minutes are kept for one hour, the day
/// total restarts at midnight. Sleep is not measured.
///
/// Minute history is only reported once it covers a whole hour window, so
/// the dial shows no data rather than an idle hour right after boot.
#[derive(Debug, Clone)]
pub struct StepRecorder {
    /// Day the baseline belongs to
    day: Option<NaiveDate>,
    /// Counter value at the start of `day`
    day_baseline: u32,
    /// Latest counter value
    latest_total: u32,
    /// Minute of the first sample, nothing is known before it
    first_minute: Option<i64>,
    /// Minute currently being accumulated
    current_minute: Option<i64>,
    /// Counter value when `current_minute` started
    minute_start_total: u32,
    history: [Option<MinuteSlot>; MINUTES_PER_HOUR],
}

impl Default for StepRecorder {
    fn default() -> Self {
        Self::new()
    }
}

fn epoch_minute(time: &NaiveDateTime) -> i64 {
    time.and_utc().timestamp().div_euclid(60)
}

fn slot_index(minute: i64) -> usize {
    minute.rem_euclid(MINUTES_PER_HOUR as i64) as usize
}

impl StepRecorder {
    pub const fn new() -> Self {
        Self {
            day: None,
            day_baseline: 0,
            latest_total: 0,
            first_minute: None,
            current_minute: None,
            minute_start_total: 0,
            history: [None; MINUTES_PER_HOUR],
        }
    }

    /// Record the counter value at `now`.
    ///
    /// Returns [`HealthEvent::MovementUpdate`] when steps were taken since the
    /// previous update.
    pub fn update(&mut self, now: NaiveDateTime, total: u32) -> Option<HealthEvent> {
        let minute = epoch_minute(&now);

        match self.current_minute {
            Some(current) if current == minute => {}
            Some(current) => {
                let steps = self.latest_total.saturating_sub(self.minute_start_total);
                self.history[slot_index(current)] = Some(MinuteSlot {
                    minute: current,
                    steps,
                });
                self.current_minute = Some(minute);
                self.minute_start_total = self.latest_total;
            }
            None => {
                self.first_minute = Some(minute);
                self.current_minute = Some(minute);
                self.minute_start_total = total;
                self.latest_total = total;
            }
        }

        if self.day != Some(now.date()) {
            if self.day.is_some() {
                info!("New day, resetting step total");
            }
            self.day = Some(now.date());
            self.day_baseline = self.latest_total;
        }

        let moved = total > self.latest_total;
        self.latest_total = total;
        moved.then_some(HealthEvent::MovementUpdate)
    }

    fn steps_in(&self, minute: i64) -> u32 {
        match self.history[slot_index(minute)] {
            Some(slot) if slot.minute == minute => slot.steps,
            _ => 0,
        }
    }
}

impl HealthService for StepRecorder {
    fn sum_today(&mut self, metric: HealthMetric, now: NaiveDateTime) -> Result<u32, Error> {
        match (metric, self.day) {
            (HealthMetric::StepCount, Some(day)) if day == now.date() => {
                Ok(self.latest_total.saturating_sub(self.day_baseline))
            }
            // Nothing counted yet since midnight
            (HealthMetric::StepCount, Some(_)) => Ok(0),
            _ => Err(Error::HealthUnavailable),
        }
    }

    fn minute_history(&mut self, now: NaiveDateTime, out: &mut [MinuteRecord]) -> usize {
        // Only finished minutes are history
        let (Some(first_seen), Some(current)) = (self.first_minute, self.current_minute) else {
            return 0;
        };
        let last_finished = current - 1;
        let first = epoch_minute(&now) - (MINUTES_PER_HOUR as i64 - 1);
        if first < first_seen {
            debug!("Minute history incomplete, {} minutes recorded", current - first_seen);
            return 0;
        }

        let mut count = 0;
        for (minute, record) in (first..=last_finished).zip(out.iter_mut()) {
            *record = MinuteRecord {
                steps: self.steps_in(minute),
            };
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(hour, min, sec)
            .unwrap()
    }

    #[test]
    fn test_no_data_before_first_update() {
        let mut recorder = StepRecorder::new();
        let mut out = [MinuteRecord::default(); 60];
        assert_eq!(
            recorder.sum_today(HealthMetric::StepCount, at(8, 0, 0)),
            Err(Error::HealthUnavailable)
        );
        assert_eq!(recorder.minute_history(at(8, 0, 0), &mut out), 0);
    }

    #[test]
    fn test_counts_steps_since_first_sample() {
        let mut recorder = StepRecorder::new();
        assert_eq!(recorder.update(at(8, 0, 0), 5_000), None);
        assert_eq!(
            recorder.update(at(8, 0, 10), 5_020),
            Some(HealthEvent::MovementUpdate)
        );
        assert_eq!(recorder.update(at(8, 0, 11), 5_020), None);
        assert_eq!(
            recorder.sum_today(HealthMetric::StepCount, at(8, 0, 11)),
            Ok(20)
        );
        assert_eq!(
            recorder.sum_today(HealthMetric::SleepSeconds, at(8, 0, 11)),
            Err(Error::HealthUnavailable)
        );
    }

    #[test]
    fn test_no_history_right_after_first_sample() {
        let mut recorder = StepRecorder::new();
        let mut out = [MinuteRecord::default(); 60];
        recorder.update(at(8, 0, 0), 0);
        assert_eq!(recorder.minute_history(at(8, 0, 0), &mut out), 0);

        recorder.update(at(8, 58, 0), 100);
        assert_eq!(recorder.minute_history(at(8, 58, 0), &mut out), 0);

        // The window starting 8:00 is fully recorded
        recorder.update(at(8, 59, 0), 100);
        assert_eq!(recorder.minute_history(at(8, 59, 0), &mut out), 59);
        assert_eq!(out[58].steps, 100);
    }

    #[test]
    fn test_minute_history_covers_finished_minutes() {
        let mut recorder = StepRecorder::new();
        recorder.update(at(7, 0, 0), 0);
        recorder.update(at(8, 0, 0), 0);
        recorder.update(at(8, 0, 30), 40);
        recorder.update(at(8, 1, 0), 45);
        recorder.update(at(8, 1, 59), 45);
        recorder.update(at(8, 2, 5), 100);

        let mut out = [MinuteRecord::default(); 60];
        let count = recorder.minute_history(at(8, 2, 5), &mut out);

        // Window starts at 7:03, history is complete up to 8:01
        assert_eq!(count, 59);
        assert_eq!(out[57].steps, 40);
        assert_eq!(out[58].steps, 5);
        assert!(out[..57].iter().all(|record| record.steps == 0));
    }

    #[test]
    fn test_minute_history_respects_buffer() {
        let mut recorder = StepRecorder::new();
        recorder.update(at(7, 0, 0), 0);
        recorder.update(at(8, 30, 0), 10);

        let mut out = [MinuteRecord::default(); 10];
        assert_eq!(recorder.minute_history(at(8, 30, 0), &mut out), 10);
    }

    #[test]
    fn test_old_minutes_are_forgotten() {
        let mut recorder = StepRecorder::new();
        recorder.update(at(8, 0, 0), 0);
        recorder.update(at(8, 0, 30), 60);
        recorder.update(at(9, 5, 0), 60);

        let mut out = [MinuteRecord::default(); 60];
        let count = recorder.minute_history(at(9, 5, 0), &mut out);
        assert_eq!(count, 60 - 1);
        assert!(out[..count].iter().all(|record| record.steps == 0));
    }

    #[test]
    fn test_total_restarts_at_midnight() {
        let mut recorder = StepRecorder::new();
        recorder.update(at(23, 59, 50), 1_000);
        recorder.update(at(23, 59, 55), 1_200);

        let tomorrow = NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(0, 0, 5)
            .unwrap();
        assert_eq!(recorder.sum_today(HealthMetric::StepCount, tomorrow), Ok(0));

        recorder.update(tomorrow, 1_230);
        assert_eq!(recorder.sum_today(HealthMetric::StepCount, tomorrow), Ok(30));
    }
}
