//! Minute activity tracking
//!
//! Maps step counts to dot counts and keeps one dot count per minute of the
//! current hour.

use crate::health::MinuteRecord;

/// Steps needed for each dot above the second one
pub const DOT_STEP_COUNT: u32 = 30;
/// Maximum number of dots stacked at one minute position
pub const MAX_DOTS: u8 = 5;
/// Number of minute positions on the dial
pub const MINUTES_PER_HOUR: usize = 60;

/// Number of dots that correspond to the given step count, between 1 and 5.
///
/// A minute without steps still shows a single dot, any movement shows at
/// least two.
pub fn dots_for_steps(steps: u32) -> u8 {
    if steps == 0 {
        return 1;
    }
    (2 + steps / DOT_STEP_COUNT).min(MAX_DOTS as u32) as u8
}

/// Dot counts for every minute of the hour.
///
/// A slot value of 0 means nothing is known about that minute yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotArray {
    slots: [u8; MINUTES_PER_HOUR],
}

impl Default for DotArray {
    fn default() -> Self {
        Self::new()
    }
}

impl DotArray {
    pub const fn new() -> Self {
        Self {
            slots: [0; MINUTES_PER_HOUR],
        }
    }

    pub fn get(&self, minute: usize) -> u8 {
        self.slots[minute % MINUTES_PER_HOUR]
    }

    pub fn set(&mut self, minute: usize, dots: u8) {
        self.slots[minute % MINUTES_PER_HOUR] = dots.min(MAX_DOTS);
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.slots = [0; MINUTES_PER_HOUR];
    }

    /// Start a fresh minute with a single dot
    pub fn start_minute(&mut self, minute: usize) {
        self.set(minute, 1);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.slots
    }

    /// Fill the dial from minute history.
    ///
    /// `records` are ordered oldest first and cover the hour ending at
    /// `current_minute`, so record `i` belongs to the minute `i + 1` past the
    /// current one an hour ago. Minutes the history does not reach yet and
    /// that lie before the current minute get a single dot. That cleanup does
    /// not wrap past the top of the hour.
    pub fn apply_history(&mut self, current_minute: usize, records: &[MinuteRecord]) {
        let current = current_minute % MINUTES_PER_HOUR;
        let records = &records[..records.len().min(MINUTES_PER_HOUR)];

        for (i, record) in records.iter().enumerate() {
            self.slots[(i + 1 + current) % MINUTES_PER_HOUR] = dots_for_steps(record.steps);
        }

        let first_missing = (records.len() + 1 + current) % MINUTES_PER_HOUR;
        for slot in first_missing..current {
            trace!("Minute {} has no history yet", slot);
            self.slots[slot] = 1;
        }
    }
}

/// Step accounting for the minute in progress
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MinuteTally {
    /// Cumulative step total seen last
    last_total: u32,
    /// Steps taken since the minute started
    minute_steps: u32,
}

impl MinuteTally {
    pub const fn new(total: u32) -> Self {
        Self {
            last_total: total,
            minute_steps: 0,
        }
    }

    pub fn last_total(&self) -> u32 {
        self.last_total
    }

    pub fn minute_steps(&self) -> u32 {
        self.minute_steps
    }

    /// Replace the reference total without counting the difference
    pub fn reset_total(&mut self, total: u32) {
        self.last_total = total;
    }

    pub fn start_minute(&mut self) {
        self.minute_steps = 0;
    }

    /// Account for a new cumulative total and return the steps taken so far
    /// in this minute. A total below the previous one counts as no steps.
    pub fn advance(&mut self, total: u32) -> u32 {
        let new_steps = total.saturating_sub(self.last_total);
        self.minute_steps = self.minute_steps.saturating_add(new_steps);
        self.last_total = total;
        self.minute_steps
    }
}
