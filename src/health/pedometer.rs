//! Step detection from raw accelerometer samples
//!
//! Walking shows up as a periodic swing of the acceleration magnitude around
//! 1 g. The magnitude is smoothed, compared against a slowly moving baseline
//! and every upward crossing of `baseline + threshold` counts as one step,
//! provided the previous step is at least a refractory interval ago.

use libm::sqrtf;

/// Smoothing factor for the magnitude signal
const SIGNAL_ALPHA: f32 = 0.5;
/// Smoothing factor for the baseline, roughly a one second time constant at 25 Hz
const BASELINE_ALPHA: f32 = 0.05;
/// Minimal rise above the baseline in milli-g
const DEFAULT_THRESHOLD_MG: f32 = 150.0;
/// Nobody takes more than four steps a second
const REFRACTORY_MS: u32 = 250;

/// Counts steps from 3-axis acceleration in milli-g
#[derive(Debug, Clone)]
pub struct StepDetector {
    /// Smoothed acceleration magnitude
    signal: f32,
    /// Slow moving average of the magnitude
    baseline: f32,
    /// Rise above the baseline that counts as a step
    threshold: f32,
    /// Signal is above the step threshold
    above: bool,
    samples_since_step: u32,
    refractory_samples: u32,
    primed: bool,
    total: u32,
}

impl StepDetector {
    /// Create a detector for samples arriving at `sample_rate_hz`
    pub fn new(sample_rate_hz: u32) -> Self {
        let refractory_samples = (REFRACTORY_MS * sample_rate_hz).div_ceil(1_000).max(1);
        Self {
            signal: 0.0,
            baseline: 0.0,
            threshold: DEFAULT_THRESHOLD_MG,
            above: false,
            samples_since_step: refractory_samples,
            refractory_samples,
            primed: false,
            total: 0,
        }
    }

    /// Steps counted since creation
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Feed one sample, returns whether it completed a step
    pub fn push(&mut self, x: i16, y: i16, z: i16) -> bool {
        let (x, y, z) = (x as f32, y as f32, z as f32);
        let magnitude = sqrtf(x * x + y * y + z * z);

        if !self.primed {
            self.signal = magnitude;
            self.baseline = magnitude;
            self.primed = true;
            return false;
        }

        self.signal += SIGNAL_ALPHA * (magnitude - self.signal);
        self.baseline += BASELINE_ALPHA * (magnitude - self.baseline);
        self.samples_since_step = self.samples_since_step.saturating_add(1);

        let level = self.signal - self.baseline;
        if !self.above && level > self.threshold {
            self.above = true;
            if self.samples_since_step >= self.refractory_samples {
                self.samples_since_step = 0;
                self.total = self.total.wrapping_add(1);
                trace!("Step detected, total {}", self.total);
                return true;
            }
        } else if self.above && level < 0.0 {
            // Re-arm once the swing is back below the baseline
            self.above = false;
        }
        false
    }

    /// Drop the learned baseline, e.g. after the sensor was reconfigured
    pub fn reset(&mut self) {
        self.primed = false;
        self.above = false;
        self.samples_since_step = self.refractory_samples;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    const RATE: u32 = 25;

    /// Vertical acceleration of a wrist swinging at `freq` Hz
    fn walk(detector: &mut StepDetector, freq: f32, amplitude: f32, seconds: u32) -> u32 {
        let mut steps = 0;
        for n in 0..RATE * seconds {
            let t = n as f32 / RATE as f32;
            let z = 1_000.0 + amplitude * libm::sinf(2.0 * PI * freq * t);
            if detector.push(0, 0, z as i16) {
                steps += 1;
            }
        }
        steps
    }

    #[test]
    fn test_counts_walking_cadence() {
        let mut detector = StepDetector::new(RATE);
        let steps = walk(&mut detector, 2.0, 400.0, 10);
        assert!((18..=20).contains(&steps), "counted {steps}");
        assert_eq!(detector.total(), steps);
    }

    #[test]
    fn test_ignores_resting_wrist() {
        let mut detector = StepDetector::new(RATE);
        for n in 0..RATE * 10 {
            let jitter = if n % 2 == 0 { 20 } else { -20 };
            assert!(!detector.push(10, -5, 1_000 + jitter));
        }
        assert_eq!(detector.total(), 0);
    }

    #[test]
    fn test_refractory_limits_rate() {
        let mut detector = StepDetector::new(RATE);
        let steps = walk(&mut detector, 8.0, 800.0, 2);
        // A step at most every 7th sample
        assert!(steps <= 2 * RATE / 7 + 1, "counted {steps}");
    }

    #[test]
    fn test_small_swings_are_not_steps() {
        let mut detector = StepDetector::new(RATE);
        assert_eq!(walk(&mut detector, 2.0, 100.0, 5), 0);

        let mut detector = StepDetector::new(RATE);
        detector.threshold = 50.0;
        assert!(walk(&mut detector, 2.0, 100.0, 5) > 0);
    }
}
