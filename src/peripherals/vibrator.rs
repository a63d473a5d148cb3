//! Vibration motor

use embassy_nrf::{gpio::Output, peripherals::P0_16};
use embassy_time::Timer;

#[allow(unused)]
#[derive(Clone, Copy)]
/// Pulse length in milliseconds
pub enum PulseLength {
    Short = 200,
    Long = 400,
}

pub struct Vibrator {
    /// Motor enable pin (inverted)
    enable: Output<'static, P0_16>,
}

impl Vibrator {
    pub fn init(mut enable: Output<'static, P0_16>) -> Self {
        enable.set_high();
        Self { enable }
    }

    /// Pulse `times` times with pauses as long as the pulses
    pub async fn pulse(&mut self, length: PulseLength, times: u8) {
        for i in 0..times {
            if i > 0 {
                Timer::after_millis(length as u64).await;
            }
            self.enable.set_low();
            Timer::after_millis(length as u64).await;
            self.enable.set_high();
        }
    }
}
