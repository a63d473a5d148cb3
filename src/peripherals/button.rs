//! Side button for PineTime

use debouncr::{debounce_2, Debouncer, Edge, Repeat2};
use embassy_nrf::{
    gpio::{Input, Output},
    peripherals::{P0_13, P0_15},
};
use embassy_time::Timer;

/// Debounced side button.
///
/// The button is only powered while it is read: P0.15 draws around 34µA
/// when left high.
pub struct Button {
    /// Button state (high = pressed)
    sense: Input<'static, P0_13>,
    /// Button power
    enable: Output<'static, P0_15>,
    debouncer: Debouncer<u8, Repeat2>,
}

impl Button {
    pub fn init(sense: Input<'static, P0_13>, enable: Output<'static, P0_15>) -> Self {
        Self {
            sense,
            enable,
            debouncer: debounce_2(false),
        }
    }

    /// Sample the button, returns true on the poll that sees it go down
    pub async fn poll(&mut self) -> bool {
        self.enable.set_high();
        // The button needs a short time to give stable outputs
        Timer::after_micros(1).await;

        let edge = self.debouncer.update(self.sense.is_high());
        self.enable.set_low();

        edge == Some(Edge::Rising)
    }
}
