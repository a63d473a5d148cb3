//! UI definitions module

use chrono::NaiveDateTime;
use embedded_graphics::{draw_target::DrawTarget, pixelcolor::Rgb565};

mod activity_face;
mod dial;
mod label;
mod palette;
#[cfg(test)]
mod testing;

pub use activity_face::ActivityFace;
pub use dial::DialGeometry;
pub use label::Label;
pub use palette::Palette;

pub trait WatchFace {
    /// Called once at the start of every minute
    fn on_minute_tick(&mut self, now: NaiveDateTime);

    /// Whether the face changed since it was last drawn
    fn needs_redraw(&self) -> bool;

    /// Draw the whole face onto `target`
    fn draw<D>(&mut self, now: NaiveDateTime, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>;
}
