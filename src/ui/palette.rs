//! Color schemes

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

use crate::settings::ColorScheme;

// 8 bit channel values scaled to 5/6/5 bits
const ORANGE: Rgb565 = Rgb565::new(31, 21, 0);
const CHROME_YELLOW: Rgb565 = Rgb565::new(31, 42, 0);
const GREEN: Rgb565 = Rgb565::new(0, 63, 0);
const CYAN: Rgb565 = Rgb565::new(0, 63, 31);
const DARK_GRAY: Rgb565 = Rgb565::new(10, 21, 10);
const LIGHT_GRAY: Rgb565 = Rgb565::new(21, 42, 21);
const DARK_GREEN: Rgb565 = Rgb565::new(0, 21, 0);
const BLUE_MOON: Rgb565 = Rgb565::new(0, 21, 31);
const RAJAH: Rgb565 = Rgb565::new(31, 42, 10);
const PICTON_BLUE: Rgb565 = Rgb565::new(10, 42, 31);

/// Colors used to draw the face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb565,
    pub time: Rgb565,
    /// Minutes that already passed this hour
    pub dot_main: Rgb565,
    /// Minutes still to come, showing last hour's activity
    pub dot_dark: Rgb565,
    pub steps: Rgb565,
    pub date: Rgb565,
}

impl Palette {
    pub const fn for_scheme(scheme: ColorScheme) -> Self {
        let (time, dot_main, dot_dark, text) = match scheme {
            ColorScheme::BlackWhite => (Rgb565::WHITE, Rgb565::WHITE, DARK_GRAY, LIGHT_GRAY),
            ColorScheme::Orange => (ORANGE, ORANGE, DARK_GRAY, RAJAH),
            ColorScheme::Green => (CHROME_YELLOW, GREEN, DARK_GREEN, GREEN),
            ColorScheme::Blue => (Rgb565::WHITE, CYAN, BLUE_MOON, PICTON_BLUE),
        };
        Self {
            background: Rgb565::BLACK,
            time,
            dot_main,
            dot_dark,
            steps: text,
            date: text,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::for_scheme(ColorScheme::BlackWhite)
    }
}
