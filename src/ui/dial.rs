//! Placement of the minute dots around the dial

use core::f32::consts::PI;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Point, Size},
    pixelcolor::Rgb565,
    primitives::{Circle, Primitive, PrimitiveStyle},
    Drawable,
};
use libm::{cosf, roundf, sinf};

use crate::activity::MINUTES_PER_HOUR;

/// Where and how big the minute dots are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialGeometry {
    /// Dial center
    pub center: Point,
    /// Distance of the innermost dot from the center
    pub distance: u32,
    /// Distance between dots of the same minute
    pub spacing: u32,
    pub dot_diameter: u32,
}

impl DialGeometry {
    /// Geometry for a square display of `size`, five dots fit inside the edge
    pub fn for_display(size: Size) -> Self {
        let radius = size.width.min(size.height) / 2;
        Self {
            center: Point::new(size.width as i32 / 2, size.height as i32 / 2),
            distance: radius * 2 / 3,
            spacing: radius * 3 / 40,
            dot_diameter: (radius / 24).max(1) | 1,
        }
    }

    /// Center of dot `ring` (0 is innermost) for `minute`, clockwise from 12 o'clock
    pub fn dot_position(&self, minute: usize, ring: u8) -> Point {
        let angle = 2.0 * PI * (minute % MINUTES_PER_HOUR) as f32 / MINUTES_PER_HOUR as f32;
        let radius = (self.distance + ring as u32 * self.spacing) as f32;
        Point::new(
            self.center.x + roundf(sinf(angle) * radius) as i32,
            self.center.y - roundf(cosf(angle) * radius) as i32,
        )
    }

    /// Draw `dots` dots for `minute`, starting at the inner ring
    pub fn draw_minute<D>(
        &self,
        target: &mut D,
        minute: usize,
        dots: u8,
        color: Rgb565,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let style = PrimitiveStyle::with_fill(color);
        for ring in 0..dots {
            Circle::with_center(self.dot_position(minute, ring), self.dot_diameter)
                .into_styled(style)
                .draw(target)?;
        }
        Ok(())
    }
}
