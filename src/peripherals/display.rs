//! Display control module for PineTime

use chrono::NaiveDateTime;
use display_interface_spi::SPIInterface;
use embassy_nrf::{
    gpio::{AnyPin, Output},
    spim::{self, Spim},
};
use embassy_time::Delay;
use embedded_graphics::{geometry::Size, pixelcolor::Rgb565, prelude::*};
use mipidsi::{models::ST7789, Builder, Orientation};

use activehour::ui::WatchFace;

pub const LCD_W: u16 = 240;
pub const LCD_H: u16 = 240;

type Lcd<SPI> = mipidsi::Display<
    SPIInterface<Spim<'static, SPI>, Output<'static, AnyPin>, Output<'static, AnyPin>>,
    ST7789,
    Output<'static, AnyPin>,
>;

pub struct Display<SPI>
where
    SPI: spim::Instance,
{
    lcd: Lcd<SPI>,
}

impl<SPI> Display<SPI>
where
    SPI: spim::Instance,
{
    /// Configure display settings on boot
    pub fn init(
        spim: Spim<'static, SPI>,
        cs: Output<'static, AnyPin>,
        dc: Output<'static, AnyPin>,
        rst: Output<'static, AnyPin>,
    ) -> Result<Self, mipidsi::Error> {
        let lcd = Builder::st7789(SPIInterface::new(spim, dc, cs))
            .with_display_size(LCD_W, LCD_H)
            .with_orientation(Orientation::Portrait(false))
            .init(&mut Delay, Some(rst))
            .map_err(|_| mipidsi::Error::BusWriteError)?;

        let mut display = Self { lcd };
        display.clear(Rgb565::BLACK)?;
        Ok(display)
    }

    pub fn size(&self) -> Size {
        Size::new(LCD_W as u32, LCD_H as u32)
    }

    pub fn clear(&mut self, color: Rgb565) -> Result<(), mipidsi::Error> {
        self.lcd.clear(color)
    }

    /// Draw `face` as it looks at `now`
    pub fn render<F>(&mut self, face: &mut F, now: NaiveDateTime) -> Result<(), mipidsi::Error>
    where
        F: WatchFace,
    {
        face.draw(now, &mut self.lcd)
    }
}
