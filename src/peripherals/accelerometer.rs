//! BMA421 accelerometer
//!
//! Only raw acceleration is used, step detection runs in software.
//! Register map from the BMA423 datasheet, which the BMA421 shares.

use embassy_nrf::twim::{self, Twim};

const ADDRESS: u8 = 0x18;

const REG_CHIP_ID: u8 = 0x00;
const REG_DATA_X_LSB: u8 = 0x12;
const REG_ACC_CONF: u8 = 0x40;
const REG_ACC_RANGE: u8 = 0x41;
const REG_PWR_CONF: u8 = 0x7C;
const REG_PWR_CTRL: u8 = 0x7D;
const REG_CMD: u8 = 0x7E;

const CMD_SOFT_RESET: u8 = 0xB6;
/// 25 Hz output data rate, averaging over 4 samples
const ACC_CONF_25HZ_AVG4: u8 = 0x26;
const ACC_RANGE_2G: u8 = 0x00;
const PWR_CTRL_ACC_EN: u8 = 0x04;

/// 12 bit samples at ±2 g
const LSB_PER_G: i32 = 1024;

pub struct Accelerometer<TWI>
where
    TWI: twim::Instance,
{
    twim: Twim<'static, TWI>,
}

impl<TWI> Accelerometer<TWI>
where
    TWI: twim::Instance,
{
    /// Reset the sensor and start sampling
    pub async fn init(twim: Twim<'static, TWI>) -> Result<Self, twim::Error> {
        let mut accelerometer = Self { twim };

        accelerometer.write(REG_CMD, CMD_SOFT_RESET).await?;
        embassy_time::Timer::after_millis(2).await;

        let mut chip_id = [0; 1];
        accelerometer.read(REG_CHIP_ID, &mut chip_id).await?;
        defmt::info!("Accelerometer chip id: {=u8:#x}", chip_id[0]);

        // Leave advanced power save, configuration writes are ignored otherwise
        accelerometer.write(REG_PWR_CONF, 0x00).await?;
        embassy_time::Timer::after_micros(450).await;
        accelerometer.write(REG_ACC_CONF, ACC_CONF_25HZ_AVG4).await?;
        accelerometer.write(REG_ACC_RANGE, ACC_RANGE_2G).await?;
        accelerometer.write(REG_PWR_CTRL, PWR_CTRL_ACC_EN).await?;

        Ok(accelerometer)
    }

    /// Latest acceleration in milli-g
    pub async fn read_mg(&mut self) -> Result<(i16, i16, i16), twim::Error> {
        let mut data = [0; 6];
        self.read(REG_DATA_X_LSB, &mut data).await?;

        let axis = |lsb: u8, msb: u8| {
            let raw = i16::from_le_bytes([lsb, msb]) >> 4;
            (raw as i32 * 1_000 / LSB_PER_G) as i16
        };
        Ok((
            axis(data[0], data[1]),
            axis(data[2], data[3]),
            axis(data[4], data[5]),
        ))
    }

    async fn read(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), twim::Error> {
        // EasyDMA can only send from RAM
        let address = [register];
        self.twim.write_read(ADDRESS, &address, buffer).await
    }

    async fn write(&mut self, register: u8, value: u8) -> Result<(), twim::Error> {
        let command = [register, value];
        self.twim.write(ADDRESS, &command).await
    }
}
