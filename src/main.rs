#![no_std]
#![no_main]

mod peripherals;
mod system;

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Core
use core::sync::atomic::{AtomicU32, Ordering};

// Device
use embassy_executor::Spawner;
use embassy_nrf::{
    bind_interrupts,
    gpio::{Input, Level, Output, OutputDrive, Pin, Pull},
    interrupt::{self, InterruptExt, Priority},
    peripherals::{SPI2, TWISPI1},
    spim, twim,
};
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, signal::Signal};
use embassy_time::{Duration, Ticker, Timer};
use heapless::Vec;
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1 => twim::InterruptHandler<TWISPI1>;
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use activehour::{
    clock::TimeSnapshot,
    health::{pedometer::StepDetector, recorder::StepRecorder},
    settings::{MemoryStore, Settings},
    ui::{ActivityFace, DialGeometry, WatchFace},
};
use peripherals::{
    accelerometer::Accelerometer,
    backlight::Backlight,
    button::Button,
    display::Display,
    vibrator::{PulseLength, Vibrator},
};
use system::{
    bluetooth::{self, Server, CONFIG_MESSAGE_LEN},
    flash::SettingsFlash,
    time::{TimeManager, TimeReference},
};

// Include build time UTC epoch, the clock starts from there until synced
include!(concat!(env!("OUT_DIR"), "/build_time.rs"));
const TIMEZONE: i32 = 1 * 3_600;

const ACCEL_SAMPLE_RATE_HZ: u32 = 25;

// Communication channels
static CONFIG_MESSAGE: Signal<ThreadModeRawMutex, Vec<u8, CONFIG_MESSAGE_LEN>> = Signal::new();
static INCREASE_BRIGHTNESS: Signal<ThreadModeRawMutex, ()> = Signal::new();
static NOTIFY: Signal<ThreadModeRawMutex, u8> = Signal::new();
static SETTINGS_CHANGED: Signal<ThreadModeRawMutex, u8> = Signal::new();
static TIME_SYNC: Signal<ThreadModeRawMutex, TimeReference> = Signal::new();

/// Steps counted since boot
static STEP_TOTAL: AtomicU32 = AtomicU32::new(0);

static SERVER: StaticCell<Server> = StaticCell::new();

/// Interrupt priorities 0, 1 and 4 are reserved for the softdevice
fn embassy_config() -> embassy_nrf::config::Config {
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    config.dcdc.reg1 = true;
    config
}

/// Check for notifications
#[embassy_executor::task(pool_size = 1)]
async fn notify(mut vibrator: Vibrator) {
    loop {
        // Vibrate signaled amount of times
        let count = NOTIFY.wait().await;
        vibrator.pulse(PulseLength::Short, count).await;
    }
}

/// Update backlight brightness
#[embassy_executor::task(pool_size = 1)]
async fn update_brightness(mut backlight: Backlight) {
    loop {
        INCREASE_BRIGHTNESS.wait().await;
        backlight.cycle();
    }
}

/// Polls the button state every 10ms
#[embassy_executor::task(pool_size = 1)]
async fn poll_button(mut button: Button) {
    loop {
        if button.poll().await {
            defmt::debug!("Button pressed");
            INCREASE_BRIGHTNESS.signal(());
        }

        // Re-schedule the timer interrupt in 10ms
        Timer::after(Duration::from_millis(10)).await;
    }
}

/// Sample the accelerometer and count steps
#[embassy_executor::task(pool_size = 1)]
async fn count_steps(mut accelerometer: Accelerometer<TWISPI1>) {
    let mut detector = StepDetector::new(ACCEL_SAMPLE_RATE_HZ);
    let mut tick = Ticker::every(Duration::from_hz(ACCEL_SAMPLE_RATE_HZ as u64));
    loop {
        match accelerometer.read_mg().await {
            Ok((x, y, z)) => {
                if detector.push(x, y, z) {
                    STEP_TOTAL.store(detector.total(), Ordering::Relaxed);
                }
            }
            Err(err) => {
                defmt::warn!("Accelerometer read failed: {:?}", err);
                detector.reset();
            }
        }

        tick.next().await;
    }
}

/// Keep time, feed the step history and redraw the face when needed
#[embassy_executor::task(pool_size = 1)]
async fn update_face(
    mut display: Display<SPI2>,
    mut face: ActivityFace<StepRecorder>,
    mut store: MemoryStore,
    mut flash: SettingsFlash,
    mut clock: TimeManager,
) {
    let mut tick = Ticker::every(Duration::from_secs(1));
    loop {
        if TIME_SYNC.signaled() {
            clock.set_time(TIME_SYNC.wait().await);
        }
        let now = clock.now();

        let total = STEP_TOTAL.load(Ordering::Relaxed);
        if let Some(event) = face.health_mut().update(now, total) {
            face.on_health_event(event);
        }

        if CONFIG_MESSAGE.signaled() {
            let message = CONFIG_MESSAGE.wait().await;
            if face.on_config_message(&mut store, &message, now).is_ok() {
                defmt::info!("Settings updated");
                flash.sync(&mut store).await;
                SETTINGS_CHANGED.signal(face.settings().to_bits());
                NOTIFY.signal(1);
            }
        }

        let time = TimeSnapshot::from(now);
        let last = face.last_time();
        if (time.day, time.hour, time.minute) != (last.day, last.hour, last.minute) {
            face.on_minute_tick(now);
        }

        if face.needs_redraw() && display.render(&mut face, now).is_err() {
            defmt::error!("Drawing the watchface failed");
        }

        // Re-schedule the timer interrupt in 1s
        tick.next().await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(embassy_config());
    defmt::info!("Initializing");

    // Peripherals sharing the CPU with the softdevice
    interrupt::SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1.set_priority(Priority::P3);
    interrupt::SPIM2_SPIS2_SPI2.set_priority(Priority::P3);

    // Initialize Bluetooth
    let sd = Softdevice::enable(&bluetooth::generate_config());
    let server = SERVER.init(unwrap!(Server::new(sd)));
    let sd: &'static Softdevice = sd;
    unwrap!(spawner.spawn(bluetooth::softdevice_task(sd)));
    let mut flash = SettingsFlash::take(sd);

    // Initialize Backlight
    let backlight = Backlight::init(
        Output::new(p.P0_14.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_22.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_23.degrade(), Level::High, OutputDrive::Standard),
        2,
    );

    // Initialize Button
    let button = Button::init(
        Input::new(p.P0_13, Pull::None),
        Output::new(p.P0_15, Level::Low, OutputDrive::Standard),
    );

    // Initialize vibration motor
    let vibrator = Vibrator::init(Output::new(p.P0_16, Level::High, OutputDrive::Standard));

    // Initialize I2C
    let mut i2c_config = twim::Config::default();
    // Use I2C at 400KHz (the fastest clock available on the nRF52832)
    i2c_config.frequency = twim::Frequency::K400;
    let i2c = twim::Twim::new(p.TWISPI1, Irqs, p.P0_06, p.P0_07, i2c_config);

    // Initialize SPI
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;
    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);

    // Initialize LCD
    let Ok(display) = Display::init(
        spim,
        Output::new(p.P0_25.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_18.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26.degrade(), Level::Low, OutputDrive::Standard),
    ) else {
        defmt::panic!("Display initialization failed");
    };

    // Initialize clock
    let clock = TimeManager::new(unwrap!(TimeReference::from_epoch(BUILD_EPOCH, TIMEZONE)));
    let now = clock.now();

    // Initialize watchface
    let mut store = flash.load().await;
    let settings = unwrap!(Settings::load(&mut store).ok());
    // Defaults written on first boot
    flash.sync(&mut store).await;
    let mut recorder = StepRecorder::new();
    recorder.update(now, STEP_TOTAL.load(Ordering::Relaxed));
    let face = ActivityFace::new(
        recorder,
        settings,
        DialGeometry::for_display(display.size()),
        now,
    );

    defmt::info!("Initialization finished");

    // Schedule tasks
    unwrap!(spawner.spawn(bluetooth::bluetooth_task(sd, server)));
    unwrap!(spawner.spawn(poll_button(button)));
    unwrap!(spawner.spawn(update_brightness(backlight)));
    unwrap!(spawner.spawn(notify(vibrator)));
    unwrap!(spawner.spawn(update_face(display, face, store, flash, clock)));

    match Accelerometer::init(i2c).await {
        Ok(accelerometer) => unwrap!(spawner.spawn(count_steps(accelerometer))),
        Err(err) => defmt::error!("Accelerometer unavailable, no steps: {:?}", err),
    }
}
