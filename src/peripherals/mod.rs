pub(crate) mod accelerometer;
pub(crate) mod backlight;
pub(crate) mod button;
pub(crate) mod display;
pub(crate) mod vibrator;
