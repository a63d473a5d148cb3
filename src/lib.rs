//! Active Hour watchface
//!
//! A clock face that shows the time and 60 "minute dots" around the dial.
//! The number of dots stacked at a minute position encodes how many steps
//! were taken during that minute of the current hour.
//!
//! The library is hardware agnostic: it draws onto any
//! [`embedded_graphics::draw_target::DrawTarget`] and reads activity data
//! through the [`health::HealthService`] trait. The PineTime firmware in
//! `src/main.rs` wires it to the real peripherals.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod activity;
pub mod clock;
pub mod error;
pub mod health;
pub mod settings;
pub mod ui;

pub use error::Error;
