//! Error types for the watchface

use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The requested health metric has no data for today
    #[error("health data unavailable")]
    HealthUnavailable,
    /// Configuration message could not be decoded, byte offset of the fault
    #[error("malformed configuration message at byte {0}")]
    MalformedMessage(usize),
    /// Settings store has no room for another key
    #[error("settings store is full")]
    StoreFull,
    /// Text did not fit into its label buffer
    #[error("text does not fit label buffer")]
    Format,
}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Error::Format
    }
}
