//! Unified error types for the WaveDeck firmware.
//!
//! Follows embedded best practice: a single `Error` enum that every subsystem
//! can convert into, keeping the top-level service loop's error handling
//! uniform. All variants are `Copy` so they can be cheaply passed around
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The gesture sensor failed to initialise or respond.
    Gesture(GestureError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gesture(e) => write!(f, "gesture: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Gesture sensor errors
// ---------------------------------------------------------------------------

/// Failures from the gesture-chip driver. Setup retries these a bounded
/// number of times, then once per service tick; the UI keeps running
/// without gesture input until the chip comes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureError {
    /// The chip-id probe returned an unexpected value.
    WrongChipId(u16),
    /// The I2C transaction failed (underlying bus return code).
    Bus(i32),
    /// The chip did not respond within the bring-up window.
    NotResponding,
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongChipId(id) => write!(f, "wrong chip id 0x{id:04x}"),
            Self::Bus(rc) => write!(f, "bus error (rc={rc})"),
            Self::NotResponding => write!(f, "chip not responding"),
        }
    }
}

impl From<GestureError> for Error {
    fn from(e: GestureError) -> Self {
        Self::Gesture(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
