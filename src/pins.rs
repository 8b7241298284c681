//! GPIO / peripheral pin assignments for the WaveDeck main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// I2C bus (gesture sensor + fuel gauge share the bus)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;
/// Both chips are happy at standard speed; the bus is short.
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Gesture sensor (PAJ7620U2)
// ---------------------------------------------------------------------------

/// Open-drain interrupt line, pulled up, falls when a gesture is latched
/// in the chip's result registers.
pub const GESTURE_INT_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Display panel
// ---------------------------------------------------------------------------

/// Backlight power switch (active HIGH through a MOSFET).
pub const BACKLIGHT_GPIO: i32 = 7;
/// Panel reset line (active LOW pulse during re-init).
pub const PANEL_RESET_GPIO: i32 = 8;
