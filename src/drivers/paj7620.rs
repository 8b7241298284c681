//! PAJ7620U2 gesture sensor driver.
//!
//! The chip recognises nine gestures in hardware and latches the result
//! in two interrupt-flag registers; the INT line falls until they are
//! read. This driver does the bank-switched bring-up, the chip-id probe,
//! and the flag decode — the interrupt line itself is handled by
//! `hw_init` + the latch in [`crate::events`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: register access over the shared I2C master (via hw_init).
//! On host/test: reads from an injectable static for simulation.

use core::sync::atomic::{AtomicU8, Ordering};

use log::debug;

use crate::drivers::hw_init;
use crate::error::GestureError;
use crate::gesture::RawGesture;

const PAJ7620_ADDR: u8 = 0x73;

/// Register bank select (0xEF selects bank 0/1).
const REG_BANK_SEL: u8 = 0xEF;
/// Chip id lives at 0x00/0x01 in bank 0.
const REG_PART_ID_LOW: u8 = 0x00;
const PART_ID: u16 = 0x7620;

/// Gesture interrupt flags, bank 0. Reading clears the INT line.
const REG_GES_FLAG_0: u8 = 0x43;
const REG_GES_FLAG_1: u8 = 0x44;

const FLAG_RIGHT: u8 = 1 << 0;
const FLAG_LEFT: u8 = 1 << 1;
const FLAG_UP: u8 = 1 << 2;
const FLAG_DOWN: u8 = 1 << 3;
const FLAG_FORWARD: u8 = 1 << 4;
const FLAG_BACKWARD: u8 = 1 << 5;
const FLAG_CLOCKWISE: u8 = 1 << 6;
const FLAG_COUNT_CLOCKWISE: u8 = 1 << 7;
const FLAG_WAVE: u8 = 1 << 0; // in REG_GES_FLAG_1

/// Vendor-recommended bring-up writes (bank 0 unless noted): wakes the
/// sensor, selects gesture mode and the default 240 fps reporting.
const INIT_SEQUENCE: &[(u8, u8)] = &[
    (0xEF, 0x00), // bank 0
    (0x41, 0xFF), // enable all gesture interrupts
    (0x42, 0x01), // enable wave interrupt
    (0x37, 0x07),
    (0x38, 0x17),
    (0x39, 0x06),
    (0x46, 0x2D),
    (0x47, 0x0F),
    (0x48, 0x3C),
    (0x49, 0x00),
    (0x4A, 0x1E),
    (0x51, 0x10),
    (0x83, 0x20),
    (0x9F, 0xF9),
    (0xEF, 0x01), // bank 1
    (0x01, 0x1E),
    (0x02, 0x0F),
    (0x03, 0x10),
    (0x04, 0x02),
    (0x41, 0x40),
    (0x43, 0x30),
    (0x65, 0x96), // 240 fps gesture mode
    (0x66, 0x00),
    (0x67, 0x97),
    (0x68, 0x01),
    (0x72, 0x01), // run
    (0xEF, 0x00), // back to bank 0 for flag reads
];

// Host-side injection slot: the next raw code `read_gesture` will report.
static SIM_GESTURE: AtomicU8 = AtomicU8::new(0);

/// Inject the next gesture for host tests. Consumed by one read, matching
/// the chip's read-to-clear flag registers.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gesture(raw: RawGesture) {
    SIM_GESTURE.store(raw as u8, Ordering::Relaxed);
}

pub struct Paj7620 {
    initialised: bool,
}

impl Paj7620 {
    pub fn new() -> Self {
        Self { initialised: false }
    }

    /// Probe the chip id and run the bring-up sequence.
    pub fn init(&mut self) -> Result<(), GestureError> {
        self.probe()?;
        for &(reg, value) in INIT_SEQUENCE {
            hw_init::i2c_write_reg(PAJ7620_ADDR, reg, value).map_err(GestureError::Bus)?;
        }
        self.initialised = true;
        debug!("paj7620: gesture mode up");
        Ok(())
    }

    /// Read and consume the latched gesture, releasing the INT line.
    pub fn read_gesture(&mut self) -> RawGesture {
        let (flag0, flag1) = self.read_flags();
        decode_flags(flag0, flag1)
    }

    /// Drop any in-flight recognition state by draining the flag
    /// registers unread.
    pub fn cancel(&mut self) {
        let _ = self.read_flags();
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    // ── Register access ───────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn probe(&self) -> Result<(), GestureError> {
        // The chip needs a dummy select after power-up before it ACKs.
        let _ = hw_init::i2c_write_reg(PAJ7620_ADDR, REG_BANK_SEL, 0x00);
        hw_init::i2c_write_reg(PAJ7620_ADDR, REG_BANK_SEL, 0x00)
            .map_err(|_| GestureError::NotResponding)?;

        let mut id = [0u8; 2];
        hw_init::i2c_read_regs(PAJ7620_ADDR, REG_PART_ID_LOW, &mut id)
            .map_err(GestureError::Bus)?;
        let part = u16::from(id[1]) << 8 | u16::from(id[0]);
        if part != PART_ID {
            return Err(GestureError::WrongChipId(part));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn probe(&self) -> Result<(), GestureError> {
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn read_flags(&self) -> (u8, u8) {
        let flag0 = hw_init::i2c_read_reg(PAJ7620_ADDR, REG_GES_FLAG_0).unwrap_or(0);
        let flag1 = hw_init::i2c_read_reg(PAJ7620_ADDR, REG_GES_FLAG_1).unwrap_or(0);
        (flag0, flag1)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_flags(&self) -> (u8, u8) {
        // Consume the injected code, mirroring read-to-clear semantics.
        let raw = SIM_GESTURE.swap(0, Ordering::Relaxed);
        match raw {
            x if x == RawGesture::Up as u8 => (FLAG_UP, 0),
            x if x == RawGesture::Down as u8 => (FLAG_DOWN, 0),
            x if x == RawGesture::Left as u8 => (FLAG_LEFT, 0),
            x if x == RawGesture::Right as u8 => (FLAG_RIGHT, 0),
            x if x == RawGesture::Forward as u8 => (FLAG_FORWARD, 0),
            x if x == RawGesture::Backward as u8 => (FLAG_BACKWARD, 0),
            x if x == RawGesture::Clockwise as u8 => (FLAG_CLOCKWISE, 0),
            x if x == RawGesture::CounterClockwise as u8 => (FLAG_COUNT_CLOCKWISE, 0),
            x if x == RawGesture::Wave as u8 => (0, FLAG_WAVE),
            _ => (0, 0),
        }
    }
}

/// Decode the two flag registers into one raw gesture. The chip can in
/// principle latch several bits before service; directional flags win,
/// matching the vendor library's priority order.
fn decode_flags(flag0: u8, flag1: u8) -> RawGesture {
    if flag0 & FLAG_UP != 0 {
        RawGesture::Up
    } else if flag0 & FLAG_DOWN != 0 {
        RawGesture::Down
    } else if flag0 & FLAG_LEFT != 0 {
        RawGesture::Left
    } else if flag0 & FLAG_RIGHT != 0 {
        RawGesture::Right
    } else if flag0 & FLAG_FORWARD != 0 {
        RawGesture::Forward
    } else if flag0 & FLAG_BACKWARD != 0 {
        RawGesture::Backward
    } else if flag0 & FLAG_CLOCKWISE != 0 {
        RawGesture::Clockwise
    } else if flag0 & FLAG_COUNT_CLOCKWISE != 0 {
        RawGesture::CounterClockwise
    } else if flag1 & FLAG_WAVE != 0 {
        RawGesture::Wave
    } else {
        RawGesture::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_flags_decode_to_their_gesture() {
        assert_eq!(decode_flags(FLAG_UP, 0), RawGesture::Up);
        assert_eq!(decode_flags(FLAG_DOWN, 0), RawGesture::Down);
        assert_eq!(decode_flags(FLAG_LEFT, 0), RawGesture::Left);
        assert_eq!(decode_flags(FLAG_RIGHT, 0), RawGesture::Right);
        assert_eq!(decode_flags(FLAG_FORWARD, 0), RawGesture::Forward);
        assert_eq!(decode_flags(FLAG_BACKWARD, 0), RawGesture::Backward);
        assert_eq!(decode_flags(FLAG_CLOCKWISE, 0), RawGesture::Clockwise);
        assert_eq!(
            decode_flags(FLAG_COUNT_CLOCKWISE, 0),
            RawGesture::CounterClockwise
        );
        assert_eq!(decode_flags(0, FLAG_WAVE), RawGesture::Wave);
    }

    #[test]
    fn empty_flags_decode_to_none() {
        assert_eq!(decode_flags(0, 0), RawGesture::None);
        // Unknown bits in the wave register are not a gesture either.
        assert_eq!(decode_flags(0, 0xFE), RawGesture::None);
    }

    #[test]
    fn directional_flags_outrank_wave() {
        assert_eq!(decode_flags(FLAG_UP, FLAG_WAVE), RawGesture::Up);
    }

    #[test]
    fn sim_injection_is_consumed_by_one_read() {
        let mut chip = Paj7620::new();
        sim_set_gesture(RawGesture::Left);
        assert_eq!(chip.read_gesture(), RawGesture::Left);
        assert_eq!(chip.read_gesture(), RawGesture::None);
    }
}
