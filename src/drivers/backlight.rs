//! Display backlight switch.
//!
//! One GPIO through a MOSFET gates the panel backlight supply. The driver
//! is generic over `embedded-hal`'s [`OutputPin`] so the same code runs on
//! the ESP-IDF pin driver and on a recording mock in tests.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct Backlight<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Backlight<P> {
    /// Takes ownership of an already-configured output pin. The backlight
    /// starts off; the service turns it on at the end of setup.
    pub fn new(pin: P) -> Self {
        Self { pin, on: false }
    }

    pub fn set(&mut self, on: bool) {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            // A failed write leaves the light in its previous state;
            // nothing to recover beyond trying again next time.
            warn!("backlight: GPIO write failed");
            return;
        }
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct RecordingPin {
        levels: Vec<bool>,
    }

    impl embedded_hal::digital::ErrorType for RecordingPin {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.levels.push(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.levels.push(true);
            Ok(())
        }
    }

    #[test]
    fn set_drives_the_pin_and_tracks_state() {
        let mut bl = Backlight::new(RecordingPin { levels: Vec::new() });
        assert!(!bl.is_on());
        bl.set(true);
        assert!(bl.is_on());
        bl.set(false);
        assert!(!bl.is_on());
        assert_eq!(bl.pin.levels, vec![true, false]);
    }
}
