//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the gesture chip, fuel gauge, and backlight drivers, exposing
//! them through [`GestureDriver`], [`FuelGauge`], [`DisplayControl`] and
//! [`Platform`]. This is the only module in the system that touches
//! actual hardware; on non-espidf targets the underlying drivers use
//! cfg-gated simulation stubs.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::OutputPin;
use log::{debug, info};

use crate::app::ports::{DisplayControl, FuelGauge, GestureDriver, Platform, SensorTasks};
use crate::drivers::backlight::Backlight;
use crate::drivers::hw_init;
use crate::drivers::max17043::Max17043;
use crate::drivers::paj7620::Paj7620;
use crate::error::GestureError;
use crate::gesture::{Orientation, RawGesture};
use crate::pins;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P: OutputPin> {
    gesture: Paj7620,
    gauge: Max17043,
    backlight: Backlight<P>,
    orientation: Orientation,
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(gesture: Paj7620, gauge: Max17043, backlight: Backlight<P>) -> Self {
        Self {
            gesture,
            gauge,
            backlight,
            orientation: Orientation::default(),
        }
    }

    /// Orientation last programmed by the core. The panel render stack
    /// picks this up when it rebuilds its draw context.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

// ── GestureDriver implementation ─────────────────────────────

impl<P: OutputPin> GestureDriver for HardwareAdapter<P> {
    fn init(&mut self) -> Result<(), GestureError> {
        self.gesture.init()
    }

    fn read_gesture(&mut self) -> RawGesture {
        self.gesture.read_gesture()
    }

    fn cancel(&mut self) {
        self.gesture.cancel();
    }
}

// ── FuelGauge implementation ─────────────────────────────────

impl<P: OutputPin> FuelGauge for HardwareAdapter<P> {
    fn reset(&mut self) {
        self.gauge.reset();
    }

    fn quick_start(&mut self) {
        self.gauge.quick_start();
    }

    fn cell_voltage(&mut self) -> f32 {
        self.gauge.cell_voltage()
    }

    fn native_soc(&mut self) -> f32 {
        self.gauge.native_soc()
    }
}

// ── DisplayControl implementation ────────────────────────────

impl<P: OutputPin> DisplayControl for HardwareAdapter<P> {
    fn backlight(&mut self, on: bool) {
        self.backlight.set(on);
    }

    fn panel_reset(&mut self) {
        // Active-low pulse; the controller re-initialises on release.
        hw_init::gpio_write(pins::PANEL_RESET_GPIO, false);
        self.delay_ms(1);
        hw_init::gpio_write(pins::PANEL_RESET_GPIO, true);
    }

    fn set_rotation(&mut self, orientation: Orientation) {
        // The MADCTL write belongs to the panel render stack; the adapter
        // records the target so that stack rebuilds against it.
        self.orientation = orientation;
        debug!("display: rotation -> {:?}", orientation);
    }
}

// ── Platform implementation ──────────────────────────────────

impl<P: OutputPin> Platform for HardwareAdapter<P> {
    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }

    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        info!("platform: restarting");
        unsafe { esp_idf_svc::sys::esp_restart() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        info!("platform(sim): restart requested");
    }
}

// ── Peripheral task registry ─────────────────────────────────

/// Run gate for the peripheral sensor tasks. Each sibling task polls
/// [`sensors_enabled`] at the top of its service routine; low-battery
/// entry flips the gate off to shed their load.
static SENSORS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Whether peripheral sensor tasks may run. Lock-free, callable from any
/// task.
pub fn sensors_enabled() -> bool {
    SENSORS_ENABLED.load(Ordering::Acquire)
}

/// [`SensorTasks`] adapter over the run gate.
pub struct PeripheralTasks;

impl PeripheralTasks {
    pub fn new() -> Self {
        Self
    }
}

impl SensorTasks for PeripheralTasks {
    fn disable_all(&mut self) {
        SENSORS_ENABLED.store(false, Ordering::Release);
        info!("tasks: peripheral sensors disabled");
    }
}
