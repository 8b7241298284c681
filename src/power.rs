//! Battery tracking and power-state supervision.
//!
//! The monitor runs **every tick before gesture handling** and decides the
//! two transitions that outrank any user input:
//!
//! 1. Smoothed voltage at or below the calibrated low bound → force the
//!    dedicated low-battery screen and shut down peripheral sensor tasks.
//! 2. Smoothed voltage back above the low/high midpoint while in
//!    low-battery mode → request a full restart. Clean-slate recovery is
//!    deliberate: no attempt is made to resurrect the pre-brownout state
//!    in place.
//!
//! Voltage and state of charge are sampled on a fixed 10 s cadence
//! (independent of the UI tick period) into fixed smoothing windows, so
//! sensor-induced current peaks cannot fake a brownout.

use crate::config::UiConfig;
use crate::smoothing::SmoothingBuffer;
use log::info;

/// Samples held in each smoothing window — at the 10 s cadence this damps
/// roughly a minute of load transients.
const AVERAGING_WINDOW: usize = 6;

/// What the monitor wants the service to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerDirective {
    /// Nothing to do.
    None,
    /// Voltage crossed the low bound — switch to the low-battery screen
    /// and disable peripheral tasks.
    EnterLowBattery,
    /// Voltage recovered past the hysteresis midpoint — restart the
    /// device after a short settle. Issued exactly once.
    Restart,
}

pub struct PowerMonitor {
    volt_low: f32,
    volt_high: f32,
    volt_recharged: f32,
    sample_interval_ms: u32,
    soc_charged_threshold: f32,
    backlight_base_ms: u32,
    backlight_charged_ms: u32,
    avg_volt: SmoothingBuffer<AVERAGING_WINDOW>,
    avg_soc: SmoothingBuffer<AVERAGING_WINDOW>,
    last_sample_ms: u32,
    /// Set once the restart directive has been issued, so a slow settle
    /// never produces a second restart request.
    restart_latched: bool,
}

impl PowerMonitor {
    pub fn new(config: &UiConfig) -> Self {
        Self {
            volt_low: config.volt_low,
            volt_high: config.volt_high,
            volt_recharged: config.volt_recharged(),
            sample_interval_ms: config.battery_sample_interval_ms,
            soc_charged_threshold: config.soc_charged_threshold,
            backlight_base_ms: config.backlight_timeout_ms,
            backlight_charged_ms: config.backlight_timeout_charged_ms,
            avg_volt: SmoothingBuffer::new(),
            avg_soc: SmoothingBuffer::new(),
            last_sample_ms: 0,
            restart_latched: false,
        }
    }

    /// Seed both windows with the first trusted gauge reading, so the
    /// means are defined before the first cadenced sample lands.
    pub fn seed(&mut self, now_ms: u32, volts: f32) {
        self.last_sample_ms = now_ms;
        self.record(volts);
    }

    /// Whether the sampling cadence has elapsed.
    pub fn sample_due(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_sample_ms) >= self.sample_interval_ms
    }

    /// Push one raw voltage reading and its derived state of charge into
    /// the smoothing windows. Call when `sample_due` reports true.
    pub fn sample(&mut self, now_ms: u32, volts: f32) {
        self.last_sample_ms = now_ms;
        self.record(volts);
    }

    fn record(&mut self, volts: f32) {
        self.avg_volt.push(volts);
        self.avg_soc.push(self.soc_from(volts));
    }

    /// Linear state-of-charge approximation on voltage. Deliberately not
    /// the gauge's native model: the linear ramp lets the device discharge
    /// below the gauge's nominal 0 % before the low-voltage cutoff.
    fn soc_from(&self, volts: f32) -> f32 {
        let soc = 100.0 / (self.volt_high - self.volt_low) * (volts - self.volt_low);
        soc.clamp(0.0, 100.0)
    }

    /// Smoothed cell voltage.
    pub fn volts(&self) -> f32 {
        self.avg_volt.mean()
    }

    /// Smoothed state of charge (0–100).
    pub fn soc(&self) -> f32 {
        self.avg_soc.mean()
    }

    /// Evaluate the guarded power transitions. `low_battery_active` is
    /// whether the low-battery screen currently owns the display.
    pub fn evaluate(&mut self, low_battery_active: bool) -> PowerDirective {
        let volts = self.volts();

        if volts <= self.volt_low {
            if low_battery_active {
                // Already parked on the low-battery screen.
                return PowerDirective::None;
            }
            return PowerDirective::EnterLowBattery;
        }

        if low_battery_active && volts > self.volt_recharged && !self.restart_latched {
            self.restart_latched = true;
            info!(
                "power: recharged to {:.2} V (> {:.2} V), restart requested",
                volts, self.volt_recharged
            );
            return PowerDirective::Restart;
        }

        PowerDirective::None
    }

    /// Backlight auto-off timeout for the current charge level. Above the
    /// charged threshold the device is most likely on external power, so
    /// the screen stays on longer.
    pub fn backlight_timeout_ms(&self) -> u32 {
        if self.soc() > self.soc_charged_threshold {
            self.backlight_charged_ms
        } else {
            self.backlight_base_ms
        }
    }

    pub fn restart_latched(&self) -> bool {
        self.restart_latched
    }
}
