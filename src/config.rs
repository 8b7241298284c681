//! System configuration parameters
//!
//! All tunable parameters for the WaveDeck UI core. The configuration is
//! built from defaults at boot and injected by value — the core itself
//! never persists it.

use serde::{Deserialize, Serialize};

/// Core UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    // --- Screens ---
    /// Content screen shown at boot (ordinal in the cycling range).
    pub start_screen: u8,

    // --- Gestures ---
    /// Minimum gap between two processed gestures (milliseconds).
    pub debounce_ms: u32,
    /// Window after display-off during which a latched event is treated
    /// as spurious and discarded (milliseconds).
    pub spurious_grace_ms: u32,
    /// Gesture sensor bring-up attempts at setup before giving up until
    /// the per-tick lazy retry.
    pub gesture_init_attempts: u8,
    /// Delay between bring-up attempts (milliseconds).
    pub gesture_init_retry_ms: u32,

    // --- Display ---
    /// Visual pause accompanying rotate/swipe transitions (milliseconds).
    pub transition_pause_ms: u32,
    /// Settle time after a panel re-init before the backlight comes on,
    /// avoiding a white flash (milliseconds).
    pub panel_settle_ms: u32,
    /// Backlight auto-off timeout with no user interaction (milliseconds).
    pub backlight_timeout_ms: u32,
    /// Extended timeout used above `soc_charged_threshold`, when the
    /// device is most likely on external power (milliseconds).
    pub backlight_timeout_charged_ms: u32,
    /// Allowance subtracted from a screen's refresh period to absorb
    /// scheduler jitter (milliseconds).
    pub render_slack_ms: u32,

    // --- Battery ---
    /// Calibrated cell voltage corresponding to 0 % charge.
    pub volt_low: f32,
    /// Calibrated cell voltage corresponding to 100 % charge.
    pub volt_high: f32,
    /// Cadence of voltage/charge sampling into the smoothing windows
    /// (milliseconds); independent of the UI tick period.
    pub battery_sample_interval_ms: u32,
    /// Smoothed charge above which the extended backlight timeout applies.
    pub soc_charged_threshold: f32,
    /// Settle time after fuel-gauge quick-start before the first sample
    /// is trusted (milliseconds).
    pub fuel_gauge_settle_ms: u32,
    /// Settle time before the recharge-triggered restart (milliseconds).
    pub restart_settle_ms: u32,

    // --- Reporting ---
    /// Telemetry report interval (seconds).
    pub telemetry_interval_secs: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            // Screens
            start_screen: 1,

            // Gestures
            debounce_ms: 1000,
            spurious_grace_ms: 500,
            gesture_init_attempts: 3,
            gesture_init_retry_ms: 2000,

            // Display
            transition_pause_ms: 250,
            panel_settle_ms: 10,
            backlight_timeout_ms: 30_000,
            backlight_timeout_charged_ms: 120_000,
            render_slack_ms: 50,

            // Battery
            volt_low: 3.3,
            volt_high: 4.2,
            battery_sample_interval_ms: 10_000,
            soc_charged_threshold: 95.0,
            fuel_gauge_settle_ms: 1000,
            restart_settle_ms: 1000,

            // Reporting
            telemetry_interval_secs: 60,
        }
    }
}

impl UiConfig {
    /// Voltage midpoint between the calibrated bounds — the recharge
    /// hysteresis threshold for leaving low-battery mode via restart.
    pub fn volt_recharged(&self) -> f32 {
        (self.volt_low + self.volt_high) / 2.0
    }
}
