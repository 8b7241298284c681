//! Outbound application events.
//!
//! The [`UiService`](super::service::UiService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, forward to a syslog
//! collector, update a debug console, etc.

use crate::gesture::{Orientation, UiEvent};
use crate::screen::ScreenId;

/// Structured events emitted by the UI core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service finished setup (carries the initial screen).
    Started(ScreenId),

    /// A processed user gesture, after orientation remapping.
    Gesture(UiEvent),

    /// The active screen changed.
    ScreenChanged { from: ScreenId, to: ScreenId },

    /// The display orientation toggled.
    OrientationChanged(Orientation),

    /// Backlight switched on or off.
    DisplayPower(bool),

    /// Smoothed voltage crossed the low bound; the low-battery override
    /// screen is now active and peripheral tasks are disabled.
    LowBattery { volts: f32 },

    /// Recharge detected while in low-battery mode; a device restart has
    /// been requested.
    RestartScheduled { volts: f32 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time snapshot suitable for logging or transmission.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub screen: heapless::String<24>,
    pub volts: f32,
    pub soc_percent: f32,
    pub native_soc_percent: f32,
    pub display_on: bool,
    pub orientation: Orientation,
    pub gesture_ready: bool,
    pub uptime_secs: u64,
}
