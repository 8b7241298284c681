//! Port traits — the hexagonal boundary between the UI core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ UiService (domain)
//! ```
//!
//! Driven adapters (gesture chip, fuel gauge, display, screens, task host)
//! implement these traits. The [`UiService`](super::service::UiService)
//! consumes them via generics, so the core never touches hardware directly
//! and every scenario in `tests/` runs against recording mocks.

use crate::error::GestureError;
use crate::gesture::{Orientation, RawGesture, UiEvent};
use crate::screen::ScreenId;

// ───────────────────────────────────────────────────────────────
// Screen port (driven adapter: UI content → domain)
// ───────────────────────────────────────────────────────────────

/// One live data screen. The router owns exactly one boxed instance at a
/// time and drives it through this lifecycle:
///
/// - `activate` — exactly once, after construction and before any render.
/// - `render` — any number of times; must be idempotent for unchanged data.
/// - `deactivate` — exactly once, immediately before the instance is
///   dropped (or before an in-place re-activate on rotation).
///
/// Timing metadata is re-queried after every activation; the router never
/// caches it across transitions.
pub trait Screen {
    fn activate(&mut self);
    fn deactivate(&mut self);
    fn render(&mut self);

    /// Offered every logical event before the default transition rule.
    /// Returning `true` consumes the event: no screen change happens.
    fn handle_event(&mut self, event: UiEvent) -> bool {
        let _ = event;
        false
    }

    /// How often this screen wants to be re-rendered.
    fn refresh_period_ms(&self) -> u32;

    /// Full-screen content owns the top-bar area too.
    fn is_full_screen(&self) -> bool {
        false
    }

    /// Whether `render` keeps running while the display is off
    /// (e.g. screens that accumulate history).
    fn refreshes_while_off(&self) -> bool {
        false
    }

    fn name(&self) -> &str;
}

/// Factory keyed by identity. The router constructs and destroys screens
/// through this — never two live instances at once.
pub trait ScreenProvider {
    fn create(&self, id: ScreenId) -> Box<dyn Screen>;

    /// Number of content slots including the reserved index 0; the swipe
    /// cycle wraps within `[1, content_count - 1]`.
    fn content_count(&self) -> u8;
}

// ───────────────────────────────────────────────────────────────
// Gesture sensor port
// ───────────────────────────────────────────────────────────────

/// Service-time face of the gesture chip. The interrupt line itself stays
/// outside this trait — the bottom half only touches the latch in
/// [`crate::events`].
pub trait GestureDriver {
    /// Bring the chip up. Retried a bounded number of times at setup and
    /// lazily once per tick until it succeeds.
    fn init(&mut self) -> Result<(), GestureError>;

    /// Read and consume the latched gesture code.
    fn read_gesture(&mut self) -> RawGesture;

    /// Abort any in-flight gesture recognition (spurious-wake cleanup).
    fn cancel(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Fuel gauge port
// ───────────────────────────────────────────────────────────────

/// Battery fuel gauge (cell voltage + native charge model).
pub trait FuelGauge {
    /// Power-on-reset of the gauge.
    fn reset(&mut self);

    /// Restart the gauge's internal model from the present voltage.
    fn quick_start(&mut self);

    /// Instantaneous cell voltage in volts.
    fn cell_voltage(&mut self) -> f32;

    /// The gauge's own state-of-charge estimate (0–100).
    fn native_soc(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Display / backlight port
// ───────────────────────────────────────────────────────────────

/// Backlight power and panel housekeeping. Pixel drawing is owned by the
/// screens and the top-bar painter, never by the core.
pub trait DisplayControl {
    /// Switch the backlight supply.
    fn backlight(&mut self, on: bool);

    /// Re-initialise the panel controller (safe power-cycling before the
    /// backlight comes back on).
    fn panel_reset(&mut self);

    /// Rotate the panel to match the logical orientation.
    fn set_rotation(&mut self, orientation: Orientation);
}

// ───────────────────────────────────────────────────────────────
// Top-bar painter port
// ───────────────────────────────────────────────────────────────

/// Field-level draw primitives for the top information bar. The
/// change-detector calls these only when a field's value actually changed
/// (or a full redraw was forced) — every call hits the slow panel bus.
pub trait BarPainter {
    fn draw_date(&mut self, text: &str);
    fn draw_time(&mut self, text: &str);
    fn draw_location(&mut self, text: &str);
    /// `None` = no link; rendered as the disconnected glyph.
    fn draw_signal(&mut self, dbm: Option<i8>);
    fn draw_battery(&mut self, percent: u8);
    /// Separator between the bar and the screen area.
    fn draw_separator(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Time / link status port
// ───────────────────────────────────────────────────────────────

/// Calendar fields for the top bar. Only produced once the time source
/// has a valid synchronisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    pub year: u16,
    /// 1–12.
    pub month: u8,
    /// 1–31.
    pub day: u8,
    /// 0 = Sunday … 6 = Saturday.
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
}

/// Read-side status consumed by the top bar.
pub trait StatusSource {
    /// Calendar time, or `None` while no valid sync has ever completed.
    fn wall_clock(&self) -> Option<WallClock>;

    /// Resolved locality string ("City CC"), when known and connected.
    fn locality(&self) -> Option<heapless::String<24>>;

    /// Link signal strength in dBm; `None` when disconnected.
    fn signal_dbm(&self) -> Option<i8>;
}

// ───────────────────────────────────────────────────────────────
// Sibling-task registry port
// ───────────────────────────────────────────────────────────────

/// Handle over the peripheral sensor tasks. The UI core only ever disables
/// them — once, on low-battery entry, to stretch the remaining charge.
pub trait SensorTasks {
    fn disable_all(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Platform port
// ───────────────────────────────────────────────────────────────

/// Bounded blocking waits and clean-slate recovery.
pub trait Platform {
    /// Block the (single) service context for `ms`. Used for transition
    /// effects and settle windows — always short and bounded.
    fn delay_ms(&mut self, ms: u32);

    /// Request a full device restart. May return in host tests; on the
    /// device it does not.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Task host port
// ───────────────────────────────────────────────────────────────

/// The periodic scheduler that invokes the service. The out-of-band
/// "run now" path is the wake flag in [`crate::events`], polled by the
/// host between periods.
pub trait TickHost {
    /// Reprogram the service period, effective at the next opportunity.
    fn set_period_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Emission is best-effort: adapters must never block
/// the state machine on a slow or failing transport.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
