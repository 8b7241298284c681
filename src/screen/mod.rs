//! Screen identity and the screen lifecycle engine.
//!
//! ```text
//!        SwipeRight                SwipeRight
//!   ┌──▶ Content(1) ──▶ Content(2) ──▶ … ──▶ Content(count-1) ─┐
//!   │                                                          │
//!   └──────────────────────────────────────────────────────────┘
//!              (SwipeLeft cycles the other way; 0 is reserved)
//!
//!   RotateCcw ──▶ Setup          volts ≤ low ──▶ LowBattery (override)
//! ```
//!
//! The router owns the single live [`Screen`] instance and performs every
//! construct/activate/deactivate/drop sequence. Policy — which event causes
//! which transition, power overrides, display gating — lives in the
//! [`UiService`](crate::app::service::UiService); the router guarantees the
//! lifecycle contract can't be violated from outside.

pub mod topbar;

use crate::app::ports::{Screen, ScreenProvider};
use crate::gesture::Orientation;
use log::info;

// ---------------------------------------------------------------------------
// Screen identity
// ---------------------------------------------------------------------------

/// Identity of one screen variant. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenId {
    /// Cycling data screen; ordinal in `[1, content_count - 1]`
    /// (ordinal 0 is the reserved slot occupied by `Setup`).
    Content(u8),
    /// Reserved settings screen, entered via the counter-clockwise gesture.
    Setup,
    /// Reserved low-battery override screen, entered only by the power
    /// monitor.
    LowBattery,
}

impl ScreenId {
    pub fn is_low_battery(self) -> bool {
        matches!(self, Self::LowBattery)
    }
}

/// Swipe direction through the content cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Right swipe — increment the ordinal.
    Next,
    /// Left swipe — decrement the ordinal.
    Prev,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Zero-sized stand-in held for the instant between freeing one screen
/// and constructing the next. Never activated, rendered, or observed.
struct Vacant;

impl Screen for Vacant {
    fn activate(&mut self) {}
    fn deactivate(&mut self) {}
    fn render(&mut self) {}
    fn refresh_period_ms(&self) -> u32 {
        u32::MAX
    }
    fn name(&self) -> &str {
        ""
    }
}

/// Owns the current screen and applies lifecycle transitions.
pub struct ScreenRouter {
    current: Box<dyn Screen>,
    current_id: ScreenId,
    orientation: Orientation,
    /// `None` forces a render at the next opportunity.
    last_render_ms: Option<u32>,
}

impl ScreenRouter {
    /// Construct the initial screen. It is **not** activated yet — the
    /// service activates it during setup, once the hardware is up.
    pub fn new(provider: &dyn ScreenProvider, id: ScreenId) -> Self {
        Self {
            current: provider.create(id),
            current_id: id,
            orientation: Orientation::default(),
            last_render_ms: None,
        }
    }

    pub fn id(&self) -> ScreenId {
        self.current_id
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn screen(&self) -> &dyn Screen {
        self.current.as_ref()
    }

    pub fn screen_mut(&mut self) -> &mut dyn Screen {
        self.current.as_mut()
    }

    /// Activate the initial screen (setup-time only).
    pub fn activate_current(&mut self) {
        self.current.activate();
    }

    /// Replace the current screen: deactivate and drop the old instance,
    /// then construct and activate the new one. The old screen is freed
    /// before its replacement is built — the heap never holds two.
    pub fn transition(&mut self, provider: &dyn ScreenProvider, to: ScreenId) {
        info!("screen: {:?} -> {:?}", self.current_id, to);
        self.current.deactivate();
        self.current = Box::new(Vacant);
        self.current = provider.create(to);
        self.current_id = to;
        self.current.activate();
        self.last_render_ms = None;
    }

    /// Deactivate and re-activate the current screen in place (no
    /// destruction), forcing a full redraw on the next render check.
    pub fn reactivate_in_place(&mut self) {
        self.current.deactivate();
        self.current.activate();
        self.last_render_ms = None;
    }

    /// Flip the orientation and return the new value.
    pub fn toggle_orientation(&mut self) -> Orientation {
        self.orientation = self.orientation.toggled();
        self.orientation
    }

    /// Where a swipe leads from the current identity, or `None` when
    /// swipes don't move this screen. The cycle wraps within
    /// `[1, content_count - 1]`; `Setup` occupies the reserved slot 0, so
    /// swiping off it re-enters the cycle at either boundary.
    pub fn step_target(&self, content_count: u8, step: Step) -> Option<ScreenId> {
        let last = content_count - 1;
        match (self.current_id, step) {
            (ScreenId::Content(i), Step::Next) => {
                Some(ScreenId::Content(if i >= last { 1 } else { i + 1 }))
            }
            (ScreenId::Content(i), Step::Prev) => {
                Some(ScreenId::Content(if i <= 1 { last } else { i - 1 }))
            }
            (ScreenId::Setup, Step::Next) => Some(ScreenId::Content(1)),
            (ScreenId::Setup, Step::Prev) => Some(ScreenId::Content(last)),
            (ScreenId::LowBattery, _) => None,
        }
    }

    /// Whether the current screen's refresh period has elapsed. A small
    /// slack absorbs scheduler jitter so a period-length tick still
    /// qualifies.
    pub fn render_due(&self, now_ms: u32, slack_ms: u32) -> bool {
        match self.last_render_ms {
            None => true,
            Some(last) => {
                let period = self.current.refresh_period_ms();
                now_ms.wrapping_sub(last) >= period.saturating_sub(slack_ms)
            }
        }
    }

    pub fn mark_rendered(&mut self, now_ms: u32) {
        self.last_render_ms = Some(now_ms);
    }
}
