//! The device's screen set and its factory.
//!
//! Per-screen visual content belongs to the panel render stack; what
//! lives here is everything the UI core contracts on — lifecycle, timing
//! metadata, and per-screen event policy. Each `render` hands off to the
//! stack through its own draw context (traced to the log until that
//! stack lands).

use log::debug;

use crate::app::ports::{Screen, ScreenProvider};
use crate::gesture::UiEvent;
use crate::screen::ScreenId;

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Content slots: reserved 0 + Status(1), Trends(2), Clock(3).
const CONTENT_COUNT: u8 = 4;

pub struct DeviceScreenProvider;

impl DeviceScreenProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ScreenProvider for DeviceScreenProvider {
    fn create(&self, id: ScreenId) -> Box<dyn Screen> {
        match id {
            ScreenId::Content(2) => Box::new(TrendsScreen::new()),
            ScreenId::Content(3) => Box::new(ClockScreen),
            // Ordinal 1 and any out-of-range ordinal land on Status.
            ScreenId::Content(_) => Box::new(StatusScreen),
            ScreenId::Setup => Box::new(SetupScreen::new()),
            ScreenId::LowBattery => Box::new(LowBattScreen),
        }
    }

    fn content_count(&self) -> u8 {
        CONTENT_COUNT
    }
}

// ---------------------------------------------------------------------------
// Status — live readings overview
// ---------------------------------------------------------------------------

struct StatusScreen;

impl Screen for StatusScreen {
    fn activate(&mut self) {
        debug!("screen 'Status': activate");
    }
    fn deactivate(&mut self) {
        debug!("screen 'Status': deactivate");
    }
    fn render(&mut self) {
        debug!("screen 'Status': render");
    }
    fn refresh_period_ms(&self) -> u32 {
        5_000
    }
    fn name(&self) -> &str {
        "Status"
    }
}

// ---------------------------------------------------------------------------
// Trends — rolling history plot
// ---------------------------------------------------------------------------

/// Accumulates one plot column per render, so it keeps refreshing while
/// the display is off — otherwise the chart would show a hole for every
/// dark interval.
struct TrendsScreen {
    columns: u32,
}

impl TrendsScreen {
    fn new() -> Self {
        Self { columns: 0 }
    }
}

impl Screen for TrendsScreen {
    fn activate(&mut self) {
        debug!("screen 'Trends': activate");
    }
    fn deactivate(&mut self) {
        debug!("screen 'Trends': deactivate");
    }
    fn render(&mut self) {
        self.columns = self.columns.wrapping_add(1);
        debug!("screen 'Trends': render (column {})", self.columns);
    }
    fn refresh_period_ms(&self) -> u32 {
        30_000
    }
    fn refreshes_while_off(&self) -> bool {
        true
    }
    fn name(&self) -> &str {
        "Trends"
    }
}

// ---------------------------------------------------------------------------
// Clock — full-screen time display
// ---------------------------------------------------------------------------

struct ClockScreen;

impl Screen for ClockScreen {
    fn activate(&mut self) {
        debug!("screen 'Clock': activate");
    }
    fn deactivate(&mut self) {
        debug!("screen 'Clock': deactivate");
    }
    fn render(&mut self) {
        debug!("screen 'Clock': render");
    }
    fn refresh_period_ms(&self) -> u32 {
        60_000
    }
    fn is_full_screen(&self) -> bool {
        true
    }
    fn name(&self) -> &str {
        "Clock"
    }
}

// ---------------------------------------------------------------------------
// Setup — settings menu (reserved slot)
// ---------------------------------------------------------------------------

/// The menu consumes vertical swipes for its cursor; horizontal swipes
/// fall through so the user can leave the way they arrived.
struct SetupScreen {
    cursor: u8,
}

const SETUP_MENU_ROWS: u8 = 5;

impl SetupScreen {
    fn new() -> Self {
        Self { cursor: 0 }
    }
}

impl Screen for SetupScreen {
    fn activate(&mut self) {
        debug!("screen 'Setup': activate");
    }
    fn deactivate(&mut self) {
        debug!("screen 'Setup': deactivate");
    }
    fn render(&mut self) {
        debug!("screen 'Setup': render (row {})", self.cursor);
    }
    fn handle_event(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::SwipeUp => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            UiEvent::SwipeDown => {
                self.cursor = (self.cursor + 1).min(SETUP_MENU_ROWS - 1);
                true
            }
            _ => false,
        }
    }
    fn refresh_period_ms(&self) -> u32 {
        500
    }
    fn name(&self) -> &str {
        "Setup"
    }
}

// ---------------------------------------------------------------------------
// Low battery — override screen (reserved slot)
// ---------------------------------------------------------------------------

struct LowBattScreen;

impl Screen for LowBattScreen {
    fn activate(&mut self) {
        debug!("screen 'Low battery': activate");
    }
    fn deactivate(&mut self) {
        debug!("screen 'Low battery': deactivate");
    }
    fn render(&mut self) {
        debug!("screen 'Low battery': render");
    }
    fn refresh_period_ms(&self) -> u32 {
        10_000
    }
    fn name(&self) -> &str {
        "Low battery"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_covers_every_identity() {
        let provider = DeviceScreenProvider::new();
        assert_eq!(provider.create(ScreenId::Content(1)).name(), "Status");
        assert_eq!(provider.create(ScreenId::Content(2)).name(), "Trends");
        assert_eq!(provider.create(ScreenId::Content(3)).name(), "Clock");
        assert_eq!(provider.create(ScreenId::Setup).name(), "Setup");
        assert_eq!(provider.create(ScreenId::LowBattery).name(), "Low battery");
    }

    #[test]
    fn content_count_matches_the_cycle() {
        let provider = DeviceScreenProvider::new();
        assert_eq!(provider.content_count(), CONTENT_COUNT);
        // Every ordinal in [1, count-1] resolves to a screen.
        for i in 1..provider.content_count() {
            let _ = provider.create(ScreenId::Content(i));
        }
    }

    #[test]
    fn setup_menu_consumes_vertical_swipes_only() {
        let provider = DeviceScreenProvider::new();
        let mut setup = provider.create(ScreenId::Setup);
        assert!(setup.handle_event(UiEvent::SwipeDown));
        assert!(setup.handle_event(UiEvent::SwipeUp));
        assert!(!setup.handle_event(UiEvent::SwipeLeft));
        assert!(!setup.handle_event(UiEvent::SwipeRight));
    }

    #[test]
    fn only_the_clock_owns_the_full_panel() {
        let provider = DeviceScreenProvider::new();
        assert!(provider.create(ScreenId::Content(3)).is_full_screen());
        assert!(!provider.create(ScreenId::Content(1)).is_full_screen());
        assert!(!provider.create(ScreenId::LowBattery).is_full_screen());
    }

    #[test]
    fn only_trends_refreshes_while_off() {
        let provider = DeviceScreenProvider::new();
        assert!(provider.create(ScreenId::Content(2)).refreshes_while_off());
        assert!(!provider.create(ScreenId::Content(1)).refreshes_while_off());
    }
}
