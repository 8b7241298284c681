//! UI service — the hexagonal core.
//!
//! [`UiService`] owns the screen router, power monitor, and top bar, and
//! composes them once per scheduler tick. It is the only component the
//! task host invokes. All I/O flows through port traits injected at call
//! sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  GestureDriver ──▶ ┌──────────────────────────┐ ──▶ DisplayControl
//!  FuelGauge     ──▶ │        UiService          │ ──▶ BarPainter
//!  StatusSource  ──▶ │  Router · Power · TopBar  │ ──▶ TickHost
//!                    └──────────────────────────┘ ──▶ EventSink
//! ```
//!
//! Tick order is a hard guarantee: power directives are evaluated before
//! any gesture handling, so a low-battery override always wins a race
//! against a pending user swipe.

use log::{debug, info, warn};

use crate::config::UiConfig;
use crate::events;
use crate::gesture::{remap, UiEvent};
use crate::power::{PowerDirective, PowerMonitor};
use crate::screen::topbar::TopBar;
use crate::screen::{ScreenId, ScreenRouter, Step};

use super::events::{AppEvent, TelemetryData};
use super::ports::{
    BarPainter, DisplayControl, EventSink, FuelGauge, GestureDriver, Platform, ScreenProvider,
    SensorTasks, StatusSource, TickHost,
};

// ───────────────────────────────────────────────────────────────
// UiService
// ───────────────────────────────────────────────────────────────

/// The UI service orchestrates all domain logic.
pub struct UiService {
    config: UiConfig,
    screens: Box<dyn ScreenProvider>,
    router: ScreenRouter,
    power: PowerMonitor,
    topbar: TopBar,
    display_on: bool,
    /// Timestamp of the last accepted user interaction (backlight anchor).
    last_interaction_ms: u32,
    /// Timestamp of the last processed gesture (debounce anchor).
    last_processed_ms: u32,
    gesture_ready: bool,
    /// Period currently programmed into the task host.
    period_ms: u32,
    tick_count: u64,
}

impl UiService {
    /// Construct the service from configuration and a screen factory.
    ///
    /// Does **not** touch hardware — call [`setup`](Self::setup) next.
    pub fn new(config: UiConfig, screens: Box<dyn ScreenProvider>) -> Self {
        let count = screens.content_count();
        let mut start = config.start_screen;
        if start == 0 || start >= count {
            warn!("ui: start screen {} out of range, using 1", start);
            start = 1;
        }
        let router = ScreenRouter::new(screens.as_ref(), ScreenId::Content(start));
        let power = PowerMonitor::new(&config);

        Self {
            config,
            screens,
            router,
            power,
            topbar: TopBar::new(),
            display_on: false,
            last_interaction_ms: 0,
            last_processed_ms: 0,
            gesture_ready: false,
            period_ms: 0,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// One-shot bring-up: prime the fuel gauge, initialise the gesture
    /// sensor (bounded retries), activate the first screen, and program
    /// the host period. The gesture ISR must be attached **after** this
    /// returns so no edge can race the latch reset.
    pub fn setup(
        &mut self,
        now_ms: u32,
        hw: &mut (impl GestureDriver + FuelGauge + DisplayControl + Platform),
        painter: &mut impl BarPainter,
        status: &impl StatusSource,
        host: &mut impl TickHost,
        sink: &mut impl EventSink,
    ) {
        info!("ui: setup");

        // Fuel gauge: power-on-reset, restart the charge model, and give
        // the cell voltage a moment to settle before the seed reading.
        hw.reset();
        hw.quick_start();
        hw.delay_ms(self.config.fuel_gauge_settle_ms);
        self.power.seed(now_ms, hw.cell_voltage());

        self.gesture_ready = self.bring_up_gesture(hw);

        // Throw away whatever the chip latched before we were listening,
        // and start from a clean service-side latch.
        let _ = hw.read_gesture();
        events::reset();

        self.router.activate_current();
        self.router.screen_mut().render();
        self.router.mark_rendered(now_ms);
        if !self.router.screen().is_full_screen() {
            self.topbar
                .render(true, status, self.battery_percent(), painter);
        }
        self.apply_period(host);

        hw.backlight(true);
        self.display_on = true;
        self.last_interaction_ms = now_ms;

        sink.emit(&AppEvent::Started(self.router.id()));
        info!(
            "ui: ready on '{}' ({:.2} V)",
            self.router.screen().name(),
            self.power.volts()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full service cycle: battery sampling → power directives →
    /// gesture dispatch / backlight timeout → render pass → period check.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl GestureDriver + FuelGauge + DisplayControl + Platform),
        painter: &mut impl BarPainter,
        status: &impl StatusSource,
        tasks: &mut impl SensorTasks,
        host: &mut impl TickHost,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // Gesture sensor may have failed at boot; keep trying.
        if !self.gesture_ready {
            warn!("ui: gesture sensor not initialised — retrying");
            self.gesture_ready = hw.init().is_ok();
        }

        // Battery sampling runs on its own cadence, not the tick period.
        if self.power.sample_due(now_ms) {
            let volts = hw.cell_voltage();
            self.power.sample(now_ms, volts);
            debug!(
                "power: sample {:.3} V, avg {:.3} V / {:.1} %",
                volts,
                self.power.volts(),
                self.power.soc()
            );
        }

        // Power transitions outrank everything below.
        match self.power.evaluate(self.router.id().is_low_battery()) {
            PowerDirective::EnterLowBattery => {
                self.enter_low_battery(hw, painter, status, tasks, host, sink);
            }
            PowerDirective::Restart => {
                sink.emit(&AppEvent::RestartScheduled {
                    volts: self.power.volts(),
                });
                hw.delay_ms(self.config.restart_settle_ms);
                hw.restart();
                return;
            }
            PowerDirective::None => {}
        }

        if events::pending() {
            // Debounce: the latch stays set until the window opens, so a
            // deferred event is serviced on a later tick, never lost.
            if now_ms.wrapping_sub(self.last_processed_ms) >= self.config.debounce_ms {
                self.last_processed_ms = now_ms;
                if let Some(at_ms) = events::acknowledge() {
                    debug!(
                        "ui: gesture serviced {} ms after the edge",
                        now_ms.wrapping_sub(at_ms)
                    );
                    self.last_interaction_ms = now_ms;
                    self.process_event(hw, painter, status, host, sink);
                }
            }
        } else if self.display_on
            && now_ms.wrapping_sub(self.last_interaction_ms) > self.power.backlight_timeout_ms()
        {
            info!("ui: no interaction, switching display off");
            self.set_display(false, hw, sink);
        }

        // Render pass: only while the display is on, unless the screen
        // accumulates data and wants refreshes regardless.
        if (self.display_on || self.router.screen().refreshes_while_off())
            && self.router.render_due(now_ms, self.config.render_slack_ms)
        {
            if !self.router.screen().is_full_screen() {
                self.topbar
                    .render(false, status, self.battery_percent(), painter);
            }
            self.router.mark_rendered(now_ms);
            self.router.screen_mut().render();
        }

        // The active screen may have changed above; keep the host period
        // matched to its declared refresh rate.
        self.apply_period(host);
    }

    // ── Event dispatch ────────────────────────────────────────

    fn process_event(
        &mut self,
        hw: &mut (impl GestureDriver + DisplayControl + Platform),
        painter: &mut impl BarPainter,
        status: &impl StatusSource,
        host: &mut impl TickHost,
        sink: &mut impl EventSink,
    ) {
        let raw = hw.read_gesture();
        let mut event = remap(raw, self.router.orientation());

        // A dark display swallows the event: any gesture only wakes it.
        if !self.display_on {
            hw.panel_reset();
            hw.delay_ms(self.config.panel_settle_ms);
            self.set_display(true, hw, sink);
            return;
        }

        // Low-battery override: only dismiss is honoured.
        if self.router.id().is_low_battery() && event != UiEvent::Dismiss {
            event = UiEvent::None;
        }

        if event == UiEvent::None {
            return;
        }
        sink.emit(&AppEvent::Gesture(event));

        if event == UiEvent::Dismiss {
            self.set_display(false, hw, sink);
            // An edge latched right after the display goes dark is the
            // user's hand leaving the sensor field, not a new command.
            hw.delay_ms(self.config.spurious_grace_ms);
            if events::pending() {
                debug!("ui: spurious wake discarded");
                hw.cancel();
                events::discard();
            }
            return;
        }

        // The active screen sees the event before any default rule.
        if self.router.screen_mut().handle_event(event) {
            debug!("ui: event consumed by '{}'", self.router.screen().name());
            return;
        }

        match event {
            UiEvent::RotateCw => {
                self.rotate(false, hw, painter, status, host, sink);
            }
            UiEvent::RotateCcw => {
                self.rotate(true, hw, painter, status, host, sink);
            }
            UiEvent::SwipeRight => {
                self.swipe(Step::Next, hw, painter, status, host, sink);
            }
            UiEvent::SwipeLeft => {
                self.swipe(Step::Prev, hw, painter, status, host, sink);
            }
            // Screen-only events (no default transition), plus the two
            // variants already consumed above.
            UiEvent::SwipeUp
            | UiEvent::SwipeDown
            | UiEvent::ReverseDismiss
            | UiEvent::Wave
            | UiEvent::None
            | UiEvent::Dismiss => {}
        }
    }

    /// Toggle orientation; counter-clockwise additionally lands on the
    /// setup screen.
    fn rotate(
        &mut self,
        to_setup: bool,
        hw: &mut (impl DisplayControl + Platform),
        painter: &mut impl BarPainter,
        status: &impl StatusSource,
        host: &mut impl TickHost,
        sink: &mut impl EventSink,
    ) {
        // Leave the rotation glyph visible for a beat.
        hw.delay_ms(self.config.transition_pause_ms);

        let orientation = self.router.toggle_orientation();
        hw.set_rotation(orientation);
        sink.emit(&AppEvent::OrientationChanged(orientation));

        // Same instance, full redraw in the new orientation.
        self.router.reactivate_in_place();
        if !self.router.screen().is_full_screen() {
            self.topbar
                .render(true, status, self.battery_percent(), painter);
        }

        if to_setup {
            let from = self.router.id();
            self.router.transition(self.screens.as_ref(), ScreenId::Setup);
            sink.emit(&AppEvent::ScreenChanged {
                from,
                to: ScreenId::Setup,
            });
            if !self.router.screen().is_full_screen() {
                self.topbar
                    .render(true, status, self.battery_percent(), painter);
            }
            self.apply_period(host);
        }
    }

    fn swipe(
        &mut self,
        step: Step,
        hw: &mut impl Platform,
        painter: &mut impl BarPainter,
        status: &impl StatusSource,
        host: &mut impl TickHost,
        sink: &mut impl EventSink,
    ) {
        let Some(target) = self.router.step_target(self.screens.content_count(), step) else {
            return;
        };

        // Leave the swipe arrow visible for a beat.
        hw.delay_ms(self.config.transition_pause_ms);

        let from = self.router.id();
        self.router.transition(self.screens.as_ref(), target);
        sink.emit(&AppEvent::ScreenChanged { from, to: target });

        if !self.router.screen().is_full_screen() {
            self.topbar
                .render(true, status, self.battery_percent(), painter);
        }
        self.apply_period(host);
    }

    /// Force the low-battery override screen and power down everything
    /// that is not needed to show it.
    fn enter_low_battery(
        &mut self,
        hw: &mut (impl DisplayControl + Platform),
        painter: &mut impl BarPainter,
        status: &impl StatusSource,
        tasks: &mut impl SensorTasks,
        host: &mut impl TickHost,
        sink: &mut impl EventSink,
    ) {
        let volts = self.power.volts();
        warn!("ui: BATTERY LOW ({:.2} V) — halting sensors", volts);

        let from = self.router.id();
        self.router
            .transition(self.screens.as_ref(), ScreenId::LowBattery);

        // The warning must be visible even if the display was off.
        if !self.display_on {
            hw.panel_reset();
            hw.delay_ms(self.config.panel_settle_ms);
            self.set_display(true, hw, sink);
        }

        if !self.router.screen().is_full_screen() {
            self.topbar
                .render(true, status, self.battery_percent(), painter);
        }
        self.apply_period(host);

        tasks.disable_all();

        sink.emit(&AppEvent::LowBattery { volts });
        sink.emit(&AppEvent::ScreenChanged {
            from,
            to: ScreenId::LowBattery,
        });
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot. `native_soc` is the fuel gauge's own
    /// estimate, read by the caller; `uptime_secs` comes from the time
    /// adapter.
    pub fn build_telemetry(&self, native_soc: f32, uptime_secs: u64) -> TelemetryData {
        let mut screen: heapless::String<24> = heapless::String::new();
        for ch in self.router.screen().name().chars().take(24) {
            let _ = screen.push(ch);
        }
        TelemetryData {
            screen,
            volts: self.power.volts(),
            soc_percent: self.power.soc(),
            native_soc_percent: native_soc,
            display_on: self.display_on,
            orientation: self.router.orientation(),
            gesture_ready: self.gesture_ready,
            uptime_secs,
        }
    }

    /// Identity of the active screen.
    pub fn current_screen(&self) -> ScreenId {
        self.router.id()
    }

    /// Display name of the active screen.
    pub fn screen_name(&self) -> &str {
        self.router.screen().name()
    }

    pub fn display_on(&self) -> bool {
        self.display_on
    }

    pub fn gesture_ready(&self) -> bool {
        self.gesture_ready
    }

    /// Period currently programmed into the task host.
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Total service ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn bring_up_gesture(&self, hw: &mut (impl GestureDriver + Platform)) -> bool {
        for attempt in 1..=self.config.gesture_init_attempts {
            match hw.init() {
                Ok(()) => {
                    info!("ui: gesture sensor up (attempt {attempt})");
                    return true;
                }
                Err(e) => {
                    warn!("ui: gesture init attempt {attempt} failed: {e}");
                    hw.delay_ms(self.config.gesture_init_retry_ms);
                }
            }
        }
        false
    }

    fn set_display(
        &mut self,
        on: bool,
        hw: &mut impl DisplayControl,
        sink: &mut impl EventSink,
    ) {
        if self.display_on == on {
            return;
        }
        hw.backlight(on);
        self.display_on = on;
        sink.emit(&AppEvent::DisplayPower(on));
    }

    fn apply_period(&mut self, host: &mut impl TickHost) {
        // Queried live from the screen — never cached across transitions.
        let period = self.router.screen().refresh_period_ms();
        if period != self.period_ms {
            self.period_ms = period;
            host.set_period_ms(period);
        }
    }

    fn battery_percent(&self) -> u8 {
        self.power.soc().clamp(0.0, 100.0) as u8
    }
}
