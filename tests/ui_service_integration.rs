//! Integration tests: UiService → router/power/topbar → ports.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

use wavedeck::app::events::AppEvent;
use wavedeck::app::ports::{
    BarPainter, DisplayControl, EventSink, FuelGauge, GestureDriver, Platform, Screen,
    ScreenProvider, SensorTasks, StatusSource, TickHost, WallClock,
};
use wavedeck::app::service::UiService;
use wavedeck::config::UiConfig;
use wavedeck::error::GestureError;
use wavedeck::events;
use wavedeck::gesture::{Orientation, RawGesture, UiEvent};
use wavedeck::screen::ScreenId;

// ── Test lock ─────────────────────────────────────────────────
//
// The gesture latch is process-wide; every test that drives the service
// serialises on this and starts from a clean latch.

static LATCH_LOCK: Mutex<()> = Mutex::new(());

fn locked() -> MutexGuard<'static, ()> {
    let guard = LATCH_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    events::reset();
    guard
}

// ── Mock screens & provider ───────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lifecycle {
    Created(ScreenId),
    Activated(ScreenId),
    Deactivated(ScreenId),
    Rendered(ScreenId),
    Handled(ScreenId, UiEvent),
}

type LifecycleLog = Rc<RefCell<Vec<Lifecycle>>>;

struct MockScreen {
    id: ScreenId,
    period_ms: u32,
    consume_all: bool,
    log: LifecycleLog,
}

impl Screen for MockScreen {
    fn activate(&mut self) {
        self.log.borrow_mut().push(Lifecycle::Activated(self.id));
    }
    fn deactivate(&mut self) {
        self.log.borrow_mut().push(Lifecycle::Deactivated(self.id));
    }
    fn render(&mut self) {
        self.log.borrow_mut().push(Lifecycle::Rendered(self.id));
    }
    fn handle_event(&mut self, event: UiEvent) -> bool {
        self.log.borrow_mut().push(Lifecycle::Handled(self.id, event));
        self.consume_all
    }
    fn refresh_period_ms(&self) -> u32 {
        self.period_ms
    }
    fn name(&self) -> &str {
        "mock"
    }
}

struct MockProvider {
    /// Content screens' event handlers consume everything when set.
    consume_all: bool,
    log: LifecycleLog,
}

impl ScreenProvider for MockProvider {
    fn create(&self, id: ScreenId) -> Box<dyn Screen> {
        self.log.borrow_mut().push(Lifecycle::Created(id));
        let period_ms = match id {
            ScreenId::Content(i) => 1000 * u32::from(i),
            ScreenId::Setup => 500,
            ScreenId::LowBattery => 10_000,
        };
        Box::new(MockScreen {
            id,
            period_ms,
            consume_all: self.consume_all && matches!(id, ScreenId::Content(_)),
            log: self.log.clone(),
        })
    }

    fn content_count(&self) -> u8 {
        4
    }
}

// ── Mock hardware ─────────────────────────────────────────────

struct MockHw {
    init_ok: bool,
    init_calls: u32,
    next_gesture: Option<RawGesture>,
    gesture_reads: u32,
    cancels: u32,
    volts: f32,
    gauge_resets: u32,
    quick_starts: u32,
    backlight: Vec<bool>,
    panel_resets: u32,
    rotations: Vec<Orientation>,
    delays: Vec<u32>,
    restarts: u32,
    /// Latch a fresh edge while the dismiss grace delay runs, emulating
    /// the user's hand leaving the sensor field.
    inject_spurious_on_grace: bool,
}

impl MockHw {
    fn new(volts: f32) -> Self {
        Self {
            init_ok: true,
            init_calls: 0,
            next_gesture: None,
            gesture_reads: 0,
            cancels: 0,
            volts,
            gauge_resets: 0,
            quick_starts: 0,
            backlight: Vec::new(),
            panel_resets: 0,
            rotations: Vec::new(),
            delays: Vec::new(),
            restarts: 0,
            inject_spurious_on_grace: false,
        }
    }

    fn display_on(&self) -> bool {
        self.backlight.last().copied().unwrap_or(false)
    }
}

impl GestureDriver for MockHw {
    fn init(&mut self) -> Result<(), GestureError> {
        self.init_calls += 1;
        if self.init_ok {
            Ok(())
        } else {
            Err(GestureError::NotResponding)
        }
    }
    fn read_gesture(&mut self) -> RawGesture {
        self.gesture_reads += 1;
        self.next_gesture.take().unwrap_or(RawGesture::None)
    }
    fn cancel(&mut self) {
        self.cancels += 1;
    }
}

impl FuelGauge for MockHw {
    fn reset(&mut self) {
        self.gauge_resets += 1;
    }
    fn quick_start(&mut self) {
        self.quick_starts += 1;
    }
    fn cell_voltage(&mut self) -> f32 {
        self.volts
    }
    fn native_soc(&mut self) -> f32 {
        50.0
    }
}

impl DisplayControl for MockHw {
    fn backlight(&mut self, on: bool) {
        self.backlight.push(on);
    }
    fn panel_reset(&mut self) {
        self.panel_resets += 1;
    }
    fn set_rotation(&mut self, orientation: Orientation) {
        self.rotations.push(orientation);
    }
}

impl Platform for MockHw {
    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        if self.inject_spurious_on_grace && ms == UiConfig::default().spurious_grace_ms {
            events::gesture_isr(999_999);
        }
    }
    fn restart(&mut self) {
        self.restarts += 1;
    }
}

// ── Mock painter / status / tasks / host / sink ───────────────

#[derive(Default)]
struct MockPainter {
    dates: u32,
    times: u32,
    batteries: Vec<u8>,
}

impl BarPainter for MockPainter {
    fn draw_date(&mut self, _text: &str) {
        self.dates += 1;
    }
    fn draw_time(&mut self, _text: &str) {
        self.times += 1;
    }
    fn draw_location(&mut self, _text: &str) {}
    fn draw_signal(&mut self, _dbm: Option<i8>) {}
    fn draw_battery(&mut self, percent: u8) {
        self.batteries.push(percent);
    }
    fn draw_separator(&mut self) {}
}

struct MockStatus;

impl StatusSource for MockStatus {
    fn wall_clock(&self) -> Option<WallClock> {
        None
    }
    fn locality(&self) -> Option<heapless::String<24>> {
        None
    }
    fn signal_dbm(&self) -> Option<i8> {
        None
    }
}

#[derive(Default)]
struct MockTasks {
    disabled: u32,
}

impl SensorTasks for MockTasks {
    fn disable_all(&mut self) {
        self.disabled += 1;
    }
}

#[derive(Default)]
struct MockHost {
    periods: Vec<u32>,
}

impl TickHost for MockHost {
    fn set_period_ms(&mut self, ms: u32) {
        self.periods.push(ms);
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<AppEvent>,
}

impl RecordingSink {
    fn screen_changes(&self) -> Vec<(ScreenId, ScreenId)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ScreenChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

struct Rig {
    svc: UiService,
    hw: MockHw,
    painter: MockPainter,
    status: MockStatus,
    tasks: MockTasks,
    host: MockHost,
    sink: RecordingSink,
    log: LifecycleLog,
}

impl Rig {
    /// Construct and run setup at t=0 with the given cell voltage.
    fn booted(volts: f32) -> Self {
        Self::booted_with(volts, false)
    }

    fn booted_with(volts: f32, consume_all: bool) -> Self {
        let log: LifecycleLog = Rc::new(RefCell::new(Vec::new()));
        let provider = MockProvider {
            consume_all,
            log: log.clone(),
        };
        let mut rig = Self {
            svc: UiService::new(UiConfig::default(), Box::new(provider)),
            hw: MockHw::new(volts),
            painter: MockPainter::default(),
            status: MockStatus,
            tasks: MockTasks::default(),
            host: MockHost::default(),
            sink: RecordingSink::default(),
            log,
        };
        rig.svc.setup(
            0,
            &mut rig.hw,
            &mut rig.painter,
            &rig.status,
            &mut rig.host,
            &mut rig.sink,
        );
        rig
    }

    fn tick(&mut self, now_ms: u32) {
        self.svc.tick(
            now_ms,
            &mut self.hw,
            &mut self.painter,
            &self.status,
            &mut self.tasks,
            &mut self.host,
            &mut self.sink,
        );
    }

    /// Deliver one gesture end-to-end: chip latches the code, INT edge
    /// fires, service tick runs.
    fn deliver(&mut self, raw: RawGesture, now_ms: u32) {
        self.hw.next_gesture = Some(raw);
        events::gesture_isr(now_ms);
        self.tick(now_ms);
    }
}

// ── Setup ─────────────────────────────────────────────────────

#[test]
fn setup_primes_gauge_activates_screen_and_programs_period() {
    let _g = locked();
    let rig = Rig::booted(3.9);

    assert_eq!(rig.hw.gauge_resets, 1);
    assert_eq!(rig.hw.quick_starts, 1);
    // Boot drain read happened before any user gesture.
    assert_eq!(rig.hw.gesture_reads, 1);
    assert!(rig.hw.display_on());
    assert_eq!(rig.svc.current_screen(), ScreenId::Content(1));
    // Screen 1 declares 1000 ms.
    assert_eq!(rig.host.periods, vec![1000]);
    assert!(matches!(rig.sink.events[0], AppEvent::Started(ScreenId::Content(1))));

    let log = rig.log.borrow();
    assert!(log.contains(&Lifecycle::Activated(ScreenId::Content(1))));
    assert!(log.contains(&Lifecycle::Rendered(ScreenId::Content(1))));
}

#[test]
fn failed_gesture_init_retries_lazily_each_tick() {
    let _g = locked();
    let log: LifecycleLog = Rc::new(RefCell::new(Vec::new()));
    let provider = MockProvider {
        consume_all: false,
        log,
    };
    let mut svc = UiService::new(UiConfig::default(), Box::new(provider));
    let mut hw = MockHw::new(3.9);
    hw.init_ok = false;

    let (mut painter, status) = (MockPainter::default(), MockStatus);
    let (mut tasks, mut host, mut sink) =
        (MockTasks::default(), MockHost::default(), RecordingSink::default());

    svc.setup(0, &mut hw, &mut painter, &status, &mut host, &mut sink);
    // Bounded setup retries (3 attempts, fixed delay between them).
    assert_eq!(hw.init_calls, 3);
    assert!(!svc.gesture_ready());

    // Still failing: one more attempt per tick.
    svc.tick(5_000, &mut hw, &mut painter, &status, &mut tasks, &mut host, &mut sink);
    assert_eq!(hw.init_calls, 4);

    // Chip comes back: next tick succeeds, then no more attempts.
    hw.init_ok = true;
    svc.tick(6_000, &mut hw, &mut painter, &status, &mut tasks, &mut host, &mut sink);
    assert!(svc.gesture_ready());
    svc.tick(7_000, &mut hw, &mut painter, &status, &mut tasks, &mut host, &mut sink);
    assert_eq!(hw.init_calls, 5);
}

// ── Swipes ────────────────────────────────────────────────────

#[test]
fn swipe_right_advances_screen_and_reprograms_period() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);

    // Raw Down remaps to SwipeRight in the base orientation.
    rig.deliver(RawGesture::Down, 5_000);

    assert_eq!(rig.svc.current_screen(), ScreenId::Content(2));
    assert_eq!(rig.sink.screen_changes(), vec![(ScreenId::Content(1), ScreenId::Content(2))]);
    // Screen 2 declares 2000 ms.
    assert_eq!(rig.host.periods, vec![1000, 2000]);
    // Transition pause was taken.
    assert!(rig.hw.delays.contains(&UiConfig::default().transition_pause_ms));
    // The new screen is not full-screen, so the bar was force-redrawn
    // (once at setup, once now — values unchanged, only force repaints).
    assert_eq!(rig.painter.dates, 2);
    assert_eq!(rig.painter.times, 2);

    // Old screen deactivated before the new one was created and activated.
    let log = rig.log.borrow();
    let deact = log
        .iter()
        .position(|e| *e == Lifecycle::Deactivated(ScreenId::Content(1)))
        .unwrap();
    let created = log
        .iter()
        .position(|e| *e == Lifecycle::Created(ScreenId::Content(2)))
        .unwrap();
    let act = log
        .iter()
        .position(|e| *e == Lifecycle::Activated(ScreenId::Content(2)))
        .unwrap();
    assert!(deact < created && created < act);
}

#[test]
fn swipe_direction_follows_orientation() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);

    // Base orientation: raw Up is a left swipe — wraps back to Content(3).
    rig.deliver(RawGesture::Up, 5_000);
    assert_eq!(rig.svc.current_screen(), ScreenId::Content(3));

    // Rotate, then the same raw code swipes the other way.
    rig.deliver(RawGesture::Clockwise, 7_000);
    rig.deliver(RawGesture::Up, 9_000);
    assert_eq!(rig.svc.current_screen(), ScreenId::Content(1));
}

#[test]
fn full_cycle_returns_to_start() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);

    let mut now = 5_000;
    for _ in 0..3 {
        rig.deliver(RawGesture::Down, now);
        now += 2_000;
    }
    assert_eq!(rig.svc.current_screen(), ScreenId::Content(1));
}

#[test]
fn screen_handler_cancels_the_default_transition() {
    let _g = locked();
    let mut rig = Rig::booted_with(3.9, true);

    rig.deliver(RawGesture::Down, 5_000);

    // The event reached the screen, but no transition happened.
    assert!(rig
        .log
        .borrow()
        .contains(&Lifecycle::Handled(ScreenId::Content(1), UiEvent::SwipeRight)));
    assert_eq!(rig.svc.current_screen(), ScreenId::Content(1));
    assert!(rig.sink.screen_changes().is_empty());
}

// ── Debounce & coalescing ─────────────────────────────────────

#[test]
fn edges_under_a_second_apart_coalesce_to_one_gesture() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);
    let reads_after_setup = rig.hw.gesture_reads;

    // Two edges 200 ms apart, both before the service runs.
    rig.hw.next_gesture = Some(RawGesture::Down);
    events::gesture_isr(5_000);
    events::gesture_isr(5_200);
    rig.tick(5_250);
    rig.tick(6_000);

    assert_eq!(rig.hw.gesture_reads, reads_after_setup + 1);
    assert_eq!(rig.svc.current_screen(), ScreenId::Content(2));
}

#[test]
fn second_gesture_within_the_debounce_window_is_deferred() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);

    rig.deliver(RawGesture::Down, 5_000);
    assert_eq!(rig.svc.current_screen(), ScreenId::Content(2));

    // A new edge 300 ms later stays latched through the window…
    rig.hw.next_gesture = Some(RawGesture::Down);
    events::gesture_isr(5_300);
    rig.tick(5_400);
    assert_eq!(rig.svc.current_screen(), ScreenId::Content(2));
    assert!(events::pending());

    // …and is serviced once the window opens.
    rig.tick(6_100);
    assert_eq!(rig.svc.current_screen(), ScreenId::Content(3));
}

// ── Dismiss / wake ────────────────────────────────────────────

#[test]
fn dismiss_turns_display_off_and_discards_the_spurious_wake() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);
    rig.hw.inject_spurious_on_grace = true;

    rig.deliver(RawGesture::Forward, 5_000);

    assert!(!rig.svc.display_on());
    assert!(!rig.hw.display_on());
    // The grace-window edge was treated as spurious.
    assert!(!events::pending());
    assert_eq!(rig.hw.cancels, 1);
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::DisplayPower(false))));
}

#[test]
fn any_gesture_on_a_dark_display_only_wakes_it() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);

    rig.deliver(RawGesture::Forward, 5_000);
    assert!(!rig.svc.display_on());

    // A swipe while dark: display comes back, screen does not move.
    rig.deliver(RawGesture::Down, 7_000);
    assert!(rig.svc.display_on());
    assert_eq!(rig.hw.panel_resets, 1);
    assert_eq!(rig.svc.current_screen(), ScreenId::Content(1));
    assert!(rig.sink.screen_changes().is_empty());
}

#[test]
fn backlight_times_out_without_interaction() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);
    let timeout = UiConfig::default().backlight_timeout_ms;

    rig.tick(timeout);
    assert!(rig.svc.display_on());
    rig.tick(timeout + 1);
    assert!(!rig.svc.display_on());
}

#[test]
fn charged_battery_stretches_the_backlight_timeout() {
    let _g = locked();
    // 4.2 V seeds the smoothed charge at 100 %.
    let mut rig = Rig::booted(4.2);
    let cfg = UiConfig::default();

    rig.tick(cfg.backlight_timeout_ms + 1);
    assert!(rig.svc.display_on());
    rig.tick(cfg.backlight_timeout_charged_ms + 1);
    assert!(!rig.svc.display_on());
}

// ── Rotation ──────────────────────────────────────────────────

#[test]
fn clockwise_rotation_reactivates_in_place() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);

    rig.deliver(RawGesture::Clockwise, 5_000);

    assert_eq!(rig.hw.rotations, vec![Orientation::Inverted]);
    assert_eq!(rig.svc.current_screen(), ScreenId::Content(1));
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::OrientationChanged(Orientation::Inverted))));

    // Same instance: re-activated but never re-created.
    let log = rig.log.borrow();
    let creations = log
        .iter()
        .filter(|e| matches!(e, Lifecycle::Created(_)))
        .count();
    assert_eq!(creations, 1);
    assert!(log.contains(&Lifecycle::Deactivated(ScreenId::Content(1))));
}

#[test]
fn counter_clockwise_toggles_then_opens_setup() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);

    rig.deliver(RawGesture::CounterClockwise, 5_000);

    assert_eq!(rig.hw.rotations, vec![Orientation::Inverted]);
    assert_eq!(rig.svc.current_screen(), ScreenId::Setup);
    // Setup declares 500 ms.
    assert_eq!(rig.host.periods, vec![1000, 500]);
}

// ── Low battery & recharge ────────────────────────────────────

#[test]
fn low_voltage_forces_the_override_and_disables_sensors() {
    let _g = locked();
    let mut rig = Rig::booted(3.2);

    rig.tick(1_000);

    assert_eq!(rig.svc.current_screen(), ScreenId::LowBattery);
    assert_eq!(rig.tasks.disabled, 1);
    assert_eq!(rig.host.periods, vec![1000, 10_000]);
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::LowBattery { .. })));
}

#[test]
fn low_battery_survives_swipes_and_honours_dismiss() {
    let _g = locked();
    let mut rig = Rig::booted(3.2);
    rig.tick(1_000);
    assert_eq!(rig.svc.current_screen(), ScreenId::LowBattery);

    // Swipes are suppressed outright.
    rig.deliver(RawGesture::Down, 5_000);
    assert_eq!(rig.svc.current_screen(), ScreenId::LowBattery);

    // Dismiss still works so the user can dark the panel.
    rig.deliver(RawGesture::Forward, 7_000);
    assert_eq!(rig.svc.current_screen(), ScreenId::LowBattery);
    assert!(!rig.svc.display_on());
}

#[test]
fn low_battery_wins_over_a_pending_swipe_in_the_same_tick() {
    let _g = locked();
    let mut rig = Rig::booted(3.2);

    // Edge already latched when the tick evaluates power first.
    rig.hw.next_gesture = Some(RawGesture::Down);
    events::gesture_isr(900);
    rig.tick(1_000);

    assert_eq!(rig.svc.current_screen(), ScreenId::LowBattery);
    // The swipe was then read under the override and suppressed.
    assert_eq!(
        rig.sink.screen_changes(),
        vec![(ScreenId::Content(1), ScreenId::LowBattery)]
    );
}

#[test]
fn recharge_past_the_midpoint_restarts_exactly_once() {
    let _g = locked();
    let mut rig = Rig::booted(3.2);
    rig.tick(1_000);
    assert_eq!(rig.svc.current_screen(), ScreenId::LowBattery);

    // Charger plugged in: fresh samples every 10 s pull the average up
    // past (low+high)/2 = 3.75 V.
    rig.hw.volts = 4.1;
    let mut now = 10_000;
    while rig.hw.restarts == 0 && now < 200_000 {
        rig.tick(now);
        now += 10_000;
    }

    assert_eq!(rig.hw.restarts, 1);
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::RestartScheduled { .. })));

    // Keep ticking: the restart request never repeats.
    for _ in 0..10 {
        rig.tick(now);
        now += 10_000;
    }
    assert_eq!(rig.hw.restarts, 1);
}

// ── Rendering ─────────────────────────────────────────────────

#[test]
fn renders_follow_the_screen_period() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);
    let rendered = |rig: &Rig| {
        rig.log
            .borrow()
            .iter()
            .filter(|e| matches!(e, Lifecycle::Rendered(_)))
            .count()
    };
    let after_setup = rendered(&rig);

    // Screen 1 period is 1000 ms; a 500 ms tick is too early.
    rig.tick(500);
    assert_eq!(rendered(&rig), after_setup);
    rig.tick(1_000);
    assert_eq!(rendered(&rig), after_setup + 1);
}

#[test]
fn dark_display_stops_renders_unless_the_screen_opts_in() {
    let _g = locked();
    let mut rig = Rig::booted(3.9);

    rig.deliver(RawGesture::Forward, 5_000);
    assert!(!rig.svc.display_on());

    let before = rig.log.borrow().len();
    rig.tick(20_000);
    rig.tick(40_000);
    // Mock screens don't refresh while off: no new lifecycle entries.
    assert_eq!(rig.log.borrow().len(), before);
}
