//! WaveDeck Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single cooperative service task.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      LogEventSink      SystemStatus           │
//! │  (Gesture+Gauge+      (EventSink +      (StatusSource)         │
//! │   Display+Platform)    ConsoleBarPainter)                      │
//! │  DeviceScreenProvider PeripheralTasks   TimeAdapter            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              UiService (pure logic)                    │    │
//! │  │  Router · Power · TopBar                               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  LoopHost (settable period · ISR run-request shortcut)         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod error;
mod events;
mod gesture;
mod pins;
mod power;
mod screen;
mod smoothing;

pub mod app;
mod adapters;
mod drivers;

// ── Imports ───────────────────────────────────────────────────
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use adapters::hardware::{HardwareAdapter, PeripheralTasks};
use adapters::log_sink::{ConsoleBarPainter, LogEventSink};
use adapters::screens::DeviceScreenProvider;
use adapters::time::{SystemStatus, TimeAdapter};
use app::events::AppEvent;
use app::ports::{EventSink, FuelGauge, TickHost};
use app::service::UiService;
use config::UiConfig;
use drivers::backlight::Backlight;
use drivers::max17043::Max17043;
use drivers::paj7620::Paj7620;

// ── Task host ─────────────────────────────────────────────────
//
// The service reprograms its own period to match the active screen. The
// host sleeps that period in short slices so the gesture ISR's run
// request can cut a wait short — worst-case added input latency is one
// slice, without busy-polling.

const HOST_POLL_SLICE_MS: u32 = 10;

struct LoopHost {
    period_ms: u32,
}

impl TickHost for LoopHost {
    fn set_period_ms(&mut self, ms: u32) {
        info!("host: period -> {} ms", ms);
        self.period_ms = ms;
    }
}

impl LoopHost {
    /// Sleep out the current period, returning early on a run request.
    fn wait(&self) {
        let mut slept: u32 = 0;
        while slept < self.period_ms {
            if events::take_run_request() {
                return;
            }
            std::thread::sleep(Duration::from_millis(u64::from(HOST_POLL_SLICE_MS)));
            slept += HOST_POLL_SLICE_MS;
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  WaveDeck v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let config = UiConfig::default();

    // ── 3. Construct adapters ─────────────────────────────────
    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
    // pins::BACKLIGHT_GPIO — keep in sync with the pin map.
    let backlight_pin = esp_idf_hal::gpio::PinDriver::output(peripherals.pins.gpio7)?;

    let mut hw = HardwareAdapter::new(
        Paj7620::new(),
        Max17043::new(),
        Backlight::new(backlight_pin),
    );
    let mut painter = ConsoleBarPainter::new();
    let status = SystemStatus::new();
    let time = TimeAdapter::new();
    let mut tasks = PeripheralTasks::new();
    let mut sink = LogEventSink::new();
    let mut host = LoopHost { period_ms: 1000 };

    // ── 4. Construct and set up the UI service ────────────────
    let mut svc = UiService::new(config.clone(), Box::new(DeviceScreenProvider::new()));
    svc.setup(
        time.uptime_ms(),
        &mut hw,
        &mut painter,
        &status,
        &mut host,
        &mut sink,
    );

    // Attach the gesture ISR only after setup cleared the latch, so no
    // edge can race the reset.
    if let Err(e) = drivers::hw_init::init_isr_service() {
        warn!("ISR service init failed: {} — continuing without gestures", e);
    }

    info!("System ready. Entering service loop.");

    // ── 5. Service loop ───────────────────────────────────────
    let mut telemetry_anchor = time.uptime_secs();

    loop {
        host.wait();

        svc.tick(
            time.uptime_ms(),
            &mut hw,
            &mut painter,
            &status,
            &mut tasks,
            &mut host,
            &mut sink,
        );

        let now_secs = time.uptime_secs();
        if now_secs - telemetry_anchor >= u64::from(config.telemetry_interval_secs) {
            telemetry_anchor = now_secs;
            let telemetry = svc.build_telemetry(hw.native_soc(), now_secs);
            sink.emit(&AppEvent::Telemetry(telemetry));
        }
    }
}
