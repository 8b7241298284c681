//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production). A
//! future syslog or BLE adapter would implement the same trait.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::{BarPainter, EventSink};

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | screen={} | {:.2}V {:.0}% (gauge {:.0}%) | \
                     display={} | {:?} | gesture={} | up={}s",
                    t.screen,
                    t.volts,
                    t.soc_percent,
                    t.native_soc_percent,
                    if t.display_on { "on" } else { "off" },
                    t.orientation,
                    if t.gesture_ready { "ok" } else { "down" },
                    t.uptime_secs,
                );
            }
            AppEvent::Started(id) => {
                info!("START | initial_screen={:?}", id);
            }
            AppEvent::Gesture(e) => {
                info!("INPUT | {:?}", e);
            }
            AppEvent::ScreenChanged { from, to } => {
                info!("SCREEN | {:?} -> {:?}", from, to);
            }
            AppEvent::OrientationChanged(o) => {
                info!("ROTATE | {:?}", o);
            }
            AppEvent::DisplayPower(on) => {
                info!("DISPLAY | {}", if *on { "on" } else { "off" });
            }
            AppEvent::LowBattery { volts } => {
                info!("POWER | battery low at {:.2} V", volts);
            }
            AppEvent::RestartScheduled { volts } => {
                info!("POWER | recharged to {:.2} V, restarting", volts);
            }
        }
    }
}

/// Placeholder top-bar painter that traces field writes to the log.
///
/// The pixel painter arrives with the panel render stack; until then the
/// change-detector's output is visible on the console, which also makes
/// redraw-frequency regressions easy to spot in captured logs.
pub struct ConsoleBarPainter;

impl ConsoleBarPainter {
    pub fn new() -> Self {
        Self
    }
}

impl BarPainter for ConsoleBarPainter {
    fn draw_date(&mut self, text: &str) {
        debug!("bar: date '{}'", text);
    }
    fn draw_time(&mut self, text: &str) {
        debug!("bar: time '{}'", text);
    }
    fn draw_location(&mut self, text: &str) {
        debug!("bar: location '{}'", text);
    }
    fn draw_signal(&mut self, dbm: Option<i8>) {
        debug!("bar: signal {:?}", dbm);
    }
    fn draw_battery(&mut self, percent: u8) {
        debug!("bar: battery {}%", percent);
    }
    fn draw_separator(&mut self) {}
}
