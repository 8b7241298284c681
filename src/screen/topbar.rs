//! Top information bar with change-detection redraws.
//!
//! Every field write crosses the slow panel bus, so the bar caches the
//! last-drawn value per field and only repaints what actually changed.
//! A forced render (screen transition, rotation, low-battery entry)
//! repaints everything.

use core::fmt::Write as _;

use crate::app::ports::{BarPainter, StatusSource};

/// Shown in the time slot until the time source has a valid sync.
const UNSYNCED_TIME_TEXT: &str = "WaveDeck";

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Last-drawn value per bar field.
pub struct TopBar {
    date: heapless::String<32>,
    time: heapless::String<16>,
    location: heapless::String<32>,
    signal_dbm: Option<i8>,
    battery_pct: u8,
}

impl TopBar {
    pub fn new() -> Self {
        Self {
            date: heapless::String::new(),
            time: heapless::String::new(),
            location: heapless::String::new(),
            signal_dbm: None,
            battery_pct: 0,
        }
    }

    /// Compute candidate values, repaint the fields that changed (or all
    /// of them when `force` is set), and update the cache.
    pub fn render(
        &mut self,
        force: bool,
        status: &impl StatusSource,
        battery_pct: u8,
        painter: &mut impl BarPainter,
    ) {
        let clock = status.wall_clock();

        // ── Date line ─────────────────────────────────────────
        let mut date: heapless::String<32> = heapless::String::new();
        if let Some(c) = clock {
            let weekday = WEEKDAYS[usize::from(c.weekday) % WEEKDAYS.len()];
            let month = MONTHS[usize::from(c.month.clamp(1, 12)) - 1];
            let _ = write!(date, "{} {} {} {}", weekday, c.day, month, c.year);
        }
        if force || date != self.date {
            painter.draw_date(&date);
            self.date = date;
        }

        // ── Time line (device name until first sync) ──────────
        let mut time: heapless::String<16> = heapless::String::new();
        match clock {
            Some(c) => {
                let _ = write!(time, "{}:{:02}", c.hour, c.minute);
            }
            None => {
                let _ = time.push_str(UNSYNCED_TIME_TEXT);
            }
        }
        if force || time != self.time {
            painter.draw_time(&time);
            self.time = time;
        }

        // ── Location line ─────────────────────────────────────
        let mut location: heapless::String<32> = heapless::String::new();
        if let Some(locality) = status.locality() {
            let _ = location.push_str(&locality);
        }
        if force || location != self.location {
            painter.draw_location(&location);
            self.location = location;
        }

        // ── Signal gauge ──────────────────────────────────────
        let dbm = status.signal_dbm();
        if force || dbm != self.signal_dbm {
            painter.draw_signal(dbm);
            self.signal_dbm = dbm;
        }

        // ── Battery gauge ─────────────────────────────────────
        if force || battery_pct != self.battery_pct {
            painter.draw_battery(battery_pct);
            self.battery_pct = battery_pct;
        }

        painter.draw_separator();
    }
}

impl Default for TopBar {
    fn default() -> Self {
        Self::new()
    }
}
