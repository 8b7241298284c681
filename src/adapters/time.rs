//! System time and link-status adapter.
//!
//! Provides monotonic time for the service loop and the calendar/link
//! fields the top bar renders.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` for uptime
//!   and `gettimeofday`/`localtime_r` for wall-clock time (valid only
//!   once SNTP, owned by the network task, has synced the system clock).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant`; the
//!   wall clock reads as never-synced.

use core::fmt::Write as _;

use crate::app::ports::{StatusSource, WallClock};

// ---------------------------------------------------------------------------
// Monotonic time
// ---------------------------------------------------------------------------

/// Monotonic time adapter.
pub struct TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot, truncated to the service loop's u32
    /// timebase (wraps after ~49 days, handled with wrapping arithmetic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u32 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000) as u32
    }

    /// Milliseconds since boot (host).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    /// Seconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_secs(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000_000
    }

    /// Seconds since boot (host).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

/// Render an uptime as `DDd HHh MMm` for telemetry and the setup screen.
pub fn format_uptime(secs: u64) -> heapless::String<16> {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let mut out = heapless::String::new();
    let _ = write!(out, "{days:02}d {hours:02}h {minutes:02}m");
    out
}

// ---------------------------------------------------------------------------
// Status source (top-bar feeds)
// ---------------------------------------------------------------------------

/// [`StatusSource`] over the system clock plus link state pushed in by
/// the sibling network tasks (geolocation and WiFi are separate
/// processes; they call the setters when their state changes).
pub struct SystemStatus {
    locality: Option<heapless::String<24>>,
    signal_dbm: Option<i8>,
}

impl SystemStatus {
    pub fn new() -> Self {
        Self {
            locality: None,
            signal_dbm: None,
        }
    }

    /// Resolved locality from the geolocation task (`None` clears it).
    pub fn set_locality(&mut self, locality: Option<&str>) {
        self.locality = locality.map(|s| {
            let mut out = heapless::String::new();
            for ch in s.chars().take(24) {
                let _ = out.push(ch);
            }
            out
        });
    }

    /// Link strength from the WiFi task (`None` = disconnected).
    pub fn set_signal_dbm(&mut self, dbm: Option<i8>) {
        self.signal_dbm = dbm;
    }
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSource for SystemStatus {
    #[cfg(target_os = "espidf")]
    fn wall_clock(&self) -> Option<WallClock> {
        use core::ptr;
        let mut tv = esp_idf_svc::sys::timeval { tv_sec: 0, tv_usec: 0 };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return None;
        }
        // Reject obviously unsynced time (e.g. before 2020-01-01).
        const EPOCH_2020: i64 = 1_577_836_800;
        if i64::from(tv.tv_sec) < EPOCH_2020 {
            return None;
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        Some(WallClock {
            year: (tm.tm_year + 1900) as u16,
            month: (tm.tm_mon + 1) as u8,
            day: tm.tm_mday as u8,
            weekday: tm.tm_wday as u8,
            hour: tm.tm_hour as u8,
            minute: tm.tm_min as u8,
        })
    }

    /// On non-ESP targets (simulation) the clock reads as never-synced.
    #[cfg(not(target_os = "espidf"))]
    fn wall_clock(&self) -> Option<WallClock> {
        None
    }

    fn locality(&self) -> Option<heapless::String<24>> {
        self.locality.clone()
    }

    fn signal_dbm(&self) -> Option<i8> {
        self.signal_dbm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formats_days_hours_minutes() {
        assert_eq!(format_uptime(0).as_str(), "00d 00h 00m");
        // 1 day, 4 hours, 33 minutes, 12 seconds.
        let secs = 86_400 + 4 * 3_600 + 33 * 60 + 12;
        assert_eq!(format_uptime(secs).as_str(), "01d 04h 33m");
    }

    #[test]
    fn locality_is_truncated_to_the_bar_budget() {
        let mut status = SystemStatus::new();
        status.set_locality(Some("Llanfairpwllgwyngyllgogerychwyrndrobwll"));
        assert_eq!(status.locality().unwrap().len(), 24);
        status.set_locality(None);
        assert!(status.locality().is_none());
    }
}
