//! Interrupt-to-service gesture handoff.
//!
//! Top/bottom-half split: the GPIO ISR (bottom half) does the absolute
//! minimum — check the pending flag, set it, capture a timestamp, request
//! an out-of-band service run. Reading the sensor, remapping and every
//! display action happen later in the service context.
//!
//! ```text
//! ┌───────────┐  set flag + ts   ┌──────────────┐   acknowledge    ┌─────────────┐
//! │ GPIO ISR  │ ───────────────▶ │ Gesture latch │ ◀──────────────  │ UiService   │
//! │ (falling) │   request run    │  (atomics)    │    / discard     │ (main loop) │
//! └───────────┘                  └──────────────┘                  └─────────────┘
//! ```
//!
//! Invariants:
//! - At most one unacknowledged event is ever pending. Edges arriving while
//!   one is pending are dropped — the latch coalesces, it does not queue.
//! - Only the ISR sets the flag; only the service context clears it.
//! - This is the single piece of module-level mutable state in the crate;
//!   everything else is owned and injected.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Single-slot pending flag. Written true by the ISR, cleared by the
/// service routine.
static GESTURE_PENDING: AtomicBool = AtomicBool::new(false);

/// Timestamp (milliseconds since boot, truncated to u32) of the latched
/// event. Valid only while `GESTURE_PENDING` is set.
static GESTURE_AT_MS: AtomicU32 = AtomicU32::new(0);

/// Out-of-band "run the service now" request toward the task host, so
/// gesture latency does not depend on the current screen's refresh period.
static RUN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Bottom-half ISR — register on the gesture interrupt falling edge.
/// Lock-free; no sensor I/O, no display I/O, no allocation.
pub fn gesture_isr(now_ms: u32) {
    // Coalesce: drop edges while a previous event is unacknowledged.
    if GESTURE_PENDING.load(Ordering::Acquire) {
        return;
    }
    GESTURE_AT_MS.store(now_ms, Ordering::Relaxed);
    GESTURE_PENDING.store(true, Ordering::Release);
    RUN_REQUESTED.store(true, Ordering::Release);
}

/// Whether an event is latched and waiting for service.
pub fn pending() -> bool {
    GESTURE_PENDING.load(Ordering::Acquire)
}

/// Consume the latched event, returning its timestamp.
/// Service-context only.
pub fn acknowledge() -> Option<u32> {
    if !GESTURE_PENDING.load(Ordering::Acquire) {
        return None;
    }
    let at = GESTURE_AT_MS.load(Ordering::Relaxed);
    GESTURE_PENDING.store(false, Ordering::Release);
    Some(at)
}

/// Drop a latched event without reading it (spurious wake after
/// display-off). Service-context only.
pub fn discard() {
    GESTURE_PENDING.store(false, Ordering::Release);
}

/// Take the out-of-band run request, if one is pending. The task host
/// polls this to shortcut the current sleep interval.
pub fn take_run_request() -> bool {
    RUN_REQUESTED.swap(false, Ordering::AcqRel)
}

/// Clear all latched state. Called once at boot before the ISR is
/// attached, and by tests sharing the process-wide latch.
pub fn reset() {
    GESTURE_PENDING.store(false, Ordering::Release);
    RUN_REQUESTED.store(false, Ordering::Release);
    GESTURE_AT_MS.store(0, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    // The latch is process-wide; tests serialise access to it.
    static LATCH_LOCK: Mutex<()> = Mutex::new(());

    fn locked() -> MutexGuard<'static, ()> {
        let guard = LATCH_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        reset();
        guard
    }

    #[test]
    fn isr_latches_one_event_and_requests_a_run() {
        let _g = locked();
        gesture_isr(1234);
        assert!(pending());
        assert!(take_run_request());
        // Second take sees nothing.
        assert!(!take_run_request());
        assert_eq!(acknowledge(), Some(1234));
        assert!(!pending());
    }

    #[test]
    fn edges_while_pending_are_coalesced() {
        let _g = locked();
        gesture_isr(100);
        gesture_isr(150);
        gesture_isr(200);
        // Only the first edge survives; its timestamp is preserved.
        assert_eq!(acknowledge(), Some(100));
        assert_eq!(acknowledge(), None);
    }

    #[test]
    fn discard_drops_without_reading() {
        let _g = locked();
        gesture_isr(777);
        discard();
        assert!(!pending());
        assert_eq!(acknowledge(), None);
    }
}
