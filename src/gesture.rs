//! Gesture vocabulary and orientation-aware remapping.
//!
//! The gesture chip is mounted rotated inside the enclosure, so the raw
//! directional codes it reports do not match what the user physically did.
//! On top of that the device supports two display rotations, which flips
//! the correction again. `remap` folds both into one total lookup:
//! every `(raw, orientation)` pair resolves to exactly one logical event.

use serde::{Deserialize, Serialize};

/// Raw gesture codes as reported by the sensor, before remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RawGesture {
    None = 0,
    Up,
    Down,
    Left,
    Right,
    Forward,
    Backward,
    Clockwise,
    CounterClockwise,
    Wave,
}

/// Logical UI events after orientation remapping.
///
/// Swipe left/right drive screen cycling; up/down are offered to the
/// active screen only. Dismiss turns the display off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    None,
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    Dismiss,
    ReverseDismiss,
    RotateCw,
    RotateCcw,
    Wave,
}

/// The two supported display rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Base mounting orientation.
    #[default]
    Normal,
    /// Rotated 180 degrees.
    Inverted,
}

impl Orientation {
    /// The other rotation.
    pub fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Inverted,
            Self::Inverted => Self::Normal,
        }
    }
}

/// Map a raw sensor code to a logical event for the given orientation.
///
/// The four directional codes swap meaning between the two orientations;
/// everything else passes through unchanged.
pub fn remap(raw: RawGesture, orientation: Orientation) -> UiEvent {
    use Orientation::{Inverted, Normal};
    match (raw, orientation) {
        (RawGesture::Up, Normal) | (RawGesture::Down, Inverted) => UiEvent::SwipeLeft,
        (RawGesture::Up, Inverted) | (RawGesture::Down, Normal) => UiEvent::SwipeRight,
        (RawGesture::Left, Normal) | (RawGesture::Right, Inverted) => UiEvent::SwipeDown,
        (RawGesture::Left, Inverted) | (RawGesture::Right, Normal) => UiEvent::SwipeUp,
        (RawGesture::Forward, _) => UiEvent::Dismiss,
        (RawGesture::Backward, _) => UiEvent::ReverseDismiss,
        (RawGesture::Clockwise, _) => UiEvent::RotateCw,
        (RawGesture::CounterClockwise, _) => UiEvent::RotateCcw,
        (RawGesture::Wave, _) => UiEvent::Wave,
        (RawGesture::None, _) => UiEvent::None,
    }
}
