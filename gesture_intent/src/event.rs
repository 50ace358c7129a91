//! Gesture and pose events as delivered by a motion-sensing device.
//!
//! Events are transient: the device (or the keyboard simulator) produces
//! them, the binding layer filters them, and the controller consumes them.
//! Nothing here is owned by the controller.

use crate::math::{Vec2, Vec3};

/// Lifecycle of a multi-frame gesture as reported by the sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureState {
    Started,
    Updated,
    Stopped,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureEvent
// ════════════════════════════════════════════════════════════════════════════

/// A finger tracing a circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub id:        u32,
    /// Completed turns so far (1.0 = one full circle).
    pub progress:  f32,
    /// Circle radius in device millimetres.
    pub radius:    f32,
    pub clockwise: bool,
    pub state:     GestureState,
}

/// A straight, fast hand or finger motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Swipe {
    pub id:        u32,
    pub state:     GestureState,
    pub direction: Vec3,
    /// Raw device speed (mm/s). Values are large.
    pub speed:     f32,
}

/// A screen tap or key tap. Both are edge-triggered by the sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tap {
    pub id:        u32,
    pub position:  Vec3,
    pub direction: Vec3,
}

/// A classified gesture or a continuous pose sample.
///
/// `id` is the device's tracking index for the finger or hand involved.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    Circle(Circle),
    Swipe(Swipe),
    /// A forward poke toward the screen.
    ScreenTap(Tap),
    /// A downward tap, like pressing a key.
    KeyTap(Tap),

    /// Palm position, every device frame while a hand is tracked.
    HandPosition { id: u32, position: Vec3 },

    /// Palm orientation as (yaw, pitch, roll) degrees, every device frame.
    HandRotation { id: u32, rotation: Vec3 },

    /// Pointing finger position, every device frame.
    FingerPosition { id: u32, position: Vec2 },
}

/// Discriminant used for gating and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Circle,
    Swipe,
    ScreenTap,
    KeyTap,
    HandPosition,
    HandRotation,
    FingerPosition,
}

impl GestureKind {
    pub fn name(self) -> &'static str {
        match self {
            GestureKind::Circle         => "circle",
            GestureKind::Swipe          => "swipe",
            GestureKind::ScreenTap      => "screen_tap",
            GestureKind::KeyTap         => "key_tap",
            GestureKind::HandPosition   => "hand_position",
            GestureKind::HandRotation   => "hand_rotation",
            GestureKind::FingerPosition => "finger_position",
        }
    }

    /// True for the per-frame polling signals that go through deadzones.
    pub fn is_continuous(self) -> bool {
        matches!(
            self,
            GestureKind::HandPosition | GestureKind::HandRotation | GestureKind::FingerPosition
        )
    }
}

impl GestureEvent {
    pub fn kind(&self) -> GestureKind {
        match self {
            GestureEvent::Circle(_)             => GestureKind::Circle,
            GestureEvent::Swipe(_)              => GestureKind::Swipe,
            GestureEvent::ScreenTap(_)          => GestureKind::ScreenTap,
            GestureEvent::KeyTap(_)             => GestureKind::KeyTap,
            GestureEvent::HandPosition { .. }   => GestureKind::HandPosition,
            GestureEvent::HandRotation { .. }   => GestureKind::HandRotation,
            GestureEvent::FingerPosition { .. } => GestureKind::FingerPosition,
        }
    }
}
