//! Deadzone filtering between the device and the controller.
//!
//! Continuous pose samples pass through here before dispatch. A component
//! inside its deadzone is zeroed; a sample with every component inside is
//! dropped. Discrete gestures are forwarded untouched. Once past this layer
//! the controller only ever sees meaningful samples.

use crate::config::{Deadzone, Deadzones};
use crate::event::GestureEvent;
use crate::math::{Vec2, Vec3};

#[derive(Clone, Copy, Debug, Default)]
pub struct DeadzoneFilter {
    zones: Deadzones,
}

impl DeadzoneFilter {
    pub fn new(zones: Deadzones) -> Self { DeadzoneFilter { zones } }

    /// Filter one event. `None` means the sample was noise.
    pub fn filter(&self, event: GestureEvent) -> Option<GestureEvent> {
        match event {
            GestureEvent::HandPosition { id, position } => {
                filter_vec3(&self.zones.hand_position, position)
                    .map(|position| GestureEvent::HandPosition { id, position })
            }
            GestureEvent::HandRotation { id, rotation } => {
                filter_vec3(&self.zones.hand_rotation, rotation)
                    .map(|rotation| GestureEvent::HandRotation { id, rotation })
            }
            GestureEvent::FingerPosition { id, position } => {
                filter_vec2(&self.zones.finger_position, position)
                    .map(|position| GestureEvent::FingerPosition { id, position })
            }
            other => Some(other),
        }
    }
}

fn filter_vec3(dz: &Deadzone, v: Vec3) -> Option<Vec3> {
    let c = v.components();
    if c.iter().all(|&x| dz.contains(x)) {
        tracing::trace!(?v, "sample inside deadzone");
        return None;
    }
    Some(Vec3::from_components(c.map(|x| dz.apply(x))))
}

fn filter_vec2(dz: &Deadzone, v: Vec2) -> Option<Vec2> {
    if dz.contains(v.x) && dz.contains(v.y) {
        tracing::trace!(?v, "sample inside deadzone");
        return None;
    }
    Some(Vec2::new(dz.apply(v.x), dz.apply(v.y)))
}
