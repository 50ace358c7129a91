//! The controller's output contract and the collaborator seams it talks to.

use crate::math::{Vec2, Vec3};

/// Indicator rotation direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Spin {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Spin {
    pub fn from_clockwise(clockwise: bool) -> Self {
        if clockwise { Spin::Clockwise } else { Spin::CounterClockwise }
    }

    /// Signed angular velocity: clockwise turns negative.
    pub fn angular_velocity(self, rate: f32) -> f32 {
        match self {
            Spin::Clockwise        => -rate.abs(),
            Spin::CounterClockwise =>  rate.abs(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Intent
// ════════════════════════════════════════════════════════════════════════════

/// A discrete request for the scene or the device, produced by the
/// controller. Each intent maps to one synchronous collaborator call.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Make the indicator visible at `position` (hidden → visible edge).
    ShowIndicator { position: Vec2, radius: f32, angular_velocity: f32 },

    /// Update size and spin of an already visible indicator.
    ResizeIndicator { radius: f32, angular_velocity: f32 },

    HideIndicator,

    /// Select every object inside the circle.
    GrabObjectsInCircle { center: Vec2, radius: f32 },

    /// Launch a projectile. `speed` is already in scene units.
    SpawnProjectile { position: Vec2, direction: Vec3, speed: f32 },

    /// Pick or drop whatever sits at `position`.
    TriggerPrimaryAction { position: Vec2 },

    /// Remove the current selection from the scene.
    DeleteSelection,

    /// Push the ball by `(x, y)`.
    AccelerateBall { x: f32, y: f32 },

    /// Hand cursor control to (or take it back from) the device.
    SetDeviceDrivesCursor(bool),
}

// ════════════════════════════════════════════════════════════════════════════
// Collaborator traits
// ════════════════════════════════════════════════════════════════════════════

/// Cursor → world mapping, queried when an intent needs a scene position.
pub trait CursorWorld {
    fn cursor_world_position(&self) -> Vec2;
}

/// A fixed cursor.
impl CursorWorld for Vec2 {
    fn cursor_world_position(&self) -> Vec2 { *self }
}

/// Anything that carries out intents: the scene plus device control.
pub trait IntentSink {
    fn apply(&mut self, intent: Intent);

    fn apply_all(&mut self, intents: impl IntoIterator<Item = Intent>)
    where
        Self: Sized,
    {
        for intent in intents {
            self.apply(intent);
        }
    }
}

/// Recording sink.
impl IntentSink for Vec<Intent> {
    fn apply(&mut self, intent: Intent) { self.push(intent); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clockwise_spins_negative() {
        assert_eq!(Spin::from_clockwise(true).angular_velocity(180.0), -180.0);
        assert_eq!(Spin::from_clockwise(false).angular_velocity(180.0), 180.0);
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink: Vec<Intent> = Vec::new();
        sink.apply_all([Intent::DeleteSelection, Intent::HideIndicator]);
        assert_eq!(sink, vec![Intent::DeleteSelection, Intent::HideIndicator]);
    }
}
