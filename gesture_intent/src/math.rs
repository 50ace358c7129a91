//! Minimal 2D/3D vectors shared by events, intents and the recogniser.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Vec2
// ════════════════════════════════════════════════════════════════════════════

/// A point or direction in scene (world) space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self { Vec2 { x, y } }

    pub fn length(self) -> f32 { (self.x * self.x + self.y * self.y).sqrt() }

    pub fn distance(self, other: Vec2) -> f32 { (self - other).length() }

    pub fn dot(self, other: Vec2) -> f32 { self.x * other.x + self.y * other.y }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 { Vec2::new(self.x + o.x, self.y + o.y) }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 { Vec2::new(self.x - o.x, self.y - o.y) }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 { Vec2::new(self.x * s, self.y * s) }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 { Vec2::new(-self.x, -self.y) }
}

// ════════════════════════════════════════════════════════════════════════════
// Vec3
// ════════════════════════════════════════════════════════════════════════════

/// A device-space vector (millimetres for positions, mm/s for velocities,
/// degrees for yaw/pitch/roll triples).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self { Vec3 { x, y, z } }

    pub fn length(self) -> f32 { (self.x * self.x + self.y * self.y + self.z * self.z).sqrt() }

    /// Unit vector in the same direction, or zero for a (near-)zero input.
    pub fn normalized(self) -> Vec3 {
        let l = self.length();
        if l < 1e-6 { Vec3::ZERO } else { Vec3::new(self.x / l, self.y / l, self.z / l) }
    }

    /// Drop the depth axis.
    pub fn xy(self) -> Vec2 { Vec2::new(self.x, self.y) }

    pub fn components(self) -> [f32; 3] { [self.x, self.y, self.z] }

    pub fn from_components(c: [f32; 3]) -> Self { Vec3::new(c[0], c[1], c[2]) }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 { Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z) }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 { Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z) }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 { Vec3::new(self.x * s, self.y * s, self.z * s) }
}
