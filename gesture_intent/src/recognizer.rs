//! Gesture classification from raw per-frame hand samples.
//!
//! Device SDKs that only report skeletons (LeapC among them) need this to
//! produce [`GestureEvent`]s. Each tracked hand keeps its own history.
//!
//! # Algorithm
//!
//! * **Circle**: the centre is the circumcentre of the oldest, middle and
//!   newest fingertip positions in a short window. The fingertip's angle
//!   around it is integrated frame by frame; once the sweep reaches
//!   `circle_min_progress` turns at a radius of at least
//!   `circle_min_radius`, the circle is `Started`, then `Updated` every
//!   frame, and `Stopped` when the tip stalls. Negative sweep (XY plane,
//!   Y up) is clockwise.
//! * **Swipe**: palm speed at or above `swipe_min_speed` sustained over
//!   `swipe_min_length` of travel fires one swipe per run.
//! * **Key tap / screen tap**: fingertip velocity down (−Y) or forward (−Z)
//!   above threshold, reversing within `tap_history` seconds.

use std::collections::{HashMap, VecDeque};
use std::f32::consts::{PI, TAU};

use tracing::debug;

use crate::config::SensorThresholds;
use crate::event::{Circle, GestureEvent, GestureState, Swipe, Tap};
use crate::math::{Vec2, Vec3};

/// Fingertip history kept for the circle fit.
const CIRCLE_WINDOW:       usize = 24;
/// Minimum history before angles are integrated.
const CIRCLE_MIN_SAMPLES:  usize = 5;
/// Fits wider than this are treated as straight motion (mm).
const CIRCLE_MAX_RADIUS:   f32   = 250.0;
/// Tip speed (mm/s) below which a circle is considered finished.
const CIRCLE_STALL_SPEED:  f32   = 30.0;

// ════════════════════════════════════════════════════════════════════════════
// HandSample
// ════════════════════════════════════════════════════════════════════════════

/// One frame of tracking data for one hand. Positions in mm, velocities in
/// mm/s, rotation as (yaw, pitch, roll) degrees, timestamp in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandSample {
    pub hand_id:       u32,
    pub timestamp:     f32,
    pub palm_position: Vec3,
    pub palm_velocity: Vec3,
    pub rotation:      Vec3,
    pub tip_position:  Vec3,
    pub tip_velocity:  Vec3,
}

// ════════════════════════════════════════════════════════════════════════════
// Per-hand trackers
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct CircleTrack {
    tips:       VecDeque<Vec2>,
    last_angle: Option<f32>,
    sweep:      f32,
    radius:     f32,
    active:     Option<u32>,
}

impl CircleTrack {
    fn reset(&mut self) {
        self.tips.clear();
        self.last_angle = None;
        self.sweep = 0.0;
        self.radius = 0.0;
        self.active = None;
    }

    fn progress(&self) -> f32 { self.sweep.abs() / TAU }

    fn stop_event(&self, id: u32) -> GestureEvent {
        GestureEvent::Circle(Circle {
            id,
            progress:  self.progress(),
            radius:    self.radius,
            clockwise: self.sweep < 0.0,
            state:     GestureState::Stopped,
        })
    }
}

#[derive(Debug, Default)]
struct SwipeTrack {
    run_start: Option<Vec3>,
    fired:     bool,
}

#[derive(Debug, Default)]
struct TapTrack {
    armed_at: Option<f32>,
}

impl TapTrack {
    /// Feed the speed along the tap axis; true when a tap completes.
    fn step(&mut self, axis_speed: f32, min_speed: f32, t: f32, history: f32) -> bool {
        if axis_speed >= min_speed {
            if self.armed_at.is_none() {
                self.armed_at = Some(t);
            }
            return false;
        }
        match self.armed_at {
            Some(start) if t - start > history => {
                self.armed_at = None;
                false
            }
            Some(_) if axis_speed <= 0.0 => {
                self.armed_at = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
struct HandTrack {
    circle:     CircleTrack,
    swipe:      SwipeTrack,
    key_tap:    TapTrack,
    screen_tap: TapTrack,
}

// ════════════════════════════════════════════════════════════════════════════
// Recognizer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Recognizer {
    thresholds: SensorThresholds,
    hands:      HashMap<u32, HandTrack>,
    next_id:    u32,
}

impl Recognizer {
    pub fn new(thresholds: SensorThresholds) -> Self {
        Recognizer { thresholds, hands: HashMap::new(), next_id: 0 }
    }

    /// Classify one sample. Pose events come first, then any gestures.
    pub fn process(&mut self, s: &HandSample) -> Vec<GestureEvent> {
        let th = self.thresholds;
        let mut out = vec![
            GestureEvent::HandPosition   { id: s.hand_id, position: s.palm_position },
            GestureEvent::HandRotation   { id: s.hand_id, rotation: s.rotation },
            GestureEvent::FingerPosition { id: s.hand_id, position: s.tip_position.xy() },
        ];

        let next_id = &mut self.next_id;
        let hand = self.hands.entry(s.hand_id).or_default();

        // ── circle ────────────────────────────────────────────────────────
        if let Some(ev) = step_circle(&mut hand.circle, s, &th, next_id) {
            out.push(ev);
        }

        // ── swipe ─────────────────────────────────────────────────────────
        let speed = s.palm_velocity.length();
        if speed >= th.swipe_min_speed {
            let start = *hand.swipe.run_start.get_or_insert(s.palm_position);
            let travelled = (s.palm_position - start).length();
            if !hand.swipe.fired && travelled >= th.swipe_min_length {
                hand.swipe.fired = true;
                let id = bump(next_id);
                debug!(swipe = id, speed, travelled, "swipe recognised");
                out.push(GestureEvent::Swipe(Swipe {
                    id,
                    state:     GestureState::Stopped,
                    direction: s.palm_velocity.normalized(),
                    speed,
                }));
            }
        } else {
            hand.swipe = SwipeTrack::default();
        }

        // ── taps ──────────────────────────────────────────────────────────
        let tap = |dir: Vec3, id: u32| Tap { id, position: s.tip_position, direction: dir };
        if hand.key_tap.step(-s.tip_velocity.y, th.key_tap_min_down_velocity, s.timestamp, th.tap_history) {
            out.push(GestureEvent::KeyTap(tap(Vec3::new(0.0, -1.0, 0.0), bump(next_id))));
        }
        if hand.screen_tap.step(-s.tip_velocity.z, th.screen_tap_min_forward_velocity, s.timestamp, th.tap_history) {
            out.push(GestureEvent::ScreenTap(tap(Vec3::new(0.0, 0.0, -1.0), bump(next_id))));
        }

        out
    }

    /// Forget hands that left the field of view, stopping any circle they
    /// were drawing.
    pub fn retain_hands(&mut self, present: &[u32]) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        self.hands.retain(|id, hand| {
            if present.contains(id) {
                return true;
            }
            if let Some(cid) = hand.circle.active {
                out.push(hand.circle.stop_event(cid));
            }
            false
        });
        out
    }
}

fn bump(next: &mut u32) -> u32 {
    let id = *next;
    *next = next.wrapping_add(1);
    id
}

fn step_circle(c: &mut CircleTrack, s: &HandSample, th: &SensorThresholds, next_id: &mut u32) -> Option<GestureEvent> {
    if s.tip_velocity.length() < CIRCLE_STALL_SPEED {
        let stopped = c.active.map(|id| c.stop_event(id));
        if stopped.is_some() {
            debug!(progress = c.progress(), "circle stopped");
        }
        c.reset();
        return stopped;
    }

    let tip = s.tip_position.xy();
    c.tips.push_back(tip);
    if c.tips.len() > CIRCLE_WINDOW {
        c.tips.pop_front();
    }
    if c.tips.len() < CIRCLE_MIN_SAMPLES {
        return None;
    }

    let n = c.tips.len();
    let centre = match circumcentre(c.tips[0], c.tips[n / 2], c.tips[n - 1]) {
        Some(ctr) if ctr.distance(tip) <= CIRCLE_MAX_RADIUS => ctr,
        _ => {
            c.last_angle = None;
            return None;
        }
    };
    c.radius = centre.distance(tip);
    let rel = tip - centre;
    let angle = rel.y.atan2(rel.x);
    if let Some(prev) = c.last_angle {
        c.sweep += wrap_angle(angle - prev);
    }
    c.last_angle = Some(angle);

    let progress = c.progress();
    match c.active {
        Some(id) => Some(GestureEvent::Circle(Circle {
            id,
            progress,
            radius:    c.radius,
            clockwise: c.sweep < 0.0,
            state:     GestureState::Updated,
        })),
        None if progress >= th.circle_min_progress && c.radius >= th.circle_min_radius => {
            let id = bump(next_id);
            c.active = Some(id);
            debug!(circle = id, radius = c.radius, clockwise = c.sweep < 0.0, "circle started");
            Some(GestureEvent::Circle(Circle {
                id,
                progress,
                radius:    c.radius,
                clockwise: c.sweep < 0.0,
                state:     GestureState::Started,
            }))
        }
        None => None,
    }
}

fn wrap_angle(mut a: f32) -> f32 {
    while a > PI {
        a -= TAU;
    }
    while a < -PI {
        a += TAU;
    }
    a
}

/// Centre of the circle through three points, if they aren't collinear.
/// Worked relative to `a` to keep the squares small.
fn circumcentre(a: Vec2, b: Vec2, c: Vec2) -> Option<Vec2> {
    let (b, c) = (b - a, c - a);
    let d = 2.0 * (b.x * c.y - b.y * c.x);
    if d.abs() < 1e-3 {
        return None;
    }
    let (b2, c2) = (b.dot(b), c.dot(c));
    let ux = (c.y * b2 - b.y * c2) / d;
    let uy = (b.x * c2 - c.x * b2) / d;
    Some(a + Vec2::new(ux, uy))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
