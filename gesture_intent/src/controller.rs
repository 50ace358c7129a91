//! Gesture interaction controller.
//!
//! [`GestureController`] holds the read-only [`GestureConfig`];
//! [`InteractionState`] holds everything that changes. Each handler takes
//! one event plus the state, updates the state, and returns the intents to
//! carry out.
//!
//! The circle indicator follows a small state machine:
//!
//! ```text
//! Hidden ──(progress>0, not stopped)──▶ Visible ──(stopped / progress≤0)──▶ Hidden
//!                                          │ ▲
//!                   (grab: completed pass) │ │ (grab: circle resumes)
//!                                          ▼ │
//!                                     PendingHide ──(delay elapses)──▶ Hidden
//!                                       ╰─(completed pass: timer reset)─╯
//! ```
//!
//! The indicator position is latched only on the Hidden → Visible edge.

use std::time::Instant;

use tracing::{debug, trace};

use crate::config::{CirclePolicy, GestureConfig};
use crate::event::{Circle, GestureEvent, GestureKind, GestureState, Swipe, Tap};
use crate::intent::{CursorWorld, Intent, Spin};
use crate::math::{Vec2, Vec3};
use crate::timer::{TimerHandle, TimerQueue};

/// Swipe speed is divided by this to get scene velocity.
pub const SWIPE_SPEED_DIVISOR: f32 = 10.0;
/// Upper bound on projectile speed in scene units.
pub const MAX_PROJECTILE_SPEED: f32 = 55.0;

/// Convert raw device swipe speed to projectile speed.
pub fn projectile_speed(raw: f32) -> f32 {
    (raw / SWIPE_SPEED_DIVISOR).clamp(0.0, MAX_PROJECTILE_SPEED)
}

/// Work the controller defers to the event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredTask {
    HideIndicator,
}

// ════════════════════════════════════════════════════════════════════════════
// InteractionState
// ════════════════════════════════════════════════════════════════════════════

/// Mutable interaction state for one session. Only controller handlers
/// change it.
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionState {
    indicator_visible:      bool,
    indicator_position:     Vec2,
    indicator_radius:       f32,
    indicator_spin:         Spin,
    cursor_control_enabled: bool,
    pending_hide:           Option<TimerHandle>,
    last_hand_position:     Option<Vec3>,
    last_finger_position:   Option<Vec2>,
}

impl InteractionState {
    pub fn new(cursor_control_enabled: bool) -> Self {
        InteractionState {
            indicator_visible: false,
            indicator_position: Vec2::ZERO,
            indicator_radius: 0.0,
            indicator_spin: Spin::default(),
            cursor_control_enabled,
            pending_hide: None,
            last_hand_position: None,
            last_finger_position: None,
        }
    }

    pub fn indicator_visible(&self)      -> bool                { self.indicator_visible }
    pub fn indicator_position(&self)     -> Vec2                { self.indicator_position }
    pub fn indicator_radius(&self)       -> f32                 { self.indicator_radius }
    pub fn indicator_spin(&self)         -> Spin                { self.indicator_spin }
    pub fn cursor_control_enabled(&self) -> bool                { self.cursor_control_enabled }
    pub fn pending_hide(&self)           -> Option<TimerHandle> { self.pending_hide }
    pub fn last_hand_position(&self)     -> Option<Vec3>        { self.last_hand_position }
    pub fn last_finger_position(&self)   -> Option<Vec2>        { self.last_finger_position }

    pub(crate) fn take_pending_hide(&mut self) -> Option<TimerHandle> { self.pending_hide.take() }
}

/// What a handler may touch besides the state: the clock, the cursor and
/// the event loop's timer queue.
pub struct Dispatch<'a> {
    pub now:    Instant,
    pub cursor: &'a dyn CursorWorld,
    pub timers: &'a mut TimerQueue<DeferredTask>,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureController
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct GestureController {
    config: GestureConfig,
}

impl GestureController {
    pub fn new(config: GestureConfig) -> Self { GestureController { config } }

    pub fn config(&self) -> &GestureConfig { &self.config }

    fn gate(&self, kind: GestureKind) -> bool {
        let on = self.config.enabled.is_enabled(kind);
        if !on {
            trace!(gesture = kind.name(), "gesture disabled, ignoring");
        }
        on
    }

    /// Route one event to its handler.
    pub fn dispatch(
        &self,
        state: &mut InteractionState,
        cx: &mut Dispatch<'_>,
        event: &GestureEvent,
    ) -> Vec<Intent> {
        match event {
            GestureEvent::Circle(c)                        => self.on_circle(state, cx, c),
            GestureEvent::Swipe(s)                         => self.on_swipe(state, cx, s),
            GestureEvent::ScreenTap(t)                     => self.on_screen_tap(cx, t),
            GestureEvent::KeyTap(t)                        => self.on_key_tap(t),
            GestureEvent::HandPosition { id, position }    => self.on_hand_position(state, *id, *position),
            GestureEvent::HandRotation { id, rotation }    => self.on_hand_rotation(state, *id, *rotation),
            GestureEvent::FingerPosition { id, position }  => self.on_finger_position(state, *id, *position),
        }
    }

    // ── circle ────────────────────────────────────────────────────────────

    pub fn on_circle(
        &self,
        state: &mut InteractionState,
        cx: &mut Dispatch<'_>,
        c: &Circle,
    ) -> Vec<Intent> {
        let mut out = Vec::new();
        if !self.gate(GestureKind::Circle) {
            return out;
        }

        let radius = c.radius / self.config.circle_radius_scale;
        let spin   = Spin::from_clockwise(c.clockwise);

        match self.config.circle_policy {
            CirclePolicy::ContinuousIndicator => {
                if c.progress > 0.0 && c.state != GestureState::Stopped {
                    self.show_indicator(state, cx, radius, spin, &mut out);
                } else {
                    self.hide_indicator(state, cx, &mut out);
                }
            }
            CirclePolicy::GrabAndDebounce => {
                if !(c.progress > 0.0) {
                    // No sweep yet (or the circle collapsed): nothing to grab.
                    self.hide_indicator(state, cx, &mut out);
                } else if c.state == GestureState::Updated {
                    // Circling again: keep the indicator up.
                    if let Some(h) = state.pending_hide.take() {
                        cx.timers.cancel(h);
                        debug!(circle = c.id, "circle resumed, deferred hide cancelled");
                    }
                    self.show_indicator(state, cx, radius, spin, &mut out);
                } else {
                    self.show_indicator(state, cx, radius, spin, &mut out);
                    if state.indicator_visible {
                        out.push(Intent::GrabObjectsInCircle {
                            center: state.indicator_position,
                            radius: state.indicator_radius,
                        });
                        debug!(circle = c.id, radius = state.indicator_radius, "grab pass");
                        self.schedule_hide(state, cx);
                    }
                }
            }
        }
        out
    }

    fn show_indicator(
        &self,
        state: &mut InteractionState,
        cx: &mut Dispatch<'_>,
        radius: f32,
        spin: Spin,
        out: &mut Vec<Intent>,
    ) {
        if !(radius > 0.0) {
            // A zero-size indicator can't be visible.
            self.hide_indicator(state, cx, out);
            return;
        }
        let angular_velocity = spin.angular_velocity(self.config.indicator_spin_rate);
        state.indicator_radius = radius;
        state.indicator_spin   = spin;

        if !state.indicator_visible {
            state.indicator_visible  = true;
            state.indicator_position = cx.cursor.cursor_world_position();
            debug!(position = ?state.indicator_position, radius, ?spin, "indicator shown");
            out.push(Intent::ShowIndicator {
                position: state.indicator_position,
                radius,
                angular_velocity,
            });
        } else {
            out.push(Intent::ResizeIndicator { radius, angular_velocity });
        }
    }

    fn hide_indicator(&self, state: &mut InteractionState, cx: &mut Dispatch<'_>, out: &mut Vec<Intent>) {
        if let Some(h) = state.pending_hide.take() {
            cx.timers.cancel(h);
        }
        if state.indicator_visible {
            state.indicator_visible = false;
            state.indicator_radius  = 0.0;
            debug!("indicator hidden");
            out.push(Intent::HideIndicator);
        }
    }

    fn schedule_hide(&self, state: &mut InteractionState, cx: &mut Dispatch<'_>) {
        if let Some(old) = state.pending_hide.take() {
            cx.timers.cancel(old);
            debug!("deferred hide replaced");
        }
        let deadline = cx.now + self.config.hide_delay();
        state.pending_hide = Some(cx.timers.schedule(deadline, DeferredTask::HideIndicator));
        debug!(delay_ms = self.config.hide_delay_ms, "deferred hide scheduled");
    }

    /// Called by the event loop when a deferred task comes due. Tasks whose
    /// handle no longer matches the pending one are stale and ignored.
    pub fn on_timer(
        &self,
        state: &mut InteractionState,
        handle: TimerHandle,
        task: DeferredTask,
    ) -> Vec<Intent> {
        match task {
            DeferredTask::HideIndicator => {
                if state.pending_hide != Some(handle) {
                    trace!(?handle, "stale deferred hide");
                    return Vec::new();
                }
                state.pending_hide = None;
                if !state.indicator_visible {
                    return Vec::new();
                }
                state.indicator_visible = false;
                state.indicator_radius  = 0.0;
                debug!("deferred hide fired");
                vec![Intent::HideIndicator]
            }
        }
    }

    // ── swipe ─────────────────────────────────────────────────────────────

    pub fn on_swipe(&self, state: &InteractionState, cx: &mut Dispatch<'_>, s: &Swipe) -> Vec<Intent> {
        if !self.gate(GestureKind::Swipe) {
            return Vec::new();
        }
        // With the device steering the cursor, the cursor isn't where the
        // user means; launch from the origin instead.
        let position = if state.cursor_control_enabled {
            Vec2::ZERO
        } else {
            cx.cursor.cursor_world_position()
        };
        let speed = projectile_speed(s.speed);
        debug!(swipe = s.id, ?position, raw_speed = s.speed, speed, "spawn projectile");
        vec![Intent::SpawnProjectile { position, direction: s.direction, speed }]
    }

    // ── taps ──────────────────────────────────────────────────────────────

    pub fn on_screen_tap(&self, cx: &mut Dispatch<'_>, t: &Tap) -> Vec<Intent> {
        if !self.gate(GestureKind::ScreenTap) {
            return Vec::new();
        }
        let position = cx.cursor.cursor_world_position();
        debug!(tap = t.id, device_position = ?t.position, "screen tap");
        vec![Intent::TriggerPrimaryAction { position }]
    }

    pub fn on_key_tap(&self, t: &Tap) -> Vec<Intent> {
        if !self.gate(GestureKind::KeyTap) {
            return Vec::new();
        }
        debug!(tap = t.id, device_position = ?t.position, "key tap");
        vec![Intent::DeleteSelection]
    }

    // ── continuous pose samples ───────────────────────────────────────────

    pub fn on_hand_position(&self, state: &mut InteractionState, id: u32, position: Vec3) -> Vec<Intent> {
        if self.gate(GestureKind::HandPosition) {
            trace!(hand = id, ?position, "hand position");
            state.last_hand_position = Some(position);
        }
        Vec::new()
    }

    pub fn on_finger_position(&self, state: &mut InteractionState, id: u32, position: Vec2) -> Vec<Intent> {
        if self.gate(GestureKind::FingerPosition) {
            trace!(finger = id, ?position, "finger position");
            state.last_finger_position = Some(position);
        }
        Vec::new()
    }

    /// `rotation` is (yaw, pitch, roll). Ignored while the device drives
    /// the cursor.
    pub fn on_hand_rotation(&self, state: &InteractionState, id: u32, rotation: Vec3) -> Vec<Intent> {
        if !self.gate(GestureKind::HandRotation) {
            return Vec::new();
        }
        if state.cursor_control_enabled {
            trace!(hand = id, "hand rotation suppressed under cursor control");
            return Vec::new();
        }
        let (pitch, roll) = (rotation.y, rotation.z);
        if pitch == 0.0 && roll == 0.0 {
            // Only yaw moved; it doesn't steer the ball.
            return Vec::new();
        }
        vec![Intent::AccelerateBall { x: -roll, y: pitch }]
    }

    // ── cursor mode ───────────────────────────────────────────────────────

    /// Flip device cursor control on a key press. Releases do nothing.
    pub fn toggle_cursor_mode(&self, state: &mut InteractionState, pressed: bool) -> Vec<Intent> {
        if !pressed {
            return Vec::new();
        }
        state.cursor_control_enabled = !state.cursor_control_enabled;
        debug!(enabled = state.cursor_control_enabled, "cursor control toggled");
        vec![Intent::SetDeviceDrivesCursor(state.cursor_control_enabled)]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnabledGestures;
    use std::time::Duration;

    const CURSOR: Vec2 = Vec2::new(3.0, -2.0);

    struct Rig {
        ctl:    GestureController,
        state:  InteractionState,
        timers: TimerQueue<DeferredTask>,
        t0:     Instant,
    }

    impl Rig {
        fn new(policy: CirclePolicy) -> Self {
            Rig {
                ctl:    GestureController::new(GestureConfig::default().with_policy(policy)),
                state:  InteractionState::new(false),
                timers: TimerQueue::new(),
                t0:     Instant::now(),
            }
        }

        fn send_at(&mut self, ms: u64, cursor: Vec2, ev: GestureEvent) -> Vec<Intent> {
            let mut cx = Dispatch {
                now: self.t0 + Duration::from_millis(ms),
                cursor: &cursor,
                timers: &mut self.timers,
            };
            self.ctl.dispatch(&mut self.state, &mut cx, &ev)
        }

        fn send(&mut self, ev: GestureEvent) -> Vec<Intent> { self.send_at(0, CURSOR, ev) }

        fn fire(&mut self, ms: u64) -> Vec<Intent> {
            let now = self.t0 + Duration::from_millis(ms);
            let mut out = Vec::new();
            for (h, task) in self.timers.expire(now) {
                out.extend(self.ctl.on_timer(&mut self.state, h, task));
            }
            out
        }
    }

    fn circle(progress: f32, radius: f32, clockwise: bool, state: GestureState) -> GestureEvent {
        GestureEvent::Circle(Circle { id: 0, progress, radius, clockwise, state })
    }

    fn swipe(speed: f32) -> GestureEvent {
        GestureEvent::Swipe(Swipe {
            id: 0,
            state: GestureState::Stopped,
            direction: Vec3::new(1.0, 0.0, 0.0),
            speed,
        })
    }

    fn rotation(pitch: f32, roll: f32) -> GestureEvent {
        GestureEvent::HandRotation { id: 0, rotation: Vec3::new(0.0, pitch, roll) }
    }

    fn every_kind() -> Vec<GestureEvent> {
        let tap = Tap { id: 0, position: Vec3::new(1.0, 2.0, 3.0), direction: Vec3::new(0.0, 0.0, -1.0) };
        vec![
            circle(0.5, 10.0, true, GestureState::Started),
            circle(0.7, 12.0, true, GestureState::Updated),
            circle(1.0, 12.0, true, GestureState::Stopped),
            circle(0.0, 0.0, false, GestureState::Updated),
            swipe(700.0),
            swipe(-50.0),
            GestureEvent::ScreenTap(tap),
            GestureEvent::KeyTap(tap),
            GestureEvent::HandPosition { id: 0, position: Vec3::new(40.0, 200.0, 5.0) },
            rotation(20.0, -30.0),
            GestureEvent::FingerPosition { id: 1, position: Vec2::new(5.0, 6.0) },
        ]
    }

    // ── continuous indicator ──────────────────────────────────────────────

    #[test]
    fn circle_shows_then_resizes_then_hides() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        let out = r.send(circle(0.2, 20.0, true, GestureState::Started));
        assert_eq!(out, vec![Intent::ShowIndicator { position: CURSOR, radius: 10.0, angular_velocity: -180.0 }]);
        assert!(r.state.indicator_visible());

        let out = r.send(circle(0.6, 30.0, false, GestureState::Updated));
        assert_eq!(out, vec![Intent::ResizeIndicator { radius: 15.0, angular_velocity: 180.0 }]);
        assert_eq!(r.state.indicator_spin(), Spin::CounterClockwise);

        let out = r.send(circle(1.0, 30.0, false, GestureState::Stopped));
        assert_eq!(out, vec![Intent::HideIndicator]);
        assert!(!r.state.indicator_visible());
    }

    #[test]
    fn indicator_position_latched_once_per_visible_run() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        let mut shows = 0;
        for (i, state) in [GestureState::Started, GestureState::Updated, GestureState::Updated, GestureState::Updated]
            .into_iter()
            .enumerate()
        {
            // Cursor wanders during the gesture.
            let cursor = Vec2::new(i as f32, i as f32 * 2.0);
            let out = r.send_at(0, cursor, circle(0.1 + i as f32 * 0.2, 10.0, true, state));
            shows += out.iter().filter(|x| matches!(x, Intent::ShowIndicator { .. })).count();
            assert_eq!(r.state.indicator_position(), Vec2::new(0.0, 0.0));
        }
        assert_eq!(shows, 1);

        r.send(circle(1.0, 10.0, true, GestureState::Stopped));
        let out = r.send_at(0, Vec2::new(9.0, 9.0), circle(0.1, 10.0, true, GestureState::Started));
        assert!(matches!(out[0], Intent::ShowIndicator { position, .. } if position == Vec2::new(9.0, 9.0)));
    }

    #[test]
    fn zero_progress_hides() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        r.send(circle(0.5, 10.0, true, GestureState::Updated));
        assert_eq!(r.send(circle(0.0, 10.0, true, GestureState::Updated)), vec![Intent::HideIndicator]);
        // Already hidden: nothing more to do.
        assert!(r.send(circle(0.0, 10.0, true, GestureState::Updated)).is_empty());
    }

    #[test]
    fn zero_radius_never_shows() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        assert!(r.send(circle(0.5, 0.0, true, GestureState::Updated)).is_empty());
        assert!(!r.state.indicator_visible());
    }

    #[test]
    fn visible_implies_positive_radius() {
        for policy in [CirclePolicy::ContinuousIndicator, CirclePolicy::GrabAndDebounce] {
            let mut r = Rig::new(policy);
            let states = [GestureState::Started, GestureState::Updated, GestureState::Stopped];
            for k in 0..60u32 {
                let progress = (k % 7) as f32 * 0.25 - 0.25;
                let radius   = (k % 5) as f32 * 4.0;
                let ev = circle(progress, radius, k % 2 == 0, states[(k % 3) as usize]);
                r.send_at(k as u64 * 100, CURSOR, ev);
                r.fire(k as u64 * 100);
                if r.state.indicator_visible() {
                    assert!(r.state.indicator_radius() > 0.0);
                }
            }
        }
    }

    // ── grab and debounce ─────────────────────────────────────────────────

    #[test]
    fn grab_pass_grabs_and_defers_hide() {
        let mut r = Rig::new(CirclePolicy::GrabAndDebounce);
        let out = r.send(circle(1.0, 8.0, true, GestureState::Stopped));
        assert_eq!(
            out,
            vec![
                Intent::ShowIndicator { position: CURSOR, radius: 4.0, angular_velocity: -180.0 },
                Intent::GrabObjectsInCircle { center: CURSOR, radius: 4.0 },
            ]
        );
        assert_eq!(r.timers.len(), 1);
        assert!(r.fire(499).is_empty());
        assert_eq!(r.fire(500), vec![Intent::HideIndicator]);
        assert!(!r.state.indicator_visible());
        assert_eq!(r.state.pending_hide(), None);
    }

    #[test]
    fn repeated_passes_reset_the_timer_instead_of_stacking() {
        let mut r = Rig::new(CirclePolicy::GrabAndDebounce);
        r.send_at(0, CURSOR, circle(1.0, 8.0, true, GestureState::Stopped));
        let first = r.state.pending_hide();
        r.send_at(300, CURSOR, circle(1.0, 8.0, true, GestureState::Stopped));
        assert_eq!(r.timers.len(), 1);
        assert_ne!(r.state.pending_hide(), first);

        // The first deadline passes without a hide.
        assert!(r.fire(500).is_empty());
        assert!(r.state.indicator_visible());

        let mut hides = 0;
        for ms in (501..=1200).step_by(50) {
            hides += r.fire(ms).iter().filter(|i| **i == Intent::HideIndicator).count();
            if ms < 800 {
                assert!(r.state.indicator_visible(), "hid early at {ms}ms");
            }
        }
        assert_eq!(hides, 1);
    }

    #[test]
    fn second_pass_grabs_at_latched_center() {
        let mut r = Rig::new(CirclePolicy::GrabAndDebounce);
        r.send_at(0, CURSOR, circle(1.0, 8.0, true, GestureState::Stopped));
        let out = r.send_at(100, Vec2::new(-7.0, 1.0), circle(1.0, 12.0, true, GestureState::Started));
        assert_eq!(
            out,
            vec![
                Intent::ResizeIndicator { radius: 6.0, angular_velocity: -180.0 },
                Intent::GrabObjectsInCircle { center: CURSOR, radius: 6.0 },
            ]
        );
    }

    #[test]
    fn resumed_circle_cancels_deferred_hide() {
        let mut r = Rig::new(CirclePolicy::GrabAndDebounce);
        r.send_at(0, CURSOR, circle(1.0, 8.0, true, GestureState::Stopped));
        let out = r.send_at(200, CURSOR, circle(1.2, 8.0, true, GestureState::Updated));
        assert_eq!(out, vec![Intent::ResizeIndicator { radius: 4.0, angular_velocity: -180.0 }]);
        assert!(r.timers.is_empty());
        assert!(r.fire(2000).is_empty());
        assert!(r.state.indicator_visible());
    }

    #[test]
    fn grab_mode_update_shows_indicator_without_grabbing() {
        let mut r = Rig::new(CirclePolicy::GrabAndDebounce);
        let out = r.send(circle(0.3, 8.0, false, GestureState::Updated));
        assert_eq!(out, vec![Intent::ShowIndicator { position: CURSOR, radius: 4.0, angular_velocity: 180.0 }]);
        assert!(r.timers.is_empty());
    }

    #[test]
    fn grab_mode_ignores_circle_without_progress() {
        let mut r = Rig::new(CirclePolicy::GrabAndDebounce);
        assert!(r.send(circle(0.0, 8.0, true, GestureState::Started)).is_empty());
        assert!(r.send(circle(0.0, 8.0, true, GestureState::Stopped)).is_empty());
        assert!(!r.state.indicator_visible());
        assert!(r.timers.is_empty());
    }

    #[test]
    fn grab_mode_collapsed_circle_hides_indicator() {
        let mut r = Rig::new(CirclePolicy::GrabAndDebounce);
        r.send_at(0, CURSOR, circle(0.5, 8.0, true, GestureState::Updated));
        assert!(r.state.indicator_visible());
        assert_eq!(r.send_at(100, CURSOR, circle(0.0, 8.0, true, GestureState::Updated)), vec![Intent::HideIndicator]);
        assert!(!r.state.indicator_visible());

        // A pending deferred hide is dropped in favour of the immediate one.
        r.send_at(200, CURSOR, circle(1.0, 8.0, true, GestureState::Stopped));
        assert_eq!(r.send_at(300, CURSOR, circle(0.0, 8.0, true, GestureState::Updated)), vec![Intent::HideIndicator]);
        assert!(r.timers.is_empty());
        assert!(r.fire(10_000).is_empty());
    }

    // ── swipe ─────────────────────────────────────────────────────────────

    #[test]
    fn swipe_speed_scaling() {
        assert_eq!(projectile_speed(700.0), 55.0);
        assert_eq!(projectile_speed(200.0), 20.0);
        assert_eq!(projectile_speed(-50.0), 0.0);
    }

    #[test]
    fn swipe_spawns_at_cursor() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        let out = r.send(swipe(200.0));
        assert_eq!(
            out,
            vec![Intent::SpawnProjectile { position: CURSOR, direction: Vec3::new(1.0, 0.0, 0.0), speed: 20.0 }]
        );
    }

    #[test]
    fn swipe_spawns_at_origin_under_cursor_control() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        r.ctl.toggle_cursor_mode(&mut r.state, true);
        for cursor in [CURSOR, Vec2::new(100.0, -100.0)] {
            let out = r.send_at(0, cursor, swipe(700.0));
            assert!(matches!(out[0], Intent::SpawnProjectile { position, speed, .. }
                if position == Vec2::ZERO && speed == 55.0));
        }
    }

    // ── taps & pose ───────────────────────────────────────────────────────

    #[test]
    fn taps_map_to_one_intent_each() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        let tap = Tap { id: 2, position: Vec3::ZERO, direction: Vec3::ZERO };
        assert_eq!(r.send(GestureEvent::ScreenTap(tap)), vec![Intent::TriggerPrimaryAction { position: CURSOR }]);
        assert_eq!(r.send(GestureEvent::KeyTap(tap)), vec![Intent::DeleteSelection]);
    }

    #[test]
    fn hand_rotation_accelerates_with_inverted_roll() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        assert_eq!(r.send(rotation(12.0, 30.0)), vec![Intent::AccelerateBall { x: -30.0, y: 12.0 }]);
    }

    #[test]
    fn level_hand_does_not_accelerate() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        let yaw_only = GestureEvent::HandRotation { id: 0, rotation: Vec3::new(45.0, 0.0, 0.0) };
        assert!(r.send(yaw_only).is_empty());
    }

    #[test]
    fn hand_rotation_suppressed_under_cursor_control_and_resumes() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        r.ctl.toggle_cursor_mode(&mut r.state, true);
        for k in 0..10 {
            assert!(r.send(rotation(k as f32 * 3.0, 40.0)).is_empty());
        }
        r.ctl.toggle_cursor_mode(&mut r.state, true);
        assert_eq!(r.send(rotation(5.0, -8.0)), vec![Intent::AccelerateBall { x: 8.0, y: 5.0 }]);
    }

    #[test]
    fn pose_samples_are_recorded() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        assert!(r.send(GestureEvent::HandPosition { id: 0, position: Vec3::new(1.0, 2.0, 3.0) }).is_empty());
        assert!(r.send(GestureEvent::FingerPosition { id: 0, position: Vec2::new(4.0, 5.0) }).is_empty());
        assert_eq!(r.state.last_hand_position(), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(r.state.last_finger_position(), Some(Vec2::new(4.0, 5.0)));
    }

    // ── gating ────────────────────────────────────────────────────────────

    #[test]
    fn disabled_gestures_emit_nothing() {
        for policy in [CirclePolicy::ContinuousIndicator, CirclePolicy::GrabAndDebounce] {
            let mut cfg = GestureConfig::default().with_policy(policy);
            cfg.enabled = EnabledGestures::all_disabled();
            let mut r = Rig::new(policy);
            r.ctl = GestureController::new(cfg);
            let before = r.state.clone();
            for (k, ev) in every_kind().into_iter().cycle().take(44).enumerate() {
                assert!(r.send_at(k as u64 * 40, CURSOR, ev).is_empty());
            }
            assert!(r.fire(10_000).is_empty());
            assert!(r.timers.is_empty());
            assert_eq!(r.state, before);
        }
    }

    #[test]
    fn disabling_one_gesture_leaves_others_working() {
        let mut cfg = GestureConfig::default();
        cfg.enabled.swipe = false;
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        r.ctl = GestureController::new(cfg);
        assert!(r.send(swipe(300.0)).is_empty());
        assert_eq!(r.send(rotation(1.0, 2.0)).len(), 1);
    }

    // ── cursor mode ───────────────────────────────────────────────────────

    #[test]
    fn toggle_ignores_releases() {
        let mut r = Rig::new(CirclePolicy::ContinuousIndicator);
        for _ in 0..5 {
            assert!(r.ctl.toggle_cursor_mode(&mut r.state, false).is_empty());
            assert!(!r.state.cursor_control_enabled());
        }
        assert_eq!(r.ctl.toggle_cursor_mode(&mut r.state, true), vec![Intent::SetDeviceDrivesCursor(true)]);
        for _ in 0..5 {
            r.ctl.toggle_cursor_mode(&mut r.state, false);
            assert!(r.state.cursor_control_enabled());
        }
        assert_eq!(r.ctl.toggle_cursor_mode(&mut r.state, true), vec![Intent::SetDeviceDrivesCursor(false)]);
    }
}
