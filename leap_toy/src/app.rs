//! Top-level application state and the run loop.
//!
//! `App` owns the `ToyScene`, the cursor and the link back to the device.
//! It feeds device events through the gesture `Session` and carries out the
//! resulting intents. `run` drives it at ~60 fps alongside the visualizer.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Instant;

use anyhow::Result;
use gesture_intent::{GestureConfig, Intent, IntentSink, Session, Vec2};
use tracing::{debug, info, warn};

use crate::device::{spawn_device_source, DeviceEvent, SimDeviceSource};
use crate::scene::{SceneConfig, ToyScene};
use crate::visualizer::{Camera, FrameInput, Visualizer, WIN_H, WIN_W};

/// Longest simulation step; keeps a stalled frame from tunnelling the ball.
const MAX_STEP: f32 = 0.05;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gesture:        GestureConfig,
    pub scene:          SceneConfig,
    /// Let the device drive the cursor from the start.
    pub cursor_control: bool,
    /// Start in the breakout level instead of the sandbox.
    pub breakout:       bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            gesture:        GestureConfig::default(),
            scene:          SceneConfig::default(),
            cursor_control: true,
            breakout:       false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DeviceLink
// ════════════════════════════════════════════════════════════════════════════

/// The way back to the device: switches its cursor control.
/// Without hardware there is nobody to tell.
#[derive(Debug, Default)]
pub struct DeviceLink {
    cursor_tx: Option<Sender<bool>>,
}

impl DeviceLink {
    pub fn new(cursor_tx: Sender<bool>) -> Self { DeviceLink { cursor_tx: Some(cursor_tx) } }

    pub fn set_cursor_control(&self, on: bool) {
        if let Some(tx) = &self.cursor_tx {
            if tx.send(on).is_err() {
                warn!("device source gone, cursor control not delivered");
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// App
// ════════════════════════════════════════════════════════════════════════════

pub struct App {
    scene:         ToyScene,
    camera:        Camera,
    device:        DeviceLink,
    cursor:        Vec2,
    last_mouse:    Option<Vec2>,
    device_cursor: bool,
    pub status:    String,
}

impl App {
    pub fn new(cfg: &AppConfig, device: DeviceLink) -> Self {
        let mut scene = ToyScene::new(cfg.scene.clone());
        if cfg.breakout {
            scene.start_breakout();
        }
        App {
            camera: Camera::new(cfg.scene.camera_size, WIN_W, WIN_H),
            scene,
            device,
            cursor: Vec2::ZERO,
            last_mouse: None,
            device_cursor: false,
            status: format!("Ready — circle policy: {:?}", cfg.gesture.circle_policy),
        }
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn scene(&self)         -> &ToyScene { &self.scene }
    pub fn cursor(&self)        -> Vec2      { self.cursor }
    pub fn device_cursor(&self) -> bool      { self.device_cursor }

    // ── device events ─────────────────────────────────────────────────────

    /// Returns false when the device asked to quit.
    pub fn handle_device(&mut self, session: &mut Session, event: DeviceEvent, now: Instant) -> bool {
        match event {
            DeviceEvent::Gesture(gesture) => {
                let intents = session.handle(gesture, now, &self.cursor);
                self.apply_all(intents);
            }
            DeviceEvent::Cursor(n) => {
                if self.device_cursor {
                    self.cursor = self.camera.normalized_to_world(n);
                }
            }
            DeviceEvent::Quit => return false,
        }
        true
    }

    // ── window input ──────────────────────────────────────────────────────

    /// Returns false when the window asked to quit.
    pub fn handle_input(&mut self, session: &mut Session, input: &FrameInput) -> bool {
        if input.quit {
            return false;
        }
        // The mouse wins whenever it actually moves.
        if let Some(m) = input.mouse {
            if self.last_mouse != Some(m) {
                self.cursor = m;
                self.last_mouse = Some(m);
            }
        }
        if let Some(pressed) = input.cursor_key {
            let intents = session.toggle_cursor_mode(pressed);
            self.apply_all(intents);
        }
        match input.pick_key {
            Some(true) => {
                if let Some(id) = self.scene.pick_at(self.cursor) {
                    self.status = format!("PICK object {}", id);
                }
            }
            Some(false) => {
                self.scene.drop_held();
            }
            None => {}
        }
        if input.reset {
            self.scene.reset();
            self.status = "RESET".to_string();
        }
        if input.breakout {
            self.scene.start_breakout();
            self.status = "BREAKOUT — tilt to steer the ball into the bricks".to_string();
        }
        true
    }

    // ── per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, session: &mut Session, now: Instant, dt: f32) {
        let intents = session.poll(now);
        self.apply_all(intents);
        self.scene.drag_to(self.cursor);
        self.scene.step(dt.min(MAX_STEP));
    }
}

impl IntentSink for App {
    fn apply(&mut self, intent: Intent) {
        debug!(?intent, "apply");
        match &intent {
            Intent::SetDeviceDrivesCursor(on) => {
                self.device_cursor = *on;
                self.device.set_cursor_control(*on);
                self.status = format!("Cursor control: {}", if *on { "device" } else { "mouse" });
            }
            Intent::GrabObjectsInCircle { radius, .. } => {
                self.status = format!("GRAB r={:.1}", radius);
            }
            Intent::SpawnProjectile { speed, .. } => {
                self.status = format!("SWIPE — asteroid at speed {:.0}", speed);
            }
            Intent::TriggerPrimaryAction { .. } => self.status = "SCREEN TAP".to_string(),
            Intent::DeleteSelection => {
                self.status = format!("KEY TAP — deleted {}", self.scene.selection().len());
            }
            _ => {}
        }
        self.scene.apply(intent);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "leap")]
fn attach_hardware(cfg: &AppConfig, sources: &mut Vec<Receiver<DeviceEvent>>) -> DeviceLink {
    let (leap, cursor_tx) = crate::device::LeapDeviceSource::new(cfg.gesture.thresholds);
    sources.push(spawn_device_source(leap));
    DeviceLink::new(cursor_tx)
}

#[cfg(not(feature = "leap"))]
fn attach_hardware(_cfg: &AppConfig, _sources: &mut Vec<Receiver<DeviceEvent>>) -> DeviceLink {
    DeviceLink::default()
}

/// Move everything queued on `rx` into `out`. False once the source is gone.
fn drain(rx: &Receiver<DeviceEvent>, out: &mut Vec<DeviceEvent>) -> bool {
    loop {
        match rx.try_recv() {
            Ok(event)                       => out.push(event),
            Err(TryRecvError::Empty)        => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

/// Run the full application.
///
/// This is the entry point called from `main.rs`. It creates the visualizer,
/// the device sources (keyboard simulation always, hardware with
/// `--features leap`), and drives the event/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<()> {
    // ── Device sources ────────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel();
    let mut sources = vec![spawn_device_source(SimDeviceSource { rx: sim_rx })];
    let device = attach_hardware(&cfg, &mut sources);

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx, cfg.scene.camera_size)?;

    // ── Session and app state ─────────────────────────────────────────────
    let (mut session, startup) = Session::begin(cfg.gesture.clone(), cfg.cursor_control);
    let mut app = App::new(&cfg, device);
    app.apply_all(startup);

    // ── Main loop ─────────────────────────────────────────────────────────
    let mut last = Instant::now();
    let mut pending = Vec::new();
    'frame: while vis.is_open() {
        // 1. Window input
        let input = vis.poll_input();
        if !app.handle_input(&mut session, &input) {
            break;
        }

        // 2. Device events
        sources.retain(|rx| {
            let alive = drain(rx, &mut pending);
            if !alive {
                warn!("device source disconnected");
            }
            alive
        });
        for event in pending.drain(..) {
            if !app.handle_device(&mut session, event, Instant::now()) {
                break 'frame;
            }
        }

        // 3. Deferred tasks and physics
        let now = Instant::now();
        let dt  = now.duration_since(last).as_secs_f32();
        last = now;
        app.tick(&mut session, now, dt);

        // 4. Render
        vis.render(app.scene(), app.cursor(), app.device_cursor(), &app.status);
    }

    let teardown = session.end();
    app.apply_all(teardown);
    info!("leap toy closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use gesture_intent::{Circle, CirclePolicy, GestureEvent, GestureState, Swipe, Tap, Vec3};
    use crate::scene::ObjectKind;

    fn setup(cfg: AppConfig) -> (App, Session, Receiver<bool>) {
        let (tx, rx) = mpsc::channel();
        let (session, startup) = Session::begin(cfg.gesture.clone(), cfg.cursor_control);
        let mut app = App::new(&cfg, DeviceLink::new(tx));
        app.apply_all(startup);
        (app, session, rx)
    }

    fn mouse_config() -> AppConfig {
        AppConfig { cursor_control: false, ..AppConfig::default() }
    }

    fn move_mouse(app: &mut App, session: &mut Session, p: Vec2) {
        let input = FrameInput { mouse: Some(p), ..FrameInput::default() };
        assert!(app.handle_input(session, &input));
    }

    fn gesture(app: &mut App, session: &mut Session, g: GestureEvent, now: Instant) {
        assert!(app.handle_device(session, DeviceEvent::Gesture(g), now));
    }

    fn circle(state: GestureState, progress: f32) -> GestureEvent {
        GestureEvent::Circle(Circle { id: 1, progress, radius: 8.0, clockwise: true, state })
    }

    #[test]
    fn startup_announces_cursor_mode_to_device() {
        let (app, _s, rx) = setup(AppConfig::default());
        assert!(app.device_cursor());
        assert_eq!(rx.try_recv(), Ok(true));
    }

    #[test]
    fn swipe_launches_asteroid_from_mouse() {
        let (mut app, mut s, _rx) = setup(mouse_config());
        move_mouse(&mut app, &mut s, Vec2::new(-4.0, 3.0));
        let swipe = GestureEvent::Swipe(Swipe {
            id: 0, state: GestureState::Stopped, direction: Vec3::new(0.0, 1.0, 0.0), speed: 200.0,
        });
        gesture(&mut app, &mut s, swipe, Instant::now());
        let a = app.scene().objects().iter().find(|o| o.kind == ObjectKind::Asteroid).copied().unwrap();
        assert_eq!(a.position, Vec2::new(-4.0, 3.0));
        assert_eq!(a.velocity, Vec2::new(0.0, 20.0));
    }

    #[test]
    fn swipe_under_device_cursor_launches_from_origin() {
        let (mut app, mut s, _rx) = setup(AppConfig::default());
        move_mouse(&mut app, &mut s, Vec2::new(-4.0, 3.0));
        let swipe = GestureEvent::Swipe(Swipe {
            id: 0, state: GestureState::Stopped, direction: Vec3::new(1.0, 0.0, 0.0), speed: 700.0,
        });
        gesture(&mut app, &mut s, swipe, Instant::now());
        let a = app.scene().objects().iter().find(|o| o.kind == ObjectKind::Asteroid).copied().unwrap();
        assert_eq!(a.position, Vec2::ZERO);
        assert_eq!(a.velocity, Vec2::new(55.0, 0.0));
    }

    #[test]
    fn cursor_key_toggles_device_cursor() {
        let (mut app, mut s, rx) = setup(mouse_config());
        assert_eq!(rx.try_recv(), Ok(false));

        let press   = FrameInput { cursor_key: Some(true),  ..FrameInput::default() };
        let release = FrameInput { cursor_key: Some(false), ..FrameInput::default() };
        app.handle_input(&mut s, &press);
        app.handle_input(&mut s, &release);
        assert!(app.device_cursor());
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![true]);
    }

    #[test]
    fn device_cursor_moves_only_under_cursor_control() {
        let (mut app, mut s, _rx) = setup(mouse_config());
        let now = Instant::now();
        app.handle_device(&mut s, DeviceEvent::Cursor(Vec2::new(1.0, 0.0)), now);
        assert_eq!(app.cursor(), Vec2::ZERO);

        let press = FrameInput { cursor_key: Some(true), ..FrameInput::default() };
        app.handle_input(&mut s, &press);
        app.handle_device(&mut s, DeviceEvent::Cursor(Vec2::new(1.0, 0.0)), now);
        assert_eq!(app.cursor(), Vec2::new(20.0, 15.0));
    }

    #[test]
    fn grab_circle_then_key_tap_deletes() {
        let cfg = AppConfig {
            gesture: GestureConfig::default().with_policy(CirclePolicy::GrabAndDebounce),
            ..mouse_config()
        };
        let (mut app, mut s, _rx) = setup(cfg);
        move_mouse(&mut app, &mut s, Vec2::new(5.0, 5.0));
        let t0 = Instant::now();

        gesture(&mut app, &mut s, circle(GestureState::Stopped, 1.0), t0);
        assert_eq!(app.scene().selection().len(), 1, "ball is inside the circle");
        assert!(app.scene().indicator().is_some());

        let tap = GestureEvent::KeyTap(Tap { id: 2, position: Vec3::ZERO, direction: Vec3::new(0.0, -1.0, 0.0) });
        gesture(&mut app, &mut s, tap, t0 + Duration::from_millis(100));
        assert!(app.scene().ball().is_none());

        app.tick(&mut s, t0 + Duration::from_millis(400), 0.0);
        assert!(app.scene().indicator().is_some());
        app.tick(&mut s, t0 + Duration::from_millis(500), 0.0);
        assert!(app.scene().indicator().is_none());
    }

    #[test]
    fn continuous_circle_shows_and_hides() {
        let (mut app, mut s, _rx) = setup(mouse_config());
        move_mouse(&mut app, &mut s, Vec2::new(-8.0, 0.0));
        let t = Instant::now();
        gesture(&mut app, &mut s, circle(GestureState::Updated, 0.4), t);
        let ind = *app.scene().indicator().unwrap();
        assert_eq!(ind.position, Vec2::new(-8.0, 0.0));
        assert_eq!(ind.radius, 4.0);
        assert_eq!(ind.angular_velocity, -180.0);

        gesture(&mut app, &mut s, circle(GestureState::Stopped, 1.0), t);
        assert!(app.scene().indicator().is_none());
    }

    #[test]
    fn tilt_pushes_ball_only_with_mouse_cursor() {
        let (mut app, mut s, _rx) = setup(AppConfig::default());
        let tilt = GestureEvent::HandRotation { id: 0, rotation: Vec3::new(0.0, 0.0, -50.0) };
        gesture(&mut app, &mut s, tilt.clone(), Instant::now());
        assert_eq!(app.scene().ball().unwrap().velocity, Vec2::ZERO);

        app.handle_input(&mut s, &FrameInput { cursor_key: Some(true), ..FrameInput::default() });
        gesture(&mut app, &mut s, tilt, Instant::now());
        assert!(app.scene().ball().unwrap().velocity.x > 0.0);
    }

    #[test]
    fn space_picks_and_drags_ball() {
        let (mut app, mut s, _rx) = setup(mouse_config());
        move_mouse(&mut app, &mut s, Vec2::new(5.0, 5.0));
        app.handle_input(&mut s, &FrameInput { pick_key: Some(true), ..FrameInput::default() });
        move_mouse(&mut app, &mut s, Vec2::new(-2.0, 1.0));
        app.tick(&mut s, Instant::now(), 1.0 / 60.0);
        assert_eq!(app.scene().ball().unwrap().position, Vec2::new(-2.0, 1.0));

        app.handle_input(&mut s, &FrameInput { pick_key: Some(false), ..FrameInput::default() });
        app.tick(&mut s, Instant::now(), 1.0 / 60.0);
        assert!(app.scene().ball().unwrap().position.y < 1.0);
    }

    #[test]
    fn reset_and_breakout_keys() {
        let (mut app, mut s, _rx) = setup(mouse_config());
        app.handle_input(&mut s, &FrameInput { breakout: true, ..FrameInput::default() });
        assert!(app.scene().is_breakout());
        app.handle_input(&mut s, &FrameInput { reset: true, ..FrameInput::default() });
        assert!(!app.scene().is_breakout());
    }

    #[test]
    fn breakout_flag_starts_in_breakout() {
        let cfg = AppConfig { breakout: true, ..AppConfig::default() };
        let (app, _s, _rx) = setup(cfg);
        assert!(app.scene().is_breakout());
    }

    #[test]
    fn quit_from_device_or_window() {
        let (mut app, mut s, _rx) = setup(AppConfig::default());
        assert!(!app.handle_device(&mut s, DeviceEvent::Quit, Instant::now()));
        assert!(!app.handle_input(&mut s, &FrameInput { quit: true, ..FrameInput::default() }));
    }

    #[test]
    fn session_end_releases_device_cursor() {
        let (mut app, s, rx) = setup(AppConfig::default());
        assert_eq!(rx.try_recv(), Ok(true));
        let teardown = s.end();
        app.apply_all(teardown);
        assert!(!app.device_cursor());
        assert_eq!(rx.try_recv(), Ok(false));
    }
}
