//! Device sources: LeapMotion hardware and keyboard simulation.
//!
//! Both deliver [`DeviceEvent`]s over a `mpsc` channel from their own
//! thread. The run loop doesn't need to know which one is attached.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use gesture_intent::{Circle, GestureEvent, GestureState, Swipe, Tap, Vec2, Vec3};
use tracing::{debug, info};

// ════════════════════════════════════════════════════════════════════════════
// DeviceEvent
// ════════════════════════════════════════════════════════════════════════════

/// What a device source can report.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceEvent {
    /// A recognised gesture or pose sample.
    Gesture(GestureEvent),

    /// Device-driven cursor in normalised window coordinates
    /// (0,0 = top-left, 1,1 = bottom-right). Only sent under cursor control.
    Cursor(Vec2),

    /// Quit the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// DeviceSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`DeviceEvent`]s over a channel.
pub trait DeviceSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<DeviceEvent>);
}

/// Spawn a device source on its own thread and return the receiving end.
pub fn spawn_device_source<D: DeviceSource>(source: D) -> Receiver<DeviceEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Cursor projection
// ════════════════════════════════════════════════════════════════════════════

/// Fingertip range (mm) mapped onto the window when the device drives the
/// cursor.
pub const CURSOR_RANGE_X: (f32, f32) = (-120.0, 120.0);
pub const CURSOR_RANGE_Y: (f32, f32) = (80.0, 320.0);

/// Project a fingertip position onto normalised window coordinates.
/// Device Y points up, window Y points down.
pub fn normalize_tip(tip: Vec3) -> Vec2 {
    let unit = |v: f32, (lo, hi): (f32, f32)| ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    Vec2::new(unit(tip.x, CURSOR_RANGE_X), 1.0 - unit(tip.y, CURSOR_RANGE_Y))
}

// ════════════════════════════════════════════════════════════════════════════
// LeapDeviceSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Device source backed by a real LeapMotion controller.
///
/// LeapC reports skeletons only, so every tracking frame is turned into a
/// [`gesture_intent::HandSample`] per hand and run through the
/// [`gesture_intent::Recognizer`]. While cursor control is on, the first
/// hand's index tip is projected onto the window as the cursor.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
#[cfg(feature = "leap")]
pub struct LeapDeviceSource {
    thresholds: gesture_intent::SensorThresholds,
    cursor_rx:  Receiver<bool>,
}

#[cfg(feature = "leap")]
impl LeapDeviceSource {
    /// The returned sender switches cursor control on and off.
    pub fn new(thresholds: gesture_intent::SensorThresholds) -> (Self, Sender<bool>) {
        let (tx, rx) = mpsc::channel();
        (LeapDeviceSource { thresholds, cursor_rx: rx }, tx)
    }
}

#[cfg(feature = "leap")]
impl DeviceSource for LeapDeviceSource {
    fn run(self: Box<Self>, tx: Sender<DeviceEvent>) {
        use std::collections::HashMap;
        use gesture_intent::{HandSample, Recognizer};
        use leaprs::*;
        use tracing::warn;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                warn!(error = ?e, "LeapC connection unavailable, device source stopped");
                return;
            }
        };
        if let Err(e) = connection.open() {
            warn!(error = ?e, "failed to open LeapMotion device, device source stopped");
            return;
        }
        info!("LeapMotion device source running");

        let mut recognizer     = Recognizer::new(self.thresholds);
        let mut cursor_control = false;
        let mut last_tip: HashMap<u32, (Vec3, f32)> = HashMap::new();
        let start = Instant::now();

        let forward = |events: Vec<GestureEvent>| -> bool {
            events.into_iter().all(|e| tx.send(DeviceEvent::Gesture(e)).is_ok())
        };

        loop {
            while let Ok(on) = self.cursor_rx.try_recv() {
                cursor_control = on;
                debug!(cursor_control, "device cursor control switched");
            }

            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let t = start.elapsed().as_secs_f32();
                let mut present = Vec::new();
                let mut cursor  = None;

                for hand in frame.hands() {
                    let digits: Vec<_> = hand.digits().collect();
                    let Some(index) = digits.get(1) else { continue };

                    let id   = hand.id();
                    let palm = hand.palm();
                    let p    = palm.position();
                    let v    = palm.velocity();
                    let d    = palm.direction();
                    let n    = palm.normal();
                    let tj   = index.distal().next_joint();
                    let tip  = Vec3::new(tj.x, tj.y, tj.z);

                    // LeapC has no per-digit velocity; difference consecutive frames.
                    let tip_velocity = match last_tip.insert(id, (tip, t)) {
                        Some((prev, pt)) if t > pt => (tip - prev) * (1.0 / (t - pt)),
                        _ => Vec3::ZERO,
                    };

                    let sample = HandSample {
                        hand_id:       id,
                        timestamp:     t,
                        palm_position: Vec3::new(p.x, p.y, p.z),
                        palm_velocity: Vec3::new(v.x, v.y, v.z),
                        rotation: Vec3::new(
                            d.x.atan2(-d.z).to_degrees(),
                            d.y.atan2(-d.z).to_degrees(),
                            n.x.atan2(-n.y).to_degrees(),
                        ),
                        tip_position:  tip,
                        tip_velocity,
                    };
                    present.push(id);
                    cursor.get_or_insert(tip);

                    if !forward(recognizer.process(&sample)) {
                        return;
                    }
                }

                last_tip.retain(|id, _| present.contains(id));
                if !forward(recognizer.retain_hands(&present)) {
                    return;
                }
                if let (true, Some(tip)) = (cursor_control, cursor) {
                    if tx.send(DeviceEvent::Cursor(normalize_tip(tip))).is_err() {
                        return;
                    }
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimDeviceSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    KeyDown(SimKey),
    KeyUp(SimKey),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDir { Left, Right, Up, Down }

impl SwipeDir {
    fn vector(self) -> Vec3 {
        match self {
            SwipeDir::Left  => Vec3::new(-1.0,  0.0, 0.0),
            SwipeDir::Right => Vec3::new( 1.0,  0.0, 0.0),
            SwipeDir::Up    => Vec3::new( 0.0,  1.0, 0.0),
            SwipeDir::Down  => Vec3::new( 0.0, -1.0, 0.0),
        }
    }
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Circle { clockwise: bool },                 // C (Shift = counter-clockwise)
    Swipe { direction: SwipeDir, fast: bool },  // arrows (Shift = fast)
    KeyTap,                                     // K
    ScreenTap,                                  // T
    PitchUp,                                    // W
    PitchDown,                                  // S
    RollLeft,                                   // A
    RollRight,                                  // D
    HandNudge,                                  // H
    Quit,                                       // Q
}

/// Simulated circle growth, turns per second.
pub const SIM_CIRCLE_RATE:   f32 = 1.5;
/// Simulated circle radius in device millimetres.
pub const SIM_CIRCLE_RADIUS: f32 = 8.0;
pub const SIM_SWIPE_SPEED:   f32 = 300.0;
pub const SIM_SWIPE_FAST:    f32 = 1200.0;
/// Tilt reported while a pitch/roll key is held, degrees.
pub const SIM_TILT:          f32 = 25.0;
const SIM_HAND_HEIGHT:       f32 = 200.0;
const SIM_NUDGE:             f32 = 10.0;
const SIM_TICK:              Duration = Duration::from_millis(16);

#[derive(Clone, Copy, Debug)]
struct HeldCircle {
    id:        u32,
    progress:  f32,
    clockwise: bool,
}

/// Turns key presses into the gesture stream a hand would produce.
/// Held keys (circle, tilt) report on every [`tick`](Self::tick).
#[derive(Debug, Default)]
pub struct SimTranslator {
    next_id:    u32,
    circle:     Option<HeldCircle>,
    pitch_up:   bool,
    pitch_down: bool,
    roll_left:  bool,
    roll_right: bool,
    hand_x:     f32,
}

impl SimTranslator {
    pub fn new() -> Self { Self::default() }

    fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn circle_event(&self, c: HeldCircle, state: GestureState) -> DeviceEvent {
        DeviceEvent::Gesture(GestureEvent::Circle(Circle {
            id:        c.id,
            progress:  c.progress,
            radius:    SIM_CIRCLE_RADIUS,
            clockwise: c.clockwise,
            state,
        }))
    }

    fn hand(&self) -> Vec3 { Vec3::new(self.hand_x, SIM_HAND_HEIGHT, 0.0) }

    pub fn input(&mut self, input: SimInput) -> Vec<DeviceEvent> {
        match input {
            SimInput::KeyDown(SimKey::Circle { clockwise }) => {
                if self.circle.is_some() {
                    return Vec::new();
                }
                let c = HeldCircle { id: self.id(), progress: 0.0, clockwise };
                self.circle = Some(c);
                vec![self.circle_event(c, GestureState::Started)]
            }
            SimInput::KeyUp(SimKey::Circle { .. }) => match self.circle.take() {
                Some(c) => vec![self.circle_event(c, GestureState::Stopped)],
                None    => Vec::new(),
            },

            SimInput::KeyDown(SimKey::Swipe { direction, fast }) => {
                let speed = if fast { SIM_SWIPE_FAST } else { SIM_SWIPE_SPEED };
                vec![DeviceEvent::Gesture(GestureEvent::Swipe(Swipe {
                    id:        self.id(),
                    state:     GestureState::Stopped,
                    direction: direction.vector(),
                    speed,
                }))]
            }

            SimInput::KeyDown(SimKey::KeyTap) => {
                let tap = Tap { id: self.id(), position: self.hand(), direction: Vec3::new(0.0, -1.0, 0.0) };
                vec![DeviceEvent::Gesture(GestureEvent::KeyTap(tap))]
            }
            SimInput::KeyDown(SimKey::ScreenTap) => {
                let tap = Tap { id: self.id(), position: self.hand(), direction: Vec3::new(0.0, 0.0, -1.0) };
                vec![DeviceEvent::Gesture(GestureEvent::ScreenTap(tap))]
            }

            SimInput::KeyDown(SimKey::HandNudge) => {
                self.hand_x += SIM_NUDGE;
                if self.hand_x > CURSOR_RANGE_X.1 {
                    self.hand_x = CURSOR_RANGE_X.0;
                }
                let hand = self.hand();
                vec![
                    DeviceEvent::Gesture(GestureEvent::HandPosition { id: 0, position: hand }),
                    DeviceEvent::Gesture(GestureEvent::FingerPosition { id: 0, position: hand.xy() }),
                ]
            }

            SimInput::KeyDown(SimKey::PitchUp)   => { self.pitch_up   = true;  Vec::new() }
            SimInput::KeyUp(SimKey::PitchUp)     => { self.pitch_up   = false; Vec::new() }
            SimInput::KeyDown(SimKey::PitchDown) => { self.pitch_down = true;  Vec::new() }
            SimInput::KeyUp(SimKey::PitchDown)   => { self.pitch_down = false; Vec::new() }
            SimInput::KeyDown(SimKey::RollLeft)  => { self.roll_left  = true;  Vec::new() }
            SimInput::KeyUp(SimKey::RollLeft)    => { self.roll_left  = false; Vec::new() }
            SimInput::KeyDown(SimKey::RollRight) => { self.roll_right = true;  Vec::new() }
            SimInput::KeyUp(SimKey::RollRight)   => { self.roll_right = false; Vec::new() }

            SimInput::KeyDown(SimKey::Quit) => vec![DeviceEvent::Quit],

            _ => Vec::new(),
        }
    }

    /// Advance held gestures by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Vec<DeviceEvent> {
        let mut out = Vec::new();

        if let Some(c) = self.circle.as_mut() {
            c.progress += dt * SIM_CIRCLE_RATE;
            let c = *c;
            out.push(self.circle_event(c, GestureState::Updated));
        }

        let axis = |pos: bool, neg: bool| match (pos, neg) {
            (true, false) =>  SIM_TILT,
            (false, true) => -SIM_TILT,
            _             =>  0.0,
        };
        let pitch = axis(self.pitch_up, self.pitch_down);
        // Rolling left is a positive roll; the ball moves along −roll.
        let roll  = axis(self.roll_left, self.roll_right);
        if pitch != 0.0 || roll != 0.0 {
            out.push(DeviceEvent::Gesture(GestureEvent::HandRotation {
                id:       0,
                rotation: Vec3::new(0.0, pitch, roll),
            }));
        }
        out
    }
}

/// Device source driven by [`SimInput`] events from the visualizer's window.
pub struct SimDeviceSource {
    pub rx: Receiver<SimInput>,
}

impl DeviceSource for SimDeviceSource {
    fn run(self: Box<Self>, tx: Sender<DeviceEvent>) {
        info!("keyboard simulation device source running");
        let mut translator = SimTranslator::new();
        let mut last_tick  = Instant::now();

        loop {
            let events = match self.rx.recv_timeout(SIM_TICK) {
                Ok(input) => translator.input(input),
                Err(RecvTimeoutError::Timeout)      => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => return,
            };
            let now = Instant::now();
            let dt  = now.duration_since(last_tick);
            let events = if dt >= SIM_TICK {
                last_tick = now;
                events.into_iter().chain(translator.tick(dt.as_secs_f32())).collect()
            } else {
                events
            };

            for event in events {
                let quit = event == DeviceEvent::Quit;
                if tx.send(event).is_err() || quit {
                    debug!(quit, "simulation source stopping");
                    return;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
