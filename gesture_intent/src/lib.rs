//! # gesture_intent
//!
//! Turns a motion-sensing device's gesture and pose stream into discrete
//! application intents, with per-gesture enable gates, deadzone filtering
//! and a debounced circle indicator.
//!
//! ## Gesture → Intent mapping
//!
//! | Gesture | Condition | Intent |
//! |---|---|---|
//! | Circle | in progress | `ShowIndicator` (first frame) / `ResizeIndicator` |
//! | Circle | stopped (continuous policy) | `HideIndicator` |
//! | Circle | completed pass (grab policy) | `GrabObjectsInCircle`, deferred `HideIndicator` |
//! | Swipe | — | `SpawnProjectile` at cursor, or origin under cursor control |
//! | Screen tap | — | `TriggerPrimaryAction` |
//! | Key tap | — | `DeleteSelection` |
//! | Hand rotation | cursor control off | `AccelerateBall { x: −roll, y: pitch }` |
//! | Hand / finger position | — | recorded in state |
//! | Cursor-mode key | press | `SetDeviceDrivesCursor` |
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Instant;
//! use gesture_intent::{Session, GestureConfig, GestureEvent, Swipe, GestureState, Intent, Vec2, Vec3};
//!
//! let (mut session, _startup) = Session::begin(GestureConfig::default(), false);
//! let swipe = GestureEvent::Swipe(Swipe {
//!     id: 0,
//!     state: GestureState::Stopped,
//!     direction: Vec3::new(1.0, 0.0, 0.0),
//!     speed: 200.0,
//! });
//! let intents = session.handle(swipe, Instant::now(), &Vec2::new(4.0, 2.0));
//! assert_eq!(
//!     intents,
//!     vec![Intent::SpawnProjectile { position: Vec2::new(4.0, 2.0), direction: Vec3::new(1.0, 0.0, 0.0), speed: 20.0 }],
//! );
//! ```

pub mod binding;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod intent;
pub mod math;
pub mod recognizer;
pub mod session;
pub mod timer;

pub use binding::DeadzoneFilter;
pub use config::{CirclePolicy, Deadzone, Deadzones, EnabledGestures, GestureConfig, SensorThresholds};
pub use controller::{projectile_speed, DeferredTask, Dispatch, GestureController, InteractionState};
pub use error::ConfigError;
pub use event::{Circle, GestureEvent, GestureKind, GestureState, Swipe, Tap};
pub use intent::{CursorWorld, Intent, IntentSink, Spin};
pub use math::{Vec2, Vec3};
pub use recognizer::{HandSample, Recognizer};
pub use session::Session;
pub use timer::{TimerHandle, TimerQueue};
