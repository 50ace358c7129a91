//! # leap_toy
//!
//! A small 2D sandbox driven by LeapMotion gestures through
//! [`gesture_intent`]. Circles grab, swipes throw asteroids, taps pick and
//! delete, and tilting the hand rolls the ball.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Circle (continuous policy) | Spinning indicator at the cursor while circling |
//! | Circle (grab policy) | Select everything inside the indicator; it hides 500 ms after the last pass |
//! | Swipe | Launch an asteroid along the swipe (from the origin under device cursor control) |
//! | Screen tap | Pick up / drop the object under the cursor |
//! | Key tap | Delete the selection |
//! | Hand tilt | Push the ball (only while the mouse drives the cursor) |
//!
//! Asteroids explode on anything they touch and vanish after 10 s. The
//! breakout level adds a wall of bricks the ball wears down.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard shortcuts drive all gestures.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!   The keyboard keeps working alongside it.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Gesture |
//! |---|---|
//! | `C` / hold | Circle, clockwise (counter-clockwise with Shift) |
//! | Arrows | Swipe (faster with Shift) |
//! | `K` | Key tap |
//! | `T` | Screen tap |
//! | `W` / `S` | Pitch the hand |
//! | `A` / `D` | Roll the hand |
//! | `H` | Nudge the hand position |
//! | `Space` / hold | Pick the object under the cursor and drag it |
//! | `Z` | Toggle device cursor control |
//! | `R` | Reset the scene |
//! | `B` | Breakout level |
//! | `Q` | Quit |

pub mod device;
pub mod scene;
pub mod visualizer;
pub mod app;
