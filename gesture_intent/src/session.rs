//! One active interaction session.
//!
//! A [`Session`] bundles the controller, the deadzone filter, the
//! interaction state and the deferred-task queue. The hosting event loop
//! feeds it events and polls it once per iteration. [`Session::end`]
//! consumes the session, so nothing can be dispatched into a torn-down
//! state.

use std::time::Instant;

use tracing::{debug, info};

use crate::binding::DeadzoneFilter;
use crate::config::GestureConfig;
use crate::controller::{DeferredTask, Dispatch, GestureController, InteractionState};
use crate::event::GestureEvent;
use crate::intent::{CursorWorld, Intent};
use crate::timer::TimerQueue;

#[derive(Debug)]
pub struct Session {
    controller: GestureController,
    filter:     DeadzoneFilter,
    state:      InteractionState,
    timers:     TimerQueue<DeferredTask>,
}

impl Session {
    /// Start listening. The returned intents put the device into the
    /// requested cursor mode.
    pub fn begin(config: GestureConfig, cursor_control: bool) -> (Self, Vec<Intent>) {
        info!(policy = ?config.circle_policy, cursor_control, "gesture session started");
        let session = Session {
            filter:     DeadzoneFilter::new(config.deadzones),
            controller: GestureController::new(config),
            state:      InteractionState::new(cursor_control),
            timers:     TimerQueue::new(),
        };
        (session, vec![Intent::SetDeviceDrivesCursor(cursor_control)])
    }

    pub fn state(&self) -> &InteractionState { &self.state }

    pub fn config(&self) -> &GestureConfig { self.controller.config() }

    /// Number of deferred tasks waiting on the event loop.
    pub fn pending_tasks(&self) -> usize { self.timers.len() }

    /// Filter one raw device event through the deadzones and dispatch it.
    pub fn handle(&mut self, event: GestureEvent, now: Instant, cursor: &dyn CursorWorld) -> Vec<Intent> {
        let Some(event) = self.filter.filter(event) else {
            return Vec::new();
        };
        let mut cx = Dispatch { now, cursor, timers: &mut self.timers };
        self.controller.dispatch(&mut self.state, &mut cx, &event)
    }

    pub fn toggle_cursor_mode(&mut self, pressed: bool) -> Vec<Intent> {
        self.controller.toggle_cursor_mode(&mut self.state, pressed)
    }

    /// Run every deferred task due at `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<Intent> {
        let mut out = Vec::new();
        for (handle, task) in self.timers.expire(now) {
            out.extend(self.controller.on_timer(&mut self.state, handle, task));
        }
        out
    }

    /// Tear down: cancel the pending hide, drop the indicator and hand the
    /// cursor back.
    pub fn end(mut self) -> Vec<Intent> {
        let mut out = Vec::new();
        if let Some(h) = self.state.take_pending_hide() {
            self.timers.cancel(h);
            debug!("pending hide cancelled at session end");
        }
        self.timers.clear();
        if self.state.indicator_visible() {
            out.push(Intent::HideIndicator);
        }
        if self.state.cursor_control_enabled() {
            out.push(Intent::SetDeviceDrivesCursor(false));
        }
        info!("gesture session ended");
        out
    }
}
