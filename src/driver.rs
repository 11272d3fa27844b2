//! Frame driver and host lifecycle
//!
//! The host owns the real event loop (requestAnimationFrame, DOM listeners,
//! or a native loop). It talks to the game through `Platform` and forwards
//! callbacks to an `Arcade`, which turns display timestamps into fixed
//! simulation steps.

use crate::config::field_size_for_container;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::GameError;
use crate::input::InputEvent;
use crate::session::Session;
use crate::snapshot::Snapshot;

/// Largest wall-clock gap credited to the simulation per frame (seconds)
const MAX_FRAME_DT: f64 = 0.1;
/// Timestamp jitter tolerated when deciding whether a full step has elapsed
const STEP_EPSILON: f64 = 1e-6;

/// Fixed-step accumulator.
///
/// A host calling once per 60 Hz refresh gets exactly one step per call.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f64,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of simulation steps to run for a frame at `now_ms`
    pub fn steps_for(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT),
            None => SIM_DT,
        };
        self.last_ms = Some(now_ms);
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator + STEP_EPSILON >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator = (self.accumulator - SIM_DT).max(0.0);
            steps += 1;
        }
        if steps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            // Fell behind; drop the backlog instead of spiralling
            log::trace!("Frame clock dropped {:.3}s of backlog", self.accumulator);
            self.accumulator %= SIM_DT;
        }
        steps
    }

    /// Forget timing history (e.g. after the tab was hidden)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_ms = None;
    }
}

/// Host callbacks the game needs registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    KeyDown,
    KeyUp,
    PointerMove,
    TouchStart,
    TouchMove,
    Click,
    Resize,
}

impl Listener {
    pub const ALL: [Listener; 7] = [
        Listener::KeyDown,
        Listener::KeyUp,
        Listener::PointerMove,
        Listener::TouchStart,
        Listener::TouchMove,
        Listener::Click,
        Listener::Resize,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u32);

/// What the game needs from its host environment
pub trait Platform {
    fn add_listener(&mut self, listener: Listener) -> Result<ListenerId, GameError>;
    fn remove_listener(&mut self, id: ListenerId);
    /// Schedule the next frame callback
    fn request_frame(&mut self) -> FrameId;
    fn cancel_frame(&mut self, id: FrameId);
}

/// A running game embedded in a host
pub struct Arcade<P: Platform> {
    platform: P,
    session: Session,
    clock: FrameClock,
    listeners: Vec<ListenerId>,
    frame: Option<FrameId>,
    open: bool,
}

impl<P: Platform> Arcade<P> {
    /// Register every listener and schedule the first frame.
    ///
    /// If any registration fails, the ones that succeeded are removed again
    /// and the error is returned.
    pub fn open(mut platform: P, session: Session) -> Result<Self, GameError> {
        let mut listeners = Vec::with_capacity(Listener::ALL.len());
        for listener in Listener::ALL {
            match platform.add_listener(listener) {
                Ok(id) => listeners.push(id),
                Err(err) => {
                    for id in listeners.into_iter().rev() {
                        platform.remove_listener(id);
                    }
                    log::error!("Game failed to start: {err}");
                    return Err(err);
                }
            }
        }
        let frame = platform.request_frame();
        log::info!("Game opened with {} listeners", listeners.len());

        Ok(Self {
            platform,
            session,
            clock: FrameClock::new(),
            listeners,
            frame: Some(frame),
            open: true,
        })
    }

    /// Frame callback: run the due steps, schedule the next frame and return
    /// the snapshot to draw. Returns None once closed.
    pub fn on_frame(&mut self, now_ms: f64) -> Option<Snapshot> {
        if !self.open {
            return None;
        }
        let steps = self.clock.steps_for(now_ms);
        self.session.advance(steps);
        self.frame = Some(self.platform.request_frame());
        Some(self.session.snapshot())
    }

    /// Input callback; only enqueues commands
    pub fn handle(&mut self, event: &InputEvent) {
        if !self.open {
            return;
        }
        for cmd in event.to_commands(self.session.field_width()) {
            self.session.push(cmd);
        }
    }

    /// Resize callback with an explicit field size
    pub fn on_resize(&mut self, width: f32, height: f32) {
        if self.open {
            self.session.on_resize(width, height);
        }
    }

    /// Resize callback with the width of the containing element
    pub fn on_container_resize(&mut self, container_width: f32) {
        let (width, height) = field_size_for_container(container_width);
        self.on_resize(width, height);
    }

    /// Cancel the pending frame and remove every listener. Safe to call
    /// more than once.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Some(frame) = self.frame.take() {
            self.platform.cancel_frame(frame);
        }
        for id in self.listeners.drain(..) {
            self.platform.remove_listener(id);
        }
        log::info!("Game closed");
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }
}

impl<P: Platform> Drop for Arcade<P> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_step_per_refresh_at_60hz() {
        let mut clock = FrameClock::new();
        for i in 0..600 {
            let now = i as f64 * 1000.0 / 60.0;
            assert_eq!(clock.steps_for(now), 1, "frame {i}");
        }
    }

    #[test]
    fn test_120hz_steps_every_other_frame() {
        let mut clock = FrameClock::new();
        clock.steps_for(0.0);
        let total: u32 = (1..=120).map(|i| clock.steps_for(i as f64 * 1000.0 / 120.0)).sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn test_long_stall_is_capped() {
        let mut clock = FrameClock::new();
        clock.steps_for(0.0);
        assert_eq!(clock.steps_for(5000.0), MAX_SUBSTEPS);
        // Backlog was dropped rather than carried forward
        assert!(clock.steps_for(5000.0 + 1000.0 / 60.0) <= 2);
    }

    #[test]
    fn test_time_going_backwards_runs_nothing() {
        let mut clock = FrameClock::new();
        clock.steps_for(1000.0);
        assert_eq!(clock.steps_for(900.0), 0);
    }
}
