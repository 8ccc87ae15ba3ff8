//! State of one drop cycle: which phase it is in, its timers, and what it holds.
//!
//! The cycle is a plain struct advanced once per tick by
//! [`ClawMechanism::tick`](crate::ClawMechanism::tick). Phases only move forward.

use clawcade_physics::BodyHandle;
use serde::{Deserialize, Serialize};

/// Phases of a drop cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DropPhase {
    /// Pivot travels down until contact or max depth.
    Descend,
    /// Angled grab only: pivot rotates to match uneven arm heights.
    Tilt,
    /// Arms close; first contact may grab a target.
    Close,
    /// Pivot returns to its starting height.
    Ascend,
    /// Pivot carries the held target to the drop zone.
    Transport,
    /// Held target is let go and the arms reopen.
    Release,
}

/// Result of advancing the mechanism by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyclePoll {
    /// No cycle in flight.
    Idle,
    /// The cycle needs more ticks.
    Pending,
    /// The cycle finished; carries the target that was transported, if any.
    Done(Option<BodyHandle>),
}

impl CyclePoll {
    /// Whether this poll finished a cycle.
    pub fn is_done(&self) -> bool {
        matches!(self, CyclePoll::Done(_))
    }
}

/// Ephemeral state of one play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropCycle {
    phase: DropPhase,
    elapsed: f32,
    pause: f32,
    /// Pivot Y when the cycle started.
    pub initial_y: f32,
    /// Pivot X the held target is delivered to.
    pub target_x: f32,
    /// Horizontal speed during transport.
    pub transport_speed: f32,
    /// Target captured by the grab, cleared if the grab is lost.
    pub captured: Option<BodyHandle>,
    /// Arms that found a surface during descent.
    pub(crate) stopped: [bool; 2],
    /// Collider centre Y each stopped arm snapped to.
    pub(crate) contact_y: [f32; 2],
    /// Tilt the angled grab is interpolating toward.
    pub(crate) tilt_target: f32,
    /// Whether the release step already ran.
    pub(crate) released: bool,
}

impl DropCycle {
    /// Fresh cycle starting in [`DropPhase::Descend`].
    pub fn new(initial_y: f32, target_x: f32, transport_speed: f32) -> Self {
        Self {
            phase: DropPhase::Descend,
            elapsed: 0.0,
            pause: 0.0,
            initial_y,
            target_x,
            transport_speed,
            captured: None,
            stopped: [false; 2],
            contact_y: [0.0; 2],
            tilt_target: 0.0,
            released: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> DropPhase {
        self.phase
    }

    /// Seconds spent in the current phase, excluding pauses.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Seconds of pause still pending.
    pub fn pause_remaining(&self) -> f32 {
        self.pause
    }

    /// Move to a later phase after waiting `pause` seconds.
    pub(crate) fn advance(&mut self, next: DropPhase, pause: f32) {
        debug_assert!(next > self.phase, "drop phases never re-enter");
        self.phase = next;
        self.elapsed = 0.0;
        self.pause = pause.max(0.0);
    }

    /// Wait `seconds` before the current phase continues.
    pub(crate) fn pause_for(&mut self, seconds: f32) {
        self.pause = seconds.max(0.0);
    }

    /// Burn down a pending pause. Returns `true` while still paused.
    pub(crate) fn consume_pause(&mut self, dt: f32) -> bool {
        if self.pause <= 0.0 {
            return false;
        }
        self.pause -= dt;
        true
    }

    pub(crate) fn add_elapsed(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        self.elapsed
    }
}
