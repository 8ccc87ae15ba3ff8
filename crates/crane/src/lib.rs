#![warn(missing_docs)]
//! Claw-crane simulation core.
//!
//! [`ClawMechanism`] runs the drop cycle (descend, optional tilt, close, ascend,
//! transport, release) against any [`PhysicsBackend`]. [`CraneController`] turns
//! player input into gantry moves and drop triggers and counts plays, and
//! [`PrizeChute`] consumes whatever the claw delivers.

mod chute;
mod claw;
mod config;
mod controller;
mod cycle;
mod error;
mod rig;
mod session;
mod targets;

#[cfg(test)]
mod testing;

pub use chute::{ChuteConfig, ChuteEvent, ChuteServices, PopupStage, PrizeChute};
pub use claw::{ClawEvent, ClawMechanism};
pub use config::{Bounds, ClawConfig, CraneConfig, LevelConfig};
pub use controller::{CraneController, CraneInput, CraneServices, CraneState, CycleReport};
pub use cycle::{CyclePoll, DropCycle, DropPhase};
pub use error::CraneError;
pub use rig::{ArmSide, ClawArms, ClawRig, RigHandle};
pub use session::PlaySession;
pub use targets::{GrabTarget, GrabTargets};

use clawcade_physics::PhysicsBackend;

/// Mutable world state a tick operates on.
pub struct CraneContext<'a> {
    /// Physics the rig drives and queries.
    pub physics: &'a mut dyn PhysicsBackend,
    /// Grabbable registry holding the ownership links.
    pub targets: &'a mut GrabTargets,
}
