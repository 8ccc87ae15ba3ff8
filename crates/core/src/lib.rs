#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod interact;
pub mod prize;
pub mod services;
pub mod sound;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use interact::{
    CraneCabinet, GameMode, InteractContext, Interactable, Interactive, InteractObject,
    LevelSelection, Npc,
};
pub use prize::{PrizeId, PrizeIdError, PrizeInfo};
pub use services::{
    AudioCues, LoggingSessionObserver, NullDisplay, PlayDisplay, PrizeCollection, SceneTransition,
    SessionObserver, SilentAudio,
};
pub use sound::{MusicTrack, SoundId};

/// Name of the free-roam scene every arcade exit fades back to.
pub const FREE_ROAM_SCENE: &str = "FreeRoam";

/// Name of the scene hosting the claw-crane cabinet.
pub const CRANE_SCENE: &str = "CraneGame";

/// Fixed tick counter for the deterministic simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Helper to derive a reproducible RNG seeded by level + salt domains.
pub fn scoped_rng(level_seed: u64, salt: u64, tick: SimTick) -> StdRng {
    let seed = level_seed ^ salt.rotate_left(17) ^ tick.0;
    StdRng::seed_from_u64(seed)
}
