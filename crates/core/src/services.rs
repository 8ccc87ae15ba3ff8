//! Collaborator contracts consumed by the crane core.
//!
//! Every collaborator is injected explicitly (no ambient singletons). All calls
//! are fire-and-forget: the simulation never waits on a collaborator, so none
//! of these methods return errors.

use crate::{PrizeId, SoundId};
use glam::Vec2;

/// Presents the remaining play count.
pub trait PlayDisplay {
    /// Show `remaining_plays` on the cabinet.
    fn update_display(&mut self, remaining_plays: u32);
}

/// Fades out, loads a named scene, fades back in.
pub trait SceneTransition {
    /// Request a transition. Returns immediately; completion is not awaited.
    fn fade_to_scene(&mut self, name: &str);
}

/// One-shot sound cues and music control.
pub trait AudioCues {
    /// Play `cue` once near `position` at `volume` (0.0 to 1.0).
    fn play_one_shot(&mut self, cue: SoundId, position: Vec2, volume: f32);

    /// Stop the background music, if any.
    fn stop_music(&mut self);
}

/// Persistent record of which prizes the player has won.
pub trait PrizeCollection {
    /// Record `id` as collected. Adding an already-collected id is a no-op.
    fn add_prize(&mut self, id: &PrizeId);

    /// Whether `id` has been collected.
    fn has_prize(&self, id: &PrizeId) -> bool;

    /// All collected ids in the order they were won.
    fn collected_prizes(&self) -> Vec<PrizeId>;
}

/// Receives the end-of-session signal when the last play is used.
pub trait SessionObserver {
    /// The play counter reached zero.
    fn session_ended(&mut self);
}

/// Display that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl PlayDisplay for NullDisplay {
    fn update_display(&mut self, _remaining_plays: u32) {}
}

/// Audio sink that plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioCues for SilentAudio {
    fn play_one_shot(&mut self, _cue: SoundId, _position: Vec2, _volume: f32) {}

    fn stop_music(&mut self) {}
}

/// Session observer that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSessionObserver;

impl SessionObserver for LoggingSessionObserver {
    fn session_ended(&mut self) {
        tracing::info!("Out of plays; session over");
    }
}
