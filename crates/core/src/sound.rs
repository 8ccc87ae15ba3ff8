//! Sound cue and music track identifiers.

use serde::{Deserialize, Serialize};

/// Identifiers for one-shot sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundId {
    // Crane sounds
    /// Claw starts dropping
    ClawDrop,
    /// Claw arms closing on a prize
    ClawGrab,
    /// Claw lets go over the chute
    ClawRelease,
    /// Gantry hits a travel limit
    GantryStop,

    // Prize popup sounds
    /// Prize popup appears
    PrizePopIn,
    /// Prize popup disappears
    PrizePopOut,

    // Session sounds
    /// Last play used up
    OutOfPlays,

    // Free-roam sounds
    /// Interacting with an object or NPC
    Interact,
    /// Button click
    ButtonClick,
}

impl SoundId {
    /// Every cue, in declaration order.
    pub const ALL: [SoundId; 9] = [
        SoundId::ClawDrop,
        SoundId::ClawGrab,
        SoundId::ClawRelease,
        SoundId::GantryStop,
        SoundId::PrizePopIn,
        SoundId::PrizePopOut,
        SoundId::OutOfPlays,
        SoundId::Interact,
        SoundId::ButtonClick,
    ];

    /// Get the relative file path for this sound cue.
    pub fn file_path(&self) -> Option<&'static str> {
        match self {
            SoundId::ClawDrop => Some("sounds/crane/drop.wav"),
            SoundId::ClawGrab => Some("sounds/crane/grab.wav"),
            SoundId::ClawRelease => Some("sounds/crane/release.wav"),
            SoundId::PrizePopIn => Some("sounds/prize/pop_in.wav"),
            SoundId::PrizePopOut => Some("sounds/prize/pop_out.wav"),
            SoundId::Interact => Some("sounds/ui/interact.wav"),
            SoundId::ButtonClick => Some("sounds/ui/button_click.wav"),
            // Not recorded yet
            SoundId::GantryStop | SoundId::OutOfPlays => None,
        }
    }

    /// Get the default volume for this cue (0.0 to 1.0).
    pub fn default_volume(&self) -> f32 {
        match self {
            SoundId::ButtonClick | SoundId::Interact => 0.5,
            SoundId::GantryStop => 0.4,
            SoundId::PrizePopIn | SoundId::PrizePopOut => 0.9,
            _ => 0.7,
        }
    }

    /// Whether this cue should attenuate with distance from the listener.
    pub fn is_positional(&self) -> bool {
        match self {
            // UI and popup sounds play at the listener
            SoundId::PrizePopIn
            | SoundId::PrizePopOut
            | SoundId::ButtonClick
            | SoundId::OutOfPlays => false,
            _ => true,
        }
    }

    /// Get the maximum audible distance for positional cues.
    pub fn max_distance(&self) -> f32 {
        match self {
            SoundId::GantryStop => 8.0,
            _ => 16.0,
        }
    }
}

/// Background music tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MusicTrack {
    /// Free-roam overworld theme
    FreeRoam,
    /// Arcade cabinet theme
    Arcade,
    /// Title screen music
    Menu,
}

impl MusicTrack {
    /// Every track.
    pub const ALL: [MusicTrack; 3] = [MusicTrack::FreeRoam, MusicTrack::Arcade, MusicTrack::Menu];

    /// Get the relative file path for this music track.
    pub fn file_path(&self) -> Option<&'static str> {
        match self {
            MusicTrack::FreeRoam => Some("music/free_roam.ogg"),
            MusicTrack::Arcade => Some("music/arcade.ogg"),
            MusicTrack::Menu => Some("music/menu.ogg"),
        }
    }

    /// Get default volume for this track.
    pub fn default_volume(&self) -> f32 {
        0.5
    }
}
