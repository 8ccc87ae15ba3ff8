use serde::{Deserialize, Serialize};

/// Cabinet volume levels, read from the `[audio]` table of the arcade config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub master: f32,
    /// Background track level.
    pub music: f32,
    /// Claw, chute and popup cue level.
    pub sfx: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master: 1.0,
            music: 0.5,
            sfx: 1.0,
            muted: false,
        }
    }
}

impl AudioSettings {
    /// Copy with every level forced into `0.0..=1.0`. NaN reads as silence.
    pub fn clamped(self) -> Self {
        let level = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            master: level(self.master),
            music: level(self.music),
            sfx: level(self.sfx),
            muted: self.muted,
        }
    }

    pub fn effective_music_volume(&self) -> f32 {
        self.scaled(self.music)
    }

    pub fn effective_sfx_volume(&self) -> f32 {
        self.scaled(self.sfx)
    }

    fn scaled(&self, channel: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master * channel
        }
    }
}
