//! Audio for clawcade.
//!
//! [`AudioManager`] implements [`clawcade_core::AudioCues`] so the crane and the
//! prize chute can fire cues without knowing whether anything is audible.
//! Real playback goes through rodio behind the `rodio_backend` feature; the
//! default build uses a silent stub.
//!
//! # Example
//!
//! ```ignore
//! let mut audio = AudioManager::new()?;
//! audio.load_sounds_from(Path::new("assets"));
//! audio.play_one_shot(SoundId::ClawDrop, Vec2::ZERO, 0.7);
//! ```

mod manager;
mod settings;

pub use clawcade_core::{MusicTrack, SoundId};
pub use manager::AudioManager;
pub use settings::AudioSettings;
