//! Audio manager for cue playback and music.

use crate::{AudioSettings, MusicTrack, SoundId};
use anyhow::{Context, Result};
use clawcade_core::AudioCues;
use glam::Vec2;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(feature = "rodio_backend")]
mod backend {
    use super::*;
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use std::io::Cursor;

    /// Encoded audio bytes for one cue or track.
    pub struct SoundData {
        pub data: Vec<u8>,
    }

    /// Backend state for rodio audio.
    pub struct BackendState {
        /// Output stream (must be kept alive)
        _stream: OutputStream,
        stream_handle: OutputStreamHandle,
        music_sink: Option<Sink>,
        active: Vec<Sink>,
    }

    impl BackendState {
        pub fn new() -> Result<Self> {
            let (stream, stream_handle) =
                OutputStream::try_default().context("Failed to create audio output stream")?;
            Ok(Self {
                _stream: stream,
                stream_handle,
                music_sink: None,
                active: Vec::new(),
            })
        }

        fn decode(data: &SoundData) -> Result<rodio::Decoder<Cursor<Vec<u8>>>> {
            rodio::Decoder::new(Cursor::new(data.data.clone())).context("Failed to decode audio")
        }

        pub fn play_sound(&mut self, data: &SoundData, volume: f32) -> Result<()> {
            let source = Self::decode(data)?;
            let sink = Sink::try_new(&self.stream_handle).context("Failed to create audio sink")?;
            sink.set_volume(volume);
            sink.append(source);
            self.active.retain(|s| !s.empty());
            self.active.push(sink);
            Ok(())
        }

        pub fn play_music(&mut self, data: &SoundData, volume: f32) -> Result<()> {
            self.stop_music();
            let source = Self::decode(data)?.repeat_infinite();
            let sink = Sink::try_new(&self.stream_handle).context("Failed to create music sink")?;
            sink.set_volume(volume);
            sink.append(source);
            self.music_sink = Some(sink);
            Ok(())
        }

        pub fn stop_music(&mut self) {
            if let Some(sink) = self.music_sink.take() {
                sink.stop();
            }
        }

        pub fn set_music_volume(&self, volume: f32) {
            if let Some(sink) = &self.music_sink {
                sink.set_volume(volume);
            }
        }

        pub fn update(&mut self) {
            self.active.retain(|s| !s.empty());
        }

        pub fn active_sound_count(&self) -> usize {
            self.active.len()
        }

        pub fn stop_all(&mut self) {
            self.stop_music();
            for sink in self.active.drain(..) {
                sink.stop();
            }
        }
    }
}

#[cfg(not(feature = "rodio_backend"))]
mod backend {
    use super::*;

    /// Encoded audio bytes (kept but never decoded by the stub).
    #[allow(dead_code)]
    pub struct SoundData {
        pub data: Vec<u8>,
    }

    /// Backend stub when rodio is not compiled in.
    pub struct BackendState;

    impl BackendState {
        pub fn new() -> Result<Self> {
            debug!("Audio backend: stub (no rodio)");
            Ok(Self)
        }

        pub fn play_sound(&mut self, _data: &SoundData, _volume: f32) -> Result<()> {
            Ok(())
        }

        pub fn play_music(&mut self, _data: &SoundData, _volume: f32) -> Result<()> {
            Ok(())
        }

        pub fn stop_music(&mut self) {}

        pub fn set_music_volume(&self, _volume: f32) {}

        pub fn update(&mut self) {}

        pub fn active_sound_count(&self) -> usize {
            0
        }

        pub fn stop_all(&mut self) {}
    }
}

use backend::{BackendState, SoundData};

/// Plays cues and music for the arcade.
///
/// Cues are attenuated by distance from the listener (see
/// [`SoundId::max_distance`]) and scaled by [`AudioSettings`]. Without a
/// backend every call still updates bookkeeping, so headless runs can count
/// what would have been heard.
pub struct AudioManager {
    backend: Option<BackendState>,
    settings: AudioSettings,
    sounds: HashMap<SoundId, Arc<SoundData>>,
    music: HashMap<MusicTrack, Arc<SoundData>>,
    current_music: Option<MusicTrack>,
    listener: Vec2,
    cues_played: u64,
    last_cue: Option<SoundId>,
}

impl AudioManager {
    /// Open the default output device, falling back to silence if that fails.
    pub fn new() -> Result<Self> {
        let backend = match BackendState::new() {
            Ok(b) => {
                debug!("Audio manager initialized");
                Some(b)
            }
            Err(e) => {
                warn!("Failed to initialize audio: {e}. Using stub.");
                None
            }
        };
        Ok(Self {
            backend,
            ..Self::stub()
        })
    }

    /// Manager with no output device. Used for headless runs and tests.
    pub fn stub() -> Self {
        Self {
            backend: None,
            settings: AudioSettings::default(),
            sounds: HashMap::new(),
            music: HashMap::new(),
            current_music: None,
            listener: Vec2::ZERO,
            cues_played: 0,
            last_cue: None,
        }
    }

    /// Whether an output device is attached.
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Current settings.
    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    /// Replace the settings and re-apply the music volume.
    pub fn update_settings(&mut self, settings: AudioSettings) {
        self.settings = settings.clamped();
        if let Some(backend) = &self.backend {
            backend.set_music_volume(self.music_volume());
        }
    }

    /// Listener position for positional cues.
    pub fn set_listener_position(&mut self, position: Vec2) {
        self.listener = position;
    }

    /// Register encoded bytes for a cue.
    pub fn load_sound(&mut self, id: SoundId, data: Vec<u8>) {
        self.sounds.insert(id, Arc::new(SoundData { data }));
        debug!(?id, "loaded sound");
    }

    /// Load every cue and track whose file exists under `root`. Missing files
    /// are skipped; returns how many were loaded.
    pub fn load_sounds_from(&mut self, root: &Path) -> usize {
        let mut loaded = 0;
        for id in SoundId::ALL {
            let Some(relative) = id.file_path() else {
                continue;
            };
            match read_asset(root, relative) {
                Ok(data) => {
                    self.load_sound(id, data);
                    loaded += 1;
                }
                Err(err) => debug!(?id, "{err:#}"),
            }
        }
        for track in MusicTrack::ALL {
            let Some(relative) = track.file_path() else {
                continue;
            };
            match read_asset(root, relative) {
                Ok(data) => {
                    self.music.insert(track, Arc::new(SoundData { data }));
                    loaded += 1;
                }
                Err(err) => debug!(?track, "{err:#}"),
            }
        }
        loaded
    }

    /// Whether bytes are registered for `id`.
    pub fn has_sound(&self, id: SoundId) -> bool {
        self.sounds.contains_key(&id)
    }

    /// Volume `cue` would play at from `position`, before settings.
    pub fn cue_volume(&self, cue: SoundId, position: Vec2, volume: f32) -> f32 {
        let volume = volume.clamp(0.0, 1.0);
        if !cue.is_positional() {
            return volume;
        }
        let max_dist = cue.max_distance();
        let distance = position.distance(self.listener);
        if distance >= max_dist {
            return 0.0;
        }
        // Linear falloff
        volume * (1.0 - distance / max_dist)
    }

    /// Start `track`, replacing whatever was playing.
    pub fn play_music(&mut self, track: MusicTrack) {
        self.stop_music_inner();
        let volume = self.music_volume();
        if let (Some(backend), Some(data)) = (&mut self.backend, self.music.get(&track)) {
            if let Err(e) = backend.play_music(data, volume) {
                warn!(?track, "Failed to play music: {e:#}");
            }
        }
        debug!(?track, "music started");
        self.current_music = Some(track);
    }

    fn stop_music_inner(&mut self) {
        if let Some(backend) = &mut self.backend {
            backend.stop_music();
        }
        self.current_music = None;
    }

    /// Track currently playing.
    pub fn current_music(&self) -> Option<MusicTrack> {
        self.current_music
    }

    fn music_volume(&self) -> f32 {
        self.settings.effective_music_volume()
    }

    /// Drop finished sinks. Call once per frame.
    pub fn update(&mut self) {
        if let Some(backend) = &mut self.backend {
            backend.update();
        }
    }

    /// Sinks still playing.
    pub fn active_sound_count(&self) -> usize {
        self.backend
            .as_ref()
            .map(|b| b.active_sound_count())
            .unwrap_or(0)
    }

    /// Audible cues requested so far.
    pub fn cues_played(&self) -> u64 {
        self.cues_played
    }

    /// Most recent audible cue.
    pub fn last_cue(&self) -> Option<SoundId> {
        self.last_cue
    }

    /// Stop every sink, music included.
    pub fn stop_all(&mut self) {
        if let Some(backend) = &mut self.backend {
            backend.stop_all();
        }
        self.current_music = None;
    }
}

fn read_asset(root: &Path, relative: &str) -> Result<Vec<u8>> {
    let path = root.join(relative);
    std::fs::read(&path).with_context(|| format!("Failed to read audio file {}", path.display()))
}

impl AudioCues for AudioManager {
    fn play_one_shot(&mut self, cue: SoundId, position: Vec2, volume: f32) {
        let volume = self.cue_volume(cue, position, volume);
        if volume < 0.01 {
            return; // Too quiet to hear
        }
        self.cues_played += 1;
        self.last_cue = Some(cue);

        let sfx = self.settings.effective_sfx_volume();
        match (self.sounds.get(&cue), &mut self.backend) {
            (Some(data), Some(backend)) => {
                if let Err(e) = backend.play_sound(data, volume * sfx) {
                    warn!(?cue, "Failed to play sound: {e:#}");
                }
            }
            (None, _) => debug!(?cue, "Sound not loaded"),
            _ => {}
        }
    }

    fn stop_music(&mut self) {
        self.stop_music_inner();
    }
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::stub()
    }
}
