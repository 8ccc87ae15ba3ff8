use anyhow::Result;
use clawcade_audio::AudioSettings;
use clawcade_core::PrizeId;
use clawcade_crane::{ChuteConfig, ClawConfig, CraneConfig, LevelConfig};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/arcade.toml";

/// Everything a headless arcade run is tuned by.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArcadeConfig {
    /// Number of lights on the cabinet's play display.
    pub display_indicators: usize,
    /// Seconds the camera takes to settle before the crane accepts input.
    pub intro_seconds: f32,
    /// Scene fade out/in duration in seconds.
    pub fade_seconds: f32,
    pub claw: ClawConfig,
    pub crane: CraneConfig,
    pub chute: ChuteConfig,
    pub level: LevelConfig,
    pub layout: LevelLayout,
    pub audio: AudioSettings,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            display_indicators: 6,
            intro_seconds: 1.0,
            fade_seconds: 0.5,
            claw: ClawConfig::default(),
            crane: CraneConfig::default(),
            chute: ChuteConfig::default(),
            level: LevelConfig::default(),
            layout: LevelLayout::default(),
            audio: AudioSettings::default(),
        }
    }
}

/// Static geometry and prize placement of one cabinet.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LevelLayout {
    pub name: String,
    /// Y of the cabinet floor's top surface.
    pub floor_y: f32,
    /// Centre X of the prize chute; defaults to the right limit.
    pub chute_x: Option<f32>,
    pub chute_half_width: f32,
    pub chute_height: f32,
    /// Random horizontal jitter applied to each prize on spawn.
    pub scatter: f32,
    pub seed: u64,
    pub prizes: Vec<PrizeSpawn>,
    pub blocks: Vec<BlockSpawn>,
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self {
            name: "plushies".to_string(),
            floor_y: -2.5,
            chute_x: None,
            chute_half_width: 1.0,
            chute_height: 2.0,
            scatter: 0.0,
            seed: 0,
            prizes: [("plush_cat", -2.0), ("plush_bear", 0.0), ("robot", 2.5)]
                .into_iter()
                .filter_map(|(id, x)| PrizeId::parse(id).ok().map(|id| PrizeSpawn::new(id, x)))
                .collect(),
            blocks: Vec::new(),
        }
    }
}

/// One prize resting on the floor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PrizeSpawn {
    pub id: PrizeId,
    pub x: f32,
    #[serde(default = "default_prize_half_width")]
    pub half_width: f32,
    #[serde(default = "default_prize_half_height")]
    pub half_height: f32,
    /// Prize body mass.
    #[serde(default = "default_prize_mass")]
    pub mass: f32,
}

fn default_prize_half_width() -> f32 {
    0.75
}

fn default_prize_half_height() -> f32 {
    0.25
}

fn default_prize_mass() -> f32 {
    1.0
}

impl PrizeSpawn {
    /// Default-sized prize at `x`.
    pub fn new(id: PrizeId, x: f32) -> Self {
        Self {
            id,
            x,
            half_width: default_prize_half_width(),
            half_height: default_prize_half_height(),
            mass: default_prize_mass(),
        }
    }
}

/// Static obstacle (e.g. a shelf) inside the cabinet.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BlockSpawn {
    pub x: f32,
    pub y: f32,
    pub half_width: f32,
    pub half_height: f32,
}

impl ArcadeConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ArcadeConfig>(&contents) {
                Ok(cfg) => cfg.sanitized(),
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    ArcadeConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!(
                        "Arcade config not found at {}. Using defaults",
                        path.display()
                    );
                }
                ArcadeConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    /// Clamp values that would otherwise make the session misbehave.
    fn sanitized(mut self) -> Self {
        self.audio = self.audio.clamped();
        if self.display_indicators == 0 {
            warn!("display_indicators must be at least 1; using default");
            self.display_indicators = Self::default().display_indicators;
        }
        if !(self.intro_seconds >= 0.0) {
            warn!(value = self.intro_seconds, "intro_seconds must not be negative; using 0");
            self.intro_seconds = 0.0;
        }
        if !(self.fade_seconds >= 0.0) {
            warn!(value = self.fade_seconds, "fade_seconds must not be negative; using 0");
            self.fade_seconds = 0.0;
        }
        self
    }

    /// X of the chute centre.
    pub fn chute_x(&self) -> f32 {
        self.layout.chute_x.unwrap_or(self.level.right_limit)
    }
}
