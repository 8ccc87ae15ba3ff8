//! Fade-out, load, fade-in scene transitions.

use clawcade_core::SceneTransition;
use serde::Serialize;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FadeState {
    Idle,
    FadingOut { target: String, elapsed: f32 },
    FadingIn { elapsed: f32 },
}

/// Drives one transition at a time; requests made while a fade runs are dropped.
#[derive(Debug, Clone)]
pub struct SceneFader {
    duration: f32,
    state: FadeState,
    current_scene: String,
    loads: u32,
}

impl SceneFader {
    pub fn new(initial_scene: impl Into<String>, duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            state: FadeState::Idle,
            current_scene: initial_scene.into(),
            loads: 0,
        }
    }

    pub fn current_scene(&self) -> &str {
        &self.current_scene
    }

    /// Scenes loaded so far.
    pub fn loads(&self) -> u32 {
        self.loads
    }

    pub fn is_busy(&self) -> bool {
        self.state != FadeState::Idle
    }

    /// Start fading toward `name`. Returns `false` if a fade is already running.
    pub fn request(&mut self, name: &str) -> bool {
        if self.is_busy() {
            trace!(scene = name, "fade request ignored while fading");
            return false;
        }
        debug!(from = %self.current_scene, to = name, "fading out");
        self.state = FadeState::FadingOut {
            target: name.to_string(),
            elapsed: 0.0,
        };
        true
    }

    /// Screen cover from 0 (clear) to 1 (black).
    pub fn alpha(&self) -> f32 {
        let progress = |elapsed: f32| {
            if self.duration > 0.0 {
                (elapsed / self.duration).clamp(0.0, 1.0)
            } else {
                1.0
            }
        };
        match &self.state {
            FadeState::Idle => 0.0,
            FadeState::FadingOut { elapsed, .. } => progress(*elapsed),
            FadeState::FadingIn { elapsed } => 1.0 - progress(*elapsed),
        }
    }

    /// Advance the fade. Returns the scene name on the tick it loads.
    pub fn tick(&mut self, dt: f32) -> Option<String> {
        let dt = dt.max(0.0);
        match &mut self.state {
            FadeState::Idle => None,
            FadeState::FadingOut { target, elapsed } => {
                *elapsed += dt;
                if *elapsed < self.duration {
                    return None;
                }
                let target = std::mem::take(target);
                self.current_scene = target.clone();
                self.loads += 1;
                self.state = FadeState::FadingIn { elapsed: 0.0 };
                debug!(scene = %target, "scene loaded");
                Some(target)
            }
            FadeState::FadingIn { elapsed } => {
                *elapsed += dt;
                if *elapsed >= self.duration {
                    self.state = FadeState::Idle;
                }
                None
            }
        }
    }
}

impl SceneTransition for SceneFader {
    fn fade_to_scene(&mut self, name: &str) {
        self.request(name);
    }
}
