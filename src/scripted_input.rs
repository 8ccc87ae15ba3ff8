use crate::arcade::ArcadeInput;
use anyhow::Context;
use clawcade_crane::CraneInput;
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize)]
struct ScriptedInputFile {
    steps: Vec<ScriptedStep>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ScriptedStep {
    duration: f32,
    #[serde(default)]
    move_x: f32,
    #[serde(default)]
    drop: bool,
    #[serde(default)]
    leave: bool,
    #[serde(default)]
    reset: bool,
}

/// Replays a timed list of input steps. Axis input holds for the whole step;
/// `drop`, `leave`, and `reset` fire once, on the step's first tick. Every step
/// lasts at least one tick.
pub struct ScriptedInputPlayer {
    steps: Vec<ScriptedStep>,
    index: usize,
    time_in_step: f32,
    fired: bool,
    finished: bool,
}

impl ScriptedInputPlayer {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read input script {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("invalid input script {}", path.display()))
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let file: ScriptedInputFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("scripted input file contains no steps");
        }
        if let Some(bad) = file.steps.iter().find(|s| !(s.duration >= 0.0)) {
            anyhow::bail!("step duration must not be negative (got {})", bad.duration);
        }
        Ok(Self {
            steps: file.steps,
            index: 0,
            time_in_step: 0.0,
            fired: false,
            finished: false,
        })
    }

    /// Whether every step has run for its full duration.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn advance(&mut self, dt: f32) -> ArcadeInput {
        if self.finished {
            return ArcadeInput::default();
        }

        let Some(step) = self.steps.get(self.index).cloned() else {
            self.finished = true;
            return ArcadeInput::default();
        };
        let first_tick = !self.fired;
        self.fired = true;
        let input = step.to_input(first_tick);

        self.time_in_step += dt;
        // One step boundary per tick, so zero-length steps still fire.
        if self.time_in_step >= step.duration {
            self.time_in_step -= step.duration;
            self.index += 1;
            self.fired = false;
            self.finished = self.index == self.steps.len();
        }
        input
    }
}

impl ScriptedStep {
    fn to_input(&self, first_tick: bool) -> ArcadeInput {
        ArcadeInput {
            crane: CraneInput {
                axis: self.move_x.clamp(-1.0, 1.0),
                drop: first_tick && self.drop,
            },
            leave: first_tick && self.leave,
            reset: first_tick && self.reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.25;

    #[test]
    fn actions_fire_once_and_axis_holds() {
        let mut player = ScriptedInputPlayer::from_json(
            r#"{"steps":[{"duration":0.5,"move_x":1.0,"drop":true},{"duration":0.5,"leave":true}]}"#,
        )
        .unwrap();

        let first = player.advance(DT);
        assert!(first.crane.drop);
        assert_eq!(first.crane.axis, 1.0);
        let second = player.advance(DT);
        assert!(!second.crane.drop);
        assert_eq!(second.crane.axis, 1.0);

        assert!(player.advance(DT).leave);
        assert!(!player.advance(DT).leave);
        assert!(player.is_finished());
        assert_eq!(player.advance(DT), ArcadeInput::default());
    }

    #[test]
    fn zero_length_step_still_fires() {
        let mut player = ScriptedInputPlayer::from_json(
            r#"{"steps":[{"duration":0.25},{"duration":0.0,"reset":true},{"duration":0.25}]}"#,
        )
        .unwrap();
        assert!(!player.advance(DT).reset);
        assert!(player.advance(DT).reset);
    }

    #[test]
    fn empty_or_negative_scripts_are_rejected() {
        assert!(ScriptedInputPlayer::from_json(r#"{"steps":[]}"#).is_err());
        assert!(ScriptedInputPlayer::from_json(r#"{"steps":[{"duration":-1.0}]}"#).is_err());
        assert!(ScriptedInputPlayer::from_json("not json").is_err());
    }
}
