//! The crane rig controller: gantry input, drop triggering, and play bookkeeping.

use crate::{
    Bounds, ClawEvent, ClawMechanism, CraneConfig, CraneContext, CraneError, CyclePoll,
    LevelConfig, PlaySession,
};
use clawcade_core::{
    AudioCues, PlayDisplay, SceneTransition, SessionObserver, SoundId, FREE_ROAM_SCENE,
};
use clawcade_physics::BodyHandle;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

/// Collaborators the controller calls into.
pub struct CraneServices {
    /// Remaining-plays display.
    pub display: Box<dyn PlayDisplay>,
    /// Sound cues and music.
    pub audio: Box<dyn AudioCues>,
    /// Scene loader used when leaving the cabinet.
    pub scenes: Box<dyn SceneTransition>,
    /// Told when the last play is used.
    pub session: Box<dyn SessionObserver>,
}

/// Player input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CraneInput {
    /// Horizontal axis in `[-1, 1]`.
    pub axis: f32,
    /// Drop button pressed this tick.
    pub drop: bool,
}

impl CraneInput {
    /// Whether the input asks for anything.
    pub fn is_active(&self) -> bool {
        self.axis != 0.0 || self.drop
    }
}

/// Controller state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CraneState {
    /// Accepting gantry input.
    Idle,
    /// A drop cycle owns the rig.
    Dropping,
}

/// Summary of a finished drop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Target delivered to the drop zone, if any.
    pub grabbed: Option<BodyHandle>,
    /// Plays left after this cycle.
    pub plays_remaining: u32,
}

/// Drives one drop cycle per trigger and owns the play counter.
pub struct CraneController {
    claw: ClawMechanism,
    session: PlaySession,
    bounds: Bounds,
    config: CraneConfig,
    services: CraneServices,
    state: CraneState,
    cycles_completed: u64,
    last_events: Vec<ClawEvent>,
}

impl CraneController {
    /// Wrap a claw mechanism with the level's bounds and play count.
    pub fn new(
        claw: ClawMechanism,
        level: &LevelConfig,
        config: CraneConfig,
        mut services: CraneServices,
    ) -> Result<Self, CraneError> {
        let bounds = match config.validate().and_then(|()| level.bounds()) {
            Ok(bounds) => bounds,
            Err(err) => {
                error!(%err, "crane configuration rejected");
                return Err(err);
            }
        };
        let session = PlaySession::new(level.max_plays);
        services.display.update_display(session.remaining());
        Ok(Self {
            claw,
            session,
            bounds,
            config,
            services,
            state: CraneState::Idle,
            cycles_completed: 0,
            last_events: Vec::new(),
        })
    }

    /// The claw mechanism.
    pub fn claw(&self) -> &ClawMechanism {
        &self.claw
    }

    /// Current state.
    pub fn state(&self) -> CraneState {
        self.state
    }

    /// Plays left.
    pub fn plays_remaining(&self) -> u32 {
        self.session.remaining()
    }

    /// Play session.
    pub fn session(&self) -> &PlaySession {
        &self.session
    }

    /// Gantry limits.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Pivot position.
    pub fn pivot(&self) -> Vec2 {
        self.claw.rig().pivot
    }

    /// Drop cycles finished this session.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Claw events emitted during the most recent call.
    pub fn last_events(&self) -> &[ClawEvent] {
        &self.last_events
    }

    /// X the held target is carried to.
    pub fn drop_zone_x(&self) -> f32 {
        self.bounds
            .clamp(self.config.drop_zone_x.unwrap_or(self.bounds.right()))
    }

    /// Advance one tick. Returns a report when a drop cycle finishes.
    pub fn tick(&mut self, input: CraneInput, dt: f32, ctx: &mut CraneContext<'_>) -> Option<CycleReport> {
        self.last_events.clear();
        let poll = self.claw.tick(dt, ctx);
        self.collect_claw_events();

        match self.state {
            CraneState::Dropping => {
                if input.is_active() {
                    trace!("input ignored while dropping");
                }
                match poll {
                    CyclePoll::Done(grabbed) => Some(self.finish_cycle(grabbed)),
                    _ => None,
                }
            }
            CraneState::Idle => {
                if self.session.is_exhausted() {
                    if input.is_active() {
                        trace!("input ignored: out of plays");
                    }
                    return None;
                }
                self.move_gantry(input.axis, dt, ctx);
                if input.drop {
                    self.start_drop();
                }
                None
            }
        }
    }

    fn move_gantry(&mut self, axis: f32, dt: f32, ctx: &mut CraneContext<'_>) {
        let axis = axis.clamp(-1.0, 1.0);
        if axis == 0.0 {
            return;
        }
        let x = self
            .bounds
            .clamp(self.claw.rig().pivot.x + axis * self.config.move_speed * dt);
        if let Err(err) = self.claw.move_gantry(x, ctx.physics) {
            warn!(%err, "gantry move failed");
        }
    }

    fn start_drop(&mut self) {
        let initial_y = self.claw.rig().pivot.y;
        let drop_x = self.drop_zone_x();
        match self
            .claw
            .drop_and_grab(initial_y, drop_x, self.config.transport_speed)
        {
            Ok(()) => {
                info!(plays = self.session.remaining(), x = self.pivot().x, "drop triggered");
                self.state = CraneState::Dropping;
                self.collect_claw_events();
            }
            Err(err) => warn!(%err, "drop rejected"),
        }
    }

    fn finish_cycle(&mut self, grabbed: Option<BodyHandle>) -> CycleReport {
        let remaining = self.session.consume();
        self.cycles_completed += 1;
        self.state = CraneState::Idle;
        self.services.display.update_display(remaining);
        info!(?grabbed, remaining, "drop cycle complete");

        if remaining == 0 {
            let position = self.pivot();
            self.services.audio.play_one_shot(
                SoundId::OutOfPlays,
                position,
                SoundId::OutOfPlays.default_volume(),
            );
            self.services.session.session_ended();
        }
        CycleReport {
            grabbed,
            plays_remaining: remaining,
        }
    }

    /// Cancel any cycle, then start a fresh session with new limits.
    pub fn reset_session(&mut self, max_plays: u32, bounds: Bounds, ctx: &mut CraneContext<'_>) {
        if self.state == CraneState::Dropping {
            debug!("reset cancels in-flight drop");
        }
        self.last_events.clear();
        self.claw.abort(ctx);
        self.collect_claw_events();
        self.state = CraneState::Idle;
        self.bounds = bounds;
        self.session.reset(max_plays);
        let x = bounds.clamp(self.claw.rig().pivot.x);
        if let Err(err) = self.claw.move_gantry(x, ctx.physics) {
            warn!(%err, "gantry reset failed");
        }
        self.services.display.update_display(max_plays);
        info!(max_plays, "crane session reset");
    }

    /// Leave the cabinet: stop music and fade back to free roam. Ignored
    /// while a drop is in flight.
    pub fn leave(&mut self) -> bool {
        if self.state == CraneState::Dropping {
            trace!("leave ignored while dropping");
            return false;
        }
        self.services.audio.stop_music();
        self.services.scenes.fade_to_scene(FREE_ROAM_SCENE);
        info!("leaving crane");
        true
    }

    /// Append the claw's pending events to `last_events`, playing their cues.
    fn collect_claw_events(&mut self) {
        let events = self.claw.drain_events();
        let position = self.pivot();
        for event in &events {
            let cue = match event {
                ClawEvent::DescentStarted => SoundId::ClawDrop,
                ClawEvent::Grabbed { .. } => SoundId::ClawGrab,
                ClawEvent::Released { .. } => SoundId::ClawRelease,
                ClawEvent::DescentSettled { .. } => SoundId::GantryStop,
                _ => continue,
            };
            self.services
                .audio
                .play_one_shot(cue, position, cue.default_volume());
        }
        self.last_events.extend(events);
    }
}
