//! One visit to the crane cabinet: intro, play, leave, and level resets.

use crate::config::{ArcadeConfig, LevelLayout};
use crate::level::{Arena, LevelInstance};
use clawcade_core::SimTick;
use clawcade_crane::{
    Bounds, ChuteEvent, ChuteServices, ClawArms, ClawEvent, ClawMechanism, CraneContext,
    CraneController, CraneError, CraneInput, CraneServices, CycleReport, GrabTargets, LevelConfig,
    PrizeChute, RigHandle,
};
use clawcade_physics::PhysicsWorld;
use serde::Serialize;
use tracing::{debug, info};

const RIG: RigHandle = RigHandle(1);

/// Scene state: the camera settles first, then the crane takes input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArcadeState {
    Move,
    Play,
}

/// Input for one tick of the crane scene.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArcadeInput {
    pub crane: CraneInput,
    pub leave: bool,
    pub reset: bool,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArcadeStep {
    pub report: Option<CycleReport>,
    pub claw: Vec<ClawEvent>,
    pub chute: Vec<ChuteEvent>,
    pub reset: bool,
}

pub struct ArcadeSession {
    world: PhysicsWorld,
    targets: GrabTargets,
    crane: CraneController,
    chute: PrizeChute,
    instance: LevelInstance,
    layout: LevelLayout,
    level: LevelConfig,
    bounds: Bounds,
    state: ArcadeState,
    intro_remaining: f32,
    left: bool,
    tick: SimTick,
}

impl ArcadeSession {
    /// Build the cabinet for `config` with `max_plays` plays.
    pub fn new(
        config: &ArcadeConfig,
        max_plays: u32,
        crane_services: CraneServices,
        chute_services: ChuteServices,
    ) -> Result<Self, CraneError> {
        let level = LevelConfig {
            max_plays,
            ..config.level.clone()
        };
        let bounds = level.bounds()?;
        let mut world = PhysicsWorld::default();
        let mut targets = GrabTargets::new();

        let arena = Arena::spawn(&config.layout, bounds, config.chute_x(), &mut world);
        let arms = ClawArms::spawn(&mut world, level.spawn_position, &config.claw);
        let claw = ClawMechanism::new(RIG, arms, config.claw.clone(), &level, &mut world)?;
        let crane = CraneController::new(claw, &level, config.crane.clone(), crane_services)?;
        let chute = PrizeChute::new(arena.chute, config.chute.clone(), chute_services, &world)?;
        let instance =
            LevelInstance::spawn(&config.layout, bounds, &mut world, &mut targets, SimTick::ZERO);

        info!(level = %config.layout.name, max_plays, "crane scene ready");
        Ok(Self {
            world,
            targets,
            crane,
            chute,
            instance,
            layout: config.layout.clone(),
            level,
            bounds,
            state: ArcadeState::Move,
            intro_remaining: config.intro_seconds.max(0.0),
            left: false,
            tick: SimTick::ZERO,
        })
    }

    pub fn state(&self) -> ArcadeState {
        self.state
    }

    pub fn crane(&self) -> &CraneController {
        &self.crane
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    #[cfg(test)]
    pub fn targets(&self) -> &GrabTargets {
        &self.targets
    }

    pub fn instance(&self) -> &LevelInstance {
        &self.instance
    }

    /// Whether the player already asked to leave.
    pub fn has_left(&self) -> bool {
        self.left
    }

    /// Advance the scene: crane, then chute, then physics.
    pub fn tick(&mut self, input: ArcadeInput, dt: f32) -> ArcadeStep {
        let mut step = ArcadeStep::default();
        let mut crane_input = CraneInput::default();

        match self.state {
            ArcadeState::Move => {
                self.intro_remaining -= dt.max(0.0);
                if self.intro_remaining <= 0.0 {
                    debug!("intro finished; crane accepts input");
                    self.state = ArcadeState::Play;
                }
            }
            ArcadeState::Play if !self.left => {
                if input.reset {
                    self.reset();
                    step.reset = true;
                    step.claw.extend_from_slice(self.crane.last_events());
                }
                if input.leave && self.crane.leave() {
                    self.left = true;
                } else {
                    crane_input = input.crane;
                }
            }
            ArcadeState::Play => {}
        }

        let mut ctx = CraneContext {
            physics: &mut self.world,
            targets: &mut self.targets,
        };
        step.report = self.crane.tick(crane_input, dt, &mut ctx);
        step.claw.extend_from_slice(self.crane.last_events());
        step.chute = self.chute.tick(dt, &mut ctx);
        self.world.step(dt);
        self.tick = self.tick.advance(1);
        step
    }

    /// Put the level back the way it started and grant a fresh set of plays.
    pub fn reset(&mut self) {
        let mut ctx = CraneContext {
            physics: &mut self.world,
            targets: &mut self.targets,
        };
        self.crane
            .reset_session(self.level.max_plays, self.bounds, &mut ctx);
        self.instance.clear(&mut self.world, &mut self.targets);
        self.instance = LevelInstance::spawn(
            &self.layout,
            self.bounds,
            &mut self.world,
            &mut self.targets,
            self.tick,
        );
        info!(tick = self.tick.0, "level reset");
    }
}
