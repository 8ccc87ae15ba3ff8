//! Shared cabinet fixture for unit tests.

use crate::{
    ChuteServices, ClawArms, ClawConfig, ClawMechanism, CraneConfig, CraneContext,
    CraneController, CraneInput, CraneServices, CyclePoll, CycleReport, DropPhase, GrabTarget,
    GrabTargets, LevelConfig, RigHandle,
};
use clawcade_core::{
    AudioCues, PlayDisplay, PrizeCollection, PrizeId, SceneTransition, SessionObserver, SoundId,
};
use clawcade_physics::{BodyDesc, BodyHandle, CollisionLayers, PhysicsWorld};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) const DT: f32 = 1.0 / 60.0;

/// Floor top sits at y = -2.5; the default level rests the pivot at (0, 4)
/// with a drop distance of 5.
pub(crate) struct Cabinet {
    pub world: PhysicsWorld,
    pub targets: GrabTargets,
    pub claw: ClawMechanism,
}

impl Cabinet {
    pub fn new(config: ClawConfig) -> Self {
        let mut world = PhysicsWorld::default();
        world.spawn(BodyDesc::fixed(
            "floor",
            Vec2::new(0.0, -3.0),
            Vec2::new(10.0, 0.5),
            CollisionLayers::OBSTACLE,
        ));
        let level = LevelConfig::default();
        let arms = ClawArms::spawn(&mut world, level.spawn_position, &config);
        let claw = ClawMechanism::new(RigHandle(1), arms, config, &level, &mut world)
            .expect("claw builds");
        Self {
            world,
            targets: GrabTargets::new(),
            claw,
        }
    }

    pub fn spawn_prize(&mut self, center: Vec2, half_extents: Vec2) -> BodyHandle {
        let body = self.world.spawn(BodyDesc::dynamic(
            "prize",
            center,
            half_extents,
            CollisionLayers::GRABBABLE,
        ));
        self.targets.insert(GrabTarget::new(body));
        body
    }

    /// Prize resting on the floor, 0.5 tall.
    pub fn spawn_floor_prize(&mut self, x: f32, half_width: f32) -> BodyHandle {
        self.spawn_prize(Vec2::new(x, -2.25), Vec2::new(half_width, 0.25))
    }

    pub fn spawn_block(&mut self, center: Vec2, half_extents: Vec2) -> BodyHandle {
        self.world.spawn(BodyDesc::fixed(
            "block",
            center,
            half_extents,
            CollisionLayers::OBSTACLE,
        ))
    }

    pub fn start(&mut self, target_x: f32) {
        self.claw
            .drop_and_grab(4.0, target_x, 5.0)
            .expect("claw is idle");
    }

    /// Advance the claw, then the world.
    pub fn tick_claw(&mut self, dt: f32) -> CyclePoll {
        let poll = self.claw.tick(
            dt,
            &mut CraneContext {
                physics: &mut self.world,
                targets: &mut self.targets,
            },
        );
        self.world.step(dt);
        poll
    }

    pub fn tick_until_phase(&mut self, phase: DropPhase) {
        for _ in 0..5_000 {
            if self.claw.phase() == Some(phase) {
                return;
            }
            self.tick_claw(DT);
        }
        panic!("never reached {phase:?}");
    }

    pub fn abort(&mut self) -> Option<BodyHandle> {
        self.claw.abort(&mut CraneContext {
            physics: &mut self.world,
            targets: &mut self.targets,
        })
    }
}

/// Everything the fake collaborators saw.
#[derive(Debug, Default)]
pub(crate) struct Recorded {
    pub display: Vec<u32>,
    pub cues: Vec<SoundId>,
    pub music_stops: u32,
    pub scenes: Vec<String>,
    pub sessions_ended: u32,
    pub collected: Vec<PrizeId>,
}

/// Fake for every collaborator trait, sharing one [`Recorded`].
#[derive(Clone, Default)]
pub(crate) struct Recorder(pub Rc<RefCell<Recorded>>);

impl PlayDisplay for Recorder {
    fn update_display(&mut self, remaining_plays: u32) {
        self.0.borrow_mut().display.push(remaining_plays);
    }
}

impl AudioCues for Recorder {
    fn play_one_shot(&mut self, cue: SoundId, _position: Vec2, _volume: f32) {
        self.0.borrow_mut().cues.push(cue);
    }

    fn stop_music(&mut self) {
        self.0.borrow_mut().music_stops += 1;
    }
}

impl SceneTransition for Recorder {
    fn fade_to_scene(&mut self, name: &str) {
        self.0.borrow_mut().scenes.push(name.to_string());
    }
}

impl SessionObserver for Recorder {
    fn session_ended(&mut self) {
        self.0.borrow_mut().sessions_ended += 1;
    }
}

impl PrizeCollection for Recorder {
    fn add_prize(&mut self, id: &PrizeId) {
        let mut recorded = self.0.borrow_mut();
        if !recorded.collected.contains(id) {
            recorded.collected.push(id.clone());
        }
    }

    fn has_prize(&self, id: &PrizeId) -> bool {
        self.0.borrow().collected.contains(id)
    }

    fn collected_prizes(&self) -> Vec<PrizeId> {
        self.0.borrow().collected.clone()
    }
}

impl Recorder {
    pub fn crane_services(&self) -> CraneServices {
        CraneServices {
            display: Box::new(self.clone()),
            audio: Box::new(self.clone()),
            scenes: Box::new(self.clone()),
            session: Box::new(self.clone()),
        }
    }

    pub fn chute_services(&self) -> ChuteServices {
        ChuteServices {
            collection: Box::new(self.clone()),
            audio: Box::new(self.clone()),
            scenes: Box::new(self.clone()),
        }
    }
}

/// A cabinet wired to a controller with recording collaborators.
pub(crate) struct Arcade {
    pub world: PhysicsWorld,
    pub targets: GrabTargets,
    pub crane: CraneController,
    pub recorder: Rc<RefCell<Recorded>>,
}

impl Arcade {
    pub fn new(max_plays: u32) -> Self {
        let Cabinet {
            world,
            targets,
            claw,
        } = Cabinet::new(ClawConfig::default());
        let level = LevelConfig {
            max_plays,
            ..LevelConfig::default()
        };
        let recorder = Recorder::default();
        let crane = CraneController::new(
            claw,
            &level,
            CraneConfig::default(),
            recorder.crane_services(),
        )
        .expect("controller builds");
        Self {
            world,
            targets,
            crane,
            recorder: recorder.0,
        }
    }

    pub fn tick(&mut self, input: CraneInput) -> Option<CycleReport> {
        let report = self.crane.tick(
            input,
            DT,
            &mut CraneContext {
                physics: &mut self.world,
                targets: &mut self.targets,
            },
        );
        self.world.step(DT);
        report
    }

    /// Tick with no input until the running cycle reports.
    pub fn finish_cycle(&mut self) -> CycleReport {
        for _ in 0..5_000 {
            if let Some(report) = self.tick(CraneInput::default()) {
                return report;
            }
        }
        panic!("drop cycle never finished");
    }

    pub fn play_once(&mut self) -> CycleReport {
        self.tick(CraneInput {
            axis: 0.0,
            drop: true,
        });
        self.finish_cycle()
    }
}
