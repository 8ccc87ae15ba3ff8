//! Cabinet harness shared by the crane worldtests.

#![allow(dead_code)]

use clawcade_core::{
    AudioCues, PlayDisplay, PrizeCollection, PrizeId, PrizeInfo, SceneTransition,
    SessionObserver, SimTick, SoundId,
};
use clawcade_crane::{
    ChuteConfig, ChuteEvent, ChuteServices, ClawArms, ClawConfig, ClawMechanism, CraneConfig,
    CraneContext, CraneController, CraneInput, CraneServices, CycleReport, GrabTarget,
    GrabTargets, LevelConfig, PrizeChute, RigHandle,
};
use clawcade_physics::{BodyDesc, BodyHandle, CollisionLayers, PhysicsWorld};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;

pub const DT: f32 = 1.0 / 60.0;

/// Upper bound on ticks any single cycle may take in these layouts.
pub const MAX_CYCLE_TICKS: u32 = 2_000;

/// What the collaborators were asked to do.
#[derive(Debug, Default)]
pub struct Log {
    pub display: Vec<u32>,
    pub cues: Vec<SoundId>,
    pub music_stops: u32,
    pub scenes: Vec<String>,
    pub sessions_ended: u32,
    pub collected: Vec<PrizeId>,
}

#[derive(Clone, Default)]
pub struct SharedLog(pub Rc<RefCell<Log>>);

impl PlayDisplay for SharedLog {
    fn update_display(&mut self, remaining_plays: u32) {
        self.0.borrow_mut().display.push(remaining_plays);
    }
}

impl AudioCues for SharedLog {
    fn play_one_shot(&mut self, cue: SoundId, _position: Vec2, _volume: f32) {
        self.0.borrow_mut().cues.push(cue);
    }

    fn stop_music(&mut self) {
        self.0.borrow_mut().music_stops += 1;
    }
}

impl SceneTransition for SharedLog {
    fn fade_to_scene(&mut self, name: &str) {
        self.0.borrow_mut().scenes.push(name.to_string());
    }
}

impl SessionObserver for SharedLog {
    fn session_ended(&mut self) {
        self.0.borrow_mut().sessions_ended += 1;
    }
}

impl PrizeCollection for SharedLog {
    fn add_prize(&mut self, id: &PrizeId) {
        let mut log = self.0.borrow_mut();
        if !log.collected.contains(id) {
            log.collected.push(id.clone());
        }
    }

    fn has_prize(&self, id: &PrizeId) -> bool {
        self.0.borrow().collected.contains(id)
    }

    fn collected_prizes(&self) -> Vec<PrizeId> {
        self.0.borrow().collected.clone()
    }
}

/// Floor top at y = -2.5, gantry between -7 and 7, pivot resting at (0, 4),
/// chute trigger under the right limit.
pub struct Cabinet {
    pub world: PhysicsWorld,
    pub targets: GrabTargets,
    pub crane: CraneController,
    pub chute: PrizeChute,
    pub log: SharedLog,
    pub tick: SimTick,
    pub chute_events: Vec<ChuteEvent>,
}

impl Cabinet {
    pub fn new(max_plays: u32) -> Self {
        Self::with_claw(max_plays, ClawConfig::default())
    }

    pub fn with_claw(max_plays: u32, claw_config: ClawConfig) -> Self {
        let mut world = PhysicsWorld::default();
        world.spawn(BodyDesc::fixed(
            "floor",
            Vec2::new(0.0, -3.0),
            Vec2::new(10.0, 0.5),
            CollisionLayers::OBSTACLE,
        ));
        let chute_body = world.spawn(BodyDesc::fixed(
            "chute",
            Vec2::new(7.0, -1.0),
            Vec2::new(1.0, 1.0),
            CollisionLayers::CHUTE,
        ));

        let level = LevelConfig {
            max_plays,
            ..LevelConfig::default()
        };
        let log = SharedLog::default();
        let arms = ClawArms::spawn(&mut world, level.spawn_position, &claw_config);
        let claw = ClawMechanism::new(RigHandle(1), arms, claw_config, &level, &mut world)
            .expect("claw builds");
        let crane = CraneController::new(
            claw,
            &level,
            CraneConfig::default(),
            CraneServices {
                display: Box::new(log.clone()),
                audio: Box::new(log.clone()),
                scenes: Box::new(log.clone()),
                session: Box::new(log.clone()),
            },
        )
        .expect("controller builds");
        let chute = PrizeChute::new(
            chute_body,
            ChuteConfig::default(),
            ChuteServices {
                collection: Box::new(log.clone()),
                audio: Box::new(log.clone()),
                scenes: Box::new(log.clone()),
            },
            &world,
        )
        .expect("chute builds");

        Self {
            world,
            targets: GrabTargets::new(),
            crane,
            chute,
            log,
            tick: SimTick::ZERO,
            chute_events: Vec::new(),
        }
    }

    /// A 1.5 wide prize resting on the floor at `x`.
    pub fn spawn_prize(&mut self, x: f32, id: &str) -> BodyHandle {
        let body = self.world.spawn(BodyDesc::dynamic(
            id,
            Vec2::new(x, -2.25),
            Vec2::new(0.75, 0.25),
            CollisionLayers::GRABBABLE,
        ));
        let prize = PrizeInfo::new(PrizeId::parse(id).expect("valid prize id"));
        self.targets.insert(GrabTarget::new(body).with_prize(prize));
        body
    }

    pub fn ctx(&mut self) -> CraneContext<'_> {
        CraneContext {
            physics: &mut self.world,
            targets: &mut self.targets,
        }
    }

    /// Controller, then chute, then physics.
    pub fn step(&mut self, input: CraneInput) -> Option<CycleReport> {
        let mut ctx = CraneContext {
            physics: &mut self.world,
            targets: &mut self.targets,
        };
        let report = self.crane.tick(input, DT, &mut ctx);
        let events = self.chute.tick(DT, &mut ctx);
        self.chute_events.extend(events);
        self.world.step(DT);
        self.tick = self.tick.advance(1);
        report
    }

    pub fn press_drop(&mut self) -> Option<CycleReport> {
        self.step(CraneInput {
            axis: 0.0,
            drop: true,
        })
    }

    pub fn idle(&mut self) -> Option<CycleReport> {
        self.step(CraneInput::default())
    }

    pub fn run_cycle(&mut self) -> CycleReport {
        self.press_drop();
        for _ in 0..MAX_CYCLE_TICKS {
            if let Some(report) = self.idle() {
                return report;
            }
        }
        panic!("drop cycle did not finish within {MAX_CYCLE_TICKS} ticks");
    }

    /// Idle until `done` holds, returning the ticks spent.
    pub fn idle_until(&mut self, mut done: impl FnMut(&Self) -> bool) -> u32 {
        for spent in 0..MAX_CYCLE_TICKS {
            if done(self) {
                return spent;
            }
            self.idle();
        }
        panic!("condition not reached within {MAX_CYCLE_TICKS} ticks");
    }
}
