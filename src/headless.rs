//! Headless driver: free roam, walk up to the cabinet, play, and come back.

use crate::arcade::{ArcadeInput, ArcadeSession, ArcadeState, ArcadeStep};
use crate::config::ArcadeConfig;
use crate::display::DigitDisplay;
use crate::fade::SceneFader;
use crate::scripted_input::ScriptedInputPlayer;
use crate::shared::Shared;
use anyhow::{Context, Result};
use clawcade_audio::AudioManager;
use clawcade_collection::{CollectionManager, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use clawcade_core::{
    CraneCabinet, GameMode, InteractContext, Interactable, Interactive, LevelSelection,
    LoggingSessionObserver, MusicTrack, PrizeCollection, PrizeId, SessionObserver, SimTick,
    CRANE_SCENE, FREE_ROAM_SCENE,
};
use clawcade_crane::{ChuteEvent, ChuteServices, ClawEvent, CraneServices};
use clawcade_testkit::JsonlSink;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Entity id the headless player acts as.
const PLAYER: u64 = 1;

pub struct HeadlessConfig {
    pub arcade: ArcadeConfig,
    pub scripted_input: Option<PathBuf>,
    pub collection_path: Option<PathBuf>,
    pub event_log: Option<PathBuf>,
    pub max_ticks: Option<u64>,
    pub tick_rate: u32,
    pub exit_when_script_finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// The player left the cabinet and free roam finished loading.
    ReturnedToFreeRoam,
    ScriptFinished,
    MaxTicks,
}

/// Printed to stdout when a run ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub exit: ExitReason,
    pub ticks: u64,
    pub final_scene: String,
    pub cycles: u64,
    pub grabs: u32,
    pub lost_grabs: u32,
    pub resets: u32,
    pub delivered: Vec<PrizeId>,
    pub collected: Vec<PrizeId>,
    pub plays_remaining: Option<u32>,
    /// Prizes of the level still in the cabinet.
    pub prizes_left: Option<usize>,
    /// Lit indicator on the play display.
    pub display: Option<usize>,
    pub scene_loads: u32,
    pub sessions_ended: u32,
    pub cues_played: u64,
}

#[derive(Debug, Default)]
struct SessionCounter {
    ended: u32,
}

impl SessionObserver for SessionCounter {
    fn session_ended(&mut self) {
        self.ended += 1;
        LoggingSessionObserver.session_ended();
    }
}

type Collection = CollectionManager<Box<dyn KeyValueStore>>;

/// Collaborators shared between the driver and the crane scene.
struct Services {
    fader: Shared<SceneFader>,
    audio: Shared<AudioManager>,
    display: Shared<DigitDisplay>,
    sessions: Shared<SessionCounter>,
    collection: Shared<Collection>,
}

impl Services {
    fn crane(&self) -> CraneServices {
        CraneServices {
            display: Box::new(self.display.clone()),
            audio: Box::new(self.audio.clone()),
            scenes: Box::new(self.fader.clone()),
            session: Box::new(self.sessions.clone()),
        }
    }

    fn chute(&self) -> ChuteServices {
        ChuteServices {
            collection: Box::new(self.collection.clone()),
            audio: Box::new(self.audio.clone()),
            scenes: Box::new(self.fader.clone()),
        }
    }
}

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    validate(&cfg)?;
    let dt = 1.0 / cfg.tick_rate as f32;

    let mut audio = AudioManager::stub();
    audio.update_settings(cfg.arcade.audio.clone());
    let services = Services {
        fader: Shared::new(SceneFader::new(FREE_ROAM_SCENE, cfg.arcade.fade_seconds)),
        audio: Shared::new(audio),
        display: Shared::new(DigitDisplay::new(cfg.arcade.display_indicators)),
        sessions: Shared::new(SessionCounter::default()),
        collection: Shared::new(open_collection(cfg.collection_path.as_deref())?),
    };
    services.audio.borrow_mut().play_music(MusicTrack::FreeRoam);

    let mut script = cfg
        .scripted_input
        .as_deref()
        .map(ScriptedInputPlayer::from_path)
        .transpose()?;
    let mut log = cfg.event_log.as_deref().map(JsonlSink::create).transpose()?;

    let cabinet = Interactive::Crane(CraneCabinet {
        scene: CRANE_SCENE.to_string(),
        level: cfg.arcade.layout.name.clone(),
        plays: cfg.arcade.level.max_plays,
    });
    let mut mode = GameMode::FreeRoam;
    let mut selection: Option<LevelSelection> = None;
    let mut dialog = Vec::new();
    let mut visited = false;
    let mut arcade: Option<ArcadeSession> = None;
    let mut stats = Stats::default();

    let mut tick = SimTick::ZERO;
    let exit = loop {
        if cfg.max_ticks.is_some_and(|max| tick.0 >= max) {
            break ExitReason::MaxTicks;
        }

        if !visited && arcade.is_none() && !services.fader.borrow().is_busy() {
            let mut scenes = services.fader.clone();
            let mut ctx = InteractContext {
                mode: &mut mode,
                selection: &mut selection,
                scenes: &mut scenes,
                dialog: &mut dialog,
            };
            visited = cabinet.interact(PLAYER, &mut ctx);
        }

        if let Some(session) = arcade.as_mut() {
            // Script time starts once the crane takes input.
            let input = match script.as_mut() {
                Some(script) if session.state() == ArcadeState::Play && !session.has_left() => {
                    script.advance(dt)
                }
                _ => ArcadeInput::default(),
            };
            let step = session.tick(input, dt);
            stats.record(tick, &step, log.as_mut())?;
        }

        let loaded = {
            let mut fader = services.fader.borrow_mut();
            if fader.is_busy() {
                trace!(alpha = fader.alpha(), "fading");
            }
            fader.tick(dt)
        };
        let mut returned = false;
        if let Some(scene) = loaded {
            if let Some(log) = log.as_mut() {
                log.write_json(tick, "scene_loaded", &scene)?;
            }
            if scene == CRANE_SCENE {
                let plays = selection
                    .as_ref()
                    .map_or(cfg.arcade.level.max_plays, |s| s.plays);
                let session = ArcadeSession::new(&cfg.arcade, plays, services.crane(), services.chute())
                    .context("failed to build the crane scene")?;
                services.audio.borrow_mut().play_music(MusicTrack::Arcade);
                arcade = Some(session);
            } else if scene == FREE_ROAM_SCENE {
                if let Some(session) = arcade.take() {
                    stats.close(&session);
                }
                services.audio.borrow_mut().play_music(MusicTrack::FreeRoam);
                returned = visited;
            }
        }
        services.audio.borrow_mut().update();
        tick = tick.advance(1);

        if returned {
            break ExitReason::ReturnedToFreeRoam;
        }
        if cfg.exit_when_script_finished && script.as_ref().is_some_and(|s| s.is_finished()) {
            break ExitReason::ScriptFinished;
        }
    };

    if let Some(session) = arcade.as_ref() {
        stats.close(session);
    }
    let summary = RunSummary {
        exit,
        ticks: tick.0,
        final_scene: services.fader.borrow().current_scene().to_string(),
        cycles: stats.cycles,
        grabs: stats.grabs,
        lost_grabs: stats.lost_grabs,
        resets: stats.resets,
        delivered: stats.delivered,
        collected: services.collection.collected_prizes(),
        plays_remaining: stats.plays_remaining,
        prizes_left: stats.prizes_left,
        display: services.display.borrow().shown(),
        scene_loads: services.fader.borrow().loads(),
        sessions_ended: services.sessions.borrow().ended,
        cues_played: services.audio.borrow().cues_played(),
    };
    if let Some(log) = log.as_mut() {
        log.write_json(tick, "summary", &summary)?;
        debug!(records = log.written(), path = %log.path().display(), "event log written");
    }
    info!(?exit, ticks = summary.ticks, "headless run finished");
    Ok(summary)
}

fn validate(cfg: &HeadlessConfig) -> Result<()> {
    if cfg.tick_rate == 0 {
        anyhow::bail!("--tick-rate must be at least 1");
    }
    if cfg.exit_when_script_finished && cfg.scripted_input.is_none() {
        anyhow::bail!("--exit-when-script-finished requires --script");
    }
    if cfg.max_ticks.is_none() && !cfg.exit_when_script_finished {
        anyhow::bail!("headless runs need --max-ticks or --exit-when-script-finished");
    }
    Ok(())
}

fn open_collection(path: Option<&Path>) -> Result<Collection> {
    let store: Box<dyn KeyValueStore> = match path {
        Some(path) => Box::new(
            FileKeyValueStore::open(path)
                .with_context(|| format!("failed to open collection {}", path.display()))?,
        ),
        None => Box::new(MemoryKeyValueStore::new()),
    };
    CollectionManager::load(store).context("failed to load the prize collection")
}

#[derive(Debug, Default)]
struct Stats {
    cycles: u64,
    grabs: u32,
    lost_grabs: u32,
    resets: u32,
    delivered: Vec<PrizeId>,
    plays_remaining: Option<u32>,
    prizes_left: Option<usize>,
}

impl Stats {
    fn close(&mut self, session: &ArcadeSession) {
        self.plays_remaining = Some(session.crane().plays_remaining());
        self.prizes_left = Some(session.instance().remaining(session.world()));
    }

    fn record(&mut self, tick: SimTick, step: &ArcadeStep, log: Option<&mut JsonlSink>) -> Result<()> {
        if step.reset {
            self.resets += 1;
        }
        for event in &step.claw {
            match event {
                ClawEvent::Grabbed { .. } => self.grabs += 1,
                ClawEvent::LostGrab { .. } => self.lost_grabs += 1,
                _ => {}
            }
        }
        for event in &step.chute {
            if let ChuteEvent::PrizeDelivered { prize, .. } = event {
                self.delivered.push(prize.clone());
            }
        }
        if let Some(report) = &step.report {
            self.cycles += 1;
            self.plays_remaining = Some(report.plays_remaining);
        }

        let Some(log) = log else {
            return Ok(());
        };
        if step.reset {
            log.write_json(tick, "reset", &())?;
        }
        for event in &step.claw {
            log.write_json(tick, "claw", event)?;
        }
        for event in &step.chute {
            log.write_json(tick, "chute", event)?;
        }
        if let Some(report) = &step.report {
            log.write_json(tick, "cycle", report)?;
        }
        Ok(())
    }
}
