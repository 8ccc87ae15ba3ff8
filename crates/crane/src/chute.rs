//! Prize chute: the trigger volume that consumes whatever the claw drops into it.
//!
//! Prize targets are recorded in the collection and announced by a short popup
//! timeline that ends by fading back to free roam. Anything else is destroyed
//! without ceremony.

use crate::{CraneContext, CraneError};
use clawcade_core::{AudioCues, PrizeCollection, PrizeId, SceneTransition, SoundId, FREE_ROAM_SCENE};
use clawcade_physics::{BodyHandle, BodyKind, CollisionLayers, PhysicsBackend};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const POPUP_DELAY: f32 = 0.2;
const POP_OUT_LEAD: f32 = 0.3;
const SHRINK_TIME: f32 = 0.2;
const HOLD_TIME: f32 = 0.5;

/// Chute tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChuteConfig {
    /// Seconds the prize popup spins, including the pop-out lead.
    pub spin_time: f32,
}

impl Default for ChuteConfig {
    fn default() -> Self {
        Self { spin_time: 2.0 }
    }
}

/// Collaborators the chute calls into.
pub struct ChuteServices {
    /// Record of won prizes.
    pub collection: Box<dyn PrizeCollection>,
    /// Sound cues and music.
    pub audio: Box<dyn AudioCues>,
    /// Scene loader used once the popup ends.
    pub scenes: Box<dyn SceneTransition>,
}

/// Stages of the prize popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopupStage {
    /// Short wait before the popup appears.
    Delay,
    /// Prize card spinning.
    Spin,
    /// Pop-out cue played, card about to shrink.
    PopOut,
    /// Card shrinking away.
    Shrink,
    /// Final pause before leaving the scene.
    Hold,
}

#[derive(Debug, Clone)]
struct Popup {
    stage: PopupStage,
    remaining: f32,
    prize: PrizeId,
}

/// Something the chute did during a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChuteEvent {
    /// A prize entered the chute.
    PrizeDelivered {
        /// Body that was consumed.
        body: BodyHandle,
        /// Prize it carried.
        prize: PrizeId,
        /// Whether this was the first time the prize was won.
        newly_collected: bool,
    },
    /// A non-prize body entered and was destroyed.
    Discarded {
        /// Body that was destroyed.
        body: BodyHandle,
    },
    /// The popup finished and the scene fade was requested.
    PopupFinished {
        /// Prize the popup showed.
        prize: PrizeId,
    },
}

/// Trigger volume consuming delivered bodies.
pub struct PrizeChute {
    trigger: BodyHandle,
    position: Vec2,
    config: ChuteConfig,
    services: ChuteServices,
    popup: Option<Popup>,
}

impl PrizeChute {
    /// Attach to the trigger body `trigger`.
    pub fn new(
        trigger: BodyHandle,
        config: ChuteConfig,
        services: ChuteServices,
        physics: &dyn PhysicsBackend,
    ) -> Result<Self, CraneError> {
        let position = physics
            .body(trigger)
            .map(|b| b.position)
            .ok_or(CraneError::MissingChuteBody(trigger))?;
        if !(config.spin_time >= POP_OUT_LEAD) {
            return Err(CraneError::NonPositive {
                field: "spin_time",
                value: config.spin_time,
            });
        }
        Ok(Self {
            trigger,
            position,
            config,
            services,
            popup: None,
        })
    }

    /// Trigger body.
    pub fn trigger(&self) -> BodyHandle {
        self.trigger
    }

    /// Stage of the running popup.
    pub fn popup_stage(&self) -> Option<PopupStage> {
        self.popup.as_ref().map(|p| p.stage)
    }

    /// Consume bodies inside the trigger, then advance the popup.
    pub fn tick(&mut self, dt: f32, ctx: &mut CraneContext<'_>) -> Vec<ChuteEvent> {
        let mut events = Vec::new();
        if let Some(zone) = ctx.physics.body(self.trigger).map(|b| b.aabb()) {
            for body in ctx.physics.overlap_aabb(zone, CollisionLayers::CONTACT) {
                let is_static = ctx
                    .physics
                    .body(body)
                    .map_or(true, |b| b.kind == BodyKind::Static);
                let is_held = ctx.targets.get(body).is_some_and(|t| t.is_held());
                if is_static || is_held {
                    continue;
                }
                events.push(self.consume(body, ctx));
            }
        }
        if let Some(event) = self.advance_popup(dt.max(0.0)) {
            events.push(event);
        }
        events
    }

    fn consume(&mut self, body: BodyHandle, ctx: &mut CraneContext<'_>) -> ChuteEvent {
        let target = ctx.targets.remove(body);
        ctx.physics.despawn(body);

        let Some(prize) = target.and_then(|t| t.prize) else {
            debug!(?body, "chute discarded body");
            return ChuteEvent::Discarded { body };
        };

        let newly_collected = !self.services.collection.has_prize(&prize.id);
        if newly_collected {
            self.services.collection.add_prize(&prize.id);
        }
        self.services.audio.play_one_shot(
            SoundId::PrizePopIn,
            self.position,
            SoundId::PrizePopIn.default_volume(),
        );
        info!(prize = %prize.id, newly_collected, "prize delivered");

        if self.popup.is_none() {
            self.popup = Some(Popup {
                stage: PopupStage::Delay,
                remaining: POPUP_DELAY,
                prize: prize.id.clone(),
            });
        }
        ChuteEvent::PrizeDelivered {
            body,
            prize: prize.id,
            newly_collected,
        }
    }

    fn advance_popup(&mut self, dt: f32) -> Option<ChuteEvent> {
        let popup = self.popup.as_mut()?;
        popup.remaining -= dt;
        while popup.remaining <= 0.0 {
            let (stage, duration) = match popup.stage {
                PopupStage::Delay => (PopupStage::Spin, self.config.spin_time - POP_OUT_LEAD),
                PopupStage::Spin => {
                    self.services.audio.play_one_shot(
                        SoundId::PrizePopOut,
                        self.position,
                        SoundId::PrizePopOut.default_volume(),
                    );
                    (PopupStage::PopOut, POP_OUT_LEAD)
                }
                PopupStage::PopOut => (PopupStage::Shrink, SHRINK_TIME),
                PopupStage::Shrink => (PopupStage::Hold, HOLD_TIME),
                PopupStage::Hold => {
                    let prize = popup.prize.clone();
                    self.popup = None;
                    self.services.audio.stop_music();
                    self.services.scenes.fade_to_scene(FREE_ROAM_SCENE);
                    debug!(%prize, "prize popup finished");
                    return Some(ChuteEvent::PopupFinished { prize });
                }
            };
            popup.stage = stage;
            popup.remaining += duration;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Recorder, DT};
    use crate::{GrabTarget, GrabTargets, RigHandle};
    use clawcade_core::PrizeInfo;
    use clawcade_physics::{BodyDesc, PhysicsWorld};

    struct Fixture {
        world: PhysicsWorld,
        targets: GrabTargets,
        chute: PrizeChute,
        recorder: Recorder,
    }

    impl Fixture {
        fn new() -> Self {
            let mut world = PhysicsWorld::default();
            let trigger = world.spawn(BodyDesc::fixed(
                "chute",
                Vec2::new(7.0, -1.0),
                Vec2::new(1.0, 1.0),
                CollisionLayers::CHUTE,
            ));
            let recorder = Recorder::default();
            let chute = PrizeChute::new(
                trigger,
                ChuteConfig::default(),
                recorder.chute_services(),
                &world,
            )
            .unwrap();
            Self {
                world,
                targets: GrabTargets::new(),
                chute,
                recorder,
            }
        }

        fn spawn(&mut self, prize: Option<&str>) -> BodyHandle {
            let body = self.world.spawn(BodyDesc::dynamic(
                "thing",
                Vec2::new(7.0, -1.0),
                Vec2::splat(0.25),
                CollisionLayers::GRABBABLE,
            ));
            let mut target = GrabTarget::new(body);
            if let Some(id) = prize {
                target = target.with_prize(PrizeInfo::new(PrizeId::parse(id).unwrap()));
            }
            self.targets.insert(target);
            body
        }

        fn tick(&mut self) -> Vec<ChuteEvent> {
            self.chute.tick(
                DT,
                &mut CraneContext {
                    physics: &mut self.world,
                    targets: &mut self.targets,
                },
            )
        }
    }

    #[test]
    fn prize_is_collected_and_popup_fades_out() {
        let mut fx = Fixture::new();
        let body = fx.spawn(Some("bear"));

        let events = fx.tick();
        assert_eq!(
            events,
            vec![ChuteEvent::PrizeDelivered {
                body,
                prize: PrizeId::parse("bear").unwrap(),
                newly_collected: true,
            }]
        );
        assert!(fx.world.body(body).is_none());
        assert!(fx.targets.get(body).is_none());
        assert_eq!(fx.chute.popup_stage(), Some(PopupStage::Delay));

        let mut finished = false;
        for _ in 0..400 {
            if fx
                .tick()
                .iter()
                .any(|e| matches!(e, ChuteEvent::PopupFinished { .. }))
            {
                finished = true;
                break;
            }
        }
        assert!(finished);
        let recorded = fx.recorder.0.borrow();
        assert_eq!(recorded.collected.len(), 1);
        assert_eq!(recorded.cues, vec![SoundId::PrizePopIn, SoundId::PrizePopOut]);
        assert_eq!(recorded.scenes, vec![FREE_ROAM_SCENE.to_string()]);
        assert_eq!(recorded.music_stops, 1);
    }

    #[test]
    fn duplicate_prize_is_not_added_twice() {
        let mut fx = Fixture::new();
        fx.spawn(Some("bear"));
        fx.tick();
        fx.spawn(Some("bear"));
        let events = fx.tick();
        assert!(matches!(
            events.as_slice(),
            [ChuteEvent::PrizeDelivered {
                newly_collected: false,
                ..
            }]
        ));
        assert_eq!(fx.recorder.0.borrow().collected.len(), 1);
    }

    #[test]
    fn non_prize_bodies_are_discarded_silently() {
        let mut fx = Fixture::new();
        let body = fx.spawn(None);
        assert_eq!(fx.tick(), vec![ChuteEvent::Discarded { body }]);
        assert!(fx.world.body(body).is_none());
        assert!(fx.recorder.0.borrow().cues.is_empty());
        assert_eq!(fx.chute.popup_stage(), None);
    }

    #[test]
    fn held_bodies_pass_through() {
        let mut fx = Fixture::new();
        let body = fx.spawn(Some("bear"));
        fx.targets.acquire(body, RigHandle(1), Vec2::ZERO);
        assert!(fx.tick().is_empty());
        assert!(fx.world.body(body).is_some());
    }

    #[test]
    fn missing_trigger_is_a_configuration_error() {
        let world = PhysicsWorld::default();
        let recorder = Recorder::default();
        let err = PrizeChute::new(
            BodyHandle(5),
            ChuteConfig::default(),
            recorder.chute_services(),
            &world,
        )
        .err();
        assert_eq!(err, Some(CraneError::MissingChuteBody(BodyHandle(5))));
    }
}
