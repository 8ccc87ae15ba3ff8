//! The claw mechanism: arm kinematics, contact detection, and the grab decision.

use crate::{
    ArmSide, ClawArms, ClawConfig, ClawRig, CraneContext, CraneError, CyclePoll, DropCycle,
    DropPhase, LevelConfig, RigHandle,
};
use clawcade_physics::{BodyHandle, BodyKind, CollisionLayers, PhysicsBackend};
use glam::Vec2;
use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

/// Something observable the mechanism did during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClawEvent {
    /// A drop cycle began.
    DescentStarted,
    /// An arm found a surface while descending.
    ArmContact {
        /// Which arm.
        side: ArmSide,
        /// Body that was hit.
        body: BodyHandle,
    },
    /// Descent ended with the pivot at `pivot_y`.
    DescentSettled {
        /// Final pivot height.
        pivot_y: f32,
    },
    /// A target was linked to the rig.
    Grabbed {
        /// Grabbed body.
        body: BodyHandle,
    },
    /// The held target's link broke outside the mechanism.
    LostGrab {
        /// Body that was lost.
        body: BodyHandle,
    },
    /// The held target was let go at the drop zone.
    Released {
        /// Released body.
        body: BodyHandle,
    },
    /// The arms finished reopening and the cycle ended.
    Opened,
    /// An in-flight cycle was cancelled.
    Aborted {
        /// Target whose link was cleared, if any.
        released: Option<BodyHandle>,
    },
}

/// Owns the claw rig and runs at most one drop cycle at a time.
#[derive(Debug)]
pub struct ClawMechanism {
    rig: ClawRig,
    drop_distance: f32,
    contact_epsilon: f32,
    cycle: Option<DropCycle>,
    held: Option<BodyHandle>,
    events: Vec<ClawEvent>,
}

impl ClawMechanism {
    /// Build the mechanism at the level's spawn position.
    ///
    /// Fails when the tuning is invalid or an arm body is missing; a mechanism
    /// that fails here never runs.
    pub fn new(
        handle: RigHandle,
        arms: ClawArms,
        config: ClawConfig,
        level: &LevelConfig,
        physics: &mut dyn PhysicsBackend,
    ) -> Result<Self, CraneError> {
        let rig = match level
            .validate()
            .and_then(|()| ClawRig::new(handle, arms, config, level.spawn_position, physics))
        {
            Ok(rig) => rig,
            Err(err) => {
                error!(%err, ?handle, "claw mechanism rejected");
                return Err(err);
            }
        };
        Ok(Self {
            rig,
            drop_distance: level.drop_distance,
            contact_epsilon: level.contact_check_distance,
            cycle: None,
            held: None,
            events: Vec::new(),
        })
    }

    /// The rig.
    pub fn rig(&self) -> &ClawRig {
        &self.rig
    }

    /// Target currently linked to the rig.
    pub fn held(&self) -> Option<BodyHandle> {
        self.held
    }

    /// Whether a drop cycle is in flight.
    pub fn is_busy(&self) -> bool {
        self.cycle.is_some()
    }

    /// Phase of the in-flight cycle.
    pub fn phase(&self) -> Option<DropPhase> {
        self.cycle.as_ref().map(DropCycle::phase)
    }

    /// In-flight cycle state.
    pub fn cycle(&self) -> Option<&DropCycle> {
        self.cycle.as_ref()
    }

    /// Maximum descent below the cycle's starting height.
    pub fn drop_distance(&self) -> f32 {
        self.drop_distance
    }

    /// Drive the arms toward open.
    pub fn set_open(&mut self) {
        self.rig.set_open();
    }

    /// Drive the arms toward closed.
    pub fn set_closed(&mut self) {
        self.rig.set_closed();
    }

    /// Take the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<ClawEvent> {
        std::mem::take(&mut self.events)
    }

    /// Slide the idle gantry to `x`.
    pub fn move_gantry(&mut self, x: f32, physics: &mut dyn PhysicsBackend) -> Result<(), CraneError> {
        if self.is_busy() {
            return Err(CraneError::CycleInFlight);
        }
        self.rig.pivot.x = x;
        self.rig.sync_arms(physics)?;
        Ok(())
    }

    /// Start a drop cycle from `initial_y`, delivering any grab to `target_drop_x`.
    pub fn drop_and_grab(
        &mut self,
        initial_y: f32,
        target_drop_x: f32,
        transport_speed: f32,
    ) -> Result<(), CraneError> {
        if self.is_busy() {
            return Err(CraneError::CycleInFlight);
        }
        if !(transport_speed > 0.0) {
            return Err(CraneError::NonPositive {
                field: "transport_speed",
                value: transport_speed,
            });
        }
        debug!(initial_y, target_drop_x, "drop cycle started");
        self.rig.pivot.y = initial_y;
        self.rig.set_open();
        self.cycle = Some(DropCycle::new(initial_y, target_drop_x, transport_speed));
        self.events.push(ClawEvent::DescentStarted);
        Ok(())
    }

    /// Advance by `dt` seconds.
    pub fn tick(&mut self, dt: f32, ctx: &mut CraneContext<'_>) -> CyclePoll {
        let dt = dt.max(0.0);
        let Some(mut cycle) = self.cycle.take() else {
            if self.rig.angle() != self.rig.target_angle() {
                self.rig.step_angle(dt);
                self.sync(ctx.physics);
            }
            return CyclePoll::Idle;
        };

        let poll = self.advance(&mut cycle, dt, ctx);
        if !poll.is_done() {
            self.cycle = Some(cycle);
        }
        poll
    }

    /// Cancel the in-flight cycle: clear ownership and restore physics on any
    /// held target (no impulse), then snap the rig back to rest.
    pub fn abort(&mut self, ctx: &mut CraneContext<'_>) -> Option<BodyHandle> {
        let cycle = self.cycle.take();
        let released = self.held.take();
        if let Some(body) = released {
            ctx.targets.release(body, self.rig.handle());
            if let Err(err) = ctx.physics.set_kinematic(body, false) {
                warn!(%err, ?body, "could not restore physics on aborted grab");
            }
        }
        self.rig.reset_to_rest();
        self.sync(ctx.physics);
        if cycle.is_some() || released.is_some() {
            info!(?released, "drop cycle aborted");
            self.events.push(ClawEvent::Aborted { released });
        }
        released
    }

    fn advance(&mut self, cycle: &mut DropCycle, dt: f32, ctx: &mut CraneContext<'_>) -> CyclePoll {
        if cycle.consume_pause(dt) {
            return CyclePoll::Pending;
        }
        match cycle.phase() {
            DropPhase::Descend => self.descend(cycle, dt, ctx),
            DropPhase::Tilt => self.tilt(cycle, dt, ctx),
            DropPhase::Close => self.close(cycle, dt, ctx),
            DropPhase::Ascend => self.ascend(cycle, dt, ctx),
            DropPhase::Transport => self.transport(cycle, dt, ctx),
            DropPhase::Release => return self.release(cycle, dt, ctx),
        }
        CyclePoll::Pending
    }

    fn descend(&mut self, cycle: &mut DropCycle, dt: f32, ctx: &mut CraneContext<'_>) {
        let floor = cycle.initial_y - self.drop_distance;
        let step = self.rig.config().vertical_speed * dt;
        let half_height = self.rig.arm_half_extents().y;
        let angled = self.rig.config().angled_grab;

        // Move first, then test contacts against the new position.
        self.rig.pivot.y = (self.rig.pivot.y - step).clamp(floor, cycle.initial_y);
        self.hold_stopped_arms(cycle);

        for side in ArmSide::BOTH {
            let i = side.index();
            if cycle.stopped[i] {
                continue;
            }
            let center = self.rig.arm_center(side);
            let reach = half_height + step + self.contact_epsilon;
            if let Some(hit) =
                ctx.physics
                    .raycast(center, Vec2::NEG_Y, reach, CollisionLayers::CONTACT)
            {
                cycle.stopped[i] = true;
                cycle.contact_y[i] = hit.point.y + half_height;
                trace!(%side, body = ?hit.body, y = hit.point.y, "arm contact");
                self.events.push(ClawEvent::ArmContact { side, body: hit.body });
            }
        }

        let any_stopped = cycle.stopped.iter().any(|s| *s);
        let settled = if angled {
            self.hold_stopped_arms(cycle);
            cycle.stopped.iter().all(|s| *s) || self.rig.pivot.y <= floor
        } else if any_stopped {
            let pivot_y = ArmSide::BOTH
                .into_iter()
                .filter(|side| cycle.stopped[side.index()])
                .map(|side| self.rig.pivot_y_for_arm(side, cycle.contact_y[side.index()]))
                .fold(f32::MIN, f32::max);
            self.rig.pivot.y = pivot_y.clamp(floor, cycle.initial_y);
            true
        } else {
            self.rig.pivot.y <= floor
        };
        self.sync(ctx.physics);

        if !settled {
            return;
        }
        let pivot_y = self.rig.pivot.y;
        debug!(pivot_y, contact = any_stopped, "descent settled");
        self.events.push(ClawEvent::DescentSettled { pivot_y });

        let pause = self.rig.config().pause_after_descend;
        match self.tilt_target() {
            Some(target) if angled => {
                cycle.tilt_target = target;
                cycle.advance(DropPhase::Tilt, 0.0);
            }
            _ => cycle.advance(DropPhase::Close, pause),
        }
    }

    /// Keep every stopped arm at the height it snapped to.
    fn hold_stopped_arms(&mut self, cycle: &DropCycle) {
        if !self.rig.config().angled_grab {
            return;
        }
        for side in ArmSide::BOTH {
            let i = side.index();
            if cycle.stopped[i] {
                let lift = self.rig.lift_for(side, cycle.contact_y[i]);
                self.rig.set_lift(side, lift);
            }
        }
    }

    /// Tilt matching the slope between the two arm tips, if it is worth applying.
    fn tilt_target(&self) -> Option<f32> {
        let config = self.rig.config();
        let left = self.rig.arm_center(ArmSide::Left).y;
        let right = self.rig.arm_center(ArmSide::Right).y;
        let delta = left - right;
        if delta.abs() <= config.min_height_delta {
            return None;
        }
        let angle = delta
            .abs()
            .atan2(self.rig.arm_span())
            .to_degrees()
            .min(config.max_deviation);
        // Left tip higher means the contact line falls to the right: clockwise.
        Some(if delta > 0.0 { -angle } else { angle })
    }

    fn tilt(&mut self, cycle: &mut DropCycle, dt: f32, ctx: &mut CraneContext<'_>) {
        let duration = self.rig.config().tilt_duration;
        let t = (cycle.add_elapsed(dt) / duration).min(1.0);
        self.rig.set_tilt(cycle.tilt_target * t);
        self.hold_stopped_arms(cycle);
        self.sync(ctx.physics);
        if t >= 1.0 {
            debug!(tilt = self.rig.tilt(), "tilt applied");
            cycle.advance(DropPhase::Close, self.rig.config().pause_after_descend);
        }
    }

    fn close(&mut self, cycle: &mut DropCycle, dt: f32, ctx: &mut CraneContext<'_>) {
        self.rig.set_closed();
        let fully_closed = self.rig.step_angle(dt);
        self.sync(ctx.physics);
        let pause = self.rig.config().pause_after_close;

        if self.held.is_none() && self.arms_touch(ctx.physics, CollisionLayers::GRABBABLE) {
            if let Some(body) = self.try_grab(ctx) {
                cycle.captured = Some(body);
                // Stop short of full closure so the held target is not crushed.
                self.rig.hold_angle();
                cycle.advance(DropPhase::Ascend, pause);
                return;
            }
        }
        if fully_closed {
            debug!("arms closed without a grab");
            cycle.advance(DropPhase::Ascend, pause);
        }
    }

    fn arms_touch(&self, physics: &dyn PhysicsBackend, mask: CollisionLayers) -> bool {
        let arms = self.rig.arms();
        ArmSide::BOTH
            .into_iter()
            .any(|side| physics.is_touching_layers(arms.body(side), mask))
    }

    /// Link the first eligible candidate near the pivot, in handle order.
    fn try_grab(&mut self, ctx: &mut CraneContext<'_>) -> Option<BodyHandle> {
        if self.held.is_some() {
            return None;
        }
        let rig = self.rig.handle();
        let radius = self.rig.config().grab_radius;
        let candidates = ctx
            .physics
            .overlap_circle(self.rig.pivot, radius, CollisionLayers::GRABBABLE);

        for body in candidates {
            if !ctx.targets.is_available(body) {
                continue;
            }
            let Some(state) = ctx.physics.body(body) else {
                continue;
            };
            if state.kind != BodyKind::Dynamic || state.kinematic {
                continue;
            }
            let local = self.rig.to_local(state.position);
            if !ctx.targets.acquire(body, rig, local) {
                continue;
            }
            if let Err(err) = ctx.physics.set_kinematic(body, true) {
                warn!(%err, ?body, "grab candidate rejected kinematic switch");
                ctx.targets.release(body, rig);
                continue;
            }
            if let Err(err) = ctx.physics.set_velocity(body, Vec2::ZERO) {
                warn!(%err, ?body, "could not zero grabbed velocity");
            }
            self.held = Some(body);
            info!(?body, "claw grabbed target");
            self.events.push(ClawEvent::Grabbed { body });
            return Some(body);
        }
        None
    }

    /// Check the held target is still linked and kinematic. A broken link
    /// empties the held slot.
    fn verify_held(&mut self, cycle: &mut DropCycle, ctx: &mut CraneContext<'_>) -> bool {
        let Some(body) = self.held else {
            return false;
        };
        let rig = self.rig.handle();
        let linked = ctx.targets.is_held_by(body, rig);
        let kinematic = ctx.physics.body(body).is_some_and(|b| b.kinematic);
        if linked && kinematic {
            return true;
        }

        warn!(?body, linked, kinematic, "lost grab");
        ctx.targets.release(body, rig);
        self.held = None;
        cycle.captured = None;
        self.events.push(ClawEvent::LostGrab { body });
        false
    }

    /// Put the held target back where the pivot says it belongs.
    fn carry_held(&self, ctx: &mut CraneContext<'_>) {
        let Some(body) = self.held else {
            return;
        };
        let Some(target) = ctx.targets.get(body) else {
            return;
        };
        let position = self.rig.to_world(target.local_offset);
        let result = ctx
            .physics
            .set_kinematic(body, true)
            .and_then(|()| ctx.physics.set_velocity(body, Vec2::ZERO))
            .and_then(|()| ctx.physics.move_position(body, position));
        if let Err(err) = result {
            warn!(%err, ?body, "failed to carry held target");
        }
    }

    fn ascend(&mut self, cycle: &mut DropCycle, dt: f32, ctx: &mut CraneContext<'_>) {
        let step = self.rig.config().vertical_speed * dt;
        self.rig.pivot.y = (self.rig.pivot.y + step).min(cycle.initial_y);
        self.sync(ctx.physics);

        if self.held.is_some() && self.verify_held(cycle, ctx) {
            self.carry_held(ctx);
        }

        if self.rig.pivot.y >= cycle.initial_y {
            if self.held.is_some() {
                debug!(target_x = cycle.target_x, "transporting");
                cycle.advance(DropPhase::Transport, 0.0);
            } else {
                cycle.advance(DropPhase::Release, 0.0);
            }
        }
    }

    fn transport(&mut self, cycle: &mut DropCycle, dt: f32, ctx: &mut CraneContext<'_>) {
        if !self.verify_held(cycle, ctx) {
            debug!("transport aborted");
            cycle.released = true;
            cycle.advance(DropPhase::Release, 0.0);
            return;
        }

        let max_step = cycle.transport_speed * dt;
        let delta = cycle.target_x - self.rig.pivot.x;
        self.rig.pivot.x = if delta.abs() <= max_step {
            cycle.target_x
        } else {
            self.rig.pivot.x + max_step.copysign(delta)
        };
        self.sync(ctx.physics);
        self.carry_held(ctx);

        if self.rig.pivot.x == cycle.target_x {
            cycle.advance(DropPhase::Release, 0.0);
        }
    }

    fn release(&mut self, cycle: &mut DropCycle, dt: f32, ctx: &mut CraneContext<'_>) -> CyclePoll {
        if !cycle.released {
            cycle.released = true;
            if let Some(body) = self.held.take() {
                ctx.targets.release(body, self.rig.handle());
                let impulse = Vec2::Y * self.rig.config().release_impulse;
                let result = ctx
                    .physics
                    .set_kinematic(body, false)
                    .and_then(|()| ctx.physics.add_impulse(body, impulse));
                if let Err(err) = result {
                    warn!(%err, ?body, "release could not restore physics");
                }
                info!(?body, x = self.rig.pivot.x, "claw released target");
                self.events.push(ClawEvent::Released { body });
                cycle.pause_for(self.rig.config().pause_after_release);
                return CyclePoll::Pending;
            }
        }

        self.rig.set_open();
        let opened = self.rig.step_angle(dt);
        self.sync(ctx.physics);
        if !opened {
            return CyclePoll::Pending;
        }

        self.rig.straighten();
        self.sync(ctx.physics);
        self.events.push(ClawEvent::Opened);
        debug!(grabbed = ?cycle.captured, "drop cycle finished");
        CyclePoll::Done(cycle.captured)
    }

    fn sync(&self, physics: &mut dyn PhysicsBackend) {
        if let Err(err) = self.rig.sync_arms(physics) {
            warn!(%err, "failed to sync claw arms");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Cabinet, DT};
    use clawcade_physics::PhysicsWorld;

    fn run_to_completion(cabinet: &mut Cabinet) -> Option<BodyHandle> {
        for _ in 0..5_000 {
            if let CyclePoll::Done(result) = cabinet.tick_claw(DT) {
                return result;
            }
        }
        panic!("drop cycle never finished");
    }

    #[test]
    fn empty_cycle_stops_at_max_depth_and_returns() {
        let mut cabinet = Cabinet::new(ClawConfig::default());
        cabinet.start(7.0);

        let mut lowest = f32::MAX;
        let result = loop {
            let poll = cabinet.tick_claw(DT);
            lowest = lowest.min(cabinet.claw.rig().pivot.y);
            if let CyclePoll::Done(result) = poll {
                break result;
            }
        };

        assert_eq!(result, None);
        assert_eq!(lowest, 4.0 - 5.0);
        let rig = cabinet.claw.rig();
        assert_eq!(rig.pivot, Vec2::new(0.0, 4.0));
        assert!(rig.is_open());
        assert!(!cabinet.claw.is_busy());
    }

    #[test]
    fn prize_under_arms_is_grabbed_transported_and_released() {
        let mut cabinet = Cabinet::new(ClawConfig::default());
        let prize = cabinet.spawn_floor_prize(0.0, 0.75);
        cabinet.start(7.0);

        let result = run_to_completion(&mut cabinet);

        assert_eq!(result, Some(prize));
        assert_eq!(cabinet.claw.rig().pivot, Vec2::new(7.0, 4.0));
        let body = cabinet.world.body(prize).unwrap();
        assert!(!body.kinematic);
        assert!(body.position.x > 6.9);
        assert!(!cabinet.targets.get(prize).unwrap().is_held());

        let events = cabinet.claw.drain_events();
        assert!(events.contains(&ClawEvent::Grabbed { body: prize }));
        assert!(events.contains(&ClawEvent::Released { body: prize }));
        assert_eq!(events.last(), Some(&ClawEvent::Opened));
    }

    #[test]
    fn first_tick_contact_halts_descent() {
        let mut cabinet = Cabinet::new(ClawConfig::default());
        // Top face just under the open arm tips.
        cabinet.spawn_prize(Vec2::new(0.0, 2.45), Vec2::new(0.75, 0.5));
        cabinet.start(7.0);

        cabinet.tick_claw(DT);

        assert_eq!(cabinet.claw.phase(), Some(DropPhase::Close));
        assert!((cabinet.claw.rig().pivot.y - 3.95).abs() < 1e-4);
    }

    #[test]
    fn second_drop_is_rejected_while_busy() {
        let mut cabinet = Cabinet::new(ClawConfig::default());
        cabinet.start(7.0);
        assert_eq!(
            cabinet.claw.drop_and_grab(4.0, 7.0, 5.0),
            Err(CraneError::CycleInFlight)
        );
        assert!(cabinet.claw.move_gantry(1.0, &mut cabinet.world).is_err());
    }

    #[test]
    fn lost_grab_during_transport_skips_release() {
        let mut cabinet = Cabinet::new(ClawConfig::default());
        let prize = cabinet.spawn_floor_prize(0.0, 0.75);
        cabinet.start(7.0);

        cabinet.tick_until_phase(DropPhase::Transport);
        cabinet.tick_claw(DT);
        cabinet.targets.detach(prize);
        cabinet.world.set_kinematic(prize, false).unwrap();

        cabinet.tick_claw(DT);
        assert_eq!(cabinet.claw.phase(), Some(DropPhase::Release));
        assert_eq!(cabinet.claw.held(), None);
        // Only gravity acted on it: no release impulse.
        assert!(cabinet.world.body(prize).unwrap().velocity.y <= 0.0);

        let result = run_to_completion(&mut cabinet);
        assert_eq!(result, None);
        let events = cabinet.claw.drain_events();
        assert!(events.contains(&ClawEvent::LostGrab { body: prize }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, ClawEvent::Released { .. })));
    }

    #[test]
    fn abort_releases_before_resetting() {
        let mut cabinet = Cabinet::new(ClawConfig::default());
        let prize = cabinet.spawn_floor_prize(0.0, 0.75);
        cabinet.start(7.0);
        cabinet.tick_until_phase(DropPhase::Ascend);
        assert_eq!(cabinet.claw.held(), Some(prize));

        let released = cabinet.abort();

        assert_eq!(released, Some(prize));
        assert!(!cabinet.world.body(prize).unwrap().kinematic);
        assert_eq!(cabinet.targets.held_count(), 0);
        assert_eq!(cabinet.claw.rig().pivot.y, 4.0);
        assert!(cabinet.claw.rig().is_open());
        assert!(!cabinet.claw.is_busy());
    }

    #[test]
    fn angled_grab_tilts_toward_uneven_contacts() {
        let config = ClawConfig {
            angled_grab: true,
            ..ClawConfig::default()
        };
        let mut cabinet = Cabinet::new(config);
        // Tall block under the left arm, nothing under the right.
        cabinet.spawn_block(Vec2::new(-0.5, 0.0), Vec2::new(0.2, 1.0));
        cabinet.start(7.0);

        while cabinet.claw.phase() == Some(DropPhase::Descend) {
            cabinet.tick_claw(DT);
        }
        assert_eq!(cabinet.claw.phase(), Some(DropPhase::Tilt));
        while cabinet.claw.phase() == Some(DropPhase::Tilt) {
            cabinet.tick_claw(DT);
        }
        let tilt = cabinet.claw.rig().tilt();
        assert!(tilt < 0.0 && tilt >= -45.0, "tilt {tilt}");

        run_to_completion(&mut cabinet);
        assert_eq!(cabinet.claw.rig().tilt(), 0.0);
    }

    #[test]
    fn idle_set_open_changes_nothing() {
        let mut cabinet = Cabinet::new(ClawConfig::default());
        cabinet.claw.set_open();
        assert_eq!(cabinet.tick_claw(DT), CyclePoll::Idle);
        assert_eq!(cabinet.claw.rig().angle(), 0.0);
    }

    #[test]
    fn missing_arm_disables_mechanism() {
        let mut world = PhysicsWorld::default();
        let arms = ClawArms {
            left: BodyHandle(1),
            right: BodyHandle(2),
        };
        let err = ClawMechanism::new(
            RigHandle(1),
            arms,
            ClawConfig::default(),
            &LevelConfig::default(),
            &mut world,
        )
        .unwrap_err();
        assert!(matches!(err, CraneError::MissingArmBody(ArmSide::Left, _)));
    }
}
