//! Claw rig geometry: the pivot, the two arms hanging from it, and the arm angle.
//!
//! Arm collider centres are derived, never stored:
//! `pivot + R(tilt) * (hinge + R(±angle) * (0, -half_height)) + (0, lift)`.
//! The left arm turns by `+angle`, the right arm by `-angle`, so closing swings
//! both arm tips toward the centre.

use crate::{ClawConfig, CraneError};
use clawcade_physics::{BodyDesc, BodyHandle, CollisionLayers, PhysicsBackend, PhysicsError, PhysicsWorld};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a claw rig, used as the owner in ownership links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RigHandle(pub u32);

/// Which arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmSide {
    /// Arm hanging left of the pivot.
    Left,
    /// Arm hanging right of the pivot.
    Right,
}

impl ArmSide {
    /// Both sides, left first.
    pub const BOTH: [ArmSide; 2] = [ArmSide::Left, ArmSide::Right];

    /// Sign applied to the arm angle; the hinge x uses the opposite sign.
    pub fn sign(self) -> f32 {
        match self {
            ArmSide::Left => 1.0,
            ArmSide::Right => -1.0,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            ArmSide::Left => 0,
            ArmSide::Right => 1,
        }
    }
}

impl fmt::Display for ArmSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmSide::Left => write!(f, "left"),
            ArmSide::Right => write!(f, "right"),
        }
    }
}

/// Physics bodies backing the two arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClawArms {
    /// Left arm body.
    pub left: BodyHandle,
    /// Right arm body.
    pub right: BodyHandle,
}

impl ClawArms {
    /// Spawn two kinematic arm bodies hanging open from `pivot`.
    pub fn spawn(world: &mut PhysicsWorld, pivot: Vec2, config: &ClawConfig) -> Self {
        let mut spawn_arm = |side: ArmSide| {
            let local = arm_local(config, side, config.open_angle);
            world.spawn(
                BodyDesc::dynamic(
                    format!("claw_{side}"),
                    pivot + local,
                    config.arm_half_extents,
                    CollisionLayers::CLAW,
                )
                .with_kinematic(true),
            )
        };
        let left = spawn_arm(ArmSide::Left);
        let right = spawn_arm(ArmSide::Right);
        Self { left, right }
    }

    /// Body for `side`.
    pub fn body(&self, side: ArmSide) -> BodyHandle {
        match side {
            ArmSide::Left => self.left,
            ArmSide::Right => self.right,
        }
    }
}

fn arm_local(config: &ClawConfig, side: ArmSide, angle: f32) -> Vec2 {
    let hinge = Vec2::new(-side.sign() * config.arm_hinge.x, config.arm_hinge.y);
    let hang = Vec2::new(0.0, -config.arm_half_extents.y);
    hinge + Vec2::from_angle((side.sign() * angle).to_radians()).rotate(hang)
}

/// The physical claw assembly.
#[derive(Debug, Clone)]
pub struct ClawRig {
    handle: RigHandle,
    arms: ClawArms,
    config: ClawConfig,
    /// Pivot position in world space.
    pub pivot: Vec2,
    rest_y: f32,
    angle: f32,
    target_angle: f32,
    tilt: f32,
    lift: [f32; 2],
}

impl ClawRig {
    /// Build a rig at rest with open arms, checking the arm bodies exist and
    /// making them kinematic.
    pub fn new(
        handle: RigHandle,
        arms: ClawArms,
        config: ClawConfig,
        pivot: Vec2,
        physics: &mut dyn PhysicsBackend,
    ) -> Result<Self, CraneError> {
        config.validate()?;
        for side in ArmSide::BOTH {
            let body = arms.body(side);
            if !physics.contains(body) {
                return Err(CraneError::MissingArmBody(side, body));
            }
            physics.set_kinematic(body, true)?;
        }
        let open = config.open_angle;
        let rig = Self {
            handle,
            arms,
            config,
            pivot,
            rest_y: pivot.y,
            angle: open,
            target_angle: open,
            tilt: 0.0,
            lift: [0.0; 2],
        };
        rig.sync_arms(physics)?;
        Ok(rig)
    }

    /// Owner id used in ownership links.
    pub fn handle(&self) -> RigHandle {
        self.handle
    }

    /// Arm bodies.
    pub fn arms(&self) -> ClawArms {
        self.arms
    }

    /// Tuning in effect.
    pub fn config(&self) -> &ClawConfig {
        &self.config
    }

    /// Pivot Y the rig rests at.
    pub fn rest_y(&self) -> f32 {
        self.rest_y
    }

    /// Current arm angle (degrees).
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Angle the arms are moving toward.
    pub fn target_angle(&self) -> f32 {
        self.target_angle
    }

    /// Whole-pivot tilt (degrees).
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    pub(crate) fn set_tilt(&mut self, tilt: f32) {
        self.tilt = tilt;
    }

    /// Drive the arms toward open.
    pub fn set_open(&mut self) {
        self.target_angle = self.config.open_angle;
    }

    /// Drive the arms toward closed.
    pub fn set_closed(&mut self) {
        self.target_angle = self.config.closed_angle;
    }

    /// Stop the arms where they are.
    pub(crate) fn hold_angle(&mut self) {
        self.target_angle = self.angle;
    }

    /// Whether the arms sit at the open angle.
    pub fn is_open(&self) -> bool {
        self.angle == self.config.open_angle
    }

    /// Whether the arms sit at the closed angle.
    pub fn is_closed(&self) -> bool {
        self.angle == self.config.closed_angle
    }

    /// Move the angle toward its target at the open/close speed. Returns
    /// `true` once the target is reached.
    pub fn step_angle(&mut self, dt: f32) -> bool {
        let max_step = self.config.open_close_speed * dt.max(0.0);
        let delta = self.target_angle - self.angle;
        if delta.abs() <= max_step {
            self.angle = self.target_angle;
        } else {
            self.angle += max_step.copysign(delta);
        }
        let (lo, hi) = self.config.angle_range();
        self.angle = self.angle.clamp(lo, hi);
        self.angle == self.target_angle
    }

    /// Arm offset from the pivot before tilt and lift.
    pub fn arm_local(&self, side: ArmSide) -> Vec2 {
        arm_local(&self.config, side, self.angle)
    }

    /// Arm collider centre in world space.
    pub fn arm_center(&self, side: ArmSide) -> Vec2 {
        self.to_world(self.arm_local(side)) + Vec2::new(0.0, self.lift[side.index()])
    }

    /// Arm collider half size.
    pub fn arm_half_extents(&self) -> Vec2 {
        self.config.arm_half_extents
    }

    /// Horizontal distance between the hinges.
    pub fn arm_span(&self) -> f32 {
        2.0 * self.config.arm_hinge.x.abs()
    }

    /// Pivot Y that would put `side`'s collider centre at `center_y` with no lift.
    pub fn pivot_y_for_arm(&self, side: ArmSide, center_y: f32) -> f32 {
        center_y - self.rotate(self.arm_local(side)).y
    }

    /// Raise or lower one arm relative to its hanging position.
    pub(crate) fn set_lift(&mut self, side: ArmSide, lift: f32) {
        self.lift[side.index()] = lift;
    }

    /// Lift that keeps `side`'s centre at `center_y` for the current pivot.
    pub(crate) fn lift_for(&self, side: ArmSide, center_y: f32) -> f32 {
        center_y - (self.pivot.y + self.rotate(self.arm_local(side)).y)
    }

    /// Return to hanging straight: no tilt, no lift.
    pub(crate) fn straighten(&mut self) {
        self.tilt = 0.0;
        self.lift = [0.0; 2];
    }

    /// Snap to rest: pivot at rest Y, arms open and straight.
    pub(crate) fn reset_to_rest(&mut self) {
        self.pivot.y = self.rest_y;
        self.angle = self.config.open_angle;
        self.target_angle = self.angle;
        self.straighten();
    }

    /// Rotate a pivot-local vector by the current tilt.
    pub fn rotate(&self, local: Vec2) -> Vec2 {
        Vec2::from_angle(self.tilt.to_radians()).rotate(local)
    }

    /// World position of a pivot-local point.
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.pivot + self.rotate(local)
    }

    /// Pivot-local coordinates of a world point.
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        Vec2::from_angle(-self.tilt.to_radians()).rotate(world - self.pivot)
    }

    /// Write both arm positions into the physics world.
    pub fn sync_arms(&self, physics: &mut dyn PhysicsBackend) -> Result<(), PhysicsError> {
        for side in ArmSide::BOTH {
            physics.move_position(self.arms.body(side), self.arm_center(side))?;
        }
        Ok(())
    }
}
