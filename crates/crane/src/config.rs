//! Tuning for the claw, the gantry, and the level a crane session runs on.
//!
//! All structs deserialize with `#[serde(default)]` so partial TOML tables keep
//! the remaining defaults.

use crate::CraneError;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Claw mechanism tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClawConfig {
    /// Arm angle when fully open (degrees).
    pub open_angle: f32,
    /// Arm angle when fully closed (degrees).
    pub closed_angle: f32,
    /// Pivot speed while descending and ascending (units/s).
    pub vertical_speed: f32,
    /// Arm angular speed (degrees/s).
    pub open_close_speed: f32,
    /// Hinge offset of the right arm from the pivot; the left arm mirrors x.
    pub arm_hinge: Vec2,
    /// Collider half size of each arm.
    pub arm_half_extents: Vec2,
    /// Radius of the candidate scan around the pivot when an arm touches a prize.
    pub grab_radius: f32,
    /// Upward impulse applied to a released target.
    pub release_impulse: f32,
    /// Let each arm stop independently and tilt the pivot to match.
    pub angled_grab: bool,
    /// Largest tilt the angled grab may apply (degrees).
    pub max_deviation: f32,
    /// Height difference below which no tilt is applied.
    pub min_height_delta: f32,
    /// Seconds spent interpolating toward the tilt.
    pub tilt_duration: f32,
    /// Pause after the descent settles (seconds).
    pub pause_after_descend: f32,
    /// Pause after the arms close or grab (seconds).
    pub pause_after_close: f32,
    /// Pause after the target is released (seconds).
    pub pause_after_release: f32,
}

impl Default for ClawConfig {
    fn default() -> Self {
        Self {
            open_angle: 0.0,
            closed_angle: 30.0,
            vertical_speed: 5.0,
            open_close_speed: 100.0,
            arm_hinge: Vec2::new(0.5, 0.0),
            arm_half_extents: Vec2::new(0.1, 0.5),
            grab_radius: 1.5,
            release_impulse: 5.0,
            angled_grab: false,
            max_deviation: 45.0,
            min_height_delta: 0.05,
            tilt_duration: 0.5,
            pause_after_descend: 0.2,
            pause_after_close: 0.3,
            pause_after_release: 0.2,
        }
    }
}

impl ClawConfig {
    /// Reject tunings the mechanism cannot run with.
    pub fn validate(&self) -> Result<(), CraneError> {
        positive("vertical_speed", self.vertical_speed)?;
        positive("open_close_speed", self.open_close_speed)?;
        positive("grab_radius", self.grab_radius)?;
        positive("arm_half_extents.y", self.arm_half_extents.y)?;
        if (self.open_angle - self.closed_angle).abs() < f32::EPSILON {
            return Err(CraneError::DegenerateAngles(self.open_angle));
        }
        if self.arm_hinge.x.abs() < f32::EPSILON {
            return Err(CraneError::ZeroArmSpan);
        }
        if self.angled_grab {
            positive("tilt_duration", self.tilt_duration)?;
        }
        Ok(())
    }

    /// Lower and upper bound of the arm angle.
    pub fn angle_range(&self) -> (f32, f32) {
        (
            self.open_angle.min(self.closed_angle),
            self.open_angle.max(self.closed_angle),
        )
    }
}

/// Gantry tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraneConfig {
    /// Horizontal speed under player input (units/s).
    pub move_speed: f32,
    /// Horizontal speed while carrying a target to the drop zone (units/s).
    pub transport_speed: f32,
    /// X of the drop zone. `None` uses the right limit.
    pub drop_zone_x: Option<f32>,
}

impl Default for CraneConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            transport_speed: 5.0,
            drop_zone_x: None,
        }
    }
}

impl CraneConfig {
    /// Reject non-positive speeds.
    pub fn validate(&self) -> Result<(), CraneError> {
        positive("move_speed", self.move_speed)?;
        positive("transport_speed", self.transport_speed)
    }
}

/// Horizontal travel limits of the gantry. Always finite with `left <= right`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds")]
pub struct Bounds {
    left: f32,
    right: f32,
}

#[derive(Deserialize)]
struct RawBounds {
    left: f32,
    right: f32,
}

impl TryFrom<RawBounds> for Bounds {
    type Error = CraneError;

    fn try_from(raw: RawBounds) -> Result<Self, Self::Error> {
        Bounds::new(raw.left, raw.right)
    }
}

impl Bounds {
    /// Build bounds, rejecting `left > right` and non-finite limits.
    pub fn new(left: f32, right: f32) -> Result<Self, CraneError> {
        if left > right || !left.is_finite() || !right.is_finite() {
            return Err(CraneError::InvertedLimits { left, right });
        }
        Ok(Self { left, right })
    }

    /// Leftmost pivot X.
    pub fn left(&self) -> f32 {
        self.left
    }

    /// Rightmost pivot X.
    pub fn right(&self) -> f32 {
        self.right
    }

    /// Clamp `x` into the limits.
    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.left, self.right)
    }
}

/// Per-level configuration supplied when the crane scene is entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Plays granted per session.
    pub max_plays: u32,
    /// Leftmost pivot X.
    pub left_limit: f32,
    /// Rightmost pivot X.
    pub right_limit: f32,
    /// Pivot rest position.
    pub spawn_position: Vec2,
    /// Deepest the pivot may descend below rest.
    pub drop_distance: f32,
    /// Extra look-ahead added to each arm's contact ray.
    pub contact_check_distance: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            max_plays: 5,
            left_limit: -7.0,
            right_limit: 7.0,
            spawn_position: Vec2::new(0.0, 4.0),
            drop_distance: 5.0,
            contact_check_distance: 0.05,
        }
    }
}

impl LevelConfig {
    /// Validated gantry limits.
    pub fn bounds(&self) -> Result<Bounds, CraneError> {
        Bounds::new(self.left_limit, self.right_limit)
    }

    /// Reject inverted limits and negative distances.
    pub fn validate(&self) -> Result<(), CraneError> {
        self.bounds()?;
        non_negative("drop_distance", self.drop_distance)?;
        non_negative("contact_check_distance", self.contact_check_distance)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), CraneError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(CraneError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), CraneError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(CraneError::Negative { field, value })
    }
}
