use crate::ArmSide;
use clawcade_physics::{BodyHandle, PhysicsError};
use thiserror::Error;

/// Errors raised while building or driving a crane.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CraneError {
    /// An arm's body is not present in the physics world.
    #[error("{0} claw arm has no physics body ({1:?})")]
    MissingArmBody(ArmSide, BodyHandle),
    /// The chute trigger body is not present in the physics world.
    #[error("prize chute has no trigger body ({0:?})")]
    MissingChuteBody(BodyHandle),
    /// A speed or size that must be positive is not.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Offending field.
        field: &'static str,
        /// Value supplied.
        value: f32,
    },
    /// A distance that must not be negative is.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Offending field.
        field: &'static str,
        /// Value supplied.
        value: f32,
    },
    /// Gantry limits are inverted.
    #[error("gantry limits inverted: left {left} > right {right}")]
    InvertedLimits {
        /// Left limit.
        left: f32,
        /// Right limit.
        right: f32,
    },
    /// Open and closed angles coincide.
    #[error("open and closed angles are both {0}")]
    DegenerateAngles(f32),
    /// Both arm hinges share the same x.
    #[error("claw arms have zero span")]
    ZeroArmSpan,
    /// A drop cycle was requested while one is running.
    #[error("a drop cycle is already in flight")]
    CycleInFlight,
    /// Physics rejected a setup call.
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}
