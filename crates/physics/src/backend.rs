use crate::{Aabb2, Body, BodyHandle, CollisionLayers};
use glam::Vec2;
use thiserror::Error;

/// Errors surfaced by body mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    /// The handle does not name a live body.
    #[error("unknown body {0:?}")]
    UnknownBody(BodyHandle),
    /// Static bodies cannot be moved by forces or toggled kinematic.
    #[error("body {0:?} is static")]
    StaticBody(BodyHandle),
}

/// Result of a successful ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Body whose bounds were hit first.
    pub body: BodyHandle,
    /// World-space contact point.
    pub point: Vec2,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
}

/// Physics operations the crane core depends on.
///
/// Queries ignore any body outside `mask`. Every list result is ordered by
/// ascending [`BodyHandle`].
pub trait PhysicsBackend {
    /// Look up a live body.
    fn body(&self, handle: BodyHandle) -> Option<&Body>;

    /// Whether `handle` names a live body.
    fn contains(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some()
    }

    /// Teleport a body, leaving its velocity untouched.
    fn move_position(&mut self, handle: BodyHandle, position: Vec2) -> Result<(), PhysicsError>;

    /// Overwrite a body's velocity.
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError>;

    /// Toggle whether the simulation integrates a dynamic body.
    fn set_kinematic(&mut self, handle: BodyHandle, kinematic: bool) -> Result<(), PhysicsError>;

    /// Apply an instantaneous impulse. No effect on kinematic bodies.
    fn add_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> Result<(), PhysicsError>;

    /// Remove a body from the world.
    fn despawn(&mut self, handle: BodyHandle) -> Option<Body>;

    /// Nearest body along a ray.
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CollisionLayers,
    ) -> Option<RayHit>;

    /// Bodies whose bounds intersect the circle.
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: CollisionLayers) -> Vec<BodyHandle>;

    /// Bodies whose bounds intersect `aabb`.
    fn overlap_aabb(&self, aabb: Aabb2, mask: CollisionLayers) -> Vec<BodyHandle>;

    /// Whether `handle` touches any other body in `mask`.
    fn is_touching_layers(&self, handle: BodyHandle, mask: CollisionLayers) -> bool;
}
