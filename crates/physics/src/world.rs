use crate::{Aabb2, CollisionLayers, PhysicsBackend, PhysicsError, RayHit};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Margin used by contact tests so resting bodies count as touching.
pub const CONTACT_SKIN: f32 = 0.01;

/// Opaque, stable identifier for a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// How the world treats a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves under simulation and cannot be driven by forces.
    Static,
    /// Integrated under gravity unless flagged kinematic.
    Dynamic,
}

/// Spawn parameters for a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    /// Debug name.
    pub name: String,
    /// Static or dynamic.
    pub kind: BodyKind,
    /// Centre position.
    pub position: Vec2,
    /// Half size of the collision box.
    pub half_extents: Vec2,
    /// Layers the body belongs to.
    pub layers: CollisionLayers,
    /// Start kinematic (driven by position writes only).
    pub kinematic: bool,
    /// Mass used to scale impulses.
    pub mass: f32,
}

impl BodyDesc {
    /// Unit-mass dynamic box.
    pub fn dynamic(name: impl Into<String>, position: Vec2, half_extents: Vec2, layers: CollisionLayers) -> Self {
        Self {
            name: name.into(),
            kind: BodyKind::Dynamic,
            position,
            half_extents,
            layers,
            kinematic: false,
            mass: 1.0,
        }
    }

    /// Immovable box.
    pub fn fixed(name: impl Into<String>, position: Vec2, half_extents: Vec2, layers: CollisionLayers) -> Self {
        Self {
            kind: BodyKind::Static,
            ..Self::dynamic(name, position, half_extents, layers)
        }
    }

    /// Builder-style kinematic flag.
    pub fn with_kinematic(mut self, kinematic: bool) -> Self {
        self.kinematic = kinematic;
        self
    }

    /// Builder-style mass.
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }
}

/// A live body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Stable handle.
    pub handle: BodyHandle,
    /// Debug name.
    pub name: String,
    /// Static or dynamic.
    pub kind: BodyKind,
    /// Centre position.
    pub position: Vec2,
    /// Linear velocity.
    pub velocity: Vec2,
    /// Half size of the collision box.
    pub half_extents: Vec2,
    /// Layers the body belongs to.
    pub layers: CollisionLayers,
    /// Driven by position writes instead of the integrator.
    pub kinematic: bool,
    /// Mass used to scale impulses.
    pub mass: f32,
}

impl Body {
    /// Current bounds.
    pub fn aabb(&self) -> Aabb2 {
        Aabb2::from_center(self.position, self.half_extents)
    }

    /// Whether gravity integration applies.
    pub fn is_simulated(&self) -> bool {
        self.kind == BodyKind::Dynamic && !self.kinematic
    }

    fn can_support(&self) -> bool {
        (self.kind == BodyKind::Static || self.is_simulated())
            && self.layers.intersects(CollisionLayers::CONTACT)
    }
}

/// Deterministic box world: bodies live in handle order, gravity pulls dynamic
/// bodies down until they rest on a floor plane or on top of another body.
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: u32,
    gravity: Vec2,
    floor_y: Option<f32>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -9.81))
    }
}

impl PhysicsWorld {
    /// Empty world with the given gravity and no floor plane.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            bodies: BTreeMap::new(),
            next_handle: 1,
            gravity,
            floor_y: None,
        }
    }

    /// Add an infinite floor plane at `y`.
    pub fn with_floor(mut self, y: f32) -> Self {
        self.floor_y = Some(y);
        self
    }

    /// Gravity vector.
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Floor plane height, if any.
    pub fn floor_y(&self) -> Option<f32> {
        self.floor_y
    }

    /// Insert a body and return its handle. Handles are never reused.
    pub fn spawn(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        let body = Body {
            handle,
            name: desc.name,
            kind: desc.kind,
            position: desc.position,
            velocity: Vec2::ZERO,
            half_extents: desc.half_extents.abs(),
            layers: desc.layers,
            kinematic: desc.kinematic,
            mass: if desc.mass > 0.0 { desc.mass } else { 1.0 },
        };
        trace!(?handle, name = %body.name, "spawned body");
        self.bodies.insert(handle, body);
        handle
    }

    /// Iterate live bodies in handle order.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    /// Number of live bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the world has no bodies.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// First body with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<BodyHandle> {
        self.bodies.values().find(|b| b.name == name).map(|b| b.handle)
    }

    /// Advance simulated bodies by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let simulated: Vec<BodyHandle> = self
            .bodies
            .values()
            .filter(|b| b.is_simulated())
            .map(|b| b.handle)
            .collect();

        for handle in simulated {
            let Some(body) = self.bodies.get(&handle) else {
                continue;
            };
            let half = body.half_extents;
            let prev_bottom = body.position.y - half.y;
            let mut velocity = body.velocity + self.gravity * dt;
            let mut position = body.position + velocity * dt;
            let moved = Aabb2::from_center(position, half);

            if let Some(top) = self.support_height(handle, &moved, prev_bottom) {
                if moved.min.y < top {
                    position.y = top + half.y;
                    velocity = Vec2::ZERO;
                }
            }

            if let Some(body) = self.bodies.get_mut(&handle) {
                body.position = position;
                body.velocity = velocity;
            }
        }
    }

    /// Highest surface at or below `prev_bottom` that `moved` would rest on.
    fn support_height(&self, handle: BodyHandle, moved: &Aabb2, prev_bottom: f32) -> Option<f32> {
        let mut best = self.floor_y.filter(|floor| *floor <= prev_bottom + CONTACT_SKIN);
        for other in self.bodies.values() {
            if other.handle == handle || !other.can_support() {
                continue;
            }
            let bounds = other.aabb();
            if !bounds.overlaps_x(moved) || bounds.max.y > prev_bottom + CONTACT_SKIN {
                continue;
            }
            best = Some(best.map_or(bounds.max.y, |b: f32| b.max(bounds.max.y)));
        }
        best
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body, PhysicsError> {
        self.bodies
            .get_mut(&handle)
            .ok_or(PhysicsError::UnknownBody(handle))
    }
}

impl PhysicsBackend for PhysicsWorld {
    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    fn move_position(&mut self, handle: BodyHandle, position: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.position = position;
        Ok(())
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if body.kind == BodyKind::Static {
            return Err(PhysicsError::StaticBody(handle));
        }
        body.velocity = velocity;
        Ok(())
    }

    fn set_kinematic(&mut self, handle: BodyHandle, kinematic: bool) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if body.kind == BodyKind::Static {
            return Err(PhysicsError::StaticBody(handle));
        }
        body.kinematic = kinematic;
        if kinematic {
            body.velocity = Vec2::ZERO;
        }
        Ok(())
    }

    fn add_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if body.kind == BodyKind::Static {
            return Err(PhysicsError::StaticBody(handle));
        }
        if !body.kinematic {
            body.velocity += impulse / body.mass;
        }
        Ok(())
    }

    fn despawn(&mut self, handle: BodyHandle) -> Option<Body> {
        let removed = self.bodies.remove(&handle);
        if removed.is_some() {
            trace!(?handle, "despawned body");
        }
        removed
    }

    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CollisionLayers,
    ) -> Option<RayHit> {
        let dir = direction.normalize_or_zero();
        let mut nearest: Option<RayHit> = None;
        for body in self.bodies.values() {
            if !body.layers.intersects(mask) {
                continue;
            }
            let Some(distance) = body.aabb().raycast(origin, dir, max_distance) else {
                continue;
            };
            if nearest.map_or(true, |hit| distance < hit.distance) {
                nearest = Some(RayHit {
                    body: body.handle,
                    point: origin + dir * distance,
                    distance,
                });
            }
        }
        nearest
    }

    fn overlap_circle(&self, center: Vec2, radius: f32, mask: CollisionLayers) -> Vec<BodyHandle> {
        self.bodies
            .values()
            .filter(|b| b.layers.intersects(mask) && b.aabb().intersects_circle(center, radius))
            .map(|b| b.handle)
            .collect()
    }

    fn overlap_aabb(&self, aabb: Aabb2, mask: CollisionLayers) -> Vec<BodyHandle> {
        self.bodies
            .values()
            .filter(|b| b.layers.intersects(mask) && b.aabb().intersects(&aabb))
            .map(|b| b.handle)
            .collect()
    }

    fn is_touching_layers(&self, handle: BodyHandle, mask: CollisionLayers) -> bool {
        let Some(body) = self.bodies.get(&handle) else {
            return false;
        };
        let probe = body.aabb().expanded(CONTACT_SKIN);
        self.bodies.values().any(|other| {
            other.handle != handle && other.layers.intersects(mask) && other.aabb().intersects(&probe)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn prize(world: &mut PhysicsWorld, x: f32, y: f32) -> BodyHandle {
        world.spawn(BodyDesc::dynamic(
            "prize",
            Vec2::new(x, y),
            Vec2::splat(0.25),
            CollisionLayers::GRABBABLE,
        ))
    }

    #[test]
    fn dynamic_body_comes_to_rest_on_floor() {
        let mut world = PhysicsWorld::default().with_floor(0.0);
        let h = prize(&mut world, 0.0, 3.0);
        for _ in 0..300 {
            world.step(1.0 / 60.0);
        }
        let body = world.body(h).unwrap();
        assert!((body.position.y - 0.25).abs() < 1e-4);
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn bodies_stack_on_static_boxes() {
        let mut world = PhysicsWorld::default().with_floor(0.0);
        world.spawn(BodyDesc::fixed(
            "shelf",
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 0.5),
            CollisionLayers::OBSTACLE,
        ));
        let h = prize(&mut world, 0.0, 4.0);
        for _ in 0..300 {
            world.step(1.0 / 60.0);
        }
        assert!((world.body(h).unwrap().position.y - 1.75).abs() < 1e-4);
    }

    #[test]
    fn kinematic_bodies_ignore_gravity_and_impulses() {
        let mut world = PhysicsWorld::default().with_floor(0.0);
        let h = prize(&mut world, 0.0, 3.0);
        world.set_kinematic(h, true).unwrap();
        world.add_impulse(h, Vec2::new(0.0, 5.0)).unwrap();
        world.step(0.5);
        let body = world.body(h).unwrap();
        assert_eq!(body.position, Vec2::new(0.0, 3.0));
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn impulse_scales_with_mass() {
        let mut world = PhysicsWorld::default();
        let h = world.spawn(
            BodyDesc::dynamic("heavy", Vec2::ZERO, Vec2::splat(0.5), CollisionLayers::GRABBABLE)
                .with_mass(2.0),
        );
        world.add_impulse(h, Vec2::new(0.0, 5.0)).unwrap();
        assert_eq!(world.body(h).unwrap().velocity, Vec2::new(0.0, 2.5));
    }

    #[test]
    fn static_bodies_reject_forces() {
        let mut world = PhysicsWorld::default();
        let wall = world.spawn(BodyDesc::fixed(
            "wall",
            Vec2::ZERO,
            Vec2::ONE,
            CollisionLayers::OBSTACLE,
        ));
        assert_eq!(
            world.add_impulse(wall, Vec2::Y),
            Err(PhysicsError::StaticBody(wall))
        );
        assert_eq!(
            world.set_kinematic(BodyHandle(99), true),
            Err(PhysicsError::UnknownBody(BodyHandle(99)))
        );
    }

    #[test]
    fn raycast_returns_nearest_matching_layer() {
        let mut world = PhysicsWorld::default();
        let low = prize(&mut world, 0.0, 0.0);
        let high = prize(&mut world, 0.0, 1.0);
        world.spawn(BodyDesc::fixed(
            "arm",
            Vec2::new(0.0, 2.0),
            Vec2::splat(0.25),
            CollisionLayers::CLAW,
        ));

        let hit = world
            .raycast(Vec2::new(0.0, 3.0), Vec2::NEG_Y, 10.0, CollisionLayers::CONTACT)
            .unwrap();
        assert_eq!(hit.body, high);
        assert!((hit.point.y - 1.25).abs() < 1e-5);

        world.despawn(high);
        let hit = world
            .raycast(Vec2::new(0.0, 3.0), Vec2::NEG_Y, 10.0, CollisionLayers::CONTACT)
            .unwrap();
        assert_eq!(hit.body, low);
    }

    #[test]
    fn overlap_circle_is_sorted_by_handle() {
        let mut world = PhysicsWorld::default();
        let a = prize(&mut world, 0.5, 0.0);
        let b = prize(&mut world, -0.5, 0.0);
        prize(&mut world, 10.0, 0.0);
        assert_eq!(
            world.overlap_circle(Vec2::ZERO, 1.0, CollisionLayers::GRABBABLE),
            vec![a, b]
        );
    }

    #[test]
    fn resting_bodies_touch_their_support() {
        let mut world = PhysicsWorld::default();
        let floor = world.spawn(BodyDesc::fixed(
            "floor",
            Vec2::new(0.0, -0.5),
            Vec2::new(5.0, 0.5),
            CollisionLayers::OBSTACLE,
        ));
        let h = prize(&mut world, 0.0, 0.25);
        assert!(world.is_touching_layers(h, CollisionLayers::OBSTACLE));
        assert!(world.is_touching_layers(floor, CollisionLayers::GRABBABLE));
        assert!(!world.is_touching_layers(h, CollisionLayers::CLAW));
    }

    proptest! {
        #[test]
        fn bodies_never_sink_below_floor(start_y in 0.3f32..20.0, dt in 0.001f32..0.1, steps in 1usize..400) {
            let mut world = PhysicsWorld::default().with_floor(0.0);
            let h = prize(&mut world, 0.0, start_y);
            for _ in 0..steps {
                world.step(dt);
            }
            let body = world.body(h).unwrap();
            prop_assert!(body.position.y - body.half_extents.y >= -1e-4);
        }
    }
}
