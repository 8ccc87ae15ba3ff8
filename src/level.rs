//! Cabinet geometry and prize layout instantiation.

use crate::config::LevelLayout;
use clawcade_core::{scoped_rng, PrizeInfo, SimTick};
use clawcade_crane::{Bounds, GrabTarget, GrabTargets};
use clawcade_physics::{BodyDesc, BodyHandle, CollisionLayers, PhysicsBackend, PhysicsWorld};
use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

/// Salt for the prize scatter RNG domain.
const SCATTER_SALT: u64 = 0x5CA7_7E12;

const FLOOR_THICKNESS: f32 = 1.0;
const FLOOR_MARGIN: f32 = 3.0;

/// Static bodies that live for the whole crane scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    pub floor: BodyHandle,
    pub chute: BodyHandle,
    pub blocks: Vec<BodyHandle>,
}

impl Arena {
    /// Floor spanning the gantry range plus the chute, a chute trigger resting on
    /// the floor at `chute_x`, and the layout's blocks.
    pub fn spawn(layout: &LevelLayout, bounds: Bounds, chute_x: f32, world: &mut PhysicsWorld) -> Self {
        let left = bounds.left().min(chute_x - layout.chute_half_width) - FLOOR_MARGIN;
        let right = bounds.right().max(chute_x + layout.chute_half_width) + FLOOR_MARGIN;
        let floor = world.spawn(BodyDesc::fixed(
            "floor",
            Vec2::new((left + right) * 0.5, layout.floor_y - FLOOR_THICKNESS * 0.5),
            Vec2::new((right - left) * 0.5, FLOOR_THICKNESS * 0.5),
            CollisionLayers::OBSTACLE,
        ));
        let chute = world.spawn(BodyDesc::fixed(
            "chute",
            Vec2::new(chute_x, layout.floor_y + layout.chute_height * 0.5),
            Vec2::new(layout.chute_half_width, layout.chute_height * 0.5),
            CollisionLayers::CHUTE,
        ));
        let blocks = layout
            .blocks
            .iter()
            .map(|block| {
                world.spawn(BodyDesc::fixed(
                    "block",
                    Vec2::new(block.x, block.y),
                    Vec2::new(block.half_width, block.half_height),
                    CollisionLayers::OBSTACLE,
                ))
            })
            .collect();
        Self {
            floor,
            chute,
            blocks,
        }
    }
}

/// The prizes spawned from one layout. Re-created on every level reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelInstance {
    prizes: Vec<BodyHandle>,
}

impl LevelInstance {
    /// Drop every prize of `layout` onto the floor. With a non-zero scatter each
    /// X is jittered deterministically from the layout seed and `tick`.
    pub fn spawn(
        layout: &LevelLayout,
        bounds: Bounds,
        world: &mut PhysicsWorld,
        targets: &mut GrabTargets,
        tick: SimTick,
    ) -> Self {
        let mut rng = scoped_rng(layout.seed, SCATTER_SALT, tick);
        let scatter = layout.scatter.max(0.0);
        let prizes = layout
            .prizes
            .iter()
            .map(|spawn| {
                let jitter = if scatter > 0.0 {
                    rng.gen_range(-scatter..=scatter)
                } else {
                    0.0
                };
                let x = bounds.clamp(spawn.x + jitter);
                let body = world.spawn(
                    BodyDesc::dynamic(
                        spawn.id.as_str(),
                        Vec2::new(x, layout.floor_y + spawn.half_height),
                        Vec2::new(spawn.half_width, spawn.half_height),
                        CollisionLayers::GRABBABLE,
                    )
                    .with_mass(spawn.mass),
                );
                targets.insert(GrabTarget::new(body).with_prize(PrizeInfo::new(spawn.id.clone())));
                debug!(prize = %spawn.id, x, ?body, "prize spawned");
                body
            })
            .collect::<Vec<_>>();
        info!(level = %layout.name, prizes = prizes.len(), "level instantiated");
        Self { prizes }
    }

    #[cfg(test)]
    /// Bodies spawned by this instance, including ones already consumed.
    pub fn prizes(&self) -> &[BodyHandle] {
        &self.prizes
    }

    /// Prizes still in the world.
    pub fn remaining(&self, physics: &dyn PhysicsBackend) -> usize {
        self.prizes.iter().filter(|&&b| physics.contains(b)).count()
    }

    /// Despawn whatever is left of this instance.
    pub fn clear(&mut self, world: &mut PhysicsWorld, targets: &mut GrabTargets) {
        for body in self.prizes.drain(..) {
            targets.remove(body);
            world.despawn(body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlockSpawn;

    fn bounds() -> Bounds {
        Bounds::new(-7.0, 7.0).unwrap()
    }

    #[test]
    fn arena_places_chute_on_floor() {
        let mut world = PhysicsWorld::default();
        let mut layout = LevelLayout::default();
        layout.blocks.push(BlockSpawn {
            x: -4.0,
            y: -1.5,
            half_width: 0.5,
            half_height: 1.0,
        });
        let arena = Arena::spawn(&layout, bounds(), 7.0, &mut world);

        let floor = world.body(arena.floor).unwrap().aabb();
        let chute = world.body(arena.chute).unwrap().aabb();
        assert_eq!(floor.max.y, layout.floor_y);
        assert_eq!(chute.min.y, layout.floor_y);
        assert!(floor.min.x < -7.0 && floor.max.x > 8.0);
        assert_eq!(arena.blocks.len(), 1);
    }

    #[test]
    fn prizes_rest_on_floor_and_register_targets() {
        let mut world = PhysicsWorld::default();
        let mut targets = GrabTargets::new();
        let layout = LevelLayout::default();
        let instance = LevelInstance::spawn(&layout, bounds(), &mut world, &mut targets, SimTick::ZERO);

        assert_eq!(instance.prizes().len(), layout.prizes.len());
        for (body, spawn) in instance.prizes().iter().zip(&layout.prizes) {
            let placed = world.body(*body).unwrap();
            assert_eq!(placed.position, Vec2::new(spawn.x, layout.floor_y + spawn.half_height));
            let target = targets.get(*body).unwrap();
            assert_eq!(target.prize.as_ref().map(|p| &p.id), Some(&spawn.id));
        }
    }

    #[test]
    fn scatter_is_seeded_and_clamped() {
        let mut layout = LevelLayout::default();
        layout.scatter = 20.0;
        layout.seed = 42;

        let xs = |tick: SimTick| {
            let mut world = PhysicsWorld::default();
            let mut targets = GrabTargets::new();
            let instance = LevelInstance::spawn(&layout, bounds(), &mut world, &mut targets, tick);
            instance
                .prizes()
                .iter()
                .map(|b| world.body(*b).unwrap().position.x)
                .collect::<Vec<_>>()
        };

        let first = xs(SimTick(3));
        assert_eq!(first, xs(SimTick(3)));
        assert!(first.iter().all(|x| (-7.0..=7.0).contains(x)));
    }

    #[test]
    fn clear_removes_bodies_and_targets() {
        let mut world = PhysicsWorld::default();
        let mut targets = GrabTargets::new();
        let mut instance = LevelInstance::spawn(
            &LevelLayout::default(),
            bounds(),
            &mut world,
            &mut targets,
            SimTick::ZERO,
        );
        world.despawn(instance.prizes()[0]);
        assert_eq!(instance.remaining(&world), 2);

        instance.clear(&mut world, &mut targets);
        assert!(world.is_empty());
        assert!(targets.is_empty());
        assert!(instance.prizes().is_empty());
    }
}
