#![warn(missing_docs)]
//! 2D physics primitives (AABB, layers, queries) and the backend the crane drives.
//!
//! The crane core only talks to [`PhysicsBackend`]; [`PhysicsWorld`] is the
//! small deterministic implementation used by the headless game and tests.

mod aabb;
mod backend;
mod layers;
mod world;

pub use aabb::Aabb2;
pub use backend::{PhysicsBackend, PhysicsError, RayHit};
pub use layers::CollisionLayers;
pub use world::{Body, BodyDesc, BodyHandle, BodyKind, PhysicsWorld, CONTACT_SKIN};
