//! Registry of grab targets and their ownership links.
//!
//! A target's `held_by` field replaces scene-graph parenting: while it is set,
//! the owning rig recomputes the target's position every tick from the pivot and
//! `local_offset`.

use crate::RigHandle;
use clawcade_core::PrizeInfo;
use clawcade_physics::BodyHandle;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A candidate or currently held object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrabTarget {
    /// Backing physics body.
    pub body: BodyHandle,
    /// Whether the claw may pick it up.
    pub grabbable: bool,
    /// Ownership link.
    pub held_by: Option<RigHandle>,
    /// Offset from the owner's pivot, in pivot-local space.
    pub local_offset: Vec2,
    /// Prize metadata, if this target counts toward the collection.
    pub prize: Option<PrizeInfo>,
}

impl GrabTarget {
    /// Grabbable target without prize metadata.
    pub fn new(body: BodyHandle) -> Self {
        Self {
            body,
            grabbable: true,
            held_by: None,
            local_offset: Vec2::ZERO,
            prize: None,
        }
    }

    /// Attach prize metadata.
    pub fn with_prize(mut self, prize: PrizeInfo) -> Self {
        self.prize = Some(prize);
        self
    }

    /// Whether any rig owns this target.
    pub fn is_held(&self) -> bool {
        self.held_by.is_some()
    }
}

/// All grab targets in a crane scene, keyed by body.
#[derive(Debug, Clone, Default)]
pub struct GrabTargets {
    targets: BTreeMap<BodyHandle, GrabTarget>,
}

impl GrabTargets {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target, replacing any previous entry for the same body.
    pub fn insert(&mut self, target: GrabTarget) {
        self.targets.insert(target.body, target);
    }

    /// Look up a target.
    pub fn get(&self, body: BodyHandle) -> Option<&GrabTarget> {
        self.targets.get(&body)
    }

    /// Forget a target.
    pub fn remove(&mut self, body: BodyHandle) -> Option<GrabTarget> {
        self.targets.remove(&body)
    }

    /// Targets in body order.
    pub fn iter(&self) -> impl Iterator<Item = &GrabTarget> {
        self.targets.values()
    }

    /// Number of registered targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no targets are registered.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Drop every target.
    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Targets whose ownership link is set.
    pub fn held_count(&self) -> usize {
        self.targets.values().filter(|t| t.is_held()).count()
    }

    /// Whether `body` is linked to `rig`.
    pub fn is_held_by(&self, body: BodyHandle, rig: RigHandle) -> bool {
        self.get(body).is_some_and(|t| t.held_by == Some(rig))
    }

    /// Whether `body` could be grabbed right now.
    pub fn is_available(&self, body: BodyHandle) -> bool {
        self.get(body).is_some_and(|t| t.grabbable && !t.is_held())
    }

    /// Link `body` to `rig` if it is grabbable and unowned.
    pub fn acquire(&mut self, body: BodyHandle, rig: RigHandle, local_offset: Vec2) -> bool {
        match self.targets.get_mut(&body) {
            Some(target) if target.grabbable && target.held_by.is_none() => {
                target.held_by = Some(rig);
                target.local_offset = local_offset;
                true
            }
            _ => false,
        }
    }

    /// Clear the link if `rig` owns `body`.
    pub fn release(&mut self, body: BodyHandle, rig: RigHandle) -> bool {
        match self.targets.get_mut(&body) {
            Some(target) if target.held_by == Some(rig) => {
                target.held_by = None;
                target.local_offset = Vec2::ZERO;
                true
            }
            _ => false,
        }
    }

    /// Break a link regardless of owner, as an outside system would.
    pub fn detach(&mut self, body: BodyHandle) -> Option<RigHandle> {
        self.targets.get_mut(&body).and_then(|t| t.held_by.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_rejects_second_owner() {
        let mut targets = GrabTargets::new();
        targets.insert(GrabTarget::new(BodyHandle(3)));

        assert!(targets.acquire(BodyHandle(3), RigHandle(1), Vec2::Y));
        assert!(!targets.acquire(BodyHandle(3), RigHandle(2), Vec2::ZERO));
        assert!(targets.is_held_by(BodyHandle(3), RigHandle(1)));
        assert_eq!(targets.held_count(), 1);
    }

    #[test]
    fn release_requires_owner() {
        let mut targets = GrabTargets::new();
        targets.insert(GrabTarget::new(BodyHandle(3)));
        targets.acquire(BodyHandle(3), RigHandle(1), Vec2::Y);

        assert!(!targets.release(BodyHandle(3), RigHandle(2)));
        assert!(targets.release(BodyHandle(3), RigHandle(1)));
        assert!(targets.is_available(BodyHandle(3)));
    }

    #[test]
    fn non_grabbable_targets_are_never_acquired() {
        let mut targets = GrabTargets::new();
        targets.insert(GrabTarget {
            grabbable: false,
            ..GrabTarget::new(BodyHandle(9))
        });
        assert!(!targets.acquire(BodyHandle(9), RigHandle(1), Vec2::ZERO));
        assert!(!targets.acquire(BodyHandle(10), RigHandle(1), Vec2::ZERO));
    }

    #[test]
    fn detach_breaks_link() {
        let mut targets = GrabTargets::new();
        targets.insert(GrabTarget::new(BodyHandle(3)));
        targets.acquire(BodyHandle(3), RigHandle(1), Vec2::Y);
        assert_eq!(targets.detach(BodyHandle(3)), Some(RigHandle(1)));
        assert_eq!(targets.held_count(), 0);
    }
}
