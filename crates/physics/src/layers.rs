use bitflags::bitflags;

bitflags! {
    /// Category tags used to filter contact queries.
    #[derive(
        Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
    )]
    pub struct CollisionLayers: u32 {
        /// Objects the claw may pick up.
        const GRABBABLE = 1 << 0;
        /// Cabinet walls, floor, and other blockers.
        const OBSTACLE = 1 << 1;
        /// Claw arms.
        const CLAW = 1 << 2;
        /// Prize chute trigger volume.
        const CHUTE = 1 << 3;
    }
}

impl CollisionLayers {
    /// Layers that stop a descending arm.
    pub const CONTACT: Self = Self::GRABBABLE.union(Self::OBSTACLE);
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::OBSTACLE
    }
}
