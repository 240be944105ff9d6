//! BFS light propagation for the sky and block channels.
//!
//! The work queue is a preallocated array of packed ints:
//! `(dx+32) | (dy+32)<<6 | (dz+32)<<12 | level<<18`, offsets relative to
//! the update origin. Propagation is bounded at 17 Manhattan blocks; at the
//! bound further enqueues are skipped and the next adjacent edit repairs
//! the fixed point.

use basalt_utils::{BlockPos, Direction};

/// Queue capacity, matching the reference work array.
const QUEUE_SIZE: usize = 32_768;
/// Maximum propagation radius in Manhattan distance.
const MAX_RADIUS: i32 = 17;
/// The origin packed with zero offsets: `32 | 32<<6 | 32<<12`.
const PACKED_ORIGIN: i32 = 0x20820;

/// The two light channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Sunlight, attenuated by opacity below the height map.
    Sky,
    /// Emitted light from torches, lava, glowstone.
    Block,
}

impl LightKind {
    /// Default level outside loaded storage.
    #[must_use]
    pub const fn default_level(self, has_sky: bool) -> u8 {
        match self {
            LightKind::Sky if has_sky => 15,
            _ => 0,
        }
    }
}

/// World access the engine needs. The world thread adapts its chunk
/// provider to this; all reads are position-based.
pub trait LightAccess {
    /// Stored light of a channel at a position.
    fn light(&self, kind: LightKind, pos: BlockPos) -> u8;
    /// Overwrites stored light of a channel.
    fn set_light(&mut self, kind: LightKind, pos: BlockPos, level: u8);
    /// Light opacity of the block at a position.
    fn opacity(&self, pos: BlockPos) -> u8;
    /// Light emission of the block at a position.
    fn emission(&self, pos: BlockPos) -> u8;
    /// Whether the position sees the sky.
    fn can_see_sky(&self, pos: BlockPos) -> bool;
    /// Whether every chunk within `radius` blocks of the position is
    /// loaded.
    fn chunks_exist(&self, pos: BlockPos, radius: i32) -> bool;
}

/// The BFS engine with its reusable packed work queue.
pub struct LightEngine {
    queue: Box<[i32; QUEUE_SIZE]>,
}

impl LightEngine {
    /// Creates the engine with a zeroed queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: vec![0; QUEUE_SIZE]
                .into_boxed_slice()
                .try_into()
                .unwrap_or_else(|_| unreachable!("queue allocation is fixed-size")),
        }
    }

    /// What the stored light at `pos` should be once quiescent.
    pub fn compute_light_value(access: &impl LightAccess, kind: LightKind, pos: BlockPos) -> u8 {
        if kind == LightKind::Sky && access.can_see_sky(pos) {
            return 15;
        }

        let raw_emission = access.emission(pos);
        let mut emission = match kind {
            LightKind::Block => raw_emission,
            LightKind::Sky => 0,
        };
        let mut opacity = access.opacity(pos);
        if opacity >= 15 && raw_emission > 0 {
            opacity = 1;
        }
        if opacity < 1 {
            opacity = 1;
        }
        if opacity >= 15 {
            return 0;
        }
        if emission >= 14 {
            return emission;
        }

        for dir in Direction::ALL {
            let neighbor = pos.relative(dir);
            let through = access.light(kind, neighbor).saturating_sub(opacity);
            if through > emission {
                emission = through;
            }
            if emission >= 14 {
                return emission;
            }
        }
        emission
    }

    /// Runs a light update for one channel at one position. Returns `false`
    /// without touching state when the 17-block neighborhood is not loaded.
    pub fn update_light(
        &mut self,
        access: &mut impl LightAccess,
        kind: LightKind,
        pos: BlockPos,
    ) -> bool {
        if !access.chunks_exist(pos, MAX_RADIUS) {
            return false;
        }

        let mut queue_start = 0usize;
        let mut queue_end = 0usize;

        let saved = access.light(kind, pos);
        let computed = Self::compute_light_value(access, kind, pos);

        if computed > saved {
            // Brighten only: seed the origin with no level payload.
            self.queue[queue_end] = PACKED_ORIGIN;
            queue_end += 1;
        } else if computed < saved {
            // Darken phase: zero out the region lit by this source.
            self.queue[queue_end] = PACKED_ORIGIN | (i32::from(saved) << 18);
            queue_end += 1;

            while queue_start < queue_end {
                let packed = self.queue[queue_start];
                queue_start += 1;

                let bx = (packed & 0x3F) - 32 + pos.x;
                let by = ((packed >> 6) & 0x3F) - 32 + pos.y;
                let bz = ((packed >> 12) & 0x3F) - 32 + pos.z;
                let level = (packed >> 18) & 0xF;
                let here = BlockPos::new(bx, by, bz);

                if i32::from(access.light(kind, here)) != level {
                    continue;
                }
                access.set_light(kind, here, 0);
                if level <= 0 {
                    continue;
                }
                if here.manhattan_distance(pos) >= MAX_RADIUS {
                    continue;
                }

                for dir in Direction::ALL {
                    let neighbor = here.relative(dir);
                    let opacity = i32::from(access.opacity(neighbor)).max(1);
                    if i32::from(access.light(kind, neighbor)) == level - opacity
                        && queue_end < QUEUE_SIZE
                    {
                        self.queue[queue_end] = (neighbor.x - pos.x + 32)
                            | ((neighbor.y - pos.y + 32) << 6)
                            | ((neighbor.z - pos.z + 32) << 12)
                            | ((level - opacity) << 18);
                        queue_end += 1;
                    }
                }
            }

            queue_start = 0;
        }

        // Brighten phase: recompute-and-spread until the queue drains.
        while queue_start < queue_end {
            let packed = self.queue[queue_start];
            queue_start += 1;

            let bx = (packed & 0x3F) - 32 + pos.x;
            let by = ((packed >> 6) & 0x3F) - 32 + pos.y;
            let bz = ((packed >> 12) & 0x3F) - 32 + pos.z;
            let here = BlockPos::new(bx, by, bz);

            let current = access.light(kind, here);
            let computed = Self::compute_light_value(access, kind, here);
            if computed == current {
                continue;
            }
            access.set_light(kind, here, computed);
            if computed <= current {
                continue;
            }

            let has_room = queue_end < QUEUE_SIZE - 6;
            if here.manhattan_distance(pos) >= MAX_RADIUS || !has_room {
                continue;
            }

            for dir in Direction::ALL {
                let neighbor = here.relative(dir);
                if access.light(kind, neighbor) < computed {
                    self.queue[queue_end] = (neighbor.x - pos.x + 32)
                        | ((neighbor.y - pos.y + 32) << 6)
                        | ((neighbor.z - pos.z + 32) << 12);
                    queue_end += 1;
                }
            }
        }

        true
    }
}

impl Default for LightEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Time-of-day sky dimming, applied at read time rather than stored:
/// `floor(11 · clamp(1 − (2·cos(2π·angle) + 0.5), 0, 1))`.
#[must_use]
pub fn skylight_subtracted(celestial_angle: f32) -> i32 {
    let mut f = 1.0 - ((celestial_angle * std::f32::consts::PI * 2.0).cos() * 2.0 + 0.5);
    f = f.clamp(0.0, 1.0);
    (f * 11.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    /// An unbounded test world: opacity/emission per position, no chunks
    /// missing.
    #[derive(Default)]
    struct TestWorld {
        light: FxHashMap<(LightKindKey, BlockPos), u8>,
        opacity: FxHashMap<BlockPos, u8>,
        emission: FxHashMap<BlockPos, u8>,
        sky_heights: FxHashMap<(i32, i32), i32>,
        has_sky: bool,
    }

    #[derive(Hash, PartialEq, Eq, Clone, Copy)]
    enum LightKindKey {
        Sky,
        Block,
    }

    impl From<LightKind> for LightKindKey {
        fn from(kind: LightKind) -> Self {
            match kind {
                LightKind::Sky => LightKindKey::Sky,
                LightKind::Block => LightKindKey::Block,
            }
        }
    }

    impl LightAccess for TestWorld {
        fn light(&self, kind: LightKind, pos: BlockPos) -> u8 {
            self.light.get(&(kind.into(), pos)).copied().unwrap_or(0)
        }

        fn set_light(&mut self, kind: LightKind, pos: BlockPos, level: u8) {
            self.light.insert((kind.into(), pos), level);
        }

        fn opacity(&self, pos: BlockPos) -> u8 {
            self.opacity.get(&pos).copied().unwrap_or(0)
        }

        fn emission(&self, pos: BlockPos) -> u8 {
            self.emission.get(&pos).copied().unwrap_or(0)
        }

        fn can_see_sky(&self, pos: BlockPos) -> bool {
            self.has_sky
                && pos.y
                    >= self
                        .sky_heights
                        .get(&(pos.x, pos.z))
                        .copied()
                        .unwrap_or(i32::MIN)
        }

        fn chunks_exist(&self, _pos: BlockPos, _radius: i32) -> bool {
            true
        }
    }

    #[test]
    fn torch_light_spreads_and_attenuates() {
        let mut world = TestWorld::default();
        let torch = BlockPos::new(8, 8, 8);
        world.emission.insert(torch, 14);

        let mut engine = LightEngine::new();
        assert!(engine.update_light(&mut world, LightKind::Block, torch));

        assert_eq!(world.light(LightKind::Block, torch), 14);
        assert_eq!(world.light(LightKind::Block, BlockPos::new(9, 8, 8)), 13);
        assert_eq!(world.light(LightKind::Block, BlockPos::new(14, 8, 8)), 8);
        assert_eq!(world.light(LightKind::Block, BlockPos::new(15, 8, 8)), 7);
        // Chebyshev >= 15 away is beyond the light's reach.
        assert_eq!(world.light(LightKind::Block, BlockPos::new(23, 8, 8)), 0);
        assert_eq!(world.light(LightKind::Block, BlockPos::new(8, 8, 23)), 0);
    }

    #[test]
    fn removing_the_source_darkens() {
        let mut world = TestWorld::default();
        let torch = BlockPos::new(0, 64, 0);
        world.emission.insert(torch, 14);
        let mut engine = LightEngine::new();
        engine.update_light(&mut world, LightKind::Block, torch);
        assert_eq!(world.light(LightKind::Block, BlockPos::new(3, 64, 0)), 11);

        world.emission.remove(&torch);
        engine.update_light(&mut world, LightKind::Block, torch);
        assert_eq!(world.light(LightKind::Block, torch), 0);
        assert_eq!(world.light(LightKind::Block, BlockPos::new(3, 64, 0)), 0);
    }

    #[test]
    fn opaque_wall_blocks_light() {
        let mut world = TestWorld::default();
        let torch = BlockPos::new(0, 10, 0);
        world.emission.insert(torch, 14);
        // A full wall one block east.
        for y in -20..40 {
            for z in -20..20 {
                world.opacity.insert(BlockPos::new(1, y, z), 255);
            }
        }
        let mut engine = LightEngine::new();
        engine.update_light(&mut world, LightKind::Block, torch);
        assert_eq!(world.light(LightKind::Block, BlockPos::new(1, 10, 0)), 0);
        // Light reaches around on open axes.
        assert_eq!(world.light(LightKind::Block, BlockPos::new(0, 11, 0)), 13);
    }

    #[test]
    fn sky_light_is_full_above_surface() {
        let mut world = TestWorld {
            has_sky: true,
            ..TestWorld::default()
        };
        world.sky_heights.insert((0, 0), 64);
        let above = BlockPos::new(0, 70, 0);
        let mut engine = LightEngine::new();
        engine.update_light(&mut world, LightKind::Sky, above);
        assert_eq!(world.light(LightKind::Sky, above), 15);
    }

    #[test]
    fn missing_chunks_short_circuit() {
        struct NoChunks;
        impl LightAccess for NoChunks {
            fn light(&self, _: LightKind, _: BlockPos) -> u8 {
                0
            }
            fn set_light(&mut self, _: LightKind, _: BlockPos, _: u8) {
                panic!("must not write");
            }
            fn opacity(&self, _: BlockPos) -> u8 {
                0
            }
            fn emission(&self, _: BlockPos) -> u8 {
                0
            }
            fn can_see_sky(&self, _: BlockPos) -> bool {
                false
            }
            fn chunks_exist(&self, _: BlockPos, _: i32) -> bool {
                false
            }
        }
        let mut engine = LightEngine::new();
        assert!(!engine.update_light(&mut NoChunks, LightKind::Block, BlockPos::new(0, 0, 0)));
    }

    #[test]
    fn skylight_subtraction_curve() {
        // Midnight (angle 0.5): maximum dimming.
        assert_eq!(skylight_subtracted(0.5), 11);
        // Noon (angle 0.0): no dimming.
        assert_eq!(skylight_subtracted(0.0), 0);
    }
}
