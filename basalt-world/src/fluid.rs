//! Fluid flow: level recomputation, spring formation, downward priority
//! and the depth-4 drop-off search for horizontal spread.
//!
//! Metadata: 0 is a source, 1–7 flow with rising distance, 8–15 are
//! falling columns. The tick computes a list of updates the world applies.

use basalt_registry::REGISTRY;
use basalt_registry::blocks::vanilla;
use basalt_utils::{BlockId, BlockPos};

/// The two fluids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluidType {
    /// Water: tick rate 5, decay 1.
    Water,
    /// Lava: tick rate 30 (10 in the nether), decay 2 (1 in the nether).
    Lava,
}

impl FluidType {
    /// The fluid a block id belongs to, if any.
    #[must_use]
    pub fn of_block(id: BlockId) -> Option<Self> {
        match id {
            vanilla::FLOWING_WATER | vanilla::WATER => Some(FluidType::Water),
            vanilla::FLOWING_LAVA | vanilla::LAVA => Some(FluidType::Lava),
            _ => None,
        }
    }

    /// The flowing-block id of this fluid.
    #[must_use]
    pub const fn flowing_block(self) -> BlockId {
        match self {
            FluidType::Water => vanilla::FLOWING_WATER,
            FluidType::Lava => vanilla::FLOWING_LAVA,
        }
    }

    /// Scheduled-tick delay.
    #[must_use]
    pub const fn tick_rate(self, is_nether: bool) -> i64 {
        match self {
            FluidType::Water => 5,
            FluidType::Lava if is_nether => 10,
            FluidType::Lava => 30,
        }
    }

    /// Flow-level decay per horizontal block.
    #[must_use]
    pub const fn decay(self, is_nether: bool) -> i32 {
        match self {
            FluidType::Lava if !is_nether => 2,
            _ => 1,
        }
    }
}

/// Read access the flow calculation needs.
pub trait FluidWorld {
    /// Block id at an absolute position.
    fn block(&self, pos: BlockPos) -> BlockId;
    /// Metadata at an absolute position.
    fn metadata(&self, pos: BlockPos) -> u8;
}

/// One block write the tick decided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluidUpdate {
    /// Target position.
    pub pos: BlockPos,
    /// New block id (air when the flow dries up).
    pub block_id: BlockId,
    /// New metadata.
    pub meta: u8,
    /// Re-tick delay; 0 means no reschedule.
    pub schedule_delay: i64,
    /// Whether the write fizzes (lava meeting something it burns).
    pub fizz: bool,
}

/// Liquid height fraction for rendering/entity push, `[1/9, 8/9]`.
#[must_use]
pub fn liquid_height_percent(meta: u8) -> f32 {
    let level = if meta >= 8 { 0 } else { meta };
    f32::from(level + 1) / 9.0
}

fn flow_level(world: &impl FluidWorld, fluid: FluidType, pos: BlockPos) -> i32 {
    if FluidType::of_block(world.block(pos)) == Some(fluid) {
        i32::from(world.metadata(pos))
    } else {
        -1
    }
}

/// Blocks fluid cannot displace: doors, signs, ladders, reeds, portals,
/// and anything solid.
fn is_blocking(world: &impl FluidWorld, pos: BlockPos) -> bool {
    let id = world.block(pos);
    if matches!(
        id,
        vanilla::WOODEN_DOOR
            | vanilla::IRON_DOOR
            | vanilla::STANDING_SIGN
            | vanilla::WALL_SIGN
            | vanilla::LADDER
            | vanilla::REEDS
            | vanilla::PORTAL
    ) {
        return true;
    }
    REGISTRY.blocks.by_id_or_air(id).blocks_movement()
}

fn can_flow_into(world: &impl FluidWorld, fluid: FluidType, pos: BlockPos) -> bool {
    let id = world.block(pos);
    if FluidType::of_block(id) == Some(fluid) {
        return false;
    }
    // Lava never displaces lava regardless of which fluid asks.
    if id == vanilla::FLOWING_LAVA || id == vanilla::LAVA {
        return false;
    }
    !is_blocking(world, pos)
}

fn is_water(id: BlockId) -> bool {
    id == vanilla::WATER || id == vanilla::FLOWING_WATER
}

const HORIZONTAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const OPPOSITE: [usize; 4] = [1, 0, 3, 2];

/// Depth-limited search for the shortest path to a drop-off.
fn find_drop_off(
    world: &impl FluidWorld,
    fluid: FluidType,
    pos: BlockPos,
    depth: i32,
    from_dir: usize,
) -> i32 {
    let mut min_cost = 1000;
    for (dir, &(dx, dz)) in HORIZONTAL.iter().enumerate() {
        if dir == OPPOSITE[from_dir] {
            continue;
        }
        let next = pos.offset(dx, 0, dz);
        if is_blocking(world, next)
            || (FluidType::of_block(world.block(next)) == Some(fluid)
                && world.metadata(next) == 0)
        {
            continue;
        }
        if !is_blocking(world, next.down()) {
            return depth;
        }
        if depth < 4 {
            let cost = find_drop_off(world, fluid, next, depth + 1, dir);
            min_cost = min_cost.min(cost);
        }
    }
    min_cost
}

/// Which of the four directions lie on a minimum-cost path to a drop-off.
fn flow_directions(world: &impl FluidWorld, fluid: FluidType, pos: BlockPos) -> [bool; 4] {
    let mut costs = [1000; 4];
    for (dir, &(dx, dz)) in HORIZONTAL.iter().enumerate() {
        let next = pos.offset(dx, 0, dz);
        if is_blocking(world, next)
            || (FluidType::of_block(world.block(next)) == Some(fluid)
                && world.metadata(next) == 0)
        {
            continue;
        }
        costs[dir] = if is_blocking(world, next.down()) {
            find_drop_off(world, fluid, next, 1, dir)
        } else {
            0
        };
    }
    let min_cost = *costs.iter().min().unwrap_or(&1000);
    [
        costs[0] == min_cost,
        costs[1] == min_cost,
        costs[2] == min_cost,
        costs[3] == min_cost,
    ]
}

/// Runs one flow tick for the fluid at `pos`. `rand_value` supplies the
/// lava-retreat slowdown roll.
pub fn calculate_flow(
    world: &impl FluidWorld,
    pos: BlockPos,
    fluid: FluidType,
    is_nether: bool,
    rand_value: i32,
) -> Vec<FluidUpdate> {
    let mut updates = Vec::new();
    let decay = fluid.decay(is_nether);
    let mut tick_rate = fluid.tick_rate(is_nether);
    let flowing = fluid.flowing_block();

    let mut current_level = flow_level(world, fluid, pos);
    if current_level < 0 {
        return updates;
    }

    if current_level > 0 {
        // Recompute the level from the four horizontal neighbors.
        let mut min_neighbor = -100;
        let mut adjacent_sources = 0;
        for (dx, dz) in HORIZONTAL {
            let neighbor = pos.offset(dx, 0, dz);
            let level = flow_level(world, fluid, neighbor);
            if level < 0 {
                continue;
            }
            if level == 0 {
                adjacent_sources += 1;
            }
            let level = if level >= 8 { 0 } else { level };
            min_neighbor = if min_neighbor < 0 {
                level
            } else {
                min_neighbor.min(level)
            };
        }

        let mut new_level = min_neighbor + decay;
        if new_level >= 8 || min_neighbor < 0 {
            new_level = -1;
        }

        // A column above keeps this block falling.
        let above = flow_level(world, fluid, pos.up());
        if above >= 0 {
            new_level = if above >= 8 { above } else { above + 8 };
        }

        // Spring rule: two adjacent sources over support become a source.
        if adjacent_sources >= 2 && fluid == FluidType::Water {
            let below = pos.down();
            if REGISTRY
                .blocks
                .by_id_or_air(world.block(below))
                .material
                .is_solid()
                || (FluidType::of_block(world.block(below)) == Some(fluid)
                    && world.metadata(below) == 0)
            {
                new_level = 0;
            }
        }

        // Lava retreats slowly: three in four retreat rolls quadruple the
        // delay.
        if fluid == FluidType::Lava
            && current_level < 8
            && new_level < 8
            && new_level > current_level
            && rand_value & 3 != 0
        {
            tick_rate *= 4;
        }

        if new_level != current_level {
            if new_level < 0 {
                updates.push(FluidUpdate {
                    pos,
                    block_id: vanilla::AIR,
                    meta: 0,
                    schedule_delay: 0,
                    fizz: false,
                });
            } else {
                updates.push(FluidUpdate {
                    pos,
                    block_id: flowing,
                    meta: new_level as u8,
                    schedule_delay: tick_rate,
                    fizz: false,
                });
            }
        }
        current_level = new_level;
    }

    if current_level < 0 {
        return updates;
    }

    // Downward flow takes priority.
    let below = pos.down();
    if can_flow_into(world, fluid, below) {
        if fluid == FluidType::Lava && is_water(world.block(below)) {
            updates.push(FluidUpdate {
                pos: below,
                block_id: vanilla::STONE,
                meta: 0,
                schedule_delay: 0,
                fizz: true,
            });
            return updates;
        }
        let down_meta = if current_level >= 8 {
            current_level
        } else {
            current_level + 8
        };
        updates.push(FluidUpdate {
            pos: below,
            block_id: flowing,
            meta: down_meta as u8,
            schedule_delay: tick_rate,
            fizz: false,
        });
    } else if current_level == 0 || is_blocking(world, below) {
        // Horizontal spread along the shortest drop-off paths.
        let mut spread_level = current_level + decay;
        if current_level >= 8 {
            spread_level = 1;
        }
        if spread_level >= 8 {
            return updates;
        }

        let directions = flow_directions(world, fluid, pos);
        for (dir, &(dx, dz)) in HORIZONTAL.iter().enumerate() {
            if !directions[dir] {
                continue;
            }
            let next = pos.offset(dx, 0, dz);
            if can_flow_into(world, fluid, next) {
                let fizz = fluid == FluidType::Lava && !world.block(next).is_air();
                updates.push(FluidUpdate {
                    pos: next,
                    block_id: flowing,
                    meta: spread_level as u8,
                    schedule_delay: tick_rate,
                    fizz,
                });
            }
        }
    }

    updates
}

/// Lava-meets-water side effects: a source becomes obsidian, shallow flow
/// becomes cobblestone.
#[must_use]
pub fn lava_water_interaction(world: &impl FluidWorld, pos: BlockPos) -> Option<BlockId> {
    let meta = world.metadata(pos);
    let touching_water = [
        pos.offset(0, 0, -1),
        pos.offset(0, 0, 1),
        pos.offset(-1, 0, 0),
        pos.offset(1, 0, 0),
        pos.up(),
    ]
    .iter()
    .any(|&neighbor| is_water(world.block(neighbor)));

    if !touching_water {
        return None;
    }
    if meta == 0 {
        Some(vanilla::OBSIDIAN)
    } else if meta <= 4 {
        Some(vanilla::COBBLESTONE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[derive(Default)]
    struct GridWorld {
        blocks: FxHashMap<BlockPos, (BlockId, u8)>,
        floor_y: i32,
    }

    impl GridWorld {
        fn flat(floor_y: i32) -> Self {
            Self {
                blocks: FxHashMap::default(),
                floor_y,
            }
        }

        fn set(&mut self, pos: BlockPos, id: BlockId, meta: u8) {
            self.blocks.insert(pos, (id, meta));
        }

        fn apply(&mut self, updates: &[FluidUpdate]) {
            for update in updates {
                self.set(update.pos, update.block_id, update.meta);
            }
        }
    }

    impl FluidWorld for GridWorld {
        fn block(&self, pos: BlockPos) -> BlockId {
            if let Some(&(id, _)) = self.blocks.get(&pos) {
                return id;
            }
            if pos.y <= self.floor_y {
                vanilla::STONE
            } else {
                vanilla::AIR
            }
        }

        fn metadata(&self, pos: BlockPos) -> u8 {
            self.blocks.get(&pos).map_or(0, |&(_, meta)| meta)
        }
    }

    fn tick_all_fluids(world: &mut GridWorld, fluid: FluidType) {
        let fluid_positions: Vec<BlockPos> = world
            .blocks
            .iter()
            .filter(|&(_, &(id, _))| FluidType::of_block(id) == Some(fluid))
            .map(|(&pos, _)| pos)
            .collect();
        let mut all_updates = Vec::new();
        let mut sorted = fluid_positions;
        sorted.sort_unstable();
        for pos in sorted {
            all_updates.extend(calculate_flow(world, pos, fluid, false, 1));
        }
        world.apply(&all_updates);
    }

    #[test]
    fn source_spreads_levels_one_to_seven() {
        let mut world = GridWorld::flat(63);
        let source = BlockPos::new(0, 64, 0);
        world.set(source, vanilla::WATER, 0);

        for _ in 0..20 {
            tick_all_fluids(&mut world, FluidType::Water);
        }

        for k in 1..=7i32 {
            let east = world.metadata(BlockPos::new(k, 64, 0));
            assert_eq!(i32::from(east), k, "level at +{k}");
            let west = world.metadata(BlockPos::new(-k, 64, 0));
            assert_eq!(i32::from(west), k, "level at -{k}");
        }
        // Water runs out after seven blocks.
        assert_eq!(world.block(BlockPos::new(8, 64, 0)), vanilla::AIR);
        assert_eq!(world.block(BlockPos::new(-8, 64, 0)), vanilla::AIR);
    }

    #[test]
    fn lava_spreads_shorter() {
        let mut world = GridWorld::flat(63);
        world.set(BlockPos::new(0, 64, 0), vanilla::LAVA, 0);
        for _ in 0..30 {
            tick_all_fluids(&mut world, FluidType::Lava);
        }
        // Overworld decay 2: levels 2, 4, 6 then dry.
        assert_eq!(world.metadata(BlockPos::new(1, 64, 0)), 2);
        assert_eq!(world.metadata(BlockPos::new(3, 64, 0)), 6);
        assert_eq!(world.block(BlockPos::new(4, 64, 0)), vanilla::AIR);
    }

    #[test]
    fn downward_flow_takes_priority() {
        let mut world = GridWorld::flat(60);
        let source = BlockPos::new(0, 64, 0);
        world.set(source, vanilla::WATER, 0);
        let updates = calculate_flow(&world, source, FluidType::Water, false, 1);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].pos, source.down());
        assert_eq!(updates[0].meta, 8, "falling water keeps the +8 bit");
    }

    #[test]
    fn two_sources_make_a_spring() {
        let mut world = GridWorld::flat(63);
        world.set(BlockPos::new(0, 64, 0), vanilla::WATER, 0);
        world.set(BlockPos::new(2, 64, 0), vanilla::WATER, 0);
        world.set(BlockPos::new(1, 64, 0), vanilla::FLOWING_WATER, 1);

        let updates = calculate_flow(
            &world,
            BlockPos::new(1, 64, 0),
            FluidType::Water,
            false,
            1,
        );
        let self_update = updates
            .iter()
            .find(|u| u.pos == BlockPos::new(1, 64, 0))
            .expect("spring update");
        assert_eq!(self_update.meta, 0);
    }

    #[test]
    fn orphaned_flow_dries_up() {
        let mut world = GridWorld::flat(63);
        world.set(BlockPos::new(0, 64, 0), vanilla::FLOWING_WATER, 7);
        let updates = calculate_flow(
            &world,
            BlockPos::new(0, 64, 0),
            FluidType::Water,
            false,
            1,
        );
        assert!(updates
            .iter()
            .any(|u| u.pos == BlockPos::new(0, 64, 0) && u.block_id == vanilla::AIR));
    }

    #[test]
    fn lava_onto_water_makes_stone() {
        let mut world = GridWorld::flat(60);
        world.set(BlockPos::new(0, 64, 0), vanilla::LAVA, 0);
        world.set(BlockPos::new(0, 63, 0), vanilla::WATER, 0);
        let updates = calculate_flow(
            &world,
            BlockPos::new(0, 64, 0),
            FluidType::Lava,
            false,
            1,
        );
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].block_id, vanilla::STONE);
        assert!(updates[0].fizz);
    }

    #[test]
    fn lava_source_beside_water_becomes_obsidian() {
        let mut world = GridWorld::flat(63);
        world.set(BlockPos::new(0, 64, 0), vanilla::LAVA, 0);
        world.set(BlockPos::new(1, 64, 0), vanilla::WATER, 0);
        assert_eq!(
            lava_water_interaction(&world, BlockPos::new(0, 64, 0)),
            Some(vanilla::OBSIDIAN)
        );
        world.set(BlockPos::new(0, 64, 0), vanilla::FLOWING_LAVA, 2);
        assert_eq!(
            lava_water_interaction(&world, BlockPos::new(0, 64, 0)),
            Some(vanilla::COBBLESTONE)
        );
        world.set(BlockPos::new(0, 64, 0), vanilla::FLOWING_LAVA, 6);
        assert_eq!(lava_water_interaction(&world, BlockPos::new(0, 64, 0)), None);
    }

    #[test]
    fn flow_prefers_the_nearest_drop_off() {
        let mut world = GridWorld::flat(63);
        // A hole two blocks east; flat everywhere else.
        world.set(BlockPos::new(2, 63, 0), vanilla::AIR, 0);
        world.set(BlockPos::new(0, 64, 0), vanilla::WATER, 0);

        let updates = calculate_flow(
            &world,
            BlockPos::new(0, 64, 0),
            FluidType::Water,
            false,
            1,
        );
        // Only the eastward step is on a minimum-cost path.
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].pos, BlockPos::new(1, 64, 0));
    }

    #[test]
    fn doors_block_flow() {
        let mut world = GridWorld::flat(63);
        world.set(BlockPos::new(1, 64, 0), vanilla::WOODEN_DOOR, 0);
        world.set(BlockPos::new(0, 64, 0), vanilla::WATER, 0);
        let updates = calculate_flow(
            &world,
            BlockPos::new(0, 64, 0),
            FluidType::Water,
            false,
            1,
        );
        assert!(updates.iter().all(|u| u.pos != BlockPos::new(1, 64, 0)));
    }

    #[test]
    fn lava_retreat_slowdown() {
        let mut world = GridWorld::flat(63);
        // A flowing lava cell whose best neighbor got shallower retreats;
        // a non-zero rand value quadruples its reschedule.
        world.set(BlockPos::new(0, 64, 0), vanilla::FLOWING_LAVA, 4);
        world.set(BlockPos::new(1, 64, 0), vanilla::FLOWING_LAVA, 2);
        let updates = calculate_flow(
            &world,
            BlockPos::new(1, 64, 0),
            FluidType::Lava,
            false,
            1,
        );
        let self_update = updates
            .iter()
            .find(|u| u.pos == BlockPos::new(1, 64, 0))
            .expect("retreat update");
        assert_eq!(self_update.schedule_delay, 120);
    }
}
