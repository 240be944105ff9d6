//! Block behavior dispatch: one entry per registered block id, defaults
//! for the rest.
//!
//! Behavior is how the tick engines reach block-specific logic (fluid
//! flow on scheduled ticks, piston arms on block events) without the
//! engines knowing any block by name.

use basalt_registry::REGISTRY;
use basalt_registry::blocks::vanilla;
use basalt_utils::{BlockId, BlockPos};

use crate::fluid::{self, FluidType};
use crate::piston::{self, PushAction};
use crate::tick::BlockEvent;
use crate::tile_entity::{TileEntity, TileEntityData};
use crate::world::{World, WorldFluidView, WorldPistonView};

/// Dynamic block behavior. Every hook has a no-op default.
pub trait BlockBehavior: Send + Sync {
    /// A scheduled update fired for this block.
    fn on_scheduled_tick(&self, world: &World, pos: BlockPos, id: BlockId) {
        let _ = (world, pos, id);
    }

    /// A random tick landed on this block.
    fn on_random_tick(&self, world: &World, pos: BlockPos, id: BlockId) {
        let _ = (world, pos, id);
    }

    /// A block event arrived; return `true` to forward it to clients.
    fn on_block_event(&self, world: &World, event: &BlockEvent) -> bool {
        let _ = (world, event);
        false
    }

    /// A neighboring block changed.
    fn on_neighbor_changed(&self, world: &World, pos: BlockPos, id: BlockId, source: BlockId) {
        let _ = (world, pos, id, source);
    }
}

/// The do-nothing default.
struct DefaultBehavior;

impl BlockBehavior for DefaultBehavior {}

/// Water and lava: scheduled ticks drive the flow, neighbor changes
/// re-arm the tick and trigger the lava/water interaction.
struct FluidBehavior {
    fluid: FluidType,
}

impl BlockBehavior for FluidBehavior {
    fn on_scheduled_tick(&self, world: &World, pos: BlockPos, _id: BlockId) {
        let is_nether = world.dimension.is_nether();
        let rand_value = world.roll(4);
        let updates = {
            let view = WorldFluidView { world };
            fluid::calculate_flow(&view, pos, self.fluid, is_nether, rand_value)
        };
        for update in updates {
            world.set_block(update.pos, update.block_id, update.meta);
            if update.schedule_delay > 0 {
                world.schedule_block_update(update.pos, update.block_id, update.schedule_delay);
            }
            if update.fizz {
                log::debug!("fluid fizz at {}", update.pos);
            }
        }
    }

    fn on_random_tick(&self, world: &World, pos: BlockPos, id: BlockId) {
        // Still fluids re-arm themselves occasionally so orphaned columns
        // settle even without neighbor changes.
        if !world.is_update_scheduled(pos, id) {
            world.schedule_block_update(pos, id, self.fluid.tick_rate(world.dimension.is_nether()));
        }
    }

    fn on_neighbor_changed(&self, world: &World, pos: BlockPos, id: BlockId, _source: BlockId) {
        if self.fluid == FluidType::Lava {
            let view = WorldFluidView { world };
            if let Some(result) = fluid::lava_water_interaction(&view, pos) {
                world.set_block(pos, result, 0);
                return;
            }
        }
        if !world.is_update_scheduled(pos, id) {
            world.schedule_block_update(pos, id, self.fluid.tick_rate(world.dimension.is_nether()));
        }
    }
}

/// Piston bases: block events carry extend (0) and retract (1) requests.
struct PistonBehavior {
    sticky: bool,
}

impl PistonBehavior {
    fn apply_actions(world: &World, actions: &[PushAction]) {
        for action in actions {
            match action {
                PushAction::Destroy { pos, .. } | PushAction::Clear { pos } => {
                    world.set_block(*pos, BlockId::AIR, 0);
                }
                PushAction::Move {
                    from,
                    to,
                    block_id,
                    meta,
                } => {
                    world.set_block(*to, *block_id, *meta);
                    world.set_block(*from, BlockId::AIR, 0);
                }
            }
        }
    }
}

impl BlockBehavior for PistonBehavior {
    fn on_block_event(&self, world: &World, event: &BlockEvent) -> bool {
        let Some(direction) = piston::orientation(world.metadata(event.pos)) else {
            return false;
        };

        if event.event_id == 0 {
            // Extend.
            let actions = {
                let view = WorldPistonView { world };
                piston::compute_push(&view, event.pos, direction)
            };
            let Some(actions) = actions else {
                return false;
            };
            Self::apply_actions(world, &actions);

            let head = event.pos.relative(direction);
            let head_meta = direction.index() | if self.sticky { 8 } else { 0 };
            world.set_block(head, vanilla::PISTON_HEAD, head_meta);
            if let Some(column) = world.provider.get_chunk_if_loaded(head.x >> 4, head.z >> 4) {
                column.write().set_tile_entity(TileEntity::new(
                    head,
                    TileEntityData::PistonMoving {
                        stored_block: vanilla::PISTON_HEAD,
                        stored_meta: head_meta,
                        facing: direction.index(),
                        extending: true,
                        progress: 0.0,
                    },
                ));
            }
            world.set_metadata(event.pos, direction.index() | 8);
            true
        } else {
            // Retract: clear the head, then sticky bases pull.
            let head = event.pos.relative(direction);
            let pull = if self.sticky {
                let view = WorldPistonView { world };
                piston::compute_sticky_pull(&view, event.pos, direction)
            } else {
                None
            };

            world.set_block(head, BlockId::AIR, 0);
            if let Some(action) = pull {
                Self::apply_actions(world, &[action]);
            }
            world.set_metadata(event.pos, direction.index());
            true
        }
    }

    fn on_neighbor_changed(&self, world: &World, pos: BlockPos, id: BlockId, _source: BlockId) {
        // Without a redstone graph the power check is level-driven by the
        // caller; pistons only validate their orientation here.
        let _ = (world, pos, id);
    }
}

/// Falling blocks re-check support on their scheduled tick.
struct FallingBehavior;

impl BlockBehavior for FallingBehavior {
    fn on_scheduled_tick(&self, world: &World, pos: BlockPos, id: BlockId) {
        let below = world.block(pos.down());
        let supported = REGISTRY.blocks.by_id_or_air(below).blocks_movement();
        if !supported && pos.y > 0 {
            // Teleport-fall: walk down to the first support.
            let mut target = pos.down();
            while target.y > 0 && !REGISTRY.blocks.by_id_or_air(world.block(target.down())).blocks_movement()
            {
                target = target.down();
            }
            let meta = world.metadata(pos);
            world.set_block(pos, BlockId::AIR, 0);
            world.set_block(target, id, meta);
        }
    }

    fn on_neighbor_changed(&self, world: &World, pos: BlockPos, id: BlockId, _source: BlockId) {
        if !world.is_update_scheduled(pos, id) {
            let rate = i64::from(REGISTRY.blocks.by_id_or_air(id).tick_rate.max(2));
            world.schedule_block_update(pos, id, rate);
        }
    }
}

/// The behavior table, indexed by block id.
pub struct BehaviorRegistry {
    behaviors: Vec<Box<dyn BlockBehavior>>,
    fallback: DefaultBehavior,
}

impl BehaviorRegistry {
    /// Builds the vanilla table: defaults everywhere, overridden for
    /// fluids, pistons and falling blocks.
    #[must_use]
    pub fn new() -> Self {
        let max_id = REGISTRY.blocks.iter().map(|b| b.id).max().unwrap_or(0) as usize;
        let mut behaviors: Vec<Box<dyn BlockBehavior>> = Vec::with_capacity(max_id + 1);
        for _ in 0..=max_id {
            behaviors.push(Box::new(DefaultBehavior));
        }

        let mut set = |id: BlockId, behavior: Box<dyn BlockBehavior>| {
            behaviors[id.0 as usize] = behavior;
        };
        set(vanilla::FLOWING_WATER, Box::new(FluidBehavior { fluid: FluidType::Water }));
        set(vanilla::WATER, Box::new(FluidBehavior { fluid: FluidType::Water }));
        set(vanilla::FLOWING_LAVA, Box::new(FluidBehavior { fluid: FluidType::Lava }));
        set(vanilla::LAVA, Box::new(FluidBehavior { fluid: FluidType::Lava }));
        set(vanilla::PISTON, Box::new(PistonBehavior { sticky: false }));
        set(vanilla::STICKY_PISTON, Box::new(PistonBehavior { sticky: true }));
        set(vanilla::SAND, Box::new(FallingBehavior));
        set(vanilla::GRAVEL, Box::new(FallingBehavior));

        Self {
            behaviors,
            fallback: DefaultBehavior,
        }
    }

    /// The behavior for a block id; unregistered ids get the default.
    #[must_use]
    pub fn for_block(&self, id: BlockId) -> &dyn BlockBehavior {
        self.behaviors
            .get(id.0 as usize)
            .map_or(&self.fallback as &dyn BlockBehavior, Box::as_ref)
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Dimension;
    use basalt_gen::{ChunkGenerator, PopulateWorld, RawChunk};
    use basalt_utils::{ChunkPos, Direction};
    use std::sync::Arc;

    struct FlatGenerator;

    impl ChunkGenerator for FlatGenerator {
        fn generate(&self, _pos: ChunkPos) -> RawChunk {
            let mut chunk = RawChunk::empty();
            for x in 0..16 {
                for z in 0..16 {
                    for y in 0..64 {
                        chunk.set_block(x, y, z, vanilla::STONE);
                    }
                }
            }
            chunk
        }

        fn populate(&self, _world: &mut dyn PopulateWorld, _pos: ChunkPos) {}
    }

    fn world() -> World {
        let world = World::new(
            Dimension::Overworld,
            7,
            Arc::new(FlatGenerator),
            None,
            0,
        )
        .expect("ram world");
        for cx in -2..=2 {
            for cz in -2..=2 {
                let _ = world.provider.provide_chunk(cx, cz);
            }
        }
        world
    }

    #[test]
    fn piston_extend_event_moves_the_chain() {
        let world = world();
        let piston_pos = BlockPos::new(0, 70, 0);
        // An east-facing piston with two stones ahead.
        world.set_block(piston_pos, vanilla::PISTON, Direction::East.index());
        world.set_block(BlockPos::new(1, 70, 0), vanilla::STONE, 0);
        world.set_block(BlockPos::new(2, 70, 0), vanilla::STONE, 0);

        world.add_block_event(piston_pos, vanilla::PISTON, 0, i32::from(Direction::East.index()));
        world.tick();

        assert_eq!(world.block(BlockPos::new(1, 70, 0)), vanilla::PISTON_HEAD);
        assert_eq!(world.block(BlockPos::new(2, 70, 0)), vanilla::STONE);
        assert_eq!(world.block(BlockPos::new(3, 70, 0)), vanilla::STONE);
        assert!(piston::is_extended(world.metadata(piston_pos)));
    }

    #[test]
    fn sticky_piston_retract_pulls_one_block() {
        let world = world();
        let piston_pos = BlockPos::new(0, 70, 0);
        world.set_block(piston_pos, vanilla::STICKY_PISTON, Direction::East.index() | 8);
        world.set_block(BlockPos::new(1, 70, 0), vanilla::PISTON_HEAD, Direction::East.index() | 8);
        world.set_block(BlockPos::new(2, 70, 0), vanilla::STONE, 0);

        world.add_block_event(piston_pos, vanilla::STICKY_PISTON, 1, i32::from(Direction::East.index()));
        world.tick();

        assert_eq!(world.block(BlockPos::new(1, 70, 0)), vanilla::STONE);
        assert_eq!(world.block(BlockPos::new(2, 70, 0)), BlockId::AIR);
        assert!(!piston::is_extended(world.metadata(piston_pos)));
    }

    #[test]
    fn sand_falls_to_support() {
        let world = world();
        let sand_pos = BlockPos::new(0, 80, 0);
        world.set_block(sand_pos, vanilla::SAND, 0);
        world.schedule_block_update(sand_pos, vanilla::SAND, 2);
        for _ in 0..3 {
            world.tick();
        }
        assert_eq!(world.block(sand_pos), BlockId::AIR);
        assert_eq!(world.block(BlockPos::new(0, 64, 0)), vanilla::SAND);
    }
}
