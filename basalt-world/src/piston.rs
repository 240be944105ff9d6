//! Piston push chains: the 13-block scan, the 12-block limit, and the
//! back-to-front move emission.

use basalt_registry::blocks::vanilla;
use basalt_registry::{PistonMobility, REGISTRY};
use basalt_utils::{BlockId, BlockPos, Direction};

/// Longest chain a piston can move.
pub const MAX_PUSH: usize = 12;

/// Read access the push computation needs.
pub trait PistonWorld {
    /// Block id at an absolute position.
    fn block(&self, pos: BlockPos) -> BlockId;
    /// Metadata at an absolute position.
    fn metadata(&self, pos: BlockPos) -> u8;
    /// Whether a tile entity occupies the position.
    fn has_tile_entity(&self, pos: BlockPos) -> bool;
}

/// Piston metadata helpers: orientation in the low three bits, the
/// extended flag on bit 3.
#[must_use]
pub const fn orientation(meta: u8) -> Option<Direction> {
    Direction::from_index(meta & 7)
}

/// Whether the piston base is extended.
#[must_use]
pub const fn is_extended(meta: u8) -> bool {
    meta & 8 != 0
}

/// One emitted move action, applied in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushAction {
    /// Destroy a destroy-on-push block (drop its item).
    Destroy {
        /// Position of the destroyed block.
        pos: BlockPos,
        /// What was there.
        block_id: BlockId,
    },
    /// Move a block one step along the push direction.
    Move {
        /// Source cell.
        from: BlockPos,
        /// Destination cell.
        to: BlockPos,
        /// The block being moved.
        block_id: BlockId,
        /// Its metadata.
        meta: u8,
    },
    /// Clear the vacated cell.
    Clear {
        /// Cell to clear.
        pos: BlockPos,
    },
}

/// Whether one block may be pushed. `can_destroy` distinguishes pushing
/// (destroyables break) from pulling (they stay).
fn can_push_block(world: &impl PistonWorld, pos: BlockPos, can_destroy: bool) -> bool {
    let id = world.block(pos);
    let block = REGISTRY.blocks.by_id_or_air(id);

    if id == vanilla::OBSIDIAN {
        return false;
    }
    if id == vanilla::PISTON || id == vanilla::STICKY_PISTON {
        // Extended pistons are anchored by their head.
        if is_extended(world.metadata(pos)) {
            return false;
        }
    }
    if block.hardness < 0.0 {
        return false;
    }
    match block.mobility {
        PistonMobility::Immovable => false,
        PistonMobility::Destroy => can_destroy,
        PistonMobility::Normal => !world.has_tile_entity(pos),
    }
}

/// Whether an extension in `direction` can happen at all: the scan stops
/// on air or a destroyable and aborts on an immovable or a 13th block.
#[must_use]
pub fn can_extend(world: &impl PistonWorld, piston: BlockPos, direction: Direction) -> bool {
    let mut pos = piston;
    for step in 0..=MAX_PUSH {
        pos = pos.relative(direction);
        let id = world.block(pos);
        if id.is_air() {
            return true;
        }
        if !can_push_block(world, pos, true) {
            return false;
        }
        let block = REGISTRY.blocks.by_id_or_air(id);
        if block.mobility == PistonMobility::Destroy {
            return true;
        }
        if step == MAX_PUSH {
            return false;
        }
    }
    false
}

/// Computes the push: collects up to 12 movable blocks ahead of the
/// piston and emits actions in back-to-front order, or `None` when the
/// push is blocked.
#[must_use]
pub fn compute_push(
    world: &impl PistonWorld,
    piston: BlockPos,
    direction: Direction,
) -> Option<Vec<PushAction>> {
    let mut chain: Vec<(BlockPos, BlockId, u8)> = Vec::new();
    let mut destroy_tail: Option<(BlockPos, BlockId)> = None;

    let mut pos = piston;
    for step in 0..=MAX_PUSH {
        pos = pos.relative(direction);
        let id = world.block(pos);
        if id.is_air() {
            break;
        }
        if !can_push_block(world, pos, true) {
            return None;
        }
        let block = REGISTRY.blocks.by_id_or_air(id);
        if block.mobility == PistonMobility::Destroy {
            destroy_tail = Some((pos, id));
            break;
        }
        if step == MAX_PUSH {
            return None;
        }
        chain.push((pos, id, world.metadata(pos)));
    }

    if chain.len() > MAX_PUSH {
        return None;
    }

    let mut actions = Vec::new();
    if let Some((pos, block_id)) = destroy_tail {
        actions.push(PushAction::Destroy { pos, block_id });
    }
    // Back to front: the farthest block moves first so nothing is
    // overwritten.
    for &(from, block_id, meta) in chain.iter().rev() {
        actions.push(PushAction::Move {
            from,
            to: from.relative(direction),
            block_id,
            meta,
        });
    }
    if let Some(&(first, _, _)) = chain.first() {
        actions.push(PushAction::Clear { pos: first });
    } else if destroy_tail.is_some() {
        // Nothing moved; the destroyed cell is where the head lands.
    }

    Some(actions)
}

/// Computes a sticky retraction: reads the block two cells ahead and pulls
/// it into the vacated head cell when pullable. Returns the pull move, or
/// `None` when the head cell simply clears.
#[must_use]
pub fn compute_sticky_pull(
    world: &impl PistonWorld,
    piston: BlockPos,
    direction: Direction,
) -> Option<PushAction> {
    let head = piston.relative(direction);
    let target = head.relative(direction);
    let id = world.block(target);
    if id.is_air() || !can_push_block(world, target, false) {
        return None;
    }
    Some(PushAction::Move {
        from: target,
        to: head,
        block_id: id,
        meta: world.metadata(target),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[derive(Default)]
    struct GridWorld {
        blocks: FxHashMap<BlockPos, (BlockId, u8)>,
        tiles: Vec<BlockPos>,
    }

    impl GridWorld {
        fn set(&mut self, pos: BlockPos, id: BlockId) {
            self.blocks.insert(pos, (id, 0));
        }

        fn multiset(&self) -> Vec<(BlockPos, BlockId, u8)> {
            let mut all: Vec<_> = self
                .blocks
                .iter()
                .map(|(&pos, &(id, meta))| (pos, id, meta))
                .collect();
            all.sort_unstable();
            all
        }

        fn apply(&mut self, actions: &[PushAction]) {
            for action in actions {
                match action {
                    PushAction::Destroy { pos, .. } | PushAction::Clear { pos } => {
                        self.blocks.remove(pos);
                    }
                    PushAction::Move {
                        from,
                        to,
                        block_id,
                        meta,
                    } => {
                        self.blocks.insert(*to, (*block_id, *meta));
                        self.blocks.remove(from);
                    }
                }
            }
        }
    }

    impl PistonWorld for GridWorld {
        fn block(&self, pos: BlockPos) -> BlockId {
            self.blocks.get(&pos).map_or(BlockId::AIR, |&(id, _)| id)
        }

        fn metadata(&self, pos: BlockPos) -> u8 {
            self.blocks.get(&pos).map_or(0, |&(_, meta)| meta)
        }

        fn has_tile_entity(&self, pos: BlockPos) -> bool {
            self.tiles.contains(&pos)
        }
    }

    const PISTON_POS: BlockPos = BlockPos::new(0, 64, 0);

    #[test]
    fn empty_face_extends_trivially() {
        let world = GridWorld::default();
        assert!(can_extend(&world, PISTON_POS, Direction::East));
        let actions = compute_push(&world, PISTON_POS, Direction::East).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn push_preserves_the_block_multiset_shifted_by_one() {
        let mut world = GridWorld::default();
        for x in 1..=3 {
            world.set(BlockPos::new(x, 64, 0), vanilla::STONE);
        }
        let before: Vec<BlockId> = world.multiset().iter().map(|&(_, id, _)| id).collect();

        let actions = compute_push(&world, PISTON_POS, Direction::East).unwrap();
        world.apply(&actions);

        let after = world.multiset();
        assert_eq!(
            after.iter().map(|&(_, id, _)| id).collect::<Vec<_>>(),
            before
        );
        // All three stones moved one step east.
        for x in 2..=4 {
            assert_eq!(world.block(BlockPos::new(x, 64, 0)), vanilla::STONE);
        }
        assert_eq!(world.block(BlockPos::new(1, 64, 0)), BlockId::AIR);
    }

    #[test]
    fn thirteen_blocks_abort() {
        let mut world = GridWorld::default();
        for x in 1..=13 {
            world.set(BlockPos::new(x, 64, 0), vanilla::STONE);
        }
        assert!(!can_extend(&world, PISTON_POS, Direction::East));
        assert!(compute_push(&world, PISTON_POS, Direction::East).is_none());

        // Twelve is fine.
        let mut world = GridWorld::default();
        for x in 1..=12 {
            world.set(BlockPos::new(x, 64, 0), vanilla::STONE);
        }
        assert!(can_extend(&world, PISTON_POS, Direction::East));
        assert!(compute_push(&world, PISTON_POS, Direction::East).is_some());
    }

    #[test]
    fn obsidian_blocks_the_chain() {
        let mut world = GridWorld::default();
        world.set(BlockPos::new(1, 64, 0), vanilla::STONE);
        world.set(BlockPos::new(2, 64, 0), vanilla::OBSIDIAN);
        assert!(compute_push(&world, PISTON_POS, Direction::East).is_none());
    }

    #[test]
    fn tile_entities_block_the_chain() {
        let mut world = GridWorld::default();
        world.set(BlockPos::new(1, 64, 0), vanilla::CHEST);
        world.tiles.push(BlockPos::new(1, 64, 0));
        assert!(compute_push(&world, PISTON_POS, Direction::East).is_none());
    }

    #[test]
    fn destroyables_break_at_the_chain_end() {
        let mut world = GridWorld::default();
        world.set(BlockPos::new(1, 64, 0), vanilla::STONE);
        world.set(BlockPos::new(2, 64, 0), vanilla::TORCH);
        let actions = compute_push(&world, PISTON_POS, Direction::East).unwrap();
        assert!(matches!(
            actions[0],
            PushAction::Destroy {
                pos: BlockPos { x: 2, y: 64, z: 0 },
                ..
            }
        ));
        world.apply(&actions);
        assert_eq!(world.block(BlockPos::new(2, 64, 0)), vanilla::STONE);
    }

    #[test]
    fn extended_piston_cannot_be_pushed() {
        let mut world = GridWorld::default();
        world
            .blocks
            .insert(BlockPos::new(1, 64, 0), (vanilla::PISTON, 8 | 3));
        assert!(compute_push(&world, PISTON_POS, Direction::East).is_none());

        // A retracted piston is pushable cargo.
        world
            .blocks
            .insert(BlockPos::new(1, 64, 0), (vanilla::PISTON, 3));
        assert!(compute_push(&world, PISTON_POS, Direction::East).is_some());
    }

    #[test]
    fn sticky_pull_reads_two_ahead() {
        let mut world = GridWorld::default();
        world.set(BlockPos::new(2, 64, 0), vanilla::STONE);
        let pull = compute_sticky_pull(&world, PISTON_POS, Direction::East).unwrap();
        assert_eq!(
            pull,
            PushAction::Move {
                from: BlockPos::new(2, 64, 0),
                to: BlockPos::new(1, 64, 0),
                block_id: vanilla::STONE,
                meta: 0,
            }
        );

        // Destroyables are not pulled.
        world.set(BlockPos::new(2, 64, 0), vanilla::TORCH);
        assert!(compute_sticky_pull(&world, PISTON_POS, Direction::East).is_none());
    }

    #[test]
    fn orientation_metadata() {
        assert_eq!(orientation(3), Some(Direction::South));
        assert_eq!(orientation(8 | 3), Some(Direction::South));
        assert!(is_extended(8 | 3));
        assert!(!is_extended(3));
        assert_eq!(orientation(7), None);
    }
}
