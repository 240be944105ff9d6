//! The scheduled block-update queue.
//!
//! Two synchronized collections share membership: an ordered set keyed by
//! `(scheduledTime, priority, insertionSeq)` and a hash set keyed by
//! `(x, y, z, blockId)` for O(1) de-duplication. Scheduling a position and
//! block that are already pending is a no-op.

use std::collections::BTreeSet;

use basalt_utils::{BlockId, BlockPos, ChunkPos};
use rustc_hash::FxHashSet;

use crate::chunk::nbt::SavedTick;

/// Cap on ticks executed per world tick.
const MAX_TICKS_PER_STEP: usize = 1000;

/// One scheduled block update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTick {
    /// Target position.
    pub pos: BlockPos,
    /// Target block id; the executor skips stale entries whose block
    /// changed.
    pub block_id: BlockId,
    /// Absolute world time when due.
    pub scheduled_time: i64,
    /// Lower fires first among equal times.
    pub priority: i32,
    /// Insertion sequence breaking remaining ties, for deterministic
    /// replay.
    pub sequence: i64,
}

/// Strict total order: time, then priority, then insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct OrderKey {
    scheduled_time: i64,
    priority: i32,
    sequence: i64,
}

impl ScheduledTick {
    const fn order_key(&self) -> OrderKey {
        OrderKey {
            scheduled_time: self.scheduled_time,
            priority: self.priority,
            sequence: self.sequence,
        }
    }

    const fn dedup_key(&self) -> (i32, i32, i32, u16) {
        (self.pos.x, self.pos.y, self.pos.z, self.block_id.0)
    }
}

/// The scheduler.
pub struct TickScheduler {
    ordered: BTreeSet<OrderKey>,
    entries: rustc_hash::FxHashMap<OrderKey, ScheduledTick>,
    membership: FxHashSet<(i32, i32, i32, u16)>,
    pending_this_tick: Vec<ScheduledTick>,
    next_sequence: i64,
}

impl TickScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ordered: BTreeSet::new(),
            entries: rustc_hash::FxHashMap::default(),
            membership: FxHashSet::default(),
            pending_this_tick: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Schedules an update `delay` ticks from `world_time` at default
    /// priority.
    pub fn schedule(&mut self, pos: BlockPos, block_id: BlockId, delay: i64, world_time: i64) {
        self.schedule_with_priority(pos, block_id, delay, 0, world_time);
    }

    /// Schedules an update with an explicit priority. Duplicate
    /// `(pos, block)` entries are dropped.
    pub fn schedule_with_priority(
        &mut self,
        pos: BlockPos,
        block_id: BlockId,
        delay: i64,
        priority: i32,
        world_time: i64,
    ) {
        let tick = ScheduledTick {
            pos,
            block_id,
            scheduled_time: world_time + delay,
            priority,
            sequence: self.next_sequence,
        };
        if self.membership.insert(tick.dedup_key()) {
            self.next_sequence += 1;
            self.ordered.insert(tick.order_key());
            self.entries.insert(tick.order_key(), tick);
        }
    }

    /// Whether a `(pos, block)` update is pending.
    #[must_use]
    pub fn is_scheduled(&self, pos: BlockPos, block_id: BlockId) -> bool {
        self.membership
            .contains(&(pos.x, pos.y, pos.z, block_id.0))
    }

    /// Whether the `(pos, block)` update is in the snapshot being executed
    /// this tick.
    #[must_use]
    pub fn is_scheduled_this_tick(&self, pos: BlockPos, block_id: BlockId) -> bool {
        self.pending_this_tick
            .iter()
            .any(|tick| tick.pos == pos && tick.block_id == block_id)
    }

    /// Pops every entry due at `world_time` (all entries with `force_all`),
    /// capped at 1000, into the this-tick snapshot and returns it. The
    /// caller executes the snapshot and batches reschedules.
    pub fn process_ticks(&mut self, world_time: i64, force_all: bool) -> Vec<ScheduledTick> {
        if self.ordered.len() != self.membership.len() {
            // A violated size invariant is repaired rather than fatal.
            log::error!(
                "scheduled tick sets out of sync ({} ordered vs {} members); rebuilding",
                self.ordered.len(),
                self.membership.len()
            );
            self.membership = self
                .entries
                .values()
                .map(ScheduledTick::dedup_key)
                .collect();
        }

        let cap = self.ordered.len().min(MAX_TICKS_PER_STEP);
        self.pending_this_tick.clear();

        for _ in 0..cap {
            let Some(&key) = self.ordered.first() else { break };
            if !force_all && key.scheduled_time > world_time {
                break;
            }
            self.ordered.remove(&key);
            if let Some(tick) = self.entries.remove(&key) {
                self.membership.remove(&tick.dedup_key());
                self.pending_this_tick.push(tick);
            }
        }

        self.pending_this_tick.clone()
    }

    /// Clears the this-tick snapshot once execution finishes.
    pub fn finish_tick(&mut self) {
        self.pending_this_tick.clear();
    }

    /// Collects entries whose `(x, z)` fall inside the 18×18 footprint
    /// centred on a chunk; with `remove` they are deleted atomically. Used
    /// to drain on chunk save and restore on load.
    pub fn ticks_in_chunk(&mut self, chunk: ChunkPos, remove: bool) -> Vec<ScheduledTick> {
        let min_x = (chunk.x << 4) - 2;
        let max_x = min_x + 16 + 2;
        let min_z = (chunk.z << 4) - 2;
        let max_z = min_z + 16 + 2;
        let in_range = |tick: &ScheduledTick| {
            tick.pos.x >= min_x && tick.pos.x < max_x && tick.pos.z >= min_z && tick.pos.z < max_z
        };

        let mut found: Vec<ScheduledTick> = self
            .entries
            .values()
            .filter(|tick| in_range(tick))
            .copied()
            .collect();
        found.sort_unstable_by_key(ScheduledTick::order_key);

        if remove {
            for tick in &found {
                self.ordered.remove(&tick.order_key());
                self.entries.remove(&tick.order_key());
                self.membership.remove(&tick.dedup_key());
            }
            let mut drained: Vec<ScheduledTick> = self
                .pending_this_tick
                .iter()
                .filter(|tick| in_range(tick))
                .copied()
                .collect();
            self.pending_this_tick.retain(|tick| !in_range(tick));
            found.append(&mut drained);
        } else {
            found.extend(self.pending_this_tick.iter().filter(|t| in_range(t)));
        }

        found
    }

    /// Converts a chunk's entries into save records with delays relative
    /// to `world_time`, removing them from the queue.
    pub fn drain_chunk_for_save(&mut self, chunk: ChunkPos, world_time: i64) -> Vec<SavedTick> {
        self.ticks_in_chunk(chunk, true)
            .into_iter()
            .map(|tick| SavedTick {
                block_id: i32::from(tick.block_id.0),
                pos: tick.pos,
                delay: (tick.scheduled_time - world_time) as i32,
                priority: tick.priority,
            })
            .collect()
    }

    /// Snapshot variant of [`TickScheduler::drain_chunk_for_save`] that
    /// leaves the queue intact, for incremental saves of loaded chunks.
    pub fn snapshot_chunk_for_save(&mut self, chunk: ChunkPos, world_time: i64) -> Vec<SavedTick> {
        self.ticks_in_chunk(chunk, false)
            .into_iter()
            .map(|tick| SavedTick {
                block_id: i32::from(tick.block_id.0),
                pos: tick.pos,
                delay: (tick.scheduled_time - world_time) as i32,
                priority: tick.priority,
            })
            .collect()
    }

    /// Restores saved ticks relative to the current world time.
    pub fn restore(&mut self, saved: &[SavedTick], world_time: i64) {
        for tick in saved {
            self.schedule_with_priority(
                tick.pos,
                BlockId(tick.block_id as u16),
                i64::from(tick.delay),
                tick.priority,
                world_time,
            );
        }
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_registry::blocks::vanilla;

    #[test]
    fn duplicate_scheduling_is_a_noop() {
        let mut scheduler = TickScheduler::new();
        let pos = BlockPos::new(5, 5, 5);
        scheduler.schedule(pos, vanilla::FLOWING_WATER, 10, 0);
        scheduler.schedule(pos, vanilla::FLOWING_WATER, 10, 0);
        scheduler.schedule(pos, vanilla::FLOWING_WATER, 10, 0);
        assert_eq!(scheduler.len(), 1);

        let fired = scheduler.process_ticks(10, false);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].pos, pos);
    }

    #[test]
    fn same_pos_different_block_is_not_a_duplicate() {
        let mut scheduler = TickScheduler::new();
        let pos = BlockPos::new(1, 2, 3);
        scheduler.schedule(pos, vanilla::FLOWING_WATER, 5, 0);
        scheduler.schedule(pos, vanilla::FLOWING_LAVA, 5, 0);
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn ordering_time_then_priority_then_sequence() {
        let mut scheduler = TickScheduler::new();
        scheduler.schedule_with_priority(BlockPos::new(0, 0, 0), vanilla::STONE, 10, 1, 0);
        scheduler.schedule_with_priority(BlockPos::new(1, 0, 0), vanilla::STONE, 10, -1, 0);
        scheduler.schedule_with_priority(BlockPos::new(2, 0, 0), vanilla::STONE, 5, 5, 0);
        scheduler.schedule_with_priority(BlockPos::new(3, 0, 0), vanilla::STONE, 10, 1, 0);

        let fired = scheduler.process_ticks(20, false);
        let order: Vec<i32> = fired.iter().map(|t| t.pos.x).collect();
        // Earliest time first, then priority, then insertion.
        assert_eq!(order, vec![2, 1, 0, 3]);
    }

    #[test]
    fn future_ticks_stay_queued() {
        let mut scheduler = TickScheduler::new();
        scheduler.schedule(BlockPos::new(0, 0, 0), vanilla::STONE, 100, 0);
        assert!(scheduler.process_ticks(50, false).is_empty());
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.process_ticks(100, false).len(), 1);
    }

    #[test]
    fn force_all_ignores_time() {
        let mut scheduler = TickScheduler::new();
        scheduler.schedule(BlockPos::new(0, 0, 0), vanilla::STONE, 1000, 0);
        assert_eq!(scheduler.process_ticks(0, true).len(), 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn rescheduling_after_fire_is_allowed() {
        let mut scheduler = TickScheduler::new();
        let pos = BlockPos::new(9, 9, 9);
        scheduler.schedule(pos, vanilla::FLOWING_WATER, 0, 0);
        let fired = scheduler.process_ticks(0, false);
        assert_eq!(fired.len(), 1);
        scheduler.finish_tick();
        scheduler.schedule(pos, vanilla::FLOWING_WATER, 5, 0);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn chunk_footprint_is_18_by_18() {
        let mut scheduler = TickScheduler::new();
        // Inside the 2-block margin west of chunk (0,0).
        scheduler.schedule(BlockPos::new(-2, 0, 0), vanilla::STONE, 5, 0);
        // Outside it.
        scheduler.schedule(BlockPos::new(-3, 0, 0), vanilla::STONE, 5, 0);
        scheduler.schedule(BlockPos::new(8, 0, 8), vanilla::STONE, 5, 0);

        let found = scheduler.ticks_in_chunk(ChunkPos::new(0, 0), false);
        assert_eq!(found.len(), 2);
        assert_eq!(scheduler.len(), 3);

        let drained = scheduler.ticks_in_chunk(ChunkPos::new(0, 0), true);
        assert_eq!(drained.len(), 2);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn save_restore_round_trip() {
        let mut scheduler = TickScheduler::new();
        let pos = BlockPos::new(4, 64, 4);
        scheduler.schedule_with_priority(pos, vanilla::FLOWING_WATER, 30, 2, 100);
        let saved = scheduler.drain_chunk_for_save(ChunkPos::new(0, 0), 110);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].delay, 20);
        assert!(scheduler.is_empty());

        scheduler.restore(&saved, 500);
        let fired = scheduler.process_ticks(520, false);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].priority, 2);
    }

    #[test]
    fn snapshot_visibility_during_execution() {
        let mut scheduler = TickScheduler::new();
        let pos = BlockPos::new(7, 7, 7);
        scheduler.schedule(pos, vanilla::STONE, 0, 0);
        let _snapshot = scheduler.process_ticks(0, false);
        assert!(scheduler.is_scheduled_this_tick(pos, vanilla::STONE));
        assert!(!scheduler.is_scheduled(pos, vanilla::STONE));
        scheduler.finish_tick();
        assert!(!scheduler.is_scheduled_this_tick(pos, vanilla::STONE));
    }
}
