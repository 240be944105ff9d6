//! The chunk provider: in-memory cache, async load/generate/save, the
//! spawn-area pin and the pending-drop queue.
//!
//! One reader-writer lock guards the cache map and a plain mutex guards
//! the drop set. No lock is held across I/O; workers receive value copies
//! and results come back through the pool's channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::{Duration, Instant};

use basalt_gen::{ChunkGenerator, PopulateWorld};
use basalt_registry::REGISTRY;
use basalt_utils::locks::{SyncMutex, SyncRwLock};
use basalt_utils::{BlockId, ChunkPos};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::chunk::column::ChunkColumn;
use crate::chunk::io::{ChunkIoPool, LoadResult, load_or_generate};
use crate::chunk::nbt::{self, SavedTick};
use crate::chunk::region::RegionStore;

/// Blocks' worth of spawn-area pinning on each side of the spawn point.
const SPAWN_PIN_RADIUS: i32 = 128;
/// Chunks unloaded per `unload_queued_chunks` call.
const UNLOADS_PER_SWEEP: usize = 100;
/// Chunks saved per incremental save sweep.
const SAVES_PER_SWEEP: usize = 24;

/// A shared handle to a cached chunk column.
pub type SharedColumn = Arc<SyncRwLock<ChunkColumn>>;

/// Failure to produce a chunk.
#[derive(Debug, Error)]
pub enum ChunkLoadError {
    /// Both the disk and the generator failed.
    #[error("chunk load failed for ({0}, {1})")]
    ChunkLoadFailed(i32, i32),
}

/// A world-gen creature spawn requested by the populate pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSpawn {
    /// Entity type name.
    pub name: String,
    /// Spawn position.
    pub x: f64,
    /// Spawn position.
    pub y: f64,
    /// Spawn position.
    pub z: f64,
}

/// The chunk provider.
pub struct ChunkProvider {
    has_sky: bool,
    /// When false, `provide_chunk` hands out uncached proxies instead of
    /// loading.
    pub chunk_load_override: AtomicBool,
    cache: SyncRwLock<FxHashMap<u64, SharedColumn>>,
    loaded_coords: SyncMutex<Vec<ChunkPos>>,
    dropped: SyncMutex<FxHashSet<u64>>,
    generator: Arc<dyn ChunkGenerator>,
    storage: Option<Arc<RegionStore>>,
    io: Option<ChunkIoPool>,
    load_timeout: Duration,
    can_respawn_here: AtomicBool,
    spawn_x: AtomicI32,
    spawn_z: AtomicI32,
    disable_level_saving: AtomicBool,
    restored_ticks: SyncMutex<Vec<SavedTick>>,
    pending_spawns: SyncMutex<Vec<PendingSpawn>>,
}

impl ChunkProvider {
    /// Creates a provider. `io_workers = 0` keeps loads synchronous on the
    /// calling thread, which tests and tools use.
    #[must_use]
    pub fn new(
        generator: Arc<dyn ChunkGenerator>,
        storage: Option<Arc<RegionStore>>,
        has_sky: bool,
        io_workers: usize,
        load_timeout: Duration,
    ) -> Self {
        let io = (io_workers > 0).then(|| {
            ChunkIoPool::new(
                storage.clone(),
                Arc::clone(&generator),
                has_sky,
                io_workers,
            )
        });
        Self {
            has_sky,
            chunk_load_override: AtomicBool::new(true),
            cache: SyncRwLock::new(FxHashMap::default()),
            loaded_coords: SyncMutex::new(Vec::new()),
            dropped: SyncMutex::new(FxHashSet::default()),
            generator,
            storage,
            io,
            load_timeout,
            can_respawn_here: AtomicBool::new(true),
            spawn_x: AtomicI32::new(0),
            spawn_z: AtomicI32::new(0),
            disable_level_saving: AtomicBool::new(false),
            restored_ticks: SyncMutex::new(Vec::new()),
            pending_spawns: SyncMutex::new(Vec::new()),
        }
    }

    /// Updates the spawn pin.
    pub fn set_spawn(&self, x: i32, z: i32, can_respawn: bool) {
        self.spawn_x.store(x, Ordering::Relaxed);
        self.spawn_z.store(z, Ordering::Relaxed);
        self.can_respawn_here.store(can_respawn, Ordering::Relaxed);
    }

    /// Toggles the save path entirely.
    pub fn set_level_saving_disabled(&self, disabled: bool) {
        self.disable_level_saving.store(disabled, Ordering::Relaxed);
    }

    /// True iff the chunk is in the cache.
    #[must_use]
    pub fn chunk_exists(&self, x: i32, z: i32) -> bool {
        self.cache
            .read()
            .contains_key(&ChunkPos::new(x, z).as_key())
    }

    /// Number of cached chunks.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns a cached chunk without triggering a load.
    #[must_use]
    pub fn get_chunk_if_loaded(&self, x: i32, z: i32) -> Option<SharedColumn> {
        self.cache
            .read()
            .get(&ChunkPos::new(x, z).as_key())
            .cloned()
    }

    /// Read-only iteration over every cached chunk.
    pub fn for_each_loaded_chunk(&self, mut f: impl FnMut(&ChunkColumn)) {
        let cache = self.cache.read();
        for column in cache.values() {
            f(&column.read());
        }
    }

    /// Returns a ready-to-use column, loading or generating as needed.
    /// With loading overridden off, absent chunks yield uncached proxies.
    #[must_use]
    pub fn provide_chunk(&self, x: i32, z: i32) -> SharedColumn {
        if let Some(column) = self.get_chunk_if_loaded(x, z) {
            return column;
        }
        if self.chunk_load_override.load(Ordering::Relaxed) {
            match self.load_chunk(x, z) {
                Ok(column) => column,
                Err(e) => {
                    log::error!("{e}; substituting proxy chunk");
                    Arc::new(SyncRwLock::new(ChunkColumn::proxy(
                        ChunkPos::new(x, z),
                        self.has_sky,
                    )))
                }
            }
        } else {
            Arc::new(SyncRwLock::new(ChunkColumn::proxy(
                ChunkPos::new(x, z),
                self.has_sky,
            )))
        }
    }

    /// Loads a chunk: disk first, generator on a miss, then cache insert
    /// and the populate check. Synchronous demands wait up to the
    /// configured timeout before substituting a proxy that the async
    /// result later replaces.
    pub fn load_chunk(&self, x: i32, z: i32) -> Result<SharedColumn, ChunkLoadError> {
        let pos = ChunkPos::new(x, z);
        self.dropped.lock().remove(&pos.as_key());

        if let Some(column) = self.get_chunk_if_loaded(x, z) {
            return Ok(column);
        }

        let result = if let Some(io) = &self.io {
            io.submit_load(pos);
            let deadline = Instant::now() + self.load_timeout;
            let mut our_result = None;
            while our_result.is_none() {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                match io.recv_result_timeout(remaining) {
                    Some(result) if result.pos == pos => our_result = Some(result),
                    Some(result) => self.apply_async_result(result),
                    None => break,
                }
            }
            match our_result {
                Some(result) => result,
                None => {
                    // Deadline expired: pin a proxy; the worker's result
                    // replaces it in pump_io.
                    let proxy = ChunkColumn::proxy(pos, self.has_sky);
                    return Ok(self.insert_column(proxy, Vec::new()));
                }
            }
        } else {
            load_or_generate(self.storage.as_deref(), &self.generator, self.has_sky, pos)
        };

        let LoadResult { column, ticks, .. } = result;
        let shared = self.insert_column(column, ticks);
        self.try_populate_around(pos);
        Ok(shared)
    }

    /// Drains async results: proxies are replaced in place, results for
    /// evicted keys are dropped. Called at the top of each world tick.
    pub fn pump_io(&self) {
        let Some(io) = &self.io else { return };
        for result in io.drain_results() {
            self.apply_async_result(result);
        }
    }

    fn apply_async_result(&self, result: LoadResult) {
        let key = result.pos.as_key();
        let existing = self.cache.read().get(&key).cloned();
        match existing {
            Some(shared) => {
                let mut column = shared.write();
                if column.is_proxy {
                    let pos = result.pos;
                    *column = result.column;
                    drop(column);
                    self.restored_ticks.lock().extend(result.ticks);
                    self.try_populate_around(pos);
                }
                // A live column at this key means the load was superseded.
            }
            // Evicted since the request: drop the result on the floor.
            None => {}
        }
    }

    fn insert_column(&self, column: ChunkColumn, ticks: Vec<SavedTick>) -> SharedColumn {
        let pos = column.pos;
        let shared = Arc::new(SyncRwLock::new(column));
        {
            let mut cache = self.cache.write();
            if let Some(existing) = cache.get(&pos.as_key()) {
                // Raced with another loader; keep the existing entry.
                return Arc::clone(existing);
            }
            cache.insert(pos.as_key(), Arc::clone(&shared));
        }
        self.loaded_coords.lock().push(pos);
        self.restored_ticks.lock().extend(ticks);
        shared
    }

    /// Ticks restored from disk since the last drain, for the scheduler.
    #[must_use]
    pub fn take_restored_ticks(&self) -> Vec<SavedTick> {
        std::mem::take(&mut self.restored_ticks.lock())
    }

    /// World-gen spawns requested since the last drain.
    #[must_use]
    pub fn take_pending_spawns(&self) -> Vec<PendingSpawn> {
        std::mem::take(&mut self.pending_spawns.lock())
    }

    /// Runs the populate pass for every 2×2 quad around `pos` that just
    /// became complete. Population touches the quad's four chunks only.
    fn try_populate_around(&self, pos: ChunkPos) {
        for (ax, az) in [
            (pos.x, pos.z),
            (pos.x - 1, pos.z),
            (pos.x, pos.z - 1),
            (pos.x - 1, pos.z - 1),
        ] {
            self.try_populate(ChunkPos::new(ax, az));
        }
    }

    fn try_populate(&self, anchor: ChunkPos) {
        let quad = [
            (anchor.x, anchor.z),
            (anchor.x + 1, anchor.z),
            (anchor.x, anchor.z + 1),
            (anchor.x + 1, anchor.z + 1),
        ];
        let mut columns = Vec::with_capacity(4);
        for (x, z) in quad {
            match self.get_chunk_if_loaded(x, z) {
                Some(column) if !column.read().is_proxy => columns.push(column),
                _ => return,
            }
        }
        {
            let anchor_column = columns[0].read();
            if anchor_column.terrain_populated {
                return;
            }
        }

        let mut world = ProviderPopulateWorld { provider: self };
        self.generator.populate(&mut world, anchor);

        for column in &columns {
            let mut column = column.write();
            column.rebuild_height_map();
            column.generate_sky_light();
        }
        let mut anchor_column = columns[0].write();
        anchor_column.terrain_populated = true;
        anchor_column.is_modified = true;
    }

    /// Queues a chunk for unloading unless the spawn pin protects it.
    pub fn drop_chunk(&self, x: i32, z: i32) {
        if self.can_respawn_here.load(Ordering::Relaxed) {
            let dx = x * 16 + 8 - self.spawn_x.load(Ordering::Relaxed);
            let dz = z * 16 + 8 - self.spawn_z.load(Ordering::Relaxed);
            if (-SPAWN_PIN_RADIUS..=SPAWN_PIN_RADIUS).contains(&dx)
                && (-SPAWN_PIN_RADIUS..=SPAWN_PIN_RADIUS).contains(&dz)
            {
                return;
            }
        }
        self.dropped.lock().insert(ChunkPos::new(x, z).as_key());
    }

    /// Queues every cached chunk for unloading (spawn pin still applies).
    pub fn unload_all_chunks(&self) {
        let coords: Vec<ChunkPos> = {
            let cache = self.cache.read();
            cache.values().map(|column| column.read().pos).collect()
        };
        for pos in coords {
            self.drop_chunk(pos.x, pos.z);
        }
    }

    /// Services up to 100 queued drops: save, then evict.
    /// `drain_ticks` hands over each chunk's pending scheduled ticks.
    pub fn unload_queued_chunks(
        &self,
        world_time: i64,
        drain_ticks: &mut dyn FnMut(ChunkPos) -> Vec<SavedTick>,
    ) {
        if self.disable_level_saving.load(Ordering::Relaxed) {
            return;
        }

        let keys: Vec<u64> = {
            let mut dropped = self.dropped.lock();
            let keys: Vec<u64> = dropped.iter().take(UNLOADS_PER_SWEEP).copied().collect();
            for key in &keys {
                dropped.remove(key);
            }
            keys
        };

        for key in keys {
            let Some(shared) = self.cache.read().get(&key).cloned() else {
                continue;
            };
            let pos = ChunkPos::from_key(key);
            self.save_column(&shared, world_time, &mut drain_ticks(pos));

            self.cache.write().remove(&key);
            self.loaded_coords.lock().retain(|&coord| coord != pos);
        }
    }

    /// Saves dirty chunks. With `save_all` false the sweep stops after 24
    /// chunks and reports `false`; otherwise every dirty chunk is written.
    pub fn save_chunks(
        &self,
        save_all: bool,
        world_time: i64,
        snapshot_ticks: &mut dyn FnMut(ChunkPos) -> Vec<SavedTick>,
    ) -> bool {
        let columns: Vec<SharedColumn> = {
            let cache = self.cache.read();
            cache.values().cloned().collect()
        };

        let mut saved = 0usize;
        for shared in columns {
            let needs_saving = shared.read().needs_saving(save_all);
            if !needs_saving {
                continue;
            }
            let pos = shared.read().pos;
            self.save_column(&shared, world_time, &mut snapshot_ticks(pos));
            saved += 1;
            if !save_all && saved >= SAVES_PER_SWEEP {
                return false;
            }
        }
        true
    }

    fn save_column(&self, shared: &SharedColumn, world_time: i64, ticks: &mut Vec<SavedTick>) {
        if self.storage.is_none() {
            return;
        }
        let (pos, bytes) = {
            let mut column = shared.write();
            if column.is_proxy {
                return;
            }
            column.last_update = world_time;
            column.remove_invalid_blocks();
            let bytes = nbt::serialize_chunk(&column, ticks);
            column.is_modified = false;
            (column.pos, bytes)
        };

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as u32);

        if let Some(io) = &self.io {
            io.submit_save(pos, bytes, timestamp);
        } else if let Some(store) = &self.storage
            && let Err(e) = store.write_chunk(pos.x, pos.z, &bytes, timestamp)
        {
            log::error!("failed to save chunk {pos}: {e}");
            shared.write().is_modified = true;
        }
    }
}

/// Populate-pass world access spanning the provider's cache.
struct ProviderPopulateWorld<'a> {
    provider: &'a ChunkProvider,
}

impl PopulateWorld for ProviderPopulateWorld<'_> {
    fn block(&self, x: i32, y: i32, z: i32) -> BlockId {
        if !(0..256).contains(&y) {
            return BlockId::AIR;
        }
        self.provider
            .get_chunk_if_loaded(x >> 4, z >> 4)
            .map_or(BlockId::AIR, |column| {
                column
                    .read()
                    .block((x & 15) as usize, y as usize, (z & 15) as usize)
            })
    }

    fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockId, meta: u8) {
        if !(0..256).contains(&y) {
            return;
        }
        if let Some(column) = self.provider.get_chunk_if_loaded(x >> 4, z >> 4) {
            let mut column = column.write();
            let (lx, lz) = ((x & 15) as usize, (z & 15) as usize);
            column.set_block(lx, y as usize, lz, id);
            column.set_metadata(lx, y as usize, lz, meta);
        }
    }

    fn biome(&self, x: i32, z: i32) -> u8 {
        self.provider
            .get_chunk_if_loaded(x >> 4, z >> 4)
            .map_or(0, |column| {
                column.read().biome((x & 15) as usize, (z & 15) as usize)
            })
    }

    fn height(&self, x: i32, z: i32) -> i32 {
        self.provider
            .get_chunk_if_loaded(x >> 4, z >> 4)
            .map_or(0, |column| {
                column.read().height((x & 15) as usize, (z & 15) as usize)
            })
    }

    fn spawn_creature(&mut self, name: &str, x: f64, y: f64, z: f64) {
        self.provider.pending_spawns.lock().push(PendingSpawn {
            name: name.to_owned(),
            x,
            y,
            z,
        });
    }
}

/// Convenience read of a registry block from a shared column.
#[must_use]
pub fn block_at(column: &SharedColumn, x: usize, y: usize, z: usize) -> &'static basalt_registry::Block {
    REGISTRY.blocks.by_id_or_air(column.read().block(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_gen::OverworldGenerator;

    fn test_provider() -> ChunkProvider {
        let generator: Arc<dyn ChunkGenerator> =
            Arc::new(OverworldGenerator::new(1234, false, true));
        ChunkProvider::new(generator, None, true, 0, Duration::from_millis(50))
    }

    #[test]
    fn provide_loads_and_caches() {
        let provider = test_provider();
        assert!(!provider.chunk_exists(0, 0));
        let column = provider.provide_chunk(0, 0);
        assert!(provider.chunk_exists(0, 0));
        assert!(!column.read().is_proxy);
        // Second call returns the same allocation.
        let again = provider.provide_chunk(0, 0);
        assert!(Arc::ptr_eq(&column, &again));
    }

    #[test]
    fn load_override_off_returns_proxy() {
        let provider = test_provider();
        provider.chunk_load_override.store(false, Ordering::Relaxed);
        let column = provider.provide_chunk(5, 5);
        assert!(column.read().is_proxy);
        assert!(!provider.chunk_exists(5, 5));
    }

    #[test]
    fn spawn_pin_blocks_drops() {
        let provider = test_provider();
        provider.set_spawn(8, 8, true);
        let _ = provider.provide_chunk(0, 0);
        provider.drop_chunk(0, 0);
        provider.unload_queued_chunks(0, &mut |_| Vec::new());
        assert!(provider.chunk_exists(0, 0));

        // Without respawn, the pin is void.
        provider.set_spawn(8, 8, false);
        provider.drop_chunk(0, 0);
        provider.unload_queued_chunks(0, &mut |_| Vec::new());
        assert!(!provider.chunk_exists(0, 0));
    }

    #[test]
    fn far_chunks_unload() {
        let provider = test_provider();
        provider.set_spawn(8, 8, true);
        let _ = provider.provide_chunk(40, 40);
        provider.drop_chunk(40, 40);
        provider.unload_queued_chunks(0, &mut |_| Vec::new());
        assert!(!provider.chunk_exists(40, 40));
    }

    #[test]
    fn loading_cancels_pending_drop() {
        let provider = test_provider();
        provider.set_spawn(1_000_000, 1_000_000, true);
        let _ = provider.provide_chunk(3, 3);
        provider.drop_chunk(3, 3);
        // A reload pulls the key back out of the drop set.
        let _ = provider.load_chunk(3, 3).unwrap();
        provider.unload_queued_chunks(0, &mut |_| Vec::new());
        assert!(provider.chunk_exists(3, 3));
    }

    #[test]
    fn populate_runs_when_quad_completes() {
        let provider = test_provider();
        let first = provider.provide_chunk(0, 0);
        assert!(!first.read().terrain_populated);
        let _ = provider.provide_chunk(1, 0);
        let _ = provider.provide_chunk(0, 1);
        let _ = provider.provide_chunk(1, 1);
        assert!(first.read().terrain_populated);
    }

    #[test]
    fn async_pool_replaces_proxy() {
        let generator: Arc<dyn ChunkGenerator> =
            Arc::new(OverworldGenerator::new(7, false, true));
        // Zero timeout forces the proxy path immediately.
        let provider = ChunkProvider::new(generator, None, true, 1, Duration::from_millis(0));
        let column = provider.load_chunk(2, 2).unwrap();
        assert!(column.read().is_proxy);

        // Wait for the worker, then pump the replacement in.
        let deadline = Instant::now() + Duration::from_secs(30);
        while column.read().is_proxy && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            provider.pump_io();
        }
        assert!(!column.read().is_proxy, "async result never replaced proxy");
        assert!(column.read().sections().iter().any(Option::is_some));
    }
}
