//! The chunk I/O worker pool.
//!
//! Workers service load and save requests off the world thread. Loads read
//! the region store and fall back to the generator on a miss; results come
//! back over a channel the world thread drains at the top of each tick.
//! Workers only ever touch value copies; no world lock crosses a worker.

use std::sync::Arc;
use std::thread::JoinHandle;

use basalt_gen::ChunkGenerator;
use basalt_utils::ChunkPos;
use crossbeam::channel::{Receiver, Sender, unbounded};

use crate::chunk::column::ChunkColumn;
use crate::chunk::nbt::{self, SavedTick};
use crate::chunk::region::RegionStore;

/// A request handed to the pool.
enum IoRequest {
    /// Load from disk, generating on a miss.
    Load(ChunkPos),
    /// Write pre-serialized chunk bytes.
    Save {
        /// Chunk position.
        pos: ChunkPos,
        /// Serialized NBT document.
        bytes: Vec<u8>,
        /// Save timestamp (seconds).
        timestamp: u32,
    },
}

/// A completed load.
pub struct LoadResult {
    /// Chunk position.
    pub pos: ChunkPos,
    /// The loaded or generated column.
    pub column: ChunkColumn,
    /// Scheduled ticks restored from disk (empty for generated chunks).
    pub ticks: Vec<SavedTick>,
    /// Whether the column came from disk rather than the generator.
    pub from_disk: bool,
}

/// Worker pool servicing chunk loads and saves.
pub struct ChunkIoPool {
    request_tx: Sender<IoRequest>,
    result_rx: Receiver<LoadResult>,
    workers: Vec<JoinHandle<()>>,
}

impl ChunkIoPool {
    /// Spawns `worker_count` threads over a shared store and generator.
    #[must_use]
    pub fn new(
        storage: Option<Arc<RegionStore>>,
        generator: Arc<dyn ChunkGenerator>,
        has_sky: bool,
        worker_count: usize,
    ) -> Self {
        let (request_tx, request_rx) = unbounded::<IoRequest>();
        let (result_tx, result_rx) = unbounded::<LoadResult>();

        let workers = (0..worker_count.max(1))
            .map(|index| {
                let request_rx = request_rx.clone();
                let result_tx = result_tx.clone();
                let storage = storage.clone();
                let generator = Arc::clone(&generator);
                std::thread::Builder::new()
                    .name(format!("chunk-io-{index}"))
                    .spawn(move || {
                        worker_loop(&request_rx, &result_tx, storage.as_deref(), &generator, has_sky);
                    })
                    .unwrap_or_else(|e| panic!("failed to spawn chunk-io worker: {e}"))
            })
            .collect();

        Self {
            request_tx,
            result_rx,
            workers,
        }
    }

    /// Queues an asynchronous load.
    pub fn submit_load(&self, pos: ChunkPos) {
        let _ = self.request_tx.send(IoRequest::Load(pos));
    }

    /// Queues an asynchronous save of pre-serialized bytes.
    pub fn submit_save(&self, pos: ChunkPos, bytes: Vec<u8>, timestamp: u32) {
        let _ = self.request_tx.send(IoRequest::Save {
            pos,
            bytes,
            timestamp,
        });
    }

    /// Drains every load result that has arrived so far.
    pub fn drain_results(&self) -> Vec<LoadResult> {
        self.result_rx.try_iter().collect()
    }

    /// Blocks up to `timeout` for one load result.
    #[must_use]
    pub fn recv_result_timeout(&self, timeout: std::time::Duration) -> Option<LoadResult> {
        self.result_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for ChunkIoPool {
    fn drop(&mut self) {
        // Closing the channel ends the worker loops.
        let (closed_tx, _) = unbounded();
        let _ = std::mem::replace(&mut self.request_tx, closed_tx);
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(
    request_rx: &Receiver<IoRequest>,
    result_tx: &Sender<LoadResult>,
    storage: Option<&RegionStore>,
    generator: &Arc<dyn ChunkGenerator>,
    has_sky: bool,
) {
    while let Ok(request) = request_rx.recv() {
        match request {
            IoRequest::Load(pos) => {
                let result = load_or_generate(storage, generator, has_sky, pos);
                if result_tx.send(result).is_err() {
                    return;
                }
            }
            IoRequest::Save {
                pos,
                bytes,
                timestamp,
            } => {
                if let Some(store) = storage
                    && let Err(e) = store.write_chunk(pos.x, pos.z, &bytes, timestamp)
                {
                    // Failed saves are logged; the chunk stays dirty and the
                    // next sweep retries.
                    log::error!("failed to save chunk {pos}: {e}");
                }
            }
        }
    }
}

/// The load path shared by workers and the synchronous fallback: disk
/// first, generator on any miss or error.
pub fn load_or_generate(
    storage: Option<&RegionStore>,
    generator: &Arc<dyn ChunkGenerator>,
    has_sky: bool,
    pos: ChunkPos,
) -> LoadResult {
    if let Some(store) = storage {
        match store.read_chunk(pos.x, pos.z) {
            Ok(Some(bytes)) => match nbt::deserialize_chunk(&bytes, has_sky) {
                Ok((mut column, ticks)) => {
                    column.pos = pos;
                    return LoadResult {
                        pos,
                        column,
                        ticks,
                        from_disk: true,
                    };
                }
                Err(e) => {
                    log::warn!("corrupted chunk {pos}, regenerating: {e}");
                }
            },
            Ok(None) => {}
            Err(e) => {
                log::warn!("region read failed for {pos}, regenerating: {e}");
            }
        }
    }

    let raw = generator.generate(pos);
    let mut column = ChunkColumn::from_raw(pos, &raw, has_sky);
    column.generate_sky_light();
    LoadResult {
        pos,
        column,
        ticks: Vec::new(),
        from_disk: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_gen::OverworldGenerator;
    use std::time::Duration;

    #[test]
    fn pool_loads_generated_chunks() {
        let generator: Arc<dyn ChunkGenerator> =
            Arc::new(OverworldGenerator::new(1234, false, true));
        let pool = ChunkIoPool::new(None, generator, true, 2);
        pool.submit_load(ChunkPos::new(0, 0));
        let result = pool
            .recv_result_timeout(Duration::from_secs(30))
            .expect("load should complete");
        assert_eq!(result.pos, ChunkPos::new(0, 0));
        assert!(!result.from_disk);
        assert!(!result.column.sections().iter().all(Option::is_none));
    }

    #[test]
    fn save_then_load_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("basalt-io-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let store = Arc::new(RegionStore::new(&dir).unwrap());
        let generator: Arc<dyn ChunkGenerator> =
            Arc::new(OverworldGenerator::new(42, false, true));

        let generated = load_or_generate(None, &generator, true, ChunkPos::new(1, 1));
        let bytes = nbt::serialize_chunk(&generated.column, &[]);
        store.write_chunk(1, 1, &bytes, 7).unwrap();

        let loaded = load_or_generate(Some(&store), &generator, true, ChunkPos::new(1, 1));
        assert!(loaded.from_disk);
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..128 {
                    assert_eq!(
                        loaded.column.block(x, y, z),
                        generated.column.block(x, y, z)
                    );
                }
            }
        }
        let _ = std::fs::remove_dir_all(dir);
    }
}
