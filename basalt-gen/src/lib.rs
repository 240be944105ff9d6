//! Deterministic terrain generation: the seeded noise pipeline, carvers,
//! ore veins, decoration features and the populate pass.
//!
//! Everything here is a pure function of `(seed, chunkX, chunkZ)`; two
//! invocations with the same inputs produce byte-identical chunks.

use basalt_utils::{BlockId, ChunkPos};

pub mod biomes;
pub mod caves;
pub mod end;
pub mod features;
pub mod nether;
pub mod noise;
pub mod ore;
pub mod overworld;
pub mod populate;
pub mod ravines;
pub mod structures;

pub use overworld::OverworldGenerator;

/// Sea level of the standard overworld pipeline.
pub const SEA_LEVEL: i32 = 63;

/// Raw output of the chunk-fill phase: block ids, metadata and biomes for a
/// single 16×256×16 column. Indexing is `(x*16 + z)*256 + y`.
pub struct RawChunk {
    /// Block ids per cell.
    pub blocks: Vec<u16>,
    /// Metadata nibble per cell (stored widened for the fill phase).
    pub metadata: Vec<u8>,
    /// Biome id per column, indexed `z*16 + x`.
    pub biomes: [u8; 256],
}

impl RawChunk {
    /// An all-air chunk.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            blocks: vec![0; 16 * 16 * 256],
            metadata: vec![0; 16 * 16 * 256],
            biomes: [0; 256],
        }
    }

    /// Linear index for in-chunk coordinates.
    #[must_use]
    #[inline]
    pub const fn index(x: usize, y: usize, z: usize) -> usize {
        (x * 16 + z) * 256 + y
    }

    /// Block id at in-chunk coordinates.
    #[must_use]
    #[inline]
    pub fn block(&self, x: usize, y: usize, z: usize) -> BlockId {
        BlockId(self.blocks[Self::index(x, y, z)])
    }

    /// Sets the block id at in-chunk coordinates.
    #[inline]
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, id: BlockId) {
        self.blocks[Self::index(x, y, z)] = id.0;
    }
}

/// A chunk-fill generator: produces the raw terrain for one chunk.
pub trait ChunkGenerator: Send + Sync {
    /// Generates the raw chunk at the given position.
    fn generate(&self, pos: ChunkPos) -> RawChunk;

    /// Runs the one-time decoration pass for a chunk whose 2×2 neighborhood
    /// is present. `world` spans the neighborhood.
    fn populate(&self, world: &mut dyn PopulateWorld, pos: ChunkPos);
}

/// Mutable world access handed to the populate pass. Implementations may
/// span the 2×2 chunk neighborhood of the chunk being populated.
pub trait PopulateWorld {
    /// Block id at an absolute position, air outside the loaded area.
    fn block(&self, x: i32, y: i32, z: i32) -> BlockId;
    /// Writes a block with metadata at an absolute position.
    fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockId, meta: u8);
    /// Biome id governing the given column.
    fn biome(&self, x: i32, z: i32) -> u8;
    /// Top-most non-air y + 1 for the column, for decoration anchoring.
    fn height(&self, x: i32, z: i32) -> i32;
    /// Spawns a world-gen creature. The default drops the request; hosts
    /// with an entity model override it.
    fn spawn_creature(&mut self, name: &str, x: f64, y: f64, z: f64) {
        let _ = (name, x, y, z);
    }
}

/// Computes the per-chunk carving/fill seed:
/// `chunkX·341873128712 + chunkZ·132897987541` with wrapping i64 arithmetic.
#[must_use]
pub fn chunk_seed(chunk_x: i32, chunk_z: i32) -> i64 {
    i64::from(chunk_x)
        .wrapping_mul(341_873_128_712)
        .wrapping_add(i64::from(chunk_z).wrapping_mul(132_897_987_541))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_seed_wraps() {
        assert_eq!(chunk_seed(0, 0), 0);
        assert_eq!(chunk_seed(1, 0), 341_873_128_712);
        assert_eq!(chunk_seed(0, 1), 132_897_987_541);
        // Far-out coordinates rely on two's-complement overflow.
        let _ = chunk_seed(i32::MAX, i32::MIN);
    }

    #[test]
    fn raw_chunk_indexing() {
        let mut chunk = RawChunk::empty();
        chunk.set_block(3, 70, 9, BlockId(1));
        assert_eq!(chunk.blocks[(3 * 16 + 9) * 256 + 70], 1);
        assert_eq!(chunk.block(3, 70, 9), BlockId(1));
    }
}
