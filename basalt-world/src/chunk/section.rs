//! A 16×16×16 block section.

use basalt_registry::REGISTRY;
use basalt_utils::{BlockId, NibbleArray};

/// One 16×16×16 sub-cube of a chunk column.
///
/// Block ids store their low 8 bits in `blocks`; the optional `add` nibble
/// array carries the high 4 bits and exists iff any id is ≥ 256. The
/// section keeps cached non-air and random-tickable counts so emptiness
/// checks stay O(1).
#[derive(Clone)]
pub struct ChunkSection {
    y_base: i32,
    blocks: Box<[u8; 4096]>,
    add: Option<NibbleArray>,
    metadata: NibbleArray,
    block_light: NibbleArray,
    sky_light: Option<NibbleArray>,
    non_air_count: u32,
    tickable_count: u32,
}

impl ChunkSection {
    /// Creates an empty section at the given base Y (a multiple of 16),
    /// with a sky-light channel when the dimension has sky.
    #[must_use]
    pub fn new(y_base: i32, has_sky: bool) -> Self {
        Self {
            y_base,
            blocks: Box::new([0; 4096]),
            add: None,
            metadata: NibbleArray::new(),
            block_light: NibbleArray::new(),
            sky_light: has_sky.then(NibbleArray::new),
            non_air_count: 0,
            tickable_count: 0,
        }
    }

    /// The world Y of this section's bottom layer.
    #[must_use]
    pub const fn y_base(&self) -> i32 {
        self.y_base
    }

    /// True when the section holds no blocks at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.non_air_count == 0
    }

    /// Cached count of blocks that want random ticks.
    #[must_use]
    pub const fn tickable_count(&self) -> u32 {
        self.tickable_count
    }

    /// Cached count of non-air blocks.
    #[must_use]
    pub const fn non_air_count(&self) -> u32 {
        self.non_air_count
    }

    #[inline]
    const fn index(x: usize, y: usize, z: usize) -> usize {
        y << 8 | z << 4 | x
    }

    /// Block id at section-local coordinates.
    #[must_use]
    pub fn block(&self, x: usize, y: usize, z: usize) -> BlockId {
        let index = Self::index(x, y, z);
        let low = u16::from(self.blocks[index]);
        let high = self
            .add
            .as_ref()
            .map_or(0, |add| u16::from(add.get_index(index)));
        BlockId(high << 8 | low)
    }

    /// Writes a block id, maintaining the cached counts and materializing
    /// the `add` array when an id needs more than 8 bits.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, id: BlockId) {
        let index = Self::index(x, y, z);
        let old = self.block(x, y, z);
        if old == id {
            return;
        }

        let old_def = REGISTRY.blocks.by_id_or_air(old);
        let new_def = REGISTRY.blocks.by_id_or_air(id);
        if !old.is_air() {
            self.non_air_count -= 1;
            if old_def.random_ticks {
                self.tickable_count -= 1;
            }
        }
        if !id.is_air() {
            self.non_air_count += 1;
            if new_def.random_ticks {
                self.tickable_count += 1;
            }
        }

        self.blocks[index] = (id.0 & 0xFF) as u8;
        let high = (id.0 >> 8) as u8;
        if high != 0 && self.add.is_none() {
            self.add = Some(NibbleArray::new());
        }
        if let Some(add) = &mut self.add {
            add.set_index(index, high);
        }
    }

    /// Metadata nibble at section-local coordinates.
    #[must_use]
    pub fn metadata(&self, x: usize, y: usize, z: usize) -> u8 {
        self.metadata.get(x, y, z)
    }

    /// Writes the metadata nibble.
    pub fn set_metadata(&mut self, x: usize, y: usize, z: usize, meta: u8) {
        self.metadata.set(x, y, z, meta);
    }

    /// Block-light level at section-local coordinates.
    #[must_use]
    pub fn block_light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.block_light.get(x, y, z)
    }

    /// Writes the block-light level.
    pub fn set_block_light(&mut self, x: usize, y: usize, z: usize, level: u8) {
        self.block_light.set(x, y, z, level);
    }

    /// Sky-light level; zero in skyless dimensions.
    #[must_use]
    pub fn sky_light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.sky_light.as_ref().map_or(0, |sky| sky.get(x, y, z))
    }

    /// Writes the sky-light level, ignored in skyless dimensions.
    pub fn set_sky_light(&mut self, x: usize, y: usize, z: usize, level: u8) {
        if let Some(sky) = &mut self.sky_light {
            sky.set(x, y, z, level);
        }
    }

    /// Recomputes the cached counts from the block data. Used after bulk
    /// loads where counts were not maintained incrementally.
    pub fn recount(&mut self) {
        self.non_air_count = 0;
        self.tickable_count = 0;
        for y in 0..16 {
            for z in 0..16 {
                for x in 0..16 {
                    let id = self.block(x, y, z);
                    if !id.is_air() {
                        self.non_air_count += 1;
                        if REGISTRY.blocks.by_id_or_air(id).random_ticks {
                            self.tickable_count += 1;
                        }
                    }
                }
            }
        }
    }

    /// Raw low-bits array for serialization.
    #[must_use]
    pub fn raw_blocks(&self) -> &[u8; 4096] {
        &self.blocks
    }

    /// Raw add array for serialization, if present.
    #[must_use]
    pub fn raw_add(&self) -> Option<&NibbleArray> {
        self.add.as_ref()
    }

    /// Raw metadata array for serialization.
    #[must_use]
    pub fn raw_metadata(&self) -> &NibbleArray {
        &self.metadata
    }

    /// Raw block-light array for serialization.
    #[must_use]
    pub fn raw_block_light(&self) -> &NibbleArray {
        &self.block_light
    }

    /// Raw sky-light array for serialization, absent in skyless dimensions.
    #[must_use]
    pub fn raw_sky_light(&self) -> Option<&NibbleArray> {
        self.sky_light.as_ref()
    }

    /// Rebuilds a section from persisted arrays.
    #[must_use]
    pub fn from_raw(
        y_base: i32,
        blocks: Box<[u8; 4096]>,
        add: Option<NibbleArray>,
        metadata: NibbleArray,
        block_light: NibbleArray,
        sky_light: Option<NibbleArray>,
    ) -> Self {
        let mut section = Self {
            y_base,
            blocks,
            add,
            metadata,
            block_light,
            sky_light,
            non_air_count: 0,
            tickable_count: 0,
        };
        section.recount();
        section
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_registry::blocks::vanilla;

    #[test]
    fn counts_track_block_changes() {
        let mut section = ChunkSection::new(0, true);
        assert!(section.is_empty());
        section.set_block(0, 0, 0, vanilla::STONE);
        section.set_block(1, 0, 0, vanilla::GRASS);
        assert_eq!(section.non_air_count(), 2);
        // Only grass takes random ticks.
        assert_eq!(section.tickable_count(), 1);
        section.set_block(0, 0, 0, vanilla::AIR);
        assert_eq!(section.non_air_count(), 1);
        assert!(!section.is_empty());
    }

    #[test]
    fn add_array_appears_for_high_ids() {
        let mut section = ChunkSection::new(0, true);
        assert!(section.raw_add().is_none());
        section.set_block(5, 5, 5, BlockId(300));
        assert!(section.raw_add().is_some());
        assert_eq!(section.block(5, 5, 5), BlockId(300));
        // Low ids still read back correctly next to the high one.
        section.set_block(6, 5, 5, vanilla::STONE);
        assert_eq!(section.block(6, 5, 5), vanilla::STONE);
    }

    #[test]
    fn idempotent_set_preserves_counts() {
        let mut section = ChunkSection::new(16, true);
        section.set_block(2, 2, 2, vanilla::STONE);
        section.set_block(2, 2, 2, vanilla::STONE);
        assert_eq!(section.non_air_count(), 1);
    }

    #[test]
    fn light_channels() {
        let mut section = ChunkSection::new(0, true);
        section.set_block_light(1, 2, 3, 14);
        section.set_sky_light(1, 2, 3, 15);
        assert_eq!(section.block_light(1, 2, 3), 14);
        assert_eq!(section.sky_light(1, 2, 3), 15);

        let mut skyless = ChunkSection::new(0, false);
        skyless.set_sky_light(0, 0, 0, 15);
        assert_eq!(skyless.sky_light(0, 0, 0), 0);
    }

    #[test]
    fn recount_matches_incremental() {
        let mut section = ChunkSection::new(0, true);
        section.set_block(0, 0, 0, vanilla::STONE);
        section.set_block(3, 7, 9, vanilla::WATER);
        let (non_air, tickable) = (section.non_air_count(), section.tickable_count());
        section.recount();
        assert_eq!(section.non_air_count(), non_air);
        assert_eq!(section.tickable_count(), tickable);
    }
}
