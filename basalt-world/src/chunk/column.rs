//! A 16×16 chunk column: sections, height map, biomes, tile entities.

use basalt_gen::RawChunk;
use basalt_registry::REGISTRY;
use basalt_utils::{BlockId, BlockPos, ChunkPos};
use rustc_hash::FxHashMap;
use simdnbt::owned::NbtCompound;

use crate::chunk::section::ChunkSection;
use crate::light::LightKind;
use crate::tile_entity::TileEntity;

/// A chunk column covering the full 0–255 Y range.
#[derive(Clone)]
pub struct ChunkColumn {
    /// Column coordinate.
    pub pos: ChunkPos,
    sections: [Option<ChunkSection>; 16],
    height_map: [i32; 256],
    biomes: [u8; 256],
    /// World tick of the last update touching this chunk.
    pub last_update: i64,
    /// Cumulative ticks players have inhabited this chunk.
    pub inhabited_time: i64,
    /// Whether the populate pass has run.
    pub terrain_populated: bool,
    /// Whether initial light has been computed.
    pub light_populated: bool,
    /// Dirty flag for the save sweep.
    pub is_modified: bool,
    /// Proxy columns accept reads but are never persisted.
    pub is_proxy: bool,
    has_sky: bool,
    tile_entities: FxHashMap<BlockPos, TileEntity>,
    /// Persisted entity NBT riding along with the column.
    pub entities: Vec<NbtCompound>,
}

impl ChunkColumn {
    /// Creates an empty column.
    #[must_use]
    pub fn new(pos: ChunkPos, has_sky: bool) -> Self {
        Self {
            pos,
            sections: Default::default(),
            height_map: [0; 256],
            biomes: [0; 256],
            last_update: 0,
            inhabited_time: 0,
            terrain_populated: false,
            light_populated: false,
            is_modified: false,
            is_proxy: false,
            has_sky,
            tile_entities: FxHashMap::default(),
            entities: Vec::new(),
        }
    }

    /// An empty proxy column: readable, never persisted.
    #[must_use]
    pub fn proxy(pos: ChunkPos, has_sky: bool) -> Self {
        let mut column = Self::new(pos, has_sky);
        column.is_proxy = true;
        column
    }

    /// Builds a column from generator output, deriving the height map and
    /// cached counts.
    #[must_use]
    pub fn from_raw(pos: ChunkPos, raw: &RawChunk, has_sky: bool) -> Self {
        let mut column = Self::new(pos, has_sky);
        column.biomes = raw.biomes;
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..256 {
                    let id = raw.block(x, y, z);
                    if !id.is_air() {
                        column.section_mut(y).set_block(x, y & 15, z, id);
                        let meta = raw.metadata[RawChunk::index(x, y, z)];
                        if meta != 0 {
                            column.section_mut(y).set_metadata(x, y & 15, z, meta);
                        }
                    }
                }
            }
        }
        column.rebuild_height_map();
        column.is_modified = true;
        column
    }

    /// Whether this column's dimension has sky light.
    #[must_use]
    pub const fn has_sky(&self) -> bool {
        self.has_sky
    }

    fn section_mut(&mut self, y: usize) -> &mut ChunkSection {
        let has_sky = self.has_sky;
        self.sections[y >> 4].get_or_insert_with(|| ChunkSection::new((y as i32) & !15, has_sky))
    }

    /// The sections array, for serialization and section-level iteration.
    #[must_use]
    pub fn sections(&self) -> &[Option<ChunkSection>; 16] {
        &self.sections
    }

    /// Mutable sections array, for deserialization.
    pub fn sections_mut(&mut self) -> &mut [Option<ChunkSection>; 16] {
        &mut self.sections
    }

    /// Block id at column-local coordinates.
    #[must_use]
    pub fn block(&self, x: usize, y: usize, z: usize) -> BlockId {
        if y > 255 {
            return BlockId::AIR;
        }
        self.sections[y >> 4]
            .as_ref()
            .map_or(BlockId::AIR, |section| section.block(x, y & 15, z))
    }

    /// Writes a block id, maintaining the height map. Returns the previous
    /// id; light updates are the world's responsibility.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, id: BlockId) -> BlockId {
        let old = self.block(x, y, z);
        if old == id {
            return old;
        }
        self.section_mut(y).set_block(x, y & 15, z, id);
        self.update_height_map(x, y as i32, z, id);
        // A changed host block orphans its tile entity.
        let pos = BlockPos::new(
            self.pos.min_block_x() + x as i32,
            y as i32,
            self.pos.min_block_z() + z as i32,
        );
        let old_tile = REGISTRY.blocks.by_id_or_air(old).tile_entity;
        let new_tile = REGISTRY.blocks.by_id_or_air(id).tile_entity;
        if old_tile.is_some() && old_tile != new_tile
            && let Some(tile) = self.tile_entities.get_mut(&pos)
        {
            tile.invalidate();
        }
        self.is_modified = true;
        old
    }

    /// Metadata nibble at column-local coordinates.
    #[must_use]
    pub fn metadata(&self, x: usize, y: usize, z: usize) -> u8 {
        if y > 255 {
            return 0;
        }
        self.sections[y >> 4]
            .as_ref()
            .map_or(0, |section| section.metadata(x, y & 15, z))
    }

    /// Writes the metadata nibble.
    pub fn set_metadata(&mut self, x: usize, y: usize, z: usize, meta: u8) {
        if y > 255 {
            return;
        }
        if self.sections[y >> 4].is_none() && meta == 0 {
            return;
        }
        self.section_mut(y).set_metadata(x, y & 15, z, meta);
        self.is_modified = true;
    }

    /// Light level of one channel at column-local coordinates.
    ///
    /// Sky light above the top section reads full-bright; block light reads
    /// dark.
    #[must_use]
    pub fn light(&self, kind: LightKind, x: usize, y: usize, z: usize) -> u8 {
        if y > 255 {
            return kind.default_level(self.has_sky);
        }
        match &self.sections[y >> 4] {
            Some(section) => match kind {
                LightKind::Sky => section.sky_light(x, y & 15, z),
                LightKind::Block => section.block_light(x, y & 15, z),
            },
            None => match kind {
                LightKind::Sky if self.has_sky && self.can_see_sky(x, y as i32, z) => 15,
                _ => 0,
            },
        }
    }

    /// Writes one light channel, materializing the section if needed.
    pub fn set_light(&mut self, kind: LightKind, x: usize, y: usize, z: usize, level: u8) {
        if y > 255 {
            return;
        }
        let section = self.section_mut(y);
        match kind {
            LightKind::Sky => section.set_sky_light(x, y & 15, z, level),
            LightKind::Block => section.set_block_light(x, y & 15, z, level),
        }
        self.is_modified = true;
    }

    /// Height map entry: one above the top opaque block of the column.
    #[must_use]
    pub fn height(&self, x: usize, z: usize) -> i32 {
        self.height_map[z * 16 + x]
    }

    /// The raw height map, for serialization.
    #[must_use]
    pub fn height_map(&self) -> &[i32; 256] {
        &self.height_map
    }

    /// Overwrites the height map from persisted data.
    pub fn set_height_map(&mut self, data: [i32; 256]) {
        self.height_map = data;
    }

    /// Whether a position sees the sky: nothing opaque above it.
    #[must_use]
    pub fn can_see_sky(&self, x: usize, y: i32, z: usize) -> bool {
        y >= self.height(x, z)
    }

    /// Biome id of a column cell.
    #[must_use]
    pub fn biome(&self, x: usize, z: usize) -> u8 {
        self.biomes[z * 16 + x]
    }

    /// The raw biome map, for serialization.
    #[must_use]
    pub fn biomes(&self) -> &[u8; 256] {
        &self.biomes
    }

    /// Overwrites the biome map from persisted data.
    pub fn set_biomes(&mut self, biomes: [u8; 256]) {
        self.biomes = biomes;
    }

    /// Recomputes the full height map from block data.
    pub fn rebuild_height_map(&mut self) {
        for x in 0..16 {
            for z in 0..16 {
                self.height_map[z * 16 + x] = self.column_height(x, z);
            }
        }
    }

    fn column_height(&self, x: usize, z: usize) -> i32 {
        for y in (0..256).rev() {
            let id = self.block(x, y, z);
            if REGISTRY.blocks.by_id_or_air(id).is_opaque() {
                return y as i32 + 1;
            }
        }
        0
    }

    fn update_height_map(&mut self, x: usize, y: i32, z: usize, id: BlockId) {
        let index = z * 16 + x;
        let current = self.height_map[index];
        let opaque = REGISTRY.blocks.by_id_or_air(id).is_opaque();
        if opaque && y + 1 > current {
            self.height_map[index] = y + 1;
        } else if !opaque && y + 1 == current {
            self.height_map[index] = self.column_height(x, z);
        }
    }

    /// The tile entity at a world position, skipping invalidated entries.
    #[must_use]
    pub fn tile_entity(&self, pos: BlockPos) -> Option<&TileEntity> {
        self.tile_entities.get(&pos).filter(|tile| !tile.invalid)
    }

    /// Mutable access to a tile entity.
    pub fn tile_entity_mut(&mut self, pos: BlockPos) -> Option<&mut TileEntity> {
        self.tile_entities.get_mut(&pos).filter(|tile| !tile.invalid)
    }

    /// Installs a tile entity, replacing any previous entry at its position.
    pub fn set_tile_entity(&mut self, tile: TileEntity) {
        self.tile_entities.insert(tile.pos, tile);
        self.is_modified = true;
    }

    /// Removes a tile entity outright.
    pub fn remove_tile_entity(&mut self, pos: BlockPos) -> Option<TileEntity> {
        let removed = self.tile_entities.remove(&pos);
        if removed.is_some() {
            self.is_modified = true;
        }
        removed
    }

    /// Iterates live tile entities.
    pub fn tile_entities(&self) -> impl Iterator<Item = &TileEntity> {
        self.tile_entities.values().filter(|tile| !tile.invalid)
    }

    /// Drops invalidated tile entities and empty sections. After this sweep
    /// a section is present iff its non-air count is positive.
    pub fn remove_invalid_blocks(&mut self) {
        self.tile_entities.retain(|_, tile| !tile.invalid);
        for slot in &mut self.sections {
            if slot.as_ref().is_some_and(ChunkSection::is_empty) {
                *slot = None;
            }
        }
    }

    /// Whether this chunk must be written by the save sweep.
    #[must_use]
    pub const fn needs_saving(&self, save_all: bool) -> bool {
        !self.is_proxy && (save_all || self.is_modified)
    }

    /// Seeds full skylight down to the height map, marking the column
    /// light-populated. The BFS engine refines edges afterwards.
    pub fn generate_sky_light(&mut self) {
        if !self.has_sky {
            self.light_populated = true;
            return;
        }
        for x in 0..16 {
            for z in 0..16 {
                let top = self.height(x, z);
                let mut level = 15i32;
                for y in (0..256).rev() {
                    if y as i32 >= top {
                        self.set_light(LightKind::Sky, x, y, z, 15);
                        continue;
                    }
                    let opacity = REGISTRY
                        .blocks
                        .by_id_or_air(self.block(x, y, z))
                        .opacity;
                    level -= i32::from(opacity).max(1).min(15);
                    if level <= 0 {
                        break;
                    }
                    self.set_light(LightKind::Sky, x, y, z, level as u8);
                }
            }
        }
        self.light_populated = true;
    }
}
