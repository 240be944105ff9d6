//! Chunk column ↔ NBT, the persisted `Level` schema.

use std::io::Cursor;

use basalt_utils::{BlockPos, ChunkPos, NibbleArray};
use simdnbt::owned::{BaseNbt, NbtCompound, NbtList, NbtTag};
use thiserror::Error;

use crate::chunk::column::ChunkColumn;
use crate::chunk::section::ChunkSection;
use crate::tile_entity::TileEntity;

/// Errors from chunk NBT decoding.
#[derive(Debug, Error)]
pub enum ChunkNbtError {
    /// The payload was not parseable NBT.
    #[error("malformed chunk nbt: {0}")]
    Malformed(String),
    /// The `Level` compound is missing.
    #[error("chunk nbt has no Level compound")]
    NoLevel,
    /// A section carried arrays of the wrong size.
    #[error("section array has wrong length")]
    BadSectionArray,
}

/// A scheduled tick riding along with a saved chunk. `delay` is relative
/// to the save's world time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedTick {
    /// Target block id.
    pub block_id: i32,
    /// Target position.
    pub pos: BlockPos,
    /// Ticks until due, relative to the save time.
    pub delay: i32,
    /// Scheduler priority.
    pub priority: i32,
}

/// Serializes a column plus its pending ticks into a chunk NBT document.
#[must_use]
pub fn serialize_chunk(column: &ChunkColumn, ticks: &[SavedTick]) -> Vec<u8> {
    let mut level = NbtCompound::new();
    level.insert("V", NbtTag::Byte(1));
    level.insert("xPos", NbtTag::Int(column.pos.x));
    level.insert("zPos", NbtTag::Int(column.pos.z));
    level.insert("LastUpdate", NbtTag::Long(column.last_update));
    level.insert("InhabitedTime", NbtTag::Long(column.inhabited_time));
    level.insert("HeightMap", NbtTag::IntArray(column.height_map().to_vec()));
    level.insert(
        "TerrainPopulated",
        NbtTag::Byte(i8::from(column.terrain_populated)),
    );
    level.insert(
        "LightPopulated",
        NbtTag::Byte(i8::from(column.light_populated)),
    );

    let mut sections = Vec::new();
    for (section_y, slot) in column.sections().iter().enumerate() {
        let Some(section) = slot else { continue };
        if section.is_empty() {
            continue;
        }
        let mut compound = NbtCompound::new();
        compound.insert("Y", NbtTag::Byte(section_y as i8));
        compound.insert("Blocks", NbtTag::ByteArray(section.raw_blocks().to_vec()));
        if let Some(add) = section.raw_add() {
            compound.insert("Add", NbtTag::ByteArray(add.as_bytes().to_vec()));
        }
        compound.insert(
            "Data",
            NbtTag::ByteArray(section.raw_metadata().as_bytes().to_vec()),
        );
        compound.insert(
            "BlockLight",
            NbtTag::ByteArray(section.raw_block_light().as_bytes().to_vec()),
        );
        if let Some(sky) = section.raw_sky_light() {
            compound.insert("SkyLight", NbtTag::ByteArray(sky.as_bytes().to_vec()));
        }
        sections.push(compound);
    }
    level.insert("Sections", NbtTag::List(NbtList::Compound(sections)));

    level.insert("Biomes", NbtTag::ByteArray(column.biomes().to_vec()));
    level.insert(
        "Entities",
        NbtTag::List(NbtList::Compound(column.entities.clone())),
    );

    let tile_entities: Vec<NbtCompound> =
        column.tile_entities().map(TileEntity::to_nbt).collect();
    level.insert(
        "TileEntities",
        NbtTag::List(NbtList::Compound(tile_entities)),
    );

    if !ticks.is_empty() {
        let tick_list: Vec<NbtCompound> = ticks
            .iter()
            .map(|tick| {
                let mut compound = NbtCompound::new();
                compound.insert("i", NbtTag::Int(tick.block_id));
                compound.insert("x", NbtTag::Int(tick.pos.x));
                compound.insert("y", NbtTag::Int(tick.pos.y));
                compound.insert("z", NbtTag::Int(tick.pos.z));
                compound.insert("t", NbtTag::Int(tick.delay));
                compound.insert("p", NbtTag::Int(tick.priority));
                compound
            })
            .collect();
        level.insert("TileTicks", NbtTag::List(NbtList::Compound(tick_list)));
    }

    let mut root = NbtCompound::new();
    root.insert("Level", NbtTag::Compound(level));

    let mut out = Vec::new();
    BaseNbt::new("", root).write(&mut out);
    out
}

fn nibble_from(bytes: &[u8]) -> Result<NibbleArray, ChunkNbtError> {
    NibbleArray::from_bytes(bytes).ok_or(ChunkNbtError::BadSectionArray)
}

/// Parses a chunk NBT document back into a column and its saved ticks.
pub fn deserialize_chunk(
    bytes: &[u8],
    has_sky: bool,
) -> Result<(ChunkColumn, Vec<SavedTick>), ChunkNbtError> {
    let nbt = simdnbt::owned::read(&mut Cursor::new(bytes))
        .map_err(|e| ChunkNbtError::Malformed(e.to_string()))?;
    let simdnbt::owned::Nbt::Some(root) = nbt else {
        return Err(ChunkNbtError::NoLevel);
    };
    let level = root.compound("Level").ok_or(ChunkNbtError::NoLevel)?;

    let pos = ChunkPos::new(
        level.int("xPos").unwrap_or(0),
        level.int("zPos").unwrap_or(0),
    );
    let mut column = ChunkColumn::new(pos, has_sky);
    column.last_update = level.long("LastUpdate").unwrap_or(0);
    column.inhabited_time = level.long("InhabitedTime").unwrap_or(0);
    column.terrain_populated = level.byte("TerrainPopulated").unwrap_or(0) != 0;
    column.light_populated = level.byte("LightPopulated").unwrap_or(0) != 0;

    if let Some(sections) = level.list("Sections").and_then(|list| list.compounds()) {
        for compound in sections {
            let section_y = compound.byte("Y").unwrap_or(0) as usize & 15;
            let blocks: Box<[u8; 4096]> = compound
                .byte_array("Blocks")
                .ok_or(ChunkNbtError::BadSectionArray)?
                .to_vec()
                .into_boxed_slice()
                .try_into()
                .map_err(|_| ChunkNbtError::BadSectionArray)?;
            let add = match compound.byte_array("Add") {
                Some(bytes) => Some(nibble_from(bytes)?),
                None => None,
            };
            let data = nibble_from(
                compound
                    .byte_array("Data")
                    .ok_or(ChunkNbtError::BadSectionArray)?,
            )?;
            let block_light = nibble_from(
                compound
                    .byte_array("BlockLight")
                    .ok_or(ChunkNbtError::BadSectionArray)?,
            )?;
            let sky_light = match compound.byte_array("SkyLight") {
                Some(bytes) => Some(nibble_from(bytes)?),
                None => None,
            };

            let section = ChunkSection::from_raw(
                (section_y as i32) * 16,
                blocks,
                add,
                data,
                block_light,
                sky_light,
            );
            column.sections_mut()[section_y] = Some(section);
        }
    }

    if let Some(height) = level.int_array("HeightMap") {
        if height.len() == 256 {
            let mut map = [0i32; 256];
            map.copy_from_slice(height);
            column.set_height_map(map);
        } else {
            column.rebuild_height_map();
        }
    } else {
        column.rebuild_height_map();
    }

    if let Some(biomes) = level.byte_array("Biomes")
        && biomes.len() == 256
    {
        let mut map = [0u8; 256];
        map.copy_from_slice(biomes);
        column.set_biomes(map);
    }

    if let Some(entities) = level.list("Entities").and_then(|list| list.compounds()) {
        column.entities = entities.to_vec();
    }

    if let Some(tiles) = level.list("TileEntities").and_then(|list| list.compounds()) {
        for compound in tiles {
            if let Some(tile) = TileEntity::from_nbt(compound) {
                column.set_tile_entity(tile);
            }
        }
    }

    let mut ticks = Vec::new();
    if let Some(tick_list) = level.list("TileTicks").and_then(|list| list.compounds()) {
        for compound in tick_list {
            ticks.push(SavedTick {
                block_id: compound.int("i").unwrap_or(0),
                pos: BlockPos::new(
                    compound.int("x").unwrap_or(0),
                    compound.int("y").unwrap_or(0),
                    compound.int("z").unwrap_or(0),
                ),
                delay: compound.int("t").unwrap_or(0),
                priority: compound.int("p").unwrap_or(0),
            });
        }
    }

    column.is_modified = false;
    Ok((column, ticks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;
    use crate::tile_entity::TileEntityData;
    use basalt_registry::blocks::vanilla;
    use basalt_utils::BlockId;

    fn sample_column() -> ChunkColumn {
        let mut column = ChunkColumn::new(ChunkPos::new(3, -7), true);
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..64 {
                    column.set_block(x, y, z, vanilla::STONE);
                }
            }
        }
        column.set_block(8, 64, 8, vanilla::TORCH);
        column.set_block(0, 65, 0, BlockId(300));
        column.set_metadata(8, 63, 8, 7);
        column.set_light(LightKind::Block, 8, 64, 8, 14);
        column.generate_sky_light();
        column.set_tile_entity(TileEntity::new(
            BlockPos::new(3 * 16 + 2, 30, -7 * 16 + 2),
            TileEntityData::Sign {
                lines: [
                    String::from("hello"),
                    String::new(),
                    String::new(),
                    String::new(),
                ],
            },
        ));
        column.last_update = 999;
        column.inhabited_time = 1234;
        column.terrain_populated = true;
        column
    }

    #[test]
    fn save_load_round_trip() {
        let column = sample_column();
        let ticks = vec![SavedTick {
            block_id: 8,
            pos: BlockPos::new(50, 64, -100),
            delay: 5,
            priority: 0,
        }];
        let bytes = serialize_chunk(&column, &ticks);
        let (loaded, loaded_ticks) = deserialize_chunk(&bytes, true).unwrap();

        assert_eq!(loaded.pos, column.pos);
        assert_eq!(loaded.inhabited_time, column.inhabited_time);
        assert_eq!(loaded.terrain_populated, column.terrain_populated);
        assert_eq!(loaded.light_populated, column.light_populated);
        assert_eq!(loaded.height_map(), column.height_map());
        assert_eq!(loaded.biomes(), column.biomes());
        assert_eq!(loaded_ticks, ticks);

        for x in 0..16 {
            for z in 0..16 {
                for y in 0..70 {
                    assert_eq!(loaded.block(x, y, z), column.block(x, y, z));
                    assert_eq!(loaded.metadata(x, y, z), column.metadata(x, y, z));
                    assert_eq!(
                        loaded.light(LightKind::Block, x, y, z),
                        column.light(LightKind::Block, x, y, z)
                    );
                }
            }
        }

        let tile_pos = BlockPos::new(3 * 16 + 2, 30, -7 * 16 + 2);
        assert_eq!(
            loaded.tile_entity(tile_pos).unwrap().data,
            column.tile_entity(tile_pos).unwrap().data
        );
    }

    #[test]
    fn empty_sections_are_omitted() {
        let mut column = ChunkColumn::new(ChunkPos::new(0, 0), true);
        column.set_block(0, 200, 0, vanilla::STONE);
        column.set_block(0, 200, 0, vanilla::AIR);
        column.remove_invalid_blocks();
        let bytes = serialize_chunk(&column, &[]);
        let (loaded, _) = deserialize_chunk(&bytes, true).unwrap();
        assert!(loaded.sections().iter().all(Option::is_none));
    }

    #[test]
    fn skyless_chunks_omit_sky_light() {
        let mut column = ChunkColumn::new(ChunkPos::new(0, 0), false);
        column.set_block(0, 60, 0, vanilla::NETHERRACK);
        let bytes = serialize_chunk(&column, &[]);
        let (loaded, _) = deserialize_chunk(&bytes, false).unwrap();
        assert!(loaded.sections()[3]
            .as_ref()
            .unwrap()
            .raw_sky_light()
            .is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(deserialize_chunk(&[1, 2, 3, 4], true).is_err());
    }
}
