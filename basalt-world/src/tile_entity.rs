//! Tile entities: block-attached state addressed by position.
//!
//! A tile entity shares its chunk's lifetime. Invalidation only marks the
//! entry; the chunk removes marked entries on its next sweep.

use basalt_registry::TileEntityKind;
use basalt_utils::{BlockId, BlockPos};
use simdnbt::owned::{NbtCompound, NbtTag};

/// An item slot inside a container tile entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemSlot {
    /// Item id, 0 when empty.
    pub item_id: u16,
    /// Stack count.
    pub count: u8,
    /// Item damage/meta.
    pub damage: u16,
}

/// Type-specific tile entity state.
#[derive(Debug, Clone, PartialEq)]
pub enum TileEntityData {
    /// Furnace burn/cook progress plus its three slots.
    Furnace {
        /// Remaining fuel burn ticks.
        burn_time: i16,
        /// Accumulated cook ticks.
        cook_time: i16,
        /// Input, fuel, output.
        slots: [ItemSlot; 3],
    },
    /// A 27-slot chest.
    Chest {
        /// Container contents.
        slots: Vec<ItemSlot>,
    },
    /// Four lines of sign text.
    Sign {
        /// The text lines.
        lines: [String; 4],
    },
    /// A hopper with transfer cooldown.
    Hopper {
        /// Container contents.
        slots: Vec<ItemSlot>,
        /// Ticks until the next transfer.
        transfer_cooldown: i32,
    },
    /// A block in transit between piston cells.
    PistonMoving {
        /// The block being moved.
        stored_block: BlockId,
        /// Its metadata.
        stored_meta: u8,
        /// Push direction facing index.
        facing: u8,
        /// True while extending, false while retracting.
        extending: bool,
        /// Animation progress in `[0, 1]`.
        progress: f32,
    },
    /// Mob spawner timing state.
    MobSpawner {
        /// Spawned entity name.
        entity_name: String,
        /// Ticks until the next spawn attempt.
        delay: i16,
    },
    /// Command block with its stored command.
    CommandBlock {
        /// The command string.
        command: String,
        /// Result of the last execution.
        success_count: i32,
    },
    /// Beacon effect selection.
    Beacon {
        /// Pyramid levels below the beacon.
        levels: i32,
        /// Primary potion id.
        primary: i32,
        /// Secondary potion id.
        secondary: i32,
    },
    /// Mob head data.
    Skull {
        /// Skull type.
        skull_type: u8,
        /// Rotation for floor placement.
        rotation: u8,
        /// Owning player for player heads.
        owner: String,
    },
    /// Flower pot contents.
    FlowerPot {
        /// Potted item id.
        item_id: u16,
        /// Potted item metadata.
        item_meta: u8,
    },
    /// Comparator output cache.
    Comparator {
        /// Last computed signal strength.
        output_signal: i32,
    },
    /// Brewing stand state.
    BrewingStand {
        /// Ingredient plus three bottle slots.
        slots: [ItemSlot; 4],
        /// Remaining brew ticks.
        brew_time: i32,
    },
    /// Note block pitch.
    NoteBlock {
        /// Stored note, 0–24.
        note: u8,
    },
    /// Jukebox record.
    Jukebox {
        /// Record item id, 0 when empty.
        record: u16,
    },
    /// Daylight detector (stateless beyond its position).
    DaylightDetector,
    /// End portal surface (stateless).
    EndPortal,
    /// Enchanting table (stateless; the GUI derives everything).
    EnchantTable,
    /// Ender chest anchor (stateless; contents are per-player).
    EnderChest,
    /// Dropper container.
    Dropper {
        /// Container contents.
        slots: Vec<ItemSlot>,
    },
    /// Dispenser container.
    Dispenser {
        /// Container contents.
        slots: Vec<ItemSlot>,
    },
}

impl TileEntityData {
    /// The type tag for this payload.
    #[must_use]
    pub const fn kind(&self) -> TileEntityKind {
        match self {
            TileEntityData::Furnace { .. } => TileEntityKind::Furnace,
            TileEntityData::Chest { .. } => TileEntityKind::Chest,
            TileEntityData::Sign { .. } => TileEntityKind::Sign,
            TileEntityData::Hopper { .. } => TileEntityKind::Hopper,
            TileEntityData::PistonMoving { .. } => TileEntityKind::PistonMoving,
            TileEntityData::MobSpawner { .. } => TileEntityKind::MobSpawner,
            TileEntityData::CommandBlock { .. } => TileEntityKind::CommandBlock,
            TileEntityData::Beacon { .. } => TileEntityKind::Beacon,
            TileEntityData::Skull { .. } => TileEntityKind::Skull,
            TileEntityData::FlowerPot { .. } => TileEntityKind::FlowerPot,
            TileEntityData::Comparator { .. } => TileEntityKind::Comparator,
            TileEntityData::BrewingStand { .. } => TileEntityKind::BrewingStand,
            TileEntityData::NoteBlock { .. } => TileEntityKind::NoteBlock,
            TileEntityData::Jukebox { .. } => TileEntityKind::Jukebox,
            TileEntityData::DaylightDetector => TileEntityKind::DaylightDetector,
            TileEntityData::EndPortal => TileEntityKind::EndPortal,
            TileEntityData::EnchantTable => TileEntityKind::EnchantTable,
            TileEntityData::EnderChest => TileEntityKind::EnderChest,
            TileEntityData::Dropper { .. } => TileEntityKind::Dropper,
            TileEntityData::Dispenser { .. } => TileEntityKind::Dispenser,
        }
    }

    /// A fresh default payload for a kind.
    #[must_use]
    pub fn default_for(kind: TileEntityKind) -> Self {
        match kind {
            TileEntityKind::Furnace => TileEntityData::Furnace {
                burn_time: 0,
                cook_time: 0,
                slots: Default::default(),
            },
            TileEntityKind::Chest => TileEntityData::Chest { slots: Vec::new() },
            TileEntityKind::Sign => TileEntityData::Sign {
                lines: Default::default(),
            },
            TileEntityKind::Hopper => TileEntityData::Hopper {
                slots: Vec::new(),
                transfer_cooldown: -1,
            },
            TileEntityKind::PistonMoving => TileEntityData::PistonMoving {
                stored_block: BlockId::AIR,
                stored_meta: 0,
                facing: 0,
                extending: false,
                progress: 0.0,
            },
            TileEntityKind::MobSpawner => TileEntityData::MobSpawner {
                entity_name: String::from("Pig"),
                delay: 20,
            },
            TileEntityKind::CommandBlock => TileEntityData::CommandBlock {
                command: String::new(),
                success_count: 0,
            },
            TileEntityKind::Beacon => TileEntityData::Beacon {
                levels: 0,
                primary: 0,
                secondary: 0,
            },
            TileEntityKind::Skull => TileEntityData::Skull {
                skull_type: 0,
                rotation: 0,
                owner: String::new(),
            },
            TileEntityKind::FlowerPot => TileEntityData::FlowerPot {
                item_id: 0,
                item_meta: 0,
            },
            TileEntityKind::Comparator => TileEntityData::Comparator { output_signal: 0 },
            TileEntityKind::BrewingStand => TileEntityData::BrewingStand {
                slots: Default::default(),
                brew_time: 0,
            },
            TileEntityKind::NoteBlock => TileEntityData::NoteBlock { note: 0 },
            TileEntityKind::Jukebox => TileEntityData::Jukebox { record: 0 },
            TileEntityKind::DaylightDetector => TileEntityData::DaylightDetector,
            TileEntityKind::EndPortal => TileEntityData::EndPortal,
            TileEntityKind::EnchantTable => TileEntityData::EnchantTable,
            TileEntityKind::EnderChest => TileEntityData::EnderChest,
            TileEntityKind::Dropper => TileEntityData::Dropper { slots: Vec::new() },
            TileEntityKind::Dispenser => TileEntityData::Dispenser { slots: Vec::new() },
        }
    }
}

/// A tile entity instance: common header plus the typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TileEntity {
    /// World position.
    pub pos: BlockPos,
    /// Cached host-block metadata; `-1` means not cached yet.
    pub cached_metadata: i32,
    /// Marked for removal; swept by the owning chunk.
    pub invalid: bool,
    /// Typed state.
    pub data: TileEntityData,
}

impl TileEntity {
    /// Creates a tile entity at a position.
    #[must_use]
    pub const fn new(pos: BlockPos, data: TileEntityData) -> Self {
        Self {
            pos,
            cached_metadata: -1,
            invalid: false,
            data,
        }
    }

    /// Marks this entry for removal on the next chunk sweep.
    pub const fn invalidate(&mut self) {
        self.invalid = true;
    }

    /// Serializes the common header and payload to chunk NBT.
    #[must_use]
    pub fn to_nbt(&self) -> NbtCompound {
        let mut compound = NbtCompound::new();
        compound.insert("id", self.data.kind().nbt_id());
        compound.insert("x", NbtTag::Int(self.pos.x));
        compound.insert("y", NbtTag::Int(self.pos.y));
        compound.insert("z", NbtTag::Int(self.pos.z));
        match &self.data {
            TileEntityData::Sign { lines } => {
                for (i, line) in lines.iter().enumerate() {
                    compound.insert(format!("Text{}", i + 1), line.as_str());
                }
            }
            TileEntityData::Furnace {
                burn_time,
                cook_time,
                ..
            } => {
                compound.insert("BurnTime", NbtTag::Short(*burn_time));
                compound.insert("CookTime", NbtTag::Short(*cook_time));
            }
            TileEntityData::MobSpawner { entity_name, delay } => {
                compound.insert("EntityId", entity_name.as_str());
                compound.insert("Delay", NbtTag::Short(*delay));
            }
            TileEntityData::CommandBlock {
                command,
                success_count,
            } => {
                compound.insert("Command", command.as_str());
                compound.insert("SuccessCount", NbtTag::Int(*success_count));
            }
            TileEntityData::NoteBlock { note } => {
                compound.insert("note", NbtTag::Byte(*note as i8));
            }
            TileEntityData::Jukebox { record } => {
                compound.insert("Record", NbtTag::Int(i32::from(*record)));
            }
            TileEntityData::Comparator { output_signal } => {
                compound.insert("OutputSignal", NbtTag::Int(*output_signal));
            }
            TileEntityData::Skull {
                skull_type,
                rotation,
                owner,
            } => {
                compound.insert("SkullType", NbtTag::Byte(*skull_type as i8));
                compound.insert("Rot", NbtTag::Byte(*rotation as i8));
                compound.insert("ExtraType", owner.as_str());
            }
            TileEntityData::FlowerPot { item_id, item_meta } => {
                compound.insert("Item", NbtTag::Int(i32::from(*item_id)));
                compound.insert("Data", NbtTag::Int(i32::from(*item_meta)));
            }
            TileEntityData::PistonMoving {
                stored_block,
                stored_meta,
                facing,
                extending,
                ..
            } => {
                compound.insert("blockId", NbtTag::Int(i32::from(stored_block.0)));
                compound.insert("blockData", NbtTag::Int(i32::from(*stored_meta)));
                compound.insert("facing", NbtTag::Int(i32::from(*facing)));
                compound.insert("extending", NbtTag::Byte(i8::from(*extending)));
            }
            TileEntityData::Beacon {
                levels,
                primary,
                secondary,
            } => {
                compound.insert("Levels", NbtTag::Int(*levels));
                compound.insert("Primary", NbtTag::Int(*primary));
                compound.insert("Secondary", NbtTag::Int(*secondary));
            }
            TileEntityData::BrewingStand { brew_time, .. } => {
                compound.insert("BrewTime", NbtTag::Int(*brew_time));
            }
            TileEntityData::Hopper {
                transfer_cooldown, ..
            } => {
                compound.insert("TransferCooldown", NbtTag::Int(*transfer_cooldown));
            }
            _ => {}
        }
        compound
    }

    /// Rebuilds a tile entity from chunk NBT; unknown ids return `None`.
    #[must_use]
    pub fn from_nbt(compound: &NbtCompound) -> Option<Self> {
        let id = compound.string("id")?.to_str().into_owned();
        let kind = TileEntityKind::from_nbt_id(&id)?;
        let pos = BlockPos::new(
            compound.int("x")?,
            compound.int("y")?,
            compound.int("z")?,
        );

        let mut data = TileEntityData::default_for(kind);
        match &mut data {
            TileEntityData::Sign { lines } => {
                for (i, line) in lines.iter_mut().enumerate() {
                    if let Some(text) = compound.string(&format!("Text{}", i + 1)) {
                        *line = text.to_str().into_owned();
                    }
                }
            }
            TileEntityData::Furnace {
                burn_time,
                cook_time,
                ..
            } => {
                *burn_time = compound.short("BurnTime").unwrap_or(0);
                *cook_time = compound.short("CookTime").unwrap_or(0);
            }
            TileEntityData::MobSpawner { entity_name, delay } => {
                if let Some(name) = compound.string("EntityId") {
                    *entity_name = name.to_str().into_owned();
                }
                *delay = compound.short("Delay").unwrap_or(20);
            }
            TileEntityData::CommandBlock {
                command,
                success_count,
            } => {
                if let Some(cmd) = compound.string("Command") {
                    *command = cmd.to_str().into_owned();
                }
                *success_count = compound.int("SuccessCount").unwrap_or(0);
            }
            TileEntityData::NoteBlock { note } => {
                *note = compound.byte("note").unwrap_or(0) as u8;
            }
            TileEntityData::Jukebox { record } => {
                *record = compound.int("Record").unwrap_or(0) as u16;
            }
            TileEntityData::Comparator { output_signal } => {
                *output_signal = compound.int("OutputSignal").unwrap_or(0);
            }
            TileEntityData::Skull {
                skull_type,
                rotation,
                owner,
            } => {
                *skull_type = compound.byte("SkullType").unwrap_or(0) as u8;
                *rotation = compound.byte("Rot").unwrap_or(0) as u8;
                if let Some(extra) = compound.string("ExtraType") {
                    *owner = extra.to_str().into_owned();
                }
            }
            TileEntityData::FlowerPot { item_id, item_meta } => {
                *item_id = compound.int("Item").unwrap_or(0) as u16;
                *item_meta = compound.int("Data").unwrap_or(0) as u8;
            }
            TileEntityData::PistonMoving {
                stored_block,
                stored_meta,
                facing,
                extending,
                ..
            } => {
                *stored_block = BlockId(compound.int("blockId").unwrap_or(0) as u16);
                *stored_meta = compound.int("blockData").unwrap_or(0) as u8;
                *facing = compound.int("facing").unwrap_or(0) as u8;
                *extending = compound.byte("extending").unwrap_or(0) != 0;
            }
            TileEntityData::Beacon {
                levels,
                primary,
                secondary,
            } => {
                *levels = compound.int("Levels").unwrap_or(0);
                *primary = compound.int("Primary").unwrap_or(0);
                *secondary = compound.int("Secondary").unwrap_or(0);
            }
            TileEntityData::BrewingStand { brew_time, .. } => {
                *brew_time = compound.int("BrewTime").unwrap_or(0);
            }
            TileEntityData::Hopper {
                transfer_cooldown, ..
            } => {
                *transfer_cooldown = compound.int("TransferCooldown").unwrap_or(-1);
            }
            _ => {}
        }

        Some(Self::new(pos, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_nbt_round_trip() {
        let tile = TileEntity::new(
            BlockPos::new(1, 70, -4),
            TileEntityData::Sign {
                lines: [
                    String::from("line one"),
                    String::new(),
                    String::from("three"),
                    String::new(),
                ],
            },
        );
        let parsed = TileEntity::from_nbt(&tile.to_nbt()).unwrap();
        assert_eq!(parsed, tile);
    }

    #[test]
    fn spawner_nbt_round_trip() {
        let tile = TileEntity::new(
            BlockPos::new(0, 30, 0),
            TileEntityData::MobSpawner {
                entity_name: String::from("Zombie"),
                delay: 180,
            },
        );
        let parsed = TileEntity::from_nbt(&tile.to_nbt()).unwrap();
        assert_eq!(parsed, tile);
    }

    #[test]
    fn unknown_id_is_rejected() {
        let mut compound = NbtCompound::new();
        compound.insert("id", "Gizmo");
        compound.insert("x", NbtTag::Int(0));
        compound.insert("y", NbtTag::Int(0));
        compound.insert("z", NbtTag::Int(0));
        assert!(TileEntity::from_nbt(&compound).is_none());
    }

    #[test]
    fn invalidation_is_a_mark() {
        let mut tile = TileEntity::new(
            BlockPos::new(0, 0, 0),
            TileEntityData::default_for(TileEntityKind::Chest),
        );
        assert!(!tile.invalid);
        tile.invalidate();
        assert!(tile.invalid);
    }
}
