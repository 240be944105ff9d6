//! Tile entity type tags and their persisted NBT ids.

/// The twenty tile entity type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileEntityKind {
    /// Smelting state.
    Furnace,
    /// 27-slot container.
    Chest,
    /// Four lines of text.
    Sign,
    /// Item-moving container.
    Hopper,
    /// A block in transit between piston cells.
    PistonMoving,
    /// Spawns mobs on a timer.
    MobSpawner,
    /// Runs a command when triggered.
    CommandBlock,
    /// Status-effect pyramid capstone.
    Beacon,
    /// Mob head with owner data.
    Skull,
    /// Holds one plantable item.
    FlowerPot,
    /// Redstone signal comparator state.
    Comparator,
    /// Potion brewing state.
    BrewingStand,
    /// One stored note pitch.
    NoteBlock,
    /// Playing record.
    Jukebox,
    /// Sky-light sensor.
    DaylightDetector,
    /// End portal surface.
    EndPortal,
    /// Enchanting interface anchor.
    EnchantTable,
    /// Per-player ender inventory anchor.
    EnderChest,
    /// Dropper container.
    Dropper,
    /// Dispenser container.
    Dispenser,
}

impl TileEntityKind {
    /// All type tags.
    pub const ALL: [TileEntityKind; 20] = [
        TileEntityKind::Furnace,
        TileEntityKind::Chest,
        TileEntityKind::Sign,
        TileEntityKind::Hopper,
        TileEntityKind::PistonMoving,
        TileEntityKind::MobSpawner,
        TileEntityKind::CommandBlock,
        TileEntityKind::Beacon,
        TileEntityKind::Skull,
        TileEntityKind::FlowerPot,
        TileEntityKind::Comparator,
        TileEntityKind::BrewingStand,
        TileEntityKind::NoteBlock,
        TileEntityKind::Jukebox,
        TileEntityKind::DaylightDetector,
        TileEntityKind::EndPortal,
        TileEntityKind::EnchantTable,
        TileEntityKind::EnderChest,
        TileEntityKind::Dropper,
        TileEntityKind::Dispenser,
    ];

    /// The id string stored in chunk NBT.
    #[must_use]
    pub const fn nbt_id(self) -> &'static str {
        match self {
            TileEntityKind::Furnace => "Furnace",
            TileEntityKind::Chest => "Chest",
            TileEntityKind::Sign => "Sign",
            TileEntityKind::Hopper => "Hopper",
            TileEntityKind::PistonMoving => "Piston",
            TileEntityKind::MobSpawner => "MobSpawner",
            TileEntityKind::CommandBlock => "Control",
            TileEntityKind::Beacon => "Beacon",
            TileEntityKind::Skull => "Skull",
            TileEntityKind::FlowerPot => "FlowerPot",
            TileEntityKind::Comparator => "Comparator",
            TileEntityKind::BrewingStand => "Cauldron",
            TileEntityKind::NoteBlock => "Music",
            TileEntityKind::Jukebox => "RecordPlayer",
            TileEntityKind::DaylightDetector => "DLDetector",
            TileEntityKind::EndPortal => "Airportal",
            TileEntityKind::EnchantTable => "EnchantTable",
            TileEntityKind::EnderChest => "EnderChest",
            TileEntityKind::Dropper => "Dropper",
            TileEntityKind::Dispenser => "Trap",
        }
    }

    /// Reverse lookup from the persisted NBT id.
    #[must_use]
    pub fn from_nbt_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.nbt_id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nbt_ids_round_trip() {
        for kind in TileEntityKind::ALL {
            assert_eq!(TileEntityKind::from_nbt_id(kind.nbt_id()), Some(kind));
        }
        assert_eq!(TileEntityKind::from_nbt_id("NotAThing"), None);
    }
}
