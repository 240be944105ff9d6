//! The entity type table: 57 types, 24 with spawn-egg colors.

use rustc_hash::FxHashMap;

/// A reference into the entity type table.
pub type EntityTypeRef = &'static EntityType;

/// One entry of the entity type table.
#[derive(Debug)]
pub struct EntityType {
    /// Persisted entity id string, e.g. `Zombie`.
    pub name: &'static str,
    /// Numeric network id.
    pub id: u8,
    /// Spawn-egg base and spot colors, for the 24 egg-spawnable types.
    pub egg_colors: Option<(u32, u32)>,
}

const fn plain(name: &'static str, id: u8) -> EntityType {
    EntityType {
        name,
        id,
        egg_colors: None,
    }
}

const fn egg(name: &'static str, id: u8, base: u32, spots: u32) -> EntityType {
    EntityType {
        name,
        id,
        egg_colors: Some((base, spots)),
    }
}

/// The static entity type table.
static ENTITY_TYPES: &[EntityType] = &[
    plain("Item", 1),
    plain("XPOrb", 2),
    plain("LeashKnot", 8),
    plain("Painting", 9),
    plain("Arrow", 10),
    plain("Snowball", 11),
    plain("Fireball", 12),
    plain("SmallFireball", 13),
    plain("ThrownEnderpearl", 14),
    plain("EyeOfEnderSignal", 15),
    plain("ThrownPotion", 16),
    plain("ThrownExpBottle", 17),
    plain("ItemFrame", 18),
    plain("WitherSkull", 19),
    plain("PrimedTnt", 20),
    plain("FallingSand", 21),
    plain("FireworksRocketEntity", 22),
    plain("MinecartCommandBlock", 40),
    plain("Boat", 41),
    plain("MinecartRideable", 42),
    plain("MinecartChest", 43),
    plain("MinecartFurnace", 44),
    plain("MinecartTNT", 45),
    plain("MinecartHopper", 46),
    plain("MinecartSpawner", 47),
    plain("Mob", 48),
    plain("Monster", 49),
    egg("Creeper", 50, 894_731, 0),
    egg("Skeleton", 51, 0x00C1_C1C1, 0x0049_4949),
    egg("Spider", 52, 3_419_431, 11_013_646),
    plain("Giant", 53),
    egg("Zombie", 54, 44_975, 7_969_893),
    egg("Slime", 55, 5_349_438, 8_306_542),
    egg("Ghast", 56, 0x00F9_F9F9, 0x00BC_BCBC),
    egg("PigZombie", 57, 15_373_203, 5_009_705),
    egg("Enderman", 58, 0x0016_1616, 0),
    egg("CaveSpider", 59, 803_406, 11_013_646),
    egg("Silverfish", 60, 0x006E_6E6E, 0x0030_3030),
    egg("Blaze", 61, 16_167_425, 16_775_294),
    egg("LavaSlime", 62, 0x0034_0000, 0x00FC_FC00),
    plain("EnderDragon", 63),
    plain("WitherBoss", 64),
    egg("Bat", 65, 4_996_656, 986_895),
    egg("Witch", 66, 0x0034_0000, 5_349_438),
    egg("Pig", 90, 15_771_042, 14_377_823),
    egg("Sheep", 91, 0x00E7_E7E7, 0x00FF_B5B5),
    egg("Cow", 92, 4_470_310, 0x00A1_A1A1),
    egg("Chicken", 93, 0x00A1_A1A1, 0x00FF_0000),
    egg("Squid", 94, 2_243_405, 7_375_001),
    egg("Wolf", 95, 0x00D7_D3D3, 13_545_366),
    egg("MushroomCow", 96, 10_489_616, 0x00B7_B7B7),
    plain("SnowMan", 97),
    egg("Ozelot", 98, 15_720_061, 5_653_556),
    plain("VillagerGolem", 99),
    egg("EntityHorse", 100, 12_623_485, 0x00EE_E500),
    egg("Villager", 120, 5_651_507, 12_422_002),
    plain("EnderCrystal", 200),
];

/// Lookup structure over the entity type table.
pub struct EntityTypeRegistry {
    by_id: FxHashMap<u8, EntityTypeRef>,
    by_name: FxHashMap<&'static str, EntityTypeRef>,
}

impl EntityTypeRegistry {
    /// Builds the vanilla entity type indexes.
    #[must_use]
    pub fn vanilla() -> Self {
        let mut by_id = FxHashMap::default();
        let mut by_name = FxHashMap::default();
        for entity_type in ENTITY_TYPES {
            by_id.insert(entity_type.id, entity_type);
            by_name.insert(entity_type.name, entity_type);
        }
        Self { by_id, by_name }
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        ENTITY_TYPES.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        ENTITY_TYPES.is_empty()
    }

    /// Looks a type up by numeric id.
    #[must_use]
    pub fn by_id(&self, id: u8) -> Option<EntityTypeRef> {
        self.by_id.get(&id).copied()
    }

    /// Looks a type up by persisted name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<EntityTypeRef> {
        self.by_name.get(name).copied()
    }

    /// Iterates all types.
    pub fn iter(&self) -> impl Iterator<Item = EntityTypeRef> {
        ENTITY_TYPES.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifty_seven_types_24_eggs() {
        let registry = EntityTypeRegistry::vanilla();
        assert_eq!(registry.len(), 57);
        let eggs = registry.iter().filter(|t| t.egg_colors.is_some()).count();
        assert_eq!(eggs, 24);
    }

    #[test]
    fn lookups() {
        let registry = EntityTypeRegistry::vanilla();
        assert_eq!(registry.by_name("Zombie").unwrap().id, 54);
        assert_eq!(registry.by_id(120).unwrap().name, "Villager");
        assert!(registry.by_id(255).is_none());
    }
}
