//! The biome table: ids 0–39 plus mutated variants at `id + 128`.

use basalt_utils::BlockId;

use crate::blocks::vanilla;

/// Offset added to a base biome id for its mutated variant.
pub const MUTATION_OFFSET: u16 = 128;

/// Temperature buckets used by spawning and decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempCategory {
    /// Temperature below 0.2.
    Cold,
    /// Temperature in `[0.2, 1.0)`.
    Medium,
    /// Temperature 1.0 and above.
    Warm,
}

/// One biome entry.
#[derive(Debug, Clone)]
pub struct Biome {
    /// Biome id.
    pub id: u16,
    /// Display name.
    pub name: &'static str,
    /// Base temperature.
    pub temperature: f32,
    /// Rainfall amount.
    pub rainfall: f32,
    /// Terrain base height offset fed into the density field.
    pub root_height: f32,
    /// Terrain height variation fed into the density field.
    pub variation: f32,
    /// Whether precipitation freezes.
    pub enable_snow: bool,
    /// Whether it rains at all.
    pub enable_rain: bool,
    /// Surface block.
    pub top_block: BlockId,
    /// Sub-surface filler block.
    pub filler_block: BlockId,
    /// Mutated variant id, when one exists.
    pub mutated_variant: Option<u16>,
}

impl Biome {
    /// Temperature bucket for this biome.
    #[must_use]
    pub fn temp_category(&self) -> TempCategory {
        if self.temperature < 0.2 {
            TempCategory::Cold
        } else if self.temperature < 1.0 {
            TempCategory::Medium
        } else {
            TempCategory::Warm
        }
    }

    /// Temperature at a given height; above y=64 it drops with altitude.
    #[must_use]
    pub fn temperature_at(&self, y: i32) -> f32 {
        if y > 64 {
            self.temperature - (y - 64) as f32 * 0.05 / 30.0
        } else {
            self.temperature
        }
    }

    /// Whether this biome counts as a desert for lake placement.
    #[must_use]
    pub fn is_desert(&self) -> bool {
        matches!(self.id, 2 | 17 | 130 | 145)
    }
}

/// Terrain height presets shared between biome entries.
struct Height {
    root: f32,
    variation: f32,
}

const DEFAULT: Height = Height { root: 0.1, variation: 0.2 };
const SHALLOW_WATERS: Height = Height { root: -0.5, variation: 0.0 };
const OCEANS: Height = Height { root: -1.0, variation: 0.1 };
const DEEP_OCEANS: Height = Height { root: -1.8, variation: 0.1 };
const LOW_PLAINS: Height = Height { root: 0.125, variation: 0.05 };
const MID_PLAINS: Height = Height { root: 0.2, variation: 0.2 };
const LOW_HILLS: Height = Height { root: 0.45, variation: 0.3 };
const HIGH_PLATEAUS: Height = Height { root: 1.5, variation: 0.025 };
const MID_HILLS: Height = Height { root: 1.0, variation: 0.5 };
const SHORES: Height = Height { root: 0.0, variation: 0.025 };
const ROCKY_WATERS: Height = Height { root: 0.1, variation: 0.8 };
const LOW_ISLANDS: Height = Height { root: 0.2, variation: 0.3 };
const PARTIALLY_SUBMERGED: Height = Height { root: -0.2, variation: 0.1 };

/// Base biome ids that have mutated variants.
const MUTATED_BASES: [u16; 20] = [
    1, 2, 3, 4, 5, 6, 12, 21, 23, 27, 28, 29, 30, 32, 34, 35, 36, 37, 38, 39,
];

/// Lookup structure over the biome table.
pub struct BiomeRegistry {
    biomes: Vec<Biome>,
    by_id: Vec<Option<usize>>,
}

impl BiomeRegistry {
    /// Builds the vanilla biome table.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn vanilla() -> Self {
        struct Spec(
            u16,
            &'static str,
            f32,
            f32,
            Height,
            bool,
            bool,
            BlockId,
            BlockId,
        );

        let grass = vanilla::GRASS;
        let dirt = vanilla::DIRT;
        let sand = vanilla::SAND;

        let specs = [
            Spec(0, "Ocean", 0.5, 0.5, OCEANS, false, true, grass, dirt),
            Spec(1, "Plains", 0.8, 0.4, DEFAULT, false, true, grass, dirt),
            Spec(2, "Desert", 2.0, 0.0, LOW_PLAINS, false, false, sand, sand),
            Spec(3, "Extreme Hills", 0.2, 0.3, MID_HILLS, false, true, grass, dirt),
            Spec(4, "Forest", 0.7, 0.8, DEFAULT, false, true, grass, dirt),
            Spec(5, "Taiga", 0.25, 0.8, MID_PLAINS, false, true, grass, dirt),
            Spec(6, "Swampland", 0.8, 0.9, PARTIALLY_SUBMERGED, false, true, grass, dirt),
            Spec(7, "River", 0.5, 0.5, SHALLOW_WATERS, false, true, grass, dirt),
            Spec(
                8,
                "Hell",
                2.0,
                0.0,
                DEFAULT,
                false,
                false,
                vanilla::NETHERRACK,
                vanilla::NETHERRACK,
            ),
            Spec(
                9,
                "Sky",
                0.5,
                0.5,
                DEFAULT,
                false,
                false,
                vanilla::END_STONE,
                vanilla::END_STONE,
            ),
            Spec(10, "FrozenOcean", 0.0, 0.5, OCEANS, true, true, grass, dirt),
            Spec(11, "FrozenRiver", 0.0, 0.5, SHALLOW_WATERS, true, true, grass, dirt),
            Spec(12, "Ice Plains", 0.0, 0.5, LOW_PLAINS, true, true, grass, dirt),
            Spec(13, "Ice Mountains", 0.0, 0.5, LOW_HILLS, true, true, grass, dirt),
            Spec(
                14,
                "MushroomIsland",
                0.9,
                1.0,
                LOW_ISLANDS,
                false,
                true,
                vanilla::MYCELIUM,
                dirt,
            ),
            Spec(
                15,
                "MushroomIslandShore",
                0.9,
                1.0,
                SHORES,
                false,
                true,
                vanilla::MYCELIUM,
                dirt,
            ),
            Spec(16, "Beach", 0.8, 0.4, SHORES, false, true, sand, sand),
            Spec(17, "DesertHills", 2.0, 0.0, LOW_HILLS, false, false, sand, sand),
            Spec(18, "ForestHills", 0.7, 0.8, LOW_HILLS, false, true, grass, dirt),
            Spec(19, "TaigaHills", 0.25, 0.8, LOW_HILLS, false, true, grass, dirt),
            Spec(
                20,
                "Extreme Hills Edge",
                0.2,
                0.3,
                Height { root: MID_HILLS.root * 0.5 + 0.05, variation: MID_HILLS.variation * 0.5 },
                false,
                true,
                grass,
                dirt,
            ),
            Spec(21, "Jungle", 0.95, 0.9, DEFAULT, false, true, grass, dirt),
            Spec(22, "JungleHills", 0.95, 0.9, LOW_HILLS, false, true, grass, dirt),
            Spec(23, "JungleEdge", 0.95, 0.8, DEFAULT, false, true, grass, dirt),
            Spec(24, "Deep Ocean", 0.5, 0.5, DEEP_OCEANS, false, true, grass, dirt),
            Spec(
                25,
                "Stone Beach",
                0.2,
                0.3,
                ROCKY_WATERS,
                false,
                true,
                vanilla::STONE,
                vanilla::STONE,
            ),
            Spec(26, "Cold Beach", 0.05, 0.3, SHORES, true, true, sand, sand),
            Spec(27, "Birch Forest", 0.6, 0.6, DEFAULT, false, true, grass, dirt),
            Spec(28, "Birch Forest Hills", 0.6, 0.6, LOW_HILLS, false, true, grass, dirt),
            Spec(29, "Roofed Forest", 0.7, 0.8, DEFAULT, false, true, grass, dirt),
            Spec(30, "Cold Taiga", -0.5, 0.4, MID_PLAINS, true, true, grass, dirt),
            Spec(31, "Cold Taiga Hills", -0.5, 0.4, LOW_HILLS, true, true, grass, dirt),
            Spec(32, "Mega Taiga", 0.3, 0.8, MID_PLAINS, false, true, grass, dirt),
            Spec(33, "Mega Taiga Hills", 0.3, 0.8, LOW_HILLS, false, true, grass, dirt),
            Spec(34, "Extreme Hills+", 0.2, 0.3, MID_HILLS, false, true, grass, dirt),
            Spec(35, "Savanna", 1.2, 0.0, LOW_PLAINS, false, false, grass, dirt),
            Spec(36, "Savanna Plateau", 1.0, 0.0, HIGH_PLATEAUS, false, false, grass, dirt),
            Spec(
                37,
                "Mesa",
                2.0,
                0.0,
                DEFAULT,
                false,
                false,
                sand,
                vanilla::HARDENED_CLAY,
            ),
            Spec(
                38,
                "Mesa Plateau F",
                2.0,
                0.0,
                HIGH_PLATEAUS,
                false,
                false,
                sand,
                vanilla::HARDENED_CLAY,
            ),
            Spec(
                39,
                "Mesa Plateau",
                2.0,
                0.0,
                HIGH_PLATEAUS,
                false,
                false,
                sand,
                vanilla::HARDENED_CLAY,
            ),
        ];

        let mut biomes = Vec::with_capacity(specs.len() * 2);
        for Spec(id, name, temperature, rainfall, height, snow, rain, top, filler) in specs {
            let mutated = MUTATED_BASES.contains(&id).then_some(id + MUTATION_OFFSET);
            biomes.push(Biome {
                id,
                name,
                temperature,
                rainfall,
                root_height: height.root,
                variation: height.variation,
                enable_snow: snow,
                enable_rain: rain,
                top_block: top,
                filler_block: filler,
                mutated_variant: mutated,
            });
            if let Some(mutated_id) = mutated {
                // Mutated variants keep the base climate but get a raised,
                // rougher terrain profile.
                biomes.push(Biome {
                    id: mutated_id,
                    name,
                    temperature,
                    rainfall,
                    root_height: height.root + 0.1,
                    variation: height.variation + 0.2,
                    enable_snow: snow,
                    enable_rain: rain,
                    top_block: top,
                    filler_block: filler,
                    mutated_variant: None,
                });
            }
        }

        let max_id = biomes.iter().map(|b| b.id as usize).max().unwrap_or(0);
        let mut by_id = vec![None; max_id + 1];
        for (index, biome) in biomes.iter().enumerate() {
            by_id[biome.id as usize] = Some(index);
        }
        Self { biomes, by_id }
    }

    /// Number of registered biomes, mutated variants included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    /// Looks a biome up by id.
    #[must_use]
    pub fn by_id(&self, id: u16) -> Option<&Biome> {
        let index = self.by_id.get(id as usize).copied().flatten()?;
        self.biomes.get(index)
    }

    /// Looks a biome up by id, falling back to Ocean.
    #[must_use]
    pub fn by_id_or_ocean(&self, id: u16) -> &Biome {
        self.by_id(id).unwrap_or(&self.biomes[0])
    }

    /// Iterates all biomes.
    pub fn iter(&self) -> impl Iterator<Item = &Biome> {
        self.biomes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_ids_cover_zero_to_39() {
        let registry = BiomeRegistry::vanilla();
        for id in 0..40 {
            assert!(registry.by_id(id).is_some(), "missing biome {id}");
        }
    }

    #[test]
    fn mutated_variants_exist() {
        let registry = BiomeRegistry::vanilla();
        let plains = registry.by_id(1).unwrap();
        assert_eq!(plains.mutated_variant, Some(129));
        assert!(registry.by_id(129).is_some());
        assert!(registry.by_id(128).is_none());
    }

    #[test]
    fn temp_categories() {
        let registry = BiomeRegistry::vanilla();
        assert_eq!(registry.by_id(12).unwrap().temp_category(), TempCategory::Cold);
        assert_eq!(registry.by_id(1).unwrap().temp_category(), TempCategory::Medium);
        assert_eq!(registry.by_id(2).unwrap().temp_category(), TempCategory::Warm);
    }

    #[test]
    fn desert_surface_is_sand() {
        let registry = BiomeRegistry::vanilla();
        let desert = registry.by_id(2).unwrap();
        assert!(desert.is_desert());
        assert_eq!(desert.top_block, vanilla::SAND);
        assert!(!desert.enable_rain);
    }

    #[test]
    fn altitude_cools_temperature() {
        let registry = BiomeRegistry::vanilla();
        let plains = registry.by_id(1).unwrap();
        assert!(plains.temperature_at(128) < plains.temperature_at(64));
    }
}
