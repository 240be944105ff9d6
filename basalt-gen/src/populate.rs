//! The one-time decoration pass, applied once a chunk's 2×2 neighborhood is
//! present. Everything draws from the populate seed in a fixed order.

use basalt_registry::REGISTRY;
use basalt_registry::biome::Biome;
use basalt_registry::blocks::vanilla;
use basalt_utils::{ChunkPos, JavaRandom};

use crate::overworld::OverworldGenerator;
use crate::structures::{StructureKind, starts_in_chunk};
use crate::{PopulateWorld, SEA_LEVEL, features, ore};

/// Derives the populate seed:
/// `chunkX·L1 + chunkZ·L2 ^ worldSeed` where L1/L2 are the first two odd
/// longs of the world-seeded stream.
#[must_use]
pub fn populate_seed(world_seed: i64, chunk_x: i32, chunk_z: i32) -> i64 {
    let mut rand = JavaRandom::new(world_seed);
    let l1 = rand.next_i64() / 2 * 2 + 1;
    let l2 = rand.next_i64() / 2 * 2 + 1;
    (i64::from(chunk_x).wrapping_mul(l1)).wrapping_add(i64::from(chunk_z).wrapping_mul(l2))
        ^ world_seed
}

/// Trees attempted per chunk for a biome.
fn tree_count(biome: &Biome) -> i32 {
    match biome.id {
        4 | 18 | 27 | 28 | 29 => 10, // forests
        21 | 22 => 50,               // jungle
        23 => 2,                     // jungle edge
        5 | 19 | 30 | 31 | 32 | 33 => 10, // taigas
        6 => 2,                      // swamp
        34 => 3,                     // extreme hills+
        35 | 36 => 1,                // savanna
        _ => 0,
    }
}

/// Tall-grass clusters attempted per chunk for a biome.
fn grass_count(biome: &Biome) -> i32 {
    match biome.id {
        1 => 10,
        4 | 18 | 27 | 28 | 29 => 2,
        21 | 22 | 23 => 25,
        35 | 36 => 20,
        6 => 5,
        _ => 1,
    }
}

/// Runs the full overworld populate pass for `pos`.
pub fn populate_overworld(
    generator: &OverworldGenerator,
    world: &mut dyn PopulateWorld,
    world_seed: i64,
    pos: ChunkPos,
    map_features: bool,
) {
    let mut rand = JavaRandom::new(populate_seed(world_seed, pos.x, pos.z));
    let base_x = pos.min_block_x();
    let base_z = pos.min_block_z();

    let biome = REGISTRY
        .biomes
        .by_id_or_ocean(generator.biome_field().block_biome(base_x + 16, base_z + 16));

    let has_village =
        map_features && starts_in_chunk(StructureKind::Village, world_seed, pos.x, pos.z);

    // Water lake: skipped in deserts and under villages.
    if !biome.is_desert() && !has_village && rand.next_i32_bounded(4) == 0 {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let y = rand.next_i32_bounded(256);
        let z = base_z + rand.next_i32_bounded(16) + 8;
        features::generate_lake(world, &mut rand, x, y, z, vanilla::WATER);
    }

    // Lava lake: rarer, and mostly below sea level.
    if !has_village && rand.next_i32_bounded(8) == 0 {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let y_bound = rand.next_i32_bounded(248) + 8;
        let y = rand.next_i32_bounded(y_bound);
        let z = base_z + rand.next_i32_bounded(16) + 8;
        if y < SEA_LEVEL || rand.next_i32_bounded(10) == 0 {
            features::generate_lake(world, &mut rand, x, y, z, vanilla::LAVA);
        }
    }

    // Eight dungeon attempts.
    for _ in 0..8 {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let y = rand.next_i32_bounded(256);
        let z = base_z + rand.next_i32_bounded(16) + 8;
        features::generate_dungeon(world, &mut rand, x, y, z);
    }

    // Ores.
    ore::decorate_ores(world, &mut rand, base_x, base_z);

    // Trees.
    let mut trees = tree_count(biome);
    if rand.next_i32_bounded(10) == 0 {
        trees += 1;
    }
    for _ in 0..trees {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let z = base_z + rand.next_i32_bounded(16) + 8;
        let y = world.height(x, z);
        features::generate_tree(world, &mut rand, x, y, z);
    }

    // Flowers and grass.
    for _ in 0..2 {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let y = rand.next_i32_bounded(128);
        let z = base_z + rand.next_i32_bounded(16) + 8;
        features::scatter_plant(world, &mut rand, x, y, z, vanilla::YELLOW_FLOWER, 0);
    }
    for _ in 0..grass_count(biome) {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let y = rand.next_i32_bounded(128);
        let z = base_z + rand.next_i32_bounded(16) + 8;
        features::scatter_plant(world, &mut rand, x, y, z, vanilla::TALLGRASS, 1);
    }

    // Mushrooms.
    if rand.next_i32_bounded(4) == 0 {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let y = rand.next_i32_bounded(128);
        let z = base_z + rand.next_i32_bounded(16) + 8;
        features::scatter_plant(world, &mut rand, x, y, z, vanilla::BROWN_MUSHROOM, 0);
    }
    if rand.next_i32_bounded(8) == 0 {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let y = rand.next_i32_bounded(128);
        let z = base_z + rand.next_i32_bounded(16) + 8;
        features::scatter_plant(world, &mut rand, x, y, z, vanilla::RED_MUSHROOM, 0);
    }

    // Reeds.
    for _ in 0..10 {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let z = base_z + rand.next_i32_bounded(16) + 8;
        let y = world.height(x, z);
        features::generate_reeds(world, &mut rand, x, y, z);
    }

    // Pumpkins: one patch in 32 chunks.
    if rand.next_i32_bounded(32) == 0 {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let z = base_z + rand.next_i32_bounded(16) + 8;
        let y = world.height(x, z);
        features::generate_pumpkins(world, &mut rand, x, y, z);
    }

    // Springs.
    for _ in 0..50 {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let y_bound = rand.next_i32_bounded(248) + 8;
        let y = rand.next_i32_bounded(y_bound);
        let z = base_z + rand.next_i32_bounded(16) + 8;
        features::generate_spring(world, &mut rand, x, y, z, vanilla::FLOWING_WATER);
    }
    for _ in 0..20 {
        let x = base_x + rand.next_i32_bounded(16) + 8;
        let y_bound_inner = rand.next_i32_bounded(240) + 8;
        let y_bound = rand.next_i32_bounded(y_bound_inner) + 8;
        let y = rand.next_i32_bounded(y_bound);
        let z = base_z + rand.next_i32_bounded(16) + 8;
        features::generate_spring(world, &mut rand, x, y, z, vanilla::FLOWING_LAVA);
    }

    // World-gen passive mobs.
    if biome.enable_rain || biome.enable_snow {
        while rand.next_f32() < 0.1 {
            let name = match rand.next_i32_bounded(4) {
                0 => "Sheep",
                1 => "Pig",
                2 => "Chicken",
                _ => "Cow",
            };
            let pack_x = base_x + rand.next_i32_bounded(16) + 8;
            let pack_z = base_z + rand.next_i32_bounded(16) + 8;
            for _ in 0..4 {
                let x = pack_x + rand.next_i32_bounded(5) - rand.next_i32_bounded(5);
                let z = pack_z + rand.next_i32_bounded(5) - rand.next_i32_bounded(5);
                let y = world.height(x, z);
                world.spawn_creature(name, f64::from(x) + 0.5, f64::from(y), f64::from(z) + 0.5);
            }
        }
    }

    // Ice and snow at the precipitation height.
    features::place_ice_and_snow(world, base_x + 8, base_z + 8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_seed_known_values() {
        // The two odd multipliers derive from the world seed alone, so the
        // populate seed is linear in the chunk coordinates (up to the xor).
        let seed = populate_seed(1234, 0, 0);
        assert_eq!(seed, 1234 ^ 0);
        assert_ne!(populate_seed(1234, 1, 0), populate_seed(1234, 0, 1));
        assert_eq!(populate_seed(1234, 5, -3), populate_seed(1234, 5, -3));
    }

    #[test]
    fn odd_multipliers() {
        let mut rand = JavaRandom::new(977);
        let l1 = rand.next_i64() / 2 * 2 + 1;
        let l2 = rand.next_i64() / 2 * 2 + 1;
        assert!(l1 % 2 != 0);
        assert!(l2 % 2 != 0);
    }
}
