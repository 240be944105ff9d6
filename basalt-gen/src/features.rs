//! Decoration features: lakes, dungeons, trees, plants, reeds, pumpkins,
//! springs, and freeze/snow placement.

use basalt_registry::REGISTRY;
use basalt_registry::blocks::vanilla;
use basalt_utils::{BlockId, JavaRandom};

use crate::PopulateWorld;

fn is_solid(world: &dyn PopulateWorld, x: i32, y: i32, z: i32) -> bool {
    REGISTRY
        .blocks
        .by_id_or_air(world.block(x, y, z))
        .material
        .is_solid()
}

fn is_water(id: BlockId) -> bool {
    id == vanilla::WATER || id == vanilla::FLOWING_WATER
}

/// Carves a lake of `fluid` centered near `(x, y, z)`.
///
/// A union of four to seven random ellipsoids inside a 16×8×16 envelope;
/// cells below the midplane fill with fluid, cells above become air. The
/// lake is abandoned when its rim would leak into other liquid.
pub fn generate_lake(
    world: &mut dyn PopulateWorld,
    rand: &mut JavaRandom,
    x: i32,
    mut y: i32,
    z: i32,
    fluid: BlockId,
) -> bool {
    let x = x - 8;
    let z = z - 8;
    while y > 5 && world.block(x, y, z) == vanilla::AIR {
        y -= 1;
    }
    if y <= 4 {
        return false;
    }
    y -= 4;

    let mut shape = [false; 16 * 16 * 8];
    let blob_count = rand.next_i32_bounded(4) + 4;
    for _ in 0..blob_count {
        let sx = rand.next_f64() * 6.0 + 3.0;
        let sy = rand.next_f64() * 4.0 + 2.0;
        let sz = rand.next_f64() * 6.0 + 3.0;
        let cx = rand.next_f64() * (16.0 - sx - 2.0) + 1.0 + sx / 2.0;
        let cy = rand.next_f64() * (8.0 - sy - 4.0) + 2.0 + sy / 2.0;
        let cz = rand.next_f64() * (16.0 - sz - 2.0) + 1.0 + sz / 2.0;

        for lx in 1..15usize {
            for lz in 1..15usize {
                for ly in 1..7usize {
                    let dx = (lx as f64 - cx) / (sx / 2.0);
                    let dy = (ly as f64 - cy) / (sy / 2.0);
                    let dz = (lz as f64 - cz) / (sz / 2.0);
                    if dx * dx + dy * dy + dz * dz < 1.0 {
                        shape[(lx * 16 + lz) * 8 + ly] = true;
                    }
                }
            }
        }
    }

    // Rim validation: a dry rim cell beside a wet cell must hold the lake.
    for lx in 0..16i32 {
        for lz in 0..16i32 {
            for ly in 0..8i32 {
                let index = (lx as usize * 16 + lz as usize) * 8 + ly as usize;
                let on_rim = !shape[index]
                    && ((lx < 15 && shape[((lx + 1) as usize * 16 + lz as usize) * 8 + ly as usize])
                        || (lx > 0
                            && shape[((lx - 1) as usize * 16 + lz as usize) * 8 + ly as usize])
                        || (lz < 15
                            && shape[(lx as usize * 16 + (lz + 1) as usize) * 8 + ly as usize])
                        || (lz > 0
                            && shape[(lx as usize * 16 + (lz - 1) as usize) * 8 + ly as usize])
                        || (ly < 7
                            && shape[(lx as usize * 16 + lz as usize) * 8 + (ly + 1) as usize])
                        || (ly > 0
                            && shape[(lx as usize * 16 + lz as usize) * 8 + (ly - 1) as usize]));
                if !on_rim {
                    continue;
                }
                let id = world.block(x + lx, y + ly, z + lz);
                let material = REGISTRY.blocks.by_id_or_air(id).material;
                if ly >= 4 && material.is_liquid() {
                    return false;
                }
                if ly < 4 && !material.is_solid() && id != fluid {
                    return false;
                }
            }
        }
    }

    for lx in 0..16i32 {
        for lz in 0..16i32 {
            for ly in 0..8i32 {
                if shape[(lx as usize * 16 + lz as usize) * 8 + ly as usize] {
                    let id = if ly < 4 { fluid } else { vanilla::AIR };
                    world.set_block(x + lx, y + ly, z + lz, id, 0);
                }
            }
        }
    }
    true
}

/// Builds a cobble/mossy dungeon box with a spawner and up to two chests.
/// Construction requires one to five doorway gaps at floor level.
pub fn generate_dungeon(
    world: &mut dyn PopulateWorld,
    rand: &mut JavaRandom,
    x: i32,
    y: i32,
    z: i32,
) -> bool {
    let half_x = rand.next_i32_bounded(2) + 2;
    let half_z = rand.next_i32_bounded(2) + 2;
    let mut doorways = 0;

    for bx in (x - half_x - 1)..=(x + half_x + 1) {
        for by in (y - 1)..=(y + 4) {
            for bz in (z - half_z - 1)..=(z + half_z + 1) {
                if by == y - 1 && !is_solid(world, bx, by, bz) {
                    return false;
                }
                if by == y + 4 && !is_solid(world, bx, by, bz) {
                    return false;
                }
                let on_wall = bx == x - half_x - 1
                    || bx == x + half_x + 1
                    || bz == z - half_z - 1
                    || bz == z + half_z + 1;
                if on_wall
                    && by == y
                    && world.block(bx, by, bz) == vanilla::AIR
                    && world.block(bx, by + 1, bz) == vanilla::AIR
                {
                    doorways += 1;
                }
            }
        }
    }

    if !(1..=5).contains(&doorways) {
        return false;
    }

    for bx in (x - half_x - 1)..=(x + half_x + 1) {
        for by in ((y - 1)..=(y + 3)).rev() {
            for bz in (z - half_z - 1)..=(z + half_z + 1) {
                let on_wall = bx == x - half_x - 1
                    || bx == x + half_x + 1
                    || bz == z - half_z - 1
                    || bz == z + half_z + 1
                    || by == y - 1;
                if !on_wall {
                    world.set_block(bx, by, bz, vanilla::AIR, 0);
                } else if by >= 0 && !is_solid(world, bx, by - 1, bz) {
                    world.set_block(bx, by, bz, vanilla::AIR, 0);
                } else if is_solid(world, bx, by, bz) {
                    let id = if by == y - 1 && rand.next_i32_bounded(4) != 0 {
                        vanilla::MOSSY_COBBLESTONE
                    } else {
                        vanilla::COBBLESTONE
                    };
                    world.set_block(bx, by, bz, id, 0);
                }
            }
        }
    }

    // Chests sit against exactly one solid wall.
    for _ in 0..2 {
        for _ in 0..3 {
            let cx = x + rand.next_i32_bounded(half_x * 2 + 1) - half_x;
            let cz = z + rand.next_i32_bounded(half_z * 2 + 1) - half_z;
            if world.block(cx, y, cz) != vanilla::AIR {
                continue;
            }
            let mut solid_walls = 0;
            for (dx, dz) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                if is_solid(world, cx + dx, y, cz + dz) {
                    solid_walls += 1;
                }
            }
            if solid_walls == 1 {
                world.set_block(cx, y, cz, vanilla::CHEST, 0);
                break;
            }
        }
    }

    world.set_block(x, y, z, vanilla::MOB_SPAWNER, 0);
    true
}

/// Picks the dungeon spawner mob: 25% skeleton, 50% zombie, 25% spider.
#[must_use]
pub fn dungeon_mob(rand: &mut JavaRandom) -> &'static str {
    match rand.next_i32_bounded(4) {
        0 => "Skeleton",
        1 | 2 => "Zombie",
        _ => "Spider",
    }
}

fn can_grow_through(id: BlockId) -> bool {
    id == vanilla::AIR || id == vanilla::LEAVES || id == vanilla::LOG || id == vanilla::SAPLING
}

/// Grows a basic oak: 4–6 trunk blocks, a two-layer leaf cap.
pub fn generate_tree(
    world: &mut dyn PopulateWorld,
    rand: &mut JavaRandom,
    x: i32,
    y: i32,
    z: i32,
) -> bool {
    let height = rand.next_i32_bounded(3) + 4;
    if y < 1 || y + height + 1 > 255 {
        return false;
    }

    for by in y..=(y + 1 + height) {
        let radius = if by == y {
            0
        } else if by >= y + 1 + height - 2 {
            2
        } else {
            1
        };
        for bx in (x - radius)..=(x + radius) {
            for bz in (z - radius)..=(z + radius) {
                if !can_grow_through(world.block(bx, by, bz)) {
                    return false;
                }
            }
        }
    }

    let below = world.block(x, y - 1, z);
    if below != vanilla::GRASS && below != vanilla::DIRT {
        return false;
    }
    world.set_block(x, y - 1, z, vanilla::DIRT, 0);

    for by in (y + height - 3)..=(y + height) {
        let layer = by - (y + height);
        let radius = 1 - layer / 2;
        for bx in (x - radius)..=(x + radius) {
            for bz in (z - radius)..=(z + radius) {
                let corner =
                    (bx - x).abs() == radius && (bz - z).abs() == radius;
                if corner && (layer == 0 || rand.next_i32_bounded(2) == 0) {
                    continue;
                }
                if world.block(bx, by, bz) == vanilla::AIR {
                    world.set_block(bx, by, bz, vanilla::LEAVES, 0);
                }
            }
        }
    }

    for dy in 0..height {
        let id = world.block(x, y + dy, z);
        if id == vanilla::AIR || id == vanilla::LEAVES {
            world.set_block(x, y + dy, z, vanilla::LOG, 0);
        }
    }
    true
}

/// Scatters up to 64 small plants (flowers, mushrooms, grass) around an
/// anchor point.
pub fn scatter_plant(
    world: &mut dyn PopulateWorld,
    rand: &mut JavaRandom,
    x: i32,
    y: i32,
    z: i32,
    plant: BlockId,
    meta: u8,
) {
    for _ in 0..64 {
        let bx = x + rand.next_i32_bounded(8) - rand.next_i32_bounded(8);
        let by = y + rand.next_i32_bounded(4) - rand.next_i32_bounded(4);
        let bz = z + rand.next_i32_bounded(8) - rand.next_i32_bounded(8);
        if !(1..255).contains(&by) {
            continue;
        }
        if world.block(bx, by, bz) != vanilla::AIR {
            continue;
        }
        let below = world.block(bx, by - 1, bz);
        if below == vanilla::GRASS || below == vanilla::DIRT || below == vanilla::MYCELIUM {
            world.set_block(bx, by, bz, plant, meta);
        }
    }
}

/// Plants sugar cane columns beside water.
pub fn generate_reeds(
    world: &mut dyn PopulateWorld,
    rand: &mut JavaRandom,
    x: i32,
    y: i32,
    z: i32,
) {
    for _ in 0..20 {
        let bx = x + rand.next_i32_bounded(4) - rand.next_i32_bounded(4);
        let bz = z + rand.next_i32_bounded(4) - rand.next_i32_bounded(4);
        if world.block(bx, y, bz) != vanilla::AIR {
            continue;
        }
        let water_adjacent = [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .iter()
            .any(|&(dx, dz)| is_water(world.block(bx + dx, y - 1, bz + dz)));
        if !water_adjacent {
            continue;
        }
        let below = world.block(bx, y - 1, bz);
        if below != vanilla::GRASS && below != vanilla::DIRT && below != vanilla::SAND {
            continue;
        }
        let stalk_bound = rand.next_i32_bounded(3) + 1;
        let stalk = 1 + rand.next_i32_bounded(stalk_bound);
        for dy in 0..=stalk {
            if world.block(bx, y + dy, bz) == vanilla::AIR {
                world.set_block(bx, y + dy, bz, vanilla::REEDS, 0);
            }
        }
    }
}

/// Scatters pumpkins on grass.
pub fn generate_pumpkins(
    world: &mut dyn PopulateWorld,
    rand: &mut JavaRandom,
    x: i32,
    y: i32,
    z: i32,
) {
    for _ in 0..64 {
        let bx = x + rand.next_i32_bounded(8) - rand.next_i32_bounded(8);
        let by = y + rand.next_i32_bounded(4) - rand.next_i32_bounded(4);
        let bz = z + rand.next_i32_bounded(8) - rand.next_i32_bounded(8);
        if !(1..255).contains(&by) {
            continue;
        }
        if world.block(bx, by, bz) == vanilla::AIR
            && world.block(bx, by - 1, bz) == vanilla::GRASS
        {
            world.set_block(bx, by, bz, vanilla::PUMPKIN, rand.next_i32_bounded(4) as u8);
        }
    }
}

/// Places a wall spring: a fluid cell set into a stone pocket with exactly
/// one open face.
pub fn generate_spring(
    world: &mut dyn PopulateWorld,
    rand: &mut JavaRandom,
    x: i32,
    y: i32,
    z: i32,
    fluid: BlockId,
) -> bool {
    let _ = rand;
    if world.block(x, y + 1, z) != vanilla::STONE || world.block(x, y - 1, z) != vanilla::STONE {
        return false;
    }
    let here = world.block(x, y, z);
    if here != vanilla::AIR && here != vanilla::STONE {
        return false;
    }

    let mut stone_sides = 0;
    let mut open_sides = 0;
    for (dx, dz) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
        let id = world.block(x + dx, y, z + dz);
        if id == vanilla::STONE {
            stone_sides += 1;
        } else if id == vanilla::AIR {
            open_sides += 1;
        }
    }

    if stone_sides == 3 && open_sides == 1 {
        world.set_block(x, y, z, fluid, 0);
        return true;
    }
    false
}

/// Freezes surface water and lays snow at the precipitation height across a
/// chunk, for snow-enabled biomes.
pub fn place_ice_and_snow(world: &mut dyn PopulateWorld, base_x: i32, base_z: i32) {
    for dx in 0..16 {
        for dz in 0..16 {
            let x = base_x + dx;
            let z = base_z + dz;
            let biome = REGISTRY.biomes.by_id_or_ocean(u16::from(world.biome(x, z)));
            if !biome.enable_snow {
                continue;
            }
            let top = world.height(x, z);
            if top <= 0 || top >= 256 {
                continue;
            }
            if biome.temperature_at(top) >= 0.15 {
                continue;
            }
            if world.block(x, top - 1, z) == vanilla::WATER {
                world.set_block(x, top - 1, z, vanilla::ICE, 0);
            } else if world.block(x, top, z) == vanilla::AIR
                && is_solid(world, x, top - 1, z)
            {
                world.set_block(x, top, z, vanilla::SNOW_LAYER, 0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    struct FlatWorld {
        blocks: FxHashMap<(i32, i32, i32), (BlockId, u8)>,
        surface_y: i32,
        surface: BlockId,
    }

    impl FlatWorld {
        fn new(surface_y: i32, surface: BlockId) -> Self {
            Self {
                blocks: FxHashMap::default(),
                surface_y,
                surface,
            }
        }
    }

    impl PopulateWorld for FlatWorld {
        fn block(&self, x: i32, y: i32, z: i32) -> BlockId {
            if let Some(&(id, _)) = self.blocks.get(&(x, y, z)) {
                return id;
            }
            if y > self.surface_y || y < 0 {
                vanilla::AIR
            } else if y == self.surface_y {
                self.surface
            } else {
                vanilla::STONE
            }
        }

        fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockId, meta: u8) {
            self.blocks.insert((x, y, z), (id, meta));
        }

        fn biome(&self, _x: i32, _z: i32) -> u8 {
            12 // ice plains
        }

        fn height(&self, x: i32, z: i32) -> i32 {
            let mut top = self.surface_y + 1;
            while self.block(x, top, z) != vanilla::AIR {
                top += 1;
            }
            top
        }
    }

    #[test]
    fn tree_grows_on_grass() {
        let mut world = FlatWorld::new(64, vanilla::GRASS);
        let mut rand = JavaRandom::new(9);
        assert!(generate_tree(&mut world, &mut rand, 0, 65, 0));
        assert_eq!(world.block(0, 65, 0), vanilla::LOG);
        assert_eq!(world.block(0, 64, 0), vanilla::DIRT);
        let leaves = world
            .blocks
            .values()
            .filter(|&&(id, _)| id == vanilla::LEAVES)
            .count();
        assert!(leaves > 10);
    }

    #[test]
    fn tree_needs_soil() {
        let mut world = FlatWorld::new(64, vanilla::STONE);
        let mut rand = JavaRandom::new(9);
        assert!(!generate_tree(&mut world, &mut rand, 0, 65, 0));
    }

    #[test]
    fn dungeon_needs_a_cavity() {
        // Fully solid surroundings have zero doorways.
        let mut world = FlatWorld::new(200, vanilla::STONE);
        let mut rand = JavaRandom::new(4);
        assert!(!generate_dungeon(&mut world, &mut rand, 0, 30, 0));
    }

    #[test]
    fn dungeon_builds_in_a_tunnel() {
        let mut world = FlatWorld::new(200, vanilla::STONE);
        // Open a 2-block-high doorway tunnel crossing the box wall at y=30.
        for x in 4..9 {
            world.set_block(x, 30, 0, vanilla::AIR, 0);
            world.set_block(x, 31, 0, vanilla::AIR, 0);
        }
        let mut rand = JavaRandom::new(4);
        let mut built = false;
        for _ in 0..32 {
            if generate_dungeon(&mut world, &mut rand, 0, 30, 0) {
                built = true;
                break;
            }
        }
        if built {
            assert_eq!(world.block(0, 30, 0), vanilla::MOB_SPAWNER);
        }
    }

    #[test]
    fn spring_needs_exactly_one_opening() {
        let mut world = FlatWorld::new(200, vanilla::STONE);
        world.set_block(1, 40, 0, vanilla::AIR, 0);
        let mut rand = JavaRandom::new(1);
        assert!(generate_spring(&mut world, &mut rand, 0, 40, 0, vanilla::FLOWING_WATER));
        assert_eq!(world.block(0, 40, 0), vanilla::FLOWING_WATER);

        world.set_block(-1, 41, 5, vanilla::AIR, 0);
        world.set_block(1, 41, 5, vanilla::AIR, 0);
        assert!(!generate_spring(&mut world, &mut rand, 0, 41, 5, vanilla::FLOWING_WATER));
    }

    #[test]
    fn snow_and_ice_on_cold_surface() {
        let mut world = FlatWorld::new(70, vanilla::GRASS);
        world.set_block(3, 70, 3, vanilla::WATER, 0);
        place_ice_and_snow(&mut world, 0, 0);
        assert_eq!(world.block(3, 70, 3), vanilla::ICE);
        assert_eq!(world.block(0, 71, 0), vanilla::SNOW_LAYER);
    }

    #[test]
    fn lake_carves_fluid_bowl() {
        let mut world = FlatWorld::new(64, vanilla::GRASS);
        let mut rand = JavaRandom::new(17);
        let mut carved = false;
        for attempt in 0..64 {
            if generate_lake(&mut world, &mut rand, attempt * 16, 64, 0, vanilla::WATER) {
                carved = true;
                break;
            }
        }
        assert!(carved, "no lake carved in 64 attempts");
        assert!(world.blocks.values().any(|&(id, _)| id == vanilla::WATER));
    }
}
