//! Ore vein placement and the standard distribution table.

use basalt_registry::blocks::vanilla;
use basalt_utils::{BlockId, JavaRandom, math};

use crate::PopulateWorld;

/// One row of the ore distribution table: `count` veins of `vein_size`
/// blocks per chunk within the Y range.
pub struct OreConfig {
    /// Ore block placed.
    pub ore: BlockId,
    /// Vein size parameter.
    pub vein_size: i32,
    /// Veins attempted per chunk.
    pub count: i32,
    /// Minimum center Y (inclusive).
    pub min_y: i32,
    /// Maximum center Y (exclusive).
    pub max_y: i32,
}

/// The standard overworld ore pass, in decoration order. Lapis is absent:
/// it uses the triangle distribution below.
pub static STANDARD_ORES: &[OreConfig] = &[
    OreConfig { ore: vanilla::DIRT, vein_size: 33, count: 20, min_y: 0, max_y: 256 },
    OreConfig { ore: vanilla::GRAVEL, vein_size: 33, count: 10, min_y: 0, max_y: 256 },
    OreConfig { ore: vanilla::COAL_ORE, vein_size: 17, count: 20, min_y: 0, max_y: 128 },
    OreConfig { ore: vanilla::IRON_ORE, vein_size: 9, count: 20, min_y: 0, max_y: 64 },
    OreConfig { ore: vanilla::GOLD_ORE, vein_size: 9, count: 2, min_y: 0, max_y: 32 },
    OreConfig { ore: vanilla::REDSTONE_ORE, vein_size: 8, count: 8, min_y: 0, max_y: 16 },
    OreConfig { ore: vanilla::DIAMOND_ORE, vein_size: 8, count: 1, min_y: 0, max_y: 16 },
];

/// Lapis parameters: one vein of 7, triangle-distributed around y=16.
pub const LAPIS_VEIN_SIZE: i32 = 7;
/// Lapis distribution center.
pub const LAPIS_CENTER_Y: i32 = 16;
/// Lapis distribution spread.
pub const LAPIS_SPREAD_Y: i32 = 16;

/// Places one vein: a parametric line of overlapping ellipsoids replacing
/// `replace` with `ore`.
pub fn generate_vein(
    world: &mut dyn PopulateWorld,
    rand: &mut JavaRandom,
    x: i32,
    y: i32,
    z: i32,
    ore: BlockId,
    vein_size: i32,
    replace: BlockId,
) {
    let angle = rand.next_f32() * std::f32::consts::PI;
    let size = vein_size as f32;

    let x1 = f64::from((x + 8) as f32 + angle.sin() * size / 8.0);
    let x2 = f64::from((x + 8) as f32 - angle.sin() * size / 8.0);
    let z1 = f64::from((z + 8) as f32 + angle.cos() * size / 8.0);
    let z2 = f64::from((z + 8) as f32 - angle.cos() * size / 8.0);
    let y1 = f64::from(y + rand.next_i32_bounded(3) - 2);
    let y2 = f64::from(y + rand.next_i32_bounded(3) - 2);

    for step in 0..=vein_size {
        let t = f64::from(step) / f64::from(vein_size);
        let cx = x1 + (x2 - x1) * t;
        let cy = y1 + (y2 - y1) * t;
        let cz = z1 + (z2 - z1) * t;

        let rand_radius = rand.next_f64() * f64::from(vein_size) / 16.0;
        let profile =
            f64::from((step as f32 * std::f32::consts::PI / vein_size as f32).sin() + 1.0);
        let h_radius = profile * rand_radius + 1.0;
        let v_radius = profile * rand_radius + 1.0;

        let min_x = math::floor_f64(cx - h_radius / 2.0);
        let min_y = math::floor_f64(cy - v_radius / 2.0);
        let min_z = math::floor_f64(cz - h_radius / 2.0);
        let max_x = math::floor_f64(cx + h_radius / 2.0);
        let max_y = math::floor_f64(cy + v_radius / 2.0);
        let max_z = math::floor_f64(cz + h_radius / 2.0);

        for bx in min_x..=max_x {
            let nx = (f64::from(bx) + 0.5 - cx) / (h_radius / 2.0);
            if nx * nx >= 1.0 {
                continue;
            }
            for by in min_y..=max_y {
                let ny = (f64::from(by) + 0.5 - cy) / (v_radius / 2.0);
                if nx * nx + ny * ny >= 1.0 {
                    continue;
                }
                for bz in min_z..=max_z {
                    let nz = (f64::from(bz) + 0.5 - cz) / (h_radius / 2.0);
                    if nx * nx + ny * ny + nz * nz >= 1.0 {
                        continue;
                    }
                    if world.block(bx, by, bz) == replace {
                        world.set_block(bx, by, bz, ore, 0);
                    }
                }
            }
        }
    }
}

/// Runs the whole ore pass for a chunk anchored at `(base_x, base_z)`.
pub fn decorate_ores(world: &mut dyn PopulateWorld, rand: &mut JavaRandom, base_x: i32, base_z: i32) {
    for config in STANDARD_ORES {
        for _ in 0..config.count {
            let x = base_x + rand.next_i32_bounded(16);
            let y = config.min_y + rand.next_i32_bounded(config.max_y - config.min_y);
            let z = base_z + rand.next_i32_bounded(16);
            generate_vein(world, rand, x, y, z, config.ore, config.vein_size, vanilla::STONE);
        }
    }

    // Lapis: triangle distribution, peak at the center.
    let x = base_x + rand.next_i32_bounded(16);
    let y = rand.next_i32_bounded(LAPIS_SPREAD_Y) + rand.next_i32_bounded(LAPIS_SPREAD_Y)
        + (LAPIS_CENTER_Y - LAPIS_SPREAD_Y);
    let z = base_z + rand.next_i32_bounded(16);
    generate_vein(world, rand, x, y, z, vanilla::LAPIS_ORE, LAPIS_VEIN_SIZE, vanilla::STONE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    struct StoneWorld {
        blocks: FxHashMap<(i32, i32, i32), (BlockId, u8)>,
    }

    impl StoneWorld {
        fn new() -> Self {
            Self { blocks: FxHashMap::default() }
        }
    }

    impl PopulateWorld for StoneWorld {
        fn block(&self, x: i32, y: i32, z: i32) -> BlockId {
            if !(0..256).contains(&y) {
                return vanilla::AIR;
            }
            self.blocks
                .get(&(x, y, z))
                .map_or(vanilla::STONE, |&(id, _)| id)
        }

        fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockId, meta: u8) {
            self.blocks.insert((x, y, z), (id, meta));
        }

        fn biome(&self, _x: i32, _z: i32) -> u8 {
            1
        }

        fn height(&self, _x: i32, _z: i32) -> i32 {
            64
        }
    }

    #[test]
    fn vein_replaces_only_stone() {
        let mut world = StoneWorld::new();
        world.set_block(10, 30, 10, vanilla::DIRT, 0);
        let mut rand = JavaRandom::new(5);
        generate_vein(&mut world, &mut rand, 4, 30, 4, vanilla::COAL_ORE, 17, vanilla::STONE);
        let placed = world
            .blocks
            .values()
            .filter(|&&(id, _)| id == vanilla::COAL_ORE)
            .count();
        assert!(placed > 0, "vein placed nothing");
        assert_ne!(world.block(10, 30, 10), vanilla::COAL_ORE);
    }

    #[test]
    fn vein_is_deterministic() {
        let run = || {
            let mut world = StoneWorld::new();
            let mut rand = JavaRandom::new(77);
            generate_vein(&mut world, &mut rand, 0, 12, 0, vanilla::DIAMOND_ORE, 8, vanilla::STONE);
            let mut placed: Vec<_> = world
                .blocks
                .iter()
                .filter(|&(_, &(id, _))| id == vanilla::DIAMOND_ORE)
                .map(|(&pos, _)| pos)
                .collect();
            placed.sort_unstable();
            placed
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn full_ore_pass_stays_in_bounds() {
        let mut world = StoneWorld::new();
        let mut rand = JavaRandom::new(99);
        decorate_ores(&mut world, &mut rand, 0, 0);
        for (&(_, y, _), &(id, _)) in &world.blocks {
            if id == vanilla::DIAMOND_ORE {
                assert!(y < 16 + 4, "diamond above its band: y={y}");
            }
        }
    }
}
