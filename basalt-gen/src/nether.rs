//! The nether pipeline: same density frame with nether noise scales, a lava
//! sea at y=32, and bedrock capping both the floor and the roof.

use basalt_registry::blocks::vanilla;
use basalt_utils::{ChunkPos, JavaRandom, math};

use crate::noise::OctaveNoise;
use crate::{ChunkGenerator, PopulateWorld, RawChunk, chunk_seed};

/// Height of the nether's lava ocean.
pub const LAVA_SEA_LEVEL: i32 = 32;
/// Build ceiling of the dimension.
pub const NETHER_HEIGHT: usize = 128;

const DENSITY_XZ: f64 = 684.412;
const DENSITY_Y: f64 = 2053.236;
const INTERP_XZ: f64 = 8.555_150_000_000_001;
const INTERP_Y: f64 = 4.277_575_000_000_001;

/// The nether chunk generator.
pub struct NetherGenerator {
    world_seed: i64,
    lower_noise: OctaveNoise,
    upper_noise: OctaveNoise,
    interp_noise: OctaveNoise,
}

impl NetherGenerator {
    /// Creates the generator for a world seed.
    #[must_use]
    pub fn new(world_seed: i64) -> Self {
        let mut rand = JavaRandom::new(world_seed);
        Self {
            world_seed,
            lower_noise: OctaveNoise::new(&mut rand, 16),
            upper_noise: OctaveNoise::new(&mut rand, 16),
            interp_noise: OctaveNoise::new(&mut rand, 8),
        }
    }

    /// The 5×17×5 density grid: solid cavern walls opening toward both the
    /// floor and the roof.
    fn density_field(&self, chunk: ChunkPos) -> Vec<f64> {
        let grid_x = chunk.x * 4;
        let grid_z = chunk.z * 4;

        let lower = self.lower_noise.sample_3d(
            grid_x, 0, grid_z, 5, 17, 5, DENSITY_XZ, DENSITY_Y, DENSITY_XZ,
        );
        let upper = self.upper_noise.sample_3d(
            grid_x, 0, grid_z, 5, 17, 5, DENSITY_XZ, DENSITY_Y, DENSITY_XZ,
        );
        let interp = self.interp_noise.sample_3d(
            grid_x, 0, grid_z, 5, 17, 5, INTERP_XZ, INTERP_Y, INTERP_XZ,
        );

        let mut out = vec![0.0; 5 * 17 * 5];
        for (index, slot) in out.iter_mut().enumerate() {
            let k = index % 17;
            // Squeeze the playable band: bias density negative near the
            // floor and the roof so caverns open in the middle.
            let edge = (k as f64 - 8.0).abs() / 8.0;
            let bias = edge * edge * 24.0 - 6.0;

            let lower_val = lower[index] / 512.0;
            let upper_val = upper[index] / 512.0;
            let interp_val = (interp[index] / 10.0 + 1.0) / 2.0;
            *slot = math::denormalize_clamp(lower_val, upper_val, interp_val) - bias;
        }
        out
    }

    fn fill_terrain(densities: &[f64], chunk: &mut RawChunk) {
        for i in 0..4usize {
            for j in 0..4usize {
                let idx00 = ((i * 5) + j) * 17;
                let idx01 = ((i * 5) + j + 1) * 17;
                let idx10 = (((i + 1) * 5) + j) * 17;
                let idx11 = (((i + 1) * 5) + j + 1) * 17;

                for k in 0..16usize {
                    let mut d00 = densities[idx00 + k];
                    let mut d01 = densities[idx01 + k];
                    let mut d10 = densities[idx10 + k];
                    let mut d11 = densities[idx11 + k];
                    let dd00 = (densities[idx00 + k + 1] - d00) * 0.125;
                    let dd01 = (densities[idx01 + k + 1] - d01) * 0.125;
                    let dd10 = (densities[idx10 + k + 1] - d10) * 0.125;
                    let dd11 = (densities[idx11 + k + 1] - d11) * 0.125;

                    for yi in 0..8usize {
                        let mut x0 = d00;
                        let mut x1 = d01;
                        let ddx0 = (d10 - d00) * 0.25;
                        let ddx1 = (d11 - d01) * 0.25;

                        for xi in 0..4usize {
                            let mut dz = x0;
                            let ddz = (x1 - x0) * 0.25;

                            for zi in 0..4usize {
                                let block_x = xi + i * 4;
                                let block_z = zi + j * 4;
                                let block_y = k * 8 + yi;
                                let index = (block_x * 16 + block_z) * 256 + block_y;

                                dz += ddz;

                                chunk.blocks[index] = if dz > 0.0 {
                                    vanilla::NETHERRACK.0
                                } else if (block_y as i32) < LAVA_SEA_LEVEL {
                                    vanilla::LAVA.0
                                } else {
                                    vanilla::AIR.0
                                };
                            }

                            x0 += ddx0;
                            x1 += ddx1;
                        }

                        d00 += dd00;
                        d01 += dd01;
                        d10 += dd10;
                        d11 += dd11;
                    }
                }
            }
        }
    }

    /// Bedrock floor and roof, randomized over the bottom/top five layers.
    fn cap_bedrock(rand: &mut JavaRandom, chunk: &mut RawChunk) {
        for x in 0..16usize {
            for z in 0..16usize {
                for y in 0..5usize {
                    if y as i32 <= rand.next_i32_bounded(5) {
                        chunk.set_block(x, y, z, vanilla::BEDROCK);
                    }
                }
                for y in (NETHER_HEIGHT - 5)..NETHER_HEIGHT {
                    if (NETHER_HEIGHT - 1 - y) as i32 <= rand.next_i32_bounded(5) {
                        chunk.set_block(x, y, z, vanilla::BEDROCK);
                    }
                }
            }
        }
    }
}

impl ChunkGenerator for NetherGenerator {
    fn generate(&self, pos: ChunkPos) -> RawChunk {
        let mut rand = JavaRandom::new(chunk_seed(pos.x, pos.z));
        let mut chunk = RawChunk::empty();
        chunk.biomes = [8; 256]; // hell everywhere

        let densities = self.density_field(pos);
        Self::fill_terrain(&densities, &mut chunk);
        Self::cap_bedrock(&mut rand, &mut chunk);
        chunk
    }

    fn populate(&self, world: &mut dyn PopulateWorld, pos: ChunkPos) {
        // Lava springs are the nether's only decoration here.
        let mut rand =
            JavaRandom::new(crate::populate::populate_seed(self.world_seed, pos.x, pos.z));
        for _ in 0..8 {
            let x = pos.min_block_x() + rand.next_i32_bounded(16) + 8;
            let y = rand.next_i32_bounded(120) + 4;
            let z = pos.min_block_z() + rand.next_i32_bounded(16) + 8;
            if world.block(x, y, z) == vanilla::NETHERRACK {
                let open = [(-1, 0), (1, 0), (0, -1), (0, 1)]
                    .iter()
                    .filter(|&&(dx, dz)| world.block(x + dx, y, z + dz) == vanilla::AIR)
                    .count();
                if open == 1 {
                    world.set_block(x, y, z, vanilla::FLOWING_LAVA, 0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lava_sea_and_bedrock_caps() {
        let generator = NetherGenerator::new(1234);
        let chunk = generator.generate(ChunkPos::new(0, 0));
        // Some column holds lava below the sea line.
        let mut found_lava = false;
        for x in 0..16 {
            for z in 0..16 {
                assert_eq!(chunk.block(x, 0, z), vanilla::BEDROCK);
                for y in 20..32 {
                    if chunk.block(x, y, z) == vanilla::LAVA {
                        found_lava = true;
                    }
                }
                // Nothing generates above the nether ceiling.
                for y in NETHER_HEIGHT..256 {
                    assert_eq!(chunk.block(x, y, z), vanilla::AIR);
                }
            }
        }
        assert!(found_lava);
    }

    #[test]
    fn nether_is_deterministic() {
        let generator = NetherGenerator::new(777);
        let a = generator.generate(ChunkPos::new(-3, 9));
        let b = generator.generate(ChunkPos::new(-3, 9));
        assert_eq!(a.blocks, b.blocks);
    }
}
