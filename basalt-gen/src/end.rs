//! The end pipeline: a floating end-stone island shaped by a radial bias,
//! with no bedrock and no sea.

use basalt_registry::blocks::vanilla;
use basalt_utils::{ChunkPos, JavaRandom, math};

use crate::noise::OctaveNoise;
use crate::{ChunkGenerator, PopulateWorld, RawChunk};

const DENSITY_XZ: f64 = 684.412;
const DENSITY_Y: f64 = 684.412;
const INTERP_XZ: f64 = 8.555_150_000_000_001;
const INTERP_Y: f64 = 4.277_575_000_000_001;

/// The end chunk generator.
pub struct EndGenerator {
    world_seed: i64,
    lower_noise: OctaveNoise,
    upper_noise: OctaveNoise,
    interp_noise: OctaveNoise,
}

impl EndGenerator {
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

    /// Radial island bias for a density cell:
    /// `100 − 8·√(x² + z²)` clamped to `[-100, 80]`, in chunk units.
    fn island_bias(chunk: ChunkPos, i: usize, j: usize) -> f64 {
        let gx = f64::from(chunk.x) + i as f64 / 4.0;
        let gz = f64::from(chunk.z) + j as f64 / 4.0;
        math::clamp_f64(100.0 - (gx * gx + gz * gz).sqrt() * 8.0, -100.0, 80.0)
    }

    fn density_field(&self, chunk: ChunkPos) -> Vec<f64> {
        let grid_x = chunk.x * 4;
        let grid_z = chunk.z * 4;

        let lower = self.lower_noise.sample_3d(
            grid_x, 0, grid_z, 5, 33, 5, DENSITY_XZ, DENSITY_Y, DENSITY_XZ,
        );
        let upper = self.upper_noise.sample_3d(
            grid_x, 0, grid_z, 5, 33, 5, DENSITY_XZ, DENSITY_Y, DENSITY_XZ,
        );
        let interp = self.interp_noise.sample_3d(
            grid_x, 0, grid_z, 5, 33, 5, INTERP_XZ, INTERP_Y, INTERP_XZ,
        );

        let mut out = vec![0.0; 5 * 33 * 5];
        let mut index = 0;
        for i in 0..5usize {
            for j in 0..5usize {
                let bias = Self::island_bias(chunk, i, j);
                for k in 0..33usize {
                    let lower_val = lower[index] / 512.0;
                    let upper_val = upper[index] / 512.0;
                    let interp_val = (interp[index] / 10.0 + 1.0) / 2.0;
                    let mut density =
                        math::denormalize_clamp(lower_val, upper_val, interp_val) + bias;

                    // Island underside and sky falloff.
                    let mid_dist = (k as f64 - 16.0).abs();
                    density -= mid_dist * mid_dist * 0.6;
                    out[index] = density;
                    index += 1;
                }
            }
        }
        out
    }

    fn fill_terrain(densities: &[f64], chunk: &mut RawChunk) {
        for i in 0..4usize {
            for j in 0..4usize {
                let idx00 = ((i * 5) + j) * 33;
                let idx01 = ((i * 5) + j + 1) * 33;
                let idx10 = (((i + 1) * 5) + j) * 33;
                let idx11 = (((i + 1) * 5) + j + 1) * 33;

                for k in 0..32usize {
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
                                    vanilla::END_STONE.0
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
}

impl ChunkGenerator for EndGenerator {
    fn generate(&self, pos: ChunkPos) -> RawChunk {
        let mut chunk = RawChunk::empty();
        chunk.biomes = [9; 256]; // sky everywhere

        let densities = self.density_field(pos);
        Self::fill_terrain(&densities, &mut chunk);
        chunk
    }

    fn populate(&self, world: &mut dyn PopulateWorld, pos: ChunkPos) {
        // Obsidian pillar stubs near the island center.
        let mut rand =
            JavaRandom::new(crate::populate::populate_seed(self.world_seed, pos.x, pos.z));
        if pos.x.abs() <= 4 && pos.z.abs() <= 4 && rand.next_i32_bounded(8) == 0 {
            let x = pos.min_block_x() + rand.next_i32_bounded(16) + 8;
            let z = pos.min_block_z() + rand.next_i32_bounded(16) + 8;
            let base = world.height(x, z);
            if base > 0 {
                let height = rand.next_i32_bounded(16) + 8;
                for dy in 0..height {
                    world.set_block(x, base + dy, z, vanilla::OBSIDIAN, 0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn island_bias_peaks_at_origin() {
        assert_eq!(EndGenerator::island_bias(ChunkPos::new(0, 0), 0, 0), 80.0);
        let far = EndGenerator::island_bias(ChunkPos::new(100, 0), 0, 0);
        assert_eq!(far, -100.0);
    }

    #[test]
    fn island_has_stone_center_and_empty_fringe() {
        let generator = EndGenerator::new(1234);
        let center = generator.generate(ChunkPos::new(0, 0));
        let stone_center = center
            .blocks
            .iter()
            .filter(|&&id| id == vanilla::END_STONE.0)
            .count();
        assert!(stone_center > 0, "no island at the origin");

        let fringe = generator.generate(ChunkPos::new(200, 200));
        assert!(fringe.blocks.iter().all(|&id| id == vanilla::AIR.0));
    }

    #[test]
    fn no_bedrock_in_the_end() {
        let generator = EndGenerator::new(42);
        let chunk = generator.generate(ChunkPos::new(0, 0));
        assert!(chunk.blocks.iter().all(|&id| id != vanilla::BEDROCK.0));
    }
}
