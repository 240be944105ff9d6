//! The overworld terrain pipeline: density field, trilinear expansion,
//! biome surface replacement, bedrock, carving.

use basalt_registry::REGISTRY;
use basalt_registry::blocks::vanilla;
use basalt_utils::{BlockId, ChunkPos, JavaRandom, math};

use crate::biomes::BiomeField;
use crate::caves::CaveGenerator;
use crate::noise::OctaveNoise;
use crate::populate;
use crate::ravines::RavineGenerator;
use crate::{ChunkGenerator, PopulateWorld, RawChunk, SEA_LEVEL, chunk_seed};

// Density-field scaling constants. These are carried as literals; changing
// them changes the world shape.
const DENSITY_SCALE: f64 = 684.412;
const INTERP_XZ: f64 = 8.555_150_000_000_001;
const INTERP_Y: f64 = 4.277_575_000_000_001;
const DEPTH_XZ: f64 = 200.0;
const DEPTH_Y: f64 = 0.5;
const SURFACE_SCALE: f64 = 0.03125;

/// The overworld chunk generator.
pub struct OverworldGenerator {
    world_seed: i64,
    amplified: bool,
    map_features: bool,
    biome_field: BiomeField,
    lower_noise: OctaveNoise,
    upper_noise: OctaveNoise,
    interp_noise: OctaveNoise,
    surface_noise: OctaveNoise,
    depth_noise: OctaveNoise,
    parabolic_weights: [f32; 25],
    caves: CaveGenerator,
    ravines: RavineGenerator,
}

impl OverworldGenerator {
    /// Creates the generator for a world seed. The noise generators consume
    /// the seed stream in a fixed order; reordering them reshapes every
    /// world.
    #[must_use]
    pub fn new(world_seed: i64, amplified: bool, map_features: bool) -> Self {
        let mut rand = JavaRandom::new(world_seed);
        let lower_noise = OctaveNoise::new(&mut rand, 16);
        let upper_noise = OctaveNoise::new(&mut rand, 16);
        let interp_noise = OctaveNoise::new(&mut rand, 8);
        let surface_noise = OctaveNoise::new(&mut rand, 4);
        // The scale and feature octaves are drawn but unsampled; they keep
        // the stream positions of the generators after them stable.
        let _scale_noise = OctaveNoise::new(&mut rand, 10);
        let depth_noise = OctaveNoise::new(&mut rand, 16);
        let _feature_noise = OctaveNoise::new(&mut rand, 8);

        let mut parabolic_weights = [0.0f32; 25];
        for i in -2i32..=2 {
            for j in -2i32..=2 {
                parabolic_weights[((i + 2) + (j + 2) * 5) as usize] =
                    10.0 / ((i * i + j * j) as f32 + 0.2).sqrt();
            }
        }

        Self {
            world_seed,
            amplified,
            map_features,
            biome_field: BiomeField::new(world_seed),
            lower_noise,
            upper_noise,
            interp_noise,
            surface_noise,
            depth_noise,
            parabolic_weights,
            caves: CaveGenerator::new(),
            ravines: RavineGenerator::new(),
        }
    }

    /// The biome field shared with the populate pass.
    #[must_use]
    pub fn biome_field(&self) -> &BiomeField {
        &self.biome_field
    }

    /// Whether structure placement is consulted at all.
    #[must_use]
    pub const fn map_features(&self) -> bool {
        self.map_features
    }

    /// Computes the 5×33×5 density grid for a chunk, indexed
    /// `(i*5 + j)*33 + k` with `i` along x.
    fn density_field(&self, chunk: ChunkPos, blend: &[u16]) -> Vec<f64> {
        let grid_x = chunk.x * 4;
        let grid_z = chunk.z * 4;

        let depth =
            self.depth_noise
                .sample_3d(grid_x, 10, grid_z, 5, 1, 5, DEPTH_XZ, DEPTH_Y, DEPTH_XZ);
        let interp = self.interp_noise.sample_3d(
            grid_x, 0, grid_z, 5, 33, 5, INTERP_XZ, INTERP_Y, INTERP_XZ,
        );
        let lower = self.lower_noise.sample_3d(
            grid_x,
            0,
            grid_z,
            5,
            33,
            5,
            DENSITY_SCALE,
            DENSITY_SCALE,
            DENSITY_SCALE,
        );
        let upper = self.upper_noise.sample_3d(
            grid_x,
            0,
            grid_z,
            5,
            33,
            5,
            DENSITY_SCALE,
            DENSITY_SCALE,
            DENSITY_SCALE,
        );

        let mut out = vec![0.0; 5 * 33 * 5];
        let mut n3 = 0;
        let mut n5 = 0;

        for i in 0..5usize {
            for j in 0..5usize {
                let center = REGISTRY
                    .biomes
                    .by_id_or_ocean(blend[(i + 2) + (j + 2) * 10]);

                let mut total_variation = 0.0f32;
                let mut total_height = 0.0f32;
                let mut total_weight = 0.0f32;

                for di in -2i32..=2 {
                    for dj in -2i32..=2 {
                        let neighbor_id = blend
                            [(i as i32 + di + 2) as usize + (j as i32 + dj + 2) as usize * 10];
                        let neighbor = REGISTRY.biomes.by_id_or_ocean(neighbor_id);

                        let mut root = neighbor.root_height;
                        let mut variation = neighbor.variation;
                        if self.amplified && root > 0.0 {
                            root = 1.0 + root * 2.0;
                            variation = 1.0 + variation * 4.0;
                        }

                        let mut weight = self.parabolic_weights
                            [((di + 2) + (dj + 2) * 5) as usize]
                            / (root + 2.0);
                        if neighbor.root_height > center.root_height {
                            weight /= 2.0;
                        }

                        total_variation += variation * weight;
                        total_height += root * weight;
                        total_weight += weight;
                    }
                }

                total_variation /= total_weight;
                total_height /= total_weight;
                total_variation = total_variation * 0.9 + 0.1;
                total_height = (total_height * 4.0 - 1.0) / 8.0;

                // Fold the depth sample into a bounded offset.
                let mut depth_val = depth[n5] / 8000.0;
                if depth_val < 0.0 {
                    depth_val = -depth_val * 0.3;
                }
                depth_val = depth_val * 3.0 - 2.0;
                if depth_val < 0.0 {
                    depth_val /= 2.0;
                    if depth_val < -1.0 {
                        depth_val = -1.0;
                    }
                    depth_val /= 1.4;
                    depth_val /= 2.0;
                } else {
                    if depth_val > 1.0 {
                        depth_val = 1.0;
                    }
                    depth_val /= 8.0;
                }
                n5 += 1;

                let variation = f64::from(total_variation);
                let mut base_height = f64::from(total_height);
                base_height += depth_val * 0.2;
                base_height = base_height * 8.5 / 8.0;
                let eff_sea_level = 8.5 + base_height * 4.0;

                for k in 0..33usize {
                    let mut bias = (k as f64 - eff_sea_level) * 12.0 * 128.0 / 256.0 / variation;
                    if bias < 0.0 {
                        bias *= 4.0;
                    }

                    let lower_val = lower[n3] / 512.0;
                    let upper_val = upper[n3] / 512.0;
                    let interp_val = (interp[n3] / 10.0 + 1.0) / 2.0;

                    let mut density =
                        math::denormalize_clamp(lower_val, upper_val, interp_val) - bias;
                    if k > 29 {
                        let falloff = (k as f64 - 29.0) / 3.0;
                        density = density * (1.0 - falloff) + -10.0 * falloff;
                    }

                    out[n3] = density;
                    n3 += 1;
                }
            }
        }

        out
    }

    /// Expands the density grid to blocks: stone where positive, water below
    /// sea level, air elsewhere.
    fn fill_terrain(densities: &[f64], chunk: &mut RawChunk) {
        for i in 0..4usize {
            let i0 = i * 5;
            let i1 = (i + 1) * 5;

            for j in 0..4usize {
                let idx00 = (i0 + j) * 33;
                let idx01 = (i0 + j + 1) * 33;
                let idx10 = (i1 + j) * 33;
                let idx11 = (i1 + j + 1) * 33;

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
                                    vanilla::STONE.0
                                } else if (block_y as i32) < SEA_LEVEL {
                                    vanilla::WATER.0
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

    /// Biome surface replacement plus the randomized bedrock floor.
    fn replace_surface(&self, chunk_pos: ChunkPos, rand: &mut JavaRandom, chunk: &mut RawChunk) {
        let stone_noise = self.surface_noise.sample_2d(
            chunk_pos.x * 16,
            chunk_pos.z * 16,
            16,
            16,
            SURFACE_SCALE * 2.0,
            SURFACE_SCALE * 2.0,
        );

        for x in 0..16usize {
            for z in 0..16usize {
                let biome = REGISTRY.biomes.by_id_or_ocean(u16::from(chunk.biomes[z * 16 + x]));
                let noise_val = stone_noise[x * 16 + z];
                let depth_roll =
                    (noise_val / 3.0 + 3.0 + rand.next_f64() * 0.25) as i32;

                let mut top = biome.top_block;
                let mut filler = biome.filler_block;
                let mut remaining = -1i32;

                for y in (0..256usize).rev() {
                    let index = RawChunk::index(x, y, z);

                    if y as i32 <= rand.next_i32_bounded(5) {
                        chunk.blocks[index] = vanilla::BEDROCK.0;
                        continue;
                    }

                    let current = chunk.blocks[index];
                    if current == vanilla::AIR.0 {
                        remaining = -1;
                        continue;
                    }
                    if current != vanilla::STONE.0 {
                        continue;
                    }

                    if remaining == -1 {
                        // First stone under the surface: choose the cap.
                        if depth_roll <= 0 {
                            top = vanilla::AIR;
                            filler = vanilla::STONE;
                        } else if (59..=64).contains(&(y as i32)) {
                            top = biome.top_block;
                            filler = biome.filler_block;
                        }
                        if (y as i32) < SEA_LEVEL && top == vanilla::AIR {
                            top = if biome.temperature_at(y as i32) < 0.15 {
                                vanilla::ICE
                            } else {
                                vanilla::WATER
                            };
                        }

                        remaining = depth_roll;
                        if y as i32 >= SEA_LEVEL - 1 {
                            chunk.blocks[index] = top.0;
                        } else if (y as i32) < SEA_LEVEL - 7 - depth_roll {
                            top = vanilla::AIR;
                            filler = vanilla::STONE;
                            chunk.blocks[index] = vanilla::GRAVEL.0;
                        } else {
                            chunk.blocks[index] = filler.0;
                        }
                    } else if remaining > 0 {
                        remaining -= 1;
                        chunk.blocks[index] = filler.0;
                        // Exhausted sand columns turn to sandstone below.
                        if remaining == 0 && filler == vanilla::SAND {
                            remaining = rand.next_i32_bounded(4);
                            filler = vanilla::SANDSTONE;
                        }
                    }
                }
            }
        }
    }
}

impl ChunkGenerator for OverworldGenerator {
    fn generate(&self, pos: ChunkPos) -> RawChunk {
        let mut rand = JavaRandom::new(chunk_seed(pos.x, pos.z));
        let mut chunk = RawChunk::empty();

        chunk.biomes = self.biome_field.chunk_biomes(pos);
        let blend = self.biome_field.blend_grid(pos);

        let densities = self.density_field(pos, &blend);
        Self::fill_terrain(&densities, &mut chunk);
        self.replace_surface(pos, &mut rand, &mut chunk);

        let biome_field = &self.biome_field;
        let top_for = move |x: i32, z: i32| -> BlockId {
            REGISTRY
                .biomes
                .by_id_or_ocean(biome_field.block_biome(x, z))
                .top_block
        };
        self.caves
            .carve(self.world_seed, pos, &mut chunk, &top_for);
        self.ravines
            .carve(self.world_seed, pos, &mut chunk, &top_for);

        chunk
    }

    fn populate(&self, world: &mut dyn PopulateWorld, pos: ChunkPos) {
        populate::populate_overworld(self, world, self.world_seed, pos, self.map_features);
    }
}
