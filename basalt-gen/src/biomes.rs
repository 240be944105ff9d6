//! The biome field: a seeded climate sampler at 4-block pitch.
//!
//! Terrain blending consumes a 10×10 cell grid covering the chunk plus a
//! 2-cell margin; the per-block biome array snaps each block to its cell.

use basalt_registry::REGISTRY;
use basalt_registry::biome::Biome;
use basalt_utils::{ChunkPos, JavaRandom};

use crate::noise::OctaveNoise;

const TEMPERATURE_SCALE: f64 = 0.025;
const RAINFALL_SCALE: f64 = 0.05;
const CONTINENT_SCALE: f64 = 0.0125;

/// Seeded climate field mapping cells to biome ids.
pub struct BiomeField {
    temperature: OctaveNoise,
    rainfall: OctaveNoise,
    continent: OctaveNoise,
}

impl BiomeField {
    /// Builds the climate sampler for a world seed.
    #[must_use]
    pub fn new(seed: i64) -> Self {
        let mut temperature_rand = JavaRandom::new(seed.wrapping_mul(9871));
        let mut rainfall_rand = JavaRandom::new(seed.wrapping_mul(39811));
        let mut continent_rand = JavaRandom::new(seed.wrapping_mul(543_321));
        Self {
            temperature: OctaveNoise::new(&mut temperature_rand, 4),
            rainfall: OctaveNoise::new(&mut rainfall_rand, 4),
            continent: OctaveNoise::new(&mut continent_rand, 4),
        }
    }

    /// Biome id for a 4×4-block cell.
    #[must_use]
    pub fn cell_biome(&self, cell_x: i32, cell_z: i32) -> u16 {
        let grid = self.sample_cells(cell_x, cell_z, 1, 1);
        grid[0]
    }

    /// Biome id governing an absolute block column.
    #[must_use]
    pub fn block_biome(&self, x: i32, z: i32) -> u16 {
        self.cell_biome(x >> 2, z >> 2)
    }

    /// The 10×10 blend grid for a chunk: cells `[cx*4 - 2, cx*4 + 7]` on
    /// each axis, indexed `i + j*10` with `i` along x.
    #[must_use]
    pub fn blend_grid(&self, chunk: ChunkPos) -> Vec<u16> {
        self.sample_cells(chunk.x * 4 - 2, chunk.z * 4 - 2, 10, 10)
    }

    /// The per-block biome array for a chunk, indexed `z*16 + x`.
    #[must_use]
    pub fn chunk_biomes(&self, chunk: ChunkPos) -> [u8; 256] {
        let cells = self.sample_cells(chunk.x * 4, chunk.z * 4, 4, 4);
        let mut out = [0u8; 256];
        for z in 0..16 {
            for x in 0..16 {
                let cell = cells[(x >> 2) + (z >> 2) * 4];
                out[z * 16 + x] = cell as u8;
            }
        }
        out
    }

    /// Looks the registry entry up for a sampled id.
    #[must_use]
    pub fn biome(&self, id: u16) -> &'static Biome {
        REGISTRY.biomes.by_id_or_ocean(id)
    }

    fn sample_cells(&self, cell_x: i32, cell_z: i32, x_size: usize, z_size: usize) -> Vec<u16> {
        let temperature = self.temperature.sample_2d(
            cell_x,
            cell_z,
            x_size,
            z_size,
            TEMPERATURE_SCALE,
            TEMPERATURE_SCALE,
        );
        let rainfall = self
            .rainfall
            .sample_2d(cell_x, cell_z, x_size, z_size, RAINFALL_SCALE, RAINFALL_SCALE);
        let continent = self.continent.sample_2d(
            cell_x,
            cell_z,
            x_size,
            z_size,
            CONTINENT_SCALE,
            CONTINENT_SCALE,
        );

        // sample_2d lays values out x-major; re-index to `i + j*10` order.
        let mut out = vec![0u16; x_size * z_size];
        for ix in 0..x_size {
            for iz in 0..z_size {
                let sample_index = ix * z_size + iz;
                let t = normalize(temperature[sample_index]);
                let r = normalize(rainfall[sample_index]);
                let c = continent[sample_index];
                out[ix + iz * x_size] = select_biome(t, r, c);
            }
        }
        out
    }
}

/// Squashes an octave sum into `[0, 1]`.
fn normalize(value: f64) -> f64 {
    (value / 8.0 + 0.5).clamp(0.0, 1.0)
}

/// Climate matrix: continent depth first, then temperature rows with
/// rainfall columns. Ids are the vanilla biome table's.
fn select_biome(temperature: f64, rainfall: f64, continent: f64) -> u16 {
    if continent < -3.0 {
        return 24; // deep ocean
    }
    if continent < -1.0 {
        return if temperature < 0.15 { 10 } else { 0 }; // frozen ocean / ocean
    }
    if continent < -0.6 {
        return if temperature < 0.15 {
            26 // cold beach
        } else if temperature > 0.85 && rainfall < 0.3 {
            25 // stone beach
        } else {
            16 // beach
        };
    }

    if temperature < 0.1 {
        return if rainfall < 0.5 { 12 } else { 30 }; // ice plains / cold taiga
    }
    if temperature < 0.3 {
        return if rainfall < 0.35 {
            3 // extreme hills
        } else if rainfall < 0.7 {
            5 // taiga
        } else {
            32 // mega taiga
        };
    }
    if temperature < 0.6 {
        return if rainfall < 0.3 {
            1 // plains
        } else if rainfall < 0.6 {
            4 // forest
        } else if rainfall < 0.85 {
            27 // birch forest
        } else {
            6 // swampland
        };
    }
    if temperature < 0.85 {
        return if rainfall < 0.25 {
            35 // savanna
        } else if rainfall < 0.6 {
            29 // roofed forest
        } else if rainfall < 0.85 {
            21 // jungle
        } else {
            22 // jungle hills
        };
    }
    if rainfall < 0.35 {
        2 // desert
    } else if rainfall < 0.6 {
        37 // mesa
    } else {
        36 // savanna plateau
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_per_seed() {
        let a = BiomeField::new(1234);
        let b = BiomeField::new(1234);
        let chunk = ChunkPos::new(3, -7);
        assert_eq!(a.blend_grid(chunk), b.blend_grid(chunk));
        assert_eq!(a.chunk_biomes(chunk), b.chunk_biomes(chunk));
    }

    #[test]
    fn grid_margin_matches_neighbor_cells() {
        let field = BiomeField::new(42);
        let grid = field.blend_grid(ChunkPos::new(0, 0));
        // Grid cell (2, 2) is chunk cell (0, 0).
        assert_eq!(grid[2 + 2 * 10], field.cell_biome(0, 0));
        assert_eq!(grid[0], field.cell_biome(-2, -2));
    }

    #[test]
    fn blocks_snap_to_cells() {
        let field = BiomeField::new(7);
        let biomes = field.chunk_biomes(ChunkPos::new(5, 5));
        assert_eq!(biomes[0], biomes[3 + 3 * 16], "4x4 cell should be uniform");
        assert_eq!(u16::from(biomes[0]), field.block_biome(80, 80));
    }

    #[test]
    fn all_ids_resolve_in_registry() {
        let field = BiomeField::new(99);
        for chunk in [ChunkPos::new(0, 0), ChunkPos::new(-40, 17)] {
            for id in field.blend_grid(chunk) {
                assert!(REGISTRY.biomes.by_id(id).is_some(), "unregistered biome {id}");
            }
        }
    }
}
