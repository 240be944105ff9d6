//! Ravine carving: rarer, deeper worms with a 3:1 vertical aspect and a
//! per-Y width multiplier table.

use basalt_utils::{BlockId, ChunkPos, JavaRandom, math};

use crate::RawChunk;
use crate::caves::carve_section;

const RANGE: i32 = 8;
const VERTICAL_ASPECT: f64 = 3.0;

/// The ravine carver.
pub struct RavineGenerator;

impl RavineGenerator {
    /// Creates the carver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Carves ravines affecting `target` into its raw block array.
    pub fn carve(
        &self,
        world_seed: i64,
        target: ChunkPos,
        chunk: &mut RawChunk,
        biome_top: &dyn Fn(i32, i32) -> BlockId,
    ) {
        let mut seed_rand = JavaRandom::new(world_seed);
        let x_mul = seed_rand.next_i64();
        let z_mul = seed_rand.next_i64();

        for cx in (target.x - RANGE)..=(target.x + RANGE) {
            for cz in (target.z - RANGE)..=(target.z + RANGE) {
                let chunk_seed = (i64::from(cx).wrapping_mul(x_mul))
                    ^ (i64::from(cz).wrapping_mul(z_mul))
                    ^ world_seed;
                let mut rand = JavaRandom::new(chunk_seed);

                if rand.next_i32_bounded(50) != 0 {
                    continue;
                }

                let x = f64::from(cx * 16 + rand.next_i32_bounded(16));
                let y_bound = rand.next_i32_bounded(40) + 8;
                let y = f64::from(rand.next_i32_bounded(y_bound) + 20);
                let z = f64::from(cz * 16 + rand.next_i32_bounded(16));
                let yaw = rand.next_f32() * std::f32::consts::PI * 2.0;
                let pitch = (rand.next_f32() - 0.5) * 2.0 / 8.0;
                let width = (rand.next_f32() * 2.0 + rand.next_f32()) * 2.0;
                let carve_seed = rand.next_i64();

                self.carve_ravine(
                    carve_seed, target, chunk, biome_top, x, y, z, width, yaw, pitch,
                );
            }
        }
    }

    /// Marches one ravine worm.
    #[allow(clippy::too_many_arguments)]
    fn carve_ravine(
        &self,
        seed: i64,
        target: ChunkPos,
        chunk: &mut RawChunk,
        biome_top: &dyn Fn(i32, i32) -> BlockId,
        mut x: f64,
        mut y: f64,
        mut z: f64,
        width: f32,
        mut yaw: f32,
        mut pitch: f32,
    ) {
        let mut rand = JavaRandom::new(seed);
        let center_x = f64::from(target.x * 16 + 8);
        let center_z = f64::from(target.z * 16 + 8);
        let mut pitch_delta = 0.0f32;
        let mut yaw_delta = 0.0f32;

        let max_steps = RANGE * 16 - 16;
        let total_steps = max_steps - rand.next_i32_bounded(max_steps / 4);

        // Per-Y width multipliers, re-rolled roughly every third level.
        let mut width_table = [0.0f32; 256];
        let mut factor = 1.0f32;
        for (i, slot) in width_table.iter_mut().enumerate() {
            if i == 0 || rand.next_i32_bounded(3) == 0 {
                factor = 1.0 + rand.next_f32() * rand.next_f32();
            }
            *slot = factor * factor;
        }

        for step in 0..total_steps {
            let mut radius_xz = 1.5
                + f64::from(
                    (step as f32 * std::f32::consts::PI / total_steps as f32).sin() * width,
                );
            let mut radius_y = radius_xz * VERTICAL_ASPECT;
            radius_xz *= f64::from(rand.next_f32()) * 0.25 + 0.75;
            radius_y *= f64::from(rand.next_f32()) * 0.25 + 0.75;

            let cos_pitch = pitch.cos();
            x += f64::from(yaw.cos() * cos_pitch);
            y += f64::from(pitch.sin());
            z += f64::from(yaw.sin() * cos_pitch);

            pitch *= 0.7;
            pitch += pitch_delta * 0.05;
            yaw += yaw_delta * 0.05;
            pitch_delta *= 0.8;
            yaw_delta *= 0.5;
            pitch_delta += (rand.next_f32() - rand.next_f32()) * rand.next_f32() * 2.0;
            yaw_delta += (rand.next_f32() - rand.next_f32()) * rand.next_f32() * 4.0;

            if rand.next_i32_bounded(4) == 0 {
                continue;
            }

            let dx = x - center_x;
            let dz = z - center_z;
            let remaining = f64::from(total_steps - step);
            let max_reach = f64::from(width) + 2.0 + 16.0;
            if dx * dx + dz * dz - remaining * remaining > max_reach * max_reach {
                return;
            }

            if x < center_x - 16.0 - radius_xz * 2.0
                || z < center_z - 16.0 - radius_xz * 2.0
                || x > center_x + 16.0 + radius_xz * 2.0
                || z > center_z + 16.0 + radius_xz * 2.0
            {
                continue;
            }

            let level = math::clamp_i32(math::floor_f64(y), 0, 255) as usize;
            let widened = radius_xz * f64::from(width_table[level]);
            carve_section(target, chunk, biome_top, x, y, z, widened, radius_y);
        }
    }
}

impl Default for RavineGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_registry::blocks::vanilla;

    #[test]
    fn ravine_carving_is_deterministic() {
        let generator = RavineGenerator::new();
        let top = |_: i32, _: i32| vanilla::GRASS;
        let mut a = RawChunk::empty();
        let mut b = RawChunk::empty();
        for chunk in [&mut a, &mut b] {
            for index in 0..chunk.blocks.len() {
                if index % 256 < 70 {
                    chunk.blocks[index] = vanilla::STONE.0;
                }
            }
            generator.carve(987, ChunkPos::new(0, 0), chunk, &top);
        }
        assert_eq!(a.blocks, b.blocks);
    }

    #[test]
    fn ravines_are_rare_but_exist() {
        let generator = RavineGenerator::new();
        let top = |_: i32, _: i32| vanilla::GRASS;
        let mut carved_chunks = 0;
        for cx in 0..16 {
            for cz in 0..16 {
                let mut chunk = RawChunk::empty();
                for index in 0..chunk.blocks.len() {
                    if index % 256 < 70 {
                        chunk.blocks[index] = vanilla::STONE.0;
                    }
                }
                let before = chunk.blocks.clone();
                generator.carve(987, ChunkPos::new(cx, cz), &mut chunk, &top);
                if chunk.blocks != before {
                    carved_chunks += 1;
                }
            }
        }
        // 1/50 per source chunk over a 16x16 area with radius 8 reach makes
        // some carving near-certain, everywhere carved would mean a bug.
        assert!(carved_chunks > 0, "no ravines in a 16x16 area");
        assert!(carved_chunks < 256);
    }
}
