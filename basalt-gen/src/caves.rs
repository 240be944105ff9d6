//! Worm-based cave carving.
//!
//! Every chunk within an 8-chunk radius of the target seeds its own RNG and
//! marches worms that may pass through the target chunk several times.

use basalt_registry::blocks::vanilla;
use basalt_utils::{BlockId, ChunkPos, JavaRandom, math};

use crate::RawChunk;

const RANGE: i32 = 8;

/// The cave carver.
pub struct CaveGenerator;

impl CaveGenerator {
    /// Creates the carver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Carves caves affecting `target` into its raw block array.
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
                self.carve_from_chunk(&mut rand, cx, cz, target, chunk, biome_top);
            }
        }
    }

    fn carve_from_chunk(
        &self,
        rand: &mut JavaRandom,
        cx: i32,
        cz: i32,
        target: ChunkPos,
        chunk: &mut RawChunk,
        biome_top: &dyn Fn(i32, i32) -> BlockId,
    ) {
        let bound = rand.next_i32_bounded(15) + 1;
        let bound = rand.next_i32_bounded(bound) + 1;
        let mut cave_count = rand.next_i32_bounded(bound);
        if rand.next_i32_bounded(7) != 0 {
            cave_count = 0;
        }

        for _ in 0..cave_count {
            let x = f64::from(cx * 16 + rand.next_i32_bounded(16));
            let y_bound = rand.next_i32_bounded(120) + 8;
            let y = f64::from(rand.next_i32_bounded(y_bound));
            let z = f64::from(cz * 16 + rand.next_i32_bounded(16));
            let mut worms = 1;

            if rand.next_i32_bounded(4) == 0 {
                let room_seed = rand.next_i64();
                let width = 1.0 + rand.next_f32() * 6.0;
                self.carve_worm(
                    room_seed, target, chunk, biome_top, x, y, z, width, 0.0, 0.0, -1, -1, 0.5,
                );
                worms += rand.next_i32_bounded(4);
            }

            for _ in 0..worms {
                let yaw = rand.next_f32() * std::f32::consts::PI * 2.0;
                let pitch = (rand.next_f32() - 0.5) * 2.0 / 8.0;
                let mut width = rand.next_f32() * 2.0 + rand.next_f32();
                if rand.next_i32_bounded(10) == 0 {
                    width *= rand.next_f32() * rand.next_f32() * 3.0 + 1.0;
                }
                let worm_seed = rand.next_i64();
                self.carve_worm(
                    worm_seed, target, chunk, biome_top, x, y, z, width, yaw, pitch, 0, 0, 1.0,
                );
            }
        }
    }

    /// Marches one worm, carving elliptical cross-sections into the target.
    #[allow(clippy::too_many_arguments, clippy::too_many_lines)]
    fn carve_worm(
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
        start_step: i32,
        total_steps: i32,
        y_scale: f64,
    ) {
        let center_x = f64::from(target.x * 16 + 8);
        let center_z = f64::from(target.z * 16 + 8);
        let mut yaw_delta = 0.0f32;
        let mut pitch_delta = 0.0f32;
        let mut rand = JavaRandom::new(seed);

        let mut total_steps = total_steps;
        if total_steps <= 0 {
            let max_len = RANGE * 16 - 16;
            total_steps = max_len - rand.next_i32_bounded(max_len / 4);
        }

        let mut step = start_step;
        let is_room = start_step == -1;
        if is_room {
            step = total_steps / 2;
        }

        let branch_step = rand.next_i32_bounded(total_steps / 2) + total_steps / 4;
        let steep = rand.next_i32_bounded(6) == 0;

        while step < total_steps {
            let radius_xz = 1.5
                + f64::from(
                    (step as f32 * std::f32::consts::PI / total_steps as f32).sin() * width,
                );
            let radius_y = radius_xz * y_scale;

            let cos_pitch = pitch.cos();
            x += f64::from(yaw.cos() * cos_pitch);
            y += f64::from(pitch.sin());
            z += f64::from(yaw.sin() * cos_pitch);

            pitch = if steep { pitch * 0.92 } else { pitch * 0.7 };
            pitch += pitch_delta * 0.1;
            yaw += yaw_delta * 0.1;
            pitch_delta *= 0.9;
            yaw_delta *= 0.75;
            pitch_delta += (rand.next_f32() - rand.next_f32()) * rand.next_f32() * 2.0;
            yaw_delta += (rand.next_f32() - rand.next_f32()) * rand.next_f32() * 4.0;

            if !is_room && step == branch_step && width > 1.0 && total_steps > 0 {
                let seed_a = rand.next_i64();
                self.carve_worm(
                    seed_a,
                    target,
                    chunk,
                    biome_top,
                    x,
                    y,
                    z,
                    rand.next_f32() * 0.5 + 0.5,
                    yaw - std::f32::consts::FRAC_PI_2,
                    pitch / 3.0,
                    step,
                    total_steps,
                    1.0,
                );
                let seed_b = rand.next_i64();
                self.carve_worm(
                    seed_b,
                    target,
                    chunk,
                    biome_top,
                    x,
                    y,
                    z,
                    rand.next_f32() * 0.5 + 0.5,
                    yaw + std::f32::consts::FRAC_PI_2,
                    pitch / 3.0,
                    step,
                    total_steps,
                    1.0,
                );
                return;
            }

            if is_room || rand.next_i32_bounded(4) != 0 {
                let dx = x - center_x;
                let dz = z - center_z;
                let remaining = f64::from(total_steps - step);
                let max_reach = f64::from(width) + 2.0 + 16.0;
                if dx * dx + dz * dz - remaining * remaining > max_reach * max_reach {
                    return;
                }

                if x >= center_x - 16.0 - radius_xz * 2.0
                    && z >= center_z - 16.0 - radius_xz * 2.0
                    && x <= center_x + 16.0 + radius_xz * 2.0
                    && z <= center_z + 16.0 + radius_xz * 2.0
                {
                    carve_section(
                        target, chunk, biome_top, x, y, z, radius_xz, radius_y,
                    );
                    if is_room {
                        break;
                    }
                }
            }

            step += 1;
        }
    }
}

impl Default for CaveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Carves the ellipsoid around a worm step into the target chunk, shared by
/// caves and ravines. Carvable blocks are stone/dirt/grass only, the whole
/// section is skipped when water touches its bounds, and carved cells below
/// y=10 become lava.
#[allow(clippy::too_many_arguments)]
pub(crate) fn carve_section(
    target: ChunkPos,
    chunk: &mut RawChunk,
    biome_top: &dyn Fn(i32, i32) -> BlockId,
    x: f64,
    y: f64,
    z: f64,
    radius_xz: f64,
    radius_y: f64,
) {
    let base_x = target.x * 16;
    let base_z = target.z * 16;

    let min_x = (math::floor_f64(x - radius_xz) - base_x - 1).max(0);
    let max_x = (math::floor_f64(x + radius_xz) - base_x + 1).min(16);
    let min_y = (math::floor_f64(y - radius_y) - 1).max(1);
    let max_y = (math::floor_f64(y + radius_y) + 1).min(248);
    let min_z = (math::floor_f64(z - radius_xz) - base_z - 1).max(0);
    let max_z = (math::floor_f64(z + radius_xz) - base_z + 1).min(16);

    if min_x >= max_x || min_y >= max_y || min_z >= max_z {
        return;
    }

    // Water anywhere on the boundary aborts the whole section.
    for bx in min_x..max_x {
        for bz in min_z..max_z {
            let mut by = max_y + 1;
            while by >= min_y - 1 {
                if (0..256).contains(&by) {
                    let id = chunk.blocks
                        [((bx as usize) * 16 + bz as usize) * 256 + by as usize];
                    if id == vanilla::FLOWING_WATER.0 || id == vanilla::WATER.0 {
                        return;
                    }
                }
                if by != min_y - 1 && bx != min_x && bx != max_x - 1 && bz != min_z && bz != max_z - 1
                {
                    by = min_y;
                }
                by -= 1;
            }
        }
    }

    for bx in min_x..max_x {
        let norm_x = (f64::from(bx + base_x) + 0.5 - x) / radius_xz;
        for bz in min_z..max_z {
            let norm_z = (f64::from(bz + base_z) + 0.5 - z) / radius_xz;
            if norm_x * norm_x + norm_z * norm_z >= 1.0 {
                continue;
            }

            let column = (bx as usize * 16 + bz as usize) * 256;
            let mut had_grass = false;

            for by in (min_y..max_y).rev() {
                let norm_y = (f64::from(by) + 0.5 - y) / radius_y;
                if norm_y <= -0.7 || norm_x * norm_x + norm_y * norm_y + norm_z * norm_z >= 1.0 {
                    continue;
                }

                let index = column + by as usize;
                let id = chunk.blocks[index];
                if id == vanilla::GRASS.0 {
                    had_grass = true;
                }
                if id == vanilla::STONE.0 || id == vanilla::DIRT.0 || id == vanilla::GRASS.0 {
                    if by < 10 {
                        chunk.blocks[index] = vanilla::FLOWING_LAVA.0;
                    } else {
                        chunk.blocks[index] = vanilla::AIR.0;
                        if had_grass && chunk.blocks[index - 1] == vanilla::DIRT.0 {
                            chunk.blocks[index - 1] =
                                biome_top(bx + base_x, bz + base_z).0;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChunkGenerator;
    use crate::overworld::OverworldGenerator;

    #[test]
    fn carving_is_deterministic() {
        let generator = OverworldGenerator::new(424_242, false, true);
        let a = generator.generate(ChunkPos::new(10, 10));
        let b = generator.generate(ChunkPos::new(10, 10));
        assert_eq!(a.blocks, b.blocks);
    }

    #[test]
    fn caves_appear_somewhere() {
        // With a 9x9 sweep at least one chunk should contain sub-surface air.
        let generator = OverworldGenerator::new(1234, false, true);
        let mut found_cave = false;
        'outer: for cx in 0..6 {
            for cz in 0..6 {
                let chunk = generator.generate(ChunkPos::new(cx, cz));
                for x in 0..16 {
                    for z in 0..16 {
                        for y in 12..40 {
                            if chunk.block(x, y, z) == vanilla::AIR {
                                found_cave = true;
                                break 'outer;
                            }
                        }
                    }
                }
            }
        }
        assert!(found_cave, "no caves in a 6x6 chunk area");
    }

    #[test]
    fn deep_carves_fill_with_lava() {
        let generator = OverworldGenerator::new(1234, false, true);
        let mut found_lava = false;
        'outer: for cx in 0..8 {
            for cz in 0..8 {
                let chunk = generator.generate(ChunkPos::new(cx, cz));
                for x in 0..16 {
                    for z in 0..16 {
                        for y in 1..10 {
                            if chunk.block(x, y, z) == vanilla::FLOWING_LAVA {
                                found_lava = true;
                                break 'outer;
                            }
                        }
                    }
                }
            }
        }
        assert!(found_lava, "no lava-floored caves in an 8x8 chunk area");
    }
}
