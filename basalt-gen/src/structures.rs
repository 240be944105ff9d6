//! Structure placement consultation.
//!
//! Placement is a pure function of `(seed, chunk)` using salted grid RNGs;
//! the populate pass consults it to gate decorations (no lakes in village
//! chunks) and to report structure starts.

use basalt_utils::JavaRandom;

/// Kinds of consulted structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    /// Mineshaft corridors.
    Mineshaft,
    /// Village well + roads.
    Village,
    /// Desert temple / witch hut class.
    ScatteredFeature,
    /// Stronghold ring.
    Stronghold,
    /// Ocean monument.
    OceanMonument,
}

/// Grid-placement parameters mirroring the reference's spacing/separation
/// plus per-structure seed salts.
struct GridPlacement {
    spacing: i32,
    separation: i32,
    salt: i64,
}

const VILLAGE: GridPlacement = GridPlacement { spacing: 32, separation: 8, salt: 10_387_312 };
const SCATTERED: GridPlacement = GridPlacement { spacing: 32, separation: 8, salt: 14_357_617 };
const MONUMENT: GridPlacement = GridPlacement { spacing: 32, separation: 5, salt: 10_387_313 };

fn region_rand(seed: i64, region_x: i32, region_z: i32, salt: i64) -> JavaRandom {
    let region_seed = i64::from(region_x)
        .wrapping_mul(341_873_128_712)
        .wrapping_add(i64::from(region_z).wrapping_mul(132_897_987_541))
        .wrapping_add(seed)
        .wrapping_add(salt);
    JavaRandom::new(region_seed)
}

fn grid_start(placement: &GridPlacement, seed: i64, chunk_x: i32, chunk_z: i32) -> bool {
    let adj_x = if chunk_x < 0 { chunk_x - placement.spacing + 1 } else { chunk_x };
    let adj_z = if chunk_z < 0 { chunk_z - placement.spacing + 1 } else { chunk_z };
    let region_x = adj_x / placement.spacing;
    let region_z = adj_z / placement.spacing;
    let mut rand = region_rand(seed, region_x, region_z, placement.salt);
    let offset = placement.spacing - placement.separation;
    let start_x = region_x * placement.spacing + rand.next_i32_bounded(offset);
    let start_z = region_z * placement.spacing + rand.next_i32_bounded(offset);
    chunk_x == start_x && chunk_z == start_z
}

/// Whether a structure of the given kind starts in this chunk.
#[must_use]
pub fn starts_in_chunk(kind: StructureKind, seed: i64, chunk_x: i32, chunk_z: i32) -> bool {
    match kind {
        StructureKind::Village => grid_start(&VILLAGE, seed, chunk_x, chunk_z),
        StructureKind::ScatteredFeature => grid_start(&SCATTERED, seed, chunk_x, chunk_z),
        StructureKind::OceanMonument => grid_start(&MONUMENT, seed, chunk_x, chunk_z),
        StructureKind::Mineshaft => {
            let mut rand = region_rand(seed, chunk_x, chunk_z, 0);
            // 0.4% of chunks seed a mineshaft start.
            rand.next_f64() < 0.004
        }
        StructureKind::Stronghold => {
            // A ring of candidates roughly 40 chunks out; one per 45-degree
            // sector, nudged by the seed.
            let mut rand = JavaRandom::new(seed);
            let angle = rand.next_f64() * std::f64::consts::PI * 2.0;
            for i in 0..3 {
                let dist = (1.25 + rand.next_f64()) * 32.0;
                let sector = angle + f64::from(i) * (std::f64::consts::PI * 2.0 / 3.0);
                let sx = (sector.cos() * dist).round() as i32;
                let sz = (sector.sin() * dist).round() as i32;
                if sx == chunk_x && sz == chunk_z {
                    return true;
                }
            }
            false
        }
    }
}
