//! The explosion resolver: shell ray-cast block destruction and
//! density-occluded entity damage.

use basalt_utils::{Aabb, BlockPos, JavaRandom, math};
use rustc_hash::FxHashSet;

/// Step length of the ray march.
const RAY_STEP: f32 = 0.3;
/// Strength lost per step regardless of blocks.
const STEP_ATTENUATION: f32 = RAY_STEP * 0.75;

/// World access the resolver needs.
pub trait ExplosionWorld {
    /// Explosion resistance of the block at `pos` (0 for air).
    fn resistance(&self, pos: BlockPos) -> f32;
    /// Whether the block at `pos` is air.
    fn is_air(&self, pos: BlockPos) -> bool;
    /// Entities intersecting the search box.
    fn entities_in(&self, aabb: &Aabb) -> Vec<ExplosionEntity>;
    /// Fraction of rays from the origin to the box that are unobstructed,
    /// in `[0, 1]`.
    fn block_density(&self, origin: (f64, f64, f64), aabb: &Aabb) -> f64;
}

/// A damage candidate returned by the entity query.
#[derive(Debug, Clone)]
pub struct ExplosionEntity {
    /// Entity id.
    pub id: i32,
    /// Foot position.
    pub x: f64,
    /// Foot position.
    pub y: f64,
    /// Foot position.
    pub z: f64,
    /// Eye offset above the feet.
    pub eye_height: f32,
    /// Bounding box for occlusion sampling.
    pub aabb: Aabb,
    /// Whether the entity is a player (gets the uncapped push).
    pub is_player: bool,
    /// Blast-protection knockback reduction in `[0, 1]`.
    pub blast_protection: f32,
}

/// One damaged entity with its knockback.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityHit {
    /// Entity id.
    pub id: i32,
    /// Damage to apply.
    pub damage: f32,
    /// Knockback vector, blast protection applied.
    pub knockback: (f64, f64, f64),
    /// Whether the entity is a player.
    pub is_player: bool,
    /// The uncapped push recorded for the player velocity packet.
    pub player_push: (f64, f64, f64),
}

/// Block outcomes of the destruction pass.
#[derive(Debug, Default)]
pub struct DestructionResult {
    /// Blocks set to air.
    pub destroyed: Vec<BlockPos>,
    /// Destroyed blocks that also drop an item.
    pub drops: Vec<BlockPos>,
    /// Air cells that catch fire.
    pub fire: Vec<BlockPos>,
}

/// One explosion in progress.
pub struct Explosion {
    /// Center.
    pub x: f64,
    /// Center.
    pub y: f64,
    /// Center.
    pub z: f64,
    /// Power.
    pub size: f32,
    /// Whether fire is placed afterwards.
    pub is_flaming: bool,
    /// Whether blocks are destroyed afterwards.
    pub is_smoking: bool,
    /// Accumulated affected blocks.
    pub affected_blocks: Vec<BlockPos>,
    /// Accumulated entity hits.
    pub entity_hits: Vec<EntityHit>,
}

impl Explosion {
    /// Creates an explosion at a center with a power.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64, size: f32, is_flaming: bool, is_smoking: bool) -> Self {
        Self {
            x,
            y,
            z,
            size,
            is_flaming,
            is_smoking,
            affected_blocks: Vec::new(),
            entity_hits: Vec::new(),
        }
    }

    /// Phase A: casts the 1352 shell rays and runs the entity pass.
    pub fn calculate(&mut self, world: &impl ExplosionWorld, rand: &mut JavaRandom) {
        self.affected_blocks.clear();
        self.entity_hits.clear();

        let mut blocks = FxHashSet::default();
        for i in 0..16 {
            for j in 0..16 {
                for k in 0..16 {
                    // Only the shell of the cube casts rays.
                    if i != 0 && i != 15 && j != 0 && j != 15 && k != 0 && k != 15 {
                        continue;
                    }

                    let mut dx = f64::from(i) / 15.0 * 2.0 - 1.0;
                    let mut dy = f64::from(j) / 15.0 * 2.0 - 1.0;
                    let mut dz = f64::from(k) / 15.0 * 2.0 - 1.0;
                    let length = (dx * dx + dy * dy + dz * dz).sqrt();
                    dx /= length;
                    dy /= length;
                    dz /= length;

                    let mut strength = self.size * (0.7 + rand.next_f32() * 0.6);
                    let mut ray_x = self.x;
                    let mut ray_y = self.y;
                    let mut ray_z = self.z;

                    while strength > 0.0 {
                        let pos = BlockPos::new(
                            math::floor_f64(ray_x),
                            math::floor_f64(ray_y),
                            math::floor_f64(ray_z),
                        );
                        let resistance = world.resistance(pos);
                        if resistance > 0.0 {
                            strength -= (resistance + 0.3) * RAY_STEP;
                        }
                        if strength > 0.0 {
                            blocks.insert(pos);
                        }
                        ray_x += dx * f64::from(RAY_STEP);
                        ray_y += dy * f64::from(RAY_STEP);
                        ray_z += dz * f64::from(RAY_STEP);
                        strength -= STEP_ATTENUATION;
                    }
                }
            }
        }
        self.affected_blocks.extend(blocks);

        // Entity pass with the search radius doubled.
        let diameter = f64::from(self.size) * 2.0;
        let search = Aabb::new(
            self.x - diameter - 1.0,
            self.y - diameter - 1.0,
            self.z - diameter - 1.0,
            self.x + diameter + 1.0,
            self.y + diameter + 1.0,
            self.z + diameter + 1.0,
        );

        for entity in world.entities_in(&search) {
            let mut dx = entity.x - self.x;
            let mut dy = entity.y + f64::from(entity.eye_height) - self.y;
            let mut dz = entity.z - self.z;
            let distance = (dx * dx + dy * dy + dz * dz).sqrt();
            let ratio = distance / diameter;
            if ratio >= 1.0 || distance == 0.0 {
                continue;
            }
            dx /= distance;
            dy /= distance;
            dz /= distance;

            let exposure = world.block_density((self.x, self.y, self.z), &entity.aabb);
            let impact = (1.0 - ratio) * exposure;
            let damage =
                ((impact * impact + impact) / 2.0 * 8.0 * diameter + 1.0) as f32;

            let mut knockback = impact;
            if entity.blast_protection > 0.0 {
                knockback -= knockback * f64::from(entity.blast_protection);
            }

            self.entity_hits.push(EntityHit {
                id: entity.id,
                damage,
                knockback: (dx * knockback, dy * knockback, dz * knockback),
                is_player: entity.is_player,
                player_push: (dx * impact, dy * impact, dz * impact),
            });
        }
    }

    /// Phase B: decides which affected blocks break, drop and burn.
    #[must_use]
    pub fn resolve_destruction(
        &self,
        world: &impl ExplosionWorld,
        rand: &mut JavaRandom,
    ) -> DestructionResult {
        let mut result = DestructionResult::default();

        if self.is_smoking {
            for &pos in &self.affected_blocks {
                if world.is_air(pos) {
                    continue;
                }
                if rand.next_f32() <= 1.0 / self.size {
                    result.drops.push(pos);
                }
                result.destroyed.push(pos);
            }
        }

        if self.is_flaming {
            for &pos in &self.affected_blocks {
                if world.is_air(pos)
                    && !world.is_air(pos.down())
                    && rand.next_i32_bounded(3) == 0
                {
                    result.fire.push(pos);
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    /// Stone everywhere below `surface_y`, air above.
    struct StoneWorld {
        surface_y: i32,
        entities: Vec<ExplosionEntity>,
        overrides: FxHashMap<BlockPos, f32>,
    }

    impl StoneWorld {
        fn solid(surface_y: i32) -> Self {
            Self {
                surface_y,
                entities: Vec::new(),
                overrides: FxHashMap::default(),
            }
        }
    }

    impl ExplosionWorld for StoneWorld {
        fn resistance(&self, pos: BlockPos) -> f32 {
            if let Some(&r) = self.overrides.get(&pos) {
                return r;
            }
            if pos.y < self.surface_y { 6.0 } else { 0.0 }
        }

        fn is_air(&self, pos: BlockPos) -> bool {
            self.resistance(pos) == 0.0
        }

        fn entities_in(&self, aabb: &Aabb) -> Vec<ExplosionEntity> {
            self.entities
                .iter()
                .filter(|e| e.aabb.intersects(aabb))
                .cloned()
                .collect()
        }

        fn block_density(&self, _origin: (f64, f64, f64), _aabb: &Aabb) -> f64 {
            1.0
        }
    }

    #[test]
    fn air_explosion_destroys_nothing() {
        let world = StoneWorld::solid(i32::MIN);
        let mut rand = JavaRandom::new(0);
        let mut explosion = Explosion::new(0.5, 64.5, 0.5, 4.0, false, true);
        explosion.calculate(&world, &mut rand);
        let result = explosion.resolve_destruction(&world, &mut rand);
        assert!(result.destroyed.is_empty());
        assert!(explosion.entity_hits.is_empty());
    }

    #[test]
    fn stone_crater_is_roughly_symmetric() {
        // Power 4 fully inside stone: the affected set should be
        // center-symmetric within a one-cell tolerance.
        let world = StoneWorld::solid(1000);
        let mut rand = JavaRandom::new(1234);
        let mut explosion = Explosion::new(0.5, 64.5, 0.5, 4.0, false, true);
        explosion.calculate(&world, &mut rand);
        assert!(!explosion.affected_blocks.is_empty());

        let (mut min_x, mut max_x) = (i32::MAX, i32::MIN);
        let (mut min_y, mut max_y) = (i32::MAX, i32::MIN);
        let (mut min_z, mut max_z) = (i32::MAX, i32::MIN);
        for pos in &explosion.affected_blocks {
            min_x = min_x.min(pos.x);
            max_x = max_x.max(pos.x);
            min_y = min_y.min(pos.y);
            max_y = max_y.max(pos.y);
            min_z = min_z.min(pos.z);
            max_z = max_z.max(pos.z);
        }
        // Extent east of center minus extent west of it, and likewise for
        // the other axes.
        assert!(((max_x - 0) - (0 - min_x)).abs() <= 1);
        assert!(((max_y - 64) - (64 - min_y)).abs() <= 1);
        assert!(((max_z - 0) - (0 - min_z)).abs() <= 1);
    }

    #[test]
    fn point_blank_damage_caps_at_65() {
        let mut world = StoneWorld::solid(i32::MIN);
        world.entities.push(ExplosionEntity {
            id: 1,
            x: 0.5,
            y: 64.0,
            z: 0.5,
            eye_height: 0.5,
            aabb: Aabb::new(0.2, 64.0, 0.2, 0.8, 65.8, 0.8),
            is_player: false,
            blast_protection: 0.0,
        });
        let mut rand = JavaRandom::new(0);
        let mut explosion = Explosion::new(0.5, 64.5, 0.5, 4.0, false, true);
        explosion.calculate(&world, &mut rand);
        assert_eq!(explosion.entity_hits.len(), 1);
        let hit = &explosion.entity_hits[0];
        // ((1 + 1) / 2) * 8 * 8 + 1 is the theoretical point-blank cap.
        assert!(hit.damage <= 65.0);
        assert!(hit.damage > 55.0);
    }

    #[test]
    fn damage_falls_off_with_distance() {
        let mut world = StoneWorld::solid(i32::MIN);
        for (id, x) in [(1, 2.5), (2, 5.5)] {
            world.entities.push(ExplosionEntity {
                id,
                x,
                y: 64.0,
                z: 0.5,
                eye_height: 1.62,
                aabb: Aabb::new(x - 0.3, 64.0, 0.2, x + 0.3, 65.8, 0.8),
                is_player: false,
                blast_protection: 0.0,
            });
        }
        let mut rand = JavaRandom::new(0);
        let mut explosion = Explosion::new(0.5, 64.5, 0.5, 4.0, false, true);
        explosion.calculate(&world, &mut rand);
        let near = explosion.entity_hits.iter().find(|h| h.id == 1).unwrap();
        let far = explosion.entity_hits.iter().find(|h| h.id == 2).unwrap();
        assert!(near.damage > far.damage);
        assert!(near.knockback.0 > 0.0, "knockback points away from center");
    }

    #[test]
    fn entities_outside_twice_the_radius_are_spared() {
        let mut world = StoneWorld::solid(i32::MIN);
        world.entities.push(ExplosionEntity {
            id: 1,
            x: 9.0, // ratio > 1 at diameter 8
            y: 64.5,
            z: 0.5,
            eye_height: 0.0,
            aabb: Aabb::new(8.7, 64.0, 0.2, 9.3, 65.8, 0.8),
            is_player: false,
            blast_protection: 0.0,
        });
        let mut rand = JavaRandom::new(0);
        let mut explosion = Explosion::new(0.5, 64.5, 0.5, 4.0, false, true);
        explosion.calculate(&world, &mut rand);
        assert!(explosion.entity_hits.is_empty());
    }

    #[test]
    fn blast_protection_scales_knockback_not_push() {
        let mut world = StoneWorld::solid(i32::MIN);
        world.entities.push(ExplosionEntity {
            id: 1,
            x: 3.5,
            y: 64.0,
            z: 0.5,
            eye_height: 1.0,
            aabb: Aabb::new(3.2, 64.0, 0.2, 3.8, 65.8, 0.8),
            is_player: true,
            blast_protection: 0.5,
        });
        let mut rand = JavaRandom::new(0);
        let mut explosion = Explosion::new(0.5, 64.5, 0.5, 4.0, false, true);
        explosion.calculate(&world, &mut rand);
        let hit = &explosion.entity_hits[0];
        assert!((hit.knockback.0 - hit.player_push.0 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn flaming_explosions_light_supported_air() {
        let world = StoneWorld::solid(64);
        let mut rand = JavaRandom::new(99);
        let mut explosion = Explosion::new(0.5, 64.5, 0.5, 4.0, true, true);
        explosion.calculate(&world, &mut rand);
        let result = explosion.resolve_destruction(&world, &mut rand);
        for pos in &result.fire {
            assert!(world.is_air(*pos));
            assert!(!world.is_air(pos.down()));
        }
    }

    #[test]
    fn drop_chance_is_inverse_to_size() {
        let world = StoneWorld::solid(1000);
        let mut rand = JavaRandom::new(7);
        let mut explosion = Explosion::new(0.5, 64.5, 0.5, 4.0, false, true);
        explosion.calculate(&world, &mut rand);
        let result = explosion.resolve_destruction(&world, &mut rand);
        assert!(!result.destroyed.is_empty());
        // Roughly a quarter of destroyed blocks drop for size 4.
        let ratio = result.drops.len() as f64 / result.destroyed.len() as f64;
        assert!(ratio < 0.6, "drop ratio {ratio} too high");
    }
}
