//! The entity model: a slot-map arena with monotonically minted ids.

pub mod attributes;
pub mod effects;

use basalt_registry::attributes as attribute_defs;
use basalt_utils::{Aabb, JavaRandom};
use rustc_hash::FxHashMap;

use crate::combat::CombatTracker;
use attributes::AttributeMap;
use effects::EffectMap;

/// What kind of thing an entity is.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    /// A connected player.
    Player {
        /// Display name.
        name: String,
    },
    /// A living non-player entity.
    Living {
        /// Registry type name, e.g. `Zombie`.
        type_name: String,
    },
    /// A lightning bolt with its pulse state machine.
    Lightning(LightningBolt),
    /// Anything else (items, projectiles, minecarts).
    Other {
        /// Registry type name.
        type_name: String,
    },
}

impl EntityKind {
    /// Whether this entity participates in combat and damage.
    #[must_use]
    pub const fn is_living(&self) -> bool {
        matches!(self, EntityKind::Player { .. } | EntityKind::Living { .. })
    }

    /// Whether this entity is a player.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(self, EntityKind::Player { .. })
    }
}

/// A lightning bolt's short life: one to three pulses, then gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightningBolt {
    /// Current pulse phase; counts down each tick.
    pub state: i32,
    /// Remaining re-strikes.
    pub living_time: i32,
}

/// Outcome of one lightning tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightningTick {
    /// The bolt is finished and should be removed.
    pub dead: bool,
    /// The bolt re-ignited for another pulse; fire may start again.
    pub reignite: bool,
}

impl LightningBolt {
    /// Spawns a bolt with one to three pulses.
    #[must_use]
    pub fn new(rand: &mut JavaRandom) -> Self {
        Self {
            state: 2,
            living_time: rand.next_i32_bounded(3) + 1,
        }
    }

    /// Advances the pulse state machine one tick.
    pub fn tick(&mut self, rand: &mut JavaRandom) -> LightningTick {
        self.state -= 1;
        let mut result = LightningTick {
            dead: false,
            reignite: false,
        };
        if self.state < 0 {
            if self.living_time == 0 {
                result.dead = true;
            } else if self.state < -rand.next_i32_bounded(10) {
                self.living_time -= 1;
                self.state = 1;
                result.reignite = true;
            }
        }
        result
    }
}

/// One entity.
pub struct Entity {
    /// Server-unique 32-bit id, never reused within a session.
    pub id: i32,
    /// What this entity is.
    pub kind: EntityKind,
    /// Position.
    pub x: f64,
    /// Position.
    pub y: f64,
    /// Position.
    pub z: f64,
    /// Look yaw in degrees.
    pub yaw: f32,
    /// Look pitch in degrees.
    pub pitch: f32,
    /// Velocity applied per tick.
    pub motion_x: f64,
    /// Velocity applied per tick.
    pub motion_y: f64,
    /// Velocity applied per tick.
    pub motion_z: f64,
    /// Collision bounds.
    pub bounding_box: Aabb,
    /// Current health.
    pub health: f32,
    /// Distance fallen since last touching ground.
    pub fall_distance: f32,
    /// Remaining burn ticks.
    pub fire_ticks: i32,
    /// Ticks before another portal may trigger.
    pub portal_cooldown: i32,
    /// Age in ticks.
    pub ticks_existed: i32,
    /// Marked for removal on the next sweep.
    pub dead: bool,
    /// Eye height above the position for targeting and explosions.
    pub eye_height: f32,
    /// Blast-protection knockback reduction in `[0, 1]`.
    pub blast_protection: f32,
    /// Whether the entity clings to a ladder (combat context).
    pub on_ladder: bool,
    /// Whether the entity clings to vines (combat context).
    pub on_vines: bool,
    /// Whether the entity is in water (combat context).
    pub in_water: bool,
    /// Named attribute instances.
    pub attributes: AttributeMap,
    /// Active potion effects.
    pub effects: EffectMap,
    /// Recent damage history for death messages.
    pub combat: CombatTracker,
}

impl Entity {
    fn new(id: i32, kind: EntityKind, x: f64, y: f64, z: f64) -> Self {
        let mut attributes = AttributeMap::new();
        let mut health = 20.0;
        if kind.is_living() {
            attributes.register(&attribute_defs::MAX_HEALTH);
            attributes.register(&attribute_defs::FOLLOW_RANGE);
            attributes.register(&attribute_defs::KNOCKBACK_RESISTANCE);
            attributes.register(&attribute_defs::MOVEMENT_SPEED);
            attributes.register(&attribute_defs::ATTACK_DAMAGE);
            health = attributes.value_of(&attribute_defs::MAX_HEALTH) as f32;
        }
        Self {
            id,
            kind,
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
            motion_x: 0.0,
            motion_y: 0.0,
            motion_z: 0.0,
            bounding_box: Aabb::new(x - 0.3, y, z - 0.3, x + 0.3, y + 1.8, z + 0.3),
            health,
            fall_distance: 0.0,
            fire_ticks: 0,
            portal_cooldown: 0,
            ticks_existed: 0,
            dead: false,
            eye_height: 1.62,
            blast_protection: 0.0,
            on_ladder: false,
            on_vines: false,
            in_water: false,
            attributes,
            effects: EffectMap::new(),
            combat: CombatTracker::new(),
        }
    }

    /// The eye point used by explosion and targeting math.
    #[must_use]
    pub fn eye_position(&self) -> (f64, f64, f64) {
        (self.x, self.y + f64::from(self.eye_height), self.z)
    }

    /// Display name for chat and death messages.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.kind {
            EntityKind::Player { name } => name.clone(),
            EntityKind::Living { type_name } | EntityKind::Other { type_name } => {
                type_name.clone()
            }
            EntityKind::Lightning(_) => String::from("Lightning"),
        }
    }
}

/// The entity arena: O(1) removal, ids never reused.
pub struct EntityArena {
    slots: Vec<Option<Entity>>,
    free: Vec<usize>,
    by_id: FxHashMap<i32, usize>,
    next_id: i32,
}

impl EntityArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_id: FxHashMap::default(),
            next_id: 1,
        }
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Spawns an entity, minting the next id.
    pub fn spawn(&mut self, kind: EntityKind, x: f64, y: f64, z: f64) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        let entity = Entity::new(id, kind, x, y, z);

        let slot = if let Some(free) = self.free.pop() {
            self.slots[free] = Some(entity);
            free
        } else {
            self.slots.push(Some(entity));
            self.slots.len() - 1
        };
        self.by_id.insert(id, slot);
        id
    }

    /// Immutable lookup by id.
    #[must_use]
    pub fn get(&self, id: i32) -> Option<&Entity> {
        let slot = *self.by_id.get(&id)?;
        self.slots.get(slot)?.as_ref()
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: i32) -> Option<&mut Entity> {
        let slot = *self.by_id.get(&id)?;
        self.slots.get_mut(slot)?.as_mut()
    }

    /// Removes an entity immediately.
    pub fn remove(&mut self, id: i32) -> Option<Entity> {
        let slot = self.by_id.remove(&id)?;
        let entity = self.slots.get_mut(slot)?.take();
        if entity.is_some() {
            self.free.push(slot);
        }
        entity
    }

    /// Removes everything flagged `dead`.
    pub fn sweep_dead(&mut self) -> Vec<Entity> {
        let dead_ids: Vec<i32> = self
            .iter()
            .filter(|entity| entity.dead)
            .map(|entity| entity.id)
            .collect();
        dead_ids
            .into_iter()
            .filter_map(|id| self.remove(id))
            .collect()
    }

    /// Iterates live entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Iterates live entities mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Ids of entities whose bounding boxes intersect `aabb`.
    #[must_use]
    pub fn ids_in_aabb(&self, aabb: &Aabb) -> Vec<i32> {
        self.iter()
            .filter(|entity| entity.bounding_box.intersects(aabb))
            .map(|entity| entity.id)
            .collect()
    }
}

impl Default for EntityArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut arena = EntityArena::new();
        let a = arena.spawn(
            EntityKind::Other {
                type_name: String::from("Item"),
            },
            0.0,
            64.0,
            0.0,
        );
        let b = arena.spawn(
            EntityKind::Other {
                type_name: String::from("Item"),
            },
            0.0,
            64.0,
            0.0,
        );
        assert!(b > a);
        arena.remove(a);
        let c = arena.spawn(
            EntityKind::Other {
                type_name: String::from("Item"),
            },
            0.0,
            64.0,
            0.0,
        );
        assert!(c > b);
        assert!(arena.get(a).is_none());
    }

    #[test]
    fn slots_are_recycled() {
        let mut arena = EntityArena::new();
        let a = arena.spawn(
            EntityKind::Living {
                type_name: String::from("Pig"),
            },
            0.0,
            64.0,
            0.0,
        );
        arena.remove(a);
        let _ = arena.spawn(
            EntityKind::Living {
                type_name: String::from("Cow"),
            },
            0.0,
            64.0,
            0.0,
        );
        assert_eq!(arena.slots.len(), 1);
    }

    #[test]
    fn living_entities_get_default_attributes() {
        let mut arena = EntityArena::new();
        let id = arena.spawn(
            EntityKind::Living {
                type_name: String::from("Zombie"),
            },
            0.0,
            64.0,
            0.0,
        );
        let entity = arena.get_mut(id).unwrap();
        assert!((entity.health - 20.0).abs() < f32::EPSILON);
        assert!(
            (entity.attributes.value_of(&attribute_defs::FOLLOW_RANGE) - 32.0).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn aabb_query_finds_overlapping() {
        let mut arena = EntityArena::new();
        let near = arena.spawn(
            EntityKind::Living {
                type_name: String::from("Pig"),
            },
            0.0,
            64.0,
            0.0,
        );
        let _far = arena.spawn(
            EntityKind::Living {
                type_name: String::from("Pig"),
            },
            100.0,
            64.0,
            0.0,
        );
        let found = arena.ids_in_aabb(&Aabb::new(-5.0, 60.0, -5.0, 5.0, 70.0, 5.0));
        assert_eq!(found, vec![near]);
    }

    #[test]
    fn dead_sweep() {
        let mut arena = EntityArena::new();
        let id = arena.spawn(
            EntityKind::Living {
                type_name: String::from("Sheep"),
            },
            0.0,
            64.0,
            0.0,
        );
        arena.get_mut(id).unwrap().dead = true;
        let removed = arena.sweep_dead();
        assert_eq!(removed.len(), 1);
        assert!(arena.is_empty());
    }

    #[test]
    fn lightning_state_machine_terminates() {
        let mut rand = JavaRandom::new(0);
        for _ in 0..32 {
            let mut bolt = LightningBolt::new(&mut rand);
            assert!((1..=3).contains(&bolt.living_time));
            let mut ticks = 0;
            loop {
                let result = bolt.tick(&mut rand);
                if result.dead {
                    break;
                }
                ticks += 1;
                assert!(ticks < 1000, "bolt never died");
            }
        }
    }
}
