//! The potion effect table, ids 1–23.

use rustc_hash::FxHashMap;

/// A reference into the potion table.
pub type PotionRef = &'static Potion;

/// An attribute modifier applied while a potion effect is active.
#[derive(Debug)]
pub struct PotionModifier {
    /// Target attribute name.
    pub attribute: &'static str,
    /// Stable modifier uuid, so re-application replaces.
    pub uuid: &'static str,
    /// Per-amplifier base amount.
    pub amount: f64,
    /// Modifier operation (0, 1 or 2).
    pub operation: u8,
}

/// One entry of the potion table.
#[derive(Debug)]
pub struct Potion {
    /// Potion id (1–23).
    pub id: u8,
    /// Translation key, e.g. `potion.moveSpeed`.
    pub name: &'static str,
    /// Whether the effect is harmful.
    pub is_bad_effect: bool,
    /// Particle color.
    pub color: u32,
    /// Duration scaling factor.
    pub effectiveness: f64,
    /// Whether the effect applies instantly instead of over time.
    pub is_instant: bool,
    /// Attribute modifiers applied while active.
    pub modifiers: &'static [PotionModifier],
}

impl Potion {
    /// Whether the effect performs its periodic action this tick, given the
    /// remaining duration and amplifier.
    #[must_use]
    pub fn is_ready(&self, duration: i32, amplifier: i32) -> bool {
        let interval = match self.id {
            10 => 50 >> amplifier, // regeneration
            19 => 25 >> amplifier, // poison
            20 => 40 >> amplifier, // wither
            17 => return true,     // hunger drains every tick
            _ => return false,
        };
        if interval > 0 {
            duration % interval == 0
        } else {
            true
        }
    }
}

macro_rules! potion {
    ($id:expr, $name:expr, $bad:expr, $color:expr, $eff:expr, $instant:expr) => {
        potion!($id, $name, $bad, $color, $eff, $instant, &[])
    };
    ($id:expr, $name:expr, $bad:expr, $color:expr, $eff:expr, $instant:expr, $mods:expr) => {
        Potion {
            id: $id,
            name: $name,
            is_bad_effect: $bad,
            color: $color,
            effectiveness: $eff,
            is_instant: $instant,
            modifiers: $mods,
        }
    };
}

/// The static potion table.
static POTIONS: &[Potion] = &[
    potion!(
        1,
        "potion.moveSpeed",
        false,
        8_171_462,
        1.0,
        false,
        &[PotionModifier {
            attribute: "generic.movementSpeed",
            uuid: "91AEAA56-376B-4498-935B-2F7F68070635",
            amount: 0.2,
            operation: 2,
        }]
    ),
    potion!(
        2,
        "potion.moveSlowdown",
        true,
        5_926_017,
        0.5,
        false,
        &[PotionModifier {
            attribute: "generic.movementSpeed",
            uuid: "7107DE5E-7CE8-4030-940E-514C1F160890",
            amount: -0.15,
            operation: 2,
        }]
    ),
    potion!(3, "potion.digSpeed", false, 14_270_531, 1.5, false),
    potion!(4, "potion.digSlowDown", true, 4_866_583, 0.5, false),
    potion!(
        5,
        "potion.damageBoost",
        false,
        9_643_043,
        1.0,
        false,
        &[PotionModifier {
            attribute: "generic.attackDamage",
            uuid: "648D7064-6A60-4F59-8ABE-C2C23A6DD7A9",
            amount: 3.0,
            operation: 2,
        }]
    ),
    potion!(6, "potion.heal", false, 16_262_179, 1.0, true),
    potion!(7, "potion.harm", true, 4_393_481, 0.5, true),
    potion!(8, "potion.jump", false, 7_889_559, 1.0, false),
    potion!(9, "potion.confusion", true, 5_578_058, 0.25, false),
    potion!(10, "potion.regeneration", false, 13_458_603, 0.25, false),
    potion!(11, "potion.resistance", false, 10_044_730, 1.0, false),
    potion!(12, "potion.fireResistance", false, 14_981_690, 1.0, false),
    potion!(13, "potion.waterBreathing", false, 3_035_801, 1.0, false),
    potion!(14, "potion.invisibility", false, 8_356_754, 1.0, false),
    potion!(15, "potion.blindness", true, 2_039_587, 0.25, false),
    potion!(16, "potion.nightVision", false, 0x001F_1FA1, 1.0, false),
    potion!(17, "potion.hunger", true, 5_797_459, 0.5, false),
    potion!(
        18,
        "potion.weakness",
        true,
        0x0048_4D48,
        0.5,
        false,
        &[PotionModifier {
            attribute: "generic.attackDamage",
            uuid: "22653B89-116E-49DC-9B6B-9971489B5BE5",
            amount: 2.0,
            operation: 0,
        }]
    ),
    potion!(19, "potion.poison", true, 5_149_489, 0.25, false),
    potion!(20, "potion.wither", true, 3_484_199, 0.25, false),
    potion!(
        21,
        "potion.healthBoost",
        false,
        16_284_963,
        1.0,
        false,
        &[PotionModifier {
            attribute: "generic.maxHealth",
            uuid: "5D6F0BA2-1186-46AC-B896-C61C5CEE99CC",
            amount: 4.0,
            operation: 0,
        }]
    ),
    potion!(22, "potion.absorption", false, 0x0025_52A5, 1.0, false),
    potion!(23, "potion.saturation", false, 16_262_179, 1.0, true),
];

/// Lookup structure over the potion table.
pub struct PotionRegistry {
    by_id: FxHashMap<u8, PotionRef>,
}

impl PotionRegistry {
    /// Builds the vanilla potion index.
    #[must_use]
    pub fn vanilla() -> Self {
        let mut by_id = FxHashMap::default();
        for potion in POTIONS {
            by_id.insert(potion.id, potion);
        }
        Self { by_id }
    }

    /// Number of registered potions.
    #[must_use]
    pub fn len(&self) -> usize {
        POTIONS.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        POTIONS.is_empty()
    }

    /// Looks a potion up by id.
    #[must_use]
    pub fn by_id(&self, id: u8) -> Option<PotionRef> {
        self.by_id.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_one_through_23() {
        let registry = PotionRegistry::vanilla();
        assert_eq!(registry.len(), 23);
        for id in 1..=23 {
            assert!(registry.by_id(id).is_some(), "missing potion {id}");
        }
        assert!(registry.by_id(0).is_none());
    }

    #[test]
    fn regeneration_interval_halves_per_amplifier() {
        let registry = PotionRegistry::vanilla();
        let regen = registry.by_id(10).unwrap();
        assert!(regen.is_ready(50, 0));
        assert!(!regen.is_ready(49, 0));
        assert!(regen.is_ready(25, 1));
        // Amplifier high enough to zero the interval fires every tick.
        assert!(regen.is_ready(7, 6));
    }

    #[test]
    fn hunger_fires_every_tick() {
        let registry = PotionRegistry::vanilla();
        let hunger = registry.by_id(17).unwrap();
        assert!(hunger.is_ready(123, 0));
        assert!(hunger.is_ready(1, 3));
    }

    #[test]
    fn instant_effects_flagged() {
        let registry = PotionRegistry::vanilla();
        assert!(registry.by_id(6).unwrap().is_instant);
        assert!(registry.by_id(7).unwrap().is_instant);
        assert!(!registry.by_id(10).unwrap().is_instant);
    }
}
