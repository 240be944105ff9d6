//! Active potion effects on a living entity.

use basalt_registry::REGISTRY;
use basalt_registry::potion::PotionRef;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::entity::attributes::{AttributeMap, AttributeModifier};

/// One active effect: potion id with amplifier and remaining duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEffect {
    /// Potion id.
    pub potion_id: u8,
    /// Amplifier, 0-based.
    pub amplifier: i32,
    /// Remaining ticks.
    pub duration: i32,
}

/// Outcome of one effect countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectTick {
    /// Nothing due this tick.
    Idle,
    /// The periodic action fires (regen heal, poison damage).
    Ready {
        /// The firing potion id.
        potion_id: u8,
        /// Its amplifier.
        amplifier: i32,
    },
    /// The effect expired and was removed.
    Expired {
        /// The expired potion id.
        potion_id: u8,
    },
}

/// The per-entity effect map.
#[derive(Default)]
pub struct EffectMap {
    effects: FxHashMap<u8, ActiveEffect>,
}

impl EffectMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the effect is active.
    #[must_use]
    pub fn has(&self, potion_id: u8) -> bool {
        self.effects.contains_key(&potion_id)
    }

    /// The active entry for a potion.
    #[must_use]
    pub fn get(&self, potion_id: u8) -> Option<ActiveEffect> {
        self.effects.get(&potion_id).copied()
    }

    /// Iterates active effects.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.values()
    }

    /// Adds or refreshes an effect and applies its attribute modifiers.
    pub fn add(&mut self, effect: ActiveEffect, attributes: &mut AttributeMap) {
        let Some(potion) = REGISTRY.potions.by_id(effect.potion_id) else {
            return;
        };
        // Re-adding replaces: pull old modifiers first so amounts don't
        // stack.
        if self.effects.insert(effect.potion_id, effect).is_some() {
            Self::remove_potion_modifiers(potion, attributes);
        }
        Self::apply_potion_modifiers(potion, effect.amplifier, attributes);
    }

    /// Removes an effect and its attribute modifiers.
    pub fn remove(&mut self, potion_id: u8, attributes: &mut AttributeMap) {
        if self.effects.remove(&potion_id).is_some()
            && let Some(potion) = REGISTRY.potions.by_id(potion_id)
        {
            Self::remove_potion_modifiers(potion, attributes);
        }
    }

    /// Counts down every effect one tick, reporting due actions and
    /// expirations.
    pub fn tick(&mut self, attributes: &mut AttributeMap) -> Vec<EffectTick> {
        let mut results = Vec::new();
        let ids: Vec<u8> = self.effects.keys().copied().collect();
        for id in ids {
            let Some(effect) = self.effects.get_mut(&id) else {
                continue;
            };
            let Some(potion) = REGISTRY.potions.by_id(id) else {
                continue;
            };

            if potion.is_ready(effect.duration, effect.amplifier) {
                results.push(EffectTick::Ready {
                    potion_id: id,
                    amplifier: effect.amplifier,
                });
            }

            effect.duration -= 1;
            if effect.duration <= 0 {
                self.remove(id, attributes);
                results.push(EffectTick::Expired { potion_id: id });
            }
        }
        results
    }

    fn apply_potion_modifiers(potion: PotionRef, amplifier: i32, attributes: &mut AttributeMap) {
        for template in potion.modifiers {
            let Some(definition) = basalt_registry::attributes::by_name(template.attribute)
            else {
                continue;
            };
            let Ok(uuid) = Uuid::parse_str(template.uuid) else {
                continue;
            };
            let instance = attributes.register(definition);
            instance.apply_modifier(AttributeModifier {
                uuid,
                name: potion.name.to_owned(),
                amount: template.amount * f64::from(amplifier + 1),
                operation: template.operation,
                saved: false,
            });
        }
    }

    fn remove_potion_modifiers(potion: PotionRef, attributes: &mut AttributeMap) {
        for template in potion.modifiers {
            if let Some(definition) = basalt_registry::attributes::by_name(template.attribute)
                && let Ok(uuid) = Uuid::parse_str(template.uuid)
                && let Some(instance) = attributes.get_mut(definition.name)
            {
                instance.remove_modifier(uuid);
            }
        }
    }
}
