//! Entity attributes: base values plus modifiers evaluated in three
//! phases, with a cached final value.

use basalt_registry::attributes::AttributeRef;
use rustc_hash::FxHashMap;
use uuid::Uuid;

/// A single attribute modifier. Applying a modifier with an existing uuid
/// replaces the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeModifier {
    /// Identity; re-application replaces.
    pub uuid: Uuid,
    /// Debug name.
    pub name: String,
    /// Operation input amount.
    pub amount: f64,
    /// 0 = add, 1 = multiply base, 2 = multiply total.
    pub operation: u8,
    /// Whether the modifier persists to NBT.
    pub saved: bool,
}

/// One attribute instance on an entity.
pub struct AttributeInstance {
    definition: AttributeRef,
    base_value: f64,
    modifiers: Vec<AttributeModifier>,
    cached: f64,
    dirty: bool,
}

impl AttributeInstance {
    /// Creates the instance at the definition's default base.
    #[must_use]
    pub fn new(definition: AttributeRef) -> Self {
        Self {
            definition,
            base_value: definition.default_value,
            modifiers: Vec::new(),
            cached: definition.clamp(definition.default_value),
            dirty: false,
        }
    }

    /// The backing definition.
    #[must_use]
    pub const fn definition(&self) -> AttributeRef {
        self.definition
    }

    /// Current base value.
    #[must_use]
    pub const fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Overwrites the base value.
    pub fn set_base_value(&mut self, value: f64) {
        if (value - self.base_value).abs() > f64::EPSILON {
            self.base_value = value;
            self.dirty = true;
        }
    }

    /// Applies a modifier; a matching uuid replaces the old entry.
    pub fn apply_modifier(&mut self, modifier: AttributeModifier) {
        self.modifiers.retain(|m| m.uuid != modifier.uuid);
        self.modifiers.push(modifier);
        self.dirty = true;
    }

    /// Removes a modifier by uuid; absent uuids are ignored.
    pub fn remove_modifier(&mut self, uuid: Uuid) {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.uuid != uuid);
        if self.modifiers.len() != before {
            self.dirty = true;
        }
    }

    /// Looks a modifier up by uuid.
    #[must_use]
    pub fn modifier(&self, uuid: Uuid) -> Option<&AttributeModifier> {
        self.modifiers.iter().find(|m| m.uuid == uuid)
    }

    /// Iterates applied modifiers.
    pub fn modifiers(&self) -> impl Iterator<Item = &AttributeModifier> {
        self.modifiers.iter()
    }

    /// The final value: base, plus operation-0 amounts, plus the result
    /// times Σ operation-1 amounts, times Π (1 + operation-2 amounts),
    /// clamped to the definition range. Cached until a mutation.
    pub fn value(&mut self) -> f64 {
        if self.dirty {
            self.cached = self.compute();
            self.dirty = false;
        }
        self.cached
    }

    fn compute(&self) -> f64 {
        let mut value = self.base_value;
        for modifier in self.modifiers.iter().filter(|m| m.operation == 0) {
            value += modifier.amount;
        }

        let snapshot = value;
        for modifier in self.modifiers.iter().filter(|m| m.operation == 1) {
            value += snapshot * modifier.amount;
        }
        for modifier in self.modifiers.iter().filter(|m| m.operation == 2) {
            value *= 1.0 + modifier.amount;
        }

        self.definition.clamp(value)
    }
}

/// The per-entity attribute map, keyed by attribute name.
#[derive(Default)]
pub struct AttributeMap {
    instances: FxHashMap<&'static str, AttributeInstance>,
}

impl AttributeMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an attribute, returning its instance.
    pub fn register(&mut self, definition: AttributeRef) -> &mut AttributeInstance {
        self.instances
            .entry(definition.name)
            .or_insert_with(|| AttributeInstance::new(definition))
    }

    /// The instance for a name, if registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeInstance> {
        self.instances.get(name)
    }

    /// Mutable instance access.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut AttributeInstance> {
        self.instances.get_mut(name)
    }

    /// The evaluated value of a named attribute, or its definition default
    /// when unregistered.
    pub fn value_of(&mut self, definition: AttributeRef) -> f64 {
        self.register(definition).value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_registry::attributes;

    fn modifier(uuid: u128, amount: f64, operation: u8) -> AttributeModifier {
        AttributeModifier {
            uuid: Uuid::from_u128(uuid),
            name: String::from("test"),
            amount,
            operation,
            saved: true,
        }
    }

    #[test]
    fn three_phase_formula() {
        let mut instance = AttributeInstance::new(&attributes::MAX_HEALTH);
        instance.set_base_value(10.0);
        instance.apply_modifier(modifier(1, 4.0, 0)); // 10 + 4 = 14
        instance.apply_modifier(modifier(2, 0.5, 1)); // + 14*0.5 = 21
        instance.apply_modifier(modifier(3, 0.1, 2)); // * 1.1 = 23.1
        assert!((instance.value() - 23.1).abs() < 1e-9);
    }

    #[test]
    fn same_uuid_replaces() {
        let mut instance = AttributeInstance::new(&attributes::ATTACK_DAMAGE);
        instance.apply_modifier(modifier(7, 3.0, 0));
        assert!((instance.value() - 5.0).abs() < 1e-9);
        instance.apply_modifier(modifier(7, 1.0, 0));
        assert!((instance.value() - 3.0).abs() < 1e-9);
        assert_eq!(instance.modifiers().count(), 1);
    }

    #[test]
    fn apply_then_remove_restores_cached_value() {
        let mut instance = AttributeInstance::new(&attributes::MOVEMENT_SPEED);
        let before = instance.value();
        instance.apply_modifier(modifier(9, 0.2, 2));
        assert!((instance.value() - before).abs() > 1e-9);
        instance.remove_modifier(Uuid::from_u128(9));
        assert!((instance.value() - before).abs() < f64::EPSILON);
    }

    #[test]
    fn value_is_cached_between_reads() {
        let mut instance = AttributeInstance::new(&attributes::FOLLOW_RANGE);
        instance.apply_modifier(modifier(1, 8.0, 0));
        let first = instance.value();
        let second = instance.value();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn clamped_to_definition_range() {
        let mut instance = AttributeInstance::new(&attributes::KNOCKBACK_RESISTANCE);
        instance.apply_modifier(modifier(1, 50.0, 0));
        assert!((instance.value() - 1.0).abs() < f64::EPSILON);
        instance.apply_modifier(modifier(2, -500.0, 0));
        assert!(instance.value().abs() < f64::EPSILON);
    }

    #[test]
    fn map_registers_defaults() {
        let mut map = AttributeMap::new();
        assert!((map.value_of(&attributes::MAX_HEALTH) - 20.0).abs() < f64::EPSILON);
        map.get_mut("generic.maxHealth")
            .expect("registered above")
            .set_base_value(30.0);
        assert!((map.value_of(&attributes::MAX_HEALTH) - 30.0).abs() < f64::EPSILON);
    }
}
