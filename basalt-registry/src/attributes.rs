//! Generic entity attribute definitions.

/// A reference into the attribute definition table.
pub type AttributeRef = &'static AttributeDefinition;

/// Definition of a named attribute: default value plus the clamp range
/// applied after modifier evaluation.
#[derive(Debug)]
pub struct AttributeDefinition {
    /// Registry name, e.g. `generic.maxHealth`.
    pub name: &'static str,
    /// Default base value.
    pub default_value: f64,
    /// Minimum final value.
    pub min_value: f64,
    /// Maximum final value.
    pub max_value: f64,
}

impl AttributeDefinition {
    /// Clamps a computed value into this definition's range.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min_value, self.max_value)
    }
}

/// `generic.maxHealth`: default 20, range `[0, Double.MAX]`.
pub static MAX_HEALTH: AttributeDefinition = AttributeDefinition {
    name: "generic.maxHealth",
    default_value: 20.0,
    min_value: 0.0,
    max_value: f64::MAX,
};

/// `generic.followRange`: default 32, range `[0, 2048]`.
pub static FOLLOW_RANGE: AttributeDefinition = AttributeDefinition {
    name: "generic.followRange",
    default_value: 32.0,
    min_value: 0.0,
    max_value: 2048.0,
};

/// `generic.knockbackResistance`: default 0, range `[0, 1]`.
pub static KNOCKBACK_RESISTANCE: AttributeDefinition = AttributeDefinition {
    name: "generic.knockbackResistance",
    default_value: 0.0,
    min_value: 0.0,
    max_value: 1.0,
};

/// `generic.movementSpeed`: default 0.7, range `[0, Double.MAX]`.
pub static MOVEMENT_SPEED: AttributeDefinition = AttributeDefinition {
    name: "generic.movementSpeed",
    default_value: 0.7,
    min_value: 0.0,
    max_value: f64::MAX,
};

/// `generic.attackDamage`: default 2, range `[0, Double.MAX]`.
pub static ATTACK_DAMAGE: AttributeDefinition = AttributeDefinition {
    name: "generic.attackDamage",
    default_value: 2.0,
    min_value: 0.0,
    max_value: f64::MAX,
};

/// All five defined attributes.
pub static ALL: [AttributeRef; 5] = [
    &MAX_HEALTH,
    &FOLLOW_RANGE,
    &KNOCKBACK_RESISTANCE,
    &MOVEMENT_SPEED,
    &ATTACK_DAMAGE,
];

/// Looks an attribute definition up by name.
#[must_use]
pub fn by_name(name: &str) -> Option<AttributeRef> {
    ALL.iter().copied().find(|def| def.name == name)
}
