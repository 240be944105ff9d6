//! The stringly typed game-rule store.

use basalt_registry::REGISTRY;
use rustc_hash::FxHashMap;

/// Game rules: string values with typed readers, seeded from the registry
/// defaults and persisted through `level.dat`.
pub struct GameRules {
    values: FxHashMap<String, String>,
}

impl GameRules {
    /// Creates the store with every defined rule at its default.
    #[must_use]
    pub fn new() -> Self {
        let values = REGISTRY
            .game_rules
            .definitions()
            .iter()
            .map(|def| (def.name.to_owned(), def.default.to_owned()))
            .collect();
        Self { values }
    }

    /// Raw string value of a rule.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Boolean reader: exactly `"true"` is true.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name) == Some("true")
    }

    /// Sets a rule. Unknown names are stored too; the reference accepts
    /// arbitrary keys from disk.
    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_owned(), value.to_owned());
    }

    /// Whether the rule name is known (defined or stored).
    #[must_use]
    pub fn has_rule(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates `(name, value)` pairs for persistence.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::new()
    }
}
