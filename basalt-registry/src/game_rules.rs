//! Game rule definitions and defaults.
//!
//! Rules are stringly typed on disk and over the wire; readers interpret
//! `"true"`/`"false"`.

/// One game rule definition.
#[derive(Debug)]
pub struct GameRuleDef {
    /// Rule name.
    pub name: &'static str,
    /// Default value string.
    pub default: &'static str,
}

/// The defined rules and their defaults.
static GAME_RULES: &[GameRuleDef] = &[
    GameRuleDef { name: "doFireTick", default: "true" },
    GameRuleDef { name: "mobGriefing", default: "true" },
    GameRuleDef { name: "keepInventory", default: "false" },
    GameRuleDef { name: "doMobSpawning", default: "true" },
    GameRuleDef { name: "doMobLoot", default: "true" },
    GameRuleDef { name: "doTileDrops", default: "true" },
    GameRuleDef { name: "commandBlockOutput", default: "true" },
    GameRuleDef { name: "naturalRegeneration", default: "true" },
    GameRuleDef { name: "doDaylightCycle", default: "true" },
];

/// Lookup structure over the rule definitions.
pub struct GameRuleRegistry;

impl GameRuleRegistry {
    /// Builds the vanilla rule set.
    #[must_use]
    pub fn vanilla() -> Self {
        Self
    }

    /// All rule definitions.
    #[must_use]
    pub fn definitions(&self) -> &'static [GameRuleDef] {
        GAME_RULES
    }

    /// Looks a definition up by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&'static GameRuleDef> {
        GAME_RULES.iter().find(|rule| rule.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let registry = GameRuleRegistry::vanilla();
        assert_eq!(registry.by_name("doFireTick").unwrap().default, "true");
        assert_eq!(registry.by_name("keepInventory").unwrap().default, "false");
        assert!(registry.by_name("fastFood").is_none());
        assert_eq!(registry.definitions().len(), 9);
    }
}
