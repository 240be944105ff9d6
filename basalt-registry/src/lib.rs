//! Immutable data tables: blocks, biomes, items, potions, attributes,
//! entity types, tile entities, achievements, damage sources, game rules.
//!
//! Every table is populated once behind [`REGISTRY`] and then read
//! lock-free. Nothing here mutates after startup.

use std::sync::LazyLock;

pub mod achievements;
pub mod attributes;
pub mod biome;
pub mod blocks;
pub mod damage;
pub mod entity_types;
pub mod game_rules;
pub mod items;
pub mod potion;
pub mod tile_entity_types;

pub use blocks::{Block, BlockRef, Material, PistonMobility};
pub use damage::DamageSource;
pub use tile_entity_types::TileEntityKind;

/// The process-wide registry. Built on first access, immutable afterwards.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::bootstrap);

/// Container for every static data table.
pub struct Registry {
    /// Block table indexed by id.
    pub blocks: blocks::BlockRegistry,
    /// Biome table indexed by id.
    pub biomes: biome::BiomeRegistry,
    /// Item table indexed by id.
    pub items: items::ItemRegistry,
    /// Potion table indexed by id.
    pub potions: potion::PotionRegistry,
    /// Entity type table.
    pub entity_types: entity_types::EntityTypeRegistry,
    /// Achievement table with parent chains.
    pub achievements: achievements::AchievementRegistry,
    /// Game rule definitions and defaults.
    pub game_rules: game_rules::GameRuleRegistry,
}

impl Registry {
    fn bootstrap() -> Self {
        let registry = Self {
            blocks: blocks::BlockRegistry::vanilla(),
            biomes: biome::BiomeRegistry::vanilla(),
            items: items::ItemRegistry::vanilla(),
            potions: potion::PotionRegistry::vanilla(),
            entity_types: entity_types::EntityTypeRegistry::vanilla(),
            achievements: achievements::AchievementRegistry::vanilla(),
            game_rules: game_rules::GameRuleRegistry::vanilla(),
        };
        log::debug!(
            "registry bootstrapped: {} blocks, {} biomes, {} entity types",
            registry.blocks.len(),
            registry.biomes.len(),
            registry.entity_types.len()
        );
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_bootstraps() {
        assert!(REGISTRY.blocks.len() > 100);
        assert_eq!(REGISTRY.entity_types.len(), 57);
        assert_eq!(REGISTRY.achievements.len(), 33);
    }
}
