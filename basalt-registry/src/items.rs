//! The item table.
//!
//! Stack limits are data here, including the handful of non-64 values the
//! reference buried inside logic (pearls, signs, buckets, tools, armor).

use rustc_hash::FxHashMap;

/// A reference into the static item table.
pub type ItemRef = &'static Item;

/// One entry of the item table.
#[derive(Debug)]
pub struct Item {
    /// Numeric item id. Blocks occupy `0..256`; items start at 256.
    pub id: u16,
    /// Namespaced path, without the `minecraft:` prefix.
    pub name: &'static str,
    /// Maximum stack size.
    pub max_stack_size: u8,
    /// Maximum damage for tools/armor; 0 means not damageable.
    pub max_damage: u16,
}

impl Item {
    const fn new(id: u16, name: &'static str) -> Self {
        Self {
            id,
            name,
            max_stack_size: 64,
            max_damage: 0,
        }
    }

    const fn stack(mut self, size: u8) -> Self {
        self.max_stack_size = size;
        self
    }

    const fn durability(mut self, max_damage: u16) -> Self {
        self.max_stack_size = 1;
        self.max_damage = max_damage;
        self
    }
}

/// The static item table in id order.
static ITEMS: &[Item] = &[
    Item::new(256, "iron_shovel").durability(250),
    Item::new(257, "iron_pickaxe").durability(250),
    Item::new(258, "iron_axe").durability(250),
    Item::new(259, "flint_and_steel").durability(64),
    Item::new(260, "apple"),
    Item::new(261, "bow").durability(384),
    Item::new(262, "arrow"),
    Item::new(263, "coal"),
    Item::new(264, "diamond"),
    Item::new(265, "iron_ingot"),
    Item::new(266, "gold_ingot"),
    Item::new(267, "iron_sword").durability(250),
    Item::new(268, "wooden_sword").durability(59),
    Item::new(269, "wooden_shovel").durability(59),
    Item::new(270, "wooden_pickaxe").durability(59),
    Item::new(271, "wooden_axe").durability(59),
    Item::new(272, "stone_sword").durability(131),
    Item::new(273, "stone_shovel").durability(131),
    Item::new(274, "stone_pickaxe").durability(131),
    Item::new(275, "stone_axe").durability(131),
    Item::new(276, "diamond_sword").durability(1561),
    Item::new(277, "diamond_shovel").durability(1561),
    Item::new(278, "diamond_pickaxe").durability(1561),
    Item::new(279, "diamond_axe").durability(1561),
    Item::new(280, "stick"),
    Item::new(281, "bowl"),
    Item::new(282, "mushroom_stew").stack(1),
    Item::new(283, "golden_sword").durability(32),
    Item::new(284, "golden_shovel").durability(32),
    Item::new(285, "golden_pickaxe").durability(32),
    Item::new(286, "golden_axe").durability(32),
    Item::new(287, "string"),
    Item::new(288, "feather"),
    Item::new(289, "gunpowder"),
    Item::new(290, "wooden_hoe").durability(59),
    Item::new(291, "stone_hoe").durability(131),
    Item::new(292, "iron_hoe").durability(250),
    Item::new(293, "diamond_hoe").durability(1561),
    Item::new(294, "golden_hoe").durability(32),
    Item::new(295, "wheat_seeds"),
    Item::new(296, "wheat"),
    Item::new(297, "bread"),
    Item::new(298, "leather_helmet").durability(55),
    Item::new(299, "leather_chestplate").durability(80),
    Item::new(300, "leather_leggings").durability(75),
    Item::new(301, "leather_boots").durability(65),
    Item::new(302, "chainmail_helmet").durability(165),
    Item::new(303, "chainmail_chestplate").durability(240),
    Item::new(304, "chainmail_leggings").durability(225),
    Item::new(305, "chainmail_boots").durability(195),
    Item::new(306, "iron_helmet").durability(165),
    Item::new(307, "iron_chestplate").durability(240),
    Item::new(308, "iron_leggings").durability(225),
    Item::new(309, "iron_boots").durability(195),
    Item::new(310, "diamond_helmet").durability(363),
    Item::new(311, "diamond_chestplate").durability(528),
    Item::new(312, "diamond_leggings").durability(495),
    Item::new(313, "diamond_boots").durability(429),
    Item::new(314, "golden_helmet").durability(77),
    Item::new(315, "golden_chestplate").durability(112),
    Item::new(316, "golden_leggings").durability(105),
    Item::new(317, "golden_boots").durability(91),
    Item::new(318, "flint"),
    Item::new(319, "porkchop"),
    Item::new(320, "cooked_porkchop"),
    Item::new(321, "painting"),
    Item::new(322, "golden_apple"),
    Item::new(323, "sign").stack(16),
    Item::new(324, "wooden_door").stack(1),
    Item::new(325, "bucket").stack(16),
    Item::new(326, "water_bucket").stack(1),
    Item::new(327, "lava_bucket").stack(1),
    Item::new(328, "minecart").stack(1),
    Item::new(329, "saddle").stack(1),
    Item::new(330, "iron_door").stack(1),
    Item::new(331, "redstone"),
    Item::new(332, "snowball").stack(16),
    Item::new(333, "boat").stack(1),
    Item::new(334, "leather"),
    Item::new(335, "milk_bucket").stack(1),
    Item::new(336, "brick"),
    Item::new(337, "clay_ball"),
    Item::new(338, "reeds"),
    Item::new(339, "paper"),
    Item::new(340, "book"),
    Item::new(341, "slime_ball"),
    Item::new(342, "chest_minecart").stack(1),
    Item::new(343, "furnace_minecart").stack(1),
    Item::new(344, "egg").stack(16),
    Item::new(345, "compass").stack(64),
    Item::new(346, "fishing_rod").durability(64),
    Item::new(347, "clock").stack(64),
    Item::new(348, "glowstone_dust"),
    Item::new(349, "fish"),
    Item::new(350, "cooked_fish"),
    Item::new(351, "dye"),
    Item::new(352, "bone"),
    Item::new(353, "sugar"),
    Item::new(354, "cake").stack(1),
    Item::new(355, "bed").stack(1),
    Item::new(356, "repeater"),
    Item::new(357, "cookie"),
    Item::new(358, "filled_map").stack(1),
    Item::new(359, "shears").durability(238),
    Item::new(360, "melon"),
    Item::new(361, "pumpkin_seeds"),
    Item::new(362, "melon_seeds"),
    Item::new(363, "beef"),
    Item::new(364, "cooked_beef"),
    Item::new(365, "chicken"),
    Item::new(366, "cooked_chicken"),
    Item::new(367, "rotten_flesh"),
    Item::new(368, "ender_pearl").stack(16),
    Item::new(369, "blaze_rod"),
    Item::new(370, "ghast_tear"),
    Item::new(371, "gold_nugget"),
    Item::new(372, "nether_wart"),
    Item::new(373, "potion").stack(1),
    Item::new(374, "glass_bottle"),
    Item::new(375, "spider_eye"),
    Item::new(376, "fermented_spider_eye"),
    Item::new(377, "blaze_powder"),
    Item::new(378, "magma_cream"),
    Item::new(379, "brewing_stand"),
    Item::new(380, "cauldron"),
    Item::new(381, "ender_eye"),
    Item::new(382, "speckled_melon"),
    Item::new(383, "spawn_egg"),
    Item::new(384, "experience_bottle"),
    Item::new(385, "fire_charge"),
    Item::new(386, "writable_book").stack(1),
    Item::new(387, "written_book").stack(16),
    Item::new(388, "emerald"),
    Item::new(389, "item_frame"),
    Item::new(390, "flower_pot"),
    Item::new(391, "carrot"),
    Item::new(392, "potato"),
    Item::new(393, "baked_potato"),
    Item::new(394, "poisonous_potato"),
    Item::new(395, "map"),
    Item::new(396, "golden_carrot"),
    Item::new(397, "skull"),
    Item::new(398, "carrot_on_a_stick").durability(25),
    Item::new(399, "nether_star"),
    Item::new(400, "pumpkin_pie"),
    Item::new(401, "fireworks"),
    Item::new(402, "firework_charge"),
    Item::new(403, "enchanted_book").stack(1),
    Item::new(404, "comparator"),
    Item::new(405, "netherbrick"),
    Item::new(406, "quartz"),
    Item::new(407, "tnt_minecart").stack(1),
    Item::new(408, "hopper_minecart").stack(1),
    Item::new(417, "iron_horse_armor").stack(1),
    Item::new(418, "golden_horse_armor").stack(1),
    Item::new(419, "diamond_horse_armor").stack(1),
    Item::new(420, "lead"),
    Item::new(421, "name_tag").stack(64),
    Item::new(422, "command_block_minecart").stack(1),
    Item::new(2256, "record_13").stack(1),
    Item::new(2257, "record_cat").stack(1),
    Item::new(2258, "record_blocks").stack(1),
    Item::new(2259, "record_chirp").stack(1),
    Item::new(2260, "record_far").stack(1),
    Item::new(2261, "record_mall").stack(1),
    Item::new(2262, "record_mellohi").stack(1),
    Item::new(2263, "record_stal").stack(1),
    Item::new(2264, "record_strad").stack(1),
    Item::new(2265, "record_ward").stack(1),
    Item::new(2266, "record_11").stack(1),
    Item::new(2267, "record_wait").stack(1),
];

/// Lookup structure over the static item table.
pub struct ItemRegistry {
    by_id: FxHashMap<u16, ItemRef>,
    by_name: FxHashMap<&'static str, ItemRef>,
}

impl ItemRegistry {
    /// Builds the vanilla item indexes.
    #[must_use]
    pub fn vanilla() -> Self {
        let mut by_id = FxHashMap::default();
        let mut by_name = FxHashMap::default();
        for item in ITEMS {
            by_id.insert(item.id, item);
            by_name.insert(item.name, item);
        }
        Self { by_id, by_name }
    }

    /// Number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        ITEMS.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        ITEMS.is_empty()
    }

    /// Looks an item up by id.
    #[must_use]
    pub fn by_id(&self, id: u16) -> Option<ItemRef> {
        self.by_id.get(&id).copied()
    }

    /// Looks an item up by name, with or without the `minecraft:` prefix.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<ItemRef> {
        let path = name.strip_prefix("minecraft:").unwrap_or(name);
        self.by_name.get(path).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_limits_live_in_the_table() {
        let registry = ItemRegistry::vanilla();
        assert_eq!(registry.by_id(368).unwrap().max_stack_size, 16); // ender pearl
        assert_eq!(registry.by_id(332).unwrap().max_stack_size, 16); // snowball
        assert_eq!(registry.by_id(276).unwrap().max_stack_size, 1); // diamond sword
        assert_eq!(registry.by_id(264).unwrap().max_stack_size, 64); // diamond
    }

    #[test]
    fn tools_carry_durability() {
        let registry = ItemRegistry::vanilla();
        assert_eq!(registry.by_id(278).unwrap().max_damage, 1561);
        assert_eq!(registry.by_name("minecraft:bow").unwrap().max_damage, 384);
    }
}
