//! The achievement table with parent gating.

use rustc_hash::{FxHashMap, FxHashSet};

/// A reference into the achievement table.
pub type AchievementRef = &'static Achievement;

/// One achievement entry.
#[derive(Debug)]
pub struct Achievement {
    /// Stat id, e.g. `openInventory`.
    pub id: &'static str,
    /// Parent that must be unlocked first, unless independent.
    pub parent: Option<&'static str>,
    /// Marked as a "challenge" achievement.
    pub is_special: bool,
    /// Grantable without any parent (the root).
    pub independent: bool,
}

const fn root(id: &'static str) -> Achievement {
    Achievement {
        id,
        parent: None,
        is_special: false,
        independent: true,
    }
}

const fn child(id: &'static str, parent: &'static str) -> Achievement {
    Achievement {
        id,
        parent: Some(parent),
        is_special: false,
        independent: false,
    }
}

const fn special(id: &'static str, parent: &'static str) -> Achievement {
    Achievement {
        id,
        parent: Some(parent),
        is_special: true,
        independent: false,
    }
}

/// The static achievement table.
static ACHIEVEMENTS: &[Achievement] = &[
    root("openInventory"),
    child("mineWood", "openInventory"),
    child("buildWorkBench", "mineWood"),
    child("buildPickaxe", "buildWorkBench"),
    child("buildFurnace", "buildPickaxe"),
    child("acquireIron", "buildFurnace"),
    child("buildHoe", "buildWorkBench"),
    child("makeBread", "buildHoe"),
    child("bakeCake", "buildHoe"),
    child("buildBetterPickaxe", "buildPickaxe"),
    child("cookFish", "buildFurnace"),
    special("onARail", "acquireIron"),
    child("buildSword", "buildWorkBench"),
    child("killEnemy", "buildSword"),
    child("killCow", "buildSword"),
    special("flyPig", "killCow"),
    special("snipeSkeleton", "killEnemy"),
    child("diamonds", "acquireIron"),
    child("diamondsToYou", "diamonds"),
    child("portal", "diamonds"),
    special("ghast", "portal"),
    child("blazeRod", "portal"),
    child("potion", "blazeRod"),
    special("theEnd", "blazeRod"),
    special("theEnd2", "theEnd"),
    child("enchantments", "diamonds"),
    special("overkill", "enchantments"),
    child("bookcase", "enchantments"),
    child("breedCow", "killCow"),
    child("spawnWither", "theEnd2"),
    child("killWither", "spawnWither"),
    special("fullBeacon", "killWither"),
    special("exploreAllBiomes", "theEnd"),
];

/// Lookup structure over the achievement table.
pub struct AchievementRegistry {
    by_id: FxHashMap<&'static str, AchievementRef>,
}

impl AchievementRegistry {
    /// Builds the vanilla achievement index.
    #[must_use]
    pub fn vanilla() -> Self {
        let mut by_id = FxHashMap::default();
        for achievement in ACHIEVEMENTS {
            by_id.insert(achievement.id, achievement);
        }
        Self { by_id }
    }

    /// Number of registered achievements.
    #[must_use]
    pub fn len(&self) -> usize {
        ACHIEVEMENTS.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        ACHIEVEMENTS.is_empty()
    }

    /// Looks an achievement up by id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<AchievementRef> {
        self.by_id.get(id).copied()
    }

    /// Whether `id` may be granted given the set of already-unlocked ids.
    /// Non-independent achievements require their parent first.
    #[must_use]
    pub fn can_unlock(&self, id: &str, unlocked: &FxHashSet<String>) -> bool {
        let Some(achievement) = self.by_id(id) else {
            return false;
        };
        if achievement.independent {
            return true;
        }
        achievement
            .parent
            .is_none_or(|parent| unlocked.contains(parent))
    }

    /// Iterates all achievements.
    pub fn iter(&self) -> impl Iterator<Item = AchievementRef> {
        ACHIEVEMENTS.iter()
    }
}
