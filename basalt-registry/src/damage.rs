//! The damage source taxonomy: 14 static sources plus entity-bound factory
//! forms. The type string doubles as the death-message key suffix.

/// A cause of damage, feeding armor logic and the combat tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageSource {
    /// Type string, e.g. `fall`; becomes `death.attack.fall`.
    pub damage_type: &'static str,
    /// Armor does not reduce this damage.
    pub bypasses_armor: bool,
    /// Counts as fire damage.
    pub is_fire: bool,
    /// Unmodified by potions or enchantments.
    pub is_absolute: bool,
    /// Hurts creative-mode players too.
    pub allowed_in_creative: bool,
    /// Counts as magic damage.
    pub is_magic: bool,
    /// Dealt by a projectile.
    pub is_projectile: bool,
    /// Dealt by an explosion.
    pub is_explosion: bool,
    /// Direct source entity (the arrow, the zombie), if any.
    pub source_entity: Option<i32>,
    /// Indirect owner (the shooter, the thrower), if different.
    pub indirect_entity: Option<i32>,
}

impl DamageSource {
    const fn named(damage_type: &'static str) -> Self {
        Self {
            damage_type,
            bypasses_armor: false,
            is_fire: false,
            is_absolute: false,
            allowed_in_creative: false,
            is_magic: false,
            is_projectile: false,
            is_explosion: false,
            source_entity: None,
            indirect_entity: None,
        }
    }

    const fn bypass_armor(mut self) -> Self {
        self.bypasses_armor = true;
        self
    }

    const fn fire(mut self) -> Self {
        self.is_fire = true;
        self
    }

    const fn absolute(mut self) -> Self {
        self.is_absolute = true;
        self
    }

    const fn creative(mut self) -> Self {
        self.allowed_in_creative = true;
        self
    }

    const fn magic(mut self) -> Self {
        self.is_magic = true;
        self
    }

    /// The entity blamed for this damage: the indirect owner when present,
    /// otherwise the direct source.
    #[must_use]
    pub fn attacker(&self) -> Option<i32> {
        self.indirect_entity.or(self.source_entity)
    }

    // ─── The 14 static sources ───

    /// Standing in a fire block.
    #[must_use]
    pub const fn in_fire() -> Self {
        Self::named("inFire").fire()
    }

    /// Burning after leaving fire.
    #[must_use]
    pub const fn on_fire() -> Self {
        Self::named("onFire").bypass_armor().fire()
    }

    /// Swimming in lava.
    #[must_use]
    pub const fn lava() -> Self {
        Self::named("lava").fire()
    }

    /// Suffocating inside a block.
    #[must_use]
    pub const fn in_wall() -> Self {
        Self::named("inWall").bypass_armor()
    }

    /// Running out of air underwater.
    #[must_use]
    pub const fn drown() -> Self {
        Self::named("drown").bypass_armor()
    }

    /// Starvation.
    #[must_use]
    pub const fn starve() -> Self {
        Self::named("starve").bypass_armor().absolute()
    }

    /// Touching a cactus.
    #[must_use]
    pub const fn cactus() -> Self {
        Self::named("cactus")
    }

    /// Hitting the ground.
    #[must_use]
    pub const fn fall() -> Self {
        Self::named("fall").bypass_armor()
    }

    /// Falling out of the world.
    #[must_use]
    pub const fn out_of_world() -> Self {
        Self::named("outOfWorld").bypass_armor().creative()
    }

    /// Unattributed damage.
    #[must_use]
    pub const fn generic() -> Self {
        Self::named("generic").bypass_armor()
    }

    /// Potion or other magic damage.
    #[must_use]
    pub const fn magic_source() -> Self {
        Self::named("magic").bypass_armor().magic()
    }

    /// The wither effect.
    #[must_use]
    pub const fn wither() -> Self {
        Self::named("wither").bypass_armor()
    }

    /// A falling anvil.
    #[must_use]
    pub const fn anvil() -> Self {
        Self::named("anvil")
    }

    /// Any other falling block.
    #[must_use]
    pub const fn falling_block() -> Self {
        Self::named("fallingBlock")
    }

    // ─── Factory forms ───

    /// Melee damage from a mob.
    #[must_use]
    pub const fn mob(entity: i32) -> Self {
        let mut ds = Self::named("mob");
        ds.source_entity = Some(entity);
        ds
    }

    /// Melee damage from a player.
    #[must_use]
    pub const fn player(entity: i32) -> Self {
        let mut ds = Self::named("player");
        ds.source_entity = Some(entity);
        ds
    }

    /// An arrow, attributed to its shooter.
    #[must_use]
    pub const fn arrow(arrow: i32, shooter: Option<i32>) -> Self {
        let mut ds = Self::named("arrow");
        ds.source_entity = Some(arrow);
        ds.indirect_entity = shooter;
        ds.is_projectile = true;
        ds
    }

    /// A ghast or blaze fireball.
    #[must_use]
    pub const fn fireball(fireball: i32, shooter: Option<i32>) -> Self {
        let mut ds = Self::named("fireball");
        ds.source_entity = Some(fireball);
        ds.indirect_entity = shooter;
        ds.is_projectile = true;
        ds.is_fire = true;
        ds
    }

    /// A thrown projectile (snowball, egg, pearl).
    #[must_use]
    pub const fn thrown(projectile: i32, thrower: Option<i32>) -> Self {
        let mut ds = Self::named("thrown");
        ds.source_entity = Some(projectile);
        ds.indirect_entity = thrower;
        ds.is_projectile = true;
        ds
    }

    /// A splash potion or similar indirect magic.
    #[must_use]
    pub const fn indirect_magic(source: i32, owner: Option<i32>) -> Self {
        let mut ds = Self::named("indirectMagic");
        ds.source_entity = Some(source);
        ds.indirect_entity = owner;
        ds.bypasses_armor = true;
        ds.is_magic = true;
        ds
    }

    /// Thorns armor reflecting damage.
    #[must_use]
    pub const fn thorns(entity: i32) -> Self {
        let mut ds = Self::named("thorns");
        ds.source_entity = Some(entity);
        ds.is_magic = true;
        ds
    }

    /// An explosion, optionally attributed to its igniter.
    #[must_use]
    pub const fn explosion(igniter: Option<i32>) -> Self {
        let mut ds = Self::named("explosion");
        ds.source_entity = igniter;
        ds.is_explosion = true;
        ds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_source_flags() {
        assert!(DamageSource::on_fire().bypasses_armor);
        assert!(DamageSource::on_fire().is_fire);
        assert!(!DamageSource::in_fire().bypasses_armor);
        assert!(DamageSource::starve().is_absolute);
        assert!(DamageSource::out_of_world().allowed_in_creative);
    }

    #[test]
    fn indirect_attacker_wins() {
        let ds = DamageSource::arrow(10, Some(3));
        assert_eq!(ds.attacker(), Some(3));
        let ds = DamageSource::arrow(10, None);
        assert_eq!(ds.attacker(), Some(10));
    }

    #[test]
    fn type_strings_feed_death_keys() {
        assert_eq!(DamageSource::fall().damage_type, "fall");
        assert_eq!(DamageSource::player(1).damage_type, "player");
    }
}
