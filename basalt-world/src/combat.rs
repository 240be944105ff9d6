//! The combat tracker: a per-entity damage log and the death-message
//! derivation built on top of it.

use basalt_registry::DamageSource;
use basalt_utils::text::ChatComponent;

/// Ticks of quiet that end combat once engaged.
const IN_COMBAT_TIMEOUT: i32 = 300;
/// Ticks of quiet that clear the log outside combat.
const IDLE_TIMEOUT: i32 = 100;

/// One recorded damage event.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatEntry {
    /// Damage type string from the source taxonomy.
    pub damage_type: String,
    /// Victim's age in ticks when hit.
    pub tick: i32,
    /// Health before the hit landed.
    pub health_before: f32,
    /// Damage dealt.
    pub damage: f32,
    /// `"ladder"`, `"vines"`, `"water"` or empty.
    pub location_context: String,
    /// Victim's fall distance at the time of the hit.
    pub fall_distance: f32,
    /// Attacking entity id, if any.
    pub attacker_id: Option<i32>,
    /// Attacker display name.
    pub attacker_name: String,
    /// Whether the attacker is a player.
    pub attacker_is_player: bool,
}

impl CombatEntry {
    /// Whether this entry has a living attacker.
    #[must_use]
    pub const fn has_living_attacker(&self) -> bool {
        self.attacker_id.is_some()
    }
}

/// The strongest attacker chosen for kill credit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttackerInfo {
    /// Attacker entity id.
    pub entity_id: Option<i32>,
    /// Attacker display name.
    pub name: String,
    /// Whether the attacker is a player.
    pub is_player: bool,
}

/// The combat tracker.
pub struct CombatTracker {
    entries: Vec<CombatEntry>,
    last_damage_tick: i32,
    combat_start_tick: i32,
    combat_end_tick: i32,
    in_combat: bool,
    taking_damage: bool,
    location_context: String,
}

impl CombatTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            last_damage_tick: 0,
            combat_start_tick: 0,
            combat_end_tick: 0,
            in_combat: false,
            taking_damage: false,
            location_context: String::new(),
        }
    }

    /// Whether the entity is currently considered in combat.
    #[must_use]
    pub const fn in_combat(&self) -> bool {
        self.in_combat
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Recomputes the location context from the entity's block state
    /// before damage is recorded.
    pub fn update_location_context(&mut self, on_ladder: bool, on_vines: bool, in_water: bool) {
        self.location_context.clear();
        if on_ladder {
            self.location_context
                .push_str(if on_vines { "vines" } else { "ladder" });
        } else if in_water {
            self.location_context.push_str("water");
        }
    }

    /// Records one damage event. Stale state is cleared first when the
    /// timeout has passed or the entity already died.
    #[allow(clippy::too_many_arguments)]
    pub fn record_damage(
        &mut self,
        source: &DamageSource,
        entity_tick: i32,
        health_before: f32,
        damage: f32,
        fall_distance: f32,
        attacker_name: &str,
        attacker_is_player: bool,
    ) {
        self.check_combat_end(entity_tick, true);

        let entry = CombatEntry {
            damage_type: source.damage_type.to_owned(),
            tick: entity_tick,
            health_before,
            damage,
            location_context: self.location_context.clone(),
            fall_distance,
            attacker_id: source.attacker(),
            attacker_name: attacker_name.to_owned(),
            attacker_is_player,
        };
        let starts_combat = entry.has_living_attacker() && !self.in_combat;
        self.entries.push(entry);
        self.last_damage_tick = entity_tick;
        self.taking_damage = true;

        if starts_combat {
            self.in_combat = true;
            self.combat_start_tick = entity_tick;
            self.combat_end_tick = entity_tick;
        }
    }

    /// Decays combat state: after the timeout (or death) the log clears
    /// and combat ends.
    pub fn check_combat_end(&mut self, entity_tick: i32, entity_alive: bool) {
        let timeout = if self.in_combat {
            IN_COMBAT_TIMEOUT
        } else {
            IDLE_TIMEOUT
        };
        if self.taking_damage && (!entity_alive || entity_tick - self.last_damage_tick > timeout) {
            self.taking_damage = false;
            self.in_combat = false;
            self.combat_end_tick = entity_tick;
            self.entries.clear();
        }
    }

    /// The strongest attacker: the best player wins if its damage is at
    /// least a third of the best living attacker's.
    #[must_use]
    pub fn strongest_attacker(&self) -> AttackerInfo {
        let mut best_living = AttackerInfo::default();
        let mut best_player = AttackerInfo::default();
        let mut best_living_damage = 0.0f32;
        let mut best_player_damage = 0.0f32;

        for entry in &self.entries {
            let Some(attacker_id) = entry.attacker_id else {
                continue;
            };
            if entry.attacker_is_player && entry.damage > best_player_damage {
                best_player_damage = entry.damage;
                best_player = AttackerInfo {
                    entity_id: Some(attacker_id),
                    name: entry.attacker_name.clone(),
                    is_player: true,
                };
            }
            if entry.damage > best_living_damage {
                best_living_damage = entry.damage;
                best_living = AttackerInfo {
                    entity_id: Some(attacker_id),
                    name: entry.attacker_name.clone(),
                    is_player: entry.attacker_is_player,
                };
            }
        }

        if best_player.entity_id.is_some() && best_player_damage >= best_living_damage / 3.0 {
            best_player
        } else {
            best_living
        }
    }

    /// Finds the entry preceding the biggest qualifying fall. A fall entry
    /// at index 0 refers to itself; that is the reference behavior and is
    /// kept.
    fn best_fall_cause(&self) -> Option<&CombatEntry> {
        let mut best: Option<&CombatEntry> = None;
        let mut best_distance = 0.0f32;
        for (index, entry) in self.entries.iter().enumerate() {
            if (entry.damage_type == "fall" || entry.damage_type == "outOfWorld")
                && entry.fall_distance > 0.0
                && entry.fall_distance > best_distance
            {
                best = Some(if index > 0 {
                    &self.entries[index - 1]
                } else {
                    entry
                });
                best_distance = entry.fall_distance;
            }
        }
        (best_distance > 5.0).then_some(best).flatten()
    }

    /// Derives the death message for the victim.
    #[must_use]
    pub fn death_message(&self, victim_name: &str) -> ChatComponent {
        let Some(last) = self.entries.last() else {
            return ChatComponent::translate(
                "death.attack.generic",
                vec![ChatComponent::text(victim_name)],
            );
        };

        let fall_cause = self.best_fall_cause();
        if let Some(cause) = fall_cause
            && last.damage_type == "fall"
        {
            let context = if cause.location_context.is_empty() {
                "generic"
            } else {
                cause.location_context.as_str()
            };
            return if cause.damage_type == "fall" || cause.damage_type == "outOfWorld" {
                ChatComponent::translate(
                    format!("death.fell.accident.{context}"),
                    vec![ChatComponent::text(victim_name)],
                )
            } else if !cause.attacker_name.is_empty()
                && cause.attacker_name != last.attacker_name
            {
                ChatComponent::translate(
                    "death.fell.assist",
                    vec![
                        ChatComponent::text(victim_name),
                        ChatComponent::text(cause.attacker_name.clone()),
                    ],
                )
            } else if !last.attacker_name.is_empty() {
                ChatComponent::translate(
                    "death.fell.finish",
                    vec![
                        ChatComponent::text(victim_name),
                        ChatComponent::text(last.attacker_name.clone()),
                    ],
                )
            } else {
                ChatComponent::translate(
                    "death.fell.killer",
                    vec![ChatComponent::text(victim_name)],
                )
            };
        }

        let mut args = vec![ChatComponent::text(victim_name)];
        if !last.attacker_name.is_empty() {
            args.push(ChatComponent::text(last.attacker_name.clone()));
        }
        ChatComponent::translate(format!("death.attack.{}", last.damage_type), args)
    }
}

impl Default for CombatTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fall_source() -> DamageSource {
        DamageSource::fall()
    }

    #[test]
    fn empty_log_is_generic() {
        let tracker = CombatTracker::new();
        let msg = tracker.death_message("Bob");
        assert_eq!(msg.translate.as_deref(), Some("death.attack.generic"));
    }

    #[test]
    fn log_clears_after_300_quiet_ticks_in_combat() {
        let mut tracker = CombatTracker::new();
        tracker.record_damage(&DamageSource::player(7), 0, 20.0, 4.0, 0.0, "Alice", true);
        assert!(tracker.in_combat());

        tracker.check_combat_end(300, true);
        assert!(tracker.in_combat(), "exactly 300 ticks is not yet expiry");
        tracker.check_combat_end(301, true);
        assert!(!tracker.in_combat());
        assert_eq!(tracker.entry_count(), 0);
    }

    #[test]
    fn idle_timeout_is_100_ticks() {
        let mut tracker = CombatTracker::new();
        tracker.record_damage(&DamageSource::cactus(), 0, 20.0, 1.0, 0.0, "", false);
        assert!(!tracker.in_combat(), "no living attacker means no combat");
        tracker.check_combat_end(101, true);
        assert_eq!(tracker.entry_count(), 0);
    }

    #[test]
    fn strongest_attacker_prefers_players_at_a_third() {
        let mut tracker = CombatTracker::new();
        tracker.record_damage(&DamageSource::mob(1), 0, 20.0, 9.0, 0.0, "Zombie", false);
        tracker.record_damage(&DamageSource::player(2), 1, 11.0, 3.0, 0.0, "Alice", true);
        let best = tracker.strongest_attacker();
        assert_eq!(best.name, "Alice");
        assert!(best.is_player);

        // Below the third, the mob keeps the credit.
        let mut tracker = CombatTracker::new();
        tracker.record_damage(&DamageSource::mob(1), 0, 20.0, 10.0, 0.0, "Zombie", false);
        tracker.record_damage(&DamageSource::player(2), 1, 10.0, 3.0, 0.0, "Alice", true);
        assert_eq!(tracker.strongest_attacker().name, "Zombie");
    }

    #[test]
    fn fell_finish_with_attacker() {
        // Alice hits, then the victim falls 10 blocks to death.
        let mut tracker = CombatTracker::new();
        tracker.record_damage(&DamageSource::player(2), 0, 20.0, 4.0, 0.0, "Alice", true);
        tracker.record_damage(&fall_source(), 5, 16.0, 10.0, 10.0, "Alice", true);
        let msg = tracker.death_message("Bob");
        assert_eq!(msg.translate.as_deref(), Some("death.fell.finish"));
        assert_eq!(msg.with[1].text, "Alice");
    }

    #[test]
    fn fell_accident_without_attacker() {
        let mut tracker = CombatTracker::new();
        tracker.record_damage(&fall_source(), 0, 20.0, 12.0, 12.0, "", false);
        let msg = tracker.death_message("Bob");
        // The fall entry is first, so the cause scan refers to itself.
        assert_eq!(msg.translate.as_deref(), Some("death.fell.accident.generic"));
    }

    #[test]
    fn fall_context_comes_from_location() {
        let mut tracker = CombatTracker::new();
        tracker.update_location_context(true, false, false);
        tracker.record_damage(&fall_source(), 0, 20.0, 12.0, 12.0, "", false);
        let msg = tracker.death_message("Bob");
        assert_eq!(msg.translate.as_deref(), Some("death.fell.accident.ladder"));
    }

    #[test]
    fn short_falls_do_not_claim_the_death() {
        let mut tracker = CombatTracker::new();
        tracker.record_damage(&fall_source(), 0, 20.0, 2.0, 3.0, "", false);
        let msg = tracker.death_message("Bob");
        assert_eq!(msg.translate.as_deref(), Some("death.attack.fall"));
    }

    #[test]
    fn fell_assist_when_causes_differ() {
        let mut tracker = CombatTracker::new();
        tracker.record_damage(&DamageSource::mob(9), 0, 20.0, 2.0, 0.0, "Skeleton", false);
        tracker.record_damage(&fall_source(), 2, 18.0, 6.0, 8.0, "", false);
        // Final blow is another fall with a different (absent) attacker on
        // the causing entry.
        let msg = tracker.death_message("Bob");
        assert_eq!(msg.translate.as_deref(), Some("death.fell.assist"));
        assert_eq!(msg.with[1].text, "Skeleton");
    }
}
