//! The scoreboard: objectives, per-player scores and teams.

use rustc_hash::FxHashMap;

/// One objective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    /// Internal name.
    pub name: String,
    /// Criteria string, e.g. `dummy`, `deathCount`, `playerKillCount`.
    pub criteria: String,
    /// Display name shown to players.
    pub display_name: String,
}

/// One score row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Player name the score belongs to.
    pub player_name: String,
    /// Objective name.
    pub objective: String,
    /// Points.
    pub score_points: i32,
}

/// One team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Internal name.
    pub name: String,
    /// Display name.
    pub display_name: String,
    /// Prepended to member names in chat.
    pub prefix: String,
    /// Appended to member names in chat.
    pub suffix: String,
    /// Whether members can hurt each other.
    pub friendly_fire: bool,
    /// Member player names.
    pub members: Vec<String>,
}

/// The scoreboard.
#[derive(Default)]
pub struct Scoreboard {
    objectives: FxHashMap<String, Objective>,
    scores: FxHashMap<(String, String), i32>,
    teams: FxHashMap<String, Team>,
    /// Display slots: 0 list, 1 sidebar, 2 below name.
    display_slots: [Option<String>; 3],
}

impl Scoreboard {
    /// Creates an empty scoreboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an objective; duplicate names are rejected.
    pub fn add_objective(&mut self, name: &str, criteria: &str, display_name: &str) -> bool {
        if self.objectives.contains_key(name) {
            return false;
        }
        self.objectives.insert(
            name.to_owned(),
            Objective {
                name: name.to_owned(),
                criteria: criteria.to_owned(),
                display_name: display_name.to_owned(),
            },
        );
        true
    }

    /// Removes an objective and every score under it.
    pub fn remove_objective(&mut self, name: &str) -> Option<Objective> {
        let removed = self.objectives.remove(name);
        if removed.is_some() {
            self.scores.retain(|(_, objective), _| objective != name);
            for slot in &mut self.display_slots {
                if slot.as_deref() == Some(name) {
                    *slot = None;
                }
            }
        }
        removed
    }

    /// Looks an objective up.
    #[must_use]
    pub fn objective(&self, name: &str) -> Option<&Objective> {
        self.objectives.get(name)
    }

    /// Sets a score.
    pub fn set_score(&mut self, player: &str, objective: &str, points: i32) {
        if self.objectives.contains_key(objective) {
            self.scores
                .insert((player.to_owned(), objective.to_owned()), points);
        }
    }

    /// Adds to a score, creating it at the delta when absent.
    pub fn add_score(&mut self, player: &str, objective: &str, delta: i32) {
        if !self.objectives.contains_key(objective) {
            return;
        }
        let entry = self
            .scores
            .entry((player.to_owned(), objective.to_owned()))
            .or_insert(0);
        *entry = entry.saturating_add(delta);
    }

    /// Reads a score.
    #[must_use]
    pub fn score(&self, player: &str, objective: &str) -> Option<i32> {
        self.scores
            .get(&(player.to_owned(), objective.to_owned()))
            .copied()
    }

    /// Every score under an objective in non-increasing point order; ties
    /// break by player name for stable output.
    #[must_use]
    pub fn sorted_scores(&self, objective: &str) -> Vec<Score> {
        let mut rows: Vec<Score> = self
            .scores
            .iter()
            .filter(|((_, obj), _)| obj == objective)
            .map(|((player, obj), &points)| Score {
                player_name: player.clone(),
                objective: obj.clone(),
                score_points: points,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.score_points
                .cmp(&a.score_points)
                .then_with(|| a.player_name.cmp(&b.player_name))
        });
        rows
    }

    /// Assigns an objective to a display slot (0 list, 1 sidebar, 2 below
    /// name).
    pub fn set_display_slot(&mut self, slot: usize, objective: Option<&str>) {
        if slot < 3 {
            self.display_slots[slot] = objective.map(str::to_owned);
        }
    }

    /// The objective shown in a display slot.
    #[must_use]
    pub fn display_slot(&self, slot: usize) -> Option<&str> {
        self.display_slots.get(slot)?.as_deref()
    }

    /// Creates a team; duplicate names are rejected.
    pub fn add_team(&mut self, name: &str) -> bool {
        if self.teams.contains_key(name) {
            return false;
        }
        self.teams.insert(
            name.to_owned(),
            Team {
                name: name.to_owned(),
                display_name: name.to_owned(),
                prefix: String::new(),
                suffix: String::new(),
                friendly_fire: true,
                members: Vec::new(),
            },
        );
        true
    }

    /// Adds a player to a team, removing it from any other team first.
    pub fn join_team(&mut self, team_name: &str, player: &str) -> bool {
        if !self.teams.contains_key(team_name) {
            return false;
        }
        for team in self.teams.values_mut() {
            team.members.retain(|member| member != player);
        }
        if let Some(team) = self.teams.get_mut(team_name) {
            team.members.push(player.to_owned());
            return true;
        }
        false
    }

    /// The team a player belongs to.
    #[must_use]
    pub fn team_of(&self, player: &str) -> Option<&Team> {
        self.teams
            .values()
            .find(|team| team.members.iter().any(|member| member == player))
    }

    /// Mutable team access.
    pub fn team_mut(&mut self, name: &str) -> Option<&mut Team> {
        self.teams.get_mut(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_scores_are_non_increasing() {
        let mut board = Scoreboard::new();
        board.add_objective("kills", "playerKillCount", "Kills");
        board.set_score("alice", "kills", 5);
        board.set_score("bob", "kills", 9);
        board.set_score("carol", "kills", 2);
        board.set_score("dave", "kills", 9);

        let sorted = board.sorted_scores("kills");
        let points: Vec<i32> = sorted.iter().map(|s| s.score_points).collect();
        assert_eq!(points, vec![9, 9, 5, 2]);
        for window in sorted.windows(2) {
            assert!(window[0].score_points >= window[1].score_points);
        }
    }

    #[test]
    fn scores_require_an_objective() {
        let mut board = Scoreboard::new();
        board.set_score("alice", "ghost", 5);
        assert_eq!(board.score("alice", "ghost"), None);
    }

    #[test]
    fn removing_an_objective_drops_its_scores() {
        let mut board = Scoreboard::new();
        board.add_objective("deaths", "deathCount", "Deaths");
        board.add_score("alice", "deaths", 1);
        board.set_display_slot(1, Some("deaths"));
        board.remove_objective("deaths");
        assert!(board.sorted_scores("deaths").is_empty());
        assert_eq!(board.display_slot(1), None);
    }

    #[test]
    fn team_membership_is_exclusive() {
        let mut board = Scoreboard::new();
        board.add_team("red");
        board.add_team("blue");
        assert!(board.join_team("red", "alice"));
        assert!(board.join_team("blue", "alice"));
        assert_eq!(board.team_of("alice").unwrap().name, "blue");
        assert!(board.team_mut("red").unwrap().members.is_empty());
    }
}
