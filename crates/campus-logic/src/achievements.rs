//! Achievement predicates. Unlocks are monotonic: once an id is in
//! `unlocked_achievements` it stays there.

use crate::state::SimulationState;

pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub condition: fn(&SimulationState) -> bool,
}

impl std::fmt::Debug for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Achievement").field("id", &self.id).finish()
    }
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "social_90",
        name: "Social Butterfly",
        description: "Reach 90 social",
        condition: |s| s.social >= 90,
    },
    Achievement {
        id: "social_100",
        name: "Everybody's Friend",
        description: "Reach 100 social",
        condition: |s| s.social >= 100,
    },
    Achievement {
        id: "money_1w",
        name: "Savvy Saver",
        description: "Hold 10,000 in savings",
        condition: |s| s.money >= 10_000,
    },
    Achievement {
        id: "money_2w",
        name: "Rising Fortune",
        description: "Hold 20,000 in savings",
        condition: |s| s.money >= 20_000,
    },
    Achievement {
        id: "know_90",
        name: "Well Read",
        description: "Reach 90 knowledge",
        condition: |s| s.knowledge >= 90,
    },
    Achievement {
        id: "know_100",
        name: "Boundless Learning",
        description: "Reach 100 knowledge",
        condition: |s| s.knowledge >= 100,
    },
    Achievement {
        id: "health_100",
        name: "Healthy Living",
        description: "Reach 100 health",
        condition: |s| s.health >= 100,
    },
    Achievement {
        id: "skill_90",
        name: "Workplace Ace",
        description: "Reach 90 skill",
        condition: |s| s.skill >= 90,
    },
    Achievement {
        id: "skill_100",
        name: "Workplace Legend",
        description: "Reach 100 skill",
        condition: |s| s.skill >= 100,
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Unlock every achievement whose condition now holds. Returns only the
/// newly unlocked ones, in table order.
pub fn check_achievements(state: &mut SimulationState) -> Vec<&'static Achievement> {
    let mut unlocked = Vec::new();
    for achievement in ACHIEVEMENTS {
        if !state.unlocked_achievements.contains(achievement.id) && (achievement.condition)(state) {
            state.unlocked_achievements.insert(achievement.id.to_string());
            log::info!("Achievement unlocked: {}", achievement.id);
            unlocked.push(achievement);
        }
    }
    unlocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Faculty, FamilyTier};

    #[test]
    fn test_unlock_once() {
        let mut s = SimulationState::new(Faculty::Science, FamilyTier::Rich);
        s.money = 25_000;
        let ids: Vec<_> = check_achievements(&mut s).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["money_1w", "money_2w"]);
        assert!(check_achievements(&mut s).is_empty());
    }

    #[test]
    fn test_unlocks_survive_stat_drop() {
        let mut s = SimulationState::new(Faculty::Science, FamilyTier::Ordinary);
        s.health = 100;
        check_achievements(&mut s);
        s.health = 60;
        check_achievements(&mut s);
        assert!(s.unlocked_achievements.contains("health_100"));
        assert_eq!(find("health_100").map(|a| a.name), Some("Healthy Living"));
    }
}
