//! Semester GPA and cumulative averaging.

use serde::{Deserialize, Serialize};

use crate::constants::{calendar, gpa};
use crate::state::SimulationState;

/// Outcome of settling one semester.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemesterReport {
    pub semester_gpa: f64,
    pub credits: u32,
    pub cumulative_gpa: f64,
}

impl SemesterReport {
    pub fn is_excellent(&self) -> bool {
        self.semester_gpa >= gpa::EXCELLENT
    }
}

/// Semester GPA from study effort, knowledge and health.
///
/// Effort below 1 is treated as 1, so the logarithm is always defined.
/// The result lies in [2.4, 5.0] and is rounded to two decimals.
pub fn semester_gpa(effort: i32, knowledge: i32, health: i32) -> f64 {
    let effort = effort.max(1) as f64;
    let mut penalty = 0.0;
    if health < 80 {
        penalty += gpa::HEALTH_PENALTY_80;
    }
    if health < 70 {
        penalty += gpa::HEALTH_PENALTY_70;
    }
    let raw = gpa::BASE + gpa::LOG_FACTOR * effort.log10()
        - gpa::KNOWLEDGE_FACTOR * (100 - knowledge) as f64
        - penalty;
    round2(raw.clamp(gpa::BASE, gpa::MAX))
}

/// Credit-weighted running average.
pub fn cumulative_gpa(old_gpa: f64, old_credits: u32, sem_gpa: f64, sem_credits: u32) -> f64 {
    let total = old_credits + sem_credits;
    if total == 0 {
        return sem_gpa;
    }
    (old_gpa * old_credits as f64 + sem_gpa * sem_credits as f64) / total as f64
}

/// Settle the running semester. Returns `None` in the final year, where
/// no GPA is recorded.
pub fn settle_semester(state: &mut SimulationState) -> Option<SemesterReport> {
    if state.grade >= calendar::FINAL_GRADE {
        return None;
    }
    let sem_gpa = semester_gpa(state.semester_study_effort, state.knowledge, state.health);
    let credits = state.semester_target;
    state.gpa = cumulative_gpa(state.gpa, state.credits_earned_total, sem_gpa, credits);
    state.credits_earned_total += credits;
    state.semester_target = 0;

    log::info!(
        "Semester settled: gpa {:.2} on {} credits, cumulative {:.2}",
        sem_gpa,
        credits,
        state.gpa
    );
    Some(SemesterReport {
        semester_gpa: sem_gpa,
        credits,
        cumulative_gpa: state.gpa,
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Faculty, FamilyTier};

    #[test]
    fn test_zero_effort_is_guarded() {
        // log10(1) = 0, knowledge 100, healthy: exactly the floor
        assert_eq!(semester_gpa(0, 100, 100), 2.4);
        assert_eq!(semester_gpa(-50, 100, 100), 2.4);
    }

    #[test]
    fn test_gpa_formula() {
        // 2.4 + 1.3 * 2 - 0.01 * 10 = 4.9
        assert_eq!(semester_gpa(100, 90, 90), 4.9);
        // health < 80 and < 70 stack to 0.2
        assert_eq!(semester_gpa(100, 90, 65), 4.7);
        assert_eq!(semester_gpa(100, 90, 75), 4.8);
    }

    #[test]
    fn test_gpa_capped() {
        assert_eq!(semester_gpa(1_000_000, 100, 100), 5.0);
    }

    #[test]
    fn test_cumulative_weighting() {
        let c = cumulative_gpa(0.0, 0, 4.0, 25);
        assert_eq!(c, 4.0);
        let c = cumulative_gpa(c, 25, 3.0, 75);
        assert!((c - 3.25).abs() < 1e-9);
        assert_eq!(cumulative_gpa(3.3, 0, 3.8, 0), 3.8);
    }

    #[test]
    fn test_settle_moves_credits() {
        let mut s = SimulationState::new(Faculty::Science, FamilyTier::Ordinary);
        s.semester_target = 27;
        s.semester_study_effort = 100;
        s.knowledge = 90;
        let report = settle_semester(&mut s).unwrap();
        assert_eq!(report.credits, 27);
        assert_eq!(s.credits_earned_total, 27);
        assert_eq!(s.semester_target, 0);
        assert!((s.gpa - report.semester_gpa).abs() < 1e-9);
        assert!(report.is_excellent());
    }

    #[test]
    fn test_final_year_not_settled() {
        let mut s = SimulationState::new(Faculty::Science, FamilyTier::Ordinary);
        s.grade = 4;
        s.semester_target = 20;
        assert!(settle_semester(&mut s).is_none());
        assert_eq!(s.semester_target, 20);
        assert_eq!(s.credits_earned_total, 0);
    }
}
