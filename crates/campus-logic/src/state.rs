//! The single mutable record every component reads and writes.
//!
//! Every attribute and resource mutation goes through [`SimulationState::apply_delta`],
//! which clamps the result into the field's legal range before it is visible.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::constants::{calendar, stats};
use crate::content::{Faculty, FamilyTier};

/// Per-month action phase. Only ever moves forward within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Major,
    Minor,
    Done,
}

impl Phase {
    /// The phase after one action has been taken.
    pub fn next(self) -> Self {
        match self {
            Phase::Major => Phase::Minor,
            Phase::Minor | Phase::Done => Phase::Done,
        }
    }

    /// Magnitude multiplier for actions taken in this phase.
    pub fn multiplier(self) -> f64 {
        match self {
            Phase::Major => 1.0,
            Phase::Minor | Phase::Done => 0.5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Major => "major",
            Phase::Minor => "minor",
            Phase::Done => "done",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Closed set of state fields that effect vectors may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Knowledge,
    Skill,
    Social,
    Health,
    Energy,
    Money,
    /// Study investment for the running semester.
    StudyEffort,
    /// Study investment banked for the next semester.
    StudyBuff,
    Thesis,
}

impl Stat {
    pub const ALL: [Stat; 9] = [
        Stat::Knowledge,
        Stat::Skill,
        Stat::Social,
        Stat::Health,
        Stat::Energy,
        Stat::Money,
        Stat::StudyEffort,
        Stat::StudyBuff,
        Stat::Thesis,
    ];

    /// The four attributes bounded to [50, 100].
    pub const ATTRIBUTES: [Stat; 4] = [Stat::Knowledge, Stat::Skill, Stat::Social, Stat::Health];

    /// Content label for this stat.
    pub fn key(self) -> &'static str {
        match self {
            Stat::Knowledge => "knowledge",
            Stat::Skill => "skill",
            Stat::Social => "social",
            Stat::Health => "health",
            Stat::Energy => "energy",
            Stat::Money => "money",
            Stat::StudyEffort => "study_effort",
            Stat::StudyBuff => "study_buff",
            Stat::Thesis => "thesis",
        }
    }

    /// Resolve a content label. Unknown labels yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Stat::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn is_attribute(self) -> bool {
        Stat::ATTRIBUTES.contains(&self)
    }
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Bookkeeping for the narrative event engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLedger {
    /// Non-repeatable events that already fired this session.
    pub triggered_non_repeatable: BTreeSet<String>,
    /// `"{year}-{month}"` of the last month an event fired, empty if none.
    pub last_triggered_month_key: String,
}

/// Month key used for the one-event-per-month rule.
pub fn month_key(year: i32, month: u8) -> String {
    format!("{}-{}", year, month)
}

/// Complete state of one play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    // Calendar
    pub year: i32,
    pub month: u8,
    pub grade: u8,
    pub phase: Phase,

    // Enrollment
    pub faculty: Faculty,
    /// Faculty name until diversion, college name afterwards.
    pub major_name: String,
    pub family: FamilyTier,

    // Academics
    pub target_credits: u32,
    pub credits_earned_total: u32,
    pub gpa: f64,
    pub semester_study_effort: i32,
    pub next_semester_study_buff: i32,
    pub semester_target: u32,
    pub credit_plan: Vec<u32>,

    // Attributes, bounded to [50, 100]
    pub knowledge: i32,
    pub skill: i32,
    pub social: i32,
    pub health: i32,

    // Resources
    pub energy: i32,
    pub money: i64,

    // Progress
    /// Percent; may exceed 100.
    pub thesis_progress: i32,
    pub intern_lock_months: u8,
    pub graduated: bool,
    pub baoyan_qualified: bool,

    pub unlocked_achievements: BTreeSet<String>,
    pub event_state: EventLedger,
}

impl SimulationState {
    /// A fresh session at the start of the first term, before any roll.
    pub fn new(faculty: Faculty, family: FamilyTier) -> Self {
        let info = faculty.info();
        Self {
            year: calendar::START_YEAR,
            month: calendar::START_MONTH,
            grade: 1,
            phase: Phase::Major,
            faculty,
            major_name: info.name.to_string(),
            family,
            target_credits: info.credits,
            credits_earned_total: 0,
            gpa: 0.0,
            semester_study_effort: 0,
            next_semester_study_buff: 0,
            semester_target: 0,
            credit_plan: Vec::new(),
            knowledge: stats::BASE_KNOWLEDGE,
            skill: stats::BASE_SKILL,
            social: stats::BASE_SOCIAL,
            health: stats::BASE_HEALTH,
            energy: stats::START_ENERGY,
            money: family.info().allowance * 2,
            thesis_progress: 0,
            intern_lock_months: 0,
            graduated: false,
            baoyan_qualified: false,
            unlocked_achievements: BTreeSet::new(),
            event_state: EventLedger::default(),
        }
    }

    /// Current value of a stat, widened to `i64`.
    pub fn get(&self, stat: Stat) -> i64 {
        match stat {
            Stat::Knowledge => self.knowledge as i64,
            Stat::Skill => self.skill as i64,
            Stat::Social => self.social as i64,
            Stat::Health => self.health as i64,
            Stat::Energy => self.energy as i64,
            Stat::Money => self.money,
            Stat::StudyEffort => self.semester_study_effort as i64,
            Stat::StudyBuff => self.next_semester_study_buff as i64,
            Stat::Thesis => self.thesis_progress as i64,
        }
    }

    /// Add `delta` to a stat and clamp the result into the stat's range.
    ///
    /// Attributes stay in [50, 100], energy in [0, 100]. Money and the
    /// progress counters are unbounded.
    pub fn apply_delta(&mut self, stat: Stat, delta: i64) {
        let raw = self.get(stat).saturating_add(delta);
        match stat {
            Stat::Knowledge => self.knowledge = clamp_attribute(raw),
            Stat::Skill => self.skill = clamp_attribute(raw),
            Stat::Social => self.social = clamp_attribute(raw),
            Stat::Health => self.health = clamp_attribute(raw),
            Stat::Energy => self.energy = raw.clamp(0, stats::MAX_ENERGY as i64) as i32,
            Stat::Money => self.money = raw,
            Stat::StudyEffort => self.semester_study_effort = saturate_i32(raw),
            Stat::StudyBuff => self.next_semester_study_buff = saturate_i32(raw),
            Stat::Thesis => self.thesis_progress = saturate_i32(raw),
        }
    }

    /// Clamp every bounded field back into range.
    pub fn sanitize(&mut self) {
        self.knowledge = clamp_attribute(self.knowledge as i64);
        self.skill = clamp_attribute(self.skill as i64);
        self.social = clamp_attribute(self.social as i64);
        self.health = clamp_attribute(self.health as i64);
        self.energy = self.energy.clamp(0, stats::MAX_ENERGY);
    }

    pub fn is_holiday(&self) -> bool {
        calendar::is_holiday(self.month)
    }

    pub fn month_key(&self) -> String {
        month_key(self.year, self.month)
    }

    pub fn at(&self, checkpoint: (i32, u8)) -> bool {
        (self.year, self.month) == checkpoint
    }

    pub fn thesis_complete(&self) -> bool {
        self.thesis_progress >= crate::constants::thesis::COMPLETE
    }

    /// Credits met and thesis complete.
    pub fn meets_graduation_requirements(&self) -> bool {
        self.credits_earned_total >= self.target_credits && self.thesis_complete()
    }

    /// One-line summary, e.g. for save slot listings.
    pub fn summary(&self) -> String {
        format!("{}-{:02} - {}", self.year, self.month, self.major_name)
    }
}

fn clamp_attribute(value: i64) -> i32 {
    value.clamp(stats::MIN_STAT as i64, stats::MAX_STAT as i64) as i32
}

fn saturate_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
