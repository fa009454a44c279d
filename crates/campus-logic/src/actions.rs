//! Action catalogs and the action-resolution pipeline.
//!
//! The catalog on offer is a pure function of (grade, month). Resolving an
//! action scales every delta by the phase multiplier, rounding each delta
//! up on its own, debits energy first and moves the phase one step forward.
//! Internships and thesis work past the excellent mark stop at a
//! [`PendingConfirmation`] instead of applying.

use serde::{Deserialize, Serialize};

use crate::achievements;
use crate::constants::{action_major as am, calendar, holiday, hospital, intern, senior, thesis};
use crate::error::ActionError;
use crate::state::{Phase, SimulationState, Stat};

/// Which phases an action may be taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseTag {
    Major,
    Minor,
    Both,
}

impl PhaseTag {
    pub fn allows(self, phase: Phase) -> bool {
        match (self, phase) {
            (_, Phase::Done) => false,
            (PhaseTag::Both, _) => true,
            (PhaseTag::Major, Phase::Major) => true,
            (PhaseTag::Minor, Phase::Minor) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Standard,
    /// Needs confirmation; starts the intern lock.
    Internship,
    /// Needs confirmation once the thesis is already excellent.
    Thesis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub tag: PhaseTag,
    /// Major-phase energy cost. Negative values recover energy.
    pub energy_cost: i32,
    /// Major-phase deltas.
    pub effects: &'static [(Stat, i32)],
    pub kind: ActionKind,
}

// ── Catalogs ────────────────────────────────────────────────────────────────

const INTERN_EFFECTS: &[(Stat, i32)] = &[
    (Stat::Skill, intern::GAIN_SKILL),
    (Stat::Social, intern::GAIN_SOCIAL),
    (Stat::Money, intern::MONEY),
    (Stat::Health, -intern::HEALTH_COST),
];

const STUDY: ActionDefinition = ActionDefinition {
    id: "study",
    name: "Study",
    tag: PhaseTag::Both,
    energy_cost: am::COST,
    effects: &[
        (Stat::Knowledge, am::GAIN_STAT),
        (Stat::Health, -am::HEALTH_COST),
        (Stat::StudyEffort, am::EFFORT),
    ],
    kind: ActionKind::Standard,
};

const INTERN: ActionDefinition = ActionDefinition {
    id: "intern",
    name: "Internship",
    tag: PhaseTag::Major,
    energy_cost: intern::COST,
    effects: INTERN_EFFECTS,
    kind: ActionKind::Internship,
};

const SOCIAL: ActionDefinition = ActionDefinition {
    id: "social",
    name: "Socialize",
    tag: PhaseTag::Both,
    energy_cost: am::COST_LOW,
    effects: &[
        (Stat::Social, am::GAIN_SOCIAL),
        (Stat::Health, am::GAIN_HEALTH),
    ],
    kind: ActionKind::Standard,
};

const PART_TIME: ActionDefinition = ActionDefinition {
    id: "part_time",
    name: "Part-time job",
    tag: PhaseTag::Both,
    energy_cost: am::COST_LOW,
    effects: &[
        (Stat::Social, am::GAIN_STAT),
        (Stat::Skill, am::GAIN_STAT),
        (Stat::Money, am::MONEY),
        (Stat::Health, -am::HEALTH_COST),
    ],
    kind: ActionKind::Standard,
};

const FITNESS: ActionDefinition = ActionDefinition {
    id: "fitness",
    name: "Work out",
    tag: PhaseTag::Both,
    energy_cost: am::COST_LOW,
    effects: &[(Stat::Health, am::GAIN_HEALTH)],
    kind: ActionKind::Standard,
};

const REST: ActionDefinition = ActionDefinition {
    id: "rest",
    name: "Rest",
    tag: PhaseTag::Both,
    energy_cost: -am::RECOVER,
    effects: &[(Stat::Health, am::GAIN_HEALTH)],
    kind: ActionKind::Standard,
};

const THESIS: ActionDefinition = ActionDefinition {
    id: "thesis",
    name: "Thesis",
    tag: PhaseTag::Both,
    energy_cost: senior::THESIS_COST,
    effects: &[(Stat::Thesis, senior::THESIS_PROGRESS)],
    kind: ActionKind::Thesis,
};

/// Ordinary term months, grades 1-3.
pub const TERM_ACTIONS: &[ActionDefinition] = &[STUDY, INTERN, SOCIAL, PART_TIME, FITNESS, REST];

/// Holiday months. In the final year `holiday_preview` is swapped for thesis.
pub const HOLIDAY_ACTIONS: &[ActionDefinition] = &[
    ActionDefinition {
        id: "holiday_preview",
        name: "Preview next term",
        tag: PhaseTag::Both,
        energy_cost: holiday::PREVIEW_COST,
        effects: &[
            (Stat::Knowledge, holiday::PREVIEW_GAIN),
            (Stat::Health, -am::HEALTH_COST),
            (Stat::StudyBuff, holiday::PREVIEW_EFFORT),
        ],
        kind: ActionKind::Standard,
    },
    ActionDefinition {
        id: "holiday_intern",
        name: "Holiday internship",
        tag: PhaseTag::Major,
        energy_cost: intern::COST,
        effects: INTERN_EFFECTS,
        kind: ActionKind::Internship,
    },
    ActionDefinition {
        id: "holiday_practice",
        name: "Field practice",
        tag: PhaseTag::Both,
        energy_cost: holiday::PRACTICE_COST,
        effects: &[
            (Stat::Knowledge, holiday::PRACTICE_GAIN),
            (Stat::Skill, holiday::PRACTICE_GAIN),
            (Stat::Health, -am::HEALTH_COST),
        ],
        kind: ActionKind::Standard,
    },
    ActionDefinition {
        id: "holiday_travel",
        name: "Travel with friends",
        tag: PhaseTag::Both,
        energy_cost: holiday::TRAVEL_COST,
        effects: &[
            (Stat::Social, holiday::TRAVEL_SOCIAL),
            (Stat::Health, holiday::TRAVEL_HEALTH),
        ],
        kind: ActionKind::Standard,
    },
    PART_TIME,
    ActionDefinition {
        id: "holiday_rest",
        name: "Take it easy",
        tag: PhaseTag::Both,
        energy_cost: -holiday::REST_RECOVER,
        effects: &[(Stat::Health, holiday::REST_HEALTH)],
        kind: ActionKind::Standard,
    },
];

/// Final-year term months.
pub const SENIOR_ACTIONS: &[ActionDefinition] = &[
    THESIS,
    INTERN,
    ActionDefinition {
        id: "job_hunt",
        name: "Job hunting",
        tag: PhaseTag::Both,
        energy_cost: senior::JOB_COST,
        effects: &[
            (Stat::Social, senior::JOB_GAIN),
            (Stat::Skill, senior::JOB_GAIN),
            (Stat::Health, -senior::JOB_HEALTH),
        ],
        kind: ActionKind::Standard,
    },
    SOCIAL,
    FITNESS,
    REST,
];

/// Actions offered in a given month.
pub fn catalog_for(grade: u8, month: u8) -> Vec<ActionDefinition> {
    let is_holiday = calendar::is_holiday(month);
    match (grade >= calendar::FINAL_GRADE, is_holiday) {
        (true, true) => HOLIDAY_ACTIONS
            .iter()
            .map(|a| if a.id == "holiday_preview" { THESIS } else { a.clone() })
            .collect(),
        (true, false) => SENIOR_ACTIONS.to_vec(),
        (false, true) => HOLIDAY_ACTIONS.to_vec(),
        (false, false) => TERM_ACTIONS.to_vec(),
    }
}

pub fn find_action(state: &SimulationState, id: &str) -> Option<ActionDefinition> {
    catalog_for(state.grade, state.month)
        .into_iter()
        .find(|a| a.id == id)
}

// ── Resolution ──────────────────────────────────────────────────────────────

/// A gate waiting for the player to say yes or no.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingConfirmation {
    Internship { action_id: String },
    ThesisOverwrite { action_id: String },
}

impl PendingConfirmation {
    pub fn message(&self) -> String {
        match self {
            Self::Internship { .. } => format!(
                "Starting an internship locks your major action for the next {} months, holidays included. Start now?",
                intern::LOCK_MONTHS
            ),
            Self::ThesisOverwrite { .. } => {
                "Your thesis is already rated excellent. Keep writing anyway?".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThesisMilestone {
    FirstDraft,
    Good,
    Excellent,
}

impl ThesisMilestone {
    pub fn for_progress(progress: i32) -> Option<Self> {
        if progress >= thesis::EXCELLENT {
            Some(Self::Excellent)
        } else if progress >= thesis::GOOD {
            Some(Self::Good)
        } else if progress >= thesis::COMPLETE {
            Some(Self::FirstDraft)
        } else {
            None
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::FirstDraft => "First draft of the thesis is finished!",
            Self::Good => "The thesis now meets the 'good' standard!",
            Self::Excellent => "The thesis now meets the 'excellent' standard!",
        }
    }
}

/// What an applied action changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    pub action_id: String,
    /// Applied deltas after scaling and rounding, energy first.
    pub deltas: Vec<(Stat, i64)>,
    pub milestone: Option<ThesisMilestone>,
    /// Achievements unlocked by this action.
    pub unlocked: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Applied(ActionReport),
    NeedsConfirmation(PendingConfirmation),
}

/// Result of a confirmed gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmed {
    /// Lock set; `payout` is `None` when the first month could not be paid
    /// for lack of energy.
    Internship { payout: Option<ActionReport> },
    Action(ActionReport),
}

/// Validate and apply `action_id` for the current month and phase.
pub fn resolve(state: &mut SimulationState, action_id: &str) -> Result<Resolution, ActionError> {
    let action = validate(state, action_id)?;
    match action.kind {
        ActionKind::Internship => Ok(Resolution::NeedsConfirmation(
            PendingConfirmation::Internship {
                action_id: action.id.to_string(),
            },
        )),
        ActionKind::Thesis if state.thesis_progress >= thesis::EXCELLENT => Ok(
            Resolution::NeedsConfirmation(PendingConfirmation::ThesisOverwrite {
                action_id: action.id.to_string(),
            }),
        ),
        _ => apply_action(state, &action).map(Resolution::Applied),
    }
}

/// Carry out a gate the player accepted. Declining needs no call at all.
pub fn confirm(
    state: &mut SimulationState,
    pending: &PendingConfirmation,
) -> Result<Confirmed, ActionError> {
    match pending {
        PendingConfirmation::Internship { action_id } => {
            validate(state, action_id)?;
            Ok(Confirmed::Internship {
                payout: start_internship(state),
            })
        }
        PendingConfirmation::ThesisOverwrite { action_id } => {
            let action = validate(state, action_id)?;
            apply_action(state, &action).map(Confirmed::Action)
        }
    }
}

/// Set the intern lock and pay the first month.
pub fn start_internship(state: &mut SimulationState) -> Option<ActionReport> {
    state.intern_lock_months = intern::LOCK_MONTHS;
    state.phase = Phase::Minor;
    let payout = intern_payout(state);
    if payout.is_none() {
        log::warn!("Internship started without energy for the first payout");
    }
    payout
}

/// One month of internship, unscaled and outside the phase gate. Forces
/// the minor phase either way; returns `None` without paying when energy
/// is short.
pub fn intern_payout(state: &mut SimulationState) -> Option<ActionReport> {
    state.phase = Phase::Minor;
    if state.energy < intern::COST {
        return None;
    }
    let mut deltas = Vec::with_capacity(INTERN_EFFECTS.len() + 1);
    state.apply_delta(Stat::Energy, -(intern::COST as i64));
    deltas.push((Stat::Energy, -(intern::COST as i64)));
    for &(stat, value) in INTERN_EFFECTS {
        state.apply_delta(stat, value as i64);
        deltas.push((stat, value as i64));
    }
    Some(ActionReport {
        action_id: "intern_payout".to_string(),
        deltas,
        milestone: None,
        unlocked: achievements::check_achievements(state)
            .into_iter()
            .map(|a| a.id)
            .collect(),
    })
}

fn validate(state: &SimulationState, action_id: &str) -> Result<ActionDefinition, ActionError> {
    if state.phase == Phase::Done {
        return Err(ActionError::PhaseDone);
    }
    if state.health < hospital::THRESHOLD {
        return Err(ActionError::HealthCrisis);
    }
    let action =
        find_action(state, action_id).ok_or_else(|| ActionError::UnknownAction(action_id.into()))?;
    if !action.tag.allows(state.phase) {
        return Err(ActionError::WrongPhase {
            action: action.id.to_string(),
            phase: state.phase,
        });
    }
    Ok(action)
}

/// Round each scaled delta up on its own.
pub fn scaled(value: i32, multiplier: f64) -> i64 {
    (value as f64 * multiplier).ceil() as i64
}

fn apply_action(
    state: &mut SimulationState,
    action: &ActionDefinition,
) -> Result<ActionReport, ActionError> {
    let multiplier = state.phase.multiplier();
    let cost = scaled(action.energy_cost, multiplier);
    if cost > 0 && (state.energy as i64) < cost {
        return Err(ActionError::InsufficientEnergy {
            needed: cost as i32,
            available: state.energy,
        });
    }

    let mut deltas = Vec::with_capacity(action.effects.len() + 1);
    state.apply_delta(Stat::Energy, -cost);
    deltas.push((Stat::Energy, -cost));
    for &(stat, value) in action.effects {
        let delta = scaled(value, multiplier);
        state.apply_delta(stat, delta);
        deltas.push((stat, delta));
    }
    state.phase = state.phase.next();

    let milestone = match action.kind {
        ActionKind::Thesis => ThesisMilestone::for_progress(state.thesis_progress),
        _ => None,
    };
    log::debug!("Action {} applied at multiplier {}", action.id, multiplier);

    Ok(ActionReport {
        action_id: action.id.to_string(),
        deltas,
        milestone,
        unlocked: achievements::check_achievements(state)
            .into_iter()
            .map(|a| a.id)
            .collect(),
    })
}
