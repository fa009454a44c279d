//! Narrative event engine.
//!
//! Event definitions are immutable content held in an [`EventRegistry`].
//! Each month the engine may fire at most one event: a designated event is
//! forced every September while eligible, otherwise a global chance gates
//! the draw. A category is sampled from attribute-driven weights, then one
//! event is taken uniformly from that category's eligible pool.
//!
//! Resolving an option deducts its cost and performs two weighted draws,
//! outcome then sub-outcome, through the shared [`sampler`](crate::sampler).

use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{calendar, events as tuning, stats};
use crate::error::{ContentError, EventError};
use crate::sampler::{self, Weighted};
use crate::state::{SimulationState, Stat};

/// Built-in event content.
const BUILTIN_EVENTS_JSON: &str = include_str!("../../../data/events.json");

// ============================================================================
// DEFINITIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Entertainment,
    Academic,
    Skill,
    Social,
}

impl Category {
    /// Roulette order.
    pub const ALL: [Category; 4] = [
        Category::Entertainment,
        Category::Academic,
        Category::Skill,
        Category::Social,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Entertainment => "entertainment",
            Category::Academic => "academic",
            Category::Skill => "skill",
            Category::Social => "social",
        }
    }
}

/// Stat label to signed amount, as authored in content.
///
/// Labels that do not name a [`Stat`] are skipped when applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectVector(pub BTreeMap<String, i32>);

impl EffectVector {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Known stats with their amounts, in label order.
    pub fn resolved(&self) -> Vec<(Stat, i32)> {
        self.0
            .iter()
            .filter_map(|(key, &amount)| match Stat::from_key(key) {
                Some(stat) => Some((stat, amount)),
                None => {
                    log::warn!("Ignoring unknown effect key `{}`", key);
                    None
                }
            })
            .collect()
    }

    /// Labels that do not name a stat.
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.0
            .keys()
            .filter(|k| Stat::from_key(k).is_none())
            .map(String::as_str)
            .collect()
    }
}

impl<const N: usize> From<[(&str, i32); N]> for EffectVector {
    fn from(pairs: [(&str, i32); N]) -> Self {
        Self(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Fail,
    Neutral,
    Mix,
}

/// Narrative tone of a sub-outcome, used for log coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
    #[default]
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubOutcome {
    pub weight: f64,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub effects: EffectVector,
    #[serde(default)]
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub weight: f64,
    pub kind: OutcomeKind,
    pub sub_outcomes: Vec<SubOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub cost: EffectVector,
    pub outcomes: Vec<Outcome>,
}

impl Weighted for Outcome {
    fn weight(&self) -> f64 {
        self.weight
    }
}

impl Weighted for SubOutcome {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// One narrative event. Empty eligibility lists mean "no restriction".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub months: Vec<u8>,
    #[serde(default)]
    pub grades: Vec<u8>,
    /// Explicit calendar years.
    #[serde(default)]
    pub years: Vec<i32>,
    /// Inclusive calendar-year range.
    #[serde(default)]
    pub year_range: Option<(i32, i32)>,
    /// Must equal whether the current month is a holiday.
    #[serde(default)]
    pub holiday: bool,
    #[serde(default)]
    pub major_names: Vec<String>,
    #[serde(default)]
    pub repeatable: bool,
    pub options: Vec<EventOption>,
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Live event pool, owned by the engine. Grows only through
/// [`EventRegistry::register_event`].
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    events: Vec<EventDefinition>,
    index: HashMap<String, usize>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The embedded content pack.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json_str(BUILTIN_EVENTS_JSON)
    }

    /// Parse a JSON array of event definitions.
    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        let defs: Vec<EventDefinition> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for def in defs {
            registry.register_event(def)?;
        }
        Ok(registry)
    }

    /// Append a definition. Duplicate ids and structurally empty
    /// definitions are rejected and leave the registry unchanged.
    pub fn register_event(&mut self, def: EventDefinition) -> Result<(), ContentError> {
        if self.index.contains_key(&def.id) {
            return Err(ContentError::DuplicateEvent(def.id));
        }
        validate_definition(&def)?;
        self.index.insert(def.id.clone(), self.events.len());
        self.events.push(def);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&EventDefinition> {
        self.index.get(id).map(|&i| &self.events[i])
    }

    pub fn events(&self) -> &[EventDefinition] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn validate_definition(def: &EventDefinition) -> Result<(), ContentError> {
    let malformed = |reason: String| ContentError::Malformed {
        id: def.id.clone(),
        reason,
    };
    if def.options.is_empty() {
        return Err(malformed("no options".into()));
    }
    if let Some((start, end)) = def.year_range {
        if start > end {
            return Err(malformed(format!("year range {}..{} is empty", start, end)));
        }
    }
    for option in &def.options {
        if option.outcomes.is_empty() {
            return Err(malformed(format!("option `{}` has no outcomes", option.id)));
        }
        if sampler::total_weight(&option.outcomes) <= 0.0 {
            return Err(malformed(format!("option `{}` has no positive weight", option.id)));
        }
        for outcome in &option.outcomes {
            if outcome.sub_outcomes.is_empty() {
                return Err(malformed(format!(
                    "option `{}` has an outcome with no sub-outcomes",
                    option.id
                )));
            }
        }
    }
    Ok(())
}

// ============================================================================
// SELECTION
// ============================================================================

/// Whether `event` may fire in the current month.
pub fn is_eligible(event: &EventDefinition, state: &SimulationState) -> bool {
    let ledger = &state.event_state;
    if !event.repeatable && ledger.triggered_non_repeatable.contains(&event.id) {
        return false;
    }
    if !event.months.is_empty() && !event.months.contains(&state.month) {
        return false;
    }
    if !event.grades.is_empty() && !event.grades.contains(&state.grade) {
        return false;
    }
    if !event.years.is_empty() && !event.years.contains(&state.year) {
        return false;
    }
    if let Some((start, end)) = event.year_range {
        if state.year < start || state.year > end {
            return false;
        }
    }
    if event.holiday != state.is_holiday() {
        return false;
    }
    if !event.major_names.is_empty() && !event.major_names.contains(&state.major_name) {
        return false;
    }
    true
}

fn normalize(value: i32) -> f64 {
    let span = (stats::MAX_STAT - stats::MIN_STAT) as f64;
    ((value - stats::MIN_STAT) as f64 / span).clamp(0.0, 1.0)
}

/// Raw category weights, `1 + normalized stat * 1.2`, in roulette order.
pub fn category_weights(state: &SimulationState) -> [(Category, f64); 4] {
    let energy = (state.energy as f64 / stats::MAX_ENERGY as f64).clamp(0.0, 1.0);
    let entertainment = (normalize(state.health) + energy) / 2.0;
    let weight = |norm: f64| 1.0 + norm * tuning::CATEGORY_GAIN;
    [
        (Category::Entertainment, weight(entertainment)),
        (Category::Academic, weight(normalize(state.knowledge))),
        (Category::Skill, weight(normalize(state.skill))),
        (Category::Social, weight(normalize(state.social))),
    ]
}

/// Category probabilities restricted to the categories present in `pool`,
/// summing to 1. Absent categories carry weight 0.
pub fn category_distribution(
    state: &SimulationState,
    pool: &[&EventDefinition],
) -> [(Category, f64); 4] {
    let mut weights = category_weights(state);
    for (category, weight) in weights.iter_mut() {
        if !pool.iter().any(|e| e.category == *category) {
            *weight = 0.0;
        }
    }
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if total > 0.0 {
        for (_, weight) in weights.iter_mut() {
            *weight /= total;
        }
    }
    weights
}

/// Sample a category for `pool`. `None` only for an empty pool.
pub fn pick_category(
    state: &SimulationState,
    pool: &[&EventDefinition],
    rng: &mut impl Rng,
) -> Option<Category> {
    let first = pool.first()?;
    let distribution = category_distribution(state, pool);
    if sampler::total_weight(&distribution) <= 0.0 {
        return Some(first.category);
    }
    sampler::sample(&distribution, rng).map(|(category, _)| *category)
}

/// Record `event` as fired this month.
pub fn mark_triggered(state: &mut SimulationState, event: &EventDefinition) {
    if !event.repeatable {
        state
            .event_state
            .triggered_non_repeatable
            .insert(event.id.clone());
    }
    state.event_state.last_triggered_month_key = state.month_key();
}

/// Maybe fire one event for the current month. Returns the fired id.
///
/// `trigger_chance` is the probability that a non-forced month fires at
/// all. A month that already fired never fires again.
pub fn check_events(
    state: &mut SimulationState,
    registry: &EventRegistry,
    trigger_chance: f64,
    rng: &mut impl Rng,
) -> Option<String> {
    if state.grade > tuning::LAST_EVENT_GRADE || state.graduated {
        return None;
    }
    if state.event_state.last_triggered_month_key == state.month_key() {
        return None;
    }

    if state.month == calendar::START_MONTH {
        if let Some(forced) = registry.get(tuning::SEPTEMBER_EVENT) {
            if is_eligible(forced, state) {
                mark_triggered(state, forced);
                log::info!("Event {} forced for {}", forced.id, state.month_key());
                return Some(forced.id.clone());
            }
        }
    }

    if rng.gen::<f64>() >= trigger_chance.clamp(0.0, 1.0) {
        return None;
    }

    let pool: Vec<&EventDefinition> = registry
        .events()
        .iter()
        .filter(|e| is_eligible(e, state))
        .collect();
    let category = pick_category(state, &pool, rng)?;
    let in_category: Vec<&EventDefinition> = pool
        .iter()
        .copied()
        .filter(|e| e.category == category)
        .collect();
    let final_pool = if in_category.is_empty() {
        &pool
    } else {
        &in_category
    };
    let event = final_pool[rng.gen_range(0..final_pool.len())];

    mark_triggered(state, event);
    log::info!(
        "Event {} ({}) triggered for {}",
        event.id,
        category.label(),
        state.month_key()
    );
    Some(event.id.clone())
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Whether the state can pay every entry of `cost`. Unknown labels are
/// treated as free.
pub fn can_afford(state: &SimulationState, cost: &EffectVector) -> bool {
    cost.0.iter().all(|(key, &amount)| match Stat::from_key(key) {
        Some(stat) => state.get(stat) >= amount as i64,
        None => true,
    })
}

/// Affordability of each option of `event`, in option order.
pub fn affordable_options(state: &SimulationState, event: &EventDefinition) -> Vec<bool> {
    event
        .options
        .iter()
        .map(|o| can_afford(state, &o.cost))
        .collect()
}

/// The full chain drawn for a chosen option.
#[derive(Debug, Clone, PartialEq)]
pub struct EventResolution {
    pub event_id: String,
    pub event_name: String,
    pub option_index: usize,
    pub option_text: String,
    pub outcome_kind: OutcomeKind,
    pub sub_outcome: SubOutcome,
}

/// Pay for option `option_index` of `event_id`, draw its outcome and
/// sub-outcome, and apply the sub-outcome's effects.
///
/// Fails without touching the state when the event or option is unknown
/// or the cost cannot be paid.
pub fn select_option(
    state: &mut SimulationState,
    registry: &EventRegistry,
    event_id: &str,
    option_index: usize,
    rng: &mut impl Rng,
) -> Result<EventResolution, EventError> {
    let event = registry
        .get(event_id)
        .ok_or_else(|| EventError::UnknownEvent(event_id.to_string()))?;
    let option = event
        .options
        .get(option_index)
        .ok_or_else(|| EventError::UnknownOption {
            event: event_id.to_string(),
            index: option_index,
        })?;
    if !can_afford(state, &option.cost) {
        return Err(EventError::Unaffordable {
            event: event_id.to_string(),
            index: option_index,
        });
    }
    let outcome = sampler::sample(&option.outcomes, rng)
        .ok_or_else(|| EventError::EmptyOutcomes(event_id.to_string()))?;
    let sub = sampler::sample(&outcome.sub_outcomes, rng)
        .ok_or_else(|| EventError::EmptyOutcomes(event_id.to_string()))?;

    for (stat, amount) in option.cost.resolved() {
        state.apply_delta(stat, -(amount as i64));
    }
    for (stat, amount) in sub.effects.resolved() {
        state.apply_delta(stat, amount as i64);
    }

    log::debug!(
        "Event {} option {} resolved as {:?}/{}",
        event.id,
        option.id,
        outcome.kind,
        sub.name
    );
    Ok(EventResolution {
        event_id: event.id.clone(),
        event_name: event.name.clone(),
        option_index,
        option_text: option.text.clone(),
        outcome_kind: outcome.kind,
        sub_outcome: sub.clone(),
    })
}
