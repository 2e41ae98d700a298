//! Deterministic scoring engine turning per-item answers into per-pillar competency levels,
//! a global potential, a global status percentage and a 9-box placement.
//!
//! The engine performs no I/O and never fails; boundary checks live in [`validate_input`].

mod config;
mod policy;
mod rules;

pub use config::{validate_tenure, InputViolation, InputViolations, TemplateConfig};
pub use policy::{
    nine_box, round_to_hundredths, Band, NineBoxPlacement, Potential,
    MINIMUM_EVALUABLE_TENURE_YEARS,
};
pub use rules::{answer_score, MAX_ITEM_SCORE};

use super::domain::{AnswerValue, ItemId, Level, LevelId, Pillar, PillarId};
use serde::{Deserialize, Serialize};

/// Answer already resolved to the (pillar, level) bucket of its item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerInput {
    pub item_id: ItemId,
    pub pillar_id: PillarId,
    pub level_id: LevelId,
    #[serde(default)]
    pub value: Option<AnswerValue>,
}

/// Percentage obtained at one visited level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelScore {
    pub level_id: LevelId,
    pub level_order: u32,
    pub percentage: f64,
}

/// Outcome of the level walk for one pillar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarResult {
    pub pillar_id: PillarId,
    pub pillar_name: String,
    pub real_level_id: Option<LevelId>,
    pub real_level_name: Option<String>,
    pub expected_level: String,
    pub level_scores: Vec<LevelScore>,
}

impl PillarResult {
    /// Mean percentage across every visited level, including the one that stopped the walk.
    pub fn score(&self) -> f64 {
        mean_percentage(&self.level_scores)
    }
}

pub(crate) fn mean_percentage(level_scores: &[LevelScore]) -> f64 {
    if level_scores.is_empty() {
        return 0.0;
    }
    let sum: f64 = level_scores.iter().map(|entry| entry.percentage).sum();
    sum / level_scores.len() as f64
}

/// Full result set for one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalResult {
    pub pillar_results: Vec<PillarResult>,
    pub global_potential: Potential,
    pub global_status_pct: f64,
    pub nine_box: NineBoxPlacement,
}

/// Self-contained engine input, as accepted by the stateless scoring endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringInput {
    pub answers: Vec<AnswerInput>,
    pub pillars: Vec<Pillar>,
    pub levels: Vec<Level>,
    pub tenure_years: f64,
    #[serde(default)]
    pub config: TemplateConfig,
}

impl ScoringInput {
    pub fn compute(&self) -> GlobalResult {
        compute_results(
            &self.answers,
            &self.pillars,
            &self.levels,
            self.tenure_years,
            &self.config,
        )
    }
}

/// Rejects inputs outside the engine contract, reporting every violation.
pub fn validate_input(tenure_years: f64, config: &TemplateConfig) -> Result<(), InputViolations> {
    let mut violations = match config.validate() {
        Ok(()) => Vec::new(),
        Err(InputViolations(violations)) => violations,
    };
    if let Err(violation) = validate_tenure(tenure_years) {
        violations.insert(0, violation);
    }
    InputViolations::from_vec(violations)
}

pub fn compute_results(
    answers: &[AnswerInput],
    pillars: &[Pillar],
    levels: &[Level],
    tenure_years: f64,
    config: &TemplateConfig,
) -> GlobalResult {
    let ordered_levels = rules::sorted_levels(levels);

    let pillar_results: Vec<PillarResult> = pillars
        .iter()
        .map(|pillar| {
            rules::real_level_for_pillar(pillar, &ordered_levels, answers, tenure_years, config)
        })
        .collect();

    let global_potential =
        policy::classify_potential(&pillar_results, &ordered_levels, levels, tenure_years);
    let global_status_pct = policy::global_status_pct(&pillar_results);
    let nine_box = nine_box(global_status_pct, global_potential);

    GlobalResult {
        pillar_results,
        global_potential,
        global_status_pct,
        nine_box,
    }
}

/// Stateless evaluator bound to one template configuration.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: TemplateConfig,
}

impl ScoringEngine {
    pub fn new(config: TemplateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    pub fn score(
        &self,
        answers: &[AnswerInput],
        pillars: &[Pillar],
        levels: &[Level],
        tenure_years: f64,
    ) -> GlobalResult {
        compute_results(answers, pillars, levels, tenure_years, &self.config)
    }
}
