use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ActionPlan, AssessmentId, AssessmentStatus, EvaluatorId, ItemId, LevelId, PillarId,
    StoredAnswer, Template, TemplateId, WorkerId,
};
use super::ninebox::{NineBoxCell, NineBoxGrid};
use super::scoring::{mean_percentage, LevelScore, PillarResult, Potential};

/// Persisted per-pillar outcome, keyed by pillar inside its assessment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPillarResult {
    pub pillar_id: PillarId,
    pub real_level_id: Option<LevelId>,
    pub expected_level: String,
    pub level_scores: Vec<LevelScore>,
    pub updated_at: DateTime<Utc>,
}

impl StoredPillarResult {
    pub fn from_result(result: &PillarResult, updated_at: DateTime<Utc>) -> Self {
        Self {
            pillar_id: result.pillar_id,
            real_level_id: result.real_level_id,
            expected_level: result.expected_level.clone(),
            level_scores: result.level_scores.clone(),
            updated_at,
        }
    }

    pub fn score(&self) -> f64 {
        mean_percentage(&self.level_scores)
    }
}

/// Repository record for one assessment instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub worker_id: WorkerId,
    pub evaluator_id: EvaluatorId,
    pub template_id: TemplateId,
    pub evaluation_date: NaiveDate,
    pub tenure_years: f64,
    pub status: AssessmentStatus,
    pub observations: Option<String>,
    pub answers: BTreeMap<ItemId, StoredAnswer>,
    pub pillar_results: BTreeMap<PillarId, StoredPillarResult>,
    pub global_potential: Option<Potential>,
    pub global_status_pct: Option<f64>,
    pub action_plans: Vec<ActionPlan>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn answered_count(&self) -> usize {
        self.answers
            .values()
            .filter(|answer| answer.value.is_some())
            .count()
    }

    pub fn summary_view(&self) -> AssessmentView {
        AssessmentView {
            id: self.id.clone(),
            worker_id: self.worker_id.clone(),
            template_id: self.template_id,
            evaluation_date: self.evaluation_date,
            status: self.status.label(),
            answered_items: self.answered_count(),
            total_items: self.answers.len(),
            global_potential: self.global_potential.map(Potential::label),
            global_status_pct: self.global_status_pct,
        }
    }
}

/// Condensed representation returned by listing and status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentView {
    pub id: AssessmentId,
    pub worker_id: WorkerId,
    pub template_id: TemplateId,
    pub evaluation_date: NaiveDate,
    pub status: &'static str,
    pub answered_items: usize,
    pub total_items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_potential: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_status_pct: Option<f64>,
}

/// Storage abstraction for assessment instances.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    /// Apply `change` to the stored record while holding it exclusively; returns the new state.
    fn modify(
        &self,
        id: &AssessmentId,
        change: &mut dyn FnMut(&mut AssessmentRecord),
    ) -> Result<AssessmentRecord, RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn delete(&self, id: &AssessmentId) -> Result<(), RepositoryError>;
    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

/// Read access to configured templates.
pub trait TemplateCatalog: Send + Sync {
    fn template(&self, id: TemplateId) -> Result<Option<Template>, RepositoryError>;
    fn templates(&self) -> Result<Vec<Template>, RepositoryError>;
}

/// Storage for the talent-grid cell presentation.
pub trait NineBoxStore: Send + Sync {
    fn grid(&self) -> Result<NineBoxGrid, RepositoryError>;
    fn update_cell(&self, cell: NineBoxCell) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
