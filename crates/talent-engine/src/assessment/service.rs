use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    ActionPlan, ActionPlanId, ActionPlanStatus, AnswerValue, AssessmentId, AssessmentStatus,
    ItemId, NewActionPlan, NewAssessment, StoredAnswer, Template, TemplateId, WorkerId,
};
use super::ninebox::{NineBoxCell, NineBoxGrid};
use super::report::{
    self, DashboardSummary, GlobalReport, NineBoxReport, PillarAnalysis, PotentialAnalysisRow,
    WorkerEvolution, WorkerReport,
};
use super::repository::{
    AssessmentRecord, AssessmentRepository, NineBoxStore, RepositoryError, StoredPillarResult,
    TemplateCatalog,
};
use super::scoring::{
    validate_input, validate_tenure, AnswerInput, GlobalResult, InputViolations, ScoringEngine,
};

/// Service composing template lookup, answer storage and the scoring engine.
pub struct AssessmentService<R, C, N> {
    repository: Arc<R>,
    catalog: Arc<C>,
    nine_box: Arc<N>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ACTION_PLAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asm-{id:06}"))
}

fn next_action_plan_id() -> ActionPlanId {
    let id = ACTION_PLAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ActionPlanId(format!("plan-{id:06}"))
}

impl<R, C, N> AssessmentService<R, C, N>
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    pub fn new(repository: Arc<R>, catalog: Arc<C>, nine_box: Arc<N>) -> Self {
        Self {
            repository,
            catalog,
            nine_box,
        }
    }

    /// Open a draft assessment with one unanswered entry per active template item.
    pub fn create(
        &self,
        request: NewAssessment,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        validate_tenure(request.tenure_years).map_err(InputViolations::from)?;
        let template = self.template(request.template_id)?;

        let answers: BTreeMap<ItemId, StoredAnswer> = template
            .active_items()
            .map(|item| {
                (
                    item.id,
                    StoredAnswer {
                        item_id: item.id,
                        value: None,
                    },
                )
            })
            .collect();

        let now = Utc::now();
        let record = AssessmentRecord {
            id: next_assessment_id(),
            worker_id: request.worker_id,
            evaluator_id: request.evaluator_id,
            template_id: request.template_id,
            evaluation_date: request.evaluation_date,
            tenure_years: request.tenure_years,
            status: AssessmentStatus::Draft,
            observations: None,
            answers,
            pillar_results: BTreeMap::new(),
            global_potential: None,
            global_status_pct: None,
            action_plans: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(record)?;
        info!(
            assessment = %stored.id.0,
            template = stored.template_id.0,
            items = stored.answers.len(),
            "assessment created"
        );
        Ok(stored)
    }

    /// Upsert the evaluator's verdict for one item.
    pub fn record_answer(
        &self,
        id: &AssessmentId,
        item_id: ItemId,
        value: AnswerValue,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let template_id = self.fetch(id)?.template_id;
        let template = self.template(template_id)?;
        if template.item(item_id).is_none() {
            return Err(AssessmentServiceError::UnknownItem(item_id));
        }

        let record = self.repository.modify(id, &mut |record| {
            record.answers.insert(
                item_id,
                StoredAnswer {
                    item_id,
                    value: Some(value),
                },
            );
            if record.status == AssessmentStatus::Draft {
                record.status = AssessmentStatus::InProgress;
            }
            record.updated_at = Utc::now();
        })?;
        debug!(assessment = %id.0, item = item_id.0, ?value, "answer recorded");
        Ok(record)
    }

    pub fn save_observations(
        &self,
        id: &AssessmentId,
        observations: String,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self.repository.modify(id, &mut |record| {
            record.observations = Some(observations.clone());
            record.updated_at = Utc::now();
        })?;
        Ok(record)
    }

    /// Run the engine over the current answers and persist the results.
    pub fn compute_partial_results(
        &self,
        id: &AssessmentId,
    ) -> Result<GlobalResult, AssessmentServiceError> {
        self.score_and_store(id, None)
    }

    /// Compute final results and close the assessment.
    pub fn finalize(&self, id: &AssessmentId) -> Result<GlobalResult, AssessmentServiceError> {
        let result = self.score_and_store(id, Some(AssessmentStatus::Completed))?;
        info!(
            assessment = %id.0,
            potential = result.global_potential.label(),
            status_pct = result.global_status_pct,
            "assessment finalized"
        );
        Ok(result)
    }

    pub fn add_action_plan(
        &self,
        id: &AssessmentId,
        plan: NewActionPlan,
    ) -> Result<ActionPlan, AssessmentServiceError> {
        let action_plan = ActionPlan {
            id: next_action_plan_id(),
            pillar_id: plan.pillar_id,
            action_kind: plan.action_kind,
            action: plan.action,
            start_date: plan.start_date,
            follow_up_date: plan.follow_up_date,
            notes: plan.notes,
            status: ActionPlanStatus::Pending,
            created_at: Utc::now(),
        };
        self.repository.modify(id, &mut |record| {
            record.action_plans.push(action_plan.clone());
            record.updated_at = Utc::now();
        })?;
        Ok(action_plan)
    }

    pub fn remove_action_plan(
        &self,
        id: &AssessmentId,
        plan_id: &ActionPlanId,
    ) -> Result<(), AssessmentServiceError> {
        let mut removed = false;
        self.repository.modify(id, &mut |record| {
            let before = record.action_plans.len();
            record.action_plans.retain(|plan| &plan.id != plan_id);
            removed = record.action_plans.len() < before;
            if removed {
                record.updated_at = Utc::now();
            }
        })?;
        if !removed {
            return Err(RepositoryError::NotFound.into());
        }
        Ok(())
    }

    /// Delete an assessment that has not been finalized.
    pub fn delete(&self, id: &AssessmentId) -> Result<(), AssessmentServiceError> {
        let record = self.fetch(id)?;
        if !record.status.is_open() {
            warn!(assessment = %id.0, status = record.status.label(), "refusing to delete");
            return Err(AssessmentServiceError::NotDeletable(record.status));
        }
        self.repository.delete(id)?;
        Ok(())
    }

    pub fn get(&self, id: &AssessmentId) -> Result<AssessmentRecord, AssessmentServiceError> {
        self.fetch(id)
    }

    pub fn list(&self) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.list()?)
    }

    pub fn nine_box_grid(&self) -> Result<NineBoxGrid, AssessmentServiceError> {
        Ok(self.nine_box.grid()?)
    }

    pub fn update_nine_box_cell(&self, cell: NineBoxCell) -> Result<(), AssessmentServiceError> {
        self.nine_box.update_cell(cell)?;
        Ok(())
    }

    pub fn dashboard(&self) -> Result<DashboardSummary, AssessmentServiceError> {
        Ok(report::dashboard(&self.repository.list()?))
    }

    pub fn nine_box_report(&self) -> Result<NineBoxReport, AssessmentServiceError> {
        let records = self.repository.list()?;
        let grid = self.nine_box.grid()?;
        Ok(report::nine_box_report(&records, &grid))
    }

    pub fn pillar_analysis(&self) -> Result<Vec<PillarAnalysis>, AssessmentServiceError> {
        let records = self.repository.list()?;
        let templates = self.catalog.templates()?;
        Ok(report::pillar_analysis(&records, &templates))
    }

    pub fn potential_analysis(&self) -> Result<Vec<PotentialAnalysisRow>, AssessmentServiceError> {
        Ok(report::potential_analysis(&self.repository.list()?))
    }

    pub fn worker_evolution(
        &self,
        worker_id: &WorkerId,
    ) -> Result<WorkerEvolution, AssessmentServiceError> {
        let records = self.repository.list()?;
        let templates = self.catalog.templates()?;
        Ok(report::worker_evolution(worker_id, &records, &templates))
    }

    pub fn global_report(&self) -> Result<GlobalReport, AssessmentServiceError> {
        let records = self.repository.list()?;
        let templates = self.catalog.templates()?;
        Ok(report::global_report(&records, &templates))
    }

    pub fn worker_report(
        &self,
        worker_id: &WorkerId,
    ) -> Result<WorkerReport, AssessmentServiceError> {
        let records = self.repository.list()?;
        let templates = self.catalog.templates()?;
        Ok(report::worker_report(worker_id, &records, &templates))
    }

    fn fetch(&self, id: &AssessmentId) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    fn template(&self, id: TemplateId) -> Result<Template, AssessmentServiceError> {
        self.catalog
            .template(id)?
            .ok_or(AssessmentServiceError::TemplateNotFound(id))
    }

    /// Scores the answers as stored at write time.
    fn score_and_store(
        &self,
        id: &AssessmentId,
        close_as: Option<AssessmentStatus>,
    ) -> Result<GlobalResult, AssessmentServiceError> {
        let current = self.fetch(id)?;
        let template = self.template(current.template_id)?;
        validate_input(current.tenure_years, &template.config)?;

        let pillars = template.ordered_pillars();
        let engine = ScoringEngine::new(template.config.clone());
        let mut scored = None;
        self.repository.modify(id, &mut |record| {
            let answers = engine_answers(record, &template);
            let result = engine.score(&answers, &pillars, &template.levels, record.tenure_years);

            let now = Utc::now();
            for pillar_result in &result.pillar_results {
                record.pillar_results.insert(
                    pillar_result.pillar_id,
                    StoredPillarResult::from_result(pillar_result, now),
                );
            }
            record.global_potential = Some(result.global_potential);
            record.global_status_pct = Some(result.global_status_pct);
            if let Some(status) = close_as {
                record.status = status;
            }
            record.updated_at = now;
            scored = Some(result);
        })?;
        let result = scored.ok_or(RepositoryError::NotFound)?;

        debug!(
            assessment = %id.0,
            pillars = result.pillar_results.len(),
            status_pct = result.global_status_pct,
            "results computed"
        );
        Ok(result)
    }
}

/// Resolves stored answers to their item buckets; answers to unknown items are dropped.
pub(crate) fn engine_answers(record: &AssessmentRecord, template: &Template) -> Vec<AnswerInput> {
    record
        .answers
        .values()
        .filter_map(|answer| {
            template.item(answer.item_id).map(|item| AnswerInput {
                item_id: item.id,
                pillar_id: item.pillar_id,
                level_id: item.level_id,
                value: answer.value,
            })
        })
        .collect()
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Input(#[from] InputViolations),
    #[error("template {0} not found")]
    TemplateNotFound(TemplateId),
    #[error("item {0} does not belong to the assessment template")]
    UnknownItem(ItemId),
    #[error("assessments in status '{0}' cannot be deleted")]
    NotDeletable(AssessmentStatus),
}
