use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::assessment::domain::{
    AnswerValue, AssessmentId, CriterionKind, EvaluatorId, Item, ItemId, Level, LevelId,
    NewAssessment, Pillar, PillarId, Template, TemplateId, WorkerId,
};
use crate::assessment::ninebox::{NineBoxCell, NineBoxGrid};
use crate::assessment::repository::{
    AssessmentRecord, AssessmentRepository, NineBoxStore, RepositoryError, TemplateCatalog,
};
use crate::assessment::scoring::{AnswerInput, TemplateConfig};
use crate::assessment::{assessment_router, AssessmentService};

pub(super) const TEMPLATE: TemplateId = TemplateId(1);
pub(super) const CONTRACTORS: PillarId = PillarId(1);
pub(super) const STRATEGY: PillarId = PillarId(2);
pub(super) const INACTIVE_ITEM: ItemId = ItemId(999);

/// Four tiers whose ids differ from their orders, listed out of order.
pub(super) fn levels() -> Vec<Level> {
    vec![
        level(30, "Advanced", "03", 3),
        level(10, "Initial", "01", 1),
        level(40, "Expert", "04", 4),
        level(20, "Basic", "02", 2),
    ]
}

pub(super) fn level(id: u32, name: &str, code: &str, order: u32) -> Level {
    Level {
        id: LevelId(id),
        name: name.to_string(),
        code: code.to_string(),
        order,
    }
}

pub(super) fn pillar(id: u32, name: &str, order: u32) -> Pillar {
    Pillar {
        id: PillarId(id),
        name: name.to_string(),
        order,
    }
}

pub(super) fn pillars() -> Vec<Pillar> {
    vec![pillar(1, "Contractors", 1), pillar(2, "Strategy", 2)]
}

/// Two items per (pillar, level) bucket plus one inactive item.
pub(super) fn template() -> Template {
    let mut items = Vec::new();
    for pillar in pillars() {
        for level in levels() {
            for n in 1..=2 {
                items.push(Item {
                    id: ItemId(pillar.id.0 * 100 + level.order * 10 + n),
                    pillar_id: pillar.id,
                    level_id: level.id,
                    text: format!("{} {} check {n}", pillar.name, level.name),
                    criterion: if n == 1 {
                        CriterionKind::Subjective
                    } else {
                        CriterionKind::Objective
                    },
                    expectation: None,
                    order: n,
                    active: true,
                });
            }
        }
    }
    items.push(Item {
        id: INACTIVE_ITEM,
        pillar_id: CONTRACTORS,
        level_id: LevelId(10),
        text: "Retired check".to_string(),
        criterion: CriterionKind::Objective,
        expectation: None,
        order: 9,
        active: false,
    });

    Template {
        id: TEMPLATE,
        name: "Line management competencies".to_string(),
        config: TemplateConfig::default(),
        levels: levels(),
        pillars: vec![pillar(2, "Strategy", 2), pillar(1, "Contractors", 1)],
        items,
    }
}

/// Items of one bucket in the fixture template.
pub(super) fn bucket_items(pillar: PillarId, level_order: u32) -> Vec<ItemId> {
    (1..=2)
        .map(|n| ItemId(pillar.0 * 100 + level_order * 10 + n))
        .collect()
}

/// Engine answers for one bucket: `fully` FullyMet, `partial` PartiallyMet, `not_met` NotMet.
pub(super) fn bucket(
    pillar: u32,
    level: u32,
    fully: usize,
    partial: usize,
    not_met: usize,
) -> Vec<AnswerInput> {
    let values = std::iter::repeat(AnswerValue::FullyMet)
        .take(fully)
        .chain(std::iter::repeat(AnswerValue::PartiallyMet).take(partial))
        .chain(std::iter::repeat(AnswerValue::NotMet).take(not_met));

    values
        .enumerate()
        .map(|(index, value)| AnswerInput {
            item_id: ItemId(pillar * 10_000 + level * 100 + index as u32),
            pillar_id: PillarId(pillar),
            level_id: LevelId(level),
            value: Some(value),
        })
        .collect()
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn new_assessment(worker: &str, tenure_years: f64) -> NewAssessment {
    NewAssessment {
        worker_id: WorkerId(worker.to_string()),
        evaluator_id: EvaluatorId("evaluator-7".to_string()),
        template_id: TEMPLATE,
        evaluation_date: date(2025, 3, 14),
        tenure_years,
    }
}

pub(super) type MemoryService = AssessmentService<MemoryRepository, MemoryCatalog, MemoryNineBox>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AssessmentService::new(
        repository.clone(),
        Arc::new(MemoryCatalog::with(template())),
        Arc::new(MemoryNineBox::default()),
    );
    (service, repository)
}

/// Answers every active item of the assessment with `value`.
pub(super) fn answer_all(service: &MemoryService, id: &AssessmentId, value: AnswerValue) {
    for item in template().active_items() {
        service
            .record_answer(id, item.id, value)
            .expect("answer recorded");
    }
}

/// Creates, fully answers and finalizes an assessment for `worker` on `evaluation_date`.
pub(super) fn completed_assessment(
    service: &MemoryService,
    worker: &str,
    evaluation_date: NaiveDate,
    value: AnswerValue,
) -> AssessmentRecord {
    let mut request = new_assessment(worker, 5.0);
    request.evaluation_date = evaluation_date;
    let record = service.create(request).expect("assessment created");
    answer_all(service, &record.id, value);
    service.finalize(&record.id).expect("assessment finalized");
    service.get(&record.id).expect("record present")
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl AssessmentRepository for MemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn modify(
        &self,
        id: &AssessmentId,
        change: &mut dyn FnMut(&mut AssessmentRecord),
    ) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        change(record);
        Ok(record.clone())
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &AssessmentId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryCatalog {
    templates: Vec<Template>,
}

impl MemoryCatalog {
    pub(super) fn with(template: Template) -> Self {
        Self {
            templates: vec![template],
        }
    }
}

impl TemplateCatalog for MemoryCatalog {
    fn template(&self, id: TemplateId) -> Result<Option<Template>, RepositoryError> {
        Ok(self
            .templates
            .iter()
            .find(|template| template.id == id)
            .cloned())
    }

    fn templates(&self) -> Result<Vec<Template>, RepositoryError> {
        Ok(self.templates.clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNineBox {
    grid: Arc<Mutex<NineBoxGrid>>,
}

impl NineBoxStore for MemoryNineBox {
    fn grid(&self) -> Result<NineBoxGrid, RepositoryError> {
        Ok(self.grid.lock().expect("grid mutex poisoned").clone())
    }

    fn update_cell(&self, cell: NineBoxCell) -> Result<(), RepositoryError> {
        self.grid.lock().expect("grid mutex poisoned").upsert(cell);
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn modify(
        &self,
        _id: &AssessmentId,
        _change: &mut dyn FnMut(&mut AssessmentRecord),
    ) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &AssessmentId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    assessment_router(Arc::new(service))
}
