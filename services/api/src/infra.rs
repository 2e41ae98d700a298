use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use talent_engine::assessment::{
    AssessmentId, AssessmentRecord, AssessmentRepository, CriterionKind, Item, ItemId, Level,
    LevelId, NineBoxCell, NineBoxGrid, NineBoxStore, Pillar, PillarId, RepositoryError, Template,
    TemplateCatalog, TemplateConfig, TemplateId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = lock(&self.records)?;
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
        let mut guard = lock(&self.records)?;
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        change(record);
        Ok(record.clone())
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &AssessmentId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = lock(&self.records)?;
        let mut records: Vec<AssessmentRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }
}

#[derive(Clone)]
pub(crate) struct InMemoryTemplateCatalog {
    templates: Arc<Vec<Template>>,
}

impl InMemoryTemplateCatalog {
    /// Catalog holding the sample template with its default thresholds.
    pub(crate) fn seeded() -> Self {
        Self::seeded_with(TemplateConfig::default())
    }

    pub(crate) fn seeded_with(config: TemplateConfig) -> Self {
        Self {
            templates: Arc::new(vec![sample_template_with(config)]),
        }
    }
}

impl TemplateCatalog for InMemoryTemplateCatalog {
    fn template(&self, id: TemplateId) -> Result<Option<Template>, RepositoryError> {
        Ok(self
            .templates
            .iter()
            .find(|template| template.id == id)
            .cloned())
    }

    fn templates(&self) -> Result<Vec<Template>, RepositoryError> {
        Ok(self.templates.as_ref().clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNineBoxStore {
    grid: Arc<Mutex<NineBoxGrid>>,
}

impl NineBoxStore for InMemoryNineBoxStore {
    fn grid(&self) -> Result<NineBoxGrid, RepositoryError> {
        Ok(lock(&self.grid)?.clone())
    }

    fn update_cell(&self, cell: NineBoxCell) -> Result<(), RepositoryError> {
        lock(&self.grid)?.upsert(cell);
        Ok(())
    }
}

pub(crate) const SAMPLE_TEMPLATE_ID: TemplateId = TemplateId(1);
pub(crate) const SAMPLE_PILLAR_COUNT: u32 = SAMPLE_PILLARS.len() as u32;
pub(crate) const SAMPLE_LEVEL_COUNT: u32 = SAMPLE_LEVELS.len() as u32;
pub(crate) const SAMPLE_ITEMS_PER_BUCKET: u32 = 3;

/// Pillar name followed by the expectation stated for each of the four levels.
const SAMPLE_PILLARS: [(&str, [&str; 4]); 6] = [
    (
        "Contractors",
        [
            "Explains contractor safety obligations and procedures to the team",
            "Approves contractor documentation and classifies work orders correctly",
            "Explains safety obligations to both the team and the contractors",
            "Introduces practices that raise contractor safety beyond the standard",
        ],
    ),
    (
        "Strategy",
        [
            "Knows and regularly reports on key safety projects and KPIs",
            "Plans by assigning concrete tasks to everyone in the unit",
            "Integrates the safety strategy into day-to-day management",
            "Builds synergies with other units to reach excellent safety performance",
        ],
    ),
    (
        "Risk management - action plan",
        [
            "Readily explains the critical business risks",
            "Is willing to report on and discuss risks",
            "Reports clearly and regularly on actions, priorities and risk status",
            "Influences others to achieve sound risk management",
        ],
    ),
    (
        "Risk management - day to day",
        [
            "Regularly reminds the team of the key safety behaviours",
            "Shares key safety information with the team at shift handover",
            "Reviews and plans daily risk incidents and tasks",
            "Makes the importance of daily risk management visible",
        ],
    ),
    (
        "Change management",
        [
            "Knows and explains the change management protocol to the team",
            "Explains the protocol for changes to equipment and installations",
            "Talks frequently with the team about change management",
            "Encourages the team and others to adopt change management",
        ],
    ),
    (
        "Incidents",
        [
            "Reports accidents of direct reports and relevant incidents",
            "Reports and records accidents and incidents in the system",
            "Reports and records accidents and incidents within the shift",
            "Takes an active part in accident and incident investigations",
        ],
    ),
];

const SAMPLE_LEVELS: [(&str, &str); 4] = [
    ("Initial", "01"),
    ("Basic", "02"),
    ("Advanced", "03"),
    ("Expert", "04"),
];

/// Line-management competency template: six pillars, four levels, three items per bucket.
pub(crate) fn sample_template() -> Template {
    sample_template_with(TemplateConfig::default())
}

pub(crate) fn sample_template_with(config: TemplateConfig) -> Template {
    let levels: Vec<Level> = SAMPLE_LEVELS
        .iter()
        .zip(1u32..)
        .map(|((name, code), order)| Level {
            id: LevelId(order),
            name: (*name).to_string(),
            code: (*code).to_string(),
            order,
        })
        .collect();

    let mut pillars = Vec::new();
    let mut items = Vec::new();
    for ((name, expectations), pillar_order) in SAMPLE_PILLARS.iter().zip(1u32..) {
        let pillar_id = PillarId(pillar_order);
        pillars.push(Pillar {
            id: pillar_id,
            name: (*name).to_string(),
            order: pillar_order,
        });

        for (level, expectation) in levels.iter().zip(expectations.iter()) {
            let prompts = [
                (CriterionKind::Subjective, format!("Describe how you apply: {expectation}")),
                (CriterionKind::Subjective, format!("Give a recent example for: {expectation}")),
                (CriterionKind::Objective, format!("Verify evidence on site for: {expectation}")),
            ];
            for ((criterion, text), item_order) in prompts.into_iter().zip(1u32..) {
                items.push(Item {
                    id: sample_item_id(pillar_order, level.order, item_order),
                    pillar_id,
                    level_id: level.id,
                    text,
                    criterion,
                    expectation: Some((*expectation).to_string()),
                    order: item_order,
                    active: true,
                });
            }
        }
    }

    Template {
        id: SAMPLE_TEMPLATE_ID,
        name: "Safety competencies - line management".to_string(),
        config,
        levels,
        pillars,
        items,
    }
}

pub(crate) fn sample_item_id(pillar_order: u32, level_order: u32, item_order: u32) -> ItemId {
    ItemId(pillar_order * 100 + level_order * 10 + item_order)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
