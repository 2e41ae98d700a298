use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::TemplateConfig;

/// Identifier wrapper for assessment instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Identifier of the assessed worker, owned by the master-data collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub String);

/// Identifier of the evaluating user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluatorId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PillarId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionPlanId(pub String);

macro_rules! display_inner {
    ($($name:ident),+ $(,)?) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

display_inner!(AssessmentId, WorkerId, TemplateId, PillarId, LevelId, ItemId, ActionPlanId);

/// Ordered competency tier. `order` 1 is the entry tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    pub code: String,
    pub order: u32,
}

/// Competency area evaluated independently of the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillar {
    pub id: PillarId,
    pub name: String,
    pub order: u32,
}

/// How an item is verified. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    Subjective,
    Objective,
}

/// Questionnaire entry scored within exactly one (pillar, level) bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub pillar_id: PillarId,
    pub level_id: LevelId,
    pub text: String,
    pub criterion: CriterionKind,
    #[serde(default)]
    pub expectation: Option<String>,
    pub order: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Assessment template with its structural metadata and scoring thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub config: TemplateConfig,
    pub levels: Vec<Level>,
    pub pillars: Vec<Pillar>,
    pub items: Vec<Item>,
}

impl Template {
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn active_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.active)
    }

    /// Pillars sorted by display order.
    pub fn ordered_pillars(&self) -> Vec<Pillar> {
        let mut pillars = self.pillars.clone();
        pillars.sort_by_key(|pillar| pillar.order);
        pillars
    }

    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == id)
    }
}

/// Evaluator verdict for a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerValue {
    FullyMet,
    PartiallyMet,
    NotMet,
}

/// Stored answer for one item of one assessment; `None` until the evaluator responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAnswer {
    pub item_id: ItemId,
    pub value: Option<AnswerValue>,
}

/// Lifecycle of an assessment instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Draft,
    InProgress,
    Completed,
    Validated,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "draft",
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Validated => "validated",
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, AssessmentStatus::Draft | AssessmentStatus::InProgress)
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, AssessmentStatus::Completed | AssessmentStatus::Validated)
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Request payload opening a new assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAssessment {
    pub worker_id: WorkerId,
    pub evaluator_id: EvaluatorId,
    pub template_id: TemplateId,
    pub evaluation_date: NaiveDate,
    pub tenure_years: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPlanStatus {
    Pending,
    InProgress,
    Done,
}

/// Development action agreed after an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub id: ActionPlanId,
    pub pillar_id: Option<PillarId>,
    pub action_kind: Option<String>,
    pub action: String,
    pub start_date: Option<NaiveDate>,
    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: ActionPlanStatus,
    pub created_at: DateTime<Utc>,
}

/// Request payload for a new action plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActionPlan {
    #[serde(default)]
    pub pillar_id: Option<PillarId>,
    #[serde(default)]
    pub action_kind: Option<String>,
    pub action: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub follow_up_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}
