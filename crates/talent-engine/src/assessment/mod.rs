//! Competency assessments: template structure, answer capture, per-pillar scoring and the
//! reports built on finalized results.
//!
//! Storage sits behind the traits in [`repository`]; the service and router are generic over
//! them so binaries choose their own persistence.

pub mod domain;
pub mod ninebox;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ActionPlan, ActionPlanId, ActionPlanStatus, AnswerValue, AssessmentId, AssessmentStatus,
    CriterionKind, EvaluatorId, Item, ItemId, Level, LevelId, NewActionPlan, NewAssessment,
    Pillar, PillarId, StoredAnswer, Template, TemplateId, WorkerId,
};
pub use ninebox::{NineBoxCell, NineBoxGrid};
pub use report::{
    DashboardSummary, EvolutionPoint, GlobalReport, GlobalReportRow, NineBoxEntry, NineBoxReport,
    NineBoxReportCell, PillarAnalysis, PillarLevelSummary, PotentialAnalysisRow,
    WorkerAssessmentDetail, WorkerEvolution, WorkerPillarDetail, WorkerReport, NO_LEVEL_LABEL,
};
pub use repository::{
    AssessmentRecord, AssessmentRepository, AssessmentView, NineBoxStore, RepositoryError,
    StoredPillarResult, TemplateCatalog,
};
pub use router::{assessment_router, AnswerRequest, ObservationsRequest};
pub use scoring::{
    compute_results, validate_input, AnswerInput, Band, GlobalResult, InputViolation,
    InputViolations, LevelScore, NineBoxPlacement, PillarResult, Potential, ScoringEngine,
    ScoringInput, TemplateConfig,
};
pub use service::{AssessmentService, AssessmentServiceError};
