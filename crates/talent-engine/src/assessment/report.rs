//! Cross-sectional views over persisted assessment results.
//!
//! Except for the dashboard, every report only looks at the latest completed assessment of
//! each worker.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{
    ActionPlan, AssessmentId, AssessmentStatus, EvaluatorId, LevelId, PillarId, StoredAnswer,
    Template, TemplateId, WorkerId,
};
use super::ninebox::{NineBoxCell, NineBoxGrid};
use super::repository::{AssessmentRecord, StoredPillarResult};
use super::scoring::{nine_box, LevelScore, NineBoxPlacement, Potential};

/// Bucket label for pillars whose walk never reached the first level.
pub const NO_LEVEL_LABEL: &str = "No level";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub mean_status_pct: Option<f64>,
    pub potential_distribution: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NineBoxEntry {
    pub worker_id: WorkerId,
    pub assessment_id: AssessmentId,
    pub status_pct: f64,
    pub potential: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NineBoxReportCell {
    #[serde(flatten)]
    pub cell: NineBoxCell,
    pub workers: Vec<NineBoxEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NineBoxReport {
    pub cells: Vec<NineBoxReportCell>,
}

impl NineBoxReport {
    pub fn cell(&self, placement: NineBoxPlacement) -> Option<&NineBoxReportCell> {
        self.cells
            .iter()
            .find(|entry| entry.cell.placement() == placement)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillarAnalysis {
    pub pillar_name: String,
    pub total: usize,
    pub by_level: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotentialAnalysisRow {
    pub worker_id: WorkerId,
    pub assessment_id: AssessmentId,
    pub potential: Potential,
    pub status_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionPoint {
    pub assessment_id: AssessmentId,
    pub evaluation_date: NaiveDate,
    pub status_pct: f64,
    pub potential: Option<&'static str>,
    /// Real level order per pillar name; 0 when no level was reached.
    pub pillar_levels: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerEvolution {
    pub worker_id: WorkerId,
    pub points: Vec<EvolutionPoint>,
}

/// Reached level of one pillar, as listed in the global report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillarLevelSummary {
    pub pillar_id: PillarId,
    pub pillar_name: String,
    pub real_level_name: String,
    pub expected_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalReportRow {
    pub assessment_id: AssessmentId,
    pub worker_id: WorkerId,
    pub evaluator_id: EvaluatorId,
    pub evaluation_date: NaiveDate,
    pub potential: Option<&'static str>,
    pub status_pct: Option<f64>,
    pub pillar_results: Vec<PillarLevelSummary>,
}

/// One row per worker, plus the distinct pillar names used as report columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalReport {
    pub rows: Vec<GlobalReportRow>,
    pub pillar_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerPillarDetail {
    pub pillar_id: PillarId,
    pub pillar_name: String,
    pub real_level_name: String,
    pub expected_level: String,
    pub score: f64,
    pub level_scores: Vec<LevelScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerAssessmentDetail {
    pub assessment_id: AssessmentId,
    pub evaluator_id: EvaluatorId,
    pub template_id: TemplateId,
    pub template_name: Option<String>,
    pub evaluation_date: NaiveDate,
    pub tenure_years: f64,
    pub potential: Option<&'static str>,
    pub status_pct: Option<f64>,
    pub observations: Option<String>,
    pub pillars: Vec<WorkerPillarDetail>,
    pub answers: Vec<StoredAnswer>,
    pub action_plans: Vec<ActionPlan>,
}

/// Individual report; `assessment` is `None` until the worker has a completed assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerReport {
    pub worker_id: WorkerId,
    pub assessment: Option<WorkerAssessmentDetail>,
}

pub fn dashboard(records: &[AssessmentRecord]) -> DashboardSummary {
    let pending = records.iter().filter(|record| record.status.is_open()).count();
    let completed = records
        .iter()
        .filter(|record| record.status.is_closed())
        .count();

    let statuses: Vec<f64> = records
        .iter()
        .filter_map(|record| record.global_status_pct)
        .collect();
    let mean_status_pct = if statuses.is_empty() {
        None
    } else {
        Some(statuses.iter().sum::<f64>() / statuses.len() as f64)
    };

    let mut potential_distribution = BTreeMap::new();
    for potential in records.iter().filter_map(|record| record.global_potential) {
        *potential_distribution.entry(potential.label()).or_insert(0) += 1;
    }

    DashboardSummary {
        total: records.len(),
        pending,
        completed,
        mean_status_pct,
        potential_distribution,
    }
}

pub fn nine_box_report(records: &[AssessmentRecord], grid: &NineBoxGrid) -> NineBoxReport {
    let mut placed: HashMap<NineBoxPlacement, Vec<NineBoxEntry>> = HashMap::new();
    for record in latest_completed(records) {
        let status_pct = record.global_status_pct.unwrap_or(0.0);
        let placement = nine_box(
            status_pct,
            record.global_potential.unwrap_or(Potential::NotEvaluable),
        );
        placed.entry(placement).or_default().push(NineBoxEntry {
            worker_id: record.worker_id.clone(),
            assessment_id: record.id.clone(),
            status_pct,
            potential: record.global_potential.map(Potential::label),
        });
    }

    let cells = grid
        .cells()
        .iter()
        .map(|cell| NineBoxReportCell {
            cell: cell.clone(),
            workers: placed.remove(&cell.placement()).unwrap_or_default(),
        })
        .collect();

    NineBoxReport { cells }
}

pub fn pillar_analysis(
    records: &[AssessmentRecord],
    templates: &[Template],
) -> Vec<PillarAnalysis> {
    let templates = index_templates(templates);
    let mut analysis: BTreeMap<String, PillarAnalysis> = BTreeMap::new();

    for record in latest_completed(records) {
        let template = templates.get(&record.template_id).copied();
        for stored in record.pillar_results.values() {
            let name = pillar_name(template, stored.pillar_id);
            let level = level_name(template, stored.real_level_id);

            let entry = analysis
                .entry(name.clone())
                .or_insert_with(|| PillarAnalysis {
                    pillar_name: name,
                    total: 0,
                    by_level: BTreeMap::new(),
                });
            *entry.by_level.entry(level).or_insert(0) += 1;
            entry.total += 1;
        }
    }

    analysis.into_values().collect()
}

pub fn potential_analysis(records: &[AssessmentRecord]) -> Vec<PotentialAnalysisRow> {
    latest_completed(records)
        .into_iter()
        .map(|record| PotentialAnalysisRow {
            worker_id: record.worker_id.clone(),
            assessment_id: record.id.clone(),
            potential: record.global_potential.unwrap_or(Potential::NotEvaluable),
            status_pct: record.global_status_pct.unwrap_or(0.0),
        })
        .collect()
}

pub fn worker_evolution(
    worker_id: &WorkerId,
    records: &[AssessmentRecord],
    templates: &[Template],
) -> WorkerEvolution {
    let templates = index_templates(templates);
    let mut history: Vec<&AssessmentRecord> = records
        .iter()
        .filter(|record| {
            &record.worker_id == worker_id && record.status == AssessmentStatus::Completed
        })
        .collect();
    history.sort_by_key(|record| (record.evaluation_date, record.created_at));

    let points = history
        .into_iter()
        .map(|record| {
            let template = templates.get(&record.template_id).copied();
            let pillar_levels = record
                .pillar_results
                .values()
                .map(|stored| {
                    let name = pillar_name(template, stored.pillar_id);
                    let order = stored
                        .real_level_id
                        .and_then(|level_id| {
                            template.and_then(|template| template.level(level_id))
                        })
                        .map_or(0, |level| level.order);
                    (name, order)
                })
                .collect();

            EvolutionPoint {
                assessment_id: record.id.clone(),
                evaluation_date: record.evaluation_date,
                status_pct: record.global_status_pct.unwrap_or(0.0),
                potential: record.global_potential.map(Potential::label),
                pillar_levels,
            }
        })
        .collect();

    WorkerEvolution {
        worker_id: worker_id.clone(),
        points,
    }
}

pub fn global_report(records: &[AssessmentRecord], templates: &[Template]) -> GlobalReport {
    let templates = index_templates(templates);
    let latest = latest_completed(records);

    let rows = latest
        .iter()
        .map(|record| {
            let template = templates.get(&record.template_id).copied();
            let pillar_results = ordered_pillar_results(record, template)
                .into_iter()
                .map(|stored| PillarLevelSummary {
                    pillar_id: stored.pillar_id,
                    pillar_name: pillar_name(template, stored.pillar_id),
                    real_level_name: level_name(template, stored.real_level_id),
                    expected_level: stored.expected_level.clone(),
                })
                .collect();

            GlobalReportRow {
                assessment_id: record.id.clone(),
                worker_id: record.worker_id.clone(),
                evaluator_id: record.evaluator_id.clone(),
                evaluation_date: record.evaluation_date,
                potential: record.global_potential.map(Potential::label),
                status_pct: record.global_status_pct,
                pillar_results,
            }
        })
        .collect();

    let mut used: Vec<&Template> = Vec::new();
    for record in &latest {
        if let Some(template) = templates.get(&record.template_id).copied() {
            if !used.iter().any(|seen| seen.id == template.id) {
                used.push(template);
            }
        }
    }
    let mut columns: Vec<(u32, &str)> = used
        .iter()
        .flat_map(|template| {
            template
                .pillars
                .iter()
                .map(|pillar| (pillar.order, pillar.name.as_str()))
        })
        .collect();
    columns.sort_by_key(|(order, _)| *order);
    let mut pillar_names: Vec<String> = Vec::new();
    for (_, name) in columns {
        if !pillar_names.iter().any(|seen| seen == name) {
            pillar_names.push(name.to_string());
        }
    }

    GlobalReport { rows, pillar_names }
}

pub fn worker_report(
    worker_id: &WorkerId,
    records: &[AssessmentRecord],
    templates: &[Template],
) -> WorkerReport {
    let own: Vec<AssessmentRecord> = records
        .iter()
        .filter(|record| &record.worker_id == worker_id)
        .cloned()
        .collect();
    let templates = index_templates(templates);

    let assessment = latest_completed(&own).into_iter().next().map(|record| {
        let template = templates.get(&record.template_id).copied();
        let pillars = ordered_pillar_results(record, template)
            .into_iter()
            .map(|stored| WorkerPillarDetail {
                pillar_id: stored.pillar_id,
                pillar_name: pillar_name(template, stored.pillar_id),
                real_level_name: level_name(template, stored.real_level_id),
                expected_level: stored.expected_level.clone(),
                score: stored.score(),
                level_scores: stored.level_scores.clone(),
            })
            .collect();

        WorkerAssessmentDetail {
            assessment_id: record.id.clone(),
            evaluator_id: record.evaluator_id.clone(),
            template_id: record.template_id,
            template_name: template.map(|template| template.name.clone()),
            evaluation_date: record.evaluation_date,
            tenure_years: record.tenure_years,
            potential: record.global_potential.map(Potential::label),
            status_pct: record.global_status_pct,
            observations: record.observations.clone(),
            pillars,
            answers: record.answers.values().copied().collect(),
            action_plans: record.action_plans.clone(),
        }
    });

    WorkerReport {
        worker_id: worker_id.clone(),
        assessment,
    }
}

/// Latest completed assessment per worker by evaluation date, ordered by worker.
pub(crate) fn latest_completed(records: &[AssessmentRecord]) -> Vec<&AssessmentRecord> {
    let mut latest: BTreeMap<&WorkerId, &AssessmentRecord> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|record| record.status == AssessmentStatus::Completed)
    {
        latest
            .entry(&record.worker_id)
            .and_modify(|current| {
                if (record.evaluation_date, record.created_at)
                    > (current.evaluation_date, current.created_at)
                {
                    *current = record;
                }
            })
            .or_insert(record);
    }
    latest.into_values().collect()
}

/// Stored pillar rows in template pillar order; pillars missing from the template go last.
fn ordered_pillar_results<'a>(
    record: &'a AssessmentRecord,
    template: Option<&Template>,
) -> Vec<&'a StoredPillarResult> {
    let mut rows: Vec<&StoredPillarResult> = record.pillar_results.values().collect();
    rows.sort_by_key(|stored| {
        let order = template
            .and_then(|template| {
                template
                    .pillars
                    .iter()
                    .find(|pillar| pillar.id == stored.pillar_id)
            })
            .map_or(u32::MAX, |pillar| pillar.order);
        (order, stored.pillar_id)
    });
    rows
}

fn pillar_name(template: Option<&Template>, pillar_id: PillarId) -> String {
    template
        .and_then(|template| template.pillars.iter().find(|pillar| pillar.id == pillar_id))
        .map(|pillar| pillar.name.clone())
        .unwrap_or_else(|| format!("Pillar {}", pillar_id))
}

fn level_name(template: Option<&Template>, level_id: Option<LevelId>) -> String {
    level_id
        .and_then(|level_id| template.and_then(|template| template.level(level_id)))
        .map(|level| level.name.clone())
        .unwrap_or_else(|| NO_LEVEL_LABEL.to_string())
}

fn index_templates(templates: &[Template]) -> HashMap<TemplateId, &Template> {
    templates
        .iter()
        .map(|template| (template.id, template))
        .collect()
}
