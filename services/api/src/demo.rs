use crate::infra::{
    sample_item_id, InMemoryAssessmentRepository, InMemoryNineBoxStore, InMemoryTemplateCatalog,
    SAMPLE_ITEMS_PER_BUCKET, SAMPLE_LEVEL_COUNT, SAMPLE_PILLAR_COUNT, SAMPLE_TEMPLATE_ID,
};
use crate::routes::score_input;
use chrono::{Days, Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use talent_engine::assessment::{
    AnswerValue, AssessmentId, AssessmentService, EvaluatorId, GlobalResult, NewActionPlan,
    NewAssessment, NineBoxGrid, ScoringInput, WorkerId, NO_LEVEL_LABEL,
};
use talent_engine::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Years the demo worker has held the position; drives the strictness of the level walk.
    #[arg(long, default_value_t = 4.0)]
    pub(crate) tenure_years: f64,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) evaluation_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding answers, pillars, levels, tenure and an optional template config.
    #[arg(long)]
    pub(crate) input: PathBuf,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.input)?;
    let input: ScoringInput = serde_json::from_str(&raw)?;
    let response = score_input(&input, &NineBoxGrid::default())?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Verdict for one demo item: solid on the first two levels, patchy above them.
fn demo_answer(pillar_order: u32, level_order: u32, item_order: u32) -> AnswerValue {
    match level_order {
        1 | 2 => AnswerValue::FullyMet,
        3 if (pillar_order + item_order) % 3 == 0 => AnswerValue::PartiallyMet,
        3 => AnswerValue::FullyMet,
        _ if item_order == 1 && pillar_order % 2 == 0 => AnswerValue::FullyMet,
        _ => AnswerValue::NotMet,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        tenure_years,
        evaluation_date,
    } = args;
    let evaluation_date = evaluation_date.unwrap_or_else(|| Local::now().date_naive());

    let service = AssessmentService::new(
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(InMemoryTemplateCatalog::seeded()),
        Arc::new(InMemoryNineBoxStore::default()),
    );

    println!("Competency assessment demo");
    let record = match service.create(NewAssessment {
        worker_id: WorkerId("worker-demo".to_string()),
        evaluator_id: EvaluatorId("evaluator-demo".to_string()),
        template_id: SAMPLE_TEMPLATE_ID,
        evaluation_date,
        tenure_years,
    }) {
        Ok(record) => record,
        Err(err) => {
            println!("  Assessment rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Opened assessment {} for {} ({} items, {:.1} years in position)",
        record.id,
        record.worker_id,
        record.answers.len(),
        record.tenure_years
    );

    answer_sample_items(&service, &record.id)?;

    let partial = service.compute_partial_results(&record.id)?;
    println!(
        "- Partial results: {:.2}% status, {} potential",
        partial.global_status_pct,
        partial.global_potential.label()
    );

    service.save_observations(
        &record.id,
        "Strong day-to-day practice; expert level still uneven.".to_string(),
    )?;
    let result = service.finalize(&record.id)?;
    render_result(&result);

    let grid = service.nine_box_grid()?;
    if let Some(cell) = grid.cell(result.nine_box) {
        println!(
            "\n9-box: {} potential / {} performance -> {}",
            result.nine_box.potential.label(),
            result.nine_box.performance.label(),
            cell.label
        );
        println!("  Recommendation: {}", cell.recommendation);
    }

    let weakest = result.pillar_results.iter().min_by(|a, b| {
        a.score()
            .partial_cmp(&b.score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(pillar) = weakest {
        let plan = service.add_action_plan(
            &record.id,
            NewActionPlan {
                pillar_id: Some(pillar.pillar_id),
                action_kind: Some("Coaching".to_string()),
                action: format!("Shadow an expert on {}", pillar.pillar_name),
                start_date: Some(evaluation_date),
                follow_up_date: evaluation_date.checked_add_days(Days::new(90)),
                notes: None,
            },
        )?;
        println!(
            "\nAction plan {} ({:?}): {}",
            plan.id, plan.status, plan.action
        );
    }

    let summary = service.dashboard()?;
    println!(
        "\nDashboard: {} assessments | {} pending | {} completed",
        summary.total, summary.pending, summary.completed
    );
    if let Some(mean) = summary.mean_status_pct {
        println!("  Mean status: {:.2}%", mean);
    }
    for (potential, count) in &summary.potential_distribution {
        println!("  - {}: {}", potential, count);
    }

    Ok(())
}

fn answer_sample_items(
    service: &AssessmentService<
        InMemoryAssessmentRepository,
        InMemoryTemplateCatalog,
        InMemoryNineBoxStore,
    >,
    id: &AssessmentId,
) -> Result<(), AppError> {
    for pillar in 1..=SAMPLE_PILLAR_COUNT {
        for level in 1..=SAMPLE_LEVEL_COUNT {
            for item in 1..=SAMPLE_ITEMS_PER_BUCKET {
                service.record_answer(
                    id,
                    sample_item_id(pillar, level, item),
                    demo_answer(pillar, level, item),
                )?;
            }
        }
    }
    Ok(())
}

fn render_result(result: &GlobalResult) {
    println!(
        "\nFinal result: {:.2}% status | {} potential",
        result.global_status_pct,
        result.global_potential.label()
    );
    println!("Pillars:");
    for pillar in &result.pillar_results {
        let visited: Vec<String> = pillar
            .level_scores
            .iter()
            .map(|entry| format!("L{} {:.2}%", entry.level_order, entry.percentage))
            .collect();
        println!(
            "  - {}: {} (expected {}) | score {:.2}% | {}",
            pillar.pillar_name,
            pillar.real_level_name.as_deref().unwrap_or(NO_LEVEL_LABEL),
            pillar.expected_level,
            pillar.score(),
            visited.join(", ")
        );
    }
}
