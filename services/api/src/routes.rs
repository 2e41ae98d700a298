use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use talent_engine::assessment::{
    assessment_router, validate_input, AssessmentRepository, AssessmentService, GlobalResult,
    NineBoxGrid, NineBoxStore, ScoringInput, TemplateCatalog,
};
use talent_engine::error::AppError;

/// Engine result joined with the talent-grid cell it lands in.
#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    #[serde(flatten)]
    pub(crate) result: GlobalResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) nine_box_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) recommendation: Option<String>,
}

impl ScoreResponse {
    pub(crate) fn new(result: GlobalResult, grid: &NineBoxGrid) -> Self {
        let cell = grid.cell(result.nine_box);
        Self {
            nine_box_label: cell.map(|cell| cell.label.clone()),
            recommendation: cell.map(|cell| cell.recommendation.clone()),
            result,
        }
    }
}

pub(crate) fn with_assessment_routes<R, C, N>(
    service: Arc<AssessmentService<R, C, N>>,
) -> axum::Router
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    let scoring = axum::Router::new()
        .route(
            "/api/v1/scoring/compute",
            axum::routing::post(scoring_endpoint::<R, C, N>),
        )
        .with_state(service.clone());

    assessment_router(service)
        .merge(scoring)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Stateless scoring over a self-contained template snapshot, labelled with the live grid.
pub(crate) async fn scoring_endpoint<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
    Json(input): Json<ScoringInput>,
) -> Result<Json<ScoreResponse>, AppError>
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    let grid = service.nine_box_grid()?;
    score_input(&input, &grid).map(Json)
}

pub(crate) fn score_input(
    input: &ScoringInput,
    grid: &NineBoxGrid,
) -> Result<ScoreResponse, AppError> {
    validate_input(input.tenure_years, &input.config)?;
    let result = input.compute();
    tracing::debug!(
        pillars = result.pillar_results.len(),
        potential = result.global_potential.label(),
        "scoring request computed"
    );
    Ok(ScoreResponse::new(result, grid))
}
