use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ActionPlanId, AnswerValue, AssessmentId, ItemId, NewActionPlan, NewAssessment, WorkerId,
};
use super::ninebox::NineBoxCell;
use super::repository::{AssessmentRepository, NineBoxStore, RepositoryError, TemplateCatalog};
use super::service::{AssessmentService, AssessmentServiceError};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AnswerRequest {
    pub item_id: ItemId,
    pub value: AnswerValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservationsRequest {
    pub observations: String,
}

type SharedService<R, C, N> = State<Arc<AssessmentService<R, C, N>>>;

/// Router builder exposing the assessment lifecycle, talent-grid settings and reports.
pub fn assessment_router<R, C, N>(service: Arc<AssessmentService<R, C, N>>) -> Router
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/assessments",
            post(create_handler::<R, C, N>).get(list_handler::<R, C, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id",
            get(detail_handler::<R, C, N>).delete(delete_handler::<R, C, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/answers",
            put(answer_handler::<R, C, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/observations",
            put(observations_handler::<R, C, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/results",
            post(partial_results_handler::<R, C, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/finalize",
            post(finalize_handler::<R, C, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/action-plans",
            post(add_action_plan_handler::<R, C, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/action-plans/:plan_id",
            axum::routing::delete(remove_action_plan_handler::<R, C, N>),
        )
        .route("/api/v1/ninebox/cells", put(nine_box_cell_handler::<R, C, N>))
        .route(
            "/api/v1/reports/dashboard",
            get(dashboard_handler::<R, C, N>),
        )
        .route("/api/v1/reports/ninebox", get(nine_box_handler::<R, C, N>))
        .route("/api/v1/reports/pillars", get(pillars_handler::<R, C, N>))
        .route(
            "/api/v1/reports/potential",
            get(potential_handler::<R, C, N>),
        )
        .route("/api/v1/reports/global", get(global_report_handler::<R, C, N>))
        .route(
            "/api/v1/reports/workers/:worker_id",
            get(worker_report_handler::<R, C, N>),
        )
        .route(
            "/api/v1/reports/workers/:worker_id/evolution",
            get(evolution_handler::<R, C, N>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    axum::Json(request): axum::Json<NewAssessment>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.create(request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, C, N>(State(service): SharedService<R, C, N>) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.list() {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.summary_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detail_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.get(&AssessmentId(assessment_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.delete(&AssessmentId(assessment_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn answer_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<AnswerRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.record_answer(&id, request.item_id, request.value) {
        Ok(record) => (StatusCode::OK, axum::Json(record.summary_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn observations_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<ObservationsRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.save_observations(&id, request.observations) {
        Ok(record) => (StatusCode::OK, axum::Json(record.summary_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn partial_results_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.compute_partial_results(&AssessmentId(assessment_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn finalize_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.finalize(&AssessmentId(assessment_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_action_plan_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    Path(assessment_id): Path<String>,
    axum::Json(plan): axum::Json<NewActionPlan>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.add_action_plan(&AssessmentId(assessment_id), plan) {
        Ok(plan) => (StatusCode::CREATED, axum::Json(plan)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_action_plan_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    Path((assessment_id, plan_id)): Path<(String, String)>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.remove_action_plan(&id, &ActionPlanId(plan_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn nine_box_cell_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    axum::Json(cell): axum::Json<NineBoxCell>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    let updated = service
        .update_nine_box_cell(cell)
        .and_then(|()| service.nine_box_grid());
    match updated {
        Ok(grid) => (StatusCode::OK, axum::Json(grid)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn dashboard_handler<R, C, N>(State(service): SharedService<R, C, N>) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.dashboard() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn nine_box_handler<R, C, N>(State(service): SharedService<R, C, N>) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.nine_box_report() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pillars_handler<R, C, N>(State(service): SharedService<R, C, N>) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.pillar_analysis() {
        Ok(analysis) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn potential_handler<R, C, N>(State(service): SharedService<R, C, N>) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.potential_analysis() {
        Ok(rows) => (StatusCode::OK, axum::Json(rows)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evolution_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    Path(worker_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.worker_evolution(&WorkerId(worker_id)) {
        Ok(evolution) => (StatusCode::OK, axum::Json(evolution)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn global_report_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.global_report() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn worker_report_handler<R, C, N>(
    State(service): SharedService<R, C, N>,
    Path(worker_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: TemplateCatalog + 'static,
    N: NineBoxStore + 'static,
{
    match service.worker_report(&WorkerId(worker_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn status_for(error: &AssessmentServiceError) -> StatusCode {
    match error {
        AssessmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Repository(RepositoryError::Conflict)
        | AssessmentServiceError::NotDeletable(_) => StatusCode::CONFLICT,
        AssessmentServiceError::Input(_)
        | AssessmentServiceError::TemplateNotFound(_)
        | AssessmentServiceError::UnknownItem(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn error_response(error: AssessmentServiceError) -> Response {
    let status = status_for(&error);
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
