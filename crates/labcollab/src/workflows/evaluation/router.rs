use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::domain::{EvaluationPayload, EvaluatorId, TalentEvaluationSubmission};
use super::repository::EvaluationRepository;
use super::service::{ErrorKind, EvaluationServiceError, FinalEvaluationService};
use crate::workflows::catalog::{Project, ProjectCatalog, ProjectId};

/// Body accepted when a lab administrator submits the final project evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalEvaluationRequest {
    pub evaluator_id: EvaluatorId,
    #[serde(flatten)]
    pub payload: EvaluationPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct LockStatusView {
    pub project_id: ProjectId,
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalScoreView {
    pub project_id: ProjectId,
    pub final_score: Option<f64>,
}

/// Structured failure body shared by every evaluation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl IntoResponse for EvaluationServiceError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict | ErrorKind::InvalidState => StatusCode::CONFLICT,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        };

        if status.is_server_error() {
            error!(error = %self, "evaluation request failed");
        }

        let body = ErrorResponse {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Router builder exposing project registration and the evaluation lock workflow.
pub fn evaluation_router<P, E>(service: Arc<FinalEvaluationService<P, E>>) -> Router
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    Router::new()
        .route("/api/v1/projects", post(register_project_handler::<P, E>))
        .route(
            "/api/v1/projects/:project_id/evaluations",
            get(list_evaluations_handler::<P, E>).post(record_evaluation_handler::<P, E>),
        )
        .route(
            "/api/v1/projects/:project_id/final-evaluation",
            post(create_final_handler::<P, E>)
                .get(get_final_handler::<P, E>)
                .delete(delete_final_handler::<P, E>),
        )
        .route(
            "/api/v1/projects/:project_id/final-evaluation/lock",
            get(lock_status_handler::<P, E>).post(lock_handler::<P, E>),
        )
        .route(
            "/api/v1/projects/:project_id/final-evaluation/score",
            get(final_score_handler::<P, E>),
        )
        .route(
            "/api/v1/projects/:project_id/final-evaluation/summary",
            get(summary_handler::<P, E>),
        )
        .with_state(service)
}

type ServiceState<P, E> = State<Arc<FinalEvaluationService<P, E>>>;

pub(crate) async fn register_project_handler<P, E>(
    State(service): ServiceState<P, E>,
    Json(project): Json<Project>,
) -> Result<Response, EvaluationServiceError>
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    let stored = service.register_project(project)?;
    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

pub(crate) async fn list_evaluations_handler<P, E>(
    State(service): ServiceState<P, E>,
    Path(project_id): Path<String>,
) -> Result<Response, EvaluationServiceError>
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    let evaluations = service.project_evaluations(&ProjectId(project_id))?;
    Ok(Json(evaluations).into_response())
}

pub(crate) async fn record_evaluation_handler<P, E>(
    State(service): ServiceState<P, E>,
    Path(project_id): Path<String>,
    Json(submission): Json<TalentEvaluationSubmission>,
) -> Result<Response, EvaluationServiceError>
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    let stored = service.record_evaluation(&ProjectId(project_id), submission)?;
    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

pub(crate) async fn create_final_handler<P, E>(
    State(service): ServiceState<P, E>,
    Path(project_id): Path<String>,
    Json(request): Json<FinalEvaluationRequest>,
) -> Result<Response, EvaluationServiceError>
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    let stored = service.create_final_evaluation(
        &ProjectId(project_id),
        &request.evaluator_id,
        request.payload,
    )?;
    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

pub(crate) async fn get_final_handler<P, E>(
    State(service): ServiceState<P, E>,
    Path(project_id): Path<String>,
) -> Result<Response, EvaluationServiceError>
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    let evaluation = service.final_evaluation(&ProjectId(project_id))?;
    Ok(Json(evaluation).into_response())
}

pub(crate) async fn delete_final_handler<P, E>(
    State(service): ServiceState<P, E>,
    Path(project_id): Path<String>,
) -> Result<StatusCode, EvaluationServiceError>
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    service.delete_final_evaluation(&ProjectId(project_id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn lock_handler<P, E>(
    State(service): ServiceState<P, E>,
    Path(project_id): Path<String>,
) -> Result<StatusCode, EvaluationServiceError>
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    service.lock_project_evaluation(&ProjectId(project_id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn lock_status_handler<P, E>(
    State(service): ServiceState<P, E>,
    Path(project_id): Path<String>,
) -> Result<Json<LockStatusView>, EvaluationServiceError>
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    let project_id = ProjectId(project_id);
    let locked = service.is_project_locked(&project_id)?;
    Ok(Json(LockStatusView { project_id, locked }))
}

pub(crate) async fn final_score_handler<P, E>(
    State(service): ServiceState<P, E>,
    Path(project_id): Path<String>,
) -> Result<Json<FinalScoreView>, EvaluationServiceError>
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    let project_id = ProjectId(project_id);
    let final_score = service.get_final_score(&project_id)?;
    Ok(Json(FinalScoreView {
        project_id,
        final_score,
    }))
}

pub(crate) async fn summary_handler<P, E>(
    State(service): ServiceState<P, E>,
    Path(project_id): Path<String>,
) -> Result<Response, EvaluationServiceError>
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    let summary = service.get_final_summary(&ProjectId(project_id))?;
    Ok(Json(summary).into_response())
}
