use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::SessionId;
use super::repository::SessionRepository;
use super::service::{QualificationService, QualificationServiceError};
use super::steps::StepId;
use crate::properties::{PropertyId, PropertyRepository};

/// Router builder for the qualification wizard.
pub fn qualification_router<S, P>(service: Arc<QualificationService<S, P>>) -> Router
where
    S: SessionRepository + 'static,
    P: PropertyRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/qualification/sessions",
            post(start_handler::<S, P>),
        )
        .route(
            "/api/v1/qualification/sessions/:session_id",
            get(summary_handler::<S, P>),
        )
        .route(
            "/api/v1/qualification/sessions/:session_id/step",
            get(step_handler::<S, P>),
        )
        .route(
            "/api/v1/qualification/sessions/:session_id/answers",
            post(answer_handler::<S, P>),
        )
        .route(
            "/api/v1/qualification/sessions/:session_id/back",
            post(back_handler::<S, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartRequest {
    property_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerRequest {
    step: String,
    value: String,
}

pub(crate) async fn start_handler<S, P>(
    State(service): State<Arc<QualificationService<S, P>>>,
    axum::Json(request): axum::Json<StartRequest>,
) -> Response
where
    S: SessionRepository + 'static,
    P: PropertyRepository + 'static,
{
    match service.start(&PropertyId(request.property_id)).await {
        Ok(session) => {
            let payload = json!({
                "sessionId": session.id,
                "step": super::service::StepView::for_step(session.current_step),
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_handler<S, P>(
    State(service): State<Arc<QualificationService<S, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionRepository + 'static,
    P: PropertyRepository + 'static,
{
    match service.summary(&SessionId(session_id)).await {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn step_handler<S, P>(
    State(service): State<Arc<QualificationService<S, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionRepository + 'static,
    P: PropertyRepository + 'static,
{
    match service.current_step(&SessionId(session_id)).await {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn answer_handler<S, P>(
    State(service): State<Arc<QualificationService<S, P>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<AnswerRequest>,
) -> Response
where
    S: SessionRepository + 'static,
    P: PropertyRepository + 'static,
{
    let Some(step) = StepId::parse(&request.step) else {
        let payload = json!({ "error": format!("unknown step '{}'", request.step) });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    };

    match service
        .answer(&SessionId(session_id), step, &request.value)
        .await
    {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn back_handler<S, P>(
    State(service): State<Arc<QualificationService<S, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionRepository + 'static,
    P: PropertyRepository + 'static,
{
    match service.back(&SessionId(session_id)).await {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: QualificationServiceError) -> Response {
    let status = match &err {
        QualificationServiceError::FinancingUnavailable
        | QualificationServiceError::StepMismatch { .. }
        | QualificationServiceError::InvalidAnswer(_)
        | QualificationServiceError::AlreadyCompleted
        | QualificationServiceError::AtFirstStep => StatusCode::BAD_REQUEST,
        QualificationServiceError::PropertyNotFound
        | QualificationServiceError::SessionNotFound => StatusCode::NOT_FOUND,
        QualificationServiceError::Repository(repo) => {
            return crate::store::storage_response(repo)
        }
    };
    (status, axum::Json(json!({ "error": err.to_string() }))).into_response()
}
