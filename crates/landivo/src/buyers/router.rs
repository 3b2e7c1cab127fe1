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

use super::domain::{BuyerDraft, BuyerId, BuyerSource, BuyerUpdate, VipSignup};
use super::repository::BuyerRepository;
use super::service::{BuyerService, BuyerServiceError, UpsertOutcome};

/// Router builder exposing the buyer directory endpoints.
pub fn buyer_router<R>(service: Arc<BuyerService<R>>) -> Router
where
    R: BuyerRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/buyers",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/v1/buyers/:buyer_id",
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route("/api/v1/buyers/vip", post(vip_handler::<R>))
        .route("/api/v1/buyers/import", post(import_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportRequest {
    pub(crate) csv: String,
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<BuyerService<R>>>,
    axum::Json(draft): axum::Json<BuyerDraft>,
) -> Response
where
    R: BuyerRepository + 'static,
{
    match service.create(draft, BuyerSource::ManualEntry).await {
        Ok(buyer) => (StatusCode::CREATED, axum::Json(buyer)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<BuyerService<R>>>) -> Response
where
    R: BuyerRepository + 'static,
{
    match service.list().await {
        Ok(buyers) => (StatusCode::OK, axum::Json(buyers)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<BuyerService<R>>>,
    Path(buyer_id): Path<String>,
) -> Response
where
    R: BuyerRepository + 'static,
{
    match service.get(&BuyerId(buyer_id)).await {
        Ok(buyer) => (StatusCode::OK, axum::Json(buyer)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<BuyerService<R>>>,
    Path(buyer_id): Path<String>,
    axum::Json(update): axum::Json<BuyerUpdate>,
) -> Response
where
    R: BuyerRepository + 'static,
{
    match service.update(&BuyerId(buyer_id), update).await {
        Ok(buyer) => (StatusCode::OK, axum::Json(buyer)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<BuyerService<R>>>,
    Path(buyer_id): Path<String>,
) -> Response
where
    R: BuyerRepository + 'static,
{
    match service.delete(&BuyerId(buyer_id)).await {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "deleted": true })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn vip_handler<R>(
    State(service): State<Arc<BuyerService<R>>>,
    axum::Json(signup): axum::Json<VipSignup>,
) -> Response
where
    R: BuyerRepository + 'static,
{
    match service.vip_signup(signup).await {
        Ok((buyer, outcome)) => {
            let status = match outcome {
                UpsertOutcome::Created => StatusCode::CREATED,
                UpsertOutcome::Updated => StatusCode::OK,
            };
            let payload = json!({ "buyer": buyer, "outcome": outcome });
            (status, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn import_handler<R>(
    State(service): State<Arc<BuyerService<R>>>,
    axum::Json(request): axum::Json<ImportRequest>,
) -> Response
where
    R: BuyerRepository + 'static,
{
    match service.import_csv(&request.csv).await {
        Ok(outcome) => {
            let payload = json!({
                "imported": outcome.imported.len(),
                "buyers": outcome.imported,
                "errors": outcome.errors,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn error_response(err: BuyerServiceError) -> Response {
    let status = match &err {
        BuyerServiceError::MissingFields(_)
        | BuyerServiceError::DuplicateEmail
        | BuyerServiceError::DuplicatePhone
        | BuyerServiceError::UnreadableCsv(_) => StatusCode::BAD_REQUEST,
        BuyerServiceError::NotFound => StatusCode::NOT_FOUND,
        BuyerServiceError::Repository(repo) => return crate::store::storage_response(repo),
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
