use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ListDraft, ListId};
use super::repository::ListRepository;
use super::service::{ListService, ListServiceError};
use crate::buyers::{BuyerId, BuyerRepository};
use crate::notifications::OutboxRepository;

/// Router builder for buyer lists and campaign sends.
pub fn list_router<L, B, Q>(service: Arc<ListService<L, B, Q>>) -> Router
where
    L: ListRepository + 'static,
    B: BuyerRepository + 'static,
    Q: OutboxRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/lists",
            post(create_handler::<L, B, Q>).get(index_handler::<L, B, Q>),
        )
        .route(
            "/api/v1/lists/:list_id",
            get(get_handler::<L, B, Q>).delete(delete_handler::<L, B, Q>),
        )
        .route(
            "/api/v1/lists/:list_id/members",
            get(members_handler::<L, B, Q>),
        )
        .route(
            "/api/v1/lists/:list_id/members/:buyer_id",
            post(add_member_handler::<L, B, Q>).delete(remove_member_handler::<L, B, Q>),
        )
        .route(
            "/api/v1/lists/:list_id/campaign",
            post(campaign_handler::<L, B, Q>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct MemberQuery {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CampaignRequest {
    subject: String,
    body: String,
}

pub(crate) async fn create_handler<L, B, Q>(
    State(service): State<Arc<ListService<L, B, Q>>>,
    axum::Json(draft): axum::Json<ListDraft>,
) -> Response
where
    L: ListRepository + 'static,
    B: BuyerRepository + 'static,
    Q: OutboxRepository + 'static,
{
    match service.create(draft).await {
        Ok(list) => (StatusCode::CREATED, axum::Json(list)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn index_handler<L, B, Q>(
    State(service): State<Arc<ListService<L, B, Q>>>,
) -> Response
where
    L: ListRepository + 'static,
    B: BuyerRepository + 'static,
    Q: OutboxRepository + 'static,
{
    match service.list_all().await {
        Ok(lists) => (StatusCode::OK, axum::Json(lists)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<L, B, Q>(
    State(service): State<Arc<ListService<L, B, Q>>>,
    Path(list_id): Path<String>,
) -> Response
where
    L: ListRepository + 'static,
    B: BuyerRepository + 'static,
    Q: OutboxRepository + 'static,
{
    match service.get(&ListId(list_id)).await {
        Ok(list) => (StatusCode::OK, axum::Json(list)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<L, B, Q>(
    State(service): State<Arc<ListService<L, B, Q>>>,
    Path(list_id): Path<String>,
) -> Response
where
    L: ListRepository + 'static,
    B: BuyerRepository + 'static,
    Q: OutboxRepository + 'static,
{
    match service.delete(&ListId(list_id)).await {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "deleted": true }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn members_handler<L, B, Q>(
    State(service): State<Arc<ListService<L, B, Q>>>,
    Path(list_id): Path<String>,
    Query(query): Query<MemberQuery>,
) -> Response
where
    L: ListRepository + 'static,
    B: BuyerRepository + 'static,
    Q: OutboxRepository + 'static,
{
    match service
        .resolve_members(&ListId(list_id), query.q.as_deref())
        .await
    {
        Ok(members) => (StatusCode::OK, axum::Json(members)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn add_member_handler<L, B, Q>(
    State(service): State<Arc<ListService<L, B, Q>>>,
    Path((list_id, buyer_id)): Path<(String, String)>,
) -> Response
where
    L: ListRepository + 'static,
    B: BuyerRepository + 'static,
    Q: OutboxRepository + 'static,
{
    match service
        .add_member(&ListId(list_id), &BuyerId(buyer_id))
        .await
    {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "added": true }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn remove_member_handler<L, B, Q>(
    State(service): State<Arc<ListService<L, B, Q>>>,
    Path((list_id, buyer_id)): Path<(String, String)>,
) -> Response
where
    L: ListRepository + 'static,
    B: BuyerRepository + 'static,
    Q: OutboxRepository + 'static,
{
    match service
        .remove_member(&ListId(list_id), &BuyerId(buyer_id))
        .await
    {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "removed": true }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn campaign_handler<L, B, Q>(
    State(service): State<Arc<ListService<L, B, Q>>>,
    Path(list_id): Path<String>,
    axum::Json(request): axum::Json<CampaignRequest>,
) -> Response
where
    L: ListRepository + 'static,
    B: BuyerRepository + 'static,
    Q: OutboxRepository + 'static,
{
    match service
        .send_campaign(&ListId(list_id), &request.subject, &request.body)
        .await
    {
        Ok(queued) => (
            StatusCode::ACCEPTED,
            axum::Json(json!({ "queued": queued })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ListServiceError) -> Response {
    let status = match &err {
        ListServiceError::MissingFields(_) => StatusCode::BAD_REQUEST,
        ListServiceError::NotFound | ListServiceError::BuyerNotFound => StatusCode::NOT_FOUND,
        ListServiceError::Repository(repo) => return crate::store::storage_response(repo),
    };
    (status, axum::Json(json!({ "error": err.to_string() }))).into_response()
}
