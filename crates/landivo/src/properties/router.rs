use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{PropertyDraft, PropertyId};
use super::repository::PropertyRepository;
use crate::store::storage_response;

/// Router builder for the public property reads. Handlers talk to the
/// repository directly; there is no business logic to interpose.
pub fn property_router<P>(repository: Arc<P>) -> Router
where
    P: PropertyRepository + 'static,
{
    Router::new()
        .route("/api/v1/properties", get(list_handler::<P>))
        .route("/api/v1/properties/:property_id", get(get_handler::<P>))
        .with_state(repository)
}

/// Seeding endpoint, kept separate so the caller can put it behind the admin
/// guard.
pub fn property_admin_router<P>(repository: Arc<P>) -> Router
where
    P: PropertyRepository + 'static,
{
    Router::new()
        .route("/api/v1/properties", post(create_handler::<P>))
        .with_state(repository)
}

pub(crate) async fn create_handler<P>(
    State(repository): State<Arc<P>>,
    axum::Json(draft): axum::Json<PropertyDraft>,
) -> Response
where
    P: PropertyRepository + 'static,
{
    if draft.address.trim().is_empty() || draft.asking_price <= 0 {
        let payload = json!({ "error": "address and a positive asking_price are required" });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    match repository.insert(draft.into_property()).await {
        Ok(property) => (StatusCode::CREATED, axum::Json(property)).into_response(),
        Err(err) => storage_response(&err),
    }
}

pub(crate) async fn list_handler<P>(State(repository): State<Arc<P>>) -> Response
where
    P: PropertyRepository + 'static,
{
    match repository.list().await {
        Ok(properties) => (StatusCode::OK, axum::Json(properties)).into_response(),
        Err(err) => storage_response(&err),
    }
}

pub(crate) async fn get_handler<P>(
    State(repository): State<Arc<P>>,
    Path(property_id): Path<String>,
) -> Response
where
    P: PropertyRepository + 'static,
{
    match repository.fetch(&PropertyId(property_id)).await {
        Ok(Some(property)) => (StatusCode::OK, axum::Json(property)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "error": "property not found" })),
        )
            .into_response(),
        Err(err) => storage_response(&err),
    }
}
