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

use super::domain::deserialize_price;
use super::service::{OfferRequest, OfferService, OfferServiceError};
use crate::buyers::{BuyerRepository, BuyerType};
use crate::offers::repository::OfferRepository;
use crate::properties::PropertyId;

/// Router builder for offer intake and reads.
pub fn offer_router<O, B>(service: Arc<OfferService<O, B>>) -> Router
where
    O: OfferRepository + 'static,
    B: BuyerRepository + 'static,
{
    Router::new()
        .route("/api/v1/offers", post(make_offer_handler::<O, B>))
        .route(
            "/api/v1/offers/property/:property_id",
            get(property_offers_handler::<O, B>),
        )
        .route("/api/v1/offers/buyer", get(buyer_offers_handler::<O, B>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MakeOfferBody {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default = "default_buyer_type")]
    buyer_type: BuyerType,
    #[serde(default)]
    property_id: String,
    #[serde(deserialize_with = "deserialize_price")]
    offered_price: i64,
}

fn default_buyer_type() -> BuyerType {
    BuyerType::Investor
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactQuery {
    email: Option<String>,
    phone: Option<String>,
}

pub(crate) async fn make_offer_handler<O, B>(
    State(service): State<Arc<OfferService<O, B>>>,
    axum::Json(body): axum::Json<MakeOfferBody>,
) -> Response
where
    O: OfferRepository + 'static,
    B: BuyerRepository + 'static,
{
    let request = OfferRequest {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        phone: body.phone,
        buyer_type: body.buyer_type,
        property_id: body.property_id,
        offered_price: body.offered_price,
    };

    match service.make_offer(request).await {
        Ok(receipt) => {
            let status = if receipt.status == "created" {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, axum::Json(receipt)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn property_offers_handler<O, B>(
    State(service): State<Arc<OfferService<O, B>>>,
    Path(property_id): Path<String>,
) -> Response
where
    O: OfferRepository + 'static,
    B: BuyerRepository + 'static,
{
    match service
        .offers_for_property(&PropertyId(property_id))
        .await
    {
        Ok(offers) => (StatusCode::OK, axum::Json(offers)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn buyer_offers_handler<O, B>(
    State(service): State<Arc<OfferService<O, B>>>,
    Query(query): Query<ContactQuery>,
) -> Response
where
    O: OfferRepository + 'static,
    B: BuyerRepository + 'static,
{
    match service
        .offers_for_contact(query.email.as_deref(), query.phone.as_deref())
        .await
    {
        Ok((buyer, offers)) => (
            StatusCode::OK,
            axum::Json(json!({ "buyer": buyer, "offers": offers })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: OfferServiceError) -> Response {
    match err {
        OfferServiceError::NotHigher { existing } => {
            let payload = json!({
                "error": "a higher offer is required to update the existing offer",
                "existingOffer": existing,
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        OfferServiceError::MissingFields(_) | OfferServiceError::InvalidPrice => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        OfferServiceError::PropertyNotFound | OfferServiceError::BuyerNotFound => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        OfferServiceError::Repository(repo) => crate::store::storage_response(&repo),
    }
}
