use std::sync::Arc;

use serde::Serialize;

use super::domain::Offer;
use super::repository::{OfferRepository, OfferSubmission, SubmissionFault, SubmissionOutcome};
use crate::buyers::{normalize_email, normalize_phone, Buyer, BuyerRepository, BuyerType};
use crate::properties::PropertyId;
use crate::store::RepositoryError;

/// Service fronting offer intake and offer reads.
pub struct OfferService<O, B> {
    offers: Arc<O>,
    buyers: Arc<B>,
}

/// Inbound intake payload after router-level deserialization.
#[derive(Debug, Clone)]
pub struct OfferRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub buyer_type: BuyerType,
    pub property_id: String,
    pub offered_price: i64,
}

/// Successful intake response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferReceipt {
    pub status: &'static str,
    pub offer: Offer,
    pub buyer: Buyer,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub below_minimum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_price: Option<i64>,
}

impl<O, B> OfferService<O, B>
where
    O: OfferRepository + 'static,
    B: BuyerRepository + 'static,
{
    pub fn new(offers: Arc<O>, buyers: Arc<B>) -> Self {
        Self { offers, buyers }
    }

    /// Intake an offer: find-or-create the buyer by contact match, then
    /// create, raise, or reject against the standing offer.
    pub async fn make_offer(&self, request: OfferRequest) -> Result<OfferReceipt, OfferServiceError> {
        let email = normalize_email(&request.email);
        let phone = normalize_phone(&request.phone);
        let first_name = request.first_name.trim().to_string();
        let last_name = request.last_name.trim().to_string();

        let mut missing = Vec::new();
        if first_name.is_empty() {
            missing.push("firstName");
        }
        if last_name.is_empty() {
            missing.push("lastName");
        }
        if email.is_empty() {
            missing.push("email");
        }
        if phone.is_empty() {
            missing.push("phone");
        }
        if request.property_id.trim().is_empty() {
            missing.push("propertyId");
        }
        if !missing.is_empty() {
            return Err(OfferServiceError::MissingFields(missing.join(", ")));
        }

        if request.offered_price <= 0 {
            return Err(OfferServiceError::InvalidPrice);
        }

        let outcome = self
            .offers
            .submit(OfferSubmission {
                first_name,
                last_name,
                email,
                phone,
                buyer_type: request.buyer_type,
                property_id: PropertyId(request.property_id.trim().to_string()),
                offered_price: request.offered_price,
            })
            .await?;

        match outcome {
            SubmissionOutcome::Created {
                offer,
                buyer,
                below_minimum,
            } => Ok(OfferReceipt {
                status: "created",
                offer,
                buyer,
                below_minimum,
                previous_price: None,
            }),
            SubmissionOutcome::Raised {
                offer,
                buyer,
                previous_price,
            } => Ok(OfferReceipt {
                status: "updated",
                offer,
                buyer,
                below_minimum: false,
                previous_price: Some(previous_price),
            }),
            SubmissionOutcome::NotHigher { existing } => {
                Err(OfferServiceError::NotHigher { existing })
            }
        }
    }

    pub async fn offers_for_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Vec<Offer>, OfferServiceError> {
        Ok(self.offers.list_for_property(property_id).await?)
    }

    /// Look the buyer up by email-or-phone and return their offers.
    pub async fn offers_for_contact(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<(Buyer, Vec<Offer>), OfferServiceError> {
        let email = email.map(normalize_email).filter(|value| !value.is_empty());
        let phone = phone.map(normalize_phone).filter(|value| !value.is_empty());

        if email.is_none() && phone.is_none() {
            return Err(OfferServiceError::MissingFields("email or phone".to_string()));
        }

        let mut buyer = None;
        if let Some(email) = email {
            buyer = self.buyers.fetch_by_email(&email).await?;
        }
        if buyer.is_none() {
            if let Some(phone) = phone {
                buyer = self.buyers.fetch_by_phone(&phone).await?;
            }
        }

        let buyer = buyer.ok_or(OfferServiceError::BuyerNotFound)?;
        let offers = self.offers.list_for_buyer(&buyer.id).await?;
        Ok((buyer, offers))
    }
}

/// Error raised by the offer service.
#[derive(Debug, thiserror::Error)]
pub enum OfferServiceError {
    #[error("missing required field(s): {0}")]
    MissingFields(String),
    #[error("offeredPrice must be a positive amount")]
    InvalidPrice,
    #[error("property not found")]
    PropertyNotFound,
    #[error("buyer not found")]
    BuyerNotFound,
    #[error("a higher offer is required to update the existing offer")]
    NotHigher { existing: Offer },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<SubmissionFault> for OfferServiceError {
    fn from(value: SubmissionFault) -> Self {
        match value {
            SubmissionFault::PropertyNotFound => Self::PropertyNotFound,
            SubmissionFault::Storage(err) => Self::Repository(err),
        }
    }
}
