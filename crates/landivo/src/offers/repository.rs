use async_trait::async_trait;

use super::domain::Offer;
use crate::buyers::{Buyer, BuyerId, BuyerType};
use crate::properties::PropertyId;
use crate::store::RepositoryError;

/// A validated intake request handed to the storage layer. Contact details
/// are already normalized.
#[derive(Debug, Clone)]
pub struct OfferSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub buyer_type: BuyerType,
    pub property_id: PropertyId,
    pub offered_price: i64,
}

/// What the atomic submission produced.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Created {
        offer: Offer,
        buyer: Buyer,
        below_minimum: bool,
    },
    Raised {
        offer: Offer,
        buyer: Buyer,
        previous_price: i64,
    },
    /// The standing offer was not beaten; nothing was written or enqueued.
    NotHigher { existing: Offer },
}

/// Failures surfaced by the submission path.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionFault {
    #[error("property not found")]
    PropertyNotFound,
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl From<sqlx::Error> for SubmissionFault {
    fn from(value: sqlx::Error) -> Self {
        Self::Storage(RepositoryError::from(value))
    }
}

/// Storage abstraction for offers. `submit` is the transactional unit the
/// intake endpoint stands on: buyer find-or-create, the create/raise/reject
/// branch, and the notification enqueue happen atomically or not at all.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn submit(
        &self,
        submission: OfferSubmission,
    ) -> Result<SubmissionOutcome, SubmissionFault>;

    async fn list_for_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Vec<Offer>, RepositoryError>;

    async fn list_for_buyer(&self, buyer_id: &BuyerId) -> Result<Vec<Offer>, RepositoryError>;
}
