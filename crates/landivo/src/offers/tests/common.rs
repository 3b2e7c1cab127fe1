use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::buyers::{Buyer, BuyerId, BuyerRepository, BuyerSource, BuyerType};
use crate::notifications::NewNotification;
use crate::notifications::templates;
use crate::offers::domain::{decide, IntakeDecision, Offer, OfferId};
use crate::offers::repository::{
    OfferRepository, OfferSubmission, SubmissionFault, SubmissionOutcome,
};
use crate::offers::service::{OfferRequest, OfferService};
use crate::properties::{Property, PropertyId};
use crate::store::RepositoryError;

#[derive(Default)]
pub(super) struct MarketplaceState {
    pub(super) buyers: Vec<Buyer>,
    pub(super) offers: Vec<Offer>,
    pub(super) properties: Vec<Property>,
    pub(super) queued: Vec<NewNotification>,
}

/// In-memory double covering both sides of the intake: the buyer directory
/// and the offer table, with the same atomicity guarantees the SQLite store
/// provides (all-or-nothing under one lock).
#[derive(Default, Clone)]
pub(super) struct MemoryMarketplace {
    pub(super) state: Arc<Mutex<MarketplaceState>>,
}

impl MemoryMarketplace {
    pub(super) fn with_property(property: Property) -> Self {
        let marketplace = Self::default();
        marketplace
            .state
            .lock()
            .expect("marketplace mutex poisoned")
            .properties
            .push(property);
        marketplace
    }

    pub(super) fn queued(&self) -> Vec<NewNotification> {
        self.state
            .lock()
            .expect("marketplace mutex poisoned")
            .queued
            .clone()
    }

    pub(super) fn offer_count(&self) -> usize {
        self.state
            .lock()
            .expect("marketplace mutex poisoned")
            .offers
            .len()
    }
}

#[async_trait]
impl OfferRepository for MemoryMarketplace {
    async fn submit(
        &self,
        submission: OfferSubmission,
    ) -> Result<SubmissionOutcome, SubmissionFault> {
        let mut state = self.state.lock().expect("marketplace mutex poisoned");

        let Some(property) = state
            .properties
            .iter()
            .find(|property| property.id == submission.property_id)
            .cloned()
        else {
            return Err(SubmissionFault::PropertyNotFound);
        };

        let buyer = state
            .buyers
            .iter()
            .find(|buyer| buyer.email == submission.email || buyer.phone == submission.phone)
            .cloned();
        let buyer = match buyer {
            Some(buyer) => buyer,
            None => {
                let buyer = Buyer {
                    id: BuyerId::generate(),
                    first_name: submission.first_name.clone(),
                    last_name: submission.last_name.clone(),
                    email: submission.email.clone(),
                    phone: submission.phone.clone(),
                    buyer_type: submission.buyer_type,
                    source: BuyerSource::PropertyOffer,
                    preferred_areas: Vec::new(),
                    created_at: Utc::now(),
                };
                state.buyers.push(buyer.clone());
                buyer
            }
        };

        let existing = state
            .offers
            .iter()
            .position(|offer| offer.buyer_id == buyer.id && offer.property_id == property.id);

        let existing_offer = existing.map(|index| state.offers[index].clone());
        let decision = decide(
            existing_offer.as_ref(),
            submission.offered_price,
            property.minimum_offer,
        );

        match (decision, existing) {
            (IntakeDecision::Create { below_minimum }, _) => {
                let offer = Offer {
                    id: OfferId::generate(),
                    buyer_id: buyer.id.clone(),
                    property_id: property.id.clone(),
                    offered_price: submission.offered_price,
                    offered_at: Utc::now(),
                };
                state.offers.push(offer.clone());
                let notification = if below_minimum {
                    templates::offer_below_minimum(&buyer, &property, offer.offered_price)
                } else {
                    templates::offer_received(&buyer, &property, offer.offered_price)
                };
                state.queued.push(notification);
                Ok(SubmissionOutcome::Created {
                    offer,
                    buyer,
                    below_minimum,
                })
            }
            (IntakeDecision::Raise { previous_price }, Some(index)) => {
                state.offers[index].offered_price = submission.offered_price;
                state.offers[index].offered_at = Utc::now();
                let offer = state.offers[index].clone();
                let notification =
                    templates::offer_updated(&buyer, &property, previous_price, offer.offered_price);
                state.queued.push(notification);
                Ok(SubmissionOutcome::Raised {
                    offer,
                    buyer,
                    previous_price,
                })
            }
            (IntakeDecision::Reject, Some(index)) => Ok(SubmissionOutcome::NotHigher {
                existing: state.offers[index].clone(),
            }),
            _ => Err(SubmissionFault::Storage(RepositoryError::Unavailable(
                "decision desynced".to_string(),
            ))),
        }
    }

    async fn list_for_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Vec<Offer>, RepositoryError> {
        let state = self.state.lock().expect("marketplace mutex poisoned");
        Ok(state
            .offers
            .iter()
            .filter(|offer| &offer.property_id == property_id)
            .cloned()
            .collect())
    }

    async fn list_for_buyer(&self, buyer_id: &BuyerId) -> Result<Vec<Offer>, RepositoryError> {
        let state = self.state.lock().expect("marketplace mutex poisoned");
        Ok(state
            .offers
            .iter()
            .filter(|offer| &offer.buyer_id == buyer_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BuyerRepository for MemoryMarketplace {
    async fn insert(&self, buyer: Buyer) -> Result<Buyer, RepositoryError> {
        let mut state = self.state.lock().expect("marketplace mutex poisoned");
        state.buyers.push(buyer.clone());
        Ok(buyer)
    }

    async fn update(&self, buyer: Buyer) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("marketplace mutex poisoned");
        match state.buyers.iter_mut().find(|record| record.id == buyer.id) {
            Some(record) => {
                *record = buyer;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn fetch(&self, id: &BuyerId) -> Result<Option<Buyer>, RepositoryError> {
        let state = self.state.lock().expect("marketplace mutex poisoned");
        Ok(state.buyers.iter().find(|buyer| &buyer.id == id).cloned())
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<Buyer>, RepositoryError> {
        let state = self.state.lock().expect("marketplace mutex poisoned");
        Ok(state
            .buyers
            .iter()
            .find(|buyer| buyer.email == email)
            .cloned())
    }

    async fn fetch_by_phone(&self, phone: &str) -> Result<Option<Buyer>, RepositoryError> {
        let state = self.state.lock().expect("marketplace mutex poisoned");
        Ok(state
            .buyers
            .iter()
            .find(|buyer| buyer.phone == phone)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Buyer>, RepositoryError> {
        let state = self.state.lock().expect("marketplace mutex poisoned");
        Ok(state.buyers.clone())
    }

    async fn delete_cascading(&self, id: &BuyerId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("marketplace mutex poisoned");
        state.offers.retain(|offer| &offer.buyer_id != id);
        state.buyers.retain(|buyer| &buyer.id != id);
        Ok(())
    }
}

pub(super) fn property() -> Property {
    Property {
        id: PropertyId("p1".to_string()),
        address: "2401 Prairie Trace".to_string(),
        area: "Des Moines".to_string(),
        asking_price: 60_000,
        minimum_offer: 45_000,
        financing_available: true,
        created_at: Utc::now(),
    }
}

pub(super) fn build_service() -> (
    OfferService<MemoryMarketplace, MemoryMarketplace>,
    MemoryMarketplace,
) {
    let marketplace = MemoryMarketplace::with_property(property());
    let shared = Arc::new(marketplace.clone());
    let service = OfferService::new(shared.clone(), shared);
    (service, marketplace)
}

pub(super) fn request(price: i64) -> OfferRequest {
    OfferRequest {
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        email: "a@x.com".to_string(),
        phone: "555".to_string(),
        buyer_type: BuyerType::Investor,
        property_id: "p1".to_string(),
        offered_price: price,
    }
}
