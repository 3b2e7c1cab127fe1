//! Offer intake and reads. A buyer holds at most one offer per property;
//! repeat submissions either raise the standing offer or are rejected.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{decide, IntakeDecision, Offer, OfferId};
pub use repository::{OfferRepository, OfferSubmission, SubmissionFault, SubmissionOutcome};
pub use router::offer_router;
pub use service::{OfferReceipt, OfferRequest, OfferService, OfferServiceError};
