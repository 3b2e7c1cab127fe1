//! Buyer directory: lead records keyed by email or phone, the acquisition
//! channels they arrived through, and CSV bulk import.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    normalize_email, normalize_phone, Buyer, BuyerDraft, BuyerId, BuyerSource, BuyerType,
    BuyerUpdate, VipSignup,
};
pub use import::{parse_buyer_rows, AcceptedRow, ImportReport, ImportRowError};
pub use repository::BuyerRepository;
pub use router::buyer_router;
pub use service::{BuyerService, BuyerServiceError, UpsertOutcome};
