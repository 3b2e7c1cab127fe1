//! Buyer lists: admin-curated groupings used for targeted email campaigns.
//! A list either names its members explicitly or carries a criteria filter
//! evaluated over the buyer directory.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{search_members, BuyerList, ListCriteria, ListDraft, ListId};
pub use repository::ListRepository;
pub use router::list_router;
pub use service::{ListService, ListServiceError};
