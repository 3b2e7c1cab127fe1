//! Property context: listings referenced by offers and qualification flows.
//! The marketplace treats these as mostly read-only context: price bounds,
//! address, and the seller-financing flag.

pub mod domain;
pub mod repository;
pub mod router;

pub use domain::{Property, PropertyDraft, PropertyId};
pub use repository::PropertyRepository;
pub use router::{property_admin_router, property_router};
