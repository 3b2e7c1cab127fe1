use async_trait::async_trait;

use super::domain::{Buyer, BuyerId};
use crate::store::RepositoryError;

/// Storage abstraction so services can be exercised against in-memory doubles.
#[async_trait]
pub trait BuyerRepository: Send + Sync {
    async fn insert(&self, buyer: Buyer) -> Result<Buyer, RepositoryError>;

    async fn update(&self, buyer: Buyer) -> Result<(), RepositoryError>;

    async fn fetch(&self, id: &BuyerId) -> Result<Option<Buyer>, RepositoryError>;

    async fn fetch_by_email(&self, email: &str) -> Result<Option<Buyer>, RepositoryError>;

    async fn fetch_by_phone(&self, phone: &str) -> Result<Option<Buyer>, RepositoryError>;

    async fn list(&self) -> Result<Vec<Buyer>, RepositoryError>;

    /// Remove the buyer together with its offers and list memberships.
    /// Implementations must make this atomic so no orphaned rows survive.
    async fn delete_cascading(&self, id: &BuyerId) -> Result<(), RepositoryError>;
}
