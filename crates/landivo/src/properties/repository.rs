use async_trait::async_trait;

use super::domain::{Property, PropertyId};
use crate::store::RepositoryError;

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn insert(&self, property: Property) -> Result<Property, RepositoryError>;

    async fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError>;

    async fn list(&self) -> Result<Vec<Property>, RepositoryError>;
}
