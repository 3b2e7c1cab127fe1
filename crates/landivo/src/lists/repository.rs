use async_trait::async_trait;

use super::domain::{BuyerList, ListId};
use crate::buyers::BuyerId;
use crate::store::RepositoryError;

#[async_trait]
pub trait ListRepository: Send + Sync {
    async fn insert(&self, list: BuyerList) -> Result<BuyerList, RepositoryError>;

    async fn fetch(&self, id: &ListId) -> Result<Option<BuyerList>, RepositoryError>;

    async fn list(&self) -> Result<Vec<BuyerList>, RepositoryError>;

    /// Remove the list and its membership rows.
    async fn delete(&self, id: &ListId) -> Result<(), RepositoryError>;

    async fn add_member(&self, list_id: &ListId, buyer_id: &BuyerId)
        -> Result<(), RepositoryError>;

    async fn remove_member(
        &self,
        list_id: &ListId,
        buyer_id: &BuyerId,
    ) -> Result<(), RepositoryError>;

    async fn member_ids(&self, list_id: &ListId) -> Result<Vec<BuyerId>, RepositoryError>;
}
