use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use super::domain::{search_members, BuyerList, ListDraft, ListId};
use super::repository::ListRepository;
use crate::buyers::{Buyer, BuyerId, BuyerRepository};
use crate::notifications::{templates, OutboxRepository};
use crate::store::RepositoryError;

/// Service resolving list membership and fanning out campaigns.
pub struct ListService<L, B, Q> {
    lists: Arc<L>,
    buyers: Arc<B>,
    outbox: Arc<Q>,
}

impl<L, B, Q> ListService<L, B, Q>
where
    L: ListRepository + 'static,
    B: BuyerRepository + 'static,
    Q: OutboxRepository + 'static,
{
    pub fn new(lists: Arc<L>, buyers: Arc<B>, outbox: Arc<Q>) -> Self {
        Self {
            lists,
            buyers,
            outbox,
        }
    }

    pub async fn create(&self, draft: ListDraft) -> Result<BuyerList, ListServiceError> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(ListServiceError::MissingFields("name".to_string()));
        }

        let list = BuyerList {
            id: ListId::generate(),
            name,
            description: draft
                .description
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
            criteria: draft.criteria,
            created_at: Utc::now(),
        };

        Ok(self.lists.insert(list).await?)
    }

    pub async fn get(&self, id: &ListId) -> Result<BuyerList, ListServiceError> {
        self.lists
            .fetch(id)
            .await?
            .ok_or(ListServiceError::NotFound)
    }

    pub async fn list_all(&self) -> Result<Vec<BuyerList>, ListServiceError> {
        Ok(self.lists.list().await?)
    }

    pub async fn delete(&self, id: &ListId) -> Result<(), ListServiceError> {
        self.get(id).await?;
        self.lists.delete(id).await?;
        Ok(())
    }

    pub async fn add_member(
        &self,
        list_id: &ListId,
        buyer_id: &BuyerId,
    ) -> Result<(), ListServiceError> {
        self.get(list_id).await?;
        if self.buyers.fetch(buyer_id).await?.is_none() {
            return Err(ListServiceError::BuyerNotFound);
        }
        self.lists.add_member(list_id, buyer_id).await?;
        Ok(())
    }

    pub async fn remove_member(
        &self,
        list_id: &ListId,
        buyer_id: &BuyerId,
    ) -> Result<(), ListServiceError> {
        self.get(list_id).await?;
        self.lists.remove_member(list_id, buyer_id).await?;
        Ok(())
    }

    /// Resolve the buyers a list currently targets: the criteria filter when
    /// one is set, explicit membership otherwise. `query` narrows by
    /// name/email substring.
    pub async fn resolve_members(
        &self,
        list_id: &ListId,
        query: Option<&str>,
    ) -> Result<Vec<Buyer>, ListServiceError> {
        let list = self.get(list_id).await?;
        let all = self.buyers.list().await?;

        let members = match &list.criteria {
            Some(criteria) => all
                .into_iter()
                .filter(|buyer| criteria.matches(buyer))
                .collect(),
            None => {
                let ids: HashSet<BuyerId> =
                    self.lists.member_ids(list_id).await?.into_iter().collect();
                all.into_iter()
                    .filter(|buyer| ids.contains(&buyer.id))
                    .collect()
            }
        };

        Ok(match query {
            Some(query) => search_members(members, query),
            None => members,
        })
    }

    /// Queue one campaign email per resolved member. Delivery happens on the
    /// outbox worker, never on the request path.
    pub async fn send_campaign(
        &self,
        list_id: &ListId,
        subject: &str,
        body: &str,
    ) -> Result<usize, ListServiceError> {
        if subject.trim().is_empty() || body.trim().is_empty() {
            return Err(ListServiceError::MissingFields(
                "subject, body".to_string(),
            ));
        }

        let members = self.resolve_members(list_id, None).await?;
        for buyer in &members {
            self.outbox
                .enqueue(templates::campaign(buyer, subject.trim(), body.trim()))
                .await?;
        }

        tracing::info!(
            list_id = %list_id.0,
            queued = members.len(),
            "campaign queued"
        );
        Ok(members.len())
    }
}

/// Error raised by the list service.
#[derive(Debug, thiserror::Error)]
pub enum ListServiceError {
    #[error("missing required field(s): {0}")]
    MissingFields(String),
    #[error("list not found")]
    NotFound,
    #[error("buyer not found")]
    BuyerNotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
