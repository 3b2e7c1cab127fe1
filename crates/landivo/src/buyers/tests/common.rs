use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::buyers::domain::{Buyer, BuyerDraft, BuyerId, BuyerType};
use crate::buyers::repository::BuyerRepository;
use crate::buyers::service::BuyerService;
use crate::store::RepositoryError;

#[derive(Default, Clone)]
pub(super) struct MemoryBuyerRepository {
    pub(super) records: Arc<Mutex<HashMap<BuyerId, Buyer>>>,
}

impl MemoryBuyerRepository {
    fn all(&self) -> Vec<Buyer> {
        self.records
            .lock()
            .expect("buyer mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BuyerRepository for MemoryBuyerRepository {
    async fn insert(&self, buyer: Buyer) -> Result<Buyer, RepositoryError> {
        let mut guard = self.records.lock().expect("buyer mutex poisoned");
        if guard.contains_key(&buyer.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(buyer.id.clone(), buyer.clone());
        Ok(buyer)
    }

    async fn update(&self, buyer: Buyer) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("buyer mutex poisoned");
        if !guard.contains_key(&buyer.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(buyer.id.clone(), buyer);
        Ok(())
    }

    async fn fetch(&self, id: &BuyerId) -> Result<Option<Buyer>, RepositoryError> {
        let guard = self.records.lock().expect("buyer mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<Buyer>, RepositoryError> {
        Ok(self.all().into_iter().find(|buyer| buyer.email == email))
    }

    async fn fetch_by_phone(&self, phone: &str) -> Result<Option<Buyer>, RepositoryError> {
        Ok(self.all().into_iter().find(|buyer| buyer.phone == phone))
    }

    async fn list(&self) -> Result<Vec<Buyer>, RepositoryError> {
        Ok(self.all())
    }

    async fn delete_cascading(&self, id: &BuyerId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("buyer mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)?;
        Ok(())
    }
}

pub(super) fn build_service() -> (
    BuyerService<MemoryBuyerRepository>,
    Arc<MemoryBuyerRepository>,
) {
    let repository = Arc::new(MemoryBuyerRepository::default());
    let service = BuyerService::new(repository.clone());
    (service, repository)
}

pub(super) fn draft() -> BuyerDraft {
    BuyerDraft {
        first_name: "Avery".to_string(),
        last_name: "Sutton".to_string(),
        email: "Avery.Sutton@Example.com".to_string(),
        phone: "515-555-0101".to_string(),
        buyer_type: BuyerType::Investor,
        preferred_areas: vec!["Des Moines".to_string()],
    }
}

pub(super) fn second_draft() -> BuyerDraft {
    BuyerDraft {
        first_name: "Blair".to_string(),
        last_name: "Nakamura".to_string(),
        email: "blair@example.com".to_string(),
        phone: "515-555-0102".to_string(),
        buyer_type: BuyerType::Builder,
        preferred_areas: Vec::new(),
    }
}
