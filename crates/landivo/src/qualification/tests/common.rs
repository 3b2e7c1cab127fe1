use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::properties::{Property, PropertyId, PropertyRepository};
use crate::qualification::domain::{QualificationSession, SessionId};
use crate::qualification::repository::SessionRepository;
use crate::qualification::service::QualificationService;
use crate::store::RepositoryError;

#[derive(Default, Clone)]
pub(super) struct MemorySessionRepository {
    records: Arc<Mutex<HashMap<SessionId, QualificationSession>>>,
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn insert(
        &self,
        session: QualificationSession,
    ) -> Result<QualificationSession, RepositoryError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        if guard.contains_key(&session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn update(&self, session: QualificationSession) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        if !guard.contains_key(&session.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(session.id.clone(), session);
        Ok(())
    }

    async fn fetch(
        &self,
        id: &SessionId,
    ) -> Result<Option<QualificationSession>, RepositoryError> {
        let guard = self.records.lock().expect("session mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPropertyRepository {
    records: Arc<Mutex<HashMap<PropertyId, Property>>>,
}

impl MemoryPropertyRepository {
    pub(super) fn with(property: Property) -> Self {
        let repository = Self::default();
        repository
            .records
            .lock()
            .expect("property mutex poisoned")
            .insert(property.id.clone(), property);
        repository
    }
}

#[async_trait]
impl PropertyRepository for MemoryPropertyRepository {
    async fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
        let mut guard = self.records.lock().expect("property mutex poisoned");
        guard.insert(property.id.clone(), property.clone());
        Ok(property)
    }

    async fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        let guard = self.records.lock().expect("property mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Property>, RepositoryError> {
        let guard = self.records.lock().expect("property mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) fn financed_property() -> Property {
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

pub(super) fn cash_only_property() -> Property {
    Property {
        financing_available: false,
        id: PropertyId("p2".to_string()),
        ..financed_property()
    }
}

pub(super) fn build_service() -> QualificationService<MemorySessionRepository, MemoryPropertyRepository>
{
    let properties = MemoryPropertyRepository::with(financed_property());
    properties
        .records
        .lock()
        .expect("property mutex poisoned")
        .insert(cash_only_property().id.clone(), cash_only_property());
    QualificationService::new(Arc::new(MemorySessionRepository::default()), Arc::new(properties))
}
