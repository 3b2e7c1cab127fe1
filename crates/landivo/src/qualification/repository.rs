use async_trait::async_trait;

use super::domain::{QualificationSession, SessionId};
use crate::store::RepositoryError;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(
        &self,
        session: QualificationSession,
    ) -> Result<QualificationSession, RepositoryError>;

    async fn update(&self, session: QualificationSession) -> Result<(), RepositoryError>;

    async fn fetch(&self, id: &SessionId) -> Result<Option<QualificationSession>, RepositoryError>;
}
